use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifies a worker type by the module that defines it and the symbol it
/// is exported under.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorkerDescriptor {
	module: String,
	symbol: String,
}

impl WorkerDescriptor {
	pub fn new(module: impl Into<String>, symbol: impl Into<String>) -> Self {
		Self {
			module: module.into(),
			symbol: symbol.into(),
		}
	}

	/// Module that must be loaded before the worker can be constructed.
	pub fn module(&self) -> &str {
		&self.module
	}

	/// Exported symbol naming the worker type inside [`Self::module`].
	pub fn symbol(&self) -> &str {
		&self.symbol
	}
}

impl fmt::Display for WorkerDescriptor {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}#{}", self.module, self.symbol)
	}
}
