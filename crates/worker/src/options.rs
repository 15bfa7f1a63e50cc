use serde::{Deserialize, Serialize};

use crate::WorkerDescriptor;

/// Declarative worker configuration for a mode.
///
/// ```json
/// { "module": "modes/css/worker", "symbol": "CssWorker", "base_module": "modes/shared" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WorkerOptions {
	/// Module defining the worker.
	pub module: String,
	/// Exported worker symbol.
	pub symbol: String,
	/// Shared module loaded before [`Self::module`], if any.
	#[serde(default)]
	pub base_module: Option<String>,
}

impl WorkerOptions {
	pub fn descriptor(&self) -> WorkerDescriptor {
		WorkerDescriptor::new(&self.module, &self.symbol)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn base_module_defaults_to_none() {
		let opts: WorkerOptions = serde_json::from_str(r#"{ "module": "modes/json/worker", "symbol": "JsonWorker" }"#).unwrap();
		assert_eq!(opts.base_module, None);
		assert_eq!(opts.descriptor(), WorkerDescriptor::new("modes/json/worker", "JsonWorker"));
	}

	#[test]
	fn unknown_fields_are_rejected() {
		let res = serde_json::from_str::<WorkerOptions>(r#"{ "module": "m", "symbol": "S", "retries": 3 }"#);
		assert!(res.is_err());
	}
}
