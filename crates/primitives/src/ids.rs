use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Immutable identifier of a language mode (e.g. `"rust"`, `"json"`).
///
/// Cloning is cheap; the string is shared.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct ModeId(Arc<str>);

impl ModeId {
	pub fn new(id: impl AsRef<str>) -> Self {
		Self(Arc::from(id.as_ref()))
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}

	/// Returns a new identifier of the form `<prefix>:<self>`.
	pub fn derived(&self, prefix: &str) -> Self {
		Self::new(format!("{prefix}:{}", self.0))
	}
}

impl fmt::Display for ModeId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl AsRef<str> for ModeId {
	fn as_ref(&self) -> &str {
		&self.0
	}
}

impl From<&str> for ModeId {
	fn from(id: &str) -> Self {
		Self::new(id)
	}
}

impl From<String> for ModeId {
	fn from(id: String) -> Self {
		Self(Arc::from(id))
	}
}

impl From<ModeId> for String {
	fn from(id: ModeId) -> Self {
		id.0.to_string()
	}
}

impl PartialEq<str> for ModeId {
	fn eq(&self, other: &str) -> bool {
		&*self.0 == other
	}
}

impl PartialEq<&str> for ModeId {
	fn eq(&self, other: &&str) -> bool {
		&*self.0 == *other
	}
}
