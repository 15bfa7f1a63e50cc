use thiserror::Error;

use crate::WorkerDescriptor;

/// A module could not be resolved by the [`crate::ModuleLoader`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("failed to load module `{module}`: {reason}")]
pub struct ModuleLoadError {
	pub module: String,
	pub reason: String,
}

impl ModuleLoadError {
	pub fn new(module: impl Into<String>, reason: impl Into<String>) -> Self {
		Self {
			module: module.into(),
			reason: reason.into(),
		}
	}
}

/// The [`crate::Instantiator`] failed to construct a worker.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("failed to instantiate worker `{descriptor}`: {reason}")]
pub struct InstantiateError {
	pub descriptor: WorkerDescriptor,
	pub reason: String,
}

impl InstantiateError {
	pub fn new(descriptor: WorkerDescriptor, reason: impl Into<String>) -> Self {
		Self {
			descriptor,
			reason: reason.into(),
		}
	}
}

/// Failure of the worker initialization protocol.
///
/// Cloneable because one failure is handed to every caller sharing the
/// cached initialization.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum WorkerError {
	#[error(transparent)]
	ModuleLoad(#[from] ModuleLoadError),
	#[error(transparent)]
	Instantiate(#[from] InstantiateError),
}

/// A convenient type alias for `Result` with `E` = [`WorkerError`].
pub type Result<T, E = WorkerError> = std::result::Result<T, E>;
