//! Background worker construction for language modes.
//!
//! A [`WorkerManager`] owns at most one worker per mode. The worker is built
//! on first use through a fixed protocol:
//!
//! 1. load the optional shared base module,
//! 2. load the worker's own module,
//! 3. construct the instance through an [`Instantiator`].
//!
//! The in-flight operation is cached as a shared future, so every caller
//! (concurrent or later) observes the same initialization and the same
//! outcome. Module loading and instantiation are injected through
//! [`ModuleLoader`] and [`Instantiator`] so tests can substitute
//! deterministic fakes.

mod descriptor;
mod error;
mod loader;
mod manager;
mod options;

pub use descriptor::WorkerDescriptor;
pub use error::{InstantiateError, ModuleLoadError, Result, WorkerError};
pub use loader::{Instantiator, ModuleLoader};
pub use manager::{PendingWorkerInit, WorkerManager};
pub use options::WorkerOptions;
