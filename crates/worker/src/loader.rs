use async_trait::async_trait;
use glot_primitives::ModeId;

use crate::{InstantiateError, ModuleLoadError, WorkerDescriptor};

/// Asynchronous "load module by name" primitive.
///
/// Loading registers the module for later lookup as a side effect; the
/// manager never inspects a loaded module directly.
#[async_trait]
pub trait ModuleLoader: Send + Sync {
	async fn load(&self, module: &str) -> Result<(), ModuleLoadError>;
}

/// Constructs a worker instance from its descriptor.
///
/// Called only after [`WorkerDescriptor::module`] has been loaded. The mode
/// identifier is the only domain argument; anything else the worker needs
/// is the implementor's concern.
#[async_trait]
pub trait Instantiator<W: Send + 'static>: Send + Sync {
	async fn create(&self, descriptor: &WorkerDescriptor, mode_id: &ModeId) -> Result<W, InstantiateError>;
}
