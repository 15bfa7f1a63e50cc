use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::FutureExt;
use futures::future::Shared;
use glot_primitives::{BoxFutureStatic, ModeId};
use parking_lot::Mutex;

use crate::{Instantiator, ModuleLoader, Result, WorkerDescriptor, WorkerOptions};

type InitFuture<W> = Shared<BoxFutureStatic<Result<Arc<W>>>>;

/// The shared, in-flight (or settled) worker initialization.
///
/// Every clone polls the same underlying operation. Dropping a clone never
/// aborts the initialization while the owning [`WorkerManager`] still caches
/// it.
pub struct PendingWorkerInit<W> {
	inner: InitFuture<W>,
}

impl<W> Clone for PendingWorkerInit<W> {
	fn clone(&self) -> Self {
		Self { inner: self.inner.clone() }
	}
}

impl<W> std::fmt::Debug for PendingWorkerInit<W> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let state = match self.inner.peek() {
			None => "pending",
			Some(Ok(_)) => "ready",
			Some(Err(_)) => "failed",
		};
		f.debug_struct("PendingWorkerInit").field("state", &state).finish()
	}
}

impl<W> PendingWorkerInit<W> {
	/// Returns the settled outcome without polling, if there is one.
	pub fn peek(&self) -> Option<&Result<Arc<W>>> {
		self.inner.peek()
	}

	/// Returns true once the initialization has settled, successfully or not.
	pub fn is_settled(&self) -> bool {
		self.inner.peek().is_some()
	}

	/// Module loading cannot be interrupted; the request is accepted and
	/// ignored.
	pub fn cancel(&self) {
		tracing::trace!(settled = self.is_settled(), "worker.init.cancel_ignored");
	}
}

impl<W> Future for PendingWorkerInit<W> {
	type Output = Result<Arc<W>>;

	fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
		Pin::new(&mut self.inner).poll(cx)
	}
}

/// Owns the single, lazily constructed worker of one language mode.
///
/// # Concurrency
///
/// The cached initialization transitions from empty to populated exactly
/// once under `pending`. Only [`Self::reset`] clears it. The lock is never
/// held across an await point.
pub struct WorkerManager<W>
where
	W: Send + Sync + 'static,
{
	mode_id: ModeId,
	descriptor: WorkerDescriptor,
	base_module: Option<String>,
	loader: Arc<dyn ModuleLoader>,
	instantiator: Arc<dyn Instantiator<W>>,
	pending: Mutex<Option<PendingWorkerInit<W>>>,
}

impl<W> std::fmt::Debug for WorkerManager<W>
where
	W: Send + Sync + 'static,
{
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("WorkerManager")
			.field("mode_id", &self.mode_id)
			.field("descriptor", &self.descriptor)
			.field("base_module", &self.base_module)
			.field("pending", &*self.pending.lock())
			.finish_non_exhaustive()
	}
}

impl<W> WorkerManager<W>
where
	W: Send + Sync + 'static,
{
	/// Creates a manager with no base module.
	pub fn new(mode_id: ModeId, descriptor: WorkerDescriptor, loader: Arc<dyn ModuleLoader>, instantiator: Arc<dyn Instantiator<W>>) -> Self {
		Self {
			mode_id,
			descriptor,
			base_module: None,
			loader,
			instantiator,
			pending: Mutex::new(None),
		}
	}

	/// Creates a manager from declarative options.
	pub fn from_options(mode_id: ModeId, options: &WorkerOptions, loader: Arc<dyn ModuleLoader>, instantiator: Arc<dyn Instantiator<W>>) -> Self {
		let manager = Self::new(mode_id, options.descriptor(), loader, instantiator);
		match &options.base_module {
			Some(base) => manager.with_base_module(base.clone()),
			None => manager,
		}
	}

	/// Sets a shared module that is loaded before the worker module.
	pub fn with_base_module(mut self, module: impl Into<String>) -> Self {
		self.base_module = Some(module.into());
		self
	}

	pub fn mode_id(&self) -> &ModeId {
		&self.mode_id
	}

	pub fn descriptor(&self) -> &WorkerDescriptor {
		&self.descriptor
	}

	pub fn base_module(&self) -> Option<&str> {
		self.base_module.as_deref()
	}

	/// Runs `op` against the worker once it is ready.
	///
	/// The first call starts the initialization; later calls, concurrent or
	/// not, join it.
	///
	/// # Errors
	///
	/// Returns the initialization failure. The failure is cached and returned
	/// to every subsequent call until [`Self::reset`].
	pub async fn worker<F, Fut, T>(&self, op: F) -> Result<T>
	where
		F: FnOnce(Arc<W>) -> Fut,
		Fut: Future<Output = T>,
	{
		let worker = self.ensure_worker().await?;
		Ok(op(worker).await)
	}

	/// Synchronous-operation variant of [`Self::worker`].
	pub async fn with_worker<F, T>(&self, op: F) -> Result<T>
	where
		F: FnOnce(&W) -> T,
	{
		let worker = self.ensure_worker().await?;
		Ok(op(&worker))
	}

	/// Returns true once the worker has been constructed successfully.
	pub fn is_ready(&self) -> bool {
		self.pending.lock().as_ref().is_some_and(|init| matches!(init.peek(), Some(Ok(_))))
	}

	/// Returns the cached initialization, if one has been started.
	pub fn pending(&self) -> Option<PendingWorkerInit<W>> {
		self.pending.lock().clone()
	}

	/// Drops the cached initialization so the next request starts over.
	///
	/// Callers already awaiting the old initialization still observe its
	/// outcome. Returns whether anything was cached.
	pub fn reset(&self) -> bool {
		let cleared = self.pending.lock().take();
		if let Some(init) = &cleared {
			tracing::debug!(mode = %self.mode_id, prior = ?init, "worker.reset");
		}
		cleared.is_some()
	}

	pub(crate) fn ensure_worker(&self) -> PendingWorkerInit<W> {
		let mut pending = self.pending.lock();
		if let Some(init) = pending.as_ref() {
			return init.clone();
		}

		let init = PendingWorkerInit {
			inner: self.init_future().shared(),
		};
		*pending = Some(init.clone());
		init
	}

	fn init_future(&self) -> BoxFutureStatic<Result<Arc<W>>> {
		let mode_id = self.mode_id.clone();
		let descriptor = self.descriptor.clone();
		let base_module = self.base_module.clone();
		let loader = Arc::clone(&self.loader);
		let instantiator = Arc::clone(&self.instantiator);

		Box::pin(async move {
			let result = initialize(&mode_id, &descriptor, base_module.as_deref(), &*loader, &*instantiator).await;
			match &result {
				Ok(_) => tracing::info!(mode = %mode_id, worker = %descriptor, "worker.ready"),
				Err(error) => tracing::warn!(mode = %mode_id, worker = %descriptor, %error, "worker.init_failed"),
			}
			result
		})
	}
}

/// Base module, then worker module, then construction. Each stage starts
/// only after the previous one has completed.
async fn initialize<W>(
	mode_id: &ModeId,
	descriptor: &WorkerDescriptor,
	base_module: Option<&str>,
	loader: &dyn ModuleLoader,
	instantiator: &dyn Instantiator<W>,
) -> Result<Arc<W>>
where
	W: Send + Sync + 'static,
{
	if let Some(base) = base_module {
		tracing::debug!(mode = %mode_id, module = base, "worker.load_base_module");
		loader.load(base).await?;
	}

	tracing::debug!(mode = %mode_id, module = descriptor.module(), "worker.load_module");
	loader.load(descriptor.module()).await?;

	tracing::debug!(mode = %mode_id, worker = %descriptor, "worker.instantiate");
	let worker = instantiator.create(descriptor, mode_id).await?;
	Ok(Arc::new(worker))
}

#[cfg(test)]
mod tests;
