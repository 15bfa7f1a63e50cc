//! Modes whose suggestions are computed by a background worker.

use std::future::Future;
use std::sync::Arc;

use glot_primitives::BoxFutureStatic;
use glot_worker::WorkerManager;

use crate::{CapabilityHandle, Mode, Suggest, SuggestError, SuggestSupport, Suggestion, SupportRegistry};

/// Worker side of a suggestion capability.
pub trait SuggestWorker: Send + Sync + 'static {
	fn suggest(&self, text: &str, offset: usize) -> Vec<Suggestion>;
}

/// Pairs a [`Mode`] with the manager of its background worker.
///
/// The worker is not constructed until the first suggestion request (or
/// the first explicit [`Self::worker`] call).
pub struct WorkerBackedMode<W>
where
	W: Send + Sync + 'static,
{
	mode: Arc<Mode>,
	workers: Arc<WorkerManager<W>>,
}

impl<W> WorkerBackedMode<W>
where
	W: Send + Sync + 'static,
{
	pub fn new(mode: Arc<Mode>, workers: WorkerManager<W>) -> Self {
		Self {
			mode,
			workers: Arc::new(workers),
		}
	}

	pub fn mode(&self) -> &Arc<Mode> {
		&self.mode
	}

	pub fn workers(&self) -> &WorkerManager<W> {
		&self.workers
	}

	/// Runs `op` against the mode's worker; see [`WorkerManager::worker`].
	pub async fn worker<F, Fut, T>(&self, op: F) -> glot_worker::Result<T>
	where
		F: FnOnce(Arc<W>) -> Fut,
		Fut: Future<Output = T>,
	{
		self.workers.worker(op).await
	}
}

impl<W> WorkerBackedMode<W>
where
	W: SuggestWorker,
{
	/// Attaches a worker-backed [`Suggest`] capability and publishes it in
	/// `registry`.
	pub fn install_suggest(&self, registry: &SupportRegistry<dyn SuggestSupport>, overwrite: bool) -> CapabilityHandle {
		let support: Arc<dyn SuggestSupport> = Arc::new(WorkerSuggest {
			workers: Arc::clone(&self.workers),
		});
		registry.register(self.mode.id().clone(), Arc::clone(&support), overwrite);
		self.mode.attach::<Suggest>(move |_| support)
	}
}

struct WorkerSuggest<W>
where
	W: Send + Sync + 'static,
{
	workers: Arc<WorkerManager<W>>,
}

impl<W: SuggestWorker> SuggestSupport for WorkerSuggest<W> {
	fn suggest(&self, text: String, offset: usize) -> BoxFutureStatic<Result<Vec<Suggestion>, SuggestError>> {
		let workers = Arc::clone(&self.workers);
		Box::pin(async move {
			let suggestions = workers.with_worker(|w| w.suggest(&text, offset)).await?;
			Ok(suggestions)
		})
	}
}
