use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Notify;

use super::*;
use crate::{InstantiateError, ModuleLoadError, WorkerError};

type Log = Arc<Mutex<Vec<String>>>;

struct FakeLoader {
	log: Log,
	/// Module whose load blocks until `release` is notified.
	gated: Option<String>,
	release: Arc<Notify>,
	missing: Mutex<HashSet<String>>,
}

impl FakeLoader {
	fn new(log: Log) -> Self {
		Self {
			log,
			gated: None,
			release: Arc::new(Notify::new()),
			missing: Mutex::new(HashSet::new()),
		}
	}

	fn gate(mut self, module: &str) -> Self {
		self.gated = Some(module.to_string());
		self
	}

	fn missing(self, module: &str) -> Self {
		self.missing.lock().insert(module.to_string());
		self
	}
}

#[async_trait]
impl ModuleLoader for FakeLoader {
	async fn load(&self, module: &str) -> Result<(), ModuleLoadError> {
		self.log.lock().push(format!("load:{module}"));
		if self.gated.as_deref() == Some(module) {
			self.release.notified().await;
		}
		if self.missing.lock().contains(module) {
			return Err(ModuleLoadError::new(module, "not found"));
		}
		self.log.lock().push(format!("loaded:{module}"));
		Ok(())
	}
}

#[derive(Debug)]
struct FakeWorker {
	mode: ModeId,
	serial: usize,
}

struct FakeInstantiator {
	log: Log,
	created: AtomicUsize,
}

impl FakeInstantiator {
	fn new(log: Log) -> Self {
		Self {
			log,
			created: AtomicUsize::new(0),
		}
	}
}

#[async_trait]
impl Instantiator<FakeWorker> for FakeInstantiator {
	async fn create(&self, descriptor: &WorkerDescriptor, mode_id: &ModeId) -> Result<FakeWorker, InstantiateError> {
		self.log.lock().push(format!("create:{descriptor}"));
		let serial = self.created.fetch_add(1, Ordering::SeqCst);
		Ok(FakeWorker {
			mode: mode_id.clone(),
			serial,
		})
	}
}

struct Harness {
	log: Log,
	loader: Arc<FakeLoader>,
	instantiator: Arc<FakeInstantiator>,
	manager: Arc<WorkerManager<FakeWorker>>,
}

fn harness(configure: impl FnOnce(FakeLoader) -> FakeLoader, base: Option<&str>) -> Harness {
	let log: Log = Arc::default();
	let loader = Arc::new(configure(FakeLoader::new(log.clone())));
	let instantiator = Arc::new(FakeInstantiator::new(log.clone()));
	let mut manager: WorkerManager<FakeWorker> = WorkerManager::new(
		ModeId::new("css"),
		WorkerDescriptor::new("modes/css/worker", "CssWorker"),
		loader.clone(),
		instantiator.clone(),
	);
	if let Some(base) = base {
		manager = manager.with_base_module(base);
	}
	Harness {
		log,
		loader,
		instantiator,
		manager: Arc::new(manager),
	}
}

fn entries(log: &Log) -> Vec<String> {
	log.lock().clone()
}

async fn settle() {
	for _ in 0..8 {
		tokio::task::yield_now().await;
	}
}

#[tokio::test]
async fn constructs_worker_with_mode_id() {
	let h = harness(|l| l, None);
	let mode = h.manager.with_worker(|w| w.mode.clone()).await.unwrap();
	assert_eq!(mode, "css");
	assert!(h.manager.is_ready());
}

#[tokio::test]
async fn concurrent_requests_share_one_construction() {
	let h = harness(|l| l.gate("modes/css/worker"), Some("modes/shared"));

	let mut tasks = Vec::new();
	for _ in 0..8 {
		let manager = Arc::clone(&h.manager);
		tasks.push(tokio::spawn(async move { manager.worker(|w| async move { Arc::as_ptr(&w) as usize }).await }));
	}

	settle().await;
	assert_eq!(h.instantiator.created.load(Ordering::SeqCst), 0);
	assert_eq!(entries(&h.log), ["load:modes/shared", "loaded:modes/shared", "load:modes/css/worker"]);
	assert!(!h.manager.is_ready());

	h.loader.release.notify_one();

	let mut ptrs = HashSet::new();
	for task in tasks {
		ptrs.insert(task.await.unwrap().unwrap());
	}
	assert_eq!(ptrs.len(), 1);
	assert_eq!(h.instantiator.created.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn stages_run_in_order() {
	let h = harness(|l| l, Some("modes/shared"));

	let (a, b) = tokio::join!(h.manager.with_worker(|w| w.serial), h.manager.with_worker(|w| w.serial));
	assert_eq!((a.unwrap(), b.unwrap()), (0, 0));

	assert_eq!(
		entries(&h.log),
		[
			"load:modes/shared",
			"loaded:modes/shared",
			"load:modes/css/worker",
			"loaded:modes/css/worker",
			"create:modes/css/worker#CssWorker",
		]
	);
}

#[tokio::test]
async fn missing_base_module_skips_stage() {
	let h = harness(|l| l, None);
	h.manager.with_worker(|_| ()).await.unwrap();
	assert_eq!(entries(&h.log), ["load:modes/css/worker", "loaded:modes/css/worker", "create:modes/css/worker#CssWorker"]);
}

#[tokio::test]
async fn later_requests_reuse_resolved_worker() {
	let h = harness(|l| l, None);
	let first = h.manager.worker(|w| async move { w }).await.unwrap();
	let second = h.manager.worker(|w| async move { w }).await.unwrap();
	assert!(Arc::ptr_eq(&first, &second));
	assert_eq!(entries(&h.log).len(), 3);
}

#[tokio::test]
async fn failure_is_shared_and_sticky() {
	let h = harness(|l| l.missing("modes/shared"), Some("modes/shared"));

	let (a, b) = tokio::join!(h.manager.with_worker(|_| ()), h.manager.with_worker(|_| ()));
	let expected = WorkerError::ModuleLoad(ModuleLoadError::new("modes/shared", "not found"));
	assert_eq!(a, Err(expected.clone()));
	assert_eq!(b, Err(expected.clone()));

	assert_eq!(h.manager.with_worker(|_| ()).await, Err(expected));
	assert_eq!(entries(&h.log), ["load:modes/shared"]);
	assert_eq!(h.instantiator.created.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn reset_allows_retry() {
	let h = harness(|l| l.missing("modes/css/worker"), None);
	assert!(h.manager.with_worker(|_| ()).await.is_err());

	h.loader.missing.lock().clear();
	assert!(h.manager.with_worker(|_| ()).await.is_err());

	assert!(h.manager.reset());
	assert!(!h.manager.reset());
	assert_eq!(h.manager.with_worker(|w| w.serial).await, Ok(0));
	assert_eq!(h.instantiator.created.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn cancel_is_ignored() {
	let h = harness(|l| l.gate("modes/css/worker"), None);

	let init = h.manager.ensure_worker();
	init.cancel();
	assert!(!init.is_settled());

	h.loader.release.notify_one();
	let worker = init.await.unwrap();
	assert_eq!(worker.serial, 0);
	assert!(h.manager.pending().is_some_and(|p| p.is_settled()));
}

#[tokio::test]
async fn dropped_caller_does_not_abort_initialization() {
	let h = harness(|l| l.gate("modes/css/worker"), None);

	let timed_out = tokio::time::timeout(Duration::from_millis(10), h.manager.with_worker(|_| ())).await;
	assert!(timed_out.is_err());

	h.loader.release.notify_one();
	assert_eq!(h.manager.with_worker(|w| w.serial).await, Ok(0));
	assert_eq!(entries(&h.log).iter().filter(|e| e.starts_with("load:")).count(), 1);
}

#[tokio::test]
async fn operation_runs_after_worker_is_ready() {
	let h = harness(|l| l, None);
	let log = h.log.clone();
	h.manager
		.worker(|w| async move {
			log.lock().push(format!("op:{}", w.mode));
		})
		.await
		.unwrap();
	assert_eq!(entries(&h.log).last().map(String::as_str), Some("op:css"));
}

#[test]
fn from_options_applies_base_module() {
	let log: Log = Arc::default();
	let options = WorkerOptions {
		module: "modes/less/worker".into(),
		symbol: "LessWorker".into(),
		base_module: Some("modes/css/worker".into()),
	};
	let manager: WorkerManager<FakeWorker> = WorkerManager::from_options(
		ModeId::new("less"),
		&options,
		Arc::new(FakeLoader::new(log.clone())),
		Arc::new(FakeInstantiator::new(log)),
	);
	assert_eq!(manager.base_module(), Some("modes/css/worker"));
	assert_eq!(manager.descriptor().symbol(), "LessWorker");
	assert!(manager.pending().is_none());
}

#[test]
fn manager_is_send_and_sync() {
	fn assert_send_sync<T: Send + Sync>() {}
	assert_send_sync::<WorkerManager<FakeWorker>>();
	assert_send_sync::<PendingWorkerInit<FakeWorker>>();
}
