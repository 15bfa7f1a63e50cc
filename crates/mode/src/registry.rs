//! Per-capability registries keyed by mode id.

use std::collections::HashMap;
use std::sync::Arc;

use glot_primitives::ModeId;
use parking_lot::RwLock;

/// Global-style registry of one capability's implementations, one per mode.
///
/// Concrete modes publish their supports here so editor features can look
/// them up by mode id without holding the mode itself.
pub struct SupportRegistry<S: ?Sized> {
	entries: RwLock<HashMap<ModeId, Arc<S>>>,
}

impl<S: ?Sized> Default for SupportRegistry<S> {
	fn default() -> Self {
		Self {
			entries: RwLock::new(HashMap::new()),
		}
	}
}

impl<S: ?Sized> std::fmt::Debug for SupportRegistry<S> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("SupportRegistry").field("modes", &self.mode_ids()).finish()
	}
}

impl<S: ?Sized> SupportRegistry<S> {
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers `support` for `mode_id`.
	///
	/// An existing entry is only replaced when `overwrite` is set. Returns
	/// whether `support` is now the registered entry.
	pub fn register(&self, mode_id: ModeId, support: Arc<S>, overwrite: bool) -> bool {
		let mut entries = self.entries.write();
		if !overwrite && entries.contains_key(&mode_id) {
			tracing::debug!(mode = %mode_id, "registry.register_skipped");
			return false;
		}
		entries.insert(mode_id, support);
		true
	}

	pub fn get(&self, mode_id: &ModeId) -> Option<Arc<S>> {
		self.entries.read().get(mode_id).cloned()
	}

	pub fn unregister(&self, mode_id: &ModeId) -> Option<Arc<S>> {
		self.entries.write().remove(mode_id)
	}

	/// Registered mode ids, sorted.
	pub fn mode_ids(&self) -> Vec<ModeId> {
		let mut ids: Vec<_> = self.entries.read().keys().cloned().collect();
		ids.sort();
		ids
	}
}
