//! The language mode capability host.

use std::any::TypeId;
use std::sync::{Arc, Weak};

use glot_primitives::ModeId;
use once_cell::sync::OnceCell;
use parking_lot::RwLock;

use crate::capability::GenerationClock;
use crate::event::ChangeEmitter;
use crate::{CapabilityKind, CapabilitySet, ChangeListener, ModeChangeEvent, SimplifiedMode, Subscription, Tokenization, TokenizationSupport};

/// Surface shared by full modes and their simplified projections.
pub trait LanguageMode: Send + Sync {
	fn id(&self) -> &ModeId;

	/// Returns the cached simplified projection of this mode.
	fn to_simplified(&self) -> Arc<SimplifiedMode>;

	fn tokenization_support(&self) -> Option<Arc<dyn TokenizationSupport>>;

	/// Registers a change listener.
	///
	/// Returns `None` when this mode never announces changes; observers must
	/// then treat its state as fixed.
	fn on_did_change(&self, _listener: ChangeListener) -> Option<Subscription> {
		None
	}
}

/// One language's mode: identity plus a dynamic set of capabilities.
///
/// Capabilities are attached with [`Mode::attach`]. Every attach and every
/// effective detach emits a [`ModeChangeEvent`] before the call returns.
pub struct Mode {
	id: ModeId,
	this: Weak<Mode>,
	capabilities: RwLock<CapabilitySet>,
	generations: GenerationClock,
	changes: ChangeEmitter,
	simplified: OnceCell<Arc<SimplifiedMode>>,
}

impl std::fmt::Debug for Mode {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Mode")
			.field("id", &self.id)
			.field("capabilities", &*self.capabilities.read())
			.field("listeners", &self.changes.listener_count())
			.finish_non_exhaustive()
	}
}

impl Mode {
	pub fn new(id: impl Into<ModeId>) -> Arc<Self> {
		let id = id.into();
		Arc::new_cyclic(|this| Self {
			id,
			this: this.clone(),
			capabilities: RwLock::new(CapabilitySet::new()),
			generations: GenerationClock::default(),
			changes: ChangeEmitter::default(),
			simplified: OnceCell::new(),
		})
	}

	pub fn id(&self) -> &ModeId {
		&self.id
	}

	/// Returns the simplified projection, creating it on first call.
	pub fn to_simplified(&self) -> Arc<SimplifiedMode> {
		Arc::clone(self.simplified.get_or_init(|| {
			tracing::debug!(mode = %self.id, "mode.simplified.create");
			SimplifiedMode::new(self, self.this.clone())
		}))
	}

	/// Registers `listener` for capability changes.
	pub fn add_change_listener(&self, listener: impl Fn(&ModeChangeEvent) + Send + Sync + 'static) -> Subscription {
		self.changes.subscribe(Arc::new(listener))
	}

	/// Installs the support produced by `factory` as capability `K`.
	///
	/// Any previous support for `K` is replaced. Emits
	/// [`ModeChangeEvent::attached`] before returning.
	pub fn attach<K: CapabilityKind>(&self, factory: impl FnOnce(&Mode) -> Arc<K::Support>) -> CapabilityHandle {
		let support = factory(self);
		let generation = self.generations.next();
		let replaced = self.capabilities.write().insert::<K>(support, generation);
		tracing::debug!(mode = %self.id, capability = K::NAME, generation, ?replaced, "mode.capability.attach");

		self.changes.emit(&ModeChangeEvent::attached::<K>());
		CapabilityHandle {
			mode: self.this.clone(),
			kind: TypeId::of::<K>(),
			capability: K::NAME,
			generation,
		}
	}

	/// Shorthand for attaching a [`Tokenization`] capability.
	pub fn set_tokenization_support(&self, factory: impl FnOnce(&Mode) -> Arc<dyn TokenizationSupport>) -> CapabilityHandle {
		self.attach::<Tokenization>(factory)
	}

	pub fn capability<K: CapabilityKind>(&self) -> Option<Arc<K::Support>> {
		self.capabilities.read().get::<K>()
	}

	pub fn has_capability<K: CapabilityKind>(&self) -> bool {
		self.capabilities.read().contains::<K>()
	}

	pub fn tokenization_support(&self) -> Option<Arc<dyn TokenizationSupport>> {
		self.capability::<Tokenization>()
	}

	/// Names of the currently installed capabilities, sorted.
	pub fn capability_names(&self) -> Vec<&'static str> {
		self.capabilities.read().names()
	}

	fn detach(&self, kind: TypeId, capability: &'static str, generation: u64) -> bool {
		if !self.capabilities.write().remove_if_current(kind, generation) {
			tracing::trace!(mode = %self.id, capability, generation, "mode.capability.detach_stale");
			return false;
		}

		tracing::debug!(mode = %self.id, capability, generation, "mode.capability.detach");
		self.changes.emit(&ModeChangeEvent {
			capability,
			change: crate::CapabilityChange::Detached,
		});
		true
	}
}

impl LanguageMode for Mode {
	fn id(&self) -> &ModeId {
		Mode::id(self)
	}

	fn to_simplified(&self) -> Arc<SimplifiedMode> {
		Mode::to_simplified(self)
	}

	fn tokenization_support(&self) -> Option<Arc<dyn TokenizationSupport>> {
		Mode::tokenization_support(self)
	}

	fn on_did_change(&self, listener: ChangeListener) -> Option<Subscription> {
		Some(self.changes.subscribe(listener))
	}
}

/// Handle to one attached capability.
///
/// Dropping the handle leaves the capability installed; call
/// [`Self::dispose`] to remove it.
#[derive(Debug)]
pub struct CapabilityHandle {
	mode: Weak<Mode>,
	kind: TypeId,
	capability: &'static str,
	generation: u64,
}

impl CapabilityHandle {
	/// Name of the attached capability.
	pub fn capability(&self) -> &'static str {
		self.capability
	}

	pub fn generation(&self) -> u64 {
		self.generation
	}

	/// Removes the capability if it has not been replaced since this handle
	/// was issued, emitting one detach event.
	///
	/// Returns whether anything was removed. Disposing a superseded handle is
	/// a no-op.
	pub fn dispose(self) -> bool {
		match self.mode.upgrade() {
			Some(mode) => mode.detach(self.kind, self.capability, self.generation),
			None => false,
		}
	}
}
