//! Read-only projection of a mode.

use std::sync::{Arc, Weak};

use glot_primitives::ModeId;
use parking_lot::RwLock;

use crate::event::ChangeEmitter;
use crate::{ChangeListener, LanguageMode, ModeChangeEvent, Subscription, TokenizationSupport};

/// Prefix of every simplified mode id.
pub const SIMPLIFIED_PREFIX: &str = "simplified";

/// Mirrors the tokenization capability of a source mode under the id
/// `simplified:<source id>`.
///
/// The projection holds only a weak reference to its source. When the source
/// announces changes, the projection re-reads the source's tokenization
/// support and then re-emits the event to its own listeners, so it never
/// runs ahead of the source. A source without change notification yields a
/// snapshot taken at construction.
pub struct SimplifiedMode {
	id: ModeId,
	this: Weak<SimplifiedMode>,
	source: Weak<dyn LanguageMode>,
	tokenization: RwLock<Option<Arc<dyn TokenizationSupport>>>,
	changes: ChangeEmitter,
	/// `None` for snapshots; otherwise kept alive for the projection's lifetime.
	source_subscription: Option<Subscription>,
}

impl std::fmt::Debug for SimplifiedMode {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("SimplifiedMode")
			.field("id", &self.id)
			.field("tokenization", &self.tokenization.read().is_some())
			.field("live", &self.is_live())
			.finish_non_exhaustive()
	}
}

impl SimplifiedMode {
	/// Builds the projection of `source`; `weak_source` must point at it.
	pub(crate) fn new(source: &dyn LanguageMode, weak_source: Weak<dyn LanguageMode>) -> Arc<Self> {
		Arc::new_cyclic(|this: &Weak<Self>| {
			let listener_this = this.clone();
			let listener_source = weak_source.clone();
			let source_subscription = source.on_did_change(Arc::new(move |event: &ModeChangeEvent| {
				let (Some(this), Some(source)) = (listener_this.upgrade(), listener_source.upgrade()) else {
					return;
				};
				this.mirror(&*source, event);
			}));

			Self {
				id: source.id().derived(SIMPLIFIED_PREFIX),
				this: this.clone(),
				source: weak_source,
				tokenization: RwLock::new(source.tokenization_support()),
				changes: ChangeEmitter::default(),
				source_subscription,
			}
		})
	}

	/// Builds a standalone projection of any [`LanguageMode`].
	///
	/// Modes that cache their projection should hand out that instance
	/// instead.
	pub fn of<M: LanguageMode + 'static>(source: &Arc<M>) -> Arc<Self> {
		let weak: Weak<M> = Arc::downgrade(source);
		Self::new(&**source, weak)
	}

	pub fn id(&self) -> &ModeId {
		&self.id
	}

	/// Returns the source mode if it is still alive.
	pub fn source(&self) -> Option<Arc<dyn LanguageMode>> {
		self.source.upgrade()
	}

	/// Returns true if the projection follows source changes, false for a
	/// static snapshot.
	pub fn is_live(&self) -> bool {
		self.source_subscription.is_some()
	}

	pub fn tokenization_support(&self) -> Option<Arc<dyn TokenizationSupport>> {
		self.tokenization.read().clone()
	}

	pub fn add_change_listener(&self, listener: impl Fn(&ModeChangeEvent) + Send + Sync + 'static) -> Subscription {
		self.changes.subscribe(Arc::new(listener))
	}

	/// Static copy of the current mirrored state, detached from the source.
	fn snapshot(&self) -> Arc<Self> {
		Arc::new_cyclic(|this| Self {
			id: self.id.clone(),
			this: this.clone(),
			source: self.source.clone(),
			tokenization: RwLock::new(self.tokenization_support()),
			changes: ChangeEmitter::default(),
			source_subscription: None,
		})
	}

	fn mirror(&self, source: &dyn LanguageMode, event: &ModeChangeEvent) {
		*self.tokenization.write() = source.tokenization_support();
		tracing::trace!(mode = %self.id, capability = event.capability, change = ?event.change, "mode.simplified.mirror");
		self.changes.emit(event);
	}
}

impl LanguageMode for SimplifiedMode {
	fn id(&self) -> &ModeId {
		SimplifiedMode::id(self)
	}

	fn to_simplified(&self) -> Arc<SimplifiedMode> {
		match self.this.upgrade() {
			Some(this) => this,
			None => {
				debug_assert!(false, "SimplifiedMode is only constructed inside an Arc");
				self.snapshot()
			}
		}
	}

	fn tokenization_support(&self) -> Option<Arc<dyn TokenizationSupport>> {
		SimplifiedMode::tokenization_support(self)
	}

	fn on_did_change(&self, listener: ChangeListener) -> Option<Subscription> {
		Some(self.changes.subscribe(listener))
	}
}
