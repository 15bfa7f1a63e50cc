//! Language modes and their capabilities.
//!
//! A [`Mode`] represents one language. Subsystems attach capabilities
//! (tokenization, suggestions, rich editing) to it independently and at any
//! time; each change is announced to listeners synchronously. A mode also
//! hands out a [`SimplifiedMode`], a read-only projection that mirrors the
//! source's tokenization capability and re-emits its change events.
//!
//! # Architecture
//!
//! * [`capability`]: Capability kinds, support traits and the typed capability map
//! * [`event`]: Change events, listener lists and subscriptions
//! * [`mode`]: The [`LanguageMode`] surface and the [`Mode`] capability host
//! * [`simplified`]: The simplified projection
//! * [`registry`]: Per-capability registries keyed by mode id
//! * [`worker_backed`]: Modes whose suggestions are served by a background worker

pub mod capability;
pub mod event;
pub mod mode;
pub mod registry;
pub mod simplified;
pub mod worker_backed;

pub use capability::{
	CapabilityKind, CapabilitySet, RichEdit, RichEditSupport, Suggest, SuggestError, SuggestSupport, Suggestion, Token,
	Tokenization, TokenizationSupport,
};
pub use event::{CapabilityChange, ChangeListener, ModeChangeEvent, Subscription};
pub use glot_primitives::ModeId;
pub use mode::{CapabilityHandle, LanguageMode, Mode};
pub use registry::SupportRegistry;
pub use simplified::{SIMPLIFIED_PREFIX, SimplifiedMode};
pub use worker_backed::{SuggestWorker, WorkerBackedMode};
