//! Capability kinds and the typed capability map.
//!
//! Each kind is a marker type implementing [`CapabilityKind`], tying a stable
//! name to the trait object that implements it. [`CapabilitySet`] stores at
//! most one support per kind together with the generation it was installed
//! under; removal compares generations, never pointer identity.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use glot_primitives::{BoxFutureStatic, DEFAULT_WORD_REGEX};
use glot_worker::WorkerError;
use regex::Regex;
use thiserror::Error;

/// A kind of capability a mode may expose.
pub trait CapabilityKind: 'static {
	/// Trait object implementing this capability.
	type Support: ?Sized + Send + Sync + 'static;
	/// Stable name carried in change events.
	const NAME: &'static str;
}

/// One token produced by a [`TokenizationSupport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
	/// Byte offset within the tokenized line.
	pub start: usize,
	pub kind: String,
}

/// Splits lines into tokens.
pub trait TokenizationSupport: Send + Sync {
	fn tokenize(&self, line: &str) -> Vec<Token>;
}

/// One completion candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suggestion {
	pub label: String,
	pub detail: Option<String>,
}

impl Suggestion {
	pub fn new(label: impl Into<String>) -> Self {
		Self {
			label: label.into(),
			detail: None,
		}
	}
}

/// Failure while computing suggestions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SuggestError {
	#[error(transparent)]
	Worker(#[from] WorkerError),
	#[error("suggestions unavailable: {0}")]
	Unavailable(String),
}

/// Produces completion candidates, possibly asynchronously.
pub trait SuggestSupport: Send + Sync {
	/// Characters that trigger suggestions when typed.
	fn trigger_characters(&self) -> &[char] {
		&[]
	}

	fn suggest(&self, text: String, offset: usize) -> BoxFutureStatic<Result<Vec<Suggestion>, SuggestError>>;
}

/// Language-aware editing details.
pub trait RichEditSupport: Send + Sync {
	/// Regex matching one word of this language.
	fn word_definition(&self) -> &Regex {
		&DEFAULT_WORD_REGEX
	}

	fn line_comment(&self) -> Option<&str> {
		None
	}
}

/// Tokenization capability.
pub enum Tokenization {}

impl CapabilityKind for Tokenization {
	type Support = dyn TokenizationSupport;
	const NAME: &'static str = "tokenization";
}

/// Suggestion capability.
pub enum Suggest {}

impl CapabilityKind for Suggest {
	type Support = dyn SuggestSupport;
	const NAME: &'static str = "suggest";
}

/// Rich editing capability.
pub enum RichEdit {}

impl CapabilityKind for RichEdit {
	type Support = dyn RichEditSupport;
	const NAME: &'static str = "rich_edit";
}

/// Monotonic generation clock for capability installs.
#[derive(Debug, Default)]
pub(crate) struct GenerationClock {
	next: AtomicU64,
}

impl GenerationClock {
	/// Returns the next generation ID, starting at 1.
	pub fn next(&self) -> u64 {
		self.next.fetch_add(1, Ordering::AcqRel).wrapping_add(1)
	}
}

struct CapabilitySlot {
	name: &'static str,
	generation: u64,
	/// Always an `Arc<K::Support>` for the slot's kind.
	support: Box<dyn Any + Send + Sync>,
}

/// Sparse map from capability kind to its installed support.
#[derive(Default)]
pub struct CapabilitySet {
	slots: HashMap<TypeId, CapabilitySlot>,
}

impl std::fmt::Debug for CapabilitySet {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_map().entries(self.slots.values().map(|slot| (slot.name, slot.generation))).finish()
	}
}

impl CapabilitySet {
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns the installed support for `K`.
	pub fn get<K: CapabilityKind>(&self) -> Option<Arc<K::Support>> {
		self.slots.get(&TypeId::of::<K>())?.support.downcast_ref::<Arc<K::Support>>().cloned()
	}

	/// Returns the generation the support for `K` was installed under.
	pub fn generation<K: CapabilityKind>(&self) -> Option<u64> {
		self.slots.get(&TypeId::of::<K>()).map(|slot| slot.generation)
	}

	pub fn contains<K: CapabilityKind>(&self) -> bool {
		self.slots.contains_key(&TypeId::of::<K>())
	}

	/// Installs `support` for `K`, replacing any previous support.
	///
	/// Returns the generation of the replaced support.
	pub fn insert<K: CapabilityKind>(&mut self, support: Arc<K::Support>, generation: u64) -> Option<u64> {
		let slot = CapabilitySlot {
			name: K::NAME,
			generation,
			support: Box::new(support),
		};
		self.slots.insert(TypeId::of::<K>(), slot).map(|prev| prev.generation)
	}

	/// Removes the support for `kind` only if it is still the one installed
	/// under `generation`.
	pub(crate) fn remove_if_current(&mut self, kind: TypeId, generation: u64) -> bool {
		if self.slots.get(&kind).is_some_and(|slot| slot.generation == generation) {
			self.slots.remove(&kind);
			return true;
		}
		false
	}

	/// Names of installed capabilities, sorted.
	pub fn names(&self) -> Vec<&'static str> {
		let mut names: Vec<_> = self.slots.values().map(|slot| slot.name).collect();
		names.sort_unstable();
		names
	}

	pub fn len(&self) -> usize {
		self.slots.len()
	}

	pub fn is_empty(&self) -> bool {
		self.slots.is_empty()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	struct Words;

	impl TokenizationSupport for Words {
		fn tokenize(&self, line: &str) -> Vec<Token> {
			DEFAULT_WORD_REGEX
				.find_iter(line)
				.map(|m| Token {
					start: m.start(),
					kind: "word".into(),
				})
				.collect()
		}
	}

	struct Plain;

	impl RichEditSupport for Plain {}

	#[test]
	fn get_returns_support_of_matching_kind() {
		let mut set = CapabilitySet::new();
		set.insert::<Tokenization>(Arc::new(Words), 1);

		let support = set.get::<Tokenization>().unwrap();
		assert_eq!(support.tokenize("a bc").len(), 2);
		assert!(set.get::<RichEdit>().is_none());
		assert_eq!(set.names(), ["tokenization"]);
	}

	#[test]
	fn insert_reports_replaced_generation() {
		let mut set = CapabilitySet::new();
		assert_eq!(set.insert::<RichEdit>(Arc::new(Plain), 1), None);
		assert_eq!(set.insert::<RichEdit>(Arc::new(Plain), 2), Some(1));
		assert_eq!(set.generation::<RichEdit>(), Some(2));
	}

	#[test]
	fn remove_ignores_stale_generation() {
		let mut set = CapabilitySet::new();
		set.insert::<RichEdit>(Arc::new(Plain), 1);
		set.insert::<RichEdit>(Arc::new(Plain), 2);

		assert!(!set.remove_if_current(TypeId::of::<RichEdit>(), 1));
		assert!(set.contains::<RichEdit>());
		assert!(set.remove_if_current(TypeId::of::<RichEdit>(), 2));
		assert!(set.is_empty());
	}

	#[test]
	fn default_rich_edit_uses_default_word_regex() {
		assert!(Plain.word_definition().is_match("word"));
		assert_eq!(Plain.line_comment(), None);
	}

	#[test]
	fn generation_clock_starts_at_one() {
		let clock = GenerationClock::default();
		assert_eq!(clock.next(), 1);
		assert_eq!(clock.next(), 2);
	}
}
