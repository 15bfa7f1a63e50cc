//! Core types shared by language modes and their workers.

/// Character classification helpers.
pub mod chars;
/// Async future aliases.
pub mod future;
/// Identifier types for language modes.
pub mod ids;
/// Word boundary regex construction and lookup.
pub mod words;

pub use chars::{RadixError, is_digit};
pub use future::{BoxFutureSend, BoxFutureStatic};
pub use ids::ModeId;
pub use words::{DEFAULT_WORD_REGEX, USUAL_WORD_SEPARATORS, WordAtPosition, create_word_regex, word_at};
