use once_cell::sync::Lazy;
use regex::Regex;

/// Characters that separate words unless explicitly allowed.
pub const USUAL_WORD_SEPARATORS: &str = "`~!@#$%^&*()-=+[{]}\\|;:'\",.<>/?";

/// Word regex with every usual separator in effect.
pub static DEFAULT_WORD_REGEX: Lazy<Regex> = Lazy::new(|| create_word_regex("").expect("default word pattern is valid"));

/// Builds a word regex that treats characters in `allow_in_words` as part of
/// words instead of separators.
///
/// A word is either a decimal literal such as `-1.5e3` or a run of characters
/// that are neither separators nor whitespace.
pub fn create_word_regex(allow_in_words: &str) -> Result<Regex, regex::Error> {
	let mut source = String::from(r"(-?\d*\.\d\w*)|([^");
	for sep in USUAL_WORD_SEPARATORS.chars().filter(|c| !allow_in_words.contains(*c)) {
		source.push_str(&regex::escape(sep.encode_utf8(&mut [0; 4])));
	}
	source.push_str(r"\s]+)");
	Regex::new(&source)
}

/// A word located inside a line of text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordAtPosition<'a> {
	pub word: &'a str,
	/// Byte offset of the first character.
	pub start: usize,
	/// Byte offset one past the last character.
	pub end: usize,
}

/// Returns the word that contains `offset` or ends exactly at it.
pub fn word_at<'a>(text: &'a str, offset: usize, regex: &Regex) -> Option<WordAtPosition<'a>> {
	regex
		.find_iter(text)
		.take_while(|m| m.start() <= offset)
		.find(|m| offset <= m.end())
		.map(|m| WordAtPosition {
			word: m.as_str(),
			start: m.start(),
			end: m.end(),
		})
}
