use thiserror::Error;

/// Smallest base accepted by [`is_digit`].
pub const MIN_RADIX: u32 = 1;
/// Largest base accepted by [`is_digit`].
pub const MAX_RADIX: u32 = 16;

/// Base passed to [`is_digit`] was outside `[1, 16]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("radix {0} is outside the supported range 1..=16")]
pub struct RadixError(pub u32);

/// Returns whether `ch` is a valid digit in `base`.
///
/// Alphabetic digits (bases above 10) match case-insensitively. Base 1 only
/// accepts `'0'`.
///
/// # Errors
///
/// Returns [`RadixError`] when `base` is not in `[1, 16]`.
pub fn is_digit(ch: char, base: u32) -> Result<bool, RadixError> {
	match base {
		1 => Ok(ch == '0'),
		2..=MAX_RADIX => Ok(ch.to_digit(base).is_some()),
		_ => Err(RadixError(base)),
	}
}
