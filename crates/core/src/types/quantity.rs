//! Quantity input parsing for in-place cart edits.
//!
//! The cart view lets the user type a quantity directly. While the field is
//! being edited it may hold an empty string or garbage; the remote store must
//! only ever see a positive integer.

use serde::{Deserialize, Serialize};

/// Parsed state of a raw quantity field.
///
/// - `Empty` and `Invalid` inputs are held locally and never written through.
/// - Committing (blur) coerces anything that is not a positive integer to 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuantityInput {
    /// Field cleared mid-edit.
    Empty,
    /// A positive integer.
    Valid(u32),
    /// Not a positive integer (zero, negative, or non-numeric).
    Invalid,
}

impl QuantityInput {
    /// Parse a raw text field value.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Self::Empty;
        }
        match trimmed.parse::<u32>() {
            Ok(q) if q > 0 => Self::Valid(q),
            _ => Self::Invalid,
        }
    }

    /// Quantity to write through immediately, if any.
    ///
    /// Only a valid positive integer triggers an optimistic update and a
    /// remote write; everything else is held locally.
    #[must_use]
    pub const fn write_through(self) -> Option<u32> {
        match self {
            Self::Valid(q) => Some(q),
            Self::Empty | Self::Invalid => None,
        }
    }

    /// Quantity committed on blur. Invalid or empty input coerces to 1.
    #[must_use]
    pub const fn commit(self) -> u32 {
        match self {
            Self::Valid(q) => q,
            Self::Empty | Self::Invalid => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid() {
        assert_eq!(QuantityInput::parse("4"), QuantityInput::Valid(4));
        assert_eq!(QuantityInput::parse(" 12 "), QuantityInput::Valid(12));
    }

    #[test]
    fn test_parse_empty() {
        assert_eq!(QuantityInput::parse(""), QuantityInput::Empty);
        assert_eq!(QuantityInput::parse("   "), QuantityInput::Empty);
    }

    #[test]
    fn test_parse_invalid() {
        assert_eq!(QuantityInput::parse("0"), QuantityInput::Invalid);
        assert_eq!(QuantityInput::parse("-3"), QuantityInput::Invalid);
        assert_eq!(QuantityInput::parse("x"), QuantityInput::Invalid);
        assert_eq!(QuantityInput::parse("1.5"), QuantityInput::Invalid);
    }

    #[test]
    fn test_write_through_only_for_valid() {
        assert_eq!(QuantityInput::Valid(3).write_through(), Some(3));
        assert_eq!(QuantityInput::Empty.write_through(), None);
        assert_eq!(QuantityInput::Invalid.write_through(), None);
    }

    #[test]
    fn test_commit_coerces_to_one() {
        assert_eq!(QuantityInput::Valid(7).commit(), 7);
        assert_eq!(QuantityInput::Empty.commit(), 1);
        assert_eq!(QuantityInput::Invalid.commit(), 1);
    }
}
