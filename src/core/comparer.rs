//! String comparison policies supplied by callers.
//!
//! Dictionaries and interning scopes are parameterized by a comparer on both
//! sides of the wire; the comparer itself is never carried in the payload.
//! Case folding uses Unicode simple lowercasing, which matches on both sides
//! by construction since both run the same fold.

use std::borrow::Cow;

/// How two string keys are considered equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StringComparer {
    /// Byte-for-byte equality.
    Ordinal,
    /// Case-insensitive equality.
    OrdinalIgnoreCase,
}

impl StringComparer {
    /// Returns the canonical lookup form of `value` under this comparer.
    /// Two strings are comparer-equal iff their folds are identical.
    pub fn fold<'a>(&self, value: &'a str) -> Cow<'a, str> {
        match self {
            StringComparer::Ordinal => Cow::Borrowed(value),
            StringComparer::OrdinalIgnoreCase => Cow::Owned(value.to_lowercase()),
        }
    }

    /// Tests two strings for equality under this comparer.
    pub fn eq(&self, a: &str, b: &str) -> bool {
        match self {
            StringComparer::Ordinal => a == b,
            StringComparer::OrdinalIgnoreCase => self.fold(a) == self.fold(b),
        }
    }
}
