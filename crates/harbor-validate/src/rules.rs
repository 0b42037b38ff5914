//! Validation predicates and their default messages

use once_cell::sync::Lazy;
use regex::Regex;

/// Special characters checked by `has_special` when no explicit set is
/// given.
pub const DEFAULT_SPECIAL_CHARS: &str = "!@#$%^&*()-_=+[]{}|;:'\",.<>/?~";

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email regex is valid"));

/// A single validation predicate with constraints baked in
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rule {
    /// Value must be non-empty
    Required,
    /// Character count must be within `[min, max]`, both inclusive.
    ///
    /// Comparison is always on the textual value's length, never a parsed
    /// numeric value; `"5"` has length 1 regardless of what it denotes.
    Between {
        /// Minimum length, inclusive
        min: usize,
        /// Maximum length, inclusive
        max: usize,
    },
    /// Value must look like an email address
    Email,
    /// Value must contain a lowercase letter
    HasLower,
    /// Value must contain an uppercase letter
    HasUpper,
    /// Value must contain an ASCII digit
    HasDigit,
    /// Value must contain one of the given characters
    HasSpecial {
        /// The exact character set to check against
        chars: String,
    },
}

impl Rule {
    /// Check a special-character rule against the default set
    pub fn has_special_default() -> Self {
        Self::HasSpecial {
            chars: DEFAULT_SPECIAL_CHARS.to_string(),
        }
    }

    /// True when the value satisfies this rule
    pub fn evaluate(&self, value: &str) -> bool {
        match self {
            Self::Required => !value.is_empty(),
            Self::Between { min, max } => {
                let len = value.chars().count();
                len >= *min && len <= *max
            }
            Self::Email => EMAIL_RE.is_match(value),
            Self::HasLower => value.chars().any(|c| c.is_lowercase()),
            Self::HasUpper => value.chars().any(|c| c.is_uppercase()),
            Self::HasDigit => value.chars().any(|c| c.is_ascii_digit()),
            Self::HasSpecial { chars } => value.chars().any(|c| chars.contains(c)),
        }
    }

    /// Message reported when the rule fails and no override was given
    pub fn default_message(&self, key: &str) -> String {
        match self {
            Self::Required => format!("{key} is required"),
            Self::Between { min, max } => {
                format!("{key} must be between {min} and {max} characters long")
            }
            Self::Email => format!("{key} must be a valid email address"),
            Self::HasLower => format!("{key} must contain a lowercase letter"),
            Self::HasUpper => format!("{key} must contain an uppercase letter"),
            Self::HasDigit => format!("{key} must contain a digit"),
            Self::HasSpecial { chars } => {
                format!("{key} must contain one of {chars}")
            }
        }
    }
}
