//! Money collaborator: locale-aware currency formatting

use crate::Result;

/// Formatting locale.
///
/// Replaces the original arity-overloaded `formatted` call; both fields
/// default to the host locale when absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MoneyFormat {
    /// ISO 639 language code, e.g. "en"
    pub language: Option<String>,
    /// ISO 3166 country code, e.g. "US"
    pub country: Option<String>,
}

/// Opaque currency formatting collaborator
pub trait Money: Send + Sync {
    /// Format a monetary value for the given locale
    fn formatted(&self, value: f64, format: &MoneyFormat) -> Result<String>;
}
