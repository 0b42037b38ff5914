//! # Harbor Validate
//!
//! Fluent, panic-free field validation for Harbor scripts:
//! - `that(key, value)` opens a chain for one field, rule methods append
//!   to it in order
//! - `check()` evaluates every rule on every field and returns an ordered
//!   [`ValidationReport`]; nothing in the chain ever raises
//! - Per-rule message overrides via `msg`
//!
//! The report serializes as a plain JSON object (field name to message
//! array) so scripts can hand it straight back to the client.

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub
)]

pub mod chain;
pub mod rules;

pub use chain::{Validate, ValidationReport};
pub use rules::{Rule, DEFAULT_SPECIAL_CHARS};
