//! The fluent validation chain and its report

use crate::rules::Rule;
use serde::ser::{Serialize, SerializeMap, Serializer};

/// Outcome of a [`Validate::check`] run.
///
/// Keys appear in the order their chains were opened; messages under a key
/// appear in the order their rules were appended. Serializes as a JSON
/// object mapping field name to an array of messages, so an empty report
/// serializes as `{}`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    entries: Vec<(String, Vec<String>)>,
}

impl ValidationReport {
    /// True when every rule passed
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of fields that failed at least one rule
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Messages recorded for a field, empty when the field passed
    pub fn messages(&self, key: &str) -> &[String] {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, msgs)| msgs.as_slice())
            .unwrap_or(&[])
    }

    /// Failed field names in the order their chains were opened
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    fn push(&mut self, key: &str, message: String) {
        match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some((_, msgs)) => msgs.push(message),
            None => self.entries.push((key.to_string(), vec![message])),
        }
    }
}

impl Serialize for ValidationReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, messages) in &self.entries {
            map.serialize_entry(key, messages)?;
        }
        map.end()
    }
}

struct RuleEntry {
    rule: Rule,
    message: Option<String>,
}

struct FieldChain {
    key: String,
    value: String,
    rules: Vec<RuleEntry>,
}

/// Fluent accumulator of per-field validation rules.
///
/// `that` opens a chain for a field, rule methods append to the open
/// chain, and `check` evaluates everything at once. Every rule always
/// runs; an early failure never suppresses later rules or later fields.
/// Nothing in the chain raises, so a script can build a full chain and
/// branch once on the report.
///
/// ```
/// use harbor_validate::Validate;
///
/// let report = Validate::new()
///     .that("email", "someone@example.com")
///     .is_required()
///     .is_email()
///     .that("password", "hunter2!")
///     .is_between(8, 64)
///     .check();
/// assert!(report.is_empty());
/// ```
#[must_use = "a validation chain does nothing until check() is called"]
pub struct Validate {
    chains: Vec<FieldChain>,
}

impl std::fmt::Debug for Validate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Validate")
            .field("fields", &self.chains.len())
            .finish()
    }
}

impl Validate {
    /// Start an empty chain
    pub fn new() -> Self {
        Self { chains: Vec::new() }
    }

    /// Open a chain for a field.
    ///
    /// An absent value (a form field the client never sent) is validated
    /// as the empty string, which `is_required` then fails.
    pub fn that(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.chains.push(FieldChain {
            key: key.into(),
            value: value.into(),
            rules: Vec::new(),
        });
        self
    }

    /// Open a chain for a field whose value may be absent
    pub fn that_opt(self, key: impl Into<String>, value: Option<impl Into<String>>) -> Self {
        match value {
            Some(value) => self.that(key, value),
            None => self.that(key, ""),
        }
    }

    /// Require a non-empty value
    pub fn is_required(self) -> Self {
        self.push_rule(Rule::Required)
    }

    /// Require a character count within `[min, max]`, both inclusive
    pub fn is_between(self, min: usize, max: usize) -> Self {
        self.push_rule(Rule::Between { min, max })
    }

    /// Require an email-shaped value
    pub fn is_email(self) -> Self {
        self.push_rule(Rule::Email)
    }

    /// Require at least one lowercase letter
    pub fn has_lower(self) -> Self {
        self.push_rule(Rule::HasLower)
    }

    /// Require at least one uppercase letter
    pub fn has_upper(self) -> Self {
        self.push_rule(Rule::HasUpper)
    }

    /// Require at least one digit
    pub fn has_digit(self) -> Self {
        self.push_rule(Rule::HasDigit)
    }

    /// Require at least one character from the default special set
    pub fn has_special(self) -> Self {
        self.push_rule(Rule::has_special_default())
    }

    /// Require at least one character from an explicit set
    pub fn has_special_in(self, chars: impl Into<String>) -> Self {
        self.push_rule(Rule::HasSpecial {
            chars: chars.into(),
        })
    }

    /// Override the failure message of the most recently appended rule.
    ///
    /// Applies to that one rule only; earlier rules on the same field keep
    /// their messages. Without an open rule this is a no-op.
    pub fn msg(mut self, text: impl Into<String>) -> Self {
        match self.chains.last_mut().and_then(|c| c.rules.last_mut()) {
            Some(entry) => entry.message = Some(text.into()),
            None => tracing::debug!("msg() called before any rule, ignoring"),
        }
        self
    }

    /// Evaluate every rule on every field, in order
    pub fn check(self) -> ValidationReport {
        let mut report = ValidationReport::default();
        for chain in &self.chains {
            for entry in &chain.rules {
                if !entry.rule.evaluate(&chain.value) {
                    let message = entry
                        .message
                        .clone()
                        .unwrap_or_else(|| entry.rule.default_message(&chain.key));
                    report.push(&chain.key, message);
                }
            }
        }

        if !report.is_empty() {
            tracing::debug!(fields = report.len(), "validation failed");
        }
        report
    }

    fn push_rule(mut self, rule: Rule) -> Self {
        match self.chains.last_mut() {
            Some(chain) => chain.rules.push(RuleEntry {
                rule,
                message: None,
            }),
            None => tracing::debug!("rule appended before that(), ignoring"),
        }
        self
    }
}

impl Default for Validate {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_passing_chain_yields_empty_report() {
        let report = Validate::new()
            .that("email", "someone@example.com")
            .is_required()
            .is_email()
            .check();

        assert!(report.is_empty());
        assert_eq!(report.len(), 0);
        assert!(report.messages("email").is_empty());
    }

    #[test]
    fn test_two_fields_fail_independently() {
        let report = Validate::new()
            .that("email", "bad")
            .is_email()
            .that("age", "5")
            .is_between(18, 99)
            .check();

        assert_eq!(report.len(), 2);
        assert_eq!(report.keys().collect::<Vec<_>>(), vec!["email", "age"]);
        assert_eq!(report.messages("email").len(), 1);
        assert_eq!(report.messages("age").len(), 1);
    }

    #[test]
    fn test_all_rules_run_even_after_a_failure() {
        let report = Validate::new()
            .that("password", "")
            .is_required()
            .is_between(8, 64)
            .has_upper()
            .check();

        assert_eq!(report.messages("password").len(), 3);
    }

    #[test]
    fn test_message_order_follows_rule_order() {
        let report = Validate::new()
            .that("password", "short")
            .is_between(8, 64)
            .has_digit()
            .check();

        let messages = report.messages("password");
        assert!(messages[0].contains("between 8 and 64"));
        assert!(messages[1].contains("digit"));
    }

    #[test]
    fn test_msg_overrides_only_the_last_rule() {
        let report = Validate::new()
            .that("password", "")
            .is_required()
            .is_between(8, 64)
            .msg("pick a longer password")
            .check();

        let messages = report.messages("password");
        assert_eq!(messages[0], "password is required");
        assert_eq!(messages[1], "pick a longer password");
    }

    #[test]
    fn test_custom_special_set() {
        let report = Validate::new()
            .that("pin", "a$bc")
            .has_special_in("!@#")
            .check();
        assert_eq!(report.messages("pin").len(), 1);

        let report = Validate::new()
            .that("pin", "a#bc")
            .has_special_in("!@#")
            .check();
        assert!(report.is_empty());
    }

    #[test]
    fn test_default_special_set() {
        let report = Validate::new().that("pw", "abc123").has_special().check();
        assert_eq!(report.messages("pw").len(), 1);

        let report = Validate::new().that("pw", "abc_123").has_special().check();
        assert!(report.is_empty());
    }

    #[test]
    fn test_absent_value_fails_required() {
        let report = Validate::new()
            .that_opt("name", None::<String>)
            .is_required()
            .check();
        assert_eq!(report.messages("name").len(), 1);
    }

    #[test]
    fn test_reopened_key_merges_messages() {
        let report = Validate::new()
            .that("email", "")
            .is_required()
            .that("email", "bad")
            .is_email()
            .check();

        assert_eq!(report.len(), 1);
        assert_eq!(report.messages("email").len(), 2);
    }

    #[test]
    fn test_stray_calls_never_panic() {
        let report = Validate::new().is_required().msg("ignored").check();
        assert!(report.is_empty());
    }

    #[test]
    fn test_report_serializes_as_object_in_order() {
        let report = Validate::new()
            .that("email", "bad")
            .is_email()
            .that("age", "5")
            .is_between(18, 99)
            .check();

        let json = serde_json::to_string(&report).unwrap();
        assert!(json.starts_with(r#"{"email":"#));
        assert!(json.contains(r#""age":["#));

        let empty = serde_json::to_string(&ValidationReport::default()).unwrap();
        assert_eq!(empty, "{}");
    }
}
