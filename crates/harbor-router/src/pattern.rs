//! Path pattern parsing and matching
//!
//! Patterns are parsed once at registration time into a segment list;
//! malformed patterns fail there, never at request time. Matching is pure
//! segment comparison: same segment count, literals equal, `:name`
//! segments bind any single non-empty segment.

use harbor_core::{Error, Result};
use std::collections::HashMap;
use std::fmt;

/// One parsed pattern segment
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Must equal the incoming segment exactly
    Literal(String),
    /// Matches any single non-empty segment and binds it under this name
    Param(String),
}

/// A parsed path pattern, e.g. `/users/:id`
#[derive(Debug, Clone)]
pub struct PathPattern {
    raw: String,
    segments: Vec<Segment>,
}

impl PathPattern {
    /// Parse a pattern, rejecting malformed input.
    ///
    /// Rejected: missing leading `/`, empty parameter names (`/users/:`),
    /// parameter markers not at the start of a segment (`/us:ers`), and
    /// duplicate parameter names.
    pub fn parse(pattern: &str) -> Result<Self> {
        let invalid = |reason: &str| Error::InvalidPattern {
            pattern: pattern.to_string(),
            reason: reason.to_string(),
        };

        if !pattern.starts_with('/') {
            return Err(invalid("must start with '/'"));
        }

        let mut segments = Vec::new();
        let mut seen_params: Vec<&str> = Vec::new();

        for part in pattern.split('/').filter(|s| !s.is_empty()) {
            if let Some(name) = part.strip_prefix(':') {
                if name.is_empty() {
                    return Err(invalid("empty parameter name"));
                }
                if name.contains(':') {
                    return Err(invalid("parameter marker inside segment"));
                }
                if seen_params.contains(&name) {
                    return Err(invalid("duplicate parameter name"));
                }
                seen_params.push(name);
                segments.push(Segment::Param(name.to_string()));
            } else if part.contains(':') {
                return Err(invalid("parameter marker must start a segment"));
            } else {
                segments.push(Segment::Literal(part.to_string()));
            }
        }

        Ok(Self {
            raw: pattern.to_string(),
            segments,
        })
    }

    /// Match an incoming path, binding parameter values on success
    pub fn match_path(&self, path: &str) -> Option<HashMap<String, String>> {
        let parts: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        if parts.len() != self.segments.len() {
            return None;
        }

        let mut params = HashMap::new();
        for (segment, part) in self.segments.iter().zip(&parts) {
            match segment {
                Segment::Literal(lit) => {
                    if lit != part {
                        return None;
                    }
                }
                Segment::Param(name) => {
                    params.insert(name.clone(), (*part).to_string());
                }
            }
        }

        Some(params)
    }

    /// The pattern as registered
    pub fn raw(&self) -> &str {
        &self.raw
    }
}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
