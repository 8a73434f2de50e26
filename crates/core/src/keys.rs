use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Maximum allowed length for a [`RuleId`].
const RULE_ID_MAX_LEN: usize = 128;

/// Errors from constructing a [`RuleId`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RuleIdError {
    /// The input was empty or contained only whitespace.
    #[error("rule id cannot be empty or whitespace")]
    Empty,
    /// The trimmed id contains characters outside `A-Z a-z 0-9 _ - . :`.
    #[error("rule id `{0}` contains invalid characters (only alphanumerics and _ - . : allowed)")]
    InvalidCharacters(String),
    /// The trimmed id exceeds [`RULE_ID_MAX_LEN`] characters.
    #[error("rule id exceeds maximum length of {RULE_ID_MAX_LEN} characters")]
    TooLong,
}

/// A validated, globally unique identifier for a rule.
///
/// Rule ids are compared and ordered by their string value, which is what the
/// graph builder relies on to break ties between unconstrained rules. The
/// string is shared, so cloning an id never allocates.
///
/// Validation rules:
/// - Leading/trailing whitespace is trimmed.
/// - The remainder must be non-empty.
/// - Only ASCII alphanumerics and `_`, `-`, `.`, `:` are allowed.
/// - At most 128 characters.
///
/// # Examples
///
/// ```
/// use dtr_core::RuleId;
///
/// let id: RuleId = " atomic.pattern-compiles ".parse().unwrap();
/// assert_eq!(id.as_str(), "atomic.pattern-compiles");
/// assert!("has space".parse::<RuleId>().is_err());
/// ```
#[derive(Debug, Clone, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RuleId(Arc<str>);

impl RuleId {
    /// Create a new `RuleId`, trimming and validating the input.
    pub fn new(raw: &str) -> Result<Self, RuleIdError> {
        let trimmed = raw.trim();

        if trimmed.is_empty() {
            return Err(RuleIdError::Empty);
        }
        if !trimmed
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'_' | b'-' | b'.' | b':'))
        {
            return Err(RuleIdError::InvalidCharacters(trimmed.to_owned()));
        }
        if trimmed.len() > RULE_ID_MAX_LEN {
            return Err(RuleIdError::TooLong);
        }

        Ok(Self(Arc::from(trimmed)))
    }

    /// Return the inner string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for RuleId {
    type Err = RuleIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<&str> for RuleId {
    type Error = RuleIdError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<String> for RuleId {
    type Error = RuleIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<RuleId> for String {
    fn from(id: RuleId) -> Self {
        id.0.as_ref().to_owned()
    }
}

impl AsRef<str> for RuleId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::borrow::Borrow<str> for RuleId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for RuleId {
    fn eq(&self, other: &str) -> bool {
        &*self.0 == other
    }
}

impl PartialEq<&str> for RuleId {
    fn eq(&self, other: &&str) -> bool {
        &*self.0 == *other
    }
}
