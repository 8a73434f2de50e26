//! Mergeable, severity-tagged rule output.
//!
//! [`RuleOutput`] is an append-only message list. Merging concatenates the
//! inputs in call order, which makes [`RuleOutput::empty`] a two-sided
//! identity and `merge` associative: outputs can be combined in any grouping
//! without changing the result.

use dtr_core::RuleId;
use serde::{Deserialize, Serialize};

/// Classification of an output message, ordered `Info < Warning < Error`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Informational.
    Info,
    /// Should be addressed but does not invalidate the element.
    Warning,
    /// Invalidates the element.
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// One finding produced by a rule.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OutputMessage {
    /// Human-readable text.
    pub text: String,
    /// Severity of the finding.
    pub severity: Severity,
    /// Rule that produced the message, stamped by the engine when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule: Option<RuleId>,
    /// Ids of the elements the message refers to.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub related: Vec<String>,
}

impl OutputMessage {
    /// Create a message without attribution or related elements.
    pub fn new(severity: Severity, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            severity,
            rule: None,
            related: Vec::new(),
        }
    }

    /// Attribute the message to a rule.
    #[must_use]
    pub fn with_rule(mut self, rule: RuleId) -> Self {
        self.rule = Some(rule);
        self
    }

    /// Add a related element id.
    #[must_use]
    pub fn related_to(mut self, element_id: impl Into<String>) -> Self {
        self.related.push(element_id.into());
        self
    }
}

impl std::fmt::Display for OutputMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.severity)?;
        if let Some(rule) = &self.rule {
            write!(f, " {rule}:")?;
        }
        write!(f, " {}", self.text)
    }
}

/// Accumulated report of one or more rule executions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleOutput {
    messages: Vec<OutputMessage>,
}

impl RuleOutput {
    /// The merge identity.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Output holding a single [`Severity::Info`] message.
    pub fn info(text: impl Into<String>) -> Self {
        Self::empty().with_message(OutputMessage::new(Severity::Info, text))
    }

    /// Output holding a single [`Severity::Warning`] message.
    pub fn warning(text: impl Into<String>) -> Self {
        Self::empty().with_message(OutputMessage::new(Severity::Warning, text))
    }

    /// Output holding a single [`Severity::Error`] message.
    pub fn error(text: impl Into<String>) -> Self {
        Self::empty().with_message(OutputMessage::new(Severity::Error, text))
    }

    /// Append a message.
    #[must_use]
    pub fn with_message(mut self, message: OutputMessage) -> Self {
        self.messages.push(message);
        self
    }

    /// Concatenate `other` after `self`.
    #[must_use]
    pub fn merge(mut self, other: Self) -> Self {
        self.append(other);
        self
    }

    /// Concatenate any number of outputs in iteration order.
    pub fn merge_all(outputs: impl IntoIterator<Item = Self>) -> Self {
        outputs.into_iter().fold(Self::empty(), Self::merge)
    }

    /// Concatenate `other` after `self` in place.
    pub fn append(&mut self, other: Self) {
        self.messages.extend(other.messages);
    }

    /// Messages in insertion order.
    pub fn messages(&self) -> &[OutputMessage] {
        &self.messages
    }

    /// Iterate over messages in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, OutputMessage> {
        self.messages.iter()
    }

    /// Number of messages.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Returns `true` if there are no messages.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Highest severity present, if any.
    pub fn max_severity(&self) -> Option<Severity> {
        self.messages.iter().map(|m| m.severity).max()
    }

    /// Returns `true` if any message has [`Severity::Error`].
    pub fn has_errors(&self) -> bool {
        self.max_severity() == Some(Severity::Error)
    }

    /// Number of messages with exactly `severity`.
    pub fn count(&self, severity: Severity) -> usize {
        self.messages.iter().filter(|m| m.severity == severity).count()
    }

    /// Messages produced by `rule`.
    pub fn by_rule<'a>(&'a self, rule: &'a str) -> impl Iterator<Item = &'a OutputMessage> + 'a {
        self.messages
            .iter()
            .filter(move |m| m.rule.as_ref().is_some_and(|r| r.as_str() == rule))
    }

    /// Stamp `rule` on every message that has no attribution yet.
    #[must_use]
    pub fn attributed_to(mut self, rule: &RuleId) -> Self {
        for message in &mut self.messages {
            if message.rule.is_none() {
                message.rule = Some(rule.clone());
            }
        }
        self
    }
}

impl FromIterator<OutputMessage> for RuleOutput {
    fn from_iter<I: IntoIterator<Item = OutputMessage>>(iter: I) -> Self {
        Self {
            messages: iter.into_iter().collect(),
        }
    }
}

impl Extend<OutputMessage> for RuleOutput {
    fn extend<I: IntoIterator<Item = OutputMessage>>(&mut self, iter: I) {
        self.messages.extend(iter);
    }
}

impl IntoIterator for RuleOutput {
    type Item = OutputMessage;
    type IntoIter = std::vec::IntoIter<OutputMessage>;

    fn into_iter(self) -> Self::IntoIter {
        self.messages.into_iter()
    }
}

impl<'a> IntoIterator for &'a RuleOutput {
    type Item = &'a OutputMessage;
    type IntoIter = std::slice::Iter<'a, OutputMessage>;

    fn into_iter(self) -> Self::IntoIter {
        self.messages.iter()
    }
}

impl std::fmt::Display for RuleOutput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for message in &self.messages {
            writeln!(f, "{message}")?;
        }
        Ok(())
    }
}
