#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! # DTR Engine
//!
//! Runs the rules of a [`PrecomputedRuleGraph`](dtr_graph::PrecomputedRuleGraph)
//! against registry elements.
//!
//! - [`RuleEngine::execute`] runs one element and returns the merged output
//! - [`RuleEngine::execute_with_cancellation`] stops between rules when asked
//!   and returns an [`ExecutionReport`] with the journal
//! - [`RuleEngine::execute_batch`] fans many elements out over `tokio`
//!   blocking workers
//!
//! Rule faults never escape as errors: they become error messages, and the
//! faulting rule's error handlers run before the chain continues.

mod batch;
pub mod config;
pub mod engine;
pub mod error;
mod invocation;
pub mod journal;
pub mod report;
pub mod status;
pub mod transition;

pub use config::EngineConfig;
pub use engine::RuleEngine;
pub use error::EngineError;
pub use journal::JournalEntry;
pub use report::ExecutionReport;
pub use status::{InvocationStatus, RuleOutcome};

/// Serde helper for `Option<Duration>` serialized as milliseconds.
pub(crate) mod serde_duration_opt {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    /// Serialize an `Option<Duration>` as an optional integer of milliseconds.
    pub fn serialize<S: Serializer>(duration: &Option<Duration>, s: S) -> Result<S::Ok, S::Error> {
        match duration {
            Some(d) => u64::try_from(d.as_millis()).unwrap_or(u64::MAX).serialize(s),
            None => s.serialize_none(),
        }
    }

    /// Deserialize an optional integer of milliseconds into `Option<Duration>`.
    /// Zero means no duration.
    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Duration>, D::Error> {
        let opt: Option<u64> = Option::deserialize(d)?;
        Ok(opt.filter(|&ms| ms > 0).map(Duration::from_millis))
    }
}

/// Serde helper for booleans that also accepts `1`/`0`, `yes`/`no` and
/// `on`/`off`, the spellings environment variables use.
pub(crate) mod serde_flag {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(i64),
        Text(String),
    }

    /// Parse a textual flag.
    pub fn parse(raw: &str) -> Option<bool> {
        match raw.trim().to_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Some(true),
            "0" | "false" | "no" | "off" => Some(false),
            _ => None,
        }
    }

    /// Deserialize a flag from a bool, `0`/`1` or a textual spelling.
    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
        match Flag::deserialize(d)? {
            Flag::Bool(flag) => Ok(flag),
            Flag::Int(1) => Ok(true),
            Flag::Int(0) => Ok(false),
            Flag::Int(other) => Err(D::Error::custom(format!("invalid flag: {other}"))),
            Flag::Text(raw) => {
                parse(&raw).ok_or_else(|| D::Error::custom(format!("invalid flag: {raw}")))
            }
        }
    }
}
