//! Logger initialization errors.

/// Errors raised while installing the global subscriber.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LogError {
    /// The level directive could not be parsed.
    #[error("invalid filter '{filter}': {reason}")]
    Filter {
        /// The rejected directive.
        filter: String,
        /// Parser message.
        reason: String,
    },

    /// A global subscriber was already installed.
    #[error("logger already initialized: {0}")]
    AlreadyInitialized(String),

    /// An unknown format name.
    #[error("unknown log format '{0}' (expected pretty, compact or json)")]
    UnknownFormat(String),
}
