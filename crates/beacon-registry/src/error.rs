//! Registry error types

use thiserror::Error;

/// Registry errors
///
/// `register` and `unregister` are total and never produce these; only
/// `find` can fail, and only at request scope.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// No stored instance matches the requested name and range
    #[error("{name} not found")]
    NotFound {
        /// Requested service name
        name: String,
    },

    /// The range expression could not be parsed
    #[error("invalid version range {range:?}: {source}")]
    InvalidVersionRange {
        /// Expression as the caller supplied it
        range: String,
        /// Parse failure from semver
        source: semver::Error,
    },
}

/// Result type for registry operations
pub type Result<T> = std::result::Result<T, RegistryError>;
