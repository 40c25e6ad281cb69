//! Schema subsystem faults
//!
//! These are engine faults, not validation findings: an engine with an
//! unreadable or uncompilable schema set must not come up. Findings about
//! the *validated document* go through the results accumulator instead.

use thiserror::Error;

/// Result type for schema store operations
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Faults raised while loading or compiling the schema resource set.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// No schema resource under that name
    #[error("Schema not found: {0}")]
    NotFound(String),

    /// Schema directory unreadable
    #[error("Failed to read schema directory {dir}: {source}")]
    DirectoryUnreadable {
        dir: String,
        #[source]
        source: std::io::Error,
    },

    /// A schema file exists but is not valid JSON
    #[error("Malformed schema file {file}: {reason}")]
    Malformed { file: String, reason: String },

    /// A schema file parsed but does not compile as draft-07
    #[error("Failed to compile schema {file}: {reason}")]
    Compile { file: String, reason: String },
}
