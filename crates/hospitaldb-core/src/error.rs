use thiserror::Error;

/// Core error type shared across hospitaldb crates.
#[derive(Debug, Error)]
pub enum Error {
    /// The schema violates internal invariants.
    #[error("invalid schema: {0}")]
    InvalidSchema(String),
    /// Generation settings are inconsistent.
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    /// A stored value does not belong to its declared domain.
    #[error("invalid value for {column}: '{value}'")]
    InvalidValue { column: &'static str, value: String },
    /// A requested feature is not yet supported.
    #[error("unsupported: {0}")]
    Unsupported(String),
}

/// Convenience alias for results returned by hospitaldb crates.
pub type Result<T> = std::result::Result<T, Error>;
