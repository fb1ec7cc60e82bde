use thiserror::Error;

/// Storage driver errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// A declared unique index rejected the write. This is the authoritative
    /// uniqueness signal: callers must map it to their conflict taxonomy
    /// instead of trusting any check-then-act sequence of their own.
    #[error("unique index violated on {unit}.{field}")]
    UniqueViolation { unit: String, field: String },

    /// The named storage unit does not exist
    #[error("storage unit '{0}' not found")]
    UnitNotFound(String),

    /// Any other backend failure
    #[error("storage backend error: {0}")]
    Backend(String),
}
