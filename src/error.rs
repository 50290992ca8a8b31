use thiserror::Error;

/// Errors that can occur when using a `Container`
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HandleError {
    /// Attempted to store or update a container inside itself
    #[error("a container cannot be stored inside itself")]
    SelfStorage,
    /// The handle was invalidated by a previous remove
    #[error("value behind this handle was removed")]
    DeletedValue,
    /// The handle was issued by a different container
    #[error("handle was issued by a different container")]
    IdentityMismatch,
    /// No value is stored under the handle's key (fetch)
    #[error("value not found in container")]
    ValueNotFound,
    /// No value is stored under the handle's key (remove, update)
    #[error("value is missing from container")]
    MissingValue,
    /// The stored value is not of the type the handle asked for
    #[error("type mismatch: expected {expected}, found {found}")]
    TypeCast {
        expected: &'static str,
        found: &'static str,
    },
    /// An audit hook was registered under a name that is not an operation
    #[error("unknown operation: {0}")]
    UnknownOperation(String),
}

/// Convenience alias used throughout the crate
pub type Result<T> = std::result::Result<T, HandleError>;
