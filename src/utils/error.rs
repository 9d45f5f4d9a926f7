use std::fmt;

/// Error taxonomy for repository operations.
///
/// Mutations that merely matched zero documents do NOT land here; those are
/// reported as `Ok(false)` by the repositories so callers can tell "nothing
/// to do" apart from "something broke".
#[derive(Debug)]
pub enum RepoError {
    /// Null or malformed required input (e.g. a missing preferences map).
    InvalidArgument(String),
    /// No matching document for a lookup that requires one.
    NotFound(String),
    /// The store rejected or could not complete a write, uniqueness
    /// violations included.
    OperationFailed(String),
}

impl fmt::Display for RepoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RepoError::InvalidArgument(msg) => write!(f, "Invalid argument: {}", msg),
            RepoError::NotFound(msg) => write!(f, "Not found: {}", msg),
            RepoError::OperationFailed(msg) => write!(f, "Operation failed: {}", msg),
        }
    }
}

impl std::error::Error for RepoError {}

impl From<mongodb::error::Error> for RepoError {
    fn from(e: mongodb::error::Error) -> Self {
        RepoError::OperationFailed(e.to_string())
    }
}
