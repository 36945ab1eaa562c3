use thiserror::Error;

/// First rule a draft failed; submission was aborted before any I/O.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ValidationFailure {
    pub tab: String,
    pub field: String,
    pub message: String,
}
