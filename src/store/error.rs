use thiserror::Error;

pub const GENERIC_FAILURE: &str = "Something went wrong. Please try again.";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("authentication required")]
    Unauthorized,
    #[error("{entity} '{id}' not found")]
    NotFound { entity: String, id: String },
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("server responded with status {status}")]
    Server { status: u16, message: Option<String> },
    #[error("storage error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid stored data: {0}")]
    Serde(#[from] serde_json::Error),
}

impl ApiError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized)
            || matches!(self, ApiError::Server { status: 401, .. })
    }

    /// Message fit for the admin: the server's own wording when it sent one.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Server {
                message: Some(message),
                ..
            } if !message.trim().is_empty() => message.clone(),
            ApiError::NotFound { .. } => self.to_string(),
            ApiError::BadRequest(message) => message.clone(),
            _ => GENERIC_FAILURE.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_messages_win_over_the_fallback() {
        let err = ApiError::Server {
            status: 422,
            message: Some("Title already taken".into()),
        };
        assert_eq!(err.user_message(), "Title already taken");
        let err = ApiError::Server {
            status: 500,
            message: None,
        };
        assert_eq!(err.user_message(), GENERIC_FAILURE);
        let err = ApiError::Io(std::io::Error::other("disk"));
        assert_eq!(err.user_message(), GENERIC_FAILURE);
    }

    #[test]
    fn status_401_counts_as_unauthorized() {
        assert!(
            ApiError::Server {
                status: 401,
                message: None
            }
            .is_unauthorized()
        );
        assert!(ApiError::Unauthorized.is_unauthorized());
        assert!(!ApiError::BadRequest("x".into()).is_unauthorized());
    }
}
