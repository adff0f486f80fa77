use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Not Found: {0}")]
    NotFound(String),

    #[error("Bad Request: {0}")]
    BadRequest(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("External service error ({status}): {message}")]
    ExternalService { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Maps a non-success HTTP status and its body onto the error taxonomy.
    pub fn from_status(status: u16, body: String) -> Self {
        match status {
            401 | 403 => AppError::Auth(body),
            404 => AppError::NotFound(body),
            400 | 422 => AppError::BadRequest(body),
            409 => AppError::Conflict(body),
            _ => AppError::ExternalService { status, message: body },
        }
    }

    /// Short text for a transient toast after a user-initiated action fails.
    pub fn user_message(&self) -> &'static str {
        match self {
            AppError::Auth(_) => "Please sign in again",
            AppError::NotFound(_) => "Nothing found",
            AppError::BadRequest(_) | AppError::Conflict(_) => "The request was rejected",
            AppError::Network(_) => "No connection to the server",
            AppError::ExternalService { .. } | AppError::Serialization(_) | AppError::Internal(_) => {
                "Something went wrong, try again later"
            }
        }
    }
}
