use axum::{
    response::{IntoResponse, Response},
    Json,
    http::StatusCode,
};
use serde::Serialize;

#[derive(Serialize)]
pub struct ErrorResponse {
    error: String,
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Please type something you're craving.")]
    EmptyCraving,

    #[error("Invalid request: {0}")]
    Validation(String),

    #[error("Recipe generation failed: {0}")]
    Llm(String),

    #[error("Document export failed: {0}")]
    Export(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Request processing timed out")]
    Timeout,
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::EmptyCraving => StatusCode::BAD_REQUEST,
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Llm(_) => StatusCode::BAD_GATEWAY,
            AppError::Export(_) | AppError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Timeout => StatusCode::REQUEST_TIMEOUT,
        }
    }

    /// Empty input is shown as a warning rather than a failure.
    pub fn is_warning(&self) -> bool {
        matches!(self, AppError::EmptyCraving)
    }

    /// Text shown to the user.
    pub fn user_message(&self) -> String {
        if self.is_warning() {
            self.to_string()
        } else {
            format!("Error: {}", self)
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = Json(ErrorResponse {
            error: self.user_message(),
        });

        (self.status_code(), body).into_response()
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::Llm(err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Export(err.to_string())
    }
}

impl From<printpdf::Error> for AppError {
    fn from(err: printpdf::Error) -> Self {
        AppError::Export(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_craving_is_a_warning() {
        let err = AppError::EmptyCraving;
        assert!(err.is_warning());
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.user_message(), "Please type something you're craving.");
    }

    #[test]
    fn other_errors_carry_the_raw_text() {
        let err = AppError::Llm("rate limited".to_string());
        assert!(!err.is_warning());
        assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);
        assert_eq!(err.user_message(), "Error: Recipe generation failed: rate limited");
    }
}
