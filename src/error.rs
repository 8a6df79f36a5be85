//! Error taxonomy shared by the server caller, the page decoder and the session.

use thiserror::Error;

/// Placeholder that modal text may carry; replaced with the last interactive error.
pub const INTERACTIVE_ERROR_DETAILS: &str = "${INTERACTIVE_ERROR_DETAILS}";

const GENERIC_ERROR_TEXT: &str = "Error talking to server.\n\n${INTERACTIVE_ERROR_DETAILS}";

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ApplinError {
    /// Local programmer or configuration fault.
    #[error("app error: {0}")]
    App(String),

    /// Malformed page payload.
    #[error("deserialize error: {0}")]
    Deserialize(String),

    /// No response was obtained from the server.
    #[error("network error: {0}")]
    Network(String),

    #[error("server error: {message}")]
    Server {
        status: Option<u16>,
        message: String,
    },

    /// Structured message from the server, shown to the user as-is.
    #[error("{0}")]
    User(String),
}

impl ApplinError {
    pub fn server(status: Option<u16>, message: impl Into<String>) -> Self {
        ApplinError::Server {
            status,
            message: message.into(),
        }
    }

    pub fn is_user_facing(&self) -> bool {
        matches!(self, ApplinError::User(_))
    }

    /// Text to show the end user after an interactive action failed.
    pub fn interactive_message(&self) -> String {
        match self {
            ApplinError::User(message) => message.clone(),
            other => interpolate_error_details(GENERIC_ERROR_TEXT, Some(other)),
        }
    }
}

pub fn interpolate_error_details(text: &str, err: Option<&ApplinError>) -> String {
    if !text.contains(INTERACTIVE_ERROR_DETAILS) {
        return text.to_string();
    }
    let details = err
        .map(|e| e.to_string())
        .unwrap_or_else(|| "Error details not found.".to_string());
    text.replace(INTERACTIVE_ERROR_DETAILS, &details)
}

#[cfg(test)]
#[path = "tests/error_tests.rs"]
mod tests;
