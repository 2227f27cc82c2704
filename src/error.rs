use serde_json::Value;
use thiserror::Error;

/// A remote call failed: network, non-success status, or a body we could not read.
///
/// `message` is the best human-readable text we could pull out of the response.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct TransportError {
    pub message: String,
    /// `0` when the request never got a response.
    pub status: u16,
    pub status_text: String,
    pub url: String,
    pub method: String,
    pub payload: Option<Value>,
}

impl TransportError {
    pub fn new(message: impl Into<String>, status: u16) -> Self {
        Self {
            message: message.into(),
            status,
            status_text: String::new(),
            url: String::new(),
            method: String::new(),
            payload: None,
        }
    }

    pub fn network(method: &str, url: &str) -> Self {
        Self {
            method: method.to_ascii_uppercase(),
            url: url.to_string(),
            ..Self::new("Network error", 0)
        }
    }

    pub fn malformed(method: &str, url: &str, status: u16, detail: impl std::fmt::Display) -> Self {
        Self {
            method: method.to_ascii_uppercase(),
            url: url.to_string(),
            ..Self::new(format!("Malformed response body: {detail}"), status)
        }
    }

    pub fn is_network(&self) -> bool {
        self.status == 0
    }

    pub fn with_payload(mut self, payload: Value) -> Self {
        self.payload = Some(payload);
        self
    }

    /// `message`, or `fallback` when the server gave us nothing readable.
    pub fn message_or(&self, fallback: &str) -> String {
        if self.message.trim().is_empty() {
            fallback.to_string()
        } else {
            self.message.clone()
        }
    }
}

/// Local pre-flight failures. These never reach the transport.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{entity} name is required")]
    NameRequired { entity: &'static str },
    #[error("Name must be at most {max} characters")]
    NameTooLong { max: usize },
    #[error("Description must be at most {max} characters")]
    DescriptionTooLong { max: usize },
}

#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("settings error: {0:#}")]
    Settings(#[from] anyhow::Error),
}

pub type CoreResult<T> = Result<T, CoreError>;

/// Message for the UI: the transport's own text, else `fallback`.
pub fn user_message(err: &CoreError, fallback: &str) -> String {
    match err {
        CoreError::Transport(e) => e.message.clone(),
        CoreError::Validation(e) => e.to_string(),
        CoreError::Settings(_) => fallback.to_string(),
    }
}
