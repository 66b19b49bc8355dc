use thiserror::Error;

/// Failure reported by an [`IsolatedHost`](crate::IsolatedHost) while loading
/// a document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct HostError(pub String);

impl HostError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

#[derive(Debug, Error)]
pub enum PlaygroundError {
    #[error("no template named {0:?}")]
    TemplateNotFound(String),
    #[error("invalid share link: {0}")]
    ShareLink(#[from] url::ParseError),
    #[error("isolated host failed to load document: {0}")]
    Host(#[from] HostError),
    #[error("failed to parse playground config JSON: {0}")]
    Config(#[from] serde_json::Error),
    #[error("playground config validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),
}

pub type Result<T> = std::result::Result<T, PlaygroundError>;
