use thiserror::Error;

/// Every failure the portal can surface to a user.
///
/// The first four variants are the user-facing taxonomy: a request that never
/// got an answer, a non-2xx answer, a form that failed its preconditions
/// before anything was sent, and a body that was not JSON. The remaining
/// variants belong to the local machinery (templates, durable storage,
/// configuration).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PortalError {
    #[error("network failure: {0}")]
    Network(String),

    #[error("{message}")]
    Http { status: u16, message: String },

    #[error("{0}")]
    Validation(String),

    #[error("invalid response")]
    Parse,

    #[error("render failed: {0}")]
    Render(String),

    #[error("storage failed: {0}")]
    Storage(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl PortalError {
    /// HTTP status carried by the error, 0 when no status applies.
    pub fn status(&self) -> u16 {
        match self {
            PortalError::Http { status, .. } => *status,
            _ => 0,
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, PortalError::Validation(_))
    }
}

impl From<handlebars::RenderError> for PortalError {
    fn from(err: handlebars::RenderError) -> Self {
        PortalError::Render(err.to_string())
    }
}

impl From<handlebars::TemplateError> for PortalError {
    fn from(err: handlebars::TemplateError) -> Self {
        PortalError::Render(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, PortalError>;
