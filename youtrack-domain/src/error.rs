use thiserror::Error;

pub type Result<T> = std::result::Result<T, YouTrackError>;

/// Failures surfaced by the fetch, normalize and render pipeline.
#[derive(Debug, Error)]
pub enum YouTrackError {
    /// No resolvable server, or an unknown source/style name.
    #[error("{0}")]
    Configuration(String),

    /// Blank or empty macro content where some is required.
    #[error("{0}")]
    Input(String),

    #[error("Failed to retrieve YouTrack data from [{url}]: {message}")]
    Fetch {
        url: String,
        status: Option<u16>,
        message: String,
    },

    #[error("Error when parsing YouTrack JSON: {0}")]
    Deserialization(String),

    #[error("Field {field} is not supported for task {issue}")]
    UnknownField { field: String, issue: String },
}

impl YouTrackError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    pub fn input(message: impl Into<String>) -> Self {
        Self::Input(message.into())
    }

    pub fn fetch(url: impl Into<String>, status: Option<u16>, message: impl Into<String>) -> Self {
        Self::Fetch {
            url: url.into(),
            status,
            message: message.into(),
        }
    }
}
