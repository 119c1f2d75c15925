use thiserror::Error;

#[derive(Error, Debug)]
pub enum CmisError {
    #[error("Could not load feed {url}: {reason}")]
    FeedLoad { url: String, reason: String },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid value for '{field}' ({value}): {reason}")]
    InvalidConfigValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("{what} not found: {key}")]
    NotFound { what: &'static str, key: String },

    #[error("File does not exist: {path}")]
    FileDoesNotExist { path: String },

    #[error("The repository does not expose a '{kind}' URI template")]
    NoQueryTemplate { kind: String },

    #[error("Workspace '{name}' not found in service document")]
    WorkspaceNotFound { name: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Protocol,
    Storage,
    Configuration,
    Lookup,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl CmisError {
    /// Wraps anything that went wrong while fetching or parsing a feed.
    pub fn feed_load(url: impl Into<String>, reason: impl ToString) -> Self {
        CmisError::FeedLoad {
            url: url.into(),
            reason: reason.to_string(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        CmisError::Config {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            CmisError::Http(_) => ErrorCategory::Network,
            CmisError::FeedLoad { .. }
            | CmisError::NoQueryTemplate { .. }
            | CmisError::WorkspaceNotFound { .. }
            | CmisError::Serialization(_) => ErrorCategory::Protocol,
            CmisError::Io(_) | CmisError::Database(_) | CmisError::FileDoesNotExist { .. } => {
                ErrorCategory::Storage
            }
            CmisError::Config { .. } | CmisError::InvalidConfigValue { .. } => {
                ErrorCategory::Configuration
            }
            CmisError::NotFound { .. } => ErrorCategory::Lookup,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            CmisError::NotFound { .. } => ErrorSeverity::Low,
            CmisError::Http(_) | CmisError::FeedLoad { .. } => ErrorSeverity::Medium,
            CmisError::FileDoesNotExist { .. }
            | CmisError::NoQueryTemplate { .. }
            | CmisError::WorkspaceNotFound { .. }
            | CmisError::Serialization(_) => ErrorSeverity::High,
            CmisError::Io(_)
            | CmisError::Database(_)
            | CmisError::Config { .. }
            | CmisError::InvalidConfigValue { .. } => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Network => "Check the server URL and your network connection, then try again",
            ErrorCategory::Protocol => {
                "Make sure the URL points at the CMIS AtomPub service document of the repository"
            }
            ErrorCategory::Storage => "Check that the cache directory and database are writable",
            ErrorCategory::Configuration => "Fix the preferences file or the command line arguments",
            ErrorCategory::Lookup => "List the available entries and pick an existing id",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            CmisError::FeedLoad { url, .. } => format!("Unable to load the feed at {url}"),
            CmisError::Http(e) if e.is_timeout() => "The server did not answer in time".to_string(),
            CmisError::Http(e) => match e.status() {
                Some(status) if status.as_u16() == 401 || status.as_u16() == 403 => {
                    "The server rejected the user name or password".to_string()
                }
                Some(status) => format!("The server answered with status {status}"),
                None => "Could not reach the server".to_string(),
            },
            CmisError::FileDoesNotExist { .. } => "The file does not exist".to_string(),
            CmisError::NoQueryTemplate { .. } => {
                "This repository does not support searching".to_string()
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CmisError>;
