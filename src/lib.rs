//! Verbatim Client - fetch YouTube transcripts and format them with AI models
//!
//! This library holds the stateful side of the Verbatim AI client: the persisted
//! settings (API key and custom models), the selectable model catalog, the
//! transcript session with its fetch/format request lifecycle, and transient
//! notifications. Frontends bind to it through [`app::App::dispatch`].

pub mod app;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod gateway;
pub mod notify;
pub mod output;
pub mod render;
pub mod session;
pub mod settings;
pub mod utils;

pub use app::{App, Command};
pub use catalog::{CatalogEntry, ModelCatalogBuilder};
pub use cli::{Cli, Commands, OutputFormat};
pub use config::AppConfig;
pub use gateway::{RequestGateway, Transport};
pub use notify::NotificationCenter;
pub use session::{ActionState, TranscriptSession};
pub use settings::{CustomModel, Settings, SettingsStore};

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, ClientError>;

/// Broad category of a [`ClientError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Remote,
    Network,
    Persistence,
    Parse,
}

/// Error types surfaced by client operations.
///
/// Every variant carries the message shown to the user verbatim.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Remote(String),

    #[error("{0}")]
    Network(String),

    #[error("{0}")]
    Persistence(String),

    #[error("{0}")]
    Parse(String),
}

impl ClientError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ClientError::Validation(_) => ErrorKind::Validation,
            ClientError::Remote(_) => ErrorKind::Remote,
            ClientError::Network(_) => ErrorKind::Network,
            ClientError::Persistence(_) => ErrorKind::Persistence,
            ClientError::Parse(_) => ErrorKind::Parse,
        }
    }

    /// Message suitable for the error banner
    pub fn user_message(&self) -> &str {
        match self {
            ClientError::Validation(msg)
            | ClientError::Remote(msg)
            | ClientError::Network(msg)
            | ClientError::Persistence(msg)
            | ClientError::Parse(msg) => msg,
        }
    }
}
