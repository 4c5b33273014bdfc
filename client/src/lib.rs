pub mod analysis;
pub mod auth;
pub mod client;
pub mod players;
pub mod session;

pub use analysis::{load_analysis, AnalysisData};
pub use auth::AuthApi;
pub use client::{HttpClient, API_URL_ENV, DEFAULT_API_URL};
pub use players::{HttpPlayerApi, PlayerApi};
pub use session::{FileSessionStore, MemorySessionStore, SessionStore, TOKEN_KEY};
use thiserror::Error;

/// Error type for client operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error("reqwest error: {0}")]
    Reqwest(#[from] reqwest::Error),
    #[error("failed: {0}")]
    Failed(reqwest::StatusCode),
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),
    #[error("invalid URL scheme: {0} (expected http or https)")]
    InvalidScheme(String),
    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("session storage error: {0}")]
    Session(#[from] std::io::Error),
    #[error("session lock poisoned")]
    SessionPoisoned,
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, Error>;
