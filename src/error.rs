//! Error types for footcite.
//!
//! The relinking passes themselves never fail; errors come from the edges:
//! reading and writing files, loading configuration, compiling adapter
//! selectors and talking to the bookmark feed.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid selector: {0}")]
    Selector(String),

    #[error("Config parse error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] Box<ureq::Error>),

    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("Feed returned status {status} for {url}")]
    FeedStatus { status: u16, url: String },

    #[error("Block adapter {adapter} failed: {message}")]
    Adapter { adapter: String, message: String },
}

pub type Result<T> = std::result::Result<T, Error>;
