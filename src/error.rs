//! Error types / 错误类型

use thiserror::Error;

/// Startup configuration errors / 配置错误
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing environment variable {0}: a database connection string is required")]
    MissingDatabaseUrl(&'static str),

    #[error("failed to read config file: {0}")]
    Read(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Query construction errors / 查询构建错误
#[derive(Error, Debug)]
pub enum QueryError {
    #[error("invalid search pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// Store access errors / 存储访问错误
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Client-side errors. None of these reach the user as a panic; the search
/// session turns them into an inline message.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Please enter a search term")]
    EmptyQuery,

    #[error("A search is already in progress")]
    RequestInFlight,

    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Unexpected response ({status}): {body}")]
    UnexpectedResponse { status: u16, body: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type ClientResult<T> = Result<T, ClientError>;
