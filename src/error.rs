use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("malformed json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("subgraph returned errors: {0}")]
    Graphql(String),
    #[error("invalid number {value:?} in field {field}")]
    InvalidNumber { field: &'static str, value: String },
    #[error("invalid hex id {0:?}")]
    InvalidId(String),
    #[error("malformed proposal {id}: {reason}")]
    MalformedProposal { id: String, reason: String },
    #[error("connector {0} not found")]
    ConnectorNotFound(String),
    #[error("connector {0} is not ready")]
    ConnectorNotReady(String),
    #[error("chain {0} is not supported")]
    UnsupportedChain(u64),
    #[error("no wallet connected")]
    NotConnected,
    #[cfg(not(target_arch = "wasm32"))]
    #[error("storage error: {0}")]
    Store(#[from] rusqlite::Error),
    #[error("storage lock poisoned")]
    Poisoned,
    #[error("invalid config: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;
