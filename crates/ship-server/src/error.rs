use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to bind {addr}: {reason}")]
    Bind { addr: String, reason: String },

    #[error("recv error: {0}")]
    Recv(String),

    #[error("accept loop join: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error(transparent)]
    Validator(#[from] ship_schema::ValidationError),
}
