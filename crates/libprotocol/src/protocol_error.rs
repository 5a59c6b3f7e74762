use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("failed to decode signal message: {0}")]
    Json(#[from] JsonError),
}

#[derive(Debug, Error)]
#[error("invalid json at line {line}, column {column}: {message}")]
pub struct JsonError {
    pub line: usize,
    pub column: usize,
    pub message: String,
}
