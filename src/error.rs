use thiserror::Error;

#[derive(Error, Debug)]
pub enum ItabError {
    #[error("Illegal date or time: {0}")]
    MalformedTimestamp(String),

    #[error("Not enough digitization markers: found {found}, need at least 4")]
    InsufficientMarkers { found: usize },

    #[error("Inconsistent measurement info: {0}")]
    ConsistencyViolation(String),

    #[error("No data in this range: start={start}, stop={stop}")]
    EmptyRange { start: usize, stop: usize },

    #[error("Short read from raw file: expected {expected} bytes, {available} available")]
    ShortRead { expected: u64, available: u64 },

    #[error("Shape mismatch: {0}")]
    ShapeMismatch(String),

    #[error("Header file not found: {0}")]
    HeaderNotFound(String),

    #[error("Invalid header: {0}")]
    InvalidHeader(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ItabError>;
