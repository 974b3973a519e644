use thiserror::Error;

pub type SoflanResult<T> = Result<T, SoflanError>;

#[derive(Debug, Error)]
pub enum SoflanError {
    #[error("invalid tempo change: bpm={bpm}")]
    InvalidTempo { bpm: f64 },

    #[error("invalid speed region: {0}")]
    InvalidRegion(String),

    #[error("invalid query: {0}")]
    InvalidQuery(String),

    #[error("invalid data: {0}")]
    InvalidData(String),
}
