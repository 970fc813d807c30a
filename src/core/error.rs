use thiserror::Error;

use crate::core::stream::StreamId;

#[derive(Debug, Error)]
pub enum TransformError {
    #[error("stream \"{stream}\" is not connected to any output")]
    NotMapped { stream: String },
    #[error("cannot move stream to position {position}: file has {len} streams")]
    InvalidPosition { position: usize, len: usize },
    #[error("malformed value for profile field `{field}`: {value:?}")]
    MalformedProfileValue { field: String, value: String },
    #[error("stream {id:?} does not belong to file \"{file}\"")]
    UnknownStream { file: String, id: StreamId },
    #[error("no file at index {index}")]
    UnknownFile { index: usize },
    #[error("invalid profile document: {message}")]
    ProfileShape { message: String },
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type TransformResult<T> = Result<T, TransformError>;
