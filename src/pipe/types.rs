/*!
 * Pipe Types
 * Common types and errors for pipes
 */

use crate::core::types::{PipeId, Size};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Pipe error types
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PipeError {
    #[error("pipe closed")]
    Closed,

    #[error("would block: {0}")]
    WouldBlock(&'static str),

    #[error("invalid capacity: requested {requested}, limit {max}")]
    CapacityInvalid { requested: usize, max: usize },
}

impl From<PipeError> for std::io::Error {
    fn from(err: PipeError) -> Self {
        let kind = match err {
            PipeError::Closed => std::io::ErrorKind::BrokenPipe,
            PipeError::WouldBlock(_) => std::io::ErrorKind::WouldBlock,
            PipeError::CapacityInvalid { .. } => std::io::ErrorKind::InvalidInput,
        };
        std::io::Error::new(kind, err)
    }
}

/// Point-in-time view of a pipe, for diagnostics
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct PipeStats {
    pub id: PipeId,
    pub capacity: Size,
    pub buffered: Size,
    pub writer_open: bool,
    pub reader_open: bool,
}
