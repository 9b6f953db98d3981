use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GcdbError {
    #[error("{0}")]
    BadRequest(String),

    #[error("invalid JSON: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Document must contain an integer _id field")]
    MissingId,

    #[error("Id {0} not found")]
    NotFound(i64),

    #[error("Id {0} violates unique constraint on _id")]
    DuplicateId(i64),

    #[error("updated document must keep the same _id (got {found}, expected {expected})")]
    IdMismatch { expected: i64, found: i64 },

    #[error("Cursor {0} is not open")]
    UnknownCursor(u64),

    #[error("cursor exhausted")]
    CursorExhausted,

    #[error("corrupt record at offset {offset}: extends past offset {end}")]
    CorruptRecord { offset: u32, end: u32 },

    #[error("data file is full")]
    OutOfSpace,

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, GcdbError>;
