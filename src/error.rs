//! Error types for region draw-buffer management.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DrawBufferError {
    #[error("area buffer out of capacity: requested {requested} bytes, {free} free")]
    OutOfCapacity { requested: u32, free: u32 },

    #[error("region buffers are not allocated")]
    NotAllocated,
}

pub type DrawBufferResult<T> = Result<T, DrawBufferError>;
