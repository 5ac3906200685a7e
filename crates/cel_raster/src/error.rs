use thiserror::Error;

/// Result type for raster operations
pub type Result<T> = std::result::Result<T, RasterError>;

/// Errors raised by grid construction and conversion
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RasterError {
    #[error("Grid must not be empty (got {width}x{height})")]
    EmptyGrid { width: u32, height: u32 },

    #[error("Buffer length {len} does not match {width}x{height}")]
    BufferLength { width: u32, height: u32, len: usize },
}
