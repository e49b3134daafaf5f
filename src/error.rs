//! Error types for pixelmill.

use thiserror::Error;

/// Errors raised by buffer access, filter construction and the codec boundary.
#[derive(Debug, Error)]
pub enum ImagingError {
    /// A required parameter is missing or outside its accepted domain.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Pixel access outside the buffer.
    #[error("pixel ({x}, {y}) out of range for {width}x{height} buffer")]
    OutOfRange {
        /// Requested column.
        x: i64,
        /// Requested row.
        y: i64,
        /// Buffer width.
        width: usize,
        /// Buffer height.
        height: usize,
    },

    /// Decoding or encoding failed.
    #[error("codec error: {0}")]
    Image(#[from] image::ImageError),

    /// Reading or writing a file failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ImagingError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ImagingError>;

#[cfg(feature = "python")]
impl From<ImagingError> for pyo3::PyErr {
    fn from(err: ImagingError) -> Self {
        pyo3::exceptions::PyValueError::new_err(err.to_string())
    }
}
