use thiserror::Error;

/// Errors produced while building or rendering a QR Code.
///
/// Ways to handle [`QrError::DataTooLong`]:
///
/// - Decrease the error correction level if it was greater than `EcLevel::Low`.
/// - Increase the `max_version` option if it was less than `Version::MAX`.
/// - Change the text to fit the character set of a denser segment mode (e.g. alphanumeric).
/// - Shorten the payload.
#[derive(Error, Debug)]
pub enum QrError {
    /// A caller handed in a malformed value (bit width, version, mask, charset, ...).
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A bit was read past the end of a [`BitBuffer`](crate::BitBuffer).
    #[error("Bit index {index} out of range for buffer of {len} bits")]
    IndexOutOfRange { index: usize, len: usize },

    /// The encoded data exceeds the capacity of the largest allowed version. This also
    /// covers a character count too large for its count field.
    #[error("Data length = {required} bits, Max capacity = {available} bits")]
    DataTooLong { required: usize, available: usize },

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl QrError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        QrError::InvalidArgument(msg.into())
    }

    /// Returns true if the payload did not fit, as opposed to a caller bug.
    pub fn is_capacity_error(&self) -> bool {
        matches!(self, QrError::DataTooLong { .. })
    }
}

/// Result type alias for encoder operations
pub type Result<T> = std::result::Result<T, QrError>;
