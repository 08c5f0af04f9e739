use thiserror::Error;

// Error
//------------------------------------------------------------------------------

#[derive(Debug, Error, PartialEq, Eq, Copy, Clone)]
pub enum QRError {
    // Range
    #[error("Invalid version")]
    InvalidVersion,
    #[error("Invalid masking pattern")]
    InvalidMaskingPattern,
    #[error("Index out of range")]
    IndexOutOfRange,

    // Capacity
    #[error("Data too long")]
    DataTooLong,
    #[error("Capacity overflow")]
    CapacityOverflow,

    // Mode
    #[error("Unsupported mode")]
    UnsupportedMode,

    // Domain
    #[error("Logarithm of zero is undefined")]
    LogOfZero,

    // Read back
    #[error("Invalid format info detected")]
    InvalidFormatInfo,
    #[error("Invalid version info detected")]
    InvalidVersionInfo,
}

pub type QRResult<T> = Result<T, QRError>;
