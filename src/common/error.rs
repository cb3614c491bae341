use thiserror::Error;

// Error
//------------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum BarcodeError {
    // Lookup
    #[error("Unknown barcode family: {0:?}")]
    UnknownFamily(String),

    // Data validation
    #[error("Empty data")]
    EmptyData,
    #[error("Character {ch:?} at position {pos} is not allowed in {family}")]
    AlphabetViolation { family: &'static str, ch: char, pos: usize },
    #[error("{family} expects {expected} characters, got {found}")]
    InvalidLength { family: &'static str, expected: &'static str, found: usize },
    #[error("Invalid {family} payload: {reason}")]
    InvalidPayload { family: &'static str, reason: String },
    #[error("Checksum option conflicts with {family}: {reason}")]
    ChecksumConflict { family: &'static str, reason: &'static str },
    #[error("{family} check character mismatch: expected {expected:?}, found {found:?}")]
    ChecksumMismatch { family: &'static str, expected: char, found: char },

    // QR
    #[error("Data too long: {needed} bits needed, {capacity} bits available")]
    CapacityExceeded { needed: usize, capacity: usize },
    #[error("Invalid version")]
    InvalidVersion,
    #[error("Error correction level {0} is not supported by version {1}")]
    UnsupportedErrorLevel(String, String),
    #[error("Invalid masking pattern {0}")]
    InvalidMask(u8),
    #[error("Data cannot be encoded in {0} mode")]
    UnsupportedMode(&'static str),
    #[error("Version {version} cannot hold {mode} data")]
    ModeNotInVersion { mode: &'static str, version: String },

    // Rendering
    #[error("Invalid color: {0:?}")]
    InvalidColor(String),
    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),
    #[error("Unsupported output format: {0:?}")]
    UnsupportedFormat(String),
    #[error("Unknown encoding: {0:?}")]
    UnknownEncoding(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Fmt(#[from] std::fmt::Error),
}

pub type BarcodeResult<T> = Result<T, BarcodeError>;
