//! Anchor error types
//!
//! Failures of the anchoring engine. A window scan that finds nothing is not
//! an error; it is reported as `None`.

use thiserror::Error;

/// Errors produced while building or relocating text anchors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AnchorError {
    /// Selection bounds do not fit the document
    #[error("Offsets out of range: {start}..{end} for text of {len} characters")]
    OutOfRange { start: usize, end: usize, len: usize },

    /// The live selection could not be found in the logical text
    #[error("Selected text not found in document")]
    SelectionNotFound,

    /// A stored fingerprint is not a 64-character hex digest
    #[error("Invalid fingerprint: {0}")]
    InvalidFingerprint(String),

    /// Relocation exceeded its time budget
    #[error("Relocation timed out after {0} ms")]
    Timeout(u64),

    /// Relocation was cancelled before it finished
    #[error("Relocation cancelled")]
    Cancelled,

    /// The blocking worker failed (panicked or was aborted)
    #[error("Relocation worker failed: {0}")]
    Worker(String),
}

/// Result type alias for anchor operations
pub type AnchorResult<T> = std::result::Result<T, AnchorError>;
