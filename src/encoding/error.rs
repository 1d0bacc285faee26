//! Error types for encoding operations.

use std::error::Error;
use std::fmt;

/// Result type for encoding operations.
pub type EncodingResult<T> = Result<T, EncodingError>;

/// Errors that can occur while turning a table into sections.
///
/// These are all programming or configuration defects: the add-calls on the
/// tables already refuse content that cannot be encoded, so an encoding error
/// means a table was assembled in a way that bypassed those checks. Nothing is
/// ever truncated to make a write succeed.
#[derive(Debug, Clone, PartialEq)]
pub enum EncodingError {
    /// A write would move the cursor past the section capacity.
    BufferOverflow {
        /// Number of bytes needed.
        needed: usize,
        /// Number of bytes available.
        available: usize,
    },

    /// A patch targeted bytes that have not been written yet.
    InvalidPatchOffset {
        /// Offset of the patch.
        offset: usize,
        /// Width of the patched field in bytes.
        width: usize,
        /// Current cursor position of the section.
        cursor: usize,
    },

    /// A section was closed without any descriptor or item written to it.
    ///
    /// This happens when a single descriptor (or an item header with its
    /// first descriptor) is larger than an empty section can hold.
    Unsatisfiable {
        /// Table id of the table being encoded.
        table_id: u8,
        /// Number of the section that could not make progress.
        section_number: usize,
        /// Bytes that were needed.
        needed: usize,
        /// Bytes an empty section offers.
        available: usize,
    },

    /// The table needs more sections than an 8-bit section number allows.
    TooManySections {
        /// Table id of the table being encoded.
        table_id: u8,
    },

    /// IO error while writing sections to a sink.
    IoError(String),
}

impl fmt::Display for EncodingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EncodingError::BufferOverflow { needed, available } => {
                write!(
                    f,
                    "Buffer overflow: needed {} bytes, had {}",
                    needed, available
                )
            }
            EncodingError::InvalidPatchOffset {
                offset,
                width,
                cursor,
            } => {
                write!(
                    f,
                    "Invalid patch offset: {} byte field at {} is past the cursor ({})",
                    width, offset, cursor
                )
            }
            EncodingError::Unsatisfiable {
                table_id,
                section_number,
                needed,
                available,
            } => {
                write!(
                    f,
                    "Table 0x{:02x}: section {} cannot make progress, needed {} bytes but an empty section holds {}",
                    table_id, section_number, needed, available
                )
            }
            EncodingError::TooManySections { table_id } => {
                write!(f, "Table 0x{:02x} needs more than 256 sections", table_id)
            }
            EncodingError::IoError(msg) => {
                write!(f, "IO error: {}", msg)
            }
        }
    }
}

impl Error for EncodingError {}

impl From<std::io::Error> for EncodingError {
    fn from(err: std::io::Error) -> Self {
        EncodingError::IoError(err.to_string())
    }
}
