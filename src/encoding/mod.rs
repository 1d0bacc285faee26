//! Section encoding for PSI/SI tables.
//!
//! This module holds the byte-level section buffer and the machinery that
//! splits a logical table into an ordered run of CRC-protected sections.

/// Error types for encoding operations.
pub mod error;

/// Fixed-capacity section buffer.
pub mod section;

/// Trait definitions for encodable types.
pub mod traits;

/// Resumable encoder for one item and its descriptor loop.
pub mod item_loop;

/// Table section orchestrator.
pub mod splitter;


// Re-export commonly used types
pub use error::{EncodingError, EncodingResult};
pub use item_loop::{ItemProgress, LoopItem, LoopStatus};
pub use section::Section;
pub use traits::{Encodable, write_sections};

// Re-export feature-gated traits
#[cfg(feature = "base64")]
pub use traits::Base64Encodable;
