//! # dvbsi
//!
//! A library for encoding DVB and MPEG-2 PSI/SI tables into sections.
//!
//! A table (program association, network information, service description,
//! ...) is built up in memory with add-calls that check the table's logical
//! capacity before changing anything. [`PsiTable::build_sections`] then
//! splits the table into size-bounded sections: each section repeats the
//! table header, item descriptor loops are continued across sections without
//! ever splitting a descriptor, loop lengths are patched once known, and
//! every section ends with an MPEG-2 CRC-32.
//!
//! ## Features
//!
//! - **Section splitting**: a single greedy pass with resumable item loops
//! - **Tables**: PAT, CAT, PMT, NIT, BAT, SDT, EIT present/following, TDT,
//!   TOT, RST and the stuffing table
//! - **Descriptors**: the common MPEG-2 and DVB descriptors plus raw ones
//! - **JSON descriptions** (`serde` feature): describe a table in a file and
//!   build it with [`config::load_table_config`]
//! - **Text output** (`base64` feature): hex and base64 renderings of sections
//!
//! ## Quick Start
//!
//! ```rust
//! use dvbsi::descriptors::ServiceDescriptor;
//! use dvbsi::tables::{PsiTable, RunningStatus, Sdt};
//!
//! let mut sdt = Sdt::actual(0x0001, 0x2000, 0);
//! assert!(sdt.add_service(0x0101, false, true, RunningStatus::Running, false));
//! assert!(sdt.add_service_descriptor(ServiceDescriptor::new(0x01, "Provider", "Service")));
//!
//! let sections = sdt.build_sections().unwrap();
//! assert_eq!(sections.len(), 1);
//! assert_eq!(sections[0].as_bytes()[0], 0x42);
//! ```
//!
//! A table that outgrows one section is split automatically:
//!
//! ```rust
//! use dvbsi::descriptors::Descriptor;
//! use dvbsi::tables::{Nit, PsiTable};
//!
//! let mut nit = Nit::actual(0x3001, 0);
//! for tsid in 0..30 {
//!     nit.add_transport_stream(tsid, 0x3001);
//!     nit.add_transport_stream_descriptor(Descriptor::raw(0x80, vec![0; 100]).unwrap());
//! }
//!
//! let sections = nit.build_sections().unwrap();
//! assert!(sections.len() > 1);
//! for section in &sections {
//!     // every section carries the same last_section_number
//!     assert_eq!(section.as_bytes()[7] as usize, sections.len() - 1);
//! }
//! ```

/// MPEG-2 CRC-32 for section trailers.
pub mod crc;
/// Descriptors and descriptor loops.
pub mod descriptors;
/// Section buffers, the section splitter and encoding errors.
pub mod encoding;
/// PSI/SI table definitions.
pub mod tables;
/// UTC and BCD time fields.
pub mod time;

/// JSON table descriptions.
#[cfg(feature = "serde")]
pub mod config;

pub use encoding::{EncodingError, EncodingResult, Section};
pub use tables::{PsiTable, TableHeader};

#[cfg(feature = "base64")]
pub use encoding::Base64Encodable;

#[cfg(feature = "serde")]
pub use config::{ConfigError, TableConfig, load_table_config};
