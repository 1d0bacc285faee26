//! PSI/SI tables.
//!
//! Every table keeps a [`TableHeader`] with its identity, flags and the
//! running logical length used for capacity checks. Add-calls check that
//! the candidate still fits under the 64 KiB logical ceiling *before*
//! touching the table and report the outcome as a `bool`: a full table is
//! an expected condition, not an error. Encoding happens later, through
//! [`PsiTable::build_sections`], and never changes the table.

mod cat;
mod eit;
mod nit;
mod pat;
mod pmt;
mod rst;
mod sdt;
mod stuffing;
mod tdt;

pub use cat::Cat;
pub use eit::{Event, EventSlot, PfEit};
pub use nit::{Bat, Nit, TransportStream};
pub use pat::{Pat, Program};
pub use pmt::{ElementaryStream, Pmt, stream_type};
pub use rst::{RunningStatusEntry, Rst};
pub use sdt::{Sdt, Service};
pub use stuffing::StuffingTable;
pub use tdt::{Tdt, Tot};

use crate::crc::CRC_LEN;
use crate::descriptors::{Descriptor, DescriptorList};
use crate::encoding::{EncodingResult, Section};

/// Logical ceiling on the accumulated size of a table.
pub const MAX_TABLE_LEN: usize = 65536;

/// Default maximum section length for PSI and most SI tables.
pub const DEFAULT_MAX_SECTION_LEN: u16 = 1024;

/// Maximum section length for EIT and stuffing tables.
pub const MAX_PRIVATE_SECTION_LEN: u16 = 4096;

/// Bytes before `section_length` counts: table_id and the length word.
pub const SECTION_PREFIX_LEN: usize = 3;

/// Size of the long-form header written at the start of every section.
pub const LONG_HEADER_LEN: usize = 8;

/// Offset of `last_section_number` in a long-form section.
pub const LAST_SECTION_NUMBER_OFFSET: usize = 7;

/// Running status values shared by SDT, EIT and RST entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum RunningStatus {
    /// Undefined (0).
    #[default]
    Undefined,
    /// Not running (1).
    NotRunning,
    /// Starts in a few seconds (2).
    StartsSoon,
    /// Pausing (3).
    Pausing,
    /// Running (4).
    Running,
    /// Service off-air (5).
    OffAir,
}

impl RunningStatus {
    /// The 3-bit wire value.
    pub fn value(self) -> u8 {
        match self {
            RunningStatus::Undefined => 0,
            RunningStatus::NotRunning => 1,
            RunningStatus::StartsSoon => 2,
            RunningStatus::Pausing => 3,
            RunningStatus::Running => 4,
            RunningStatus::OffAir => 5,
        }
    }
}

/// Identity, flags and capacity accounting shared by every table.
#[derive(Debug, Clone, PartialEq)]
pub struct TableHeader {
    table_id: u8,
    section_syntax_indicator: bool,
    private_indicator: bool,
    table_id_extension: u16,
    version_number: u8,
    current_next_indicator: bool,
    max_section_length: u16,
    length: usize,
}

impl TableHeader {
    /// Header for a table using the long section form.
    pub(crate) fn long(
        table_id: u8,
        table_id_extension: u16,
        private_indicator: bool,
        max_section_length: u16,
        base_length: usize,
    ) -> Self {
        Self {
            table_id,
            section_syntax_indicator: true,
            private_indicator,
            table_id_extension,
            version_number: 0,
            current_next_indicator: true,
            max_section_length,
            length: base_length,
        }
    }

    /// Header for a table using the short section form.
    pub(crate) fn short(
        table_id: u8,
        section_syntax_indicator: bool,
        max_section_length: u16,
        base_length: usize,
    ) -> Self {
        Self {
            table_id,
            section_syntax_indicator,
            private_indicator: true,
            table_id_extension: 0,
            version_number: 0,
            current_next_indicator: true,
            max_section_length,
            length: base_length,
        }
    }

    pub fn table_id(&self) -> u8 {
        self.table_id
    }

    pub fn section_syntax_indicator(&self) -> bool {
        self.section_syntax_indicator
    }

    pub fn private_indicator(&self) -> bool {
        self.private_indicator
    }

    pub fn table_id_extension(&self) -> u16 {
        self.table_id_extension
    }

    pub fn version_number(&self) -> u8 {
        self.version_number
    }

    pub fn current_next_indicator(&self) -> bool {
        self.current_next_indicator
    }

    /// Largest number of bytes a single section may take, CRC included.
    pub fn max_section_length(&self) -> u16 {
        self.max_section_length
    }

    /// Accumulated logical length of everything added so far.
    pub fn length(&self) -> usize {
        self.length
    }

    /// Returns true if `length` more bytes stay under the logical ceiling.
    pub fn fits(&self, length: usize) -> bool {
        self.length + length < MAX_TABLE_LEN
    }

    /// Commits `length` bytes if they fit. Returns `false` and changes
    /// nothing otherwise.
    pub fn try_reserve(&mut self, length: usize) -> bool {
        if !self.fits(length) {
            return false;
        }
        self.length += length;
        true
    }

    /// Returns true if `length` more bytes still fit one section of at most
    /// `max_section_length` bytes, `trailer_len` bytes of CRC included.
    ///
    /// Only tables that are always sent as a single section check this.
    pub fn fits_single_section(&self, length: usize, trailer_len: usize) -> bool {
        self.fits(length)
            && SECTION_PREFIX_LEN + self.length + length + trailer_len
                <= self.max_section_length as usize
    }

    /// Sets the 5-bit version number. Higher bits are dropped.
    pub fn set_version_number(&mut self, version: u8) {
        self.version_number = version & 0x1F;
    }

    /// Bumps the version number, wrapping from 31 to 0.
    pub fn increment_version_number(&mut self) {
        self.version_number = (self.version_number + 1) & 0x1F;
    }

    pub fn set_current_next_indicator(&mut self, current_next_indicator: bool) {
        self.current_next_indicator = current_next_indicator;
    }

    /// Largest section a table may use: 1024 bytes for the MPEG-2 program
    /// tables, 4096 for private and DVB SI sections.
    pub fn section_length_limit(&self) -> u16 {
        if self.private_indicator {
            MAX_PRIVATE_SECTION_LEN
        } else {
            DEFAULT_MAX_SECTION_LEN
        }
    }

    /// Overrides the maximum section length.
    ///
    /// Returns `false` and keeps the current value if `max_section_length`
    /// is above [`TableHeader::section_length_limit`], so the 12-bit
    /// section_length field can always hold the real length.
    pub fn set_max_section_length(&mut self, max_section_length: u16) -> bool {
        if max_section_length > self.section_length_limit() {
            return false;
        }
        self.max_section_length = max_section_length;
        true
    }

    /// Keeps `reserved` bytes of every section free for the caller.
    pub fn reduce_max_section_length(&mut self, reserved: u16) {
        self.max_section_length = self.max_section_length.saturating_sub(reserved);
    }

    /// The 16-bit word holding the syntax flags and a 12-bit section length.
    pub fn length_field(&self, section_length: usize) -> u16 {
        ((self.section_syntax_indicator as u16) << 15)
            | ((self.private_indicator as u16) << 14)
            | 0x3000
            | (section_length as u16 & 0x0FFF)
    }

    /// Writes the long-form header with placeholders for the section length
    /// and the last section number.
    pub(crate) fn write_long_header(
        &self,
        section: &mut Section,
        section_number: u8,
        last_section_number: u8,
    ) -> EncodingResult<()> {
        section.write_u8(self.table_id)?;
        section.write_u16(self.length_field(0))?;
        section.write_u16(self.table_id_extension)?;
        section.write_u8(
            0xC0 | (self.version_number << 1) | self.current_next_indicator as u8,
        )?;
        section.write_u8(section_number)?;
        section.write_u8(last_section_number)
    }

    /// Writes the short-form header: table_id and a length placeholder.
    pub(crate) fn write_short_header(&self, section: &mut Section) -> EncodingResult<()> {
        section.write_u8(self.table_id)?;
        section.write_u16(self.length_field(0))
    }

    /// Patches the section length of a section whose content is complete.
    ///
    /// The value counts everything after the length word, including the CRC
    /// trailer that is appended later.
    pub(crate) fn close_section(&self, section: &mut Section) -> EncodingResult<usize> {
        let section_length = section.len() - SECTION_PREFIX_LEN + CRC_LEN;
        section.patch_u16(1, self.length_field(section_length))?;
        Ok(section_length)
    }

    /// Patches the section length of a short section that has no CRC.
    pub(crate) fn close_section_without_crc(&self, section: &mut Section) -> EncodingResult<usize> {
        let section_length = section.len() - SECTION_PREFIX_LEN;
        section.patch_u16(1, self.length_field(section_length))?;
        Ok(section_length)
    }
}

/// A table that can be turned into sections.
pub trait PsiTable {
    /// The table's identity and capacity accounting.
    fn header(&self) -> &TableHeader;

    /// Mutable access to the header, for version and flag updates.
    fn header_mut(&mut self) -> &mut TableHeader;

    /// Encodes the table into an ordered run of finished sections.
    ///
    /// The table is left untouched, so building twice gives the same bytes.
    ///
    /// # Errors
    ///
    /// Fails if content reached the encoder that cannot be placed in any
    /// section, see [`crate::encoding::EncodingError`].
    fn build_sections(&self) -> EncodingResult<Vec<Section>>;

    fn set_version_number(&mut self, version: u8) {
        self.header_mut().set_version_number(version);
    }

    fn increment_version_number(&mut self) {
        self.header_mut().increment_version_number();
    }

    fn set_current_next_indicator(&mut self, current_next_indicator: bool) {
        self.header_mut()
            .set_current_next_indicator(current_next_indicator);
    }

    /// Returns `false` if the length is above the table's limit.
    fn set_max_section_length(&mut self, max_section_length: u16) -> bool {
        self.header_mut().set_max_section_length(max_section_length)
    }

    fn reduce_max_section_length(&mut self, reserved: u16) {
        self.header_mut().reduce_max_section_length(reserved);
    }
}

/// Adds `descriptor` to `list` if the table has room for it.
pub(crate) fn push_descriptor(
    header: &mut TableHeader,
    list: &mut DescriptorList,
    descriptor: Descriptor,
) -> bool {
    let length = descriptor.length();
    if !header.fits(length) || !list.try_push(descriptor) {
        return false;
    }
    header.try_reserve(length)
}

/// Adds `descriptor` to the loop of an item looked up by the caller.
pub(crate) fn push_item_descriptor<I, F>(
    header: &mut TableHeader,
    item: Option<&mut I>,
    descriptor: Descriptor,
    list_of: F,
) -> bool
where
    F: FnOnce(&mut I) -> &mut DescriptorList,
{
    match item {
        Some(item) => push_descriptor(header, list_of(item), descriptor),
        None => false,
    }
}
