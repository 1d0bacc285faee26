//! Running Status Table.

use super::{DEFAULT_MAX_SECTION_LEN, PsiTable, RunningStatus, TableHeader};
use crate::encoding::{EncodingResult, Section};

/// One running status update for an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RunningStatusEntry {
    pub transport_stream_id: u16,
    pub original_network_id: u16,
    pub service_id: u16,
    pub event_id: u16,
    pub running_status: RunningStatus,
}

impl RunningStatusEntry {
    /// Bytes taken on the wire.
    pub const LEN: usize = 9;

    fn write(&self, section: &mut Section) -> EncodingResult<()> {
        section.write_u16(self.transport_stream_id)?;
        section.write_u16(self.original_network_id)?;
        section.write_u16(self.service_id)?;
        section.write_u16(self.event_id)?;
        section.write_u8(0xF8 | self.running_status.value())
    }
}

/// Running Status Table (table_id 0x71). A short section without CRC.
#[derive(Debug, Clone, PartialEq)]
pub struct Rst {
    header: TableHeader,
    entries: Vec<RunningStatusEntry>,
}

impl Default for Rst {
    fn default() -> Self {
        Self::new()
    }
}

impl Rst {
    pub const TABLE_ID: u8 = 0x71;
    pub const PID: u16 = 0x0013;

    pub fn new() -> Self {
        Self {
            header: TableHeader::short(Self::TABLE_ID, false, DEFAULT_MAX_SECTION_LEN, 0),
            entries: Vec::new(),
        }
    }

    /// Adds an entry. Returns `false` if it would not fit the single section
    /// of the table.
    pub fn add_entry(&mut self, entry: RunningStatusEntry) -> bool {
        if !self.header.fits_single_section(RunningStatusEntry::LEN, 0)
            || !self.header.try_reserve(RunningStatusEntry::LEN)
        {
            return false;
        }
        self.entries.push(entry);
        true
    }

    pub fn entries(&self) -> &[RunningStatusEntry] {
        &self.entries
    }
}

impl PsiTable for Rst {
    fn header(&self) -> &TableHeader {
        &self.header
    }

    fn header_mut(&mut self) -> &mut TableHeader {
        &mut self.header
    }

    fn build_sections(&self) -> EncodingResult<Vec<Section>> {
        let mut section = Section::new(self.header.max_section_length());
        self.header.write_short_header(&mut section)?;
        for entry in &self.entries {
            entry.write(&mut section)?;
        }
        self.header.close_section_without_crc(&mut section)?;
        Ok(vec![section])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(event_id: u16) -> RunningStatusEntry {
        RunningStatusEntry {
            transport_stream_id: 0x0001,
            original_network_id: 0x2000,
            service_id: 0x0101,
            event_id,
            running_status: RunningStatus::Running,
        }
    }

    #[test]
    fn test_rst_layout() {
        let mut rst = Rst::new();
        assert!(rst.add_entry(entry(0x0042)));

        let sections = rst.build_sections().unwrap();
        assert_eq!(
            sections[0].as_bytes(),
            &[
                0x71, 0x70, 0x09, // header
                0x00, 0x01, 0x20, 0x00, 0x01, 0x01, 0x00, 0x42, 0xFC,
            ]
        );
    }

    #[test]
    fn test_empty_rst() {
        let sections = Rst::default().build_sections().unwrap();
        assert_eq!(sections[0].as_bytes(), &[0x71, 0x70, 0x00]);
    }

    #[test]
    fn test_rst_single_section_limit() {
        let mut rst = Rst::new();
        // (1024 - 3) / 9
        for event_id in 0..113 {
            assert!(rst.add_entry(entry(event_id)));
        }
        assert!(!rst.add_entry(entry(113)));
        assert_eq!(rst.entries().len(), 113);
        assert_eq!(rst.header().length(), 113 * 9);

        let sections = rst.build_sections().unwrap();
        assert_eq!(sections[0].len(), 3 + 113 * 9);
    }
}
