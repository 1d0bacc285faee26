//! Time and Date Table and Time Offset Table.
//!
//! Both use the short section form and always fit one section.

use super::{DEFAULT_MAX_SECTION_LEN, PsiTable, TableHeader, push_descriptor};
use crate::crc::CRC_LEN;
use crate::descriptors::{Descriptor, DescriptorList};
use crate::encoding::item_loop::{LOOP_LENGTH_LEN, loop_length_field};
use crate::encoding::{Encodable, EncodingResult, Section};
use crate::time::UtcTime;

/// Time and Date Table (table_id 0x70): the current UTC time and nothing
/// else. It carries no CRC.
#[derive(Debug, Clone, PartialEq)]
pub struct Tdt {
    header: TableHeader,
    utc_time: UtcTime,
}

impl Tdt {
    pub const TABLE_ID: u8 = 0x70;
    pub const PID: u16 = 0x0014;
    const MAX_SECTION_LEN: u16 = 8;

    pub fn new(utc_time: UtcTime) -> Self {
        Self {
            header: TableHeader::short(
                Self::TABLE_ID,
                false,
                Self::MAX_SECTION_LEN,
                UtcTime::LEN,
            ),
            utc_time,
        }
    }

    pub fn utc_time(&self) -> UtcTime {
        self.utc_time
    }

    pub fn set_utc_time(&mut self, utc_time: UtcTime) {
        self.utc_time = utc_time;
    }
}

impl PsiTable for Tdt {
    fn header(&self) -> &TableHeader {
        &self.header
    }

    fn header_mut(&mut self) -> &mut TableHeader {
        &mut self.header
    }

    fn build_sections(&self) -> EncodingResult<Vec<Section>> {
        let mut section = Section::new(self.header.max_section_length());
        self.header.write_short_header(&mut section)?;
        self.utc_time.write(&mut section)?;
        self.header.close_section_without_crc(&mut section)?;
        Ok(vec![section])
    }
}

/// Time Offset Table (table_id 0x73): UTC time plus a descriptor loop,
/// usually local time offset descriptors.
#[derive(Debug, Clone, PartialEq)]
pub struct Tot {
    header: TableHeader,
    utc_time: UtcTime,
    descriptors: DescriptorList,
}

impl Tot {
    pub const TABLE_ID: u8 = 0x73;
    pub const PID: u16 = 0x0014;

    pub fn new(utc_time: UtcTime) -> Self {
        Self {
            header: TableHeader::short(
                Self::TABLE_ID,
                false,
                DEFAULT_MAX_SECTION_LEN,
                UtcTime::LEN + LOOP_LENGTH_LEN,
            ),
            utc_time,
            descriptors: DescriptorList::new(),
        }
    }

    pub fn utc_time(&self) -> UtcTime {
        self.utc_time
    }

    pub fn set_utc_time(&mut self, utc_time: UtcTime) {
        self.utc_time = utc_time;
    }

    /// Adds a descriptor. Returns `false` if it would not fit the single
    /// section of the table.
    pub fn add_descriptor(&mut self, descriptor: impl Into<Descriptor>) -> bool {
        let descriptor = descriptor.into();
        if !self
            .header
            .fits_single_section(descriptor.length(), CRC_LEN)
        {
            return false;
        }
        push_descriptor(&mut self.header, &mut self.descriptors, descriptor)
    }

    pub fn descriptors(&self) -> &DescriptorList {
        &self.descriptors
    }
}

impl PsiTable for Tot {
    fn header(&self) -> &TableHeader {
        &self.header
    }

    fn header_mut(&mut self) -> &mut TableHeader {
        &mut self.header
    }

    fn build_sections(&self) -> EncodingResult<Vec<Section>> {
        let mut section = Section::new(self.header.max_section_length());
        self.header.write_short_header(&mut section)?;
        self.utc_time.write(&mut section)?;
        section.write_u16(loop_length_field(self.descriptors.loop_length()))?;
        for descriptor in self.descriptors.iter() {
            descriptor.encode(&mut section)?;
        }
        self.header.close_section(&mut section)?;
        section.finalize_crc()?;
        Ok(vec![section])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crc::validate_section_crc;

    fn noon() -> UtcTime {
        UtcTime::new(0xC079, 12, 45, 0)
    }

    #[test]
    fn test_tdt_layout() {
        let tdt = Tdt::new(noon());
        let sections = tdt.build_sections().unwrap();
        assert_eq!(sections.len(), 1);
        assert_eq!(
            sections[0].as_bytes(),
            &[0x70, 0x70, 0x05, 0xC0, 0x79, 0x12, 0x45, 0x00]
        );
        assert_eq!(sections[0].crc(), None);
    }

    #[test]
    fn test_tdt_time_update() {
        let mut tdt = Tdt::new(noon());
        tdt.set_utc_time(UtcTime::new(0xC079, 23, 59, 59));
        let bytes = tdt.build_sections().unwrap()[0].clone().into_bytes();
        assert_eq!(&bytes[5..], &[0x23, 0x59, 0x59]);
    }

    #[test]
    fn test_tot_layout() {
        let mut tot = Tot::new(noon());
        assert!(tot.add_descriptor(Descriptor::raw(0x80, vec![0xAB, 0xCD]).unwrap()));

        let sections = tot.build_sections().unwrap();
        assert_eq!(sections.len(), 1);
        assert_eq!(
            sections[0].as_bytes(),
            &[
                0x73, 0x70, 0x0F, 0xC0, 0x79, 0x12, 0x45, 0x00, // header, UTC
                0xF0, 0x04, 0x80, 0x02, 0xAB, 0xCD, // descriptor loop
                0x45, 0x48, 0x52, 0x20,
            ]
        );
        assert!(validate_section_crc(sections[0].as_bytes()).unwrap());
    }

    #[test]
    fn test_tot_rejects_second_section() {
        let mut tot = Tot::new(noon());
        // 3 + 7 + 4 leaves 1010 bytes: three full descriptors and 239 more
        for _ in 0..3 {
            assert!(tot.add_descriptor(Descriptor::raw(0x80, vec![0; 255]).unwrap()));
        }
        assert!(!tot.add_descriptor(Descriptor::raw(0x80, vec![0; 238]).unwrap()));
        assert!(tot.add_descriptor(Descriptor::raw(0x80, vec![0; 237]).unwrap()));
        assert!(!tot.add_descriptor(Descriptor::raw(0x80, Vec::new()).unwrap()));
        assert_eq!(tot.descriptors().len(), 4);

        let sections = tot.build_sections().unwrap();
        assert_eq!(sections[0].len(), 1024);
        assert!(validate_section_crc(sections[0].as_bytes()).unwrap());
    }
}
