//! Stuffing Table.

use super::{MAX_PRIVATE_SECTION_LEN, PsiTable, SECTION_PREFIX_LEN, TableHeader};
use crate::encoding::{EncodingResult, Section};

/// Stuffing Table (table_id 0x72): a short section of filler bytes, used to
/// replace sections that have to be invalidated in place.
#[derive(Debug, Clone, PartialEq)]
pub struct StuffingTable {
    header: TableHeader,
    data: Vec<u8>,
}

impl StuffingTable {
    pub const TABLE_ID: u8 = 0x72;
    /// Largest amount of stuffing one section can carry.
    pub const MAX_DATA_LEN: usize = MAX_PRIVATE_SECTION_LEN as usize - SECTION_PREFIX_LEN;

    /// Creates a table carrying `data`, truncated to [`Self::MAX_DATA_LEN`].
    pub fn new(data: &[u8], section_syntax_indicator: bool) -> Self {
        let data = data[..data.len().min(Self::MAX_DATA_LEN)].to_vec();
        Self {
            header: TableHeader::short(
                Self::TABLE_ID,
                section_syntax_indicator,
                MAX_PRIVATE_SECTION_LEN,
                data.len(),
            ),
            data,
        }
    }

    /// Creates a table of `len` copies of `byte`.
    pub fn from_byte(byte: u8, len: usize, section_syntax_indicator: bool) -> Self {
        Self::new(
            &vec![byte; len.min(Self::MAX_DATA_LEN)],
            section_syntax_indicator,
        )
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

impl PsiTable for StuffingTable {
    fn header(&self) -> &TableHeader {
        &self.header
    }

    fn header_mut(&mut self) -> &mut TableHeader {
        &mut self.header
    }

    fn build_sections(&self) -> EncodingResult<Vec<Section>> {
        let mut section = Section::new(self.header.max_section_length());
        self.header.write_short_header(&mut section)?;
        section.write_bytes(&self.data)?;
        self.header.close_section_without_crc(&mut section)?;
        Ok(vec![section])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stuffing_layout() {
        let st = StuffingTable::new(b"abc", true);
        let sections = st.build_sections().unwrap();
        assert_eq!(sections[0].as_bytes(), &[0x72, 0xF0, 0x03, b'a', b'b', b'c']);

        let st = StuffingTable::from_byte(0xFF, 2, false);
        let sections = st.build_sections().unwrap();
        assert_eq!(sections[0].as_bytes(), &[0x72, 0x70, 0x02, 0xFF, 0xFF]);
    }

    #[test]
    fn test_stuffing_is_truncated() {
        let st = StuffingTable::from_byte(0xBB, 5000, true);
        assert_eq!(st.data().len(), 4093);

        let sections = st.build_sections().unwrap();
        let bytes = sections[0].as_bytes();
        assert_eq!(bytes.len(), 4096);
        assert_eq!(&bytes[..3], &[0x72, 0xFF, 0xFD]);
        assert!(bytes[3..].iter().all(|&b| b == 0xBB));
    }
}
