//! Conditional Access Table.

use super::{DEFAULT_MAX_SECTION_LEN, PsiTable, TableHeader, push_descriptor};
use crate::descriptors::{Descriptor, DescriptorList};
use crate::encoding::splitter::{self, NoItem, SectionLayout, TopLevelLoop};
use crate::encoding::{EncodingResult, Section};

/// Conditional Access Table (table_id 0x01, PID 0x0001).
///
/// The body is a plain run of descriptors with no loop length in front, so
/// the table splits between any two descriptors.
#[derive(Debug, Clone, PartialEq)]
pub struct Cat {
    header: TableHeader,
    descriptors: DescriptorList,
}

impl Cat {
    pub const TABLE_ID: u8 = 0x01;
    pub const PID: u16 = 0x0001;
    const BASE_LEN: usize = 5;

    pub fn new(version: u8) -> Self {
        let mut header = TableHeader::long(
            Self::TABLE_ID,
            0xFFFF,
            false,
            DEFAULT_MAX_SECTION_LEN,
            Self::BASE_LEN,
        );
        header.set_version_number(version);
        Self {
            header,
            descriptors: DescriptorList::new(),
        }
    }

    /// Adds a descriptor. Returns `false` if the table is full.
    pub fn add_descriptor(&mut self, descriptor: impl Into<Descriptor>) -> bool {
        push_descriptor(&mut self.header, &mut self.descriptors, descriptor.into())
    }

    pub fn descriptors(&self) -> &DescriptorList {
        &self.descriptors
    }
}

impl SectionLayout for Cat {
    type Item = NoItem;

    fn table_header(&self) -> &TableHeader {
        &self.header
    }

    fn top_level(&self) -> TopLevelLoop<'_> {
        TopLevelLoop::Bare(&self.descriptors)
    }

    fn items(&self) -> &[NoItem] {
        &[]
    }
}

impl PsiTable for Cat {
    fn header(&self) -> &TableHeader {
        &self.header
    }

    fn header_mut(&mut self) -> &mut TableHeader {
        &mut self.header
    }

    fn build_sections(&self) -> EncodingResult<Vec<Section>> {
        splitter::build_sections(self)
    }
}
