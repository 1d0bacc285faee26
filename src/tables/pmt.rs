//! Program Map Table.

use super::{DEFAULT_MAX_SECTION_LEN, PsiTable, TableHeader, push_descriptor, push_item_descriptor};
use crate::descriptors::{Descriptor, DescriptorList};
use crate::encoding::splitter::{self, SectionLayout, TopLevelLoop};
use crate::encoding::{EncodingResult, LoopItem, Section};

/// Stream types from ISO/IEC 13818-1 Table 2-34.
pub mod stream_type {
    pub const MPEG1_VIDEO: u8 = 0x01;
    pub const MPEG2_VIDEO: u8 = 0x02;
    pub const MPEG1_AUDIO: u8 = 0x03;
    pub const MPEG2_AUDIO: u8 = 0x04;
    pub const PRIVATE_SECTIONS: u8 = 0x05;
    pub const PES_PRIVATE_DATA: u8 = 0x06;
    pub const ADTS_AUDIO: u8 = 0x0F;
    pub const H264_VIDEO: u8 = 0x1B;
    pub const HEVC_VIDEO: u8 = 0x24;
}

/// An elementary stream entry with its ES_info loop.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementaryStream {
    pub stream_type: u8,
    pub elementary_pid: u16,
    descriptors: DescriptorList,
}

impl ElementaryStream {
    const BASE_LEN: usize = 5;

    pub fn descriptors(&self) -> &DescriptorList {
        &self.descriptors
    }
}

impl LoopItem for ElementaryStream {
    fn header_len(&self) -> usize {
        3
    }

    fn write_header(&self, section: &mut Section) -> EncodingResult<()> {
        section.write_u8(self.stream_type)?;
        section.write_u16(0xE000 | (self.elementary_pid & 0x1FFF))
    }

    fn descriptors(&self) -> Option<&DescriptorList> {
        Some(&self.descriptors)
    }
}

/// Program Map Table (table_id 0x02) for one program.
#[derive(Debug, Clone, PartialEq)]
pub struct Pmt {
    header: TableHeader,
    pcr_pid: u16,
    program_info: DescriptorList,
    streams: Vec<ElementaryStream>,
}

impl Pmt {
    pub const TABLE_ID: u8 = 0x02;
    const BASE_LEN: usize = 9;

    /// Creates an empty PMT for `program_number`.
    pub fn new(program_number: u16, pcr_pid: u16, version: u8) -> Self {
        let mut header = TableHeader::long(
            Self::TABLE_ID,
            program_number,
            false,
            DEFAULT_MAX_SECTION_LEN,
            Self::BASE_LEN,
        );
        header.set_version_number(version);
        Self {
            header,
            pcr_pid: pcr_pid & 0x1FFF,
            program_info: DescriptorList::new(),
            streams: Vec::new(),
        }
    }

    pub fn pcr_pid(&self) -> u16 {
        self.pcr_pid
    }

    /// Adds a descriptor to the program_info loop.
    pub fn add_program_descriptor(&mut self, descriptor: impl Into<Descriptor>) -> bool {
        push_descriptor(&mut self.header, &mut self.program_info, descriptor.into())
    }

    /// Adds an elementary stream. Returns `false` if the table is full.
    pub fn add_elementary_stream(&mut self, stream_type: u8, elementary_pid: u16) -> bool {
        if !self.header.try_reserve(ElementaryStream::BASE_LEN) {
            return false;
        }
        self.streams.push(ElementaryStream {
            stream_type,
            elementary_pid,
            descriptors: DescriptorList::new(),
        });
        true
    }

    /// Adds a descriptor to the stream added last.
    pub fn add_elementary_stream_descriptor(&mut self, descriptor: impl Into<Descriptor>) -> bool {
        push_item_descriptor(
            &mut self.header,
            self.streams.last_mut(),
            descriptor.into(),
            |stream| &mut stream.descriptors,
        )
    }

    /// Adds a descriptor to the stream carried on `elementary_pid`.
    pub fn add_elementary_stream_descriptor_to(
        &mut self,
        elementary_pid: u16,
        descriptor: impl Into<Descriptor>,
    ) -> bool {
        let stream = self
            .streams
            .iter_mut()
            .find(|stream| stream.elementary_pid == elementary_pid);
        push_item_descriptor(&mut self.header, stream, descriptor.into(), |stream| {
            &mut stream.descriptors
        })
    }

    pub fn program_descriptors(&self) -> &DescriptorList {
        &self.program_info
    }

    pub fn streams(&self) -> &[ElementaryStream] {
        &self.streams
    }
}

impl SectionLayout for Pmt {
    type Item = ElementaryStream;

    fn table_header(&self) -> &TableHeader {
        &self.header
    }

    fn write_fixed_fields(&self, section: &mut Section) -> EncodingResult<()> {
        section.write_u16(0xE000 | self.pcr_pid)
    }

    fn top_level(&self) -> TopLevelLoop<'_> {
        TopLevelLoop::Sized(&self.program_info)
    }

    fn items(&self) -> &[ElementaryStream] {
        &self.streams
    }
}

impl PsiTable for Pmt {
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
