//! Program Association Table.

use super::{DEFAULT_MAX_SECTION_LEN, PsiTable, TableHeader};
use crate::descriptors::DescriptorList;
use crate::encoding::splitter::{self, SectionLayout};
use crate::encoding::{EncodingResult, LoopItem, Section};

/// One program_number / PID pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Program {
    /// program_number; 0 points at the network PID.
    pub program_number: u16,
    /// PMT PID (or network PID for program 0).
    pub pid: u16,
}

impl Program {
    const LEN: usize = 4;
}

impl LoopItem for Program {
    fn header_len(&self) -> usize {
        Self::LEN
    }

    fn write_header(&self, section: &mut Section) -> EncodingResult<()> {
        section.write_u16(self.program_number)?;
        section.write_u16(0xE000 | (self.pid & 0x1FFF))
    }

    fn descriptors(&self) -> Option<&DescriptorList> {
        None
    }
}

/// Program Association Table (table_id 0x00, PID 0x0000).
#[derive(Debug, Clone, PartialEq)]
pub struct Pat {
    header: TableHeader,
    programs: Vec<Program>,
}

impl Pat {
    pub const TABLE_ID: u8 = 0x00;
    pub const PID: u16 = 0x0000;
    const BASE_LEN: usize = 5;

    /// Creates an empty PAT for `transport_stream_id`.
    pub fn new(transport_stream_id: u16, version: u8) -> Self {
        let mut header = TableHeader::long(
            Self::TABLE_ID,
            transport_stream_id,
            false,
            DEFAULT_MAX_SECTION_LEN,
            Self::BASE_LEN,
        );
        header.set_version_number(version);
        Self {
            header,
            programs: Vec::new(),
        }
    }

    /// Adds a program. Returns `false` if the table is full.
    pub fn add_program(&mut self, program_number: u16, pid: u16) -> bool {
        if !self.header.try_reserve(Program::LEN) {
            return false;
        }
        self.programs.push(Program {
            program_number,
            pid,
        });
        true
    }

    /// Adds the network PID entry (program_number 0).
    pub fn add_network_pid(&mut self, pid: u16) -> bool {
        self.add_program(0, pid)
    }

    pub fn programs(&self) -> &[Program] {
        &self.programs
    }
}

impl SectionLayout for Pat {
    type Item = Program;

    fn table_header(&self) -> &TableHeader {
        &self.header
    }

    fn items(&self) -> &[Program] {
        &self.programs
    }
}

impl PsiTable for Pat {
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
