//! Network Information Table and Bouquet Association Table.
//!
//! Both tables share one layout: a sized table-level descriptor loop
//! followed by a sized loop of transport streams, each with its own
//! descriptors. They only differ in table id and in what the extension
//! field identifies.

use super::{DEFAULT_MAX_SECTION_LEN, PsiTable, TableHeader, push_descriptor, push_item_descriptor};
use crate::descriptors::{Descriptor, DescriptorList};
use crate::encoding::splitter::{self, SectionLayout, TopLevelLoop};
use crate::encoding::{EncodingResult, LoopItem, Section};

/// A transport stream entry with its descriptor loop.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportStream {
    pub transport_stream_id: u16,
    pub original_network_id: u16,
    descriptors: DescriptorList,
}

impl TransportStream {
    const BASE_LEN: usize = 6;

    pub fn descriptors(&self) -> &DescriptorList {
        &self.descriptors
    }
}

impl LoopItem for TransportStream {
    fn header_len(&self) -> usize {
        4
    }

    fn write_header(&self, section: &mut Section) -> EncodingResult<()> {
        section.write_u16(self.transport_stream_id)?;
        section.write_u16(self.original_network_id)
    }

    fn descriptors(&self) -> Option<&DescriptorList> {
        Some(&self.descriptors)
    }
}

#[derive(Debug, Clone, PartialEq)]
struct TransportStreamTable {
    header: TableHeader,
    descriptors: DescriptorList,
    transport_streams: Vec<TransportStream>,
}

impl TransportStreamTable {
    const BASE_LEN: usize = 9;

    fn new(table_id: u8, table_id_extension: u16, version: u8) -> Self {
        let mut header = TableHeader::long(
            table_id,
            table_id_extension,
            true,
            DEFAULT_MAX_SECTION_LEN,
            Self::BASE_LEN,
        );
        header.set_version_number(version);
        Self {
            header,
            descriptors: DescriptorList::new(),
            transport_streams: Vec::new(),
        }
    }

    fn add_descriptor(&mut self, descriptor: Descriptor) -> bool {
        push_descriptor(&mut self.header, &mut self.descriptors, descriptor)
    }

    fn add_transport_stream(&mut self, transport_stream_id: u16, original_network_id: u16) -> bool {
        if !self.header.try_reserve(TransportStream::BASE_LEN) {
            return false;
        }
        self.transport_streams.push(TransportStream {
            transport_stream_id,
            original_network_id,
            descriptors: DescriptorList::new(),
        });
        true
    }

    fn add_transport_stream_descriptor(&mut self, descriptor: Descriptor) -> bool {
        push_item_descriptor(
            &mut self.header,
            self.transport_streams.last_mut(),
            descriptor,
            |ts| &mut ts.descriptors,
        )
    }

    fn add_transport_stream_descriptor_to(
        &mut self,
        transport_stream_id: u16,
        original_network_id: u16,
        descriptor: Descriptor,
    ) -> bool {
        let ts = self.transport_streams.iter_mut().find(|ts| {
            ts.transport_stream_id == transport_stream_id
                && ts.original_network_id == original_network_id
        });
        push_item_descriptor(&mut self.header, ts, descriptor, |ts| &mut ts.descriptors)
    }
}

impl SectionLayout for TransportStreamTable {
    type Item = TransportStream;

    fn table_header(&self) -> &TableHeader {
        &self.header
    }

    fn top_level(&self) -> TopLevelLoop<'_> {
        TopLevelLoop::Sized(&self.descriptors)
    }

    fn sized_item_loop(&self) -> bool {
        true
    }

    fn items(&self) -> &[TransportStream] {
        &self.transport_streams
    }
}

macro_rules! transport_stream_table {
    ($(#[$meta:meta])* $name:ident, $add_descriptor:ident, $descriptors:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq)]
        pub struct $name(TransportStreamTable);

        impl $name {
            /// Adds a table-level descriptor. Returns `false` if the table is full.
            pub fn $add_descriptor(&mut self, descriptor: impl Into<Descriptor>) -> bool {
                self.0.add_descriptor(descriptor.into())
            }

            /// Adds a transport stream. Returns `false` if the table is full.
            pub fn add_transport_stream(
                &mut self,
                transport_stream_id: u16,
                original_network_id: u16,
            ) -> bool {
                self.0
                    .add_transport_stream(transport_stream_id, original_network_id)
            }

            /// Adds a descriptor to the transport stream added last.
            pub fn add_transport_stream_descriptor(
                &mut self,
                descriptor: impl Into<Descriptor>,
            ) -> bool {
                self.0.add_transport_stream_descriptor(descriptor.into())
            }

            /// Adds a descriptor to the transport stream with the given ids.
            pub fn add_transport_stream_descriptor_to(
                &mut self,
                transport_stream_id: u16,
                original_network_id: u16,
                descriptor: impl Into<Descriptor>,
            ) -> bool {
                self.0.add_transport_stream_descriptor_to(
                    transport_stream_id,
                    original_network_id,
                    descriptor.into(),
                )
            }

            pub fn $descriptors(&self) -> &DescriptorList {
                &self.0.descriptors
            }

            pub fn transport_streams(&self) -> &[TransportStream] {
                &self.0.transport_streams
            }
        }

        impl PsiTable for $name {
            fn header(&self) -> &TableHeader {
                &self.0.header
            }

            fn header_mut(&mut self) -> &mut TableHeader {
                &mut self.0.header
            }

            fn build_sections(&self) -> EncodingResult<Vec<Section>> {
                splitter::build_sections(&self.0)
            }
        }
    };
}

transport_stream_table!(
    /// Network Information Table (table_id 0x40 actual, 0x41 other).
    Nit,
    add_network_descriptor,
    network_descriptors
);

transport_stream_table!(
    /// Bouquet Association Table (table_id 0x4A).
    Bat,
    add_bouquet_descriptor,
    bouquet_descriptors
);

impl Nit {
    pub const ACTUAL_TABLE_ID: u8 = 0x40;
    pub const OTHER_TABLE_ID: u8 = 0x41;
    pub const PID: u16 = 0x0010;

    /// NIT describing the network the stream is carried on.
    pub fn actual(network_id: u16, version: u8) -> Self {
        Self(TransportStreamTable::new(Self::ACTUAL_TABLE_ID, network_id, version))
    }

    /// NIT describing another network.
    pub fn other(network_id: u16, version: u8) -> Self {
        Self(TransportStreamTable::new(Self::OTHER_TABLE_ID, network_id, version))
    }
}

impl Bat {
    pub const TABLE_ID: u8 = 0x4A;
    pub const PID: u16 = 0x0011;

    pub fn new(bouquet_id: u16, version: u8) -> Self {
        Self(TransportStreamTable::new(Self::TABLE_ID, bouquet_id, version))
    }
}
