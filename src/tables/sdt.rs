//! Service Description Table.

use super::{
    DEFAULT_MAX_SECTION_LEN, PsiTable, RunningStatus, TableHeader, push_item_descriptor,
};
use crate::descriptors::{Descriptor, DescriptorList};
use crate::encoding::splitter::{self, SectionLayout};
use crate::encoding::{EncodingResult, LoopItem, Section};

/// A service entry with its descriptor loop.
#[derive(Debug, Clone, PartialEq)]
pub struct Service {
    pub service_id: u16,
    pub eit_schedule_flag: bool,
    pub eit_present_following_flag: bool,
    pub running_status: RunningStatus,
    pub free_ca_mode: bool,
    descriptors: DescriptorList,
}

impl Service {
    const BASE_LEN: usize = 5;

    pub fn descriptors(&self) -> &DescriptorList {
        &self.descriptors
    }
}

impl LoopItem for Service {
    fn header_len(&self) -> usize {
        3
    }

    fn write_header(&self, section: &mut Section) -> EncodingResult<()> {
        section.write_u16(self.service_id)?;
        section.write_u8(
            0xFC | (self.eit_schedule_flag as u8) << 1 | self.eit_present_following_flag as u8,
        )
    }

    fn descriptors(&self) -> Option<&DescriptorList> {
        Some(&self.descriptors)
    }

    fn loop_length_field(&self, length: usize) -> u16 {
        (self.running_status.value() as u16) << 13
            | (self.free_ca_mode as u16) << 12
            | (length as u16 & 0x0FFF)
    }
}

/// Service Description Table (table_id 0x42 actual, 0x46 other).
#[derive(Debug, Clone, PartialEq)]
pub struct Sdt {
    header: TableHeader,
    original_network_id: u16,
    services: Vec<Service>,
}

impl Sdt {
    pub const ACTUAL_TABLE_ID: u8 = 0x42;
    pub const OTHER_TABLE_ID: u8 = 0x46;
    pub const PID: u16 = 0x0011;
    const BASE_LEN: usize = 8;

    fn new(table_id: u8, transport_stream_id: u16, original_network_id: u16, version: u8) -> Self {
        let mut header = TableHeader::long(
            table_id,
            transport_stream_id,
            true,
            DEFAULT_MAX_SECTION_LEN,
            Self::BASE_LEN,
        );
        header.set_version_number(version);
        Self {
            header,
            original_network_id,
            services: Vec::new(),
        }
    }

    /// SDT for the transport stream it is carried in.
    pub fn actual(transport_stream_id: u16, original_network_id: u16, version: u8) -> Self {
        Self::new(Self::ACTUAL_TABLE_ID, transport_stream_id, original_network_id, version)
    }

    /// SDT for another transport stream.
    pub fn other(transport_stream_id: u16, original_network_id: u16, version: u8) -> Self {
        Self::new(Self::OTHER_TABLE_ID, transport_stream_id, original_network_id, version)
    }

    pub fn original_network_id(&self) -> u16 {
        self.original_network_id
    }

    /// Adds a service. Returns `false` if the table is full.
    pub fn add_service(
        &mut self,
        service_id: u16,
        eit_schedule_flag: bool,
        eit_present_following_flag: bool,
        running_status: RunningStatus,
        free_ca_mode: bool,
    ) -> bool {
        if !self.header.try_reserve(Service::BASE_LEN) {
            return false;
        }
        self.services.push(Service {
            service_id,
            eit_schedule_flag,
            eit_present_following_flag,
            running_status,
            free_ca_mode,
            descriptors: DescriptorList::new(),
        });
        true
    }

    /// Adds a descriptor to the service added last.
    pub fn add_service_descriptor(&mut self, descriptor: impl Into<Descriptor>) -> bool {
        push_item_descriptor(
            &mut self.header,
            self.services.last_mut(),
            descriptor.into(),
            |service| &mut service.descriptors,
        )
    }

    /// Adds a descriptor to the service with `service_id`.
    pub fn add_service_descriptor_to(
        &mut self,
        service_id: u16,
        descriptor: impl Into<Descriptor>,
    ) -> bool {
        let service = self
            .services
            .iter_mut()
            .find(|service| service.service_id == service_id);
        push_item_descriptor(&mut self.header, service, descriptor.into(), |service| {
            &mut service.descriptors
        })
    }

    pub fn services(&self) -> &[Service] {
        &self.services
    }
}

impl SectionLayout for Sdt {
    type Item = Service;

    fn table_header(&self) -> &TableHeader {
        &self.header
    }

    fn write_fixed_fields(&self, section: &mut Section) -> EncodingResult<()> {
        section.write_u16(self.original_network_id)?;
        section.write_u8(0xFF)
    }

    fn items(&self) -> &[Service] {
        &self.services
    }
}

impl PsiTable for Sdt {
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crc::validate_section_crc;
    use crate::descriptors::ServiceDescriptor;

    #[test]
    fn test_sdt_layout() {
        let mut sdt = Sdt::actual(0x0001, 0x2000, 0);
        assert!(sdt.add_service(0x0101, false, true, RunningStatus::Running, true));
        assert!(sdt.add_service_descriptor(ServiceDescriptor::new(0x01, "P", "S")));

        let sections = sdt.build_sections().unwrap();
        assert_eq!(sections.len(), 1);
        let bytes = sections[0].as_bytes();
        assert_eq!(
            &bytes[..bytes.len() - 4],
            &[
                0x42, 0xF0, 0x18, 0x00, 0x01, 0xC1, 0x00, 0x00, // header
                0x20, 0x00, 0xFF, // original_network_id, reserved
                0x01, 0x01, 0xFD, 0x90, 0x07, // service header, loop field
                0x48, 0x05, 0x01, 0x01, b'P', 0x01, b'S',
            ]
        );
        assert!(validate_section_crc(bytes).unwrap());
    }

    #[test]
    fn test_flags_survive_split() {
        let mut sdt = Sdt::other(0x0002, 0x0003, 4);
        assert!(sdt.add_service(0x0010, true, false, RunningStatus::NotRunning, false));
        for _ in 0..6 {
            assert!(sdt.add_service_descriptor(Descriptor::raw(0x80, vec![0; 255]).unwrap()));
        }

        let sections = sdt.build_sections().unwrap();
        assert_eq!(sections.len(), 2);
        for section in &sections {
            let bytes = section.as_bytes();
            assert_eq!(bytes[0], 0x46);
            assert_eq!(&bytes[11..14], &[0x00, 0x10, 0xFE]);
            // running_status 1, free_CA_mode 0
            assert_eq!(bytes[14] & 0xF0, 0x20);
        }
    }

    #[test]
    fn test_descriptor_to_unknown_service() {
        let mut sdt = Sdt::actual(1, 1, 0);
        assert!(!sdt.add_service_descriptor(ServiceDescriptor::new(1, "", "")));
        assert!(sdt.add_service(5, false, false, RunningStatus::Undefined, false));
        assert!(!sdt.add_service_descriptor_to(6, ServiceDescriptor::new(1, "", "")));
        assert!(sdt.add_service_descriptor_to(5, ServiceDescriptor::new(1, "", "")));
        assert_eq!(sdt.header().length(), 8 + 5 + 5);
    }
}
