//! Event Information Table, present/following.

use super::{MAX_PRIVATE_SECTION_LEN, PsiTable, RunningStatus, TableHeader, push_item_descriptor};
use crate::descriptors::{Descriptor, DescriptorList};
use crate::encoding::splitter::{self, SectionLayout};
use crate::encoding::{EncodingResult, LoopItem, Section};
use crate::time::{BcdDuration, UtcTime};

/// An event entry with its descriptor loop.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub event_id: u16,
    pub start_time: UtcTime,
    pub duration: BcdDuration,
    pub running_status: RunningStatus,
    pub free_ca_mode: bool,
    descriptors: DescriptorList,
}

impl Event {
    const BASE_LEN: usize = 12;

    pub fn descriptors(&self) -> &DescriptorList {
        &self.descriptors
    }
}

impl LoopItem for Event {
    fn header_len(&self) -> usize {
        2 + UtcTime::LEN + BcdDuration::LEN
    }

    fn write_header(&self, section: &mut Section) -> EncodingResult<()> {
        section.write_u16(self.event_id)?;
        self.start_time.write(section)?;
        self.duration.write(section)
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

/// Which of the two present/following sections an event goes into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum EventSlot {
    /// Section 0.
    Present,
    /// Section 1.
    Following,
}

/// Present/following EIT (table_id 0x4E actual, 0x4F other).
///
/// This table is not sectionable: it is always sent as exactly two
/// sections, the present event in section 0 and the following event in
/// section 1, each of which has to fit a single section.
#[derive(Debug, Clone, PartialEq)]
pub struct PfEit {
    header: TableHeader,
    transport_stream_id: u16,
    original_network_id: u16,
    present: Vec<Event>,
    following: Vec<Event>,
}

impl PfEit {
    pub const ACTUAL_TABLE_ID: u8 = 0x4E;
    pub const OTHER_TABLE_ID: u8 = 0x4F;
    pub const PID: u16 = 0x0012;
    const BASE_LEN: usize = 11;

    fn new(
        table_id: u8,
        service_id: u16,
        transport_stream_id: u16,
        original_network_id: u16,
        version: u8,
    ) -> Self {
        let mut header = TableHeader::long(
            table_id,
            service_id,
            true,
            MAX_PRIVATE_SECTION_LEN,
            Self::BASE_LEN,
        );
        header.set_version_number(version);
        Self {
            header,
            transport_stream_id,
            original_network_id,
            present: Vec::new(),
            following: Vec::new(),
        }
    }

    /// EIT p/f for a service in the actual transport stream.
    pub fn actual(
        service_id: u16,
        transport_stream_id: u16,
        original_network_id: u16,
        version: u8,
    ) -> Self {
        Self::new(
            Self::ACTUAL_TABLE_ID,
            service_id,
            transport_stream_id,
            original_network_id,
            version,
        )
    }

    /// EIT p/f for a service in another transport stream.
    pub fn other(
        service_id: u16,
        transport_stream_id: u16,
        original_network_id: u16,
        version: u8,
    ) -> Self {
        Self::new(
            Self::OTHER_TABLE_ID,
            service_id,
            transport_stream_id,
            original_network_id,
            version,
        )
    }

    fn events_mut(&mut self, slot: EventSlot) -> &mut Vec<Event> {
        match slot {
            EventSlot::Present => &mut self.present,
            EventSlot::Following => &mut self.following,
        }
    }

    /// The events of `slot`.
    pub fn events(&self, slot: EventSlot) -> &[Event] {
        match slot {
            EventSlot::Present => &self.present,
            EventSlot::Following => &self.following,
        }
    }

    /// Adds an event. Returns `false` if the table is full.
    pub fn add_event(
        &mut self,
        slot: EventSlot,
        event_id: u16,
        start_time: UtcTime,
        duration: BcdDuration,
        running_status: RunningStatus,
        free_ca_mode: bool,
    ) -> bool {
        if !self.header.try_reserve(Event::BASE_LEN) {
            return false;
        }
        self.events_mut(slot).push(Event {
            event_id,
            start_time,
            duration,
            running_status,
            free_ca_mode,
            descriptors: DescriptorList::new(),
        });
        true
    }

    /// Adds a descriptor to the event of `slot` that was added last.
    pub fn add_event_descriptor(&mut self, slot: EventSlot, descriptor: impl Into<Descriptor>) -> bool {
        let events = match slot {
            EventSlot::Present => &mut self.present,
            EventSlot::Following => &mut self.following,
        };
        push_item_descriptor(&mut self.header, events.last_mut(), descriptor.into(), |event| {
            &mut event.descriptors
        })
    }

    /// Adds a descriptor to the event of `slot` with `event_id`.
    pub fn add_event_descriptor_to(
        &mut self,
        slot: EventSlot,
        event_id: u16,
        descriptor: impl Into<Descriptor>,
    ) -> bool {
        let events = match slot {
            EventSlot::Present => &mut self.present,
            EventSlot::Following => &mut self.following,
        };
        let event = events.iter_mut().find(|event| event.event_id == event_id);
        push_item_descriptor(&mut self.header, event, descriptor.into(), |event| {
            &mut event.descriptors
        })
    }
}

/// One of the two sections of a [`PfEit`].
struct PfSection<'a> {
    eit: &'a PfEit,
    events: &'a [Event],
}

impl SectionLayout for PfSection<'_> {
    type Item = Event;

    fn table_header(&self) -> &TableHeader {
        &self.eit.header
    }

    fn write_fixed_fields(&self, section: &mut Section) -> EncodingResult<()> {
        section.write_u16(self.eit.transport_stream_id)?;
        section.write_u16(self.eit.original_network_id)?;
        // segment_last_section_number, last_table_id
        section.write_u8(1)?;
        section.write_u8(self.eit.header.table_id())
    }

    fn items(&self) -> &[Event] {
        self.events
    }
}

impl PsiTable for PfEit {
    fn header(&self) -> &TableHeader {
        &self.header
    }

    fn header_mut(&mut self) -> &mut TableHeader {
        &mut self.header
    }

    fn build_sections(&self) -> EncodingResult<Vec<Section>> {
        [&self.present, &self.following]
            .into_iter()
            .enumerate()
            .map(|(section_number, events)| {
                let layout = PfSection { eit: self, events };
                splitter::build_single_section(&layout, section_number as u8, 1)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crc::validate_section_crc;
    use crate::descriptors::{LanguageCode, ShortEventDescriptor};
    use crate::encoding::EncodingError;

    fn start() -> UtcTime {
        UtcTime::new(0xC079, 12, 45, 0)
    }

    #[test]
    fn test_present_following_layout() {
        let mut eit = PfEit::actual(0x0101, 0x0001, 0x2000, 0);
        assert!(eit.add_event(
            EventSlot::Present,
            0x0001,
            start(),
            BcdDuration::new(1, 30, 0),
            RunningStatus::Running,
            false,
        ));
        let name = ShortEventDescriptor::new(LanguageCode::new("eng").unwrap(), "N", "");
        assert!(eit.add_event_descriptor(EventSlot::Present, name));

        let sections = eit.build_sections().unwrap();
        assert_eq!(sections.len(), 2);

        let present = sections[0].as_bytes();
        assert_eq!(
            &present[..present.len() - 4],
            &[
                0x4E, 0xF0, 0x23, 0x01, 0x01, 0xC1, 0x00, 0x01, // header
                0x00, 0x01, 0x20, 0x00, 0x01, 0x4E, // tsid, onid, segment last, last table id
                0x00, 0x01, 0xC0, 0x79, 0x12, 0x45, 0x00, 0x01, 0x30, 0x00, 0x80, 0x08,
                0x4D, 0x06, b'e', b'n', b'g', 0x01, b'N', 0x00,
            ]
        );

        // an empty following section is still sent
        let following = sections[1].as_bytes();
        assert_eq!(following.len(), 14 + 4);
        assert_eq!(&following[..8], &[0x4E, 0xF0, 0x0F, 0x01, 0x01, 0xC1, 0x01, 0x01]);
        for section in &sections {
            assert!(validate_section_crc(section.as_bytes()).unwrap());
        }
    }

    #[test]
    fn test_slots_are_separate() {
        let mut eit = PfEit::other(1, 2, 3, 0);
        assert!(!eit.add_event_descriptor(EventSlot::Following, ShortEventDescriptor::new(
            LanguageCode::new("eng").unwrap(),
            "",
            "",
        )));
        let duration = BcdDuration::default();
        assert!(eit.add_event(EventSlot::Present, 10, start(), duration, RunningStatus::Running, false));
        assert!(eit.add_event(EventSlot::Following, 11, start(), duration, RunningStatus::NotRunning, false));
        assert!(!eit.add_event_descriptor_to(EventSlot::Present, 11, Descriptor::raw(0x80, vec![]).unwrap()));
        assert!(eit.add_event_descriptor_to(EventSlot::Following, 11, Descriptor::raw(0x80, vec![]).unwrap()));

        assert_eq!(eit.events(EventSlot::Present).len(), 1);
        assert_eq!(eit.events(EventSlot::Following)[0].descriptors().len(), 1);
        let sections = eit.build_sections().unwrap();
        assert_eq!(sections[0].as_bytes()[0], 0x4F);
        assert_eq!(sections[1].as_bytes()[13], 0x4F);
    }

    #[test]
    fn test_overfull_slot_is_unsatisfiable() {
        let mut eit = PfEit::actual(1, 2, 3, 0);
        assert!(eit.add_event(
            EventSlot::Present,
            1,
            start(),
            BcdDuration::default(),
            RunningStatus::Running,
            false,
        ));
        for _ in 0..20 {
            assert!(eit.add_event_descriptor(EventSlot::Present, Descriptor::raw(0x80, vec![0; 255]).unwrap()));
        }

        assert!(matches!(
            eit.build_sections(),
            Err(EncodingError::Unsatisfiable {
                table_id: 0x4E,
                section_number: 0,
                ..
            })
        ));
    }
}
