//! Table section orchestrator.
//!
//! Splits a table into sections with a single greedy forward pass:
//!
//! 1. open a section and write the table header and fixed fields,
//! 2. drain the table-level descriptor loop,
//! 3. drain the items one by one, checking before each item that its header
//!    and its first pending descriptor fit,
//! 4. when something does not fit, patch the section length and open the
//!    next section.
//!
//! Once everything is written, every section gets the final
//! `last_section_number` and its CRC trailer. Progress lives in an
//! [`EncodeCursor`] created per build, so the table itself is only borrowed.

use log::{debug, trace};

use super::error::{EncodingError, EncodingResult};
use super::item_loop::{
    LOOP_LENGTH_LEN, LoopItem, LoopStatus, encode_item, loop_length_field, write_descriptors,
};
use super::section::Section;
use crate::descriptors::{Descriptor, DescriptorList};
use crate::tables::{LAST_SECTION_NUMBER_OFFSET, TableHeader};

/// Most sections a table can have (8-bit section numbers).
pub const MAX_SECTIONS: usize = 256;

/// The table-level descriptor loop of a layout.
#[derive(Debug, Clone, Copy)]
pub enum TopLevelLoop<'a> {
    /// No table-level descriptors.
    None,
    /// Descriptors written directly after the header, without a length
    /// field (CAT).
    Bare(&'a DescriptorList),
    /// Descriptors preceded by a 12-bit loop length (PMT, NIT, BAT).
    Sized(&'a DescriptorList),
}

/// Item type for layouts without items.
#[derive(Debug, Clone, Copy)]
pub enum NoItem {}

impl LoopItem for NoItem {
    fn header_len(&self) -> usize {
        match *self {}
    }

    fn write_header(&self, _section: &mut Section) -> EncodingResult<()> {
        match *self {}
    }

    fn descriptors(&self) -> Option<&DescriptorList> {
        match *self {}
    }
}

/// The shape of a sectionable table, as seen by the splitter.
pub trait SectionLayout {
    /// The repeated entries of the table.
    type Item: LoopItem;

    /// Table identity and section limits.
    fn table_header(&self) -> &TableHeader;

    /// Writes the fields that follow the header in every section.
    fn write_fixed_fields(&self, _section: &mut Section) -> EncodingResult<()> {
        Ok(())
    }

    /// The table-level descriptor loop.
    fn top_level(&self) -> TopLevelLoop<'_> {
        TopLevelLoop::None
    }

    /// Whether the item list is preceded by its own 12-bit length field.
    fn sized_item_loop(&self) -> bool {
        false
    }

    /// The items, in encoding order.
    fn items(&self) -> &[Self::Item];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Phase {
    #[default]
    TopLevel,
    Items,
}

/// Where the encoder stands within a table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EncodeCursor {
    phase: Phase,
    next_top_level: usize,
    item: usize,
    next_item_descriptor: usize,
}

impl EncodeCursor {
    /// How far the encoder got, ignoring phase changes that wrote nothing.
    fn position(&self) -> (usize, usize, usize) {
        (self.next_top_level, self.item, self.next_item_descriptor)
    }
}

/// Result of filling one section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Fill {
    /// Everything has been written.
    Complete,
    /// The section is full; `needed` is what the next write asked for.
    Full { needed: usize },
}

/// Encodes a sectionable table into finished sections.
///
/// # Errors
///
/// [`EncodingError::Unsatisfiable`] if a descriptor or item cannot fit even
/// an empty section, [`EncodingError::TooManySections`] if the table needs
/// more than 256 sections.
pub fn build_sections<L>(layout: &L) -> EncodingResult<Vec<Section>>
where
    L: SectionLayout + ?Sized,
{
    let header = layout.table_header();
    let mut cursor = EncodeCursor::default();
    let mut sections = Vec::new();

    loop {
        if sections.len() == MAX_SECTIONS {
            return Err(EncodingError::TooManySections {
                table_id: header.table_id(),
            });
        }

        let section_number = sections.len();
        let mut section = open_section(layout, section_number as u8, 0)?;
        let available = section.data_room();
        let before = cursor.position();

        let fill = fill_section(layout, &mut cursor, &mut section)?;
        let section_length = header.close_section(&mut section)?;
        debug!(
            "table 0x{:02x}: closed section {} ({} bytes)",
            header.table_id(),
            section_number,
            section_length
        );

        match fill {
            Fill::Complete => {
                sections.push(section);
                break;
            }
            Fill::Full { needed } if cursor.position() == before => {
                return Err(EncodingError::Unsatisfiable {
                    table_id: header.table_id(),
                    section_number,
                    needed,
                    available,
                });
            }
            Fill::Full { .. } => sections.push(section),
        }
    }

    finish_sections(&mut sections)?;
    debug!(
        "table 0x{:02x}: encoded {} section(s)",
        header.table_id(),
        sections.len()
    );
    Ok(sections)
}

/// Encodes a table that must fit exactly one section with fixed numbering.
///
/// Used for tables that are not sectionable, such as the present and
/// following EIT sections.
///
/// # Errors
///
/// [`EncodingError::Unsatisfiable`] if the content needs more than one
/// section.
pub fn build_single_section<L>(
    layout: &L,
    section_number: u8,
    last_section_number: u8,
) -> EncodingResult<Section>
where
    L: SectionLayout + ?Sized,
{
    let header = layout.table_header();
    let mut cursor = EncodeCursor::default();
    let mut section = open_section(layout, section_number, last_section_number)?;
    let available = section.data_room();

    if let Fill::Full { needed } = fill_section(layout, &mut cursor, &mut section)? {
        return Err(EncodingError::Unsatisfiable {
            table_id: header.table_id(),
            section_number: section_number as usize,
            needed,
            available,
        });
    }

    let section_length = header.close_section(&mut section)?;
    debug!(
        "table 0x{:02x}: closed section {} ({} bytes)",
        header.table_id(),
        section_number,
        section_length
    );
    section.finalize_crc()?;
    Ok(section)
}

fn open_section<L>(layout: &L, section_number: u8, last_section_number: u8) -> EncodingResult<Section>
where
    L: SectionLayout + ?Sized,
{
    let header = layout.table_header();
    let mut section = Section::new(header.max_section_length());
    header.write_long_header(&mut section, section_number, last_section_number)?;
    layout.write_fixed_fields(&mut section)?;
    Ok(section)
}

fn fill_section<L>(layout: &L, cursor: &mut EncodeCursor, section: &mut Section) -> EncodingResult<Fill>
where
    L: SectionLayout + ?Sized,
{
    match layout.top_level() {
        TopLevelLoop::None => cursor.phase = Phase::Items,
        TopLevelLoop::Bare(list) => {
            if cursor.phase == Phase::TopLevel {
                let progress = write_descriptors(list, section, &mut cursor.next_top_level, 0)?;
                if progress.status == LoopStatus::Suspended {
                    return Ok(Fill::Full {
                        needed: pending_length(list, cursor.next_top_level),
                    });
                }
                cursor.phase = Phase::Items;
            }
        }
        TopLevelLoop::Sized(list) => {
            // continuation sections still carry the field, with length 0
            let offset = section.reserve_u16(loop_length_field(0))?;
            if cursor.phase == Phase::TopLevel {
                // the item loop length always follows in the same section
                let trailer = if layout.sized_item_loop() { LOOP_LENGTH_LEN } else { 0 };
                let progress =
                    write_descriptors(list, section, &mut cursor.next_top_level, trailer)?;
                section.patch_u16(offset, loop_length_field(progress.bytes))?;
                if progress.status == LoopStatus::Suspended {
                    if layout.sized_item_loop() {
                        section.write_u16(loop_length_field(0))?;
                    }
                    return Ok(Fill::Full {
                        needed: pending_length(list, cursor.next_top_level) + trailer,
                    });
                }
                cursor.phase = Phase::Items;
            }
        }
    }

    let item_loop = if layout.sized_item_loop() {
        Some((section.reserve_u16(loop_length_field(0))?, section.len()))
    } else {
        None
    };

    let fill = drain_items(layout, cursor, section)?;

    if let Some((offset, start)) = item_loop {
        section.patch_u16(offset, loop_length_field(section.len() - start))?;
    }
    Ok(fill)
}

fn drain_items<L>(layout: &L, cursor: &mut EncodeCursor, section: &mut Section) -> EncodingResult<Fill>
where
    L: SectionLayout + ?Sized,
{
    let items = layout.items();

    while let Some(item) = items.get(cursor.item) {
        let pending = item
            .descriptors()
            .map_or(0, |list| pending_length(list, cursor.next_item_descriptor));
        let needed = item.wire_header_len() + pending;

        if section.data_room() < needed {
            trace!(
                "table 0x{:02x}: item {} needs {} bytes, {} left, deferring",
                layout.table_header().table_id(),
                cursor.item,
                needed,
                section.data_room()
            );
            return Ok(Fill::Full { needed });
        }

        let progress = encode_item(item, section, &mut cursor.next_item_descriptor)?;
        match progress.status {
            LoopStatus::Done => {
                cursor.item += 1;
                cursor.next_item_descriptor = 0;
            }
            LoopStatus::Suspended => {
                trace!(
                    "table 0x{:02x}: item {} suspended after {} descriptor bytes",
                    layout.table_header().table_id(),
                    cursor.item,
                    progress.bytes
                );
                let pending = item
                    .descriptors()
                    .map_or(0, |list| pending_length(list, cursor.next_item_descriptor));
                return Ok(Fill::Full {
                    needed: item.wire_header_len() + pending,
                });
            }
        }
    }

    Ok(Fill::Complete)
}

/// Length of the descriptor at `next`, or 0 once the loop is drained.
fn pending_length(list: &DescriptorList, next: usize) -> usize {
    list.get(next).map_or(0, Descriptor::length)
}

/// Patches `last_section_number` into every section, then appends the CRCs.
fn finish_sections(sections: &mut [Section]) -> EncodingResult<()> {
    let last_section_number = (sections.len() - 1) as u8;
    for section in sections.iter_mut() {
        section.patch_u8(LAST_SECTION_NUMBER_OFFSET, last_section_number)?;
        section.finalize_crc()?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptors::Descriptor;
    use crate::tables::{DEFAULT_MAX_SECTION_LEN, TableHeader};

    struct Bare {
        header: TableHeader,
        descriptors: DescriptorList,
    }

    impl Bare {
        fn new(max_section_length: u16, sizes: &[usize]) -> Self {
            let mut descriptors = DescriptorList::new();
            for size in sizes {
                assert!(descriptors.try_push(Descriptor::raw(0x80, vec![0; *size]).unwrap()));
            }
            Self {
                header: TableHeader::long(0x01, 0xFFFF, false, max_section_length, 5),
                descriptors,
            }
        }
    }

    impl SectionLayout for Bare {
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

    #[test]
    fn test_empty_table_is_one_section() {
        let table = Bare::new(DEFAULT_MAX_SECTION_LEN, &[]);
        let sections = build_sections(&table).unwrap();
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].len(), 12);
        assert_eq!(&sections[0].as_bytes()[1..3], &[0xB0, 0x09]);
    }

    #[test]
    fn test_bare_loop_splits_between_descriptors() {
        // 8 header + 4 CRC leaves 20 bytes: two 10-byte descriptors per section
        let table = Bare::new(32, &[8, 8, 8]);
        let sections = build_sections(&table).unwrap();
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].len(), 32);
        assert_eq!(sections[1].len(), 22);
        for section in &sections {
            assert_eq!(section.as_bytes()[7], 1);
        }
    }

    #[test]
    fn test_oversized_descriptor_is_unsatisfiable() {
        let table = Bare::new(32, &[30]);
        assert_eq!(
            build_sections(&table).unwrap_err(),
            EncodingError::Unsatisfiable {
                table_id: 0x01,
                section_number: 0,
                needed: 32,
                available: 20,
            }
        );
    }

    #[test]
    fn test_single_section_rejects_overflow() {
        let table = Bare::new(32, &[8, 8, 8]);
        assert!(matches!(
            build_single_section(&table, 0, 0),
            Err(EncodingError::Unsatisfiable { .. })
        ));
        let table = Bare::new(32, &[8]);
        let section = build_single_section(&table, 1, 1).unwrap();
        assert_eq!(&section.as_bytes()[6..8], &[1, 1]);
    }

    #[test]
    fn test_section_count_limit() {
        // one 2-byte descriptor per section
        let table = Bare::new(14, &[0; 257]);
        assert_eq!(
            build_sections(&table).unwrap_err(),
            EncodingError::TooManySections { table_id: 0x01 }
        );
    }
}
