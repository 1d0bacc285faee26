//! Resumable encoder for one item and its descriptor loop.
//!
//! An item (a program, transport stream, service or event) is a fixed header
//! followed by a length-prefixed descriptor loop. When the loop does not fit
//! the rest of a section, the encoder writes as many whole descriptors as it
//! can, patches the loop length with what it wrote, and reports the item as
//! suspended. The caller then opens a new section and calls it again: the
//! header is written once more and the loop continues where it stopped.

use super::error::EncodingResult;
use super::section::Section;
use super::traits::Encodable;
use crate::descriptors::DescriptorList;

/// Bytes taken by a descriptor loop length field.
pub const LOOP_LENGTH_LEN: usize = 2;

/// Masks a loop length to its 12-bit field and sets the four reserved bits.
pub fn loop_length_field(length: usize) -> u16 {
    0xF000 | (length as u16 & 0x0FFF)
}

/// A repeated entry inside a table.
pub trait LoopItem {
    /// Size of the fixed header, not counting the loop length field.
    fn header_len(&self) -> usize;

    /// Writes the fixed header.
    fn write_header(&self, section: &mut Section) -> EncodingResult<()>;

    /// The item's descriptor loop, or `None` if the item has no loop at all.
    fn descriptors(&self) -> Option<&DescriptorList>;

    /// The 16-bit value stored in front of the loop for `length` bytes of
    /// descriptors. Items that keep flags in the top bits override this.
    fn loop_length_field(&self, length: usize) -> u16 {
        loop_length_field(length)
    }

    /// Bytes the header takes on the wire, loop length field included.
    fn wire_header_len(&self) -> usize {
        match self.descriptors() {
            Some(_) => self.header_len() + LOOP_LENGTH_LEN,
            None => self.header_len(),
        }
    }
}

/// Whether a loop was fully written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopStatus {
    /// Every descriptor has been written.
    Done,
    /// The section ran out of room; the loop resumes in the next section.
    Suspended,
}

/// Outcome of writing (part of) a loop into one section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemProgress {
    /// Whether the loop was drained.
    pub status: LoopStatus,
    /// Descriptor bytes written into this section.
    pub bytes: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    GetDescriptor,
    WriteDescriptor,
}

/// Streams descriptors from `list`, starting at `*next`, while they fit.
///
/// `*next` is advanced past every descriptor written. Room for the CRC
/// trailer and `reserve` further bytes (fields that must follow the loop in
/// the same section) is always kept free. A descriptor is never split: if
/// the next one does not fit, the loop stops and reports
/// [`LoopStatus::Suspended`].
pub fn write_descriptors(
    list: &DescriptorList,
    section: &mut Section,
    next: &mut usize,
    reserve: usize,
) -> EncodingResult<ItemProgress> {
    let mut bytes = 0;
    let mut state = State::GetDescriptor;

    loop {
        state = match state {
            State::GetDescriptor => match list.get(*next) {
                None => {
                    return Ok(ItemProgress {
                        status: LoopStatus::Done,
                        bytes,
                    });
                }
                Some(descriptor) if section.data_room() < descriptor.length() + reserve => {
                    return Ok(ItemProgress {
                        status: LoopStatus::Suspended,
                        bytes,
                    });
                }
                Some(_) => State::WriteDescriptor,
            },
            State::WriteDescriptor => {
                if let Some(descriptor) = list.get(*next) {
                    descriptor.encode(section)?;
                    bytes += descriptor.length();
                    *next += 1;
                }
                State::GetDescriptor
            }
        };
    }
}

/// Writes `item` into `section`, continuing its loop at `*next_descriptor`.
///
/// The header and loop length placeholder are always written, so the caller
/// must have checked that they fit. The placeholder is patched with the
/// number of descriptor bytes that ended up in this section.
pub fn encode_item<I>(
    item: &I,
    section: &mut Section,
    next_descriptor: &mut usize,
) -> EncodingResult<ItemProgress>
where
    I: LoopItem + ?Sized,
{
    item.write_header(section)?;

    let Some(list) = item.descriptors() else {
        return Ok(ItemProgress {
            status: LoopStatus::Done,
            bytes: 0,
        });
    };

    let offset = section.reserve_u16(item.loop_length_field(0))?;
    let progress = write_descriptors(list, section, next_descriptor, 0)?;
    section.patch_u16(offset, item.loop_length_field(progress.bytes))?;
    Ok(progress)
}
