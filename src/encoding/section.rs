//! Fixed-capacity section buffer.

use super::error::{EncodingError, EncodingResult};
use crate::crc::{CRC_LEN, calculate_crc};

/// A byte buffer for one physical section.
///
/// The buffer has a capacity fixed at construction and a write cursor that
/// only moves forward. Every append checks that it fits before touching the
/// buffer, so a failed write leaves the section exactly as it was. Fields whose
/// value is only known later (loop lengths, the section length and the last
/// section number) are reserved with a placeholder and patched in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    /// Bytes written so far; its length is the cursor.
    data: Vec<u8>,
    /// Maximum number of bytes this section may hold.
    capacity: usize,
    /// Trailer value once the section has been finalized.
    crc: Option<u32>,
}

impl Section {
    /// Creates an empty section able to hold `capacity` bytes.
    pub fn new(capacity: u16) -> Self {
        Self {
            data: Vec::with_capacity(capacity as usize),
            capacity: capacity as usize,
            crc: None,
        }
    }

    /// Maximum number of bytes the section can hold.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of bytes written so far (the cursor position).
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if nothing has been written yet.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Bytes left before the capacity is reached.
    pub fn remaining_capacity(&self) -> usize {
        self.capacity - self.data.len()
    }

    /// Bytes left for payload once room for the CRC trailer is kept aside.
    pub fn data_room(&self) -> usize {
        self.remaining_capacity().saturating_sub(CRC_LEN)
    }

    /// The CRC trailer, if [`Section::finalize_crc`] has run.
    pub fn crc(&self) -> Option<u32> {
        self.crc
    }

    /// The written bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Consumes the section and returns the written bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    /// Fails with [`EncodingError::BufferOverflow`] unless `needed` more bytes fit.
    pub fn ensure_room(&self, needed: usize) -> EncodingResult<()> {
        let available = self.remaining_capacity();
        if needed > available {
            return Err(EncodingError::BufferOverflow { needed, available });
        }
        Ok(())
    }

    /// Appends one byte.
    pub fn write_u8(&mut self, value: u8) -> EncodingResult<()> {
        self.ensure_room(1)?;
        self.data.push(value);
        Ok(())
    }

    /// Appends a big-endian 16-bit value.
    pub fn write_u16(&mut self, value: u16) -> EncodingResult<()> {
        self.ensure_room(2)?;
        self.data.extend_from_slice(&value.to_be_bytes());
        Ok(())
    }

    /// Appends the lower 24 bits of `value`, big-endian.
    pub fn write_u24(&mut self, value: u32) -> EncodingResult<()> {
        self.ensure_room(3)?;
        self.data.extend_from_slice(&value.to_be_bytes()[1..]);
        Ok(())
    }

    /// Appends a big-endian 32-bit value.
    pub fn write_u32(&mut self, value: u32) -> EncodingResult<()> {
        self.ensure_room(4)?;
        self.data.extend_from_slice(&value.to_be_bytes());
        Ok(())
    }

    /// Appends a byte sequence. Either all of it is written or none of it.
    pub fn write_bytes(&mut self, bytes: &[u8]) -> EncodingResult<()> {
        self.ensure_room(bytes.len())?;
        self.data.extend_from_slice(bytes);
        Ok(())
    }

    /// Appends the bytes of a string, without any length prefix.
    pub fn write_str(&mut self, text: &str) -> EncodingResult<()> {
        self.write_bytes(text.as_bytes())
    }

    /// Appends a 16-bit placeholder and returns its offset for a later patch.
    pub fn reserve_u16(&mut self, placeholder: u16) -> EncodingResult<usize> {
        let offset = self.len();
        self.write_u16(placeholder)?;
        Ok(offset)
    }

    fn ensure_written(&self, offset: usize, width: usize) -> EncodingResult<()> {
        if offset + width > self.data.len() {
            return Err(EncodingError::InvalidPatchOffset {
                offset,
                width,
                cursor: self.data.len(),
            });
        }
        Ok(())
    }

    /// Overwrites an already written byte without moving the cursor.
    pub fn patch_u8(&mut self, offset: usize, value: u8) -> EncodingResult<()> {
        self.ensure_written(offset, 1)?;
        self.data[offset] = value;
        Ok(())
    }

    /// Overwrites an already written 16-bit field without moving the cursor.
    pub fn patch_u16(&mut self, offset: usize, value: u16) -> EncodingResult<()> {
        self.ensure_written(offset, 2)?;
        self.data[offset..offset + 2].copy_from_slice(&value.to_be_bytes());
        Ok(())
    }

    /// Computes the CRC-32 over everything written and appends it.
    ///
    /// This has to be the last write: the trailer covers every byte before
    /// it, patched fields included.
    pub fn finalize_crc(&mut self) -> EncodingResult<u32> {
        let crc = calculate_crc(&self.data);
        self.write_u32(crc)?;
        self.crc = Some(crc);
        Ok(crc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crc::validate_section_crc;

    #[test]
    fn test_write_big_endian_fields() {
        let mut section = Section::new(16);
        section.write_u8(0xAB).unwrap();
        section.write_u16(0x1234).unwrap();
        section.write_u24(0xFF56789A).unwrap();
        section.write_u32(0xDEADBEEF).unwrap();
        assert_eq!(
            section.as_bytes(),
            &[0xAB, 0x12, 0x34, 0x56, 0x78, 0x9A, 0xDE, 0xAD, 0xBE, 0xEF]
        );
        assert_eq!(section.len(), 10);
        assert_eq!(section.remaining_capacity(), 6);
    }

    #[test]
    fn test_overflow_is_rejected_without_partial_write() {
        let mut section = Section::new(3);
        section.write_u16(0x0102).unwrap();

        let err = section.write_u16(0x0304).unwrap_err();
        assert_eq!(
            err,
            EncodingError::BufferOverflow {
                needed: 2,
                available: 1
            }
        );
        assert_eq!(section.as_bytes(), &[0x01, 0x02]);

        assert!(section.write_bytes(b"ab").is_err());
        assert_eq!(section.len(), 2);
        section.write_str("a").unwrap();
        assert_eq!(section.remaining_capacity(), 0);
    }

    #[test]
    fn test_patch_does_not_move_cursor() {
        let mut section = Section::new(8);
        section.write_u8(0x42).unwrap();
        let offset = section.reserve_u16(0xF000).unwrap();
        section.write_u8(0x99).unwrap();

        section.patch_u16(offset, 0xF123).unwrap();
        section.patch_u8(0, 0x46).unwrap();

        assert_eq!(section.as_bytes(), &[0x46, 0xF1, 0x23, 0x99]);
        assert_eq!(section.len(), 4);
    }

    #[test]
    fn test_patch_past_cursor_is_rejected() {
        let mut section = Section::new(8);
        section.write_u8(0x00).unwrap();
        assert!(matches!(
            section.patch_u16(0, 0xFFFF),
            Err(EncodingError::InvalidPatchOffset { .. })
        ));
        assert!(section.patch_u8(1, 0xFF).is_err());
    }

    #[test]
    fn test_data_room_keeps_crc_aside() {
        let mut section = Section::new(10);
        section.write_u32(0).unwrap();
        assert_eq!(section.remaining_capacity(), 6);
        assert_eq!(section.data_room(), 2);
        section.write_u16(0).unwrap();
        assert_eq!(section.data_room(), 0);
    }

    #[test]
    fn test_finalize_crc_appends_trailer() {
        let mut section = Section::new(12);
        section.write_bytes(&[0x00, 0xB0, 0x0D, 0x00, 0x01]).unwrap();
        let crc = section.finalize_crc().unwrap();

        assert_eq!(section.crc(), Some(crc));
        assert_eq!(section.len(), 9);
        assert_eq!(&section.as_bytes()[5..], &crc.to_be_bytes());
        assert!(validate_section_crc(section.as_bytes()).unwrap());
    }

    #[test]
    fn test_finalize_crc_needs_room() {
        let mut section = Section::new(4);
        section.write_u8(0x70).unwrap();
        assert!(section.finalize_crc().is_err());
        assert_eq!(section.crc(), None);
    }
}
