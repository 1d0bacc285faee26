//! CRC-32 support for PSI/SI sections.
//!
//! Every long-form section (and the TOT) ends with a CRC-32 computed with the
//! MPEG-2 algorithm from ISO/IEC 13818-1 Annex A: polynomial 0x04C11DB7,
//! initial value 0xFFFFFFFF, MSB first, no final XOR.

use std::io::{self, ErrorKind};

use crc::{CRC_32_MPEG_2, Crc};

/// MPEG-2 CRC-32 algorithm instance used for section trailers.
pub const MPEG_2: Crc<u32> = Crc::<u32>::new(&CRC_32_MPEG_2);

/// Number of bytes occupied by the CRC trailer.
pub const CRC_LEN: usize = 4;

/// Calculates the CRC-32 of `data`.
pub fn calculate_crc(data: &[u8]) -> u32 {
    MPEG_2.checksum(data)
}

/// Checks `data` against an expected CRC-32 value.
pub fn validate_crc(data: &[u8], expected_crc: u32) -> bool {
    calculate_crc(data) == expected_crc
}

/// Validates the CRC-32 trailer of a complete section.
///
/// The last four bytes are read as the big-endian trailer and compared with
/// the CRC of everything before them.
///
/// # Example
///
/// ```rust
/// use dvbsi::crc::{calculate_crc, validate_section_crc};
///
/// let mut section = vec![0x00, 0xB0, 0x0D, 0x00, 0x01, 0xC1, 0x00, 0x00];
/// let crc = calculate_crc(&section);
/// section.extend_from_slice(&crc.to_be_bytes());
///
/// assert!(validate_section_crc(&section).unwrap());
/// ```
pub fn validate_section_crc(buffer: &[u8]) -> Result<bool, io::Error> {
    if buffer.len() < CRC_LEN {
        return Err(io::Error::new(
            ErrorKind::InvalidData,
            "Buffer too short to contain CRC-32 field",
        ));
    }

    let (data, trailer) = buffer.split_at(buffer.len() - CRC_LEN);
    let stored_crc = u32::from_be_bytes([trailer[0], trailer[1], trailer[2], trailer[3]]);

    Ok(validate_crc(data, stored_crc))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crc_check_value() {
        // Catalogue check value for CRC-32/MPEG-2
        assert_eq!(calculate_crc(b"123456789"), 0x0376E6E7);
    }

    #[test]
    fn test_crc_of_empty_input_is_seed() {
        assert_eq!(calculate_crc(&[]), 0xFFFFFFFF);
    }

    #[test]
    fn test_validate_crc() {
        let data = b"network information";
        let crc = calculate_crc(data);
        assert!(validate_crc(data, crc));
        assert!(!validate_crc(data, crc ^ 1));
    }

    #[test]
    fn test_section_crc_short_buffer() {
        let result = validate_section_crc(&[0x01, 0x02]);
        assert!(result.is_err());
    }

    #[test]
    fn test_section_crc_detects_corruption() {
        let mut section = vec![0x40, 0xF0, 0x0D, 0x00, 0x01, 0xC1, 0x00, 0x00];
        let crc = calculate_crc(&section);
        section.extend_from_slice(&crc.to_be_bytes());
        assert!(validate_section_crc(&section).unwrap());

        section[3] ^= 0xFF;
        assert!(!validate_section_crc(&section).unwrap());
    }
}
