//! Trait definitions for encodable types.

use std::io;

use super::error::EncodingResult;
use super::section::Section;

/// Trait for types that serialize themselves into an open section.
///
/// Descriptors implement this; the section splitter only ever asks for the
/// size and then for the bytes, it never looks inside.
pub trait Encodable {
    /// Write the structure at the section's cursor.
    fn encode(&self, section: &mut Section) -> EncodingResult<()>;

    /// Calculate the encoded size in bytes.
    ///
    /// This must return the exact number of bytes that `encode` writes; the
    /// splitter relies on it to decide whether the value fits a section.
    fn encoded_size(&self) -> usize;

    /// Convenience method to encode to a new byte vector.
    fn encode_to_vec(&self) -> EncodingResult<Vec<u8>> {
        let size = self.encoded_size();
        let mut section = Section::new(size.min(u16::MAX as usize) as u16);
        self.encode(&mut section)?;
        Ok(section.into_bytes())
    }
}

/// Writes finished sections back to back into a byte sink.
///
/// This is the hand-off point to files or a transport stream packetizer.
pub fn write_sections<W>(sections: &[Section], sink: &mut W) -> EncodingResult<()>
where
    W: io::Write,
{
    for section in sections {
        sink.write_all(section.as_bytes())?;
    }
    sink.flush()?;
    Ok(())
}

/// Extension trait for text renderings of finished sections.
#[cfg(feature = "base64")]
pub trait Base64Encodable {
    /// Raw bytes to render.
    fn bytes(&self) -> &[u8];

    /// Encode to a base64 string.
    fn encode_base64(&self) -> String {
        data_encoding::BASE64.encode(self.bytes())
    }

    /// Encode to an upper-case hex string.
    fn encode_hex(&self) -> String {
        data_encoding::HEXUPPER.encode(self.bytes())
    }
}

#[cfg(feature = "base64")]
impl Base64Encodable for Section {
    fn bytes(&self) -> &[u8] {
        self.as_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_sections_concatenates() {
        let mut first = Section::new(4);
        first.write_u16(0x0102).unwrap();
        let mut second = Section::new(4);
        second.write_u8(0x03).unwrap();

        let mut sink = Vec::new();
        write_sections(&[first, second], &mut sink).unwrap();
        assert_eq!(sink, vec![0x01, 0x02, 0x03]);
    }

    #[cfg(feature = "base64")]
    #[test]
    fn test_text_renderings() {
        let mut section = Section::new(4);
        section.write_bytes(&[0x00, 0xB0, 0x0D]).unwrap();
        assert_eq!(section.encode_hex(), "00B00D");
        assert_eq!(section.encode_base64(), "ALAN");
    }
}
