//! Descriptors defined by ISO/IEC 13818-1.

use super::{DescriptorPayload, LanguageCode, MAX_PAYLOAD_LEN};
use crate::encoding::{EncodingResult, Section};

/// registration_descriptor: a format identifier plus optional private bytes.
#[derive(Debug, Clone, PartialEq)]
pub struct RegistrationDescriptor {
    format_identifier: u32,
    additional_identification_info: Vec<u8>,
}

impl RegistrationDescriptor {
    /// Creates the descriptor; the additional info is cut to the room left.
    pub fn new(format_identifier: u32, additional_identification_info: &[u8]) -> Self {
        let room = MAX_PAYLOAD_LEN - 4;
        let info = &additional_identification_info[..additional_identification_info.len().min(room)];
        Self {
            format_identifier,
            additional_identification_info: info.to_vec(),
        }
    }
}

impl DescriptorPayload for RegistrationDescriptor {
    const TAG: u8 = 0x05;

    fn payload_len(&self) -> usize {
        4 + self.additional_identification_info.len()
    }

    fn write_payload(&self, section: &mut Section) -> EncodingResult<()> {
        section.write_u32(self.format_identifier)?;
        section.write_bytes(&self.additional_identification_info)
    }
}

/// CA_descriptor: the conditional access system and the PID carrying its
/// ECM/EMM data.
#[derive(Debug, Clone, PartialEq)]
pub struct CaDescriptor {
    ca_system_id: u16,
    ca_pid: u16,
    private_data: Vec<u8>,
}

impl CaDescriptor {
    const BASE_LEN: usize = 4;

    /// Creates the descriptor; private data is cut to the room left.
    pub fn new(ca_system_id: u16, ca_pid: u16, private_data: &[u8]) -> Self {
        let room = MAX_PAYLOAD_LEN - Self::BASE_LEN;
        Self {
            ca_system_id,
            ca_pid: ca_pid & 0x1FFF,
            private_data: private_data[..private_data.len().min(room)].to_vec(),
        }
    }
}

impl DescriptorPayload for CaDescriptor {
    const TAG: u8 = 0x09;

    fn payload_len(&self) -> usize {
        Self::BASE_LEN + self.private_data.len()
    }

    fn write_payload(&self, section: &mut Section) -> EncodingResult<()> {
        section.write_u16(self.ca_system_id)?;
        section.write_u16(0xE000 | self.ca_pid)?;
        section.write_bytes(&self.private_data)
    }
}

/// Audio type carried in an ISO 639 language entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioType {
    /// Undefined (0x00).
    Undefined,
    /// Clean effects (0x01).
    CleanEffects,
    /// Hearing impaired (0x02).
    HearingImpaired,
    /// Visual impaired commentary (0x03).
    VisualImpairedCommentary,
    /// Any other value.
    Other(u8),
}

impl From<u8> for AudioType {
    fn from(value: u8) -> Self {
        match value {
            0x00 => AudioType::Undefined,
            0x01 => AudioType::CleanEffects,
            0x02 => AudioType::HearingImpaired,
            0x03 => AudioType::VisualImpairedCommentary,
            value => AudioType::Other(value),
        }
    }
}

impl From<AudioType> for u8 {
    fn from(value: AudioType) -> Self {
        match value {
            AudioType::Undefined => 0x00,
            AudioType::CleanEffects => 0x01,
            AudioType::HearingImpaired => 0x02,
            AudioType::VisualImpairedCommentary => 0x03,
            AudioType::Other(value) => value,
        }
    }
}

/// ISO_639_language_descriptor: a list of language/audio type pairs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Iso639LanguageDescriptor {
    languages: Vec<(LanguageCode, u8)>,
}

impl Iso639LanguageDescriptor {
    const ENTRY_LEN: usize = 4;

    /// Creates an empty descriptor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a language entry. Returns `false` if the descriptor is full.
    pub fn add_language(&mut self, code: LanguageCode, audio_type: AudioType) -> bool {
        if self.payload_len() + Self::ENTRY_LEN > MAX_PAYLOAD_LEN {
            return false;
        }
        self.languages.push((code, audio_type.into()));
        true
    }
}

impl DescriptorPayload for Iso639LanguageDescriptor {
    const TAG: u8 = 0x0a;

    fn payload_len(&self) -> usize {
        self.languages.len() * Self::ENTRY_LEN
    }

    fn write_payload(&self, section: &mut Section) -> EncodingResult<()> {
        for (code, audio_type) in &self.languages {
            section.write_bytes(code.as_bytes())?;
            section.write_u8(*audio_type)?;
        }
        Ok(())
    }
}

/// maximum_bitrate_descriptor: 22-bit rate in units of 50 bytes/second.
#[derive(Debug, Clone, PartialEq)]
pub struct MaximumBitrateDescriptor {
    maximum_bitrate: u32,
}

impl MaximumBitrateDescriptor {
    /// Creates the descriptor. Only the lower 22 bits of the rate are kept.
    pub fn new(maximum_bitrate: u32) -> Self {
        Self {
            maximum_bitrate: maximum_bitrate & 0x3F_FFFF,
        }
    }
}

impl DescriptorPayload for MaximumBitrateDescriptor {
    const TAG: u8 = 0x0e;

    fn payload_len(&self) -> usize {
        3
    }

    fn write_payload(&self, section: &mut Section) -> EncodingResult<()> {
        section.write_u24(0xC0_0000 | self.maximum_bitrate)
    }
}
