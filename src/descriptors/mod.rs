//! Descriptors and descriptor loops.
//!
//! A descriptor is a tagged, length-prefixed payload of at most 255 bytes. The
//! section splitter only needs the total length and the ability to write the
//! bytes, which [`Encodable`] provides for the closed set of descriptor kinds
//! in [`Descriptor`].

mod dvb;
mod mpeg;

pub use dvb::*;
pub use mpeg::*;

use std::error::Error;
use std::fmt;

use crate::encoding::{Encodable, EncodingResult, Section};
use crate::tables::MAX_TABLE_LEN;

/// Bytes taken by the tag and length fields of every descriptor.
pub const DESCRIPTOR_HEADER_LEN: usize = 2;

/// Largest payload a descriptor can carry (8-bit length field).
pub const MAX_PAYLOAD_LEN: usize = 255;

/// Errors raised while constructing descriptors.
#[derive(Debug, Clone, PartialEq)]
pub enum DescriptorError {
    /// A raw payload does not fit the 8-bit descriptor length.
    PayloadTooLong {
        /// Descriptor tag.
        tag: u8,
        /// Length of the rejected payload.
        length: usize,
    },
    /// An ISO 639-2 / ISO 3166 code that is not three ASCII characters.
    InvalidLanguageCode(String),
}

impl fmt::Display for DescriptorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DescriptorError::PayloadTooLong { tag, length } => write!(
                f,
                "Descriptor 0x{:02x} payload is {} bytes, at most {} allowed",
                tag, length, MAX_PAYLOAD_LEN
            ),
            DescriptorError::InvalidLanguageCode(code) => {
                write!(f, "Invalid language code '{}': expected 3 ASCII characters", code)
            }
        }
    }
}

impl Error for DescriptorError {}

/// Encoding hooks shared by every concrete descriptor.
pub(crate) trait DescriptorPayload {
    /// The descriptor_tag.
    const TAG: u8;

    /// Number of payload bytes following the length field.
    fn payload_len(&self) -> usize;

    /// Writes the payload (everything after the length field).
    fn write_payload(&self, section: &mut Section) -> EncodingResult<()>;
}

/// A three character ISO 639-2 language code (also used for ISO 3166 country codes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LanguageCode([u8; 3]);

impl LanguageCode {
    /// Creates a language code from three ASCII characters, e.g. `"eng"`.
    pub fn new(code: &str) -> Result<Self, DescriptorError> {
        let bytes = code.as_bytes();
        if bytes.len() != 3 || !bytes.iter().all(u8::is_ascii) {
            return Err(DescriptorError::InvalidLanguageCode(code.to_string()));
        }
        Ok(Self([bytes[0], bytes[1], bytes[2]]))
    }

    /// The raw code bytes.
    pub fn as_bytes(&self) -> &[u8; 3] {
        &self.0
    }
}

impl TryFrom<&str> for LanguageCode {
    type Error = DescriptorError;

    fn try_from(code: &str) -> Result<Self, Self::Error> {
        LanguageCode::new(code)
    }
}

/// Truncates `text` so that it fits in `room` bytes.
///
/// Text fields are cut rather than rejected so descriptors can always be
/// built; the cut never splits a UTF-8 sequence.
pub(crate) fn fit_text(text: &str, room: usize) -> String {
    if text.len() <= room {
        return text.to_string();
    }
    let mut end = room;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    text[..end].to_string()
}

/// Any descriptor that can be placed in a table or item descriptor loop.
#[derive(Debug, Clone, PartialEq)]
pub enum Descriptor {
    /// registration_descriptor (0x05).
    Registration(RegistrationDescriptor),
    /// CA_descriptor (0x09).
    Ca(CaDescriptor),
    /// ISO_639_language_descriptor (0x0a).
    Iso639Language(Iso639LanguageDescriptor),
    /// maximum_bitrate_descriptor (0x0e).
    MaximumBitrate(MaximumBitrateDescriptor),
    /// network_name_descriptor (0x40).
    NetworkName(NetworkNameDescriptor),
    /// service_list_descriptor (0x41).
    ServiceList(ServiceListDescriptor),
    /// stuffing_descriptor (0x42).
    Stuffing(StuffingDescriptor),
    /// bouquet_name_descriptor (0x47).
    BouquetName(BouquetNameDescriptor),
    /// service_descriptor (0x48).
    Service(ServiceDescriptor),
    /// short_event_descriptor (0x4d).
    ShortEvent(ShortEventDescriptor),
    /// stream_identifier_descriptor (0x52).
    StreamIdentifier(StreamIdentifierDescriptor),
    /// CA_identifier_descriptor (0x53).
    CaIdentifier(CaIdentifierDescriptor),
    /// multilingual_network_name_descriptor (0x5b).
    MultilingualNetworkName(MultilingualNetworkNameDescriptor),
    /// private_data_specifier_descriptor (0x5f).
    PrivateDataSpecifier(PrivateDataSpecifierDescriptor),
    /// Any other descriptor, carried as raw payload bytes.
    Unknown(RawDescriptor),
}

/// A descriptor with no dedicated type: a tag and up to 255 payload bytes.
///
/// Only [`RawDescriptor::new`] builds one, so the payload always fits the
/// 8-bit length field.
#[derive(Debug, Clone, PartialEq)]
pub struct RawDescriptor {
    tag: u8,
    data: Vec<u8>,
}

impl RawDescriptor {
    /// Creates a raw descriptor.
    ///
    /// # Errors
    ///
    /// Returns an error if the payload is longer than 255 bytes.
    pub fn new(tag: u8, data: Vec<u8>) -> Result<Self, DescriptorError> {
        if data.len() > MAX_PAYLOAD_LEN {
            return Err(DescriptorError::PayloadTooLong {
                tag,
                length: data.len(),
            });
        }
        Ok(Self { tag, data })
    }

    /// The descriptor_tag.
    pub fn tag(&self) -> u8 {
        self.tag
    }

    /// The payload bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

macro_rules! dispatch {
    ($self:expr, $desc:ident => $body:expr, $raw:ident => $unknown:expr) => {
        match $self {
            Descriptor::Registration($desc) => $body,
            Descriptor::Ca($desc) => $body,
            Descriptor::Iso639Language($desc) => $body,
            Descriptor::MaximumBitrate($desc) => $body,
            Descriptor::NetworkName($desc) => $body,
            Descriptor::ServiceList($desc) => $body,
            Descriptor::Stuffing($desc) => $body,
            Descriptor::BouquetName($desc) => $body,
            Descriptor::Service($desc) => $body,
            Descriptor::ShortEvent($desc) => $body,
            Descriptor::StreamIdentifier($desc) => $body,
            Descriptor::CaIdentifier($desc) => $body,
            Descriptor::MultilingualNetworkName($desc) => $body,
            Descriptor::PrivateDataSpecifier($desc) => $body,
            Descriptor::Unknown($raw) => $unknown,
        }
    };
}

fn tag_of<T: DescriptorPayload>(_: &T) -> u8 {
    T::TAG
}

impl Descriptor {
    /// Creates a descriptor from a raw tag and payload.
    ///
    /// # Errors
    ///
    /// Returns an error if the payload is longer than 255 bytes.
    pub fn raw(tag: u8, data: Vec<u8>) -> Result<Self, DescriptorError> {
        RawDescriptor::new(tag, data).map(Descriptor::Unknown)
    }

    /// The descriptor_tag.
    pub fn tag(&self) -> u8 {
        dispatch!(self, d => tag_of(d), raw => raw.tag)
    }

    /// The value of the descriptor_length field.
    pub fn payload_len(&self) -> usize {
        dispatch!(self, d => d.payload_len(), raw => raw.data.len())
    }

    /// Total bytes on the wire: tag, length and payload.
    pub fn length(&self) -> usize {
        DESCRIPTOR_HEADER_LEN + self.payload_len()
    }
}

impl Encodable for Descriptor {
    fn encode(&self, section: &mut Section) -> EncodingResult<()> {
        // the whole descriptor goes in or nothing does
        section.ensure_room(self.length())?;
        section.write_u8(self.tag())?;
        section.write_u8(self.payload_len() as u8)?;
        dispatch!(self, d => d.write_payload(section), raw => section.write_bytes(&raw.data))
    }

    fn encoded_size(&self) -> usize {
        self.length()
    }
}

macro_rules! impl_from_descriptor {
    ($($variant:ident($ty:ty)),* $(,)?) => {
        $(
            impl From<$ty> for Descriptor {
                fn from(descriptor: $ty) -> Self {
                    Descriptor::$variant(descriptor)
                }
            }
        )*
    };
}

impl_from_descriptor!(
    Registration(RegistrationDescriptor),
    Ca(CaDescriptor),
    Iso639Language(Iso639LanguageDescriptor),
    MaximumBitrate(MaximumBitrateDescriptor),
    NetworkName(NetworkNameDescriptor),
    ServiceList(ServiceListDescriptor),
    Stuffing(StuffingDescriptor),
    BouquetName(BouquetNameDescriptor),
    Service(ServiceDescriptor),
    ShortEvent(ShortEventDescriptor),
    StreamIdentifier(StreamIdentifierDescriptor),
    CaIdentifier(CaIdentifierDescriptor),
    MultilingualNetworkName(MultilingualNetworkNameDescriptor),
    PrivateDataSpecifier(PrivateDataSpecifierDescriptor),
    Unknown(RawDescriptor),
);

/// An ordered descriptor loop together with its running byte length.
///
/// Used for table-level loops (network, bouquet, program info, CA) and for
/// the loop owned by each item. The length always equals the sum of the
/// lengths of the descriptors it holds.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DescriptorList {
    descriptors: Vec<Descriptor>,
    total_length: usize,
}

impl DescriptorList {
    /// Creates an empty loop.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a descriptor if the loop stays under the 64 KiB logical ceiling.
    ///
    /// Returns `false` and leaves the loop untouched otherwise.
    pub fn try_push(&mut self, descriptor: Descriptor) -> bool {
        let length = descriptor.length();
        if self.total_length + length >= MAX_TABLE_LEN {
            return false;
        }
        self.total_length += length;
        self.descriptors.push(descriptor);
        true
    }

    /// Sum of the lengths of all descriptors in the loop.
    pub fn loop_length(&self) -> usize {
        self.total_length
    }

    /// Number of descriptors.
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    /// Returns true if the loop holds no descriptors.
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// The descriptor at `index`.
    pub fn get(&self, index: usize) -> Option<&Descriptor> {
        self.descriptors.get(index)
    }

    /// Iterates over the descriptors in order.
    pub fn iter(&self) -> std::slice::Iter<'_, Descriptor> {
        self.descriptors.iter()
    }
}

impl<'a> IntoIterator for &'a DescriptorList {
    type Item = &'a Descriptor;
    type IntoIter = std::slice::Iter<'a, Descriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.descriptors.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_descriptor_encoding() {
        let descriptor = Descriptor::raw(0x83, vec![0x01, 0x02, 0x03]).unwrap();
        assert_eq!(descriptor.tag(), 0x83);
        assert_eq!(descriptor.length(), 5);
        assert_eq!(
            descriptor.encode_to_vec().unwrap(),
            vec![0x83, 0x03, 0x01, 0x02, 0x03]
        );
    }

    #[test]
    fn test_raw_descriptor_payload_limit() {
        assert!(Descriptor::raw(0x80, vec![0; 255]).is_ok());
        assert_eq!(
            Descriptor::raw(0x80, vec![0; 256]),
            Err(DescriptorError::PayloadTooLong {
                tag: 0x80,
                length: 256
            })
        );
    }

    #[test]
    fn test_raw_payload_always_fits_length_byte() {
        assert!(RawDescriptor::new(0x80, vec![0; 300]).is_err());

        let raw = RawDescriptor::new(0x80, vec![0xAB; 255]).unwrap();
        assert_eq!(raw.tag(), 0x80);
        assert_eq!(raw.data().len(), 255);

        let descriptor = Descriptor::from(raw);
        let bytes = descriptor.encode_to_vec().unwrap();
        assert_eq!(bytes.len(), 257);
        assert_eq!(&bytes[..2], &[0x80, 0xFF]);
    }

    #[test]
    fn test_descriptor_encode_is_atomic() {
        let descriptor = Descriptor::raw(0x80, vec![0xAA; 10]).unwrap();
        let mut section = Section::new(8);
        section.write_u8(0x00).unwrap();
        assert!(descriptor.encode(&mut section).is_err());
        assert_eq!(section.as_bytes(), &[0x00]);
    }

    #[test]
    fn test_descriptor_list_tracks_length() {
        let mut list = DescriptorList::new();
        assert!(list.is_empty());
        assert!(list.try_push(Descriptor::raw(0x80, vec![0; 4]).unwrap()));
        assert!(list.try_push(StreamIdentifierDescriptor::new(0x12).into()));
        assert_eq!(list.len(), 2);
        assert_eq!(list.loop_length(), 6 + 3);
        assert_eq!(list.get(1).map(Descriptor::tag), Some(0x52));
        assert_eq!(list.iter().map(Descriptor::length).sum::<usize>(), list.loop_length());
    }

    #[test]
    fn test_descriptor_list_rejects_past_ceiling() {
        let mut list = DescriptorList::new();
        // 255 descriptors of 257 bytes = 65535 bytes, one short of the ceiling
        for _ in 0..255 {
            assert!(list.try_push(Descriptor::raw(0x80, vec![0; 255]).unwrap()));
        }
        let before = list.clone();
        assert!(!list.try_push(Descriptor::raw(0x80, Vec::new()).unwrap()));
        assert_eq!(list, before);
    }

    #[test]
    fn test_language_code() {
        assert_eq!(LanguageCode::new("eng").unwrap().as_bytes(), b"eng");
        assert!(LanguageCode::new("en").is_err());
        assert!(LanguageCode::try_from("deu").is_ok());
    }

    #[test]
    fn test_fit_text_respects_char_boundaries() {
        assert_eq!(fit_text("hello", 10), "hello");
        assert_eq!(fit_text("hello", 3), "hel");
        // 'é' is two bytes; cutting at 2 would split it
        assert_eq!(fit_text("aé", 2), "a");
    }
}
