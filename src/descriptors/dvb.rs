//! Descriptors defined by ETSI EN 300 468.

use super::{DescriptorPayload, LanguageCode, MAX_PAYLOAD_LEN, fit_text};
use crate::encoding::{EncodingResult, Section};

macro_rules! text_descriptor {
    ($(#[$meta:meta])* $name:ident, $tag:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq)]
        pub struct $name {
            text: String,
        }

        impl $name {
            /// Creates the descriptor. Text past 255 bytes is cut off.
            pub fn new(text: &str) -> Self {
                Self {
                    text: fit_text(text, MAX_PAYLOAD_LEN),
                }
            }

            /// The (possibly truncated) text.
            pub fn text(&self) -> &str {
                &self.text
            }
        }

        impl DescriptorPayload for $name {
            const TAG: u8 = $tag;

            fn payload_len(&self) -> usize {
                self.text.len()
            }

            fn write_payload(&self, section: &mut Section) -> EncodingResult<()> {
                section.write_str(&self.text)
            }
        }
    };
}

text_descriptor!(
    /// network_name_descriptor.
    NetworkNameDescriptor,
    0x40
);

text_descriptor!(
    /// stuffing_descriptor. The payload is carried as given.
    StuffingDescriptor,
    0x42
);

text_descriptor!(
    /// bouquet_name_descriptor.
    BouquetNameDescriptor,
    0x47
);

/// service_list_descriptor: `(service_id, service_type)` pairs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ServiceListDescriptor {
    services: Vec<(u16, u8)>,
}

impl ServiceListDescriptor {
    const ENTRY_LEN: usize = 3;

    /// Creates an empty descriptor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a service. Returns `false` if the descriptor is full.
    pub fn add_service(&mut self, service_id: u16, service_type: u8) -> bool {
        if self.payload_len() + Self::ENTRY_LEN > MAX_PAYLOAD_LEN {
            return false;
        }
        self.services.push((service_id, service_type));
        true
    }
}

impl DescriptorPayload for ServiceListDescriptor {
    const TAG: u8 = 0x41;

    fn payload_len(&self) -> usize {
        self.services.len() * Self::ENTRY_LEN
    }

    fn write_payload(&self, section: &mut Section) -> EncodingResult<()> {
        for (service_id, service_type) in &self.services {
            section.write_u16(*service_id)?;
            section.write_u8(*service_type)?;
        }
        Ok(())
    }
}

/// service_descriptor: service type plus provider and service names.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceDescriptor {
    service_type: u8,
    provider_name: String,
    service_name: String,
}

impl ServiceDescriptor {
    const BASE_LEN: usize = 3;

    /// Creates the descriptor. The provider name is cut first, then the
    /// service name gets whatever room is left.
    pub fn new(service_type: u8, provider_name: &str, service_name: &str) -> Self {
        let provider_name = fit_text(provider_name, MAX_PAYLOAD_LEN - Self::BASE_LEN);
        let room = MAX_PAYLOAD_LEN - Self::BASE_LEN - provider_name.len();
        Self {
            service_type,
            service_name: fit_text(service_name, room),
            provider_name,
        }
    }
}

impl DescriptorPayload for ServiceDescriptor {
    const TAG: u8 = 0x48;

    fn payload_len(&self) -> usize {
        Self::BASE_LEN + self.provider_name.len() + self.service_name.len()
    }

    fn write_payload(&self, section: &mut Section) -> EncodingResult<()> {
        section.write_u8(self.service_type)?;
        section.write_u8(self.provider_name.len() as u8)?;
        section.write_str(&self.provider_name)?;
        section.write_u8(self.service_name.len() as u8)?;
        section.write_str(&self.service_name)
    }
}

/// short_event_descriptor: event name and a short description in one language.
#[derive(Debug, Clone, PartialEq)]
pub struct ShortEventDescriptor {
    language: LanguageCode,
    event_name: String,
    text: String,
}

impl ShortEventDescriptor {
    const BASE_LEN: usize = 5;

    /// Creates the descriptor. The name is cut first, then the text.
    pub fn new(language: LanguageCode, event_name: &str, text: &str) -> Self {
        let event_name = fit_text(event_name, MAX_PAYLOAD_LEN - Self::BASE_LEN);
        let room = MAX_PAYLOAD_LEN - Self::BASE_LEN - event_name.len();
        Self {
            language,
            text: fit_text(text, room),
            event_name,
        }
    }
}

impl DescriptorPayload for ShortEventDescriptor {
    const TAG: u8 = 0x4d;

    fn payload_len(&self) -> usize {
        Self::BASE_LEN + self.event_name.len() + self.text.len()
    }

    fn write_payload(&self, section: &mut Section) -> EncodingResult<()> {
        section.write_bytes(self.language.as_bytes())?;
        section.write_u8(self.event_name.len() as u8)?;
        section.write_str(&self.event_name)?;
        section.write_u8(self.text.len() as u8)?;
        section.write_str(&self.text)
    }
}

/// stream_identifier_descriptor: the component tag of an elementary stream.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StreamIdentifierDescriptor {
    component_tag: u8,
}

impl StreamIdentifierDescriptor {
    pub fn new(component_tag: u8) -> Self {
        Self { component_tag }
    }
}

impl DescriptorPayload for StreamIdentifierDescriptor {
    const TAG: u8 = 0x52;

    fn payload_len(&self) -> usize {
        1
    }

    fn write_payload(&self, section: &mut Section) -> EncodingResult<()> {
        section.write_u8(self.component_tag)
    }
}

/// CA_identifier_descriptor: a list of CA system ids.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CaIdentifierDescriptor {
    system_ids: Vec<u16>,
}

impl CaIdentifierDescriptor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a CA system id. Returns `false` if the descriptor is full.
    pub fn add_system_id(&mut self, ca_system_id: u16) -> bool {
        if self.payload_len() + 2 > MAX_PAYLOAD_LEN {
            return false;
        }
        self.system_ids.push(ca_system_id);
        true
    }
}

impl DescriptorPayload for CaIdentifierDescriptor {
    const TAG: u8 = 0x53;

    fn payload_len(&self) -> usize {
        self.system_ids.len() * 2
    }

    fn write_payload(&self, section: &mut Section) -> EncodingResult<()> {
        for id in &self.system_ids {
            section.write_u16(*id)?;
        }
        Ok(())
    }
}

/// multilingual_network_name_descriptor: one network name per language.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MultilingualNetworkNameDescriptor {
    names: Vec<(LanguageCode, String)>,
}

impl MultilingualNetworkNameDescriptor {
    const ENTRY_BASE_LEN: usize = 4;

    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a name in `language`.
    ///
    /// Returns `false` if not even the language code and an empty name fit.
    /// Otherwise the name is cut to the room left.
    pub fn add_name(&mut self, language: LanguageCode, name: &str) -> bool {
        let used = self.payload_len() + Self::ENTRY_BASE_LEN;
        if used > MAX_PAYLOAD_LEN {
            return false;
        }
        self.names.push((language, fit_text(name, MAX_PAYLOAD_LEN - used)));
        true
    }
}

impl DescriptorPayload for MultilingualNetworkNameDescriptor {
    const TAG: u8 = 0x5b;

    fn payload_len(&self) -> usize {
        self.names
            .iter()
            .map(|(_, name)| Self::ENTRY_BASE_LEN + name.len())
            .sum()
    }

    fn write_payload(&self, section: &mut Section) -> EncodingResult<()> {
        for (language, name) in &self.names {
            section.write_bytes(language.as_bytes())?;
            section.write_u8(name.len() as u8)?;
            section.write_str(name)?;
        }
        Ok(())
    }
}

/// private_data_specifier_descriptor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PrivateDataSpecifierDescriptor {
    specifier: u32,
}

impl PrivateDataSpecifierDescriptor {
    pub fn new(specifier: u32) -> Self {
        Self { specifier }
    }
}

impl DescriptorPayload for PrivateDataSpecifierDescriptor {
    const TAG: u8 = 0x5f;

    fn payload_len(&self) -> usize {
        4
    }

    fn write_payload(&self, section: &mut Section) -> EncodingResult<()> {
        section.write_u32(self.specifier)
    }
}
