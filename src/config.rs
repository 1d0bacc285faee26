//! JSON table descriptions.
//!
//! A [`TableConfig`] describes one table the way a playout configuration
//! would: `{"table": "sdt", "transport_stream_id": 1, ...}`. Building it runs
//! the same add-calls a program would, so every capacity rule applies; a
//! rejected add-call is reported as [`ConfigError::CapacityExceeded`].

use std::error::Error;
use std::fmt;
use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::descriptors::{
    AudioType, BouquetNameDescriptor, CaDescriptor, CaIdentifierDescriptor, Descriptor,
    DescriptorError, Iso639LanguageDescriptor, LanguageCode, MaximumBitrateDescriptor,
    MultilingualNetworkNameDescriptor, NetworkNameDescriptor, PrivateDataSpecifierDescriptor,
    RegistrationDescriptor, ServiceDescriptor, ServiceListDescriptor, ShortEventDescriptor,
    StreamIdentifierDescriptor, StuffingDescriptor,
};
use crate::tables::{
    Bat, Cat, EventSlot, Nit, Pat, PfEit, Pmt, PsiTable, Rst, RunningStatus,
    RunningStatusEntry, Sdt, StuffingTable, Tdt, Tot,
};
use crate::time::{BcdDuration, UtcTime};

/// Errors raised while loading or building a table description.
#[derive(Debug)]
pub enum ConfigError {
    /// The file could not be read.
    Io(io::Error),
    /// The JSON is malformed or does not match the expected shape.
    Parse(serde_json::Error),
    /// A value is well-formed JSON but not acceptable.
    InvalidValue {
        /// The field holding the value.
        field: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
    /// An add-call was rejected because the table or section is full.
    CapacityExceeded {
        /// What could not be added.
        what: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(err) => write!(f, "Cannot read table description: {}", err),
            ConfigError::Parse(err) => write!(f, "Invalid table description: {}", err),
            ConfigError::InvalidValue { field, reason } => {
                write!(f, "Invalid value for field '{}': {}", field, reason)
            }
            ConfigError::CapacityExceeded { what } => {
                write!(f, "Table capacity exceeded while adding {}", what)
            }
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ConfigError::Io(err) => Some(err),
            ConfigError::Parse(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for ConfigError {
    fn from(err: io::Error) -> Self {
        ConfigError::Io(err)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::Parse(err)
    }
}

impl From<DescriptorError> for ConfigError {
    fn from(err: DescriptorError) -> Self {
        ConfigError::InvalidValue {
            field: "descriptor",
            reason: err.to_string(),
        }
    }
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

fn added(ok: bool, what: impl FnOnce() -> String) -> ConfigResult<()> {
    if ok {
        Ok(())
    } else {
        Err(ConfigError::CapacityExceeded { what: what() })
    }
}

fn default_true() -> bool {
    true
}

/// A complete table description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableConfig {
    /// The table itself.
    #[serde(flatten)]
    pub table: TableKind,
    /// Overrides the table's default maximum section length.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_section_length: Option<u16>,
    #[serde(default = "default_true")]
    pub current_next_indicator: bool,
}

/// The table types that can be described, selected by the `table` key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "table", rename_all = "snake_case")]
pub enum TableKind {
    Pat {
        transport_stream_id: u16,
        #[serde(default)]
        version: u8,
        #[serde(default)]
        network_pid: Option<u16>,
        #[serde(default)]
        programs: Vec<ProgramConfig>,
    },
    Cat {
        #[serde(default)]
        version: u8,
        #[serde(default)]
        descriptors: Vec<DescriptorConfig>,
    },
    Pmt {
        program_number: u16,
        pcr_pid: u16,
        #[serde(default)]
        version: u8,
        #[serde(default)]
        descriptors: Vec<DescriptorConfig>,
        #[serde(default)]
        streams: Vec<StreamConfig>,
    },
    Nit {
        network_id: u16,
        #[serde(default)]
        other: bool,
        #[serde(default)]
        version: u8,
        #[serde(default)]
        descriptors: Vec<DescriptorConfig>,
        #[serde(default)]
        transport_streams: Vec<TransportStreamConfig>,
    },
    Bat {
        bouquet_id: u16,
        #[serde(default)]
        version: u8,
        #[serde(default)]
        descriptors: Vec<DescriptorConfig>,
        #[serde(default)]
        transport_streams: Vec<TransportStreamConfig>,
    },
    Sdt {
        transport_stream_id: u16,
        original_network_id: u16,
        #[serde(default)]
        other: bool,
        #[serde(default)]
        version: u8,
        #[serde(default)]
        services: Vec<ServiceConfig>,
    },
    Eit {
        service_id: u16,
        transport_stream_id: u16,
        original_network_id: u16,
        #[serde(default)]
        other: bool,
        #[serde(default)]
        version: u8,
        #[serde(default)]
        present: Vec<EventConfig>,
        #[serde(default)]
        following: Vec<EventConfig>,
    },
    Tdt {
        utc_time: TimeConfig,
    },
    Tot {
        utc_time: TimeConfig,
        #[serde(default)]
        descriptors: Vec<DescriptorConfig>,
    },
    Rst {
        #[serde(default)]
        entries: Vec<RunningStatusEntry>,
    },
    St {
        #[serde(default)]
        data: String,
        /// Fill byte, used with `length` instead of `data`.
        #[serde(default)]
        fill: Option<u8>,
        #[serde(default)]
        length: usize,
        #[serde(default = "default_true")]
        section_syntax_indicator: bool,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgramConfig {
    pub program_number: u16,
    pub pid: u16,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamConfig {
    pub stream_type: u8,
    pub elementary_pid: u16,
    #[serde(default)]
    pub descriptors: Vec<DescriptorConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransportStreamConfig {
    pub transport_stream_id: u16,
    pub original_network_id: u16,
    #[serde(default)]
    pub descriptors: Vec<DescriptorConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub service_id: u16,
    #[serde(default)]
    pub eit_schedule: bool,
    #[serde(default)]
    pub eit_present_following: bool,
    #[serde(default)]
    pub running_status: RunningStatus,
    #[serde(default)]
    pub free_ca_mode: bool,
    #[serde(default)]
    pub descriptors: Vec<DescriptorConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventConfig {
    pub event_id: u16,
    pub start_time: TimeConfig,
    #[serde(default)]
    pub duration: BcdDuration,
    #[serde(default)]
    pub running_status: RunningStatus,
    #[serde(default)]
    pub free_ca_mode: bool,
    #[serde(default)]
    pub descriptors: Vec<DescriptorConfig>,
}

/// A UTC instant, either as a calendar date or as a raw MJD.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TimeConfig {
    Calendar {
        year: u16,
        month: u8,
        day: u8,
        #[serde(default)]
        hour: u8,
        #[serde(default)]
        minute: u8,
        #[serde(default)]
        second: u8,
    },
    Mjd(UtcTime),
}

impl TimeConfig {
    pub fn to_utc_time(self) -> ConfigResult<UtcTime> {
        match self {
            TimeConfig::Calendar {
                year,
                month,
                day,
                hour,
                minute,
                second,
            } => UtcTime::from_ymd_hms(year, month, day, hour, minute, second).ok_or_else(|| {
                ConfigError::InvalidValue {
                    field: "utc_time",
                    reason: format!(
                        "{:04}-{:02}-{:02} {:02}:{:02}:{:02} is not a representable date",
                        year, month, day, hour, minute, second
                    ),
                }
            }),
            TimeConfig::Mjd(time) => Ok(time),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LanguageConfig {
    pub code: String,
    #[serde(default)]
    pub audio_type: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceListEntryConfig {
    pub service_id: u16,
    pub service_type: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkNameConfig {
    pub language: String,
    pub name: String,
}

/// A descriptor, selected by the `type` key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DescriptorConfig {
    Registration {
        format_identifier: u32,
        #[serde(default)]
        additional_identification_info: Vec<u8>,
    },
    Ca {
        ca_system_id: u16,
        ca_pid: u16,
        #[serde(default)]
        private_data: Vec<u8>,
    },
    Iso639Language {
        languages: Vec<LanguageConfig>,
    },
    MaximumBitrate {
        maximum_bitrate: u32,
    },
    NetworkName {
        name: String,
    },
    ServiceList {
        services: Vec<ServiceListEntryConfig>,
    },
    Stuffing {
        data: String,
    },
    BouquetName {
        name: String,
    },
    Service {
        service_type: u8,
        #[serde(default)]
        provider_name: String,
        #[serde(default)]
        service_name: String,
    },
    ShortEvent {
        language: String,
        event_name: String,
        #[serde(default)]
        text: String,
    },
    StreamIdentifier {
        component_tag: u8,
    },
    CaIdentifier {
        ca_system_ids: Vec<u16>,
    },
    MultilingualNetworkName {
        names: Vec<NetworkNameConfig>,
    },
    PrivateDataSpecifier {
        specifier: u32,
    },
    Raw {
        tag: u8,
        #[serde(default)]
        data: Vec<u8>,
    },
}

fn full_descriptor(kind: &str) -> ConfigError {
    ConfigError::CapacityExceeded {
        what: format!("an entry to the {} descriptor", kind),
    }
}

impl DescriptorConfig {
    /// Builds the descriptor.
    ///
    /// # Errors
    ///
    /// Fails on malformed language codes, raw payloads over 255 bytes and
    /// list entries that overflow the descriptor.
    pub fn build(&self) -> ConfigResult<Descriptor> {
        let descriptor = match self {
            DescriptorConfig::Registration {
                format_identifier,
                additional_identification_info,
            } => RegistrationDescriptor::new(*format_identifier, additional_identification_info)
                .into(),
            DescriptorConfig::Ca {
                ca_system_id,
                ca_pid,
                private_data,
            } => CaDescriptor::new(*ca_system_id, *ca_pid, private_data).into(),
            DescriptorConfig::Iso639Language { languages } => {
                let mut descriptor = Iso639LanguageDescriptor::new();
                for language in languages {
                    let code = LanguageCode::new(&language.code)?;
                    if !descriptor.add_language(code, AudioType::from(language.audio_type)) {
                        return Err(full_descriptor("ISO 639 language"));
                    }
                }
                descriptor.into()
            }
            DescriptorConfig::MaximumBitrate { maximum_bitrate } => {
                MaximumBitrateDescriptor::new(*maximum_bitrate).into()
            }
            DescriptorConfig::NetworkName { name } => NetworkNameDescriptor::new(name).into(),
            DescriptorConfig::ServiceList { services } => {
                let mut descriptor = ServiceListDescriptor::new();
                for service in services {
                    if !descriptor.add_service(service.service_id, service.service_type) {
                        return Err(full_descriptor("service list"));
                    }
                }
                descriptor.into()
            }
            DescriptorConfig::Stuffing { data } => StuffingDescriptor::new(data).into(),
            DescriptorConfig::BouquetName { name } => BouquetNameDescriptor::new(name).into(),
            DescriptorConfig::Service {
                service_type,
                provider_name,
                service_name,
            } => ServiceDescriptor::new(*service_type, provider_name, service_name).into(),
            DescriptorConfig::ShortEvent {
                language,
                event_name,
                text,
            } => ShortEventDescriptor::new(LanguageCode::new(language)?, event_name, text).into(),
            DescriptorConfig::StreamIdentifier { component_tag } => {
                StreamIdentifierDescriptor::new(*component_tag).into()
            }
            DescriptorConfig::CaIdentifier { ca_system_ids } => {
                let mut descriptor = CaIdentifierDescriptor::new();
                for id in ca_system_ids {
                    if !descriptor.add_system_id(*id) {
                        return Err(full_descriptor("CA identifier"));
                    }
                }
                descriptor.into()
            }
            DescriptorConfig::MultilingualNetworkName { names } => {
                let mut descriptor = MultilingualNetworkNameDescriptor::new();
                for entry in names {
                    let language = LanguageCode::new(&entry.language)?;
                    if !descriptor.add_name(language, &entry.name) {
                        return Err(full_descriptor("multilingual network name"));
                    }
                }
                descriptor.into()
            }
            DescriptorConfig::PrivateDataSpecifier { specifier } => {
                PrivateDataSpecifierDescriptor::new(*specifier).into()
            }
            DescriptorConfig::Raw { tag, data } => Descriptor::raw(*tag, data.clone())?,
        };
        Ok(descriptor)
    }
}

/// Runs `add` for every descriptor in `configs`.
fn add_descriptors<F>(configs: &[DescriptorConfig], owner: &str, mut add: F) -> ConfigResult<()>
where
    F: FnMut(Descriptor) -> bool,
{
    for config in configs {
        let descriptor = config.build()?;
        let tag = descriptor.tag();
        added(add(descriptor), || {
            format!("descriptor 0x{:02x} to {}", tag, owner)
        })?;
    }
    Ok(())
}

impl TableConfig {
    /// Builds the described table.
    ///
    /// # Errors
    ///
    /// [`ConfigError::CapacityExceeded`] when an add-call is rejected,
    /// [`ConfigError::InvalidValue`] for values the table model cannot carry.
    pub fn build(&self) -> ConfigResult<Box<dyn PsiTable + Send>> {
        let mut table = self.table.build()?;
        table.set_current_next_indicator(self.current_next_indicator);
        if let Some(max_section_length) = self.max_section_length {
            if !table.set_max_section_length(max_section_length) {
                return Err(ConfigError::InvalidValue {
                    field: "max_section_length",
                    reason: format!(
                        "{} is above the limit of {} bytes for this table",
                        max_section_length,
                        table.header().section_length_limit()
                    ),
                });
            }
        }
        Ok(table)
    }
}

impl TableKind {
    fn build(&self) -> ConfigResult<Box<dyn PsiTable + Send>> {
        let table: Box<dyn PsiTable + Send> = match self {
            TableKind::Pat {
                transport_stream_id,
                version,
                network_pid,
                programs,
            } => {
                let mut pat = Pat::new(*transport_stream_id, *version);
                if let Some(pid) = network_pid {
                    added(pat.add_network_pid(*pid), || "the network PID".to_string())?;
                }
                for program in programs {
                    added(pat.add_program(program.program_number, program.pid), || {
                        format!("program {}", program.program_number)
                    })?;
                }
                Box::new(pat)
            }
            TableKind::Cat {
                version,
                descriptors,
            } => {
                let mut cat = Cat::new(*version);
                add_descriptors(descriptors, "the CAT", |d| cat.add_descriptor(d))?;
                Box::new(cat)
            }
            TableKind::Pmt {
                program_number,
                pcr_pid,
                version,
                descriptors,
                streams,
            } => {
                let mut pmt = Pmt::new(*program_number, *pcr_pid, *version);
                add_descriptors(descriptors, "the program info", |d| {
                    pmt.add_program_descriptor(d)
                })?;
                for stream in streams {
                    added(
                        pmt.add_elementary_stream(stream.stream_type, stream.elementary_pid),
                        || format!("elementary stream on PID {}", stream.elementary_pid),
                    )?;
                    let owner = format!("elementary stream {}", stream.elementary_pid);
                    add_descriptors(&stream.descriptors, &owner, |d| {
                        pmt.add_elementary_stream_descriptor(d)
                    })?;
                }
                Box::new(pmt)
            }
            TableKind::Nit {
                network_id,
                other,
                version,
                descriptors,
                transport_streams,
            } => {
                let mut nit = if *other {
                    Nit::other(*network_id, *version)
                } else {
                    Nit::actual(*network_id, *version)
                };
                add_descriptors(descriptors, "the network loop", |d| {
                    nit.add_network_descriptor(d)
                })?;
                for ts in transport_streams {
                    added(
                        nit.add_transport_stream(ts.transport_stream_id, ts.original_network_id),
                        || format!("transport stream {}", ts.transport_stream_id),
                    )?;
                    let owner = format!("transport stream {}", ts.transport_stream_id);
                    add_descriptors(&ts.descriptors, &owner, |d| {
                        nit.add_transport_stream_descriptor(d)
                    })?;
                }
                Box::new(nit)
            }
            TableKind::Bat {
                bouquet_id,
                version,
                descriptors,
                transport_streams,
            } => {
                let mut bat = Bat::new(*bouquet_id, *version);
                add_descriptors(descriptors, "the bouquet loop", |d| {
                    bat.add_bouquet_descriptor(d)
                })?;
                for ts in transport_streams {
                    added(
                        bat.add_transport_stream(ts.transport_stream_id, ts.original_network_id),
                        || format!("transport stream {}", ts.transport_stream_id),
                    )?;
                    let owner = format!("transport stream {}", ts.transport_stream_id);
                    add_descriptors(&ts.descriptors, &owner, |d| {
                        bat.add_transport_stream_descriptor(d)
                    })?;
                }
                Box::new(bat)
            }
            TableKind::Sdt {
                transport_stream_id,
                original_network_id,
                other,
                version,
                services,
            } => {
                let mut sdt = if *other {
                    Sdt::other(*transport_stream_id, *original_network_id, *version)
                } else {
                    Sdt::actual(*transport_stream_id, *original_network_id, *version)
                };
                for service in services {
                    added(
                        sdt.add_service(
                            service.service_id,
                            service.eit_schedule,
                            service.eit_present_following,
                            service.running_status,
                            service.free_ca_mode,
                        ),
                        || format!("service {}", service.service_id),
                    )?;
                    let owner = format!("service {}", service.service_id);
                    add_descriptors(&service.descriptors, &owner, |d| {
                        sdt.add_service_descriptor(d)
                    })?;
                }
                Box::new(sdt)
            }
            TableKind::Eit {
                service_id,
                transport_stream_id,
                original_network_id,
                other,
                version,
                present,
                following,
            } => {
                let mut eit = if *other {
                    PfEit::other(*service_id, *transport_stream_id, *original_network_id, *version)
                } else {
                    PfEit::actual(*service_id, *transport_stream_id, *original_network_id, *version)
                };
                for (slot, events) in [(EventSlot::Present, present), (EventSlot::Following, following)] {
                    for event in events {
                        added(
                            eit.add_event(
                                slot,
                                event.event_id,
                                event.start_time.to_utc_time()?,
                                event.duration,
                                event.running_status,
                                event.free_ca_mode,
                            ),
                            || format!("event {}", event.event_id),
                        )?;
                        let owner = format!("event {}", event.event_id);
                        add_descriptors(&event.descriptors, &owner, |d| {
                            eit.add_event_descriptor(slot, d)
                        })?;
                    }
                }
                Box::new(eit)
            }
            TableKind::Tdt { utc_time } => Box::new(Tdt::new(utc_time.to_utc_time()?)),
            TableKind::Tot {
                utc_time,
                descriptors,
            } => {
                let mut tot = Tot::new(utc_time.to_utc_time()?);
                add_descriptors(descriptors, "the TOT", |d| tot.add_descriptor(d))?;
                Box::new(tot)
            }
            TableKind::Rst { entries } => {
                let mut rst = Rst::new();
                for entry in entries {
                    added(rst.add_entry(*entry), || {
                        format!("running status of event {}", entry.event_id)
                    })?;
                }
                Box::new(rst)
            }
            TableKind::St {
                data,
                fill,
                length,
                section_syntax_indicator,
            } => match fill {
                Some(byte) => Box::new(StuffingTable::from_byte(
                    *byte,
                    *length,
                    *section_syntax_indicator,
                )),
                None => Box::new(StuffingTable::new(data.as_bytes(), *section_syntax_indicator)),
            },
        };
        Ok(table)
    }
}

/// Parses a table description from a JSON string.
pub fn parse_table_config(json: &str) -> ConfigResult<TableConfig> {
    Ok(serde_json::from_str(json)?)
}

/// Reads and parses a table description from a JSON file.
pub fn load_table_config<P: AsRef<Path>>(path: P) -> ConfigResult<TableConfig> {
    let json = fs::read_to_string(path)?;
    parse_table_config(&json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crc::validate_section_crc;

    #[test]
    fn test_pat_from_json() {
        let config = parse_table_config(
            r#"{
                "table": "pat",
                "transport_stream_id": 1,
                "programs": [{"program_number": 1, "pid": 256}]
            }"#,
        )
        .unwrap();
        assert!(config.current_next_indicator);

        let sections = config.build().unwrap().build_sections().unwrap();
        assert_eq!(
            sections[0].as_bytes(),
            &[
                0x00, 0xB0, 0x0D, 0x00, 0x01, 0xC1, 0x00, 0x00, 0x00, 0x01, 0xE1, 0x00, 0xE8,
                0xF9, 0x5E, 0x7D,
            ]
        );
    }

    #[test]
    fn test_sdt_with_descriptors() {
        let config = parse_table_config(
            r#"{
                "table": "sdt",
                "transport_stream_id": 1,
                "original_network_id": 8192,
                "version": 3,
                "services": [{
                    "service_id": 257,
                    "eit_present_following": true,
                    "running_status": "running",
                    "descriptors": [
                        {"type": "service", "service_type": 1, "provider_name": "P", "service_name": "S"}
                    ]
                }]
            }"#,
        )
        .unwrap();

        let table = config.build().unwrap();
        assert_eq!(table.header().table_id(), 0x42);
        assert_eq!(table.header().version_number(), 3);
        let sections = table.build_sections().unwrap();
        let bytes = sections[0].as_bytes();
        assert_eq!(&bytes[11..16], &[0x01, 0x01, 0xFD, 0x80, 0x07]);
        assert!(validate_section_crc(bytes).unwrap());
    }

    #[test]
    fn test_common_options() {
        let config = parse_table_config(
            r#"{"table": "cat", "max_section_length": 512, "current_next_indicator": false}"#,
        )
        .unwrap();
        let table = config.build().unwrap();
        assert_eq!(table.header().max_section_length(), 512);
        assert!(!table.header().current_next_indicator());
    }

    #[test]
    fn test_oversized_max_section_length_is_rejected() {
        let config = parse_table_config(
            r#"{"table": "pmt", "program_number": 1, "pcr_pid": 256, "max_section_length": 5000}"#,
        )
        .unwrap();
        match config.build() {
            Err(ConfigError::InvalidValue { field, reason }) => {
                assert_eq!(field, "max_section_length");
                assert_eq!(reason, "5000 is above the limit of 1024 bytes for this table");
            }
            other => panic!("unexpected result: {:?}", other.map(|_| ())),
        }

        let config =
            parse_table_config(r#"{"table": "st", "max_section_length": 4096}"#).unwrap();
        assert_eq!(config.build().unwrap().header().max_section_length(), 4096);
    }

    #[test]
    fn test_calendar_and_mjd_times() {
        let calendar: TimeConfig =
            serde_json::from_str(r#"{"year": 1993, "month": 10, "day": 13, "hour": 12, "minute": 45}"#)
                .unwrap();
        assert_eq!(calendar.to_utc_time().unwrap(), UtcTime::new(0xC079, 12, 45, 0));

        let mjd: TimeConfig =
            serde_json::from_str(r#"{"mjd": 49273, "hour": 1, "minute": 2, "second": 3}"#).unwrap();
        assert_eq!(mjd.to_utc_time().unwrap(), UtcTime::new(49273, 1, 2, 3));

        let invalid: TimeConfig =
            serde_json::from_str(r#"{"year": 2024, "month": 13, "day": 1}"#).unwrap();
        assert!(matches!(
            invalid.to_utc_time(),
            Err(ConfigError::InvalidValue { field: "utc_time", .. })
        ));
    }

    #[test]
    fn test_tdt_from_json() {
        let config = parse_table_config(
            r#"{"table": "tdt", "utc_time": {"year": 1993, "month": 10, "day": 13, "hour": 12, "minute": 45}}"#,
        )
        .unwrap();
        let sections = config.build().unwrap().build_sections().unwrap();
        assert_eq!(
            sections[0].as_bytes(),
            &[0x70, 0x70, 0x05, 0xC0, 0x79, 0x12, 0x45, 0x00]
        );
    }

    #[test]
    fn test_rejected_add_is_reported() {
        let entries: Vec<String> = (0..114)
            .map(|id| {
                format!(
                    r#"{{"transport_stream_id": 1, "original_network_id": 2, "service_id": 3, "event_id": {}, "running_status": "running"}}"#,
                    id
                )
            })
            .collect();
        let json = format!(r#"{{"table": "rst", "entries": [{}]}}"#, entries.join(","));
        let config = parse_table_config(&json).unwrap();

        match config.build() {
            Err(ConfigError::CapacityExceeded { what }) => {
                assert_eq!(what, "running status of event 113");
            }
            other => panic!("unexpected result: {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_descriptor_errors() {
        let bad_language = DescriptorConfig::ShortEvent {
            language: "english".to_string(),
            event_name: String::new(),
            text: String::new(),
        };
        assert!(matches!(
            bad_language.build(),
            Err(ConfigError::InvalidValue { field: "descriptor", .. })
        ));

        let raw = DescriptorConfig::Raw {
            tag: 0x80,
            data: vec![0; 256],
        };
        assert!(raw.build().is_err());

        let services = DescriptorConfig::ServiceList {
            services: (0..86)
                .map(|id| ServiceListEntryConfig {
                    service_id: id,
                    service_type: 1,
                })
                .collect(),
        };
        assert!(matches!(
            services.build(),
            Err(ConfigError::CapacityExceeded { .. })
        ));
    }

    #[test]
    fn test_unknown_table_is_a_parse_error() {
        assert!(matches!(
            parse_table_config(r#"{"table": "xyz"}"#),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_stuffing_table_config() {
        let config = parse_table_config(r#"{"table": "st", "fill": 255, "length": 3}"#).unwrap();
        let sections = config.build().unwrap().build_sections().unwrap();
        assert_eq!(sections[0].as_bytes(), &[0x72, 0xF0, 0x03, 0xFF, 0xFF, 0xFF]);
    }
}
