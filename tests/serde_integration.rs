//! Integration tests for JSON table descriptions

#[cfg(feature = "serde")]
#[cfg(test)]
mod tests {
    use dvbsi::config::{DescriptorConfig, TableKind, parse_table_config};
    use dvbsi::crc::validate_section_crc;
    use dvbsi::tables::{Nit, PsiTable};
    use dvbsi::{ConfigError, TableConfig, load_table_config};
    use std::fs;
    use tempfile::NamedTempFile;

    fn nit_json(transport_streams: usize) -> String {
        let streams: Vec<String> = (0..transport_streams)
            .map(|tsid| {
                format!(
                    r#"{{
                        "transport_stream_id": {tsid},
                        "original_network_id": 12289,
                        "descriptors": [
                            {{"type": "service_list", "services": [
                                {{"service_id": {sid}, "service_type": 1}},
                                {{"service_id": {sid2}, "service_type": 2}}
                            ]}},
                            {{"type": "raw", "tag": 90, "data": [0,1,2,3,4,5,6,7,8,9,10]}}
                        ]
                    }}"#,
                    tsid = tsid,
                    sid = tsid * 2,
                    sid2 = tsid * 2 + 1
                )
            })
            .collect();
        format!(
            r#"{{
                "table": "nit",
                "network_id": 12289,
                "version": 5,
                "descriptors": [{{"type": "network_name", "name": "Network"}}],
                "transport_streams": [{}]
            }}"#,
            streams.join(",")
        )
    }

    #[test]
    fn test_config_matches_programmatic_build() {
        let config = parse_table_config(&nit_json(60)).unwrap();
        let from_config = config.build().unwrap().build_sections().unwrap();

        let mut nit = Nit::actual(12289, 5);
        assert!(nit.add_network_descriptor(dvbsi::descriptors::NetworkNameDescriptor::new("Network")));
        for tsid in 0..60u16 {
            assert!(nit.add_transport_stream(tsid, 12289));
            let mut services = dvbsi::descriptors::ServiceListDescriptor::new();
            assert!(services.add_service(tsid * 2, 1));
            assert!(services.add_service(tsid * 2 + 1, 2));
            assert!(nit.add_transport_stream_descriptor(services));
            let raw = dvbsi::descriptors::Descriptor::raw(90, (0..11).collect()).unwrap();
            assert!(nit.add_transport_stream_descriptor(raw));
        }
        let direct = nit.build_sections().unwrap();

        assert!(direct.len() > 1);
        assert_eq!(from_config, direct);
        for section in &from_config {
            assert!(validate_section_crc(section.as_bytes()).unwrap());
        }
    }

    #[test]
    fn test_load_from_file() {
        let file = NamedTempFile::new().unwrap();
        fs::write(file.path(), nit_json(2)).unwrap();

        let config = load_table_config(file.path()).unwrap();
        match &config.table {
            TableKind::Nit {
                network_id,
                transport_streams,
                descriptors,
                ..
            } => {
                assert_eq!(*network_id, 12289);
                assert_eq!(transport_streams.len(), 2);
                assert_eq!(
                    descriptors[0],
                    DescriptorConfig::NetworkName {
                        name: "Network".to_string()
                    }
                );
            }
            other => panic!("unexpected table: {:?}", other),
        }
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_table_config(dir.path().join("missing.json"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_config_round_trips_through_json() {
        let config = parse_table_config(
            r#"{
                "table": "eit",
                "service_id": 257,
                "transport_stream_id": 1,
                "original_network_id": 8192,
                "present": [{
                    "event_id": 1,
                    "start_time": {"year": 2024, "month": 2, "day": 29, "hour": 20},
                    "duration": {"hours": 1, "minutes": 30, "seconds": 0},
                    "running_status": "running",
                    "descriptors": [{"type": "short_event", "language": "eng", "event_name": "News"}]
                }]
            }"#,
        )
        .unwrap();

        let json = serde_json::to_string(&config).unwrap();
        let again: TableConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(again, config);

        let sections = again.build().unwrap().build_sections().unwrap();
        assert_eq!(sections.len(), 2);
        // start time: MJD 60369, 20:00:00
        assert_eq!(&sections[0].as_bytes()[16..21], &[0xEB, 0xD1, 0x20, 0x00, 0x00]);
    }

    #[test]
    fn test_tot_overflow_is_capacity_error() {
        let descriptors: Vec<String> = (0..5)
            .map(|_| {
                let data = vec!["0"; 255].join(",");
                format!(r#"{{"type": "raw", "tag": 88, "data": [{}]}}"#, data)
            })
            .collect();
        let json = format!(
            r#"{{"table": "tot", "utc_time": {{"mjd": 60369, "hour": 0, "minute": 0, "second": 0}}, "descriptors": [{}]}}"#,
            descriptors.join(",")
        );

        let err = parse_table_config(&json).unwrap().build().err().unwrap();
        assert_eq!(
            err.to_string(),
            "Table capacity exceeded while adding descriptor 0x58 to the TOT"
        );
    }
}
