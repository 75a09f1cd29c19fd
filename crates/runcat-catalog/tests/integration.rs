use chrono::{DateTime, Utc};
use serde_json::json;
use tempfile::TempDir;

use runcat_catalog::{
    adapter, Catalog, CatalogError, Criteria, DescriptorSpec, EventSpec, HeaderSpec, Selector,
    TimeCriterion,
};
use runcat_model::{AttrMap, RecordId, RunStatus, ScanId};
use runcat_store::{DocumentStore, MemStore, Query, StoreError, WriteConcern};

fn t(rfc: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(rfc)
        .unwrap()
        .with_timezone(&Utc)
}

fn header_spec(scan: i64, owner: &str, start: &str) -> HeaderSpec {
    let mut spec = HeaderSpec::new(scan);
    spec.owner = Some(owner.to_string());
    spec.start_time = Some(t(start));
    spec
}

fn named_descriptor(name: &str) -> DescriptorSpec {
    let mut spec = DescriptorSpec::new(0);
    spec.event_type_name = Some(name.to_string());
    spec
}

#[test]
fn test_save_header_round_trip() {
    let mut catalog = Catalog::in_memory();
    let mut spec = header_spec(107, "arkilic", "2024-03-01T10:00:00Z");
    spec.beamline_id = Some("csx".to_string());
    spec.custom.insert("sample".to_string(), json!("ni_wire"));

    let saved = catalog.save_header(spec).unwrap();
    assert_eq!(saved.end_time, saved.start_time);
    assert_eq!(saved.status, RunStatus::InProgress);

    let criteria = Criteria {
        header_id: Some(saved.id.clone()),
        ..Default::default()
    };
    let result = catalog.find(&Selector::Where(criteria), false).unwrap();
    assert_eq!(result.len(), 1);
    assert_eq!(result.runs[0].header, saved);
}

#[test]
fn test_save_header_defaults() {
    let mut catalog = Catalog::in_memory();
    let before = Utc::now();
    let saved = catalog.save_header(HeaderSpec::new(1)).unwrap();
    let after = Utc::now();

    assert!(!saved.owner.is_empty());
    assert!(saved.start_time >= before - chrono::Duration::seconds(1));
    assert!(saved.start_time <= after);
    assert!(saved.custom.is_empty());
    assert_eq!(saved.beamline_id, None);
}

#[test]
fn test_header_id_resolves_scans() {
    let mut catalog = Catalog::in_memory();
    let first = catalog
        .save_header(header_spec(1, "a", "2024-03-01T10:00:00Z"))
        .unwrap();
    let second = catalog
        .save_header(header_spec(2, "a", "2024-03-01T11:00:00Z"))
        .unwrap();

    assert_eq!(catalog.header_id(ScanId::from(1)).unwrap(), first.id);
    assert_eq!(catalog.header_id(ScanId::from(2)).unwrap(), second.id);

    match catalog.header_id(ScanId::from(99)).unwrap_err() {
        CatalogError::UnknownScanId(scan_id) => assert_eq!(scan_id, ScanId::from(99)),
        _ => panic!("expected UnknownScanId error"),
    }
}

#[test]
fn test_header_id_prefers_first_on_duplicate_scans() {
    let mut catalog = Catalog::in_memory();
    let first = catalog
        .save_header(header_spec(5, "a", "2024-03-01T10:00:00Z"))
        .unwrap();
    catalog
        .save_header(header_spec(5, "b", "2024-03-01T11:00:00Z"))
        .unwrap();

    assert_eq!(catalog.header_id(ScanId::from(5)).unwrap(), first.id);
}

#[test]
fn test_descriptor_lookup_is_scoped_to_the_scan() {
    let mut catalog = Catalog::in_memory();
    catalog
        .save_header(header_spec(1, "a", "2024-03-01T10:00:00Z"))
        .unwrap();
    catalog
        .save_header(header_spec(2, "a", "2024-03-01T11:00:00Z"))
        .unwrap();

    // Same descriptor name under both scans; resolution must stay scoped.
    let d1 = catalog
        .insert_event_descriptor(ScanId::from(1), named_descriptor("scan"))
        .unwrap();
    let d2 = catalog
        .insert_event_descriptor(ScanId::from(2), named_descriptor("scan"))
        .unwrap();
    assert_ne!(d1.id, d2.id);

    let (header_id, descriptor_id) = catalog.descriptor_ids("scan", ScanId::from(2)).unwrap();
    assert_eq!(header_id, d2.header_id);
    assert_eq!(descriptor_id, d2.id);

    match catalog.descriptor_ids("nope", ScanId::from(1)).unwrap_err() {
        CatalogError::UnknownDescriptor { name, scan_id } => {
            assert_eq!(name, "nope");
            assert_eq!(scan_id, ScanId::from(1));
        }
        _ => panic!("expected UnknownDescriptor error"),
    }
}

#[test]
fn test_descriptor_requires_existing_scan() {
    let mut catalog = Catalog::in_memory();
    assert!(matches!(
        catalog.insert_event_descriptor(ScanId::from(3), DescriptorSpec::new(0)),
        Err(CatalogError::UnknownScanId(_))
    ));
}

#[test]
fn test_insert_event_links_and_round_trips() {
    let mut catalog = Catalog::in_memory();
    let header = catalog
        .save_header(header_spec(1, "a", "2024-03-01T10:00:00Z"))
        .unwrap();
    let descriptor = catalog
        .insert_event_descriptor(ScanId::from(1), named_descriptor("temperature"))
        .unwrap();

    let mut spec = EventSpec::new();
    spec.owner = Some("swilkins".to_string());
    spec.seq_no = Some(3);
    spec.data.insert("value".to_string(), json!(273.5));
    let event = catalog
        .insert_event(ScanId::from(1), "temperature", spec)
        .unwrap();

    assert_eq!(event.header_id, header.id);
    assert_eq!(event.descriptor_id, descriptor.id);

    let result = catalog.find(&Selector::Current, true).unwrap();
    let events = result.runs[0].descriptors[0].events.as_ref().unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].event, event);
}

#[test]
fn test_insert_event_defaults_owner() {
    let mut catalog = Catalog::in_memory();
    catalog
        .save_header(header_spec(1, "a", "2024-03-01T10:00:00Z"))
        .unwrap();
    catalog
        .insert_event_descriptor(ScanId::from(1), named_descriptor("scan"))
        .unwrap();
    let event = catalog
        .insert_event(ScanId::from(1), "scan", EventSpec::new())
        .unwrap();
    assert!(!event.owner.is_empty());
}

#[test]
fn test_beamline_config_requires_header() {
    let mut catalog = Catalog::in_memory();
    let bogus = RecordId::new("ffffffffffffffffffffffff".to_string());

    match catalog
        .save_beamline_config(
            RecordId::new("csx_config:1".to_string()),
            bogus.clone(),
            AttrMap::new(),
        )
        .unwrap_err()
    {
        CatalogError::UnknownHeader(id) => assert_eq!(id, bogus),
        _ => panic!("expected UnknownHeader error"),
    }

    // The failed save must not leave an orphan snapshot behind.
    assert!(catalog.configs_for(&bogus).unwrap().is_empty());
}

#[test]
fn test_beamline_config_round_trip_with_caller_id() {
    let mut catalog = Catalog::in_memory();
    let header = catalog
        .save_header(header_spec(1, "a", "2024-03-01T10:00:00Z"))
        .unwrap();

    let mut params = AttrMap::new();
    params.insert("undulator_gap".to_string(), json!(6.2));
    let config = catalog
        .save_beamline_config(
            RecordId::new("csx_config:2024".to_string()),
            header.id.clone(),
            params,
        )
        .unwrap();
    assert_eq!(config.id.as_str(), "csx_config:2024");

    let docs = catalog.configs_for(&header.id).unwrap();
    assert_eq!(docs.len(), 1);
    assert_eq!(docs[0]["_id"], json!("csx_config:2024"));
    assert_eq!(docs[0]["config_params"]["undulator_gap"], json!(6.2));
}

#[test]
fn test_duplicate_config_id_is_rejected() {
    let mut catalog = Catalog::in_memory();
    let header = catalog
        .save_header(header_spec(1, "a", "2024-03-01T10:00:00Z"))
        .unwrap();

    let config_id = RecordId::new("csx_config:1".to_string());
    catalog
        .save_beamline_config(config_id.clone(), header.id.clone(), AttrMap::new())
        .unwrap();
    match catalog
        .save_beamline_config(config_id, header.id.clone(), AttrMap::new())
        .unwrap_err()
    {
        CatalogError::Store(StoreError::DuplicateId(_)) => {}
        _ => panic!("expected DuplicateId error"),
    }
}

#[test]
fn test_header_updates_preserve_unmodeled_fields() {
    let mut store = MemStore::new();
    let header_id = store
        .insert(
            adapter::HEADERS,
            json!({
                "scan_id": 9,
                "owner": "a",
                "start_time": 1_700_000_000_000_000i64,
                "end_time": 1_700_000_000_000_000i64,
                "status": "In Progress",
                "custom": {},
                "note": "keep me",
            }),
            &WriteConcern::acknowledged(),
        )
        .unwrap();

    let mut catalog = Catalog::new(store);
    catalog
        .update_header_end_time(&header_id, t("2024-03-01T12:00:00Z"))
        .unwrap();
    catalog
        .update_header_status(&header_id, RunStatus::Complete)
        .unwrap();

    let docs = catalog.headers_raw(&Query::new()).unwrap();
    assert_eq!(docs.len(), 1);
    assert_eq!(docs[0]["note"], json!("keep me"));
    assert_eq!(docs[0]["status"], json!("Complete"));
    assert_eq!(
        docs[0]["end_time"],
        json!(t("2024-03-01T12:00:00Z").timestamp_micros())
    );
}

#[test]
fn test_update_unknown_header_fails_typed() {
    let mut catalog = Catalog::in_memory();
    let bogus = RecordId::new("eeeeeeeeeeeeeeeeeeeeeeee".to_string());
    assert!(matches!(
        catalog.update_header_status(&bogus, RunStatus::Complete),
        Err(CatalogError::UnknownHeader(_))
    ));
}

#[test]
fn test_find_owner_exact_versus_wildcard() {
    let mut catalog = Catalog::in_memory();
    catalog
        .save_header(header_spec(1, "arkilic", "2024-03-01T10:00:00Z"))
        .unwrap();
    catalog
        .save_header(header_spec(2, "Arkilic", "2024-03-01T11:00:00Z"))
        .unwrap();
    catalog
        .save_header(header_spec(3, "swilkins", "2024-03-01T12:00:00Z"))
        .unwrap();

    // No wildcard characters: exact, case-sensitive match.
    let criteria = Criteria {
        owner: Some("arkilic".to_string()),
        ..Default::default()
    };
    let result = catalog.find(&Selector::Where(criteria), false).unwrap();
    assert_eq!(result.len(), 1);
    assert_eq!(result.runs[0].header.scan_id, ScanId::from(1));

    // Wildcard characters switch to case-insensitive pattern matching.
    let criteria = Criteria {
        owner: Some("ark*".to_string()),
        ..Default::default()
    };
    let result = catalog.find(&Selector::Where(criteria), false).unwrap();
    let scans: Vec<_> = result.runs.iter().map(|r| r.header.scan_id).collect();
    assert_eq!(scans, vec![ScanId::from(1), ScanId::from(2)]);
}

#[test]
fn test_find_time_between_is_half_open() {
    let mut catalog = Catalog::in_memory();
    catalog
        .save_header(header_spec(1, "a", "2024-03-01T10:00:00Z"))
        .unwrap();
    catalog
        .save_header(header_spec(2, "a", "2024-03-01T11:00:00Z"))
        .unwrap();
    catalog
        .save_header(header_spec(3, "a", "2024-03-01T12:00:00Z"))
        .unwrap();

    let criteria = Criteria {
        start_time: Some(TimeCriterion::Between {
            start: t("2024-03-01T10:00:00Z"),
            end: t("2024-03-01T12:00:00Z"),
        }),
        ..Default::default()
    };
    let result = catalog.find(&Selector::Where(criteria), false).unwrap();
    let scans: Vec<_> = result.runs.iter().map(|r| r.header.scan_id).collect();
    // The interval start is included, the end is not.
    assert_eq!(scans, vec![ScanId::from(1), ScanId::from(2)]);
}

#[test]
fn test_find_time_at_list() {
    let mut catalog = Catalog::in_memory();
    catalog
        .save_header(header_spec(1, "a", "2024-03-01T10:00:00Z"))
        .unwrap();
    catalog
        .save_header(header_spec(2, "a", "2024-03-01T11:00:00Z"))
        .unwrap();
    catalog
        .save_header(header_spec(3, "a", "2024-03-01T12:00:00Z"))
        .unwrap();

    let criteria = Criteria {
        start_time: Some(TimeCriterion::At(vec![
            t("2024-03-01T10:00:00Z"),
            t("2024-03-01T12:00:00Z"),
        ])),
        ..Default::default()
    };
    let result = catalog.find(&Selector::Where(criteria), false).unwrap();
    let scans: Vec<_> = result.runs.iter().map(|r| r.header.scan_id).collect();
    assert_eq!(scans, vec![ScanId::from(1), ScanId::from(3)]);
}

#[test]
fn test_find_time_since() {
    let mut catalog = Catalog::in_memory();
    catalog
        .save_header(header_spec(1, "a", "2024-03-01T10:00:00Z"))
        .unwrap();
    catalog
        .save_header(header_spec(2, "a", "2024-03-01T12:00:00Z"))
        .unwrap();

    let criteria = Criteria {
        start_time: Some(TimeCriterion::Since(t("2024-03-01T11:00:00Z"))),
        ..Default::default()
    };
    let result = catalog.find(&Selector::Where(criteria), false).unwrap();
    assert_eq!(result.len(), 1);
    assert_eq!(result.runs[0].header.scan_id, ScanId::from(2));

    // An instant in the future bounds an empty interval.
    let criteria = Criteria {
        start_time: Some(TimeCriterion::Since(Utc::now() + chrono::Duration::days(1))),
        ..Default::default()
    };
    assert!(catalog.find(&Selector::Where(criteria), false).unwrap().is_empty());
}

#[test]
fn test_find_current_and_previous() {
    let mut catalog = Catalog::in_memory();

    match catalog.find(&Selector::Current, false).unwrap_err() {
        CatalogError::NotEnoughRuns { required, found } => {
            assert_eq!((required, found), (1, 0));
        }
        _ => panic!("expected NotEnoughRuns error"),
    }

    // Insertion order deliberately disagrees with time order.
    catalog
        .save_header(header_spec(1, "a", "2024-03-01T10:00:00Z"))
        .unwrap();

    match catalog.find(&Selector::Previous, false).unwrap_err() {
        CatalogError::NotEnoughRuns { required, found } => {
            assert_eq!((required, found), (2, 1));
        }
        _ => panic!("expected NotEnoughRuns error"),
    }

    catalog
        .save_header(header_spec(2, "a", "2024-03-01T12:00:00Z"))
        .unwrap();
    catalog
        .save_header(header_spec(3, "a", "2024-03-01T11:00:00Z"))
        .unwrap();

    let current = catalog.find(&Selector::Current, false).unwrap();
    assert_eq!(current.runs[0].header.scan_id, ScanId::from(2));

    let previous = catalog.find(&Selector::Previous, false).unwrap();
    assert_eq!(previous.runs[0].header.scan_id, ScanId::from(3));

    // Recency tracks end_time updates, not insertion.
    let lagging = catalog.header_id(ScanId::from(1)).unwrap();
    catalog
        .update_header_end_time(&lagging, t("2024-03-01T13:00:00Z"))
        .unwrap();
    let current = catalog.find(&Selector::Current, false).unwrap();
    assert_eq!(current.runs[0].header.scan_id, ScanId::from(1));
}

#[test]
fn test_find_attaches_children_with_positional_labels() {
    let mut catalog = Catalog::in_memory();
    catalog
        .save_header(header_spec(1, "a", "2024-03-01T10:00:00Z"))
        .unwrap();
    catalog
        .save_header(header_spec(2, "a", "2024-03-01T11:00:00Z"))
        .unwrap();

    catalog
        .insert_event_descriptor(ScanId::from(1), named_descriptor("scan"))
        .unwrap();
    catalog
        .insert_event_descriptor(ScanId::from(2), named_descriptor("scan"))
        .unwrap();
    catalog
        .insert_event_descriptor(ScanId::from(2), named_descriptor("baseline"))
        .unwrap();

    catalog
        .insert_event(ScanId::from(2), "scan", EventSpec::new())
        .unwrap();
    catalog
        .insert_event(ScanId::from(2), "scan", EventSpec::new())
        .unwrap();

    let result = catalog.find(&Selector::Where(Criteria::default()), true).unwrap();
    assert_eq!(result.len(), 2);

    // Positional labels restart per parent.
    let first = &result.runs[0];
    assert_eq!(first.descriptors.len(), 1);
    assert_eq!(first.descriptors[0].label, "event_descriptor_0");
    assert_eq!(first.descriptors[0].events.as_ref().unwrap().len(), 0);

    let second = &result.runs[1];
    assert_eq!(second.descriptors.len(), 2);
    assert_eq!(second.descriptors[0].label, "event_descriptor_0");
    assert_eq!(second.descriptors[1].label, "event_descriptor_1");
    let events = second.descriptors[0].events.as_ref().unwrap();
    assert_eq!(events[0].label, "event_0");
    assert_eq!(events[1].label, "event_1");

    // Without the data flag, payloads stay unfetched.
    let result = catalog.find(&Selector::Where(Criteria::default()), false).unwrap();
    assert!(result.runs[1].descriptors[0].events.is_none());
}

#[test]
fn test_result_shape_is_uniform_across_selectors() {
    let mut catalog = Catalog::in_memory();
    let header = catalog
        .save_header(header_spec(1, "a", "2024-03-01T10:00:00Z"))
        .unwrap();

    let by_sentinel = catalog.find(&Selector::Current, false).unwrap();
    let by_criteria = catalog
        .find(
            &Selector::Where(Criteria {
                scan_id: Some(ScanId::from(1)),
                ..Default::default()
            }),
            false,
        )
        .unwrap();

    let expected = format!("header_{}", header.id);
    assert_eq!(by_sentinel.runs[0].label, expected);
    assert_eq!(by_criteria.runs[0].label, expected);
}

#[test]
fn test_to_doc_renders_nested_labels() {
    let mut catalog = Catalog::in_memory();
    let header = catalog
        .save_header(header_spec(1, "a", "2024-03-01T10:00:00Z"))
        .unwrap();
    catalog
        .insert_event_descriptor(ScanId::from(1), named_descriptor("scan"))
        .unwrap();
    catalog
        .insert_event(ScanId::from(1), "scan", EventSpec::new())
        .unwrap();

    let doc = catalog
        .find(&Selector::Current, true)
        .unwrap()
        .to_doc()
        .unwrap();

    let run = &doc[format!("header_{}", header.id).as_str()];
    assert_eq!(run["scan_id"], json!(1));
    let descriptor = &run["event_descriptor_0"];
    assert_eq!(descriptor["event_type_name"], json!("scan"));
    assert!(descriptor["events"]["event_0"]["data"].is_object());
}

#[test]
fn test_time_criterion_from_doc() {
    // Scalar string: everything since that instant.
    let c = TimeCriterion::from_doc(&json!("2024-03-01T10:00:00Z")).unwrap();
    assert!(matches!(c, TimeCriterion::Since(_)));

    // Scalar integer: epoch microseconds.
    let c = TimeCriterion::from_doc(&json!(1_700_000_000_000_000i64)).unwrap();
    assert!(matches!(c, TimeCriterion::Since(_)));

    // List: exact instants.
    let c = TimeCriterion::from_doc(&json!(["2024-03-01T10:00:00Z", "2024-03-01T11:00:00Z"]))
        .unwrap();
    match c {
        TimeCriterion::At(instants) => assert_eq!(instants.len(), 2),
        _ => panic!("expected At criterion"),
    }

    // Object with start and end: half-open interval.
    let c = TimeCriterion::from_doc(&json!({
        "start": "2024-03-01T10:00:00Z",
        "end": "2024-03-01T12:00:00Z",
    }))
    .unwrap();
    assert!(matches!(c, TimeCriterion::Between { .. }));

    // Anything that is not a timestamp is a typed error.
    assert!(matches!(
        TimeCriterion::from_doc(&json!(true)),
        Err(CatalogError::ExpectedTimestamp(_))
    ));
    assert!(matches!(
        TimeCriterion::from_doc(&json!(["2024-03-01T10:00:00Z", "yesterday"])),
        Err(CatalogError::ExpectedTimestamp(_))
    ));
    assert!(matches!(
        TimeCriterion::from_doc(&json!({"start": "2024-03-01T10:00:00Z"})),
        Err(CatalogError::ExpectedTimestamp(_))
    ));
}

#[test]
fn test_list_headers_and_descriptors() {
    let mut catalog = Catalog::in_memory();
    catalog
        .save_header(header_spec(1, "a", "2024-03-01T10:00:00Z"))
        .unwrap();
    catalog
        .save_header(header_spec(2, "b", "2024-03-01T11:00:00Z"))
        .unwrap();
    catalog
        .insert_event_descriptor(ScanId::from(1), named_descriptor("scan"))
        .unwrap();

    let headers = catalog.list_headers().unwrap();
    let scans: Vec<_> = headers.iter().map(|h| h.scan_id).collect();
    assert_eq!(scans, vec![ScanId::from(1), ScanId::from(2)]);

    let descriptors = catalog.list_event_descriptors().unwrap();
    assert_eq!(descriptors.len(), 1);
    assert_eq!(descriptors[0].event_type_name.as_deref(), Some("scan"));
}

#[test]
fn test_file_backed_catalog_survives_reopen() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("runs.rcat");

    let header = {
        let mut catalog = Catalog::open(&path).unwrap();
        let header = catalog
            .save_header(header_spec(42, "arkilic", "2024-03-01T10:00:00Z"))
            .unwrap();
        catalog
            .insert_event_descriptor(ScanId::from(42), named_descriptor("scan"))
            .unwrap();
        catalog
            .insert_event(ScanId::from(42), "scan", EventSpec::new())
            .unwrap();
        catalog
            .update_header_status(&header.id, RunStatus::Complete)
            .unwrap();
        header
    };

    let catalog = Catalog::open(&path).unwrap();
    let result = catalog.find(&Selector::Current, true).unwrap();
    assert_eq!(result.len(), 1);
    let run = &result.runs[0];
    assert_eq!(run.header.id, header.id);
    assert_eq!(run.header.status, RunStatus::Complete);
    assert_eq!(run.descriptors.len(), 1);
    assert_eq!(run.descriptors[0].events.as_ref().unwrap().len(), 1);
}
