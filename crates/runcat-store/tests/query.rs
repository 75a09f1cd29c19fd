use serde_json::json;

use runcat_store::{Condition, DocumentStore, MemStore, Query, SortOrder, StoreError, WriteConcern};

fn concern() -> WriteConcern {
    WriteConcern::acknowledged()
}

fn seeded_store() -> MemStore {
    let mut store = MemStore::new();
    store
        .insert(
            "headers",
            json!({"scan_id": 1, "owner": "arkilic", "end_time": 100}),
            &concern(),
        )
        .unwrap();
    store
        .insert(
            "headers",
            json!({"scan_id": 2, "owner": "swilkins", "end_time": 300}),
            &concern(),
        )
        .unwrap();
    store
        .insert(
            "headers",
            json!({"scan_id": 3, "owner": "Arkilic", "end_time": 200}),
            &concern(),
        )
        .unwrap();
    store
}

#[test]
fn test_insert_assigns_hex_id() {
    let mut store = MemStore::new();
    let id = store
        .insert("headers", json!({"scan_id": 9}), &concern())
        .unwrap();
    assert_eq!(id.as_str().len(), 24);
    assert!(id.as_str().chars().all(|c| c.is_ascii_hexdigit()));

    let docs = store.find("headers", &Query::new()).unwrap();
    assert_eq!(docs[0]["_id"], json!(id.as_str()));
}

#[test]
fn test_find_missing_collection_is_empty() {
    let store = MemStore::new();
    let docs = store.find("nowhere", &Query::new()).unwrap();
    assert!(docs.is_empty());
}

#[test]
fn test_find_natural_order() {
    let store = seeded_store();
    let docs = store.find("headers", &Query::new()).unwrap();
    let scans: Vec<_> = docs.iter().map(|d| d["scan_id"].as_i64().unwrap()).collect();
    assert_eq!(scans, vec![1, 2, 3]);
}

#[test]
fn test_eq_condition_and_missing_field() {
    let store = seeded_store();

    let query = Query::new().field("scan_id", Condition::Eq(json!(2)));
    let docs = store.find("headers", &query).unwrap();
    assert_eq!(docs.len(), 1);
    assert_eq!(docs[0]["owner"], json!("swilkins"));

    // A document without the conditioned field never matches.
    let query = Query::new().field("beamline_id", Condition::Eq(json!("csx")));
    assert!(store.find("headers", &query).unwrap().is_empty());
}

#[test]
fn test_in_condition() {
    let store = seeded_store();
    let query = Query::new().field("end_time", Condition::In(vec![json!(100), json!(200)]));
    let docs = store.find("headers", &query).unwrap();
    let scans: Vec<_> = docs.iter().map(|d| d["scan_id"].as_i64().unwrap()).collect();
    assert_eq!(scans, vec![1, 3]);
}

#[test]
fn test_range_is_half_open() {
    let store = seeded_store();
    let query = Query::new().field(
        "end_time",
        Condition::Range {
            gte: Some(json!(100)),
            lt: Some(json!(300)),
        },
    );
    let docs = store.find("headers", &query).unwrap();
    let scans: Vec<_> = docs.iter().map(|d| d["scan_id"].as_i64().unwrap()).collect();
    // 100 is included, 300 is excluded.
    assert_eq!(scans, vec![1, 3]);
}

#[test]
fn test_matches_is_case_insensitive_and_unanchored() {
    let store = seeded_store();
    let query = Query::new().field("owner", Condition::Matches("ark*".to_string()));
    let docs = store.find("headers", &query).unwrap();
    let scans: Vec<_> = docs.iter().map(|d| d["scan_id"].as_i64().unwrap()).collect();
    assert_eq!(scans, vec![1, 3]);

    // Non-string fields never match a pattern.
    let query = Query::new().field("scan_id", Condition::Matches("1".to_string()));
    assert!(store.find("headers", &query).unwrap().is_empty());
}

#[test]
fn test_invalid_pattern_is_an_error() {
    let store = seeded_store();
    let query = Query::new().field("owner", Condition::Matches("ark(".to_string()));
    match store.find("headers", &query).unwrap_err() {
        StoreError::InvalidPattern { pattern, .. } => assert_eq!(pattern, "ark("),
        _ => panic!("expected InvalidPattern error"),
    }
}

#[test]
fn test_cross_type_range_never_matches() {
    let store = seeded_store();
    let query = Query::new().field(
        "owner",
        Condition::Range {
            gte: Some(json!(0)),
            lt: None,
        },
    );
    assert!(store.find("headers", &query).unwrap().is_empty());
}

#[test]
fn test_sort_desc_with_limit() {
    let store = seeded_store();
    let query = Query::new().sort("end_time", SortOrder::Desc).limit(2);
    let docs = store.find("headers", &query).unwrap();
    let ends: Vec<_> = docs.iter().map(|d| d["end_time"].as_i64().unwrap()).collect();
    assert_eq!(ends, vec![300, 200]);
}

#[test]
fn test_sort_keeps_insertion_order_on_ties() {
    let mut store = MemStore::new();
    for scan in 1..=3 {
        store
            .insert("headers", json!({"scan_id": scan, "end_time": 50}), &concern())
            .unwrap();
    }
    let query = Query::new().sort("end_time", SortOrder::Desc);
    let docs = store.find("headers", &query).unwrap();
    let scans: Vec<_> = docs.iter().map(|d| d["scan_id"].as_i64().unwrap()).collect();
    assert_eq!(scans, vec![1, 2, 3]);
}

#[test]
fn test_update_replaces_first_match_only() {
    let mut store = MemStore::new();
    store
        .insert("headers", json!({"scan_id": 5, "status": "In Progress"}), &concern())
        .unwrap();
    store
        .insert("headers", json!({"scan_id": 5, "status": "In Progress"}), &concern())
        .unwrap();

    let query = Query::new().field("scan_id", Condition::Eq(json!(5)));
    let docs = store.find("headers", &query).unwrap();
    let mut updated = docs[0].clone();
    updated["status"] = json!("Complete");

    let matched = store.update("headers", &query, updated, false).unwrap();
    assert_eq!(matched, 1);

    let docs = store.find("headers", &query).unwrap();
    assert_eq!(docs[0]["status"], json!("Complete"));
    assert_eq!(docs[1]["status"], json!("In Progress"));
}

#[test]
fn test_update_preserves_matched_id() {
    let mut store = MemStore::new();
    let id = store
        .insert("headers", json!({"scan_id": 5}), &concern())
        .unwrap();

    let query = Query::new().field("scan_id", Condition::Eq(json!(5)));
    // The replacement does not carry an _id; the stored one is kept.
    let matched = store
        .update("headers", &query, json!({"scan_id": 5, "status": "Complete"}), false)
        .unwrap();
    assert_eq!(matched, 1);

    let docs = store.find("headers", &Query::new()).unwrap();
    assert_eq!(docs.len(), 1);
    assert_eq!(docs[0]["_id"], json!(id.as_str()));
}

#[test]
fn test_update_without_match_is_a_no_op() {
    let mut store = seeded_store();
    let query = Query::new().field("scan_id", Condition::Eq(json!(99)));
    let matched = store
        .update("headers", &query, json!({"scan_id": 99}), false)
        .unwrap();
    assert_eq!(matched, 0);
    assert_eq!(store.find("headers", &Query::new()).unwrap().len(), 3);
}

#[test]
fn test_update_upsert_inserts_on_miss() {
    let mut store = MemStore::new();
    let query = Query::new().field("scan_id", Condition::Eq(json!(7)));
    let matched = store
        .update("headers", &query, json!({"scan_id": 7}), true)
        .unwrap();
    assert_eq!(matched, 0);

    let docs = store.find("headers", &query).unwrap();
    assert_eq!(docs.len(), 1);
    assert!(docs[0]["_id"].is_string());
}

#[test]
fn test_insert_respects_caller_id_and_rejects_duplicates() {
    let mut store = MemStore::new();
    let id = store
        .insert("configs", json!({"_id": "csx_config:1", "kind": "a"}), &concern())
        .unwrap();
    assert_eq!(id.as_str(), "csx_config:1");

    let err = store
        .insert("configs", json!({"_id": "csx_config:1", "kind": "b"}), &concern())
        .unwrap_err();
    assert!(matches!(err, StoreError::DuplicateId(_)));
}

#[test]
fn test_insert_rejects_bad_documents() {
    let mut store = MemStore::new();
    assert!(matches!(
        store.insert("headers", json!(42), &concern()),
        Err(StoreError::NotAnObject)
    ));
    assert!(matches!(
        store.insert("headers", json!({"_id": "has space"}), &concern()),
        Err(StoreError::InvalidId(_))
    ));
}
