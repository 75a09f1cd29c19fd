//! Record writers: persist headers, descriptors, events, and snapshots.

use std::env;

use chrono::{DateTime, Utc};
use runcat_model::{
    AttrMap, BeamlineConfig, Event, EventDescriptor, RecordId, RunHeader, RunStatus, ScanId,
};
use runcat_store::{Condition, DocJson, DocumentStore, Query, WriteConcern, ID_FIELD};
use serde_json::json;
use tracing::warn;

use crate::adapter::{CONFIGS, DESCRIPTORS, EVENTS, HEADERS};
use crate::catalog::Catalog;
use crate::errors::CatalogError;

/// Write concern requested for every record write.
const CONCERN: WriteConcern = WriteConcern::acknowledged();

/// What to record for a new run header.
#[derive(Debug, Clone)]
pub struct HeaderSpec {
    /// Scan number for the run.
    pub scan_id: ScanId,
    /// Recording account; defaults to the current user.
    pub owner: Option<String>,
    /// Collection start; defaults to now.
    pub start_time: Option<DateTime<Utc>>,
    /// Instrument identifier.
    pub beamline_id: Option<String>,
    /// Initial lifecycle state.
    pub status: RunStatus,
    /// Caller-defined attributes.
    pub custom: AttrMap,
}

impl HeaderSpec {
    /// A minimal spec: in-progress run, owner and start time defaulted.
    pub fn new(scan_id: impl Into<ScanId>) -> Self {
        Self {
            scan_id: scan_id.into(),
            owner: None,
            start_time: None,
            beamline_id: None,
            status: RunStatus::InProgress,
            custom: AttrMap::new(),
        }
    }
}

/// What to record for a new event descriptor.
#[derive(Debug, Clone)]
pub struct DescriptorSpec {
    /// Numeric event type code.
    pub event_type_id: i64,
    /// Name events use to address this descriptor.
    pub event_type_name: Option<String>,
    /// Caller-defined shape description.
    pub type_descriptor: AttrMap,
    /// Free-form tag.
    pub tag: Option<String>,
}

impl DescriptorSpec {
    /// A minimal spec with just the event type code.
    pub fn new(event_type_id: i64) -> Self {
        Self {
            event_type_id,
            event_type_name: None,
            type_descriptor: AttrMap::new(),
            tag: None,
        }
    }
}

/// What to record for a new event.
#[derive(Debug, Clone, Default)]
pub struct EventSpec {
    /// Free-form description.
    pub description: Option<String>,
    /// Recording account; defaults to the current user.
    pub owner: Option<String>,
    /// Caller-assigned sequence number within the run.
    pub seq_no: Option<i64>,
    /// Event payload.
    pub data: AttrMap,
}

impl EventSpec {
    /// An empty event payload.
    pub fn new() -> Self {
        Self::default()
    }
}

impl<S: DocumentStore> Catalog<S> {
    /// Records a new run header and returns it.
    ///
    /// `end_time` starts equal to `start_time` and advances through
    /// [`Catalog::update_header_end_time`] as the run progresses, so a
    /// freshly recorded run already participates in recency selection.
    pub fn save_header(&mut self, spec: HeaderSpec) -> Result<RunHeader, CatalogError> {
        let owner = spec.owner.unwrap_or_else(current_user);
        let start_time = truncate_to_micros(spec.start_time.unwrap_or_else(Utc::now));
        let mut doc = json!({
            "scan_id": spec.scan_id,
            "owner": owner,
            "start_time": start_time.timestamp_micros(),
            "end_time": start_time.timestamp_micros(),
            "status": spec.status,
            "custom": spec.custom,
        });
        if let Some(beamline_id) = &spec.beamline_id {
            doc["beamline_id"] = json!(beamline_id);
        }

        let id = self.store.insert(HEADERS, doc, &CONCERN).map_err(|err| {
            warn!(scan_id = %spec.scan_id, %err, "run header cannot be saved");
            CatalogError::from(err)
        })?;

        Ok(RunHeader {
            id,
            scan_id: spec.scan_id,
            owner,
            start_time,
            end_time: start_time,
            beamline_id: spec.beamline_id,
            status: spec.status,
            custom: spec.custom,
        })
    }

    /// Declares an event descriptor under the run with the given scan
    /// number.
    pub fn insert_event_descriptor(
        &mut self,
        scan_id: ScanId,
        spec: DescriptorSpec,
    ) -> Result<EventDescriptor, CatalogError> {
        let header_id = self.header_id(scan_id)?;
        let mut doc = json!({
            "header_id": header_id,
            "event_type_id": spec.event_type_id,
            "type_descriptor": spec.type_descriptor,
        });
        if let Some(name) = &spec.event_type_name {
            doc["event_type_name"] = json!(name);
        }
        if let Some(tag) = &spec.tag {
            doc["tag"] = json!(tag);
        }

        let id = self.store.insert(DESCRIPTORS, doc, &CONCERN).map_err(|err| {
            warn!(%scan_id, %err, "event descriptor cannot be saved");
            CatalogError::from(err)
        })?;

        Ok(EventDescriptor {
            id,
            header_id,
            event_type_id: spec.event_type_id,
            event_type_name: spec.event_type_name,
            type_descriptor: spec.type_descriptor,
            tag: spec.tag,
        })
    }

    /// Records an event against a named descriptor under a scan.
    pub fn insert_event(
        &mut self,
        scan_id: ScanId,
        descriptor_name: &str,
        spec: EventSpec,
    ) -> Result<Event, CatalogError> {
        let (header_id, descriptor_id) = self.descriptor_ids(descriptor_name, scan_id)?;
        let owner = spec.owner.unwrap_or_else(current_user);
        let mut doc = json!({
            "event_descriptor_id": descriptor_id,
            "header_id": header_id,
            "owner": owner,
            "data": spec.data,
        });
        if let Some(description) = &spec.description {
            doc["description"] = json!(description);
        }
        if let Some(seq_no) = spec.seq_no {
            doc["seq_no"] = json!(seq_no);
        }

        let id = self.store.insert(EVENTS, doc, &CONCERN).map_err(|err| {
            warn!(%scan_id, descriptor = descriptor_name, %err, "event cannot be recorded");
            CatalogError::from(err)
        })?;

        Ok(Event {
            id,
            descriptor_id,
            header_id,
            description: spec.description,
            owner,
            seq_no: spec.seq_no,
            data: spec.data,
        })
    }

    /// Pins a configuration snapshot to an existing header.
    ///
    /// The snapshot id is caller-supplied. The header is verified before
    /// anything is written, so a bad reference never leaves an orphan
    /// snapshot behind.
    pub fn save_beamline_config(
        &mut self,
        config_id: RecordId,
        header_id: RecordId,
        config_params: AttrMap,
    ) -> Result<BeamlineConfig, CatalogError> {
        if self.header_by_id(&header_id)?.is_none() {
            return Err(CatalogError::UnknownHeader(header_id));
        }

        let doc = json!({
            "_id": config_id,
            "header_id": header_id,
            "config_params": config_params,
        });
        self.store.insert(CONFIGS, doc, &CONCERN).map_err(|err| {
            warn!(config_id = %config_id, %err, "beamline config cannot be saved");
            CatalogError::from(err)
        })?;

        Ok(BeamlineConfig {
            id: config_id,
            header_id,
            config_params,
        })
    }

    /// Advances a header's `end_time`.
    pub fn update_header_end_time(
        &mut self,
        header_id: &RecordId,
        end_time: DateTime<Utc>,
    ) -> Result<(), CatalogError> {
        self.rewrite_header(header_id, "header end_time cannot be updated", |doc| {
            doc["end_time"] = json!(end_time.timestamp_micros());
        })
    }

    /// Sets a header's lifecycle status.
    pub fn update_header_status(
        &mut self,
        header_id: &RecordId,
        status: RunStatus,
    ) -> Result<(), CatalogError> {
        self.rewrite_header(header_id, "header status cannot be updated", |doc| {
            doc["status"] = json!(status);
        })
    }

    /// Read-modify-write on the stored header document. Mutating the raw
    /// document preserves fields this crate does not model.
    fn rewrite_header(
        &mut self,
        header_id: &RecordId,
        context: &'static str,
        mutate: impl FnOnce(&mut DocJson),
    ) -> Result<(), CatalogError> {
        let query = Query::new().field(ID_FIELD, Condition::Eq(json!(header_id)));
        let docs = self.store.find(HEADERS, &query)?;
        let mut doc = docs
            .into_iter()
            .next()
            .ok_or_else(|| CatalogError::UnknownHeader(header_id.clone()))?;
        mutate(&mut doc);
        self.store
            .update(HEADERS, &query, doc, false)
            .map_err(|err| {
                warn!(header_id = %header_id, %err, "{}", context);
                CatalogError::from(err)
            })?;
        Ok(())
    }
}

/// The account this process runs as, for defaulted owners.
fn current_user() -> String {
    env::var("USER").unwrap_or_else(|_| "unknown".to_string())
}

/// Drops sub-microsecond precision so returned records compare equal to
/// their stored form.
fn truncate_to_micros(t: DateTime<Utc>) -> DateTime<Utc> {
    DateTime::from_timestamp_micros(t.timestamp_micros()).unwrap_or(t)
}
