use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::attrs::AttrMap;
use crate::ids::{RecordId, ScanId};

/// Lifecycle state of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunStatus {
    /// The run is still collecting; `end_time` tracks the last update.
    #[serde(rename = "In Progress")]
    InProgress,
    /// The run has been closed out.
    #[serde(rename = "Complete")]
    Complete,
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunStatus::InProgress => f.write_str("In Progress"),
            RunStatus::Complete => f.write_str("Complete"),
        }
    }
}

/// Root record of a run bundle.
///
/// Descriptors, events, and configuration snapshots all point back at a
/// header via its record id. Timestamps are stored as integer epoch
/// microseconds so store-level comparisons and sorts stay numeric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunHeader {
    /// Store-assigned record identifier.
    #[serde(rename = "_id")]
    pub id: RecordId,
    /// Instrument-local scan number for this run.
    pub scan_id: ScanId,
    /// Account that recorded the run.
    pub owner: String,
    /// When collection started.
    #[serde(with = "chrono::serde::ts_microseconds")]
    pub start_time: DateTime<Utc>,
    /// When collection ended; equals `start_time` until the run is updated.
    #[serde(with = "chrono::serde::ts_microseconds")]
    pub end_time: DateTime<Utc>,
    /// Instrument the run was collected on.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub beamline_id: Option<String>,
    /// Lifecycle state.
    pub status: RunStatus,
    /// Caller-defined attributes; stored verbatim.
    pub custom: AttrMap,
}

/// Shape declaration for the events recorded under one header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventDescriptor {
    /// Store-assigned record identifier.
    #[serde(rename = "_id")]
    pub id: RecordId,
    /// Header this descriptor belongs to.
    pub header_id: RecordId,
    /// Numeric event type code.
    pub event_type_id: i64,
    /// Human-readable event type name; used to address the descriptor
    /// when events are recorded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_type_name: Option<String>,
    /// Caller-defined shape description; stored verbatim.
    pub type_descriptor: AttrMap,
    /// Free-form tag.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
}

/// One recorded data point under a descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Store-assigned record identifier.
    #[serde(rename = "_id")]
    pub id: RecordId,
    /// Descriptor this event was recorded against.
    #[serde(rename = "event_descriptor_id")]
    pub descriptor_id: RecordId,
    /// Header the owning descriptor belongs to.
    pub header_id: RecordId,
    /// Free-form description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Account that recorded the event.
    pub owner: String,
    /// Caller-assigned sequence number within the run.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seq_no: Option<i64>,
    /// Event payload; stored verbatim.
    pub data: AttrMap,
}

/// Snapshot of instrument configuration pinned to a header.
///
/// Unlike the other record kinds, snapshots carry a caller-supplied record
/// id so acquisition software can use its own configuration keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BeamlineConfig {
    /// Caller-supplied record identifier.
    #[serde(rename = "_id")]
    pub id: RecordId,
    /// Header this snapshot is pinned to.
    pub header_id: RecordId,
    /// Configuration payload; stored verbatim.
    pub config_params: AttrMap,
}
