//! Typed find results shaped as header → descriptors → events.

use runcat_model::{Event, EventDescriptor, RunHeader};
use runcat_store::DocJson;
use serde_json::{Map, Value};

use crate::errors::CatalogError;

/// One matched run with its children attached.
#[derive(Debug, Clone)]
pub struct RunEntry {
    /// Identity label: `header_<id>`.
    pub label: String,
    /// The run header.
    pub header: RunHeader,
    /// Descriptors under the header, in insertion order.
    pub descriptors: Vec<DescriptorEntry>,
}

/// One descriptor under a matched run.
#[derive(Debug, Clone)]
pub struct DescriptorEntry {
    /// Positional label within the run: `event_descriptor_<i>`.
    pub label: String,
    /// The descriptor record.
    pub descriptor: EventDescriptor,
    /// Events recorded against the descriptor, present only when the find
    /// asked for payloads.
    pub events: Option<Vec<EventEntry>>,
}

/// One event under a descriptor.
#[derive(Debug, Clone)]
pub struct EventEntry {
    /// Positional label within the descriptor: `event_<i>`.
    pub label: String,
    /// The event record.
    pub event: Event,
}

/// The result of a find: matched runs in result order.
///
/// Every selector produces this same shape, sentinel or not.
#[derive(Debug, Clone, Default)]
pub struct FindResult {
    /// Matched runs.
    pub runs: Vec<RunEntry>,
}

impl FindResult {
    /// Number of matched runs.
    pub fn len(&self) -> usize {
        self.runs.len()
    }

    /// True when nothing matched.
    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    /// Renders the nested label-to-document shape:
    ///
    /// ```json
    /// {"header_<id>": {..., "event_descriptor_<i>": {..., "events": {"event_<i>": {...}}}}}
    /// ```
    ///
    /// Descriptor entries without payloads render without an `events` key.
    pub fn to_doc(&self) -> Result<DocJson, CatalogError> {
        let mut out = Map::new();
        for run in &self.runs {
            let mut header_doc = serde_json::to_value(&run.header)?;
            for entry in &run.descriptors {
                let mut descriptor_doc = serde_json::to_value(&entry.descriptor)?;
                if let Some(events) = &entry.events {
                    let mut event_map = Map::new();
                    for event_entry in events {
                        event_map.insert(
                            event_entry.label.clone(),
                            serde_json::to_value(&event_entry.event)?,
                        );
                    }
                    descriptor_doc["events"] = Value::Object(event_map);
                }
                header_doc[entry.label.as_str()] = descriptor_doc;
            }
            out.insert(run.label.clone(), header_doc);
        }
        Ok(Value::Object(out))
    }
}
