//! Result decoders: raw documents to typed records with result labels.
//!
//! Find results address each run by identity and its children by position,
//! so the label grammar is part of the catalog's public behavior: headers
//! get `header_<id>`, descriptors `event_descriptor_<i>`, and events
//! `event_<i>`, with positions counted per parent in insertion order.

use runcat_model::{Event, EventDescriptor, RunHeader};
use runcat_store::DocJson;

use crate::errors::CatalogError;

/// Decodes header documents, labeling each by identity.
pub fn decode_headers(docs: Vec<DocJson>) -> Result<Vec<(String, RunHeader)>, CatalogError> {
    docs.into_iter()
        .map(|doc| {
            let header: RunHeader = serde_json::from_value(doc)?;
            let label = format!("header_{}", header.id);
            Ok((label, header))
        })
        .collect()
}

/// Decodes descriptor documents, labeling each by position.
pub fn decode_descriptors(
    docs: Vec<DocJson>,
) -> Result<Vec<(String, EventDescriptor)>, CatalogError> {
    docs.into_iter()
        .enumerate()
        .map(|(i, doc)| {
            let descriptor: EventDescriptor = serde_json::from_value(doc)?;
            Ok((format!("event_descriptor_{}", i), descriptor))
        })
        .collect()
}

/// Decodes event documents, labeling each by position.
pub fn decode_events(docs: Vec<DocJson>) -> Result<Vec<(String, Event)>, CatalogError> {
    docs.into_iter()
        .enumerate()
        .map(|(i, doc)| {
            let event: Event = serde_json::from_value(doc)?;
            Ok((format!("event_{}", i), event))
        })
        .collect()
}
