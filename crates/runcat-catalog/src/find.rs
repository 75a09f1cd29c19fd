//! The find subsystem: selectors, criteria, and result assembly.
//!
//! A find runs in two stages. First the selector picks header documents:
//! sentinel selectors sort by `end_time` and index into the recency
//! window, while criteria compile into one store query. Then each matched
//! header is reconstructed into a [`RunEntry`] by pulling its descriptors
//! and, when payloads were requested, the events under each descriptor.

use chrono::{DateTime, Utc};
use runcat_model::{RecordId, RunHeader, ScanId};
use runcat_store::{Condition, DocJson, DocumentStore, Query, SortOrder, ID_FIELD};
use serde_json::{json, Value};

use crate::catalog::Catalog;
use crate::decode;
use crate::errors::CatalogError;
use crate::tree::{DescriptorEntry, EventEntry, FindResult, RunEntry};

/// Characters that switch an owner criterion from exact match to pattern
/// match.
const OWNER_WILDCARD_CHARS: [char; 5] = ['*', '.', '?', '/', '^'];

/// How a find picks runs.
#[derive(Debug, Clone)]
pub enum Selector {
    /// The most recent run by `end_time`.
    Current,
    /// The run before the most recent by `end_time`.
    Previous,
    /// Runs matching a set of criteria, in store order.
    Where(Criteria),
}

/// Field criteria for [`Selector::Where`]; empty criteria match every run.
#[derive(Debug, Clone, Default)]
pub struct Criteria {
    /// Match one header by record id.
    pub header_id: Option<RecordId>,
    /// Match the scan number exactly.
    pub scan_id: Option<ScanId>,
    /// Match the owning account. A value containing any of `* . ? / ^` is
    /// treated as a case-insensitive pattern instead of an exact string.
    pub owner: Option<String>,
    /// Match the instrument exactly.
    pub beamline_id: Option<String>,
    /// Constrain when collection started.
    pub start_time: Option<TimeCriterion>,
    /// Constrain when collection ended.
    pub end_time: Option<TimeCriterion>,
}

impl Criteria {
    fn to_query(&self, now: DateTime<Utc>) -> Query {
        let mut query = Query::new();
        if let Some(id) = &self.header_id {
            query = query.field(ID_FIELD, Condition::Eq(json!(id)));
        }
        if let Some(scan_id) = self.scan_id {
            query = query.field("scan_id", Condition::Eq(json!(scan_id)));
        }
        if let Some(owner) = &self.owner {
            let condition = if owner.contains(&OWNER_WILDCARD_CHARS[..]) {
                Condition::Matches(owner.clone())
            } else {
                Condition::Eq(json!(owner))
            };
            query = query.field("owner", condition);
        }
        if let Some(beamline_id) = &self.beamline_id {
            query = query.field("beamline_id", Condition::Eq(json!(beamline_id)));
        }
        if let Some(criterion) = &self.start_time {
            query = query.field("start_time", criterion.to_condition(now));
        }
        if let Some(criterion) = &self.end_time {
            query = query.field("end_time", criterion.to_condition(now));
        }
        query
    }
}

/// Time constraint shapes accepted by [`Criteria`].
#[derive(Debug, Clone)]
pub enum TimeCriterion {
    /// Any of the listed instants, to the microsecond.
    At(Vec<DateTime<Utc>>),
    /// The half-open interval `[start, end)`.
    Between {
        /// Inclusive start of the interval.
        start: DateTime<Utc>,
        /// Exclusive end of the interval.
        end: DateTime<Utc>,
    },
    /// The half-open interval `[instant, now)`, with `now` taken when the
    /// find runs.
    Since(DateTime<Utc>),
}

impl TimeCriterion {
    /// Builds a criterion from loose JSON, as accepted at CLI and config
    /// boundaries.
    ///
    /// A list means [`TimeCriterion::At`], an object with `start` and
    /// `end` means [`TimeCriterion::Between`], and a scalar means
    /// [`TimeCriterion::Since`]. Timestamps may be RFC 3339 strings or
    /// integer epoch microseconds; anything else fails with
    /// [`CatalogError::ExpectedTimestamp`].
    pub fn from_doc(value: &Value) -> Result<Self, CatalogError> {
        match value {
            Value::Array(items) => {
                let mut instants = Vec::with_capacity(items.len());
                for item in items {
                    instants.push(parse_instant(item)?);
                }
                Ok(TimeCriterion::At(instants))
            }
            Value::Object(map) => {
                let start = map.get("start").ok_or_else(|| expected_timestamp(value))?;
                let end = map.get("end").ok_or_else(|| expected_timestamp(value))?;
                Ok(TimeCriterion::Between {
                    start: parse_instant(start)?,
                    end: parse_instant(end)?,
                })
            }
            scalar => Ok(TimeCriterion::Since(parse_instant(scalar)?)),
        }
    }

    fn to_condition(&self, now: DateTime<Utc>) -> Condition {
        match self {
            TimeCriterion::At(instants) => Condition::In(
                instants
                    .iter()
                    .map(|t| json!(t.timestamp_micros()))
                    .collect(),
            ),
            TimeCriterion::Between { start, end } => Condition::Range {
                gte: Some(json!(start.timestamp_micros())),
                lt: Some(json!(end.timestamp_micros())),
            },
            TimeCriterion::Since(start) => Condition::Range {
                gte: Some(json!(start.timestamp_micros())),
                lt: Some(json!(now.timestamp_micros())),
            },
        }
    }
}

fn parse_instant(value: &Value) -> Result<DateTime<Utc>, CatalogError> {
    match value {
        Value::String(text) => DateTime::parse_from_rfc3339(text)
            .map(|t| t.with_timezone(&Utc))
            .map_err(|_| expected_timestamp(value)),
        Value::Number(n) => n
            .as_i64()
            .and_then(DateTime::from_timestamp_micros)
            .ok_or_else(|| expected_timestamp(value)),
        _ => Err(expected_timestamp(value)),
    }
}

fn expected_timestamp(value: &Value) -> CatalogError {
    CatalogError::ExpectedTimestamp(value.to_string())
}

impl<S: DocumentStore> Catalog<S> {
    /// Finds runs and reconstructs each as header → descriptors → events.
    ///
    /// With `data` unset, descriptor entries come back without event
    /// payloads. Sentinel selectors resolve against `end_time`:
    /// [`Selector::Current`] is the most recent run and
    /// [`Selector::Previous`] the one before it, each failing with
    /// [`CatalogError::NotEnoughRuns`] when the catalog is too small.
    pub fn find(&self, selector: &Selector, data: bool) -> Result<FindResult, CatalogError> {
        let headers = match selector {
            Selector::Current => self.recent_headers(1, 1)?,
            Selector::Previous => self.recent_headers(2, 5)?,
            Selector::Where(criteria) => self.headers_raw(&criteria.to_query(Utc::now()))?,
        };

        let mut runs = Vec::with_capacity(headers.len());
        for (label, header) in decode::decode_headers(headers)? {
            runs.push(self.attach_children(label, header, data)?);
        }
        Ok(FindResult { runs })
    }

    /// Headers sorted most-recent-first within a bounded window, keeping
    /// only the one at position `required - 1`.
    fn recent_headers(&self, required: usize, window: usize) -> Result<Vec<DocJson>, CatalogError> {
        let query = Query::new().sort("end_time", SortOrder::Desc).limit(window);
        let docs = self.headers_raw(&query)?;
        let found = docs.len();
        if found < required {
            return Err(CatalogError::NotEnoughRuns { required, found });
        }
        Ok(docs.into_iter().skip(required - 1).take(1).collect())
    }

    fn attach_children(
        &self,
        label: String,
        header: RunHeader,
        data: bool,
    ) -> Result<RunEntry, CatalogError> {
        let descriptor_docs = self.descriptors_for(&header.id)?;
        let mut descriptors = Vec::with_capacity(descriptor_docs.len());
        for (descriptor_label, descriptor) in decode::decode_descriptors(descriptor_docs)? {
            let events = if data {
                let event_docs = self.events_for(&descriptor.id)?;
                let entries = decode::decode_events(event_docs)?
                    .into_iter()
                    .map(|(event_label, event)| EventEntry {
                        label: event_label,
                        event,
                    })
                    .collect();
                Some(entries)
            } else {
                None
            };
            descriptors.push(DescriptorEntry {
                label: descriptor_label,
                descriptor,
                events,
            });
        }
        Ok(RunEntry {
            label,
            header,
            descriptors,
        })
    }
}
