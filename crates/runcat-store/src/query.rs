//! Query conditions, sorting, and matching.
//!
//! Backends share one matching semantics via [`Query::apply`]: conditions
//! are ANDed per field, then results are sorted and limited. A document
//! missing a conditioned field never matches, and values of mismatched
//! types compare as unordered.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use regex::RegexBuilder;
use serde_json::Value;

use crate::doc::DocJson;
use crate::errors::StoreError;

/// One condition applied to a document field.
#[derive(Debug, Clone)]
pub enum Condition {
    /// Field equals the value exactly.
    Eq(Value),
    /// Field equals any of the listed values.
    In(Vec<Value>),
    /// Field lies in a half-open interval: `gte <= field < lt`.
    Range {
        /// Inclusive lower bound, if any.
        gte: Option<Value>,
        /// Exclusive upper bound, if any.
        lt: Option<Value>,
    },
    /// Field is a string matching a case-insensitive regular expression.
    ///
    /// Matching is unanchored: the pattern may match anywhere inside the
    /// field value.
    Matches(String),
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    /// Smallest value first.
    Asc,
    /// Largest value first.
    Desc,
}

/// A composable query over one collection.
///
/// Conditions are ANDed across fields; adding a second condition for the
/// same field replaces the first. Sorting is stable, so documents that
/// compare equal keep their insertion order.
#[derive(Debug, Clone, Default)]
pub struct Query {
    conditions: BTreeMap<String, Condition>,
    sort: Option<(String, SortOrder)>,
    limit: Option<usize>,
}

impl Query {
    /// Creates an empty query matching every document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a condition on a field.
    pub fn field(mut self, name: impl Into<String>, condition: Condition) -> Self {
        self.conditions.insert(name.into(), condition);
        self
    }

    /// Sorts results by a field. Documents without the field sort after
    /// documents that have it.
    pub fn sort(mut self, field: impl Into<String>, order: SortOrder) -> Self {
        self.sort = Some((field.into(), order));
        self
    }

    /// Caps the number of results, applied after sorting.
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Filters, sorts, and limits a document sequence.
    ///
    /// This is the whole query semantics; backends feed their collection
    /// contents through it in natural (insertion) order.
    pub fn apply(&self, docs: impl IntoIterator<Item = DocJson>) -> Result<Vec<DocJson>, StoreError> {
        let prepared = self.prepare()?;
        let mut out: Vec<DocJson> = docs
            .into_iter()
            .filter(|doc| prepared.matches(doc))
            .collect();

        if let Some((field, order)) = &self.sort {
            out.sort_by(|a, b| {
                let ord = match (a.get(field), b.get(field)) {
                    (Some(x), Some(y)) => compare_values(x, y).unwrap_or(Ordering::Equal),
                    (Some(_), None) => Ordering::Less,
                    (None, Some(_)) => Ordering::Greater,
                    (None, None) => Ordering::Equal,
                };
                match order {
                    SortOrder::Asc => ord,
                    SortOrder::Desc => ord.reverse(),
                }
            });
        }

        if let Some(limit) = self.limit {
            out.truncate(limit);
        }

        Ok(out)
    }

    fn prepare(&self) -> Result<PreparedQuery<'_>, StoreError> {
        let mut conditions = Vec::with_capacity(self.conditions.len());
        for (field, condition) in &self.conditions {
            let prepared = match condition {
                Condition::Eq(value) => PreparedCondition::Eq(value),
                Condition::In(values) => PreparedCondition::In(values),
                Condition::Range { gte, lt } => PreparedCondition::Range {
                    gte: gte.as_ref(),
                    lt: lt.as_ref(),
                },
                Condition::Matches(pattern) => {
                    let regex = RegexBuilder::new(pattern)
                        .case_insensitive(true)
                        .build()
                        .map_err(|e| StoreError::InvalidPattern {
                            pattern: pattern.clone(),
                            reason: e.to_string(),
                        })?;
                    PreparedCondition::Matches(regex)
                }
            };
            conditions.push((field.as_str(), prepared));
        }
        Ok(PreparedQuery { conditions })
    }
}

/// A query with patterns compiled, ready to test documents.
struct PreparedQuery<'a> {
    conditions: Vec<(&'a str, PreparedCondition<'a>)>,
}

enum PreparedCondition<'a> {
    Eq(&'a Value),
    In(&'a [Value]),
    Range {
        gte: Option<&'a Value>,
        lt: Option<&'a Value>,
    },
    Matches(regex::Regex),
}

impl PreparedQuery<'_> {
    fn matches(&self, doc: &DocJson) -> bool {
        self.conditions.iter().all(|(field, condition)| {
            let value = match doc.get(field) {
                Some(value) => value,
                None => return false,
            };
            condition.matches(value)
        })
    }
}

impl PreparedCondition<'_> {
    fn matches(&self, value: &Value) -> bool {
        match self {
            PreparedCondition::Eq(expected) => value == *expected,
            PreparedCondition::In(values) => values.iter().any(|v| v == value),
            PreparedCondition::Range { gte, lt } => {
                if let Some(bound) = gte {
                    match compare_values(value, bound) {
                        Some(Ordering::Greater) | Some(Ordering::Equal) => {}
                        _ => return false,
                    }
                }
                if let Some(bound) = lt {
                    match compare_values(value, bound) {
                        Some(Ordering::Less) => {}
                        _ => return false,
                    }
                }
                true
            }
            PreparedCondition::Matches(regex) => match value.as_str() {
                Some(s) => regex.is_match(s),
                None => false,
            },
        }
    }
}

/// Orders two JSON scalars of the same kind; mixed kinds are unordered.
fn compare_values(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => {
            if let (Some(xi), Some(yi)) = (x.as_i64(), y.as_i64()) {
                Some(xi.cmp(&yi))
            } else {
                x.as_f64()?.partial_cmp(&y.as_f64()?)
            }
        }
        (Value::String(x), Value::String(y)) => Some(x.as_str().cmp(y.as_str())),
        _ => None,
    }
}
