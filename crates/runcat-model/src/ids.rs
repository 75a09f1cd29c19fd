use std::fmt;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::validation::ValidationError;

/// Grammar for record identifiers: URL- and filename-safe, 1..=64 chars.
const RECORD_ID_PATTERN: &str = "^[A-Za-z0-9_.:-]{1,64}$";

/// Opaque identifier of a stored record (`_id` on the wire).
///
/// Store backends assign generated identifiers on insert; callers may also
/// supply their own (beamline configuration snapshots do) as long as the
/// value satisfies [`RecordId::parse`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    /// Creates a new instance without validation; callers are responsible for conformity.
    pub fn new(value: String) -> Self {
        Self(value)
    }

    /// Parses a validated identifier from a string.
    pub fn parse(value: impl Into<String>) -> Result<Self, ValidationError> {
        let s = value.into();
        if !Regex::new(RECORD_ID_PATTERN)
            .expect("invalid regex")
            .is_match(&s)
        {
            return Err(ValidationError::PatternMismatch {
                field: "RecordId",
                value: s,
            });
        }
        Ok(Self(s))
    }

    /// Borrows the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for RecordId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl AsRef<str> for RecordId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Instrument-local scan number that groups one run.
///
/// Scan ids come from the acquisition side and are not required to be unique
/// across the catalog; resolution helpers pick the first header in store
/// order when duplicates exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScanId(i64);

impl ScanId {
    /// Returns the raw scan number.
    pub fn value(&self) -> i64 {
        self.0
    }
}

impl From<i64> for ScanId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl From<i32> for ScanId {
    fn from(value: i32) -> Self {
        Self(i64::from(value))
    }
}

impl fmt::Display for ScanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
