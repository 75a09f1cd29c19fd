//! Finish command implementation.
//!
//! Closing out a run is two independent writes: the end time advances
//! first, then the status flips to complete. A crash in between leaves an
//! in-progress run with a final end time, which a rerun repairs.

use chrono::Utc;
use runcat_catalog::Catalog;
use runcat_model::{RecordId, RunStatus};

use crate::input;

pub fn run(
    catalog: String,
    header_id: String,
    end_time: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let header_id = RecordId::parse(header_id)?;
    let end_time = match end_time {
        Some(text) => input::parse_time(&text)?,
        None => Utc::now(),
    };

    let mut catalog = Catalog::open(catalog)?;
    catalog.update_header_end_time(&header_id, end_time)?;
    catalog.update_header_status(&header_id, RunStatus::Complete)?;

    println!("Run {} marked complete", header_id);
    Ok(())
}
