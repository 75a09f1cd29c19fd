//! Find command implementation.

use runcat_catalog::{Catalog, Criteria, Selector, TimeCriterion};
use runcat_model::{RecordId, ScanId};

use crate::input;

#[allow(clippy::too_many_arguments)]
pub fn run(
    catalog: String,
    header_id: Option<String>,
    scan_id: Option<String>,
    owner: Option<String>,
    beamline_id: Option<String>,
    start_time: Option<String>,
    end_time: Option<String>,
    data: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    // The sentinel strings live here at the boundary; the catalog API only
    // sees selectors.
    let selector = match scan_id.as_deref() {
        Some("current") => Selector::Current,
        Some("last") => Selector::Previous,
        other => {
            let mut criteria = Criteria::default();
            if let Some(text) = other {
                let scan: i64 = text
                    .parse()
                    .map_err(|_| format!("invalid --scan-id '{}'", text))?;
                criteria.scan_id = Some(ScanId::from(scan));
            }
            if let Some(id) = header_id {
                criteria.header_id = Some(RecordId::parse(id)?);
            }
            criteria.owner = owner;
            criteria.beamline_id = beamline_id;
            if let Some(text) = start_time {
                criteria.start_time = Some(TimeCriterion::from_doc(&input::parse_time_expr(&text))?);
            }
            if let Some(text) = end_time {
                criteria.end_time = Some(TimeCriterion::from_doc(&input::parse_time_expr(&text))?);
            }
            Selector::Where(criteria)
        }
    };

    let catalog = Catalog::open(catalog)?;
    let result = catalog.find(&selector, data)?;

    println!("{}", serde_json::to_string_pretty(&result.to_doc()?)?);
    Ok(())
}
