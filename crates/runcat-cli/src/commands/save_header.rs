//! Save-header command implementation.

use runcat_catalog::{Catalog, HeaderSpec};
use runcat_model::parse_attrs;

use crate::input;

pub fn run(
    catalog: String,
    scan_id: i64,
    owner: Option<String>,
    beamline_id: Option<String>,
    start_time: Option<String>,
    custom: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut spec = HeaderSpec::new(scan_id);
    spec.owner = owner;
    spec.beamline_id = beamline_id;
    if let Some(text) = start_time {
        spec.start_time = Some(input::parse_time(&text)?);
    }
    if let Some(text) = custom {
        spec.custom = parse_attrs(&text).map_err(|e| format!("invalid --custom: {}", e))?;
    }

    let mut catalog = Catalog::open(catalog)?;
    let header = catalog.save_header(spec)?;

    println!("Saved run header {} for scan {}", header.id, header.scan_id);
    Ok(())
}
