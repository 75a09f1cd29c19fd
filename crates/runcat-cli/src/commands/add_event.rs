//! Add-event command implementation.

use runcat_catalog::{Catalog, EventSpec};
use runcat_model::{parse_attrs, ScanId};

#[allow(clippy::too_many_arguments)]
pub fn run(
    catalog: String,
    scan_id: i64,
    descriptor: String,
    seq_no: Option<i64>,
    description: Option<String>,
    owner: Option<String>,
    data: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut spec = EventSpec::new();
    spec.seq_no = seq_no;
    spec.description = description;
    spec.owner = owner;
    if let Some(text) = data {
        spec.data = parse_attrs(&text).map_err(|e| format!("invalid --data: {}", e))?;
    }

    let mut catalog = Catalog::open(catalog)?;
    let event = catalog.insert_event(ScanId::from(scan_id), &descriptor, spec)?;

    println!("Recorded event {} against '{}'", event.id, descriptor);
    Ok(())
}
