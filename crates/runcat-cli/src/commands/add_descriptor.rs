//! Add-descriptor command implementation.

use runcat_catalog::{Catalog, DescriptorSpec};
use runcat_model::{parse_attrs, ScanId};

pub fn run(
    catalog: String,
    scan_id: i64,
    event_type_id: i64,
    name: Option<String>,
    tag: Option<String>,
    shape: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut spec = DescriptorSpec::new(event_type_id);
    spec.event_type_name = name;
    spec.tag = tag;
    if let Some(text) = shape {
        spec.type_descriptor = parse_attrs(&text).map_err(|e| format!("invalid --shape: {}", e))?;
    }

    let mut catalog = Catalog::open(catalog)?;
    let descriptor = catalog.insert_event_descriptor(ScanId::from(scan_id), spec)?;

    println!(
        "Added event descriptor {} under header {}",
        descriptor.id, descriptor.header_id
    );
    Ok(())
}
