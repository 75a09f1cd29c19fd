//! Save-config command implementation.

use runcat_catalog::Catalog;
use runcat_model::{parse_attrs, AttrMap, RecordId};

pub fn run(
    catalog: String,
    config_id: String,
    header_id: String,
    params: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config_id = RecordId::parse(config_id)?;
    let header_id = RecordId::parse(header_id)?;
    let params = match params {
        Some(text) => parse_attrs(&text).map_err(|e| format!("invalid --params: {}", e))?,
        None => AttrMap::new(),
    };

    let mut catalog = Catalog::open(catalog)?;
    let config = catalog.save_beamline_config(config_id, header_id, params)?;

    println!(
        "Saved beamline config {} for header {}",
        config.id, config.header_id
    );
    Ok(())
}
