//! List command implementation.

use runcat_catalog::Catalog;

use crate::output;

pub fn run(catalog: String, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let catalog = Catalog::open(catalog)?;
    let headers = catalog.list_headers()?;

    if !json {
        output::print_table_header();
    }

    for header in &headers {
        if json {
            println!("{}", serde_json::to_string(header)?);
        } else {
            println!("{}", output::format_table_row(header));
        }
    }

    Ok(())
}
