//! Output formatting utilities.

use runcat_model::RunHeader;

/// Formats a run header as a simple table row.
pub fn format_table_row(header: &RunHeader) -> String {
    format!(
        "{:<8} {:<26} {:<16} {:<20} {}",
        header.scan_id.to_string(),
        truncate(header.id.as_str(), 26),
        truncate(&header.owner, 16),
        header.start_time.format("%Y-%m-%d %H:%M:%S").to_string(),
        header.status
    )
}

/// Prints table header.
pub fn print_table_header() {
    println!(
        "{:<8} {:<26} {:<16} {:<20} {}",
        "SCAN", "HEADER_ID", "OWNER", "STARTED", "STATUS"
    );
    println!("{}", "-".repeat(84));
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else {
        format!("{}...", &s[..max_len.saturating_sub(3)])
    }
}
