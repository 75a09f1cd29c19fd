//! One module per subcommand.

pub mod add_descriptor;
pub mod add_event;
pub mod find;
pub mod finish;
pub mod list;
pub mod save_config;
pub mod save_header;
