//! Runcat CLI - command-line surface over a run metadata catalog file.

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod input;
mod output;

use commands::{add_descriptor, add_event, find, finish, list, save_config, save_header};

#[derive(Parser)]
#[command(name = "runcat")]
#[command(about = "Run metadata catalog over a journal-backed store")]
struct Cli {
    /// Path to the catalog file
    #[arg(long, global = true, default_value = "runcat.rcat")]
    catalog: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Record a new run header
    SaveHeader {
        /// Scan number for the run
        #[arg(long)]
        scan_id: i64,
        /// Owning account (default: current user)
        #[arg(long)]
        owner: Option<String>,
        /// Instrument identifier
        #[arg(long)]
        beamline_id: Option<String>,
        /// Collection start, RFC 3339 (default: now)
        #[arg(long)]
        start_time: Option<String>,
        /// Caller-defined attributes as a JSON object
        #[arg(long)]
        custom: Option<String>,
    },
    /// Declare an event descriptor under a run
    AddDescriptor {
        /// Scan number of the run
        #[arg(long)]
        scan_id: i64,
        /// Numeric event type code
        #[arg(long)]
        event_type_id: i64,
        /// Name events use to address the descriptor
        #[arg(long)]
        name: Option<String>,
        /// Free-form tag
        #[arg(long)]
        tag: Option<String>,
        /// Event shape description as a JSON object
        #[arg(long)]
        shape: Option<String>,
    },
    /// Record an event against a named descriptor
    AddEvent {
        /// Scan number of the run
        #[arg(long)]
        scan_id: i64,
        /// Descriptor name to record against
        #[arg(long)]
        descriptor: String,
        /// Sequence number within the run
        #[arg(long)]
        seq_no: Option<i64>,
        /// Free-form description
        #[arg(long)]
        description: Option<String>,
        /// Recording account (default: current user)
        #[arg(long)]
        owner: Option<String>,
        /// Event payload as a JSON object
        #[arg(long)]
        data: Option<String>,
    },
    /// Pin a beamline configuration snapshot to a header
    SaveConfig {
        /// Snapshot id (caller-assigned)
        #[arg(long)]
        config_id: String,
        /// Header record id
        #[arg(long)]
        header_id: String,
        /// Configuration parameters as a JSON object
        #[arg(long)]
        params: Option<String>,
    },
    /// Close out a run: set its end time and mark it complete
    Finish {
        /// Header record id
        #[arg(long)]
        header_id: String,
        /// Collection end, RFC 3339 (default: now)
        #[arg(long)]
        end_time: Option<String>,
    },
    /// List run headers
    List {
        /// Output as JSON lines
        #[arg(long)]
        json: bool,
    },
    /// Find runs and print them as nested JSON
    Find {
        /// Match one header by record id
        #[arg(long)]
        header_id: Option<String>,
        /// Scan number, or 'current'/'last'
        #[arg(long)]
        scan_id: Option<String>,
        /// Owning account, exact or wildcard pattern
        #[arg(long)]
        owner: Option<String>,
        /// Instrument identifier
        #[arg(long)]
        beamline_id: Option<String>,
        /// Start-time constraint: T, T1..T2, or T1,T2,...
        #[arg(long)]
        start_time: Option<String>,
        /// End-time constraint: T, T1..T2, or T1,T2,...
        #[arg(long)]
        end_time: Option<String>,
        /// Attach event payloads
        #[arg(long)]
        data: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("RUNCAT_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::SaveHeader {
            scan_id,
            owner,
            beamline_id,
            start_time,
            custom,
        } => save_header::run(cli.catalog, scan_id, owner, beamline_id, start_time, custom),
        Commands::AddDescriptor {
            scan_id,
            event_type_id,
            name,
            tag,
            shape,
        } => add_descriptor::run(cli.catalog, scan_id, event_type_id, name, tag, shape),
        Commands::AddEvent {
            scan_id,
            descriptor,
            seq_no,
            description,
            owner,
            data,
        } => add_event::run(
            cli.catalog,
            scan_id,
            descriptor,
            seq_no,
            description,
            owner,
            data,
        ),
        Commands::SaveConfig {
            config_id,
            header_id,
            params,
        } => save_config::run(cli.catalog, config_id, header_id, params),
        Commands::Finish {
            header_id,
            end_time,
        } => finish::run(cli.catalog, header_id, end_time),
        Commands::List { json } => list::run(cli.catalog, json),
        Commands::Find {
            header_id,
            scan_id,
            owner,
            beamline_id,
            start_time,
            end_time,
            data,
        } => find::run(
            cli.catalog,
            header_id,
            scan_id,
            owner,
            beamline_id,
            start_time,
            end_time,
            data,
        ),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
