mod cmd;
mod output;
mod root;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use signboard_core::types::{parse_date, Reason};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "signboard",
    about = "Days-since-incident sign: record incidents, render the sign, push it to an e-paper panel",
    version,
    propagate_version = true
)]
struct Cli {
    /// Sign root (default: auto-detect from signboard.yaml or data.json)
    #[arg(long, global = true, env = "SIGNBOARD_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the web UI and the background refresh loop
    Serve {
        /// Port to listen on (default: server.port from signboard.yaml)
        #[arg(long, short = 'p')]
        port: Option<u16>,

        /// Do not start the background refresh loop
        #[arg(long)]
        no_refresh: bool,
    },

    /// Show the current counters
    Show,

    /// Record a new incident and re-render the sign
    Update {
        /// Incident identifier shown on the sign
        #[arg(long)]
        incident: String,

        /// Incident date (YYYY-MM-DD)
        #[arg(long, value_parser = parse_date)]
        date: NaiveDate,

        /// Incident reason: change, deploy or missed
        #[arg(long, default_value = "change")]
        reason: Reason,
    },

    /// Re-render the sign image from the stored record
    Render,

    /// Convert the sign to a panel frame and send it to the display
    Push {
        /// Image to send instead of the rendered sign
        #[arg(long)]
        image: Option<PathBuf>,
    },

    /// Write the packed 800x480 panel frame for an image to a file
    Pack {
        /// Source image (PNG or JPEG)
        input: PathBuf,

        /// Destination for the 192,000-byte frame
        output: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = match &cli.command {
        Commands::Serve { .. } | Commands::Push { .. } => tracing::Level::INFO,
        _ => tracing::Level::WARN,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let root_path = cli.root.as_deref();
    let root = root::resolve_root(root_path);

    let result = match cli.command {
        Commands::Serve { port, no_refresh } => cmd::serve::run(&root, port, no_refresh),
        Commands::Show => cmd::show::run(&root, cli.json),
        Commands::Update {
            incident,
            date,
            reason,
        } => cmd::update::run(&root, incident, date, reason, cli.json),
        Commands::Render => cmd::render::run(&root, cli.json),
        Commands::Push { image } => cmd::push::run(&root, image, cli.json),
        Commands::Pack { input, output } => cmd::pack::run(&input, &output, cli.json),
    };

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
