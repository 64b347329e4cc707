mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use cycle_overlay_core::layout::SiteLayout;
use cycle_overlay_core::pipeline::DEFAULT_SOURCE_TAG;

#[derive(Parser)]
#[command(name = "cycle-overlay")]
#[command(about = "Generate cycle overlay calendars and status data for the static site")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Regenerate every calendar and status document
    Generate {
        /// Site root holding config.json, data/ and docs/
        #[arg(long, default_value = ".")]
        root: String,

        /// Tag recorded in status output (defaults to $STATUS_SOURCE, then "schedule")
        #[arg(long)]
        source: Option<String>,

        /// Override today's date (YYYY-MM-DD) for reproducible builds
        #[arg(long)]
        today: Option<String>,
    },
    /// Show the current status for one user
    Status {
        /// User token from the roster, or "legacy"
        token: String,

        /// Site root holding config.json, data/ and docs/
        #[arg(long, default_value = ".")]
        root: String,

        /// Print the raw status JSON instead of a summary
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Generate {
            root,
            source,
            today,
        } => {
            let layout = SiteLayout::new(root);
            let source_tag = resolve_source_tag(source);
            commands::generate::run(&layout, &source_tag, today.as_deref())
        }
        Commands::Status { token, root, json } => {
            let layout = SiteLayout::new(root);
            commands::status::run(&layout, &token, json)
        }
    }
}

/// The flag wins over the environment; scheduled CI runs leave both
/// unset and get the default tag.
fn resolve_source_tag(flag: Option<String>) -> String {
    flag.or_else(|| std::env::var("STATUS_SOURCE").ok())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| DEFAULT_SOURCE_TAG.to_string())
}
