//! # stockroom
//!
//! Command-line front end for the facility consumables tracker.
//!
//! ## Commands
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  stockroom items    [--category All|Housekeeping|Pantry]                │
//! │                     [--search TEXT] [--sort none|name-asc|name-desc]    │
//! │  stockroom issue    ITEM QTY --location FLOOR [--person NAME]           │
//! │  stockroom receive  ITEM QTY [--location Vendor] [--unit U]             │
//! │                     [--category C] [--person NAME]                      │
//! │  stockroom adjust   ITEM --to QTY [--person NAME]                       │
//! │  stockroom history  [--type All|Issue|Receive|Adjustment]               │
//! │                     [--start YYYY-MM-DD] [--end YYYY-MM-DD]             │
//! │  stockroom export   inventory | report [--format csv|txt]              │
//! │  stockroom summary  (alias: dashboard)                                  │
//! │  stockroom config   show | set-endpoint URL                             │
//! │  stockroom hash-password PASSWORD                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Logging goes to stderr and is controlled by `RUST_LOG`.

mod commands;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use stockroom_core::query::SortOrder;
use stockroom_core::{Category, FloorLocation, Quantity};
use tracing_subscriber::EnvFilter;

/// Log filter used when `RUST_LOG` is unset.
const DEFAULT_LOG_FILTER: &str = "info,stockroom=debug,sqlx=warn";

#[derive(Debug, Parser)]
#[command(name = "stockroom")]
#[command(about = "Track facility consumables: stock levels, movements and reports")]
#[command(version)]
pub struct Cli {
    /// Config file (default: platform config directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Sign-in user, needed for stock changes when users are configured
    #[arg(short, long, global = true)]
    pub user: Option<String>,

    /// Password for --user (falls back to STOCKROOM_PASSWORD)
    #[arg(long, global = true)]
    pub password: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    #[command(flatten)]
    Session(SessionCommand),

    /// Show or change configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Print an argon2 hash for a [[users]] entry
    HashPassword { password: String },
}

/// Commands that read or change the inventory through a session.
#[derive(Debug, Subcommand)]
pub enum SessionCommand {
    /// List items, filtered and sorted
    Items(ItemArgs),

    /// Record stock going out to a floor
    Issue {
        /// Item name, exactly as listed
        item: String,
        /// Amount, up to two decimals
        quantity: Quantity,
        /// Destination floor
        #[arg(short, long)]
        location: FloorLocation,
        /// Who took the stock (default: signed-in user)
        #[arg(short, long)]
        person: Option<String>,
        #[arg(long)]
        notes: Option<String>,
    },

    /// Record stock coming in; unknown items are added to the catalog
    Receive {
        item: String,
        quantity: Quantity,
        /// Source
        #[arg(short, long, default_value = "Vendor")]
        location: FloorLocation,
        /// Unit for a new item
        #[arg(long)]
        unit: Option<String>,
        /// Category for a new item
        #[arg(long)]
        category: Option<Category>,
        #[arg(short, long)]
        person: Option<String>,
        #[arg(long)]
        notes: Option<String>,
    },

    /// Set an item's level after a physical count
    Adjust {
        item: String,
        /// New level
        #[arg(long)]
        to: Quantity,
        #[arg(short, long)]
        person: Option<String>,
        #[arg(long)]
        notes: Option<String>,
    },

    /// Show transaction history, newest first
    History(HistoryArgs),

    /// Write an export file
    Export {
        #[command(subcommand)]
        target: ExportTarget,
    },

    /// Headline counts, low-stock items and recent issues
    #[command(alias = "dashboard")]
    Summary {
        /// Number of recent issues to show
        #[arg(long)]
        recent: Option<usize>,
    },
}

#[derive(Debug, Clone, Args)]
pub struct ItemArgs {
    /// All, Housekeeping or Pantry
    #[arg(long, default_value = "All")]
    pub category: String,

    /// Matches name or id, case-insensitive
    #[arg(long)]
    pub search: Option<String>,

    #[arg(long, default_value = "none")]
    pub sort: SortOrder,
}

#[derive(Debug, Clone, Args)]
pub struct HistoryArgs {
    /// All, Issue, Receive or Adjustment
    #[arg(long = "type", default_value = "All")]
    pub kind: String,

    /// First day included (YYYY-MM-DD)
    #[arg(long)]
    pub start: Option<String>,

    /// Last day included (YYYY-MM-DD)
    #[arg(long)]
    pub end: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum ExportTarget {
    /// Full inventory as CSV
    Inventory {
        #[command(flatten)]
        filter: ItemArgs,
        /// Output file (default: export directory + dated name)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Transaction report
    Report {
        #[command(flatten)]
        filter: HistoryArgs,
        #[arg(long, value_enum, default_value_t = ReportFormat::Csv)]
        format: ReportFormat,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// Comma-separated, every column
    Csv,
    /// Aligned printable text, six columns
    Txt,
}

#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Print the effective configuration
    Show,
    /// Save where the inventory store lives
    SetEndpoint {
        /// sqlite://<path> or memory://
        endpoint: String,
    },
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let output = commands::run(cli).await?;
    if !output.is_empty() {
        print!("{}", output);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parses_issue() {
        let cli = Cli::try_parse_from([
            "stockroom",
            "issue",
            "Tissue Roll",
            "4",
            "--location",
            "second floor",
            "--person",
            "Asha",
        ])
        .unwrap();

        match cli.command {
            Command::Session(SessionCommand::Issue {
                item,
                quantity,
                location,
                person,
                ..
            }) => {
                assert_eq!(item, "Tissue Roll");
                assert_eq!(quantity, Quantity::from_units(4));
                assert_eq!(location, FloorLocation::SecondFloor);
                assert_eq!(person.as_deref(), Some("Asha"));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_rejects_bad_quantity() {
        assert!(Cli::try_parse_from(["stockroom", "issue", "Soap", "1.255", "-l", "Basement"]).is_err());
    }

    #[test]
    fn test_config_keeps_global_config_path() {
        let cli = Cli::try_parse_from([
            "stockroom",
            "config",
            "show",
            "--config",
            "/tmp/stockroom.toml",
        ])
        .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/stockroom.toml")));
        assert!(matches!(
            cli.command,
            Command::Config {
                action: ConfigAction::Show
            }
        ));
    }

    #[test]
    fn test_dashboard_alias() {
        let cli = Cli::try_parse_from(["stockroom", "dashboard"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Session(SessionCommand::Summary { recent: None })
        ));
    }
}
