//! Command-line argument definitions.

use std::path::PathBuf;

use bt_core::Category;
use clap::{Parser, Subcommand};

use crate::commands::log::LogArgs;
use crate::commands::show::ShowArgs;

/// Baby tracker.
///
/// Logs feedings, diapers, pumping and doctor visits, and shows how long
/// ago each happened.
#[derive(Debug, Parser)]
#[command(name = "bt", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Log an event, filling unset fields from the pre-filled form.
    Log(LogArgs),

    /// Show logged events of one category.
    Show(ShowArgs),

    /// Show the pre-filled form for a category.
    Form {
        /// Event category (drink, diaper, pump, doctor).
        category: Category,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Show the baby's age and the time since the last event per category.
    Status,

    /// Print the baby's age as days, hours and minutes.
    Age {
        /// Instant to compute the age at (default: now).
        #[arg(long)]
        at: Option<String>,
    },

    /// Chart measurements against reference curves.
    #[command(subcommand)]
    Chart(ChartKind),

    /// List a numeric field against age in hours.
    Series {
        /// Event category (drink, diaper, pump, doctor).
        category: Category,

        /// Numeric field to plot.
        field: String,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Delete a logged event by its ID.
    Delete {
        /// Event category (drink, diaper, pump, doctor).
        category: Category,

        /// Row ID as shown by `bt show`.
        id: i64,
    },
}

/// Available charts.
#[derive(Debug, Subcommand)]
pub enum ChartKind {
    /// Bilirubin against the hour-specific nomogram.
    Bilirubin {
        /// Output chart data as JSON.
        #[arg(long)]
        json: bool,
    },
}
