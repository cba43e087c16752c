//! CLI definition for the FieldOps command-line interface.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

/// FieldOps - field operations form engine
///
/// Inspect form templates, validate captured values and compute timesheet hours.
#[derive(Parser, Debug)]
#[command(name = "fieldops")]
#[command(version)]
#[command(about = "FieldOps - field operations form engine")]
pub struct Cli {
    /// Enable debug output to stderr
    #[arg(short, long, global = true)]
    pub debug: bool,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Working directory holding fieldops.toml and the template directory
    #[arg(short = 'C', long, global = true, default_value = ".")]
    pub dir: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Inspect form templates
    Templates {
        #[command(subcommand)]
        action: TemplatesAction,
    },
    /// Validate a JSON object of field values against a template
    Validate {
        /// Form type of the template to validate against
        #[arg(long)]
        form: String,
        /// JSON file mapping field names to values; numbers must be quoted strings
        #[arg(long)]
        values: PathBuf,
    },
    /// Compute worked hours for one day
    Hours {
        /// Clock-in time (HH:MM)
        clock_in: String,
        /// Clock-out time (HH:MM)
        clock_out: String,
    },
    /// Show the timesheet week containing a date
    Week {
        /// Date inside the week (YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,
    },
}

#[derive(Subcommand, Debug)]
pub enum TemplatesAction {
    /// List available form templates
    List,
    /// Show the sections and fields of one template
    Show {
        /// Form type to show
        form_type: String,
    },
}
