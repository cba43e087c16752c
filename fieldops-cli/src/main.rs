//! FieldOps CLI - field operations form engine.
//!
//! Commands:
//! - `fieldops templates list`: List available form templates
//! - `fieldops templates show <form-type>`: Show one template's fields
//! - `fieldops validate --form <type> --values <file.json>`: Validate captured values
//! - `fieldops hours <in> <out>`: Compute worked hours for one day
//! - `fieldops week [--date YYYY-MM-DD]`: Show the timesheet week containing a date
//!
//! Exit codes:
//! - 0: Success
//! - 1: Error
//! - 2: Values failed validation

use clap::Parser;
use tracing_subscriber::EnvFilter;

use fieldops::commands::{self, Workspace};
use fieldops::{Cli, Commands, TemplatesAction};

/// Exit code returned when submitted values fail validation.
const VALIDATION_FAILED_EXIT_CODE: i32 = 2;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let filter = if cli.debug {
        EnvFilter::new("fieldops=debug,fieldops_fields=debug,fieldops_submission=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(std::io::stderr)
        .init();

    let exit_code = match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            1
        }
    };
    std::process::exit(exit_code);
}

async fn run(cli: Cli) -> anyhow::Result<i32> {
    let json = cli.json;
    let output = match cli.command {
        Commands::Templates { action } => {
            let ws = Workspace::open(&cli.dir).await?;
            match action {
                TemplatesAction::List => commands::templates_list(&ws, json)?,
                TemplatesAction::Show { form_type } => {
                    commands::templates_show(&ws, &form_type, json)?
                }
            }
        }
        Commands::Validate { form, values } => {
            let ws = Workspace::open(&cli.dir).await?;
            let report = commands::validate(&ws, &form, &values, json)?;
            println!("{}", report.output);
            return Ok(if report.is_valid() {
                0
            } else {
                VALIDATION_FAILED_EXIT_CODE
            });
        }
        Commands::Hours {
            clock_in,
            clock_out,
        } => commands::hours(&clock_in, &clock_out, json)?,
        Commands::Week { date } => {
            let date = date.unwrap_or_else(|| chrono::Local::now().date_naive());
            commands::week(date, json)?
        }
    };
    println!("{output}");
    Ok(0)
}
