use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use bt_cli::commands::{age, chart, delete, form, log, series, show, status};
use bt_cli::{ChartKind, Cli, Commands, Config};

/// Load config and open database, ensuring the parent directory exists.
fn open_database(config_path: Option<&Path>) -> Result<(bt_db::Database, Config)> {
    let config = Config::load_from(config_path).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent).context("failed to create database directory")?;
    }

    let db = bt_db::Database::open(&config.database_path).context("failed to open database")?;
    Ok((db, config))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // try_init: tests may have installed a subscriber already
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    let now = Utc::now();
    let mut stdout = std::io::stdout().lock();

    match &cli.command {
        Some(Commands::Log(args)) => {
            let (mut db, _config) = open_database(cli.config.as_deref())?;
            log::run(&mut stdout, &mut db, args, now)?;
        }
        Some(Commands::Show(args)) => {
            let (db, config) = open_database(cli.config.as_deref())?;
            show::run(&mut stdout, &db, &config, args, now)?;
        }
        Some(Commands::Form { category, json }) => {
            let (db, _config) = open_database(cli.config.as_deref())?;
            form::run(&mut stdout, &db, *category, *json)?;
        }
        Some(Commands::Status) => {
            let (db, config) = open_database(cli.config.as_deref())?;
            status::run(&mut stdout, &db, &config, now)?;
        }
        Some(Commands::Age { at }) => {
            // Age only needs the birth instant, not the database
            let config = Config::load_from(cli.config.as_deref())
                .context("failed to load configuration")?;
            age::run(&mut stdout, &config, at.as_deref(), now)?;
        }
        Some(Commands::Chart(ChartKind::Bilirubin { json })) => {
            let (db, config) = open_database(cli.config.as_deref())?;
            chart::run(&mut stdout, &db, &config, *json)?;
        }
        Some(Commands::Series {
            category,
            field,
            json,
        }) => {
            let (db, config) = open_database(cli.config.as_deref())?;
            series::run(&mut stdout, &db, &config, *category, field, *json)?;
        }
        Some(Commands::Delete { category, id }) => {
            let (mut db, _config) = open_database(cli.config.as_deref())?;
            delete::run(&mut stdout, &mut db, *category, *id)?;
        }
        None => {
            use clap::CommandFactory;
            Cli::command().print_help()?;
            writeln!(stdout)?;
        }
    }

    Ok(())
}
