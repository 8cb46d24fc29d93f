use std::io::{self, BufRead};
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use wt_cli::commands::{attendance, cache, categorize, import, report, status};
use wt_cli::{CacheAction, Cli, Commands, Config, ImportKind};
use wt_core::{Classify, NoClassifier, Resolver, ResolverPolicy, WorkSchedule};

/// Load config and open database, ensuring the parent directory exists.
fn open_database(config_path: Option<&Path>) -> Result<(wt_db::Database, Config)> {
    let config = Config::load_from(config_path).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent).context("failed to create database directory")?;
    }

    let db = wt_db::Database::open(&config.database_path).context("failed to open database")?;
    Ok((db, config))
}

/// Build a resolver, remote-backed when a classifier URL is configured.
fn build_resolver(config: &Config) -> Result<Resolver<Box<dyn Classify>>> {
    let classifier: Box<dyn Classify> = match &config.classifier_url {
        Some(url) => Box::new(
            wt_classify::HttpClassifier::with_timeout(
                url.clone(),
                Duration::from_secs(config.classifier_timeout_secs),
            )
            .context("invalid classifier configuration")?,
        ),
        None => Box::new(NoClassifier),
    };
    Ok(Resolver::new(classifier, ResolverPolicy::default()))
}

fn schedule_from(config: &Config) -> Result<WorkSchedule> {
    let schedule = WorkSchedule {
        full_day_hours: config.full_day_hours,
        ..WorkSchedule::default()
    };
    schedule.validate().context("invalid work schedule")?;
    Ok(schedule)
}

fn reader_for(path: Option<&Path>) -> Result<Box<dyn BufRead>> {
    match path {
        Some(path) => {
            let file = std::fs::File::open(path)
                .with_context(|| format!("failed to open {}", path.display()))?;
            Ok(Box::new(io::BufReader::new(file)))
        }
        None => Ok(Box::new(io::BufReader::new(io::stdin()))),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Use try_init to avoid panic if tracing is already initialized (e.g., in tests)
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();

    let mut stdout = io::stdout();

    match &cli.command {
        Some(Commands::Import { kind }) => {
            let (mut db, _config) = open_database(cli.config.as_deref())?;
            match kind {
                ImportKind::Usage { file, username } => {
                    let reader = reader_for(file.as_deref())?;
                    let inserted = import::run_usage(&mut db, reader, username.as_deref())?;
                    println!("Imported {inserted} usage events.");
                }
                ImportKind::Attendance { file } => {
                    let reader = reader_for(file.as_deref())?;
                    let inserted = import::run_attendance(&mut db, reader)?;
                    println!("Imported {inserted} attendance records.");
                }
            }
        }
        Some(Commands::Report(args)) => {
            let (mut db, config) = open_database(cli.config.as_deref())?;
            let resolver = build_resolver(&config)?;
            resolver.cache().preload(db.load_cache()?);

            let opts = report::ReportOptions {
                user: args.user.as_deref(),
                days: args.days,
                top_n: args.top.unwrap_or(config.top_n),
                json: args.json,
                now: chrono::Local::now().naive_local(),
            };
            report::run(&mut stdout, &db, &resolver, &opts)?;

            db.save_cache(&resolver.cache().entries())
                .context("failed to persist category cache")?;
        }
        Some(Commands::Attendance(args)) => {
            let (db, config) = open_database(cli.config.as_deref())?;
            let schedule = schedule_from(&config)?;
            let opts = attendance::AttendanceOptions {
                user: args.user.as_deref(),
                days: args.days,
                by_date: args.by_date,
                json: args.json,
                now: chrono::Local::now().naive_local(),
            };
            attendance::run(&mut stdout, &db, &schedule, &opts)?;
        }
        Some(Commands::Categorize { name, url }) => {
            let (mut db, config) = open_database(cli.config.as_deref())?;
            let resolver = build_resolver(&config)?;
            resolver.cache().preload(db.load_cache()?);

            categorize::run(&mut stdout, &resolver, name, url.as_deref())?;

            db.save_cache(&resolver.cache().entries())
                .context("failed to persist category cache")?;
        }
        Some(Commands::Cache { action }) => {
            let (mut db, _config) = open_database(cli.config.as_deref())?;
            match action {
                CacheAction::Show => cache::show(&mut stdout, &db)?,
                CacheAction::Clear => cache::clear(&mut stdout, &mut db)?,
            }
        }
        Some(Commands::Status) => {
            let (db, config) = open_database(cli.config.as_deref())?;
            status::run(&mut stdout, &db, &config.database_path)?;
        }
        None => {
            // No subcommand, show help
            use clap::CommandFactory;
            Cli::command().print_help()?;
            println!();
        }
    }

    Ok(())
}
