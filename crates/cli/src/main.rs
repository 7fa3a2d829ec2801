use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use ssevolution_corpus::CompletenessCheck;
use ssevolution_db::{load_connection_params, BootstrapOutcome, Database, DbError};
use ssevolution_kernel::settings::{LogFormat, TelemetrySettings};
use ssevolution_kernel::{InitCtx, ModuleRegistry, Settings};

#[derive(Debug, Parser)]
#[command(name = "sse", version, about = "Prepare the ECCO-TCP corpus and its database")]
struct Cli {
    /// Log output format
    #[arg(long, value_enum, global = true, default_value_t = LogFormatArg::Pretty)]
    log_format: LogFormatArg,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Extract every archive of SOURCE into DEST unless DEST is already complete
    Unzip(CorpusArgs),
    /// Report whether DEST already holds every archive entry of SOURCE
    Check(CorpusArgs),
    /// Connect to MySQL and create the database if it does not exist
    Db(DbArgs),
    /// Run every module from the layered settings
    Run,
}

#[derive(Debug, Args)]
struct CorpusArgs {
    /// Directory holding the .zip archives
    #[arg(long)]
    source: PathBuf,
    /// Directory the archives are extracted into
    #[arg(long)]
    dest: PathBuf,
    #[arg(long, value_enum, default_value_t = CheckArg::Names)]
    check: CheckArg,
}

#[derive(Debug, Args)]
struct DbArgs {
    /// INI file with the connection parameters
    #[arg(long, default_value = "config.ini")]
    config: PathBuf,
    #[arg(long, default_value = "mysql")]
    section: String,
    #[arg(long, default_value = "ecco_tcp")]
    database: String,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CheckArg {
    Names,
    Sizes,
}

impl From<CheckArg> for CompletenessCheck {
    fn from(arg: CheckArg) -> Self {
        match arg {
            CheckArg::Names => CompletenessCheck::Names,
            CheckArg::Sizes => CompletenessCheck::Sizes,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogFormatArg {
    Pretty,
    Json,
}

impl From<LogFormatArg> for LogFormat {
    fn from(arg: LogFormatArg) -> Self {
        match arg {
            LogFormatArg::Pretty => LogFormat::Pretty,
            LogFormatArg::Json => LogFormat::Json,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    ssevolution_telemetry::init(&TelemetrySettings {
        log_format: cli.log_format.into(),
    });

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::debug!(error = ?err, "command failed");
            eprintln!("error: {err:#}");
            exit_code(&err)
        }
    }
}

/// Status 1 for every failure; bootstrap errors report their own code.
fn exit_code(err: &anyhow::Error) -> ExitCode {
    match err.downcast_ref::<DbError>() {
        Some(db_err) => ExitCode::from(db_err.exit_code()),
        None => ExitCode::FAILURE,
    }
}

fn run(command: Command) -> anyhow::Result<()> {
    match command {
        Command::Unzip(args) => {
            let report = ssevolution_corpus::ensure_materialized_with(
                &args.source,
                &args.dest,
                args.check.into(),
            )?;
            if report.extracted {
                println!(
                    "extracted {} entries from {} archives",
                    report.entries, report.archives
                );
            } else {
                println!("already materialized");
            }
            Ok(())
        }
        Command::Check(args) => {
            let done = ssevolution_corpus::is_materialized_with(
                &args.source,
                &args.dest,
                args.check.into(),
            )?;
            println!("{}", if done { "materialized" } else { "missing" });
            Ok(())
        }
        Command::Db(args) => runtime()?.block_on(bootstrap_database(args)),
        Command::Run => runtime()?.block_on(run_modules()),
    }
}

fn runtime() -> anyhow::Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .with_context(|| "failed to start async runtime")
}

async fn bootstrap_database(args: DbArgs) -> anyhow::Result<()> {
    let params = load_connection_params(&args.config, &args.section)?;
    let database = Database::init(&params, &args.database).await?;

    match database.outcome() {
        BootstrapOutcome::Selected => println!("database {} selected", database.name()),
        BootstrapOutcome::Created => println!("database {} created", database.name()),
    }

    database.shutdown().await?;
    Ok(())
}

async fn run_modules() -> anyhow::Result<()> {
    let settings = Settings::load().with_context(|| "failed to load ssevolution settings")?;

    let mut registry = ModuleRegistry::new();
    ssevolution::register_all(&mut registry);
    registry
        .run_once(&InitCtx {
            settings: &settings,
        })
        .await
}
