//! Vantage CLI - command-line client for the Vantage vector search platform
//!
//! CLI entry point: parses arguments, resolves settings and runs one command.

use std::process;

use clap::Parser;
use clap::error::ErrorKind;
use eyre::{Context, Result, eyre};
use tracing::{debug, info, warn};

use vantage_cli::cli::{Cli, Command};
use vantage_cli::commands::{self, CommandContext, configure};
use vantage_cli::config::{Config, Settings, default_config_path};
use vantage_cli::{CommandExecutor, ExitStatus, HttpClient, Printable, Printer, ValidationError};

const NO_COMMAND: &str = "No command specified. Run vantage --help for help.";
const MISSING_CREDENTIALS: &str = "Either Vantage API key, JWT token or client ID and secret need to be specified.";
const MISSING_ACCOUNT: &str = "Account ID needs to be specified with --account-id, VANTAGE_ACCOUNT_ID or the config file.";

fn setup_logging(cli_log_level: Option<&str>, debug_mode: bool) -> Result<()> {
    // Level priority: --log-level > --debug (DEBUG) > WARN
    let level = match cli_log_level {
        Some(s) => match s.to_uppercase().as_str() {
            "TRACE" => tracing::Level::TRACE,
            "DEBUG" => tracing::Level::DEBUG,
            "INFO" => tracing::Level::INFO,
            "WARN" | "WARNING" => tracing::Level::WARN,
            "ERROR" => tracing::Level::ERROR,
            _ => {
                eprintln!("Warning: Unknown log-level '{}', defaulting to WARN", s);
                tracing::Level::WARN
            }
        },
        None if debug_mode => tracing::Level::DEBUG,
        None => tracing::Level::WARN,
    };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .try_init()
        .map_err(|e| eyre!(e))?;

    info!("Logging initialized (level: {:?})", level);
    Ok(())
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let status = match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitStatus::Success,
                _ => ExitStatus::Usage,
            };
            let _ = err.print();
            process::exit(status.code());
        }
    };

    if let Err(e) = setup_logging(cli.log_level.as_deref(), cli.debug) {
        eprintln!("Warning: Failed to setup logging: {}", e);
    }

    let status = match run(cli) {
        Ok(status) => status,
        Err(report) => {
            eprintln!("Error: {:?}", report);
            ExitStatus::Usage
        }
    };
    debug!(?status, "main: exiting");
    process::exit(status.code());
}

fn run(mut cli: Cli) -> Result<ExitStatus> {
    let Some(command) = cli.command.take() else {
        debug!("run: no command");
        eprintln!("{}", NO_COMMAND);
        return Ok(ExitStatus::Usage);
    };
    debug!(?command, "run: called");

    if matches!(command, Command::Configure) {
        return cmd_configure(&cli);
    }

    let config = Config::load(cli.config_file.as_ref()).context("Failed to load configuration")?;
    let settings = Settings::resolve(&cli, &config)?;

    let executor = CommandExecutor::new(settings.debug);
    let printer = Printer::new(settings.output);
    let ctx = CommandContext::new(&executor, &printer, &config);

    if let Some(result) = commands::dispatch_local(&command, &ctx) {
        debug!("run: local command");
        return Ok(finish(&printer, result));
    }

    let Some(credentials) = settings.credentials() else {
        warn!("run: no usable credentials");
        eprintln!("{}", MISSING_CREDENTIALS);
        return Ok(ExitStatus::MissingCredentials);
    };
    let Some(account_id) = settings.account_id.as_deref() else {
        warn!("run: no account id");
        eprintln!("{}", MISSING_ACCOUNT);
        return Ok(ExitStatus::Usage);
    };

    let client = HttpClient::new(&settings.api_host, &settings.auth_host, account_id, credentials)
        .context("Failed to create HTTP client")?;

    Ok(finish(&printer, commands::dispatch(command, &ctx, &client)))
}

fn cmd_configure(cli: &Cli) -> Result<ExitStatus> {
    debug!("cmd_configure: called");
    let path = cli
        .config_file
        .clone()
        .or_else(default_config_path)
        .ok_or_else(|| eyre!("Cannot determine config directory"))?;

    let existing = if path.exists() {
        Config::load(Some(&path)).context("Failed to load configuration")?
    } else {
        Config::default()
    };

    configure::configure(&path, existing)?;
    Ok(ExitStatus::Success)
}

fn finish(printer: &Printer, result: Result<Printable, ValidationError>) -> ExitStatus {
    match result {
        Ok(printable) => {
            printer.emit(&printable);
            ExitStatus::Success
        }
        Err(err) => {
            debug!(%err, "finish: validation failed");
            printer.emit(&Printable::error(err.to_string()));
            ExitStatus::Validation
        }
    }
}
