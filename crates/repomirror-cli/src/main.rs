//! repomirror - keeps a local directory an exact mirror of an FTP repository
//!
//! A run lists both sides, stages every new or changed file in an incoming
//! directory, checks the staged content against the server and only then
//! swaps it into the live directory, retiring the files it replaces.

mod display;
mod exit;
mod logging;
mod progress;
mod prompt;

use clap::{Parser, ValueEnum};
use console::style;
use exit::ExitStatus;
use progress::BarProgress;
use prompt::ConsolePrompt;
use repomirror_config::{ConfigLoader, SyncConfig};
use repomirror_engine::ControllerBuilder;
use repomirror_network::{FtpRepository, FtpSettings, SuppaConnector};
use repomirror_sync::RunContext;
use repomirror_types::StopListMode;
use std::path::PathBuf;
use std::process::ExitCode;
use std::rc::Rc;
use tracing::{error, info};

/// repomirror - FTP repository mirroring tool
#[derive(Parser, Debug)]
#[command(
    name = "repomirror",
    version = env!("CARGO_PKG_VERSION"),
    about = "Mirror a flat FTP repository into a local directory",
    long_about = "repomirror keeps a local directory an exact mirror of a flat remote FTP directory.\n\
                  Downloads are staged and verified before they replace anything, superseded\n\
                  files are retired instead of deleted, and partial downloads are resumed."
)]
struct Cli {
    /// Configuration file (YAML or TOML)
    config: PathBuf,

    /// Skip the run when a successful run already happened today
    #[arg(long)]
    once_per_day: bool,

    /// Whether the configured stop-list holds components back
    #[arg(long, value_enum, default_value = "no-list")]
    mode: ModeArg,

    /// Verbose mode - debug output on the console
    #[arg(short, long)]
    verbose: bool,

    /// Print the effective configuration and exit
    #[arg(long)]
    show_config: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ModeArg {
    /// Apply the stop-list
    StopList,
    /// Ignore the stop-list
    NoList,
}

impl From<ModeArg> for StopListMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::StopList => StopListMode::UseStopList,
            ModeArg::NoList => StopListMode::NoList,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    run(&cli).into()
}

fn run(cli: &Cli) -> ExitStatus {
    let config = match ConfigLoader::load_from_file(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "{} {}: {}",
                style("Configuration error:").red().bold(),
                cli.config.display(),
                e
            );
            return ExitStatus::Config;
        }
    };

    if cli.show_config {
        return show_config(&config);
    }

    let _log_guard = match logging::init(&config, cli.verbose) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("{} {:#}", style("Logging disabled:").yellow().bold(), e);
            None
        }
    };

    info!(
        "repomirror {} mirroring ftp://{}:{}{} into {}",
        env!("CARGO_PKG_VERSION"),
        config.ftp_host,
        config.ftp_port,
        config.ftp_root,
        config.local_dir.display()
    );

    let mut remote = FtpRepository::new(SuppaConnector, FtpSettings::from_config(&config));
    let ctx = RunContext::new(config)
        .with_once_per_day(cli.once_per_day)
        .with_stop_list_mode(cli.mode.into());
    let controller = ControllerBuilder::new(Rc::new(ConsolePrompt::new())).build();
    let mut progress = BarProgress::new(!console::user_attended_stderr());

    match controller.run(&ctx, &mut remote, &mut progress) {
        Ok(outcome) => {
            display::print_outcome(&outcome);
            let status = ExitStatus::from_outcome(&outcome);
            info!("Run finished with exit code {}", status.code());
            status
        }
        Err(e) => {
            error!("Run failed: {}", e);
            display::print_error(&e);
            ExitStatus::from_error(&e)
        }
    }
}

fn show_config(config: &SyncConfig) -> ExitStatus {
    let mut masked = config.clone();
    masked.ftp_password = "********".to_string();
    match ConfigLoader::to_yaml(&masked) {
        Ok(yaml) => {
            print!("{}", yaml);
            ExitStatus::Synchronized
        }
        Err(e) => {
            eprintln!("{} {}", style("Configuration error:").red().bold(), e);
            ExitStatus::Config
        }
    }
}
