//! versave CLI.

use clap::{ColorChoice, Parser};
use std::io::{self, IsTerminal};
use tracing::level_filters::LevelFilter;
use versave_cli::commands::{
    EXIT_OK, exit_code, run_backups, run_delete_backup, run_init, run_list, run_next, run_open,
    run_rotate, run_save,
};
use versave_cli::logging::{LogConfig, LogFormat, init_logging};
use versave_cli::settings::load_config;
use versave_core::VersaveError;

mod cli;
mod summary;

use crate::cli::{Cli, Command, LogFormatArg, LogLevelArg};
use crate::summary::{print_backups, print_json, print_rotation, print_save, print_versions};

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }

    let code = match run(cli) {
        Ok(()) => EXIT_OK,
        Err(error) => {
            report_error(&error);
            exit_code(&error)
        }
    };
    std::process::exit(code);
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(cli.config.as_deref())?;
    match cli.command {
        Command::Init(args) => {
            let report = run_init(&args.candidate, args.from.as_deref(), &config)?;
            print_save(&report);
        }
        Command::Save(args) => print_save(&run_save(&args.file, &config)?),
        Command::Next(args) => print_save(&run_next(&args.file, &config)?),
        Command::List(args) => {
            let set = run_list(&args.file, &config)?;
            if args.json {
                print_json(&set)?;
            } else {
                print_versions(&set);
            }
        }
        Command::Open(args) => {
            let opened = run_open(&args.current, &args.target, args.modified, &config)?;
            println!("Opened: {}", opened.display());
        }
        Command::Rotate(args) => print_rotation(&run_rotate(&args.file, &config)?),
        Command::Backups(args) => {
            let backups = run_backups(&args.file, &config)?;
            if args.json {
                print_json(&backups)?;
            } else {
                print_backups(&backups);
            }
        }
        Command::DeleteBackup(args) => {
            let deleted = run_delete_backup(&args.file, args.slot, &config)?;
            println!("Deleted: {}", deleted.display());
        }
    }
    Ok(())
}

fn report_error(error: &anyhow::Error) {
    eprintln!("error: {error:#}");
    if let Some(err) = error.downcast_ref::<VersaveError>() {
        eprintln!("  {}", err.user_message());
        if let Some(hint) = err.suggestion() {
            eprintln!("hint: {hint}");
        }
    }
}

/// Build logging configuration from CLI flags with consistent precedence.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let mut config = LogConfig {
        level_filter: cli.verbosity.tracing_level_filter(),
        ..LogConfig::default()
    };
    config.use_env_filter = !(cli.verbosity.is_present() || cli.log_level.is_some());
    if let Some(level) = cli.log_level {
        config.level_filter = match level {
            LogLevelArg::Error => LevelFilter::ERROR,
            LogLevelArg::Warn => LevelFilter::WARN,
            LogLevelArg::Info => LevelFilter::INFO,
            LogLevelArg::Debug => LevelFilter::DEBUG,
            LogLevelArg::Trace => LevelFilter::TRACE,
        };
    }
    config.format = match cli.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    config.log_file = cli.log_file.clone();
    config.with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    config
}
