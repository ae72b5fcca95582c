//! `asistencia` command-line front end.
//!
//! # Responsibility
//! - Drive the same screen views the app uses from a terminal.
//! - Print notices and, with `--json`, view snapshots.

use asistencia_core::{init_from_config, AppConfig};
use clap::{Parser, Subcommand};
use log::{error, info};
use std::path::PathBuf;
use std::process::ExitCode;

mod attendance;
mod context;
mod grades;
mod session;
mod subjects;

use context::{CliError, Context};

#[derive(Parser, Debug)]
#[command(name = "asistencia")]
#[command(author, version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Database file (overrides ASISTENCIA_DB_PATH)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Log level: trace|debug|info|warn|error
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand, Debug, Clone)]
enum Command {
    /// Sign in with an email
    Login { email: String },
    /// Sign out
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Operate on subjects
    #[command(subcommand)]
    Subjects(subjects::Command),
    /// Operate on attendance
    #[command(subcommand)]
    Attendance(attendance::Command),
    /// Operate on grades
    #[command(subcommand)]
    Grades(grades::Command),
}

impl Command {
    /// Stable command path used in log events.
    fn name(&self) -> &'static str {
        match self {
            Self::Login { .. } => "login",
            Self::Logout => "logout",
            Self::Whoami => "whoami",
            Self::Subjects(cmd) => cmd.name(),
            Self::Attendance(cmd) => cmd.name(),
            Self::Grades(cmd) => cmd.name(),
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(CliError::Reported) => ExitCode::FAILURE,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), CliError> {
    let config = resolve_config(cli)?;
    if let Err(err) = init_from_config(&config) {
        eprintln!("warning: logging disabled: {err}");
    }

    let command = cli.command.name();
    info!("event=cli_command module=cli status=start command={command}");
    let result = dispatch(cli, &config);
    match &result {
        Ok(()) => info!("event=cli_command module=cli status=ok command={command}"),
        Err(CliError::Reported) => {
            info!("event=cli_command module=cli status=reported command={command}")
        }
        Err(err) => {
            error!("event=cli_command module=cli status=error command={command} error={err}")
        }
    }
    result
}

fn dispatch(cli: &Cli, config: &AppConfig) -> Result<(), CliError> {
    let conn = asistencia_core::db::open_db(&config.db_path)?;
    let ctx = Context::try_new(&conn, cli.json)?;

    match &cli.command {
        Command::Login { email } => session::login(&ctx, email),
        Command::Logout => session::logout(&ctx),
        Command::Whoami => session::whoami(&ctx),
        Command::Subjects(cmd) => subjects::handle(&ctx, cmd),
        Command::Attendance(cmd) => attendance::handle(&ctx, cmd),
        Command::Grades(cmd) => grades::handle(&ctx, cmd),
    }
}

fn resolve_config(cli: &Cli) -> Result<AppConfig, CliError> {
    let mut config = AppConfig::from_env()?;
    if let Some(path) = &cli.db {
        config = config.with_db_path(path.clone());
    }
    if let Some(level) = &cli.log_level {
        config = config.with_log_level(level)?;
    }
    Ok(config)
}
