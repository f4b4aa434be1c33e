//! Top-level CLI definition and dispatch.

use std::io::{self, IsTerminal, Write};
use std::path::PathBuf;

use chrono::Utc;
use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::{Shell as CompletionShell, generate};
use colored::{Colorize, control};
use serde_json::{Value, json};
use thiserror::Error;

use kubeconfig_manager::cli::listing::{collect_rows, empty_message, render_table};
use kubeconfig_manager::cli::{KubeconfigEnv, export_hint};
use kubeconfig_manager::core::config::Config;
use kubeconfig_manager::core::errors::KcmError;
use kubeconfig_manager::core::paths;
use kubeconfig_manager::pointer::ActivePointer;
use kubeconfig_manager::scanner::walker::EntryScanner;
use kubeconfig_manager::tui::{SessionOutcome, run_interactive};

/// KubeConfig Manager: pick the kubeconfig your tools use.
#[derive(Debug, Parser)]
#[command(
    name = "kcm",
    author,
    version,
    about = "KubeConfig Manager - rank downloaded kubeconfigs and activate one",
    long_about = None
)]
pub struct Cli {
    /// Override config file path.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Force JSON output mode.
    #[arg(long, global = true)]
    json: bool,
    /// Disable colored output.
    #[arg(long, global = true)]
    no_color: bool,
    /// Subcommand to execute; defaults to the interactive selector.
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Clone, Subcommand)]
enum Command {
    /// Open the interactive selector (default).
    Run,
    /// Print the ranked kubeconfig list.
    List,
    /// Inspect configuration.
    Config(ConfigArgs),
    /// Generate shell completions.
    Completions(CompletionsArgs),
}

#[derive(Debug, Clone, Args, Default)]
struct ConfigArgs {
    /// Config operation to run.
    #[command(subcommand)]
    command: Option<ConfigCommand>,
}

#[derive(Debug, Clone, Copy, Subcommand)]
enum ConfigCommand {
    /// Print resolved config file path.
    Path,
    /// Print effective configuration.
    Show,
}

#[derive(Debug, Clone, Args)]
struct CompletionsArgs {
    /// Shell to generate completion script for.
    #[arg(value_enum)]
    shell: CompletionShell,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputMode {
    Human,
    Json,
}

/// CLI error type with explicit exit-code mapping.
#[derive(Debug, Error)]
pub enum CliError {
    /// Invalid user input or environment the user must fix.
    #[error("{0}")]
    User(String),
    /// Environment/runtime failure.
    #[error("{0}")]
    Runtime(String),
    /// Internal bug or invariant violation.
    #[error("{0}")]
    Internal(String),
    /// JSON serialization failed.
    #[error("failed to serialize output: {0}")]
    Json(#[from] serde_json::Error),
    /// Output write failed.
    #[error("failed to write output: {0}")]
    Io(#[from] io::Error),
}

impl CliError {
    /// Process exit code contract for the CLI.
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::User(_) => 1,
            Self::Runtime(_) | Self::Io(_) => 2,
            Self::Internal(_) | Self::Json(_) => 3,
        }
    }
}

impl From<KcmError> for CliError {
    fn from(e: KcmError) -> Self {
        match e {
            KcmError::InvalidConfig { .. }
            | KcmError::ConfigParse { .. }
            | KcmError::HomeUnresolved { .. } => Self::User(e.to_string()),
            KcmError::Serialization { .. } => Self::Internal(e.to_string()),
            _ => Self::Runtime(e.to_string()),
        }
    }
}

/// Dispatch CLI commands.
pub fn run(cli: &Cli) -> Result<(), CliError> {
    if cli.no_color {
        control::set_override(false);
    }

    match &cli.command {
        None | Some(Command::Run) => run_selector(cli),
        Some(Command::List) => run_list(cli),
        Some(Command::Config(args)) => run_config(cli, args),
        Some(Command::Completions(args)) => {
            let mut command = Cli::command();
            let binary_name = command.get_name().to_string();
            generate(args.shell, &mut command, binary_name, &mut io::stdout());
            Ok(())
        }
    }
}

fn load_config(cli: &Cli) -> Result<Config, CliError> {
    Ok(Config::ensure(cli.config.as_deref())?)
}

fn run_selector(cli: &Cli) -> Result<(), CliError> {
    let config = load_config(cli)?;

    match KubeconfigEnv::from_env(&config.pointer_path) {
        KubeconfigEnv::Linked => {}
        KubeconfigEnv::Unset => {
            println!("{}", export_hint(&config.pointer_path));
            return Err(CliError::User(
                "KUBECONFIG is not set; add the line above to your shell profile".to_string(),
            ));
        }
        KubeconfigEnv::Elsewhere(current) => {
            eprintln!(
                "{} KUBECONFIG is {}, not {}; activations will not affect your tools",
                "warning:".yellow().bold(),
                current.display(),
                config.pointer_path.display()
            );
        }
    }

    if !io::stdin().is_terminal() || !io::stdout().is_terminal() {
        return Err(CliError::User(
            "interactive mode needs a terminal; use `kcm list` instead".to_string(),
        ));
    }

    let color = !cli.no_color && std::env::var_os("NO_COLOR").is_none();
    match run_interactive(&config, color)? {
        SessionOutcome::Activated { name, path } => match output_mode(cli) {
            OutputMode::Human => {
                println!("{} is now your active kubeconfig.", name.green().bold());
                Ok(())
            }
            OutputMode::Json => write_json_line(&json!({
                "command": "run",
                "activated": name,
                "path": path.to_string_lossy(),
                "pointer": config.pointer_path.to_string_lossy(),
            })),
        },
        SessionOutcome::ActivationFailed { name, message } => Err(CliError::Runtime(format!(
            "failed to activate {name}: {message}"
        ))),
        SessionOutcome::Quit => Ok(()),
    }
}

fn run_list(cli: &Cli) -> Result<(), CliError> {
    let config = load_config(cli)?;
    let scanner = EntryScanner::from_config(&config);
    let pointer = ActivePointer::new(config.pointer_path.clone());
    let now = Utc::now();
    let rows = collect_rows(&scanner, &pointer, now)?;

    match output_mode(cli) {
        OutputMode::Human => {
            if rows.is_empty() {
                let dirs: Vec<_> = config.watch.iter().map(|w| w.dir.as_path()).collect();
                println!("{}", empty_message(&dirs));
            } else {
                print!("{}", render_table(&rows));
            }
            Ok(())
        }
        OutputMode::Json => write_json_line(&json!({
            "command": "list",
            "generated_at": now,
            "pointer": config.pointer_path.to_string_lossy(),
            "entries": serde_json::to_value(&rows)?,
        })),
    }
}

fn run_config(cli: &Cli, args: &ConfigArgs) -> Result<(), CliError> {
    match args.command {
        None | Some(ConfigCommand::Path) => {
            let path = match &cli.config {
                Some(path) => path.clone(),
                None => Config::default_path(&paths::home_dir()?),
            };
            let exists = path.exists();

            match output_mode(cli) {
                OutputMode::Human => {
                    println!("{}", path.display());
                    if !exists {
                        println!("  (file does not exist; defaults will be written on first run)");
                    }
                    Ok(())
                }
                OutputMode::Json => write_json_line(&json!({
                    "command": "config path",
                    "path": path.to_string_lossy(),
                    "exists": exists,
                })),
            }
        }
        Some(ConfigCommand::Show) => {
            let config = load_config(cli)?;
            let hash = config.stable_hash()?;

            match output_mode(cli) {
                OutputMode::Human => {
                    println!("# source: {}", config.config_file.display());
                    println!("# hash: {hash}");
                    print!("{}", config.to_toml_string()?);
                    Ok(())
                }
                OutputMode::Json => write_json_line(&json!({
                    "command": "config show",
                    "source": config.config_file.to_string_lossy(),
                    "hash": hash,
                    "config": serde_json::to_value(&config)?,
                })),
            }
        }
    }
}

fn write_json_line(payload: &Value) -> Result<(), CliError> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer(&mut stdout, payload)?;
    writeln!(stdout)?;
    Ok(())
}

fn output_mode(cli: &Cli) -> OutputMode {
    let env_mode = std::env::var("KCM_OUTPUT_FORMAT").ok();
    resolve_output_mode(cli.json, env_mode.as_deref())
}

fn resolve_output_mode(json_flag: bool, env_mode: Option<&str>) -> OutputMode {
    if json_flag {
        return OutputMode::Json;
    }
    match env_mode
        .map(str::trim)
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("json") => OutputMode::Json,
        _ => OutputMode::Human,
    }
}
