use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use log::info;
use sshdrive_core::utils::logging::init_logging;
use sshdrive_core::{
    AuthType, ConnectionDraft, ConnectionView, DriveLetter, LocalService, Settings,
    SyncOrchestrator,
};
use tokio::io::{self, AsyncBufReadExt, BufReader};

type Orchestrator = SyncOrchestrator<LocalService>;

/// Command-line arguments.
#[derive(Parser, Debug)]
#[command(name = "sshdrive", version, subcommand_required = true)]
pub struct Args {
    /// Settings file (default: the per-user config directory)
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Directory holding connections.json
    #[arg(long)]
    pub data_dir: Option<PathBuf>,
    /// Log level (error, warn, info, debug, trace); RUST_LOG overrides it
    #[arg(long)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum Auth {
    Password,
    Key,
}

impl From<Auth> for AuthType {
    fn from(auth: Auth) -> Self {
        match auth {
            Auth::Password => AuthType::Password,
            Auth::Key => AuthType::Key,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List saved connections and their mounts
    List,
    /// Save a new connection profile
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        host: String,
        /// SSH server port (default 22)
        #[arg(long, default_value_t = 22)]
        port: u16,
        #[arg(long)]
        username: String,
        #[arg(long, value_enum, default_value_t = Auth::Password)]
        auth: Auth,
        /// Private key file, required with `--auth key`
        #[arg(long, default_value = "")]
        key_path: String,
        #[arg(long, default_value = "/")]
        remote_path: String,
        /// Preferred drive letter, e.g. `S` or `S:`
        #[arg(long, default_value = "")]
        drive_letter: String,
        #[arg(long)]
        password: Option<String>,
    },
    /// Delete a connection profile
    Remove { id: String },
    /// Show free drive letters
    Letters,
    /// Check that a saved connection can log in
    Test {
        id: String,
        #[arg(long)]
        password: Option<String>,
    },
    /// Interactive session; mounts live until you quit
    Shell,
}

pub async fn run_cli(args: Args) -> Result<()> {
    let mut settings = match &args.config {
        Some(path) => Settings::load_from(path),
        None => Settings::load(),
    }
    .context("failed to read settings")?;
    if let Some(dir) = args.data_dir {
        settings.data_dir = Some(dir);
    }
    if let Some(level) = args.log_level {
        settings.log_level = level;
    }
    init_logging(settings.log_filter());

    let service = LocalService::from_settings(&settings).context("failed to open profile store")?;
    info!("Profiles stored in {:?}", service.store().path());
    let orchestrator = SyncOrchestrator::new(service);
    orchestrator.refresh().await?;

    match args.command {
        Command::List => print_views(&orchestrator.views().await),
        Command::Add {
            name,
            host,
            port,
            username,
            auth,
            key_path,
            remote_path,
            drive_letter,
            password,
        } => {
            let profile = ConnectionDraft {
                id: None,
                name,
                host,
                port,
                username,
                auth_type: auth.into(),
                key_path,
                remote_path,
                drive_letter,
            }
            .into_profile()?;
            let saved = orchestrator.save_connection(profile, password).await?;
            println!("saved {} ({})", saved.name, saved.id);
        }
        Command::Remove { id } => {
            orchestrator.delete_connection(&id).await?;
            println!("removed {id}");
        }
        Command::Letters => print_letters(&orchestrator.available_letters().await),
        Command::Test { id, password } => test_saved(&orchestrator, &id, password.as_deref()).await?,
        Command::Shell => run_shell(&orchestrator).await?,
    }
    Ok(())
}

async fn test_saved(orchestrator: &Orchestrator, id: &str, password: Option<&str>) -> Result<()> {
    let Some(profile) = orchestrator.connection(id).await else {
        bail!("no connection with id '{id}'");
    };
    if orchestrator.test_connection(&profile, password).await? {
        println!("{}: ok", profile.endpoint());
    } else {
        println!("{}: not authenticated", profile.endpoint());
    }
    Ok(())
}

fn print_views(views: &[ConnectionView]) {
    if views.is_empty() {
        println!("no saved connections");
        return;
    }
    for view in views {
        let mount = match (view.mounted_drive_letter, view.is_connected) {
            (Some(letter), true) => format!("mounted on {letter}:"),
            (Some(letter), false) => format!("{letter}: (not connected)"),
            (None, _) => "-".to_string(),
        };
        println!(
            "{}  {:<20} {}{}  {}",
            view.id(),
            view.profile.name,
            view.profile.endpoint(),
            view.profile.remote_path,
            mount
        );
    }
}

fn print_letters(letters: &[DriveLetter]) {
    let letters: Vec<String> = letters.iter().map(|l| format!("{l}:")).collect();
    println!("{}", letters.join(" "));
}

const SHELL_HELP: &str = "\
commands:
  list                     saved connections and mounts
  refresh                  reload everything from the service
  letters                  free drive letters
  mount <id> [letter]      mount a connection (default: preferred or first free letter)
  unmount <letter>         unmount a drive
  status                   prerequisites, loading flag and last error
  help                     this text
  quit                     leave the shell";

/// Reads one command per line from stdin until `quit` or end of input.
///
/// Failures are printed and the loop goes on; the last one also stays in the
/// orchestrator's error slot for `status`.
async fn run_shell(orchestrator: &Orchestrator) -> Result<()> {
    println!("{SHELL_HELP}");
    let mut lines = BufReader::new(io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let words: Vec<&str> = line.split_whitespace().collect();
        let result = match words.as_slice() {
            [] => Ok(()),
            ["quit" | "exit"] => break,
            ["help"] => {
                println!("{SHELL_HELP}");
                Ok(())
            }
            ["list"] => {
                print_views(&orchestrator.views().await);
                Ok(())
            }
            ["refresh"] => orchestrator.refresh().await.map_err(Into::into),
            ["letters"] => {
                print_letters(&orchestrator.available_letters().await);
                Ok(())
            }
            ["mount", id] => mount(orchestrator, id, None).await,
            ["mount", id, letter] => mount(orchestrator, id, Some(*letter)).await,
            ["unmount", letter] => unmount(orchestrator, letter).await,
            ["status"] => {
                print_status(orchestrator).await;
                Ok(())
            }
            _ => {
                println!("unknown command, try `help`");
                Ok(())
            }
        };
        if let Err(e) = result {
            println!("error: {e:#}");
        }
    }
    info!("Leaving shell");
    Ok(())
}

async fn mount(orchestrator: &Orchestrator, id: &str, letter: Option<&str>) -> Result<()> {
    let letter = match letter {
        Some(letter) => DriveLetter::parse(letter)?,
        None => pick_letter(orchestrator, id).await?,
    };
    let status = orchestrator.mount_drive(id, letter).await?;
    println!("{} mounted on {}:", status.connection_id, status.drive_letter);
    Ok(())
}

/// The profile's preferred letter when it is free, else the lowest free one.
async fn pick_letter(orchestrator: &Orchestrator, id: &str) -> Result<DriveLetter> {
    let available = orchestrator.available_letters().await;
    let preferred = orchestrator
        .connection(id)
        .await
        .and_then(|p| p.preferred_drive_letter)
        .filter(|letter| available.contains(letter));
    preferred
        .or_else(|| available.first().copied())
        .context("no free drive letter")
}

async fn unmount(orchestrator: &Orchestrator, letter: &str) -> Result<()> {
    let letter = DriveLetter::parse(letter)?;
    orchestrator.unmount_drive(letter).await?;
    println!("{letter}: unmounted");
    Ok(())
}

async fn print_status(orchestrator: &Orchestrator) {
    match orchestrator.prerequisites().await {
        Some(p) => println!(
            "winfsp: {}  sshfs: {}",
            if p.winfsp_installed { "installed" } else { "missing" },
            if p.sshfs_installed { "installed" } else { "missing" }
        ),
        None => println!("prerequisites: unknown"),
    }
    println!("loading: {}", orchestrator.loading().is_loading());
    match orchestrator.errors().current() {
        Some(message) => println!("last error: {message}"),
        None => println!("last error: none"),
    }
}
