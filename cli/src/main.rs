use std::io::Write;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use epicurean_cli::simulator::Simulator;
use epicurean_cli::{commands, readline};
use epicurean_core::{AccessLevel, ModState};
use tracing_subscriber::filter::EnvFilter;

/// Log to `log_file`, else `EPICUREAN_LOG_PATH`, else stderr. An unopenable
/// file falls back to stderr.
fn init_logging(log_file: Option<&Path>) {
    let filter = EnvFilter::builder()
        .with_default_directive(tracing::Level::INFO.into())
        .from_env_lossy();

    let path = log_file
        .map(Path::to_path_buf)
        .or_else(|| std::env::var_os("EPICUREAN_LOG_PATH").map(PathBuf::from));
    let file = path.as_deref().and_then(|path| {
        std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| eprintln!("Cannot open log file {}: {e}", path.display()))
            .ok()
    });

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);
    match file {
        Some(file) => builder.with_ansi(false).with_writer(file).init(),
        None => builder.with_writer(std::io::stderr).init(),
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum Access {
    Player,
    Advocate,
    Sentinel,
    Envoy,
    Developer,
    Admin,
}

impl From<Access> for AccessLevel {
    fn from(access: Access) -> Self {
        match access {
            Access::Player => AccessLevel::Player,
            Access::Advocate => AccessLevel::Advocate,
            Access::Sentinel => AccessLevel::Sentinel,
            Access::Envoy => AccessLevel::Envoy,
            Access::Developer => AccessLevel::Developer,
            Access::Admin => AccessLevel::Admin,
        }
    }
}

#[derive(Parser)]
#[command(version, about = "Epicurean's Ecstasy simulator")]
struct Args {
    /// Directory holding Settings.json
    #[arg(long)]
    mod_dir: Option<PathBuf>,

    #[arg(long, default_value = "Epicure")]
    player: String,

    #[arg(long, value_enum, default_value = "developer")]
    access: Access,

    /// Start with the world closed to players
    #[arg(long)]
    closed_world: bool,

    /// Append logs here instead of stderr
    #[arg(long)]
    log_file: Option<PathBuf>,
}

#[derive(Parser)]
#[command(about = "simulator commands")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    Buff,
    Unbuff,
    Eat,
    Tick {
        #[arg(short, long, default_value_t = 1)]
        count: u32,
    },
    Status,
    Reload,
    Exit,
}

fn default_mod_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("epicurean")
}

fn main() -> Result<(), String> {
    let args = Args::parse();
    init_logging(args.log_file.as_deref());

    let mod_dir = args.mod_dir.unwrap_or_else(default_mod_dir);
    let mut sim = Simulator::new(&mod_dir, &args.player, args.access.into(), !args.closed_world);

    if sim.start() != ModState::Running {
        return Err(format!("Mod failed to start, see log ({})", mod_dir.display()));
    }
    commands::show_status(&sim);

    loop {
        let Some(line) = readline()? else {
            commands::exit(&mut sim);
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match respond(line, &mut sim) {
            Ok(quit) => {
                if quit {
                    break;
                }
            }
            Err(err) => write_error(&mut std::io::stdout(), &err)?,
        }
    }

    Ok(())
}

/// Print a command error on its own line so the next prompt starts clean.
fn write_error(out: &mut impl Write, err: &str) -> Result<(), String> {
    writeln!(out, "{}", err.trim_end()).map_err(|e| e.to_string())?;
    out.flush().map_err(|e| e.to_string())
}

fn respond(line: &str, sim: &mut Simulator) -> Result<bool, String> {
    let mut args = shlex::split(line).ok_or("error: Invalid quoting")?;
    args.insert(0, "epicurean".to_string());
    let cli = Cli::try_parse_from(args).map_err(|e| e.to_string())?;

    match &cli.command {
        Some(Commands::Buff) => commands::chat(sim, "buff"),
        Some(Commands::Unbuff) => commands::chat(sim, "unbuff"),
        Some(Commands::Eat) => commands::chat(sim, "eat"),
        Some(Commands::Tick { count }) => commands::tick(sim, *count),
        Some(Commands::Status) => commands::show_status(sim),
        Some(Commands::Reload) => commands::reload(sim),
        Some(Commands::Exit) => {
            commands::exit(sim);
            return Ok(true);
        }
        None => {}
    }
    Ok(false)
}
