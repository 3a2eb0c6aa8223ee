//! camerapos - Inspect and edit saved editor camera positions
//!
//! Works directly on the JSON store the editor extension writes, resolved
//! from the same settings file.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{debug, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "camerapos")]
#[command(about = "Inspect and edit saved editor camera positions")]
#[command(version)]
struct Args {
    /// Path to the extension settings file
    #[arg(short, long, default_value = "camerapos.toml")]
    config: PathBuf,

    /// Use this store instead of the one named in the settings
    #[arg(short, long)]
    store: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List every level with a saved camera position
    List,
    /// Show the saved camera position of one level
    Show {
        /// Level path, e.g. /Game/Maps/Foo
        level: String,
    },
    /// Save a camera position for a level
    Set {
        level: String,
        /// Location X Y Z
        #[arg(long, num_args = 3, value_names = ["X", "Y", "Z"], allow_negative_numbers = true, required = true)]
        location: Vec<f64>,
        /// Rotation in degrees: pitch yaw roll
        #[arg(long, num_args = 3, value_names = ["PITCH", "YAW", "ROLL"], allow_negative_numbers = true)]
        rotation: Option<Vec<f64>>,
        /// Horizontal field of view in degrees
        #[arg(long)]
        fov: Option<f64>,
    },
    /// Forget the saved camera position of a level
    Erase { level: String },
    /// Write a settings file with default values
    InitConfig {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::WARN,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    debug!("camerapos v{}", env!("CARGO_PKG_VERSION"));

    let mut out = std::io::stdout().lock();

    if let Command::InitConfig { force } = args.command {
        return commands::init_config(&args.config, force, &mut out);
    }

    let mut store = commands::open_store(&args.config, args.store.as_deref())?;

    match args.command {
        Command::List => commands::list(&store, &mut out),
        Command::Show { level } => commands::show(&store, &level, &mut out),
        Command::Set {
            level,
            location,
            rotation,
            fov,
        } => {
            let pose = commands::pose_from_args(&location, rotation.as_deref(), fov)?;
            commands::set(&mut store, &level, pose, &mut out)
        }
        Command::Erase { level } => commands::erase(&mut store, &level, &mut out),
        Command::InitConfig { .. } => Ok(()),
    }
}
