//! FrameCue CLI: overlay generation and preview for recorded projects.
//!
//! Usage:
//!   framecue init <NAME> [OPTIONS]     Create a project, optionally importing input streams
//!   framecue info <PATH>               Show project and overlay information
//!   framecue validate <PATH>           Validate a project bundle
//!   framecue analyze <PATH>            Generate cursor, keystroke and camera overlays
//!   framecue delay <PATH> <SECS>       Change the keystroke badge delay
//!   framecue preview <PATH> --time T   Evaluate overlays at one instant

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use framecue_common::AppConfig;
use uuid::Uuid;

mod commands;

#[derive(Parser)]
#[command(
    name = "framecue",
    about = "Cursor, keystroke and camera overlays for screen recordings",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new project
    Init {
        /// Project name
        name: String,

        /// Output directory
        #[arg(short, long, default_value = ".")]
        output: PathBuf,

        /// Capture width
        #[arg(long, default_value = "1920")]
        width: u32,

        /// Capture height
        #[arg(long, default_value = "1080")]
        height: u32,

        /// Capture frame rate
        #[arg(long, default_value = "60")]
        fps: u32,

        /// Pointer stream (JSONL) to import
        #[arg(long)]
        pointer: Option<PathBuf>,

        /// Raw input stream (JSONL) to import
        #[arg(long)]
        input: Option<PathBuf>,
    },

    /// Show project information
    Info {
        /// Path to the project directory
        path: PathBuf,
    },

    /// Validate a project bundle
    Validate {
        /// Path to the project directory
        path: PathBuf,
    },

    /// Generate overlays for a segment
    Analyze {
        /// Path to the project directory
        path: PathBuf,

        /// Segment id (defaults to the first segment)
        #[arg(long)]
        segment: Option<Uuid>,

        /// Keep the cursor visible while the pointer idles
        #[arg(long)]
        show_idle_cursor: bool,

        /// Keystroke mode: off|keyboard|keyboard_mouse
        #[arg(long)]
        keystroke_mode: Option<String>,

        /// Keystroke badge delay in seconds
        #[arg(long, allow_hyphen_values = true)]
        delay: Option<f64>,

        /// Generate an auto-zoom camera path
        #[arg(long)]
        auto_zoom: bool,
    },

    /// Change the keystroke badge delay, keeping hand-edited windows
    Delay {
        /// Path to the project directory
        path: PathBuf,

        /// New delay in seconds, clamped to [-1, 1]
        #[arg(allow_hyphen_values = true)]
        delay: f64,

        /// Segment id (defaults to the first segment)
        #[arg(long)]
        segment: Option<Uuid>,
    },

    /// Evaluate overlays at one output-timeline instant
    Preview {
        /// Path to the project directory
        path: PathBuf,

        /// Time in seconds from the segment start
        #[arg(short, long, allow_hyphen_values = true)]
        time: f64,

        /// Segment id (defaults to the first segment)
        #[arg(long)]
        segment: Option<Uuid>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load();

    let mut logging = config.logging.clone();
    if cli.verbose {
        logging.level = "debug".to_string();
    }
    framecue_common::logging::init_logging(&logging);

    match cli.command {
        Commands::Init {
            name,
            output,
            width,
            height,
            fps,
            pointer,
            input,
        } => commands::init::run(name, output, width, height, fps, pointer, input),
        Commands::Info { path } => commands::info::run(path),
        Commands::Validate { path } => commands::validate::run(path),
        Commands::Analyze {
            path,
            segment,
            show_idle_cursor,
            keystroke_mode,
            delay,
            auto_zoom,
        } => {
            let options = commands::analyze::AnalyzeOptions {
                segment,
                hide_idle_cursor: !show_idle_cursor && config.editor.hide_idle_cursor,
                keystroke_mode: keystroke_mode
                    .unwrap_or_else(|| config.editor.keystroke_mode.clone()),
                delay_secs: delay.unwrap_or(config.editor.keystroke_delay_secs),
                auto_zoom: auto_zoom || config.editor.auto_zoom,
            };
            commands::analyze::run(path, options).await
        }
        Commands::Delay {
            path,
            delay,
            segment,
        } => commands::delay::run(path, delay, segment),
        Commands::Preview {
            path,
            time,
            segment,
        } => commands::preview::run(path, time, segment),
    }
}
