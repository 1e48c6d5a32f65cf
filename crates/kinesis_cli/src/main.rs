//! Kinesis CLI
//!
//! Offline tooling for motion scenes:
//! - `simulate` steps a scene frame by frame and prints JSON samples
//! - `check` validates a scene and summarizes it
//! - `presets` lists the named spring configurations

mod config;
mod error;
mod simulate;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use kinesis_animation::SpringPreset;
use std::fs;
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::EnvFilter;

use crate::config::{damping_regime, Scene};
use crate::simulate::{final_values, simulate, SimulationSettings};

/// Kinesis motion scene tooling
#[derive(Parser)]
#[command(name = "kinesis")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Simulate a scene and print per-frame samples as JSON
    Simulate {
        /// Scene file (.toml or .json)
        scene: PathBuf,

        /// Frames per second
        #[arg(long, default_value_t = 60)]
        fps: u32,

        /// Stop after this many frames even if the scene has not settled
        #[arg(long, default_value_t = 600)]
        max_frames: usize,

        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,

        /// Write the JSON to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Validate a scene and print a summary
    Check {
        /// Scene file (.toml or .json)
        scene: PathBuf,
    },

    /// List the named spring presets
    Presets,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Samples go to stdout, so logs go to stderr
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(log_level(cli.verbose).into()),
        )
        .init();

    match cli.command {
        Commands::Simulate {
            scene,
            fps,
            max_frames,
            pretty,
            output,
        } => cmd_simulate(scene, fps, max_frames, pretty, output),
        Commands::Check { scene } => cmd_check(scene),
        Commands::Presets => cmd_presets(),
    }
}

fn log_level(verbose: bool) -> Level {
    if verbose {
        Level::DEBUG
    } else {
        Level::INFO
    }
}

fn cmd_simulate(
    path: PathBuf,
    fps: u32,
    max_frames: usize,
    pretty: bool,
    output: Option<PathBuf>,
) -> Result<()> {
    let scene = Scene::load(&path)?;
    info!("Simulating {} at {} fps", scene.name, fps);

    let report = simulate(&scene, SimulationSettings { fps, max_frames })?;
    if !report.settled {
        tracing::warn!(
            "Scene '{}' did not settle within {} frames",
            scene.name,
            max_frames
        );
    }

    let json = if pretty {
        serde_json::to_string_pretty(&report)
    } else {
        serde_json::to_string(&report)
    }
    .context("Failed to serialize simulation")?;

    match output {
        Some(path) => {
            fs::write(&path, json)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!("Wrote {} frames to {}", report.frames.len(), path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}

fn cmd_check(path: PathBuf) -> Result<()> {
    let scene = Scene::load(&path)?;
    for line in scene.summary() {
        println!("{line}");
    }

    let report = simulate(&scene, SimulationSettings::default())?;
    let duration_ms = report.frames.last().map_or(0.0, |sample| sample.time_ms);
    if report.settled {
        println!("settles after {duration_ms:.0} ms ({} frames)", report.frames.len());
    } else {
        println!("still moving after {duration_ms:.0} ms");
    }
    for (property, value) in final_values(&report) {
        println!("  {property} = {value:.3}");
    }
    Ok(())
}

fn cmd_presets() -> Result<()> {
    println!(
        "{:<8} {:>9} {:>7} {:>5} {:>6}  regime",
        "preset", "stiffness", "damping", "mass", "ratio"
    );
    for preset in SpringPreset::ALL {
        let config = preset.config();
        println!(
            "{:<8} {:>9} {:>7} {:>5} {:>6.2}  {}",
            preset.name(),
            config.stiffness,
            config.damping,
            config.mass,
            config.damping_ratio(),
            damping_regime(&config)
        );
    }
    Ok(())
}
