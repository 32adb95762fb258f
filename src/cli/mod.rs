//! Command-line parsing for the SAS curve simulator.
//!
//! Argument parsing and command dispatch stay separate from the simulation code;
//! `SimulateArgs` is converted into a plain `SimConfig` before anything runs.

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "shape2sas",
    version,
    about = "Simulate small-angle scattering curves from composite geometric models"
)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Silence all log output.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Build the point model, compute p(r), I(q) and a simulated dataset, and write dumps.
    Simulate(SimulateArgs),
    /// List the available subunit shapes and their dimensions.
    Shapes,
}

/// Options for a simulation run.
#[derive(Debug, Parser, Clone)]
pub struct SimulateArgs {
    /// Model JSON file with one model or a "models" list (defaults to a single sphere, R = 50 Å).
    #[arg(long, value_name = "JSON")]
    pub model: Option<PathBuf>,

    /// Total number of points distributed over all subunits.
    #[arg(long, default_value_t = 3000)]
    pub npoints: usize,

    /// Number of p(r) bins.
    #[arg(long, default_value_t = 100)]
    pub prpoints: usize,

    /// Smallest q (Å⁻¹) of the uniform grid.
    #[arg(long, default_value_t = 0.001)]
    pub qmin: f64,

    /// Largest q (Å⁻¹) of the uniform grid.
    #[arg(long, default_value_t = 0.5)]
    pub qmax: f64,

    /// Number of q points in the uniform grid.
    #[arg(long, default_value_t = 400)]
    pub qpoints: usize,

    /// Read q values from a file instead of sampling uniformly (first column).
    #[arg(long = "q", value_name = "FILE")]
    pub q_file: Option<PathBuf>,

    /// Exposure time in arbitrary units.
    #[arg(long, default_value_t = 500.0)]
    pub exposure: f64,

    /// Relative size polydispersity (0 disables).
    #[arg(long, default_value_t = 0.0)]
    pub polydispersity: f64,

    /// Sample concentration.
    #[arg(long, default_value_t = 0.02)]
    pub conc: f64,

    /// Interface roughness σ in Å (0 disables).
    #[arg(long = "sigma-r", default_value_t = 0.0)]
    pub sigma_r: f64,

    /// Remove points of later subunits that fall inside earlier ones.
    #[arg(long, action = ArgAction::Set, default_value_t = true)]
    pub exclude_overlap: bool,

    /// Random seed for point sampling and noise (model k of a batch uses seed + k).
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Directory for the pr/Sq/Iq/Isim dumps.
    #[arg(long, default_value = ".")]
    pub output_dir: PathBuf,

    /// Output name for a single model; in a batch, the prefix for unnamed models.
    #[arg(long)]
    pub name: Option<String>,
}
