//! Command-line parsing for the `oc` eclipse-timing tool.
//!
//! Argument parsing and command dispatch stay separate from the fitting code;
//! `app` turns these structs into library configuration.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::{DivergencePolicy, FitKind};
use crate::io::Delimiter;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "oc", version, about = "Eclipse minima timing and O-C diagrams")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Detect minima in a light curve, bootstrap their errors and build the O-C diagram.
    Minima(MinimaArgs),
    /// Build an O-C diagram from a minima table or a JSON run file.
    Diagram(DiagramArgs),
    /// Write a seeded synthetic light curve.
    Simulate(SimulateArgs),
}

/// Table layout of the input file.
#[derive(Debug, Args, Clone)]
pub struct TableArgs {
    /// Field delimiter.
    #[arg(long, value_enum, default_value_t = Delimiter::Whitespace)]
    pub delimiter: Delimiter,
}

/// Plot options shared by `minima` and `diagram`.
#[derive(Debug, Args, Clone)]
pub struct PlotArgs {
    /// Disable the terminal O-C plot.
    #[arg(long)]
    pub no_plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 80)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,
}

#[derive(Debug, Parser, Clone)]
pub struct MinimaArgs {
    /// Light curve table (time, brightness, error).
    #[arg(value_name = "FILE")]
    pub input: PathBuf,

    /// Orbital period, in the time unit of the light curve.
    #[arg(short = 'p', long)]
    pub period: f64,

    /// Local model fitted around each minimum.
    #[arg(short = 'f', long, value_enum, default_value_t = FitKind::Poly)]
    pub fit: FitKind,

    /// Half-width of the fitting window as a fraction of the period.
    #[arg(long, default_value_t = 0.1)]
    pub phase_interval: f64,

    /// Polynomial order (`--fit poly`).
    #[arg(long, default_value_t = 3)]
    pub order: usize,

    /// Bandwidth multiplier of refined kernel fits (`--fit nonparametric`).
    #[arg(long, default_value_t = 1.0)]
    pub smoothness: f64,

    /// Bootstrap resamplings per minimum.
    #[arg(short = 's', long, default_value_t = 100_000)]
    pub samplings: usize,

    /// Worker threads for the bootstrap (default: all cores).
    #[arg(short = 'j', long)]
    pub threads: Option<usize>,

    /// Bootstrap seed (default: random).
    #[arg(long)]
    pub seed: Option<u64>,

    /// Minimum fraction of expected samples a half window must hold.
    #[arg(long, default_value_t = 0.2)]
    pub duty_cycle: f64,

    /// What to do when a fit diverges.
    #[arg(long, value_enum, default_value_t = DivergencePolicy::Abort)]
    pub on_divergence: DivergencePolicy,

    /// 1-based column of the time values.
    #[arg(long, default_value_t = 1)]
    pub time_column: usize,

    /// 1-based column of the brightness values.
    #[arg(long, default_value_t = 2)]
    pub brightness_column: usize,

    /// 1-based column of the brightness errors.
    #[arg(long, default_value_t = 3, conflicts_with = "no_errors")]
    pub error_column: usize,

    /// The table has no error column (bootstrap errors will be zero).
    #[arg(long)]
    pub no_errors: bool,

    /// Reference epoch of the O-C ephemeris (default: first minimum).
    #[arg(long)]
    pub t0: Option<f64>,

    /// Write `<PREFIX>_minima.txt` and `<PREFIX>_OC.txt`.
    #[arg(long, value_name = "PREFIX")]
    pub output: Option<PathBuf>,

    /// Write a JSON run file.
    #[arg(long, value_name = "JSON")]
    pub json: Option<PathBuf>,

    #[command(flatten)]
    pub table: TableArgs,

    #[command(flatten)]
    pub plot: PlotArgs,
}

#[derive(Debug, Parser, Clone)]
pub struct DiagramArgs {
    /// Minima table (time[, error]) or a JSON run file (`.json`).
    #[arg(value_name = "FILE")]
    pub input: PathBuf,

    /// Ephemeris period (default: the period stored in a JSON run file).
    #[arg(short = 'p', long)]
    pub period: Option<f64>,

    /// Reference epoch (default: first minimum).
    #[arg(long)]
    pub t0: Option<f64>,

    /// Write the O-C table (`time O-C [error]`).
    #[arg(short = 'o', long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub table: TableArgs,

    #[command(flatten)]
    pub plot: PlotArgs,
}

#[derive(Debug, Parser, Clone)]
pub struct SimulateArgs {
    /// Output light curve table.
    #[arg(value_name = "FILE")]
    pub output: PathBuf,

    #[arg(short = 'p', long, default_value_t = 1.0)]
    pub period: f64,

    /// Number of cycles to simulate.
    #[arg(long, default_value_t = 20)]
    pub cycles: usize,

    /// Sampling interval.
    #[arg(long, default_value_t = 0.01)]
    pub cadence: f64,

    /// Time of the first sample.
    #[arg(long, default_value_t = 0.0)]
    pub start: f64,

    /// Time of the first minimum.
    #[arg(long, default_value_t = 0.5)]
    pub first_minimum: f64,

    /// Dip depth.
    #[arg(long, default_value_t = 1.0)]
    pub depth: f64,

    /// Gaussian dip sharpness (`exp(-w d^2)`).
    #[arg(long, default_value_t = 50.0)]
    pub dip_width: f64,

    /// Standard deviation of the Gaussian noise.
    #[arg(long, default_value_t = 0.01)]
    pub noise: f64,

    #[arg(long, default_value_t = 42)]
    pub seed: u64,
}
