//! Top-level application orchestration.
//!
//! `src/main.rs` only maps errors to exit codes; this module is the real
//! main. It:
//! - sets up logging
//! - parses CLI arguments
//! - runs the detection / diagram pipelines
//! - prints reports and plots, and writes optional outputs

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use clap::Parser;

use crate::cli::{Cli, Command, DiagramArgs, MinimaArgs, PlotArgs, SimulateArgs};
use crate::data::{DipShape, SyntheticConfig, generate_light_curve};
use crate::domain::{MinimaConfig, OcPoint};
use crate::error::OcError;
use crate::io::{Columns, RunFile, write_light_curve, write_minima_table, write_oc_table, write_run_json};

pub mod pipeline;

/// Entry point for the `oc` binary.
pub fn run() -> Result<(), OcError> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Command::Minima(args) => handle_minima(args),
        Command::Diagram(args) => handle_diagram(args),
        Command::Simulate(args) => handle_simulate(args),
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn handle_minima(args: MinimaArgs) -> Result<(), OcError> {
    let config = minima_config_from_args(&args);
    let columns = columns_from_args(&args)?;
    let run = pipeline::run_minima(&args.input, args.table.delimiter, columns, args.period, &config, args.t0)?;

    println!(
        "{}",
        crate::report::format_run_summary(&run.series, args.period, &config, &run.result)
    );
    if !run.table.row_errors.is_empty() {
        println!(
            "Skipped {} malformed rows of {}.\n",
            run.table.row_errors.len(),
            run.table.rows_read
        );
    }
    print_oc(&run.oc, &args.plot);

    if let Some(prefix) = &args.output {
        write_minima_table(&with_suffix(prefix, "_minima.txt"), &run.result.minima)?;
        write_oc_table(&with_suffix(prefix, "_OC.txt"), &run.oc)?;
    }
    if let Some(path) = &args.json {
        let file = RunFile::new(args.period, config, run.result, run.oc);
        write_run_json(path, &file)?;
    }

    Ok(())
}

fn handle_diagram(args: DiagramArgs) -> Result<(), OcError> {
    let input = pipeline::load_diagram_input(&args.input, args.table.delimiter)?;
    let oc = pipeline::run_diagram(&input, args.period, args.t0)?;

    print_oc(&oc, &args.plot);
    if let Some(path) = &args.output {
        write_oc_table(path, &oc)?;
    }
    Ok(())
}

fn handle_simulate(args: SimulateArgs) -> Result<(), OcError> {
    let config = SyntheticConfig {
        period: args.period,
        cycles: args.cycles,
        cadence: args.cadence,
        start: args.start,
        first_minimum: args.first_minimum,
        depth: args.depth,
        shape: DipShape::Gaussian { width: args.dip_width },
        noise: args.noise,
        seed: args.seed,
        ..SyntheticConfig::default()
    };
    let curve = generate_light_curve(&config)?;
    write_light_curve(&args.output, &curve.series)?;
    println!(
        "Wrote {} samples ({} minima) to {}",
        curve.series.len(),
        curve.minima.len(),
        args.output.display()
    );
    Ok(())
}

fn print_oc(oc: &[OcPoint], plot: &PlotArgs) {
    println!("{}", crate::report::format_oc_table(oc));
    if !plot.no_plot {
        println!("{}", crate::plot::render_oc_plot(oc, plot.width, plot.height));
    }
}

pub fn minima_config_from_args(args: &MinimaArgs) -> MinimaConfig {
    MinimaConfig {
        fit: args.fit,
        phase_interval: args.phase_interval,
        order: args.order,
        smoothness: args.smoothness,
        samplings: args.samplings,
        threads: args.threads,
        seed: args.seed,
        duty_cycle: args.duty_cycle,
        on_divergence: args.on_divergence,
    }
}

/// Map the 1-based CLI columns onto table columns.
pub fn columns_from_args(args: &MinimaArgs) -> Result<Columns, OcError> {
    let zero_based = |name: &'static str, col: usize| {
        col.checked_sub(1)
            .ok_or_else(|| OcError::invalid(name, "columns are numbered from 1"))
    };
    Ok(Columns {
        time: zero_based("time_column", args.time_column)?,
        brightness: zero_based("brightness_column", args.brightness_column)?,
        error: if args.no_errors {
            None
        } else {
            Some(zero_based("error_column", args.error_column)?)
        },
    })
}

fn with_suffix(prefix: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(prefix.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FitKind;

    fn parse(argv: &[&str]) -> MinimaArgs {
        match Cli::parse_from(argv).command {
            Command::Minima(args) => args,
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn minima_defaults_match_library_defaults() {
        let args = parse(&["oc", "minima", "lc.txt", "--period", "2.5"]);
        let config = minima_config_from_args(&args);
        assert_eq!(config, MinimaConfig::default());
        assert_eq!(args.period, 2.5);
        assert_eq!(columns_from_args(&args).unwrap(), Columns::default());
    }

    #[test]
    fn model_is_an_alias_of_template() {
        let args = parse(&["oc", "minima", "lc.txt", "-p", "1", "--fit", "model", "--threads", "2"]);
        assert_eq!(args.fit, FitKind::Template);
        assert_eq!(minima_config_from_args(&args).threads, Some(2));
    }

    #[test]
    fn column_zero_is_rejected() {
        let args = parse(&["oc", "minima", "lc.txt", "-p", "1", "--time-column", "0"]);
        assert!(columns_from_args(&args).is_err());

        let args = parse(&["oc", "minima", "lc.txt", "-p", "1", "--no-errors"]);
        assert_eq!(columns_from_args(&args).unwrap().error, None);
    }

    #[test]
    fn output_prefix_gets_suffixes() {
        assert_eq!(
            with_suffix(Path::new("out/run1"), "_OC.txt"),
            PathBuf::from("out/run1_OC.txt")
        );
    }
}
