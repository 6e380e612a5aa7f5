//! corridor-bench: CLI tool for generation parameter experimentation and diagnostics.
//!
//! Generates corridor maps with configurable parameters, printing detailed
//! per-stage diagnostics. Useful for:
//!
//! - Comparing dead-end remediation strategies (`tiered` vs `disabled`)
//! - Tuning region count and spacing against corridor density
//! - Measuring per-stage durations to identify bottlenecks
//! - Replaying a reported seed to inspect a particular map
//!
//! # Usage
//!
//! ```text
//! cargo run --release --bin corridor-bench -- [OPTIONS]
//! ```

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::{Duration, Instant};

use clap::{Parser, ValueEnum};
use corridor_pipeline::diagnostics::{Clock, GenerationDiagnostics};
use corridor_pipeline::{GenerationConfig, RemediatorKind};

/// Generation parameter experimentation and diagnostics for corridor maps.
///
/// Generates maps with configurable parameters and prints detailed
/// per-stage timing and count diagnostics.
#[derive(Parser)]
#[command(name = "corridor-bench", version)]
struct Cli {
    /// Grid width in tiles.
    #[arg(long, default_value_t = GenerationConfig::DEFAULT_WIDTH, value_parser = clap::builder::RangedU64ValueParser::<u32>::new().range(1..))]
    width: u32,

    /// Grid height in tiles.
    #[arg(long, default_value_t = GenerationConfig::DEFAULT_HEIGHT, value_parser = clap::builder::RangedU64ValueParser::<u32>::new().range(1..))]
    height: u32,

    /// Number of region seeds to place.
    #[arg(long, default_value_t = GenerationConfig::DEFAULT_REGION_COUNT)]
    regions: usize,

    /// Minimum Euclidean distance between region seeds.
    #[arg(long, default_value_t = GenerationConfig::DEFAULT_MIN_REGION_DISTANCE)]
    spacing: f64,

    /// Random seed. A fresh seed is drawn and reported when omitted.
    #[arg(long)]
    seed: Option<u64>,

    /// Dead-end remediation strategy.
    #[arg(long, value_enum, default_value_t = Remediator::Tiered)]
    remediator: Remediator,

    /// Write SVG output to file.
    #[arg(long)]
    svg: Option<PathBuf>,

    /// Overlay seeds and triangulation edges on the SVG.
    #[arg(long, requires = "svg")]
    overlay: bool,

    /// Print the map as ASCII text to stdout.
    #[arg(long)]
    ascii: bool,

    /// Number of runs for averaging.
    #[arg(long, default_value_t = 1, value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..))]
    runs: usize,

    /// Output diagnostics as JSON instead of human-readable report.
    #[arg(long)]
    json: bool,

    /// Full generation config as a JSON string.
    ///
    /// When provided, all other generation parameter flags are ignored.
    /// Missing fields take their defaults.
    #[arg(long)]
    config_json: Option<String>,
}

/// Dead-end remediation strategy selection.
#[derive(Clone, Copy, ValueEnum)]
enum Remediator {
    /// Leave dead ends as carved.
    Disabled,
    /// Extend, bridge, prune and force-connect over repeated passes.
    Tiered,
}

/// Build a [`GenerationConfig`] from CLI arguments.
///
/// If `--config-json` is provided, the JSON is parsed directly and all
/// individual parameter flags are ignored. Otherwise, a config is
/// assembled from the individual flags.
fn config_from_cli(cli: &Cli) -> Result<GenerationConfig, String> {
    let config: GenerationConfig = if let Some(ref json) = cli.config_json {
        serde_json::from_str(json).map_err(|e| format!("Error parsing --config-json: {e}"))?
    } else {
        GenerationConfig {
            width: cli.width,
            height: cli.height,
            region_count: cli.regions,
            min_region_distance: cli.spacing,
            seed: cli.seed,
            remediator: match cli.remediator {
                Remediator::Disabled => RemediatorKind::Disabled,
                Remediator::Tiered => RemediatorKind::Tiered,
            },
            ..GenerationConfig::default()
        }
    };
    config.validate().map_err(|e| e.to_string())?;
    Ok(config)
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match config_from_cli(&cli) {
        Ok(c) => c,
        Err(msg) => {
            eprintln!("{msg}");
            return ExitCode::FAILURE;
        }
    };

    eprintln!("Config: {config:#?}");
    eprintln!("Runs: {}", cli.runs);
    eprintln!();

    let mut all_diagnostics = Vec::with_capacity(cli.runs);

    for run in 0..cli.runs {
        if cli.runs > 1 {
            eprintln!("--- Run {}/{} ---", run + 1, cli.runs);
        }

        match corridor_pipeline::generate_with_diagnostics(&config, &StdClock) {
            Ok((map, diagnostics)) => {
                if cli.json {
                    match serde_json::to_string_pretty(&diagnostics) {
                        Ok(json) => println!("{json}"),
                        Err(e) => {
                            eprintln!("Error serializing diagnostics: {e}");
                            return ExitCode::FAILURE;
                        }
                    }
                } else {
                    println!("{}", diagnostics.report());
                }

                // Exports come from the first run only.
                if run == 0 {
                    if cli.ascii {
                        println!();
                        print!("{}", corridor_export::to_ascii(&map.grid));
                    }

                    if let Some(ref svg_path) = cli.svg {
                        let title = format!("corridor map (seed {})", map.seed);
                        let desc = format!(
                            "{}x{}, {} regions, spacing {}",
                            map.grid.width(),
                            map.grid.height(),
                            config.region_count,
                            config.min_region_distance,
                        );
                        let config_json = serde_json::to_string(&GenerationConfig {
                            seed: Some(map.seed),
                            ..config.clone()
                        })
                        .ok();
                        let metadata = corridor_export::SvgMetadata {
                            title: Some(&title),
                            description: Some(&desc),
                            config_json: config_json.as_deref(),
                        };
                        let svg = if cli.overlay {
                            corridor_export::to_diagnostic_svg(&map, &metadata)
                        } else {
                            corridor_export::to_svg(&map.grid, &metadata)
                        };
                        match std::fs::write(svg_path, &svg) {
                            Ok(()) => {
                                eprintln!(
                                    "SVG written to {} ({} bytes)",
                                    svg_path.display(),
                                    svg.len(),
                                );
                            }
                            Err(e) => {
                                eprintln!("Error writing SVG to {}: {e}", svg_path.display());
                            }
                        }
                    }
                }

                all_diagnostics.push(diagnostics);
            }
            Err(e) => {
                eprintln!("Generation error: {e}");
                return ExitCode::FAILURE;
            }
        }

        if cli.runs > 1 {
            eprintln!();
        }
    }

    // Print summary when multiple runs.
    if cli.runs > 1 {
        print_multi_run_summary(&all_diagnostics);
    }

    ExitCode::SUCCESS
}

/// [`Clock`] implementation backed by [`std::time::Instant`].
struct StdClock;

impl Clock for StdClock {
    type Instant = Instant;

    fn now(&self) -> Instant {
        Instant::now()
    }

    fn elapsed(&self, since: &Instant) -> Duration {
        since.elapsed()
    }
}

/// Function pointer type for extracting a stage duration from diagnostics.
type StageExtractor = fn(&GenerationDiagnostics) -> Duration;

/// Arithmetic mean of `values`, or zero when empty.
#[allow(clippy::cast_precision_loss)]
fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

/// Print aggregated statistics across multiple runs.
#[allow(clippy::cast_precision_loss)]
fn print_multi_run_summary(all_diagnostics: &[GenerationDiagnostics]) {
    debug_assert!(!all_diagnostics.is_empty(), "no diagnostics to summarize");

    println!();
    println!(
        "Summary ({} runs)\n{}",
        all_diagnostics.len(),
        "=".repeat(60),
    );

    if all_diagnostics.is_empty() {
        println!("Warning: no diagnostics to summarize");
        return;
    }

    let durations: Vec<f64> = all_diagnostics
        .iter()
        .map(|d| d.total_duration.as_secs_f64() * 1000.0)
        .collect();

    let min = durations.iter().copied().reduce(f64::min).unwrap_or(0.0);
    let max = durations.iter().copied().reduce(f64::max).unwrap_or(0.0);

    println!(
        "Total duration: min={min:.3}ms  mean={:.3}ms  max={max:.3}ms",
        mean(&durations),
    );

    let tiles: Vec<f64> = all_diagnostics
        .iter()
        .map(|d| d.summary.corridor_tiles as f64)
        .collect();
    let dead_ends: Vec<f64> = all_diagnostics
        .iter()
        .map(|d| d.summary.dead_ends as f64)
        .collect();
    println!(
        "Corridor tiles: mean={:.1}  |  Dead ends: mean={:.1}",
        mean(&tiles),
        mean(&dead_ends),
    );

    // Per-stage means.
    println!();
    println!("{:<24} {:>12}", "Stage", "Mean (ms)");
    println!("{}", "-".repeat(40));

    let stage_extractors: &[(&str, StageExtractor)] = &[
        ("Sampling", |d| d.sampling.duration),
        ("Connectivity", |d| d.connectivity.duration),
        ("Carving", |d| d.carving.duration),
        ("Repair", |d| d.repair.duration),
        ("Remediation", |d| d.remediation.duration),
    ];

    for (name, extractor) in stage_extractors {
        let stage_durations: Vec<f64> = all_diagnostics
            .iter()
            .map(extractor)
            .map(|dur| dur.as_secs_f64() * 1000.0)
            .collect();

        println!("{name:<24} {:>10.3}ms", mean(&stage_durations));
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("corridor-bench").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn defaults_match_generation_defaults() {
        let config = config_from_cli(&parse(&[])).unwrap();
        assert_eq!(config, GenerationConfig::default());
    }

    #[test]
    fn flags_build_config() {
        let cli = parse(&[
            "--width",
            "30",
            "--regions",
            "8",
            "--seed",
            "5",
            "--remediator",
            "disabled",
        ]);
        let config = config_from_cli(&cli).unwrap();
        assert_eq!(config.width, 30);
        assert_eq!(config.region_count, 8);
        assert_eq!(config.seed, Some(5));
        assert_eq!(config.remediator, RemediatorKind::Disabled);
    }

    #[test]
    fn config_json_overrides_flags() {
        let cli = parse(&["--width", "30", "--config-json", r#"{"width": 12, "seed": 3}"#]);
        let config = config_from_cli(&cli).unwrap();
        assert_eq!(config.width, 12);
        assert_eq!(config.seed, Some(3));
    }

    #[test]
    fn invalid_values_are_reported() {
        let cli = parse(&["--spacing=-1"]);
        assert!(config_from_cli(&cli).is_err());
        let cli = parse(&["--config-json", "{not json"]);
        assert!(
            config_from_cli(&cli)
                .unwrap_err()
                .starts_with("Error parsing")
        );
    }

    #[test]
    fn zero_runs_rejected() {
        assert!(Cli::try_parse_from(["corridor-bench", "--runs", "0"]).is_err());
    }

    #[test]
    fn mean_of_empty_is_zero() {
        assert!(mean(&[]).abs() < f64::EPSILON);
        assert!((mean(&[1.0, 3.0]) - 2.0).abs() < 1e-12);
    }
}
