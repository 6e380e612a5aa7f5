//! Generation diagnostics: timing, counts, and other metrics for each stage.
//!
//! These diagnostics are permanent instrumentation intended for
//! parameter experimentation. [`generate_with_diagnostics`] runs the
//! staged pipeline, timing each step through a [`Clock`], and collects
//! the stage metrics alongside the generated map.
//!
//! Duration measurements use [`std::time::Duration`]. The default
//! [`WebClock`] reads timestamps through the `web-time` crate, which
//! uses `performance.now()` on WASM and `std::time::Instant` on native.
//!
//! Durations are serialized as fractional seconds (`f64`) for JSON
//! compatibility, since `std::time::Duration` does not implement serde
//! traits.

use std::time::Duration;

use petgraph::unionfind::UnionFind;
use serde::{Deserialize, Serialize};

use crate::grid::Grid;
use crate::outer::all_outer_tiles;
use crate::pipeline::Pipeline;
use crate::types::{GenerateError, GeneratedMap, GenerationConfig};

/// Serde support for `std::time::Duration` as fractional seconds.
mod duration_serde {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize a `Duration` as fractional seconds (`f64`).
    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        duration.as_secs_f64().serialize(serializer)
    }

    /// Deserialize a `Duration` from fractional seconds (`f64`).
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(|_| {
            serde::de::Error::custom(
                "duration seconds must be finite, non-negative, and representable as a Duration",
            )
        })
    }
}

/// Source of timestamps for stage timing.
///
/// Injected so that tests and hosts without a monotonic clock can supply
/// their own.
pub trait Clock {
    /// Opaque timestamp.
    type Instant;

    /// Current timestamp.
    fn now(&self) -> Self::Instant;

    /// Time elapsed since `since`.
    fn elapsed(&self, since: &Self::Instant) -> Duration;
}

/// [`Clock`] backed by `web_time::Instant`.
#[derive(Debug, Clone, Copy, Default)]
pub struct WebClock;

impl Clock for WebClock {
    type Instant = web_time::Instant;

    fn now(&self) -> web_time::Instant {
        web_time::Instant::now()
    }

    fn elapsed(&self, since: &web_time::Instant) -> Duration {
        since.elapsed()
    }
}

/// Diagnostics collected from a single generation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationDiagnostics {
    /// Stage 1: region seed sampling.
    pub sampling: StageDiagnostics,
    /// Stage 2: triangulation and edge extraction.
    pub connectivity: StageDiagnostics,
    /// Stage 3: corridor routing and carving.
    pub carving: StageDiagnostics,
    /// Stage 4: double-wide repair.
    pub repair: StageDiagnostics,
    /// Stage 5: dead-end remediation.
    pub remediation: StageDiagnostics,
    /// Total wall-clock duration of the entire run (seconds).
    #[serde(with = "duration_serde")]
    pub total_duration: Duration,
    /// Summary of the final map.
    pub summary: GenerationSummary,
}

/// Diagnostics for a single pipeline stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageDiagnostics {
    /// Wall-clock duration of this stage (seconds).
    #[serde(with = "duration_serde")]
    pub duration: Duration,
    /// Stage-specific metrics (counts, sizes, etc.).
    pub metrics: StageMetrics,
}

/// Stage-specific metrics that vary by pipeline stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StageMetrics {
    /// Region seed sampling metrics.
    Sampling {
        /// Seeds asked for.
        requested: usize,
        /// Seeds accepted.
        accepted: usize,
        /// Candidate draws consumed.
        attempts: usize,
    },
    /// Connectivity extraction metrics.
    Connectivity {
        /// Seeds triangulated.
        seed_count: usize,
        /// Unique edges produced.
        edge_count: usize,
        /// Mean Euclidean edge length.
        mean_edge_length: f64,
    },
    /// Corridor carving metrics.
    Carving {
        /// Edges processed.
        edge_count: usize,
        /// Edges that produced a corridor.
        carved: usize,
        /// Edges that fell back to a direct search.
        fallbacks: usize,
        /// Edges routed without waypoints.
        direct: usize,
        /// Edges routed as an L.
        l_shape: usize,
        /// Edges routed as a step.
        step: usize,
        /// Edges routed as a zigzag.
        zigzag: usize,
        /// Corridor tiles after carving.
        corridor_tiles: usize,
    },
    /// Double-wide repair metrics.
    Repair {
        /// Passes executed.
        passes: usize,
        /// Tiles reverted.
        reverted: usize,
        /// Blocks left when the pass cap was hit.
        remaining_blocks: usize,
    },
    /// Dead-end remediation metrics.
    Remediation {
        /// Which remediator ran.
        strategy: String,
        /// Passes executed.
        passes: usize,
        /// Dead ends before remediation.
        dead_ends_before: usize,
        /// Dead ends after remediation.
        dead_ends_after: usize,
        /// Corridor tiles after remediation.
        corridor_tiles: usize,
    },
}

/// High-level summary of the final map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationSummary {
    /// Grid width in tiles.
    pub width: u32,
    /// Grid height in tiles.
    pub height: u32,
    /// Seed of the random stream.
    pub seed: u64,
    /// Corridor tiles in the final grid.
    pub corridor_tiles: usize,
    /// Orthogonally connected corridor components.
    pub corridor_components: usize,
    /// Corridor tiles with exactly one corridor neighbour.
    pub dead_ends: usize,
    /// Significant corridor tiles on the grid border.
    pub significant_border_tiles: usize,
}

impl GenerationSummary {
    /// Summarize a finished map.
    #[must_use]
    pub fn of(map: &GeneratedMap) -> Self {
        Self {
            width: map.grid.width(),
            height: map.grid.height(),
            seed: map.seed,
            corridor_tiles: map.grid.corridor_count(),
            corridor_components: corridor_components(&map.grid),
            dead_ends: map.grid.dead_ends().len(),
            significant_border_tiles: all_outer_tiles(&map.grid).len(),
        }
    }
}

impl GenerationDiagnostics {
    /// Format diagnostics as a human-readable report.
    #[must_use]
    pub fn report(&self) -> String {
        let mut lines = Vec::new();

        lines.push(format!("Generation Diagnostics Report\n{}", "=".repeat(60)));
        lines.push(format!(
            "Grid: {}x{} (seed {})",
            self.summary.width, self.summary.height, self.summary.seed,
        ));
        lines.push(format!(
            "Total duration: {:.3}ms",
            duration_ms(self.total_duration),
        ));
        lines.push(String::new());

        lines.push(format!(
            "{:<24} {:>10} {:>10}  {}",
            "Stage", "Duration", "% Total", "Details"
        ));
        lines.push("-".repeat(80));

        let total_ms = duration_ms(self.total_duration);
        let stages: [(&str, &StageDiagnostics); 5] = [
            ("Sampling", &self.sampling),
            ("Connectivity", &self.connectivity),
            ("Carving", &self.carving),
            ("Repair", &self.repair),
            ("Remediation", &self.remediation),
        ];

        for (name, diag) in &stages {
            let ms = duration_ms(diag.duration);
            let pct = if total_ms > 0.0 {
                ms / total_ms * 100.0
            } else {
                0.0
            };
            let details = format_metrics(&diag.metrics);
            lines.push(format!("{name:<24} {ms:>8.3}ms {pct:>9.1}%  {details}"));
        }

        lines.push(String::new());
        lines.push(format!(
            "Corridor tiles: {}  |  Components: {}  |  Dead ends: {}  |  Border links: {}",
            self.summary.corridor_tiles,
            self.summary.corridor_components,
            self.summary.dead_ends,
            self.summary.significant_border_tiles,
        ));

        lines.join("\n")
    }
}

/// Convert a `Duration` to milliseconds as `f64`.
fn duration_ms(d: Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}

/// Format stage metrics into a compact detail string.
fn format_metrics(metrics: &StageMetrics) -> String {
    match metrics {
        StageMetrics::Sampling {
            requested,
            accepted,
            attempts,
        } => format!("{accepted}/{requested} seeds in {attempts} attempts"),
        StageMetrics::Connectivity {
            seed_count,
            edge_count,
            mean_edge_length,
        } => format!("{seed_count} seeds -> {edge_count} edges (mean len {mean_edge_length:.2})"),
        StageMetrics::Carving {
            edge_count,
            carved,
            fallbacks,
            direct,
            l_shape,
            step,
            zigzag,
            corridor_tiles,
        } => format!(
            "{carved}/{edge_count} carved, {fallbacks} fallback (direct={direct} l={l_shape} step={step} zigzag={zigzag}) tiles={corridor_tiles}",
        ),
        StageMetrics::Repair {
            passes,
            reverted,
            remaining_blocks,
        } => format!("{passes} passes, {reverted} reverted, {remaining_blocks} blocks left"),
        StageMetrics::Remediation {
            strategy,
            passes,
            dead_ends_before,
            dead_ends_after,
            corridor_tiles,
        } => format!(
            "{strategy} {passes} passes, dead ends {dead_ends_before}->{dead_ends_after} tiles={corridor_tiles}",
        ),
    }
}

/// Number of orthogonally connected corridor components.
#[must_use]
pub fn corridor_components(grid: &Grid) -> usize {
    let mut uf = UnionFind::<usize>::new(grid.tiles().len());
    let mut merges = 0;
    for pos in grid.corridor_positions() {
        for neighbor in [pos.offset(1, 0), pos.offset(0, 1)] {
            if grid.is_corridor(neighbor)
                && let (Some(a), Some(b)) = (grid.index(pos), grid.index(neighbor))
                && uf.union(a, b)
            {
                merges += 1;
            }
        }
    }
    grid.corridor_count() - merges
}

/// Run the staged pipeline, timing each stage with `clock`.
///
/// Produces the same map as [`crate::generate_map`] for the same
/// configuration and seed.
///
/// # Errors
///
/// Returns [`GenerateError::InvalidConfig`] or
/// [`GenerateError::NotEnoughPoints`] as the corresponding stage would.
pub fn generate_with_diagnostics<C: Clock>(
    config: &GenerationConfig,
    clock: &C,
) -> Result<(GeneratedMap, GenerationDiagnostics), GenerateError> {
    let total_start = clock.now();

    let start = clock.now();
    let seeded = Pipeline::new(config.clone()).seed()?;
    let sampling = StageDiagnostics {
        duration: clock.elapsed(&start),
        metrics: seeded.metrics(),
    };

    let start = clock.now();
    let connected = seeded.connect()?;
    let connectivity = StageDiagnostics {
        duration: clock.elapsed(&start),
        metrics: connected.metrics(),
    };

    let start = clock.now();
    let carved = connected.carve();
    let carving = StageDiagnostics {
        duration: clock.elapsed(&start),
        metrics: carved.metrics(),
    };

    let start = clock.now();
    let repaired = carved.repair();
    let repair = StageDiagnostics {
        duration: clock.elapsed(&start),
        metrics: repaired.metrics(),
    };

    let start = clock.now();
    let remediated = repaired.remediate();
    let remediation = StageDiagnostics {
        duration: clock.elapsed(&start),
        metrics: remediated.metrics(),
    };

    let map = remediated.into_result();
    let total_duration = clock.elapsed(&total_start);
    let summary = GenerationSummary::of(&map);

    Ok((
        map,
        GenerationDiagnostics {
            sampling,
            connectivity,
            carving,
            repair,
            remediation,
            total_duration,
            summary,
        },
    ))
}
