//! Incremental pipeline: advance stage-by-stage, inspecting each
//! intermediate result before continuing.
//!
//! Unlike [`crate::generate_map`] which runs every stage in one call,
//! [`Pipeline`] lets the caller drive execution one step at a time:
//!
//! ```rust
//! # use corridor_pipeline::{GenerateError, GenerationConfig, Pipeline};
//! # fn run() -> Result<(), GenerateError> {
//! let config = GenerationConfig {
//!     seed: Some(7),
//!     ..GenerationConfig::default()
//! };
//! let connected = Pipeline::new(config).seed()?.connect()?;
//! println!("{} edges", connected.edges().len());
//!
//! let map = connected.carve().repair().remediate().into_result();
//! assert!(map.grid.corridor_count() > 0);
//! # Ok(())
//! # }
//! ```
//!
//! Each stage method consumes `self` and returns the next pipeline state
//! (or `Result` for fallible stages), carrying all previously computed
//! intermediates. The random stream travels with the stages, so driving
//! the pipeline by hand yields the same map as [`crate::generate_map`]
//! for the same seed.

use crate::connectivity::{SpadeTriangulator, Triangulator, extract_edges};
use crate::corridor::{CarveOutcome, carve_edges};
use crate::diagnostics::StageMetrics;
use crate::grid::Grid;
use crate::remediate::{CorridorContext, DeadEndRemediator, RemediationReport};
use crate::repair::{RepairReport, fix_double_wide};
use crate::rng::MapRng;
use crate::sampler::{SamplerParams, sample_region_points};
use crate::types::{Edge, GenerateError, GeneratedMap, GenerationConfig, Point};
use crate::waypoint::WaypointStyle;

/// Entry point for the staged pipeline.
pub struct Pipeline;

impl Pipeline {
    /// Create a pipeline for `config`. Nothing runs until
    /// [`Pending::seed`] is called.
    #[allow(clippy::new_ret_no_self)]
    pub const fn new(config: GenerationConfig) -> Pending {
        Pending { config }
    }
}

// ───────────────────────── Stage 0: Pending ──────────────────────────

/// Pipeline state before any work has happened.
#[must_use = "pipeline stages are consumed by advancing; call .seed() to continue"]
pub struct Pending {
    config: GenerationConfig,
}

impl Pending {
    /// The configuration the pipeline will run with.
    pub const fn config(&self) -> &GenerationConfig {
        &self.config
    }

    /// Validate the configuration, open the random stream and sample
    /// region seeds.
    ///
    /// # Errors
    ///
    /// Returns [`GenerateError::InvalidConfig`] if the configuration fails
    /// [`GenerationConfig::validate`].
    pub fn seed(self) -> Result<Seeded, GenerateError> {
        self.config.validate()?;
        let mut rng = MapRng::from_optional_seed(self.config.seed);
        let params = SamplerParams {
            dimensions: self.config.dimensions(),
            count: self.config.region_count,
            min_distance: self.config.min_region_distance,
            max_attempts: self.config.max_region_point_attempts,
        };
        let outcome = sample_region_points(&params, &mut rng);
        Ok(Seeded {
            config: self.config,
            rng,
            seeds: outcome.points,
            attempts: outcome.attempts,
        })
    }
}

// ───────────────────────── Stage 1: Seeded ───────────────────────────

/// Pipeline state after region seeds have been sampled.
#[must_use = "pipeline stages are consumed by advancing; call .connect() to continue"]
pub struct Seeded {
    config: GenerationConfig,
    rng: MapRng,
    seeds: Vec<Point>,
    attempts: usize,
}

impl Seeded {
    /// Accepted region seeds.
    #[must_use]
    pub fn seeds(&self) -> &[Point] {
        &self.seeds
    }

    /// Seed of the random stream in use.
    #[must_use]
    pub const fn rng_seed(&self) -> u64 {
        self.rng.seed()
    }

    /// Metrics for the sampling stage.
    pub const fn metrics(&self) -> StageMetrics {
        StageMetrics::Sampling {
            requested: self.config.region_count,
            accepted: self.seeds.len(),
            attempts: self.attempts,
        }
    }

    /// Triangulate the seeds with the default Delaunay backend.
    ///
    /// # Errors
    ///
    /// Returns [`GenerateError::NotEnoughPoints`] if fewer than 3 seeds
    /// were sampled.
    pub fn connect(self) -> Result<Connected, GenerateError> {
        self.connect_with(&SpadeTriangulator)
    }

    /// Triangulate the seeds with a caller-supplied backend.
    ///
    /// # Errors
    ///
    /// Returns [`GenerateError::NotEnoughPoints`] if fewer than 3 seeds
    /// were sampled.
    pub fn connect_with(self, triangulator: &dyn Triangulator) -> Result<Connected, GenerateError> {
        let edges = extract_edges(&self.seeds, triangulator)?;
        Ok(Connected {
            config: self.config,
            rng: self.rng,
            seeds: self.seeds,
            edges,
        })
    }
}

// ───────────────────────── Stage 2: Connected ────────────────────────

/// Pipeline state after connectivity extraction.
#[must_use = "pipeline stages are consumed by advancing; call .carve() to continue"]
pub struct Connected {
    config: GenerationConfig,
    rng: MapRng,
    seeds: Vec<Point>,
    edges: Vec<Edge>,
}

impl Connected {
    /// Unique edges, shortest first.
    #[must_use]
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Metrics for the connectivity stage.
    pub fn metrics(&self) -> StageMetrics {
        #[allow(clippy::cast_precision_loss)]
        let mean_edge_length = if self.edges.is_empty() {
            0.0
        } else {
            self.edges.iter().map(Edge::length).sum::<f64>() / self.edges.len() as f64
        };
        StageMetrics::Connectivity {
            seed_count: self.seeds.len(),
            edge_count: self.edges.len(),
            mean_edge_length,
        }
    }

    /// Route and carve one corridor per edge into a fresh background grid.
    pub fn carve(mut self) -> Carved {
        let mut grid = Grid::new(self.config.dimensions());
        let carves = carve_edges(
            &mut grid,
            &self.edges,
            &self.config.costs,
            &self.config.waypoints,
            &mut self.rng,
        );
        log::debug!(
            "carved {} of {} edges, {} corridor tiles",
            carves.iter().filter(|c| c.path_len > 0).count(),
            carves.len(),
            grid.corridor_count(),
        );
        Carved {
            config: self.config,
            rng: self.rng,
            seeds: self.seeds,
            edges: self.edges,
            grid,
            carves,
        }
    }
}

// ───────────────────────── Stage 3: Carved ───────────────────────────

/// Pipeline state after corridors are carved. The grid may still hold
/// 2×2 blocks.
#[must_use = "pipeline stages are consumed by advancing; call .repair() to continue"]
pub struct Carved {
    config: GenerationConfig,
    rng: MapRng,
    seeds: Vec<Point>,
    edges: Vec<Edge>,
    grid: Grid,
    carves: Vec<CarveOutcome>,
}

impl Carved {
    /// The carved grid.
    #[must_use]
    pub const fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Per-edge carve outcomes, parallel to the edges.
    #[must_use]
    pub fn carves(&self) -> &[CarveOutcome] {
        &self.carves
    }

    /// Metrics for the carving stage.
    pub fn metrics(&self) -> StageMetrics {
        let count_style =
            |style: WaypointStyle| self.carves.iter().filter(|c| c.style == style).count();
        StageMetrics::Carving {
            edge_count: self.carves.len(),
            carved: self.carves.iter().filter(|c| c.path_len > 0).count(),
            fallbacks: self.carves.iter().filter(|c| c.fell_back).count(),
            direct: count_style(WaypointStyle::Direct),
            l_shape: count_style(WaypointStyle::LShape),
            step: count_style(WaypointStyle::Step),
            zigzag: count_style(WaypointStyle::Zigzag),
            corridor_tiles: self.grid.corridor_count(),
        }
    }

    /// Remove 2×2 corridor blocks.
    pub fn repair(mut self) -> Repaired {
        let repair = fix_double_wide(&mut self.grid, self.config.max_repair_passes);
        log::debug!(
            "repair: {} passes, {} tiles reverted",
            repair.passes,
            repair.reverted
        );
        Repaired {
            config: self.config,
            rng: self.rng,
            seeds: self.seeds,
            edges: self.edges,
            grid: self.grid,
            carves: self.carves,
            repair,
        }
    }
}

// ───────────────────────── Stage 4: Repaired ─────────────────────────

/// Pipeline state after double-wide repair.
#[must_use = "pipeline stages are consumed by advancing; call .remediate() to continue"]
pub struct Repaired {
    config: GenerationConfig,
    rng: MapRng,
    seeds: Vec<Point>,
    edges: Vec<Edge>,
    grid: Grid,
    carves: Vec<CarveOutcome>,
    repair: RepairReport,
}

impl Repaired {
    /// The repaired grid.
    #[must_use]
    pub const fn grid(&self) -> &Grid {
        &self.grid
    }

    /// What the repair did.
    #[must_use]
    pub const fn repair_report(&self) -> &RepairReport {
        &self.repair
    }

    /// Metrics for the repair stage.
    pub const fn metrics(&self) -> StageMetrics {
        StageMetrics::Repair {
            passes: self.repair.passes,
            reverted: self.repair.reverted,
            remaining_blocks: self.repair.remaining_blocks,
        }
    }

    /// Run the configured dead-end remediator.
    pub fn remediate(self) -> Remediated {
        let kind = self.config.remediator;
        self.remediate_with(&kind)
    }

    /// Run a caller-supplied dead-end remediator.
    pub fn remediate_with(mut self, remediator: &dyn DeadEndRemediator) -> Remediated {
        let mut ctx = CorridorContext::new(
            &mut self.grid,
            self.config.costs,
            self.config.max_repair_passes,
        );
        let remediation = remediator.remediate(&mut ctx, &mut self.rng);
        Remediated {
            config: self.config,
            rng: self.rng,
            seeds: self.seeds,
            edges: self.edges,
            grid: self.grid,
            carves: self.carves,
            repair: self.repair,
            remediation,
        }
    }
}

// ───────────────────────── Stage 5: Remediated ───────────────────────

/// Final pipeline state.
#[must_use = "call .into_result() to obtain the generated map"]
pub struct Remediated {
    config: GenerationConfig,
    rng: MapRng,
    seeds: Vec<Point>,
    edges: Vec<Edge>,
    grid: Grid,
    carves: Vec<CarveOutcome>,
    repair: RepairReport,
    remediation: RemediationReport,
}

impl Remediated {
    /// The final grid.
    #[must_use]
    pub const fn grid(&self) -> &Grid {
        &self.grid
    }

    /// What the remediator did.
    #[must_use]
    pub const fn remediation_report(&self) -> &RemediationReport {
        &self.remediation
    }

    /// Metrics for the remediation stage.
    pub fn metrics(&self) -> StageMetrics {
        StageMetrics::Remediation {
            strategy: format!("{:?}", self.config.remediator),
            passes: self.remediation.passes,
            dead_ends_before: self.remediation.dead_ends_before,
            dead_ends_after: self.remediation.dead_ends_after,
            corridor_tiles: self.grid.corridor_count(),
        }
    }

    /// Finish the pipeline.
    pub fn into_result(self) -> GeneratedMap {
        GeneratedMap {
            grid: self.grid,
            seeds: self.seeds,
            edges: self.edges,
            carves: self.carves,
            repair: self.repair,
            remediation: self.remediation,
            seed: self.rng.seed(),
        }
    }
}
