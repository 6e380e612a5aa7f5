//! corridor-pipeline: Pure corridor map generation pipeline (sans-IO).
//!
//! Produces a rectangular tile grid of one-tile-wide corridors linking
//! randomly placed region seeds through:
//! seed sampling -> Delaunay connectivity -> waypoint styling ->
//! A* carving -> double-wide repair -> dead-end remediation.
//!
//! This crate has **no I/O dependencies** -- it operates on in-memory
//! values and returns structured data. Rendering to SVG or text lives in
//! `corridor-export`; the command line lives in `corridor-bench`.

pub mod astar;
pub mod connectivity;
pub mod corridor;
pub mod diagnostics;
pub mod grid;
pub mod outer;
pub mod pipeline;
pub mod remediate;
pub mod repair;
pub mod rng;
pub mod sampler;
pub mod types;
pub mod waypoint;

pub use astar::{CostModel, find_path_segment};
pub use connectivity::{SpadeTriangulator, Triangulator};
pub use diagnostics::{GenerationDiagnostics, generate_with_diagnostics};
pub use grid::{Grid, Tile};
pub use outer::{BorderSide, OuterTileInfo};
pub use pipeline::Pipeline;
pub use remediate::{DeadEndRemediator, RemediationContext, RemediatorKind};
pub use repair::RepairReport;
pub use types::{
    Dimensions, Edge, GenerateError, GeneratedMap, GenerationConfig, Point, Position,
};
pub use waypoint::{WaypointParams, WaypointStyle};

/// Generate a corridor map and return only the final grid.
///
/// # Pipeline steps
///
/// 1. Sample region seeds with a minimum spacing
/// 2. Delaunay-triangulate the seeds into unique edges, shortest first
/// 3. Route each edge through styled waypoints and carve it with A*
/// 4. Revert tiles until no 2×2 corridor block remains
/// 5. Remediate dead ends (pluggable strategy)
///
/// # Errors
///
/// Returns [`GenerateError::InvalidConfig`] if `config` fails validation.
/// Returns [`GenerateError::NotEnoughPoints`] if fewer than three seeds
/// could be placed.
pub fn generate(config: &GenerationConfig) -> Result<Grid, GenerateError> {
    generate_map(config).map(|map| map.grid)
}

/// Generate a corridor map, keeping every intermediate.
///
/// When `config.seed` is `None` a seed is drawn from entropy and recorded
/// in [`GeneratedMap::seed`], so any run can be replayed.
///
/// # Errors
///
/// Same as [`generate`].
pub fn generate_map(config: &GenerationConfig) -> Result<GeneratedMap, GenerateError> {
    let map = Pipeline::new(config.clone())
        .seed()?
        .connect()?
        .carve()
        .repair()
        .remediate()
        .into_result();
    log::debug!(
        "generated {}x{} map (seed {}): {} corridor tiles, {} dead ends",
        map.grid.width(),
        map.grid.height(),
        map.seed,
        map.grid.corridor_count(),
        map.grid.dead_ends().len(),
    );
    Ok(map)
}
