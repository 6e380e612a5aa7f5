//! Multi-segment corridor routing and carving.
//!
//! Each edge is routed through its waypoints one A* segment at a time.
//! If any segment fails the waypoints are abandoned and a single direct
//! search is retried. All segments of an edge read the grid as it was
//! before that edge was carved.

use serde::{Deserialize, Serialize};

use crate::astar::{CostModel, find_path_segment};
use crate::grid::{Grid, Tile};
use crate::rng::MapRng;
use crate::types::{Edge, Position};
use crate::waypoint::{WaypointParams, WaypointStyle, Waypoints, plan_waypoints};

/// A routed (not yet carved) corridor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorridorRoute {
    /// Waypoints that were planned for the route.
    pub waypoints: Waypoints,
    /// The full position sequence, or `None` if even the direct search failed.
    pub path: Option<Vec<Position>>,
    /// `true` if the waypoint route failed and the direct search was used.
    pub fell_back: bool,
}

/// What happened when carving one edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CarveOutcome {
    /// Style of the planned waypoints.
    pub style: WaypointStyle,
    /// Whether the direct fallback search was used.
    pub fell_back: bool,
    /// Positions written to the grid; 0 when the edge was skipped.
    pub path_len: usize,
}

/// Route a corridor from `start` to `end` without touching the grid.
#[must_use]
pub fn route_corridor(
    start: Position,
    end: Position,
    grid: &Grid,
    costs: &CostModel,
    params: &WaypointParams,
    rng: &mut MapRng,
) -> CorridorRoute {
    let waypoints = plan_waypoints(start, end, grid.dimensions(), params, rng);

    if let Some(path) = route_through(start, end, &waypoints.points, grid, costs) {
        return CorridorRoute {
            waypoints,
            path: Some(path),
            fell_back: false,
        };
    }

    CorridorRoute {
        waypoints,
        path: find_path_segment(start, end, grid, costs),
        fell_back: true,
    }
}

/// Chain one search per consecutive target, dropping the shared endpoint
/// between segments. `None` if any segment fails.
fn route_through(
    start: Position,
    end: Position,
    waypoints: &[Position],
    grid: &Grid,
    costs: &CostModel,
) -> Option<Vec<Position>> {
    let mut full: Vec<Position> = Vec::new();
    let mut from = start;

    for &target in waypoints.iter().chain(std::iter::once(&end)) {
        let segment = find_path_segment(from, target, grid, costs)?;
        let skip = usize::from(full.last().is_some_and(|last| segment.first() == Some(last)));
        full.extend_from_slice(&segment[skip..]);
        from = target;
    }

    (!full.is_empty()).then_some(full)
}

/// Route and carve one corridor per edge, in the order given.
///
/// Edge endpoints are floored to grid cells. Edges for which no path
/// exists are skipped and reported with `path_len == 0`.
pub fn carve_edges(
    grid: &mut Grid,
    edges: &[Edge],
    costs: &CostModel,
    params: &WaypointParams,
    rng: &mut MapRng,
) -> Vec<CarveOutcome> {
    edges
        .iter()
        .map(|edge| {
            let start = edge.p.to_position();
            let end = edge.q.to_position();
            let route = route_corridor(start, end, grid, costs, params, rng);
            let path_len = route.path.as_ref().map_or(0, |path| {
                for &pos in path {
                    grid.set(pos, Tile::Corridor);
                }
                path.len()
            });

            log::trace!(
                "carve ({}, {}) -> ({}, {}): {} waypoints={} fallback={} len={path_len}",
                start.x,
                start.y,
                end.x,
                end.y,
                route.waypoints.style.name(),
                route.waypoints.points.len(),
                route.fell_back,
            );

            CarveOutcome {
                style: route.waypoints.style,
                fell_back: route.fell_back,
                path_len,
            }
        })
        .collect()
}
