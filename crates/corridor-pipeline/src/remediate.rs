//! Dead-end remediation: the last pass over the carved grid.
//!
//! This module defines the [`RemediationContext`] capability trait, the
//! [`DeadEndRemediator`] trait for pluggable strategies, and the
//! [`RemediatorKind`] enum for runtime selection. Remediators see the
//! grid only through the context, which also lends them the corridor
//! search and the double-wide repair.
//!
//! The tiered strategy reduces dead ends in four tiers per pass:
//!
//! 1. extend each dead end straight outward, occasionally branching
//!    sideways, until it reaches a corridor;
//! 2. bridge L-shaped near misses with a single corner tile;
//! 3. prune short spurs;
//! 4. force a connection to the nearest corridor with A*.
//!
//! The double-wide repair runs after every tier, and every placement
//! checks the 2×2 guard first.

use serde::{Deserialize, Serialize};

use crate::astar::{CostModel, find_path_segment};
use crate::grid::{Grid, Tile};
use crate::repair::{RepairReport, fix_double_wide, would_create_double_wide_at};
use crate::rng::MapRng;
use crate::types::{Dimensions, Position};

// ------------------------------------------------------------------
// Capability context
// ------------------------------------------------------------------

/// What a remediator may do to the map.
pub trait RemediationContext {
    /// The tile value of a carved corridor.
    fn corridor_tile(&self) -> Tile {
        Tile::Corridor
    }

    /// The tile value of uncarved background.
    fn background_tile(&self) -> Tile {
        Tile::Background
    }

    /// Grid dimensions.
    fn dimensions(&self) -> Dimensions;

    /// Whether `pos` lies inside the grid.
    fn in_bounds(&self, pos: Position) -> bool {
        self.dimensions().contains(pos)
    }

    /// Orthogonal neighbours of `pos` (up, right, down, left), unfiltered.
    fn neighbors(&self, pos: Position) -> [Position; 4] {
        pos.neighbors()
    }

    /// The tile at `pos`.
    fn tile(&self, pos: Position) -> Tile;

    /// Overwrite the tile at `pos`.
    fn set_tile(&mut self, pos: Position, tile: Tile);

    /// Whether making `pos` a corridor would complete a 2×2 block.
    fn would_create_double_wide_at(&self, pos: Position) -> bool;

    /// Cheapest corridor route from `start` to `end`.
    fn find_path_segment(&self, start: Position, end: Position) -> Option<Vec<Position>>;

    /// Remove any 2×2 corridor blocks.
    fn fix_double_wide(&mut self) -> RepairReport;
}

/// [`RemediationContext`] over a live grid with the generator's costs.
#[derive(Debug)]
pub struct CorridorContext<'a> {
    grid: &'a mut Grid,
    costs: CostModel,
    max_repair_passes: usize,
}

impl<'a> CorridorContext<'a> {
    /// Wrap `grid` with the search costs and repair cap to lend out.
    pub const fn new(grid: &'a mut Grid, costs: CostModel, max_repair_passes: usize) -> Self {
        Self {
            grid,
            costs,
            max_repair_passes,
        }
    }
}

impl RemediationContext for CorridorContext<'_> {
    fn dimensions(&self) -> Dimensions {
        self.grid.dimensions()
    }

    fn tile(&self, pos: Position) -> Tile {
        self.grid.get(pos)
    }

    fn set_tile(&mut self, pos: Position, tile: Tile) {
        self.grid.set(pos, tile);
    }

    fn would_create_double_wide_at(&self, pos: Position) -> bool {
        would_create_double_wide_at(self.grid, pos)
    }

    fn find_path_segment(&self, start: Position, end: Position) -> Option<Vec<Position>> {
        find_path_segment(start, end, self.grid, &self.costs)
    }

    fn fix_double_wide(&mut self) -> RepairReport {
        fix_double_wide(self.grid, self.max_repair_passes)
    }
}

// ------------------------------------------------------------------
// Strategy selection
// ------------------------------------------------------------------

/// Selects which dead-end remediation strategy runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RemediatorKind {
    /// Leave the carved grid as it is.
    Disabled,

    /// Extend, bridge, prune and force-connect dead ends over repeated
    /// passes.
    #[default]
    Tiered,
}

/// Trait for dead-end remediation strategies.
pub trait DeadEndRemediator {
    /// Remediate dead ends through `ctx`, drawing randomness from `rng`.
    fn remediate(&self, ctx: &mut dyn RemediationContext, rng: &mut MapRng) -> RemediationReport;
}

impl DeadEndRemediator for RemediatorKind {
    fn remediate(&self, ctx: &mut dyn RemediationContext, rng: &mut MapRng) -> RemediationReport {
        match *self {
            Self::Disabled => {
                let dead = detect_dead_ends(ctx).len();
                RemediationReport {
                    dead_ends_before: dead,
                    dead_ends_after: dead,
                    ..RemediationReport::default()
                }
            }
            Self::Tiered => remediate_tiered(ctx, rng),
        }
    }
}

/// What a remediation run did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemediationReport {
    /// Full tier passes executed.
    pub passes: usize,
    /// Dead ends before the first pass.
    pub dead_ends_before: usize,
    /// Dead ends after the final cleanup.
    pub dead_ends_after: usize,
    /// Extensions that reached an existing corridor.
    pub extensions_connected: usize,
    /// Corridor tiles placed by straight extensions.
    pub extension_tiles: usize,
    /// Sideways branches committed.
    pub branches: usize,
    /// Corner tiles filled.
    pub bridges: usize,
    /// Spurs pruned.
    pub pruned_spurs: usize,
    /// Corridor tiles removed by pruning.
    pub pruned_tiles: usize,
    /// Forced connections that placed at least one tile.
    pub forced_connections: usize,
    /// Isolated corridor tiles removed at the end.
    pub isolated_removed: usize,
    /// Accumulated double-wide repair work between tiers.
    pub repair: RepairReport,
}

// ------------------------------------------------------------------
// Tiered strategy
// ------------------------------------------------------------------

/// Upper bound on full tier passes.
const MAX_PASSES: usize = 15;

/// Straight extension probe length.
const EXTENSION_LIMIT: usize = 50;

/// Per-step chance to try a sideways branch.
const BRANCH_PROBABILITY: f64 = 0.12;

/// Branch length budget is `BRANCH_STEPS_BASE + [0, BRANCH_STEPS_VARIATION)`.
const BRANCH_STEPS_BASE: usize = 20;
const BRANCH_STEPS_VARIATION: usize = 15;

/// A branch stopped by the 2×2 guard is kept if it is at least this long.
const BRANCH_SOFT_MIN_KEEP: usize = 2;

/// Spur lengths (junction excluded) that pruning removes, inclusive.
const PRUNE_MIN_LEN: usize = 1;
const PRUNE_MAX_LEN: usize = 5;

/// Raycast reach when looking for a forced-connection target.
const FORCE_SEARCH_RADIUS: usize = 140;

/// Cap on spur tracing.
const SPUR_TRACE_LIMIT: usize = 1000;

fn is_corridor(ctx: &dyn RemediationContext, pos: Position) -> bool {
    ctx.in_bounds(pos) && ctx.tile(pos) == ctx.corridor_tile()
}

fn corridor_neighbors(ctx: &dyn RemediationContext, pos: Position) -> Vec<Position> {
    ctx.neighbors(pos)
        .into_iter()
        .filter(|&n| is_corridor(ctx, n))
        .collect()
}

/// Every in-bounds position, column by column.
fn scan_order(ctx: &dyn RemediationContext) -> impl Iterator<Item = Position> + use<> {
    let d = ctx.dimensions();
    let w = i32::try_from(d.width).unwrap_or(i32::MAX);
    let h = i32::try_from(d.height).unwrap_or(i32::MAX);
    (0..w).flat_map(move |x| (0..h).map(move |y| Position::new(x, y)))
}

fn detect_dead_ends(ctx: &dyn RemediationContext) -> Vec<Position> {
    scan_order(ctx)
        .filter(|&p| is_corridor(ctx, p) && corridor_neighbors(ctx, p).len() == 1)
        .collect()
}

/// Unit step pointing away from a dead end's only corridor neighbour.
fn outward_direction(ctx: &dyn RemediationContext, tip: Position) -> Option<(i32, i32)> {
    match corridor_neighbors(ctx, tip).as_slice() {
        [n] => Some((tip.x - n.x, tip.y - n.y)),
        _ => None,
    }
}

fn remediate_tiered(ctx: &mut dyn RemediationContext, rng: &mut MapRng) -> RemediationReport {
    let mut report = RemediationReport {
        dead_ends_before: detect_dead_ends(ctx).len(),
        ..RemediationReport::default()
    };

    while report.passes < MAX_PASSES {
        let dead_ends = detect_dead_ends(ctx);
        if dead_ends.is_empty() {
            break;
        }
        report.passes += 1;
        let mut changed = false;

        for tip in dead_ends {
            changed |= extend_corridor(ctx, tip, rng, &mut report);
        }
        report.repair.accumulate(&ctx.fix_double_wide());

        let bridges = fill_corner_bridges(ctx);
        report.bridges += bridges;
        changed |= bridges > 0;
        report.repair.accumulate(&ctx.fix_double_wide());

        for tip in detect_dead_ends(ctx) {
            if let Some(len) = prune_short_spur(ctx, tip) {
                report.pruned_spurs += 1;
                report.pruned_tiles += len;
                changed = true;
            }
        }
        report.repair.accumulate(&ctx.fix_double_wide());

        for tip in detect_dead_ends(ctx) {
            if force_connect(ctx, tip) {
                report.forced_connections += 1;
                changed = true;
            }
        }
        report.repair.accumulate(&ctx.fix_double_wide());

        log::debug!(
            "remediation pass {}: {} dead ends remain",
            report.passes,
            detect_dead_ends(ctx).len(),
        );

        if !changed {
            break;
        }
    }

    report.isolated_removed = remove_isolated(ctx);
    report.dead_ends_after = detect_dead_ends(ctx).len();
    log::debug!(
        "remediation: {} -> {} dead ends in {} passes",
        report.dead_ends_before,
        report.dead_ends_after,
        report.passes,
    );
    report
}

/// Tier 1: walk outward from `tip`, staging straight tiles and sometimes
/// branching sideways. Staged tiles are committed whether or not a
/// corridor was reached. Returns `true` on a connection.
fn extend_corridor(
    ctx: &mut dyn RemediationContext,
    tip: Position,
    rng: &mut MapRng,
    report: &mut RemediationReport,
) -> bool {
    let Some((dx, dy)) = outward_direction(ctx, tip) else {
        return false;
    };

    let mut staged = Vec::new();
    let mut connected = false;
    let mut current = tip.offset(dx, dy);

    for _ in 0..EXTENSION_LIMIT {
        if !ctx.in_bounds(current) {
            break;
        }
        if is_corridor(ctx, current) {
            connected = true;
            break;
        }
        if ctx.would_create_double_wide_at(current) {
            break;
        }
        staged.push(current);

        if !connected && rng.chance(BRANCH_PROBABILITY) {
            let budget = BRANCH_STEPS_BASE + rng.below(BRANCH_STEPS_VARIATION);
            if try_branch(ctx, current, (dx, dy), budget, rng) {
                report.branches += 1;
                connected = true;
            }
        }

        current = current.offset(dx, dy);
    }

    let corridor = ctx.corridor_tile();
    for &p in &staged {
        ctx.set_tile(p, corridor);
    }
    report.extension_tiles += staged.len();
    if connected {
        report.extensions_connected += 1;
    }
    connected
}

/// Try both sides perpendicular to `forward` (in random order) for a
/// branch from `origin` that reaches a corridor.
fn try_branch(
    ctx: &mut dyn RemediationContext,
    origin: Position,
    forward: (i32, i32),
    budget: usize,
    rng: &mut MapRng,
) -> bool {
    let mut sides = if forward.0 == 0 {
        [(1, 0), (-1, 0)]
    } else {
        [(0, 1), (0, -1)]
    };
    if rng.chance(0.5) {
        sides.reverse();
    }

    for (sx, sy) in sides {
        let mut branch = Vec::new();
        let mut current = origin.offset(sx, sy);
        for _ in 0..budget {
            if !ctx.in_bounds(current) {
                break;
            }
            let reached = is_corridor(ctx, current);
            let blocked = !reached && ctx.would_create_double_wide_at(current);
            if reached || (blocked && branch.len() >= BRANCH_SOFT_MIN_KEEP) {
                let corridor = ctx.corridor_tile();
                for &p in &branch {
                    ctx.set_tile(p, corridor);
                }
                return true;
            }
            if blocked {
                break;
            }
            branch.push(current);
            current = current.offset(sx, sy);
        }
    }
    false
}

/// Tier 2 bridge: fill background tiles touching exactly two corridors,
/// one horizontal and one vertical, unless that completes a 2×2 block.
fn fill_corner_bridges(ctx: &mut dyn RemediationContext) -> usize {
    let background = ctx.background_tile();
    let corridor = ctx.corridor_tile();
    let mut filled = 0;

    let positions: Vec<Position> = scan_order(ctx).collect();
    for pos in positions {
        if ctx.tile(pos) != background {
            continue;
        }
        let links = corridor_neighbors(ctx, pos);
        let horizontal = links.iter().any(|n| n.y == pos.y);
        let vertical = links.iter().any(|n| n.x == pos.x);
        if links.len() == 2 && horizontal && vertical && !ctx.would_create_double_wide_at(pos) {
            ctx.set_tile(pos, corridor);
            filled += 1;
        }
    }
    filled
}

/// Tier 3: trace the spur from `tip` to its junction (excluded) and revert
/// it if its length is within bounds. Returns the pruned length.
fn prune_short_spur(ctx: &mut dyn RemediationContext, tip: Position) -> Option<usize> {
    let inward = corridor_neighbors(ctx, tip);
    let [first] = inward[..] else {
        return None;
    };

    let mut spur = vec![tip];
    let mut prev = tip;
    let mut current = first;
    loop {
        let links = corridor_neighbors(ctx, current);
        let [a, b] = links[..] else {
            break;
        };
        spur.push(current);
        let next = if a == prev { b } else { a };
        prev = current;
        current = next;
        if !ctx.in_bounds(current) || spur.len() > SPUR_TRACE_LIMIT {
            break;
        }
    }

    if !(PRUNE_MIN_LEN..=PRUNE_MAX_LEN).contains(&spur.len()) {
        return None;
    }
    let background = ctx.background_tile();
    for &p in &spur {
        ctx.set_tile(p, background);
    }
    Some(spur.len())
}

/// Tier 4: connect `tip` to the nearest corridor found by raycasting away
/// from its neighbour, or anywhere on the grid as a fallback. Tiles are
/// placed along the route until one would complete a 2×2 block. Returns
/// `true` if at least one tile was placed.
fn force_connect(ctx: &mut dyn RemediationContext, tip: Position) -> bool {
    let links = corridor_neighbors(ctx, tip);
    let [neighbor] = links[..] else {
        return false;
    };
    let back = (neighbor.x - tip.x, neighbor.y - tip.y);

    let mut best: Option<(u32, Position)> = None;
    for dir in [(1, 0), (-1, 0), (0, 1), (0, -1)] {
        if dir == back {
            continue;
        }
        let mut current = tip.offset(dir.0, dir.1);
        for _ in 0..FORCE_SEARCH_RADIUS {
            if !ctx.in_bounds(current) {
                break;
            }
            if is_corridor(ctx, current) {
                let dist = tip.manhattan(current);
                if best.is_none_or(|(d, _)| dist < d) {
                    best = Some((dist, current));
                }
                break;
            }
            current = current.offset(dir.0, dir.1);
        }
    }

    if best.is_none() {
        for pos in scan_order(ctx) {
            if pos == tip || pos == neighbor || !is_corridor(ctx, pos) {
                continue;
            }
            let dist = tip.manhattan(pos);
            if best.is_none_or(|(d, _)| dist < d) {
                best = Some((dist, pos));
            }
        }
    }

    let Some((_, target)) = best else {
        return false;
    };
    let Some(path) = ctx.find_path_segment(tip, target) else {
        return false;
    };

    let corridor = ctx.corridor_tile();
    let mut placed = 0;
    for &p in path.iter().skip(1) {
        if ctx.would_create_double_wide_at(p) {
            break;
        }
        ctx.set_tile(p, corridor);
        placed += 1;
    }
    placed > 0
}

/// Revert corridor tiles with no corridor neighbour.
fn remove_isolated(ctx: &mut dyn RemediationContext) -> usize {
    let background = ctx.background_tile();
    let positions: Vec<Position> = scan_order(ctx).collect();
    let mut removed = 0;
    for pos in positions {
        if is_corridor(ctx, pos) && corridor_neighbors(ctx, pos).is_empty() {
            ctx.set_tile(pos, background);
            removed += 1;
        }
    }
    removed
}
