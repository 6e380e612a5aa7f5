//! Double-wide repair: remove 2×2 corridor blocks.
//!
//! Corridors are one tile wide. Overlapping carves can leave 2×2 squares
//! of corridor; each pass scans every window and reverts one tile per
//! block back to background, choosing the tile whose removal is least
//! likely to cut a corridor. The disconnect check is a local heuristic,
//! not a graph connectivity test.

use serde::{Deserialize, Serialize};

use crate::grid::{Grid, Tile};
use crate::types::Position;

/// A 2×2 corridor block, listed as `(x, y)`, `(x+1, y)`, `(x, y+1)`,
/// `(x+1, y+1)` for lower-left corner `(x, y)`.
pub type Block = [Position; 4];

/// What a repair run did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepairReport {
    /// Passes executed.
    pub passes: usize,
    /// Tiles reverted to background.
    pub reverted: usize,
    /// Blocks still present when the run stopped.
    pub remaining_blocks: usize,
    /// `true` if the pass cap was reached with blocks remaining.
    pub cap_exhausted: bool,
}

impl RepairReport {
    /// Fold a later run's report into this one.
    pub const fn accumulate(&mut self, later: &Self) {
        self.passes += later.passes;
        self.reverted += later.reverted;
        self.remaining_blocks = later.remaining_blocks;
        self.cap_exhausted = later.cap_exhausted;
    }
}

/// The block whose lower-left corner is `corner`.
#[must_use]
pub const fn block_at(corner: Position) -> Block {
    [
        corner,
        corner.offset(1, 0),
        corner.offset(0, 1),
        corner.offset(1, 1),
    ]
}

fn is_block(grid: &Grid, block: &Block) -> bool {
    block.iter().all(|&p| grid.is_corridor(p))
}

/// All 2×2 corridor blocks, scanned column by column (x outer, y inner).
#[must_use]
pub fn find_double_wide_blocks(grid: &Grid) -> Vec<Block> {
    let w = i32::try_from(grid.width()).unwrap_or(i32::MAX);
    let h = i32::try_from(grid.height()).unwrap_or(i32::MAX);
    let mut blocks = Vec::new();
    for x in 0..w - 1 {
        for y in 0..h - 1 {
            let block = block_at(Position::new(x, y));
            if is_block(grid, &block) {
                blocks.push(block);
            }
        }
    }
    blocks
}

/// Whether making `pos` a corridor would complete a 2×2 corridor block.
///
/// Only windows lying fully inside the grid count.
#[must_use]
pub fn would_create_double_wide_at(grid: &Grid, pos: Position) -> bool {
    [(-1, -1), (-1, 0), (0, -1), (0, 0)].into_iter().any(|(ox, oy)| {
        block_at(pos.offset(ox, oy))
            .iter()
            .all(|&c| grid.in_bounds(c) && (c == pos || grid.is_corridor(c)))
    })
}

/// Corridor neighbours of `pos` that are not part of `block`.
fn external_neighbors(grid: &Grid, pos: Position, block: &Block) -> Vec<Position> {
    pos.neighbors()
        .into_iter()
        .filter(|n| !block.contains(n) && grid.is_corridor(*n))
        .collect()
}

/// Heuristic: removing `pos` likely severs a corridor.
///
/// True for three or more external connections, or exactly two on
/// opposite sides (a straight pass-through).
fn would_disconnect(grid: &Grid, pos: Position, block: &Block) -> bool {
    let external = external_neighbors(grid, pos, block);
    match external.as_slice() {
        [a, b] => {
            let (dx1, dy1) = (a.x - pos.x, a.y - pos.y);
            let (dx2, dy2) = (b.x - pos.x, b.y - pos.y);
            dx1 == -dx2 && dy1 == -dy2
        }
        more => more.len() >= 3,
    }
}

/// Revert one tile of `block`. Returns the reverted position.
fn fix_block(grid: &mut Grid, block: &Block) -> Option<Position> {
    let mut ranked: Vec<(Position, usize)> = block
        .iter()
        .map(|&p| (p, external_neighbors(grid, p, block).len()))
        .collect();
    // Stable: ties keep block order.
    ranked.sort_by_key(|&(_, degree)| degree);

    let chosen = ranked
        .iter()
        .find(|(p, _)| !would_disconnect(grid, *p, block))
        .or_else(|| ranked.first())
        .map(|&(p, _)| p)?;

    grid.set(chosen, Tile::Background);
    Some(chosen)
}

/// Repeatedly remove 2×2 corridor blocks until none remain or
/// `max_passes` passes have run.
///
/// Blocks found at the start of a pass are skipped if an earlier fix in
/// the same pass already broke them up.
pub fn fix_double_wide(grid: &mut Grid, max_passes: usize) -> RepairReport {
    let mut report = RepairReport::default();

    while report.passes < max_passes {
        let blocks = find_double_wide_blocks(grid);
        if blocks.is_empty() {
            break;
        }
        report.passes += 1;

        for block in &blocks {
            if is_block(grid, block) && fix_block(grid, block).is_some() {
                report.reverted += 1;
            }
        }
    }

    report.remaining_blocks = find_double_wide_blocks(grid).len();
    report.cap_exhausted = report.remaining_blocks > 0;
    if report.cap_exhausted {
        log::warn!(
            "double-wide repair stopped after {} passes with {} blocks remaining",
            report.passes,
            report.remaining_blocks,
        );
    }
    report
}
