//! Cost-aware A* search over the 4-connected tile grid.
//!
//! Stepping onto an existing corridor is cheaper than breaking new
//! ground, and turning costs a small penalty, so corridors prefer to
//! merge and to run straight.
//!
//! Search states are keyed by (position, incoming direction). The turn
//! penalty depends on how a tile was entered, so keying on position
//! alone would let a cheaper-but-misaligned arrival shadow the optimal
//! one. Nodes live in a dense arena and refer to their parent by index.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use serde::{Deserialize, Serialize};

use crate::grid::Grid;
use crate::types::Position;

/// Step costs for the corridor search.
///
/// Both step costs must be at least 1 for the Manhattan heuristic to stay
/// admissible; [`GenerationConfig::validate`](crate::GenerationConfig::validate)
/// enforces this.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CostModel {
    /// Cost of stepping onto a non-corridor tile.
    pub base_tile_cost: f64,
    /// Cost of stepping onto an existing corridor tile.
    pub existing_corridor_cost: f64,
    /// Added when a step changes direction relative to the previous one.
    pub direction_change_penalty: f64,
}

impl CostModel {
    /// Default cost of new ground.
    pub const DEFAULT_BASE_TILE_COST: f64 = 1.2;
    /// Default cost of reusing a corridor.
    pub const DEFAULT_EXISTING_CORRIDOR_COST: f64 = 1.0;
    /// Default turn penalty.
    pub const DEFAULT_DIRECTION_CHANGE_PENALTY: f64 = 0.1;

    /// Cost of the step `from -> to` when the previous step went `incoming`.
    #[must_use]
    pub fn step_cost(
        &self,
        grid: &Grid,
        incoming: Option<Direction>,
        direction: Direction,
        to: Position,
    ) -> f64 {
        let tile = if grid.is_corridor(to) {
            self.existing_corridor_cost
        } else {
            self.base_tile_cost
        };
        match incoming {
            Some(prev) if prev != direction => tile + self.direction_change_penalty,
            _ => tile,
        }
    }
}

impl Default for CostModel {
    fn default() -> Self {
        Self {
            base_tile_cost: Self::DEFAULT_BASE_TILE_COST,
            existing_corridor_cost: Self::DEFAULT_EXISTING_CORRIDOR_COST,
            direction_change_penalty: Self::DEFAULT_DIRECTION_CHANGE_PENALTY,
        }
    }
}

/// One of the four orthogonal step directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// `+y`
    Up,
    /// `+x`
    Right,
    /// `-y`
    Down,
    /// `-x`
    Left,
}

impl Direction {
    /// All directions in expansion order.
    pub const ALL: [Self; 4] = [Self::Up, Self::Right, Self::Down, Self::Left];

    /// Unit offset of this direction.
    #[must_use]
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Self::Up => (0, 1),
            Self::Right => (1, 0),
            Self::Down => (0, -1),
            Self::Left => (-1, 0),
        }
    }

    /// The direction pointing the other way.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Right => Self::Left,
            Self::Down => Self::Up,
            Self::Left => Self::Right,
        }
    }

    /// The direction of a single orthogonal step `from -> to`, if any.
    #[must_use]
    pub const fn between(from: Position, to: Position) -> Option<Self> {
        match (to.x - from.x, to.y - from.y) {
            (0, 1) => Some(Self::Up),
            (1, 0) => Some(Self::Right),
            (0, -1) => Some(Self::Down),
            (-1, 0) => Some(Self::Left),
            _ => None,
        }
    }

    const fn slot(self) -> usize {
        self as usize
    }
}

/// Arena slots per cell: one per incoming direction plus the start state.
const SLOTS_PER_CELL: usize = 5;
const START_SLOT: usize = 4;

/// A node in the per-search arena.
#[derive(Debug, Clone, Copy)]
struct SearchNode {
    pos: Position,
    incoming: Option<Direction>,
    parent: Option<usize>,
    g: f64,
    f: f64,
}

/// Open-set entry. Ordered so the max-heap pops the lowest `f`, then the
/// earliest insertion.
#[derive(Debug, Clone, Copy)]
struct OpenEntry {
    f: f64,
    seq: u64,
    node: usize,
}

impl PartialEq for OpenEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OpenEntry {}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .f
            .total_cmp(&self.f)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Find the cheapest 4-connected path from `start` to `end`, both included.
///
/// Returns `None` if either endpoint is outside the grid or the open set
/// is exhausted. `start == end` yields `[start]`. The first step of a
/// search pays no turn penalty.
#[must_use]
pub fn find_path_segment(
    start: Position,
    end: Position,
    grid: &Grid,
    costs: &CostModel,
) -> Option<Vec<Position>> {
    let start_idx = grid.index(start)?;
    grid.index(end)?;
    if start == end {
        return Some(vec![start]);
    }

    let state_count = grid.dimensions().area() * SLOTS_PER_CELL;
    let mut node_of_state: Vec<Option<usize>> = vec![None; state_count];
    let mut closed = vec![false; state_count];
    let mut nodes: Vec<SearchNode> = Vec::new();
    let mut open = BinaryHeap::new();
    let mut seq = 0_u64;

    let h0 = f64::from(start.manhattan(end));
    nodes.push(SearchNode {
        pos: start,
        incoming: None,
        parent: None,
        g: 0.0,
        f: h0,
    });
    node_of_state[start_idx * SLOTS_PER_CELL + START_SLOT] = Some(0);
    open.push(OpenEntry {
        f: h0,
        seq,
        node: 0,
    });

    while let Some(entry) = open.pop() {
        let current = nodes[entry.node];
        // Superseded by a cheaper relaxation.
        if entry.f > current.f {
            continue;
        }
        let Some(cell) = grid.index(current.pos) else {
            continue;
        };
        let state = cell * SLOTS_PER_CELL + current.incoming.map_or(START_SLOT, Direction::slot);
        if closed[state] {
            continue;
        }
        closed[state] = true;

        if current.pos == end {
            return Some(reconstruct(&nodes, entry.node));
        }

        for direction in Direction::ALL {
            let (dx, dy) = direction.delta();
            let next = current.pos.offset(dx, dy);
            let Some(next_cell) = grid.index(next) else {
                continue;
            };
            let next_state = next_cell * SLOTS_PER_CELL + direction.slot();
            if closed[next_state] {
                continue;
            }

            let g = current.g + costs.step_cost(grid, current.incoming, direction, next);
            let f = g + f64::from(next.manhattan(end));

            let node = match node_of_state[next_state] {
                Some(existing) if nodes[existing].g <= g => continue,
                Some(existing) => {
                    let n = &mut nodes[existing];
                    n.g = g;
                    n.f = f;
                    n.parent = Some(entry.node);
                    existing
                }
                None => {
                    nodes.push(SearchNode {
                        pos: next,
                        incoming: Some(direction),
                        parent: Some(entry.node),
                        g,
                        f,
                    });
                    let idx = nodes.len() - 1;
                    node_of_state[next_state] = Some(idx);
                    idx
                }
            };

            seq += 1;
            open.push(OpenEntry { f, seq, node });
        }
    }

    None
}

/// Walk parent links back from `last` and return the path start-first.
fn reconstruct(nodes: &[SearchNode], last: usize) -> Vec<Position> {
    let mut path = Vec::new();
    let mut cursor = Some(last);
    while let Some(idx) = cursor {
        path.push(nodes[idx].pos);
        cursor = nodes[idx].parent;
    }
    path.reverse();
    path
}

/// Total cost of walking `path` under `costs` on `grid`.
///
/// Returns `None` if consecutive positions are not orthogonally adjacent.
#[must_use]
pub fn path_cost(path: &[Position], grid: &Grid, costs: &CostModel) -> Option<f64> {
    let mut total = 0.0;
    let mut incoming = None;
    for pair in path.windows(2) {
        let direction = Direction::between(pair[0], pair[1])?;
        total += costs.step_cost(grid, incoming, direction, pair[1]);
        incoming = Some(direction);
    }
    Some(total)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::grid::Tile;
    use crate::types::Dimensions;

    fn empty(width: u32, height: u32) -> Grid {
        Grid::new(Dimensions { width, height })
    }

    fn assert_connected(path: &[Position]) {
        for pair in path.windows(2) {
            assert_eq!(pair[0].manhattan(pair[1]), 1, "gap in {path:?}");
        }
    }

    #[test]
    fn start_equals_end() {
        let grid = empty(5, 5);
        let p = Position::new(2, 2);
        assert_eq!(
            find_path_segment(p, p, &grid, &CostModel::default()),
            Some(vec![p])
        );
    }

    #[test]
    fn out_of_bounds_endpoints_return_none() {
        let grid = empty(5, 5);
        let costs = CostModel::default();
        let off_grid = Position::new(5, 0);
        assert!(find_path_segment(Position::new(0, 0), off_grid, &grid, &costs).is_none());
        let negative = Position::new(-1, 0);
        assert!(find_path_segment(negative, Position::new(2, 2), &grid, &costs).is_none());
    }

    #[test]
    fn distance_three_is_four_positions() {
        let grid = empty(10, 10);
        let path = find_path_segment(
            Position::new(1, 1),
            Position::new(4, 1),
            &grid,
            &CostModel::default(),
        )
        .unwrap();
        assert_eq!(path.len(), 4);
        assert_eq!(path[0], Position::new(1, 1));
        assert_eq!(path[3], Position::new(4, 1));
        assert_connected(&path);
    }

    #[test]
    fn straight_line_has_no_turns() {
        let grid = empty(10, 10);
        let costs = CostModel::default();
        let path =
            find_path_segment(Position::new(0, 5), Position::new(9, 5), &grid, &costs).unwrap();
        assert!(path.iter().all(|p| p.y == 5));
        let cost = path_cost(&path, &grid, &costs).unwrap();
        assert!((cost - 9.0 * 1.2).abs() < 1e-9);
    }

    #[test]
    fn diagonal_takes_a_single_turn() {
        let grid = empty(10, 10);
        let costs = CostModel::default();
        let path =
            find_path_segment(Position::new(0, 0), Position::new(4, 4), &grid, &costs).unwrap();
        let cost = path_cost(&path, &grid, &costs).unwrap();
        assert!((cost - (8.0 * 1.2 + 0.1)).abs() < 1e-9, "cost {cost}");
    }

    #[test]
    fn prefers_existing_corridor() {
        // Detour along a corridor is cheaper than breaking new ground.
        let grid = Grid::from_rows(&[
            "..........",
            ".########.",
            "##########",
        ])
        .unwrap();
        let costs = CostModel {
            base_tile_cost: 3.0,
            ..CostModel::default()
        };
        let path =
            find_path_segment(Position::new(0, 1), Position::new(9, 1), &grid, &costs).unwrap();
        assert!(path.iter().any(|p| p.y == 2));
        assert_connected(&path);
    }

    #[test]
    fn single_column_grid_is_traversable() {
        // Every in-bounds tile is passable; tile type only changes cost.
        let grid = empty(1, 5);
        let path = find_path_segment(
            Position::new(0, 0),
            Position::new(0, 4),
            &grid,
            &CostModel::default(),
        )
        .unwrap();
        assert_eq!(path.len(), 5);
    }

    #[test]
    fn deterministic() {
        let grid = empty(20, 20);
        let costs = CostModel::default();
        let a = find_path_segment(Position::new(2, 3), Position::new(17, 12), &grid, &costs);
        let b = find_path_segment(Position::new(2, 3), Position::new(17, 12), &grid, &costs);
        assert_eq!(a, b);
    }

    #[test]
    fn path_cost_rejects_gaps() {
        let grid = empty(5, 5);
        let path = [Position::new(0, 0), Position::new(2, 0)];
        assert!(path_cost(&path, &grid, &CostModel::default()).is_none());
    }

    #[test]
    fn step_cost_components() {
        let mut grid = empty(3, 3);
        grid.set(Position::new(1, 1), Tile::Corridor);
        let costs = CostModel::default();
        let to = Position::new(1, 1);
        assert!((costs.step_cost(&grid, None, Direction::Up, to) - 1.0).abs() < 1e-12);
        let turn = costs.step_cost(&grid, Some(Direction::Right), Direction::Up, to);
        assert!((turn - 1.1).abs() < 1e-12);
        let bg = Position::new(0, 0);
        let background = costs.step_cost(&grid, Some(Direction::Up), Direction::Up, bg);
        assert!((background - 1.2).abs() < 1e-12);
    }

    #[test]
    fn direction_helpers() {
        for d in Direction::ALL {
            assert_eq!(d.opposite().opposite(), d);
            let (dx, dy) = d.delta();
            assert_eq!(
                Direction::between(Position::new(0, 0), Position::new(dx, dy)),
                Some(d)
            );
        }
    }
}
