//! Border tile classification.
//!
//! Corridor tiles on the outer ring of the grid are candidate connection
//! points to neighbouring maps. A border corridor is *significant* when
//! it is an intersection, a corner, a terminal, or a two-neighbour tile
//! that turns or sits on a grid corner. Renderers draw significant tiles
//! darker.

use serde::{Deserialize, Serialize};

use crate::grid::Grid;
use crate::types::Position;

/// Which edge of the grid a border tile lies on.
///
/// Tiles on two edges (grid corners) resolve in the order north, south,
/// east, west.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BorderSide {
    /// Top row, `y == height - 1`.
    North,
    /// Bottom row, `y == 0`.
    South,
    /// Right column, `x == width - 1`.
    East,
    /// Left column, `x == 0`.
    West,
}

/// Classification of a significant border corridor tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OuterTileInfo {
    /// Tile position.
    pub position: Position,
    /// Border the tile lies on.
    pub side: BorderSide,
    /// Number of in-bounds corridor neighbours.
    pub corridor_neighbors: usize,
    /// More than two corridor neighbours.
    pub is_intersection: bool,
    /// Has both horizontal and vertical corridor neighbours, or two
    /// neighbours that turn or sit on a grid corner.
    pub is_corner: bool,
    /// Exactly one corridor neighbour.
    pub is_terminal: bool,
}

/// Neighbour offsets in left, right, down, up order.
const OFFSETS: [(i32, i32); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

fn is_border(grid: &Grid, pos: Position) -> bool {
    let max_x = i64::from(grid.width()) - 1;
    let max_y = i64::from(grid.height()) - 1;
    pos.x == 0 || pos.y == 0 || i64::from(pos.x) == max_x || i64::from(pos.y) == max_y
}

fn is_grid_corner(grid: &Grid, pos: Position) -> bool {
    let max_x = i64::from(grid.width()) - 1;
    let max_y = i64::from(grid.height()) - 1;
    (pos.x == 0 || i64::from(pos.x) == max_x) && (pos.y == 0 || i64::from(pos.y) == max_y)
}

fn side_of(grid: &Grid, pos: Position) -> BorderSide {
    if i64::from(pos.y) == i64::from(grid.height()) - 1 {
        BorderSide::North
    } else if pos.y == 0 {
        BorderSide::South
    } else if i64::from(pos.x) == i64::from(grid.width()) - 1 {
        BorderSide::East
    } else {
        BorderSide::West
    }
}

/// Classify the tile at `pos`; `None` unless it is a significant border
/// corridor.
#[must_use]
pub fn outer_tile_info(grid: &Grid, pos: Position) -> Option<OuterTileInfo> {
    if !grid.in_bounds(pos) || !grid.is_corridor(pos) || !is_border(grid, pos) {
        return None;
    }

    let links: Vec<(i32, i32)> = OFFSETS
        .into_iter()
        .filter(|&(dx, dy)| grid.is_corridor(pos.offset(dx, dy)))
        .collect();
    let horizontal = links.iter().any(|&(dx, _)| dx != 0);
    let vertical = links.iter().any(|&(_, dy)| dy != 0);

    let is_intersection = links.len() > 2;
    let is_corner = links.len() >= 2 && horizontal && vertical;
    let is_terminal = links.len() == 1;
    let is_special_pair = match links.as_slice() {
        [a, b] => is_grid_corner(grid, pos) || !(a.0 == -b.0 && a.1 == -b.1),
        _ => false,
    };

    (is_intersection || is_corner || is_terminal || is_special_pair).then(|| OuterTileInfo {
        position: pos,
        side: side_of(grid, pos),
        corridor_neighbors: links.len(),
        is_intersection,
        is_corner: is_corner || is_special_pair,
        is_terminal,
    })
}

/// Whether the tile at `pos` is a significant border corridor.
#[must_use]
pub fn is_significant(grid: &Grid, pos: Position) -> bool {
    outer_tile_info(grid, pos).is_some()
}

/// Every significant border corridor, scanned column by column.
#[must_use]
pub fn all_outer_tiles(grid: &Grid) -> Vec<OuterTileInfo> {
    let w = i32::try_from(grid.width()).unwrap_or(i32::MAX);
    let h = i32::try_from(grid.height()).unwrap_or(i32::MAX);
    let mut tiles = Vec::new();
    for x in 0..w {
        for y in 0..h {
            if let Some(info) = outer_tile_info(grid, Position::new(x, y)) {
                tiles.push(info);
            }
        }
    }
    tiles
}

/// Significant border corridors on one side.
#[must_use]
pub fn connection_points_on_side(grid: &Grid, side: BorderSide) -> Vec<OuterTileInfo> {
    all_outer_tiles(grid)
        .into_iter()
        .filter(|info| info.side == side)
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn interior_tiles_never_qualify() {
        let grid = Grid::from_rows(&["###", "#.#", "###"]).unwrap();
        assert!(!is_significant(&grid, Position::new(1, 1)));
    }

    #[test]
    fn background_border_tile_does_not_qualify() {
        let grid = Grid::from_rows(&["###", "#..", "###"]).unwrap();
        assert!(!is_significant(&grid, Position::new(0, 1)));
    }

    #[test]
    fn terminal_on_border() {
        // Corridor enters from the west edge.
        let grid = Grid::from_rows(&["####", "..##", "####"]).unwrap();
        let info = outer_tile_info(&grid, Position::new(0, 1)).unwrap();
        assert!(info.is_terminal);
        assert_eq!(info.side, BorderSide::West);
        assert_eq!(info.corridor_neighbors, 1);
    }

    #[test]
    fn straight_run_along_border_is_not_significant() {
        let grid = Grid::from_rows(&["#####", "#####", "....."]).unwrap();
        assert!(!is_significant(&grid, Position::new(2, 0)));
        // The ends are terminals.
        assert!(is_significant(&grid, Position::new(0, 0)));
        assert!(is_significant(&grid, Position::new(4, 0)));
    }

    #[test]
    fn turn_on_border_is_a_corner() {
        let grid = Grid::from_rows(&["#####", "##.##", "...##"]).unwrap();
        // (2,0) links left and up.
        let info = outer_tile_info(&grid, Position::new(2, 0)).unwrap();
        assert!(info.is_corner);
        assert!(!info.is_intersection);
    }

    #[test]
    fn junction_on_border_is_intersection() {
        let grid = Grid::from_rows(&["#####", "##.##", "....."]).unwrap();
        let info = outer_tile_info(&grid, Position::new(2, 0)).unwrap();
        assert!(info.is_intersection);
        assert_eq!(info.side, BorderSide::South);
    }

    #[test]
    fn side_priority_prefers_north_then_south() {
        let grid = Grid::from_rows(&["..", ".#"]).unwrap();
        let top_left = outer_tile_info(&grid, Position::new(0, 1)).unwrap();
        assert_eq!(top_left.side, BorderSide::North);
        assert!(top_left.is_corner);
    }

    #[test]
    fn connection_points_filter_by_side() {
        let grid = Grid::from_rows(&["##.##", "##.##", "##...", "#####"]).unwrap();
        let north = connection_points_on_side(&grid, BorderSide::North);
        assert_eq!(north.len(), 1);
        assert_eq!(north[0].position, Position::new(2, 3));
        let east = connection_points_on_side(&grid, BorderSide::East);
        assert_eq!(east.len(), 1);
        assert_eq!(east[0].position, Position::new(4, 1));
        assert!(connection_points_on_side(&grid, BorderSide::West).is_empty());
        assert_eq!(all_outer_tiles(&grid).len(), 2);
    }
}
