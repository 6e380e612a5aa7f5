//! The tile grid: the single mutable field every stage writes into.
//!
//! Storage is row-major (`index = y * width + x`). Reads outside the grid
//! return [`Tile::Empty`] and writes outside the grid are ignored, so
//! neighbour scans near the border need no special casing.

use serde::{Deserialize, Serialize};

use crate::types::{Dimensions, GenerateError, Position};

/// A single grid cell.
///
/// The numeric codes are a stable legend shared with downstream
/// consumers and serialized as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
#[repr(u8)]
pub enum Tile {
    /// Empty, also returned for out-of-bounds reads.
    Empty = 0,
    /// A carved, walkable corridor cell.
    Corridor = 1,
    /// Uncarved background.
    #[default]
    Background = 2,
    /// Reserved marker for a region seed. Never placed by the generator.
    RegionCenter = 3,
}

impl Tile {
    /// The legend code for this tile.
    #[must_use]
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Returns `true` for [`Tile::Corridor`].
    #[must_use]
    pub const fn is_corridor(self) -> bool {
        matches!(self, Self::Corridor)
    }
}

impl From<Tile> for u8 {
    fn from(tile: Tile) -> Self {
        tile.code()
    }
}

impl TryFrom<u8> for Tile {
    type Error = GenerateError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Self::Empty),
            1 => Ok(Self::Corridor),
            2 => Ok(Self::Background),
            3 => Ok(Self::RegionCenter),
            other => Err(GenerateError::UnknownTile(other)),
        }
    }
}

/// A fixed-size 2D field of tiles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    width: u32,
    height: u32,
    tiles: Vec<Tile>,
}

impl Grid {
    /// Create a grid filled with [`Tile::Background`].
    #[must_use]
    pub fn new(dimensions: Dimensions) -> Self {
        Self::filled(dimensions, Tile::Background)
    }

    /// Create a grid with every cell set to `tile`.
    #[must_use]
    pub fn filled(dimensions: Dimensions, tile: Tile) -> Self {
        Self {
            width: dimensions.width,
            height: dimensions.height,
            tiles: vec![tile; dimensions.area()],
        }
    }

    /// Build a grid from row strings, top row first.
    ///
    /// `.` is a corridor, `#` background, `O` a region center and a space
    /// is empty. Rows shorter than the longest row are padded with
    /// background. Intended for tests and fixtures.
    ///
    /// # Errors
    ///
    /// Returns [`GenerateError::InvalidConfig`] on any other character.
    pub fn from_rows(rows: &[&str]) -> Result<Self, GenerateError> {
        let height = u32::try_from(rows.len())
            .map_err(|_| GenerateError::InvalidConfig("too many rows".to_string()))?;
        let width = rows.iter().map(|r| r.chars().count()).max().unwrap_or(0);
        let width = u32::try_from(width)
            .map_err(|_| GenerateError::InvalidConfig("row too long".to_string()))?;
        let mut grid = Self::new(Dimensions { width, height });

        for (row_idx, row) in rows.iter().enumerate() {
            // Top row is the highest y.
            #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
            let y = (rows.len() - 1 - row_idx) as i32;
            for (col, ch) in row.chars().enumerate() {
                let tile = match ch {
                    '.' => Tile::Corridor,
                    '#' => Tile::Background,
                    'O' => Tile::RegionCenter,
                    ' ' => Tile::Empty,
                    other => {
                        return Err(GenerateError::InvalidConfig(format!(
                            "unexpected grid character {other:?}"
                        )));
                    }
                };
                #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
                grid.set(Position::new(col as i32, y), tile);
            }
        }
        Ok(grid)
    }

    /// Grid width in tiles.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Grid height in tiles.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Grid dimensions.
    #[must_use]
    pub const fn dimensions(&self) -> Dimensions {
        Dimensions {
            width: self.width,
            height: self.height,
        }
    }

    /// Returns `true` if `pos` lies inside the grid.
    #[must_use]
    pub const fn in_bounds(&self, pos: Position) -> bool {
        self.dimensions().contains(pos)
    }

    /// Row-major index of an in-bounds position.
    #[allow(clippy::cast_sign_loss)]
    pub(crate) const fn index(&self, pos: Position) -> Option<usize> {
        if self.in_bounds(pos) {
            Some(pos.y as usize * self.width as usize + pos.x as usize)
        } else {
            None
        }
    }

    /// Position of a row-major index.
    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    pub(crate) const fn position(&self, index: usize) -> Position {
        let w = self.width as usize;
        Position::new((index % w) as i32, (index / w) as i32)
    }

    /// The tile at `pos`, or [`Tile::Empty`] when out of bounds.
    #[must_use]
    pub fn get(&self, pos: Position) -> Tile {
        self.index(pos).map_or(Tile::Empty, |i| self.tiles[i])
    }

    /// Set the tile at `pos`. Out-of-bounds writes are ignored.
    pub fn set(&mut self, pos: Position, tile: Tile) {
        if let Some(i) = self.index(pos) {
            self.tiles[i] = tile;
        }
    }

    /// Returns `true` if the tile at `pos` is a corridor.
    #[must_use]
    pub fn is_corridor(&self, pos: Position) -> bool {
        self.get(pos).is_corridor()
    }

    /// In-bounds orthogonal neighbours of `pos` in up, right, down, left order.
    pub fn neighbors(&self, pos: Position) -> impl Iterator<Item = Position> + '_ {
        pos.neighbors().into_iter().filter(|&n| self.in_bounds(n))
    }

    /// Number of orthogonal corridor neighbours of `pos`.
    #[must_use]
    pub fn corridor_neighbor_count(&self, pos: Position) -> usize {
        pos.neighbors()
            .into_iter()
            .filter(|&n| self.is_corridor(n))
            .count()
    }

    /// All tiles in row-major order.
    #[must_use]
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    /// Iterate every position in row-major order.
    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        (0..self.tiles.len()).map(|i| self.position(i))
    }

    /// Iterate every corridor position in row-major order.
    pub fn corridor_positions(&self) -> impl Iterator<Item = Position> + '_ {
        self.tiles
            .iter()
            .enumerate()
            .filter(|(_, t)| t.is_corridor())
            .map(|(i, _)| self.position(i))
    }

    /// Number of corridor tiles.
    #[must_use]
    pub fn corridor_count(&self) -> usize {
        self.tiles.iter().filter(|t| t.is_corridor()).count()
    }

    /// Corridor tiles with exactly one corridor neighbour.
    #[must_use]
    pub fn dead_ends(&self) -> Vec<Position> {
        self.corridor_positions()
            .filter(|&p| self.corridor_neighbor_count(p) == 1)
            .collect()
    }

    /// Tiles as legend codes in row-major order.
    #[must_use]
    pub fn to_codes(&self) -> Vec<u8> {
        self.tiles.iter().map(|t| t.code()).collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn dims(width: u32, height: u32) -> Dimensions {
        Dimensions { width, height }
    }

    #[test]
    fn tile_codes_are_stable() {
        assert_eq!(Tile::Empty.code(), 0);
        assert_eq!(Tile::Corridor.code(), 1);
        assert_eq!(Tile::Background.code(), 2);
        assert_eq!(Tile::RegionCenter.code(), 3);
    }

    #[test]
    fn tile_from_unknown_code_is_error() {
        assert_eq!(Tile::try_from(2).unwrap(), Tile::Background);
        assert_eq!(Tile::try_from(7), Err(GenerateError::UnknownTile(7)));
    }

    #[test]
    fn tile_serializes_as_code() {
        assert_eq!(serde_json::to_string(&Tile::Corridor).unwrap(), "1");
        let t: Tile = serde_json::from_str("3").unwrap();
        assert_eq!(t, Tile::RegionCenter);
        assert!(serde_json::from_str::<Tile>("4").is_err());
    }

    #[test]
    fn new_grid_is_background() {
        let grid = Grid::new(dims(3, 2));
        assert_eq!(grid.tiles().len(), 6);
        assert!(grid.tiles().iter().all(|&t| t == Tile::Background));
        assert_eq!(grid.corridor_count(), 0);
    }

    #[test]
    fn out_of_bounds_reads_empty_and_writes_ignored() {
        let mut grid = Grid::new(dims(3, 3));
        assert_eq!(grid.get(Position::new(-1, 0)), Tile::Empty);
        assert_eq!(grid.get(Position::new(3, 0)), Tile::Empty);
        grid.set(Position::new(5, 5), Tile::Corridor);
        assert_eq!(grid.corridor_count(), 0);
    }

    #[test]
    fn row_major_layout() {
        let mut grid = Grid::new(dims(4, 3));
        grid.set(Position::new(1, 2), Tile::Corridor);
        assert_eq!(grid.to_codes()[2 * 4 + 1], 1);
        assert_eq!(grid.position(9), Position::new(1, 2));
    }

    #[test]
    fn from_rows_puts_top_row_at_max_y() {
        let grid = Grid::from_rows(&["..#", "#O "]).unwrap();
        assert_eq!(grid.width(), 3);
        assert_eq!(grid.height(), 2);
        assert_eq!(grid.get(Position::new(0, 1)), Tile::Corridor);
        assert_eq!(grid.get(Position::new(1, 0)), Tile::RegionCenter);
        assert_eq!(grid.get(Position::new(2, 0)), Tile::Empty);
        assert!(Grid::from_rows(&["x"]).is_err());
    }

    #[test]
    fn neighbors_skip_out_of_bounds() {
        let grid = Grid::new(dims(3, 3));
        let corner: Vec<_> = grid.neighbors(Position::new(0, 0)).collect();
        assert_eq!(corner, vec![Position::new(0, 1), Position::new(1, 0)]);
        assert_eq!(grid.neighbors(Position::new(1, 1)).count(), 4);
    }

    #[test]
    fn dead_ends_of_a_line() {
        let grid = Grid::from_rows(&["#####", "#...#", "#####"]).unwrap();
        let ends = grid.dead_ends();
        assert_eq!(ends, vec![Position::new(1, 1), Position::new(3, 1)]);
    }
}
