//! ASCII export serializer.
//!
//! One character per tile, top row first: `.` corridor, `#` background,
//! `O` region center, space for empty. Every row ends with a newline.
//! The output reads back through [`Grid::from_rows`].

use corridor_pipeline::{Grid, Position, Tile};

/// Legend character for a tile.
#[must_use]
pub const fn tile_char(tile: Tile) -> char {
    match tile {
        Tile::Empty => ' ',
        Tile::Corridor => '.',
        Tile::Background => '#',
        Tile::RegionCenter => 'O',
    }
}

/// Render a grid as ASCII text.
#[must_use]
pub fn to_ascii(grid: &Grid) -> String {
    let w = i32::try_from(grid.width()).unwrap_or(i32::MAX);
    let h = i32::try_from(grid.height()).unwrap_or(i32::MAX);
    let capacity = (grid.width() as usize + 1) * grid.height() as usize;
    let mut out = String::with_capacity(capacity);
    for y in (0..h).rev() {
        out.extend((0..w).map(|x| tile_char(grid.get(Position::new(x, y)))));
        out.push('\n');
    }
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn legend_characters() {
        assert_eq!(tile_char(Tile::Corridor), '.');
        assert_eq!(tile_char(Tile::Background), '#');
        assert_eq!(tile_char(Tile::RegionCenter), 'O');
        assert_eq!(tile_char(Tile::Empty), ' ');
    }

    #[test]
    fn rows_print_top_first() {
        let rows = ["..#", "#O ", "###"];
        let grid = Grid::from_rows(&rows).unwrap();
        assert_eq!(to_ascii(&grid), "..#\n#O \n###\n");
    }

    #[test]
    fn output_reads_back() {
        let grid = Grid::from_rows(&["#.#.", "....", "#..#"]).unwrap();
        let text = to_ascii(&grid);
        let rows: Vec<&str> = text.lines().collect();
        assert_eq!(Grid::from_rows(&rows).unwrap(), grid);
    }

    #[test]
    fn zero_height_grid_is_empty() {
        let grid = Grid::from_rows(&[]).unwrap();
        assert_eq!(to_ascii(&grid), "");
    }
}
