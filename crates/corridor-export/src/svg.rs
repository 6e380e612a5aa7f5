//! SVG export serializer.
//!
//! Renders a corridor grid as an SVG string of `<rect>` tiles using the
//! [`svg`] crate for document construction and XML escaping.
//!
//! Grid `y` grows upward while SVG `y` grows downward, so row
//! `height - 1` is drawn at the top. Corridor tiles on the border that
//! are significant connection points are drawn darker than ordinary
//! corridor tiles.
//!
//! Optional [`SvgMetadata`] embeds `<title>` and `<desc>` elements for
//! accessibility and to help file managers identify exported files.
//!
//! This is a pure function with no I/O -- it returns a `String`.

use svg::Document;
use svg::node::element::{Circle, Description, Element, Group, Line, Rectangle, Title};
use svg::node::{Node, Text};

use corridor_pipeline::outer::is_significant;
use corridor_pipeline::{GeneratedMap, Grid, Point, Position, Tile};

/// Edge length of one tile in SVG user units.
const TILE_SIZE: u32 = 10;

const BACKGROUND_FILL: &str = "#1a1a1a";
const CORRIDOR_FILL: &str = "#d8d8d8";
const BORDER_LINK_FILL: &str = "#7a7a7a";
const REGION_CENTER_FILL: &str = "#c0392b";
const EMPTY_FILL: &str = "#ffffff";

/// Metadata to embed in the SVG document.
///
/// All fields are optional. When present, a `<title>` and/or `<desc>`
/// element is emitted immediately after the opening `<svg>` tag.
///
/// Text values are XML-escaped automatically by the `svg` crate.
#[derive(Debug, Clone, Default)]
pub struct SvgMetadata<'a> {
    /// Document title, emitted as `<title>`.
    pub title: Option<&'a str>,

    /// Document description, emitted as `<desc>`.
    ///
    /// Typically the seed and generation parameters so exported files
    /// are distinguishable.
    pub description: Option<&'a str>,

    /// Serialized generation configuration, emitted inside a
    /// `<metadata>` element so exported files carry machine-parseable
    /// settings for reproducibility.
    pub config_json: Option<&'a str>,
}

/// Fill colour for a tile, or `None` when the tile needs no rect of its
/// own.
fn tile_fill(grid: &Grid, pos: Position) -> Option<&'static str> {
    match grid.get(pos) {
        Tile::Background => None,
        Tile::Corridor if is_significant(grid, pos) => Some(BORDER_LINK_FILL),
        Tile::Corridor => Some(CORRIDOR_FILL),
        Tile::RegionCenter => Some(REGION_CENTER_FILL),
        Tile::Empty => Some(EMPTY_FILL),
    }
}

/// Top-left SVG corner of the tile at `pos`.
#[allow(clippy::cast_sign_loss)]
const fn tile_origin(grid: &Grid, pos: Position) -> (u32, u32) {
    let row = grid.height() - 1 - pos.y as u32;
    (pos.x as u32 * TILE_SIZE, row * TILE_SIZE)
}

/// Centre in SVG units of the cell containing `p`.
fn cell_center(grid: &Grid, p: Point) -> (f64, f64) {
    let size = f64::from(TILE_SIZE);
    let x = (p.x.floor() + 0.5) * size;
    let y = (f64::from(grid.height()) - p.y.floor() - 0.5) * size;
    (x, y)
}

/// Document shell: dimensions, metadata, and the background fill.
fn document(grid: &Grid, metadata: &SvgMetadata<'_>) -> Document {
    let w = grid.width() * TILE_SIZE;
    let h = grid.height() * TILE_SIZE;
    let mut doc = Document::new()
        .set("width", w)
        .set("height", h)
        .set("viewBox", (0, 0, w, h));

    if let Some(title) = metadata.title {
        doc = doc.add(Title::new(title));
    }

    if let Some(description) = metadata.description {
        doc = doc.add(Description::new().add(Text::new(description)));
    }

    if let Some(config_json) = metadata.config_json {
        let mut config_el = Element::new("corridor:config");
        config_el.assign("xmlns:corridor", "urn:corridor:config:1");
        config_el.append(Text::new(config_json));
        let mut metadata_el = Element::new("metadata");
        metadata_el.append(config_el);
        doc = doc.add(metadata_el);
    }

    doc.add(
        Rectangle::new()
            .set("width", w)
            .set("height", h)
            .set("fill", BACKGROUND_FILL),
    )
}

/// One `<rect>` per non-background tile, grouped under `<g id="tiles">`.
fn tile_group(grid: &Grid) -> Group {
    let mut group = Group::new().set("id", "tiles");
    for pos in grid.positions() {
        let Some(fill) = tile_fill(grid, pos) else {
            continue;
        };
        let (x, y) = tile_origin(grid, pos);
        group = group.add(
            Rectangle::new()
                .set("x", x)
                .set("y", y)
                .set("width", TILE_SIZE)
                .set("height", TILE_SIZE)
                .set("fill", fill),
        );
    }
    group
}

fn finish(doc: &Document) -> String {
    // The svg crate omits the XML declaration, so we prepend it.
    format!("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n{doc}\n")
}

/// Serialize a grid into an SVG document string.
///
/// Produces a complete SVG document with:
/// - `width`/`height` of `TILE_SIZE` units per tile and a matching `viewBox`
/// - Optional `<title>`, `<desc>`, and `<metadata>` elements
/// - A full-size background rect
/// - One filled `<rect>` per corridor, region-center, and empty tile
#[must_use]
pub fn to_svg(grid: &Grid, metadata: &SvgMetadata<'_>) -> String {
    let doc = document(grid, metadata).add(tile_group(grid));
    finish(&doc)
}

/// Serialize a generated map with its construction overlaid.
///
/// Produces the same output as [`to_svg`] but additionally draws each
/// triangulation edge as a red `<line>` under `<g id="edges">` and each
/// region seed as a circle under `<g id="seeds">`. Edge lines carry a
/// `data-style` attribute naming the waypoint style used to carve them,
/// and skipped edges are dashed.
#[must_use]
pub fn to_diagnostic_svg(map: &GeneratedMap, metadata: &SvgMetadata<'_>) -> String {
    let grid = &map.grid;
    let mut edges = Group::new()
        .set("id", "edges")
        .set("stroke", "#ff3b30")
        .set("stroke-width", 1.5)
        .set("stroke-opacity", 0.8);
    for (i, edge) in map.edges.iter().enumerate() {
        let (x1, y1) = cell_center(grid, edge.p);
        let (x2, y2) = cell_center(grid, edge.q);
        let mut line = Line::new()
            .set("x1", x1)
            .set("y1", y1)
            .set("x2", x2)
            .set("y2", y2);
        if let Some(outcome) = map.carves.get(i) {
            line = line.set("data-style", outcome.style.name());
            if outcome.path_len == 0 {
                line = line.set("stroke-dasharray", "4 3");
            }
        }
        edges = edges.add(line);
    }

    let mut seeds = Group::new().set("id", "seeds").set("fill", "#ffcc00");
    for &seed in &map.seeds {
        let (cx, cy) = cell_center(grid, seed);
        seeds = seeds.add(
            Circle::new()
                .set("cx", cx)
                .set("cy", cy)
                .set("r", f64::from(TILE_SIZE) * 0.4),
        );
    }

    let doc = document(grid, metadata)
        .add(tile_group(grid))
        .add(edges)
        .add(seeds);
    finish(&doc)
}
