//! Shared types for the corridor generation pipeline.

use serde::{Deserialize, Serialize};

use crate::astar::CostModel;
use crate::corridor::CarveOutcome;
use crate::grid::Grid;
use crate::remediate::{RemediationReport, RemediatorKind};
use crate::repair::RepairReport;
use crate::waypoint::WaypointParams;

/// A 2D point in continuous grid coordinates.
///
/// Region seeds are sampled on integer coordinates but carried as reals
/// so that triangulation and edge lengths work in the same space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal position (columns from the left edge).
    pub x: f64,
    /// Vertical position (rows from the bottom edge).
    pub y: f64,
}

impl Point {
    /// Create a new point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Squared Euclidean distance to another point.
    ///
    /// Avoids the square root for comparison purposes.
    #[must_use]
    pub fn distance_squared(self, other: Self) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx.mul_add(dx, dy * dy)
    }

    /// Euclidean distance to another point.
    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        self.distance_squared(other).sqrt()
    }

    /// The grid cell containing this point (coordinates floored).
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn to_position(self) -> Position {
        Position::new(self.x.floor() as i32, self.y.floor() as i32)
    }
}

/// An integer grid coordinate.
///
/// Signed so that neighbours of border cells can be represented and
/// rejected by bounds checks instead of wrapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    /// Column.
    pub x: i32,
    /// Row.
    pub y: i32,
}

impl Position {
    /// Create a new position.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Manhattan (taxicab) distance to another position.
    #[must_use]
    pub const fn manhattan(self, other: Self) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// The position offset by `(dx, dy)`.
    #[must_use]
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// The four orthogonal neighbours in up, right, down, left order.
    #[must_use]
    pub const fn neighbors(self) -> [Self; 4] {
        [
            self.offset(0, 1),
            self.offset(1, 0),
            self.offset(0, -1),
            self.offset(-1, 0),
        ]
    }
}

impl From<(i32, i32)> for Position {
    fn from((x, y): (i32, i32)) -> Self {
        Self::new(x, y)
    }
}

/// An undirected connection between two region seeds.
///
/// Produced once per unique triangulation adjacency and never mutated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    /// One endpoint.
    pub p: Point,
    /// The other endpoint.
    pub q: Point,
}

impl Edge {
    /// Create a new edge.
    #[must_use]
    pub const fn new(p: Point, q: Point) -> Self {
        Self { p, q }
    }

    /// Euclidean length of the edge.
    #[must_use]
    pub fn length(&self) -> f64 {
        self.p.distance(self.q)
    }

    /// Returns `true` if both edges join the same two points, in either
    /// orientation.
    #[must_use]
    pub fn same_pair(&self, other: &Self) -> bool {
        (self.p == other.p && self.q == other.q) || (self.p == other.q && self.q == other.p)
    }
}

/// Grid dimensions in tiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    /// Width in tiles.
    pub width: u32,
    /// Height in tiles.
    pub height: u32,
}

impl Dimensions {
    /// Returns `true` if `pos` lies inside `0..width` × `0..height`.
    #[must_use]
    pub const fn contains(self, pos: Position) -> bool {
        pos.x >= 0 && pos.y >= 0 && (pos.x as u32) < self.width && (pos.y as u32) < self.height
    }

    /// Total number of tiles.
    #[must_use]
    pub const fn area(self) -> usize {
        self.width as usize * self.height as usize
    }
}

/// Configuration for the corridor generation pipeline.
///
/// All parameters have defaults matching the reference generator
/// (50×50 grid, 15 regions, spacing 4).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Grid width in tiles.
    pub width: u32,

    /// Grid height in tiles.
    pub height: u32,

    /// Number of region seeds to place. Fewer may be placed if the
    /// spacing constraint cannot be met within the attempt budget.
    pub region_count: usize,

    /// Minimum Euclidean distance between any two region seeds.
    pub min_region_distance: f64,

    /// Seed for the random stream. `None` draws one from entropy; the
    /// seed actually used is reported in [`GeneratedMap::seed`].
    pub seed: Option<u64>,

    /// Rejection sampling budget for region seeds.
    pub max_region_point_attempts: usize,

    /// A* step costs.
    pub costs: CostModel,

    /// Waypoint style thresholds and jitter.
    pub waypoints: WaypointParams,

    /// Safety cap on double-wide repair passes.
    pub max_repair_passes: usize,

    /// Which dead-end remediation strategy runs last.
    pub remediator: RemediatorKind,
}

impl GenerationConfig {
    /// Default grid width.
    pub const DEFAULT_WIDTH: u32 = 50;
    /// Default grid height.
    pub const DEFAULT_HEIGHT: u32 = 50;
    /// Default number of region seeds.
    pub const DEFAULT_REGION_COUNT: usize = 15;
    /// Default minimum seed spacing.
    pub const DEFAULT_MIN_REGION_DISTANCE: f64 = 4.0;
    /// Default rejection sampling budget.
    pub const DEFAULT_MAX_REGION_POINT_ATTEMPTS: usize = 1000;
    /// Default cap on repair passes.
    pub const DEFAULT_MAX_REPAIR_PASSES: usize = 10;

    /// Grid dimensions described by this config.
    #[must_use]
    pub const fn dimensions(&self) -> Dimensions {
        Dimensions {
            width: self.width,
            height: self.height,
        }
    }

    /// Check numeric parameters for values that would break the
    /// pipeline's assumptions.
    ///
    /// Step costs must be at least 1 so the Manhattan heuristic stays
    /// admissible.
    ///
    /// # Errors
    ///
    /// Returns [`GenerateError::InvalidConfig`] naming the first offending
    /// field.
    pub fn validate(&self) -> Result<(), GenerateError> {
        let non_negative = [
            ("min_region_distance", self.min_region_distance),
            (
                "costs.direction_change_penalty",
                self.costs.direction_change_penalty,
            ),
            (
                "waypoints.l_shape_horizontal_probability",
                self.waypoints.l_shape_horizontal_probability,
            ),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(GenerateError::InvalidConfig(format!(
                    "{name} must be finite and non-negative, got {value}"
                )));
            }
        }

        let step_costs = [
            ("costs.base_tile_cost", self.costs.base_tile_cost),
            (
                "costs.existing_corridor_cost",
                self.costs.existing_corridor_cost,
            ),
        ];
        for (name, value) in step_costs {
            if !value.is_finite() || value < 1.0 {
                return Err(GenerateError::InvalidConfig(format!(
                    "{name} must be finite and at least 1.0, got {value}"
                )));
            }
        }

        if self.waypoints.l_shape_horizontal_probability > 1.0 {
            return Err(GenerateError::InvalidConfig(format!(
                "waypoints.l_shape_horizontal_probability must be at most 1.0, got {}",
                self.waypoints.l_shape_horizontal_probability
            )));
        }

        Ok(())
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            width: Self::DEFAULT_WIDTH,
            height: Self::DEFAULT_HEIGHT,
            region_count: Self::DEFAULT_REGION_COUNT,
            min_region_distance: Self::DEFAULT_MIN_REGION_DISTANCE,
            seed: None,
            max_region_point_attempts: Self::DEFAULT_MAX_REGION_POINT_ATTEMPTS,
            costs: CostModel::default(),
            waypoints: WaypointParams::default(),
            max_repair_passes: Self::DEFAULT_MAX_REPAIR_PASSES,
            remediator: RemediatorKind::default(),
        }
    }
}

/// Result of running the full generation pipeline with every
/// intermediate preserved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedMap {
    /// The final tile grid.
    pub grid: Grid,
    /// Region seeds accepted by the sampler.
    pub seeds: Vec<Point>,
    /// Triangulation edges, shortest first (the carving order).
    pub edges: Vec<Edge>,
    /// Per-edge carving outcome, parallel to `edges`.
    pub carves: Vec<CarveOutcome>,
    /// What the double-wide repair pass did.
    pub repair: RepairReport,
    /// What the dead-end remediator did.
    pub remediation: RemediationReport,
    /// Seed of the random stream that produced this map.
    pub seed: u64,
}

impl GeneratedMap {
    /// Number of edges for which no corridor could be carved.
    #[must_use]
    pub fn skipped_edges(&self) -> usize {
        self.carves.iter().filter(|c| c.path_len == 0).count()
    }
}

/// Errors that can occur during generation.
///
/// Uses custom `Serialize`/`Deserialize` through a proxy enum so that the
/// error can cross a process or worker boundary as JSON.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GenerateError {
    /// Triangulation needs at least three seeds.
    #[error("not enough points for triangulation: need at least 3, found {found}")]
    NotEnoughPoints {
        /// How many seeds the sampler produced.
        found: usize,
    },

    /// Generation configuration is invalid.
    #[error("invalid generation configuration: {0}")]
    InvalidConfig(String),

    /// A tile code outside the legend was encountered.
    #[error("unknown tile code {0}")]
    UnknownTile(u8),
}

/// Serde-compatible proxy for `GenerateError`.
#[derive(Serialize, Deserialize)]
enum GenerateErrorProxy {
    NotEnoughPoints { found: usize },
    InvalidConfig(String),
    UnknownTile(u8),
}

impl Serialize for GenerateError {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let proxy = match self {
            Self::NotEnoughPoints { found } => {
                GenerateErrorProxy::NotEnoughPoints { found: *found }
            }
            Self::InvalidConfig(s) => GenerateErrorProxy::InvalidConfig(s.clone()),
            Self::UnknownTile(code) => GenerateErrorProxy::UnknownTile(*code),
        };
        proxy.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for GenerateError {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match GenerateErrorProxy::deserialize(deserializer)? {
            GenerateErrorProxy::NotEnoughPoints { found } => Self::NotEnoughPoints { found },
            GenerateErrorProxy::InvalidConfig(s) => Self::InvalidConfig(s),
            GenerateErrorProxy::UnknownTile(code) => Self::UnknownTile(code),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    // --- Point tests ---

    #[test]
    fn point_distance_squared() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(3.0, 4.0);
        assert!((a.distance_squared(b) - 25.0).abs() < f64::EPSILON);
        assert!((a.distance(b) - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn point_to_position_floors() {
        assert_eq!(Point::new(3.9, 7.1).to_position(), Position::new(3, 7));
        assert_eq!(Point::new(-0.5, 0.0).to_position(), Position::new(-1, 0));
    }

    // --- Position tests ---

    #[test]
    fn position_manhattan() {
        let a = Position::new(1, 1);
        let b = Position::new(4, -3);
        assert_eq!(a.manhattan(b), 7);
        assert_eq!(b.manhattan(a), 7);
        assert_eq!(a.manhattan(a), 0);
    }

    #[test]
    fn position_neighbors_order() {
        let n = Position::new(5, 5).neighbors();
        assert_eq!(
            n,
            [
                Position::new(5, 6),
                Position::new(6, 5),
                Position::new(5, 4),
                Position::new(4, 5),
            ]
        );
    }

    // --- Edge tests ---

    #[test]
    fn edge_length_and_same_pair() {
        let e = Edge::new(Point::new(0.0, 0.0), Point::new(6.0, 8.0));
        assert!((e.length() - 10.0).abs() < f64::EPSILON);
        let reversed = Edge::new(e.q, e.p);
        assert!(e.same_pair(&reversed));
        let other = Edge::new(e.p, Point::new(1.0, 1.0));
        assert!(!e.same_pair(&other));
    }

    // --- Dimensions tests ---

    #[test]
    fn dimensions_contains() {
        let d = Dimensions {
            width: 4,
            height: 3,
        };
        assert!(d.contains(Position::new(0, 0)));
        assert!(d.contains(Position::new(3, 2)));
        assert!(!d.contains(Position::new(4, 0)));
        assert!(!d.contains(Position::new(0, 3)));
        assert!(!d.contains(Position::new(-1, 0)));
        assert_eq!(d.area(), 12);
    }

    // --- GenerationConfig tests ---

    #[test]
    fn config_defaults_match_reference_generator() {
        let config = GenerationConfig::default();
        assert_eq!(config.width, 50);
        assert_eq!(config.height, 50);
        assert_eq!(config.region_count, 15);
        assert!((config.min_region_distance - 4.0).abs() < f64::EPSILON);
        assert_eq!(config.max_region_point_attempts, 1000);
        assert_eq!(config.max_repair_passes, 10);
        assert!(config.seed.is_none());
        assert_eq!(config.remediator, RemediatorKind::Tiered);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn config_rejects_sub_unit_step_cost() {
        let mut config = GenerationConfig::default();
        config.costs.existing_corridor_cost = 0.5;
        let err = config.validate().unwrap_err();
        assert!(matches!(
            err,
            GenerateError::InvalidConfig(ref s) if s.contains("existing_corridor_cost")
        ));
    }

    #[test]
    fn config_rejects_non_finite_distance() {
        let config = GenerationConfig {
            min_region_distance: f64::NAN,
            ..GenerationConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(GenerateError::InvalidConfig(_))
        ));
    }

    #[test]
    fn config_rejects_probability_above_one() {
        let mut config = GenerationConfig::default();
        config.waypoints.l_shape_horizontal_probability = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn config_partial_json_fills_defaults() {
        let config: GenerationConfig =
            serde_json::from_str(r#"{"width": 20, "seed": 7}"#).unwrap();
        assert_eq!(config.width, 20);
        assert_eq!(config.height, 50);
        assert_eq!(config.seed, Some(7));
    }

    // --- GenerateError tests ---

    #[test]
    fn error_not_enough_points_display() {
        let err = GenerateError::NotEnoughPoints { found: 2 };
        assert_eq!(
            err.to_string(),
            "not enough points for triangulation: need at least 3, found 2",
        );
    }

    #[test]
    fn error_serde_round_trip() {
        for err in [
            GenerateError::NotEnoughPoints { found: 1 },
            GenerateError::InvalidConfig("bad".to_string()),
            GenerateError::UnknownTile(9),
        ] {
            let json = serde_json::to_string(&err).unwrap();
            let back: GenerateError = serde_json::from_str(&json).unwrap();
            assert_eq!(err, back);
        }
    }
}
