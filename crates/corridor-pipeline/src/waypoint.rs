//! Waypoint synthesis: intermediate targets that shape a corridor.
//!
//! Pure geometry with no occupancy awareness. Short connections get no
//! waypoints; longer ones pick one of three silhouettes uniformly at
//! random.

use serde::{Deserialize, Serialize};

use crate::rng::MapRng;
use crate::types::{Dimensions, Position};

/// Tunable thresholds for waypoint synthesis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaypointParams {
    /// Manhattan distance below which no waypoints are produced.
    pub min_distance: u32,
    /// Zigzag needs a Manhattan distance strictly above this.
    pub zigzag_min_distance: u32,
    /// Maximum per-axis jitter applied to the step midpoint.
    pub step_jitter: i32,
    /// Probability that an L-shape runs horizontally first.
    pub l_shape_horizontal_probability: f64,
}

impl WaypointParams {
    /// Default minimum distance for waypoints.
    pub const DEFAULT_MIN_DISTANCE: u32 = 8;
    /// Default zigzag threshold.
    pub const DEFAULT_ZIGZAG_MIN_DISTANCE: u32 = 15;
    /// Default step midpoint jitter.
    pub const DEFAULT_STEP_JITTER: i32 = 2;
    /// Default L-shape orientation probability.
    pub const DEFAULT_L_SHAPE_HORIZONTAL_PROBABILITY: f64 = 0.5;
}

impl Default for WaypointParams {
    fn default() -> Self {
        Self {
            min_distance: Self::DEFAULT_MIN_DISTANCE,
            zigzag_min_distance: Self::DEFAULT_ZIGZAG_MIN_DISTANCE,
            step_jitter: Self::DEFAULT_STEP_JITTER,
            l_shape_horizontal_probability: Self::DEFAULT_L_SHAPE_HORIZONTAL_PROBABILITY,
        }
    }
}

/// The silhouette chosen for a corridor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WaypointStyle {
    /// Too short for waypoints; searched directly.
    Direct,
    /// One corner.
    LShape,
    /// Three waypoints around a jittered midpoint.
    Step,
    /// Four waypoints at the thirds. Empty when the run is too short.
    Zigzag,
}

impl WaypointStyle {
    /// The styles drawn from for long connections, in draw order.
    const RANDOM_CHOICES: [Self; 3] = [Self::LShape, Self::Step, Self::Zigzag];

    /// Short lowercase name for reports.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Direct => "direct",
            Self::LShape => "l-shape",
            Self::Step => "step",
            Self::Zigzag => "zigzag",
        }
    }
}

/// Waypoints for one connection, excluding its start and end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Waypoints {
    /// The style that produced the points.
    pub style: WaypointStyle,
    /// Zero to four intermediate targets.
    pub points: Vec<Position>,
}

/// Produce waypoints for a corridor from `start` to `end`.
///
/// Random draws, in order: style (one of three), then either the L-shape
/// orientation or the step jitter (x then y). Direct connections and
/// zigzag draw nothing further.
#[must_use]
pub fn plan_waypoints(
    start: Position,
    end: Position,
    dimensions: Dimensions,
    params: &WaypointParams,
    rng: &mut MapRng,
) -> Waypoints {
    let distance = start.manhattan(end);
    if distance < params.min_distance {
        return Waypoints {
            style: WaypointStyle::Direct,
            points: Vec::new(),
        };
    }

    let style = WaypointStyle::RANDOM_CHOICES[rng.below(WaypointStyle::RANDOM_CHOICES.len())];
    let dx = end.x - start.x;
    let dy = end.y - start.y;

    let points = match style {
        WaypointStyle::LShape => {
            if rng.chance(params.l_shape_horizontal_probability) {
                vec![Position::new(end.x, start.y)]
            } else {
                vec![Position::new(start.x, end.y)]
            }
        }
        WaypointStyle::Step => {
            let jitter = params.step_jitter.max(0);
            let offset_x = rng.between(-jitter, jitter);
            let offset_y = rng.between(-jitter, jitter);
            let max_x = i32::try_from(dimensions.width).unwrap_or(i32::MAX) - 1;
            let max_y = i32::try_from(dimensions.height).unwrap_or(i32::MAX) - 1;
            let mid_x = (start.x + dx.div_euclid(2) + offset_x).clamp(0, max_x.max(0));
            let mid_y = (start.y + dy.div_euclid(2) + offset_y).clamp(0, max_y.max(0));
            vec![
                Position::new(mid_x, start.y),
                Position::new(mid_x, mid_y),
                Position::new(end.x, mid_y),
            ]
        }
        WaypointStyle::Zigzag => {
            if distance > params.zigzag_min_distance {
                let third = start.offset(dx.div_euclid(3), dy.div_euclid(3));
                let two_third = start.offset((2 * dx).div_euclid(3), (2 * dy).div_euclid(3));
                vec![
                    Position::new(third.x, start.y),
                    third,
                    Position::new(two_third.x, third.y),
                    two_third,
                ]
            } else {
                Vec::new()
            }
        }
        WaypointStyle::Direct => Vec::new(),
    };

    Waypoints { style, points }
}
