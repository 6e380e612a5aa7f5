//! Region seed sampling: rejection sampling with a minimum spacing.
//!
//! Candidates are uniformly random integer coordinates inside the grid.
//! A candidate is rejected if it lies closer than the minimum distance to
//! any accepted seed; accepted seeds are kept in an R-tree so the spacing
//! check is a single nearest-neighbour query.

use rstar::RTree;

use crate::rng::MapRng;
use crate::types::{Dimensions, Point};

/// Parameters for [`sample_region_points`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplerParams {
    /// Grid the seeds must fall inside.
    pub dimensions: Dimensions,
    /// Target number of seeds.
    pub count: usize,
    /// Minimum Euclidean distance between accepted seeds.
    pub min_distance: f64,
    /// Total candidate draws before giving up.
    pub max_attempts: usize,
}

/// Outcome of a sampling run.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleOutcome {
    /// Accepted seeds in acceptance order.
    pub points: Vec<Point>,
    /// Candidate draws consumed.
    pub attempts: usize,
}

/// Sample up to `params.count` seed points with minimum pairwise spacing.
///
/// Stops at the target count or when the attempt budget is exhausted and
/// returns whatever was accepted; a short list is not an error. Every
/// candidate draw consumes two values from `rng` (x then y).
#[must_use]
pub fn sample_region_points(params: &SamplerParams, rng: &mut MapRng) -> SampleOutcome {
    let mut points = Vec::with_capacity(params.count.min(params.max_attempts));
    let mut tree: RTree<[f64; 2]> = RTree::new();
    let min_distance_sq = params.min_distance * params.min_distance;
    let mut attempts = 0;

    if params.dimensions.area() == 0 {
        return SampleOutcome { points, attempts };
    }

    while points.len() < params.count && attempts < params.max_attempts {
        attempts += 1;
        #[allow(clippy::cast_precision_loss)]
        let candidate = [
            rng.below(params.dimensions.width as usize) as f64,
            rng.below(params.dimensions.height as usize) as f64,
        ];

        let too_close = tree.nearest_neighbor(&candidate).is_some_and(|nearest| {
            let dx = nearest[0] - candidate[0];
            let dy = nearest[1] - candidate[1];
            dx.mul_add(dx, dy * dy) < min_distance_sq
        });

        if !too_close {
            tree.insert(candidate);
            points.push(Point::new(candidate[0], candidate[1]));
        }
    }

    log::debug!(
        "sampled {} of {} region seeds in {attempts} attempts",
        points.len(),
        params.count,
    );

    SampleOutcome { points, attempts }
}
