//! Connectivity extraction: seeds -> triangulation -> unique edges.
//!
//! This module defines the [`Triangulator`] trait for pluggable planar
//! triangulation and [`SpadeTriangulator`], the default Delaunay backend.
//! [`extract_edges`] reduces the triangles to a deduplicated undirected
//! edge list sorted shortest-first, which is the order corridors are
//! carved in.

use std::collections::HashSet;

use spade::{DelaunayTriangulation, Point2, Triangulation};

use crate::types::{Edge, GenerateError, Point};

/// Trait for planar triangulation backends.
///
/// Input: seed points. Output: triangles as index triples into `points`.
pub trait Triangulator {
    /// Triangulate `points`.
    fn triangulate(&self, points: &[Point]) -> Vec<[usize; 3]>;
}

/// Delaunay triangulation backed by the `spade` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpadeTriangulator;

impl Triangulator for SpadeTriangulator {
    fn triangulate(&self, points: &[Point]) -> Vec<[usize; 3]> {
        let mut triangulation: DelaunayTriangulation<Point2<f64>> = DelaunayTriangulation::new();

        // spade vertex index -> first input index at that location.
        // Duplicate inputs resolve to the existing vertex.
        let mut vertex_to_input: Vec<usize> = Vec::with_capacity(points.len());
        for (input_idx, p) in points.iter().enumerate() {
            match triangulation.insert(Point2::new(p.x, p.y)) {
                Ok(handle) => {
                    if handle.index() == vertex_to_input.len() {
                        vertex_to_input.push(input_idx);
                    }
                }
                Err(e) => log::warn!("skipping seed {input_idx} ({}, {}): {e:?}", p.x, p.y),
            }
        }

        triangulation
            .inner_faces()
            .filter_map(|face| {
                let [a, b, c] = face.vertices();
                Some([
                    *vertex_to_input.get(a.fix().index())?,
                    *vertex_to_input.get(b.fix().index())?,
                    *vertex_to_input.get(c.fix().index())?,
                ])
            })
            .collect()
    }
}

/// Reduce a triangulation of `points` to unique undirected edges.
///
/// Each triangle contributes its three sides as `(min, max)` index pairs;
/// the first sighting of a pair appends the resolved [`Edge`]. Sides with
/// an out-of-range or repeated index are ignored. The result is stably
/// sorted by ascending Euclidean length.
///
/// # Errors
///
/// Returns [`GenerateError::NotEnoughPoints`] if fewer than 3 points are
/// given.
pub fn extract_edges(
    points: &[Point],
    triangulator: &dyn Triangulator,
) -> Result<Vec<Edge>, GenerateError> {
    if points.len() < 3 {
        return Err(GenerateError::NotEnoughPoints {
            found: points.len(),
        });
    }

    let triangles = triangulator.triangulate(points);
    let mut seen: HashSet<(usize, usize)> = HashSet::new();
    let mut edges = Vec::new();

    for tri in &triangles {
        for j in 0..3 {
            let a = tri[j];
            let b = tri[(j + 1) % 3];
            let key = (a.min(b), a.max(b));
            if key.0 == key.1 || key.1 >= points.len() {
                continue;
            }
            if seen.insert(key) {
                edges.push(Edge::new(points[key.0], points[key.1]));
            }
        }
    }

    edges.sort_by(|a, b| a.length().total_cmp(&b.length()));

    log::debug!(
        "{} triangles -> {} unique edges from {} seeds",
        triangles.len(),
        edges.len(),
        points.len(),
    );

    Ok(edges)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    /// Returns a fixed list of triangles regardless of input.
    struct FixedTriangulator(Vec<[usize; 3]>);

    impl Triangulator for FixedTriangulator {
        fn triangulate(&self, _points: &[Point]) -> Vec<[usize; 3]> {
            self.0.clone()
        }
    }

    fn square() -> Vec<Point> {
        vec![
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 10.0),
            Point::new(0.0, 10.0),
        ]
    }

    #[test]
    fn fewer_than_three_points_fails() {
        let points = vec![Point::new(0.0, 0.0), Point::new(5.0, 5.0)];
        let err = extract_edges(&points, &SpadeTriangulator).unwrap_err();
        assert_eq!(err, GenerateError::NotEnoughPoints { found: 2 });
    }

    #[test]
    fn shared_side_is_deduplicated() {
        let tri = FixedTriangulator(vec![[0, 1, 2], [0, 2, 3]]);
        let edges = extract_edges(&square(), &tri).unwrap();
        // 4 sides + 1 diagonal.
        assert_eq!(edges.len(), 5);
        let diagonal = edges.last().unwrap();
        assert!((diagonal.length() - 200.0_f64.sqrt()).abs() < 1e-9);
    }

    #[test]
    fn edges_sorted_by_length() {
        let points = vec![
            Point::new(0.0, 0.0),
            Point::new(20.0, 0.0),
            Point::new(0.0, 3.0),
        ];
        let tri = FixedTriangulator(vec![[0, 1, 2]]);
        let edges = extract_edges(&points, &tri).unwrap();
        let lengths: Vec<f64> = edges.iter().map(Edge::length).collect();
        assert!(lengths.windows(2).all(|w| w[0] <= w[1]));
        assert!((lengths[0] - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn invalid_indices_are_ignored() {
        let tri = FixedTriangulator(vec![[0, 1, 9], [2, 2, 3]]);
        let edges = extract_edges(&square(), &tri).unwrap();
        // Only (0,1) from the first and (2,3) from the second survive.
        assert_eq!(edges.len(), 2);
    }

    #[test]
    fn empty_triangulation_yields_no_edges() {
        let tri = FixedTriangulator(Vec::new());
        assert!(extract_edges(&square(), &tri).unwrap().is_empty());
    }

    #[test]
    fn spade_square_has_five_edges() {
        let edges = extract_edges(&square(), &SpadeTriangulator).unwrap();
        assert_eq!(edges.len(), 5);
        for (i, a) in edges.iter().enumerate() {
            for b in &edges[i + 1..] {
                assert!(!a.same_pair(b));
            }
        }
    }

    #[test]
    fn spade_duplicate_points_map_to_first_index() {
        let mut points = square();
        points.push(Point::new(0.0, 0.0));
        let triangles = SpadeTriangulator.triangulate(&points);
        assert_eq!(triangles.len(), 2);
        assert!(triangles.iter().flatten().all(|&i| i < 4));
    }

    #[test]
    fn spade_collinear_points_have_no_triangles() {
        let points = vec![
            Point::new(0.0, 0.0),
            Point::new(5.0, 0.0),
            Point::new(10.0, 0.0),
        ];
        assert!(extract_edges(&points, &SpadeTriangulator).unwrap().is_empty());
    }
}
