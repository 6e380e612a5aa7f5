//! Integration test: run the full generator on the default configuration
//! and check the properties every finished map must have.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use corridor_pipeline::corridor::route_corridor;
use corridor_pipeline::outer::all_outer_tiles;
use corridor_pipeline::repair::find_double_wide_blocks;
use corridor_pipeline::rng::MapRng;
use corridor_pipeline::{
    CostModel, GenerateError, GenerationConfig, Grid, Pipeline, Position, RemediatorKind, Tile,
    WaypointParams, WaypointStyle, find_path_segment, generate, generate_map,
};

fn seeded(seed: u64) -> GenerationConfig {
    GenerationConfig {
        seed: Some(seed),
        ..GenerationConfig::default()
    }
}

#[test]
fn default_map_has_expected_shape() {
    let map = generate_map(&seeded(2024)).expect("generation should succeed");
    eprintln!(
        "{}x{}: {} corridor tiles, {} edges, {} dead ends",
        map.grid.width(),
        map.grid.height(),
        map.grid.corridor_count(),
        map.edges.len(),
        map.grid.dead_ends().len(),
    );

    assert_eq!(map.grid.tiles().len(), 50 * 50);
    assert!(map.seeds.len() >= 3);
    assert!(map.seeds.len() <= 15);
    assert_eq!(map.carves.len(), map.edges.len());
    assert!(map.edges.len() <= 15 * 14 / 2);
    assert!(map.grid.corridor_count() > 0);

    // Only corridor and background tiles are produced.
    assert!(
        map.grid
            .tiles()
            .iter()
            .all(|t| matches!(t, Tile::Corridor | Tile::Background))
    );

    assert!(!map.repair.cap_exhausted);
    assert!(!map.remediation.repair.cap_exhausted);
    assert!(find_double_wide_blocks(&map.grid).is_empty());
}

#[test]
fn same_seed_same_grid() {
    for seed in [0, 1, 99, u64::MAX] {
        assert_eq!(generate(&seeded(seed)).unwrap(), generate(&seeded(seed)).unwrap());
    }
}

#[test]
fn different_seeds_differ() {
    assert_ne!(generate(&seeded(1)).unwrap(), generate(&seeded(2)).unwrap());
}

#[test]
fn staged_pipeline_matches_one_shot() {
    let staged = Pipeline::new(seeded(31))
        .seed()
        .unwrap()
        .connect()
        .unwrap()
        .carve()
        .repair()
        .remediate()
        .into_result();
    let one_shot = generate_map(&seeded(31)).unwrap();
    assert_eq!(staged.grid, one_shot.grid);
    assert_eq!(staged.seeds, one_shot.seeds);
}

#[test]
fn two_regions_cannot_triangulate() {
    let config = GenerationConfig {
        region_count: 2,
        ..seeded(3)
    };
    assert_eq!(
        generate(&config).unwrap_err(),
        GenerateError::NotEnoughPoints { found: 2 },
    );
}

#[test]
fn crowded_grid_runs_out_of_room() {
    let config = GenerationConfig {
        width: 3,
        height: 3,
        min_region_distance: 10.0,
        ..seeded(3)
    };
    assert!(matches!(
        generate(&config),
        Err(GenerateError::NotEnoughPoints { found: 1 })
    ));
}

#[test]
fn straight_search_on_blank_grid() {
    let grid = Grid::from_rows(&["#####"; 5]).unwrap();
    let path = find_path_segment(
        Position::new(0, 2),
        Position::new(3, 2),
        &grid,
        &CostModel::default(),
    )
    .unwrap();
    assert_eq!(path.len(), 4);
    assert!(path.iter().all(|p| p.y == 2));
}

#[test]
fn short_edge_routes_directly() {
    let grid = Grid::from_rows(&["#####"; 5]).unwrap();
    let route = route_corridor(
        Position::new(1, 1),
        Position::new(3, 2),
        &grid,
        &CostModel::default(),
        &WaypointParams::default(),
        &mut MapRng::new(0),
    );
    assert_eq!(route.waypoints.style, WaypointStyle::Direct);
    assert!(route.waypoints.points.is_empty());
    assert_eq!(route.path.unwrap().len(), 4);
}

#[test]
fn remediation_does_not_add_dead_ends() {
    for seed in [4, 12, 77] {
        let disabled = generate_map(&GenerationConfig {
            remediator: RemediatorKind::Disabled,
            ..seeded(seed)
        })
        .unwrap();
        let tiered = generate_map(&seeded(seed)).unwrap();
        assert_eq!(
            tiered.remediation.dead_ends_before,
            disabled.grid.dead_ends().len()
        );
        assert_eq!(
            tiered.remediation.dead_ends_after,
            tiered.grid.dead_ends().len()
        );
    }
}

#[test]
fn border_tiles_are_corridors_on_the_edge() {
    let map = generate_map(&seeded(8)).unwrap();
    for info in all_outer_tiles(&map.grid) {
        let p = info.position;
        assert!(map.grid.is_corridor(p));
        assert!(p.x == 0 || p.y == 0 || p.x == 49 || p.y == 49);
    }
}

#[test]
fn config_round_trips_through_json() {
    let config = GenerationConfig {
        width: 30,
        remediator: RemediatorKind::Disabled,
        ..seeded(6)
    };
    let json = serde_json::to_string(&config).unwrap();
    let back: GenerationConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(back, config);

    let partial: GenerationConfig = serde_json::from_str(r#"{"width": 20}"#).unwrap();
    assert_eq!(partial.width, 20);
    assert_eq!(partial.height, GenerationConfig::DEFAULT_HEIGHT);
}
