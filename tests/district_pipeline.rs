//! End-to-end checks over a synthetic district: the full pipeline, the
//! spatial index against a brute-force reference, and persistence of the
//! ranked result.

use rand::Rng;
use solarmap::{
    energy, io, pipeline, query, ranking, Building, BuildingCollection, BuildingId, Crs,
    PipelineConfig, Point, Polygon, RoofType, SpatialIndex,
};
use std::collections::HashSet;

fn building(id: &str, x: f64, y: f64, w: f64, d: f64, height: f64) -> Building {
    Building::new(id, Polygon::rectangle(x, y, w, d).unwrap(), height).unwrap()
}

/// Nine buildings in three rows: a dense center block with a tower, a
/// row of houses, and an isolated far shed.
fn district() -> BuildingCollection {
    let mut col = BuildingCollection::new(Crs::projected(28992));
    col.add(building("warehouse", 0., 0., 40., 25., 6.0).with_neighborhood("Centrum"));
    col.add(building("tower", 45., 0., 18., 18., 48.0).with_neighborhood("Centrum"));
    col.add(building("office", 70., 5., 25., 15., 21.0).with_neighborhood("Centrum"));
    col.add(
        building("house-a", 0., 400., 12., 8., 7.5)
            .with_roof_type(RoofType::Gabled)
            .with_neighborhood("Noord"),
    );
    col.add(
        building("house-b", 20., 402., 11., 9., 8.0)
            .with_roof_type(RoofType::Pitched)
            .with_neighborhood("Noord"),
    );
    col.add(building("house-c", 40., 401., 12., 8., 7.5).with_neighborhood("Noord"));
    col.add(building("garage", 60., 400., 6., 5., 2.5).with_neighborhood("Noord"));
    col.add(building("school", 10., 430., 30., 14., 11.0).with_neighborhood("Noord"));
    col.add(building("shed", 5_000., 5_000., 5., 4., 3.0));
    col
}

#[test]
fn pipeline_ranks_every_building_exactly_once() {
    let input = district();
    let input_ids: HashSet<String> = input.iter().map(|b| b.id.to_string()).collect();

    let ranked = pipeline::run(input, &PipelineConfig::default()).unwrap();
    assert_eq!(ranked.len(), input_ids.len(), "no building gained or lost");

    let ranked_ids: HashSet<String> = ranked.iter().map(|b| b.id.to_string()).collect();
    assert_eq!(ranked_ids, input_ids, "output is a permutation of the input");

    let ranks: Vec<usize> = ranked.iter().map(|b| b.rank.unwrap()).collect();
    let expected: Vec<usize> = (1..=ranked.len()).collect();
    assert_eq!(ranks, expected, "ranks are dense and start at 1");

    let scores: Vec<f64> = ranked.iter().map(|b| b.score.unwrap()).collect();
    for pair in scores.windows(2) {
        assert!(pair[0] >= pair[1], "scores must not increase down the list");
    }

    for b in &ranked {
        assert!(b.area.is_some() && b.orientation.is_some() && b.slope.is_some());
        assert!(b.shading_factor.is_some());
        assert!(b.energy_kwh.is_some() && b.roi_percent.is_some() && b.payback_years.is_some());
        assert!(b.score.is_some() && b.category.is_some());
        let f = b.shading_factor.unwrap();
        assert!((0.0..=1.0).contains(&f), "shading factor {f} out of range");
    }
}

#[test]
fn pipeline_is_deterministic() {
    let config = PipelineConfig::default();
    let first = pipeline::run(district(), &config).unwrap();
    let second = pipeline::run(district(), &config).unwrap();
    assert_eq!(first, second);
}

#[test]
fn overshadowed_roof_scores_below_its_isolated_twin() {
    let config = PipelineConfig::default();

    // Identical warehouses, but one has a tower 20 m away.
    let mut alone = BuildingCollection::new(Crs::projected(28992));
    alone.add(building("w", 0., 0., 40., 25., 6.0));
    let alone = pipeline::run(alone, &config).unwrap();

    let mut crowded = BuildingCollection::new(Crs::projected(28992));
    crowded.add(building("w", 0., 0., 40., 25., 6.0));
    crowded.add(building("tower", 45., 0., 18., 18., 48.0));
    let crowded = pipeline::run(crowded, &config).unwrap();

    let isolated = query::building_by_id(&alone, &BuildingId::from("w")).unwrap();
    let shaded = query::building_by_id(&crowded, &BuildingId::from("w")).unwrap();

    assert_eq!(isolated.shading_factor, Some(0.0));
    assert!(shaded.shading_factor.unwrap() > 0.0);
    assert!(shaded.energy_kwh.unwrap() < isolated.energy_kwh.unwrap());
    assert!(shaded.score.unwrap() < isolated.score.unwrap());
}

#[test]
fn unshaded_default_roof_matches_hand_computed_figures() {
    // One isolated 10 x 10 roof under the default assumptions:
    // 100 m2 * 1000 kWh/m2 * 0.18, unshaded.
    let mut col = BuildingCollection::new(Crs::projected(28992));
    col.add(building("lone", 0., 0., 10., 10., 5.0));
    let ranked = pipeline::run(col, &PipelineConfig::default()).unwrap();
    let b = ranked.get(0).unwrap();

    assert!((b.energy_kwh.unwrap() - 18_000.0).abs() < 1e-6);
    assert!((b.payback_years.unwrap() - 4.444444).abs() < 1e-5);
    assert!((b.roi_percent.unwrap() + 77.5).abs() < 1e-6);
}

#[test]
fn priority_list_agrees_with_the_full_ranking() {
    let ranked = pipeline::run(district(), &PipelineConfig::default()).unwrap();
    let expected: Vec<String> = ranked.iter().take(3).map(|b| b.id.to_string()).collect();

    let top = ranking::priority_list(ranked.clone(), 3);
    let got: Vec<String> = top.iter().map(|b| b.id.to_string()).collect();
    assert_eq!(got, expected);

    let view: Vec<String> = query::priority(&ranked, 3)
        .iter()
        .map(|b| b.id.to_string())
        .collect();
    assert_eq!(view, expected);
}

#[test]
fn neighborhood_summaries_cover_labeled_buildings_only() {
    let ranked = pipeline::run(district(), &PipelineConfig::default()).unwrap();
    let summaries = query::aggregate_by_neighborhood(&ranked);
    let names: Vec<&str> = summaries.iter().map(|s| s.neighborhood.as_str()).collect();
    assert_eq!(names.len(), 2, "the unlabeled shed forms no group");
    assert!(names.contains(&"Centrum") && names.contains(&"Noord"));
    let total: usize = summaries.iter().map(|s| s.buildings).sum();
    assert_eq!(total, 8);
}

#[test]
fn geographic_input_is_rejected_up_front() {
    let mut col = BuildingCollection::new(Crs::geographic(4326));
    col.add(building("b", 4.9, 52.3, 0.001, 0.001, 9.0));
    let err = pipeline::run(col, &PipelineConfig::default()).unwrap_err();
    assert!(matches!(err, solarmap::SolarError::GeographicCrs(_)));
}

#[test]
fn ranked_collection_survives_a_disk_roundtrip() {
    let ranked = pipeline::run(district(), &PipelineConfig::default()).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ranked.json");
    io::write_collection(&path, &ranked).unwrap();
    let back = io::read_collection(&path).unwrap();
    assert_eq!(back, ranked);
}

#[test]
fn spatial_index_agrees_with_brute_force_over_random_districts() {
    let mut rng = rand::thread_rng();
    for _ in 0..5 {
        let mut col = BuildingCollection::new(Crs::projected(28992));
        let n = rng.gen_range(1..80);
        for i in 0..n {
            let x = rng.gen_range(0.0..1_000.0);
            let y = rng.gen_range(0.0..1_000.0);
            let w = rng.gen_range(4.0..30.0);
            let d = rng.gen_range(4.0..30.0);
            col.add(building(&format!("b-{i}"), x, y, w, d, rng.gen_range(2.0..40.0)));
        }
        let centroids: Vec<Point> = col.iter().map(|b| b.footprint.centroid()).collect();
        let index = SpatialIndex::build(&col).unwrap();

        let query_pt = Point::new(rng.gen_range(0.0..1_000.0), rng.gen_range(0.0..1_000.0));
        let k = rng.gen_range(1..10);

        let mut brute: Vec<(usize, f64)> = centroids
            .iter()
            .enumerate()
            .map(|(i, c)| (i, c.distance(&query_pt)))
            .collect();
        brute.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));
        brute.truncate(k);

        let hits = index.k_nearest_positions(query_pt, k).unwrap();
        let got: Vec<(usize, f64)> = hits.iter().map(|h| (h.position, h.distance)).collect();
        assert_eq!(got, brute);

        let radius = rng.gen_range(0.0..500.0);
        let mut brute_r: Vec<usize> = centroids
            .iter()
            .enumerate()
            .filter(|(_, c)| c.distance(&query_pt) <= radius)
            .map(|(i, _)| i)
            .collect();
        brute_r.sort_unstable();
        let mut got_r: Vec<usize> = index
            .within_radius_positions(query_pt, radius)
            .unwrap()
            .iter()
            .map(|h| h.position)
            .collect();
        got_r.sort_unstable();
        assert_eq!(got_r, brute_r);
    }
}

#[test]
fn stages_can_run_individually_in_order() {
    let col = district();
    let col = solarmap::roof::derive_attributes(col).unwrap();
    let col = solarmap::shading::estimate_shading(col, &Default::default()).unwrap();
    let col = energy::estimate_energy(col, &Default::default()).unwrap();
    let ranked = ranking::score_and_rank(col, &Default::default()).unwrap();
    let piped = pipeline::run(district(), &PipelineConfig::default()).unwrap();
    assert_eq!(ranked, piped, "manual staging matches the pipeline");
}
