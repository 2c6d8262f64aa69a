// End-to-end runs over a small GeoJSON precinct file:
//   reading, adjacency, initial plan checks, short bursts, saved results

use std::path::{Path, PathBuf};

use ndarray::Array1;
use serde_json::{Value, json};
use shortburst::{Adjacency, MissingLabelPolicy, PrecinctGraph, RunConfig};

/// 4x4 grid of unit-square precincts; district = column + 1, balanced populations.
/// The left column and the top row are majority-minority.
fn write_grid(dir: &Path, label: impl Fn(usize, usize) -> Value) -> PathBuf {
    let mut features = Vec::new();
    for r in 0..4 {
        for c in 0..4 {
            let (x, y) = (c as f64, r as f64);
            let bvap = if c == 0 || r == 3 { 600 } else { 100 };
            features.push(json!({
                "type": "Feature",
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[x, y], [x + 1.0, y], [x + 1.0, y + 1.0], [x, y + 1.0], [x, y]]]
                },
                "properties": {
                    "CD": label(r, c),
                    "TOTPOP": 1000,
                    "VAP": 800,
                    "BVAP": bvap,
                    "HVAP": 50,
                    "WVAP": 750 - bvap
                }
            }));
        }
    }

    let path = dir.join("grid.geojson");
    std::fs::write(&path, json!({ "type": "FeatureCollection", "features": features }).to_string()).unwrap();
    path
}

fn config(input: PathBuf, output_dir: PathBuf) -> RunConfig {
    RunConfig {
        input,
        output_dir,
        region: "GR".into(),
        num_districts: 4,
        iters: 20,
        burst_len: 5,
        n_samps: 2,
        epsilon: 0.1,
        ..RunConfig::default()
    }
}

#[test]
fn reads_grid_with_rook_and_queen_adjacency() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_grid(dir.path(), |_, c| json!(c + 1));

    let rook = PrecinctGraph::from_file(&input, Adjacency::Rook).unwrap();
    assert_eq!(rook.node_count(), 16);
    assert_eq!(rook.edge_count(), 24);
    assert!(rook.has_geometry());
    assert_eq!(rook.total("TOTPOP").unwrap(), 16_000.0);

    let queen = PrecinctGraph::from_file(&input, Adjacency::Queen).unwrap();
    assert_eq!(queen.edge_count(), 24 + 18);
}

#[test]
fn overlapping_precincts_are_adjacent() {
    let dir = tempfile::tempdir().unwrap();
    let square = |x: f64| json!({
        "type": "Feature",
        "geometry": {
            "type": "Polygon",
            "coordinates": [[[x, 0.0], [x + 1.0, 0.0], [x + 1.0, 1.0], [x, 1.0], [x, 0.0]]]
        },
        "properties": { "TOTPOP": 10 }
    });
    let input = dir.path().join("sliver.geojson");
    let collection = json!({ "type": "FeatureCollection", "features": [square(0.0), square(0.99)] });
    std::fs::write(&input, collection.to_string()).unwrap();

    for adjacency in [Adjacency::Rook, Adjacency::Queen] {
        let graph = PrecinctGraph::from_file(&input, adjacency).unwrap();
        assert_eq!(graph.edge_count(), 1, "{adjacency:?}");
        assert_eq!(graph.neighbors(0), &[1]);
    }
}

#[test]
fn runs_experiment_and_saves_results() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_grid(dir.path(), |_, c| json!(c + 1));
    let config = config(input, dir.path().join("out"));

    let records = shortburst::run(&config).unwrap();
    assert_eq!(records.len(), 2);

    for record in &records {
        assert_eq!(record.seed, record.run as u64);
        assert!(record.paths.scores.ends_with(format!("GR_dists4_BVAPopt_10.0%_20_sbl5_score0_{}.npy", record.run)));

        let trace: Array1<f64> = ndarray_npy::read_npy(&record.paths.scores).unwrap();
        assert_eq!(trace.len(), 4);
        assert!(trace.windows(2).into_iter().all(|w| w[0] <= w[1]));
        assert!(trace[0] >= 1.0);
        assert_eq!(trace[3], record.stats.score);

        // Every district stays within 10% of the ideal population.
        let vap = &record.stats.tallies["VAP"];
        assert_eq!(vap.len(), 4);
        assert!(vap.iter().all(|&v| (v - 3200.0).abs() <= 320.0));
        assert!(record.paths.max_part.exists());
    }
}

#[test]
fn same_seed_reproduces_results() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_grid(dir.path(), |_, c| json!(c + 1));

    let a = shortburst::run(&config(input.clone(), dir.path().join("a"))).unwrap();
    let b = shortburst::run(&config(input, dir.path().join("b"))).unwrap();
    for (a, b) in a.iter().zip(&b) {
        assert_eq!(a.trace, b.trace);
        assert_eq!(a.stats, b.stats);
    }
}

#[test]
fn missing_labels_are_rejected_unless_omitted() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_grid(dir.path(), |r, c| if (r, c) == (0, 0) { Value::Null } else { json!(c + 1) });

    let strict = config(input.clone(), dir.path().join("strict"));
    let err = shortburst::run(&strict).unwrap_err();
    assert!(format!("{err:#}").contains("have no 'CD' label"));
    assert!(!dir.path().join("strict").exists());

    let lenient = RunConfig {
        missing_labels: MissingLabelPolicy::Omit,
        epsilon: 0.3,
        n_samps: 1,
        ..config(input, dir.path().join("lenient"))
    };
    let records = shortburst::run(&lenient).unwrap();
    let pop = records[0].stats.tallies["VAP"].iter().sum::<f64>();
    assert_eq!(pop, 15.0 * 800.0);
}

#[test]
fn unbalanced_initial_plan_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_grid(dir.path(), |r, c| json!(if (r, c) == (0, 1) { 1 } else { c + 1 }));

    let err = shortburst::run(&config(input, dir.path().join("out"))).unwrap_err();
    assert!(err.to_string().contains("initial plan is not valid"));
}

#[test]
fn missing_input_names_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = shortburst::run(&config(dir.path().join("nowhere.geojson"), dir.path().join("out"))).unwrap_err();
    assert!(format!("{err:#}").contains("nowhere.geojson"));
}
