use std::fs;
use std::path::Path;

use cluster_quality_analyzer::cluster::{self, ktruss, MetricsComputer};
use cluster_quality_analyzer::config::{
    BatchConfig, ClustererSelection, ClustererSpec, Config, ModularityScale,
};
use cluster_quality_analyzer::data::{assignment, edgelist, provenance, stats};
use cluster_quality_analyzer::graph::{GraphView, StoerWagner};
use cluster_quality_analyzer::lineage::{Fate, LineageTracker};
use cluster_quality_analyzer::report::{BatchSummarizer, SummaryShape};
use cluster_quality_analyzer::{storage, AnalysisError};

const BRIDGED_TRIANGLES: &str = "0\t1\n1\t2\n2\t0\n3\t4\n4\t5\n5\t3\n2\t3\n";
const TRIANGLE_CLUSTERING: &str = "0\t10\n1\t10\n2\t10\n3\t20\n4\t20\n5\t20\n";

fn write(dir: &Path, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn test_stats_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let edges = write(dir.path(), "network.tsv", BRIDGED_TRIANGLES);
    let clustering = write(dir.path(), "leiden_0.5.tsv", TRIANGLE_CLUSTERING);

    let selection = ClustererSelection {
        spec: ClustererSpec::Leiden,
        resolution: Some(0.5),
        k: None,
    };
    let clusterer = cluster::clusterer_for(&selection).unwrap();
    let clusters = clusterer.load_existing(&clustering).unwrap();
    let graph = edgelist::load_edge_list(&edges).unwrap();

    assert_eq!(graph.node_count(), 6);
    assert_eq!(graph.edge_count(), 7);
    assert_eq!(clusters.len(), 2);
    assert_eq!(clusters[0].index, "10");

    let config = Config::new(clusterer.resolution(), ModularityScale::Sum, true);
    let report = MetricsComputer::new(&graph, StoerWagner, config)
        .compute(&clusters)
        .unwrap();

    let stats_path = dir.path().join("leiden_0.5_stats.csv");
    storage::save_metrics_report(&report, &stats_path).unwrap();

    let reloaded = stats::load_report(&stats_path).unwrap();
    assert_eq!(reloaded.clusters.len(), 2);
    assert!(reloaded.columns.cpm);
    assert!(reloaded.columns.ktruss);
    assert_eq!(reloaded.overall.n, 6);
    assert_eq!(reloaded.overall.m, 7);
    assert_eq!(reloaded.overall.connectivity, None);
    for row in &reloaded.clusters {
        assert_eq!((row.n, row.m), (3, 3));
        assert_eq!(row.connectivity, Some(2));
        assert_eq!(row.max_ktruss, Some(3));
        assert!((row.cpm_score.unwrap() - 1.5).abs() < 1e-9);
    }
}

#[test]
fn test_ktruss_export() {
    let dir = tempfile::tempdir().unwrap();
    let edges = write(dir.path(), "network.tsv", BRIDGED_TRIANGLES);
    let clustering = write(dir.path(), "ikc_3.tsv", TRIANGLE_CLUSTERING);

    let graph = edgelist::load_edge_list(&edges).unwrap();
    let clusters = assignment::load_clusters(&clustering).unwrap();
    let trusses = ktruss::cluster_trusses(&graph, &clusters).unwrap();

    let output = dir.path().join("ikc_3_ktruss.csv");
    storage::save_ktruss_nodes(&trusses, &output).unwrap();

    let written = fs::read_to_string(&output).unwrap();
    let mut lines = written.lines();
    assert_eq!(lines.next(), Some("cluster,ktruss_vals,ktruss_nodes"));
    assert_eq!(lines.count(), 6);
}

#[test]
fn test_batch_summary() {
    let dir = tempfile::tempdir().unwrap();
    let edges = write(dir.path(), "network.tsv", BRIDGED_TRIANGLES);
    let graph = edgelist::load_edge_list(&edges).unwrap();

    let runs = [
        ("split.tsv", TRIANGLE_CLUSTERING),
        ("whole.tsv", "0\t1\n1\t1\n2\t1\n3\t1\n4\t1\n5\t1\n"),
    ];

    let mut config_lines = String::new();
    for (name, contents) in runs {
        let clustering = write(dir.path(), name, contents);
        let clusters = assignment::load_clusters(&clustering).unwrap();
        let report = MetricsComputer::new(&graph, StoerWagner, Config::default())
            .compute(&clusters)
            .unwrap();
        let stem = name.trim_end_matches(".tsv");
        storage::save_metrics_report(&report, &dir.path().join(format!("{}_stats.csv", stem)))
            .unwrap();
        config_lines.push_str(&format!("{}\t-1\tleiden_mod\n", clustering.display()));
    }

    let config = BatchConfig::parse(&config_lines).unwrap();
    let rows = BatchSummarizer::new(config, "bridged").summarize().unwrap();

    assert_eq!(rows.len(), 2);
    let split = rows[0].summary.cluster_size.unwrap();
    assert_eq!((split.min, split.median, split.max), (3.0, 3.0, 3.0));
    let whole = rows[1].summary.cluster_size.unwrap();
    assert_eq!((whole.min, whole.median, whole.max), (6.0, 6.0, 6.0));
    assert_eq!(rows[1].summary.mincuts.unwrap().max, 1.0);
    assert_eq!(rows[0].clusterer, ClustererSpec::LeidenMod);
    assert_eq!(rows[0].resolution, None);

    for shape in [SummaryShape::Wide, SummaryShape::Compact] {
        let output = dir.path().join("summary.csv");
        storage::save_batch_summary(&rows, shape, &output).unwrap();
        let written = fs::read_to_string(&output).unwrap();
        assert_eq!(written.lines().count(), 3);
        assert!(written.starts_with("clustering,clusterer,resolution,network,"));
        assert!(written.lines().nth(1).unwrap().contains(",leiden_mod,,bridged,"));
    }
}

#[test]
fn test_batch_with_missing_stats_fails() {
    let dir = tempfile::tempdir().unwrap();
    let clustering = write(dir.path(), "never_scored.tsv", TRIANGLE_CLUSTERING);

    let config = BatchConfig::parse(&format!("{}\t0.1\tleiden\n", clustering.display())).unwrap();
    let result = BatchSummarizer::new(config, "net").summarize();

    let error = result.unwrap_err();
    assert!(matches!(
        error.downcast_ref::<AnalysisError>(),
        Some(AnalysisError::MissingArtifact { .. })
    ));
}

#[test]
fn test_fate_pipeline() {
    let dir = tempfile::tempdir().unwrap();
    let before = write(
        dir.path(),
        "before.json",
        r#"[
            {"label": 1, "nodes": [0, 1, 2, 3, 4, 5, 6, 7, 8, 9], "descendants": [101], "extant": false},
            {"label": 2, "nodes": [10, 11, 12, 13], "descendants": [102, 103], "extant": false},
            {"label": 3, "nodes": [14, 15, 16], "descendants": [999], "extant": false},
            {"label": 4, "nodes": [17, 18], "extant": true}
        ]"#,
    );
    let after = write(
        dir.path(),
        "after.tsv",
        "0\t101\n1\t101\n2\t101\n3\t101\n10\t102\n11\t102\n12\t103\n13\t103\n17\t4\n18\t4\n",
    );

    let before = provenance::load_before(&before).unwrap();
    let after = assignment::load_assignment(&after).unwrap();
    let records = LineageTracker::new(assignment::cluster_sizes(&after))
        .track(&before)
        .unwrap();

    let fates: Vec<Fate> = records.iter().map(|r| r.fate).collect();
    assert_eq!(fates, vec![Fate::Reduced, Fate::Split, Fate::Degraded, Fate::Extant]);
    assert_eq!(records[0].size_ratio(), Some(0.4));

    let fate_path = dir.path().join("after_cluster_fate.csv");
    storage::save_fate_report(&records, &fate_path).unwrap();
    let written = fs::read_to_string(&fate_path).unwrap();
    let mut lines = written.lines();
    assert_eq!(
        lines.next(),
        Some("input_cluster,input_cluster_size,descendant_cluster_id,descendant_cluster_size,num_active_descendants,size_ratio,fate")
    );
    // reduced + two split rows + degraded + extant
    assert_eq!(lines.count(), 5);

    let provenance_path = dir.path().join("provenance.json");
    storage::save_provenance(&records, &provenance_path).unwrap();
    let exported: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&provenance_path).unwrap()).unwrap();
    let entries = exported.as_array().unwrap();
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[1]["input_cluster"], "2");
    assert_eq!(entries[1]["descendants"]["103"], 2);
}

#[test]
fn test_reload_report_with_many_numeric_labels() {
    let dir = tempfile::tempdir().unwrap();

    let mut edges = String::new();
    let mut clustering = String::new();
    for c in 0..150u64 {
        let (a, b, d) = (3 * c, 3 * c + 1, 3 * c + 2);
        edges.push_str(&format!("{a}\t{b}\n{b}\t{d}\n{d}\t{a}\n"));
        clustering.push_str(&format!("{a}\t{c}\n{b}\t{c}\n{d}\t{c}\n"));
    }
    let edges = write(dir.path(), "triangles.tsv", &edges);
    let clustering = write(dir.path(), "triangles_clustering.tsv", &clustering);

    let graph = edgelist::load_edge_list(&edges).unwrap();
    let clusters = assignment::load_clusters(&clustering).unwrap();
    let report = MetricsComputer::new(&graph, StoerWagner, Config::default())
        .compute(&clusters)
        .unwrap();

    let stats_path = dir.path().join("triangles_clustering_stats.csv");
    storage::save_metrics_report(&report, &stats_path).unwrap();

    let reloaded = stats::load_report(&stats_path).unwrap();
    assert_eq!(reloaded.clusters.len(), 150);
    assert_eq!(reloaded.clusters[149].cluster, "149");
    assert_eq!(reloaded.overall.n, 450);
    assert_eq!(reloaded.overall.m, 450);
}

#[test]
fn test_assignment_labels_turn_textual_late() {
    let dir = tempfile::tempdir().unwrap();

    let mut contents = String::new();
    for node in 0..120u64 {
        contents.push_str(&format!("{}\t{}\n", node, node / 2));
    }
    contents.push_str("120\tleftover\n121\tleftover\n");
    let path = write(dir.path(), "mixed.tsv", &contents);

    let assignment = assignment::load_assignment(&path).unwrap();
    assert_eq!(assignment.len(), 122);
    assert_eq!(assignment[0].1, "0");
    assert_eq!(assignment[121].1, "leftover");

    let sizes = assignment::cluster_sizes(&assignment);
    assert_eq!(sizes.get("leftover"), Some(&2));
    assert_eq!(sizes.get("59"), Some(&2));
}
