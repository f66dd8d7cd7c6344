//! Report assembly: metric tables, summaries and batch rollups

pub mod batch;
pub mod summary;

use std::collections::BTreeMap;

use crate::cluster::MetricsReport;

pub use batch::{BatchRow, BatchSummarizer};
pub use summary::{Distribution, RunSummary, SummaryShape, SummaryValue};

/// Number of clusters of each size, smallest size first
pub fn cluster_size_frequency(report: &MetricsReport) -> BTreeMap<usize, usize> {
    let mut frequency = BTreeMap::new();
    for row in &report.clusters {
        *frequency.entry(row.n).or_insert(0) += 1;
    }
    frequency
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::{IntangibleCluster, MetricsComputer};
    use crate::config::Config;
    use crate::graph::{CompressedGraph, StoerWagner};

    #[test]
    fn test_frequency_ignores_overall() {
        let graph = CompressedGraph::from_edges(&[(0, 1), (1, 2), (3, 4), (5, 6)]);
        let clusters = vec![
            IntangibleCluster::new("a", vec![0, 1, 2]),
            IntangibleCluster::new("b", vec![3, 4]),
            IntangibleCluster::new("c", vec![5, 6]),
        ];
        let report = MetricsComputer::new(&graph, StoerWagner, Config::default())
            .compute(&clusters)
            .unwrap();

        let frequency = cluster_size_frequency(&report);
        assert_eq!(frequency.len(), 2);
        assert_eq!(frequency[&2], 2);
        assert_eq!(frequency[&3], 1);
    }
}
