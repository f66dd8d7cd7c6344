//! Cluster statistics and metrics

use log;
use rayon::prelude::*;
use serde::{Serialize, Deserialize};

use crate::cluster::{IntangibleCluster, KTrussAnalyzer};
use crate::config::{Config, ModularityScale};
use crate::error::Result;
use crate::graph::{algorithms, GraphView, MinCutSolver};

/// Label of the synthetic whole-graph row
pub const OVERALL_LABEL: &str = "Overall";

/// Metrics of one cluster, or of the whole partition for the Overall row.
///
/// `None` marks a value that is undefined for this input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricRow {
    pub cluster: String,
    pub n: usize,
    pub m: usize,
    pub modularity: Option<f64>,
    pub cpm_score: Option<f64>,
    pub connectivity: Option<usize>,
    pub connectivity_normalized: Option<f64>,
    pub conductance: Option<f64>,
    pub max_ktruss: Option<usize>,
}

/// Optional metric families present in a report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MetricColumns {
    pub cpm: bool,
    pub ktruss: bool,
}

/// Per-cluster rows in input order plus the Overall row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsReport {
    pub clusters: Vec<MetricRow>,
    pub overall: MetricRow,
    pub columns: MetricColumns,
}

impl MetricsReport {
    /// All rows, Overall last
    pub fn rows(&self) -> impl Iterator<Item = &MetricRow> {
        self.clusters.iter().chain(std::iter::once(&self.overall))
    }
}

/// Scores gathered from node membership and degrees alone
#[derive(Debug, Clone, Copy)]
struct PartitionScore {
    n: usize,
    m: usize,
    volume: usize,
    modularity: Option<f64>,
    cpm_score: Option<f64>,
}

/// Scores that need the realized subgraph
#[derive(Debug, Clone, Copy)]
struct StructureScore {
    connectivity: usize,
    connectivity_normalized: Option<f64>,
    conductance: Option<f64>,
    max_ktruss: Option<usize>,
}

/// Computes quality metrics for a partition of a graph
pub struct MetricsComputer<'g, G: GraphView, S: MinCutSolver> {
    graph: &'g G,
    solver: S,
    config: Config,
}

impl<'g, G: GraphView, S: MinCutSolver> MetricsComputer<'g, G, S> {
    pub fn new(graph: &'g G, solver: S, config: Config) -> Self {
        Self { graph, solver, config }
    }

    /// Score every cluster and the partition as a whole.
    ///
    /// Modularity and CPM come from membership alone and are computed for
    /// all clusters first; each cluster is then realized, measured and
    /// released in turn so only the clusters in flight hold a subgraph.
    pub fn compute(&self, clusters: &[IntangibleCluster]) -> Result<MetricsReport> {
        log::info!("Scoring {} clusters", clusters.len());

        let scores: Vec<PartitionScore> = clusters
            .par_iter()
            .map(|cluster| self.partition_score(cluster))
            .collect::<Result<_>>()?;

        log::info!("Realizing clusters for connectivity, conductance and k-truss");

        let structures: Vec<StructureScore> = clusters
            .par_iter()
            .zip(scores.par_iter())
            .map(|(cluster, score)| self.structure_score(cluster, score))
            .collect::<Result<_>>()?;

        let rows: Vec<MetricRow> = clusters
            .iter()
            .zip(scores.iter().zip(structures.iter()))
            .map(|(cluster, (score, structure))| MetricRow {
                cluster: cluster.index.clone(),
                n: score.n,
                m: score.m,
                modularity: score.modularity,
                cpm_score: score.cpm_score,
                connectivity: Some(structure.connectivity),
                connectivity_normalized: structure.connectivity_normalized,
                conductance: structure.conductance,
                max_ktruss: structure.max_ktruss,
            })
            .collect();

        let internal_edges: usize = scores.iter().map(|s| s.m).sum();
        log::debug!(
            "{} of {} edges are internal to a cluster",
            internal_edges,
            self.graph.edge_count()
        );

        let overall = self.overall_row(&scores);

        Ok(MetricsReport {
            clusters: rows,
            overall,
            columns: MetricColumns {
                cpm: self.config.resolution.is_some(),
                ktruss: self.config.compute_ktruss,
            },
        })
    }

    fn partition_score(&self, cluster: &IntangibleCluster) -> Result<PartitionScore> {
        let members = cluster.resolve(self.graph)?;
        let n = members.len();
        let m = algorithms::count_internal_edges(self.graph, &members);
        let volume = algorithms::volume(self.graph, &members);

        Ok(PartitionScore {
            n,
            m,
            volume,
            modularity: modularity(m, volume, self.graph.edge_count()),
            cpm_score: self.config.resolution.map(|gamma| cpm_score(m, n, gamma)),
        })
    }

    fn structure_score(
        &self,
        cluster: &IntangibleCluster,
        score: &PartitionScore,
    ) -> Result<StructureScore> {
        let realized = cluster.realize(self.graph)?;

        let connectivity = self.solver.min_cut(&realized.subgraph).cut_size;
        let max_ktruss = if self.config.compute_ktruss {
            KTrussAnalyzer::new(&realized.subgraph).max_k()
        } else {
            None
        };

        log::debug!(
            "Cluster {}: n={}, m={}, mincut={}",
            realized.index(),
            realized.n(),
            realized.m(),
            connectivity
        );

        Ok(StructureScore {
            connectivity,
            connectivity_normalized: normalized_connectivity(connectivity, score.n),
            conductance: conductance(score.m, score.volume, self.graph.edge_count()),
            max_ktruss,
        })
    }

    fn overall_row(&self, scores: &[PartitionScore]) -> MetricRow {
        let total_edges = self.graph.edge_count();

        let modularity = if total_edges == 0 {
            None
        } else {
            let sum: f64 = scores.iter().filter_map(|s| s.modularity).sum();
            Some(match self.config.modularity_scale {
                ModularityScale::Sum => sum,
                ModularityScale::InverseTwoM => sum / (2.0 * total_edges as f64),
            })
        };

        let cpm_score = self
            .config
            .resolution
            .map(|_| scores.iter().filter_map(|s| s.cpm_score).sum());

        MetricRow {
            cluster: OVERALL_LABEL.to_string(),
            n: self.graph.node_count(),
            m: total_edges,
            modularity,
            cpm_score,
            connectivity: None,
            connectivity_normalized: None,
            conductance: None,
            max_ktruss: None,
        }
    }
}

/// `m_c / m - (vol_c / 2m)^2`; undefined for an edgeless graph
pub fn modularity(internal_edges: usize, volume: usize, total_edges: usize) -> Option<f64> {
    if total_edges == 0 {
        return None;
    }
    let m = total_edges as f64;
    let expected = volume as f64 / (2.0 * m);
    Some(internal_edges as f64 / m - expected * expected)
}

/// Internal edges minus `gamma` times the number of node pairs
pub fn cpm_score(internal_edges: usize, n: usize, gamma: f64) -> f64 {
    let pairs = (n * n.saturating_sub(1)) as f64 / 2.0;
    internal_edges as f64 - gamma * pairs
}

/// Cut size scaled by `log10(n)`; undefined for a single node
pub fn normalized_connectivity(connectivity: usize, n: usize) -> Option<f64> {
    if n <= 1 {
        return None;
    }
    Some(connectivity as f64 / (n as f64).log10())
}

/// Boundary edges over the smaller of the two side volumes
pub fn conductance(internal_edges: usize, volume: usize, total_edges: usize) -> Option<f64> {
    let boundary = volume.saturating_sub(2 * internal_edges);
    let outside = (2 * total_edges).saturating_sub(volume);
    let denominator = volume.min(outside);
    if denominator == 0 {
        return None;
    }
    Some(boundary as f64 / denominator as f64)
}
