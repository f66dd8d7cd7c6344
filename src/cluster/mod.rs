//! Cluster analysis module

pub mod ktruss;
pub mod metrics;

use std::path::Path;

use petgraph::graph::UnGraph;
use serde::{Serialize, Deserialize};

use crate::config::{ClustererSelection, ClustererSpec};
use crate::data::assignment;
use crate::error::{AnalysisError, Result};
use crate::graph::{algorithms, GraphView};

pub use ktruss::{KTruss, KTrussAnalyzer};
pub use metrics::{MetricRow, MetricsComputer, MetricsReport};

/// A cluster known only by its label and member node ids
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntangibleCluster {
    /// Label of this cluster in the clustering it came from
    pub index: String,

    /// Member node ids, sorted and unique
    pub nodes: Vec<u64>,
}

impl IntangibleCluster {
    pub fn new(index: impl Into<String>, mut nodes: Vec<u64>) -> Self {
        nodes.sort_unstable();
        nodes.dedup();
        Self {
            index: index.into(),
            nodes,
        }
    }

    /// Number of member nodes
    pub fn n(&self) -> usize {
        self.nodes.len()
    }

    /// Translate member ids to the graph's internal indices.
    ///
    /// Fails on an empty cluster or on a member the graph does not contain.
    pub fn resolve<G: GraphView + ?Sized>(&self, graph: &G) -> Result<Vec<u32>> {
        if self.nodes.is_empty() {
            return Err(AnalysisError::EmptyCluster(self.index.clone()));
        }

        self.nodes
            .iter()
            .map(|&id| {
                graph.node_index(id).ok_or_else(|| AnalysisError::UnknownNode {
                    cluster: self.index.clone(),
                    node: id,
                })
            })
            .collect()
    }

    /// Number of graph edges with both endpoints in this cluster
    pub fn count_edges<G: GraphView + ?Sized>(&self, graph: &G) -> Result<usize> {
        let members = self.resolve(graph)?;
        Ok(algorithms::count_internal_edges(graph, &members))
    }

    /// Materialize the induced subgraph of this cluster
    pub fn realize<'a, G: GraphView + ?Sized>(&'a self, graph: &G) -> Result<RealizedCluster<'a>> {
        let members = self.resolve(graph)?;
        Ok(RealizedCluster {
            cluster: self,
            subgraph: algorithms::induced_subgraph(graph, &members),
        })
    }
}

/// A cluster together with its materialized induced subgraph.
///
/// Membership still comes from the borrowed intangible cluster; the
/// subgraph is a derived view that is dropped once its metrics are known.
#[derive(Debug)]
pub struct RealizedCluster<'a> {
    pub cluster: &'a IntangibleCluster,
    pub subgraph: UnGraph<u64, ()>,
}

impl RealizedCluster<'_> {
    pub fn index(&self) -> &str {
        &self.cluster.index
    }

    pub fn n(&self) -> usize {
        self.subgraph.node_count()
    }

    pub fn m(&self) -> usize {
        self.subgraph.edge_count()
    }
}

/// Source of a clustering.
///
/// Detection itself happens elsewhere; analysis only needs to load the
/// groupings an algorithm produced and know whether it used a resolution.
pub trait Clusterer {
    /// Load a node-to-cluster assignment as an ordered list of clusters
    fn load_existing(&self, path: &Path) -> anyhow::Result<Vec<IntangibleCluster>>;

    /// Resolution used by the algorithm, if it is resolution-parameterized
    fn resolution(&self) -> Option<f64>;
}

/// Quality function optimized by a Leiden run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quality {
    Cpm,
    Modularity,
}

#[derive(Debug, Clone, Copy)]
pub struct LeidenClusterer {
    pub resolution: Option<f64>,
    pub quality: Quality,
}

impl Clusterer for LeidenClusterer {
    fn load_existing(&self, path: &Path) -> anyhow::Result<Vec<IntangibleCluster>> {
        assignment::load_clusters(path)
    }

    fn resolution(&self) -> Option<f64> {
        match self.quality {
            Quality::Cpm => self.resolution,
            Quality::Modularity => None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct IkcClusterer {
    pub k: u32,
}

impl Clusterer for IkcClusterer {
    fn load_existing(&self, path: &Path) -> anyhow::Result<Vec<IntangibleCluster>> {
        assignment::load_clusters(path)
    }

    fn resolution(&self) -> Option<f64> {
        None
    }
}

/// Build the clusterer described by a validated selection
pub fn clusterer_for(selection: &ClustererSelection) -> Result<Box<dyn Clusterer>> {
    selection.validate()?;

    let clusterer: Box<dyn Clusterer> = match selection.spec {
        ClustererSpec::Leiden => Box::new(LeidenClusterer {
            resolution: selection.resolution,
            quality: Quality::Cpm,
        }),
        ClustererSpec::LeidenMod => Box::new(LeidenClusterer {
            resolution: None,
            quality: Quality::Modularity,
        }),
        ClustererSpec::Ikc => Box::new(IkcClusterer {
            // validate() guarantees k is present
            k: selection.k.unwrap_or_default(),
        }),
    };

    Ok(clusterer)
}
