//! Maximum k-truss of a realized cluster
//!
//! The k-truss of a graph is its maximal subgraph in which every edge lies on
//! at least `k - 2` triangles of that subgraph. Trusses nest (a non-empty
//! k-truss implies a non-empty j-truss for every `j <= k`), so the largest
//! non-empty truss is found by binary search over k, peeling edges whose
//! triangle support falls below the threshold at each probe.

use std::collections::{HashMap, HashSet, VecDeque};

use petgraph::graph::UnGraph;
use petgraph::visit::EdgeRef;
use rayon::prelude::*;

use crate::cluster::IntangibleCluster;
use crate::error::Result;
use crate::graph::GraphView;

/// The maximum truss of a cluster and the nodes that form it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KTruss {
    pub k: usize,
    /// Input ids of the nodes touching at least one truss edge, sorted
    pub nodes: Vec<u64>,
}

/// Truss queries over one realized subgraph.
///
/// Neighbor sets are built once and shared by every probe of the search.
pub struct KTrussAnalyzer {
    adjacency: Vec<HashSet<usize>>,
    node_ids: Vec<u64>,
    edge_count: usize,
    max_degree: usize,
}

impl KTrussAnalyzer {
    pub fn new(subgraph: &UnGraph<u64, ()>) -> Self {
        let n = subgraph.node_count();
        let mut adjacency: Vec<HashSet<usize>> = vec![HashSet::new(); n];

        for edge in subgraph.edge_references() {
            let (u, v) = (edge.source().index(), edge.target().index());
            if u != v {
                adjacency[u].insert(v);
                adjacency[v].insert(u);
            }
        }

        let edge_count = adjacency.iter().map(|s| s.len()).sum::<usize>() / 2;
        let max_degree = adjacency.iter().map(|s| s.len()).max().unwrap_or(0);
        let node_ids = subgraph.node_weights().copied().collect();

        Self {
            adjacency,
            node_ids,
            edge_count,
            max_degree,
        }
    }

    /// Largest degree in the subgraph
    pub fn max_degree(&self) -> usize {
        self.max_degree
    }

    /// Edges `(u, v)` with `u < v` (subgraph positions) surviving in the k-truss
    pub fn truss_edges(&self, k: usize) -> Vec<(usize, usize)> {
        let threshold = k.saturating_sub(2);

        if threshold == 0 {
            return self.edges_of(&self.adjacency);
        }

        // Every truss edge needs k - 2 triangles, so a non-empty k-truss
        // holds at least k nodes and k(k-1)/2 edges
        let required = k * (k - 1) / 2;
        if self.edge_count < required {
            return Vec::new();
        }

        let mut adjacency = self.adjacency.clone();
        let mut remaining = self.edge_count;
        let mut support: HashMap<(usize, usize), usize> = HashMap::with_capacity(self.edge_count);
        let mut queue = VecDeque::new();

        for (u, v) in self.edges_of(&adjacency) {
            let triangles = common_neighbors(&adjacency, u, v).len();
            support.insert((u, v), triangles);
            if triangles < threshold {
                queue.push_back((u, v));
            }
        }

        while let Some((u, v)) = queue.pop_front() {
            if !adjacency[u].contains(&v) {
                continue;
            }

            let common = common_neighbors(&adjacency, u, v);
            adjacency[u].remove(&v);
            adjacency[v].remove(&u);
            remaining -= 1;

            if remaining < required {
                return Vec::new();
            }

            for w in common {
                for edge in [edge_key(u, w), edge_key(v, w)] {
                    if let Some(s) = support.get_mut(&edge) {
                        *s = s.saturating_sub(1);
                        if *s + 1 == threshold {
                            queue.push_back(edge);
                        }
                    }
                }
            }
        }

        self.edges_of(&adjacency)
    }

    /// Whether the k-truss has at least one edge
    pub fn has_truss(&self, k: usize) -> bool {
        !self.truss_edges(k).is_empty()
    }

    /// Largest k with a non-empty k-truss, or `None` for an edgeless subgraph
    pub fn max_k(&self) -> Option<usize> {
        let mut low = 2;
        // An edge on k - 2 triangles has endpoints of degree >= k - 1
        let mut high = self.max_degree + 1;
        let mut best = None;

        while low <= high {
            let mid = (low + high) / 2;
            if self.has_truss(mid) {
                best = Some(mid);
                low = mid + 1;
            } else {
                high = mid - 1;
            }
        }

        best
    }

    /// The maximum truss together with its node membership
    pub fn max_truss(&self) -> Option<KTruss> {
        let k = self.max_k()?;
        Some(KTruss {
            k,
            nodes: self.truss_nodes(k),
        })
    }

    /// Input ids of the nodes in the k-truss
    pub fn truss_nodes(&self, k: usize) -> Vec<u64> {
        let mut nodes: Vec<u64> = self
            .truss_edges(k)
            .into_iter()
            .flat_map(|(u, v)| [self.node_ids[u], self.node_ids[v]])
            .collect();
        nodes.sort_unstable();
        nodes.dedup();
        nodes
    }

    fn edges_of(&self, adjacency: &[HashSet<usize>]) -> Vec<(usize, usize)> {
        let mut edges: Vec<(usize, usize)> = adjacency
            .iter()
            .enumerate()
            .flat_map(|(u, neighbors)| {
                neighbors.iter().filter(move |&&v| u < v).map(move |&v| (u, v))
            })
            .collect();
        edges.sort_unstable();
        edges
    }
}

/// Maximum truss and its nodes for every cluster, in input order
pub fn cluster_trusses<G: GraphView>(
    graph: &G,
    clusters: &[IntangibleCluster],
) -> Result<Vec<(String, Option<KTruss>)>> {
    log::info!("Finding maximum k-trusses of {} clusters", clusters.len());

    clusters
        .par_iter()
        .map(|cluster| {
            let realized = cluster.realize(graph)?;
            let truss = KTrussAnalyzer::new(&realized.subgraph).max_truss();
            Ok((cluster.index.clone(), truss))
        })
        .collect()
}

fn edge_key(a: usize, b: usize) -> (usize, usize) {
    if a < b { (a, b) } else { (b, a) }
}

fn common_neighbors(adjacency: &[HashSet<usize>], u: usize, v: usize) -> Vec<usize> {
    let (small, large) = if adjacency[u].len() <= adjacency[v].len() {
        (&adjacency[u], &adjacency[v])
    } else {
        (&adjacency[v], &adjacency[u])
    };
    small.iter().filter(|w| large.contains(w)).copied().collect()
}
