//! Memory-efficient undirected graph representation

use std::collections::HashMap;
use std::mem;
use serde::{Serialize, Deserialize};

use crate::graph::GraphView;

/// Compressed sparse representation of an undirected graph.
///
/// Every edge `{u, v}` is stored twice, once in each endpoint's adjacency
/// list, so `edges.len()` is twice the edge count. Adjacency lists are sorted
/// and free of duplicates and self-loops.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompressedGraph {
    /// Number of nodes in the graph
    pub node_count: usize,

    /// Offset array: index where each node's neighbors begin
    /// offsets[i] to offsets[i+1] defines the neighbor range for node i
    pub offsets: Vec<u32>,

    /// Neighbor array: concatenated sorted lists of adjacent nodes
    pub edges: Vec<u32>,

    /// Mapping from internal node indices to the ids used in input files
    pub node_ids: Vec<u64>,

    /// Reverse mapping from input ids to internal indices
    pub id_to_index: HashMap<u64, u32>,
}

impl CompressedGraph {
    /// Create a new graph with pre-allocated capacity
    pub fn with_capacity(node_count: usize, edge_count: usize) -> Self {
        Self {
            node_count,
            offsets: Vec::with_capacity(node_count + 1),
            edges: Vec::with_capacity(edge_count * 2),
            node_ids: Vec::with_capacity(node_count),
            id_to_index: HashMap::with_capacity(node_count),
        }
    }

    /// Get the neighbors of a node
    pub fn adjacent(&self, node: usize) -> &[u32] {
        let start = self.offsets[node] as usize;
        let end = self.offsets[node + 1] as usize;
        &self.edges[start..end]
    }

    /// Largest degree over all nodes
    pub fn max_degree(&self) -> usize {
        (0..self.node_count)
            .map(|node| (self.offsets[node + 1] - self.offsets[node]) as usize)
            .max()
            .unwrap_or(0)
    }

    /// Estimate memory usage in bytes
    pub fn memory_usage(&self) -> usize {
        let base = mem::size_of::<Self>();
        let offsets = self.offsets.capacity() * mem::size_of::<u32>();
        let edges = self.edges.capacity() * mem::size_of::<u32>();
        let ids = self.node_ids.capacity() * mem::size_of::<u64>();
        let index = self.id_to_index.capacity() * (mem::size_of::<u64>() + mem::size_of::<u32>());

        base + offsets + edges + ids + index
    }
}

impl GraphView for CompressedGraph {
    fn node_count(&self) -> usize {
        self.node_count
    }

    fn edge_count(&self) -> usize {
        self.edges.len() / 2
    }

    fn node_index(&self, id: u64) -> Option<u32> {
        self.id_to_index.get(&id).copied()
    }

    fn node_id(&self, node: u32) -> u64 {
        self.node_ids[node as usize]
    }

    fn degree(&self, node: u32) -> usize {
        let node = node as usize;
        (self.offsets[node + 1] - self.offsets[node]) as usize
    }

    fn neighbors(&self, node: u32) -> &[u32] {
        self.adjacent(node as usize)
    }

    fn has_edge(&self, u: u32, v: u32) -> bool {
        self.adjacent(u as usize).binary_search(&v).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::GraphBuilder;

    #[test]
    fn test_undirected_storage() {
        let mut builder = GraphBuilder::with_capacity(3);
        builder.add_edge(10, 20);
        builder.add_edge(20, 30);
        let graph = builder.build();

        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 2);

        let a = graph.node_index(10).unwrap();
        let b = graph.node_index(20).unwrap();
        let c = graph.node_index(30).unwrap();
        assert!(graph.has_edge(a, b));
        assert!(graph.has_edge(b, a));
        assert!(!graph.has_edge(a, c));
        assert_eq!(graph.degree(b), 2);
        assert_eq!(graph.node_id(c), 30);
        assert_eq!(graph.max_degree(), 2);
    }

    #[test]
    fn test_unknown_id() {
        let mut builder = GraphBuilder::with_capacity(2);
        builder.add_edge(1, 2);
        let graph = builder.build();
        assert_eq!(graph.node_index(99), None);
    }
}
