//! Graph construction module

use crate::graph::CompressedGraph;
use std::collections::HashMap;

/// Builder for incrementally constructing a CompressedGraph
pub struct GraphBuilder {
    /// Number of nodes
    node_count: usize,

    /// Mapping from input ids to node indices
    id_to_index: HashMap<u64, u32>,

    /// Input ids, in index order
    node_ids: Vec<u64>,

    /// Adjacency lists for each node (both directions)
    adjacency_lists: Vec<Vec<u32>>,
}

impl GraphBuilder {
    /// Create a new graph builder with the given capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            node_count: 0,
            id_to_index: HashMap::with_capacity(capacity),
            node_ids: Vec::with_capacity(capacity),
            adjacency_lists: Vec::with_capacity(capacity),
        }
    }

    /// Get or create a node index for the given input id
    pub fn get_or_create_node(&mut self, id: u64) -> u32 {
        if let Some(&idx) = self.id_to_index.get(&id) {
            return idx;
        }

        let idx = self.node_count as u32;
        self.id_to_index.insert(id, idx);
        self.node_ids.push(id);
        self.adjacency_lists.push(Vec::new());
        self.node_count += 1;

        idx
    }

    /// Add an undirected edge. Self-loops register the node but add no edge.
    pub fn add_edge(&mut self, u: u64, v: u64) {
        let u_idx = self.get_or_create_node(u);
        let v_idx = self.get_or_create_node(v);

        if u_idx == v_idx {
            return;
        }

        self.adjacency_lists[u_idx as usize].push(v_idx);
        self.adjacency_lists[v_idx as usize].push(u_idx);
    }

    /// Build the compressed graph
    pub fn build(mut self) -> CompressedGraph {
        // Sort for binary search, drop parallel edges
        for list in &mut self.adjacency_lists {
            list.sort_unstable();
            list.dedup();
        }

        let edge_count: usize = self.adjacency_lists.iter()
            .map(|list| list.len())
            .sum::<usize>() / 2;

        let mut graph = CompressedGraph::with_capacity(self.node_count, edge_count);

        graph.offsets.push(0);
        let mut offset = 0;
        for list in &self.adjacency_lists {
            offset += list.len() as u32;
            graph.offsets.push(offset);
            graph.edges.extend_from_slice(list);
        }

        graph.node_ids = self.node_ids;
        graph.id_to_index = self.id_to_index;

        log::debug!(
            "Built graph with {} nodes and {} edges ({} bytes)",
            graph.node_count,
            edge_count,
            graph.memory_usage()
        );

        graph
    }
}

impl CompressedGraph {
    /// Build a graph from a list of undirected edges
    pub fn from_edges(edges: &[(u64, u64)]) -> Self {
        let mut builder = GraphBuilder::with_capacity(edges.len());
        for &(u, v) in edges {
            builder.add_edge(u, v);
        }
        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::GraphView;

    #[test]
    fn test_duplicates_and_self_loops_collapse() {
        let mut builder = GraphBuilder::with_capacity(4);
        builder.add_edge(1, 2);
        builder.add_edge(2, 1);
        builder.add_edge(1, 2);
        builder.add_edge(3, 3);
        let graph = builder.build();

        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.degree(graph.node_index(3).unwrap()), 0);
    }
}
