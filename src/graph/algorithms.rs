//! Graph algorithms for analysis

use std::collections::HashMap;
use petgraph::graph::{NodeIndex, UnGraph};

use crate::graph::GraphView;

/// Extract the subgraph induced by `members` (internal indices).
///
/// Node weights of the returned graph are the members' input ids, in the
/// order given. Only edges with both endpoints among the members are kept.
pub fn induced_subgraph<G: GraphView + ?Sized>(graph: &G, members: &[u32]) -> UnGraph<u64, ()> {
    // Full-graph index -> subgraph index
    let mut orig_to_sub: HashMap<u32, NodeIndex> = HashMap::with_capacity(members.len());
    let mut subgraph = UnGraph::with_capacity(members.len(), members.len());

    for &node in members {
        let sub = subgraph.add_node(graph.node_id(node));
        orig_to_sub.insert(node, sub);
    }

    for &node in members {
        let src = orig_to_sub[&node];
        for &target in graph.neighbors(node) {
            // Each undirected edge is seen from both ends; keep one
            if target <= node {
                continue;
            }
            if let Some(&dst) = orig_to_sub.get(&target) {
                subgraph.add_edge(src, dst, ());
            }
        }
    }

    subgraph
}

/// Count edges with both endpoints among `members` without materializing them
pub fn count_internal_edges<G: GraphView + ?Sized>(graph: &G, members: &[u32]) -> usize {
    let member_set: std::collections::HashSet<u32> = members.iter().copied().collect();

    let endpoints: usize = members
        .iter()
        .map(|&node| {
            graph
                .neighbors(node)
                .iter()
                .filter(|target| member_set.contains(target))
                .count()
        })
        .sum();

    endpoints / 2
}

/// Sum of degrees of `members` in the full graph
pub fn volume<G: GraphView + ?Sized>(graph: &G, members: &[u32]) -> usize {
    members.iter().map(|&node| graph.degree(node)).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::CompressedGraph;

    fn two_triangles() -> CompressedGraph {
        CompressedGraph::from_edges(&[(0, 1), (1, 2), (2, 0), (3, 4), (4, 5), (5, 3), (2, 3)])
    }

    fn indices(graph: &CompressedGraph, ids: &[u64]) -> Vec<u32> {
        ids.iter().map(|&id| graph.node_index(id).unwrap()).collect()
    }

    #[test]
    fn test_induced_subgraph_drops_bridge() {
        let graph = two_triangles();
        let members = indices(&graph, &[0, 1, 2]);
        let sub = induced_subgraph(&graph, &members);

        assert_eq!(sub.node_count(), 3);
        assert_eq!(sub.edge_count(), 3);
        let mut ids: Vec<u64> = sub.node_weights().copied().collect();
        ids.sort_unstable();
        assert_eq!(ids, vec![0, 1, 2]);
    }

    #[test]
    fn test_internal_edges_and_volume() {
        let graph = two_triangles();
        let members = indices(&graph, &[3, 4, 5]);

        assert_eq!(count_internal_edges(&graph, &members), 3);
        // Node 3 also carries the bridge
        assert_eq!(volume(&graph, &members), 7);
    }
}
