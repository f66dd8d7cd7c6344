//! Global minimum edge cut of a realized subgraph

use std::collections::{BinaryHeap, HashMap};
use petgraph::graph::UnGraph;
use petgraph::visit::EdgeRef;

/// Result of a minimum cut computation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MinCut {
    /// Number of edges crossing the cut
    pub cut_size: usize,
}

/// Computes the size of a global minimum edge cut.
///
/// Graphs with fewer than two nodes have no proper cut and report 0, as do
/// disconnected graphs.
pub trait MinCutSolver: Sync {
    fn min_cut(&self, graph: &UnGraph<u64, ()>) -> MinCut;
}

/// Stoer-Wagner minimum cut with a lazy max-heap for the adjacency ordering
#[derive(Debug, Default, Clone, Copy)]
pub struct StoerWagner;

impl MinCutSolver for StoerWagner {
    fn min_cut(&self, graph: &UnGraph<u64, ()>) -> MinCut {
        let n = graph.node_count();
        if n < 2 {
            return MinCut { cut_size: 0 };
        }

        // Weighted adjacency; merged vertices accumulate parallel edge weights
        let mut adjacency: Vec<HashMap<usize, usize>> = vec![HashMap::new(); n];
        for edge in graph.edge_references() {
            let (u, v) = (edge.source().index(), edge.target().index());
            if u == v {
                continue;
            }
            *adjacency[u].entry(v).or_insert(0) += 1;
            *adjacency[v].entry(u).or_insert(0) += 1;
        }

        let mut active: Vec<bool> = vec![true; n];
        let mut remaining = n;
        let mut best = usize::MAX;

        while remaining > 1 {
            let Some(start) = active.iter().position(|&a| a) else {
                break;
            };

            let mut weights = vec![0usize; n];
            let mut added = vec![false; n];
            let mut heap = BinaryHeap::new();
            heap.push((0usize, start));

            let mut previous = None;
            let mut last = start;
            let mut cut_of_phase = 0;
            let mut visited = 0;

            while let Some((weight, node)) = heap.pop() {
                if added[node] || weight != weights[node] {
                    continue;
                }
                added[node] = true;
                visited += 1;
                if visited > 1 {
                    previous = Some(last);
                }
                last = node;
                cut_of_phase = weight;

                for (&neighbor, &w) in &adjacency[node] {
                    if !added[neighbor] {
                        weights[neighbor] += w;
                        heap.push((weights[neighbor], neighbor));
                    }
                }
            }

            // Some active vertex was never reached
            if visited < remaining {
                return MinCut { cut_size: 0 };
            }

            best = best.min(cut_of_phase);

            // Merge the last vertex into the one added before it
            let Some(s) = previous else {
                break;
            };
            let t = last;
            let merged: Vec<(usize, usize)> = adjacency[t].drain().collect();
            for (neighbor, w) in merged {
                adjacency[neighbor].remove(&t);
                if neighbor == s {
                    continue;
                }
                *adjacency[s].entry(neighbor).or_insert(0) += w;
                *adjacency[neighbor].entry(s).or_insert(0) += w;
            }
            active[t] = false;
            remaining -= 1;
        }

        MinCut { cut_size: best }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph_from(n: usize, edges: &[(u32, u32)]) -> UnGraph<u64, ()> {
        let mut graph = UnGraph::new_undirected();
        for i in 0..n {
            graph.add_node(i as u64);
        }
        graph.extend_with_edges(edges.iter().copied());
        graph
    }

    fn complete(n: u32) -> UnGraph<u64, ()> {
        let mut edges = Vec::new();
        for u in 0..n {
            for v in (u + 1)..n {
                edges.push((u, v));
            }
        }
        graph_from(n as usize, &edges)
    }

    #[test]
    fn test_single_node() {
        let graph = graph_from(1, &[]);
        assert_eq!(StoerWagner.min_cut(&graph).cut_size, 0);
    }

    #[test]
    fn test_triangle() {
        let graph = graph_from(3, &[(0, 1), (1, 2), (2, 0)]);
        assert_eq!(StoerWagner.min_cut(&graph).cut_size, 2);
    }

    #[test]
    fn test_path_and_disconnected() {
        let path = graph_from(4, &[(0, 1), (1, 2), (2, 3)]);
        assert_eq!(StoerWagner.min_cut(&path).cut_size, 1);

        let split = graph_from(4, &[(0, 1), (2, 3)]);
        assert_eq!(StoerWagner.min_cut(&split).cut_size, 0);
    }

    #[test]
    fn test_complete_graph() {
        assert_eq!(StoerWagner.min_cut(&complete(5)).cut_size, 4);
    }

    #[test]
    fn test_two_cliques_joined_by_two_edges() {
        // K4 on 0..4 and K4 on 4..8, joined by two edges
        let mut edges = Vec::new();
        for base in [0u32, 4] {
            for u in base..base + 4 {
                for v in (u + 1)..base + 4 {
                    edges.push((u, v));
                }
            }
        }
        edges.push((0, 4));
        edges.push((1, 5));
        let graph = graph_from(8, &edges);
        assert_eq!(StoerWagner.min_cut(&graph).cut_size, 2);
    }
}
