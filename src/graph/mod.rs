//! Graph representation and algorithms module

pub mod compressed;
pub mod builder;
pub mod algorithms;
pub mod mincut;

pub use builder::GraphBuilder;
pub use compressed::CompressedGraph;
pub use mincut::{MinCut, MinCutSolver, StoerWagner};

/// Read-only access to the full graph under analysis.
///
/// Nodes are addressed by dense internal indices; `node_index` and `node_id`
/// translate to and from the ids used in input files. Implementations must be
/// safe to share across the worker pool for the duration of a run.
pub trait GraphView: Sync {
    /// Number of nodes
    fn node_count(&self) -> usize;

    /// Number of undirected edges
    fn edge_count(&self) -> usize;

    /// Internal index of an input id, if the graph contains it
    fn node_index(&self, id: u64) -> Option<u32>;

    /// Input id of an internal index
    fn node_id(&self, node: u32) -> u64;

    /// Number of neighbors of a node
    fn degree(&self, node: u32) -> usize;

    /// Neighbors of a node, sorted
    fn neighbors(&self, node: u32) -> &[u32];

    /// Whether `u` and `v` are adjacent
    fn has_edge(&self, u: u32, v: u32) -> bool;
}
