//! Tab-separated edge list loading

use std::path::Path;

use anyhow::Result;
use log;

use crate::data::{integer_column, read_two_column_tsv};
use crate::graph::{CompressedGraph, GraphBuilder, GraphView};

/// Load an undirected graph from `u<TAB>v` lines
pub fn load_edge_list(path: &Path) -> Result<CompressedGraph> {
    log::info!("Reading edge list: {}", path.display());

    let df = read_two_column_tsv(path)?;
    let sources = integer_column(&df, 0, path)?;
    let targets = integer_column(&df, 1, path)?;

    log::info!("Processing {} edge records", sources.len());

    let mut builder = GraphBuilder::with_capacity(sources.len());
    for (&u, &v) in sources.iter().zip(targets.iter()) {
        builder.add_edge(u, v);
    }

    let graph = builder.build();
    log::info!(
        "Loaded graph with {} nodes and {} edges",
        graph.node_count(),
        graph.edge_count()
    );

    Ok(graph)
}
