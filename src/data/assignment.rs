//! Node-to-cluster assignment files

use std::collections::HashMap;
use std::path::Path;

use anyhow::Result;
use log;

use crate::cluster::IntangibleCluster;
use crate::data::{integer_column, label_column, read_two_column_tsv};

/// Read `node<TAB>cluster` pairs in file order
pub fn load_assignment(path: &Path) -> Result<Vec<(u64, String)>> {
    log::info!("Reading clustering: {}", path.display());

    let df = read_two_column_tsv(path)?;
    let nodes = integer_column(&df, 0, path)?;
    let labels = label_column(&df, 1, path)?;

    Ok(nodes.into_iter().zip(labels).collect())
}

/// Group an assignment into clusters, ordered by first appearance of each id
pub fn group_clusters(assignment: &[(u64, String)]) -> Vec<IntangibleCluster> {
    let mut order: Vec<&str> = Vec::new();
    let mut members: HashMap<&str, Vec<u64>> = HashMap::new();

    for (node, label) in assignment {
        let entry = members.entry(label.as_str()).or_insert_with(|| {
            order.push(label.as_str());
            Vec::new()
        });
        entry.push(*node);
    }

    order
        .into_iter()
        .map(|label| IntangibleCluster::new(label, members.remove(label).unwrap_or_default()))
        .collect()
}

/// Number of nodes assigned to each cluster id
pub fn cluster_sizes(assignment: &[(u64, String)]) -> HashMap<String, usize> {
    let mut sizes: HashMap<String, usize> = HashMap::new();
    for (_, label) in assignment {
        *sizes.entry(label.clone()).or_insert(0) += 1;
    }
    sizes
}

/// Load a clustering file as an ordered list of clusters
pub fn load_clusters(path: &Path) -> Result<Vec<IntangibleCluster>> {
    let assignment = load_assignment(path)?;
    let clusters = group_clusters(&assignment);
    log::info!("Loaded {} clusters covering {} nodes", clusters.len(), assignment.len());
    Ok(clusters)
}
