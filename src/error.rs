//! Error taxonomy for the analysis engine

use std::path::PathBuf;
use thiserror::Error;

/// Result alias used by the core analysis components
pub type Result<T> = std::result::Result<T, AnalysisError>;

/// Errors raised while scoring a partition or tracing its lineage.
///
/// Metrics that are merely undefined for a given input (CPM without a
/// resolution, normalized connectivity of a singleton, k-truss of an edgeless
/// cluster) are not errors; they surface as `None` in the produced rows.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// A cluster with no member nodes
    #[error("cluster {0} has no nodes")]
    EmptyCluster(String),

    /// A cluster references a node the graph does not contain
    #[error("cluster {cluster} references node {node} which is not in the graph")]
    UnknownNode { cluster: String, node: u64 },

    /// A required annotation is absent from an input record
    #[error("cluster {cluster} is missing required field `{field}`")]
    MissingField { cluster: String, field: &'static str },

    /// Input that could not be interpreted
    #[error("malformed input {source_name}: {message}")]
    Malformed { source_name: String, message: String },

    /// Mutually exclusive or missing parameters
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// An upstream file expected by a batch run does not exist
    #[error("missing artifact for configuration {configuration}: {} not found", path.display())]
    MissingArtifact { configuration: String, path: PathBuf },
}
