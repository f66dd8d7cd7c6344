//! Core library functions for the cluster quality analyzer
//!
//! Scores a partition of a graph (modularity, CPM, mincut connectivity,
//! conductance, maximum k-truss) and traces what a refinement step did to
//! each cluster of an earlier partition.

pub mod config;
pub mod error;
pub mod data;
pub mod graph;
pub mod cluster;
pub mod lineage;
pub mod report;
pub mod storage;

pub use error::{AnalysisError, Result};
