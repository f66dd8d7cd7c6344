//! Lineage provenance ("before" generation) records

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::error::AnalysisError;
use crate::lineage::BeforeCluster;

/// Cluster ids appear as JSON numbers or strings depending on the producer
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum RawLabel {
    Int(i64),
    Float(f64),
    Str(String),
}

impl RawLabel {
    fn into_label(self) -> String {
        match self {
            RawLabel::Int(v) => v.to_string(),
            // Integral floats come from tables that promoted ids to float
            RawLabel::Float(v) if v.fract() == 0.0 => format!("{}", v as i64),
            RawLabel::Float(v) => v.to_string(),
            RawLabel::Str(s) => s,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawBeforeCluster {
    label: RawLabel,
    #[serde(default)]
    nodes: Option<Vec<u64>>,
    #[serde(default)]
    descendants: Option<Vec<RawLabel>>,
    #[serde(default)]
    extant: Option<bool>,
}

impl TryFrom<RawBeforeCluster> for BeforeCluster {
    type Error = AnalysisError;

    fn try_from(raw: RawBeforeCluster) -> std::result::Result<Self, Self::Error> {
        let label = raw.label.into_label();
        let nodes = raw.nodes.ok_or_else(|| AnalysisError::MissingField {
            cluster: label.clone(),
            field: "nodes",
        })?;

        Ok(BeforeCluster {
            label,
            nodes,
            descendants: raw
                .descendants
                .map(|ids| ids.into_iter().map(RawLabel::into_label).collect()),
            extant: raw.extant,
        })
    }
}

/// Parse a before-generation JSON array; every record must list its nodes
pub fn parse_before(json: &str) -> Result<Vec<BeforeCluster>> {
    let raw: Vec<RawBeforeCluster> = serde_json::from_str(json)?;
    let clusters = raw
        .into_iter()
        .map(BeforeCluster::try_from)
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(clusters)
}

/// Load the before-generation clusters of a refinement step
pub fn load_before(path: &Path) -> Result<Vec<BeforeCluster>> {
    log::info!("Reading lineage provenance: {}", path.display());

    let json = fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let clusters = parse_before(&json).with_context(|| format!("parsing {}", path.display()))?;

    log::info!("Loaded {} before-clusters", clusters.len());
    Ok(clusters)
}
