//! Cluster fate across a refinement step
//!
//! A before-generation cluster either survives untouched (`extant`), vanishes
//! (`degraded`), survives as one smaller descendant (`reduced`) or breaks into
//! several descendants (`split`). Only descendants that still hold at least
//! one node in the after-generation assignment count as active.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use itertools::Itertools;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::cluster::IntangibleCluster;
use crate::error::{AnalysisError, Result};

/// A cluster of the earlier generation with its provenance annotations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BeforeCluster {
    pub label: String,
    pub nodes: Vec<u64>,
    /// Candidate descendant ids recorded by the refinement step
    pub descendants: Option<Vec<String>>,
    /// Whether refinement left the cluster untouched
    pub extant: Option<bool>,
}

impl BeforeCluster {
    /// A cluster carried over without refinement, descending only to itself
    pub fn unrefined(cluster: &IntangibleCluster) -> Self {
        Self {
            label: cluster.index.clone(),
            nodes: cluster.nodes.clone(),
            descendants: Some(vec![cluster.index.clone()]),
            extant: Some(true),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Fate {
    Extant,
    Degraded,
    Reduced,
    Split,
}

impl Fate {
    pub fn as_str(&self) -> &'static str {
        match self {
            Fate::Extant => "extant",
            Fate::Degraded => "degraded",
            Fate::Reduced => "reduced",
            Fate::Split => "split",
        }
    }

    /// Classify from the extant flag and the number of active descendants
    pub fn classify(extant: bool, active_descendants: usize) -> Self {
        if extant {
            return Fate::Extant;
        }
        match active_descendants {
            0 => Fate::Degraded,
            1 => Fate::Reduced,
            _ => Fate::Split,
        }
    }
}

impl fmt::Display for Fate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How one before-cluster fared
#[derive(Debug, Clone, PartialEq)]
pub struct LineageRecord {
    pub input_cluster: String,
    pub input_cluster_size: usize,
    pub extant: bool,
    /// Active descendants and their sizes, in provenance order
    pub descendants: Vec<(String, usize)>,
    pub fate: Fate,
}

/// One output row: a before-cluster paired with one of its descendants
#[derive(Debug, Clone, PartialEq)]
pub struct FateRow<'a> {
    pub input_cluster: &'a str,
    pub input_cluster_size: usize,
    pub descendant_cluster_id: Option<&'a str>,
    pub descendant_cluster_size: Option<usize>,
    pub num_active_descendants: usize,
    pub size_ratio: f64,
    pub fate: Fate,
}

/// Descendant sizes of a non-extant cluster, fed to the next refinement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProvenanceRecord {
    pub input_cluster: String,
    pub n: usize,
    pub descendants: BTreeMap<String, usize>,
}

impl LineageRecord {
    pub fn num_active_descendants(&self) -> usize {
        self.descendants.len()
    }

    /// Ratio of a descendant's size to this cluster's size
    pub fn ratio_for(&self, descendant_size: Option<usize>) -> f64 {
        if self.extant {
            return 1.0;
        }
        match descendant_size {
            Some(size) if self.input_cluster_size > 0 => {
                size as f64 / self.input_cluster_size as f64
            }
            _ => 0.0,
        }
    }

    /// Whole-cluster size ratio; split clusters only have per-descendant ratios
    pub fn size_ratio(&self) -> Option<f64> {
        match self.fate {
            Fate::Extant => Some(1.0),
            Fate::Degraded => Some(0.0),
            Fate::Reduced => Some(self.ratio_for(self.descendants.first().map(|(_, size)| *size))),
            Fate::Split => None,
        }
    }

    /// One row per active descendant, or a single row with no descendant
    pub fn rows(&self) -> impl Iterator<Item = FateRow<'_>> + '_ {
        let placeholder = if self.descendants.is_empty() {
            Some(FateRow {
                input_cluster: &self.input_cluster,
                input_cluster_size: self.input_cluster_size,
                descendant_cluster_id: None,
                descendant_cluster_size: None,
                num_active_descendants: 0,
                size_ratio: self.ratio_for(None),
                fate: self.fate,
            })
        } else {
            None
        };

        self.descendants
            .iter()
            .map(move |(id, size)| FateRow {
                input_cluster: &self.input_cluster,
                input_cluster_size: self.input_cluster_size,
                descendant_cluster_id: Some(id.as_str()),
                descendant_cluster_size: Some(*size),
                num_active_descendants: self.descendants.len(),
                size_ratio: self.ratio_for(Some(*size)),
                fate: self.fate,
            })
            .chain(placeholder)
    }

    /// Provenance export entry, absent for extant clusters
    pub fn provenance(&self) -> Option<ProvenanceRecord> {
        if self.extant {
            return None;
        }
        Some(ProvenanceRecord {
            input_cluster: self.input_cluster.clone(),
            n: self.input_cluster_size,
            descendants: self.descendants.iter().cloned().collect(),
        })
    }
}

/// Classifies before-clusters against an after-generation assignment
pub struct LineageTracker {
    after_sizes: HashMap<String, usize>,
}

impl LineageTracker {
    /// `after_sizes` maps every after-generation cluster id to its node count
    pub fn new(after_sizes: HashMap<String, usize>) -> Self {
        Self { after_sizes }
    }

    pub fn track(&self, before: &[BeforeCluster]) -> Result<Vec<LineageRecord>> {
        log::info!(
            "Tracing {} before-clusters against {} after-clusters",
            before.len(),
            self.after_sizes.len()
        );

        let records: Vec<LineageRecord> = before
            .par_iter()
            .map(|cluster| self.record(cluster))
            .collect::<Result<_>>()?;

        if log::log_enabled!(log::Level::Info) {
            let mut counts: BTreeMap<&'static str, usize> = BTreeMap::new();
            for record in &records {
                *counts.entry(record.fate.as_str()).or_insert(0) += 1;
            }
            log::info!("Cluster fates: {:?}", counts);
        }

        Ok(records)
    }

    fn record(&self, cluster: &BeforeCluster) -> Result<LineageRecord> {
        if cluster.nodes.is_empty() {
            return Err(AnalysisError::EmptyCluster(cluster.label.clone()));
        }

        let extant = cluster.extant.ok_or_else(|| AnalysisError::MissingField {
            cluster: cluster.label.clone(),
            field: "extant",
        })?;

        let descendants: Vec<(String, usize)> = match (&cluster.descendants, extant) {
            (Some(candidates), _) => candidates
                .iter()
                .unique()
                .filter_map(|id| self.after_sizes.get(id).map(|&size| (id.clone(), size)))
                .collect(),
            (None, true) => Vec::new(),
            (None, false) => {
                return Err(AnalysisError::MissingField {
                    cluster: cluster.label.clone(),
                    field: "descendants",
                })
            }
        };

        let fate = Fate::classify(extant, descendants.len());

        Ok(LineageRecord {
            input_cluster: cluster.label.clone(),
            input_cluster_size: cluster.nodes.len(),
            extant,
            descendants,
            fate,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn before(label: &str, size: u64, descendants: Option<&[&str]>, extant: Option<bool>) -> BeforeCluster {
        BeforeCluster {
            label: label.to_string(),
            nodes: (0..size).collect(),
            descendants: descendants.map(|d| d.iter().map(|s| s.to_string()).collect()),
            extant,
        }
    }

    fn tracker(sizes: &[(&str, usize)]) -> LineageTracker {
        LineageTracker::new(sizes.iter().map(|(id, n)| (id.to_string(), *n)).collect())
    }

    #[test]
    fn test_extant_overrides_descendants() {
        let tracker = tracker(&[("a", 3), ("b", 2)]);
        let records = tracker
            .track(&[before("0", 10, Some(&["a", "b"]), Some(true))])
            .unwrap();

        assert_eq!(records[0].fate, Fate::Extant);
        assert!(records[0].rows().all(|row| row.size_ratio == 1.0 && row.fate == Fate::Extant));
        assert_eq!(records[0].size_ratio(), Some(1.0));
        assert_eq!(records[0].provenance(), None);
    }

    #[test]
    fn test_degraded_when_descendants_vanished() {
        let tracker = tracker(&[("a", 3)]);
        let records = tracker
            .track(&[before("0", 10, Some(&["gone", "also_gone"]), Some(false))])
            .unwrap();

        let record = &records[0];
        assert_eq!(record.fate, Fate::Degraded);
        assert_eq!(record.num_active_descendants(), 0);
        assert_eq!(record.size_ratio(), Some(0.0));

        let rows: Vec<FateRow> = record.rows().collect();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].descendant_cluster_id, None);
        assert_eq!(rows[0].descendant_cluster_size, None);
        assert_eq!(rows[0].size_ratio, 0.0);
    }

    #[test]
    fn test_reduced_ratio() {
        let tracker = tracker(&[("a", 4)]);
        let records = tracker
            .track(&[before("0", 10, Some(&["a", "gone"]), Some(false))])
            .unwrap();

        assert_eq!(records[0].fate, Fate::Reduced);
        assert_eq!(records[0].size_ratio(), Some(0.4));
        assert_eq!(records[0].rows().next().unwrap().size_ratio, 0.4);
    }

    #[test]
    fn test_split_explodes_rows() {
        let tracker = tracker(&[("a", 4), ("b", 5)]);
        let records = tracker
            .track(&[before("0", 10, Some(&["a", "b"]), Some(false))])
            .unwrap();

        let record = &records[0];
        assert_eq!(record.fate, Fate::Split);
        assert_eq!(record.size_ratio(), None);

        let rows: Vec<FateRow> = record.rows().collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].descendant_cluster_id, Some("a"));
        assert_eq!(rows[0].size_ratio, 0.4);
        assert_eq!(rows[1].size_ratio, 0.5);
        assert!(rows.iter().all(|r| r.num_active_descendants == 2));

        // Rows can be produced again
        assert_eq!(record.rows().count(), 2);

        let provenance = record.provenance().unwrap();
        assert_eq!(provenance.n, 10);
        assert_eq!(provenance.descendants.get("b"), Some(&5));
    }

    #[test]
    fn test_missing_extant_fails() {
        let tracker = tracker(&[("a", 4)]);
        let result = tracker.track(&[before("0", 10, Some(&["a"]), None)]);
        assert!(matches!(
            result,
            Err(AnalysisError::MissingField { field: "extant", .. })
        ));
    }

    #[test]
    fn test_empty_before_cluster_fails() {
        let tracker = tracker(&[("a", 4)]);
        let result = tracker.track(&[before("0", 0, Some(&["a"]), Some(false))]);
        assert!(matches!(result, Err(AnalysisError::EmptyCluster(label)) if label == "0"));
    }

    #[test]
    fn test_repeated_candidate_counts_once() {
        let tracker = tracker(&[("a", 4)]);
        let records = tracker
            .track(&[before("0", 10, Some(&["a", "gone", "a"]), Some(false))])
            .unwrap();

        assert_eq!(records[0].fate, Fate::Reduced);
        assert_eq!(records[0].num_active_descendants(), 1);
        assert_eq!(records[0].rows().count(), 1);
    }

    #[test]
    fn test_missing_descendants_for_modified_cluster_fails() {
        let tracker = tracker(&[("a", 4)]);
        let result = tracker.track(&[before("0", 10, None, Some(false))]);
        assert!(matches!(
            result,
            Err(AnalysisError::MissingField { field: "descendants", .. })
        ));
    }

    #[test]
    fn test_all_extant_without_descendant_data() {
        let tracker = tracker(&[("0", 3), ("1", 3)]);
        let records = tracker
            .track(&[before("0", 3, None, Some(true)), before("1", 3, None, Some(true))])
            .unwrap();

        for record in &records {
            assert_eq!(record.fate, Fate::Extant);
            let rows: Vec<FateRow> = record.rows().collect();
            assert_eq!(rows.len(), 1);
            assert_eq!(rows[0].size_ratio, 1.0);
        }
    }

    #[test]
    fn test_unrefined_round_trip() {
        let clusters = vec![
            IntangibleCluster::new("0", vec![1, 2, 3]),
            IntangibleCluster::new("1", vec![4, 5]),
        ];
        let assignment: Vec<(u64, String)> = clusters
            .iter()
            .flat_map(|c| c.nodes.iter().map(move |&n| (n, c.index.clone())))
            .collect();

        let before: Vec<BeforeCluster> = clusters.iter().map(BeforeCluster::unrefined).collect();
        let tracker = LineageTracker::new(crate::data::assignment::cluster_sizes(&assignment));
        let records = tracker.track(&before).unwrap();

        assert!(records.iter().all(|r| r.fate == Fate::Extant));
        assert!(records.iter().all(|r| r.size_ratio() == Some(1.0)));
    }
}
