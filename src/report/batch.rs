//! Cross-run summaries over many clustering configurations

use std::path::Path;

use anyhow::Result;
use log;
use rayon::prelude::*;

use crate::cluster::MetricsReport;
use crate::config::{BatchConfig, ClustererSpec, RunConfig};
use crate::data::stats::load_report;
use crate::error::AnalysisError;
use crate::report::summary::RunSummary;

/// One row of the batch table: a configuration and its summary
#[derive(Debug, Clone, PartialEq)]
pub struct BatchRow {
    pub clustering: String,
    pub clusterer: ClustererSpec,
    pub resolution: Option<f64>,
    pub summary: RunSummary,
}

/// Summarizes the metrics reports of every run in a batch configuration
pub struct BatchSummarizer {
    config: BatchConfig,
    network: String,
}

impl BatchSummarizer {
    pub fn new(config: BatchConfig, network: impl Into<String>) -> Self {
        Self {
            config,
            network: network.into(),
        }
    }

    /// Fail on the first configuration whose metrics report is absent
    pub fn check_artifacts(&self) -> std::result::Result<(), AnalysisError> {
        for run in &self.config.runs {
            let path = run.stats_path();
            if !path.exists() {
                return Err(AnalysisError::MissingArtifact {
                    configuration: run.clustering.display().to_string(),
                    path,
                });
            }
        }
        Ok(())
    }

    /// Load every run's report and summarize it, in configuration order
    pub fn summarize(&self) -> Result<Vec<BatchRow>> {
        self.check_artifacts()?;

        log::info!("Summarizing {} clustering configurations", self.config.runs.len());

        let reports: Vec<(&RunConfig, MetricsReport)> = self
            .config
            .runs
            .par_iter()
            .map(|run| -> Result<(&RunConfig, MetricsReport)> {
                let report = load_report(&run.stats_path())?;
                Ok((run, report))
            })
            .collect::<Result<_>>()?;

        Ok(self.summarize_reports(&reports))
    }

    /// Summarize already loaded reports alongside the run that produced them
    pub fn summarize_reports(&self, reports: &[(&RunConfig, MetricsReport)]) -> Vec<BatchRow> {
        reports
            .iter()
            .map(|(run, report)| BatchRow {
                clustering: run.clustering.display().to_string(),
                clusterer: run.clusterer,
                resolution: run.resolution,
                summary: RunSummary::from_report(&self.network, report),
            })
            .collect()
    }

    pub fn network(&self) -> &str {
        &self.network
    }

    pub fn runs(&self) -> usize {
        self.config.runs.len()
    }
}

/// Name a single-run summary after its stats file
pub fn run_name(stats_path: &Path) -> String {
    stats_path
        .file_stem()
        .map(|s| s.to_string_lossy().trim_end_matches("_stats").to_string())
        .unwrap_or_default()
}
