//! Distributional summaries of a metrics report

use itertools::Itertools;
use serde::Serialize;
use statrs::statistics::Statistics;

use crate::cluster::{MetricRow, MetricsReport};

/// Spread of one metric over the clusters of a run
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Distribution {
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub mean: f64,
    pub q3: f64,
    pub max: f64,
}

impl Distribution {
    /// Summarize the finite values; `None` when there are none
    pub fn from_values<I: IntoIterator<Item = f64>>(values: I) -> Option<Self> {
        let mut sorted: Vec<f64> = values.into_iter().filter(|v| v.is_finite()).collect();
        if sorted.is_empty() {
            return None;
        }
        sorted.sort_by(|a, b| a.total_cmp(b));

        Some(Self {
            min: sorted.as_slice().min(),
            q1: quantile(&sorted, 0.25),
            median: quantile(&sorted, 0.5),
            mean: sorted.as_slice().mean(),
            q3: quantile(&sorted, 0.75),
            max: sorted.as_slice().max(),
        })
    }

    /// min, q1, median, q3, max
    pub fn five_number(&self) -> [f64; 5] {
        [self.min, self.q1, self.median, self.q3, self.max]
    }

    /// Compact rendering of the five-number summary, e.g. `[1, 2, 3, 4, 5]`
    pub fn compact(&self) -> String {
        format!("[{}]", self.five_number().iter().join(", "))
    }
}

/// Quantile of sorted values, interpolating linearly between order statistics
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let position = q * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let weight = position - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * weight
}

/// Output layout for summaries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SummaryShape {
    /// One flat column per statistic
    #[default]
    Wide,
    /// One column holding the five-number summary per metric
    Compact,
}

/// A single cell of a summary row
#[derive(Debug, Clone, PartialEq)]
pub enum SummaryValue {
    Number(Option<f64>),
    Text(Option<String>),
}

/// Headline figures of one clustering run
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct RunSummary {
    pub network: String,
    pub num_clusters: usize,
    pub network_n: usize,
    pub network_m: usize,
    pub total_n: usize,
    pub total_m: usize,
    pub cluster_size: Option<Distribution>,
    pub total_modularity: Option<f64>,
    pub modularity: Option<Distribution>,
    pub total_cpm_score: Option<f64>,
    pub cpm: Option<Distribution>,
    pub conductance: Option<Distribution>,
    pub mincuts: Option<Distribution>,
    pub mincuts_normalized: Option<Distribution>,
    /// Empty unless the report carries the k-truss column
    pub max_ktruss: Option<Distribution>,
}

impl RunSummary {
    /// Distributions over the cluster rows; totals from the Overall row
    pub fn from_report(network: &str, report: &MetricsReport) -> Self {
        let rows = &report.clusters;
        let over = |f: fn(&MetricRow) -> Option<f64>| Distribution::from_values(rows.iter().filter_map(f));

        Self {
            network: network.to_string(),
            num_clusters: rows.len(),
            network_n: report.overall.n,
            network_m: report.overall.m,
            total_n: rows.iter().map(|r| r.n).sum(),
            total_m: rows.iter().map(|r| r.m).sum(),
            cluster_size: over(|r| Some(r.n as f64)),
            total_modularity: report.overall.modularity,
            modularity: over(|r| r.modularity),
            total_cpm_score: report.overall.cpm_score,
            cpm: over(|r| r.cpm_score),
            conductance: over(|r| r.conductance),
            mincuts: over(|r| r.connectivity.map(|c| c as f64)),
            mincuts_normalized: over(|r| r.connectivity_normalized),
            max_ktruss: over(|r| r.max_ktruss.map(|k| k as f64)),
        }
    }

    /// Column names of the given shape, for tables without any run
    pub fn empty_field_names(shape: SummaryShape) -> Vec<String> {
        RunSummary::default()
            .fields(shape)
            .into_iter()
            .map(|(name, _)| name)
            .collect()
    }

    /// Named cells in output order for the requested shape
    pub fn fields(&self, shape: SummaryShape) -> Vec<(String, SummaryValue)> {
        let count = |v: usize| SummaryValue::Number(Some(v as f64));
        let mut fields = vec![
            ("network".to_string(), SummaryValue::Text(Some(self.network.clone()))),
            ("num_clusters".to_string(), count(self.num_clusters)),
            ("network_n".to_string(), count(self.network_n)),
            ("network_m".to_string(), count(self.network_m)),
            ("total_n".to_string(), count(self.total_n)),
            ("total_m".to_string(), count(self.total_m)),
        ];

        let metrics: [(&str, Option<f64>, Option<Distribution>, bool); 7] = [
            ("cluster_size", None, self.cluster_size, false),
            ("modularity", self.total_modularity, self.modularity, true),
            ("cpm", self.total_cpm_score, self.cpm, true),
            ("conductance", None, self.conductance, false),
            ("mincuts", None, self.mincuts, false),
            ("mincuts_normalized", None, self.mincuts_normalized, false),
            ("max_ktruss", None, self.max_ktruss, false),
        ];

        for (name, total, distribution, has_total) in metrics {
            if has_total {
                let total_name = if name == "cpm" {
                    "total_cpm_score".to_string()
                } else {
                    format!("total_{}", name)
                };
                fields.push((total_name, SummaryValue::Number(total)));
            }

            match shape {
                SummaryShape::Wide => {
                    let stats = [
                        ("min", distribution.map(|d| d.min)),
                        ("q1", distribution.map(|d| d.q1)),
                        ("med", distribution.map(|d| d.median)),
                        ("mean", distribution.map(|d| d.mean)),
                        ("q3", distribution.map(|d| d.q3)),
                        ("max", distribution.map(|d| d.max)),
                    ];
                    for (stat, value) in stats {
                        fields.push((format!("{}_{}", name, stat), SummaryValue::Number(value)));
                    }
                }
                SummaryShape::Compact => {
                    fields.push((
                        format!("{}_dist", name),
                        SummaryValue::Text(distribution.map(|d| d.compact())),
                    ));
                    fields.push((
                        format!("{}_mean", name),
                        SummaryValue::Number(distribution.map(|d| d.mean)),
                    ));
                }
            }
        }

        fields
    }
}
