//! Results persistence module

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use polars::prelude::*;
use serde_json::to_string_pretty;

use crate::cluster::{KTruss, MetricsReport};
use crate::lineage::{LineageRecord, ProvenanceRecord};
use crate::report::{BatchRow, RunSummary, SummaryShape, SummaryValue};

/// Metrics report as a table; optional metric families appear only when computed
pub fn metrics_frame(report: &MetricsReport) -> Result<DataFrame> {
    let rows: Vec<_> = report.rows().collect();

    let mut columns = vec![
        Column::new("cluster".into(), rows.iter().map(|r| r.cluster.clone()).collect::<Vec<_>>()),
        Column::new("n".into(), rows.iter().map(|r| r.n as u64).collect::<Vec<_>>()),
        Column::new("m".into(), rows.iter().map(|r| r.m as u64).collect::<Vec<_>>()),
        Column::new("modularity".into(), rows.iter().map(|r| r.modularity).collect::<Vec<_>>()),
    ];

    if report.columns.cpm {
        columns.push(Column::new(
            "cpm_score".into(),
            rows.iter().map(|r| r.cpm_score).collect::<Vec<_>>(),
        ));
    }

    columns.push(Column::new(
        "connectivity".into(),
        rows.iter().map(|r| r.connectivity.map(|c| c as u64)).collect::<Vec<_>>(),
    ));
    columns.push(Column::new(
        "connectivity_normalized".into(),
        rows.iter().map(|r| r.connectivity_normalized).collect::<Vec<_>>(),
    ));
    columns.push(Column::new(
        "conductance".into(),
        rows.iter().map(|r| r.conductance).collect::<Vec<_>>(),
    ));

    if report.columns.ktruss {
        columns.push(Column::new(
            "max_ktruss".into(),
            rows.iter().map(|r| r.max_ktruss.map(|k| k as u64)).collect::<Vec<_>>(),
        ));
    }

    Ok(DataFrame::new(columns)?)
}

/// Fate rows, one per (before-cluster, active descendant) pair
pub fn fate_frame(records: &[LineageRecord]) -> Result<DataFrame> {
    let rows: Vec<_> = records.iter().flat_map(|record| record.rows()).collect();

    let columns = vec![
        Column::new(
            "input_cluster".into(),
            rows.iter().map(|r| r.input_cluster.to_string()).collect::<Vec<_>>(),
        ),
        Column::new(
            "input_cluster_size".into(),
            rows.iter().map(|r| r.input_cluster_size as u64).collect::<Vec<_>>(),
        ),
        Column::new(
            "descendant_cluster_id".into(),
            rows.iter()
                .map(|r| r.descendant_cluster_id.map(str::to_string))
                .collect::<Vec<_>>(),
        ),
        Column::new(
            "descendant_cluster_size".into(),
            rows.iter()
                .map(|r| r.descendant_cluster_size.map(|s| s as u64))
                .collect::<Vec<_>>(),
        ),
        Column::new(
            "num_active_descendants".into(),
            rows.iter().map(|r| r.num_active_descendants as u64).collect::<Vec<_>>(),
        ),
        Column::new("size_ratio".into(), rows.iter().map(|r| r.size_ratio).collect::<Vec<_>>()),
        Column::new(
            "fate".into(),
            rows.iter().map(|r| r.fate.as_str().to_string()).collect::<Vec<_>>(),
        ),
    ];

    Ok(DataFrame::new(columns)?)
}

/// One row per node of each cluster's maximum k-truss
pub fn ktruss_frame(trusses: &[(String, Option<KTruss>)]) -> Result<DataFrame> {
    let mut clusters = Vec::new();
    let mut ks = Vec::new();
    let mut nodes = Vec::new();

    for (cluster, truss) in trusses {
        if let Some(truss) = truss {
            for &node in &truss.nodes {
                clusters.push(cluster.clone());
                ks.push(truss.k as u64);
                nodes.push(node);
            }
        }
    }

    Ok(DataFrame::new(vec![
        Column::new("cluster".into(), clusters),
        Column::new("ktruss_vals".into(), ks),
        Column::new("ktruss_nodes".into(), nodes),
    ])?)
}

/// Batch summary, one row per clustering configuration
pub fn batch_frame(rows: &[BatchRow], shape: SummaryShape) -> Result<DataFrame> {
    let mut columns = vec![
        Column::new(
            "clustering".into(),
            rows.iter().map(|r| r.clustering.clone()).collect::<Vec<_>>(),
        ),
        Column::new(
            "clusterer".into(),
            rows.iter().map(|r| r.clusterer.to_string()).collect::<Vec<_>>(),
        ),
        Column::new(
            "resolution".into(),
            rows.iter().map(|r| r.resolution).collect::<Vec<_>>(),
        ),
    ];

    let fields: Vec<Vec<(String, SummaryValue)>> =
        rows.iter().map(|r| r.summary.fields(shape)).collect();

    let names: Vec<String> = match fields.first() {
        Some(first) => first.iter().map(|(name, _)| name.clone()).collect(),
        None => RunSummary::empty_field_names(shape),
    };

    for (idx, name) in names.iter().enumerate() {
        let is_text = fields
            .first()
            .map(|f| matches!(f[idx].1, SummaryValue::Text(_)))
            .unwrap_or(false);

        let column = if is_text {
            let values: Vec<Option<String>> = fields
                .iter()
                .map(|f| match &f[idx].1 {
                    SummaryValue::Text(text) => text.clone(),
                    SummaryValue::Number(value) => value.map(|v| v.to_string()),
                })
                .collect();
            Column::new(name.as_str().into(), values)
        } else {
            let values: Vec<Option<f64>> = fields
                .iter()
                .map(|f| match &f[idx].1 {
                    SummaryValue::Number(value) => *value,
                    SummaryValue::Text(_) => None,
                })
                .collect();
            Column::new(name.as_str().into(), values)
        };
        columns.push(column);
    }

    Ok(DataFrame::new(columns)?)
}

/// Numeric fields of one run as `metric,value` pairs
pub fn run_summary_frame(summary: &RunSummary) -> Result<DataFrame> {
    let (names, values): (Vec<String>, Vec<Option<f64>>) = summary
        .fields(SummaryShape::Wide)
        .into_iter()
        .filter_map(|(name, value)| match value {
            SummaryValue::Number(v) => Some((name, v)),
            SummaryValue::Text(_) => None,
        })
        .unzip();

    Ok(DataFrame::new(vec![
        Column::new("metric".into(), names),
        Column::new("value".into(), values),
    ])?)
}

/// Cluster-size frequency table
pub fn frequency_frame(frequency: &BTreeMap<usize, usize>) -> Result<DataFrame> {
    Ok(DataFrame::new(vec![
        Column::new("n".into(), frequency.keys().map(|&n| n as u64).collect::<Vec<_>>()),
        Column::new("count".into(), frequency.values().map(|&c| c as u64).collect::<Vec<_>>()),
    ])?)
}

/// Write a table as comma-separated values with a header row
pub fn write_csv(df: &mut DataFrame, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let mut file = File::create(path)
        .with_context(|| format!("creating {}", path.display()))?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .finish(df)?;

    log::info!("Wrote {} rows to {}", df.height(), path.display());
    Ok(())
}

pub fn save_metrics_report(report: &MetricsReport, path: &Path) -> Result<()> {
    write_csv(&mut metrics_frame(report)?, path)
}

pub fn save_fate_report(records: &[LineageRecord], path: &Path) -> Result<()> {
    write_csv(&mut fate_frame(records)?, path)
}

pub fn save_ktruss_nodes(trusses: &[(String, Option<KTruss>)], path: &Path) -> Result<()> {
    write_csv(&mut ktruss_frame(trusses)?, path)
}

pub fn save_batch_summary(rows: &[BatchRow], shape: SummaryShape, path: &Path) -> Result<()> {
    write_csv(&mut batch_frame(rows, shape)?, path)
}

pub fn save_run_summary(summary: &RunSummary, path: &Path) -> Result<()> {
    write_csv(&mut run_summary_frame(summary)?, path)
}

pub fn save_frequency(frequency: &BTreeMap<usize, usize>, path: &Path) -> Result<()> {
    write_csv(&mut frequency_frame(frequency)?, path)
}

/// Save descendant sizes of every non-extant cluster as a JSON array
pub fn save_provenance(records: &[LineageRecord], path: &Path) -> Result<()> {
    let provenance: Vec<ProvenanceRecord> = records
        .iter()
        .filter_map(LineageRecord::provenance)
        .collect();

    log::info!("Saving provenance for {} refined clusters", provenance.len());

    let mut file = File::create(path)
        .with_context(|| format!("creating {}", path.display()))?;
    file.write_all(to_string_pretty(&provenance)?.as_bytes())?;

    Ok(())
}
