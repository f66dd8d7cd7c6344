//! Reading metrics reports written by a previous run

use std::path::Path;

use anyhow::{anyhow, Result};
use polars::prelude::*;

use crate::cluster::metrics::{MetricColumns, MetricRow, MetricsReport, OVERALL_LABEL};
use crate::error::AnalysisError;

/// Load a metrics report CSV; its last row must be the Overall row
pub fn load_report(path: &Path) -> Result<MetricsReport> {
    if !path.exists() {
        return Err(anyhow!("File not found: {}", path.display()));
    }

    log::debug!("Reading metrics report: {}", path.display());

    // Numeric cluster labels must not be typed before the trailing Overall row is seen
    let df = LazyCsvReader::new(path)
        .with_has_header(true)
        .with_infer_schema_length(None)
        .finish()?
        .collect()?;

    report_from_frame(&df, &path.display().to_string())
}

/// Rebuild a report from its tabular form
pub fn report_from_frame(df: &DataFrame, source_name: &str) -> Result<MetricsReport> {
    let malformed = |message: String| AnalysisError::Malformed {
        source_name: source_name.to_string(),
        message,
    };

    let labels: Vec<String> = df
        .column("cluster")?
        .cast(&DataType::String)?
        .str()?
        .into_iter()
        .map(|v| v.unwrap_or_default().to_string())
        .collect();

    let n = required_counts(df, "n")?;
    let m = required_counts(df, "m")?;
    let modularity = optional_floats(df, "modularity")?.unwrap_or_else(|| vec![None; df.height()]);
    let cpm = optional_floats(df, "cpm_score")?;
    let connectivity = optional_floats(df, "connectivity")?.unwrap_or_else(|| vec![None; df.height()]);
    let normalized =
        optional_floats(df, "connectivity_normalized")?.unwrap_or_else(|| vec![None; df.height()]);
    let conductance = optional_floats(df, "conductance")?.unwrap_or_else(|| vec![None; df.height()]);
    let ktruss = optional_floats(df, "max_ktruss")?;

    let mut rows: Vec<MetricRow> = (0..df.height())
        .map(|i| MetricRow {
            cluster: labels[i].clone(),
            n: n[i],
            m: m[i],
            modularity: modularity[i],
            cpm_score: cpm.as_ref().and_then(|c| c[i]),
            connectivity: connectivity[i].map(|c| c as usize),
            connectivity_normalized: normalized[i],
            conductance: conductance[i],
            max_ktruss: ktruss.as_ref().and_then(|k| k[i]).map(|k| k as usize),
        })
        .collect();

    let overall = match rows.pop() {
        Some(row) if row.cluster == OVERALL_LABEL => row,
        _ => return Err(malformed(format!("last row is not {}", OVERALL_LABEL)).into()),
    };

    if rows.iter().any(|row| row.cluster == OVERALL_LABEL) {
        return Err(malformed(format!("more than one {} row", OVERALL_LABEL)).into());
    }

    Ok(MetricsReport {
        clusters: rows,
        overall,
        columns: MetricColumns {
            cpm: cpm.is_some(),
            ktruss: ktruss.is_some(),
        },
    })
}

fn required_counts(df: &DataFrame, name: &str) -> Result<Vec<usize>> {
    let column = df.column(name)?.cast(&DataType::Float64)?;
    column
        .f64()?
        .into_iter()
        .enumerate()
        .map(|(row, value)| match value {
            Some(v) if v >= 0.0 => Ok(v as usize),
            _ => Err(anyhow!("row {} has no value for {}", row + 1, name)),
        })
        .collect()
}

fn optional_floats(df: &DataFrame, name: &str) -> Result<Option<Vec<Option<f64>>>> {
    let Ok(column) = df.column(name) else {
        return Ok(None);
    };
    let column = column.cast(&DataType::Float64)?;
    let values = column
        .f64()?
        .into_iter()
        .map(|v| v.filter(|x| x.is_finite()))
        .collect();
    Ok(Some(values))
}
