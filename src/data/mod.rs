//! Input loading: edge lists, clusterings, lineage provenance and reports

pub mod assignment;
pub mod edgelist;
pub mod provenance;
pub mod stats;

use std::path::Path;

use anyhow::{anyhow, Result};
use polars::prelude::*;

/// Read a headerless tab-separated file with two columns
pub(crate) fn read_two_column_tsv(path: &Path) -> Result<DataFrame> {
    if !path.exists() {
        return Err(anyhow!("File not found: {}", path.display()));
    }

    let df = LazyCsvReader::new(path)
        .with_has_header(false)
        .with_separator(b'\t')
        .with_infer_schema_length(None)
        .finish()?
        .collect()?;

    if df.width() < 2 {
        return Err(anyhow!(
            "{} has {} column(s), expected two tab-separated columns",
            path.display(),
            df.width()
        ));
    }

    Ok(df)
}

/// Column `idx` as signed integers; nulls are an error
pub(crate) fn integer_column(df: &DataFrame, idx: usize, path: &Path) -> Result<Vec<u64>> {
    let column = df.get_columns()[idx].cast(&DataType::Int64)?;
    column
        .i64()?
        .into_iter()
        .enumerate()
        .map(|(row, value)| match value {
            Some(v) if v >= 0 => Ok(v as u64),
            _ => Err(anyhow!(
                "{}: row {} column {} is not a node id",
                path.display(),
                row + 1,
                idx + 1
            )),
        })
        .collect()
}

/// Column `idx` rendered as strings
pub(crate) fn label_column(df: &DataFrame, idx: usize, path: &Path) -> Result<Vec<String>> {
    let column = df.get_columns()[idx].cast(&DataType::String)?;
    column
        .str()?
        .into_iter()
        .enumerate()
        .map(|(row, value)| {
            value.map(str::to_string).ok_or_else(|| {
                anyhow!("{}: row {} has no cluster id", path.display(), row + 1)
            })
        })
        .collect()
}
