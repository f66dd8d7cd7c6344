//! Configuration management for the cluster quality analyzer

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::ValueEnum;

use crate::error::{AnalysisError, Result};

/// How per-cluster modularities are combined into the graph-level value.
///
/// Both forms are in use downstream and differ by a factor of `1/(2m)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ModularityScale {
    /// Plain sum of per-cluster modularity
    #[default]
    Sum,
    /// Sum divided once more by `2m`
    InverseTwoM,
}

/// Options for a metrics run
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// CPM resolution; `None` omits the CPM column entirely
    pub resolution: Option<f64>,

    /// Aggregation of the overall modularity
    pub modularity_scale: ModularityScale,

    /// Whether to compute the maximum k-truss of every cluster
    pub compute_ktruss: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            resolution: None,
            modularity_scale: ModularityScale::Sum,
            compute_ktruss: false,
        }
    }
}

impl Config {
    /// Create a new configuration with custom values
    pub fn new(
        resolution: Option<f64>,
        modularity_scale: ModularityScale,
        compute_ktruss: bool,
    ) -> Self {
        Self {
            resolution,
            modularity_scale,
            compute_ktruss,
        }
    }
}

/// Community-detection algorithm that produced a clustering
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ClustererSpec {
    /// Leiden optimizing CPM; requires a resolution
    Leiden,
    /// Leiden optimizing modularity; takes no parameter
    #[value(name = "leiden_mod")]
    LeidenMod,
    /// Iterative k-core clustering; requires k
    Ikc,
}

impl fmt::Display for ClustererSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_possible_value() {
            Some(value) => f.write_str(value.get_name()),
            None => Ok(()),
        }
    }
}

/// A clusterer choice together with its parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClustererSelection {
    pub spec: ClustererSpec,
    pub resolution: Option<f64>,
    pub k: Option<u32>,
}

impl ClustererSelection {
    /// Check that exactly the parameters the clusterer needs are present
    pub fn validate(&self) -> Result<()> {
        let problem = match (self.spec, self.resolution, self.k) {
            (_, Some(_), Some(_)) => Some("a resolution and k are mutually exclusive"),
            (ClustererSpec::Leiden, None, _) => Some("leiden requires a resolution"),
            (ClustererSpec::LeidenMod, Some(_), _) => {
                Some("leiden_mod does not support a resolution")
            }
            (ClustererSpec::LeidenMod, _, Some(_)) => Some("leiden_mod does not support k"),
            (ClustererSpec::Leiden, _, Some(_)) => Some("leiden does not support k"),
            (ClustererSpec::Ikc, None, None) => Some("ikc requires k"),
            (ClustererSpec::Ikc, Some(_), _) => Some("ikc does not support a resolution"),
            _ => None,
        };

        match problem {
            Some(message) => Err(AnalysisError::Configuration(message.to_string())),
            None => Ok(()),
        }
    }
}

/// One clustering configuration of a batch
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    /// Path of the clustering file; its stats file sits beside it
    pub clustering: PathBuf,
    pub resolution: Option<f64>,
    pub clusterer: ClustererSpec,
}

impl RunConfig {
    /// Path of the metrics report written for this clustering
    pub fn stats_path(&self) -> PathBuf {
        sibling_with_suffix(&self.clustering, "_stats.csv")
    }
}

/// Clustering configurations summarized together
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BatchConfig {
    pub runs: Vec<RunConfig>,
}

impl BatchConfig {
    /// Parse whitespace-separated `clustering resolution clusterer` lines
    pub fn parse(contents: &str) -> Result<Self> {
        let mut runs = Vec::new();

        for (line_no, line) in contents.lines().enumerate() {
            let fields: Vec<&str> = line.split_whitespace().collect();
            if fields.is_empty() {
                continue;
            }
            if fields.len() != 3 {
                return Err(AnalysisError::Malformed {
                    source_name: "batch configuration".to_string(),
                    message: format!(
                        "line {} has {} fields, expected clustering, resolution and clusterer",
                        line_no + 1,
                        fields.len()
                    ),
                });
            }

            let resolution = fields[1].parse::<f64>().ok().filter(|r| *r >= 0.0);
            let clusterer = ClustererSpec::from_str(fields[2], false).map_err(|_| {
                AnalysisError::Malformed {
                    source_name: "batch configuration".to_string(),
                    message: format!("line {} names unknown clusterer {}", line_no + 1, fields[2]),
                }
            })?;
            runs.push(RunConfig {
                clustering: PathBuf::from(fields[0]),
                resolution,
                clusterer,
            });
        }

        Ok(Self { runs })
    }

    /// Load a batch configuration from disk
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("reading batch configuration {}", path.display()))?;
        Ok(Self::parse(&contents)?)
    }
}

/// `dir/name.ext` -> `dir/name{suffix}`
pub fn sibling_with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!("{}{}", stem, suffix))
}
