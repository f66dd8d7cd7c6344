use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Args, Parser, Subcommand};

use cluster_quality_analyzer::cluster::{self, ktruss, MetricsComputer};
use cluster_quality_analyzer::config::{
    sibling_with_suffix, BatchConfig, ClustererSelection, ClustererSpec, Config, ModularityScale,
};
use cluster_quality_analyzer::data::{assignment, edgelist, provenance, stats};
use cluster_quality_analyzer::graph::StoerWagner;
use cluster_quality_analyzer::lineage::LineageTracker;
use cluster_quality_analyzer::report::{self, batch, BatchSummarizer, RunSummary, SummaryShape};
use cluster_quality_analyzer::storage;

#[derive(Parser, Debug)]
#[clap(
    name = "cluster-quality-analyzer",
    about = "Partition quality and cluster lineage analysis"
)]
struct Cli {
    #[clap(subcommand)]
    command: Command,

    /// Number of worker threads (0 = use all available cores)
    #[clap(long, global = true, default_value = "0")]
    threads: usize,

    /// Verbose logging
    #[clap(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Per-cluster quality metrics with an appended Overall row
    Stats(StatsArgs),

    /// Nodes of each cluster's maximum k-truss
    Ktruss(ClusteringArgs),

    /// Fate of every cluster of a previous generation
    Fate(FateArgs),

    /// Distribution summary of one metrics report
    Summarize {
        /// Metrics report written by `stats`
        stats: PathBuf,
    },

    /// Summaries of many clustering configurations
    Batch(BatchArgs),

    /// Number of clusters of each size in a metrics report
    Freq {
        /// Metrics report written by `stats`
        stats: PathBuf,
    },
}

#[derive(Args, Debug)]
struct ClusteringArgs {
    /// Tab-separated edge list of the full graph
    #[clap(long, short)]
    input: PathBuf,

    /// Tab-separated node to cluster assignment
    #[clap(long = "existing-clustering", short = 'e')]
    existing_clustering: PathBuf,

    /// Algorithm that produced the clustering
    #[clap(long, short = 'c', value_enum)]
    clusterer: ClustererSpec,

    /// Resolution of a leiden clustering
    #[clap(long, short = 'g')]
    resolution: Option<f64>,

    /// k of an ikc clustering
    #[clap(long, short = 'k')]
    k: Option<u32>,

    /// Output file (defaults beside the clustering)
    #[clap(long, short)]
    output: Option<PathBuf>,
}

impl ClusteringArgs {
    fn selection(&self) -> ClustererSelection {
        ClustererSelection {
            spec: self.clusterer,
            resolution: self.resolution,
            k: self.k,
        }
    }
}

#[derive(Args, Debug)]
struct StatsArgs {
    #[clap(flatten)]
    clustering: ClusteringArgs,

    /// Also compute the maximum k-truss of every cluster
    #[clap(long)]
    ktruss: bool,

    /// How per-cluster modularity is combined into the Overall value
    #[clap(long, value_enum, default_value = "sum")]
    modularity_scale: ModularityScale,
}

#[derive(Args, Debug)]
struct FateArgs {
    /// Before-generation clusters with descendants and extant flags (JSON)
    #[clap(long = "universal-before", short = 'u')]
    universal_before: PathBuf,

    /// Post-filter clustering
    #[clap(long = "existing-clustering", short = 'e')]
    existing_clustering: PathBuf,

    /// Output file (defaults beside the clustering)
    #[clap(long, short)]
    output: Option<PathBuf>,

    /// Also write descendant sizes of refined clusters as JSON
    #[clap(long)]
    provenance: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct BatchArgs {
    /// Whitespace-separated `clustering resolution clusterer` lines
    #[clap(long)]
    config: PathBuf,

    /// Network name recorded in every row
    #[clap(long)]
    network: String,

    /// Directory receiving summary.csv
    #[clap(long, default_value = ".")]
    output_dir: PathBuf,

    /// One distribution column per metric instead of one column per statistic
    #[clap(long)]
    compact: bool,
}

fn main() -> Result<()> {
    let args = Cli::parse();

    let log_level = if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::new()
        .filter_level(log_level)
        .format_timestamp_millis()
        .init();

    let num_threads = if args.threads > 0 {
        args.threads
    } else {
        num_cpus::get()
    };

    log::info!("Using {} worker threads", num_threads);
    rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build_global()?;

    match args.command {
        Command::Stats(stats_args) => run_stats(&stats_args),
        Command::Ktruss(clustering) => run_ktruss(&clustering),
        Command::Fate(fate_args) => run_fate(&fate_args),
        Command::Summarize { stats } => run_summarize(&stats),
        Command::Batch(batch_args) => run_batch(&batch_args),
        Command::Freq { stats } => run_freq(&stats),
    }
}

fn run_stats(args: &StatsArgs) -> Result<()> {
    let selection = args.clustering.selection();
    let clusterer = cluster::clusterer_for(&selection)?;

    let clusters = clusterer.load_existing(&args.clustering.existing_clustering)?;
    let graph = edgelist::load_edge_list(&args.clustering.input)?;

    let config = Config::new(clusterer.resolution(), args.modularity_scale, args.ktruss);
    let report = MetricsComputer::new(&graph, StoerWagner, config).compute(&clusters)?;

    let output = output_path(
        args.clustering.output.as_deref(),
        &args.clustering.existing_clustering,
        "_stats.csv",
    );
    storage::save_metrics_report(&report, &output)?;

    log::info!("Analysis complete. Results saved to {}", output.display());
    Ok(())
}

fn run_ktruss(args: &ClusteringArgs) -> Result<()> {
    let clusterer = cluster::clusterer_for(&args.selection())?;

    let clusters = clusterer.load_existing(&args.existing_clustering)?;
    let graph = edgelist::load_edge_list(&args.input)?;

    let trusses = ktruss::cluster_trusses(&graph, &clusters)?;

    let output = output_path(args.output.as_deref(), &args.existing_clustering, "_ktruss.csv");
    storage::save_ktruss_nodes(&trusses, &output)
}

fn run_fate(args: &FateArgs) -> Result<()> {
    let before = provenance::load_before(&args.universal_before)?;
    let after = assignment::load_assignment(&args.existing_clustering)?;

    let tracker = LineageTracker::new(assignment::cluster_sizes(&after));
    let records = tracker.track(&before)?;

    let output = output_path(args.output.as_deref(), &args.existing_clustering, "_cluster_fate.csv");
    storage::save_fate_report(&records, &output)?;

    if let Some(path) = &args.provenance {
        storage::save_provenance(&records, path)?;
    }

    Ok(())
}

fn run_summarize(stats_path: &Path) -> Result<()> {
    let report = stats::load_report(stats_path)?;
    let summary = RunSummary::from_report(&batch::run_name(stats_path), &report);

    storage::save_run_summary(&summary, &sibling_with_suffix(stats_path, "_summary.csv"))
}

fn run_batch(args: &BatchArgs) -> Result<()> {
    let config = BatchConfig::from_file(&args.config)?;
    let summarizer = BatchSummarizer::new(config, args.network.as_str());

    log::info!(
        "Summarizing {} runs of network {}",
        summarizer.runs(),
        summarizer.network()
    );

    let rows = summarizer.summarize()?;
    let shape = if args.compact {
        SummaryShape::Compact
    } else {
        SummaryShape::Wide
    };

    storage::save_batch_summary(&rows, shape, &args.output_dir.join("summary.csv"))
}

fn run_freq(stats_path: &Path) -> Result<()> {
    let report = stats::load_report(stats_path)?;
    let frequency = report::cluster_size_frequency(&report);

    storage::save_frequency(&frequency, &sibling_with_suffix(stats_path, "_freq.csv"))
}

fn output_path(explicit: Option<&Path>, clustering: &Path, suffix: &str) -> PathBuf {
    explicit
        .map(Path::to_path_buf)
        .unwrap_or_else(|| sibling_with_suffix(clustering, suffix))
}
