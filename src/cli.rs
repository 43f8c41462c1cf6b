use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Command-line interface definition.
#[derive(Debug, Parser)]
#[command(
    name = "seededlda",
    version,
    about = "Seeded and unsupervised LDA topic models fitted by Gibbs sampling"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fit an unsupervised LDA model with a fixed number of topics.
    Fit(FitArgs),
    /// Fit a seeded LDA model whose topics come from a seed dictionary.
    FitSeeded(FitSeededArgs),
    /// Print the most probable terms of every topic.
    Terms(TermsArgs),
    /// Print the dominant topic of every training document.
    Topics(TopicsArgs),
    /// Describe a fitted model.
    Summary(SummaryArgs),
    /// Estimate topic proportions for new documents with a fitted model.
    Infer(InferArgs),
}

/// Priors and Gibbs sampler options shared by the fitting commands.
#[derive(clap::Args, Debug, Clone)]
pub struct SamplerArgs {
    /// Document-topic prior: one value for all topics or a comma-separated
    /// value per topic. Defaults to 50 / number of topics.
    #[arg(long, value_delimiter = ',')]
    pub alpha: Vec<f64>,
    /// Topic-word prior.
    #[arg(long, default_value = "0.1")]
    pub beta: f64,
    #[arg(long, default_value = "2000")]
    pub max_iter: usize,
    /// Seed of the random number generator.
    #[arg(long, default_value = "42")]
    pub seed: u64,
    /// Stop early once the relative log-likelihood change falls below this value.
    #[arg(long)]
    pub tol: Option<f64>,
    /// Sweeps between log-likelihood evaluations.
    #[arg(long, default_value = "100")]
    pub log_every: usize,
    /// Report sampler progress at info level.
    #[arg(long)]
    pub verbose: bool,
}

impl Default for SamplerArgs {
    fn default() -> Self {
        Self {
            alpha: Vec::new(),
            beta: 0.1,
            max_iter: 2000,
            seed: 42,
            tol: None,
            log_every: 100,
            verbose: false,
        }
    }
}

/// Arguments for fitting an unsupervised model.
#[derive(clap::Args, Debug)]
pub struct FitArgs {
    /// Document-feature matrix with a `doc_id` column followed by one column per feature.
    #[arg(long)]
    pub dfm: PathBuf,
    /// Number of topics.
    #[arg(long)]
    pub topics: usize,
    #[command(flatten)]
    pub sampler: SamplerArgs,
    /// Delimiter for input data. Default is tab.
    #[arg(long, default_value = "\t")]
    pub delimiter: String,
    #[arg(long)]
    pub output_model: PathBuf,
    /// Optional output for document-topic proportions.
    #[arg(long)]
    pub output_theta: Option<PathBuf>,
}

/// Arguments for fitting a seeded model.
#[derive(clap::Args, Debug)]
pub struct FitSeededArgs {
    #[arg(long)]
    pub dfm: PathBuf,
    /// TOML seed dictionary made of `[[topic]]` tables.
    #[arg(long)]
    pub dictionary: PathBuf,
    /// How dictionary patterns are matched against feature names.
    #[arg(long, value_parser = ["glob", "regex", "fixed"], default_value = "glob")]
    pub valuetype: String,
    #[arg(long)]
    pub case_sensitive: bool,
    /// Add an unseeded `other` topic.
    #[arg(long)]
    pub residual: bool,
    /// Seed pseudo-count as a share of the total token count.
    #[arg(long, default_value = "0.01")]
    pub weight: f64,
    #[command(flatten)]
    pub sampler: SamplerArgs,
    #[arg(long, default_value = "\t")]
    pub delimiter: String,
    #[arg(long)]
    pub output_model: PathBuf,
    #[arg(long)]
    pub output_theta: Option<PathBuf>,
}

/// Arguments for listing top terms.
#[derive(clap::Args, Debug)]
pub struct TermsArgs {
    #[arg(long)]
    pub model: PathBuf,
    /// Terms per topic.
    #[arg(short = 'n', default_value = "10")]
    pub n: usize,
    /// Write the table here instead of stdout.
    #[arg(long)]
    pub output: Option<PathBuf>,
}

/// Arguments for listing dominant topics.
#[derive(clap::Args, Debug)]
pub struct TopicsArgs {
    #[arg(long)]
    pub model: PathBuf,
    #[arg(long)]
    pub output: Option<PathBuf>,
}

#[derive(clap::Args, Debug)]
pub struct SummaryArgs {
    #[arg(long)]
    pub model: PathBuf,
}

/// Arguments for inference on new documents.
#[derive(clap::Args, Debug)]
pub struct InferArgs {
    #[arg(long)]
    pub model: PathBuf,
    #[arg(long)]
    pub dfm: PathBuf,
    /// Sweeps per document. Defaults to the value the model was fitted with.
    #[arg(long)]
    pub max_iter: Option<usize>,
    /// Defaults to the seed the model was fitted with.
    #[arg(long)]
    pub seed: Option<u64>,
    /// Worker threads; documents are processed independently.
    #[arg(long, default_value = "1")]
    pub threads: usize,
    #[arg(long, default_value = "\t")]
    pub delimiter: String,
    /// Output TSV of document-topic proportions.
    #[arg(long)]
    pub output: PathBuf,
}

/// First byte of a delimiter argument; `\t` and `tab` are accepted for tab.
pub fn delimiter_byte(delimiter: &str) -> Option<u8> {
    match delimiter {
        "\\t" | "tab" => Some(b'\t'),
        other => other.as_bytes().first().copied(),
    }
}
