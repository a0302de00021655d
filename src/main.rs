use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::info;

use cairn_io::SampleReader;
use cairn_tree::{CairnTree, CairnTreeConfig, Sample, SearchStrategy, evaluate};

#[derive(Parser)]
#[command(name = "cairn")]
#[command(about = "Nearest-cairn classification trees")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable verbose (debug-level) logging
    #[arg(long, global = true)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(long, global = true)]
    quiet: bool,

    /// Number of threads for parallel computation (defaults to all cores)
    #[arg(long, global = true)]
    threads: Option<usize>,
}

/// Shared tree-building parameters.
#[derive(Args, Debug, Clone)]
struct TreeArgs {
    /// Minimum number of training samples on each side of a split
    #[arg(long, default_value_t = 3)]
    min_leaf: usize,

    /// Search cairn pairs on the calling thread instead of the rayon pool
    #[arg(long, default_value_t = false)]
    sequential: bool,

    /// Input files have no header row
    #[arg(long, default_value_t = false)]
    no_header: bool,
}

impl TreeArgs {
    fn config(&self) -> CairnTreeConfig {
        let strategy = if self.sequential {
            SearchStrategy::Sequential
        } else {
            SearchStrategy::Parallel
        };
        CairnTreeConfig::new()
            .with_min_leaf(self.min_leaf)
            .with_search_strategy(strategy)
    }
}

#[derive(Subcommand)]
enum Command {
    /// Train on one file and report accuracy on another
    Evaluate {
        /// Path to the training CSV file (label first, then features)
        #[arg(long)]
        train: PathBuf,

        /// Path to the test CSV file (same layout as training)
        #[arg(long)]
        test: PathBuf,

        /// Maximum number of training rows to read
        #[arg(long, default_value_t = 1000)]
        max_train: usize,

        /// Maximum number of test rows to read
        #[arg(long, default_value_t = 1000)]
        max_test: usize,

        #[command(flatten)]
        tree: TreeArgs,
    },

    /// Train a tree and report its shape and training accuracy
    Inspect {
        /// Path to the training CSV file (label first, then features)
        #[arg(long)]
        train: PathBuf,

        /// Maximum number of training rows to read
        #[arg(long, default_value_t = 1000)]
        max_train: usize,

        #[command(flatten)]
        tree: TreeArgs,
    },
}

#[derive(Serialize)]
struct TreeShape {
    n_nodes: usize,
    n_leaves: usize,
    depth: usize,
    n_features: usize,
    n_classes: usize,
}

impl TreeShape {
    fn of(tree: &CairnTree) -> Self {
        Self {
            n_nodes: tree.n_nodes(),
            n_leaves: tree.n_leaves(),
            depth: tree.depth(),
            n_features: tree.n_features(),
            n_classes: tree.labels().len(),
        }
    }
}

#[derive(Serialize)]
struct ClassOutput {
    label: i64,
    precision: f64,
    recall: f64,
    f1: f64,
    support: usize,
}

#[derive(Serialize)]
struct EvaluateOutput {
    n_train: usize,
    n_test: usize,
    min_leaf: usize,
    correct: usize,
    incorrect: usize,
    fitness: f64,
    tree: TreeShape,
    classes: Vec<ClassOutput>,
    fit_seconds: f64,
    evaluate_seconds: f64,
}

#[derive(Serialize)]
struct InspectOutput {
    n_train: usize,
    min_leaf: usize,
    training_accuracy: f64,
    tree: TreeShape,
    fit_seconds: f64,
}

fn read_samples(path: &Path, max_rows: usize, header: bool, what: &str) -> Result<Vec<Sample>> {
    SampleReader::new(path)
        .with_max_rows(Some(max_rows))
        .with_header(header)
        .read()
        .with_context(|| format!("failed to read {what} CSV {}", path.display()))
}

fn fit(samples: &[Sample], tree: &TreeArgs) -> Result<(CairnTree, f64)> {
    let started = Instant::now();
    let fitted = tree.config().fit(samples).context("tree construction failed")?;
    let seconds = started.elapsed().as_secs_f64();
    info!(
        n_nodes = fitted.n_nodes(),
        depth = fitted.depth(),
        seconds,
        "tree built"
    );
    Ok((fitted, seconds))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match (cli.verbose, cli.quiet) {
        (true, _) => "debug",
        (_, true) => "error",
        _ => "info",
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Some(threads) = cli.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("failed to configure thread pool")?;
        info!(threads, "thread pool configured");
    }

    match cli.command {
        Command::Evaluate {
            train,
            test,
            max_train,
            max_test,
            tree,
        } => {
            let train_samples = read_samples(&train, max_train, !tree.no_header, "training")?;
            let test_samples = read_samples(&test, max_test, !tree.no_header, "test")?;

            let (fitted, fit_seconds) = fit(&train_samples, &tree)?;

            let started = Instant::now();
            let evaluation = evaluate(&fitted, &test_samples).context("evaluation failed")?;
            let evaluate_seconds = started.elapsed().as_secs_f64();

            info!(
                "Correct: {}, Incorrect: {}, Fitness: {}",
                evaluation.correct,
                evaluation.incorrect,
                evaluation.fitness()
            );

            let output = EvaluateOutput {
                n_train: train_samples.len(),
                n_test: test_samples.len(),
                min_leaf: tree.min_leaf,
                correct: evaluation.correct,
                incorrect: evaluation.incorrect,
                fitness: evaluation.fitness(),
                tree: TreeShape::of(&fitted),
                classes: evaluation
                    .confusion_matrix
                    .class_metrics()
                    .into_iter()
                    .map(|m| ClassOutput {
                        label: m.label.value(),
                        precision: m.precision,
                        recall: m.recall,
                        f1: m.f1,
                        support: m.support,
                    })
                    .collect(),
                fit_seconds,
                evaluate_seconds,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }

        Command::Inspect {
            train,
            max_train,
            tree,
        } => {
            let train_samples = read_samples(&train, max_train, !tree.no_header, "training")?;
            let (fitted, fit_seconds) = fit(&train_samples, &tree)?;

            let training = evaluate(&fitted, &train_samples).context("evaluation failed")?;

            let output = InspectOutput {
                n_train: train_samples.len(),
                min_leaf: tree.min_leaf,
                training_accuracy: training.fitness(),
                tree: TreeShape::of(&fitted),
                fit_seconds,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}
