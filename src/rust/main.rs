use std::io::{self, BufRead};
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Context;
use clap::{Parser, Subcommand};
use log::info;
use newsclass::{
    ArtifactStore, Classifier, ClassifierError, Dataset, OutputActivation, Prediction, RuntimeConfig,
    DEFAULT_MAX_LEN,
};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Directory holding model.onnx, tokenizer.json and labels.json
    #[arg(short, long, global = true)]
    artifacts: Option<PathBuf>,

    /// Fixed sequence length the model was trained with
    #[arg(long, global = true, default_value_t = DEFAULT_MAX_LEN)]
    max_len: usize,

    /// ONNX Runtime threads (0 lets the runtime decide)
    #[arg(long, global = true, default_value_t = 0)]
    threads: usize,

    /// The model emits raw logits instead of probabilities
    #[arg(long, global = true)]
    logits: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Classify text given as arguments, or each line of stdin
    Predict {
        text: Vec<String>,
        /// Print predictions as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the loaded artifacts and configuration
    Info,
    /// Check the artifact directory against its manifest
    Verify,
    /// Summarize a labelled CSV dataset
    Explore {
        csv: PathBuf,
        /// Show a sample article from this category
        #[arg(long)]
        category: Option<String>,
        #[arg(long, default_value_t = 0)]
        seed: u64,
    },
}

fn open_store(args: &Args) -> anyhow::Result<ArtifactStore> {
    let store = match &args.artifacts {
        Some(dir) => ArtifactStore::new(dir),
        None => ArtifactStore::new_default(),
    };
    store.context("cannot open artifact directory")
}

fn load_classifier(args: &Args) -> anyhow::Result<Classifier> {
    let store = open_store(args)?;
    let start_time = Instant::now();
    info!("Building classifier...");

    let activation = if args.logits {
        OutputActivation::Logits
    } else {
        OutputActivation::Probabilities
    };
    let classifier = Classifier::builder()
        .with_runtime_config(RuntimeConfig::default().with_threads(args.threads))
        .with_max_len(args.max_len)
        .with_output_activation(activation)
        .with_artifacts(&store)?
        .build()?;

    info!("=== Classifier Built Successfully (took {:.2?}) ===", start_time.elapsed());
    Ok(classifier)
}

fn print_prediction(prediction: &Prediction, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string(prediction)?);
        return Ok(());
    }
    println!("\nResults:");
    println!("  Predicted category: {}", prediction);
    println!("  Confidence: {}", prediction.confidence_level());
    println!("  Probabilities (sorted):");
    for (label, score) in prediction.ranked() {
        println!("    {}: {:.1}%", label, score * 100.0);
    }
    Ok(())
}

fn report(result: Result<Prediction, ClassifierError>, json: bool) -> anyhow::Result<bool> {
    match result {
        Ok(prediction) => {
            print_prediction(&prediction, json)?;
            Ok(true)
        }
        Err(ClassifierError::Validation(msg)) => {
            eprintln!("\nSkipped: {}", msg);
            Ok(false)
        }
        Err(e) => {
            eprintln!("\nError processing text: {}", e);
            Ok(false)
        }
    }
}

fn predict(args: &Args, text: &[String], json: bool) -> anyhow::Result<()> {
    let classifier = load_classifier(args)?.install()?;

    if !text.is_empty() {
        let input = text.join(" ");
        if !report(classifier.predict(&input), json)? {
            anyhow::bail!("prediction failed");
        }
        return Ok(());
    }

    info!("Reading texts from stdin, one per line");
    let classify_start = Instant::now();
    let (mut served, mut failed) = (0u32, 0u32);
    for line in io::stdin().lock().lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        served += 1;
        if !report(classifier.predict(&line), json)? {
            failed += 1;
        }
    }
    if served > 0 {
        info!(
            "Classified {} texts ({} failed), average {:.2?} per text",
            served,
            failed,
            classify_start.elapsed() / served
        );
    }
    Ok(())
}

fn info_command(args: &Args) -> anyhow::Result<()> {
    let classifier = load_classifier(args)?;
    let info = classifier.info();
    println!("Model:      {}", info.model_path.as_deref().unwrap_or("-"));
    println!("Tokenizer:  {}", info.tokenizer_path.as_deref().unwrap_or("-"));
    println!("Labels:     {}", info.labels_path.as_deref().unwrap_or("-"));
    println!("Categories: {}", info.class_labels.join(", "));
    println!("Vocabulary: {}", info.vocab_size);
    println!(
        "Sequence:   length {}, padding {:?}, truncating {:?}",
        info.sequence_config.max_len, info.sequence_config.padding, info.sequence_config.truncating
    );
    println!("Output:     {:?}", info.activation);
    Ok(())
}

fn verify_command(args: &Args) -> anyhow::Result<()> {
    let store = open_store(args)?;
    println!("Artifact directory: {}", store.dir().display());
    for artifact in store.missing() {
        println!("  missing {}: {}", artifact, store.path(artifact).display());
    }
    if store.verify()? {
        println!("All artifacts verified");
        Ok(())
    } else {
        anyhow::bail!("artifact verification failed")
    }
}

fn explore(csv: &Path, category: Option<&str>, seed: u64) -> anyhow::Result<()> {
    let dataset = Dataset::from_csv(csv).with_context(|| format!("cannot load {}", csv.display()))?;
    let summary = dataset.summary();

    println!("Total articles:    {}", summary.total_articles);
    println!("Categories:        {}", summary.num_categories);
    println!("Average words:     {}", summary.average_words);
    println!("\nCategory distribution:");
    for (name, count) in &summary.counts {
        println!("  {:<16} {}", name, count);
    }

    if let Some(category) = category {
        match dataset.sample(category, seed) {
            Some(article) => println!("\nSample [{}]:\n{}", article.category, article.text),
            None => println!("\nNo articles in category '{}'", category),
        }
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    match &args.command {
        Command::Predict { text, json } => predict(&args, text, *json),
        Command::Info => info_command(&args),
        Command::Verify => verify_command(&args),
        Command::Explore { csv, category, seed } => explore(csv, category.as_deref(), *seed),
    }
}
