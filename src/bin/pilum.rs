//! Pilum CLI binary.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use env_logger::Builder;
use log::LevelFilter;

use pilum::config::{FlushStrategy, IndexerConfig};
use pilum::corpus::DirectorySource;
use pilum::error::{PilumError, Result};
use pilum::indexer::SinglePassIndexer;
use pilum::search::{BooleanSearchEngine, find_latest_merged};
use pilum::serializer::BincodeSerializer;
use pilum::storage::{FileStorage, Storage};

/// Pilum - a single-pass in-memory (SPIMI) indexer and boolean search engine
#[derive(Parser, Debug)]
#[command(name = "pilum")]
#[command(about = "A single-pass in-memory (SPIMI) indexer and boolean search engine")]
#[command(version = pilum::VERSION)]
struct PilumArgs {
    /// Verbosity level (repeat for more detail)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Quiet mode (overrides verbose)
    #[arg(short, long)]
    quiet: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Index a directory of text documents
    Index(IndexArgs),

    /// Run a boolean AND query against a built index
    Search(SearchArgs),

    /// Show statistics of a built index
    Stats(StatsArgs),
}

#[derive(Parser, Debug)]
struct IndexArgs {
    /// Directory containing the corpus (one document per file)
    corpus_dir: PathBuf,

    /// Directory to write segment and merged index files to
    #[arg(short = 'o', long, default_value = "index")]
    index_dir: PathBuf,

    /// Flush segments at this estimated size in bytes
    #[arg(long, conflicts_with = "max_postings")]
    max_bytes: Option<u64>,

    /// Flush segments at this document count
    #[arg(long)]
    max_postings: Option<u64>,

    /// Number of parallel ingestion lanes (default: one per CPU)
    #[arg(long)]
    lanes: Option<usize>,

    /// Load the indexer configuration from a JSON file instead
    #[arg(long, conflicts_with_all = ["max_bytes", "max_postings", "lanes"])]
    config: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct SearchArgs {
    /// Directory holding the built index
    index_dir: PathBuf,

    /// Terms to intersect (documents must contain all of them)
    #[arg(required = true)]
    terms: Vec<String>,

    /// Indexer configuration file the index was built with (for custom
    /// file name prefixes)
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct StatsArgs {
    /// Directory holding the built index
    index_dir: PathBuf,

    /// Indexer configuration file the index was built with (for custom
    /// file name prefixes)
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() {
    let args = PilumArgs::parse();

    let log_level = if args.quiet {
        LevelFilter::Error
    } else {
        match args.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            _ => LevelFilter::Debug,
        }
    };

    Builder::new()
        .filter_level(log_level)
        .format(|buf, record| writeln!(buf, "[{}] {}", record.level(), record.args()))
        .init();

    if let Err(e) = execute_command(args.command) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn execute_command(command: Command) -> Result<()> {
    match command {
        Command::Index(args) => run_index(args),
        Command::Search(args) => run_search(args),
        Command::Stats(args) => run_stats(args),
    }
}

fn run_index(args: IndexArgs) -> Result<()> {
    let config = match args.config {
        Some(path) => {
            let mut config = IndexerConfig::from_file(path)?;
            config.segment_dir = args.index_dir;
            config
        }
        None => {
            let mut config = IndexerConfig {
                segment_dir: args.index_dir,
                lanes: args.lanes,
                ..Default::default()
            };
            if let Some(max_bytes) = args.max_bytes {
                config.flush_strategy = FlushStrategy::ByteSize { max_bytes };
            }
            if let Some(max_postings) = args.max_postings {
                config.flush_strategy = FlushStrategy::PostingCount { max_postings };
            }
            config
        }
    };

    let indexer = SinglePassIndexer::new(config)?;
    let mut source = DirectorySource::new(&args.corpus_dir)?;
    let stats = indexer.build_index(&mut source)?;

    println!(
        "Indexed {} documents in {} segments",
        stats.documents, stats.segments_flushed
    );
    match stats.merge {
        Some(merge) => println!(
            "Merged index: {} ({} terms, {} documents)",
            merge.file_name, merge.term_count, merge.doc_count
        ),
        None => println!("Corpus was empty; no index written"),
    }

    Ok(())
}

fn run_search(args: SearchArgs) -> Result<()> {
    let (storage, index_file) = open_index(&args.index_dir, args.config.as_deref())?;

    let mut engine = BooleanSearchEngine::new(Arc::new(BincodeSerializer::new()));
    engine.load_from_storage(&storage, &index_file)?;

    let results = engine.intersection(&args.terms)?;
    if results.is_empty() {
        println!("No documents match");
    } else {
        println!("{} matching documents:", results.len());
        for doc_id in results {
            println!("{doc_id}");
        }
    }

    Ok(())
}

fn run_stats(args: StatsArgs) -> Result<()> {
    let (storage, index_file) = open_index(&args.index_dir, args.config.as_deref())?;

    let mut engine = BooleanSearchEngine::new(Arc::new(BincodeSerializer::new()));
    engine.load_from_storage(&storage, &index_file)?;

    println!("Index file:  {index_file}");
    println!("Documents:   {}", engine.doc_count()?);
    println!("Terms:       {}", engine.vocabulary_size()?);
    println!("Size:        {} bytes", storage.file_size(&index_file)?);

    Ok(())
}

/// Open the index directory and locate the most recent merged output,
/// honoring the merged-file prefix of the configuration the index was
/// built with.
fn open_index(index_dir: &PathBuf, config: Option<&Path>) -> Result<(FileStorage, String)> {
    let config = match config {
        Some(path) => IndexerConfig::from_file(path)?,
        None => IndexerConfig::default(),
    };
    let storage = FileStorage::new(index_dir)?;

    let name = find_latest_merged(&storage, &config.merged_prefix)?.ok_or_else(|| {
        PilumError::search(format!(
            "no merged index found in {}",
            index_dir.display()
        ))
    })?;

    Ok((storage, name))
}
