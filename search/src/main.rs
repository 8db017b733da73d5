use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use folio_core::persist::{load_snapshot, IndexPaths};
use folio_core::query::{
    count_per_document, documents_containing, intersect, phrase_match, plays_containing,
    term_frequency_compare, union,
};
use folio_core::rank::{rank, Bm25Params};
use folio_core::tokenizer::tokenize;
use folio_core::{DocId, DocStats, InvertedIndex};
use serde::Serialize;
use tracing_subscriber::{fmt, EnvFilter};

use std::collections::HashSet;

#[derive(Parser)]
#[command(name = "folio-search")]
#[command(about = "Query a scene index: boolean, phrase, and BM25 ranked search", long_about = None)]
struct Cli {
    /// Index directory written by folio-indexer
    #[arg(long, default_value = "./index")]
    index: String,
    /// Emit JSON instead of plain lines
    #[arg(long, default_value_t = false)]
    json: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scenes containing a word
    Term {
        word: String,
        /// Collapse scene ids to play ids
        #[arg(long)]
        plays: bool,
    },
    /// Scenes containing both words
    Both {
        word_a: String,
        word_b: String,
        #[arg(long)]
        plays: bool,
    },
    /// Scenes containing at least one of the words
    Any {
        #[arg(required = true)]
        words: Vec<String>,
        #[arg(long)]
        plays: bool,
    },
    /// Scenes containing the words consecutively, in order
    Phrase {
        /// The phrase as one argument, e.g. "cry havoc"
        text: String,
        #[arg(long)]
        plays: bool,
    },
    /// Scenes where one word list occurs more often than another
    Compare {
        /// Comma-separated list whose counts must be higher
        #[arg(long, value_delimiter = ',', required = true)]
        more: Vec<String>,
        /// Comma-separated list to compare against
        #[arg(long, value_delimiter = ',', required = true)]
        than: Vec<String>,
        #[arg(long)]
        plays: bool,
    },
    /// Per-scene occurrence totals for a word list
    Counts {
        #[arg(required = true)]
        words: Vec<String>,
    },
    /// BM25-ranked scenes for a free-text query
    Rank {
        /// The query as one argument, e.g. "dogs of war"
        query: String,
        /// Maximum number of results
        #[arg(short, default_value_t = 10)]
        k: usize,
        /// Term-frequency saturation
        #[arg(long, default_value_t = 1.2)]
        k1: f32,
        /// Length normalization strength
        #[arg(long, default_value_t = 0.75)]
        b: f32,
    },
}

#[derive(Serialize)]
struct RankedHit {
    scene: String,
    score: f32,
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    let paths = IndexPaths::new(&cli.index);
    let (index, stats) =
        load_snapshot(&paths).with_context(|| format!("loading index from {}", cli.index))?;
    tracing::debug!(num_docs = index.num_docs(), "index ready");

    match cli.command {
        Commands::Term { word, plays } => {
            let docs = documents_containing(&index, &word);
            print_docs(&index, &docs, plays, cli.json)
        }
        Commands::Both { word_a, word_b, plays } => {
            let docs = intersect(&index, &word_a, &word_b);
            print_docs(&index, &docs, plays, cli.json)
        }
        Commands::Any { words, plays } => {
            let docs = union(&index, &words)?;
            print_docs(&index, &docs, plays, cli.json)
        }
        Commands::Phrase { text, plays } => {
            let terms = query_terms(&text);
            let docs = phrase_match(&index, &terms)?;
            print_docs(&index, &docs, plays, cli.json)
        }
        Commands::Compare { more, than, plays } => {
            let docs = term_frequency_compare(&index, &more, &than)?;
            print_docs(&index, &docs, plays, cli.json)
        }
        Commands::Counts { words } => print_counts(&index, &words, cli.json),
        Commands::Rank { query, k, k1, b } => {
            let terms = query_terms(&query);
            print_ranked(&index, &stats, &terms, k, Bm25Params { k1, b }, cli.json)
        }
    }
}

/// Split a free-text argument with the index's own tokenization rule so
/// query terms can never diverge from indexed terms.
fn query_terms(text: &str) -> Vec<String> {
    tokenize(text).into_iter().map(|(word, _)| word).collect()
}

fn print_docs(index: &InvertedIndex, docs: &HashSet<DocId>, plays: bool, json: bool) -> Result<()> {
    let names: Vec<String> = if plays {
        plays_containing(index, docs).into_iter().collect()
    } else {
        let mut names: Vec<String> = docs
            .iter()
            .filter_map(|&d| index.external_id(d))
            .map(str::to_string)
            .collect();
        names.sort();
        names
    };
    if json {
        println!("{}", serde_json::to_string(&names)?);
    } else {
        for name in names {
            println!("{name}");
        }
    }
    Ok(())
}

fn print_counts(index: &InvertedIndex, words: &[String], json: bool) -> Result<()> {
    let counts = count_per_document(index, words)?;
    let mut rows: Vec<(String, u32)> = counts
        .into_iter()
        .filter_map(|(doc_id, count)| index.external_id(doc_id).map(|id| (id.to_string(), count)))
        .collect();
    rows.sort();
    if json {
        let map: serde_json::Map<String, serde_json::Value> = rows
            .into_iter()
            .map(|(scene, count)| (scene, serde_json::Value::from(count)))
            .collect();
        println!("{}", serde_json::to_string(&map)?);
    } else {
        for (scene, count) in rows {
            println!("{scene},{count}");
        }
    }
    Ok(())
}

fn print_ranked(
    index: &InvertedIndex,
    stats: &DocStats,
    terms: &[String],
    k: usize,
    params: Bm25Params,
    json: bool,
) -> Result<()> {
    let ranked = rank(index, stats, terms, k, params)?;
    let hits: Vec<RankedHit> = ranked
        .into_iter()
        .filter_map(|(doc_id, score)| {
            index.external_id(doc_id).map(|id| RankedHit { scene: id.to_string(), score })
        })
        .collect();
    if json {
        println!("{}", serde_json::to_string(&hits)?);
    } else {
        for hit in hits {
            println!("{}\t{:.4}", hit.scene, hit.score);
        }
    }
    Ok(())
}
