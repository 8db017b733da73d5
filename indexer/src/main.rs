use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use folio_core::persist::{save_meta, save_snapshot, IndexPaths, MetaFile};
use folio_core::{CorpusDoc, DocStats, InvertedIndex, SchemaError};
use serde::Deserialize;
use tracing_subscriber::{fmt, EnvFilter};
use walkdir::WalkDir;

use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// One scene record as it appears in the corpus JSON. Fields are optional
/// at the serde layer so missing ones surface as schema errors with the
/// offending record named, rather than as bare decode failures.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SceneRecord {
    scene_id: Option<String>,
    #[serde(default)]
    scene_num: Option<u32>,
    #[serde(default)]
    play_id: Option<String>,
    text: Option<String>,
}

#[derive(Parser)]
#[command(name = "folio-indexer")]
#[command(about = "Build a positional index and snapshot from a scene corpus", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the index from corpus JSON files (file or directory)
    Build {
        /// Input path (file or directory of .json files)
        #[arg(long)]
        input: String,
        /// Output index directory
        #[arg(long)]
        output: String,
    },
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Build { input, output } => build_index(&input, &output),
    }
}

fn build_index(input: &str, output: &str) -> Result<()> {
    let input_path = Path::new(input);

    let mut files: Vec<PathBuf> = Vec::new();
    if input_path.is_dir() {
        for entry in WalkDir::new(input_path).into_iter().filter_map(|e| e.ok()) {
            let p = entry.path();
            if p.is_file() && p.extension().and_then(|s| s.to_str()) == Some("json") {
                files.push(p.to_path_buf());
            }
        }
        files.sort();
    } else {
        files.push(input_path.to_path_buf());
    }

    let mut corpus: Vec<CorpusDoc> = Vec::new();
    for file in &files {
        let mut docs = read_corpus_file(file)
            .with_context(|| format!("loading corpus from {}", file.display()))?;
        corpus.append(&mut docs);
    }
    tracing::info!(num_records = corpus.len(), num_files = files.len(), "corpus loaded");

    let index = InvertedIndex::build(&corpus).context("building index")?;
    let stats = DocStats::build(&corpus).context("building document statistics")?;
    tracing::info!(
        num_docs = index.num_docs(),
        num_terms = index.num_terms(),
        avg_doc_len = stats.avg_doc_len(),
        "index built"
    );

    let paths = IndexPaths::new(output);
    save_snapshot(&paths, &index, &stats)?;
    let meta = MetaFile {
        num_docs: index.num_docs(),
        created_at: time::OffsetDateTime::now_utc()
            .format(&time::format_description::well_known::Rfc3339)
            .unwrap_or_else(|_| "".into()),
        version: 1,
    };
    save_meta(&paths, &meta)?;

    tracing::info!(output, "index build complete");
    Ok(())
}

/// Parse one corpus file. Two shapes are accepted: the play-keyed object
/// (values are arrays of scene records) and a bare top-level array of
/// records. The keyed shape is iterated in sorted key order so doc ids are
/// assigned deterministically across runs.
fn read_corpus_file(path: &Path) -> Result<Vec<CorpusDoc>> {
    let reader = BufReader::new(File::open(path)?);
    let json: serde_json::Value = serde_json::from_reader(reader)?;

    let mut records: Vec<SceneRecord> = Vec::new();
    match json {
        serde_json::Value::Object(map) => {
            let by_play: BTreeMap<String, Vec<SceneRecord>> =
                serde_json::from_value(serde_json::Value::Object(map))?;
            for (_, scenes) in by_play {
                records.extend(scenes);
            }
        }
        serde_json::Value::Array(_) => {
            records = serde_json::from_value(json)?;
        }
        other => anyhow::bail!("unsupported corpus shape: {}", value_kind(&other)),
    }

    records.into_iter().map(to_corpus_doc).collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

fn to_corpus_doc(record: SceneRecord) -> Result<CorpusDoc, SchemaError> {
    let label = || {
        record
            .scene_id
            .clone()
            .or_else(|| {
                record
                    .play_id
                    .clone()
                    .map(|p| format!("{p}:{}", record.scene_num.unwrap_or(0)))
            })
            .unwrap_or_else(|| "<unidentified>".into())
    };
    let id = record.scene_id.clone().ok_or_else(|| SchemaError::MissingField {
        field: "sceneId",
        record: label(),
    })?;
    let text = record.text.clone().ok_or_else(|| SchemaError::MissingField {
        field: "text",
        record: label(),
    })?;
    Ok(CorpusDoc { id, text })
}

fn value_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
