//! Snapshot persistence for the index and document statistics.
//!
//! A snapshot is a versioned bincode blob holding both structures;
//! round-trips are exact (every term, document, position ordering, and
//! length preserved) and loading yields independently owned copies.

use crate::{DocStats, InvertedIndex};
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const SNAPSHOT_VERSION: u32 = 1;

#[derive(Serialize, Deserialize)]
struct Snapshot {
    version: u32,
    index: InvertedIndex,
    stats: DocStats,
}

/// Encode an index/stats pair into a self-describing byte blob.
pub fn serialize(index: &InvertedIndex, stats: &DocStats) -> Result<Vec<u8>> {
    let snapshot = Snapshot {
        version: SNAPSHOT_VERSION,
        index: index.clone(),
        stats: stats.clone(),
    };
    bincode::serialize(&snapshot).context("encoding snapshot")
}

/// Decode a blob produced by [`serialize`].
pub fn deserialize(bytes: &[u8]) -> Result<(InvertedIndex, DocStats)> {
    let snapshot: Snapshot = bincode::deserialize(bytes).context("decoding snapshot")?;
    if snapshot.version != SNAPSHOT_VERSION {
        bail!(
            "unsupported snapshot version {} (expected {})",
            snapshot.version,
            SNAPSHOT_VERSION
        );
    }
    Ok((snapshot.index, snapshot.stats))
}

/// Sidecar metadata written next to the snapshot.
#[derive(Debug, Serialize, Deserialize)]
pub struct MetaFile {
    pub num_docs: u32,
    pub created_at: String,
    pub version: u32,
}

/// File layout of an index directory.
pub struct IndexPaths {
    pub root: PathBuf,
}

impl IndexPaths {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self { root: root.as_ref().to_path_buf() }
    }
    fn snapshot(&self) -> PathBuf {
        self.root.join("snapshot.bin")
    }
    fn meta(&self) -> PathBuf {
        self.root.join("meta.json")
    }
}

pub fn save_snapshot(paths: &IndexPaths, index: &InvertedIndex, stats: &DocStats) -> Result<()> {
    fs::create_dir_all(&paths.root)
        .with_context(|| format!("creating index directory {}", paths.root.display()))?;
    let bytes = serialize(index, stats)?;
    fs::write(paths.snapshot(), bytes)
        .with_context(|| format!("writing {}", paths.snapshot().display()))?;
    Ok(())
}

pub fn load_snapshot(paths: &IndexPaths) -> Result<(InvertedIndex, DocStats)> {
    let bytes = fs::read(paths.snapshot())
        .with_context(|| format!("reading {}", paths.snapshot().display()))?;
    let loaded = deserialize(&bytes)?;
    tracing::debug!(num_docs = loaded.0.num_docs(), "snapshot loaded");
    Ok(loaded)
}

pub fn save_meta(paths: &IndexPaths, meta: &MetaFile) -> Result<()> {
    fs::create_dir_all(&paths.root)
        .with_context(|| format!("creating index directory {}", paths.root.display()))?;
    let json = serde_json::to_string_pretty(meta).context("encoding meta")?;
    fs::write(paths.meta(), json)
        .with_context(|| format!("writing {}", paths.meta().display()))?;
    Ok(())
}

pub fn load_meta(paths: &IndexPaths) -> Result<MetaFile> {
    let json = fs::read_to_string(paths.meta())
        .with_context(|| format!("reading {}", paths.meta().display()))?;
    serde_json::from_str(&json).context("decoding meta")
}
