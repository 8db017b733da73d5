//! Okapi BM25 ranking over the positional index.
//!
//! Candidate documents are exactly those containing at least one query
//! term; scoring uses posting lengths for term frequency and [`DocStats`]
//! for length normalization. Absent query terms contribute nothing.
//!
//! References:
//! - Robertson & Walker (1994), the 2-Poisson approximations behind BM25
//! - Robertson & Zaragoza (2009), "The Probabilistic Relevance Framework"

use crate::{DocId, DocStats, InvertedIndex, QueryError};
use std::collections::HashMap;

/// BM25 tuning constants.
#[derive(Debug, Clone, Copy)]
pub struct Bm25Params {
    /// Term-frequency saturation.
    pub k1: f32,
    /// Document-length normalization strength.
    pub b: f32,
}

impl Default for Bm25Params {
    fn default() -> Self {
        Self { k1: 1.2, b: 0.75 }
    }
}

/// BM25 score per candidate document for a multi-term query.
///
/// For each query term with document frequency `n` over `N` documents,
/// `IDF = ln((N - n + 0.5) / (n + 0.5) + 1)`, and each posting adds
/// `IDF * f * (k1 + 1) / (f + k1 * (1 - b + b * len/avgdl))` to its
/// document, where `f` is the posting length. Terms not in the index are
/// skipped, so they contribute exactly zero and no division by zero can
/// occur. Repeated query terms contribute once per repetition.
///
/// Callers sort descending to rank; [`rank`] does that deterministically.
pub fn score(
    index: &InvertedIndex,
    stats: &DocStats,
    query_terms: &[String],
    params: Bm25Params,
) -> Result<HashMap<DocId, f32>, QueryError> {
    if query_terms.is_empty() {
        return Err(QueryError::EmptyTerms);
    }

    let mut scores: HashMap<DocId, f32> = HashMap::new();
    let avgdl = stats.avg_doc_len();
    if avgdl == 0.0 {
        return Ok(scores);
    }

    let n = index.num_docs() as f32;
    for term in query_terms {
        let plist = match index.postings_for(term) {
            Some(plist) => plist,
            None => continue,
        };
        let df = plist.len() as f32;
        let idf = ((n - df + 0.5) / (df + 0.5) + 1.0).ln();

        for posting in plist {
            let tf = posting.positions.len() as f32;
            let dl = stats.doc_len(posting.doc_id) as f32;
            let tf_norm = (tf * (params.k1 + 1.0)) / (tf + params.k1 * (1.0 - params.b + params.b * dl / avgdl));
            *scores.entry(posting.doc_id).or_insert(0.0) += idf * tf_norm;
        }
    }
    Ok(scores)
}

/// Top-`k` documents by BM25 score, ordered score descending with ties
/// broken by ascending doc id so repeated runs agree.
pub fn rank(
    index: &InvertedIndex,
    stats: &DocStats,
    query_terms: &[String],
    k: usize,
    params: Bm25Params,
) -> Result<Vec<(DocId, f32)>, QueryError> {
    let mut ranked: Vec<(DocId, f32)> = score(index, stats, query_terms, params)?
        .into_iter()
        .collect();
    ranked.sort_unstable_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked.truncate(k);
    Ok(ranked)
}
