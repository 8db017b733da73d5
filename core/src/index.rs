use crate::tokenizer::tokenize;
use crate::SchemaError;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

pub type TermId = u32;
pub type DocId = u32;

/// One corpus record: an external document id plus its full text.
///
/// In the shipped scene corpus the id is the composite `"play:scene"`
/// string, but the core treats it as opaque.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorpusDoc {
    pub id: String,
    pub text: String,
}

impl CorpusDoc {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self { id: id.into(), text: text.into() }
    }
}

/// Positions of one term within one document.
///
/// Positions are 1-based, strictly ascending, and immutable once the build
/// completes. A posting exists iff it has at least one position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Posting {
    pub doc_id: DocId,
    pub positions: Vec<u32>,
}

/// Positional inverted index over a static corpus.
///
/// Storage is arena-style: the dictionary interns terms to dense
/// [`TermId`]s, postings live in one vector indexed by term id (each list
/// sorted ascending by doc id), and external document ids are interned to
/// dense [`DocId`]s assigned in corpus order. A term is present in the
/// dictionary iff it occurs in at least one document.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvertedIndex {
    dictionary: HashMap<String, TermId>,
    postings: Vec<Vec<Posting>>,
    doc_ids: Vec<String>,
    doc_id_map: HashMap<String, DocId>,
}

impl InvertedIndex {
    /// Build the index from a corpus. Document ids are assigned
    /// sequentially in corpus order; [`DocStats::build`] over the same
    /// slice assigns the same ids.
    ///
    /// Fails with [`SchemaError`] on an empty or repeated external id,
    /// returning no partial index.
    pub fn build(corpus: &[CorpusDoc]) -> Result<Self, SchemaError> {
        let mut index = InvertedIndex::default();

        for doc in corpus {
            if doc.id.is_empty() {
                return Err(SchemaError::EmptyDocId);
            }
            if index.doc_id_map.contains_key(&doc.id) {
                return Err(SchemaError::DuplicateDocId(doc.id.clone()));
            }
            let doc_id = index.doc_ids.len() as DocId;
            index.doc_ids.push(doc.id.clone());
            index.doc_id_map.insert(doc.id.clone(), doc_id);

            for (term, position) in tokenize(&doc.text) {
                let next_id = index.postings.len() as TermId;
                let tid = *index.dictionary.entry(term).or_insert(next_id);
                if tid == next_id {
                    index.postings.push(Vec::new());
                }
                let plist = &mut index.postings[tid as usize];
                match plist.last_mut() {
                    // Tokens arrive in document order, so appending keeps
                    // positions ascending and posting lists sorted by doc id.
                    Some(p) if p.doc_id == doc_id => p.positions.push(position),
                    _ => plist.push(Posting { doc_id, positions: vec![position] }),
                }
            }
        }

        tracing::debug!(
            num_docs = index.num_docs(),
            num_terms = index.num_terms(),
            "index build complete"
        );
        Ok(index)
    }

    pub fn num_docs(&self) -> u32 {
        self.doc_ids.len() as u32
    }

    pub fn num_terms(&self) -> usize {
        self.dictionary.len()
    }

    /// External id for an internal doc id.
    pub fn external_id(&self, doc_id: DocId) -> Option<&str> {
        self.doc_ids.get(doc_id as usize).map(String::as_str)
    }

    /// Internal doc id for an external id.
    pub fn resolve(&self, external_id: &str) -> Option<DocId> {
        self.doc_id_map.get(external_id).copied()
    }

    /// Postings list for a term, sorted ascending by doc id. `None` if the
    /// term never occurs in the corpus.
    pub fn postings_for(&self, term: &str) -> Option<&[Posting]> {
        let tid = *self.dictionary.get(term)?;
        Some(&self.postings[tid as usize])
    }

    /// Occurrence positions of `term` in one document.
    pub fn positions(&self, term: &str, doc_id: DocId) -> Option<&[u32]> {
        let plist = self.postings_for(term)?;
        let at = plist.binary_search_by_key(&doc_id, |p| p.doc_id).ok()?;
        Some(&plist[at].positions)
    }

    /// Number of documents containing `term`.
    pub fn doc_frequency(&self, term: &str) -> u32 {
        self.postings_for(term).map_or(0, |plist| plist.len() as u32)
    }

    /// Occurrence count of `term` in one document (0 if absent).
    pub fn term_frequency(&self, term: &str, doc_id: DocId) -> u32 {
        self.positions(term, doc_id).map_or(0, |p| p.len() as u32)
    }

    /// Total occurrence count of `term` across the whole corpus.
    pub fn total_term_frequency(&self, term: &str) -> u32 {
        self.postings_for(term)
            .map_or(0, |plist| plist.iter().map(|p| p.positions.len() as u32).sum())
    }

    /// Iterate all distinct indexed terms (arbitrary order).
    pub fn terms(&self) -> impl Iterator<Item = &str> {
        self.dictionary.keys().map(String::as_str)
    }
}

/// Per-document token counts, built with the same tokenization rule as the
/// index so BM25 length normalization stays consistent with postings.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocStats {
    doc_lengths: Vec<u32>,
    total_len: u64,
}

impl DocStats {
    /// Compute token counts per document. Validation and doc-id assignment
    /// match [`InvertedIndex::build`] over the same corpus slice.
    pub fn build(corpus: &[CorpusDoc]) -> Result<Self, SchemaError> {
        let mut seen: HashSet<&str> = HashSet::with_capacity(corpus.len());
        let mut stats = DocStats::default();
        for doc in corpus {
            if doc.id.is_empty() {
                return Err(SchemaError::EmptyDocId);
            }
            if !seen.insert(doc.id.as_str()) {
                return Err(SchemaError::DuplicateDocId(doc.id.clone()));
            }
            let len = tokenize(&doc.text).len() as u32;
            stats.doc_lengths.push(len);
            stats.total_len += u64::from(len);
        }
        Ok(stats)
    }

    pub fn num_docs(&self) -> u32 {
        self.doc_lengths.len() as u32
    }

    /// Token count of one document (0 for unknown ids).
    pub fn doc_len(&self, doc_id: DocId) -> u32 {
        self.doc_lengths.get(doc_id as usize).copied().unwrap_or(0)
    }

    /// Corpus-wide average document length, computed on demand so it can
    /// never go stale against the stored lengths. 0.0 for an empty corpus.
    pub fn avg_doc_len(&self) -> f32 {
        if self.doc_lengths.is_empty() {
            return 0.0;
        }
        self.total_len as f32 / self.doc_lengths.len() as f32
    }
}
