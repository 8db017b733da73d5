//! `folio-core`: positional search core over a scene corpus.
//!
//! Builds a positional inverted index plus per-document length statistics
//! from a static corpus, and evaluates boolean, phrase, and frequency
//! queries and Okapi BM25 ranking against them. The index and statistics
//! are immutable once built and are passed explicitly to every query and
//! ranking function, so multiple independent indexes can live in one
//! process and readers never need a lock.
//!
//! Scope:
//! - In-memory index, built once from a corpus snapshot
//! - Whitespace tokenization only (see [`tokenizer::tokenize`])
//! - Deterministic ranking (tie-break by doc id)
//!
//! Non-goals:
//! - Incremental or distributed indexing
//! - Query language beyond phrase strings and explicit term lists
//! - Relevance feedback in scoring

pub mod index;
pub mod persist;
pub mod query;
pub mod rank;
pub mod tokenizer;

pub use error::{QueryError, SchemaError};
pub use index::{CorpusDoc, DocId, DocStats, InvertedIndex, Posting, TermId};

mod error {
    /// A malformed corpus record. Any schema error aborts the entire
    /// build; no partially indexed corpus is ever returned.
    #[derive(thiserror::Error, Debug)]
    pub enum SchemaError {
        /// A record in the corpus input is missing a required field.
        #[error("corpus record {record} is missing field `{field}`")]
        MissingField {
            /// Name of the absent field.
            field: &'static str,
            /// Best-effort identification of the offending record.
            record: String,
        },
        /// A record carries an empty document id.
        #[error("corpus record has an empty document id")]
        EmptyDocId,
        /// The same document id appeared twice in the corpus.
        #[error("duplicate document id: {0}")]
        DuplicateDocId(String),
    }

    /// A query that is invalid regardless of index contents. Terms that
    /// are merely absent from the index are never an error; they degrade
    /// to empty result sets.
    #[derive(thiserror::Error, Debug, PartialEq, Eq)]
    pub enum QueryError {
        /// Phrase queries need at least one term.
        #[error("empty phrase")]
        EmptyPhrase,
        /// The operation requires at least one term.
        #[error("empty term list")]
        EmptyTerms,
    }
}
