use folio_core::persist::{deserialize, serialize};
use folio_core::query::{documents_containing, phrase_match, term_frequency_compare, union};
use folio_core::rank::{rank, Bm25Params};
use folio_core::{CorpusDoc, DocStats, InvertedIndex};

use std::collections::BTreeSet;

fn corpus() -> Vec<CorpusDoc> {
    vec![
        CorpusDoc::new("antony:1", "friends romans countrymen lend me your ears"),
        CorpusDoc::new("antony:2", "cry havoc and let slip the dogs of war"),
        CorpusDoc::new("hamlet:1", "thee thou thee art more lovely"),
        CorpusDoc::new("hamlet:2", "you you speak to thee"),
        CorpusDoc::new("tempest:1", "our revels now are ended"),
    ]
}

fn terms(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| w.to_string()).collect()
}

fn names(index: &InvertedIndex, docs: impl IntoIterator<Item = u32>) -> BTreeSet<String> {
    docs.into_iter()
        .map(|d| index.external_id(d).unwrap().to_string())
        .collect()
}

#[test]
fn build_query_rank_and_snapshot_agree() {
    let corpus = corpus();
    let index = InvertedIndex::build(&corpus).unwrap();
    let stats = DocStats::build(&corpus).unwrap();

    // Phrase query against the live index.
    let havoc = phrase_match(&index, &terms(&["cry", "havoc"])).unwrap();
    assert_eq!(names(&index, havoc), ["antony:2".to_string()].into());

    // Frequency comparison: thee+thou vs you, each document counted once.
    let archaic =
        term_frequency_compare(&index, &terms(&["thee", "thou"]), &terms(&["you"])).unwrap();
    assert_eq!(names(&index, archaic), ["hamlet:1".to_string()].into());

    // Ranking over union candidates only.
    let candidates = union(&index, &terms(&["thee", "havoc"])).unwrap();
    let ranked = rank(&index, &stats, &terms(&["thee", "havoc"]), 10, Bm25Params::default()).unwrap();
    assert_eq!(ranked.len(), candidates.len());
    for pair in ranked.windows(2) {
        assert!(pair[0].1 >= pair[1].1);
    }
    // "thee" appears twice in hamlet:1 and that scene is short; it should
    // outrank the single-occurrence hamlet:2.
    let first = index.external_id(ranked[0].0).unwrap();
    assert_eq!(first, "hamlet:1");

    // The snapshot round-trip answers queries identically.
    let bytes = serialize(&index, &stats).unwrap();
    let (loaded_index, loaded_stats) = deserialize(&bytes).unwrap();
    assert_eq!(loaded_index, index);
    assert_eq!(loaded_stats, stats);
    let havoc_again = phrase_match(&loaded_index, &terms(&["cry", "havoc"])).unwrap();
    assert_eq!(names(&loaded_index, havoc_again), ["antony:2".to_string()].into());
    let ranked_again =
        rank(&loaded_index, &loaded_stats, &terms(&["thee", "havoc"]), 10, Bm25Params::default())
            .unwrap();
    assert_eq!(ranked_again, ranked);
}

#[test]
fn posting_lengths_match_corpus_occurrences() {
    let corpus = corpus();
    let index = InvertedIndex::build(&corpus).unwrap();
    for term in ["thee", "you", "the", "romans"] {
        let expected: u32 = corpus
            .iter()
            .map(|doc| doc.text.split_whitespace().filter(|w| *w == term).count() as u32)
            .sum();
        assert_eq!(index.total_term_frequency(term), expected, "term {term}");
    }
}

#[test]
fn absent_terms_are_harmless_everywhere() {
    let corpus = corpus();
    let index = InvertedIndex::build(&corpus).unwrap();
    let stats = DocStats::build(&corpus).unwrap();

    assert!(documents_containing(&index, "unseen").is_empty());
    assert!(phrase_match(&index, &terms(&["unseen", "words"])).unwrap().is_empty());
    let ranked = rank(&index, &stats, &terms(&["unseen"]), 10, Bm25Params::default()).unwrap();
    assert!(ranked.is_empty());

    // The index stays usable after queries for unknown terms.
    assert_eq!(documents_containing(&index, "havoc").len(), 1);
}
