//! Boolean, phrase, and frequency queries over an immutable index.
//!
//! Every function borrows the index and mutates nothing; a failed query
//! leaves the index fully usable. Terms absent from the index are never an
//! error: they degrade to empty result sets uniformly, so only queries
//! that are malformed in themselves (empty phrase, empty term list) return
//! [`QueryError`].

use crate::{DocId, InvertedIndex, QueryError};
use std::collections::{BTreeSet, HashMap, HashSet};

/// Documents containing `term`.
///
/// Absent terms yield an empty set rather than an `Option`: with the
/// dictionary invariant (a term is indexed iff some posting is non-empty)
/// there is no "present but in zero documents" state to distinguish, and
/// the uniform set makes the boolean operators total.
pub fn documents_containing(index: &InvertedIndex, term: &str) -> HashSet<DocId> {
    index
        .postings_for(term)
        .map(|plist| plist.iter().map(|p| p.doc_id).collect())
        .unwrap_or_default()
}

/// Documents containing both `term_a` and `term_b`. Commutative; either
/// term being absent gives an empty result, not an error.
pub fn intersect(index: &InvertedIndex, term_a: &str, term_b: &str) -> HashSet<DocId> {
    let docs_a = documents_containing(index, term_a);
    let docs_b = documents_containing(index, term_b);
    docs_a.intersection(&docs_b).copied().collect()
}

/// Documents containing at least one of `terms`. Duplicate terms collapse
/// naturally. At least one term is required.
pub fn union(index: &InvertedIndex, terms: &[String]) -> Result<HashSet<DocId>, QueryError> {
    if terms.is_empty() {
        return Err(QueryError::EmptyTerms);
    }
    let mut out = HashSet::new();
    for term in terms {
        out.extend(documents_containing(index, term));
    }
    Ok(out)
}

/// Documents in which `phrase` occurs as consecutive terms in order.
///
/// A single-term phrase is a plain containment lookup. Longer phrases fold
/// left over the terms, carrying for each surviving candidate document the
/// positions where the phrase-so-far ends: a position survives a step only
/// if the next term occurs immediately after it, and is then advanced to
/// that occurrence. Adjacency is therefore always checked between
/// consecutive terms against the pruned candidate state, so a document
/// like "the will come tomorrow sun will" matches ["sun","will"] but not
/// ["the","sun","will"].
pub fn phrase_match(index: &InvertedIndex, phrase: &[String]) -> Result<HashSet<DocId>, QueryError> {
    let (first, rest) = phrase.split_first().ok_or(QueryError::EmptyPhrase)?;
    if rest.is_empty() {
        return Ok(documents_containing(index, first));
    }

    // doc -> positions where the phrase prefix currently ends
    let mut live: HashMap<DocId, Vec<u32>> = index
        .postings_for(first)
        .map(|plist| plist.iter().map(|p| (p.doc_id, p.positions.clone())).collect())
        .unwrap_or_default();

    for term in rest {
        let mut survivors: HashMap<DocId, Vec<u32>> = HashMap::new();
        for (doc_id, ends) in &live {
            let next = match index.positions(term, *doc_id) {
                Some(next) => next,
                None => continue,
            };
            let advanced: Vec<u32> = ends
                .iter()
                .filter(|&&p| next.binary_search(&(p + 1)).is_ok())
                .map(|&p| p + 1)
                .collect();
            if !advanced.is_empty() {
                survivors.insert(*doc_id, advanced);
            }
        }
        live = survivors;
        if live.is_empty() {
            break;
        }
    }

    Ok(live.into_keys().collect())
}

/// Documents where the summed occurrence count of `terms_a` strictly
/// exceeds that of `terms_b`.
///
/// Each document is evaluated once, under `terms_a`'s union; a document
/// reachable through both lists is not re-counted under `terms_b`, and a
/// document containing only `terms_b` words can never win (its `terms_a`
/// count is zero). Both lists must be non-empty.
pub fn term_frequency_compare(
    index: &InvertedIndex,
    terms_a: &[String],
    terms_b: &[String],
) -> Result<HashSet<DocId>, QueryError> {
    if terms_b.is_empty() {
        return Err(QueryError::EmptyTerms);
    }
    let candidates = union(index, terms_a)?;
    let out = candidates
        .into_iter()
        .filter(|&doc_id| {
            let count_a: u32 = terms_a.iter().map(|t| index.term_frequency(t, doc_id)).sum();
            let count_b: u32 = terms_b.iter().map(|t| index.term_frequency(t, doc_id)).sum();
            count_a > count_b
        })
        .collect();
    Ok(out)
}

/// Total occurrences of any of `terms` per document. Counts are summed
/// across terms sharing a document, so no term's contribution is lost.
pub fn count_per_document(
    index: &InvertedIndex,
    terms: &[String],
) -> Result<HashMap<DocId, u32>, QueryError> {
    if terms.is_empty() {
        return Err(QueryError::EmptyTerms);
    }
    let mut counts: HashMap<DocId, u32> = HashMap::new();
    for term in terms {
        if let Some(plist) = index.postings_for(term) {
            for posting in plist {
                *counts.entry(posting.doc_id).or_insert(0) += posting.positions.len() as u32;
            }
        }
    }
    Ok(counts)
}

/// Collapse document ids of the form `"play:scene"` to their distinct
/// play prefixes, sorted. Ids without a `:` pass through whole.
pub fn plays_containing(index: &InvertedIndex, docs: &HashSet<DocId>) -> BTreeSet<String> {
    docs.iter()
        .filter_map(|&doc_id| index.external_id(doc_id))
        .map(|id| id.split(':').next().unwrap_or(id).to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CorpusDoc;

    fn index() -> InvertedIndex {
        InvertedIndex::build(&[
            CorpusDoc::new("hello", "the sun will come"),
            CorpusDoc::new("daysend", "the will come tomorrow sun will"),
        ])
        .unwrap()
    }

    fn named(index: &InvertedIndex, docs: &HashSet<DocId>) -> BTreeSet<String> {
        docs.iter()
            .map(|&d| index.external_id(d).unwrap().to_string())
            .collect()
    }

    fn terms(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn absent_term_yields_empty_set() {
        let ix = index();
        assert!(documents_containing(&ix, "moon").is_empty());
        assert!(intersect(&ix, "moon", "sun").is_empty());
        assert!(intersect(&ix, "sun", "moon").is_empty());
    }

    #[test]
    fn intersect_is_commutative() {
        let ix = index();
        assert_eq!(intersect(&ix, "sun", "tomorrow"), intersect(&ix, "tomorrow", "sun"));
        assert_eq!(named(&ix, &intersect(&ix, "sun", "tomorrow")), ["daysend".to_string()].into());
    }

    #[test]
    fn union_is_idempotent_under_duplicates() {
        let ix = index();
        let with_dup = union(&ix, &terms(&["sun", "sun", "tomorrow"])).unwrap();
        let without = union(&ix, &terms(&["sun", "tomorrow"])).unwrap();
        assert_eq!(with_dup, without);
    }

    #[test]
    fn union_requires_a_term() {
        let ix = index();
        assert_eq!(union(&ix, &[]), Err(QueryError::EmptyTerms));
    }

    #[test]
    fn adjacent_pair_matches() {
        let ix = index();
        // "hello": the(1) sun(2); "daysend": sun(5) will(6).
        let the_sun = phrase_match(&ix, &terms(&["the", "sun"])).unwrap();
        assert_eq!(named(&ix, &the_sun), ["hello".to_string()].into());
        let sun_will = phrase_match(&ix, &terms(&["sun", "will"])).unwrap();
        assert_eq!(named(&ix, &sun_will), ["daysend".to_string()].into());
    }

    #[test]
    fn non_contiguous_chain_is_rejected() {
        let ix = index();
        // In "daysend" the(1) is not followed by sun at 2, so the chain
        // the->sun->will must not survive even though sun(5) will(6) is
        // adjacent there; "hello" carries the full contiguous run.
        let got = phrase_match(&ix, &terms(&["the", "sun", "will"])).unwrap();
        assert_eq!(named(&ix, &got), ["hello".to_string()].into());
    }

    #[test]
    fn phrase_spanning_repeated_words_matches() {
        let ix = index();
        // will(2) come(3) in "daysend" via positions 2..3 of "the will come".
        let got = phrase_match(&ix, &terms(&["the", "will", "come"])).unwrap();
        assert_eq!(named(&ix, &got), ["daysend".to_string()].into());
    }

    #[test]
    fn single_term_phrase_is_containment() {
        let ix = index();
        let got = phrase_match(&ix, &terms(&["tomorrow"])).unwrap();
        assert_eq!(named(&ix, &got), ["daysend".to_string()].into());
        assert!(phrase_match(&ix, &terms(&["moon"])).unwrap().is_empty());
    }

    #[test]
    fn empty_phrase_is_an_error() {
        let ix = index();
        assert_eq!(phrase_match(&ix, &[]), Err(QueryError::EmptyPhrase));
    }

    #[test]
    fn frequency_compare_sums_both_lists() {
        let ix = InvertedIndex::build(&[
            CorpusDoc::new("a", "thee thou you you"),
            CorpusDoc::new("b", "thee thou you"),
            CorpusDoc::new("c", "you you"),
            CorpusDoc::new("d", "thee"),
        ])
        .unwrap();
        let got =
            term_frequency_compare(&ix, &terms(&["thee", "thou"]), &terms(&["you"])).unwrap();
        // "a" ties (2 vs 2), "b" wins 2 vs 1, "c" has no thee/thou, "d" wins 1 vs 0.
        assert_eq!(named(&ix, &got), ["b".to_string(), "d".to_string()].into());
    }

    #[test]
    fn counts_accumulate_across_terms() {
        let ix = InvertedIndex::build(&[
            CorpusDoc::new("a", "thee thou thee"),
            CorpusDoc::new("b", "thou"),
        ])
        .unwrap();
        let counts = count_per_document(&ix, &terms(&["thee", "thou"])).unwrap();
        let a = ix.resolve("a").unwrap();
        let b = ix.resolve("b").unwrap();
        assert_eq!(counts[&a], 3);
        assert_eq!(counts[&b], 1);
    }

    #[test]
    fn plays_collapse_and_dedupe() {
        let ix = InvertedIndex::build(&[
            CorpusDoc::new("hamlet:1", "sun"),
            CorpusDoc::new("hamlet:2", "sun"),
            CorpusDoc::new("caesar:1", "sun"),
        ])
        .unwrap();
        let docs = documents_containing(&ix, "sun");
        let plays = plays_containing(&ix, &docs);
        assert_eq!(plays, ["caesar".to_string(), "hamlet".to_string()].into());
    }
}
