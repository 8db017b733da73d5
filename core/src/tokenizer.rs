/// Tokenize text into (term, position) pairs by whitespace splitting.
///
/// Positions are 1-based and increment by one per token. Terms are kept
/// exactly as they appear in the text, with no case folding or punctuation
/// stripping, so queries match case-sensitively against the corpus.
/// Indexing, statistics, and query parsing all go through this one
/// function, which is what keeps document lengths consistent with postings.
pub fn tokenize(text: &str) -> Vec<(String, u32)> {
    text.split_whitespace()
        .enumerate()
        .map(|(i, word)| (word.to_string(), i as u32 + 1))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positions_start_at_one() {
        let toks = tokenize("the sun will come");
        assert_eq!(
            toks,
            vec![
                ("the".to_string(), 1),
                ("sun".to_string(), 2),
                ("will".to_string(), 3),
                ("come".to_string(), 4),
            ]
        );
    }

    #[test]
    fn empty_text_yields_no_tokens() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("   \n\t  ").is_empty());
    }

    #[test]
    fn case_is_preserved() {
        let toks = tokenize("Cry havoc");
        assert_eq!(toks[0].0, "Cry");
    }
}
