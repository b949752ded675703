//! Fuzzy matching by in-order character subsequence.

/// Result of matching query characters in order against a text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubsequenceMatch {
    /// Query characters found in order
    pub matched: usize,
    /// Query characters considered (whitespace excluded)
    pub total: usize,
    /// Character offset in the text of the first matched character
    pub first_position: Option<usize>,
}

impl SubsequenceMatch {
    /// Share of query characters found, in `0.0..=1.0`
    pub fn ratio(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.matched as f64 / self.total as f64
    }
}

/// Match the query's characters against `text` in order.
///
/// Each query character is looked up from the position after the previous
/// hit; characters that cannot be found are skipped without moving forward,
/// so one typo does not hide the rest of the query.
///
/// # Arguments
/// * `text` - Normalized text to search in
/// * `query` - Normalized query
pub fn subsequence_match(text: &str, query: &str) -> SubsequenceMatch {
    let text_chars: Vec<char> = text.chars().collect();
    let mut cursor = 0;
    let mut matched = 0;
    let mut total = 0;
    let mut first_position = None;

    for query_char in query.chars().filter(|c| !c.is_whitespace()) {
        total += 1;
        if let Some(found) = text_chars[cursor..].iter().position(|&c| c == query_char) {
            let position = cursor + found;
            first_position.get_or_insert(position);
            matched += 1;
            cursor = position + 1;
        }
    }

    SubsequenceMatch {
        matched,
        total,
        first_position,
    }
}

/// Check if text contains all characters of query in order.
pub fn fuzzy_match(text: &str, query: &str) -> bool {
    let result = subsequence_match(text, query);
    result.total > 0 && result.matched == result.total
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fuzzy_match_true() {
        assert!(fuzzy_match("hello world", "hwo"));
    }

    #[test]
    fn test_fuzzy_match_false() {
        assert!(!fuzzy_match("hello", "lhe"));
    }

    #[test]
    fn test_fuzzy_match_exact() {
        assert!(fuzzy_match("hello", "hello"));
    }

    #[test]
    fn test_ratio_with_typo() {
        // "joghurt" against "jogurt": 6 of 7 query characters in order
        let result = subsequence_match("jogurt natur", "joghurt");
        assert_eq!(result.matched, 6);
        assert_eq!(result.total, 7);
        assert_eq!(result.first_position, Some(0));
        assert!(result.ratio() > 0.85);
    }

    #[test]
    fn test_whitespace_ignored() {
        let result = subsequence_match("vollkornbrot", "voll brot");
        assert_eq!(result.total, 8);
        assert_eq!(result.matched, 8);
    }

    #[test]
    fn test_empty_query() {
        let result = subsequence_match("anything", "");
        assert_eq!(result.ratio(), 0.0);
        assert!(!fuzzy_match("anything", ""));
    }

    #[test]
    fn test_first_position_counts_chars() {
        let result = subsequence_match("süße milch", "milch");
        assert_eq!(result.first_position, Some(5));
    }
}
