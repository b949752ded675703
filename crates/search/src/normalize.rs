//! Text normalization shared by queries and candidate fields.

/// Lowercase, trim, and collapse runs of whitespace into a single space.
///
/// Two strings that differ only by case or spacing normalize to the same
/// value. No stemming or diacritic folding is applied.
pub fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for word in text.split_whitespace() {
        if !out.is_empty() {
            out.push(' ');
        }
        out.extend(word.chars().flat_map(char::to_lowercase));
    }
    out
}

/// Words of normalized text with their character offsets.
pub fn words_with_offsets(normalized: &str) -> Vec<(usize, &str)> {
    let mut words = Vec::new();
    let mut offset = 0;
    for word in normalized.split(' ') {
        if !word.is_empty() {
            words.push((offset, word));
        }
        offset += word.chars().count() + 1;
    }
    words
}

/// Character offset of a byte index.
pub(crate) fn char_offset(text: &str, byte_index: usize) -> usize {
    text[..byte_index].chars().count()
}

/// A query prepared once and matched against many fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedQuery {
    text: String,
    words: Vec<String>,
}

impl NormalizedQuery {
    /// Normalize a raw query
    pub fn new(raw: &str) -> Self {
        let text = normalize(raw);
        let words = text.split(' ').filter(|w| !w.is_empty()).map(String::from).collect();
        Self { text, words }
    }

    /// Normalized query text
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Query words in order
    pub fn words(&self) -> &[String] {
        &self.words
    }

    /// Whether nothing is left after normalization
    pub fn is_blank(&self) -> bool {
        self.text.is_empty()
    }
}
