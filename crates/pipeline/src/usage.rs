//! Local usage counts used as a popularity signal

use std::collections::HashMap;

/// Source of per-identifier usage counts, e.g. how often the user logged an item
pub trait UsageProvider: Send + Sync {
    /// Usage count for `identifier`, `None` when unknown
    fn usage_count(&self, identifier: &str) -> Option<u32>;
}

/// Provider that knows no usage
#[derive(Debug, Clone, Copy, Default)]
pub struct NoUsage;

impl UsageProvider for NoUsage {
    fn usage_count(&self, _identifier: &str) -> Option<u32> {
        None
    }
}

/// Fixed in-memory usage counts
#[derive(Debug, Clone, Default)]
pub struct StaticUsage {
    counts: HashMap<String, u32>,
}

impl StaticUsage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style method to add a count
    #[must_use]
    pub fn with(mut self, identifier: impl Into<String>, count: u32) -> Self {
        self.counts.insert(identifier.into(), count);
        self
    }
}

impl<K: Into<String>> FromIterator<(K, u32)> for StaticUsage {
    fn from_iter<I: IntoIterator<Item = (K, u32)>>(iter: I) -> Self {
        Self {
            counts: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

impl UsageProvider for StaticUsage {
    fn usage_count(&self, identifier: &str) -> Option<u32> {
        self.counts.get(identifier).copied()
    }
}
