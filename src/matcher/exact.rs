use std::collections::HashMap;

/// Exact-key index for the non-regex rule types.
///
/// Keys are compared byte for byte; there is no prefix or partial matching.
#[derive(Debug, Clone)]
pub struct ExactMatchIndex<T> {
    entries: HashMap<String, T>,
}

impl<T> Default for ExactMatchIndex<T> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<T> ExactMatchIndex<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `entry` under `key`. A previous entry under the same key is
    /// replaced and returned.
    pub fn insert(&mut self, key: impl Into<String>, entry: T) -> Option<T> {
        self.entries.insert(key.into(), entry)
    }

    pub fn get(&self, key: &str) -> Option<&T> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
