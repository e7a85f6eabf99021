//! Single-entry cache keyed by generation parameters

/// Holds the value computed for the most recent key.
///
/// Asking again with an equal key returns the cached value; any other key
/// drops it and recomputes.
#[derive(Debug, Clone)]
pub struct Memo<K, V> {
    entry: Option<(K, V)>,
    computations: u32,
}

impl<K, V> Default for Memo<K, V> {
    fn default() -> Self {
        Self {
            entry: None,
            computations: 0,
        }
    }
}

impl<K: PartialEq + Clone, V> Memo<K, V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached value for `key`, computing it if the key changed
    pub fn get_or_compute(&mut self, key: &K, compute: impl FnOnce(&K) -> V) -> &V {
        if !self.is_fresh(key) {
            self.entry = None;
            self.computations += 1;
        }
        let (_, value) = self
            .entry
            .get_or_insert_with(|| (key.clone(), compute(key)));
        value
    }

    /// Cached value if it was computed for `key`
    pub fn get(&self, key: &K) -> Option<&V> {
        match &self.entry {
            Some((k, v)) if k == key => Some(v),
            _ => None,
        }
    }

    pub fn is_fresh(&self, key: &K) -> bool {
        self.get(key).is_some()
    }

    /// Number of times a value has been computed
    pub fn computations(&self) -> u32 {
        self.computations
    }
}
