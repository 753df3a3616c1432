//! Fortlaufende, identitätsbasierte Index-Vergabe.

use std::hash::Hash;

use indexmap::IndexMap;

/// Vergibt jedem neuen Schlüssel den nächsten freien Index.
///
/// Wiederholte Registrierung liefert denselben Index. Die Iteration folgt der
/// Registrierungsreihenfolge.
#[derive(Debug, Clone)]
pub struct Indexer<K> {
    next_index: u32,
    indices: IndexMap<K, u32>,
}

impl<K: Copy + Eq + Hash> Indexer<K> {
    pub fn new(first_index: u32) -> Self {
        Self {
            next_index: first_index,
            indices: IndexMap::new(),
        }
    }

    /// Index des Schlüssels; neue Schlüssel bekommen den nächsten freien Wert.
    pub fn get_or_add(&mut self, key: K) -> u32 {
        if let Some(index) = self.indices.get(&key) {
            return *index;
        }
        let index = self.next_index;
        self.next_index += 1;
        self.indices.insert(key, index);
        index
    }

    /// Registriert mehrere Schlüssel in Reihenfolge
    pub fn register(&mut self, keys: impl IntoIterator<Item = K>) {
        for key in keys {
            self.get_or_add(key);
        }
    }

    /// Index eines bereits registrierten Schlüssels
    pub fn get(&self, key: &K) -> Option<u32> {
        self.indices.get(key).copied()
    }

    pub fn contains(&self, key: &K) -> bool {
        self.indices.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Paare (Schlüssel, Index) in Registrierungsreihenfolge
    pub fn iter(&self) -> impl Iterator<Item = (K, u32)> + '_ {
        self.indices.iter().map(|(key, index)| (*key, *index))
    }
}
