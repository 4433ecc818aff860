//! Bidirectional package-version to solver-ID mapping.
//!
//! The external solver works over integers. Every distinct `(name, version)`
//! pair seen during universe construction gets one dense ID, allocated in
//! registration order, with reverse lookup for mapping the solver's answer
//! back.

use partita_core::{AHashMap, PackageKey};

/// Dense, injective map between package keys and solver IDs.
#[derive(Debug, Default)]
pub struct VersionIdMap {
    forward: AHashMap<PackageKey, u32>,
    reverse: Vec<PackageKey>,
}

impl VersionIdMap {
    /// Create an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The ID for `key`, allocating the next dense ID on first sight.
    ///
    /// Calling this twice with the same key returns the same ID.
    pub fn id_for(&mut self, key: &PackageKey) -> u32 {
        if let Some(&id) = self.forward.get(key) {
            return id;
        }
        // Allocation order is registration order, so IDs are dense.
        #[allow(clippy::cast_possible_truncation)]
        let id = self.reverse.len() as u32;
        self.forward.insert(key.clone(), id);
        self.reverse.push(key.clone());
        id
    }

    /// The already-allocated ID for `key`, if any.
    #[must_use]
    pub fn get(&self, key: &PackageKey) -> Option<u32> {
        self.forward.get(key).copied()
    }

    /// The package key behind `id`.
    #[must_use]
    pub fn key_for(&self, id: u32) -> Option<&PackageKey> {
        self.reverse.get(id as usize)
    }

    /// Number of allocated IDs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.reverse.len()
    }

    /// Whether no IDs have been allocated.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.reverse.is_empty()
    }
}
