//! Previous-value cache used to decide which readings changed

use std::collections::HashMap;

use paramsync_domain::{ChangeKey, RawValue};

/// Last observed raw value per [`ChangeKey`].
///
/// A missing entry means "never seen", which is different from an entry
/// holding `None` (the source returned `NULL`). The cache tracks what the
/// source said, not what was delivered downstream.
#[derive(Debug, Default, Clone)]
pub struct ChangeCache {
    values: HashMap<ChangeKey, RawValue>,
}

impl ChangeCache {
    /// Empty cache; every key counts as unseen.
    pub fn new() -> Self {
        Self::default()
    }

    /// `None` if the key was never observed.
    pub fn get(&self, key: &ChangeKey) -> Option<RawValue> {
        self.values.get(key).copied()
    }

    /// Unseen keys always count as changed. `NaN` never compares equal, so a
    /// `NaN` reading is reported as changed on every poll.
    pub fn has_changed(&self, key: &ChangeKey, raw: RawValue) -> bool {
        self.values.get(key) != Some(&raw)
    }

    /// Store the observed value, returning the previous entry.
    pub fn set(&mut self, key: ChangeKey, raw: RawValue) -> Option<RawValue> {
        self.values.insert(key, raw)
    }

    /// Number of keys observed.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// `true` before the first observation.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
