use crossbeam_skiplist::SkipMap;

/// Ordered primary-key index: document id -> record offset.
///
/// Mutated only under the write lock, so it always agrees with the file:
/// an entry per live record, none for tombstoned ones. Readers consult it
/// lock-free.
pub struct PrimaryIndex {
    map: SkipMap<i64, u32>,
}

impl PrimaryIndex {
    pub fn new() -> Self {
        Self { map: SkipMap::new() }
    }

    pub fn insert_or_replace(&self, id: i64, offset: u32) {
        self.map.insert(id, offset);
    }

    pub fn remove(&self, id: i64) {
        self.map.remove(&id);
    }

    pub fn lookup(&self, id: i64) -> Option<u32> {
        self.map.get(&id).map(|entry| *entry.value())
    }

    pub fn contains(&self, id: i64) -> bool {
        self.map.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

impl Default for PrimaryIndex {
    fn default() -> Self {
        Self::new()
    }
}
