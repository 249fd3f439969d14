//! Per-column best-width cache.
//!
//! Measuring a column's best width means asking the content window to look at
//! every visible cell, so results are cached. Invalidating an entry is O(1):
//! the entry is cleared and marked dirty. The dirty bit means "the header has
//! not seen this column's current width yet"; dirty entries are drained by the
//! view's idle flush, which coalesces any number of invalidations into one
//! pass.

/// Cached best width of one column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CachedColWidth {
    /// Cached best width, or 0 if not computed.
    width: u32,
    /// Column was invalidated and the header needs updating.
    dirty: bool,
    /// Best width the header was last synced with.
    reported: u32,
}

impl CachedColWidth {
    const fn fresh() -> Self {
        Self {
            width: 0,
            dirty: true,
            reported: 0,
        }
    }
}

/// Best-width cache kept parallel to the column registry.
#[derive(Debug, Default)]
pub(crate) struct WidthCache {
    entries: Vec<CachedColWidth>,
    /// Number of dirty entries, so "anything dirty?" never scans.
    dirty_count: usize,
}

impl WidthCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if at least one entry is dirty.
    pub fn is_any_dirty(&self) -> bool {
        self.dirty_count > 0
    }

    pub fn is_dirty(&self, index: usize) -> bool {
        self.entries.get(index).is_some_and(|entry| entry.dirty)
    }

    /// Returns the cached best width, if it has been computed.
    pub fn cached(&self, index: usize) -> Option<u32> {
        self.entries
            .get(index)
            .map(|entry| entry.width)
            .filter(|&width| width != 0)
    }

    /// Stores a freshly computed best width. The dirty bit is left alone: the
    /// header still has to be told during the next flush.
    pub fn store(&mut self, index: usize, width: u32) {
        if let Some(entry) = self.entries.get_mut(index) {
            entry.width = width;
        }
    }

    /// Clears one entry. Returns `false` if `index` is out of range.
    pub fn invalidate(&mut self, index: usize) -> bool {
        let Some(entry) = self.entries.get_mut(index) else {
            return false;
        };
        entry.width = 0;
        if !entry.dirty {
            entry.dirty = true;
            self.dirty_count += 1;
        }
        true
    }

    /// Clears every entry.
    pub fn invalidate_all(&mut self) {
        self.invalidate_range(0..self.entries.len());
    }

    fn invalidate_range(&mut self, range: std::ops::Range<usize>) {
        for index in range {
            self.invalidate(index);
        }
    }

    /// Inserts a fresh entry for a column added at `position`. Entries after
    /// it are invalidated since their columns moved.
    pub fn insert(&mut self, position: usize) {
        self.entries.insert(position, CachedColWidth::fresh());
        self.dirty_count += 1;
        self.invalidate_range(position + 1..self.entries.len());
    }

    /// Removes the entry of a column deleted from `position` and invalidates
    /// the entries that shifted into its place.
    pub fn remove(&mut self, position: usize) {
        if position >= self.entries.len() {
            return;
        }
        if self.entries.remove(position).dirty {
            self.dirty_count -= 1;
        }
        self.invalidate_range(position..self.entries.len());
    }

    /// Moves the entry at `from` to `to`, invalidating every slot in between.
    pub fn move_entry(&mut self, from: usize, to: usize) {
        if from == to || from >= self.entries.len() || to >= self.entries.len() {
            return;
        }
        let entry = self.entries.remove(from);
        self.entries.insert(to, entry);
        self.invalidate_range(from.min(to)..from.max(to) + 1);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.dirty_count = 0;
    }

    /// Returns the indices of all dirty entries.
    pub fn dirty_indices(&self) -> Vec<usize> {
        if !self.is_any_dirty() {
            return Vec::new();
        }
        self.entries
            .iter()
            .enumerate()
            .filter_map(|(index, entry)| entry.dirty.then_some(index))
            .collect()
    }

    /// Clears the dirty bit of an entry whose best width was not needed.
    pub fn mark_clean(&mut self, index: usize) {
        if let Some(entry) = self.entries.get_mut(index)
            && entry.dirty
        {
            entry.dirty = false;
            self.dirty_count -= 1;
        }
    }

    /// Clears the dirty bit and records the width the header now shows.
    ///
    /// Returns `true` if that width differs from the last one reported.
    pub fn mark_synced(&mut self, index: usize, width: u32) -> bool {
        self.mark_clean(index);
        let Some(entry) = self.entries.get_mut(index) else {
            return false;
        };
        let changed = entry.reported != width;
        entry.reported = width;
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn synced_cache(widths: &[u32]) -> WidthCache {
        let mut cache = WidthCache::new();
        for (index, &width) in widths.iter().enumerate() {
            cache.insert(index);
            cache.store(index, width);
        }
        for (index, &width) in widths.iter().enumerate() {
            cache.mark_synced(index, width);
        }
        assert!(!cache.is_any_dirty());
        cache
    }

    #[test]
    fn test_new_entries_are_dirty() {
        let mut cache = WidthCache::new();
        cache.insert(0);
        cache.insert(1);
        assert_eq!(cache.len(), 2);
        assert!(cache.is_any_dirty());
        assert_eq!(cache.cached(0), None);
        assert_eq!(cache.dirty_indices(), vec![0, 1]);
    }

    #[test]
    fn test_invalidate_single_slot() {
        let mut cache = synced_cache(&[50, 60, 70]);
        assert!(cache.invalidate(1));
        assert_eq!(cache.dirty_indices(), vec![1]);
        assert_eq!(cache.cached(0), Some(50));
        assert_eq!(cache.cached(1), None);
        assert_eq!(cache.cached(2), Some(70));
        assert!(!cache.invalidate(3));
    }

    #[test]
    fn test_invalidate_twice_counts_once() {
        let mut cache = synced_cache(&[50]);
        cache.invalidate(0);
        cache.invalidate(0);
        cache.mark_clean(0);
        assert!(!cache.is_any_dirty());
    }

    #[test]
    fn test_insert_invalidates_following_slots() {
        let mut cache = synced_cache(&[50, 60, 70]);
        cache.insert(1);
        assert_eq!(cache.len(), 4);
        assert_eq!(cache.dirty_indices(), vec![1, 2, 3]);
        assert_eq!(cache.cached(0), Some(50));
    }

    #[test]
    fn test_remove_invalidates_shifted_slots() {
        let mut cache = synced_cache(&[50, 60, 70]);
        cache.invalidate(1);
        cache.remove(1);
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.dirty_indices(), vec![1]);

        // Removing the only dirty slot at the end leaves nothing dirty
        let mut cache = synced_cache(&[50, 60]);
        cache.invalidate(1);
        cache.remove(1);
        assert!(!cache.is_any_dirty());
    }

    #[test]
    fn test_move_invalidates_span() {
        let mut cache = synced_cache(&[10, 20, 30, 40]);
        cache.move_entry(3, 1);
        assert_eq!(cache.dirty_indices(), vec![1, 2, 3]);
        assert_eq!(cache.cached(0), Some(10));
    }

    #[test]
    fn test_mark_synced_reports_changes() {
        let mut cache = synced_cache(&[50]);
        cache.invalidate(0);
        assert!(!cache.mark_synced(0, 50));
        cache.invalidate(0);
        assert!(cache.mark_synced(0, 65));
        assert!(!cache.is_any_dirty());
    }

    #[test]
    fn test_clear() {
        let mut cache = synced_cache(&[1, 2]);
        cache.invalidate_all();
        cache.clear();
        assert_eq!(cache.len(), 0);
        assert!(!cache.is_any_dirty());
    }
}
