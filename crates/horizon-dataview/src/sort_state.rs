//! Which columns a view is sorted by.
//!
//! Keys are column positions, kept in the order they were marked. The first
//! marked key is the primary one. Sort directions live on the columns
//! themselves; this type only tracks membership and keeps positions valid
//! when the column registry changes shape.

#[derive(Debug, Default)]
pub(crate) struct SortState {
    /// Positions of sort key columns, in marking order.
    keys: Vec<usize>,
    allow_multi: bool,
}

impl SortState {
    pub fn new(allow_multi: bool) -> Self {
        Self {
            keys: Vec::new(),
            allow_multi,
        }
    }

    pub fn contains(&self, position: usize) -> bool {
        self.keys.contains(&position)
    }

    pub fn allows_multi(&self) -> bool {
        self.allow_multi
    }

    pub fn set_allow_multi(&mut self, allow: bool) {
        self.allow_multi = allow;
    }

    /// Keys in marking order.
    pub fn marked(&self) -> &[usize] {
        &self.keys
    }

    /// Keys in display order.
    pub fn in_display_order(&self) -> Vec<usize> {
        let mut keys = self.keys.clone();
        keys.sort_unstable();
        keys
    }

    /// Adds a key. In single-key mode every other key is dropped first.
    ///
    /// Returns the positions that stopped being keys.
    pub fn add(&mut self, position: usize) -> Vec<usize> {
        if self.contains(position) {
            return Vec::new();
        }
        let displaced = if self.allow_multi {
            Vec::new()
        } else {
            std::mem::take(&mut self.keys)
        };
        self.keys.push(position);
        displaced
    }

    pub fn remove(&mut self, position: usize) -> bool {
        let before = self.keys.len();
        self.keys.retain(|&key| key != position);
        self.keys.len() != before
    }

    /// Drops every key. Returns the dropped positions.
    pub fn clear(&mut self) -> Vec<usize> {
        std::mem::take(&mut self.keys)
    }

    /// Keeps only the first marked key. Returns the dropped positions.
    pub fn collapse_to_primary(&mut self) -> Vec<usize> {
        if self.keys.len() <= 1 {
            return Vec::new();
        }
        self.keys.split_off(1)
    }

    // =========================================================================
    // Registry synchronisation
    // =========================================================================

    /// A column was inserted at `position`.
    pub fn column_inserted(&mut self, position: usize) {
        for key in &mut self.keys {
            if *key >= position {
                *key += 1;
            }
        }
    }

    /// The column at `position` was removed. Returns `true` if it was a key.
    pub fn column_removed(&mut self, position: usize) -> bool {
        let was_key = self.remove(position);
        for key in &mut self.keys {
            if *key > position {
                *key -= 1;
            }
        }
        was_key
    }

    /// The column at `from` was moved to `to`.
    pub fn column_moved(&mut self, from: usize, to: usize) {
        for key in &mut self.keys {
            *key = moved_position(*key, from, to);
        }
    }

    /// Returns `true` if every key is below `column_count` and no key
    /// repeats.
    pub fn is_consistent(&self, column_count: usize) -> bool {
        let mut seen = self.in_display_order();
        let len = seen.len();
        seen.dedup();
        seen.len() == len
            && seen.iter().all(|&key| key < column_count)
            && (self.allow_multi || len <= 1)
    }
}

/// Where the column at `position` ends up after the column at `from` moves
/// to `to`.
pub(crate) fn moved_position(position: usize, from: usize, to: usize) -> usize {
    if position == from {
        to
    } else if from < to && position > from && position <= to {
        position - 1
    } else if to < from && position >= to && position < from {
        position + 1
    } else {
        position
    }
}
