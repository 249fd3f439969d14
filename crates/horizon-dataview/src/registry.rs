//! Ordered, owning storage for a view's columns.
//!
//! Storage order is display order: moving a column physically moves its
//! entry. Every owned column also gets a [`ColumnId`] so callers can refer to
//! it by identity, which stays valid across reordering and is invalidated when
//! the column is removed.

use slotmap::{new_key_type, SlotMap};

use crate::column::Column;

new_key_type! {
    /// Stable identity of a column owned by a [`DataView`](crate::DataView).
    ///
    /// Returned when a column is added. It survives reordering and becomes
    /// stale once the column is deleted.
    pub struct ColumnId;
}

/// The ordered column collection hosted by a data view.
#[derive(Debug, Default)]
pub(crate) struct ColumnRegistry {
    columns: SlotMap<ColumnId, Column>,
    order: Vec<ColumnId>,
}

impl ColumnRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Inserts a column at `position`. Returns `None` if `position` is past
    /// the end.
    pub fn insert(&mut self, position: usize, column: Column) -> Option<ColumnId> {
        if position > self.order.len() {
            return None;
        }
        let id = self.columns.insert(column);
        self.order.insert(position, id);
        Some(id)
    }

    /// Removes a column by identity, returning its former position and the
    /// column itself.
    pub fn remove(&mut self, id: ColumnId) -> Option<(usize, Column)> {
        let position = self.position_of(id)?;
        self.order.remove(position);
        let column = self.columns.remove(id)?;
        Some((position, column))
    }

    /// Removes every column. Returns how many were removed.
    pub fn clear(&mut self) -> usize {
        let count = self.order.len();
        self.order.clear();
        self.columns.clear();
        count
    }

    /// Moves a column to `new_position`, clamped into `[0, len - 1]`.
    ///
    /// Returns `(from, to)` positions, or `None` if the column is unknown.
    pub fn move_to(&mut self, id: ColumnId, new_position: usize) -> Option<(usize, usize)> {
        let from = self.position_of(id)?;
        let to = new_position.min(self.order.len() - 1);
        if from != to {
            let moved = self.order.remove(from);
            self.order.insert(to, moved);
        }
        Some((from, to))
    }

    pub fn position_of(&self, id: ColumnId) -> Option<usize> {
        self.order.iter().position(|&candidate| candidate == id)
    }

    pub fn id_at(&self, position: usize) -> Option<ColumnId> {
        self.order.get(position).copied()
    }

    pub fn get(&self, position: usize) -> Option<&Column> {
        self.id_at(position).and_then(|id| self.columns.get(id))
    }

    pub fn get_mut(&mut self, position: usize) -> Option<&mut Column> {
        let id = self.id_at(position)?;
        self.columns.get_mut(id)
    }

    pub fn get_by_id(&self, id: ColumnId) -> Option<&Column> {
        self.columns.get(id)
    }

    pub fn get_by_id_mut(&mut self, id: ColumnId) -> Option<&mut Column> {
        self.columns.get_mut(id)
    }

    /// Returns the position of the first column showing `model_column`.
    pub fn position_of_model_column(&self, model_column: usize) -> Option<usize> {
        self.iter()
            .position(|(_, column)| column.model_column() == model_column)
    }

    /// Iterates columns in display order.
    pub fn iter(&self) -> impl Iterator<Item = (ColumnId, &Column)> + '_ {
        self.order
            .iter()
            .filter_map(|&id| self.columns.get(id).map(|column| (id, column)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::TextRenderer;
    use std::sync::Arc;

    fn column(model_column: usize) -> Column {
        Column::new(format!("col{model_column}"), Arc::new(TextRenderer::new()), model_column)
    }

    fn titles(registry: &ColumnRegistry) -> Vec<String> {
        registry
            .iter()
            .map(|(_, column)| column.title().to_string())
            .collect()
    }

    #[test]
    fn test_insert_positions() {
        let mut registry = ColumnRegistry::new();
        registry.insert(0, column(0)).unwrap();
        registry.insert(1, column(1)).unwrap();
        registry.insert(0, column(2)).unwrap();
        registry.insert(1, column(3)).unwrap();
        assert_eq!(titles(&registry), ["col2", "col3", "col0", "col1"]);
    }

    #[test]
    fn test_insert_past_end_fails() {
        let mut registry = ColumnRegistry::new();
        assert!(registry.insert(1, column(0)).is_none());
        assert_eq!(registry.len(), 0);
    }

    #[test]
    fn test_remove_by_identity() {
        let mut registry = ColumnRegistry::new();
        let a = registry.insert(0, column(0)).unwrap();
        let b = registry.insert(1, column(1)).unwrap();

        let (position, removed) = registry.remove(a).unwrap();
        assert_eq!(position, 0);
        assert_eq!(removed.model_column(), 0);
        assert!(registry.get_by_id(a).is_none());
        assert!(registry.remove(a).is_none());
        assert_eq!(registry.position_of(b), Some(0));
    }

    #[test]
    fn test_move_clamps_target() {
        let mut registry = ColumnRegistry::new();
        let a = registry.insert(0, column(0)).unwrap();
        registry.insert(1, column(1)).unwrap();
        registry.insert(2, column(2)).unwrap();

        assert_eq!(registry.move_to(a, 99), Some((0, 2)));
        assert_eq!(titles(&registry), ["col1", "col2", "col0"]);

        assert_eq!(registry.move_to(a, 0), Some((2, 0)));
        assert_eq!(titles(&registry), ["col0", "col1", "col2"]);
    }

    #[test]
    fn test_model_column_lookup() {
        let mut registry = ColumnRegistry::new();
        registry.insert(0, column(7)).unwrap();
        registry.insert(1, column(4)).unwrap();
        assert_eq!(registry.position_of_model_column(4), Some(1));
        assert_eq!(registry.position_of_model_column(5), None);
    }

    #[test]
    fn test_clear() {
        let mut registry = ColumnRegistry::new();
        let a = registry.insert(0, column(0)).unwrap();
        registry.insert(1, column(1)).unwrap();
        assert_eq!(registry.clear(), 2);
        assert_eq!(registry.len(), 0);
        assert!(registry.get_by_id(a).is_none());
    }
}
