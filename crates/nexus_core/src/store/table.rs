//! Ordered in-memory record table.
//!
//! # Invariants
//! - Row order is insertion order unless a board reorder rewrites it.
//! - Ids are unique within a table; `restore` skips rows whose id is taken.
//! - [`Removed`] keeps the pre-removal index so restores rebuild the exact
//!   original order when replayed in ascending index order.

use super::{StoreError, StoreResult};
use crate::model::Record;
use serde::Serialize;

/// A row taken out of a table, with the index it occupied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Removed<T> {
    pub index: usize,
    pub record: T,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Table<T> {
    rows: Vec<T>,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self { rows: Vec::new() }
    }
}

impl<T: Record> Table<T> {
    pub fn from_rows(rows: Vec<T>) -> Self {
        Self { rows }
    }

    pub fn as_slice(&self) -> &[T] {
        &self.rows
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.rows.iter()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn first(&self) -> Option<&T> {
        self.rows.first()
    }

    pub fn get(&self, id: &str) -> Option<&T> {
        self.rows.iter().find(|row| row.id() == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.position(id).is_some()
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.rows.iter().position(|row| row.id() == id)
    }

    pub(crate) fn require(&self, id: &str) -> StoreResult<&T> {
        self.get(id).ok_or_else(|| not_found::<T>(id))
    }

    pub(crate) fn require_mut(&mut self, id: &str) -> StoreResult<&mut T> {
        self.rows
            .iter_mut()
            .find(|row| row.id() == id)
            .ok_or_else(|| not_found::<T>(id))
    }

    pub(crate) fn rows_mut(&mut self) -> &mut Vec<T> {
        &mut self.rows
    }

    pub(crate) fn push(&mut self, row: T) {
        self.rows.push(row);
    }

    /// Replaces the row sharing `row.id()`; returns the previous row.
    pub(crate) fn replace(&mut self, row: T) -> Option<T> {
        let slot = self.rows.iter_mut().find(|current| current.id() == row.id())?;
        Some(std::mem::replace(slot, row))
    }

    pub(crate) fn remove(&mut self, id: &str) -> StoreResult<Removed<T>> {
        let index = self.position(id).ok_or_else(|| not_found::<T>(id))?;
        let record = self.rows.remove(index);
        Ok(Removed { index, record })
    }

    /// Removes every row matching `predicate` in one pass.
    ///
    /// Returned indices refer to positions before any removal.
    pub(crate) fn remove_where(&mut self, mut predicate: impl FnMut(&T) -> bool) -> Vec<Removed<T>> {
        let mut removed = Vec::new();
        let mut kept = Vec::with_capacity(self.rows.len());
        for (index, row) in std::mem::take(&mut self.rows).into_iter().enumerate() {
            if predicate(&row) {
                removed.push(Removed { index, record: row });
            } else {
                kept.push(row);
            }
        }
        self.rows = kept;
        removed
    }

    /// Re-inserts removed rows at their original positions.
    ///
    /// Returns how many rows were restored; rows whose id already exists are
    /// skipped.
    pub(crate) fn restore(&mut self, mut removed: Vec<Removed<T>>) -> usize {
        removed.sort_by_key(|item| item.index);
        let mut restored = 0;
        for item in removed {
            if self.contains(item.record.id()) {
                continue;
            }
            let index = item.index.min(self.rows.len());
            self.rows.insert(index, item.record);
            restored += 1;
        }
        restored
    }
}

fn not_found<T: Record>(id: &str) -> StoreError {
    StoreError::NotFound {
        kind: T::KIND,
        id: id.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::Table;
    use crate::model::{EntityKind, Record};

    #[derive(Debug, Clone, PartialEq, Eq)]
    struct Row(&'static str);

    impl Record for Row {
        const KIND: EntityKind = EntityKind::Task;

        fn id(&self) -> &str {
            self.0
        }
    }

    fn ids(table: &Table<Row>) -> Vec<&str> {
        table.iter().map(|row| row.0).collect()
    }

    #[test]
    fn remove_where_then_restore_rebuilds_original_order() {
        let mut table = Table::from_rows(vec![Row("a"), Row("b"), Row("c"), Row("d"), Row("e")]);
        let removed = table.remove_where(|row| matches!(row.0, "b" | "d" | "e"));
        assert_eq!(ids(&table), vec!["a", "c"]);
        assert_eq!(
            removed.iter().map(|item| item.index).collect::<Vec<_>>(),
            vec![1, 3, 4]
        );

        assert_eq!(table.restore(removed), 3);
        assert_eq!(ids(&table), vec!["a", "b", "c", "d", "e"]);
    }

    #[test]
    fn restore_skips_rows_with_taken_ids() {
        let mut table = Table::from_rows(vec![Row("a"), Row("b")]);
        let removed = table.remove("a").expect("row exists");
        table.push(Row("a"));

        assert_eq!(table.restore(vec![removed]), 0);
        assert_eq!(ids(&table), vec!["b", "a"]);
    }

    #[test]
    fn remove_missing_row_reports_kind() {
        let mut table = Table::from_rows(vec![Row("a")]);
        let err = table.remove("zzz").expect_err("row is missing");
        assert!(err.to_string().contains("task not found: zzz"));
    }
}
