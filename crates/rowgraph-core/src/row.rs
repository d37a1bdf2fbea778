use crate::value::{FromValue, Value};
use std::collections::BTreeMap;

///
/// Row
///
/// One flat, join-produced result row. Columns are addressed by the table
/// (or join alias) they came from plus the column name.
///

pub trait Row {
    /// Raw cell for `table.column`, if the row carries it.
    fn value(&self, table: &str, column: &str) -> Option<&Value>;

    /// Typed cell for `table.column`. `Null` and incompatible cells read as absent.
    fn get<T: FromValue>(&self, table: &str, column: &str) -> Option<T> {
        self.value(table, column)
            .filter(|value| !value.is_null())
            .and_then(T::from_value)
    }

    /// True when `table.column` holds a non-null cell.
    fn has(&self, table: &str, column: &str) -> bool {
        self.value(table, column).is_some_and(|value| !value.is_null())
    }
}

impl<R: Row + ?Sized> Row for &R {
    fn value(&self, table: &str, column: &str) -> Option<&Value> {
        (**self).value(table, column)
    }
}

///
/// FromRow
///
/// Decodes an entity's plain columns from a single row. Relation fields are
/// left at their empty state; generated mapping functions fill them in.
///

pub trait FromRow: Sized {
    fn from_row<R: Row + ?Sized>(row: &R) -> Self;
}

///
/// MemRow
///
/// In-memory row, cells grouped by table then column.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct MemRow {
    cells: BTreeMap<String, BTreeMap<String, Value>>,
}

impl MemRow {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, table: &str, column: &str, value: impl Into<Value>) -> Self {
        self.insert(table, column, value);
        self
    }

    pub fn insert(&mut self, table: &str, column: &str, value: impl Into<Value>) {
        self.cells
            .entry(table.to_string())
            .or_default()
            .insert(column.to_string(), value.into());
    }

    /// Number of cells across all tables.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.values().map(BTreeMap::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Row for MemRow {
    fn value(&self, table: &str, column: &str) -> Option<&Value> {
        self.cells.get(table)?.get(column)
    }
}
