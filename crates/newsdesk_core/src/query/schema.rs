//! Static table and relation descriptors.

use crate::query::filter::Predicate;
use rusqlite::types::Value;

/// Value domain of a column, used to coerce filter input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Integer,
    Text,
    /// Epoch milliseconds.
    Timestamp,
    /// Text restricted to a fixed set of values.
    Choice(&'static [&'static str]),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub name: &'static str,
    pub kind: ColumnKind,
}

impl Column {
    pub const fn new(name: &'static str, kind: ColumnKind) -> Self {
        Self { name, kind }
    }
}

/// One table: name, id column and columns in declared order.
///
/// Declared order drives both the SELECT list and positional row mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableSchema {
    pub name: &'static str,
    pub id_column: &'static str,
    pub columns: &'static [Column],
}

impl TableSchema {
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|column| column.name == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    /// Position of a column in declared order.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column.name == name)
    }
}

/// `INNER JOIN <table> ON <table>.<column> = <target_table>.<target_column>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Join {
    pub table: &'static str,
    pub column: &'static str,
    pub target_table: &'static str,
    pub target_column: &'static str,
}

/// Association table linking a child table to a parent table.
///
/// `child_column` references the queried table's id; `parent_column`
/// references the scoping parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Relation {
    pub table: &'static str,
    pub child_column: &'static str,
    pub parent_column: &'static str,
}

impl Relation {
    /// Join from `child` through this association table.
    pub fn join_for(&self, child: &TableSchema) -> Join {
        Join {
            table: self.table,
            column: self.child_column,
            target_table: child.name,
            target_column: child.id_column,
        }
    }

    /// Predicate pinning the association to one parent id.
    pub fn parent_predicate(&self, parent_id: i64) -> Predicate {
        Predicate::equals(self.table, self.parent_column, Value::Integer(parent_id))
    }
}
