//! Parameterized SQL rendering for select/insert/update/delete intents.
//!
//! # Responsibility
//! - Render SQL text with `?` placeholders plus the ordered argument list.
//! - Guard write statements against missing identifiers.
//!
//! # Invariants
//! - Builders are pure: equal inputs give byte-identical SQL and arguments.
//! - `UPDATE` and `DELETE` are never rendered without a `WHERE` key.
//! - `UPDATE` always assigns `updated_at` from the caller-provided clock value.
//! - SELECT lists are table-qualified so joined queries stay unambiguous.

use crate::query::filter::{FilterOp, Pagination, Predicate};
use crate::query::schema::{Join, TableSchema};
use rusqlite::types::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};

const UPDATED_AT_COLUMN: &str = "updated_at";

pub type BuildResult<T> = Result<T, BuildError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Select,
    Insert,
    Update,
    Delete,
}

impl Operation {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Select => "select",
            Self::Insert => "insert",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

impl Display for Operation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    /// Insert requested with nothing to insert.
    EmptyColumns { table: &'static str },
    /// Update/delete requested without a row key.
    MissingIdentifier {
        operation: Operation,
        table: &'static str,
    },
}

impl Display for BuildError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyColumns { table } => write!(f, "insert into `{table}` has no columns"),
            Self::MissingIdentifier { operation, table } => {
                write!(f, "{operation} on `{table}` requires a row identifier")
            }
        }
    }
}

impl Error for BuildError {}

/// Rendered statement ready for execution.
#[derive(Debug, Clone, PartialEq)]
pub struct SqlStatement {
    pub sql: String,
    pub args: Vec<Value>,
    pub operation: Operation,
    pub table: &'static str,
}

/// Equality key restricting a write to specific rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowKey {
    pub column: &'static str,
    pub value: i64,
}

impl RowKey {
    pub fn new(column: &'static str, value: i64) -> Self {
        Self { column, value }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SelectSpec<'a> {
    pub table: &'a TableSchema,
    pub joins: &'a [Join],
    pub predicates: &'a [Predicate],
    /// `None` renders no `LIMIT`/`OFFSET`.
    pub pagination: Option<Pagination>,
}

impl<'a> SelectSpec<'a> {
    pub fn new(table: &'a TableSchema) -> Self {
        Self {
            table,
            joins: &[],
            predicates: &[],
            pagination: None,
        }
    }
}

/// Renders `SELECT ... FROM ... [JOIN] [WHERE] ORDER BY id [LIMIT ? OFFSET ?]`.
pub fn build_select(spec: &SelectSpec<'_>) -> SqlStatement {
    let table = spec.table;
    let columns = table
        .columns
        .iter()
        .map(|column| format!("{}.{}", table.name, column.name))
        .collect::<Vec<_>>()
        .join(", ");

    let mut sql = format!("SELECT {columns} FROM {}", table.name);
    let mut args = Vec::new();

    for join in spec.joins {
        sql.push_str(&format!(
            " INNER JOIN {table} ON {table}.{column} = {target_table}.{target_column}",
            table = join.table,
            column = join.column,
            target_table = join.target_table,
            target_column = join.target_column,
        ));
    }

    if !spec.predicates.is_empty() {
        let clauses = spec
            .predicates
            .iter()
            .map(|predicate| render_predicate(predicate, &mut args))
            .collect::<Vec<_>>();
        sql.push_str(" WHERE ");
        sql.push_str(&clauses.join(" AND "));
    }

    sql.push_str(&format!(" ORDER BY {}.{} ASC", table.name, table.id_column));

    if let Some(pagination) = spec.pagination {
        sql.push_str(" LIMIT ? OFFSET ?");
        args.push(Value::Integer(i64::from(pagination.limit())));
        args.push(Value::Integer(
            i64::try_from(pagination.offset()).unwrap_or(i64::MAX),
        ));
    }

    SqlStatement {
        sql,
        args,
        operation: Operation::Select,
        table: table.name,
    }
}

/// Renders `INSERT INTO table (c1, ...) VALUES (?, ...)`.
pub fn build_insert(
    table: &'static str,
    values: &[(&'static str, Value)],
) -> BuildResult<SqlStatement> {
    if values.is_empty() {
        return Err(BuildError::EmptyColumns { table });
    }

    let columns = values
        .iter()
        .map(|(column, _)| *column)
        .collect::<Vec<_>>()
        .join(", ");
    let placeholders = vec!["?"; values.len()].join(", ");

    Ok(SqlStatement {
        sql: format!("INSERT INTO {table} ({columns}) VALUES ({placeholders})"),
        args: values.iter().map(|(_, value)| value.clone()).collect(),
        operation: Operation::Insert,
        table,
    })
}

/// Renders `UPDATE table SET ..., updated_at = ? WHERE key = ?`.
///
/// A caller-supplied `updated_at` assignment is dropped in favor of `now`.
pub fn build_update(
    table: &'static str,
    assignments: &[(&'static str, Value)],
    key: Option<RowKey>,
    now: i64,
) -> BuildResult<SqlStatement> {
    let Some(key) = key else {
        return Err(BuildError::MissingIdentifier {
            operation: Operation::Update,
            table,
        });
    };

    let mut set_clauses = Vec::with_capacity(assignments.len() + 1);
    let mut args = Vec::with_capacity(assignments.len() + 2);
    for (column, value) in assignments {
        if *column == UPDATED_AT_COLUMN {
            continue;
        }
        set_clauses.push(format!("{column} = ?"));
        args.push(value.clone());
    }
    set_clauses.push(format!("{UPDATED_AT_COLUMN} = ?"));
    args.push(Value::Integer(now));
    args.push(Value::Integer(key.value));

    Ok(SqlStatement {
        sql: format!(
            "UPDATE {table} SET {} WHERE {} = ?",
            set_clauses.join(", "),
            key.column
        ),
        args,
        operation: Operation::Update,
        table,
    })
}

/// Renders `DELETE FROM table WHERE key = ?`.
pub fn build_delete(table: &'static str, key: Option<RowKey>) -> BuildResult<SqlStatement> {
    let Some(key) = key else {
        return Err(BuildError::MissingIdentifier {
            operation: Operation::Delete,
            table,
        });
    };

    Ok(SqlStatement {
        sql: format!("DELETE FROM {table} WHERE {} = ?", key.column),
        args: vec![Value::Integer(key.value)],
        operation: Operation::Delete,
        table,
    })
}

fn render_predicate(predicate: &Predicate, args: &mut Vec<Value>) -> String {
    let target = format!("{}.{}", predicate.table, predicate.column);
    let count = predicate.values.len();

    let clause = match predicate.op {
        FilterOp::Eq if count > 1 => format!("{target} IN ({})", placeholders(count)),
        FilterOp::Ne if count > 1 => format!("{target} NOT IN ({})", placeholders(count)),
        FilterOp::Eq => format!("{target} = ?"),
        FilterOp::Ne => format!("{target} <> ?"),
        FilterOp::Gt => format!("{target} > ?"),
        FilterOp::Gte => format!("{target} >= ?"),
        FilterOp::Lt => format!("{target} < ?"),
        FilterOp::Lte => format!("{target} <= ?"),
        FilterOp::Like => format!("{target} LIKE ? ESCAPE '\\'"),
    };

    if predicate.op.accepts_many() {
        args.extend(predicate.values.iter().cloned());
    } else {
        args.extend(predicate.values.first().cloned());
    }

    clause
}

fn placeholders(count: usize) -> String {
    vec!["?"; count].join(", ")
}
