//! Generic table repository shared by every entity.
//!
//! # Responsibility
//! - Run the parse → build → execute → map pipeline once for all tables.
//! - Own repository error semantics (`NotFound`, mapping, storage).
//!
//! # Invariants
//! - Filter and builder failures return before any executor call.
//! - Writes call `Entity::validate()` before SQL is built.
//! - Update/delete that affect zero rows return `NotFound`.
//! - List reads never return `NotFound`; no match is an empty vec.

use crate::model::ValidationError;
use crate::query::{
    build_delete, build_insert, build_select, build_update, parse_filter, BuildError,
    FilterError, Join, PageLimits, Pagination, Predicate, QueryParams, Relation, RowKey,
    SelectSpec, SqlStatement, TableSchema,
};
use crate::repo::executor::Executor;
use log::info;
use rusqlite::types::{FromSql, Value};
use rusqlite::Row;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::marker::PhantomData;
use std::time::{SystemTime, UNIX_EPOCH};

const CREATED_AT_COLUMN: &str = "created_at";
const UPDATED_AT_COLUMN: &str = "updated_at";

pub type RepoResult<T> = Result<T, RepoError>;

/// Error surfaced by every repository operation.
#[derive(Debug)]
pub enum RepoError {
    Filter(FilterError),
    Build(BuildError),
    Validation(ValidationError),
    NotFound {
        table: &'static str,
        id: i64,
    },
    /// Row could not be decoded into the entity.
    Mapping {
        table: &'static str,
        message: String,
    },
    /// Database rejected or failed the statement.
    Storage {
        operation: &'static str,
        table: &'static str,
        source: rusqlite::Error,
    },
}

impl RepoError {
    pub(crate) fn storage(statement: &SqlStatement, source: rusqlite::Error) -> Self {
        Self::Storage {
            operation: statement.operation.as_str(),
            table: statement.table,
            source,
        }
    }

    /// Stable machine-readable code for log lines and callers.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Filter(FilterError::InvalidFilter { .. }) => "invalid_filter",
            Self::Filter(FilterError::InvalidValue { .. }) => "invalid_value",
            Self::Filter(FilterError::InvalidPagination { .. }) => "invalid_pagination",
            Self::Build(BuildError::EmptyColumns { .. }) => "empty_columns",
            Self::Build(BuildError::MissingIdentifier { .. }) => "missing_identifier",
            Self::Validation(_) => "validation_failed",
            Self::NotFound { .. } => "not_found",
            Self::Mapping { .. } => "mapping_error",
            Self::Storage { .. } => "storage_error",
        }
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Filter(err) => write!(f, "{err}"),
            Self::Build(err) => write!(f, "{err}"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound { table, id } => write!(f, "{table} not found: {id}"),
            Self::Mapping { table, message } => {
                write!(f, "invalid persisted {table} row: {message}")
            }
            Self::Storage {
                operation,
                table,
                source,
            } => write!(f, "{operation} on `{table}` failed: {source}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Filter(err) => Some(err),
            Self::Build(err) => Some(err),
            Self::Validation(err) => Some(err),
            Self::Storage { source, .. } => Some(source),
            Self::NotFound { .. } | Self::Mapping { .. } => None,
        }
    }
}

impl From<FilterError> for RepoError {
    fn from(value: FilterError) -> Self {
        Self::Filter(value)
    }
}

impl From<BuildError> for RepoError {
    fn from(value: BuildError) -> Self {
        Self::Build(value)
    }
}

impl From<ValidationError> for RepoError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Binds an entity type to its table.
pub trait Entity: Sized {
    fn schema() -> &'static TableSchema;

    fn validate(&self) -> Result<(), ValidationError>;

    /// Caller-owned column values for insert and update. Excludes the id and
    /// the repository-managed timestamps.
    fn writable_values(&self) -> Vec<(&'static str, Value)>;

    /// Decodes one row laid out in `schema()` column order.
    fn from_row(row: &Row<'_>) -> RepoResult<Self>;
}

/// Restricts a read to children of one parent through an association table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scope {
    pub relation: Relation,
    pub parent_id: i64,
}

/// CRUD pipeline for one entity over one executor.
pub struct TableRepository<'conn, E, X> {
    conn: &'conn X,
    limits: PageLimits,
    _entity: PhantomData<fn() -> E>,
}

impl<'conn, E: Entity, X: Executor> TableRepository<'conn, E, X> {
    pub fn new(conn: &'conn X, limits: PageLimits) -> Self {
        Self {
            conn,
            limits,
            _entity: PhantomData,
        }
    }

    /// Filtered, paginated list ordered by id.
    pub fn list(&self, scope: Option<Scope>, params: &QueryParams) -> RepoResult<Vec<E>> {
        let schema = E::schema();
        let filter = parse_filter(schema, params, self.limits)?;

        let (joins, mut predicates) = scope_clauses(schema, scope);
        predicates.extend(filter.predicates);

        let statement = build_select(&SelectSpec {
            table: schema,
            joins: &joins,
            predicates: &predicates,
            pagination: Some(filter.pagination),
        });
        self.conn.query_rows(&statement, E::from_row)
    }

    /// Point lookup by id.
    pub fn find(&self, scope: Option<Scope>, id: i64) -> RepoResult<E> {
        let schema = E::schema();
        let (joins, mut predicates) = scope_clauses(schema, scope);
        predicates.push(Predicate::equals(
            schema.name,
            schema.id_column,
            Value::Integer(id),
        ));

        let statement = build_select(&SelectSpec {
            table: schema,
            joins: &joins,
            predicates: &predicates,
            pagination: Some(Pagination {
                page: 1,
                page_size: 1,
            }),
        });
        self.conn
            .query_rows(&statement, E::from_row)?
            .into_iter()
            .next()
            .ok_or(RepoError::NotFound {
                table: schema.name,
                id,
            })
    }

    /// Inserts the entity with fresh timestamps and returns its new id.
    pub fn insert(&self, entity: &E) -> RepoResult<i64> {
        entity.validate()?;

        let schema = E::schema();
        let now = now_epoch_ms();
        let mut values = entity.writable_values();
        for column in [CREATED_AT_COLUMN, UPDATED_AT_COLUMN] {
            if schema.has_column(column) {
                values.push((column, Value::Integer(now)));
            }
        }

        let statement = build_insert(schema.name, &values)?;
        self.conn.execute(&statement)?;
        let id = self.conn.last_insert_id();
        info!(
            "event=repo_write module=repo status=ok op=insert table={} id={}",
            schema.name, id
        );
        Ok(id)
    }

    /// Replaces writable columns and stamps `updated_at`.
    pub fn update(&self, id: i64, entity: &E) -> RepoResult<()> {
        entity.validate()?;

        let schema = E::schema();
        let statement = build_update(
            schema.name,
            &entity.writable_values(),
            Some(RowKey::new(schema.id_column, id)),
            now_epoch_ms(),
        )?;
        self.expect_changed(&statement, id)
    }

    pub fn delete(&self, id: i64) -> RepoResult<()> {
        let schema = E::schema();
        let statement = build_delete(schema.name, Some(RowKey::new(schema.id_column, id)))?;
        self.expect_changed(&statement, id)
    }

    fn expect_changed(&self, statement: &SqlStatement, id: i64) -> RepoResult<()> {
        let changed = self.conn.execute(statement)?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                table: statement.table,
                id,
            });
        }

        info!(
            "event=repo_write module=repo status=ok op={} table={} id={}",
            statement.operation, statement.table, id
        );
        Ok(())
    }
}

fn scope_clauses(schema: &TableSchema, scope: Option<Scope>) -> (Vec<Join>, Vec<Predicate>) {
    match scope {
        Some(scope) => (
            vec![scope.relation.join_for(schema)],
            vec![scope.relation.parent_predicate(scope.parent_id)],
        ),
        None => (Vec::new(), Vec::new()),
    }
}

/// Reads a declared column by its position in `schema`.
pub(crate) fn read_column<T: FromSql>(
    row: &Row<'_>,
    schema: &TableSchema,
    column: &'static str,
) -> RepoResult<T> {
    let index = schema.position(column).ok_or_else(|| RepoError::Mapping {
        table: schema.name,
        message: format!("column `{column}` is not declared"),
    })?;

    row.get(index).map_err(|err| RepoError::Mapping {
        table: schema.name,
        message: format!("column `{column}`: {err}"),
    })
}

/// Current wall clock in epoch milliseconds.
pub fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}
