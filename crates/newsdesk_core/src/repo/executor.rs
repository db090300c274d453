//! Storage collaborator seam.
//!
//! # Responsibility
//! - Execute rendered statements and hand rows to a mapper.
//! - Attach operation/table context to database failures.
//!
//! # Invariants
//! - Log lines carry statement metadata only, never bound argument values.

use crate::query::SqlStatement;
use crate::repo::table_repo::{RepoError, RepoResult};
use log::{debug, error};
use rusqlite::{params_from_iter, Connection, Row};
use std::time::Instant;

/// Anything that can run parameterized statements.
pub trait Executor {
    /// Runs a write and returns the number of affected rows.
    fn execute(&self, statement: &SqlStatement) -> RepoResult<usize>;

    /// Runs a read and maps every row in order. The first mapper error aborts.
    fn query_rows<T, F>(&self, statement: &SqlStatement, map: F) -> RepoResult<Vec<T>>
    where
        F: FnMut(&Row<'_>) -> RepoResult<T>;

    /// Row id assigned by the most recent successful insert.
    fn last_insert_id(&self) -> i64;

    /// Runs `f` atomically; any error rolls back. `scope` names the table
    /// reported on begin/commit failures.
    fn with_transaction<T, F>(&self, scope: &'static str, f: F) -> RepoResult<T>
    where
        F: FnOnce(&Self) -> RepoResult<T>;
}

impl Executor for Connection {
    fn execute(&self, statement: &SqlStatement) -> RepoResult<usize> {
        let started_at = Instant::now();
        match Connection::execute(
            self,
            &statement.sql,
            params_from_iter(statement.args.iter()),
        ) {
            Ok(changed) => {
                debug!(
                    "event=sql_exec module=repo status=ok op={} table={} rows={} duration_ms={}",
                    statement.operation,
                    statement.table,
                    changed,
                    started_at.elapsed().as_millis()
                );
                Ok(changed)
            }
            Err(err) => {
                error!(
                    "event=sql_exec module=repo status=error op={} table={} duration_ms={} error_code=storage_error error={}",
                    statement.operation,
                    statement.table,
                    started_at.elapsed().as_millis(),
                    err
                );
                Err(RepoError::storage(statement, err))
            }
        }
    }

    fn query_rows<T, F>(&self, statement: &SqlStatement, map: F) -> RepoResult<Vec<T>>
    where
        F: FnMut(&Row<'_>) -> RepoResult<T>,
    {
        let started_at = Instant::now();
        match run_query(self, statement, map) {
            Ok(items) => {
                debug!(
                    "event=sql_query module=repo status=ok op={} table={} rows={} duration_ms={}",
                    statement.operation,
                    statement.table,
                    items.len(),
                    started_at.elapsed().as_millis()
                );
                Ok(items)
            }
            Err(err) => {
                error!(
                    "event=sql_query module=repo status=error op={} table={} duration_ms={} error_code={} error={}",
                    statement.operation,
                    statement.table,
                    started_at.elapsed().as_millis(),
                    err.code(),
                    err
                );
                Err(err)
            }
        }
    }

    fn last_insert_id(&self) -> i64 {
        self.last_insert_rowid()
    }

    fn with_transaction<T, F>(&self, scope: &'static str, f: F) -> RepoResult<T>
    where
        F: FnOnce(&Self) -> RepoResult<T>,
    {
        let tx = self
            .unchecked_transaction()
            .map_err(|source| RepoError::Storage {
                operation: "begin",
                table: scope,
                source,
            })?;
        let value = f(&*tx)?;
        tx.commit().map_err(|source| RepoError::Storage {
            operation: "commit",
            table: scope,
            source,
        })?;
        Ok(value)
    }
}

fn run_query<T, F>(conn: &Connection, statement: &SqlStatement, mut map: F) -> RepoResult<Vec<T>>
where
    F: FnMut(&Row<'_>) -> RepoResult<T>,
{
    let mut stmt = conn
        .prepare(&statement.sql)
        .map_err(|err| RepoError::storage(statement, err))?;
    let mut rows = stmt
        .query(params_from_iter(statement.args.iter()))
        .map_err(|err| RepoError::storage(statement, err))?;

    let mut items = Vec::new();
    while let Some(row) = rows
        .next()
        .map_err(|err| RepoError::storage(statement, err))?
    {
        items.push(map(row)?);
    }
    Ok(items)
}
