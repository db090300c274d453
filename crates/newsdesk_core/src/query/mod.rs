//! Storage-agnostic query composition.
//!
//! # Responsibility
//! - Describe tables and relations as static schema descriptors.
//! - Turn loosely typed request parameters into typed predicates.
//! - Render predicates and write intents into parameterized SQL.
//!
//! # Invariants
//! - Nothing in this module touches a connection.
//! - Identifiers in SQL text come only from schema descriptors; every value is
//!   bound as a positional argument.

pub mod builder;
pub mod filter;
pub mod schema;

pub use builder::{
    build_delete, build_insert, build_select, build_update, BuildError, BuildResult, Operation,
    RowKey, SelectSpec, SqlStatement,
};
pub use filter::{
    parse_filter, FilterError, FilterOp, FilterResult, PageLimits, Pagination, ParsedFilter,
    Predicate, QueryParams,
};
pub use schema::{Column, ColumnKind, Join, Relation, TableSchema};
