//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define entity-typed data access contracts for topics and news.
//! - Keep SQL execution behind the [`Executor`] seam.
//!
//! # Invariants
//! - Repository writes enforce entity validation before persistence.
//! - Repository APIs return semantic errors (`NotFound`, `Mapping`) in
//!   addition to storage errors.

pub mod executor;
pub mod news_repo;
pub mod table_repo;
pub mod topic_repo;

pub use executor::Executor;
pub use table_repo::{now_epoch_ms, Entity, RepoError, RepoResult, Scope, TableRepository};
