//! Core data access for newsdesk: news items, topics and their links.
//! This crate owns entity validation, filter parsing and SQL generation.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod query;
pub mod repo;

pub use config::{ConfigError, CoreConfig};
pub use logging::{default_log_level, init_from_config, init_logging, logging_status};
pub use model::news::{News, NewsId, NewsStatus};
pub use model::topic::{Topic, TopicId};
pub use model::ValidationError;
pub use query::{FilterError, PageLimits, QueryParams};
pub use repo::news_repo::{NewsRepository, SqliteNewsRepository};
pub use repo::topic_repo::{SqliteTopicRepository, TopicRepository};
pub use repo::{Executor, RepoError, RepoResult};
