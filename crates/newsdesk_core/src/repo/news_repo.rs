//! News repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Expose news CRUD plus reads scoped to one topic.
//! - Own the `news_topic` link set of each news item.
//!
//! # Invariants
//! - `status` is stored as text and must decode to [`NewsStatus`] on read.
//! - `set_topics` replaces the whole link set in one transaction.

use crate::model::news::{News, NewsId, NewsStatus};
use crate::model::topic::TopicId;
use crate::model::ValidationError;
use crate::query::{
    build_delete, build_insert, build_update, Column, ColumnKind, PageLimits, QueryParams,
    Relation, RowKey, TableSchema,
};
use crate::repo::executor::Executor;
use crate::repo::table_repo::{
    now_epoch_ms, read_column, Entity, RepoError, RepoResult, Scope, TableRepository,
};
use log::info;
use rusqlite::types::Value;
use rusqlite::{Connection, Row};
use std::collections::BTreeSet;

pub const NEWS_TABLE: TableSchema = TableSchema {
    name: "news",
    id_column: "id",
    columns: &[
        Column::new("id", ColumnKind::Integer),
        Column::new("title", ColumnKind::Text),
        Column::new("content", ColumnKind::Text),
        Column::new("status", ColumnKind::Choice(NewsStatus::ALL)),
        Column::new("created_at", ColumnKind::Timestamp),
        Column::new("updated_at", ColumnKind::Timestamp),
    ],
};

pub const NEWS_TOPIC_TABLE: &str = "news_topic";

/// News items reached from a topic.
pub const NEWS_OF_TOPIC: Relation = Relation {
    table: NEWS_TOPIC_TABLE,
    child_column: "news_id",
    parent_column: "topic_id",
};

impl Entity for News {
    fn schema() -> &'static TableSchema {
        &NEWS_TABLE
    }

    fn validate(&self) -> Result<(), ValidationError> {
        News::validate(self)
    }

    fn writable_values(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("title", Value::Text(self.title.clone())),
            ("content", Value::Text(self.content.clone())),
            ("status", Value::Text(self.status.as_str().to_string())),
        ]
    }

    fn from_row(row: &Row<'_>) -> RepoResult<Self> {
        let status_text: String = read_column(row, &NEWS_TABLE, "status")?;
        let status = NewsStatus::parse(&status_text).ok_or_else(|| RepoError::Mapping {
            table: NEWS_TABLE.name,
            message: format!("invalid status `{status_text}`"),
        })?;

        Ok(Self {
            id: Some(read_column(row, &NEWS_TABLE, "id")?),
            title: read_column(row, &NEWS_TABLE, "title")?,
            content: read_column(row, &NEWS_TABLE, "content")?,
            status,
            created_at: read_column(row, &NEWS_TABLE, "created_at")?,
            updated_at: read_column(row, &NEWS_TABLE, "updated_at")?,
        })
    }
}

/// Repository interface for news items.
pub trait NewsRepository {
    /// Lists news matching `params`; pagination keys are `page`/`page_size`.
    fn get_list(&self, params: &QueryParams) -> RepoResult<Vec<News>>;
    fn get_item_by_id(&self, id: NewsId) -> RepoResult<News>;
    /// Inserts and returns the storage-assigned id.
    fn insert_item(&self, news: &News) -> RepoResult<NewsId>;
    fn update_item(&self, id: NewsId, news: &News) -> RepoResult<()>;
    /// Deletes the item; its topic links go with it.
    fn delete_item(&self, id: NewsId) -> RepoResult<()>;
    fn get_list_by_topic_id(&self, topic_id: TopicId, params: &QueryParams)
        -> RepoResult<Vec<News>>;
    fn get_item_by_topic_id(&self, topic_id: TopicId, news_id: NewsId) -> RepoResult<News>;
    /// Replaces every topic link of `news_id` and stamps its `updated_at`.
    fn set_topics(&self, news_id: NewsId, topic_ids: &[TopicId]) -> RepoResult<()>;
}

/// SQLite-backed news repository.
pub struct SqliteNewsRepository<'conn, X = Connection> {
    conn: &'conn X,
    table: TableRepository<'conn, News, X>,
}

impl<'conn, X: Executor> SqliteNewsRepository<'conn, X> {
    pub fn new(conn: &'conn X) -> Self {
        Self::with_page_limits(conn, PageLimits::default())
    }

    pub fn with_page_limits(conn: &'conn X, limits: PageLimits) -> Self {
        Self {
            conn,
            table: TableRepository::new(conn, limits),
        }
    }
}

impl<X: Executor> NewsRepository for SqliteNewsRepository<'_, X> {
    fn get_list(&self, params: &QueryParams) -> RepoResult<Vec<News>> {
        self.table.list(None, params)
    }

    fn get_item_by_id(&self, id: NewsId) -> RepoResult<News> {
        self.table.find(None, id)
    }

    fn insert_item(&self, news: &News) -> RepoResult<NewsId> {
        self.table.insert(news)
    }

    fn update_item(&self, id: NewsId, news: &News) -> RepoResult<()> {
        self.table.update(id, news)
    }

    fn delete_item(&self, id: NewsId) -> RepoResult<()> {
        self.table.delete(id)
    }

    fn get_list_by_topic_id(
        &self,
        topic_id: TopicId,
        params: &QueryParams,
    ) -> RepoResult<Vec<News>> {
        self.table.list(Some(topic_scope(topic_id)), params)
    }

    fn get_item_by_topic_id(&self, topic_id: TopicId, news_id: NewsId) -> RepoResult<News> {
        self.table.find(Some(topic_scope(topic_id)), news_id)
    }

    fn set_topics(&self, news_id: NewsId, topic_ids: &[TopicId]) -> RepoResult<()> {
        let unique = topic_ids.iter().copied().collect::<BTreeSet<_>>();
        let key = Some(RowKey::new(NEWS_TABLE.id_column, news_id));

        self.conn.with_transaction(NEWS_TOPIC_TABLE, |tx| {
            let touch = build_update(NEWS_TABLE.name, &[], key, now_epoch_ms())?;
            if tx.execute(&touch)? == 0 {
                return Err(RepoError::NotFound {
                    table: NEWS_TABLE.name,
                    id: news_id,
                });
            }

            let clear = build_delete(
                NEWS_TOPIC_TABLE,
                Some(RowKey::new(NEWS_OF_TOPIC.child_column, news_id)),
            )?;
            tx.execute(&clear)?;

            for topic_id in &unique {
                let link = build_insert(
                    NEWS_TOPIC_TABLE,
                    &[
                        (NEWS_OF_TOPIC.child_column, Value::Integer(news_id)),
                        (NEWS_OF_TOPIC.parent_column, Value::Integer(*topic_id)),
                    ],
                )?;
                tx.execute(&link)?;
            }

            info!(
                "event=news_set_topics module=repo status=ok news_id={} topic_count={}",
                news_id,
                unique.len()
            );
            Ok(())
        })
    }
}

fn topic_scope(topic_id: TopicId) -> Scope {
    Scope {
        relation: NEWS_OF_TOPIC,
        parent_id: topic_id,
    }
}
