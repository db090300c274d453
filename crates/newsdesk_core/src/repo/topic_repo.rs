//! Topic repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Expose topic CRUD plus reads scoped to one news item.
//! - Map `topic` rows to [`Topic`] values.
//!
//! # Invariants
//! - News-scoped reads only return topics linked through `news_topic`.

use crate::model::news::NewsId;
use crate::model::topic::{Topic, TopicId};
use crate::model::ValidationError;
use crate::query::{Column, ColumnKind, PageLimits, QueryParams, Relation, TableSchema};
use crate::repo::executor::Executor;
use crate::repo::table_repo::{read_column, Entity, RepoResult, Scope, TableRepository};
use rusqlite::types::Value;
use rusqlite::{Connection, Row};

pub const TOPIC_TABLE: TableSchema = TableSchema {
    name: "topic",
    id_column: "id",
    columns: &[
        Column::new("id", ColumnKind::Integer),
        Column::new("title", ColumnKind::Text),
        Column::new("created_at", ColumnKind::Timestamp),
        Column::new("updated_at", ColumnKind::Timestamp),
    ],
};

/// Topics reached from a news item.
pub const TOPICS_OF_NEWS: Relation = Relation {
    table: "news_topic",
    child_column: "topic_id",
    parent_column: "news_id",
};

impl Entity for Topic {
    fn schema() -> &'static TableSchema {
        &TOPIC_TABLE
    }

    fn validate(&self) -> Result<(), ValidationError> {
        Topic::validate(self)
    }

    fn writable_values(&self) -> Vec<(&'static str, Value)> {
        vec![("title", Value::Text(self.title.clone()))]
    }

    fn from_row(row: &Row<'_>) -> RepoResult<Self> {
        Ok(Self {
            id: Some(read_column(row, &TOPIC_TABLE, "id")?),
            title: read_column(row, &TOPIC_TABLE, "title")?,
            created_at: read_column(row, &TOPIC_TABLE, "created_at")?,
            updated_at: read_column(row, &TOPIC_TABLE, "updated_at")?,
        })
    }
}

/// Repository interface for topics.
pub trait TopicRepository {
    /// Lists topics matching `params`; pagination keys are `page`/`page_size`.
    fn get_list(&self, params: &QueryParams) -> RepoResult<Vec<Topic>>;
    fn get_item_by_id(&self, id: TopicId) -> RepoResult<Topic>;
    /// Inserts and returns the storage-assigned id.
    fn insert_item(&self, topic: &Topic) -> RepoResult<TopicId>;
    fn update_item(&self, id: TopicId, topic: &Topic) -> RepoResult<()>;
    fn delete_item(&self, id: TopicId) -> RepoResult<()>;
    /// Lists topics linked to `news_id`, filtered like [`Self::get_list`].
    fn get_list_by_news_id(&self, news_id: NewsId, params: &QueryParams)
        -> RepoResult<Vec<Topic>>;
    /// Gets one topic only when it is linked to `news_id`.
    fn get_item_by_news_id(&self, news_id: NewsId, topic_id: TopicId) -> RepoResult<Topic>;
}

/// SQLite-backed topic repository.
pub struct SqliteTopicRepository<'conn, X = Connection> {
    table: TableRepository<'conn, Topic, X>,
}

impl<'conn, X: Executor> SqliteTopicRepository<'conn, X> {
    pub fn new(conn: &'conn X) -> Self {
        Self::with_page_limits(conn, PageLimits::default())
    }

    pub fn with_page_limits(conn: &'conn X, limits: PageLimits) -> Self {
        Self {
            table: TableRepository::new(conn, limits),
        }
    }
}

impl<X: Executor> TopicRepository for SqliteTopicRepository<'_, X> {
    fn get_list(&self, params: &QueryParams) -> RepoResult<Vec<Topic>> {
        self.table.list(None, params)
    }

    fn get_item_by_id(&self, id: TopicId) -> RepoResult<Topic> {
        self.table.find(None, id)
    }

    fn insert_item(&self, topic: &Topic) -> RepoResult<TopicId> {
        self.table.insert(topic)
    }

    fn update_item(&self, id: TopicId, topic: &Topic) -> RepoResult<()> {
        self.table.update(id, topic)
    }

    fn delete_item(&self, id: TopicId) -> RepoResult<()> {
        self.table.delete(id)
    }

    fn get_list_by_news_id(
        &self,
        news_id: NewsId,
        params: &QueryParams,
    ) -> RepoResult<Vec<Topic>> {
        self.table.list(Some(news_scope(news_id)), params)
    }

    fn get_item_by_news_id(&self, news_id: NewsId, topic_id: TopicId) -> RepoResult<Topic> {
        self.table.find(Some(news_scope(news_id)), topic_id)
    }
}

fn news_scope(news_id: NewsId) -> Scope {
    Scope {
        relation: TOPICS_OF_NEWS,
        parent_id: news_id,
    }
}
