use newsdesk_core::db::open_db_in_memory;
use newsdesk_core::query::{FilterError, QueryParams};
use newsdesk_core::{
    News, NewsRepository, NewsStatus, PageLimits, RepoError, SqliteNewsRepository,
    SqliteTopicRepository, Topic, TopicRepository,
};
use rusqlite::Connection;

fn params(pairs: &[(&str, &str)]) -> QueryParams {
    let mut params = QueryParams::new();
    for (key, value) in pairs {
        params
            .entry(key.to_string())
            .or_default()
            .push(value.to_string());
    }
    params
}

fn link_count(conn: &Connection) -> i64 {
    conn.query_row("SELECT COUNT(*) FROM news_topic;", [], |row| row.get(0))
        .unwrap()
}

#[test]
fn insert_then_get_round_trip() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteNewsRepository::new(&conn);

    let news = News::new("rates rise", "central bank moves").with_status(NewsStatus::Published);
    let id = repo.insert_item(&news).unwrap();

    let loaded = repo.get_item_by_id(id).unwrap();
    assert_eq!(
        loaded,
        News {
            id: Some(id),
            created_at: loaded.created_at,
            updated_at: loaded.updated_at,
            ..news
        }
    );
    assert!(loaded.created_at > 0);
}

#[test]
fn status_filter_supports_sets_and_exclusion() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteNewsRepository::new(&conn);
    repo.insert_item(&News::new("a", "")).unwrap();
    repo.insert_item(&News::new("b", "").with_status(NewsStatus::Published))
        .unwrap();
    repo.insert_item(&News::new("c", "").with_status(NewsStatus::Deleted))
        .unwrap();

    let published = repo.get_list(&params(&[("status", "published")])).unwrap();
    assert_eq!(published.len(), 1);
    assert_eq!(published[0].title, "b");

    let visible = repo
        .get_list(&params(&[("status", "draft"), ("status", "published")]))
        .unwrap();
    assert_eq!(visible.len(), 2);

    let not_deleted = repo.get_list(&params(&[("status_ne", "deleted")])).unwrap();
    assert_eq!(not_deleted.len(), 2);
}

#[test]
fn invalid_status_filter_is_invalid_value() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteNewsRepository::new(&conn);

    let err = repo
        .get_list(&params(&[("status", "archived")]))
        .unwrap_err();
    assert!(matches!(
        err,
        RepoError::Filter(FilterError::InvalidValue { .. })
    ));
    assert_eq!(err.code(), "invalid_value");
}

#[test]
fn timestamp_range_filter() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteNewsRepository::new(&conn);
    let old_id = repo.insert_item(&News::new("old", "")).unwrap();
    let new_id = repo.insert_item(&News::new("new", "")).unwrap();
    conn.execute(
        "UPDATE news SET created_at = 1000 WHERE id = ?1;",
        [old_id],
    )
    .unwrap();

    let recent = repo
        .get_list(&params(&[("created_at_gt", "1000")]))
        .unwrap();
    assert_eq!(recent.len(), 1);
    assert_eq!(recent[0].id, Some(new_id));

    let err = repo
        .get_list(&params(&[("created_at_gt", "yesterday")]))
        .unwrap_err();
    assert!(matches!(
        err,
        RepoError::Filter(FilterError::InvalidValue { .. })
    ));
}

#[test]
fn configured_page_limits_apply() {
    let conn = open_db_in_memory().unwrap();
    let limits = PageLimits::new(2, 3).unwrap();
    let repo = SqliteNewsRepository::with_page_limits(&conn, limits);
    for n in 0..5 {
        repo.insert_item(&News::new(format!("n{n}"), "")).unwrap();
    }

    assert_eq!(repo.get_list(&QueryParams::new()).unwrap().len(), 2);
    let err = repo
        .get_list(&params(&[("page_size", "4")]))
        .unwrap_err();
    assert!(matches!(
        err,
        RepoError::Filter(FilterError::InvalidPagination { .. })
    ));
}

#[test]
fn update_replaces_fields() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteNewsRepository::new(&conn);
    let id = repo.insert_item(&News::new("draft", "v1")).unwrap();

    let edit = News::new("final", "v2").with_status(NewsStatus::Published);
    repo.update_item(id, &edit).unwrap();

    let loaded = repo.get_item_by_id(id).unwrap();
    assert_eq!(loaded.title, "final");
    assert_eq!(loaded.content, "v2");
    assert_eq!(loaded.status, NewsStatus::Published);
}

#[test]
fn update_with_blank_title_is_validation_error() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteNewsRepository::new(&conn);
    let id = repo.insert_item(&News::new("title", "")).unwrap();

    let err = repo.update_item(id, &News::new("", "")).unwrap_err();
    assert!(matches!(err, RepoError::Validation(_)));
    assert_eq!(repo.get_item_by_id(id).unwrap().title, "title");
}

#[test]
fn missing_rows_are_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteNewsRepository::new(&conn);

    assert!(matches!(
        repo.get_item_by_id(1).unwrap_err(),
        RepoError::NotFound { table: "news", id: 1 }
    ));
    assert!(matches!(
        repo.update_item(1, &News::new("x", "")).unwrap_err(),
        RepoError::NotFound { .. }
    ));
    assert!(matches!(
        repo.delete_item(1).unwrap_err(),
        RepoError::NotFound { .. }
    ));
}

#[test]
fn set_topics_replaces_full_link_set() {
    let conn = open_db_in_memory().unwrap();
    let news = SqliteNewsRepository::new(&conn);
    let topics = SqliteTopicRepository::new(&conn);
    let politics = topics.insert_item(&Topic::new("politics")).unwrap();
    let economy = topics.insert_item(&Topic::new("economy")).unwrap();
    let science = topics.insert_item(&Topic::new("science")).unwrap();
    let id = news.insert_item(&News::new("budget", "")).unwrap();

    news.set_topics(id, &[politics, economy, economy]).unwrap();
    assert_eq!(link_count(&conn), 2);

    news.set_topics(id, &[science]).unwrap();
    let linked = topics.get_list_by_news_id(id, &QueryParams::new()).unwrap();
    assert_eq!(linked.len(), 1);
    assert_eq!(linked[0].id, Some(science));

    news.set_topics(id, &[]).unwrap();
    assert_eq!(link_count(&conn), 0);
}

#[test]
fn set_topics_refreshes_updated_at() {
    let conn = open_db_in_memory().unwrap();
    let news = SqliteNewsRepository::new(&conn);
    let id = news.insert_item(&News::new("budget", "")).unwrap();
    conn.execute("UPDATE news SET updated_at = 1 WHERE id = ?1;", [id])
        .unwrap();

    news.set_topics(id, &[]).unwrap();

    assert!(news.get_item_by_id(id).unwrap().updated_at > 1);
}

#[test]
fn set_topics_for_missing_news_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let news = SqliteNewsRepository::new(&conn);

    let err = news.set_topics(99, &[1]).unwrap_err();
    assert!(matches!(err, RepoError::NotFound { table: "news", id: 99 }));
}

#[test]
fn set_topics_with_unknown_topic_rolls_back() {
    let conn = open_db_in_memory().unwrap();
    let news = SqliteNewsRepository::new(&conn);
    let topics = SqliteTopicRepository::new(&conn);
    let kept = topics.insert_item(&Topic::new("kept")).unwrap();
    let id = news.insert_item(&News::new("budget", "")).unwrap();
    news.set_topics(id, &[kept]).unwrap();

    let err = news.set_topics(id, &[kept + 100]).unwrap_err();
    assert!(matches!(
        err,
        RepoError::Storage {
            operation: "insert",
            table: "news_topic",
            ..
        }
    ));

    let linked = topics.get_list_by_news_id(id, &QueryParams::new()).unwrap();
    assert_eq!(linked.len(), 1);
    assert_eq!(linked[0].id, Some(kept));
}

#[test]
fn topic_scoped_reads_and_cascading_deletes() {
    let conn = open_db_in_memory().unwrap();
    let news = SqliteNewsRepository::new(&conn);
    let topics = SqliteTopicRepository::new(&conn);
    let tech = topics.insert_item(&Topic::new("tech")).unwrap();
    let first = news
        .insert_item(&News::new("chips", "").with_status(NewsStatus::Published))
        .unwrap();
    let second = news.insert_item(&News::new("phones", "")).unwrap();
    let unrelated = news.insert_item(&News::new("weather", "")).unwrap();
    news.set_topics(first, &[tech]).unwrap();
    news.set_topics(second, &[tech]).unwrap();

    let in_topic = news.get_list_by_topic_id(tech, &QueryParams::new()).unwrap();
    assert_eq!(
        in_topic.iter().map(|item| item.id).collect::<Vec<_>>(),
        vec![Some(first), Some(second)]
    );

    let published = news
        .get_list_by_topic_id(tech, &params(&[("status", "published")]))
        .unwrap();
    assert_eq!(published.len(), 1);

    assert_eq!(news.get_item_by_topic_id(tech, second).unwrap().title, "phones");
    assert!(matches!(
        news.get_item_by_topic_id(tech, unrelated).unwrap_err(),
        RepoError::NotFound { .. }
    ));

    news.delete_item(first).unwrap();
    assert_eq!(link_count(&conn), 1);
    topics.delete_item(tech).unwrap();
    assert_eq!(link_count(&conn), 0);
    assert!(news.get_item_by_id(second).is_ok());
}

#[test]
fn unknown_stored_status_is_mapping_error() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO news (title, content, status) VALUES ('odd', '', 'archived');",
        [],
    )
    .unwrap();
    let repo = SqliteNewsRepository::new(&conn);

    let err = repo.get_list(&QueryParams::new()).unwrap_err();
    assert!(matches!(err, RepoError::Mapping { table: "news", .. }));
}

#[test]
fn news_serializes_with_snake_case_fields() {
    let news = News {
        id: Some(3),
        title: "t".to_string(),
        content: "c".to_string(),
        status: NewsStatus::Published,
        created_at: 10,
        updated_at: 20,
    };

    let json = serde_json::to_value(&news).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "id": 3,
            "title": "t",
            "content": "c",
            "status": "published",
            "created_at": 10,
            "updated_at": 20
        })
    );

    let parsed: News = serde_json::from_str(r#"{"id": null, "title": "x", "content": ""}"#).unwrap();
    assert_eq!(parsed.status, NewsStatus::Draft);
    assert_eq!(parsed.id, None);
}
