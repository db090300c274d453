use newsdesk_core::query::{
    build_delete, build_insert, build_select, build_update, BuildError, FilterOp, Operation,
    Pagination, Predicate, RowKey, SelectSpec,
};
use newsdesk_core::repo::news_repo::{NEWS_OF_TOPIC, NEWS_TABLE};
use newsdesk_core::repo::topic_repo::{TOPICS_OF_NEWS, TOPIC_TABLE};
use rusqlite::types::Value;

const TOPIC_COLUMNS: &str = "topic.id, topic.title, topic.created_at, topic.updated_at";

#[test]
fn select_without_filters_orders_by_id_and_paginates() {
    let statement = build_select(&SelectSpec {
        pagination: Some(Pagination {
            page: 1,
            page_size: 20,
        }),
        ..SelectSpec::new(&TOPIC_TABLE)
    });

    assert_eq!(
        statement.sql,
        format!("SELECT {TOPIC_COLUMNS} FROM topic ORDER BY topic.id ASC LIMIT ? OFFSET ?")
    );
    assert_eq!(statement.args, vec![Value::Integer(20), Value::Integer(0)]);
    assert_eq!(statement.operation, Operation::Select);
    assert_eq!(statement.table, "topic");
}

#[test]
fn relation_scoped_select_qualifies_columns_and_binds_parent() {
    let joins = [TOPICS_OF_NEWS.join_for(&TOPIC_TABLE)];
    let predicates = [
        TOPICS_OF_NEWS.parent_predicate(7),
        Predicate {
            table: "topic",
            column: "title",
            op: FilterOp::Like,
            values: vec![Value::Text("%rust%".to_string())],
        },
    ];

    let statement = build_select(&SelectSpec {
        table: &TOPIC_TABLE,
        joins: &joins,
        predicates: &predicates,
        pagination: Some(Pagination {
            page: 3,
            page_size: 10,
        }),
    });

    assert_eq!(
        statement.sql,
        format!(
            "SELECT {TOPIC_COLUMNS} FROM topic \
             INNER JOIN news_topic ON news_topic.topic_id = topic.id \
             WHERE news_topic.news_id = ? AND topic.title LIKE ? ESCAPE '\\' \
             ORDER BY topic.id ASC LIMIT ? OFFSET ?"
        )
    );
    assert_eq!(
        statement.args,
        vec![
            Value::Integer(7),
            Value::Text("%rust%".to_string()),
            Value::Integer(10),
            Value::Integer(20),
        ]
    );
}

#[test]
fn news_scoped_by_topic_joins_on_news_id() {
    let joins = [NEWS_OF_TOPIC.join_for(&NEWS_TABLE)];
    let predicates = [NEWS_OF_TOPIC.parent_predicate(2)];

    let statement = build_select(&SelectSpec {
        table: &NEWS_TABLE,
        joins: &joins,
        predicates: &predicates,
        pagination: None,
    });

    assert!(statement
        .sql
        .starts_with("SELECT news.id, news.title, news.content, news.status,"));
    assert!(statement
        .sql
        .contains("INNER JOIN news_topic ON news_topic.news_id = news.id"));
    assert!(statement.sql.ends_with("WHERE news_topic.topic_id = ? ORDER BY news.id ASC"));
}

#[test]
fn set_predicates_bind_every_value_and_range_binds_first() {
    let predicates = [
        Predicate {
            table: "topic",
            column: "id",
            op: FilterOp::Eq,
            values: vec![Value::Integer(1), Value::Integer(2)],
        },
        Predicate {
            table: "topic",
            column: "created_at",
            op: FilterOp::Gte,
            values: vec![Value::Integer(100)],
        },
    ];

    let statement = build_select(&SelectSpec {
        predicates: &predicates,
        ..SelectSpec::new(&TOPIC_TABLE)
    });

    assert!(statement
        .sql
        .contains("WHERE topic.id IN (?, ?) AND topic.created_at >= ?"));
    assert_eq!(
        statement.args,
        vec![Value::Integer(1), Value::Integer(2), Value::Integer(100)]
    );
}

#[test]
fn insert_renders_columns_in_given_order() {
    let statement = build_insert(
        "news",
        &[
            ("title", Value::Text("headline".to_string())),
            ("status", Value::Text("draft".to_string())),
        ],
    )
    .unwrap();

    assert_eq!(
        statement.sql,
        "INSERT INTO news (title, status) VALUES (?, ?)"
    );
    assert_eq!(statement.args.len(), 2);
    assert_eq!(statement.operation, Operation::Insert);
}

#[test]
fn insert_without_columns_fails() {
    let err = build_insert("topic", &[]).unwrap_err();
    assert_eq!(err, BuildError::EmptyColumns { table: "topic" });
}

#[test]
fn update_always_stamps_updated_at_from_clock() {
    let statement = build_update(
        "topic",
        &[
            ("title", Value::Text("renamed".to_string())),
            ("updated_at", Value::Integer(1)),
        ],
        Some(RowKey::new("id", 3)),
        1_000,
    )
    .unwrap();

    assert_eq!(
        statement.sql,
        "UPDATE topic SET title = ?, updated_at = ? WHERE id = ?"
    );
    assert_eq!(
        statement.args,
        vec![
            Value::Text("renamed".to_string()),
            Value::Integer(1_000),
            Value::Integer(3),
        ]
    );
}

#[test]
fn update_and_delete_require_identifier() {
    let update_err = build_update(
        "news",
        &[("title", Value::Text("x".to_string()))],
        None,
        1,
    )
    .unwrap_err();
    assert_eq!(
        update_err,
        BuildError::MissingIdentifier {
            operation: Operation::Update,
            table: "news",
        }
    );

    let delete_err = build_delete("news", None).unwrap_err();
    assert_eq!(
        delete_err,
        BuildError::MissingIdentifier {
            operation: Operation::Delete,
            table: "news",
        }
    );
}

#[test]
fn delete_binds_key() {
    let statement = build_delete("news_topic", Some(RowKey::new("news_id", 9))).unwrap();
    assert_eq!(statement.sql, "DELETE FROM news_topic WHERE news_id = ?");
    assert_eq!(statement.args, vec![Value::Integer(9)]);
}

#[test]
fn builders_are_referentially_transparent() {
    let predicates = [TOPICS_OF_NEWS.parent_predicate(1)];
    let spec = SelectSpec {
        predicates: &predicates,
        pagination: Some(Pagination {
            page: 2,
            page_size: 5,
        }),
        ..SelectSpec::new(&TOPIC_TABLE)
    };
    assert_eq!(build_select(&spec), build_select(&spec));

    let values = [("title", Value::Text("same".to_string()))];
    assert_eq!(
        build_insert("topic", &values).unwrap(),
        build_insert("topic", &values).unwrap()
    );
    assert_eq!(
        build_update("topic", &values, Some(RowKey::new("id", 1)), 5).unwrap(),
        build_update("topic", &values, Some(RowKey::new("id", 1)), 5).unwrap()
    );
    assert_eq!(
        build_delete("topic", Some(RowKey::new("id", 1))).unwrap(),
        build_delete("topic", Some(RowKey::new("id", 1))).unwrap()
    );
}
