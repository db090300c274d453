//! `newsdesk news ...`

use super::{parse_filters, print_json, CommandResult, Runtime};
use clap::{Args, Subcommand};
use newsdesk_core::{News, NewsId, NewsRepository, NewsStatus, SqliteNewsRepository, TopicId};
use serde_json::json;

#[derive(Debug, Args)]
pub struct NewsArgs {
    #[command(subcommand)]
    pub command: NewsCommand,
}

/// Writable fields shared by `add` and `update`.
#[derive(Debug, Args)]
pub struct NewsFields {
    #[arg(long)]
    pub title: String,

    #[arg(long, default_value = "")]
    pub content: String,

    /// draft | published | deleted
    #[arg(long, default_value = "draft", value_parser = parse_status)]
    pub status: NewsStatus,
}

impl NewsFields {
    fn into_news(self) -> News {
        News::new(self.title, self.content).with_status(self.status)
    }
}

#[derive(Debug, Subcommand)]
pub enum NewsCommand {
    /// List news; filters are key=value pairs such as status=published
    List { filters: Vec<String> },
    Get { id: NewsId },
    Add(NewsFields),
    /// Replace every writable field of an existing item
    Update {
        id: NewsId,
        #[command(flatten)]
        fields: NewsFields,
    },
    Delete { id: NewsId },
    /// List news linked to a topic
    ListByTopic {
        topic_id: TopicId,
        filters: Vec<String>,
    },
    GetByTopic { topic_id: TopicId, news_id: NewsId },
    /// Replace the topics linked to a news item
    SetTopics {
        news_id: NewsId,
        topic_ids: Vec<TopicId>,
    },
}

pub fn execute(runtime: &Runtime, args: NewsArgs) -> CommandResult {
    let repo = SqliteNewsRepository::with_page_limits(&runtime.conn, runtime.page_limits);

    match args.command {
        NewsCommand::List { filters } => print_json(&repo.get_list(&parse_filters(&filters)?)?),
        NewsCommand::Get { id } => print_json(&repo.get_item_by_id(id)?),
        NewsCommand::Add(fields) => {
            let id = repo.insert_item(&fields.into_news())?;
            print_json(&json!({ "id": id }))
        }
        NewsCommand::Update { id, fields } => {
            repo.update_item(id, &fields.into_news())?;
            print_json(&repo.get_item_by_id(id)?)
        }
        NewsCommand::Delete { id } => {
            repo.delete_item(id)?;
            print_json(&json!({ "deleted": id }))
        }
        NewsCommand::ListByTopic { topic_id, filters } => {
            print_json(&repo.get_list_by_topic_id(topic_id, &parse_filters(&filters)?)?)
        }
        NewsCommand::GetByTopic { topic_id, news_id } => {
            print_json(&repo.get_item_by_topic_id(topic_id, news_id)?)
        }
        NewsCommand::SetTopics { news_id, topic_ids } => {
            repo.set_topics(news_id, &topic_ids)?;
            print_json(&json!({ "news_id": news_id, "topic_ids": topic_ids }))
        }
    }
}

fn parse_status(value: &str) -> Result<NewsStatus, String> {
    NewsStatus::parse(value).ok_or_else(|| {
        format!(
            "unknown status `{value}`; expected one of {}",
            NewsStatus::ALL.join(", ")
        )
    })
}
