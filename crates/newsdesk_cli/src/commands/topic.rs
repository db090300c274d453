//! `newsdesk topic ...`

use super::{parse_filters, print_json, CommandResult, Runtime};
use clap::{Args, Subcommand};
use newsdesk_core::{NewsId, SqliteTopicRepository, Topic, TopicId, TopicRepository};
use serde_json::json;

#[derive(Debug, Args)]
pub struct TopicArgs {
    #[command(subcommand)]
    pub command: TopicCommand,
}

#[derive(Debug, Subcommand)]
pub enum TopicCommand {
    /// List topics; filters are key=value pairs such as title_like=tech
    List { filters: Vec<String> },
    Get { id: TopicId },
    Add { title: String },
    /// Replace the title of an existing topic
    Update { id: TopicId, title: String },
    Delete { id: TopicId },
    /// List topics linked to a news item
    ListByNews {
        news_id: NewsId,
        filters: Vec<String>,
    },
    GetByNews { news_id: NewsId, topic_id: TopicId },
}

pub fn execute(runtime: &Runtime, args: TopicArgs) -> CommandResult {
    let repo = SqliteTopicRepository::with_page_limits(&runtime.conn, runtime.page_limits);

    match args.command {
        TopicCommand::List { filters } => print_json(&repo.get_list(&parse_filters(&filters)?)?),
        TopicCommand::Get { id } => print_json(&repo.get_item_by_id(id)?),
        TopicCommand::Add { title } => {
            let id = repo.insert_item(&Topic::new(title))?;
            print_json(&json!({ "id": id }))
        }
        TopicCommand::Update { id, title } => {
            repo.update_item(id, &Topic::new(title))?;
            print_json(&repo.get_item_by_id(id)?)
        }
        TopicCommand::Delete { id } => {
            repo.delete_item(id)?;
            print_json(&json!({ "deleted": id }))
        }
        TopicCommand::ListByNews { news_id, filters } => {
            print_json(&repo.get_list_by_news_id(news_id, &parse_filters(&filters)?)?)
        }
        TopicCommand::GetByNews { news_id, topic_id } => {
            print_json(&repo.get_item_by_news_id(news_id, topic_id)?)
        }
    }
}
