//! Shared command plumbing: runtime bootstrap, filter arguments, output.

use log::info;
use newsdesk_core::db::open_db;
use newsdesk_core::{init_from_config, CoreConfig, PageLimits, QueryParams};
use rusqlite::Connection;
use serde::Serialize;
use std::path::PathBuf;

pub mod news;
pub mod topic;

pub type CommandResult = Result<(), Box<dyn std::error::Error>>;

/// Open database plus the settings commands need.
pub struct Runtime {
    pub conn: Connection,
    pub page_limits: PageLimits,
}

impl Runtime {
    pub fn start(db_override: Option<PathBuf>) -> Result<Self, Box<dyn std::error::Error>> {
        let mut config = CoreConfig::from_env()?;
        if let Some(path) = db_override {
            config.database_path = path;
        }

        init_from_config(&config)?;
        let conn = open_db(&config.database_path)?;
        info!(
            "event=cli_start module=cli status=ok db_path={}",
            config.database_path.display()
        );

        Ok(Self {
            conn,
            page_limits: config.page_limits,
        })
    }
}

/// Collects `key=value` arguments; repeated keys accumulate values.
pub fn parse_filters(pairs: &[String]) -> Result<QueryParams, Box<dyn std::error::Error>> {
    let mut params = QueryParams::new();
    for pair in pairs {
        let Some((key, value)) = pair.split_once('=') else {
            return Err(format!("filter `{pair}` must look like key=value").into());
        };
        params
            .entry(key.trim().to_string())
            .or_default()
            .push(value.to_string());
    }
    Ok(params)
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> CommandResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
