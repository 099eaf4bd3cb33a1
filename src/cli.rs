use std::path::PathBuf;

use anyhow::anyhow;
use clap::{Args, Parser, Subcommand};

use crate::{notion, openai};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub config: Config,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the database ids that would be tried for a locator, most likely first
    Candidates {
        #[arg(value_name = "LOCATOR")]
        locator: String,
    },
    /// Find the form of the configured database id that Notion accepts
    Resolve,
    /// Record the latest commit as a page in the database
    Commit {
        /// Repository to read the commit from
        #[arg(long, value_name = "DIR", default_value = ".")]
        repo: PathBuf,
        /// Add an LLM-written summary of the commit to the page
        #[arg(long)]
        summarize: bool,
        #[arg(long, default_value = openai::DEFAULT_MODEL)]
        model: String,
        /// Print the page request instead of sending it
        #[arg(long)]
        dry_run: bool,
    },
    /// Generate content from a prompt and store it as a page
    Page {
        #[arg(long)]
        title: String,
        #[arg(long)]
        prompt: String,
        /// Page date (ISO 8601); defaults to today
        #[arg(long)]
        date: Option<String>,
        #[arg(long, default_value = openai::DEFAULT_MODEL)]
        model: String,
    },
    /// Check that both Notion and the completion API are reachable
    Health {
        #[arg(long, default_value = openai::DEFAULT_MODEL)]
        model: String,
    },
}

/// Credentials and endpoints. Each one can come from a flag or the environment.
///
/// Nothing here is required up front: the subcommands ask for what they need, so offline
/// commands work without credentials.
#[derive(Args, Debug, Clone)]
pub struct Config {
    /// Notion integration token
    #[arg(long, env = "NOTION_API_KEY", global = true, hide_env_values = true)]
    pub notion_token: Option<String>,
    /// Database id or URL
    #[arg(long, env = "NOTION_DATABASE_ID", global = true)]
    pub database: Option<String>,
    /// Completion API key
    #[arg(long, env = "OPENAI_API_KEY", global = true, hide_env_values = true)]
    pub openai_key: Option<String>,
    #[arg(long, env = "NOTION_API_URL", global = true, default_value = notion::DEFAULT_API)]
    pub notion_api: String,
    #[arg(long, env = "OPENAI_API_URL", global = true, default_value = openai::DEFAULT_API)]
    pub openai_api: String,
}

impl Config {
    pub fn notion_token(&self) -> anyhow::Result<&str> {
        required(&self.notion_token, "--notion-token", "NOTION_API_KEY")
    }

    pub fn database(&self) -> anyhow::Result<&str> {
        required(&self.database, "--database", "NOTION_DATABASE_ID")
    }

    pub fn openai_key(&self) -> anyhow::Result<&str> {
        required(&self.openai_key, "--openai-key", "OPENAI_API_KEY")
    }
}

fn required<'a>(value: &'a Option<String>, flag: &str, env: &str) -> anyhow::Result<&'a str> {
    value
        .as_deref()
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| anyhow!("missing {env}: pass {flag} or set {env}"))
}
