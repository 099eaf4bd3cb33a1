use std::path::Path;

use anyhow::{Context, bail};
use chrono::{Local, SecondsFormat};

use crate::{
    cli::Config,
    git,
    locator::{self, derive_candidates},
    notion::{Database, DatabaseProbe, NotionClient},
    openai::Summarizer,
    page,
    report::Reporter,
};

const PREVIEW_CHARS: usize = 200;

pub fn candidates(raw: &str) {
    for candidate in derive_candidates(raw) {
        println!("{candidate}");
    }
}

pub fn resolve(config: &Config, reporter: &Reporter) -> anyhow::Result<()> {
    let client = NotionClient::new(config.notion_token()?, &config.notion_api)?;
    let (id, db) = resolve_database(config, &client, reporter)?;
    if let Some(db) = db {
        reporter.detail(format!("canonical id: {}", db.id));
        if !db.title.is_empty() {
            reporter.detail(format!("title: {}", db.title));
        }
        reporter.detail(format!("properties: {}", db.properties.join(", ")));
    }
    println!("{id}");
    Ok(())
}

pub fn commit(
    config: &Config,
    reporter: &Reporter,
    repo: &Path,
    summarize: bool,
    model: &str,
    dry_run: bool,
) -> anyhow::Result<()> {
    let commit = git::head_commit(repo)
        .with_context(|| format!("could not read the latest commit in {}", repo.display()))?;
    reporter.ok(format!(
        "commit {} by {}: {}",
        commit.sha.get(..7).unwrap_or(&commit.sha),
        commit.author,
        commit.subject()
    ));

    let raw = config.database()?;
    let (database_id, client) = if dry_run {
        let first = derive_candidates(raw).into_iter().next().unwrap_or_default();
        (first, None)
    } else {
        let client = NotionClient::new(config.notion_token()?, &config.notion_api)?;
        let (id, _) = resolve_database(config, &client, reporter)?;
        (id, Some(client))
    };

    // A missing summary is not worth losing the commit record over.
    let summary = if summarize {
        match summarize_commit(config, reporter, model, &commit) {
            Ok(s) => Some(s),
            Err(e) => {
                reporter.warn(format!("continuing without a summary: {e:#}"));
                None
            }
        }
    } else {
        None
    };

    let date = Local::now().to_rfc3339_opts(SecondsFormat::Secs, false);
    let body = page::commit_page(&database_id, &commit, summary.as_deref(), &date);

    let Some(client) = client else {
        println!("{}", serde_json::to_string_pretty(&body)?);
        return Ok(());
    };

    let spinner = reporter.spinner("Creating page");
    let created = client.create_page(&body);
    spinner.finish_and_clear();
    let created = created.context("could not create the commit page")?;
    reporter.ok(format!("created page for commit {}", commit.subject()));
    if let Some(url) = &created.url {
        reporter.detail(url);
    }
    println!("{}", created.id);
    Ok(())
}

pub fn page(
    config: &Config,
    reporter: &Reporter,
    title: &str,
    prompt: &str,
    date: Option<&str>,
    model: &str,
) -> anyhow::Result<()> {
    let client = NotionClient::new(config.notion_token()?, &config.notion_api)?;
    let summarizer = Summarizer::new(config.openai_key()?, &config.openai_api, model)?;
    let (database_id, _) = resolve_database(config, &client, reporter)?;

    let spinner = reporter.spinner(format!("Generating content with {}", summarizer.model()));
    let content = summarizer.generate(prompt);
    spinner.finish_and_clear();
    let content = content.context("could not generate page content")?;

    let date = match date {
        Some(d) => d.to_string(),
        None => Local::now().date_naive().to_string(),
    };
    let body = page::content_page(&database_id, title, &content, &date);

    let spinner = reporter.spinner("Creating page");
    let created = client.create_page(&body);
    spinner.finish_and_clear();
    let created = created.context("could not create the page")?;

    reporter.ok(format!("created page {title}"));
    reporter.detail(page::preview(&content, PREVIEW_CHARS));
    println!("{}", created.id);
    Ok(())
}

pub fn health(config: &Config, reporter: &Reporter, model: &str) -> anyhow::Result<()> {
    let timestamp = Local::now().to_rfc3339_opts(SecondsFormat::Secs, false);

    let notion = config
        .notion_token()
        .and_then(|token| NotionClient::new(token, &config.notion_api))
        .and_then(|client| resolve_database(config, &client, reporter).map(|_| ()));
    let openai = config
        .openai_key()
        .and_then(|key| Summarizer::new(key, &config.openai_api, model))
        .and_then(|s| s.ping());

    let mut healthy = true;
    for (name, result) in [("notion", notion), ("openai", openai)] {
        match result {
            Ok(()) => println!("{name}: healthy"),
            Err(e) => {
                healthy = false;
                println!("{name}: unhealthy");
                reporter.fail(format!("{name}: {e:#}"));
            }
        }
    }
    println!("timestamp: {timestamp}");
    if !healthy {
        println!("status: unhealthy");
        bail!("unhealthy");
    }
    println!("status: healthy");
    Ok(())
}

/// Resolve the configured locator against Notion, reporting each attempt.
///
/// Failing to resolve is a configuration problem, so the error says what to fix rather than
/// suggesting a retry.
fn resolve_database(
    config: &Config,
    client: &NotionClient,
    reporter: &Reporter,
) -> anyhow::Result<(String, Option<Database>)> {
    let raw = config.database()?;
    if !locator::is_canonical(raw) {
        reporter.warn(format!("normalising database locator {raw:?}"));
    }

    let spinner = reporter.spinner("Resolving database");
    let mut probe = DatabaseProbe::new(client);
    let resolution = locator::resolve(raw, &mut probe);
    spinner.finish_and_clear();
    reporter.resolution(&resolution);

    match resolution.resolved {
        Some(id) => Ok((id, probe.found)),
        None => bail!(
            "could not resolve database {raw:?}: none of {} candidate ids was accepted. \
             Check the id and that the database is shared with the integration",
            resolution.attempts.len()
        ),
    }
}

fn summarize_commit(
    config: &Config,
    reporter: &Reporter,
    model: &str,
    commit: &git::CommitInfo,
) -> anyhow::Result<String> {
    let summarizer = Summarizer::new(config.openai_key()?, &config.openai_api, model)?;
    let spinner = reporter.spinner(format!("Summarising with {}", summarizer.model()));
    let summary = summarizer.summarize_commit(commit);
    spinner.finish_and_clear();
    summary
}
