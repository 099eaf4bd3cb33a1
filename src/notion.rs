use std::time::Duration;

use anyhow::{Context, anyhow, bail};
use serde_json::Value;
use ureq::Agent;
use url::Url;

use crate::locator::Probe;

pub const DEFAULT_API: &str = "https://api.notion.com/v1/";
const NOTION_VERSION: &str = "2022-06-28";

/// Authenticated handle on the Notion REST API. Built once and passed to whoever needs it.
pub struct NotionClient {
    agent: Agent,
    base: Url,
    token: String,
}

/// The parts of a database we report back to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Database {
    pub id: String,
    pub title: String,
    pub properties: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedPage {
    pub id: String,
    pub url: Option<String>,
}

impl NotionClient {
    pub fn new(token: impl Into<String>, base: &str) -> anyhow::Result<Self> {
        let config = Agent::config_builder()
            .timeout_connect(Some(Duration::from_secs(5)))
            .timeout_global(Some(Duration::from_secs(30)))
            .http_status_as_error(false)
            .build();
        Ok(NotionClient {
            agent: Agent::new_with_config(config),
            base: api_base(base)?,
            token: token.into(),
        })
    }

    /// Look a database up by id. `Ok(None)` means the API does not know the id, or does not let
    /// this integration see it.
    pub fn retrieve_database(&self, id: &str) -> anyhow::Result<Option<Database>> {
        let url = endpoint(&self.base, &["databases", id])?;
        let mut res = self
            .agent
            .get(url.as_str())
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Notion-Version", NOTION_VERSION)
            .call()
            .with_context(|| format!("failed database request for {id}"))?;
        let status = res.status().as_u16();
        let body = res
            .body_mut()
            .read_to_string()
            .context("failed to read database response body")?;

        match status {
            200..=299 => {
                let json: Value =
                    serde_json::from_str(&body).context("database response is not JSON")?;
                Ok(Some(parse_database(&json)))
            }
            400 | 404 => Ok(None),
            _ => bail!("Notion returned {status}: {}", api_message(&body)),
        }
    }

    /// `POST /pages` with a prepared body (see [`crate::page`]).
    pub fn create_page(&self, body: &Value) -> anyhow::Result<CreatedPage> {
        let url = endpoint(&self.base, &["pages"])?;
        let payload = serde_json::to_string(body)?;
        let mut res = self
            .agent
            .post(url.as_str())
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Notion-Version", NOTION_VERSION)
            .header("Content-Type", "application/json")
            .send(payload.as_bytes())
            .context("failed page creation request")?;
        let status = res.status().as_u16();
        let body = res
            .body_mut()
            .read_to_string()
            .context("failed to read page response body")?;
        if !(200..300).contains(&status) {
            bail!("Notion returned {status}: {}", api_message(&body));
        }
        let json: Value = serde_json::from_str(&body).context("page response is not JSON")?;
        parse_created_page(&json)
    }
}

/// Probes candidate ids by retrieving the database, remembering the first one found.
pub struct DatabaseProbe<'a> {
    client: &'a NotionClient,
    pub found: Option<Database>,
}

impl<'a> DatabaseProbe<'a> {
    pub fn new(client: &'a NotionClient) -> Self {
        DatabaseProbe {
            client,
            found: None,
        }
    }
}

impl Probe for DatabaseProbe<'_> {
    fn probe(&mut self, candidate: &str) -> anyhow::Result<bool> {
        match self.client.retrieve_database(candidate)? {
            Some(db) => {
                self.found = Some(db);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

fn api_base(base: &str) -> anyhow::Result<Url> {
    let mut url = Url::parse(base).with_context(|| format!("invalid API URL: {base}"))?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

/// Append path segments, percent-encoding each one. Candidate ids can be arbitrary strings.
fn endpoint(base: &Url, segments: &[&str]) -> anyhow::Result<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| anyhow!("API URL cannot be a base: {base}"))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

fn parse_database(json: &Value) -> Database {
    let id = json["id"].as_str().unwrap_or_default().to_string();
    let title = json["title"]
        .as_array()
        .map(|parts| {
            parts
                .iter()
                .filter_map(|p| p["plain_text"].as_str())
                .collect::<String>()
        })
        .unwrap_or_default();
    let properties = json["properties"]
        .as_object()
        .map(|props| props.keys().cloned().collect())
        .unwrap_or_default();
    Database {
        id,
        title,
        properties,
    }
}

fn parse_created_page(json: &Value) -> anyhow::Result<CreatedPage> {
    let id = json["id"]
        .as_str()
        .ok_or_else(|| anyhow!("page response has no id"))?
        .to_string();
    let url = json["url"].as_str().map(str::to_string);
    Ok(CreatedPage { id, url })
}

/// Notion error bodies look like `{"object":"error","code":..,"message":..}`.
fn api_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v["message"].as_str().map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string())
}
