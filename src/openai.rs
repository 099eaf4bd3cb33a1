use std::time::Duration;

use anyhow::{Context, anyhow, bail};
use serde_json::{Value, json};
use ureq::Agent;
use url::Url;

use crate::git::CommitInfo;

pub const DEFAULT_API: &str = "https://api.openai.com/v1/";
pub const DEFAULT_MODEL: &str = "gpt-4";
const SYSTEM_PROMPT: &str =
    "You are a helpful assistant that generates well-structured, detailed content.";

/// Chat-completion client used to write page content.
pub struct Summarizer {
    agent: Agent,
    endpoint: Url,
    key: String,
    model: String,
}

/// Tuning knobs for a single completion.
#[derive(Debug, Clone, Copy)]
pub struct Sampling {
    pub temperature: Option<f64>,
    pub max_tokens: Option<u32>,
}

impl Default for Sampling {
    fn default() -> Self {
        Sampling {
            temperature: Some(0.7),
            max_tokens: Some(500),
        }
    }
}

impl Summarizer {
    pub fn new(key: impl Into<String>, base: &str, model: impl Into<String>) -> anyhow::Result<Self> {
        let base = Url::parse(base).with_context(|| format!("invalid API URL: {base}"))?;
        let endpoint = if base.path().ends_with('/') {
            base.join("chat/completions")?
        } else {
            Url::parse(&format!("{base}/chat/completions"))?
        };
        let config = Agent::config_builder()
            .timeout_connect(Some(Duration::from_secs(5)))
            .timeout_global(Some(Duration::from_secs(120)))
            .http_status_as_error(false)
            .build();
        Ok(Summarizer {
            agent: Agent::new_with_config(config),
            endpoint,
            key: key.into(),
            model: model.into(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Generate free-form content for `prompt`.
    pub fn generate(&self, prompt: &str) -> anyhow::Result<String> {
        self.complete(prompt, Sampling::default())
    }

    /// Summarise a commit for the page body.
    pub fn summarize_commit(&self, commit: &CommitInfo) -> anyhow::Result<String> {
        self.complete(&commit_prompt(commit), Sampling::default())
    }

    /// Smallest possible round trip, for health checks.
    pub fn ping(&self) -> anyhow::Result<()> {
        self.complete(
            "test",
            Sampling {
                temperature: None,
                max_tokens: Some(5),
            },
        )
        .map(|_| ())
    }

    fn complete(&self, prompt: &str, sampling: Sampling) -> anyhow::Result<String> {
        let request = request_body(&self.model, prompt, sampling);
        let payload = serde_json::to_string(&request)?;
        let mut res = self
            .agent
            .post(self.endpoint.as_str())
            .header("Authorization", format!("Bearer {}", self.key))
            .header("Content-Type", "application/json")
            .send(payload.as_bytes())
            .context("failed chat completion request")?;
        let status = res.status().as_u16();
        let body = res
            .body_mut()
            .read_to_string()
            .context("failed to read completion response body")?;
        let json: Value = serde_json::from_str(&body)
            .with_context(|| format!("completion response ({status}) is not JSON"))?;
        if !(200..300).contains(&status) {
            let msg = json["error"]["message"].as_str().unwrap_or("unknown error");
            bail!("completion API returned {status}: {msg}");
        }
        completion_text(&json)
    }
}

fn request_body(model: &str, prompt: &str, sampling: Sampling) -> Value {
    let mut body = json!({
        "model": model,
        "messages": [
            { "role": "system", "content": SYSTEM_PROMPT },
            { "role": "user", "content": prompt },
        ],
    });
    if let Some(t) = sampling.temperature {
        body["temperature"] = json!(t);
    }
    if let Some(n) = sampling.max_tokens {
        body["max_tokens"] = json!(n);
    }
    body
}

fn commit_prompt(commit: &CommitInfo) -> String {
    let files = if commit.files.is_empty() {
        "(none)".to_string()
    } else {
        commit.files.join("\n")
    };
    format!(
        "Summarize the following git commit in a short paragraph for a changelog.\n\n\
         Author: {}\n\nMessage:\n{}\n\nChanged files:\n{}",
        commit.author, commit.message, files
    )
}

fn completion_text(json: &Value) -> anyhow::Result<String> {
    json["choices"][0]["message"]["content"]
        .as_str()
        .map(|s| s.trim().to_string())
        .ok_or_else(|| anyhow!("completion response has no message content"))
}
