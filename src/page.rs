use serde_json::{Value, json};

use crate::git::CommitInfo;

/// Notion rejects rich text objects longer than this many characters.
pub const RICH_TEXT_LIMIT: usize = 2000;

/// Request body for `POST /pages` describing a commit.
pub fn commit_page(
    database_id: &str,
    commit: &CommitInfo,
    summary: Option<&str>,
    date: &str,
) -> Value {
    let mut body = json!({
        "parent": { "database_id": database_id },
        "properties": {
            "Title": title(&format!("Commit: {}", commit.message)),
            "Date": { "date": { "start": date } },
            "Author": rich_text(&commit.author),
            "Files": rich_text(&commit.files.join("\n")),
        },
    });
    if let Some(summary) = summary {
        body["children"] = Value::Array(paragraphs(summary));
    }
    body
}

/// Request body for a free-form page whose content was generated from a prompt.
pub fn content_page(database_id: &str, title_text: &str, content: &str, date: &str) -> Value {
    json!({
        "parent": { "database_id": database_id },
        "properties": {
            "Title": title(title_text),
            "Date": { "date": { "start": date } },
        },
        "children": paragraphs(content),
    })
}

fn title(text: &str) -> Value {
    json!({ "title": [{ "text": { "content": truncate(text, RICH_TEXT_LIMIT) } }] })
}

fn rich_text(text: &str) -> Value {
    json!({ "rich_text": [{ "text": { "content": truncate(text, RICH_TEXT_LIMIT) } }] })
}

/// One paragraph block per chunk so long content is kept whole.
fn paragraphs(text: &str) -> Vec<Value> {
    chunks(text, RICH_TEXT_LIMIT)
        .into_iter()
        .map(|chunk| {
            json!({
                "object": "block",
                "type": "paragraph",
                "paragraph": { "rich_text": [{ "text": { "content": chunk } }] },
            })
        })
        .collect()
}

/// Cut `s` to at most `max` characters.
pub fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

fn chunks(s: &str, max: usize) -> Vec<&str> {
    let max = max.max(1);
    let mut out = Vec::new();
    let mut rest = s;
    while !rest.is_empty() {
        let head = truncate(rest, max);
        out.push(head);
        rest = &rest[head.len()..];
    }
    if out.is_empty() {
        out.push("");
    }
    out
}

/// The first `max` characters of `content` followed by an ellipsis when anything was cut.
pub fn preview(content: &str, max: usize) -> String {
    let head = truncate(content, max);
    if head.len() < content.len() {
        format!("{head}...")
    } else {
        head.to_string()
    }
}
