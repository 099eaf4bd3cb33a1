use once_cell::sync::Lazy;
use regex::Regex;

/// Hosts whose URLs embed the database id somewhere in the path.
const HOST_MARKERS: &[&str] = &["notion.so", "notion.site"];

/// Something that can check a candidate id against the remote service.
///
/// `Ok(true)` means the candidate is usable, `Ok(false)` means the service rejected it. Errors
/// are treated exactly like a rejection by [`resolve`]; they are only kept around so the caller
/// can report them.
pub trait Probe {
    fn probe(&mut self, candidate: &str) -> anyhow::Result<bool>;
}

impl<F> Probe for F
where
    F: FnMut(&str) -> anyhow::Result<bool>,
{
    fn probe(&mut self, candidate: &str) -> anyhow::Result<bool> {
        self(candidate)
    }
}

/// Why a single candidate did not resolve.
#[derive(Debug)]
pub enum Failure {
    Rejected,
    Error(String),
}

#[derive(Debug)]
pub struct Attempt {
    pub candidate: String,
    /// `None` when this attempt is the one that succeeded.
    pub failure: Option<Failure>,
}

/// Outcome of [`resolve`]: the winning candidate, if any, and every probe made on the way.
#[derive(Debug, Default)]
pub struct Resolution {
    pub resolved: Option<String>,
    pub attempts: Vec<Attempt>,
}

impl Resolution {
    pub fn failures(&self) -> usize {
        self.attempts.iter().filter(|a| a.failure.is_some()).count()
    }
}

/// Expand a loosely specified locator into the ids worth trying, most likely first.
///
/// The order is fixed: clean form, hyphenated form (only for 32-character ids), the raw input
/// untouched, then the raw input lowercased. Duplicates and blank strings are dropped without
/// reordering what is left.
pub fn derive_candidates(raw: &str) -> Vec<String> {
    // Browser URLs carry a page slug in front of the id, so pick the id out directly.
    static HEX32_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[0-9a-fA-F]{32}").unwrap());

    let lowered = raw.to_lowercase();
    let mut id = raw;
    if HOST_MARKERS.iter().any(|m| lowered.contains(m))
        && let Some(m) = HEX32_RE.find(raw)
    {
        id = m.as_str();
    }

    if let Some((head, _query)) = id.split_once('?') {
        id = head;
    }

    let cleaned = clean(id);
    let hyphenated = hyphenate(&cleaned);

    let mut out: Vec<String> = Vec::with_capacity(4);
    for candidate in [Some(cleaned), hyphenated, Some(raw.to_string()), Some(lowered)]
        .into_iter()
        .flatten()
    {
        if !candidate.trim().is_empty() && !out.contains(&candidate) {
            out.push(candidate);
        }
    }
    out
}

/// Try each candidate in order until `probe` accepts one.
///
/// Nothing is probed after the first success. A probe error counts as a failed candidate and
/// resolution moves on to the next one; the error text is recorded in the returned attempts.
pub fn resolve<P: Probe + ?Sized>(raw: &str, probe: &mut P) -> Resolution {
    let mut resolution = Resolution::default();
    for candidate in derive_candidates(raw) {
        let failure = match probe.probe(&candidate) {
            Ok(true) => None,
            Ok(false) => Some(Failure::Rejected),
            Err(e) => Some(Failure::Error(format!("{e:#}"))),
        };
        let done = failure.is_none();
        resolution.attempts.push(Attempt {
            candidate: candidate.clone(),
            failure,
        });
        if done {
            resolution.resolved = Some(candidate);
            break;
        }
    }
    resolution
}

/// Strip everything that is not alphanumeric and lowercase the rest.
pub fn clean(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Group a 32-character id as 8-4-4-4-12. Anything else has no hyphenated form.
pub fn hyphenate(clean: &str) -> Option<String> {
    let chars: Vec<char> = clean.chars().collect();
    if chars.len() != 32 {
        return None;
    }
    let group = |r: std::ops::Range<usize>| chars[r].iter().collect::<String>();
    Some(format!(
        "{}-{}-{}-{}-{}",
        group(0..8),
        group(8..12),
        group(12..16),
        group(16..20),
        group(20..32)
    ))
}

/// Whether `s` already has the exact shape the API expects.
pub fn is_canonical(s: &str) -> bool {
    static CANONICAL_RE: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"^(?:[0-9a-f]{32}|[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12})$")
            .unwrap()
    });
    CANONICAL_RE.is_match(s)
}
