//! Best-effort entity extraction for reply templates.

use std::sync::LazyLock;

use chrono::{DateTime, Local};
use regex::{Regex, RegexBuilder};

/// Placeholder when no ticket id is found.
pub const NO_TICKET: &str = "N/A";

/// Placeholder SLA offset added to the current time.
const ETA_OFFSET_HOURS: i64 = 8;

/// Localized (pt-BR) date-time format for the ETA.
pub const ETA_FORMAT: &str = "%d/%m/%Y %H:%M";

/// Closing keywords that usually precede the sender's name, in lookup order.
const CLOSING_KEYWORDS: &[&str] = &[
    "att.",
    "atenciosamente",
    "obrigado",
    "obrigada",
    "grato",
    "grata",
    "regards",
    "sincerely",
    "thank you",
];

const MAX_NAME_CHARS: usize = 40;

static CLOSING_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    CLOSING_KEYWORDS
        .iter()
        .map(|k| {
            RegexBuilder::new(&regex::escape(k))
                .case_insensitive(true)
                .build()
                .unwrap()
        })
        .collect()
});

/// `#12345`, `CHM-123`, `ticket 987`, `PROTOCOLO 2024-00123`.
static TICKET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:#|chm-|ticket\s*|protocolo\s*)([a-z0-9\-_/]{3,20})").unwrap()
});

/// Take the first non-empty line after a closing keyword as the sender's name.
pub fn extract_name(text: &str) -> Option<String> {
    for pattern in CLOSING_PATTERNS.iter() {
        let Some(found) = pattern.find(text) else {
            continue;
        };

        let candidate = text[found.end()..]
            .split('\n')
            .skip(1)
            .map(str::trim)
            .find(|line| !line.is_empty());

        if let Some(line) = candidate {
            if line.chars().count() <= MAX_NAME_CHARS {
                let name = line.split('|').next().unwrap_or(line).trim();
                if !name.is_empty() {
                    return Some(name.to_string());
                }
            }
        }
    }
    None
}

/// Find a ticket/protocol id, upper-cased, or `"N/A"`.
pub fn extract_ticket(text: &str) -> String {
    TICKET
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_uppercase())
        .unwrap_or_else(|| NO_TICKET.to_string())
}

/// Placeholder SLA estimate: `now` plus eight hours.
pub fn estimate_eta(now: DateTime<Local>) -> String {
    (now + chrono::Duration::hours(ETA_OFFSET_HOURS))
        .format(ETA_FORMAT)
        .to_string()
}

/// Values used to fill a reply template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyContext {
    pub name: Option<String>,
    pub ticket: String,
    pub eta: String,
    pub signature: String,
}

impl ReplyContext {
    /// Extract entities from the source email.
    pub fn extract(text: &str, now: DateTime<Local>, signature: &str) -> Self {
        Self {
            name: extract_name(text),
            ticket: extract_ticket(text),
            eta: estimate_eta(now),
            signature: signature.to_string(),
        }
    }
}
