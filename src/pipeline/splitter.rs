//! Multi-email splitter.
//!
//! Segments a blob of concatenated emails into [`EmailUnit`]s, trying in
//! order:
//! 1. Explicit `EMAIL <n>` markers, optionally annotated with
//!    `PRODUTIVO` / `IMPRODUTIVO`. The first marker must open a line; the
//!    following ones may sit mid-line, so a blob flattened to one line
//!    still splits.
//! 2. Header lines (`De:`, `From:`, `Para:`, `To:`, `Assunto:`, `Subject:`).
//! 3. The whole input as a single unit.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::pipeline::types::{Category, EmailUnit};

/// Label of the fallback unit.
pub const SINGLE_EMAIL_ID: &str = "single email";

/// Header-mode segments must be longer than this (in characters).
const MIN_SEGMENT_CHARS: usize = 20;

/// `EMAIL 1` / `EMAIL 2` anywhere in the text.
static MULTI_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bemail[ \t]*[12]\b").unwrap());

/// Sender header markers, counted to detect several emails.
static SENDER_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(?:De|From):").unwrap());

/// `EMAIL <n>` anywhere in the text; group 1 is the ordinal.
static EMAIL_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bemail[ \t]*(\d+)\b").unwrap());

/// Category annotation right after a marker, e.g. `- PRODUTIVO` or `(Improdutivo)`.
static CATEGORY_ANNOTATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^[ \t\-:–—|]*(\(?[ \t]*(?:im)?produtivo\b[ \t]*\)?)").unwrap()
});

/// A line that starts an email header field.
static HEADER_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(?:De|From|Para|To|Assunto|Subject):").unwrap());

/// Whether `text` looks like several concatenated emails.
pub fn is_multi_email(text: &str) -> bool {
    MULTI_MARKER.is_match(text) || SENDER_HEADER.find_iter(text).take(2).count() > 1
}

/// Split `text` into email units. Never returns an empty vector.
pub fn split(text: &str) -> Vec<EmailUnit> {
    let units = split_by_markers(text);
    if !units.is_empty() {
        debug!(count = units.len(), "Split by EMAIL markers");
        return units;
    }

    let units = split_by_headers(text);
    if !units.is_empty() {
        debug!(count = units.len(), "Split by header lines");
        return units;
    }

    debug!("No split points found, treating input as a single email");
    vec![EmailUnit {
        id: SINGLE_EMAIL_ID.to_string(),
        header: String::new(),
        content: text.trim().to_string(),
        category_hint: None,
    }]
}

/// Read a `PRODUTIVO` / `IMPRODUTIVO` annotation from a marker header.
pub fn parse_category_hint(header: &str) -> Option<Category> {
    let lower = header.to_lowercase();
    if lower.contains("improdutivo") {
        Some(Category::Unproductive)
    } else if lower.contains("produtivo") {
        Some(Category::Productive)
    } else {
        None
    }
}

struct Marker {
    ordinal: u64,
    /// Byte offset where the marker starts.
    start: usize,
    /// Byte offset just past the marker.
    end: usize,
}

/// Whether only spaces or tabs sit between the previous line break and `offset`.
fn starts_line(text: &str, offset: usize) -> bool {
    let before = text[..offset].trim_end_matches([' ', '\t']);
    before.is_empty() || before.ends_with('\n')
}

fn split_by_markers(text: &str) -> Vec<EmailUnit> {
    let mut accepted: Vec<Marker> = Vec::new();

    for caps in EMAIL_MARKER.captures_iter(text) {
        let (Some(whole), Some(ordinal)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let Ok(ordinal) = ordinal.as_str().parse::<u64>() else {
            continue;
        };

        // The first marker opens a line; later ones must carry the next ordinal.
        let in_sequence = match accepted.last() {
            Some(previous) => previous.ordinal.checked_add(1) == Some(ordinal),
            None => starts_line(text, whole.start()),
        };
        if !in_sequence {
            continue;
        }

        accepted.push(Marker {
            ordinal,
            start: whole.start(),
            end: whole.end(),
        });
    }

    let ends: Vec<usize> = accepted
        .iter()
        .skip(1)
        .map(|m| m.start)
        .chain(std::iter::once(text.len()))
        .collect();

    accepted
        .into_iter()
        .zip(ends)
        .map(|(marker, end)| {
            let (header, body) = split_annotation(&text[marker.end..end]);
            EmailUnit {
                id: format!("EMAIL {}", marker.ordinal),
                category_hint: parse_category_hint(&header),
                header,
                content: strip_separators(body),
            }
        })
        .collect()
}

/// Separate a leading category annotation from the unit body.
///
/// Anything else after the marker, on the same line or below, is content.
fn split_annotation(segment: &str) -> (String, &str) {
    match CATEGORY_ANNOTATION.captures(segment) {
        Some(caps) => {
            let (Some(whole), Some(annotation)) = (caps.get(0), caps.get(1)) else {
                return (String::new(), segment);
            };
            (annotation.as_str().trim().to_string(), &segment[whole.end()..])
        }
        None => (String::new(), segment),
    }
}

fn strip_separators(raw: &str) -> String {
    raw.trim()
        .trim_start_matches(['-', ':', '–', '—', '|'])
        .trim()
        .to_string()
}

fn split_by_headers(text: &str) -> Vec<EmailUnit> {
    let mut segments: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut saw_header = false;
    let mut previous_was_header = false;

    for line in text.split_inclusive('\n') {
        let is_header = HEADER_LINE.is_match(line);
        if is_header {
            saw_header = true;
            // A header block opens a new segment; consecutive header lines stay together.
            if !previous_was_header && !current.is_empty() {
                segments.push(std::mem::take(&mut current));
            }
        }
        current.push_str(line);
        previous_was_header = is_header;
    }
    if !current.is_empty() {
        segments.push(current);
    }

    if !saw_header {
        return Vec::new();
    }

    segments
        .iter()
        .map(|s| s.trim())
        .filter(|s| s.chars().count() > MIN_SEGMENT_CHARS)
        .enumerate()
        .map(|(i, content)| EmailUnit {
            id: format!("EMAIL {}", i + 1),
            header: String::new(),
            content: content.to_string(),
            category_hint: None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const MARKED: &str = "EMAIL 1 - PRODUTIVO\n\
        Prezados, o sistema apresenta erro ao gerar o boleto.\n\
        EMAIL 2 - IMPRODUTIVO\n\
        Feliz Natal a toda a equipe!\n";

    #[test]
    fn detects_email_markers() {
        assert!(is_multi_email(MARKED));
        assert!(is_multi_email("email 2: segue"));
        assert!(!is_multi_email("Recebi seu email ontem."));
    }

    #[test]
    fn detects_repeated_sender_headers() {
        let text = "De: ana@x.com\nOi\n\nDe: bruno@y.com\nOlá";
        assert!(is_multi_email(text));
        assert!(!is_multi_email("From: ana@x.com\nHello there"));
    }

    #[test]
    fn explicit_markers_with_hints() {
        let units = split(MARKED);
        assert_eq!(units.len(), 2);

        assert_eq!(units[0].id, "EMAIL 1");
        assert_eq!(units[0].header, "PRODUTIVO");
        assert_eq!(units[0].category_hint, Some(Category::Productive));
        assert_eq!(
            units[0].content,
            "Prezados, o sistema apresenta erro ao gerar o boleto."
        );

        assert_eq!(units[1].id, "EMAIL 2");
        assert_eq!(units[1].category_hint, Some(Category::Unproductive));
        assert_eq!(units[1].content, "Feliz Natal a toda a equipe!");
    }

    #[test]
    fn content_on_the_marker_line() {
        let text = "EMAIL 1: Preciso de ajuda com o boleto, está com erro.\n\
                    EMAIL 2: Feliz natal a toda a equipe!";
        let units = split(text);
        assert_eq!(units.len(), 2);
        assert_eq!(units[0].header, "");
        assert_eq!(units[0].category_hint, None);
        assert_eq!(units[0].content, "Preciso de ajuda com o boleto, está com erro.");
        assert_eq!(units[1].id, "EMAIL 2");
        assert_eq!(units[1].content, "Feliz natal a toda a equipe!");
    }

    #[test]
    fn single_line_blob_with_annotations() {
        let text = "EMAIL 1 - PRODUTIVO Preciso de ajuda com o boleto. \
                    EMAIL 2 - IMPRODUTIVO Feliz natal a toda a equipe!";
        let units = split(text);
        assert_eq!(units.len(), 2);

        assert_eq!(units[0].header, "PRODUTIVO");
        assert_eq!(units[0].category_hint, Some(Category::Productive));
        assert_eq!(units[0].content, "Preciso de ajuda com o boleto.");

        assert_eq!(units[1].header, "IMPRODUTIVO");
        assert_eq!(units[1].category_hint, Some(Category::Unproductive));
        assert_eq!(units[1].content, "Feliz natal a toda a equipe!");
    }

    #[test]
    fn parenthesized_annotation() {
        let units = split("EMAIL 1 (Improdutivo)\nBoas festas!\nEMAIL 2\nOutro texto");
        assert_eq!(units[0].header, "(Improdutivo)");
        assert_eq!(units[0].category_hint, Some(Category::Unproductive));
        assert_eq!(units[0].content, "Boas festas!");
    }

    #[test]
    fn first_marker_must_open_a_line() {
        let units = split("Recebi seu email 1 ontem e o email 2 hoje.");
        assert_eq!(units.len(), 1);
        assert_eq!(units[0].id, SINGLE_EMAIL_ID);
    }

    #[test]
    fn markers_without_hint() {
        let units = split("EMAIL 1\nPrimeiro texto\nEMAIL 2\nSegundo texto");
        assert_eq!(units.len(), 2);
        assert_eq!(units[0].header, "");
        assert_eq!(units[0].category_hint, None);
        assert_eq!(units[1].content, "Segundo texto");
    }

    #[test]
    fn out_of_sequence_marker_stays_in_content() {
        let text = "EMAIL 1\nVeja o\nEmail 7 que mandei antes\nEMAIL 2\nOutro";
        let units = split(text);
        assert_eq!(units.len(), 2);
        assert!(units[0].content.contains("Email 7 que mandei antes"));
        assert_eq!(units[1].content, "Outro");
    }

    #[test]
    fn header_mode_groups_header_blocks() {
        let text = "De: ana@empresa.com\n\
            Assunto: Acesso\n\
            Não consigo acessar o portal desde ontem.\n\
            \n\
            De: bruno@empresa.com\n\
            Assunto: Natal\n\
            Boas festas para todos vocês!\n";
        let units = split(text);
        assert_eq!(units.len(), 2);
        assert_eq!(units[0].id, "EMAIL 1");
        assert!(units[0].content.starts_with("De: ana@empresa.com"));
        assert!(units[0].content.contains("portal"));
        assert_eq!(units[1].id, "EMAIL 2");
        assert!(units[1].content.contains("Boas festas"));
        assert!(units.iter().all(|u| u.header.is_empty() && u.category_hint.is_none()));
    }

    #[test]
    fn header_mode_drops_short_segments() {
        let text = "Oi\nFrom: a@b.c\nShort\nFrom: carol@example.com\nPlease reset my password today.";
        let units = split(text);
        assert_eq!(units.len(), 1);
        assert_eq!(units[0].id, "EMAIL 1");
        assert!(units[0].content.contains("reset my password"));
    }

    #[test]
    fn unmarked_text_is_single_unit() {
        let text = "Olá, gostaria de saber o prazo de entrega do pedido.";
        let units = split(text);
        assert_eq!(units.len(), 1);
        assert_eq!(units[0].id, SINGLE_EMAIL_ID);
        assert_eq!(units[0].header, "");
        assert_eq!(units[0].content, text);
    }

    #[test]
    fn hint_parsing_prefers_improdutivo() {
        assert_eq!(parse_category_hint("(Improdutivo)"), Some(Category::Unproductive));
        assert_eq!(parse_category_hint("produtivo"), Some(Category::Productive));
        assert_eq!(parse_category_hint("urgent"), None);
    }
}
