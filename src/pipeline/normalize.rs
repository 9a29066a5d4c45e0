//! Text normalization and heuristic pre-processing.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

/// Small curated Portuguese + English stopword set.
static STOPWORDS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        // Portuguese
        "a", "o", "os", "as", "um", "uma", "umas", "uns", "de", "do", "da", "das", "dos", "e",
        "é", "em", "no", "na", "nas", "nos", "para", "por", "com", "sem", "sobre", "entre",
        "até", "como", "que", "se", "seu", "sua", "suas", "seus", "eu", "você", "vocês", "nós",
        "eles", "elas", "ao", "à", "às", "aos", "ou", "mas", "porém", "então", "também", "mais",
        "menos", "muito", "pouco", "tal", "tais", "foi", "foram", "ser", "estar", "estarão",
        "estará", "estão", "está", "estava", "estavam", "havia",
        // English
        "have", "has", "had", "the", "is", "are", "to", "for", "of", "in", "on", "at", "from",
        "with", "without", "about", "into", "over", "under", "and", "or", "not", "be", "been",
        "being", "this", "that", "these", "those", "an", "it", "its", "it's", "i", "you", "we",
        "they", "he", "she", "them", "him", "her", "my", "your", "our", "their", "me", "us",
    ]
    .into_iter()
    .collect()
});

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Anything that is not a word character, whitespace, `@`, `.` or `-`.
static NON_TOKEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\w\s@.\-]").unwrap());

/// Collapse line breaks and whitespace runs into single spaces and trim.
pub fn normalize_text(text: &str) -> String {
    let flat = text.replace(['\r', '\n'], " ");
    WHITESPACE.replace_all(&flat, " ").trim().to_string()
}

/// Lower-case, strip punctuation and drop stopwords.
pub fn preprocess(text: &str) -> String {
    let lower = text.to_lowercase();
    let cleaned = NON_TOKEN.replace_all(&lower, " ");
    cleaned
        .split_whitespace()
        .filter(|token| !STOPWORDS.contains(token))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapses_mixed_line_endings() {
        assert_eq!(
            normalize_text("  Olá,\r\n\r\nTudo   bem?\n\tAbraço  "),
            "Olá, Tudo bem? Abraço"
        );
    }

    #[test]
    fn normalize_is_idempotent() {
        let inputs = [
            "already normal",
            "  lots\n\n of \t space ",
            "",
            "\r\n",
            "Prezados,\nsegue anexo.\r\nAtt.\nMaria",
        ];
        for input in inputs {
            let once = normalize_text(input);
            assert_eq!(normalize_text(&once), once, "input: {input:?}");
        }
    }

    #[test]
    fn empty_input_normalizes_to_empty() {
        assert_eq!(normalize_text(" \n\r\t "), "");
    }

    #[test]
    fn preprocess_strips_punctuation_and_stopwords() {
        assert_eq!(
            preprocess("Bom dia! Poderiam informar o andamento do chamado #12345?"),
            "bom dia poderiam informar andamento chamado 12345"
        );
    }

    #[test]
    fn preprocess_keeps_email_characters() {
        assert_eq!(
            preprocess("Contato: joao.silva@empresa.com-br"),
            "contato joao.silva@empresa.com-br"
        );
    }

    #[test]
    fn stopwords_cover_both_languages() {
        assert_eq!(preprocess("para the chamado"), "chamado");
    }
}
