//! Keyword-scoring classifiers.
//!
//! Two profiles share the [`CategoryClassifier`] contract:
//! - **Full** (default): pre-processed text, fixed 0.75 / 0.55 confidences.
//! - **Lite**: raw lower-cased text, extra urgency/question/greeting
//!   heuristics, confidence scaled by score magnitude.
//!
//! The profiles use different keyword tables and will disagree on
//! borderline inputs.

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use tracing::debug;

use crate::pipeline::normalize::preprocess;
use crate::pipeline::types::{Category, CategoryClassifier, CategoryScore, ClassifierMethod};

/// Confidence for any non-neutral full-profile decision.
const DECISIVE_CONFIDENCE: f64 = 0.75;

/// Confidence when the full profile sees no evidence either way.
const NEUTRAL_CONFIDENCE: f64 = 0.55;

/// Lite profile confidence bounds.
const LITE_BASE_CONFIDENCE: f64 = 0.6;
const LITE_STEP: f64 = 0.1;
const LITE_MAX_CONFIDENCE: f64 = 0.9;
const LITE_EMPTY_CONFIDENCE: f64 = 0.5;

/// Full profile: substrings that suggest the sender needs something.
const PRODUCTIVE_KEYWORDS: &[&str] = &[
    "andamento", "atualiza", "status", "prazo", "previs", "erro", "bug", "falha", "problema",
    "suporte", "duvida", "dúvida", "acesso", "liberacao", "liberação", "conta", "fatura",
    "boleto", "chamado", "protocolo", "anexo", "segue",
];

/// Full profile: substrings of social or courtesy mail.
const SOCIAL_KEYWORDS: &[&str] = &[
    "parabens", "parabéns", "feliz", "boas", "agradec", "obrigad", "bom dia", "boa tarde",
    "boa noite", "saudacoes", "saudações",
];

const LITE_PRODUCTIVE_KEYWORDS: &[&str] = &[
    "urgente", "problema", "erro", "bug", "falha", "não funciona", "suporte", "ajuda",
    "dúvida", "questão", "technical", "support", "issue", "help", "prazo", "deadline",
    "entrega", "delivery", "projeto", "project", "reunião", "meeting", "apresentação",
    "presentation", "relatório", "report", "solução", "solution", "resolução", "resolution",
    "documentação", "documentation", "tarefa", "task", "atividade", "activity", "trabalho",
    "work",
];

const LITE_SOCIAL_KEYWORDS: &[&str] = &[
    "parabéns", "congratulations", "feliz", "happy", "aniversário", "birthday", "obrigado",
    "thanks", "thank you", "festa", "party", "fim de semana", "weekend", "férias", "vacation",
    "feriado", "holiday", "pessoal", "personal", "família", "family", "casamento", "wedding",
    "bebê", "baby", "saúde", "health", "hospital", "médico", "doctor", "viagem", "trip",
];

const LITE_URGENCY_MARKERS: &[&str] = &["urgente", "urgent", "!!!", "asap"];

const LITE_GREETING_WORDS: &[&str] = &["oi", "olá", "hi", "hello"];

/// Messages shorter than this many words can count as greeting-only.
const LITE_SHORT_MESSAGE_WORDS: usize = 10;

/// Which keyword profile the heuristic uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClassifierProfile {
    #[default]
    Full,
    Lite,
}

impl fmt::Display for ClassifierProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Full => f.write_str("full"),
            Self::Lite => f.write_str("lite"),
        }
    }
}

impl FromStr for ClassifierProfile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "full" => Ok(Self::Full),
            "lite" => Ok(Self::Lite),
            other => Err(format!("unknown classifier profile '{other}' (expected full or lite)")),
        }
    }
}

/// Count how many keywords occur as substrings of `text`.
fn count_matches(text: &str, keywords: &[&str]) -> usize {
    keywords.iter().filter(|k| text.contains(*k)).count()
}

/// Full-profile score: productive matches minus social matches.
pub fn keyword_score(preprocessed: &str) -> i32 {
    count_matches(preprocessed, PRODUCTIVE_KEYWORDS) as i32
        - count_matches(preprocessed, SOCIAL_KEYWORDS) as i32
}

/// Map a full-profile score to a decision. Neutral defaults to "no action needed".
pub fn decide_full(score: i32) -> CategoryScore {
    let (category, confidence) = if score >= 1 {
        (Category::Productive, DECISIVE_CONFIDENCE)
    } else if score <= -1 {
        (Category::Unproductive, DECISIVE_CONFIDENCE)
    } else {
        (Category::Unproductive, NEUTRAL_CONFIDENCE)
    };
    CategoryScore::new(category, confidence, ClassifierMethod::Heuristic)
}

/// Signals the lite profile extracts from raw text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LiteSignals {
    pub productive: usize,
    pub social: usize,
    pub has_question: bool,
    pub has_urgency: bool,
    pub greeting_only: bool,
}

impl LiteSignals {
    pub fn analyze(text: &str) -> Self {
        let lower = text.to_lowercase();
        let productive = count_matches(&lower, LITE_PRODUCTIVE_KEYWORDS);
        let social = count_matches(&lower, LITE_SOCIAL_KEYWORDS);
        let has_question = text.contains('?');
        let has_urgency = LITE_URGENCY_MARKERS.iter().any(|m| lower.contains(m));

        // Substring match, like the keyword tables: "boa noite" counts via "oi".
        let greeting_only = lower.split_whitespace().count() < LITE_SHORT_MESSAGE_WORDS
            && count_matches(&lower, LITE_GREETING_WORDS) > 0;

        Self {
            productive,
            social,
            has_question,
            has_urgency,
            greeting_only,
        }
    }

    /// Signed lite score.
    pub fn score(&self) -> i32 {
        let mut score = self.productive as i32 - self.social as i32;
        if self.has_urgency {
            score += 3;
        }
        if self.has_question && self.productive > 0 {
            score += 2;
        }
        if self.greeting_only {
            score -= 2;
        }
        score
    }
}

fn decide_lite(text: &str) -> CategoryScore {
    if text.trim().is_empty() {
        return CategoryScore::new(
            Category::Unproductive,
            LITE_EMPTY_CONFIDENCE,
            ClassifierMethod::HeuristicLite,
        );
    }

    let signals = LiteSignals::analyze(text);
    let score = signals.score();
    let category = if score > 0 {
        Category::Productive
    } else {
        Category::Unproductive
    };
    let confidence =
        (LITE_BASE_CONFIDENCE + LITE_STEP * f64::from(score.abs())).min(LITE_MAX_CONFIDENCE);

    debug!(?signals, score, category = %category, "Lite heuristic decision");
    CategoryScore::new(category, confidence, ClassifierMethod::HeuristicLite)
}

/// Keyword heuristic classifier. Always available, never fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicClassifier {
    profile: ClassifierProfile,
}

impl HeuristicClassifier {
    pub fn new(profile: ClassifierProfile) -> Self {
        Self { profile }
    }

    pub fn profile(&self) -> ClassifierProfile {
        self.profile
    }

    /// Synchronous scoring of normalized text.
    pub fn score(&self, normalized: &str) -> CategoryScore {
        match self.profile {
            ClassifierProfile::Full => {
                let pre = preprocess(normalized);
                let score = keyword_score(&pre);
                debug!(score, "Full heuristic score");
                decide_full(score)
            }
            ClassifierProfile::Lite => decide_lite(normalized),
        }
    }
}

#[async_trait]
impl CategoryClassifier for HeuristicClassifier {
    fn name(&self) -> &str {
        match self.profile {
            ClassifierProfile::Full => "heuristic",
            ClassifierProfile::Lite => "heuristic_lite",
        }
    }

    async fn classify(&self, normalized: &str) -> CategoryScore {
        self.score(normalized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full(text: &str) -> CategoryScore {
        HeuristicClassifier::new(ClassifierProfile::Full).score(text)
    }

    fn lite(text: &str) -> CategoryScore {
        HeuristicClassifier::new(ClassifierProfile::Lite).score(text)
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    // ── Full profile ────────────────────────────────────────────────

    #[test]
    fn positive_scores_are_productive() {
        for score in 1..=5 {
            let decision = decide_full(score);
            assert_eq!(decision.category, Category::Productive);
            assert_eq!(decision.confidence, 0.75);
        }
    }

    #[test]
    fn negative_scores_are_unproductive() {
        for score in -5..=-1 {
            let decision = decide_full(score);
            assert_eq!(decision.category, Category::Unproductive);
            assert_eq!(decision.confidence, 0.75);
        }
    }

    #[test]
    fn neutral_score_defaults_to_unproductive() {
        let decision = decide_full(0);
        assert_eq!(decision.category, Category::Unproductive);
        assert_eq!(decision.confidence, 0.55);
    }

    #[test]
    fn error_report_is_productive() {
        let result = full("Estou com um erro no sistema desde ontem");
        assert_eq!(result.category, Category::Productive);
        assert_eq!(result.confidence, 0.75);
        assert_eq!(result.method, ClassifierMethod::Heuristic);
    }

    #[test]
    fn congratulations_are_unproductive() {
        let result = full("Parabéns pelo aniversário, feliz dia!");
        assert_eq!(result.category, Category::Unproductive);
        assert_eq!(result.confidence, 0.75);
    }

    #[test]
    fn text_without_keywords_is_neutral() {
        let result = full("Reunião amanhã às 10h");
        assert_eq!(result.category, Category::Unproductive);
        assert_eq!(result.confidence, 0.55);
    }

    #[test]
    fn greeting_plus_request_nets_productive() {
        let pre = preprocess("Bom dia! Poderiam informar o andamento do chamado #12345?");
        // andamento + chamado - "bom dia"
        assert_eq!(keyword_score(&pre), 1);
    }

    // ── Lite profile ────────────────────────────────────────────────

    #[test]
    fn lite_empty_text() {
        let result = lite("   ");
        assert_eq!(result.category, Category::Unproductive);
        assert_eq!(result.confidence, 0.5);
        assert_eq!(result.method, ClassifierMethod::HeuristicLite);
    }

    #[test]
    fn lite_urgent_question_caps_confidence() {
        let result = lite("URGENTE: o sistema está com erro, podem ajudar?");
        assert_eq!(result.category, Category::Productive);
        assert!(approx(result.confidence, 0.9));
    }

    #[test]
    fn lite_short_greeting_is_unproductive() {
        let signals = LiteSignals::analyze("Oi!");
        assert!(signals.greeting_only);
        assert_eq!(signals.score(), -2);

        let result = lite("Oi!");
        assert_eq!(result.category, Category::Unproductive);
        assert!(approx(result.confidence, 0.8));
    }

    #[test]
    fn lite_greeting_matches_substrings() {
        let signals = LiteSignals::analyze("Boa noite");
        assert!(signals.greeting_only);
        assert_eq!(signals.score(), -2);

        let result = lite("Boa noite");
        assert_eq!(result.category, Category::Unproductive);
        assert!(approx(result.confidence, 0.8));
    }

    #[test]
    fn lite_greeting_needs_a_short_message() {
        let long = "oi pessoal segue abaixo a lista completa de itens para revisar amanhã cedo";
        assert!(!LiteSignals::analyze(long).greeting_only);
    }

    #[test]
    fn lite_question_bonus_needs_productive_keyword() {
        let signals = LiteSignals::analyze("Tudo certo por aí?");
        assert!(signals.has_question);
        assert_eq!(signals.score(), 0);
        assert_eq!(lite("Tudo certo por aí?").category, Category::Unproductive);
    }

    #[test]
    fn lite_social_message() {
        let result = lite("Obrigado pela festa de aniversário");
        assert_eq!(result.category, Category::Unproductive);
        assert!(approx(result.confidence, 0.9));
    }

    #[test]
    fn profiles_parse_from_config_strings() {
        assert_eq!("FULL".parse::<ClassifierProfile>(), Ok(ClassifierProfile::Full));
        assert_eq!("lite".parse::<ClassifierProfile>(), Ok(ClassifierProfile::Lite));
        assert!("fast".parse::<ClassifierProfile>().is_err());
    }

    #[tokio::test]
    async fn strategy_names() {
        let full = HeuristicClassifier::new(ClassifierProfile::Full);
        let lite = HeuristicClassifier::new(ClassifierProfile::Lite);
        assert_eq!(full.name(), "heuristic");
        assert_eq!(lite.name(), "heuristic_lite");
        assert_eq!(
            full.classify("Segue o boleto").await.category,
            Category::Productive
        );
    }
}
