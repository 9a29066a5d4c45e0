//! Sub-intent rules engine.
//!
//! A data-driven table of intent → regex patterns. Every pattern is
//! evaluated (case-insensitive) and every hit is recorded as an
//! `intent:pattern` signal. The chosen intent is resolved by fixed
//! priority, not by hit count:
//! - status_update
//! - attachment
//! - greetings
//!
//! Requests for action outrank social framing.

use regex::{Regex, RegexBuilder};
use tracing::debug;

use crate::pipeline::types::SubIntent;

/// Default pattern table, in evaluation order.
const DEFAULT_PATTERNS: &[(SubIntent, &[&str])] = &[
    (
        SubIntent::StatusUpdate,
        &[
            r"\bandamento\b",
            r"\batualiza",
            r"\bstatus\b",
            r"\bprogresso\b",
            r"\bprevis(ão|ao)\b",
            r"\bcaso\b",
            r"\bprogress\b",
            r"\beta\b",
        ],
    ),
    (
        SubIntent::Attachment,
        &[
            r"\banexo\b",
            r"\barquivo\b",
            r"\bdocumento\b",
            r"\banexei\b",
            r"\bsegue?\b",
            r"\battach",
            r"\bfile\b",
        ],
    ),
    (
        SubIntent::Greetings,
        &[
            r"\bparabéns\b",
            r"\bfeliz\b",
            r"\bobrigad",
            r"\bagradec",
            r"\bboas festas\b",
            r"\bcongrat",
            r"\bthanks?\b",
        ],
    ),
];

/// A single sub-intent pattern with its compiled regex.
#[derive(Debug, Clone)]
pub struct IntentRule {
    pub intent: SubIntent,
    /// Pattern source, as reported in signals.
    pub pattern: String,
    pub regex: Regex,
}

/// Outcome of sub-intent detection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubIntentMatch {
    pub intent: Option<SubIntent>,
    /// `intent:pattern` for every matching rule, in table order.
    pub signals: Vec<String>,
}

/// Pattern-table sub-intent detector.
#[derive(Debug, Clone)]
pub struct SubIntentDetector {
    rules: Vec<IntentRule>,
}

impl SubIntentDetector {
    /// Create a detector with the default pattern table.
    pub fn default_rules() -> Self {
        let mut detector = Self::empty();
        for (intent, patterns) in DEFAULT_PATTERNS {
            for pattern in *patterns {
                detector
                    .add_pattern(*intent, pattern)
                    .expect("default sub-intent patterns are valid");
            }
        }
        detector
    }

    /// Create an empty detector (for testing).
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    /// Append a case-insensitive pattern for `intent`.
    pub fn add_pattern(&mut self, intent: SubIntent, pattern: &str) -> Result<(), regex::Error> {
        let regex = RegexBuilder::new(pattern).case_insensitive(true).build()?;
        self.rules.push(IntentRule {
            intent,
            pattern: pattern.to_string(),
            regex,
        });
        Ok(())
    }

    /// Number of loaded rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Evaluate all rules against `text`.
    pub fn detect(&self, text: &str) -> SubIntentMatch {
        let hits: Vec<&IntentRule> = self
            .rules
            .iter()
            .filter(|rule| rule.regex.is_match(text))
            .collect();

        if hits.is_empty() {
            return SubIntentMatch::default();
        }

        let intent = SubIntent::PRIORITY
            .into_iter()
            .find(|candidate| hits.iter().any(|rule| rule.intent == *candidate));

        let signals: Vec<String> = hits
            .iter()
            .map(|rule| format!("{}:{}", rule.intent.tag(), rule.pattern))
            .collect();

        debug!(
            intent = ?intent,
            hits = signals.len(),
            "Sub-intent rules matched"
        );

        SubIntentMatch { intent, signals }
    }
}

impl Default for SubIntentDetector {
    fn default() -> Self {
        Self::default_rules()
    }
}
