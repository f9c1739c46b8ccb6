//! Sensitive message classification
//!
//! A message is sensitive if any one of three independent checks fires:
//! interrogative/academic phrasing, a whole-word keyword, or a structural
//! pattern (email, phone, amounts, identity numbers). Checks short-circuit
//! on the first hit.

use crate::corpus::PatternFamily;
use crate::keywords::KeywordSet;
use serde::{Deserialize, Serialize};

/// Which check flagged a message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Detection {
    /// Question/answer phrasing such as "q2" or "what is"
    Phrase(PatternFamily),
    /// A keyword, as written in the text
    Keyword(String),
    /// A structural pattern
    Pattern(PatternFamily),
}

impl Detection {
    /// Stable rule name for logging
    pub fn rule_name(&self) -> &str {
        match self {
            Self::Phrase(family) | Self::Pattern(family) => family.name(),
            Self::Keyword(_) => "keyword",
        }
    }
}

/// Find the first check that flags `text` as sensitive
///
/// Empty and whitespace-only text is never sensitive.
pub fn detect(text: &str, keywords: &KeywordSet) -> Option<Detection> {
    if text.trim().is_empty() {
        return None;
    }

    if let Some(family) = PatternFamily::QA
        .into_iter()
        .find(|family| family.regex().is_match(text))
    {
        return Some(Detection::Phrase(family));
    }

    if let Some(term) = keywords.find(text) {
        return Some(Detection::Keyword(term.to_string()));
    }

    PatternFamily::STRUCTURAL
        .into_iter()
        .find(|family| family.regex().is_match(text))
        .map(Detection::Pattern)
}

/// Classify `text` against a prepared keyword set
pub fn classify(text: &str, keywords: &KeywordSet) -> bool {
    detect(text, keywords).is_some()
}

/// Classify `text` against the built-in corpus plus `custom_keywords`
pub fn is_sensitive<S: AsRef<str>>(text: &str, custom_keywords: &[S]) -> bool {
    classify(text, &KeywordSet::with_custom(custom_keywords))
}
