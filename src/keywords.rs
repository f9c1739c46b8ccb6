//! Effective sensitive keyword set
//!
//! A `KeywordSet` is the built-in corpus plus user-supplied custom terms,
//! compiled once into a case-insensitive whole-word matcher. Classification
//! and masking both go through the same compiled matcher, so for a given
//! set they always agree on which words are sensitive.

use crate::corpus::{builtin_keywords, is_builtin};
use crate::error::{PrivacyError, Result};
use regex::{Regex, RegexBuilder};
use std::borrow::Cow;
use std::sync::LazyLock;

static BUILTIN: LazyLock<KeywordSet> = LazyLock::new(|| KeywordSet::from_custom(Vec::new()));

/// Normalize a keyword the way it is stored: trimmed and lowercased
pub fn normalize_keyword(term: &str) -> String {
    term.trim().to_lowercase()
}

/// Built-in corpus unioned with custom keywords
#[derive(Debug, Clone)]
pub struct KeywordSet {
    /// Custom terms only, normalized, in insertion order
    custom: Vec<String>,
    matcher: KeywordMatcher,
}

impl Default for KeywordSet {
    fn default() -> Self {
        Self::builtin()
    }
}

impl KeywordSet {
    /// The built-in corpus with no custom additions
    pub fn builtin() -> Self {
        BUILTIN.clone()
    }

    /// Build a set from custom keywords
    ///
    /// Terms are normalized; empty terms, duplicates and terms already in
    /// the built-in corpus are dropped.
    pub fn with_custom<I, S>(custom: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut terms: Vec<String> = Vec::new();
        for term in custom {
            let term = normalize_keyword(term.as_ref());
            if term.is_empty() || is_builtin(&term) || terms.contains(&term) {
                continue;
            }
            terms.push(term);
        }
        Self::from_custom(terms)
    }

    fn from_custom(custom: Vec<String>) -> Self {
        let mut all: Vec<&str> = builtin_keywords().collect();
        all.extend(custom.iter().map(String::as_str));
        let matcher = KeywordMatcher::build(&all);
        Self { custom, matcher }
    }

    /// Custom terms only (the persisted subset)
    pub fn custom(&self) -> &[String] {
        &self.custom
    }

    /// Every effective term: built-in corpus first, then custom terms
    pub fn terms(&self) -> impl Iterator<Item = &str> {
        builtin_keywords()
            .map(|kw| -> &str { kw })
            .chain(self.custom.iter().map(String::as_str))
    }

    /// Number of effective terms
    pub fn len(&self) -> usize {
        builtin_keywords().count() + self.custom.len()
    }

    /// Always false; the built-in corpus is never empty
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Check whether a term (normalized first) is in the effective set
    pub fn contains(&self, term: &str) -> bool {
        let term = normalize_keyword(term);
        is_builtin(&term) || self.custom.contains(&term)
    }

    /// Copy of this set with one more custom term, or `None` if the term
    /// is empty or already present
    pub fn with_added(&self, term: &str) -> Option<Self> {
        let term = normalize_keyword(term);
        if term.is_empty() || self.contains(&term) {
            return None;
        }
        let mut custom = self.custom.clone();
        custom.push(term);
        Some(Self::from_custom(custom))
    }

    /// Copy of this set without a custom term, or `None` if the term is
    /// not a custom term (built-in terms cannot be removed)
    pub fn with_removed(&self, term: &str) -> Option<Self> {
        let term = normalize_keyword(term);
        if !self.custom.contains(&term) {
            return None;
        }
        let custom = self.custom.iter().filter(|kw| **kw != term).cloned().collect();
        Some(Self::from_custom(custom))
    }

    /// First keyword found as a whole word in `text`, as written in the text
    pub fn find<'t>(&self, text: &'t str) -> Option<&'t str> {
        self.matcher.find(text)
    }

    /// Check whether any keyword appears as a whole word
    pub fn is_match(&self, text: &str) -> bool {
        self.find(text).is_some()
    }

    /// Replace every whole-word keyword occurrence with `marker`
    pub fn replace_all<'t>(&self, text: &'t str, marker: &str) -> Cow<'t, str> {
        self.matcher.replace_all(text, marker)
    }
}

/// Compiled whole-word matcher over a keyword list
///
/// Normally a single alternation; falls back to one regex per term if the
/// combined pattern exceeds the regex size limit.
#[derive(Debug, Clone)]
enum KeywordMatcher {
    Combined(Regex),
    PerTerm(Vec<Regex>),
}

impl KeywordMatcher {
    fn build(terms: &[&str]) -> Self {
        // Longest first so "bank account" wins over "bank".
        let mut sorted: Vec<&str> = terms.to_vec();
        sorted.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));

        let alternation = sorted
            .iter()
            .map(|term| regex::escape(term))
            .collect::<Vec<_>>()
            .join("|");

        match compile(&format!(r"\b(?:{})\b", alternation)) {
            Ok(regex) => Self::Combined(regex),
            Err(e) => {
                tracing::warn!(
                    count = sorted.len(),
                    error = %e,
                    "Combined keyword matcher rejected, matching terms individually"
                );
                let regexes = sorted
                    .iter()
                    .filter_map(|term| match compile(&format!(r"\b{}\b", regex::escape(term))) {
                        Ok(regex) => Some(regex),
                        Err(e) => {
                            tracing::warn!(error = %e, "Skipping unmatchable keyword");
                            None
                        }
                    })
                    .collect();
                Self::PerTerm(regexes)
            }
        }
    }

    fn find<'t>(&self, text: &'t str) -> Option<&'t str> {
        match self {
            Self::Combined(regex) => regex.find(text).map(|m| m.as_str()),
            Self::PerTerm(regexes) => regexes
                .iter()
                .find_map(|regex| regex.find(text).map(|m| m.as_str())),
        }
    }

    fn replace_all<'t>(&self, text: &'t str, marker: &str) -> Cow<'t, str> {
        match self {
            Self::Combined(regex) => regex.replace_all(text, regex::NoExpand(marker)),
            Self::PerTerm(regexes) => {
                let mut out = text.to_string();
                for regex in regexes {
                    let replaced = regex.replace_all(&out, regex::NoExpand(marker)).into_owned();
                    out = replaced;
                }
                if out == text {
                    Cow::Borrowed(text)
                } else {
                    Cow::Owned(out)
                }
            }
        }
    }
}

fn compile(pattern: &str) -> Result<Regex> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .map_err(|e| PrivacyError::InvalidPattern(e.to_string()))
}
