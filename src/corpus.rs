//! Built-in sensitive keyword corpus and structural pattern library
//!
//! The corpus is versioned with the crate: adding or removing a term bumps
//! [`CORPUS_VERSION`]. User additions never live here, see
//! [`KeywordSet`](crate::keywords::KeywordSet).
//!
//! Detection is heuristic. Regex and keyword matching produce false
//! positives ("my bank holiday plans") and false negatives (spelled-out
//! numbers, obfuscated addresses); callers must not treat a negative
//! classification as proof that text is safe to publish.
//!
//! Digit classes are ASCII only; numbers written in other scripts are not
//! matched.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Replacement written over every redacted span
pub const MASK_MARKER: &str = "***";

/// Version of the built-in keyword list
pub const CORPUS_VERSION: u32 = 1;

/// Category a built-in keyword belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeywordCategory {
    Financial,
    Personal,
    Academic,
    Security,
    Medical,
    Legal,
    Location,
    Digital,
}

impl KeywordCategory {
    /// All categories in corpus order
    pub const ALL: [KeywordCategory; 8] = [
        Self::Financial,
        Self::Personal,
        Self::Academic,
        Self::Security,
        Self::Medical,
        Self::Legal,
        Self::Location,
        Self::Digital,
    ];

    /// Built-in terms for this category
    pub fn terms(self) -> &'static [&'static str] {
        match self {
            Self::Financial => FINANCIAL,
            Self::Personal => PERSONAL,
            Self::Academic => ACADEMIC,
            Self::Security => SECURITY,
            Self::Medical => MEDICAL,
            Self::Legal => LEGAL,
            Self::Location => LOCATION,
            Self::Digital => DIGITAL,
        }
    }
}

impl std::fmt::Display for KeywordCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Financial => "financial",
            Self::Personal => "personal",
            Self::Academic => "academic",
            Self::Security => "security",
            Self::Medical => "medical",
            Self::Legal => "legal",
            Self::Location => "location",
            Self::Digital => "digital",
        };
        f.write_str(name)
    }
}

const FINANCIAL: &[&str] = &[
    "password", "account number", "bank", "bank account", "balance",
    "credit card", "debit card", "atm", "ifsc", "upi", "wallet",
    "transaction", "amount", "salary", "income", "tax", "gst",
    "money", "cash", "payment", "bill", "invoice", "receipt",
    "gold", "silver", "diamond", "jewelry", "investment", "savings",
    "loan", "debt", "emi", "interest", "profit", "loss", "budget",
    "expense", "cost", "price", "fee", "charge", "deposit", "withdrawal",
];

const PERSONAL: &[&str] = &[
    "pan", "aadhar", "ssn", "passport", "license", "id card",
    "address", "phone number", "mobile number", "email", "username",
    "date of birth", "dob", "age", "mother name", "father name",
    "spouse name", "family", "children", "relatives",
];

const ACADEMIC: &[&str] = &[
    "marks", "grade", "cgpa", "percentage", "result", "exam",
    "roll no", "roll number", "student id", "admission number",
    "answer", "solution", "question", "q1", "q2", "q3", "q4", "q5",
    "assignment", "homework", "project", "thesis", "dissertation",
];

const SECURITY: &[&str] = &[
    "secret", "otp", "pin", "cvv", "security code", "verification code",
    "access code", "passcode", "token", "api key", "private key",
];

const MEDICAL: &[&str] = &[
    "medical record", "prescription", "diagnosis", "treatment",
    "medicine", "drug", "dose", "symptoms", "disease",
];

const LEGAL: &[&str] = &[
    "case number", "court", "lawyer", "legal", "contract", "agreement",
    "document", "certificate", "license number",
];

const LOCATION: &[&str] = &[
    "location", "coordinates", "gps", "latitude", "longitude",
    "home address", "office address", "current location",
];

const DIGITAL: &[&str] = &[
    "ip address", "mac address", "device id", "serial number",
    "wifi password", "network password", "router password",
];

/// Every built-in keyword, in corpus order
pub fn builtin_keywords() -> impl Iterator<Item = &'static str> {
    KeywordCategory::ALL
        .into_iter()
        .flat_map(|category| category.terms().iter().copied())
}

/// Check whether a normalized term is part of the built-in corpus
pub fn is_builtin(term: &str) -> bool {
    builtin_keywords().any(|kw| kw == term)
}

/// Structural shape of sensitive data, matched by a fixed regex
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternFamily {
    /// `q<digits>` question tags such as "q3"
    QaQuestionTag,
    /// Interrogative/academic phrasing ("what is", "explain", ...)
    QaPhrase,
    Email,
    /// `+91` prefixed 10-digit mobile number
    PhoneIndia,
    /// `ddd-ddd-dddd` with `-`, `.` or whitespace separators
    PhoneSeparated,
    /// Bare 10-digit run
    PhoneBare,
    /// Currency symbol followed by an amount
    CurrencyAmount,
    /// Any run of four or more digits
    LongDigitRun,
    /// "500 rupees", "1200 dollars"
    NumberWithCurrencyWord,
    /// 16 digits in groups of four
    CardNumber,
    /// Indian PAN: five letters, four digits, one letter
    Pan,
    /// 12 digits in groups of four (Aadhaar-style)
    NationalId,
    /// `ddd-dd-dddd`
    Ssn,
    /// "<number> marks/grade/percent/score/result"
    ScoreWord,
    /// "price: 500", "fee 20"
    MoneyLabel,
    /// "gold 10", "diamond: 2"
    PreciousMetal,
}

impl PatternFamily {
    /// Families that only detect phrasing, never redacted by the masker
    pub const QA: [PatternFamily; 2] = [Self::QaQuestionTag, Self::QaPhrase];

    /// Structural families checked by the classifier after keywords
    pub const STRUCTURAL: [PatternFamily; 11] = [
        Self::Email,
        Self::PhoneBare,
        Self::PhoneSeparated,
        Self::PhoneIndia,
        Self::CurrencyAmount,
        Self::LongDigitRun,
        Self::NumberWithCurrencyWord,
        Self::CardNumber,
        Self::Pan,
        Self::NationalId,
        Self::Ssn,
    ];

    /// Heuristics the masker redacts but the classifier ignores
    pub const MASK_ONLY: [PatternFamily; 3] =
        [Self::ScoreWord, Self::MoneyLabel, Self::PreciousMetal];

    /// Stable rule name used in logs and detections
    pub fn name(self) -> &'static str {
        match self {
            Self::QaQuestionTag => "qa_question_tag",
            Self::QaPhrase => "qa_phrase",
            Self::Email => "email",
            Self::PhoneIndia => "phone_india",
            Self::PhoneSeparated => "phone_separated",
            Self::PhoneBare => "phone_bare",
            Self::CurrencyAmount => "currency_amount",
            Self::LongDigitRun => "long_digit_run",
            Self::NumberWithCurrencyWord => "number_with_currency_word",
            Self::CardNumber => "card_number",
            Self::Pan => "pan",
            Self::NationalId => "national_id",
            Self::Ssn => "ssn",
            Self::ScoreWord => "score_word",
            Self::MoneyLabel => "money_label",
            Self::PreciousMetal => "precious_metal",
        }
    }

    /// Regex source for this family
    pub fn pattern(self) -> &'static str {
        match self {
            Self::QaQuestionTag => r"(?i)\bq[0-9]+\b",
            Self::QaPhrase => {
                r"(?i)\b(?:question|answer|solution|what\s+is|explain|how\s+to|tell\s+me)\b"
            }
            Self::Email => r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b",
            Self::PhoneIndia => r"\+91[\s-]*[0-9]{10}\b",
            Self::PhoneSeparated => r"\b[0-9]{3}[-.\s][0-9]{3}[-.\s][0-9]{4}\b",
            Self::PhoneBare => r"\b[0-9]{10}\b",
            Self::CurrencyAmount => {
                r"[₹$€£]\s*(?:[0-9]{1,3}(?:,[0-9]{2,3})+|[0-9]{2,})(?:\.[0-9]+)?"
            }
            Self::LongDigitRun => r"\b[0-9]{4,}\b",
            Self::NumberWithCurrencyWord => {
                r"(?i)\b[0-9]{3,}\s*(?:rupees?|dollars?|euros?|pounds?)\b"
            }
            Self::CardNumber => r"\b[0-9]{4}[\s-]?[0-9]{4}[\s-]?[0-9]{4}[\s-]?[0-9]{4}\b",
            Self::Pan => r"\b[A-Z]{5}[0-9]{4}[A-Z]\b",
            Self::NationalId => r"\b[0-9]{4}[\s-]?[0-9]{4}[\s-]?[0-9]{4}\b",
            Self::Ssn => r"\b[0-9]{3}-[0-9]{2}-[0-9]{4}\b",
            Self::ScoreWord => r"(?i)\b[0-9]+\s*(?:marks?|grade|percent|score|result)\b",
            Self::MoneyLabel => r"(?i)\b(?:money|amount|price|cost|fee|charge)\s*:?\s*[0-9]+",
            Self::PreciousMetal => r"(?i)\b(?:gold|silver|diamond)\s*:?\s*[0-9]+",
        }
    }

    /// Compiled regex for this family
    pub fn regex(self) -> &'static Regex {
        &COMPILED[self as usize]
    }
}

impl std::fmt::Display for PatternFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// Indexed by discriminant; order must follow the enum declaration.
static COMPILED: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        PatternFamily::QaQuestionTag,
        PatternFamily::QaPhrase,
        PatternFamily::Email,
        PatternFamily::PhoneIndia,
        PatternFamily::PhoneSeparated,
        PatternFamily::PhoneBare,
        PatternFamily::CurrencyAmount,
        PatternFamily::LongDigitRun,
        PatternFamily::NumberWithCurrencyWord,
        PatternFamily::CardNumber,
        PatternFamily::Pan,
        PatternFamily::NationalId,
        PatternFamily::Ssn,
        PatternFamily::ScoreWord,
        PatternFamily::MoneyLabel,
        PatternFamily::PreciousMetal,
    ]
    .into_iter()
    .map(|family| Regex::new(family.pattern()).expect("hardcoded regex must compile"))
    .collect()
});
