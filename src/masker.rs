//! Display-safe masking of sensitive spans
//!
//! Masking runs a fixed, ordered list of replacements over the text. Every
//! pass writes [`MASK_MARKER`], which contains no letters or digits, so a
//! later pass can never match inside an earlier redaction and re-running
//! the masker on its own output with the same keyword set is a no-op.

use crate::corpus::{PatternFamily, MASK_MARKER};
use crate::keywords::KeywordSet;

/// Structural passes applied before keywords, in order
const STRUCTURAL_PASSES: [PatternFamily; 11] = [
    PatternFamily::Email,
    // +91 first so the prefix is consumed with the number
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
];


/// Mask `text` against a prepared keyword set
pub fn mask_with(text: &str, keywords: &KeywordSet) -> String {
    let mut masked = text.to_string();

    for family in STRUCTURAL_PASSES {
        masked = replace(masked, family);
    }

    if keywords.is_match(&masked) {
        masked = keywords.replace_all(&masked, MASK_MARKER).into_owned();
    }

    // mask-only heuristics
    for family in PatternFamily::MASK_ONLY {
        masked = replace(masked, family);
    }

    masked
}

/// Mask `text` against the built-in corpus plus `custom_keywords`
pub fn mask<S: AsRef<str>>(text: &str, custom_keywords: &[S]) -> String {
    mask_with(text, &KeywordSet::with_custom(custom_keywords))
}

fn replace(text: String, family: PatternFamily) -> String {
    let regex = family.regex();
    if !regex.is_match(&text) {
        return text;
    }
    regex.replace_all(&text, MASK_MARKER).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::classify;
    use proptest::prelude::*;

    fn none() -> &'static [&'static str] {
        &[]
    }

    #[test]
    fn test_keyword_masked_alphanumeric_kept() {
        assert_eq!(mask("My password is abc123", none()), "My *** is abc123");
    }

    #[test]
    fn test_phone_masked() {
        assert_eq!(mask("Call me at 9876543210", none()), "Call me at ***");
        assert_eq!(mask("ring 555.123.4567 now", none()), "ring *** now");
        assert_eq!(mask("dial +91 9876543210", none()), "dial ***");
    }

    #[test]
    fn test_plain_text_unchanged() {
        let text = "Normal message without sensitive data";
        assert_eq!(mask(text, none()), text);
        assert_eq!(mask("", none()), "");
    }

    #[test]
    fn test_email_masked_before_keywords() {
        assert_eq!(mask("write to bank@example.com", none()), "write to ***");
    }

    #[test]
    fn test_amounts_masked() {
        assert_eq!(mask("it was $1,250.00 total", none()), "it was *** total");
        assert_eq!(mask("send 750 rupees", none()), "send ***");
        assert_eq!(mask("pin 4821", none()), "*** ***");
    }

    #[test]
    fn test_pan_masked() {
        assert_eq!(mask("ABCDE1234F is mine", none()), "*** is mine");
    }

    #[test]
    fn test_heuristic_passes() {
        assert_eq!(mask("scored 95 percent", none()), "scored ***");
        assert_eq!(mask("got 88 score", none()), "got ***");
    }

    #[test]
    fn test_non_ascii_digits_left_alone() {
        assert_eq!(mask("room ٤٥٦٧ today", none()), "room ٤٥٦٧ today");
        assert_eq!(mask("room 4567 today", none()), "room *** today");
    }

    #[test]
    fn test_keyword_after_numbers() {
        // "marks" goes in the keyword pass, leaving the short number
        assert_eq!(mask("I got 95 marks", none()), "I got 95 ***");
    }

    #[test]
    fn test_custom_keywords_masked() {
        assert_eq!(mask("Falcon lands at dawn", &["falcon"]), "*** lands at dawn");
        assert_eq!(mask("Falcon lands at dawn", none()), "Falcon lands at dawn");
    }

    #[test]
    fn test_idempotent_on_examples() {
        for text in [
            "My password is abc123",
            "card 4111 1111 1111 1111 and ssn 123-45-6789",
            "mail me: a.b@c.io or +91 98765 43210",
            "price: 500 and gold 10",
        ] {
            let once = mask(text, none());
            assert_eq!(mask(&once, none()), once, "{text}");
        }
    }

    fn message() -> impl Strategy<Value = String> {
        let token = prop::sample::select(vec![
            "hello", "see", "you", "tomorrow", "cash", "cashier", "Bank", "account",
            "password", "abc123", "12", "345", "2024", "9876543210", "555-123-4567",
            "+91", "$", "₹45", "rupees", "marks", "percent", "price:", "gold", "x@y.io",
            "ABCDE1234F", "123-45-6789", "falcon", "q2", "what", "is",
        ]);
        prop::collection::vec(token, 0..12).prop_map(|tokens| tokens.join(" "))
    }

    proptest! {
        #[test]
        fn prop_mask_is_idempotent(text in message()) {
            let kws = KeywordSet::with_custom(["falcon"]);
            let once = mask_with(&text, &kws);
            prop_assert_eq!(mask_with(&once, &kws), once);
        }

        #[test]
        fn prop_masking_implies_sensitive(text in message()) {
            let kws = KeywordSet::with_custom(["falcon"]);
            let heuristic = PatternFamily::MASK_ONLY
                .into_iter()
                .any(|family| family.regex().is_match(&text));
            if mask_with(&text, &kws) != text && !heuristic {
                prop_assert!(classify(&text, &kws));
            }
        }

        #[test]
        fn prop_keyword_hit_is_masked(text in message()) {
            let kws = KeywordSet::with_custom(["falcon"]);
            if kws.is_match(&text) {
                prop_assert_ne!(mask_with(&text, &kws), text);
            }
        }
    }
}
