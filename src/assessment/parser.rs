//! Type-directed parsing of free-form chat answers.
//!
//! The parser never fails loudly: anything it cannot understand becomes
//! `None`, which callers treat as a missing value.

use std::sync::OnceLock;

use regex::Regex;

use crate::config::ParsingProfile;

use super::question::{Answer, AnswerKind};

fn number_token_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"-?\d+(?:\.\d+)?").unwrap())
}

/// Parse a raw chat message against the expected answer kind.
pub fn parse_answer(raw: &str, kind: AnswerKind, profile: ParsingProfile) -> Option<Answer> {
    match kind {
        AnswerKind::Text => Some(Answer::Text(raw.trim().to_string())),
        AnswerKind::YesNo => parse_yes_no(raw, profile).map(Answer::Bool),
        AnswerKind::Number => parse_number(raw, profile).map(Answer::Number),
    }
}

fn parse_yes_no(raw: &str, profile: ParsingProfile) -> Option<bool> {
    let lower = raw.trim().to_lowercase();
    match profile {
        ParsingProfile::Strict => match lower.as_str() {
            "yes" | "y" => Some(true),
            "no" | "n" => Some(false),
            _ => None,
        },
        // Containment match, checked in order: whole words first, then the
        // bare initials.
        ParsingProfile::Lenient => {
            if lower.contains("yes") {
                Some(true)
            } else if lower.contains("no") {
                Some(false)
            } else if lower.contains('y') {
                Some(true)
            } else if lower.contains('n') {
                Some(false)
            } else {
                None
            }
        }
    }
}

fn parse_number(raw: &str, profile: ParsingProfile) -> Option<f64> {
    let token = number_token_re().find(raw)?.as_str();
    let value: f64 = token.parse().ok()?;
    match profile {
        // Strict bounding: out-of-range values are not understood.
        ParsingProfile::Strict => (0.0..=100.0).contains(&value).then_some(value),
        // Loose parse, clamped so stored numbers stay within [0,100].
        ParsingProfile::Lenient => Some(value.clamp(0.0, 100.0)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn number(raw: &str, profile: ParsingProfile) -> Option<f64> {
        parse_answer(raw, AnswerKind::Number, profile).and_then(|a| a.as_number())
    }

    fn yes_no(raw: &str, profile: ParsingProfile) -> Option<bool> {
        parse_answer(raw, AnswerKind::YesNo, profile).and_then(|a| a.as_bool())
    }

    #[test]
    fn number_plain() {
        assert_eq!(number("85", ParsingProfile::Strict), Some(85.0));
        assert_eq!(number("85", ParsingProfile::Lenient), Some(85.0));
    }

    #[test]
    fn number_embedded_in_sentence() {
        assert_eq!(
            number("I got around 62 marks I think", ParsingProfile::Strict),
            Some(62.0)
        );
    }

    #[test]
    fn number_garbage_is_not_understood() {
        assert_eq!(number("not a number", ParsingProfile::Strict), None);
        assert_eq!(number("not a number", ParsingProfile::Lenient), None);
    }

    #[test]
    fn number_out_of_range() {
        // Strict bounding rejects; lenient clamps.
        assert_eq!(number("150", ParsingProfile::Strict), None);
        assert_eq!(number("150", ParsingProfile::Lenient), Some(100.0));
        assert_eq!(number("-5", ParsingProfile::Strict), None);
        assert_eq!(number("-5", ParsingProfile::Lenient), Some(0.0));
    }

    #[test]
    fn number_decimal() {
        assert_eq!(number("67.5", ParsingProfile::Strict), Some(67.5));
    }

    #[test]
    fn yes_no_strict_requires_whole_input() {
        assert_eq!(yes_no("yes", ParsingProfile::Strict), Some(true));
        assert_eq!(yes_no(" Y ", ParsingProfile::Strict), Some(true));
        assert_eq!(yes_no("no", ParsingProfile::Strict), Some(false));
        assert_eq!(yes_no("n", ParsingProfile::Strict), Some(false));
        assert_eq!(yes_no("yes please", ParsingProfile::Strict), None);
        assert_eq!(yes_no("maybe", ParsingProfile::Strict), None);
    }

    #[test]
    fn yes_no_lenient_matches_by_containment() {
        assert_eq!(yes_no("yes please", ParsingProfile::Lenient), Some(true));
        assert_eq!(yes_no("Yeah, yes", ParsingProfile::Lenient), Some(true));
        assert_eq!(yes_no("nope", ParsingProfile::Lenient), Some(false));
        assert_eq!(yes_no("definitely", ParsingProfile::Lenient), Some(true));
        assert_eq!(yes_no("huh?", ParsingProfile::Lenient), None);
    }

    #[test]
    fn text_is_trimmed_and_never_none() {
        let answer = parse_answer("  time management  ", AnswerKind::Text, ParsingProfile::Strict);
        assert_eq!(answer, Some(Answer::Text("time management".to_string())));

        let answer = parse_answer("", AnswerKind::Text, ParsingProfile::Lenient);
        assert_eq!(answer, Some(Answer::Text(String::new())));
    }
}
