// src/highlight/patterns.rs
//! Recognizer rules for the highlighting pass: one compiled regex per
//! category, applied in a fixed priority order. The sender-name rule is the
//! only per-mail one; it is built from the first token of the sender's
//! display name and compiled once per pass.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Category a recognized span is tagged with.
///
/// Enum order is the priority order: an earlier category wins when two
/// rules could match the same span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternCategory {
    Contact,
    Phone,
    Date,
    Price,
    SenderName,
}

/// Fixed application order for the whole pattern library.
pub const PRIORITY: [PatternCategory; 5] = [
    PatternCategory::Contact,
    PatternCategory::Phone,
    PatternCategory::Date,
    PatternCategory::Price,
    PatternCategory::SenderName,
];

static RE_CONTACT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}").expect("contact regex")
});

// French numbers: +33 / 0033 / 0 prefix, then 1-9 and four groups of two digits.
static RE_PHONE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:(?:\+|00)33|0)\s*[1-9](?:[\s.-]*\d{2}){4}").expect("phone regex"));

// Two alternatives: "mardi 12 mars 2025"-style written dates, and numeric
// "12/03" or "12-03-2025" forms. The weekday prefix consumes its trailing
// space only together with the weekday, so a bare "5 mars" never drags the
// preceding separator into the tagged span.
static RE_DATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?:(?:lundi|mardi|mercredi|jeudi|vendredi|samedi|dimanche)\s)?\d{1,2}\s(?:janvier|février|mars|avril|mai|juin|juillet|août|septembre|octobre|novembre|décembre)(?:\s\d{4})?\b|\b\d{1,2}[-/]\d{1,2}(?:[-/]\d{2,4})?\b",
    )
    .expect("date regex")
});

static RE_PRICE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\d+(?:[.,]\d+)?\s?(?:€|eur|euros?)").expect("price regex"));

/// One recognizer rule.
#[derive(Debug, Clone)]
pub struct Pattern {
    pub category: PatternCategory,
    pub regex: Regex,
}

/// The ordered rule library for one highlighting pass.
///
/// The first four rules are static; the sender-name rule is derived from
/// `reference_name` (first whitespace-delimited token, matched literally,
/// case-insensitively, word-bounded).
#[derive(Debug, Clone)]
pub struct PatternSet {
    patterns: Vec<Pattern>,
}

impl PatternSet {
    pub fn for_sender(reference_name: &str) -> Self {
        let mut patterns = vec![
            Pattern {
                category: PatternCategory::Contact,
                regex: RE_CONTACT.clone(),
            },
            Pattern {
                category: PatternCategory::Phone,
                regex: RE_PHONE.clone(),
            },
            Pattern {
                category: PatternCategory::Date,
                regex: RE_DATE.clone(),
            },
            Pattern {
                category: PatternCategory::Price,
                regex: RE_PRICE.clone(),
            },
        ];
        if let Some(re) = sender_name_regex(reference_name) {
            patterns.push(Pattern {
                category: PatternCategory::SenderName,
                regex: re,
            });
        }
        Self { patterns }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Pattern> {
        self.patterns.iter()
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

/// Build the sender-name rule. Returns `None` when the reference name has no
/// usable first token; a zero-width rule would otherwise match everywhere.
fn sender_name_regex(reference_name: &str) -> Option<Regex> {
    let first = reference_name.split_whitespace().next()?;
    let escaped = regex::escape(first);
    Regex::new(&format!(r"(?i)\b{escaped}\b")).ok()
}
