//! Code matcher: classifies one ICD-10-CM code against an ordered list of
//! reference codes.
//!
//! ICD-10-CM encodes specificity in trailing characters, so "same category,
//! different specificity" is approximated with string heuristics only:
//!
//! 1. empty candidate or empty reference list → `Mismatch`
//! 2. exact equality with any reference → `Match`
//! 3. first reference (in given order) where both codes are longer than one
//!    character and either
//!    a. they agree after dropping the final character of each, or
//!    b. one is a prefix of the other
//!    → `SpecificityIssue`
//! 4. otherwise → `Mismatch`
//!
//! Reference order matters: only the first qualifying reference is reported.

use crate::model::MatchKind;

/// Classification plus the reference code that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchOutcome<'a> {
    pub kind: MatchKind,
    pub reference: Option<&'a str>,
}

const MISMATCH: MatchOutcome<'static> = MatchOutcome {
    kind: MatchKind::Mismatch,
    reference: None,
};

/// Classify `candidate` against `references` and report the deciding reference.
pub fn match_code<'a, R: AsRef<str>>(candidate: &str, references: &'a [R]) -> MatchOutcome<'a> {
    if candidate.is_empty() || references.is_empty() {
        return MISMATCH;
    }

    if let Some(r) = codes(references).find(|r| *r == candidate) {
        return MatchOutcome {
            kind: MatchKind::Match,
            reference: Some(r),
        };
    }

    match codes(references).find(|r| is_specificity_pair(candidate, r)) {
        Some(r) => MatchOutcome {
            kind: MatchKind::SpecificityIssue,
            reference: Some(r),
        },
        None => MISMATCH,
    }
}

pub fn classify<R: AsRef<str>>(candidate: &str, references: &[R]) -> MatchKind {
    match_code(candidate, references).kind
}

pub fn best_reference<'a, R: AsRef<str>>(candidate: &str, references: &'a [R]) -> Option<&'a str> {
    match_code(candidate, references).reference
}

/// Every reference that would qualify as a specificity issue, in order.
///
/// Empty when `candidate` matches a reference exactly.
pub fn specificity_candidates<'a, R: AsRef<str>>(candidate: &str, references: &'a [R]) -> Vec<&'a str> {
    if candidate.is_empty() || codes(references).any(|r| r == candidate) {
        return Vec::new();
    }
    codes(references)
        .filter(|r| is_specificity_pair(candidate, r))
        .collect()
}

fn codes<R: AsRef<str>>(references: &[R]) -> impl Iterator<Item = &str> {
    references.iter().map(|r| r.as_ref())
}

/// Same category, different specificity. Codes of one character never qualify.
fn is_specificity_pair(candidate: &str, reference: &str) -> bool {
    if candidate.chars().count() <= 1 || reference.chars().count() <= 1 {
        return false;
    }
    drop_last_char(candidate) == drop_last_char(reference)
        || candidate.starts_with(reference)
        || reference.starts_with(candidate)
}

fn drop_last_char(code: &str) -> &str {
    match code.char_indices().next_back() {
        Some((idx, _)) => &code[..idx],
        None => code,
    }
}
