//! Deterministic target-column ordering for consolidation.
//!
//! The planner merges three naming regimes into one ordering: provenance
//! columns stay in front, names known to the reference schema keep its order,
//! enumerated question columns (`P1`, `P10_2`, ...) sort numerically and
//! splice in at the first question position of the reference, and anything
//! unknown goes to the tail alphabetically so it never reorders known fields.
//! The output is a pure function of the *set* of discovered names.

use std::{collections::HashSet, sync::OnceLock};

use regex::Regex;

use crate::{schema::ReferenceSchema, segment::PROVENANCE_COLUMNS};

/// One element of a natural sort key. Numbers order before text so that
/// comparing keys of different shapes stays total and never panics.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum KeySegment {
    Number(u64),
    Text(String),
}

/// Splits a trimmed column name into alternating text and number segments:
/// `"P10_2"` becomes `[Text("P"), Number(10), Text("_"), Number(2)]`.
/// Comparing these keys yields numeric order (`P2` before `P10`) instead of
/// the lexicographic order plain string comparison would give.
pub fn natural_sort_key(name: &str) -> Vec<KeySegment> {
    let mut key = Vec::new();
    let mut buffer = String::new();
    let mut in_digits = false;
    for ch in name.trim().chars() {
        if !buffer.is_empty() && ch.is_ascii_digit() != in_digits {
            key.push(flush_segment(&mut buffer, in_digits));
        }
        in_digits = ch.is_ascii_digit();
        buffer.push(ch);
    }
    if !buffer.is_empty() {
        key.push(flush_segment(&mut buffer, in_digits));
    }
    key
}

fn flush_segment(buffer: &mut String, in_digits: bool) -> KeySegment {
    let text = std::mem::take(buffer);
    if in_digits {
        match text.parse::<u64>() {
            Ok(value) => KeySegment::Number(value),
            // Digit runs too long for u64 still need a stable position.
            Err(_) => KeySegment::Text(text),
        }
    } else {
        KeySegment::Text(text)
    }
}

static QUESTION_PATTERN: OnceLock<Regex> = OnceLock::new();

/// Whether a name follows the enumerated question convention (`P<number>`,
/// optionally with sub-numbers). The match is case-sensitive: a lowercase
/// `p1` is classified as an unexpected column, not a question.
pub fn is_question_column(name: &str) -> bool {
    QUESTION_PATTERN
        .get_or_init(|| Regex::new(r"^P\d+").expect("question column pattern"))
        .is_match(name.trim())
}

/// Computes the target column order for one consolidation run.
///
/// The result is a permutation of exactly the discovered set: provenance
/// columns first in their fixed order, then reference-schema names in
/// template order with the naturally sorted question block spliced in at the
/// first question position, then unexpected names alphabetically.
pub fn plan_column_order(discovered: &HashSet<String>, reference: &ReferenceSchema) -> Vec<String> {
    let mut plan: Vec<String> = Vec::with_capacity(discovered.len());

    for name in PROVENANCE_COLUMNS {
        if discovered.contains(name) {
            plan.push(name.to_string());
        }
    }

    let mut question_columns: Vec<&String> = discovered
        .iter()
        .filter(|name| is_question_column(name))
        .collect();
    // Secondary key keeps ties deterministic regardless of set iteration order.
    question_columns.sort_by_cached_key(|name| (natural_sort_key(name), (*name).clone()));

    let mut questions_spliced = false;
    for name in &reference.columns {
        if is_question_column(name) {
            if !questions_spliced && !question_columns.is_empty() {
                plan.extend(question_columns.iter().map(|name| (*name).clone()));
                questions_spliced = true;
            }
        } else if discovered.contains(name) && !PROVENANCE_COLUMNS.contains(&name.as_str()) {
            plan.push(name.clone());
        }
    }
    // A reference without question entries still has to place discovered ones.
    if !questions_spliced && !question_columns.is_empty() {
        plan.extend(question_columns.iter().map(|name| (*name).clone()));
    }

    let reference_names: HashSet<&str> = reference.columns.iter().map(String::as_str).collect();
    let mut unexpected: Vec<&String> = discovered
        .iter()
        .filter(|name| {
            !PROVENANCE_COLUMNS.contains(&name.as_str())
                && !reference_names.contains(name.as_str())
                && !is_question_column(name)
        })
        .collect();
    unexpected.sort();
    plan.extend(unexpected.iter().map(|name| (*name).clone()));

    // Defensive: inputs should already be unique, first occurrence wins.
    let mut seen = HashSet::new();
    plan.retain(|name| seen.insert(name.clone()));
    plan
}
