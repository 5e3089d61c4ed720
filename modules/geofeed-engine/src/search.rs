//! Multi-strategy fuzzy text matching for timeline filtering.
//!
//! A record matches when any one of four strategies succeeds. Strategies are
//! evaluated cheapest first and short-circuit, which changes nothing about
//! the any-succeeds semantics.

use geofeed_common::Message;
use strsim::levenshtein;

/// Words must be longer than this to qualify for prefix matching.
const PREFIX_MIN_LEN: usize = 2;
/// Words must be longer than this to qualify for edit-distance matching.
const FUZZY_MIN_LEN: usize = 3;
const FUZZY_MIN_SIMILARITY: f64 = 0.8;
/// Candidate tokens whose length differs from the query word by more than
/// this fraction of the word's length are skipped before the DP table.
const FUZZY_LENGTH_TOLERANCE: f64 = 0.4;

/// Lowercase, replace non-word/non-space characters with spaces, collapse
/// whitespace runs, trim.
pub fn normalize_text(text: &str) -> String {
    let lowered = text.to_lowercase();
    let replaced: String = lowered
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '_' { c } else { ' ' })
        .collect();
    replaced.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Evaluate `query` against a message. Empty queries match everything.
pub fn matches(message: &Message, query: &str) -> bool {
    let normalized = normalize_text(query);
    let words: Vec<&str> = normalized.split_whitespace().collect();
    if words.is_empty() {
        return true;
    }

    let fields = candidate_fields(message);
    if fields.is_empty() {
        return false;
    }

    disjoint_coverage(&fields, &words)
        || single_field_coverage(&fields, &words)
        || prefix_coverage(&fields, &words)
        || fuzzy_coverage(&fields, &words)
}

/// Normalized candidate fields: primary text, cleaned text, channel label,
/// and each location mention, each normalized individually.
fn candidate_fields(message: &Message) -> Vec<String> {
    let mut fields = Vec::with_capacity(3 + message.locations.len());
    fields.push(normalize_text(&message.text));
    if let Some(cleaned) = &message.cleaned_text {
        fields.push(normalize_text(cleaned));
    }
    fields.push(normalize_text(&message.channel));
    for loc in &message.locations {
        fields.push(normalize_text(loc));
    }
    fields.retain(|f| !f.is_empty());
    fields
}

/// Every query word appears as a substring in some field; fields may differ
/// per word.
fn disjoint_coverage(fields: &[String], words: &[&str]) -> bool {
    words.iter().all(|w| fields.iter().any(|f| f.contains(w)))
}

/// Some one field contains all query words as substrings.
fn single_field_coverage(fields: &[String], words: &[&str]) -> bool {
    fields.iter().any(|f| words.iter().all(|w| f.contains(w)))
}

/// Every word either prefix-matches a field token in either direction
/// (handles abbreviations and partial typing) or, for words too short to
/// qualify, appears as a plain substring. The substring fallback keeps the
/// strategy from passing vacuously on short words.
fn prefix_coverage(fields: &[String], words: &[&str]) -> bool {
    words.iter().all(|w| {
        if w.chars().count() > PREFIX_MIN_LEN {
            fields.iter().any(|f| {
                f.split_whitespace()
                    .any(|tok| tok.starts_with(w) || w.starts_with(tok))
            })
        } else {
            fields.iter().any(|f| f.contains(w))
        }
    })
}

/// Every word either approximately matches some field token (words longer
/// than `FUZZY_MIN_LEN`) or appears as a plain substring.
fn fuzzy_coverage(fields: &[String], words: &[&str]) -> bool {
    words.iter().all(|w| {
        if w.chars().count() > FUZZY_MIN_LEN {
            fields.iter().any(|f| {
                f.split_whitespace().any(|tok| fuzzy_token_match(w, tok))
            })
        } else {
            fields.iter().any(|f| f.contains(w))
        }
    })
}

fn fuzzy_token_match(word: &str, token: &str) -> bool {
    let word_len = word.chars().count();
    let token_len = token.chars().count();
    let len_diff = word_len.abs_diff(token_len) as f64;
    if len_diff > word_len as f64 * FUZZY_LENGTH_TOLERANCE {
        return false;
    }
    similarity(word, token) >= FUZZY_MIN_SIMILARITY
}

/// Normalized edit-distance similarity in [0, 1].
fn similarity(a: &str, b: &str) -> f64 {
    let max_len = a.chars().count().max(b.chars().count());
    if max_len == 0 {
        return 1.0;
    }
    (max_len - levenshtein(a, b)) as f64 / max_len as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn record(text: &str, channel: &str, locations: &[&str]) -> Message {
        Message {
            id: Uuid::new_v4(),
            text: text.to_string(),
            cleaned_text: None,
            channel: channel.to_string(),
            date: Utc::now(),
            locations: locations.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn normalize_strips_punctuation_and_collapses_whitespace() {
        assert_eq!(normalize_text("  Heavy  strikes -- near (the) port!  "), "heavy strikes near the port");
        assert_eq!(normalize_text("A/B,C"), "a b c");
        assert_eq!(normalize_text("***"), "");
    }

    #[test]
    fn empty_query_matches_everything() {
        let m = record("anything", "telegram", &[]);
        assert!(matches(&m, ""));
        assert!(matches(&m, "   "));
        assert!(matches(&m, "?!."));
    }

    #[test]
    fn substring_match_across_fields() {
        let m = record("convoy reached the crossing", "north desk", &["Rafah"]);
        // Words land in different fields: disjoint coverage.
        assert!(matches(&m, "convoy rafah"));
        assert!(matches(&m, "north crossing"));
        assert!(!matches(&m, "convoy helicopter"));
    }

    #[test]
    fn single_field_holds_all_words() {
        let m = record("water distribution at the north gate", "ops", &[]);
        assert!(matches(&m, "north gate"));
        assert!(matches(&m, "water gate"));
    }

    #[test]
    fn prefix_matches_partial_typing() {
        // "gaza" is a prefix of the location token "gaza".
        let m = record("shelling reported", "wire", &["Gaza City"]);
        assert!(matches(&m, "gaza"));
        // Field token is a prefix of the query word: abbreviation direction.
        let m = record("dist point open", "wire", &[]);
        assert!(matches(&m, "distribution"));
    }

    #[test]
    fn fuzzy_matches_typos() {
        let m = record("crowd at the north gate", "wire", &[]);
        // "nort" vs token "north": levenshtein 1, similarity 0.8.
        assert!(matches(&m, "nort gate"));
        assert!(!matches(&m, "zzzz gate"));
    }

    #[test]
    fn fuzzy_requires_minimum_word_length() {
        let m = record("big fire downtown", "wire", &[]);
        // "fir" (3 chars) is below the fuzzy cutoff but is a substring.
        assert!(matches(&m, "fir"));
        // "bik" is 3 chars, not a substring, too short for fuzzy.
        assert!(!matches(&m, "bik"));
    }

    #[test]
    fn length_prefilter_blocks_distant_tokens() {
        // "gate" (4) vs "gatehouses" (10): diff 6 > 0.4 * 4, never compared.
        assert!(!fuzzy_token_match("gate", "gatehouses"));
        // Within tolerance and one edit away.
        assert!(fuzzy_token_match("gates", "gate"));
    }

    #[test]
    fn similarity_formula() {
        // levenshtein("kitten", "sitting") == 3, max length 7.
        assert_eq!(levenshtein("kitten", "sitting"), 3);
        let s = similarity("kitten", "sitting");
        assert!((s - 4.0 / 7.0).abs() < 1e-9);
        assert_eq!(similarity("north", "north"), 1.0);
    }

    #[test]
    fn query_normalization_applies_to_query_too() {
        let m = record("convoy reached rafah", "wire", &[]);
        assert!(matches(&m, "  CONVOY!!  "));
        assert!(matches(&m, "rafah,convoy"));
    }

    #[test]
    fn cleaned_text_is_searched() {
        let mut m = record("&#1602;&#1589;&#1601;", "wire", &[]);
        m.cleaned_text = Some("shelling near the port".to_string());
        assert!(matches(&m, "shelling port"));
    }

    #[test]
    fn record_with_no_usable_fields_only_matches_empty_query() {
        let m = record("", "", &[]);
        assert!(matches(&m, ""));
        assert!(!matches(&m, "anything"));
    }
}
