//! Text normalization shared by the index, matcher, scorer and grounding check.

use std::collections::{BTreeMap, HashSet};

/// English stop words dropped before term extraction.
const STOP_WORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "all", "am", "an", "and", "any", "are",
    "as", "at", "be", "because", "been", "before", "being", "below", "between", "both", "but",
    "by", "can", "could", "did", "do", "does", "doing", "down", "during", "each", "few", "for",
    "from", "further", "had", "has", "have", "having", "he", "her", "here", "hers", "herself",
    "him", "himself", "his", "how", "i", "if", "in", "into", "is", "it", "its", "itself", "just",
    "me", "more", "most", "my", "myself", "no", "nor", "not", "now", "of", "off", "on", "once",
    "only", "or", "other", "our", "ours", "ourselves", "out", "over", "own", "please", "same",
    "she", "should", "so", "some", "such", "than", "that", "the", "their", "theirs", "them",
    "themselves", "then", "there", "these", "they", "this", "those", "through", "to", "too",
    "under", "until", "up", "very", "was", "we", "were", "what", "when", "where", "which",
    "while", "who", "whom", "why", "will", "with", "would", "you", "your", "yours", "yourself",
    "yourselves",
];

/// Check whether a lowercase token is a stop word.
pub fn is_stop_word(token: &str) -> bool {
    STOP_WORDS.contains(&token)
}

/// Split text into lowercase alphanumeric tokens.
///
/// Every character that is not alphanumeric acts as a separator.
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Tokenize and expand abbreviations in place.
///
/// The abbreviation itself is kept and its expansion tokens follow it, so
/// `kyc` becomes `kyc know your customer`.
pub fn normalize(text: &str, abbreviations: &BTreeMap<String, String>) -> Vec<String> {
    let mut out = Vec::new();
    for token in tokenize(text) {
        let expansion = abbreviations.get(&token).map(|e| tokenize(e));
        out.push(token);
        if let Some(expansion) = expansion {
            out.extend(expansion);
        }
    }
    out
}

/// Extract index terms: stop-word-free unigrams followed by adjacent bigrams.
pub fn terms(tokens: &[String]) -> Vec<String> {
    let content: Vec<&str> = tokens
        .iter()
        .map(String::as_str)
        .filter(|t| !is_stop_word(t))
        .collect();

    let mut out: Vec<String> = content.iter().map(|t| t.to_string()).collect();
    out.extend(content.windows(2).map(|pair| format!("{} {}", pair[0], pair[1])));
    out
}

/// Distinct content tokens (no stop words) of a text.
pub fn content_tokens(text: &str) -> HashSet<String> {
    tokenize(text)
        .into_iter()
        .filter(|t| !is_stop_word(t))
        .collect()
}

/// Whole-word, case-insensitive containment check.
///
/// `term` may span several words (`disaster recovery`) or contain punctuation
/// (`ci/cd`). A match must not be preceded or followed by an alphanumeric
/// character, so `api` does not match `capital`.
pub fn contains_term(haystack: &str, term: &str) -> bool {
    let haystack = haystack.to_lowercase();
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return false;
    }

    let mut start = 0;
    while let Some(offset) = haystack[start..].find(&term) {
        let begin = start + offset;
        let end = begin + term.len();

        let before_ok = haystack[..begin]
            .chars()
            .next_back()
            .map_or(true, |c| !c.is_alphanumeric());
        let after_ok = haystack[end..]
            .chars()
            .next()
            .map_or(true, |c| !c.is_alphanumeric());

        if before_ok && after_ok {
            return true;
        }

        // Advance past the first char of this occurrence.
        start = begin
            + haystack[begin..]
                .chars()
                .next()
                .map_or(1, char::len_utf8);
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn abbreviations() -> BTreeMap<String, String> {
        let mut map = BTreeMap::new();
        map.insert("kyc".to_string(), "know your customer".to_string());
        map
    }

    #[test]
    fn test_tokenize_splits_on_punctuation() {
        assert_eq!(
            tokenize("CI/CD pipeline, (SSO)!"),
            vec!["ci", "cd", "pipeline", "sso"]
        );
    }

    #[test]
    fn test_normalize_expands_abbreviations() {
        let tokens = normalize("Describe your KYC process", &abbreviations());
        assert_eq!(
            tokens,
            vec!["describe", "your", "kyc", "know", "your", "customer", "process"]
        );
    }

    #[test]
    fn test_terms_drop_stop_words_and_add_bigrams() {
        let tokens = tokenize("What is the settlement cycle");
        assert_eq!(
            terms(&tokens),
            vec!["settlement", "cycle", "settlement cycle"]
        );
    }

    #[test]
    fn test_contains_term_whole_word() {
        assert!(contains_term("We expose a REST API.", "api"));
        assert!(!contains_term("Our capital requirements", "api"));
        assert!(contains_term("Full disaster recovery plan", "disaster recovery"));
        assert!(contains_term("Our CI/CD runs nightly", "ci/cd"));
        assert!(!contains_term("anything", ""));
    }

    #[test]
    fn test_contains_term_finds_later_occurrence() {
        assert!(contains_term("rapid api", "api"));
    }
}
