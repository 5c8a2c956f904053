//! Concept-aware re-ranking of lexical candidates.
//!
//! The matcher pulls a wide lexical candidate pool from the index and blends
//! each candidate's lexical score with how many of the question's domain
//! keywords the entry shares.

use crate::config::Vocabulary;
use crate::index::KnowledgeIndex;
use crate::text;
use crate::types::{EvidenceCandidate, MatchResult};
use std::collections::BTreeSet;

const LEXICAL_WEIGHT: f64 = 0.7;
const CONCEPT_WEIGHT: f64 = 0.3;

/// Re-ranks index hits by domain-keyword overlap.
#[derive(Debug, Clone)]
pub struct ConceptMatcher {
    /// Domain name and its keywords
    domains: Vec<(String, Vec<String>)>,
    top_k: usize,
    candidate_pool: usize,
}

impl ConceptMatcher {
    pub fn new(vocabulary: &Vocabulary, top_k: usize, candidate_pool: usize) -> Self {
        Self {
            domains: vocabulary
                .domains
                .iter()
                .map(|(name, keywords)| (name.clone(), keywords.clone()))
                .collect(),
            top_k,
            candidate_pool: candidate_pool.max(top_k),
        }
    }

    /// Domain keywords present in `text`, deduplicated across domains.
    fn keywords_in<'a>(&'a self, haystack: &str) -> BTreeSet<&'a str> {
        self.domains
            .iter()
            .flat_map(|(_, keywords)| keywords.iter())
            .filter(|kw| text::contains_term(haystack, kw))
            .map(String::as_str)
            .collect()
    }

    /// Domains with at least one keyword present in `text`.
    pub fn concepts(&self, haystack: &str) -> Vec<String> {
        self.domains
            .iter()
            .filter(|(_, keywords)| keywords.iter().any(|kw| text::contains_term(haystack, kw)))
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// Find the best evidence for a question.
    pub fn match_question(&self, index: &KnowledgeIndex, question: &str) -> MatchResult {
        let hits = index.query(question, self.candidate_pool);
        let question_keywords = self.keywords_in(question);

        let mut candidates: Vec<EvidenceCandidate> = hits
            .into_iter()
            .map(|hit| {
                let overlap = if question_keywords.is_empty() {
                    0.0
                } else {
                    let entry_text =
                        format!("{} {}", hit.entry.question_text, hit.entry.answer_text);
                    let shared = self
                        .keywords_in(&entry_text)
                        .intersection(&question_keywords)
                        .count();
                    shared as f64 / question_keywords.len() as f64
                };

                let similarity = if question_keywords.is_empty() {
                    hit.score
                } else {
                    LEXICAL_WEIGHT * hit.score + CONCEPT_WEIGHT * overlap * 100.0
                };

                EvidenceCandidate {
                    entry: hit.entry,
                    similarity: similarity.clamp(0.0, 100.0),
                    lexical_score: hit.score,
                    concept_overlap: overlap,
                    rank: 0,
                }
            })
            .collect();

        candidates.sort_by(|a, b| {
            b.similarity
                .total_cmp(&a.similarity)
                .then(b.lexical_score.total_cmp(&a.lexical_score))
                .then(a.entry.id.cmp(&b.entry.id))
        });
        candidates.truncate(self.top_k);
        for (i, candidate) in candidates.iter_mut().enumerate() {
            candidate.rank = i + 1;
        }

        let concepts = self.concepts(question);

        tracing::debug!(
            question = %question,
            candidates = candidates.len(),
            top_similarity = candidates.first().map(|c| c.similarity),
            concepts = ?concepts,
            "Matched question"
        );

        MatchResult {
            candidates,
            concepts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::KnowledgeEntry;
    use std::collections::BTreeMap;

    fn entry(id: usize, question: &str, answer: &str) -> KnowledgeEntry {
        KnowledgeEntry {
            id,
            source_document: "DDQ".to_string(),
            section: "General".to_string(),
            row_index: id as u32 + 2,
            question_text: question.to_string(),
            answer_text: answer.to_string(),
        }
    }

    fn vocabulary() -> Vocabulary {
        let mut domains = BTreeMap::new();
        domains.insert("kyc_aml".to_string(), vec!["kyc".to_string(), "aml".to_string()]);
        domains.insert("custody".to_string(), vec!["wallet".to_string(), "custody".to_string()]);
        Vocabulary {
            domains,
            ..Vocabulary::default()
        }
    }

    #[test]
    fn test_concept_overlap_blends_into_similarity() {
        let index = KnowledgeIndex::build(
            vec![
                entry(0, "How often is the process reviewed?", "The process is reviewed yearly."),
                entry(1, "Describe KYC checks", "KYC checks run at onboarding and yearly."),
            ],
            BTreeMap::new(),
        );
        let matcher = ConceptMatcher::new(&vocabulary(), 3, 10);

        let result = matcher.match_question(&index, "How often is the KYC process reviewed?");
        assert_eq!(result.candidates.len(), 2);
        assert_eq!(result.concepts, vec!["kyc_aml"]);

        for candidate in &result.candidates {
            let expected = if candidate.entry.id == 1 {
                assert_eq!(candidate.concept_overlap, 1.0);
                0.7 * candidate.lexical_score + 30.0
            } else {
                assert_eq!(candidate.concept_overlap, 0.0);
                0.7 * candidate.lexical_score
            };
            assert!((candidate.similarity - expected).abs() < 1e-9);
        }

        assert!(result.candidates[0].similarity >= result.candidates[1].similarity);
    }

    #[test]
    fn test_no_domain_keywords_keeps_lexical_score() {
        let index = KnowledgeIndex::build(
            vec![entry(0, "Where are servers located?", "In Frankfurt and Dublin.")],
            BTreeMap::new(),
        );
        let matcher = ConceptMatcher::new(&vocabulary(), 3, 10);

        let result = matcher.match_question(&index, "Where are servers located?");
        let top = result.top().unwrap();
        assert_eq!(top.similarity, top.lexical_score);
        assert!(result.concepts.is_empty());
    }

    #[test]
    fn test_top_k_and_order() {
        let entries = (0..6)
            .map(|i| entry(i, "Wallet custody model", "Segregated wallet custody."))
            .collect();
        let index = KnowledgeIndex::build(entries, BTreeMap::new());
        let matcher = ConceptMatcher::new(&vocabulary(), 3, 10);

        let result = matcher.match_question(&index, "What is your wallet custody model?");
        assert_eq!(result.candidates.len(), 3);
        let ids: Vec<usize> = result.candidates.iter().map(|c| c.entry.id).collect();
        assert_eq!(ids, vec![0, 1, 2]);
        let ranks: Vec<usize> = result.candidates.iter().map(|c| c.rank).collect();
        assert_eq!(ranks, vec![1, 2, 3]);
    }

    #[test]
    fn test_empty_index_gives_empty_match() {
        let index = KnowledgeIndex::build(Vec::new(), BTreeMap::new());
        let matcher = ConceptMatcher::new(&vocabulary(), 3, 10);
        let result = matcher.match_question(&index, "Describe your KYC process");
        assert!(result.is_empty());
        assert_eq!(result.top_similarity(), 0.0);
    }
}
