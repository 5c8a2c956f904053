//! In-memory TF-IDF index over knowledge entries.
//!
//! Three vector spaces are built over the same entries: question text, answer
//! text and question+answer. A query is scored against each by cosine
//! similarity and the spaces are blended into one lexical score in [0, 100].

use crate::text;
use crate::types::KnowledgeEntry;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

/// Blend weights for the question, combined and answer spaces.
const QUESTION_WEIGHT: f64 = 0.5;
const COMBINED_WEIGHT: f64 = 0.3;
const ANSWER_WEIGHT: f64 = 0.2;

/// Terms present in more than this share of entries are dropped.
const MAX_DF: f64 = 0.95;

/// Document-frequency pruning only applies from this corpus size on.
const MIN_ENTRIES_FOR_PRUNING: usize = 10;

/// A scored entry returned by [`KnowledgeIndex::query`].
#[derive(Debug, Clone)]
pub struct LexicalHit {
    pub entry: Arc<KnowledgeEntry>,

    /// Lexical similarity, 0-100
    pub score: f64,
}

/// One TF-IDF vector space: idf weights plus L2-normalized postings.
#[derive(Debug, Default)]
struct VectorSpace {
    idf: HashMap<String, f64>,
    postings: HashMap<String, Vec<(usize, f64)>>,
}

impl VectorSpace {
    fn build(documents: &[Vec<String>]) -> Self {
        let n = documents.len();
        let counts: Vec<BTreeMap<&str, f64>> = documents
            .iter()
            .map(|terms| {
                let mut tf = BTreeMap::new();
                for term in terms {
                    *tf.entry(term.as_str()).or_insert(0.0) += 1.0;
                }
                tf
            })
            .collect();

        let mut df: BTreeMap<&str, usize> = BTreeMap::new();
        for tf in &counts {
            for term in tf.keys() {
                *df.entry(*term).or_insert(0) += 1;
            }
        }

        let prune = n >= MIN_ENTRIES_FOR_PRUNING;
        let idf: HashMap<String, f64> = df
            .iter()
            .filter(|(_, count)| !prune || (**count as f64 / n as f64) <= MAX_DF)
            .map(|(term, &count)| {
                let weight = ((1.0 + n as f64) / (1.0 + count as f64)).ln() + 1.0;
                (term.to_string(), weight)
            })
            .collect();

        let mut postings: HashMap<String, Vec<(usize, f64)>> = HashMap::new();
        for (doc, tf) in counts.iter().enumerate() {
            let weights: Vec<(&str, f64)> = tf
                .iter()
                .filter_map(|(term, &freq)| idf.get(*term).map(|w| (*term, freq * w)))
                .collect();

            let norm = weights.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
            if norm == 0.0 {
                continue;
            }

            for (term, weight) in weights {
                postings
                    .entry(term.to_string())
                    .or_default()
                    .push((doc, weight / norm));
            }
        }

        Self { idf, postings }
    }

    /// Cosine similarity of the query against every document, in [0, 1].
    fn score(&self, query_terms: &[String], scores: &mut [f64], weight: f64) {
        let mut tf: BTreeMap<&str, f64> = BTreeMap::new();
        for term in query_terms {
            if self.idf.contains_key(term) {
                *tf.entry(term.as_str()).or_insert(0.0) += 1.0;
            }
        }

        let weights: Vec<(&str, f64)> = tf
            .iter()
            .map(|(term, freq)| (*term, freq * self.idf[*term]))
            .collect();
        let norm = weights.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
        if norm == 0.0 {
            return;
        }

        for (term, q_weight) in weights {
            if let Some(list) = self.postings.get(term) {
                for &(doc, d_weight) in list {
                    scores[doc] += weight * (q_weight / norm) * d_weight;
                }
            }
        }
    }

    fn vocabulary_size(&self) -> usize {
        self.idf.len()
    }
}

/// Immutable lexical index, built once per knowledge-base load.
#[derive(Debug)]
pub struct KnowledgeIndex {
    entries: Vec<Arc<KnowledgeEntry>>,
    abbreviations: BTreeMap<String, String>,
    questions: VectorSpace,
    answers: VectorSpace,
    combined: VectorSpace,
}

impl KnowledgeIndex {
    /// Build the index. An empty corpus yields an index that matches nothing.
    pub fn build(entries: Vec<KnowledgeEntry>, abbreviations: BTreeMap<String, String>) -> Self {
        let extract = |s: &str| text::terms(&text::normalize(s, &abbreviations));

        let question_docs: Vec<Vec<String>> =
            entries.iter().map(|e| extract(&e.question_text)).collect();
        let answer_docs: Vec<Vec<String>> =
            entries.iter().map(|e| extract(&e.answer_text)).collect();
        let combined_docs: Vec<Vec<String>> = entries
            .iter()
            .map(|e| extract(&format!("{} {}", e.question_text, e.answer_text)))
            .collect();

        let index = Self {
            questions: VectorSpace::build(&question_docs),
            answers: VectorSpace::build(&answer_docs),
            combined: VectorSpace::build(&combined_docs),
            entries: entries.into_iter().map(Arc::new).collect(),
            abbreviations,
        };

        tracing::debug!(
            "Built knowledge index: {} entries, {} terms",
            index.entries.len(),
            index.combined.vocabulary_size()
        );

        index
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[Arc<KnowledgeEntry>] {
        &self.entries
    }

    pub fn abbreviations(&self) -> &BTreeMap<String, String> {
        &self.abbreviations
    }

    /// Terms in the combined question+answer space.
    pub fn vocabulary_size(&self) -> usize {
        self.combined.vocabulary_size()
    }

    /// Rank entries by lexical similarity to `query`.
    ///
    /// Only entries with a positive score are returned, best first; equal
    /// scores keep corpus order. Terms absent from the corpus are ignored.
    pub fn query(&self, query: &str, top_k: usize) -> Vec<LexicalHit> {
        if self.entries.is_empty() || top_k == 0 {
            return Vec::new();
        }

        let terms = text::terms(&text::normalize(query, &self.abbreviations));
        if terms.is_empty() {
            return Vec::new();
        }

        let mut scores = vec![0.0; self.entries.len()];
        self.questions.score(&terms, &mut scores, QUESTION_WEIGHT);
        self.combined.score(&terms, &mut scores, COMBINED_WEIGHT);
        self.answers.score(&terms, &mut scores, ANSWER_WEIGHT);

        let mut ranked: Vec<(usize, f64)> = scores
            .into_iter()
            .enumerate()
            .filter(|(_, s)| *s > 0.0)
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        ranked.truncate(top_k);

        ranked
            .into_iter()
            .map(|(doc, score)| LexicalHit {
                entry: Arc::clone(&self.entries[doc]),
                score: (score * 100.0).clamp(0.0, 100.0),
            })
            .collect()
    }

    /// Distinct `(document, section)` pairs.
    pub fn sections_count(&self) -> usize {
        self.entries
            .iter()
            .map(|e| (e.source_document.as_str(), e.section.as_str()))
            .collect::<BTreeSet<_>>()
            .len()
    }

    /// Entry count per source document.
    pub fn document_counts(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for entry in &self.entries {
            *counts.entry(entry.source_document.clone()).or_insert(0) += 1;
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

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

    fn abbreviations() -> BTreeMap<String, String> {
        let mut map = BTreeMap::new();
        map.insert("kyc".to_string(), "know your customer".to_string());
        map
    }

    fn corpus() -> KnowledgeIndex {
        KnowledgeIndex::build(
            vec![
                entry(0, "Describe your KYC process", "Identity documents are verified at onboarding."),
                entry(1, "Do you encrypt data at rest?", "All data is encrypted with AES-256."),
                entry(2, "Where is the platform hosted?", "On AWS in two availability zones."),
            ],
            abbreviations(),
        )
    }

    #[test]
    fn test_query_ranks_relevant_entry_first() {
        let index = corpus();
        let hits = index.query("How is data encrypted at rest?", 3);

        assert!(!hits.is_empty());
        assert_eq!(hits[0].entry.id, 1);
        assert!(hits[0].score > 0.0 && hits[0].score <= 100.0);
    }

    #[test]
    fn test_abbreviation_expansion_matches_long_form() {
        let index = corpus();
        let hits = index.query("What is your know your customer procedure?", 3);
        assert_eq!(hits[0].entry.id, 0);
    }

    #[test]
    fn test_identical_question_scores_high() {
        let index = corpus();
        let hits = index.query("Where is the platform hosted?", 1);
        assert_eq!(hits.len(), 1);
        assert!(hits[0].score >= 50.0, "score was {}", hits[0].score);
    }

    #[test]
    fn test_unknown_terms_and_empty_query() {
        let index = corpus();
        assert!(index.query("zebra giraffe", 3).is_empty());
        assert!(index.query("", 3).is_empty());
        assert!(index.query("the and of", 3).is_empty());
    }

    #[test]
    fn test_empty_corpus() {
        let index = KnowledgeIndex::build(Vec::new(), BTreeMap::new());
        assert!(index.is_empty());
        assert!(index.query("anything at all", 3).is_empty());
        assert_eq!(index.vocabulary_size(), 0);
    }

    #[test]
    fn test_ties_break_by_insertion_order() {
        let index = KnowledgeIndex::build(
            vec![
                entry(0, "Backup frequency", "Nightly backups."),
                entry(1, "Backup frequency", "Nightly backups."),
            ],
            BTreeMap::new(),
        );

        let hits = index.query("backup frequency", 2);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].score, hits[1].score);
        assert_eq!(hits[0].entry.id, 0);
        assert_eq!(hits[1].entry.id, 1);
    }

    #[test]
    fn test_stats_helpers() {
        let index = corpus();
        assert_eq!(index.len(), 3);
        assert_eq!(index.sections_count(), 1);
        assert_eq!(index.document_counts()["DDQ"], 3);
        assert!(index.vocabulary_size() > 0);
    }
}
