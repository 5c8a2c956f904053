//! Detection of questions about the operator's own internal practices.
//!
//! Such questions ("what SSO does the bank use internally?") cannot be
//! answered from vendor documentation and are routed to a human.

use crate::config::InternalMatterConfig;
use crate::text;
use autofill_core::{AppError, AppResult};
use regex::Regex;

const SUBJECT_PLACEHOLDER: &str = "{subject}";

/// Heuristic internal-matter detector built from vocabulary rules.
#[derive(Debug, Clone)]
pub struct InternalMatterDetector {
    patterns: Vec<Regex>,
    subjects: Vec<String>,
    practices: Vec<String>,
    product_terms: Vec<String>,
    interrogative: Regex,
}

impl InternalMatterDetector {
    /// Compile the configured rules.
    ///
    /// Patterns containing `{subject}` are expanded once per subject.
    pub fn new(config: &InternalMatterConfig) -> AppResult<Self> {
        let mut sources = Vec::new();
        for pattern in &config.patterns {
            if pattern.contains(SUBJECT_PLACEHOLDER) {
                for subject in &config.subjects {
                    let subject = regex::escape(&subject.to_lowercase());
                    sources.push(pattern.replace(SUBJECT_PLACEHOLDER, &subject));
                }
            } else {
                sources.push(pattern.clone());
            }
        }

        let patterns = sources
            .iter()
            .map(|source| {
                Regex::new(source).map_err(|e| {
                    AppError::Config(format!("Invalid internal-matter pattern '{}': {}", source, e))
                })
            })
            .collect::<AppResult<Vec<_>>>()?;

        let interrogative = Regex::new(r"^\s*(what|which)\b")
            .map_err(|e| AppError::Config(e.to_string()))?;

        Ok(Self {
            patterns,
            subjects: config.subjects.clone(),
            practices: config.practices.clone(),
            product_terms: config.product_terms.clone(),
            interrogative,
        })
    }

    /// Whether the question concerns the operator's internal practices.
    ///
    /// Questions mentioning a product term are never internal matters.
    pub fn is_internal_matter(&self, question: &str) -> bool {
        let lower = question.to_lowercase();

        if self.product_terms.iter().any(|t| text::contains_term(&lower, t)) {
            return false;
        }

        if self.patterns.iter().any(|p| p.is_match(&lower)) {
            return true;
        }

        let mentions_subject = self.subjects.iter().any(|s| text::contains_term(&lower, s));
        let mentions_practice = self.practices.iter().any(|p| text::contains_term(&lower, p));

        mentions_subject && mentions_practice && self.interrogative.is_match(&lower)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detector() -> InternalMatterDetector {
        InternalMatterDetector::new(&InternalMatterConfig::default()).unwrap()
    }

    #[test]
    fn test_detects_internal_system_question() {
        let d = detector();
        assert!(d.is_internal_matter("What internal authentication system does the bank itself use?"));
        assert!(d.is_internal_matter("Does the bank have a dedicated frontend team?"));
        assert!(d.is_internal_matter("What is the bank's CI/CD pipeline?"));
        assert!(d.is_internal_matter("Which SSO provider runs at the bank?"));
    }

    #[test]
    fn test_product_questions_are_not_internal() {
        let d = detector();
        assert!(!d.is_internal_matter("Does the bank need to deploy anything on-prem?"));
        assert!(!d.is_internal_matter("What API does the bank use to connect?"));
        assert!(!d.is_internal_matter("Describe your KYC process"));
        assert!(!d.is_internal_matter("Do you support SSO via SAML?"));
    }

    #[test]
    fn test_custom_subject() {
        let config = InternalMatterConfig {
            subjects: vec!["Acme Bank".to_string()],
            ..InternalMatterConfig::default()
        };
        let d = InternalMatterDetector::new(&config).unwrap();

        assert!(d.is_internal_matter("What tooling does Acme Bank use for monitoring?"));
        assert!(!d.is_internal_matter("What tooling does the bank use for monitoring?"));
    }

    #[test]
    fn test_invalid_pattern_is_config_error() {
        let config = InternalMatterConfig {
            patterns: vec!["(unclosed".to_string()],
            ..InternalMatterConfig::default()
        };
        assert!(matches!(
            InternalMatterDetector::new(&config),
            Err(AppError::Config(_))
        ));
    }
}
