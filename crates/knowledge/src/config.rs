//! Engine, vocabulary and knowledge-base manifest configuration.
//!
//! All three live under `.autofill/` in the workspace and are optional:
//! - `engine.yaml`: matching, scoring and concurrency parameters
//! - `vocabulary.yaml`: domain keyword sets, abbreviations, internal-matter rules
//! - `knowledge.yaml`: which CSV files make up the knowledge base

use autofill_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Confidence band lower bounds (inclusive).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConfidenceBands {
    #[serde(default = "default_high")]
    pub high: u8,
    #[serde(default = "default_medium")]
    pub medium: u8,
    #[serde(default = "default_low")]
    pub low: u8,
}

fn default_high() -> u8 {
    90
}

fn default_medium() -> u8 {
    70
}

fn default_low() -> u8 {
    40
}

impl Default for ConfidenceBands {
    fn default() -> Self {
        Self {
            high: default_high(),
            medium: default_medium(),
            low: default_low(),
        }
    }
}

/// Matching, synthesis and scoring parameters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EngineConfig {
    /// Evidence candidates kept per question
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Lexical candidates pulled before concept re-ranking
    #[serde(default = "default_candidate_pool")]
    pub candidate_pool: usize,

    /// Best-evidence similarity below which a question is unanswerable
    #[serde(default = "default_min_similarity")]
    pub min_similarity: f64,

    /// Top-two similarity gap that counts as ambiguous
    #[serde(default = "default_ambiguity_margin")]
    pub ambiguity_margin: f64,

    /// Answers shorter than this (in characters) are penalized
    #[serde(default = "default_short_answer_chars")]
    pub short_answer_chars: usize,

    /// Penalty applied when synthesis fell back after a provider failure
    #[serde(default = "default_degraded_penalty")]
    pub degraded_penalty: i32,

    #[serde(default)]
    pub bands: ConfidenceBands,

    /// Questions processed in parallel per request
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    #[serde(default = "default_synthesis_timeout_secs")]
    pub synthesis_timeout_secs: u64,

    /// Share of a sentence's content terms that must occur in the evidence
    #[serde(default = "default_grounding_threshold")]
    pub grounding_threshold: f64,
}

fn default_top_k() -> usize {
    3
}

fn default_candidate_pool() -> usize {
    10
}

fn default_min_similarity() -> f64 {
    40.0
}

fn default_ambiguity_margin() -> f64 {
    5.0
}

fn default_short_answer_chars() -> usize {
    50
}

fn default_degraded_penalty() -> i32 {
    -10
}

fn default_concurrency() -> usize {
    4
}

fn default_synthesis_timeout_secs() -> u64 {
    30
}

fn default_grounding_threshold() -> f64 {
    0.8
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
            candidate_pool: default_candidate_pool(),
            min_similarity: default_min_similarity(),
            ambiguity_margin: default_ambiguity_margin(),
            short_answer_chars: default_short_answer_chars(),
            degraded_penalty: default_degraded_penalty(),
            bands: ConfidenceBands::default(),
            concurrency: default_concurrency(),
            synthesis_timeout_secs: default_synthesis_timeout_secs(),
            grounding_threshold: default_grounding_threshold(),
        }
    }
}

impl EngineConfig {
    /// Validate parameter ranges.
    pub fn validate(&self) -> AppResult<()> {
        let bands = &self.bands;
        if !(bands.high <= 100 && bands.high > bands.medium && bands.medium > bands.low) {
            return Err(AppError::Config(format!(
                "Confidence bands must satisfy 100 >= high > medium > low (got {}/{}/{})",
                bands.high, bands.medium, bands.low
            )));
        }

        if self.top_k == 0 {
            return Err(AppError::Config("top_k must be at least 1".to_string()));
        }

        if self.candidate_pool < self.top_k {
            return Err(AppError::Config(format!(
                "candidate_pool ({}) must be >= top_k ({})",
                self.candidate_pool, self.top_k
            )));
        }

        if self.concurrency == 0 {
            return Err(AppError::Config("concurrency must be at least 1".to_string()));
        }

        if self.synthesis_timeout_secs == 0 {
            return Err(AppError::Config(
                "synthesis_timeout_secs must be at least 1".to_string(),
            ));
        }

        if !(0.0..=100.0).contains(&self.min_similarity) {
            return Err(AppError::Config(format!(
                "min_similarity must be within 0..=100 (got {})",
                self.min_similarity
            )));
        }

        if !(0.0..).contains(&self.ambiguity_margin) {
            return Err(AppError::Config(format!(
                "ambiguity_margin must not be negative (got {})",
                self.ambiguity_margin
            )));
        }

        if !(0.0..=1.0).contains(&self.grounding_threshold) {
            return Err(AppError::Config(format!(
                "grounding_threshold must be within 0..=1 (got {})",
                self.grounding_threshold
            )));
        }

        Ok(())
    }
}

/// Rules for spotting questions about the operator's own internal practices.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InternalMatterConfig {
    /// Regexes; `{subject}` is replaced by each escaped subject
    #[serde(default)]
    pub patterns: Vec<String>,

    /// Names the operator is referred to by
    #[serde(default)]
    pub subjects: Vec<String>,

    /// Internal practices that only the operator can describe
    #[serde(default)]
    pub practices: Vec<String>,

    /// Terms marking a question about the offered product instead
    #[serde(default)]
    pub product_terms: Vec<String>,
}

impl Default for InternalMatterConfig {
    fn default() -> Self {
        Self {
            patterns: [
                r"\bwhat\b.*\b{subject}\b.*\buses?\b",
                r"\bdoes\s+{subject}\b.*\bhave\b.*\bteam\b",
                r"\b{subject}\b.*\bdedicated\b.*\bteam\b",
                r"\b{subject}'?s\s+(own\s+)?(ci|cd|ci/cd|sso|team|pipeline)\b",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            subjects: strings(&["the bank", "the client"]),
            practices: strings(&[
                "ci/cd",
                "sso",
                "pipeline",
                "team",
                "authentication system",
                "identity provider",
            ]),
            product_terms: strings(&[
                "on prem", "on-prem", "prem", "sdk", "api", "host", "hosted", "hosting", "deploy",
                "deployment", "integration",
            ]),
        }
    }
}

/// Swappable keyword resource used by the matcher, scorer and detector.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Vocabulary {
    /// Knowledge domain name to keywords
    #[serde(default)]
    pub domains: BTreeMap<String, Vec<String>>,

    /// Keywords earning the domain-match bonus
    #[serde(default)]
    pub domain_keywords: Vec<String>,

    /// Abbreviation to expansion
    #[serde(default)]
    pub abbreviations: BTreeMap<String, String>,

    #[serde(default)]
    pub internal_matter: InternalMatterConfig,
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

impl Default for Vocabulary {
    fn default() -> Self {
        let domains: BTreeMap<String, Vec<String>> = [
            ("frontend", &["front-end", "frontend", "ui", "user interface", "mobile app", "web app", "customer journey", "ux"][..]),
            ("backend", &["back-end", "backend", "api", "server", "infrastructure"][..]),
            ("api_platform", &["api-first", "rest api", "apis", "websocket", "integration"][..]),
            ("build_develop", &["develop", "build", "implement", "ownership"][..]),
            ("hosting", &["host", "deploy", "cloud", "aws", "saas", "on-premise", "on prem", "infrastructure"][..]),
            ("on_prem", &["on-premise", "on prem", "self-hosted", "private cloud"][..]),
            ("sdk", &["sdk", "library", "connector", "single point of failure"][..]),
            ("community", &["community", "resources", "partnerships", "bank partners"][..]),
            ("sso", &["sso", "single sign", "oauth", "authentication", "jwt"][..]),
            ("ci_cd", &["ci/cd", "cicd", "pipeline", "deployment", "devops"][..]),
            ("analytics", &["analytics", "reporting", "metrics", "kpi", "dashboard"][..]),
            ("custody", &["custody", "wallet", "hsm", "mpc", "segregation", "cold storage"][..]),
            ("trading", &["trading", "order", "execution", "coins", "crypto", "asset"][..]),
            ("charting", &["chart", "technical indicator", "graph"][..]),
            ("kyc_aml", &["kyc", "aml", "compliance", "regulatory"][..]),
            ("security", &["security", "encryption", "audit", "risk", "mfa", "rbac", "gdpr", "pii", "backup", "disaster recovery"][..]),
            ("settlement", &["settlement", "reconciliation", "transaction"][..]),
            ("staking", &["staking", "yield", "savings", "earn"][..]),
            ("bank_integration", &["casa", "fiat", "deposit", "withdrawal", "bank integration"][..]),
        ]
        .iter()
        .map(|(name, keywords)| (name.to_string(), strings(keywords)))
        .collect();

        let abbreviations: BTreeMap<String, String> = [
            ("kyc", "know your customer"),
            ("aml", "anti money laundering"),
            ("cft", "counter financing of terrorism"),
            ("pii", "personally identifiable information"),
            ("gdpr", "general data protection regulation"),
            ("sso", "single sign on"),
            ("mfa", "multi factor authentication"),
            ("rbac", "role based access control"),
            ("api", "application programming interface"),
            ("sdk", "software development kit"),
            ("saas", "software as a service"),
            ("vapt", "vulnerability assessment penetration testing"),
            ("siem", "security information event management"),
            ("ids", "intrusion detection system"),
            ("ips", "intrusion prevention system"),
            ("tls", "transport layer security"),
            ("jwt", "json web token"),
            ("oauth", "open authorization"),
            ("rest", "representational state transfer"),
            ("bcp", "business continuity planning"),
            ("dr", "disaster recovery"),
            ("rpo", "recovery point objective"),
            ("rto", "recovery time objective"),
            ("hsm", "hardware security module"),
            ("mpc", "multi party computation"),
        ]
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        Self {
            domains,
            domain_keywords: strings(&[
                "kyc", "aml", "compliance", "regulatory", "security", "api", "encryption",
                "authentication", "authorization", "custody", "wallet", "blockchain", "crypto",
                "trading", "settlement", "audit", "risk", "gdpr", "pii", "integration", "sso",
                "mfa", "rbac", "backup", "disaster recovery",
            ]),
            abbreviations,
            internal_matter: InternalMatterConfig::default(),
        }
    }
}

/// How rows of a knowledge-base CSV map to entries.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SourceLayout {
    /// Columns detected from the header row; an optional `section` column
    #[default]
    Generic,

    /// A row with only its first cell set opens a new section; needs
    /// `question_column` and `answer_column`
    Sectioned,
}

/// One entry of the knowledge-base manifest.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum KnowledgeSourceSpec {
    /// A single CSV file
    File {
        path: PathBuf,
        /// Document name used in citations (defaults to the file stem)
        #[serde(default)]
        document: Option<String>,
        #[serde(default)]
        layout: SourceLayout,
        #[serde(default)]
        question_column: Option<usize>,
        #[serde(default)]
        answer_column: Option<usize>,
    },

    /// Every `*.csv` below a directory, generic layout
    Directory { directory: PathBuf },
}

/// The list of sources making up the knowledge base.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct KnowledgeManifest {
    #[serde(default)]
    pub sources: Vec<KnowledgeSourceSpec>,
}

impl KnowledgeManifest {
    /// Manifest used when `knowledge.yaml` is absent.
    pub fn default_for(workspace: &Path) -> Self {
        Self {
            sources: vec![KnowledgeSourceSpec::Directory {
                directory: autofill_dir(workspace).join("knowledge"),
            }],
        }
    }
}

/// Get the `.autofill` directory of a workspace.
pub fn autofill_dir(workspace: &Path) -> PathBuf {
    workspace.join(".autofill")
}

/// Get the engine config path.
pub fn get_engine_config_path(workspace: &Path) -> PathBuf {
    autofill_dir(workspace).join("engine.yaml")
}

/// Get the vocabulary path.
pub fn get_vocabulary_path(workspace: &Path) -> PathBuf {
    autofill_dir(workspace).join("vocabulary.yaml")
}

/// Get the knowledge-base manifest path.
pub fn get_manifest_path(workspace: &Path) -> PathBuf {
    autofill_dir(workspace).join("knowledge.yaml")
}

fn read_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> AppResult<Option<T>> {
    if !path.exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(path)
        .map_err(|e| AppError::Config(format!("Failed to read {:?}: {}", path, e)))?;

    let value = serde_yaml::from_str(&content)
        .map_err(|e| AppError::Config(format!("Failed to parse {:?}: {}", path, e)))?;

    Ok(Some(value))
}

/// Load the engine config, falling back to defaults when absent.
pub fn load_engine_config(workspace: &Path) -> AppResult<EngineConfig> {
    let path = get_engine_config_path(workspace);
    let config = match read_yaml::<EngineConfig>(&path)? {
        Some(config) => {
            tracing::debug!("Loaded engine config from {:?}", path);
            config
        }
        None => {
            tracing::debug!("Using default engine config (no config file found)");
            EngineConfig::default()
        }
    };

    config.validate()?;
    Ok(config)
}

/// Load the vocabulary, falling back to the built-in one when absent.
pub fn load_vocabulary(workspace: &Path) -> AppResult<Vocabulary> {
    let path = get_vocabulary_path(workspace);
    match read_yaml::<Vocabulary>(&path)? {
        Some(vocabulary) => {
            tracing::debug!(
                "Loaded vocabulary from {:?}: {} domains, {} abbreviations",
                path,
                vocabulary.domains.len(),
                vocabulary.abbreviations.len()
            );
            Ok(vocabulary)
        }
        None => Ok(Vocabulary::default()),
    }
}

/// Load the knowledge-base manifest.
///
/// Relative paths are resolved against the workspace.
pub fn load_manifest(workspace: &Path) -> AppResult<KnowledgeManifest> {
    let path = get_manifest_path(workspace);
    let mut manifest = match read_yaml::<KnowledgeManifest>(&path)? {
        Some(manifest) => manifest,
        None => return Ok(KnowledgeManifest::default_for(workspace)),
    };

    for source in &mut manifest.sources {
        let target = match source {
            KnowledgeSourceSpec::File { path, .. } => path,
            KnowledgeSourceSpec::Directory { directory } => directory,
        };
        if target.is_relative() {
            *target = workspace.join(&*target);
        }
    }

    tracing::debug!(
        "Loaded knowledge manifest from {:?}: {} sources",
        path,
        manifest.sources.len()
    );
    Ok(manifest)
}
