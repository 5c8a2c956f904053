//! Workspace-level entry point tying configuration, knowledge base and engine together.

use crate::base::KnowledgeBase;
use crate::config::{load_engine_config, load_manifest, load_vocabulary, Vocabulary};
use crate::engine::{FillEngine, Pipeline};
use crate::loader::load_manifest_entries;
use crate::output::output_filename;
use crate::progress::ProgressReporter;
use crate::questionnaire::parse_questionnaire;
use crate::synthesis::{LlmSynthesisProvider, SynthesisProvider};
use crate::types::{FillRecord, FillResult, HealthStatus, KnowledgeEntry, KnowledgeStats};
use autofill_core::{AppConfig, AppResult};
use autofill_llm::create_client;
use autofill_prompt::{resolve_prompt, SYNTHESIS_PROMPT_ID};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

/// Build the synthesis provider for the configured LLM, if any.
///
/// Provider `none` yields no provider and the engine stays extractive.
pub fn provider_from_config(config: &AppConfig) -> AppResult<Option<Arc<dyn SynthesisProvider>>> {
    let provider = config.provider.to_lowercase();
    let provider_config = config.get_provider_config(&provider);
    let endpoint = provider_config.and_then(|p| p.endpoint());
    let timeout = provider_config.and_then(|p| p.timeout_secs());
    let api_key = config.resolve_api_key(&provider);

    let client = match create_client(&provider, endpoint, api_key.as_deref(), timeout)? {
        Some(client) => client,
        None => return Ok(None),
    };

    let prompt = resolve_prompt(&config.workspace, SYNTHESIS_PROMPT_ID)?;
    tracing::debug!(
        "Synthesis provider: {} (model {}, prompt {})",
        provider,
        config.model,
        prompt.id
    );

    Ok(Some(Arc::new(LlmSynthesisProvider::new(
        client,
        config.model.clone(),
        prompt,
    ))))
}

/// A questionnaire autofill service bound to one workspace.
pub struct AutofillService {
    workspace: PathBuf,
    knowledge: KnowledgeBase,
    pipeline: Arc<Pipeline>,
    abbreviations: BTreeMap<String, String>,
}

impl AutofillService {
    pub fn new(workspace: PathBuf, pipeline: Pipeline, vocabulary: &Vocabulary) -> Self {
        Self {
            workspace,
            knowledge: KnowledgeBase::new(),
            pipeline: Arc::new(pipeline),
            abbreviations: vocabulary.abbreviations.clone(),
        }
    }

    /// Create a service from the workspace's engine config and vocabulary.
    ///
    /// The knowledge base starts unloaded; call [`reload`](Self::reload).
    pub fn open(workspace: &Path, provider: Option<Arc<dyn SynthesisProvider>>) -> AppResult<Self> {
        let config = load_engine_config(workspace)?;
        let vocabulary = load_vocabulary(workspace)?;
        let pipeline = Pipeline::new(&config, &vocabulary, provider)?;

        Ok(Self::new(workspace.to_path_buf(), pipeline, &vocabulary))
    }

    pub fn workspace(&self) -> &Path {
        &self.workspace
    }

    /// Load the knowledge base from the workspace manifest and swap it in.
    pub fn reload(&self) -> AppResult<usize> {
        let start = Instant::now();
        let manifest = load_manifest(&self.workspace)?;
        let entries = load_manifest_entries(&manifest)?;
        let count = entries.len();

        self.load_entries(entries);

        tracing::info!(
            "Reloaded knowledge base: {} entries in {:.2}s",
            count,
            start.elapsed().as_secs_f64()
        );
        Ok(count)
    }

    /// Swap in an already-loaded set of entries.
    pub fn load_entries(&self, entries: Vec<KnowledgeEntry>) {
        self.knowledge.install(entries, self.abbreviations.clone());
    }

    /// An engine over the current index snapshot.
    pub fn engine(&self) -> AppResult<FillEngine> {
        Ok(FillEngine::new(self.knowledge.snapshot()?, Arc::clone(&self.pipeline)))
    }

    pub fn status(&self) -> HealthStatus {
        self.knowledge.status()
    }

    pub fn stats(&self) -> AppResult<KnowledgeStats> {
        self.knowledge.stats()
    }

    /// Answer a single question.
    pub async fn answer(&self, question: &str) -> AppResult<FillRecord> {
        Ok(self.engine()?.answer(question).await)
    }

    /// Fill an uploaded questionnaire.
    ///
    /// Progress goes to `reporter`, ending in `ready` on success. Input and
    /// index-availability failures emit an `error` event and abort the request.
    pub async fn fill(
        &self,
        filename: &str,
        content: &[u8],
        reporter: &ProgressReporter,
    ) -> AppResult<FillResult> {
        match self.run_fill(filename, content, reporter).await {
            Ok(result) => Ok(result),
            Err(e) => {
                if e.is_request_fatal() {
                    tracing::warn!("Rejected fill of {}: {}", filename, e);
                } else {
                    tracing::error!("Fill of {} failed: {}", filename, e);
                }
                reporter.error(&e.to_string());
                Err(e)
            }
        }
    }

    async fn run_fill(
        &self,
        filename: &str,
        content: &[u8],
        reporter: &ProgressReporter,
    ) -> AppResult<FillResult> {
        let start = Instant::now();
        let engine = self.engine()?;

        reporter.parsing();
        let questions = parse_questionnaire(content)?;
        reporter.questions_found(questions.len());

        let result = engine.fill(&questions, reporter).await?;
        reporter.ready(&result.summary, &output_filename(filename));

        tracing::info!(
            "Filled {} ({} questions) in {:.2}s",
            filename,
            result.total_questions,
            start.elapsed().as_secs_f64()
        );
        Ok(result)
    }
}
