//! Cross-module scenarios over a small on-disk workspace.


use crate::service::AutofillService;
use crate::synthesis::{Draft, SynthesisProvider};
use crate::types::EvidenceCandidate;
use async_trait::async_trait;
use autofill_core::{AppError, AppResult};
use std::fs;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

pub(crate) const CORPUS: &str = "\
Category,Question,Answer
Compliance,What is your KYC process for onboarding new clients?,\"Our KYC process verifies government identity documents, screens sanctions lists and performs ongoing monitoring of every client.\"
Security,Do you encrypt customer data at rest and in transit?,All customer data is encrypted at rest with AES-256 and in transit with TLS 1.2 or higher.
Custody,How are client digital assets segregated?,Client assets are held in segregated wallets with cold storage and HSM-backed key management.
Operations,How often is the disaster recovery plan tested?,The disaster recovery plan is tested twice a year with documented results.
Platform,Which cloud provider hosts the platform?,The platform is hosted on AWS across two availability zones in the EU.
";

pub(crate) const QUESTIONNAIRE: &str = "\
No,Question
1,What is your KYC process for onboarding new clients?
2,How often do you test your disaster recovery plan?
3,What CI/CD pipeline does the bank use internally?
4,Describe your approach to quantum teleportation logistics
";

pub(crate) const KYC_CITATION: &str = "[security_ddq > Compliance > Row 2]";

/// A workspace whose default knowledge directory holds [`CORPUS`].
pub(crate) fn workspace() -> TempDir {
    let temp = TempDir::new().unwrap();
    let knowledge = temp.path().join(".autofill").join("knowledge");
    fs::create_dir_all(&knowledge).unwrap();
    fs::write(knowledge.join("security_ddq.csv"), CORPUS).unwrap();
    temp
}

/// A loaded service over [`workspace`].
pub(crate) fn service(
    temp: &TempDir,
    provider: Option<Arc<dyn SynthesisProvider>>,
) -> AutofillService {
    let service = AutofillService::open(temp.path(), provider).unwrap();
    assert_eq!(service.reload().unwrap(), 5);
    service
}

/// Deterministic provider: restates the best evidence and cites it.
#[derive(Default)]
pub(crate) struct EchoProvider {
    pub calls: AtomicUsize,
}

#[async_trait]
impl SynthesisProvider for EchoProvider {
    fn name(&self) -> &str {
        "echo"
    }

    async fn generate(&self, _question: &str, evidence: &[EvidenceCandidate]) -> AppResult<Draft> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let top = evidence
            .first()
            .ok_or_else(|| AppError::Synthesis("no evidence".to_string()))?;
        Ok(Draft {
            answer: top.entry.answer_text.clone(),
            citations: vec![top.entry.citation()],
        })
    }
}

pub(crate) struct FailingProvider;

#[async_trait]
impl SynthesisProvider for FailingProvider {
    fn name(&self) -> &str {
        "failing"
    }

    async fn generate(&self, _: &str, _: &[EvidenceCandidate]) -> AppResult<Draft> {
        Err(AppError::Llm("provider offline".to_string()))
    }
}

pub(crate) struct PanickingProvider;

#[async_trait]
impl SynthesisProvider for PanickingProvider {
    fn name(&self) -> &str {
        "panicking"
    }

    async fn generate(&self, _: &str, _: &[EvidenceCandidate]) -> AppResult<Draft> {
        panic!("provider bug");
    }
}

pub(crate) struct StalledProvider;

#[async_trait]
impl SynthesisProvider for StalledProvider {
    fn name(&self) -> &str {
        "stalled"
    }

    async fn generate(&self, _: &str, _: &[EvidenceCandidate]) -> AppResult<Draft> {
        tokio::time::sleep(Duration::from_secs(600)).await;
        Err(AppError::Synthesis("stalled".to_string()))
    }
}

/// Echo provider that answers the KYC question last by sleeping longest on it.
#[derive(Default)]
pub(crate) struct SlowFirstProvider {
    pub finished: std::sync::Mutex<Vec<String>>,
}

#[async_trait]
impl SynthesisProvider for SlowFirstProvider {
    fn name(&self) -> &str {
        "slow-first"
    }

    async fn generate(&self, question: &str, evidence: &[EvidenceCandidate]) -> AppResult<Draft> {
        let delay = if question.contains("KYC") { 300 } else { 10 };
        tokio::time::sleep(Duration::from_millis(delay)).await;
        self.finished.lock().unwrap().push(question.to_string());

        let top = evidence
            .first()
            .ok_or_else(|| AppError::Synthesis("no evidence".to_string()))?;
        Ok(Draft {
            answer: top.entry.answer_text.clone(),
            citations: vec![top.entry.citation()],
        })
    }
}
