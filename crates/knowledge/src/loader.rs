//! Knowledge-base CSV loading.
//!
//! Two layouts are supported:
//! - **generic**: header row names the question/answer (and optional section) columns
//! - **sectioned**: fixed question/answer columns; a row whose only non-empty
//!   cell is the first one starts a new section

use crate::config::{KnowledgeManifest, KnowledgeSourceSpec, SourceLayout};
use crate::types::KnowledgeEntry;
use autofill_core::{AppError, AppResult};
use std::path::Path;
use walkdir::WalkDir;

/// Shortest question text kept as a knowledge entry.
const MIN_QUESTION_CHARS: usize = 10;

/// Shortest answer text kept as a knowledge entry.
const MIN_ANSWER_CHARS: usize = 5;

const DEFAULT_SECTION: &str = "General";

/// Load every source named by the manifest, in manifest order.
///
/// Missing sources are logged and skipped: an absent corpus yields zero
/// entries rather than an error. Unreadable or malformed files are errors.
pub fn load_manifest_entries(manifest: &KnowledgeManifest) -> AppResult<Vec<KnowledgeEntry>> {
    let mut entries = Vec::new();

    for source in &manifest.sources {
        match source {
            KnowledgeSourceSpec::File {
                path,
                document,
                layout,
                question_column,
                answer_column,
            } => {
                if !path.is_file() {
                    tracing::warn!("Knowledge source not found, skipping: {:?}", path);
                    continue;
                }

                let document = document.clone().unwrap_or_else(|| document_name(path));
                let content = std::fs::read(path)?;

                let loaded = match layout {
                    SourceLayout::Generic => parse_generic(&document, &content)?,
                    SourceLayout::Sectioned => {
                        let (question, answer) = (*question_column).zip(*answer_column).ok_or_else(|| {
                            AppError::Config(format!(
                                "Sectioned source {:?} needs question_column and answer_column",
                                path
                            ))
                        })?;
                        parse_sectioned(&document, &content, question, answer)?
                    }
                };

                tracing::debug!("Loaded {} entries from {:?}", loaded.len(), path);
                entries.extend(loaded);
            }
            KnowledgeSourceSpec::Directory { directory } => {
                entries.extend(load_directory(directory)?);
            }
        }
    }

    // Ids follow final corpus order.
    for (id, entry) in entries.iter_mut().enumerate() {
        entry.id = id;
    }

    tracing::info!("Loaded {} knowledge entries", entries.len());
    Ok(entries)
}

/// Load every `*.csv` below a directory with the generic layout, sorted by path.
pub fn load_directory(directory: &Path) -> AppResult<Vec<KnowledgeEntry>> {
    if !directory.is_dir() {
        tracing::warn!("Knowledge directory not found, skipping: {:?}", directory);
        return Ok(Vec::new());
    }

    let mut files: Vec<_> = WalkDir::new(directory)
        .follow_links(false)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().is_file())
        .filter(|e| {
            e.path()
                .extension()
                .and_then(|s| s.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
        })
        .map(|e| e.into_path())
        .collect();
    files.sort();

    let mut entries = Vec::new();
    for file in files {
        let content = std::fs::read(&file)?;
        let loaded = parse_generic(&document_name(&file), &content)?;
        tracing::debug!("Loaded {} entries from {:?}", loaded.len(), file);
        entries.extend(loaded);
    }

    Ok(entries)
}

fn document_name(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("Knowledge_Base")
        .to_string()
}

/// Decode bytes as UTF-8 (BOM stripped), falling back to Latin-1.
pub(crate) fn decode(content: &[u8]) -> String {
    let content = content.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(content);
    match std::str::from_utf8(content) {
        Ok(text) => text.to_string(),
        Err(_) => content.iter().map(|&b| b as char).collect(),
    }
}

fn reader(text: &str) -> csv::Reader<&[u8]> {
    csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes())
}

fn keep(question: &str, answer: &str) -> bool {
    question.chars().count() > MIN_QUESTION_CHARS
        && answer.chars().count() >= MIN_ANSWER_CHARS
        && !answer.to_lowercase().starts_with("<please")
}

/// Parse a CSV with question/answer columns named in the header.
pub fn parse_generic(document: &str, content: &[u8]) -> AppResult<Vec<KnowledgeEntry>> {
    let text = decode(content);
    let mut rdr = reader(&text);

    let headers: Vec<String> = rdr.headers()?.iter().map(|h| h.trim().to_lowercase()).collect();
    let find = |needles: &[&str]| {
        headers
            .iter()
            .position(|h| needles.iter().any(|n| h.contains(n)))
    };

    let question_col = find(&["question", "query"]).unwrap_or(0);
    let answer_col = find(&["answer", "response"]).unwrap_or(1);
    let section_col = find(&["section", "category"]);

    if question_col == answer_col {
        return Err(AppError::Knowledge(format!(
            "{}: cannot tell question and answer columns apart",
            document
        )));
    }

    let mut entries = Vec::new();
    for (idx, record) in rdr.records().enumerate() {
        let record = record?;
        let question = record.get(question_col).unwrap_or("").trim();
        let answer = record.get(answer_col).unwrap_or("").trim();

        if !keep(question, answer) {
            continue;
        }

        let section = section_col
            .and_then(|c| record.get(c))
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_SECTION);

        entries.push(KnowledgeEntry {
            id: 0,
            source_document: document.to_string(),
            section: section.to_string(),
            row_index: (idx + 2) as u32,
            question_text: question.to_string(),
            answer_text: answer.to_string(),
        });
    }

    Ok(entries)
}

/// Parse a CSV where section headings are interleaved with question rows.
pub fn parse_sectioned(
    document: &str,
    content: &[u8],
    question_col: usize,
    answer_col: usize,
) -> AppResult<Vec<KnowledgeEntry>> {
    let text = decode(content);
    let mut rdr = reader(&text);

    let mut section = DEFAULT_SECTION.to_string();
    let mut entries = Vec::new();

    for (idx, record) in rdr.records().enumerate() {
        let record = record?;
        let first = record.get(0).unwrap_or("").trim();
        let rest_empty = record.iter().skip(1).all(|cell| cell.trim().is_empty());

        if !first.is_empty() && rest_empty {
            section = first.to_string();
            continue;
        }

        let question = record.get(question_col).unwrap_or("").trim();
        let answer = record.get(answer_col).unwrap_or("").trim();

        if !keep(question, answer) || question.eq_ignore_ascii_case("question") {
            continue;
        }

        entries.push(KnowledgeEntry {
            id: 0,
            source_document: document.to_string(),
            section: section.clone(),
            row_index: (idx + 2) as u32,
            question_text: question.to_string(),
            answer_text: answer.to_string(),
        });
    }

    Ok(entries)
}
