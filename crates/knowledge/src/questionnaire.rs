//! Questionnaire input parsing.

use crate::loader::decode;
use crate::types::QuestionRow;
use autofill_core::{AppError, AppResult};

/// Header names recognized as the question column, in priority order.
const QUESTION_HEADERS: &[&str] = &["question", "questions", "query", "queries", "vendor queries"];

/// Minimum average length for a column to pass as free-text questions.
const MIN_AVERAGE_QUESTION_CHARS: f64 = 20.0;

/// Questions this short or shorter are skipped.
const MIN_QUESTION_CHARS: usize = 5;

/// Pick the question column from the header row and data rows.
///
/// Priority: exact known header name, header containing "question" or
/// "query", first column averaging more than 20 characters, first column.
pub fn detect_question_column(headers: &[String], rows: &[csv::StringRecord]) -> Option<usize> {
    if headers.is_empty() {
        return None;
    }

    let normalized: Vec<String> = headers.iter().map(|h| h.trim().to_lowercase()).collect();

    if let Some(col) = QUESTION_HEADERS
        .iter()
        .find_map(|name| normalized.iter().position(|h| h == name))
    {
        return Some(col);
    }

    if let Some(col) = normalized
        .iter()
        .position(|h| h.contains("question") || h.contains("query"))
    {
        return Some(col);
    }

    let long_text = (0..headers.len()).find(|&col| {
        let lengths: Vec<usize> = rows
            .iter()
            .filter_map(|r| r.get(col))
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .map(|v| v.chars().count())
            .collect();
        !lengths.is_empty()
            && lengths.iter().sum::<usize>() as f64 / lengths.len() as f64 > MIN_AVERAGE_QUESTION_CHARS
    });

    Some(long_text.unwrap_or(0))
}

/// Parse a questionnaire CSV into ordered question rows.
///
/// # Errors
/// `AppError::Input` when the file has no header, cannot be parsed, or
/// contains no usable questions.
pub fn parse_questionnaire(content: &[u8]) -> AppResult<Vec<QuestionRow>> {
    let text = decode(content);
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = rdr
        .headers()
        .map_err(|e| AppError::Input(format!("Could not read CSV header: {}", e)))?
        .iter()
        .map(str::to_string)
        .collect();

    if headers.iter().all(|h| h.trim().is_empty()) {
        return Err(AppError::Input("Input file has no header row".to_string()));
    }

    let rows = rdr
        .records()
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| AppError::Input(format!("Malformed CSV: {}", e)))?;

    let column = detect_question_column(&headers, &rows)
        .ok_or_else(|| AppError::Input("Could not find a question column".to_string()))?;

    tracing::debug!("Using column {:?} as the question column", headers[column]);

    let questions: Vec<QuestionRow> = rows
        .iter()
        .enumerate()
        .filter_map(|(row_number, record)| {
            let question = record.get(column)?.trim();
            (question.chars().count() > MIN_QUESTION_CHARS).then(|| QuestionRow {
                row_number,
                question: question.to_string(),
            })
        })
        .collect();

    if questions.is_empty() {
        return Err(AppError::Input("No valid questions found in the input file".to_string()));
    }

    Ok(questions)
}
