//! Filled questionnaire rendering.

use crate::types::FillRecord;
use autofill_core::{AppError, AppResult};

/// Fixed output columns.
pub const CSV_HEADERS: [&str; 4] = ["Question", "Answer", "Confidence Score", "Evidence"];

/// Render records as CSV, one row per record in order.
pub fn render_csv(records: &[FillRecord]) -> AppResult<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(CSV_HEADERS)?;

    for record in records {
        let score = record.confidence_score.to_string();
        writer.write_record([
            record.question.as_str(),
            record.answer.as_str(),
            score.as_str(),
            record.evidence.as_str(),
        ])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| AppError::Serialization(format!("Failed to flush CSV: {}", e)))?;

    String::from_utf8(bytes)
        .map_err(|e| AppError::Serialization(format!("CSV output is not UTF-8: {}", e)))
}

/// Name of the filled file for an input file name.
pub fn output_filename(input_name: &str) -> String {
    match input_name.strip_suffix(".csv") {
        Some(stem) => format!("{}_filled.csv", stem),
        None => format!("{}_filled.csv", input_name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ConfidenceLevel;

    #[test]
    fn test_render_csv_quotes_fields() {
        let records = vec![FillRecord {
            question: "Do you support SSO, MFA?".to_string(),
            answer: "Yes, \"SAML\" and TOTP.".to_string(),
            confidence_score: 88,
            confidence_level: ConfidenceLevel::Medium,
            evidence: "[DDQ > Access > Row 4]".to_string(),
            similarity_score: 83.5,
        }];

        let csv = render_csv(&records).unwrap();
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some("Question,Answer,Confidence Score,Evidence"));
        assert_eq!(
            lines.next(),
            Some("\"Do you support SSO, MFA?\",\"Yes, \"\"SAML\"\" and TOTP.\",88,[DDQ > Access > Row 4]")
        );
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn test_output_filename() {
        assert_eq!(output_filename("vendor_ddq.csv"), "vendor_ddq_filled.csv");
        assert_eq!(output_filename("questions"), "questions_filled.csv");
    }
}
