//! CSV export of completed candidates: one row per candidate, one column
//! per question in question order. Commas inside fields are replaced with
//! spaces before writing — sanitization by replacement, a documented
//! simplification carried over from the source format.

use csv::Writer;

use super::domain::{Candidate, ScreeningStatus};
use super::question::Question;

pub const EXPORT_FILE_NAME: &str = "cv_analysis_results.csv";

/// Writer-plumbing failures only; exporting zero completed candidates is
/// a success that yields the header row alone.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("failed to write export row: {0}")]
    Write(#[from] csv::Error),
    #[error("failed to flush export buffer: {0}")]
    Flush(String),
    #[error("export buffer is not valid UTF-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),
}

/// Render completed candidates as a CSV table.
pub fn completed_csv(
    questions: &[Question],
    candidates: &[Candidate],
) -> Result<String, ExportError> {
    let mut writer = Writer::from_writer(Vec::new());

    let mut header = vec![
        "Candidate Name".to_string(),
        "Total Score".to_string(),
        "Percentage".to_string(),
        "Excluded".to_string(),
    ];
    header.extend(questions.iter().map(|question| sanitize(&question.text)));
    writer.write_record(&header)?;

    for candidate in candidates
        .iter()
        .filter(|candidate| candidate.status == ScreeningStatus::Completed)
    {
        let mut record = vec![
            sanitize(&candidate.name),
            candidate
                .outcome
                .as_ref()
                .map(|outcome| outcome.fraction_label())
                .unwrap_or_else(|| "0/0".to_string()),
            format!("{}%", candidate.percentage().round()),
            yes_no(candidate.is_excluded()).to_string(),
        ];

        for question in questions {
            record.push(match candidate.judgments.get(&question.id) {
                Some(judgment) => sanitize(&judgment.value.label()),
                None => "N/A".to_string(),
            });
        }

        writer.write_record(&record)?;
    }

    let buffer = writer
        .into_inner()
        .map_err(|err| ExportError::Flush(err.to_string()))?;

    Ok(String::from_utf8(buffer)?)
}

fn sanitize(field: &str) -> String {
    field.replace(',', " ")
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "Yes"
    } else {
        "No"
    }
}
