//! CSV export of curator feedback for analytics.

use chrono::SecondsFormat;

use crate::model::Feedback;

/// Column order of [`feedback_csv`], matching the `Feedback` field names.
pub const FEEDBACK_COLUMNS: [&str; 8] = [
    "quiz_id",
    "reviewer",
    "stars",
    "approval",
    "comment",
    "batch",
    "created_at",
    "updated_at",
];

/// Render feedback as CSV: a header row, then one quoted line per record.
///
/// Every value is wrapped in double quotes with inner quotes doubled; absent
/// values are empty strings. An empty slice yields an empty string.
#[must_use]
pub fn feedback_csv(records: &[Feedback]) -> String {
    if records.is_empty() {
        return String::new();
    }
    let rows = records.iter().map(|feedback| {
        vec![
            feedback.quiz_id.to_string(),
            feedback.reviewer.to_string(),
            feedback
                .stars
                .map(|s| s.value().to_string())
                .unwrap_or_default(),
            feedback.approval.to_string(),
            feedback.comment.clone().unwrap_or_default(),
            feedback.batch.clone().unwrap_or_default(),
            feedback
                .created_at
                .to_rfc3339_opts(SecondsFormat::Secs, true),
            feedback
                .updated_at
                .to_rfc3339_opts(SecondsFormat::Secs, true),
        ]
    });
    write_csv(&FEEDBACK_COLUMNS, rows)
}

/// Write a header row and data rows, quoting every value.
pub fn write_csv<I>(headers: &[&str], rows: I) -> String
where
    I: IntoIterator<Item = Vec<String>>,
{
    let mut out = headers.join(",");
    out.push('\n');
    for row in rows {
        let line = row
            .iter()
            .map(|value| quote(value))
            .collect::<Vec<_>>()
            .join(",");
        out.push_str(&line);
        out.push('\n');
    }
    out
}

fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}
