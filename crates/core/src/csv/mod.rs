//! Loose CSV import for quiz batches.
//!
//! The input is whatever curators export from spreadsheets: header names vary,
//! quiz ids may be bare hex strings or full quizizz.com links, and rows
//! without an id are simply skipped.

mod headers;
mod line;
mod quiz_id;

use std::collections::HashSet;

use tracing::debug;

use crate::model::QuizId;

pub use headers::{ColumnMap, CsvField, classify_header};
pub use line::split_line;
pub use quiz_id::{extract_from_cell, extract_from_row};

/// Raw strings found for one quiz in a CSV line.
///
/// Empty cells are `None`. Numeric fields stay unparsed; see
/// [`crate::summary`] for the coercion rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvQuizRow {
    pub id: QuizId,
    pub title: Option<String>,
    pub domain: Option<String>,
    pub topic: Option<String>,
    pub standard: Option<String>,
    pub description: Option<String>,
    pub question_count: Option<String>,
    pub variety_tag: Option<String>,
    pub score: Option<String>,
    pub subject: Option<String>,
    pub grade: Option<String>,
}

impl CsvQuizRow {
    fn from_cells(id: QuizId, cells: &[String], columns: &ColumnMap) -> Self {
        let get = |field| columns.cell(cells, field).map(str::to_string);
        Self {
            id,
            title: get(CsvField::Title),
            domain: get(CsvField::Domain),
            topic: get(CsvField::Topic),
            standard: get(CsvField::Standard),
            description: get(CsvField::Description),
            question_count: get(CsvField::QuestionCount),
            variety_tag: get(CsvField::VarietyTag),
            score: get(CsvField::Score),
            subject: get(CsvField::Subject),
            grade: get(CsvField::Grade),
        }
    }
}

/// Parse CSV text into quiz rows, first occurrence of each id wins.
///
/// Never fails: empty input, a header-only file, or rows without any
/// recognizable id all degrade to fewer (possibly zero) rows.
#[must_use]
pub fn parse_quiz_rows(text: &str) -> Vec<CsvQuizRow> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut lines = text.lines().filter(|line| !line.trim().is_empty());

    let Some(header_line) = lines.next() else {
        return Vec::new();
    };
    let columns = ColumnMap::from_headers(&split_line(header_line));

    let mut seen = HashSet::new();
    let mut rows = Vec::new();
    let mut dropped = 0_usize;
    let mut duplicates = 0_usize;

    for line in lines {
        let cells = split_line(line);
        let Some(id) = extract_from_row(&cells, columns.id_columns()) else {
            dropped += 1;
            continue;
        };
        if !seen.insert(id.clone()) {
            duplicates += 1;
            continue;
        }
        rows.push(CsvQuizRow::from_cells(id, &cells, &columns));
    }

    debug!(
        rows = rows.len(),
        dropped, duplicates, "parsed quiz csv"
    );
    rows
}
