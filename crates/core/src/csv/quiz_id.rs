use std::sync::LazyLock;

use regex::Regex;
use url::Url;

use crate::model::QuizId;

static HEX_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-fA-F0-9]{20,}$").expect("valid quiz id pattern"));

static LEADING_HEX_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-fA-F0-9]{20,}").expect("valid quiz id prefix pattern"));

const QUIZ_HOST: &str = "quizizz.com";

/// Extract a quiz id from one cell.
///
/// Accepts a bare 20+ character hex string, or a quizizz.com URL whose
/// last path segment starts with one.
#[must_use]
pub fn extract_from_cell(cell: &str) -> Option<QuizId> {
    let cell = cell.trim();
    if HEX_ID.is_match(cell) {
        return QuizId::new(cell).ok();
    }
    if cell.contains(QUIZ_HOST) && cell.contains('/') {
        let segment = last_path_segment(cell)?;
        let hex = LEADING_HEX_ID.find(&segment)?;
        return QuizId::new(hex.as_str()).ok();
    }
    None
}

/// Designated id columns first, then every cell left to right.
#[must_use]
pub fn extract_from_row(cells: &[String], id_columns: &[usize]) -> Option<QuizId> {
    id_columns
        .iter()
        .filter_map(|idx| cells.get(*idx))
        .find_map(|cell| extract_from_cell(cell))
        .or_else(|| cells.iter().find_map(|cell| extract_from_cell(cell)))
}

fn last_path_segment(cell: &str) -> Option<String> {
    let parsed = Url::parse(cell).or_else(|_| Url::parse(&format!("https://{cell}")));
    if let Ok(url) = parsed {
        if let Some(segment) = url
            .path_segments()
            .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
        {
            return Some(segment.to_string());
        }
    }

    // Not a URL we can parse; cut query/fragment by hand.
    let without_query = cell.split(['?', '#']).next().unwrap_or(cell);
    without_query
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
