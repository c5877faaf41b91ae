//! Conversion of raw CSV rows into [`QuizRecord`]s.

use crate::csv::CsvQuizRow;
use crate::model::QuizRecord;

/// Map parsed rows to records, preserving order.
#[must_use]
pub fn to_quiz_records(rows: Vec<CsvQuizRow>) -> Vec<QuizRecord> {
    rows.into_iter().map(to_quiz_record).collect()
}

#[must_use]
pub fn to_quiz_record(row: CsvQuizRow) -> QuizRecord {
    QuizRecord {
        question_count: row.question_count.as_deref().map_or(0, parse_question_count),
        score: row.score.as_deref().and_then(parse_score),
        id: row.id,
        title: row.title,
        domain: row.domain,
        topic: row.topic,
        standard: row.standard,
        description: row.description,
        variety_tag: row.variety_tag,
        subject: row.subject,
        grade: row.grade,
    }
}

/// Leading base-10 integer, 0 when there is none.
///
/// "12 questions" reads as 12. A literal "0" and an unparseable value both
/// come out as 0, so callers cannot tell them apart.
#[must_use]
pub fn parse_question_count(raw: &str) -> u32 {
    let trimmed = raw.trim();
    let unsigned = trimmed.strip_prefix('+').unwrap_or(trimmed);
    let digits: String = unsigned.chars().take_while(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return 0;
    }
    digits.parse::<u32>().unwrap_or(u32::MAX)
}

/// Leading decimal number, `None` when there is none.
///
/// Unlike the question count, a missing score stays missing instead of
/// becoming 0, because unscored quizzes sort after scored ones.
#[must_use]
pub fn parse_score(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    let end = numeric_prefix_len(trimmed);
    if end == 0 {
        return None;
    }
    trimmed[..end]
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

/// Length of the longest prefix shaped like `[+-]?digits[.digits][e[+-]digits]`.
fn numeric_prefix_len(s: &str) -> usize {
    let bytes = s.as_bytes();
    let mut i = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        i += 1;
    }
    let int_start = i;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    let mut mantissa_digits = i - int_start;
    if i < bytes.len() && bytes[i] == b'.' {
        let frac_start = i + 1;
        let mut j = frac_start;
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
        }
        mantissa_digits += j - frac_start;
        if j > frac_start || mantissa_digits > 0 {
            i = j;
        }
    }
    if mantissa_digits == 0 {
        return 0;
    }
    if i < bytes.len() && matches!(bytes[i], b'e' | b'E') {
        let mut j = i + 1;
        if matches!(bytes.get(j), Some(b'+' | b'-')) {
            j += 1;
        }
        let exp_start = j;
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
        }
        if j > exp_start {
            i = j;
        }
    }
    i
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::QuizId;

    fn row(id: &str) -> CsvQuizRow {
        CsvQuizRow {
            id: QuizId::new(id).unwrap(),
            title: None,
            domain: None,
            topic: None,
            standard: None,
            description: None,
            question_count: None,
            variety_tag: None,
            score: None,
            subject: None,
            grade: None,
        }
    }

    #[test]
    fn question_count_reads_leading_digits() {
        assert_eq!(parse_question_count("12"), 12);
        assert_eq!(parse_question_count(" 12 questions"), 12);
        assert_eq!(parse_question_count("about 12"), 0);
        assert_eq!(parse_question_count("-3"), 0);
        assert_eq!(parse_question_count("0"), 0);
    }

    #[test]
    fn score_reads_leading_float() {
        assert_eq!(parse_score("2.5"), Some(2.5));
        assert_eq!(parse_score("4.25 / 5"), Some(4.25));
        assert_eq!(parse_score(".5"), Some(0.5));
        assert_eq!(parse_score("-1e2x"), Some(-100.0));
        assert_eq!(parse_score("0"), Some(0.0));
        assert_eq!(parse_score("n/a"), None);
        assert_eq!(parse_score("."), None);
    }

    #[test]
    fn absent_score_stays_unset_and_count_defaults_to_zero() {
        let record = to_quiz_record(row("abcdefabcdefabcdefab"));
        assert_eq!(record.score, None);
        assert_eq!(record.question_count, 0);
        assert_eq!(record.title, None);
        assert_eq!(record.display_title(), "Quiz abcdefab...");
    }

    #[test]
    fn numeric_fields_are_coerced() {
        let mut raw = row("abcdefabcdefabcdefab");
        raw.question_count = Some("15".into());
        raw.score = Some("3.75".into());
        raw.title = Some("Ratios".into());
        let record = to_quiz_record(raw);
        assert_eq!(record.question_count, 15);
        assert_eq!(record.score, Some(3.75));
        assert_eq!(record.display_title(), "Ratios");
    }
}
