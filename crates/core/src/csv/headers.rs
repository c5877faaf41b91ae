use std::collections::HashMap;

/// Canonical fields a CSV column can feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CsvField {
    QuizId,
    Domain,
    Topic,
    Standard,
    VarietyTag,
    QuestionCount,
    Score,
    Description,
    Title,
    Subject,
    Grade,
}

#[derive(Debug, Clone, Copy)]
enum Pattern {
    Contains(&'static str),
    ContainsAll(&'static [&'static str]),
    Equals(&'static str),
}

impl Pattern {
    fn matches(self, header: &str) -> bool {
        match self {
            Pattern::Contains(needle) => header.contains(needle),
            Pattern::ContainsAll(needles) => needles.iter().all(|n| header.contains(n)),
            Pattern::Equals(expected) => header == expected,
        }
    }
}

struct HeaderRule {
    field: CsvField,
    patterns: &'static [Pattern],
}

/// Evaluated top to bottom against the lowercased header; the first hit wins.
///
/// Order matters: "quiz name" must not become an id column and "subject area"
/// must be claimed by `Domain` before `Subject` sees it.
const HEADER_RULES: &[HeaderRule] = &[
    HeaderRule {
        field: CsvField::QuizId,
        patterns: &[
            Pattern::ContainsAll(&["quiz", "id"]),
            Pattern::Equals("id"),
            Pattern::Contains("quizizz"),
        ],
    },
    HeaderRule {
        field: CsvField::Domain,
        patterns: &[Pattern::Contains("domain"), Pattern::Contains("subject area")],
    },
    HeaderRule {
        field: CsvField::Topic,
        patterns: &[Pattern::Contains("topic")],
    },
    HeaderRule {
        field: CsvField::Standard,
        patterns: &[Pattern::Contains("standard")],
    },
    HeaderRule {
        field: CsvField::VarietyTag,
        patterns: &[Pattern::Contains("variety"), Pattern::Contains("tag")],
    },
    HeaderRule {
        field: CsvField::QuestionCount,
        patterns: &[Pattern::Contains("question")],
    },
    HeaderRule {
        field: CsvField::Score,
        patterns: &[Pattern::Contains("score"), Pattern::Contains("rating")],
    },
    HeaderRule {
        field: CsvField::Description,
        patterns: &[Pattern::Contains("description")],
    },
    HeaderRule {
        field: CsvField::Title,
        patterns: &[Pattern::Contains("title"), Pattern::Contains("name")],
    },
    HeaderRule {
        field: CsvField::Subject,
        patterns: &[Pattern::Contains("subject")],
    },
    HeaderRule {
        field: CsvField::Grade,
        patterns: &[Pattern::Contains("grade")],
    },
];

/// Classify a single header cell.
#[must_use]
pub fn classify_header(header: &str) -> Option<CsvField> {
    let normalized = header.trim().to_lowercase();
    if normalized.is_empty() {
        return None;
    }
    HEADER_RULES
        .iter()
        .find(|rule| rule.patterns.iter().any(|p| p.matches(&normalized)))
        .map(|rule| rule.field)
}

/// Column positions resolved from a header row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnMap {
    id_columns: Vec<usize>,
    fields: HashMap<CsvField, usize>,
}

impl ColumnMap {
    /// Every id-like column is kept; other fields take the leftmost column.
    #[must_use]
    pub fn from_headers(headers: &[String]) -> Self {
        let mut map = Self::default();
        for (idx, header) in headers.iter().enumerate() {
            match classify_header(header) {
                Some(CsvField::QuizId) => map.id_columns.push(idx),
                Some(field) => {
                    map.fields.entry(field).or_insert(idx);
                }
                None => {}
            }
        }
        map
    }

    #[must_use]
    pub fn id_columns(&self) -> &[usize] {
        &self.id_columns
    }

    #[must_use]
    pub fn column(&self, field: CsvField) -> Option<usize> {
        self.fields.get(&field).copied()
    }

    /// The trimmed cell for `field`, or `None` when missing or empty.
    #[must_use]
    pub fn cell<'a>(&self, cells: &'a [String], field: CsvField) -> Option<&'a str> {
        self.column(field)
            .and_then(|idx| cells.get(idx))
            .map(|c| c.trim())
            .filter(|c| !c.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|h| (*h).to_string()).collect()
    }

    #[test]
    fn id_synonyms_are_recognized() {
        assert_eq!(classify_header("Quiz ID"), Some(CsvField::QuizId));
        assert_eq!(classify_header(" id "), Some(CsvField::QuizId));
        assert_eq!(classify_header("Quizizz Link"), Some(CsvField::QuizId));
        assert_eq!(classify_header("identifier"), None);
    }

    #[test]
    fn subject_area_is_a_domain() {
        assert_eq!(classify_header("Subject Area"), Some(CsvField::Domain));
        assert_eq!(classify_header("Subject"), Some(CsvField::Subject));
    }

    #[test]
    fn quiz_name_is_a_title_not_an_id() {
        assert_eq!(classify_header("Quiz Name"), Some(CsvField::Title));
    }

    #[test]
    fn leftmost_column_wins_for_fields() {
        let map = ColumnMap::from_headers(&headers(&["topic", "Topic (alt)", "quiz_id", "ID"]));
        assert_eq!(map.column(CsvField::Topic), Some(0));
        assert_eq!(map.id_columns(), &[2, 3]);
    }

    #[test]
    fn cell_skips_blank_and_missing() {
        let map = ColumnMap::from_headers(&headers(&["id", "domain", "topic"]));
        let cells = headers(&["abc", "  "]);
        assert_eq!(map.cell(&cells, CsvField::Domain), None);
        assert_eq!(map.cell(&cells, CsvField::Topic), None);
    }
}
