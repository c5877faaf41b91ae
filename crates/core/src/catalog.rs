//! A loaded batch: records, their tree, and the live search state.

use std::sync::Arc;

use crate::csv::parse_quiz_rows;
use crate::model::{QuizId, QuizRecord};
use crate::search::SearchCache;
use crate::summary::to_quiz_records;
use crate::tree::{TreeNode, build_tree};

/// Quiz records of one browsing session plus their navigation tree.
///
/// The tree is rebuilt whenever the record list is replaced; it is never
/// patched in place.
#[derive(Debug, Default)]
pub struct QuizCatalog {
    records: Vec<QuizRecord>,
    tree: Arc<Vec<TreeNode>>,
    search: SearchCache,
}

impl QuizCatalog {
    #[must_use]
    pub fn new(records: Vec<QuizRecord>) -> Self {
        let tree = Arc::new(build_tree(&records));
        Self {
            records,
            tree,
            search: SearchCache::new(),
        }
    }

    /// Parse CSV text straight into a catalog.
    #[must_use]
    pub fn from_csv(text: &str) -> Self {
        Self::new(to_quiz_records(parse_quiz_rows(text)))
    }

    pub fn replace_records(&mut self, records: Vec<QuizRecord>) {
        *self = Self::new(records);
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn tree(&self) -> Arc<Vec<TreeNode>> {
        Arc::clone(&self.tree)
    }

    /// Filtered tree for `term`, memoized against the current tree.
    pub fn search(&mut self, term: &str) -> Arc<Vec<TreeNode>> {
        self.search.filter(&self.tree, term)
    }

    #[must_use]
    pub fn find(&self, id: &QuizId) -> Option<&QuizRecord> {
        self.records.iter().find(|record| &record.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::NodeKind;

    const SAMPLE: &str = "id,domain,topic,standard,score\n\
                          abcdefabcdefabcdefab,Math,Algebra,STD1,2.5\n\
                          abcdefabcdefabcdefac,Math,Algebra,STD1,1.0";

    #[test]
    fn csv_to_tree_end_to_end() {
        let catalog = QuizCatalog::from_csv(SAMPLE);
        assert_eq!(catalog.len(), 2);

        let tree = catalog.tree();
        assert_eq!(tree.len(), 1);
        let domain = &tree[0];
        assert_eq!((domain.kind, domain.name.as_str()), (NodeKind::Domain, "Math"));
        assert_eq!(domain.children.len(), 1);
        let topic = &domain.children[0];
        assert_eq!((topic.kind, topic.name.as_str()), (NodeKind::Topic, "Algebra"));
        assert_eq!(topic.children.len(), 1);
        let standard = &topic.children[0];
        assert_eq!((standard.kind, standard.name.as_str()), (NodeKind::Standard, "STD1"));
        assert_eq!(standard.children.len(), 1);
        let variety = &standard.children[0];
        assert_eq!((variety.kind, variety.name.as_str()), (NodeKind::Variety, "General"));

        let scores: Vec<_> = variety
            .children
            .iter()
            .map(|leaf| leaf.quiz.as_ref().and_then(|q| q.score))
            .collect();
        assert_eq!(scores, vec![Some(2.5), Some(1.0)]);
    }

    #[test]
    fn search_is_memoized_until_records_change() {
        let mut catalog = QuizCatalog::from_csv(SAMPLE);
        let first = catalog.search("abcdefac");
        let again = catalog.search("abcdefac");
        assert!(Arc::ptr_eq(&first, &again));

        catalog.replace_records(Vec::new());
        assert!(catalog.search("abcdefac").is_empty());
    }

    #[test]
    fn find_by_id() {
        let catalog = QuizCatalog::from_csv(SAMPLE);
        let id = QuizId::new("abcdefabcdefabcdefac").unwrap();
        assert_eq!(catalog.find(&id).and_then(|r| r.score), Some(1.0));
    }
}
