//! Live search over the navigation tree.

use std::sync::Arc;

use crate::tree::TreeNode;

/// Keep the nodes matching `term` and the ancestors leading to them.
///
/// Matching is a case-insensitive substring test on the node name, and for
/// quiz leaves also on the quiz id and display title. Ancestors kept only
/// because of a matching descendant are expanded; direct matches keep their
/// expansion state. A blank term returns the forest unchanged.
#[must_use]
pub fn filter_nodes(nodes: &[TreeNode], term: &str) -> Vec<TreeNode> {
    let needle = normalize_term(term);
    if needle.is_empty() {
        return nodes.to_vec();
    }
    filter_level(nodes, &needle)
}

/// Shared-forest variant: a blank term hands back the same `Arc`.
#[must_use]
pub fn filter_forest(forest: &Arc<Vec<TreeNode>>, term: &str) -> Arc<Vec<TreeNode>> {
    let needle = normalize_term(term);
    if needle.is_empty() {
        return Arc::clone(forest);
    }
    Arc::new(filter_level(forest, &needle))
}

fn normalize_term(term: &str) -> String {
    term.trim().to_lowercase()
}

fn filter_level(nodes: &[TreeNode], needle: &str) -> Vec<TreeNode> {
    nodes
        .iter()
        .filter_map(|node| filter_node(node, needle))
        .collect()
}

fn filter_node(node: &TreeNode, needle: &str) -> Option<TreeNode> {
    let matches = node_matches(node, needle);
    let children = filter_level(&node.children, needle);
    if !matches && children.is_empty() {
        return None;
    }
    Some(TreeNode {
        id: node.id.clone(),
        name: node.name.clone(),
        kind: node.kind,
        expanded: if matches { node.expanded } else { true },
        children,
        quiz: node.quiz.clone(),
        description: node.description.clone(),
    })
}

fn node_matches(node: &TreeNode, needle: &str) -> bool {
    if node.name.to_lowercase().contains(needle) {
        return true;
    }
    match &node.quiz {
        Some(quiz) => {
            quiz.id.as_str().to_lowercase().contains(needle)
                || quiz.display_title().to_lowercase().contains(needle)
        }
        None => false,
    }
}

/// Remembers the last `(forest, term)` filter so repeated renders with the
/// same inputs reuse the result.
///
/// Forests are compared by `Arc` identity, not by content; a rebuilt tree
/// always misses.
#[derive(Debug, Default)]
pub struct SearchCache {
    last: Option<CachedSearch>,
}

#[derive(Debug)]
struct CachedSearch {
    forest: Arc<Vec<TreeNode>>,
    term: String,
    result: Arc<Vec<TreeNode>>,
}

impl SearchCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(&mut self, forest: &Arc<Vec<TreeNode>>, term: &str) -> Arc<Vec<TreeNode>> {
        let term = normalize_term(term);
        if let Some(cached) = &self.last {
            if Arc::ptr_eq(&cached.forest, forest) && cached.term == term {
                return Arc::clone(&cached.result);
            }
        }
        let result = filter_forest(forest, &term);
        self.last = Some(CachedSearch {
            forest: Arc::clone(forest),
            term,
            result: Arc::clone(&result),
        });
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{QuizId, QuizRecord};
    use crate::tree::{NodeKind, build_tree};

    fn record(id: &str, title: &str, domain: &str, topic: &str, standard: &str) -> QuizRecord {
        let mut record = QuizRecord::bare(QuizId::new(id).unwrap());
        record.title = Some(title.to_string());
        record.domain = Some(domain.to_string());
        record.topic = Some(topic.to_string());
        record.standard = Some(standard.to_string());
        record
    }

    fn sample_forest() -> Vec<TreeNode> {
        build_tree(&[
            record("aaaaaaaaaaaaaaaaaaaa", "Linear equations", "Math", "Algebra", "A.1"),
            record("bbbbbbbbbbbbbbbbbbbb", "Quadratics", "Math", "Algebra", "A.2"),
            record("cccccccccccccccccccc", "Cells", "Science", "Biology", "B.1"),
        ])
    }

    fn all_nodes(nodes: &[TreeNode]) -> Vec<&TreeNode> {
        let mut out = Vec::new();
        for node in nodes {
            out.push(node);
            out.extend(all_nodes(&node.children));
        }
        out
    }

    #[test]
    fn blank_term_returns_forest_unchanged() {
        let forest = sample_forest();
        assert_eq!(filter_nodes(&forest, ""), forest);
        assert_eq!(filter_nodes(&forest, "   "), forest);

        let shared = Arc::new(forest);
        assert!(Arc::ptr_eq(&filter_forest(&shared, ""), &shared));
    }

    #[test]
    fn deep_title_match_keeps_expanded_ancestor_chain() {
        let filtered = filter_nodes(&sample_forest(), "QUADRATIC");

        assert_eq!(filtered.len(), 1);
        let domain = &filtered[0];
        assert_eq!(domain.name, "Math");
        assert!(domain.expanded);
        let topic = &domain.children[0];
        assert_eq!(topic.children.len(), 1);
        let standard = &topic.children[0];
        assert_eq!(standard.name, "A.2");
        assert!(standard.expanded);
        let variety = &standard.children[0];
        assert!(variety.expanded);
        assert_eq!(variety.children.len(), 1);
        assert_eq!(variety.children[0].name, "Quadratics");
        assert!(!variety.children[0].expanded);
    }

    #[test]
    fn matches_by_quiz_id() {
        let filtered = filter_nodes(&sample_forest(), "cccccccc");
        let leaves: Vec<_> = all_nodes(&filtered)
            .into_iter()
            .filter(|n| n.kind == NodeKind::Quiz)
            .collect();
        assert_eq!(leaves.len(), 1);
        assert_eq!(leaves[0].name, "Cells");
    }

    #[test]
    fn direct_group_match_keeps_expansion_state() {
        let filtered = filter_nodes(&sample_forest(), "science");
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].name, "Science");
        assert!(!filtered[0].expanded);
        assert!(filtered[0].children.is_empty());
    }

    #[test]
    fn no_match_gives_empty_forest() {
        assert!(filter_nodes(&sample_forest(), "history").is_empty());
    }

    #[test]
    fn cache_reuses_result_for_same_forest_and_term() {
        let forest = Arc::new(sample_forest());
        let mut cache = SearchCache::new();
        let first = cache.filter(&forest, "cells");
        let second = cache.filter(&forest, " Cells ");
        assert!(Arc::ptr_eq(&first, &second));

        let rebuilt = Arc::new(sample_forest());
        let third = cache.filter(&rebuilt, "cells");
        assert!(!Arc::ptr_eq(&first, &third));
        assert_eq!(*first, *third);
    }
}
