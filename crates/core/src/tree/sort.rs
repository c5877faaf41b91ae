use std::cmp::Ordering;

use super::{DOMAIN_REVIEW, TOPIC_REVIEW, TreeNode};

/// Sort a forest in place, recursively.
///
/// Quiz siblings: score descending, unscored last, then name, then quiz id.
/// Group siblings: review placeholders first, then name, then kind and
/// hierarchy key, so the order never depends on insertion order.
pub fn sort_nodes(nodes: &mut [TreeNode]) {
    nodes.sort_by(compare_siblings);
    for node in nodes.iter_mut() {
        sort_nodes(&mut node.children);
    }
}

fn compare_siblings(a: &TreeNode, b: &TreeNode) -> Ordering {
    match (a.is_quiz(), b.is_quiz()) {
        (true, true) => compare_quizzes(a, b),
        (false, false) => compare_groups(a, b),
        // never mixed in a built tree; keep groups ahead if it happens
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
    }
}

fn compare_quizzes(a: &TreeNode, b: &TreeNode) -> Ordering {
    score_of(b)
        .total_cmp(&score_of(a))
        .then_with(|| compare_names(&a.name, &b.name))
        .then_with(|| a.id.cmp(&b.id))
}

fn compare_groups(a: &TreeNode, b: &TreeNode) -> Ordering {
    match (is_review(a), is_review(b)) {
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        _ => compare_names(&a.name, &b.name)
            .then_with(|| a.kind.cmp(&b.kind))
            .then_with(|| a.id.cmp(&b.id)),
    }
}

fn score_of(node: &TreeNode) -> f64 {
    node.quiz
        .as_ref()
        .and_then(|quiz| quiz.score)
        .unwrap_or(f64::NEG_INFINITY)
}

fn is_review(node: &TreeNode) -> bool {
    node.name == DOMAIN_REVIEW || node.name == TOPIC_REVIEW
}

fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}
