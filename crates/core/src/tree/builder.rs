use tracing::debug;

use super::{NodeKind, TreeNode, sort_nodes};
use crate::model::QuizRecord;

/// Placeholder under a domain whose quizzes name no topic or standard.
pub const DOMAIN_REVIEW: &str = "Domain Review";
/// Placeholder under a topic whose quizzes name no standard.
pub const TOPIC_REVIEW: &str = "Topic Review";
/// Placeholder for quizzes with no usable classification at all.
pub const UNCATEGORIZED: &str = "Uncategorized";
/// Variety used when a quiz has no variety tag.
pub const DEFAULT_VARIETY: &str = "General";

/// Build the navigation forest for `records`.
///
/// The forest is rebuilt from scratch on every call. Records sharing the
/// same (domain, topic, standard, variety) end up under the same nodes, and
/// the result is sorted (see [`sort_nodes`]).
#[must_use]
pub fn build_tree(records: &[QuizRecord]) -> Vec<TreeNode> {
    let mut roots = Vec::new();
    for record in records {
        insert_record(&mut roots, record);
    }
    sort_nodes(&mut roots);

    debug!(
        records = records.len(),
        roots = roots.len(),
        "built quiz tree"
    );
    roots
}

/// Where a record hangs below its domain/topic: the kind and name of the
/// standard-level node.
fn review_slot(record: &QuizRecord) -> (NodeKind, &str) {
    let domain = present(record.domain.as_deref());
    let topic = present(record.topic.as_deref());
    let standard = present(record.standard.as_deref());

    match (domain, topic, standard) {
        (_, _, Some(standard)) => (NodeKind::Standard, standard),
        (Some(_), None, None) => (NodeKind::Domain, DOMAIN_REVIEW),
        (Some(_), Some(_), None) => (NodeKind::Topic, TOPIC_REVIEW),
        (None, _, None) => (NodeKind::Standard, UNCATEGORIZED),
    }
}

fn insert_record(roots: &mut Vec<TreeNode>, record: &QuizRecord) {
    let mut key = String::new();
    let mut level: &mut Vec<TreeNode> = roots;

    if let Some(domain) = present(record.domain.as_deref()) {
        let node = find_or_insert(level, NodeKind::Domain, domain, &mut key);
        level = &mut node.children;
    }
    if let Some(topic) = present(record.topic.as_deref()) {
        let node = find_or_insert(level, NodeKind::Topic, topic, &mut key);
        level = &mut node.children;
    }

    let (slot_kind, slot_name) = review_slot(record);
    let standard = find_or_insert(level, slot_kind, slot_name, &mut key);
    assert!(
        standard.kind == slot_kind && !matches!(standard.kind, NodeKind::Variety | NodeKind::Quiz),
        "variety `{}` would hang below {} node `{}`",
        record.variety_tag.as_deref().unwrap_or(DEFAULT_VARIETY),
        standard.kind,
        standard.id,
    );

    let tag = present(record.variety_tag.as_deref()).unwrap_or(DEFAULT_VARIETY);
    let variety = find_or_insert(&mut standard.children, NodeKind::Variety, tag, &mut key);
    variety.children.push(TreeNode::leaf(record));
}

/// Reuse the sibling with the same kind and name, or append a new one.
///
/// `key` holds the parent's hierarchy key on entry and this node's on exit.
fn find_or_insert<'a>(
    siblings: &'a mut Vec<TreeNode>,
    kind: NodeKind,
    name: &str,
    key: &mut String,
) -> &'a mut TreeNode {
    if !key.is_empty() {
        key.push('/');
    }
    key.push_str(kind.as_str());
    key.push(':');
    key.push_str(name);

    let pos = match siblings
        .iter()
        .position(|node| node.kind == kind && node.name == name)
    {
        Some(pos) => pos,
        None => {
            siblings.push(TreeNode::group(kind, name, key.clone()));
            siblings.len() - 1
        }
    };
    &mut siblings[pos]
}

fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
