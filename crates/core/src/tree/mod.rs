//! Navigation tree: domain → topic → standard → variety → quiz.

mod builder;
mod sort;

use serde::{Deserialize, Serialize};

use crate::model::QuizRecord;

pub use builder::{DOMAIN_REVIEW, DEFAULT_VARIETY, TOPIC_REVIEW, UNCATEGORIZED, build_tree};
pub use sort::sort_nodes;

/// Level of a node in the navigation tree, outermost first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Domain,
    Topic,
    Standard,
    Variety,
    Quiz,
}

impl NodeKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            NodeKind::Domain => "domain",
            NodeKind::Topic => "topic",
            NodeKind::Standard => "standard",
            NodeKind::Variety => "variety",
            NodeKind::Quiz => "quiz",
        }
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One node of the navigation tree.
///
/// Grouping nodes (everything but `Quiz`) exist only because some record
/// referenced them; quiz nodes are leaves that carry their record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeNode {
    /// Hierarchy key, e.g. `domain:Math/topic:Algebra`, or `quiz-<id>`.
    pub id: String,
    pub name: String,
    pub kind: NodeKind,
    pub children: Vec<TreeNode>,
    pub quiz: Option<QuizRecord>,
    pub expanded: bool,
    pub description: Option<String>,
}

impl TreeNode {
    pub(crate) fn group(kind: NodeKind, name: &str, id: String) -> Self {
        Self {
            id,
            name: name.to_string(),
            kind,
            children: Vec::new(),
            quiz: None,
            expanded: false,
            description: None,
        }
    }

    pub(crate) fn leaf(record: &QuizRecord) -> Self {
        Self {
            id: format!("quiz-{}", record.id),
            name: record.display_title(),
            kind: NodeKind::Quiz,
            children: Vec::new(),
            description: record.description.clone(),
            quiz: Some(record.clone()),
            expanded: false,
        }
    }

    #[must_use]
    pub fn is_quiz(&self) -> bool {
        self.kind == NodeKind::Quiz
    }

    /// Number of quiz leaves in this subtree.
    #[must_use]
    pub fn quiz_count(&self) -> usize {
        if self.is_quiz() {
            return 1;
        }
        self.children.iter().map(TreeNode::quiz_count).sum()
    }
}
