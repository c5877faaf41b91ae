use std::fmt::Write as _;

use curator_core::model::Assignment;
use curator_core::tree::{NodeKind, TreeNode};
use services::QuizPreview;
use storage::repository::ObjectMeta;

/// Indented text outline of a forest, two spaces per level.
pub fn tree(nodes: &[TreeNode]) -> String {
    let mut out = String::new();
    for node in nodes {
        write_node(&mut out, node, 0);
    }
    out
}

fn write_node(out: &mut String, node: &TreeNode, depth: usize) {
    let indent = "  ".repeat(depth);
    match (&node.quiz, node.kind) {
        (Some(quiz), NodeKind::Quiz) => {
            let score = quiz
                .score
                .map_or_else(|| "-".to_string(), |s| format!("{s}"));
            let _ = writeln!(
                out,
                "{indent}[{score}] {} ({}, {} questions)",
                node.name, quiz.id, quiz.question_count
            );
        }
        _ => {
            let _ = writeln!(
                out,
                "{indent}{} ({}, {} quizzes)",
                node.name,
                node.kind,
                node.quiz_count()
            );
        }
    }
    for child in &node.children {
        write_node(out, child, depth + 1);
    }
}

pub fn batches(batches: &[ObjectMeta]) -> String {
    let mut out = String::new();
    for meta in batches {
        let _ = writeln!(
            out,
            "{}\t{} bytes\t{}",
            meta.name,
            meta.size,
            meta.updated_at.to_rfc3339()
        );
    }
    out
}

pub fn assignments(assignments: &[Assignment]) -> String {
    let mut out = String::new();
    for assignment in assignments {
        let _ = writeln!(
            out,
            "{}\t{}\t{}",
            assignment.batch,
            assignment.reviewer,
            assignment.assigned_at.to_rfc3339()
        );
    }
    out
}

pub fn preview(preview: &QuizPreview) -> String {
    match &preview.detail {
        Ok(detail) => {
            let mut out = format!(
                "{}: {} ({} questions)\n  embed: {}\n",
                detail.id, detail.name, detail.question_count, preview.embed_url
            );
            if let Some(subject) = &detail.subject {
                let _ = writeln!(out, "  subject: {subject}");
            }
            if let Some(grade) = &detail.grade {
                let _ = writeln!(out, "  grade: {grade}");
            }
            if let Some(image) = &detail.image_url {
                let _ = writeln!(out, "  image: {image}");
            }
            out
        }
        Err(err) => format!("{}: {err}\n  embed: {}\n", preview.id, preview.embed_url),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use curator_core::QuizCatalog;

    #[test]
    fn renders_outline_with_scores() {
        let catalog = QuizCatalog::from_csv(
            "id,title,domain,score\n\
             abcdefabcdefabcdefab,Fractions,Math,2.5\n\
             abcdefabcdefabcdefac,Decimals,Math,",
        );
        let text = tree(&catalog.tree());
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[0], "Math (domain, 2 quizzes)");
        assert_eq!(lines[1], "  Domain Review (domain, 2 quizzes)");
        assert_eq!(lines[2], "    General (variety, 2 quizzes)");
        assert_eq!(
            lines[3],
            "      [2.5] Fractions (abcdefabcdefabcdefab, 0 questions)"
        );
        assert_eq!(
            lines[4],
            "      [-] Decimals (abcdefabcdefabcdefac, 0 questions)"
        );
    }
}
