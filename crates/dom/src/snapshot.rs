//! Deterministic display-tree serialization for test comparisons.
//!
//! Not a stable public format. Equivalence rules:
//! - node kinds and element tags must match;
//! - attributes and live properties must match (order is canonical, maps
//!   are sorted by name);
//! - text payloads must match exactly;
//! - listener registrations are not part of the snapshot.

use crate::node::{Node, PropertyValue};
use std::fmt::Write;

#[derive(Debug)]
pub struct TreeSnapshot {
    lines: Vec<String>,
}

impl TreeSnapshot {
    pub fn new(root: &Node) -> Self {
        let mut lines = Vec::new();
        walk(root, 0, &mut lines);
        TreeSnapshot { lines }
    }

    pub fn as_lines(&self) -> &[String] {
        &self.lines
    }

    pub fn render(&self) -> String {
        self.lines.join("\n")
    }
}

fn walk(node: &Node, depth: usize, lines: &mut Vec<String>) {
    let mut line = "  ".repeat(depth);
    if let Some(text) = node.text_content() {
        let _ = write!(&mut line, "text {text:?}");
    } else {
        let tag = node.tag().unwrap_or_default();
        let _ = write!(&mut line, "element {tag}");
        for (name, value) in node.attributes() {
            let _ = write!(&mut line, " {name}={value:?}");
        }
        for (name, value) in node.properties() {
            match value {
                PropertyValue::Bool(flag) => {
                    let _ = write!(&mut line, " .{name}={flag}");
                }
                PropertyValue::Str(text) => {
                    let _ = write!(&mut line, " .{name}={text:?}");
                }
            }
        }
    }
    lines.push(line);
    for index in 0..node.child_count() {
        if let Some(child) = node.child(index) {
            walk(&child, depth + 1, lines);
        }
    }
}

/// Panics with both serialized trees when they differ.
pub fn assert_tree_eq(expected: &Node, actual: &Node) {
    let expected = TreeSnapshot::new(expected).render();
    let actual = TreeSnapshot::new(actual).render();
    if expected != actual {
        panic!("display trees differ\n--- expected ---\n{expected}\n--- actual ---\n{actual}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_is_deterministic_and_indented() {
        let root = Node::element("div");
        root.set_attribute("class", "wrap");
        let child = Node::element("input");
        child.set_property("checked", PropertyValue::Bool(true));
        root.append_child(&child);
        root.append_child(&Node::text("hi"));

        let snapshot = TreeSnapshot::new(&root);
        assert_eq!(
            snapshot.as_lines(),
            [
                "element div class=\"wrap\"",
                "  element input .checked=true",
                "  text \"hi\"",
            ]
        );
    }
}
