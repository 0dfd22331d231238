//! Rebuild a concept tree from flat broader/narrower rows.
//!
//! Rows come from an aggregate query whose `length` column counts the hops from the concept scheme
//! and is not reliable, so nesting is derived from parent links and `length` is only consulted
//! to detect known artifacts.
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use url::form_urlencoded::byte_serialize;

/// Typed input row, built once from query results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HierarchyRow {
    pub length: u32,
    pub concept_uri: String,
    pub pref_label: String,
    /// Broader concept or the concept scheme itself for top concepts.
    pub parent_uri: Option<String>,
}

impl HierarchyRow {
    pub fn new(length: u32, concept_uri: impl Into<String>, pref_label: impl Into<String>, parent_uri: Option<impl Into<String>>) -> Self {
        HierarchyRow { length, concept_uri: concept_uri.into(), pref_label: pref_label.into(), parent_uri: parent_uri.map(Into::into) }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HierarchyNode {
    /// Nesting level starting at 1 for top concepts.
    pub depth: u32,
    /// Raw length value of the source row.
    pub length: u32,
    pub concept_uri: String,
    pub pref_label: String,
    /// None for top concepts.
    pub parent_uri: Option<String>,
}

/// Orders the rows as a pre-order walk with at most one node per label and assigns depths.
/// Rows with the scheme or no parent are top concepts. A row whose parent never appears is placed at the front.
pub fn build_hierarchy(rows: &[HierarchyRow], scheme_uri: &str) -> Vec<HierarchyNode> {
    let mut nodes: Vec<HierarchyNode> = Vec::with_capacity(rows.len());
    let mut labels_seen = HashSet::<&str>::new();
    let mut previous_parent: Option<&str> = None;
    let mut last_inserted = 0;
    for row in rows {
        if labels_seen.contains(row.pref_label.as_str()) {
            continue;
        }
        let parent = row.parent_uri.as_deref().filter(|p| *p != scheme_uri);
        let node = HierarchyNode { depth: 0, length: row.length, concept_uri: row.concept_uri.clone(), pref_label: row.pref_label.clone(), parent_uri: parent.map(str::to_owned) };
        let index = match parent {
            None => nodes.len(),
            Some(p) if !nodes.is_empty() && previous_parent == Some(p) => last_inserted + 1,
            Some(p) => match nodes.iter().position(|n| n.concept_uri == p) {
                Some(parent_index) => parent_index + 1,
                None => {
                    log::warn!("parent {p} of concept {} not found in hierarchy of {scheme_uri}, placing it first", row.concept_uri);
                    0
                }
            },
        };
        nodes.insert(index, node);
        last_inserted = index;
        labels_seen.insert(&row.pref_label);
        previous_parent = parent;
    }
    assign_depths(&mut nodes);
    nodes
}

/// Derives the depth of each node from the depth of its parent earlier in the sequence.
/// When the raw length jumps by more than two, a query artifact, a sibling's depth is reused.
fn assign_depths(nodes: &mut [HierarchyNode]) {
    let mut tracked = HashMap::<String, u32>::new();
    // parent -> depth of the first tracked child
    let mut sibling_depth = HashMap::<String, u32>::new();
    let mut previous_length = 1;
    for node in nodes.iter_mut() {
        node.depth = match &node.parent_uri {
            None => 1,
            Some(parent) => {
                let sibling = if node.length > previous_length + 2 { sibling_depth.get(parent).copied() } else { None };
                sibling.or_else(|| tracked.get(parent).map(|d| d + 1)).unwrap_or(1)
            }
        };
        if let Some(parent) = &node.parent_uri {
            sibling_depth.entry(parent.clone()).or_insert(node.depth);
        }
        tracked.insert(node.concept_uri.clone(), node.depth);
        previous_length = node.length;
    }
}

/// Link to the concept page of a vocabulary.
pub fn concept_link(base: &str, vocab_id: &str, uri: &str) -> String {
    let vocab_id: String = byte_serialize(vocab_id.as_bytes()).collect();
    let uri: String = byte_serialize(uri.as_bytes()).collect();
    format!("{base}/object?vocab_id={vocab_id}&uri={uri}")
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;").replace('"', "&quot;").replace('\'', "&#39;")
}

/// Tab indented Markdown list with one link per concept.
pub fn to_markdown(nodes: &[HierarchyNode], base: &str, vocab_id: &str) -> String {
    let mut s = String::new();
    for node in nodes {
        let indent = "\t".repeat(node.depth.saturating_sub(1) as usize);
        s += &format!("{indent}* [{}]({})\n", node.pref_label, concept_link(base, vocab_id, &node.concept_uri));
    }
    s
}

/// Nested HTML lists. Uses an explicit stack of open lists so that arbitrarily deep trees are fine.
/// Depth increases by more than one level are clamped to one level.
pub fn to_html(nodes: &[HierarchyNode], base: &str, vocab_id: &str) -> String {
    if nodes.is_empty() {
        return String::new();
    }
    let mut s = String::from("<ul class='hierarchy'>\n");
    // depth of each open <ul>, an <li> is open inside every one of them
    let mut open: Vec<u32> = vec![1];
    let mut first = true;
    for node in nodes {
        let depth = node.depth.max(1);
        let current = *open.last().unwrap_or(&1);
        if first {
            first = false;
        } else if depth > current {
            s += "\n<ul>\n";
            open.push(current + 1);
        } else {
            s += "</li>\n";
            while open.len() > 1 && open.last().is_some_and(|d| *d > depth) {
                open.pop();
                s += "</ul>\n</li>\n";
            }
        }
        s += &format!("<li><a href='{}'>{}</a>", escape(&concept_link(base, vocab_id, &node.concept_uri)), escape(&node.pref_label));
    }
    s += "</li>\n";
    while open.len() > 1 {
        open.pop();
        s += "</ul>\n</li>\n";
    }
    s += "</ul>\n";
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCHEME: &str = "http://example.org/scheme";

    fn row(length: u32, uri: &str, label: &str, parent: &str) -> HierarchyRow {
        HierarchyRow::new(length, uri, label, Some(parent))
    }

    fn labels(nodes: &[HierarchyNode]) -> Vec<&str> {
        nodes.iter().map(|n| n.pref_label.as_str()).collect()
    }

    #[test]
    fn test_empty() {
        assert!(build_hierarchy(&[], SCHEME).is_empty());
        assert_eq!(to_html(&[], "", "v"), "");
        assert_eq!(to_markdown(&[], "", "v"), "");
    }

    #[test]
    fn test_duplicate_labels() {
        let rows = [row(1, "A", "Contact", SCHEME), row(1, "B", "Contact", SCHEME), row(2, "C", "Contact", "A")];
        let nodes = build_hierarchy(&rows, SCHEME);
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].concept_uri, "A");
    }

    #[test]
    fn test_top_concepts_keep_input_order() {
        let rows = [row(1, "B", "Beta", SCHEME), row(1, "A", "Alpha", SCHEME)];
        let nodes = build_hierarchy(&rows, SCHEME);
        assert_eq!(labels(&nodes), vec!["Beta", "Alpha"]);
        assert!(nodes.iter().all(|n| n.parent_uri.is_none() && n.depth == 1));
    }

    #[test]
    fn test_parent_child_adjacency() {
        let rows = [row(1, "A", "Alpha", SCHEME), row(2, "B", "Beta", "A"), row(2, "C", "Gamma", "A")];
        let nodes = build_hierarchy(&rows, SCHEME);
        assert_eq!(labels(&nodes), vec!["Alpha", "Beta", "Gamma"]);
        assert_eq!(nodes[1].depth, 2);
        assert_eq!(nodes[2].depth, 2);
        assert_eq!(nodes[1].parent_uri.as_deref(), Some("A"));
    }

    #[test]
    fn test_rows_ordered_by_length() {
        // the aggregate query orders by length, then parent, then label
        let rows = [
            row(1, "A", "Alpha", SCHEME),
            row(1, "D", "Delta", SCHEME),
            row(2, "B", "Beta", "A"),
            row(2, "C", "Gamma", "A"),
            row(2, "E", "Epsilon", "D"),
            row(3, "F", "Zeta", "B"),
        ];
        let nodes = build_hierarchy(&rows, SCHEME);
        assert_eq!(labels(&nodes), vec!["Alpha", "Beta", "Zeta", "Gamma", "Delta", "Epsilon"]);
        assert_eq!(nodes.iter().map(|n| n.depth).collect::<Vec<_>>(), vec![1, 2, 3, 2, 1, 2]);
    }

    #[test]
    fn test_orphan_placed_first() {
        let rows = [row(1, "A", "Alpha", SCHEME), row(2, "X", "Orphan", "missing"), row(2, "Y", "Orphan sibling", "missing")];
        let nodes = build_hierarchy(&rows, SCHEME);
        assert_eq!(labels(&nodes), vec!["Orphan", "Orphan sibling", "Alpha"]);
        assert_eq!(nodes[0].depth, 1);
    }

    #[test]
    fn test_length_jump_uses_sibling_depth() {
        // the second child of Alpha reports a far too large length
        let rows = [row(1, "A", "Alpha", SCHEME), row(2, "B", "Beta", "A"), row(7, "C", "Gamma", "A")];
        let nodes = build_hierarchy(&rows, SCHEME);
        assert_eq!(nodes[2].pref_label, "Gamma");
        assert_eq!(nodes[2].depth, nodes[1].depth);
    }

    #[test]
    fn test_markdown() {
        let rows = [row(1, "http://x.org/a", "Alpha", SCHEME), row(2, "http://x.org/b", "Beta", "http://x.org/a")];
        let md = to_markdown(&build_hierarchy(&rows, SCHEME), "http://localhost", "voc");
        assert_eq!(
            md,
            "* [Alpha](http://localhost/object?vocab_id=voc&uri=http%3A%2F%2Fx.org%2Fa)\n\t* [Beta](http://localhost/object?vocab_id=voc&uri=http%3A%2F%2Fx.org%2Fb)\n"
        );
    }

    #[test]
    fn test_html_nesting() {
        let rows = [row(1, "A", "Alpha", SCHEME), row(2, "B", "Beta", "A"), row(3, "C", "Gamma", "B"), row(1, "D", "Delta", SCHEME)];
        let html = to_html(&build_hierarchy(&rows, SCHEME), "", "v");
        assert_eq!(html.matches("<ul").count(), html.matches("</ul>").count());
        assert_eq!(html.matches("<li>").count(), html.matches("</li>").count());
        assert_eq!(html.matches("<ul").count(), 3);
        let delta = html.find("Delta").unwrap();
        let gamma = html.find("Gamma").unwrap();
        assert!(gamma < delta);
        assert!(html.ends_with("</li>\n</ul>\n"));
    }
}
