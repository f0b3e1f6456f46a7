//! `Key: Value` front matter written as paragraphs before the first heading.
//!
//! ```html
//! <p>Author: Ada<br>Status: draft</p>
//! <h1>Title</h1>
//! ```

use crate::dom::{NodeId, Tree};

/// Ordered key/value pairs. A repeated key keeps its first position and
/// takes the later value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata {
    entries: Vec<(String, String)>,
}

impl Metadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Split a paragraph into lines at its `br` children.
fn paragraph_lines(tree: &Tree, paragraph: NodeId) -> Vec<String> {
    let mut lines = vec![String::new()];
    for child in tree.children(paragraph) {
        if tree.is_tag(child, "br") {
            lines.push(String::new());
        } else if let Some(line) = lines.last_mut() {
            line.push_str(&tree.text_of(child));
        }
    }
    lines
}

/// Collect metadata paragraphs and remove them from the body.
///
/// Only direct `p` children of the body before the first `h1` count, and
/// only when their text contains a colon. Lines without a colon are
/// skipped.
pub fn extract_metadata(tree: &mut Tree) -> Metadata {
    let mut metadata = Metadata::new();
    let body = tree.body();

    let mut consumed = Vec::new();
    for child in tree.children(body) {
        if tree.is_tag(child, "h1") {
            break;
        }
        if !tree.is_tag(child, "p") || !tree.text_of(child).contains(':') {
            continue;
        }
        for line in paragraph_lines(tree, child) {
            if let Some((key, value)) = line.split_once(':') {
                metadata.insert(key.trim(), value.trim());
            }
        }
        consumed.push(child);
    }

    for paragraph in consumed {
        tree.detach(paragraph);
    }
    metadata
}
