//! Arena-allocated document tree.
//!
//! html5ever parses into this tree (see `tree_sink`), the relinking passes
//! mutate it in place, and `serialize` writes it back out. Nodes are never
//! freed: detaching a node only unlinks it, so a `NodeId` stays valid for
//! the lifetime of the tree and moved subtrees keep their identity.

use std::collections::HashMap;

use html5ever::{LocalName, Namespace, QualName, ns};

/// Unique identifier for a node in the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub u32);

impl NodeId {
    /// Sentinel value for no node.
    pub const NONE: NodeId = NodeId(u32::MAX);

    pub fn is_some(&self) -> bool {
        self.0 != u32::MAX
    }

    pub fn is_none(&self) -> bool {
        self.0 == u32::MAX
    }
}

/// Node payload.
#[derive(Debug, Clone)]
pub enum NodeData {
    Document,
    Element {
        name: QualName,
        attrs: Vec<Attribute>,
        /// Mirrors the `id` attribute.
        id: Option<String>,
        /// Mirrors the `class` attribute, split on whitespace.
        classes: Vec<String>,
    },
    Text(String),
    Comment(String),
    Doctype {
        name: String,
        public_id: String,
        system_id: String,
    },
}

/// HTML attribute.
#[derive(Debug, Clone)]
pub struct Attribute {
    pub name: QualName,
    pub value: String,
}

/// A node in the arena.
#[derive(Debug)]
pub struct Node {
    pub data: NodeData,
    pub parent: NodeId,
    pub first_child: NodeId,
    pub last_child: NodeId,
    pub prev_sibling: NodeId,
    pub next_sibling: NodeId,
}

impl Node {
    fn new(data: NodeData) -> Self {
        Self {
            data,
            parent: NodeId::NONE,
            first_child: NodeId::NONE,
            last_child: NodeId::NONE,
            prev_sibling: NodeId::NONE,
            next_sibling: NodeId::NONE,
        }
    }
}

/// Build an HTML-namespaced qualified name.
pub fn html_name(local: &str) -> QualName {
    QualName::new(None, ns!(html), LocalName::from(local))
}

fn attr_name(local: &str) -> QualName {
    QualName::new(None, ns!(), LocalName::from(local))
}

/// Arena-based document tree.
///
/// Parent/child/sibling links are indices into one node vector.
pub struct Tree {
    nodes: Vec<Node>,
    document: NodeId,
    /// `id` attribute to node, kept in sync by `set_attr`.
    id_map: HashMap<String, NodeId>,
}

impl Tree {
    /// Create an empty tree holding only the document root.
    pub fn new() -> Self {
        let mut tree = Self {
            nodes: Vec::new(),
            document: NodeId::NONE,
            id_map: HashMap::new(),
        };
        tree.document = tree.alloc(Node::new(NodeData::Document));
        tree
    }

    fn alloc(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    pub fn document(&self) -> NodeId {
        self.document
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        if id.is_none() {
            return None;
        }
        self.nodes.get(id.0 as usize)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        if id.is_none() {
            return None;
        }
        self.nodes.get_mut(id.0 as usize)
    }

    /// Create a detached element node.
    pub fn create_element(&mut self, name: QualName, attrs: Vec<Attribute>) -> NodeId {
        let mut id = None;
        let mut classes = Vec::new();

        for attr in &attrs {
            if attr.name.local.as_ref() == "id" {
                id = Some(attr.value.clone());
            } else if attr.name.local.as_ref() == "class" {
                classes = split_classes(&attr.value);
            }
        }

        let node_id = self.alloc(Node::new(NodeData::Element {
            name,
            attrs,
            id: id.clone(),
            classes,
        }));

        if let Some(id_str) = id {
            self.id_map.entry(id_str).or_insert(node_id);
        }

        node_id
    }

    /// Create a detached HTML element from a tag name and attribute pairs.
    pub fn create_html_element(&mut self, tag: &str, attrs: &[(&str, &str)]) -> NodeId {
        let attrs = attrs
            .iter()
            .map(|(name, value)| Attribute {
                name: attr_name(name),
                value: (*value).to_string(),
            })
            .collect();
        self.create_element(html_name(tag), attrs)
    }

    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        self.alloc(Node::new(NodeData::Text(text.into())))
    }

    pub fn create_comment(&mut self, text: String) -> NodeId {
        self.alloc(Node::new(NodeData::Comment(text)))
    }

    pub fn create_doctype(&mut self, name: String, public_id: String, system_id: String) -> NodeId {
        self.alloc(Node::new(NodeData::Doctype {
            name,
            public_id,
            system_id,
        }))
    }

    /// Append `child` as the last child of `parent`, moving it if attached.
    pub fn append(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);

        let last_child = self.get(parent).map(|n| n.last_child).unwrap_or(NodeId::NONE);

        if let Some(child_node) = self.get_mut(child) {
            child_node.parent = parent;
            child_node.prev_sibling = last_child;
        }

        if last_child.is_some()
            && let Some(last_node) = self.get_mut(last_child)
        {
            last_node.next_sibling = child;
        }

        if let Some(parent_node) = self.get_mut(parent) {
            if parent_node.first_child.is_none() {
                parent_node.first_child = child;
            }
            parent_node.last_child = child;
        }
    }

    /// Insert `new_node` immediately before `sibling`, moving it if attached.
    pub fn insert_before(&mut self, sibling: NodeId, new_node: NodeId) {
        if sibling == new_node {
            return;
        }
        self.detach(new_node);

        let (parent, prev) = match self.get(sibling) {
            Some(n) => (n.parent, n.prev_sibling),
            None => return,
        };

        if let Some(new) = self.get_mut(new_node) {
            new.parent = parent;
            new.prev_sibling = prev;
            new.next_sibling = sibling;
        }

        if let Some(sib) = self.get_mut(sibling) {
            sib.prev_sibling = new_node;
        }

        if prev.is_some() {
            if let Some(p) = self.get_mut(prev) {
                p.next_sibling = new_node;
            }
        } else if let Some(par) = self.get_mut(parent) {
            par.first_child = new_node;
        }
    }

    /// Insert `new_node` immediately after `sibling`.
    pub fn insert_after(&mut self, sibling: NodeId, new_node: NodeId) {
        let (parent, next) = match self.get(sibling) {
            Some(n) => (n.parent, n.next_sibling),
            None => return,
        };
        if next.is_some() {
            self.insert_before(next, new_node);
        } else if parent.is_some() {
            self.append(parent, new_node);
        }
    }

    /// Unlink a node from its parent. The subtree stays intact.
    pub fn detach(&mut self, target: NodeId) {
        let (parent, prev, next) = match self.get(target) {
            Some(n) => (n.parent, n.prev_sibling, n.next_sibling),
            None => return,
        };

        if prev.is_some() {
            if let Some(p) = self.get_mut(prev) {
                p.next_sibling = next;
            }
        } else if parent.is_some()
            && let Some(p) = self.get_mut(parent)
        {
            p.first_child = next;
        }

        if next.is_some() {
            if let Some(n) = self.get_mut(next) {
                n.prev_sibling = prev;
            }
        } else if parent.is_some()
            && let Some(p) = self.get_mut(parent)
        {
            p.last_child = prev;
        }

        if let Some(node) = self.get_mut(target) {
            node.parent = NodeId::NONE;
            node.prev_sibling = NodeId::NONE;
            node.next_sibling = NodeId::NONE;
        }
    }

    /// Put `new_node` where `old` is and detach `old`.
    pub fn replace(&mut self, old: NodeId, new_node: NodeId) {
        if self.parent(old).is_none() {
            return;
        }
        self.insert_before(old, new_node);
        self.detach(old);
    }

    /// Append text, merging into a trailing text node.
    pub fn append_text(&mut self, parent: NodeId, text: &str) {
        let last_child = self.get(parent).map(|n| n.last_child).unwrap_or(NodeId::NONE);

        if let Some(last) = self.get_mut(last_child)
            && let NodeData::Text(ref mut existing) = last.data
        {
            existing.push_str(text);
            return;
        }

        let text_node = self.create_text(text);
        self.append(parent, text_node);
    }

    /// Replace all children of `id` with one text node.
    pub fn set_text(&mut self, id: NodeId, text: &str) {
        let children: Vec<_> = self.children(id).collect();
        for child in children {
            self.detach(child);
        }
        let text_node = self.create_text(text);
        self.append(id, text_node);
    }

    /// Look up an attached element by its `id` attribute.
    pub fn get_by_id(&self, id: &str) -> Option<NodeId> {
        self.id_map
            .get(id)
            .copied()
            .filter(|&node| self.is_attached(node) && self.element_id(node) == Some(id))
    }

    /// True when the node is reachable from the document root.
    pub fn is_attached(&self, id: NodeId) -> bool {
        let mut current = id;
        while current.is_some() {
            if current == self.document {
                return true;
            }
            current = self.parent(current);
        }
        false
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    pub fn parent(&self, id: NodeId) -> NodeId {
        self.get(id).map(|n| n.parent).unwrap_or(NodeId::NONE)
    }

    pub fn children(&self, parent: NodeId) -> ChildrenIter<'_> {
        let first = self.get(parent).map(|n| n.first_child).unwrap_or(NodeId::NONE);
        ChildrenIter {
            tree: self,
            current: first,
        }
    }

    /// Element children only.
    pub fn element_children(&self, parent: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.children(parent).filter(|&c| self.is_element(c))
    }

    /// All descendants of `root` in document order, `root` excluded.
    pub fn descendants(&self, root: NodeId) -> Descendants<'_> {
        let mut stack: Vec<_> = self.children(root).collect();
        stack.reverse();
        Descendants { tree: self, stack }
    }

    /// Find the first node matching a predicate (document order).
    pub fn find<F>(&self, predicate: F) -> Option<NodeId>
    where
        F: Fn(&Node) -> bool,
    {
        self.descendants(self.document)
            .find(|&id| self.get(id).is_some_and(&predicate))
    }

    pub fn find_by_tag(&self, tag: &str) -> Option<NodeId> {
        self.find(|node| match &node.data {
            NodeData::Element { name, .. } => name.local.as_ref() == tag,
            _ => false,
        })
    }

    /// Every element under `root` carrying `class`, in document order.
    pub fn elements_by_class(&self, root: NodeId, class: &str) -> Vec<NodeId> {
        self.descendants(root)
            .filter(|&id| self.has_class(id, class))
            .collect()
    }

    /// Every element under `root` with tag `tag`, in document order.
    pub fn elements_by_tag(&self, root: NodeId, tag: &str) -> Vec<NodeId> {
        self.descendants(root)
            .filter(|&id| self.is_tag(id, tag))
            .collect()
    }

    pub fn first_by_class(&self, root: NodeId, class: &str) -> Option<NodeId> {
        self.descendants(root).find(|&id| self.has_class(id, class))
    }

    pub fn first_by_tag(&self, root: NodeId, tag: &str) -> Option<NodeId> {
        self.descendants(root).find(|&id| self.is_tag(id, tag))
    }

    /// The `<body>` element, falling back to the document root.
    pub fn body(&self) -> NodeId {
        self.find_by_tag("body").unwrap_or(self.document)
    }
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

fn split_classes(value: &str) -> Vec<String> {
    value.split_whitespace().map(|s| s.to_string()).collect()
}

pub struct ChildrenIter<'a> {
    tree: &'a Tree,
    current: NodeId,
}

impl Iterator for ChildrenIter<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current.is_none() {
            return None;
        }
        let id = self.current;
        self.current = self
            .tree
            .get(id)
            .map(|n| n.next_sibling)
            .unwrap_or(NodeId::NONE);
        Some(id)
    }
}

/// Pre-order walk. Children are collected when a node is visited, so the
/// walk sees the tree as it was when iteration reached each parent.
pub struct Descendants<'a> {
    tree: &'a Tree,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        let mark = self.stack.len();
        self.stack.extend(self.tree.children(id));
        self.stack[mark..].reverse();
        Some(id)
    }
}

/// Element accessors and mutators.
impl Tree {
    pub fn element_name(&self, id: NodeId) -> Option<&LocalName> {
        self.get(id).and_then(|n| match &n.data {
            NodeData::Element { name, .. } => Some(&name.local),
            _ => None,
        })
    }

    pub fn element_namespace(&self, id: NodeId) -> Option<&Namespace> {
        self.get(id).and_then(|n| match &n.data {
            NodeData::Element { name, .. } => Some(&name.ns),
            _ => None,
        })
    }

    pub fn is_tag(&self, id: NodeId, tag: &str) -> bool {
        self.element_name(id).is_some_and(|n| n.as_ref() == tag)
    }

    pub fn get_attr(&self, id: NodeId, attr_name: &str) -> Option<&str> {
        self.get(id).and_then(|n| match &n.data {
            NodeData::Element { attrs, .. } => attrs
                .iter()
                .find(|a| a.name.local.as_ref() == attr_name)
                .map(|a| a.value.as_str()),
            _ => None,
        })
    }

    pub fn has_attr(&self, id: NodeId, attr_name: &str) -> bool {
        self.get_attr(id, attr_name).is_some()
    }

    /// Set or add an attribute, keeping the id/class mirrors and id map in sync.
    pub fn set_attr(&mut self, id: NodeId, attr: &str, value: &str) {
        let mut old_id = None;
        if let Some(node) = self.get_mut(id)
            && let NodeData::Element {
                attrs,
                id: elem_id,
                classes,
                ..
            } = &mut node.data
        {
            match attrs.iter_mut().find(|a| a.name.local.as_ref() == attr) {
                Some(existing) => existing.value = value.to_string(),
                None => attrs.push(Attribute {
                    name: attr_name(attr),
                    value: value.to_string(),
                }),
            }
            match attr {
                "id" => old_id = elem_id.replace(value.to_string()),
                "class" => *classes = split_classes(value),
                _ => return,
            }
        } else {
            return;
        }

        if attr == "id" {
            if let Some(old) = old_id
                && self.id_map.get(&old) == Some(&id)
            {
                self.id_map.remove(&old);
            }
            self.id_map.insert(value.to_string(), id);
        }
    }

    pub fn element_id(&self, id: NodeId) -> Option<&str> {
        self.get(id).and_then(|n| match &n.data {
            NodeData::Element { id, .. } => id.as_deref(),
            _ => None,
        })
    }

    pub fn element_classes(&self, id: NodeId) -> &[String] {
        static EMPTY: &[String] = &[];
        self.get(id)
            .and_then(|n| match &n.data {
                NodeData::Element { classes, .. } => Some(classes.as_slice()),
                _ => None,
            })
            .unwrap_or(EMPTY)
    }

    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.element_classes(id).iter().any(|c| c == class)
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        self.get(id)
            .is_some_and(|n| matches!(n.data, NodeData::Element { .. }))
    }

    pub fn is_text(&self, id: NodeId) -> bool {
        self.get(id).is_some_and(|n| matches!(n.data, NodeData::Text(_)))
    }

    /// Text of a text node.
    pub fn text_content(&self, id: NodeId) -> Option<&str> {
        self.get(id).and_then(|n| match &n.data {
            NodeData::Text(s) => Some(s.as_str()),
            _ => None,
        })
    }

    /// Concatenated text of a subtree.
    pub fn text_of(&self, id: NodeId) -> String {
        if let Some(text) = self.text_content(id) {
            return text.to_string();
        }
        self.descendants(id)
            .filter_map(|d| self.text_content(d))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_elements() {
        let mut tree = Tree::new();
        let div = tree.create_html_element("div", &[("id", "main"), ("class", "a b")]);
        tree.append(tree.document(), div);

        assert_eq!(tree.element_name(div).unwrap().as_ref(), "div");
        assert_eq!(tree.element_id(div), Some("main"));
        assert_eq!(tree.get_by_id("main"), Some(div));
        assert!(tree.has_class(div, "b"));
    }

    #[test]
    fn test_append_moves_node() {
        let mut tree = Tree::new();
        let a = tree.create_html_element("div", &[]);
        let b = tree.create_html_element("div", &[]);
        let p = tree.create_html_element("p", &[]);
        tree.append(tree.document(), a);
        tree.append(tree.document(), b);
        tree.append(a, p);
        tree.append(b, p);

        assert_eq!(tree.children(a).count(), 0);
        assert_eq!(tree.children(b).collect::<Vec<_>>(), vec![p]);
        assert_eq!(tree.parent(p), b);
    }

    #[test]
    fn test_replace_keeps_position() {
        let mut tree = Tree::new();
        let root = tree.create_html_element("body", &[]);
        tree.append(tree.document(), root);
        let first = tree.create_html_element("p", &[]);
        let middle = tree.create_html_element("div", &[]);
        let last = tree.create_html_element("p", &[]);
        tree.append(root, first);
        tree.append(root, middle);
        tree.append(root, last);

        let replacement = tree.create_html_element("section", &[]);
        tree.replace(middle, replacement);

        let children: Vec<_> = tree.children(root).collect();
        assert_eq!(children, vec![first, replacement, last]);
        assert!(!tree.is_attached(middle));
    }

    #[test]
    fn test_set_attr_updates_id_map() {
        let mut tree = Tree::new();
        let li = tree.create_html_element("li", &[("id", "fn1")]);
        tree.append(tree.document(), li);

        tree.set_attr(li, "id", "fn1footnote");

        assert_eq!(tree.get_by_id("fn1"), None);
        assert_eq!(tree.get_by_id("fn1footnote"), Some(li));
        assert_eq!(tree.get_attr(li, "id"), Some("fn1footnote"));
    }

    #[test]
    fn test_descendants_document_order() {
        let mut tree = Tree::new();
        let div = tree.create_html_element("div", &[]);
        let p1 = tree.create_html_element("p", &[]);
        let span = tree.create_html_element("span", &[]);
        let p2 = tree.create_html_element("p", &[]);
        tree.append(tree.document(), div);
        tree.append(div, p1);
        tree.append(p1, span);
        tree.append(div, p2);

        let order: Vec<_> = tree.descendants(tree.document()).collect();
        assert_eq!(order, vec![div, p1, span, p2]);
    }

    #[test]
    fn test_text_merging_and_set_text() {
        let mut tree = Tree::new();
        let p = tree.create_html_element("p", &[]);
        tree.append(tree.document(), p);
        tree.append_text(p, "Hello, ");
        tree.append_text(p, "World!");
        assert_eq!(tree.children(p).count(), 1);
        assert_eq!(tree.text_of(p), "Hello, World!");

        tree.set_text(p, "3");
        assert_eq!(tree.text_of(p), "3");
    }
}
