//! Write a [`Tree`] back out as HTML through html5ever's serializer.

use std::io;

use html5ever::serialize::{Serialize, SerializeOpts, Serializer, TraversalScope, serialize};

use super::tree::{NodeData, NodeId, Tree};

/// A node plus the tree it lives in, serializable by html5ever.
pub struct SerializableNode<'a> {
    tree: &'a Tree,
    id: NodeId,
}

impl<'a> SerializableNode<'a> {
    pub fn new(tree: &'a Tree, id: NodeId) -> Self {
        Self { tree, id }
    }
}

impl Serialize for SerializableNode<'_> {
    fn serialize<S>(&self, serializer: &mut S, traversal_scope: TraversalScope) -> io::Result<()>
    where
        S: Serializer,
    {
        match traversal_scope {
            TraversalScope::IncludeNode => write_node(self.tree, self.id, serializer),
            TraversalScope::ChildrenOnly(_) => {
                for child in self.tree.children(self.id) {
                    write_node(self.tree, child, serializer)?;
                }
                Ok(())
            }
        }
    }
}

fn write_node<S: Serializer>(tree: &Tree, id: NodeId, serializer: &mut S) -> io::Result<()> {
    let Some(node) = tree.get(id) else {
        return Ok(());
    };

    match &node.data {
        NodeData::Element { name, attrs, .. } => {
            serializer.start_elem(
                name.clone(),
                attrs.iter().map(|a| (&a.name, a.value.as_str())),
            )?;
            for child in tree.children(id) {
                write_node(tree, child, serializer)?;
            }
            serializer.end_elem(name.clone())
        }
        NodeData::Text(text) => serializer.write_text(text),
        NodeData::Comment(text) => serializer.write_comment(text),
        NodeData::Doctype { name, .. } => serializer.write_doctype(name),
        NodeData::Document => {
            for child in tree.children(id) {
                write_node(tree, child, serializer)?;
            }
            Ok(())
        }
    }
}

fn to_string(tree: &Tree, id: NodeId, traversal_scope: TraversalScope) -> String {
    let mut bytes = Vec::new();
    let opts = SerializeOpts {
        traversal_scope,
        ..Default::default()
    };
    // Writing into a Vec cannot fail.
    let _ = serialize(&mut bytes, &SerializableNode::new(tree, id), opts);
    String::from_utf8(bytes).unwrap_or_default()
}

/// Serialize the whole document.
pub fn serialize_document(tree: &Tree) -> String {
    to_string(tree, tree.document(), TraversalScope::ChildrenOnly(None))
}

/// Serialize a node including its own tag.
pub fn outer_html(tree: &Tree, id: NodeId) -> String {
    to_string(tree, id, TraversalScope::IncludeNode)
}

/// Serialize a node's children only.
pub fn inner_html(tree: &Tree, id: NodeId) -> String {
    to_string(tree, id, TraversalScope::ChildrenOnly(None))
}
