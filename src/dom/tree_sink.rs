//! html5ever TreeSink implementation for [`Tree`].

use std::borrow::Cow;
use std::cell::{Cell, RefCell};

use html5ever::tendril::StrTendril;
use html5ever::tree_builder::{ElementFlags, NodeOrText, QuirksMode, TreeSink};
use html5ever::{Attribute as Html5Attribute, QualName};

use super::tree::{Attribute, NodeData, NodeId, Tree};

/// Handle used by TreeSink to reference nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeHandle(pub NodeId);

impl Default for NodeHandle {
    fn default() -> Self {
        NodeHandle(NodeId::NONE)
    }
}

impl From<Html5Attribute> for Attribute {
    fn from(attr: Html5Attribute) -> Self {
        Attribute {
            name: attr.name,
            value: attr.value.to_string(),
        }
    }
}

/// Where the parser wants a new node to go.
#[derive(Clone, Copy)]
enum Slot {
    LastChildOf(NodeId),
    Before(NodeId),
}

/// Builds a [`Tree`] from html5ever's parse events.
///
/// TreeSink methods take `&self`, so the tree sits in a RefCell.
pub struct TreeBuilder {
    tree: RefCell<Tree>,
    quirks_mode: Cell<QuirksMode>,
}

impl Default for TreeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self {
            tree: RefCell::new(Tree::new()),
            quirks_mode: Cell::new(QuirksMode::NoQuirks),
        }
    }

    pub fn into_tree(self) -> Tree {
        self.tree.into_inner()
    }

    /// Quirks mode the parser settled on.
    pub fn quirks_mode(&self) -> QuirksMode {
        self.quirks_mode.get()
    }

    /// Place a node or a run of text. Text appended as a last child merges
    /// into a trailing text node.
    fn place(&self, slot: Slot, child: NodeOrText<NodeHandle>) {
        let mut tree = self.tree.borrow_mut();
        match (slot, child) {
            (Slot::LastChildOf(parent), NodeOrText::AppendNode(node)) => {
                tree.append(parent, node.0)
            }
            (Slot::LastChildOf(parent), NodeOrText::AppendText(text)) => {
                tree.append_text(parent, &text)
            }
            (Slot::Before(sibling), NodeOrText::AppendNode(node)) => {
                tree.insert_before(sibling, node.0)
            }
            (Slot::Before(sibling), NodeOrText::AppendText(text)) => {
                let text = tree.create_text(text.to_string());
                tree.insert_before(sibling, text);
            }
        }
    }
}

impl TreeSink for TreeBuilder {
    type Handle = NodeHandle;
    type Output = Self;
    type ElemName<'a>
        = &'a QualName
    where
        Self: 'a;

    fn finish(self) -> Self::Output {
        self
    }

    fn parse_error(&self, msg: Cow<'static, str>) {
        tracing::trace!(%msg, "html parse error");
    }

    fn get_document(&self) -> NodeHandle {
        NodeHandle(self.tree.borrow().document())
    }

    fn elem_name<'a>(&'a self, target: &'a NodeHandle) -> &'a QualName {
        static UNNAMED: QualName = QualName {
            prefix: None,
            ns: html5ever::ns!(),
            local: html5ever::local_name!(""),
        };

        let tree = self.tree.borrow();
        let Some(NodeData::Element { name, .. }) = tree.get(target.0).map(|n| &n.data) else {
            return &UNNAMED;
        };
        // SAFETY: html5ever reads the returned name immediately, before it
        // calls back into the sink to create or move another node, so the
        // node vector is not reallocated while the reference is alive.
        unsafe { &*(name as *const QualName) }
    }

    fn create_element(
        &self,
        name: QualName,
        attrs: Vec<Html5Attribute>,
        _flags: ElementFlags,
    ) -> NodeHandle {
        let attrs = attrs.into_iter().map(Attribute::from).collect();
        NodeHandle(self.tree.borrow_mut().create_element(name, attrs))
    }

    fn create_comment(&self, text: StrTendril) -> NodeHandle {
        NodeHandle(self.tree.borrow_mut().create_comment(text.to_string()))
    }

    /// Processing instructions only occur in XML; keep an empty comment.
    fn create_pi(&self, _target: StrTendril, _data: StrTendril) -> NodeHandle {
        self.create_comment(StrTendril::new())
    }

    fn append(&self, parent: &NodeHandle, child: NodeOrText<NodeHandle>) {
        self.place(Slot::LastChildOf(parent.0), child);
    }

    fn append_before_sibling(&self, sibling: &NodeHandle, child: NodeOrText<NodeHandle>) {
        self.place(Slot::Before(sibling.0), child);
    }

    fn append_based_on_parent_node(
        &self,
        element: &NodeHandle,
        prev_element: &NodeHandle,
        child: NodeOrText<NodeHandle>,
    ) {
        let has_parent = self.tree.borrow().parent(element.0).is_some();
        let slot = if has_parent {
            Slot::Before(element.0)
        } else {
            Slot::LastChildOf(prev_element.0)
        };
        self.place(slot, child);
    }

    fn append_doctype_to_document(
        &self,
        name: StrTendril,
        public_id: StrTendril,
        system_id: StrTendril,
    ) {
        let mut tree = self.tree.borrow_mut();
        let doctype =
            tree.create_doctype(name.to_string(), public_id.to_string(), system_id.to_string());
        let document = tree.document();
        tree.append(document, doctype);
    }

    fn get_template_contents(&self, target: &NodeHandle) -> NodeHandle {
        *target
    }

    fn same_node(&self, x: &NodeHandle, y: &NodeHandle) -> bool {
        x == y
    }

    fn set_quirks_mode(&self, mode: QuirksMode) {
        self.quirks_mode.set(mode);
    }

    fn add_attrs_if_missing(&self, target: &NodeHandle, attrs: Vec<Html5Attribute>) {
        let mut tree = self.tree.borrow_mut();
        for attr in attrs {
            let name = attr.name.local.as_ref();
            if !tree.has_attr(target.0, name) {
                tree.set_attr(target.0, name, &attr.value);
            }
        }
    }

    fn remove_from_parent(&self, target: &NodeHandle) {
        self.tree.borrow_mut().detach(target.0);
    }

    fn reparent_children(&self, node: &NodeHandle, new_parent: &NodeHandle) {
        let mut tree = self.tree.borrow_mut();
        loop {
            let first = tree.children(node.0).next();
            let Some(child) = first else { break };
            tree.append(new_parent.0, child);
        }
    }
}
