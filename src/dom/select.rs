//! CSS selector matching against [`Tree`].
//!
//! Block adapters name the blocks they handle with ordinary CSS selectors
//! (`code.mermaid`, `div.highlight-mermaid`); this module implements the
//! `selectors` crate's `Element` trait so those selectors run on our arena.

use std::fmt;

use html5ever::{LocalName, Namespace};
use precomputed_hash::PrecomputedHash;
use selectors::attr::{AttrSelectorOperation, CaseSensitivity, NamespaceConstraint};
use selectors::context::{MatchingContext, SelectorCaches};
use selectors::matching::ElementSelectorFlags;
use selectors::parser::{ParseRelative, SelectorList, SelectorParseErrorKind};
use selectors::{OpaqueElement, SelectorImpl};

use super::tree::{Node, NodeData, NodeId, Tree};
use crate::error::{Error, Result};

/// Selector implementation marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocSelectors;

/// String newtypes the selector parser stores. `$hash` computes the
/// precomputed hash from the wrapped value.
macro_rules! css_string {
    ($(#[$meta:meta])* $name:ident($inner:ty), |$v:ident| $hash:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
        pub struct $name(pub $inner);

        impl PrecomputedHash for $name {
            fn precomputed_hash(&self) -> u32 {
                let $v = &self.0;
                $hash
            }
        }

        impl cssparser::ToCss for $name {
            fn to_css<W: fmt::Write>(&self, dest: &mut W) -> fmt::Result {
                dest.write_str(self.as_ref())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                self.0.as_ref()
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(<$inner>::from(s))
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(<$inner>::from(s))
            }
        }
    };
}

css_string!(
    /// Identifiers, class names and attribute values.
    IdentStr(String),
    |s| s.bytes().fold(0u32, |h, b| h.wrapping_mul(31).wrapping_add(u32::from(b)))
);
css_string!(CssLocalName(LocalName), |name| name.precomputed_hash());
css_string!(CssNamespace(Namespace), |ns| ns.precomputed_hash());

impl<'i> selectors::parser::Parser<'i> for DocSelectors {
    type Impl = DocSelectors;
    type Error = SelectorParseErrorKind<'i>;
}

/// No pseudo-elements apply to a static document.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PseudoElement {}

impl cssparser::ToCss for PseudoElement {
    fn to_css<W: fmt::Write>(&self, _dest: &mut W) -> fmt::Result {
        match *self {}
    }
}

impl selectors::parser::PseudoElement for PseudoElement {
    type Impl = DocSelectors;

    fn accepts_state_pseudo_classes(&self) -> bool {
        false
    }

    fn valid_after_slotted(&self) -> bool {
        false
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NonTSPseudoClass {
    Link,
}

impl selectors::parser::NonTSPseudoClass for NonTSPseudoClass {
    type Impl = DocSelectors;

    fn is_active_or_hover(&self) -> bool {
        false
    }

    fn is_user_action_state(&self) -> bool {
        false
    }
}

impl cssparser::ToCss for NonTSPseudoClass {
    fn to_css<W: fmt::Write>(&self, dest: &mut W) -> fmt::Result {
        match self {
            Self::Link => dest.write_str(":link"),
        }
    }
}

impl SelectorImpl for DocSelectors {
    type ExtraMatchingData<'a> = ();
    type AttrValue = IdentStr;
    type Identifier = IdentStr;
    type LocalName = CssLocalName;
    type NamespaceUrl = CssNamespace;
    type NamespacePrefix = IdentStr;
    type BorrowedLocalName = CssLocalName;
    type BorrowedNamespaceUrl = CssNamespace;
    type NonTSPseudoClass = NonTSPseudoClass;
    type PseudoElement = PseudoElement;
}

/// A compiled selector list.
#[derive(Clone)]
pub struct Selector {
    source: String,
    list: SelectorList<DocSelectors>,
}

impl fmt::Debug for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Selector").field(&self.source).finish()
    }
}

impl Selector {
    /// Compile a selector list such as `code.mermaid, div.highlight-mermaid`.
    pub fn parse(css: &str) -> Result<Self> {
        let mut input = cssparser::ParserInput::new(css);
        let mut parser = cssparser::Parser::new(&mut input);
        let list = SelectorList::parse(&DocSelectors, &mut parser, ParseRelative::No)
            .map_err(|e| Error::Selector(format!("{css}: {:?}", e.kind)))?;
        Ok(Self {
            source: css.to_string(),
            list,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn matches(&self, tree: &Tree, id: NodeId) -> bool {
        if !tree.is_element(id) {
            return false;
        }
        let mut caches = SelectorCaches::default();
        let mut context = MatchingContext::new(
            selectors::matching::MatchingMode::Normal,
            None,
            &mut caches,
            selectors::context::QuirksMode::NoQuirks,
            selectors::matching::NeedsSelectorFlags::No,
            selectors::matching::MatchingForInvalidation::No,
        );
        let elem = ElementRef::new(tree, id);
        self.list
            .slice()
            .iter()
            .any(|selector| selectors::matching::matches_selector(selector, 0, None, &elem, &mut context))
    }

    /// Every matching element under `root`, in document order.
    pub fn select(&self, tree: &Tree, root: NodeId) -> Vec<NodeId> {
        tree.descendants(root)
            .filter(|&id| self.matches(tree, id))
            .collect()
    }
}

/// Reference to an element for selector matching.
#[derive(Clone, Copy)]
pub struct ElementRef<'a> {
    pub tree: &'a Tree,
    pub id: NodeId,
}

impl<'a> ElementRef<'a> {
    pub fn new(tree: &'a Tree, id: NodeId) -> Self {
        Self { tree, id }
    }

    /// Nearest element sibling in the direction `step` walks.
    fn sibling_element(&self, step: impl Fn(&Node) -> NodeId) -> Option<Self> {
        let mut current = step(self.tree.get(self.id)?);
        while current.is_some() {
            if self.tree.is_element(current) {
                return Some(Self::new(self.tree, current));
            }
            current = step(self.tree.get(current)?);
        }
        None
    }

    fn is_anchor_with_href(&self) -> bool {
        self.tree.is_tag(self.id, "a") && self.tree.has_attr(self.id, "href")
    }
}

impl fmt::Debug for ElementRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ElementRef")
            .field("id", &self.id)
            .field("name", &self.tree.element_name(self.id))
            .finish()
    }
}

impl selectors::Element for ElementRef<'_> {
    type Impl = DocSelectors;

    fn opaque(&self) -> OpaqueElement {
        OpaqueElement::new(self)
    }

    fn parent_element(&self) -> Option<Self> {
        let parent = self.tree.parent(self.id);
        self.tree
            .is_element(parent)
            .then(|| Self::new(self.tree, parent))
    }

    fn parent_node_is_shadow_root(&self) -> bool {
        false
    }

    fn containing_shadow_host(&self) -> Option<Self> {
        None
    }

    fn is_pseudo_element(&self) -> bool {
        false
    }

    fn prev_sibling_element(&self) -> Option<Self> {
        self.sibling_element(|node| node.prev_sibling)
    }

    fn next_sibling_element(&self) -> Option<Self> {
        self.sibling_element(|node| node.next_sibling)
    }

    fn first_element_child(&self) -> Option<Self> {
        self.tree
            .element_children(self.id)
            .next()
            .map(|child| Self::new(self.tree, child))
    }

    fn is_html_element_in_html_document(&self) -> bool {
        true
    }

    fn has_local_name(&self, name: &CssLocalName) -> bool {
        self.tree.element_name(self.id).is_some_and(|n| n == &name.0)
    }

    fn has_namespace(&self, ns: &CssNamespace) -> bool {
        self.tree
            .element_namespace(self.id)
            .is_some_and(|n| n == &ns.0)
    }

    fn is_same_type(&self, other: &Self) -> bool {
        self.tree.element_name(self.id) == other.tree.element_name(other.id)
    }

    fn attr_matches(
        &self,
        ns: &NamespaceConstraint<&CssNamespace>,
        local_name: &CssLocalName,
        operation: &AttrSelectorOperation<&IdentStr>,
    ) -> bool {
        let attrs = match self.tree.get(self.id).map(|n| &n.data) {
            Some(NodeData::Element { attrs, .. }) => attrs,
            _ => return false,
        };

        attrs
            .iter()
            .filter(|attr| match ns {
                NamespaceConstraint::Any => true,
                NamespaceConstraint::Specific(ns) => attr.name.ns == ns.0,
            })
            .find(|attr| attr.name.local == local_name.0)
            .is_some_and(|attr| operation.eval_str(&attr.value))
    }

    fn match_non_ts_pseudo_class(
        &self,
        pc: &NonTSPseudoClass,
        _context: &mut MatchingContext<'_, Self::Impl>,
    ) -> bool {
        match pc {
            NonTSPseudoClass::Link => self.is_anchor_with_href(),
        }
    }

    fn match_pseudo_element(
        &self,
        _pe: &PseudoElement,
        _context: &mut MatchingContext<'_, Self::Impl>,
    ) -> bool {
        false
    }

    fn is_link(&self) -> bool {
        self.is_anchor_with_href()
    }

    fn is_html_slot_element(&self) -> bool {
        false
    }

    fn has_id(&self, id: &IdentStr, case_sensitivity: CaseSensitivity) -> bool {
        self.tree
            .element_id(self.id)
            .is_some_and(|elem_id| case_sensitivity.eq(elem_id.as_bytes(), id.0.as_bytes()))
    }

    fn has_class(&self, name: &IdentStr, case_sensitivity: CaseSensitivity) -> bool {
        self.tree
            .element_classes(self.id)
            .iter()
            .any(|c| case_sensitivity.eq(c.as_bytes(), name.0.as_bytes()))
    }

    fn imported_part(&self, _name: &IdentStr) -> Option<IdentStr> {
        None
    }

    fn is_part(&self, _name: &IdentStr) -> bool {
        false
    }

    fn is_empty(&self) -> bool {
        self.tree.children(self.id).all(|child| match self.tree.get(child).map(|n| &n.data) {
            Some(NodeData::Element { .. }) => false,
            Some(NodeData::Text(t)) => t.trim().is_empty(),
            _ => true,
        })
    }

    fn is_root(&self) -> bool {
        let parent = self.tree.parent(self.id);
        self.tree
            .get(parent)
            .is_some_and(|p| matches!(p.data, NodeData::Document))
    }

    fn apply_selector_flags(&self, _flags: ElementSelectorFlags) {}

    fn add_element_unique_hashes(&self, _filter: &mut selectors::bloom::BloomFilter) -> bool {
        false
    }

    fn has_custom_state(&self, _name: &IdentStr) -> bool {
        false
    }
}
