//! Footnote/citation relinking.
//!
//! Exporters emit footnotes and citations into one `div.footnotes > ol`
//! list and give both kinds identifiers from the same namespace. The passes
//! here run in order on the raw tree:
//!
//! 1. [`rewrite_hrefs`] suffixes every identifier and href with `footnote`
//!    or `citation` so the two kinds can never collide.
//! 2. [`build_appendix`] splits the mixed list into a Notes section and a
//!    References section inside one `div.appendix`.
//! 3. [`relabel_markers`] renumbers the inline markers; popover buttons are
//!    tagged later by [`tag_popovers_when_ready`].

mod appendix;
mod hrefs;
mod markers;

pub use appendix::{
    AppendixOptions, AppendixReport, Partition, ReferenceItem, build_appendix, partition,
};
pub use hrefs::{AnchorLink, HrefReport, LinkRole, anchor_links, rewrite_hrefs, unresolved_links};
pub use markers::{PopoverSync, relabel_markers, tag_popover_buttons, tag_popovers_when_ready};

use crate::dom::{NodeId, Tree};

/// Identifier suffix for footnotes.
pub const FOOTNOTE_SUFFIX: &str = "footnote";
/// Identifier suffix for citations.
pub const CITATION_SUFFIX: &str = "citation";

/// Class of the exporter's mixed reference container.
pub(crate) const MIXED_CONTAINER_CLASS: &str = "footnotes";
/// Class of the Drafts-style citation-only container.
pub(crate) const DRAFTS_CONTAINER_CLASS: &str = "citations";

/// The two kinds of reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NoteKind {
    Footnote,
    Citation,
}

impl NoteKind {
    pub fn suffix(self) -> &'static str {
        match self {
            NoteKind::Footnote => FOOTNOTE_SUFFIX,
            NoteKind::Citation => CITATION_SUFFIX,
        }
    }
}

/// Classify a list item by its raw `class` attribute.
///
/// Only the two exact spellings exporters produce for citations count;
/// anything else, including class strings we have never seen, renders as a
/// footnote.
pub fn classify(class: &str) -> NoteKind {
    match class {
        "citation" | "citation footnote-processed" => NoteKind::Citation,
        _ => NoteKind::Footnote,
    }
}

pub(crate) fn mixed_container(tree: &Tree) -> Option<NodeId> {
    tree.first_by_class(tree.document(), MIXED_CONTAINER_CLASS)
}

pub(crate) fn drafts_container(tree: &Tree) -> Option<NodeId> {
    tree.first_by_class(tree.document(), DRAFTS_CONTAINER_CLASS)
}

/// The `li` items of the first `ol` inside `container`, in source order.
pub(crate) fn list_items(tree: &Tree, container: NodeId) -> Vec<NodeId> {
    match tree.first_by_tag(container, "ol") {
        Some(ol) => tree
            .element_children(ol)
            .filter(|&li| tree.is_tag(li, "li"))
            .collect(),
        None => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_exact_citation_spellings() {
        assert_eq!(classify("citation"), NoteKind::Citation);
        assert_eq!(classify("citation footnote-processed"), NoteKind::Citation);
    }

    #[test]
    fn test_classify_defaults_to_footnote() {
        assert_eq!(classify(""), NoteKind::Footnote);
        assert_eq!(classify("footnote"), NoteKind::Footnote);
        assert_eq!(classify("citation-ish"), NoteKind::Footnote);
        assert_eq!(classify("footnote-processed citation"), NoteKind::Footnote);
        assert_eq!(classify("Citation"), NoteKind::Footnote);
    }

    #[test]
    fn test_list_items_skips_nested_lists() {
        let tree = crate::dom::parse_html(
            r#"<div class="footnotes"><ol>
                <li id="a">A<ol><li id="nested">n</li></ol></li>
                <li id="b">B</li>
            </ol></div>"#,
        );
        let container = mixed_container(&tree).unwrap();
        let ids: Vec<_> = list_items(&tree, container)
            .into_iter()
            .filter_map(|li| tree.element_id(li))
            .collect();
        assert_eq!(ids, vec!["a", "b"]);
    }
}
