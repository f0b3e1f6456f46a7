//! Identifier disambiguation between footnotes and citations.
//!
//! Exporters number footnotes and citations from one sequence of ids
//! (`fn:1`, `fn:2`, ...) and the popover renderer matches anchors by id
//! pattern, so each id and href gets a kind suffix:
//!
//! ```html
//! <a class="citation" href="#fn:2">          → href="#fn:2citation"
//! <li id="fn:2" class="citation">            → id="fn:2citation"
//! <a class="footnote" id="fnref:1" href="#fn:1">
//!                                            → id="fnref:1footnote" href="#fn:1footnote"
//! <a class="reversefootnote" href="#fnref:1"> → href="#fnref:1footnote"
//! ```

use tracing::debug;

use super::{
    CITATION_SUFFIX, FOOTNOTE_SUFFIX, drafts_container, list_items, mixed_container,
};
use crate::dom::{NodeId, Tree};

/// Counts of what [`rewrite_hrefs`] touched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HrefReport {
    pub citation_links: usize,
    pub footnote_links: usize,
    pub back_links: usize,
    pub citation_ids: usize,
    pub footnote_ids: usize,
}

/// Direction of a reference-pointing anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkRole {
    /// Inline marker pointing forward at its note.
    Marker,
    /// Link from a note back to where it is used.
    BackLink,
}

/// A reference-pointing anchor and the identifier it targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnchorLink {
    pub node: NodeId,
    pub target: String,
    pub role: LinkRole,
}

/// The part of an href after the first `#`.
fn fragment(href: &str) -> Option<&str> {
    href.split('#').nth(1)
}

/// Point `anchor` at its fragment plus `suffix`. Anchors without a fragment
/// are left alone rather than turned into a dangling link.
fn suffix_href(tree: &mut Tree, anchor: NodeId, suffix: &str) -> bool {
    let new_href = match tree.get_attr(anchor, "href").and_then(fragment) {
        Some(fragment) => format!("#{fragment}{suffix}"),
        None => return false,
    };
    tree.set_attr(anchor, "href", &new_href);
    true
}

/// Append `suffix` to the node's id. Nodes without an id do not get one.
fn suffix_id(tree: &mut Tree, node: NodeId, suffix: &str) -> bool {
    let new_id = match tree.element_id(node) {
        Some(id) if !id.is_empty() => format!("{id}{suffix}"),
        _ => return false,
    };
    tree.set_attr(node, "id", &new_id);
    true
}

fn anchors_with_class(tree: &Tree, class: &str) -> Vec<NodeId> {
    tree.elements_by_class(tree.document(), class)
        .into_iter()
        .filter(|&node| tree.is_tag(node, "a"))
        .collect()
}

/// Suffix every footnote/citation identifier and href in the tree.
///
/// Each step looks up its own container and silently skips when it is
/// missing.
pub fn rewrite_hrefs(tree: &mut Tree) -> HrefReport {
    let mut report = HrefReport::default();

    for anchor in anchors_with_class(tree, "citation") {
        if suffix_href(tree, anchor, CITATION_SUFFIX) {
            report.citation_links += 1;
        }
    }

    let mixed_items = mixed_container(tree)
        .map(|container| list_items(tree, container))
        .unwrap_or_default();

    for &item in &mixed_items {
        if tree.has_class(item, "citation") && suffix_id(tree, item, CITATION_SUFFIX) {
            report.citation_ids += 1;
        }
    }

    if let Some(container) = drafts_container(tree) {
        for item in list_items(tree, container) {
            if suffix_id(tree, item, CITATION_SUFFIX) {
                report.citation_ids += 1;
            }
        }
    }

    for anchor in anchors_with_class(tree, "footnote") {
        if suffix_href(tree, anchor, FOOTNOTE_SUFFIX) {
            report.footnote_links += 1;
        }
        suffix_id(tree, anchor, FOOTNOTE_SUFFIX);
    }

    for anchor in anchors_with_class(tree, "reversefootnote") {
        if suffix_href(tree, anchor, FOOTNOTE_SUFFIX) {
            report.back_links += 1;
        }
    }

    for &item in &mixed_items {
        if !tree.has_class(item, "citation") && suffix_id(tree, item, FOOTNOTE_SUFFIX) {
            report.footnote_ids += 1;
        }
    }

    debug!(?report, "rewrote reference identifiers");
    report
}

/// Every reference-pointing anchor in document order.
pub fn anchor_links(tree: &Tree) -> Vec<AnchorLink> {
    tree.descendants(tree.document())
        .filter(|&node| tree.is_tag(node, "a"))
        .filter_map(|node| {
            let role = if tree.has_class(node, "citation") || tree.has_class(node, "footnote") {
                LinkRole::Marker
            } else if tree.has_class(node, "reversefootnote") {
                LinkRole::BackLink
            } else {
                return None;
            };
            let target = fragment(tree.get_attr(node, "href")?)?.to_string();
            Some(AnchorLink { node, target, role })
        })
        .collect()
}

/// Anchors whose target id does not exist in the tree.
pub fn unresolved_links(tree: &Tree) -> Vec<AnchorLink> {
    anchor_links(tree)
        .into_iter()
        .filter(|link| tree.get_by_id(&link.target).is_none())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::parse_html;

    const MIXED: &str = r##"
        <p>Claim<sup><a class="footnote" id="fnref:1" href="#fn:1">1</a></sup>
           and source<sup><a class="citation" id="cnref:2" href="#fn:2">2</a></sup>.</p>
        <div class="footnotes"><ol>
            <li id="fn:1">Note. <a class="reversefootnote" href="#fnref:1">↩</a></li>
            <li id="fn:2" class="citation">Source.</li>
        </ol></div>
    "##;

    #[test]
    fn test_citation_href_and_id_resolve() {
        let mut tree = parse_html(r##"<a class="citation" href="#foo">1</a>
            <div class="footnotes"><ol><li id="foo" class="citation">B</li></ol></div>"##);
        rewrite_hrefs(&mut tree);

        let anchor = tree.find_by_tag("a").unwrap();
        assert_eq!(tree.get_attr(anchor, "href"), Some("#foocitation"));
        let li = tree.get_by_id("foocitation").expect("suffixed id");
        assert!(tree.is_tag(li, "li"));
        assert!(unresolved_links(&tree).is_empty());
    }

    #[test]
    fn test_mixed_document_rewrite() {
        let mut tree = parse_html(MIXED);
        let report = rewrite_hrefs(&mut tree);

        assert_eq!(
            report,
            HrefReport {
                citation_links: 1,
                footnote_links: 1,
                back_links: 1,
                citation_ids: 1,
                footnote_ids: 1,
            }
        );

        let marker = tree.get_by_id("fnref:1footnote").expect("marker id suffixed");
        assert_eq!(tree.get_attr(marker, "href"), Some("#fn:1footnote"));
        assert!(tree.get_by_id("fn:1footnote").is_some());
        assert!(tree.get_by_id("fn:2citation").is_some());
        // citation anchors keep their own id
        assert!(tree.get_by_id("cnref:2").is_some());
        assert!(unresolved_links(&tree).is_empty());
    }

    #[test]
    fn test_back_link_role_and_target() {
        let mut tree = parse_html(MIXED);
        rewrite_hrefs(&mut tree);
        let back: Vec<_> = anchor_links(&tree)
            .into_iter()
            .filter(|l| l.role == LinkRole::BackLink)
            .collect();
        assert_eq!(back.len(), 1);
        assert_eq!(back[0].target, "fnref:1footnote");
    }

    #[test]
    fn test_drafts_container_ids_always_citation() {
        let mut tree = parse_html(
            r##"<a class="citation" href="#c1">1</a>
            <div class="citations"><ol><li id="c1"><a href="#r">↩</a>Book</li></ol></div>"##,
        );
        rewrite_hrefs(&mut tree);
        assert!(tree.get_by_id("c1citation").is_some());
        assert!(unresolved_links(&tree).is_empty());
    }

    #[test]
    fn test_missing_containers_are_noops() {
        let mut tree = parse_html("<p>No references here.</p>");
        assert_eq!(rewrite_hrefs(&mut tree), HrefReport::default());
    }

    #[test]
    fn test_href_without_fragment_left_alone() {
        let mut tree = parse_html(r#"<a class="footnote" href="notes.html">1</a>"#);
        rewrite_hrefs(&mut tree);
        let anchor = tree.find_by_tag("a").unwrap();
        assert_eq!(tree.get_attr(anchor, "href"), Some("notes.html"));
        assert_eq!(tree.element_id(anchor), None);
    }

    #[test]
    fn test_absolute_href_keeps_fragment_only() {
        let mut tree =
            parse_html(r#"<a class="footnote" href="file:///doc.html#fn:3">3</a>"#);
        rewrite_hrefs(&mut tree);
        let anchor = tree.find_by_tag("a").unwrap();
        assert_eq!(tree.get_attr(anchor, "href"), Some("#fn:3footnote"));
    }
}
