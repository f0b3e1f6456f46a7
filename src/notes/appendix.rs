//! Splitting the mixed reference list into Notes and References.
//!
//! ```text
//! div.footnotes > ol > li*          div.appendix
//! div.citations > ol > li*   ==>      div.footnotes > h1 "Notes" + ol > li*
//!                                     div.citations > h1 "References" + ul > li*
//! ```

use tracing::debug;

use super::{NoteKind, classify, drafts_container, list_items, mixed_container};
use crate::dom::{NodeId, Tree, inner_html};

const HEADING_STYLE: &str = "page-break-before: always";

/// One list item and where it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReferenceItem {
    pub node: NodeId,
    pub kind: NoteKind,
    /// Index in source order across the mixed list then the drafts list.
    pub position: usize,
}

/// The two buckets, each in source order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Partition {
    pub notes: Vec<ReferenceItem>,
    pub references: Vec<ReferenceItem>,
    /// Items that came from the drafts container. All of them are also in
    /// `references`.
    pub drafts: Vec<NodeId>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AppendixOptions {
    pub sort_citations: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AppendixReport {
    pub notes: usize,
    pub references: usize,
    /// False when the document had no reference container at all.
    pub replaced: bool,
}

/// Classify the items of both containers without touching the tree.
///
/// The item lists are snapshotted up front, so the caller is free to move
/// nodes while walking the result.
pub fn partition(tree: &Tree) -> Partition {
    let mut out = Partition::default();
    let mut position = 0;

    if let Some(container) = mixed_container(tree) {
        for node in list_items(tree, container) {
            let kind = classify(tree.get_attr(node, "class").unwrap_or(""));
            let item = ReferenceItem { node, kind, position };
            match kind {
                NoteKind::Footnote => out.notes.push(item),
                NoteKind::Citation => out.references.push(item),
            }
            position += 1;
        }
    }

    if let Some(container) = drafts_container(tree) {
        for node in list_items(tree, container) {
            out.references.push(ReferenceItem {
                node,
                kind: NoteKind::Citation,
                position,
            });
            out.drafts.push(node);
            position += 1;
        }
    }

    out
}

fn section(tree: &mut Tree, class: &str, title: &str, list_tag: &str, items: &[ReferenceItem]) -> NodeId {
    let container = tree.create_html_element("div", &[("class", class)]);
    let heading = tree.create_html_element("h1", &[("style", HEADING_STYLE)]);
    tree.append_text(heading, title);
    tree.append(container, heading);

    let list = tree.create_html_element(list_tag, &[]);
    for item in items {
        tree.append(list, item.node);
    }
    tree.append(container, list);
    container
}

/// Replace the reference containers with a single `div.appendix`.
///
/// The appendix takes the mixed container's place, or the drafts
/// container's when there is no mixed one. A drafts container that was not
/// replaced is removed. Empty buckets produce no section. A container
/// without an `<ol>` is not a reference list and is left alone.
pub fn build_appendix(tree: &mut Tree, options: &AppendixOptions) -> AppendixReport {
    let has_list = |c: &NodeId| tree.first_by_tag(*c, "ol").is_some();
    let mixed = mixed_container(tree).filter(has_list);
    let drafts = drafts_container(tree).filter(has_list);

    let Some(anchor_point) = mixed.or(drafts) else {
        return AppendixReport::default();
    };

    let mut parts = partition(tree);

    // Drafts items carry a leading back-reference that makes no sense once
    // the item lives in a shared list.
    for &node in &parts.drafts {
        if let Some(first_anchor) = tree.first_by_tag(node, "a") {
            tree.set_attr(first_anchor, "style", "display: none");
        }
    }

    if options.sort_citations {
        let mut keyed: Vec<_> = parts
            .references
            .iter()
            .map(|item| (inner_html(tree, item.node).to_lowercase(), *item))
            .collect();
        keyed.sort_by(|a, b| a.0.cmp(&b.0));
        parts.references = keyed.into_iter().map(|(_, item)| item).collect();
    }

    let appendix = tree.create_html_element("div", &[("class", "appendix")]);
    if !parts.notes.is_empty() {
        let notes = section(tree, "footnotes", "Notes", "ol", &parts.notes);
        tree.append(appendix, notes);
    }
    if !parts.references.is_empty() {
        let references = section(tree, "citations", "References", "ul", &parts.references);
        tree.append(appendix, references);
    }

    tree.replace(anchor_point, appendix);
    if let Some(drafts) = drafts
        && drafts != anchor_point
    {
        tree.detach(drafts);
    }

    let report = AppendixReport {
        notes: parts.notes.len(),
        references: parts.references.len(),
        replaced: true,
    };
    debug!(?report, "built reference appendix");
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{outer_html, parse_html};
    use proptest::prelude::*;

    fn texts(tree: &Tree, section_class: &str) -> Vec<String> {
        let Some(appendix) = tree.first_by_class(tree.document(), "appendix") else {
            return Vec::new();
        };
        let Some(section) = tree.first_by_class(appendix, section_class) else {
            return Vec::new();
        };
        tree.elements_by_tag(section, "li")
            .into_iter()
            .map(|li| tree.text_of(li).trim().to_string())
            .collect()
    }

    #[test]
    fn test_mixed_list_split() {
        let mut tree = parse_html(
            r#"<p>body</p><div class="footnotes"><ol>
                <li id="fn:1">A</li>
                <li id="fn:2" class="citation">B</li>
            </ol></div><p>after</p>"#,
        );
        let report = build_appendix(&mut tree, &AppendixOptions::default());

        assert_eq!(
            report,
            AppendixReport {
                notes: 1,
                references: 1,
                replaced: true
            }
        );
        assert_eq!(texts(&tree, "footnotes"), vec!["A"]);
        assert_eq!(texts(&tree, "citations"), vec!["B"]);

        let appendix = tree.first_by_class(tree.document(), "appendix").unwrap();
        let html = outer_html(&tree, appendix);
        assert!(html.contains(r#"<h1 style="page-break-before: always">Notes</h1><ol>"#));
        assert!(html.contains(r#"<h1 style="page-break-before: always">References</h1><ul>"#));

        // the appendix sits where the list was
        let body = tree.body();
        let tags: Vec<_> = tree
            .element_children(body)
            .map(|c| tree.element_name(c).unwrap().to_string())
            .collect();
        assert_eq!(tags, vec!["p", "div", "p"]);
        // only the appendix's own footnotes section remains
        assert_eq!(tree.elements_by_class(tree.document(), "footnotes").len(), 1);
    }

    #[test]
    fn test_counts_and_empty_bucket_suppressed() {
        let mut tree = parse_html(
            r#"<div class="footnotes"><ol>
                <li>1</li><li>2</li><li>3</li>
            </ol></div>"#,
        );
        let report = build_appendix(&mut tree, &AppendixOptions::default());
        assert_eq!((report.notes, report.references), (3, 0));
        assert!(tree.first_by_class(tree.document(), "citations").is_none());
        assert!(!crate::dom::serialize_document(&tree).contains("References"));
    }

    #[test]
    fn test_processed_class_is_citation() {
        let mut tree = parse_html(
            r#"<div class="footnotes"><ol>
                <li class="citation footnote-processed">Cited</li>
                <li class="footnote-processed">Note</li>
            </ol></div>"#,
        );
        let report = build_appendix(&mut tree, &AppendixOptions::default());
        assert_eq!((report.notes, report.references), (1, 1));
        assert_eq!(texts(&tree, "citations"), vec!["Cited"]);
    }

    #[test]
    fn test_drafts_items_appended_and_container_removed() {
        let mut tree = parse_html(
            r##"<div class="footnotes"><ol><li class="citation">Mixed</li></ol></div>
            <div class="citations"><ol>
                <li><a href="#r1">^</a> Drafts one</li>
                <li><a href="#r2">^</a> Drafts two</li>
            </ol></div>"##,
        );
        let report = build_appendix(&mut tree, &AppendixOptions::default());
        assert_eq!(report.references, 3);
        assert_eq!(
            texts(&tree, "citations"),
            vec!["Mixed", "^ Drafts one", "^ Drafts two"]
        );

        let appendix = tree.first_by_class(tree.document(), "appendix").unwrap();
        let hidden = tree
            .elements_by_tag(appendix, "a")
            .into_iter()
            .filter(|&a| tree.get_attr(a, "style") == Some("display: none"))
            .count();
        assert_eq!(hidden, 2);
        // one div.citations left: the appendix section
        assert_eq!(tree.elements_by_class(tree.document(), "citations").len(), 1);
    }

    #[test]
    fn test_drafts_only_document() {
        let mut tree = parse_html(
            r#"<p>x</p><div class="citations"><ol><li>Only</li></ol></div>"#,
        );
        let report = build_appendix(&mut tree, &AppendixOptions::default());
        assert!(report.replaced);
        assert_eq!(report.references, 1);
        assert!(tree.first_by_class(tree.document(), "appendix").is_some());
    }

    #[test]
    fn test_no_containers_is_noop() {
        let mut tree = parse_html("<p>plain</p>");
        let before = crate::dom::serialize_document(&tree);
        let report = build_appendix(&mut tree, &AppendixOptions::default());
        assert!(!report.replaced);
        assert_eq!(crate::dom::serialize_document(&tree), before);
    }

    #[test]
    fn test_container_without_list_is_kept() {
        let mut tree = parse_html(
            r#"<p>body</p><div class="footnotes"><p>Important closing remark.</p><ul><li>kept</li></ul></div>"#,
        );
        let before = crate::dom::serialize_document(&tree);
        let report = build_appendix(&mut tree, &AppendixOptions::default());
        assert_eq!(report, AppendixReport::default());
        let after = crate::dom::serialize_document(&tree);
        assert_eq!(after, before);
        assert!(after.contains("Important closing remark."));
    }

    #[test]
    fn test_sort_citations_case_insensitive() {
        let mut tree = parse_html(
            r#"<div class="footnotes"><ol>
                <li class="citation">zeta</li>
                <li class="citation">Alpha</li>
                <li class="citation">beta</li>
            </ol></div>"#,
        );
        build_appendix(
            &mut tree,
            &AppendixOptions {
                sort_citations: true,
            },
        );
        assert_eq!(texts(&tree, "citations"), vec!["Alpha", "beta", "zeta"]);
    }

    #[test]
    fn test_partition_positions() {
        let tree = parse_html(
            r#"<div class="footnotes"><ol>
                <li>a</li><li class="citation">b</li><li>c</li>
            </ol></div>"#,
        );
        let parts = partition(&tree);
        let note_positions: Vec<_> = parts.notes.iter().map(|i| i.position).collect();
        let ref_positions: Vec<_> = parts.references.iter().map(|i| i.position).collect();
        assert_eq!(note_positions, vec![0, 2]);
        assert_eq!(ref_positions, vec![1]);
    }

    proptest! {
        #[test]
        fn prop_buckets_preserve_source_order(kinds in prop::collection::vec(any::<bool>(), 0..24)) {
            let items: String = kinds
                .iter()
                .enumerate()
                .map(|(i, &citation)| {
                    if citation {
                        format!(r#"<li class="citation">item{i}</li>"#)
                    } else {
                        format!("<li>item{i}</li>")
                    }
                })
                .collect();
            let mut tree = parse_html(&format!(r#"<div class="footnotes"><ol>{items}</ol></div>"#));
            let report = build_appendix(&mut tree, &AppendixOptions::default());

            let expected_notes: Vec<_> = kinds
                .iter()
                .enumerate()
                .filter(|(_, c)| !**c)
                .map(|(i, _)| format!("item{i}"))
                .collect();
            let expected_refs: Vec<_> = kinds
                .iter()
                .enumerate()
                .filter(|(_, c)| **c)
                .map(|(i, _)| format!("item{i}"))
                .collect();

            prop_assert_eq!(report.notes, expected_notes.len());
            prop_assert_eq!(report.references, expected_refs.len());
            prop_assert_eq!(texts(&tree, "footnotes"), expected_notes);
            prop_assert_eq!(texts(&tree, "citations"), expected_refs);
        }
    }
}
