//! Popover renderer seam.
//!
//! Popovers are built by a collaborator, usually a script running in the
//! host. The pipeline only needs to know when the collaborator's buttons
//! exist so it can tag the citation ones. [`StaticPopovers`] is a renderer
//! that builds the buttons directly into the tree, for hosts that serve the
//! output without running scripts.

use std::sync::LazyLock;

use async_trait::async_trait;
use regex_lite::Regex;
use tracing::debug;

use crate::dom::{NodeId, Tree};
use crate::error::Result;

/// Something that turns reference markers into popover buttons.
///
/// The returned future finishing is the readiness signal.
#[async_trait]
pub trait PopoverRenderer: Send + Sync {
    async fn materialize(&self, tree: &mut Tree) -> Result<()>;
}

/// Renderer for documents whose popovers are handled elsewhere.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPopovers;

#[async_trait]
impl PopoverRenderer for NoPopovers {
    async fn materialize(&self, _tree: &mut Tree) -> Result<()> {
        Ok(())
    }
}

/// Fragment patterns, one numbering group each. Checked in order; the first
/// match wins.
static ANCHOR_PATTERNS: LazyLock<[Regex; 3]> = LazyLock::new(|| {
    [
        Regex::new(r"(?i)(cn|fn|footnote|note):?\d+(-\d+)?citation").unwrap(),
        Regex::new(r"(?i)(fn|footnote|note):?\d+(-\d+)?footnote").unwrap(),
        Regex::new(r"(?i)fn:+").unwrap(),
    ]
});

const BUTTON_CLASS: &str = "bigfoot-footnote__button";

/// Builds one `button.bigfoot-footnote__button` after each reference marker.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticPopovers;

impl StaticPopovers {
    fn followed_by_button(tree: &Tree, anchor: NodeId) -> bool {
        let mut next = tree.get(anchor).map(|n| n.next_sibling).unwrap_or(NodeId::NONE);
        while next.is_some() {
            if tree.is_element(next) {
                return tree.is_tag(next, "button") && tree.has_class(next, BUTTON_CLASS);
            }
            let is_blank = tree.text_content(next).is_some_and(|t| t.trim().is_empty());
            if !is_blank {
                return false;
            }
            next = tree.get(next).map(|n| n.next_sibling).unwrap_or(NodeId::NONE);
        }
        false
    }

    /// Insert the buttons synchronously. Returns how many were added.
    pub fn render(tree: &mut Tree) -> usize {
        let anchors: Vec<NodeId> = tree
            .elements_by_tag(tree.document(), "a")
            .into_iter()
            .filter(|&a| tree.has_class(a, "footnote") || tree.has_class(a, "citation"))
            .collect();

        let mut counters = [0usize; 3];
        let mut added = 0;

        for anchor in anchors {
            let Some(target) = tree
                .get_attr(anchor, "href")
                .and_then(|href| href.split('#').nth(1))
                .map(str::to_string)
            else {
                continue;
            };
            let Some(group) = ANCHOR_PATTERNS.iter().position(|re| re.is_match(&target)) else {
                continue;
            };
            counters[group] += 1;
            if Self::followed_by_button(tree, anchor) {
                continue;
            }

            let number = counters[group].to_string();
            let id = format!("{}-popover", tree.element_id(anchor).unwrap_or(target.as_str()));
            let button = tree.create_html_element(
                "button",
                &[
                    ("class", BUTTON_CLASS),
                    ("id", id.as_str()),
                    ("data-bigfoot-footnote", target.as_str()),
                    ("data-footnote-number", number.as_str()),
                ],
            );
            tree.insert_after(anchor, button);
            added += 1;
        }

        debug!(added, "rendered static popover buttons");
        added
    }
}

#[async_trait]
impl PopoverRenderer for StaticPopovers {
    async fn materialize(&self, tree: &mut Tree) -> Result<()> {
        Self::render(tree);
        Ok(())
    }
}
