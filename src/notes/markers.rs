//! Inline marker numbering and popover button tagging.

use std::time::Duration;

use tracing::{debug, warn};

use crate::dom::{NodeId, Tree};
use crate::popover::PopoverRenderer;

const POPOVER_BUTTON_CLASS: &str = "bigfoot-footnote__button";
const NUMBER_ATTR: &str = "data-footnote-number";

/// How the wait for the popover renderer ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopoverSync {
    Completed,
    /// The renderer returned an error; tagging ran on what it left behind.
    Failed,
    /// The fallback delay elapsed first.
    TimedOut,
}

fn inside_appendix(tree: &Tree, node: NodeId) -> bool {
    let mut current = tree.parent(node);
    while current.is_some() {
        if tree.has_class(current, "appendix") {
            return true;
        }
        current = tree.parent(current);
    }
    false
}

/// Replace the text of every `.footnote` marker with its 1-based position.
///
/// Hand-numbered documents mark their markers `brackets`; if any marker
/// carries it, numbering is left as authored. List items moved into the
/// appendix are not markers. Returns how many markers were renumbered.
pub fn relabel_markers(tree: &mut Tree) -> usize {
    let markers: Vec<NodeId> = tree
        .elements_by_class(tree.document(), "footnote")
        .into_iter()
        .filter(|&node| !inside_appendix(tree, node))
        .collect();

    if markers.iter().any(|&node| tree.has_class(node, "brackets")) {
        debug!("markers are bracketed, keeping authored numbering");
        return 0;
    }

    for (index, &marker) in markers.iter().enumerate() {
        tree.set_text(marker, &(index + 1).to_string());
    }
    markers.len()
}

fn is_citation_button(tree: &Tree, button: NodeId) -> bool {
    tree.get_attr(button, "data-bigfoot-footnote")
        .is_some_and(|target| target.contains("citekey"))
        || tree.element_id(button).is_some_and(|id| id.contains("cnref"))
}

/// Prefix the number of citation popover buttons with `c`.
pub fn tag_popover_buttons(tree: &mut Tree) -> usize {
    let mut tagged = 0;
    for button in tree.elements_by_class(tree.document(), POPOVER_BUTTON_CLASS) {
        if !is_citation_button(tree, button) {
            continue;
        }
        let Some(number) = tree.get_attr(button, NUMBER_ATTR) else {
            continue;
        };
        if number.starts_with('c') {
            continue;
        }
        let prefixed = format!("c{number}");
        tree.set_attr(button, NUMBER_ATTR, &prefixed);
        tagged += 1;
    }
    tagged
}

/// Let the renderer materialize its buttons, then tag them.
///
/// The wait is capped at `fallback`. Tagging always runs, on whatever
/// buttons exist by then.
pub async fn tag_popovers_when_ready(
    tree: &mut Tree,
    renderer: &dyn PopoverRenderer,
    fallback: Duration,
) -> PopoverSync {
    let sync = match tokio::time::timeout(fallback, renderer.materialize(tree)).await {
        Ok(Ok(())) => PopoverSync::Completed,
        Ok(Err(e)) => {
            warn!(error = %e, "popover renderer failed");
            PopoverSync::Failed
        }
        Err(_) => {
            warn!(?fallback, "popover renderer did not finish in time");
            PopoverSync::TimedOut
        }
    };

    let tagged = tag_popover_buttons(tree);
    debug!(?sync, tagged, "tagged citation popovers");
    sync
}
