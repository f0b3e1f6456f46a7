//! Links from a note to related material.
//!
//! Hashtags and metadata are read out of the document, then an
//! "Additional Resources" panel is appended to the body: the tag links, the
//! bookmarks the feed returns for those tags, and a combined search link.

mod bookmarks;
mod links;
mod metadata;
mod tags;

pub use bookmarks::{
    Bookmark, BookmarkFeed, BookmarkFetch, FetchOutcome, Lookup, PinboardFeed, fetch_bookmarks,
    plan_lookups, render_bookmark,
};
pub use links::{build_search_link, convert_local_links};
pub use metadata::{Metadata, extract_metadata};
pub use tags::{extract_tags, filter_tags, tag_block};

use crate::config::ResourcesConfig;
use crate::dom::{NodeId, Tree};

/// Tags too common to narrow a lookup.
pub const DEFAULT_STOPLIST: &[&str] = &[
    "cheatsheet",
    "★★★★★",
    "★★★★☆",
    "★★★☆☆",
    "★★☆☆☆",
    "★☆☆☆☆",
    "article",
    "tutorial",
    "podcast",
    "video",
];

pub const PANEL_ID: &str = "additional_resources";
const BOOKMARKS_ID: &str = "pinboard_bookmarks";

/// Handles into an appended panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourcePanel {
    pub root: NodeId,
    /// Where fetched bookmarks go; `None` when fetching is off.
    pub bookmarks: Option<NodeId>,
}

fn heading(tree: &mut Tree, level: &str, text: &str) -> NodeId {
    let h = tree.create_html_element(level, &[]);
    tree.append_text(h, text);
    h
}

fn section(tree: &mut Tree, id: &str, title: &str) -> NodeId {
    let div = tree.create_html_element("div", &[("id", id)]);
    let h = heading(tree, "h2", title);
    tree.append(div, h);
    div
}

/// Append the panel to the body.
///
/// `tags` is every tag in the document and feeds the tag block; `lookup_tags`
/// is the filtered list used for searches. Nothing is built when
/// `lookup_tags` is empty.
pub fn build_panel(
    tree: &mut Tree,
    tags: &[String],
    lookup_tags: &[String],
    config: &ResourcesConfig,
) -> Option<ResourcePanel> {
    if lookup_tags.is_empty() {
        return None;
    }

    let root = tree.create_html_element("div", &[("id", PANEL_ID)]);
    let title = heading(tree, "h1", "Additional Resources");
    tree.append(root, title);

    let zettelkasten = section(tree, "tag_links", "Zettelkasten");
    if let Some(block) = tag_block(tree, tags, &config.tag_scheme) {
        tree.append(zettelkasten, block);
    }
    tree.append(root, zettelkasten);

    let bookmarks = if config.fetch_bookmarks {
        let container = section(tree, BOOKMARKS_ID, "Bookmarks");
        tree.append(root, container);
        Some(container)
    } else {
        None
    };

    let search = section(tree, "search_links", "Search");
    let href = build_search_link(lookup_tags, &config.search_scheme);
    let link = tree.create_html_element("a", &[("href", href.as_str())]);
    tree.append_text(link, "search");
    tree.append(search, link);
    tree.append(root, search);

    let body = tree.body();
    tree.append(body, root);
    Some(ResourcePanel { root, bookmarks })
}

/// Render fetched batches into the panel's bookmark section in the order
/// given. Returns how many items were added.
pub fn append_bookmarks(
    tree: &mut Tree,
    container: NodeId,
    outcome: &FetchOutcome,
    profile_base: &str,
) -> usize {
    let mut added = 0;
    for bookmark in outcome.batches.iter().flatten() {
        if let Some(item) = render_bookmark(tree, bookmark, profile_base) {
            tree.append(container, item);
            added += 1;
        }
    }
    added
}
