//! Search links and local file link conversion.

use std::sync::LazyLock;

use regex_lite::Regex;

use crate::dom::Tree;
use crate::util::encode_component;

/// `file://` up to the first `Resources/`, the root of a bundled document.
static LOCAL_RESOURCE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"file.*?Resources/").unwrap());

/// Query matching everything tagged with all of `tags` first, then anything
/// tagged with any of them: `(a AND b) OR a OR b`.
pub fn build_search_link(tags: &[String], scheme: &str) -> String {
    let encoded: Vec<_> = tags.iter().map(|t| encode_component(t)).collect();
    format!(
        "{scheme}%28{}%29%20OR%20{}",
        encoded.join("%20AND%20"),
        encoded.join("%20OR%20")
    )
}

/// Rewrite links into a bundle's resources to the editor's open scheme.
///
/// Only `file://` hrefs containing `Contents/Resources/` and no fragment are
/// touched. Returns how many links changed.
pub fn convert_local_links(tree: &mut Tree, open_scheme: &str) -> usize {
    let mut converted = 0;
    for anchor in tree.elements_by_tag(tree.document(), "a") {
        let Some(href) = tree.get_attr(anchor, "href") else {
            continue;
        };
        if href.contains('#') || !href.starts_with("file://") || !href.contains("Contents/Resources/")
        {
            continue;
        }
        let rewritten = LOCAL_RESOURCE_RE
            .replace_all(href, regex_lite::NoExpand(open_scheme))
            .replacen('&', "%26", 1);
        tree.set_attr(anchor, "href", &rewritten);
        converted += 1;
    }
    converted
}
