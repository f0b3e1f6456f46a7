//! Hashtags written inline in the document.

use crate::dom::{NodeId, Tree};
use crate::util::encode_component;

/// Text of every `.hashtag` element in document order, first `#` removed.
pub fn extract_tags(tree: &Tree) -> Vec<String> {
    tree.elements_by_class(tree.document(), "hashtag")
        .into_iter()
        .map(|node| tree.text_of(node).trim().replacen('#', "", 1))
        .filter(|tag| !tag.is_empty())
        .collect()
}

/// Drop every tag on the stoplist.
pub fn filter_tags<S: AsRef<str>>(tags: &[String], stoplist: &[S]) -> Vec<String> {
    tags.iter()
        .filter(|tag| !stoplist.iter().any(|stop| stop.as_ref() == tag.as_str()))
        .cloned()
        .collect()
}

/// `div.tags` holding `tags: ` and one link per tag.
///
/// Returns `None` for an empty tag list.
pub fn tag_block(tree: &mut Tree, tags: &[String], scheme: &str) -> Option<NodeId> {
    if tags.is_empty() {
        return None;
    }

    let block = tree.create_html_element("div", &[("class", "tags")]);
    tree.append_text(block, "tags: ");
    for (i, tag) in tags.iter().enumerate() {
        if i > 0 {
            tree.append_text(block, " ");
        }
        let href = format!("{scheme}{}", encode_component(tag));
        let link = tree.create_html_element("a", &[("href", href.as_str()), ("class", "hashtag")]);
        tree.append_text(link, &format!("#{tag}"));
        tree.append(block, link);
    }
    Some(block)
}
