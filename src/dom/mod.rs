//! Arena document tree: parsing, querying, mutation and serialization.

mod select;
mod serialize;
mod tree;
mod tree_sink;

pub use select::{ElementRef, Selector};
pub use serialize::{inner_html, outer_html, serialize_document};
pub use tree::{Attribute, Node, NodeData, NodeId, Tree, html_name};
pub use tree_sink::TreeBuilder;

use html5ever::driver::ParseOpts;
use html5ever::parse_document;
use html5ever::tendril::TendrilSink;

/// Parse an HTML document (or fragment) into a [`Tree`].
pub fn parse_html(html: &str) -> Tree {
    parse_document(TreeBuilder::new(), ParseOpts::default())
        .from_utf8()
        .one(html.as_bytes())
        .into_tree()
}
