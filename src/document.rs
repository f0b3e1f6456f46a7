//! The document context threaded through every pipeline stage.

use crate::dom::{self, Tree};
use crate::util::{decode_text, extract_encoding_hint};

/// Attribute on `<body>` recording that the core passes already ran.
pub const PROCESSED_ATTR: &str = "data-footcite";

/// How the host signals that a document is ready for post-processing.
///
/// All three trigger the same pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    /// `<body drafts>`: exported by Drafts.
    BodyAttribute,
    /// `<body class="wy-body-for-nav">`: a Sphinx build.
    BodyClass,
    /// The host dispatched its change event (iA Writer previews).
    HostEvent,
}

/// A parsed document plus what we know about where it came from.
pub struct Document {
    pub tree: Tree,
}

impl Document {
    pub fn parse(html: &str) -> Self {
        Self {
            tree: dom::parse_html(html),
        }
    }

    /// Parse raw bytes, detecting the text encoding.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let text = decode_text(bytes, extract_encoding_hint(bytes));
        Self::parse(&text)
    }

    pub fn to_html(&self) -> String {
        dom::serialize_document(&self.tree)
    }

    /// Detect the marker-based activation conventions.
    ///
    /// Event-driven hosts leave no marker in the markup, so this never
    /// returns [`Activation::HostEvent`]; the caller supplies that one.
    pub fn activation(&self) -> Option<Activation> {
        let body = self.tree.find_by_tag("body")?;
        if self.tree.has_attr(body, "drafts") {
            Some(Activation::BodyAttribute)
        } else if self.tree.has_class(body, "wy-body-for-nav") {
            Some(Activation::BodyClass)
        } else {
            None
        }
    }

    pub fn is_processed(&self) -> bool {
        let body = self.tree.body();
        self.tree.get_attr(body, PROCESSED_ATTR) == Some("processed")
    }

    pub(crate) fn mark_processed(&mut self) {
        let body = self.tree.body();
        self.tree.set_attr(body, PROCESSED_ATTR, "processed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_activation_conventions() {
        let drafts = Document::parse("<html><body drafts><p>x</p></body></html>");
        assert_eq!(drafts.activation(), Some(Activation::BodyAttribute));

        let sphinx = Document::parse(r#"<html><body class="wy-body-for-nav"></body></html>"#);
        assert_eq!(sphinx.activation(), Some(Activation::BodyClass));

        let plain = Document::parse("<html><body><p>x</p></body></html>");
        assert_eq!(plain.activation(), None);
    }

    #[test]
    fn test_processed_marker() {
        let mut doc = Document::parse("<p>x</p>");
        assert!(!doc.is_processed());
        doc.mark_processed();
        assert!(doc.is_processed());
        assert!(doc.to_html().contains(r#"<body data-footcite="processed">"#));
    }

    #[test]
    fn test_from_bytes_legacy_encoding() {
        let doc = Document::from_bytes(b"<p>caf\xE9</p>");
        let p = doc.tree.find_by_tag("p").unwrap();
        assert_eq!(doc.tree.text_of(p), "café");
    }
}
