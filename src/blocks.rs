//! Per-block adapters run over the document after the reference passes.
//!
//! An adapter names a CSS selector and a transformation. Every element the
//! selector matches is handed to [`BlockAdapter::apply`] on its own; a
//! failing block is logged and skipped.

use tracing::{debug, warn};

use crate::dom::{NodeId, Selector, Tree};
use crate::error::{Error, Result};

pub trait BlockAdapter: Send + Sync {
    fn name(&self) -> &str;

    /// CSS selector for the blocks this adapter handles.
    fn selector(&self) -> &str;

    fn apply(&self, tree: &mut Tree, node: NodeId) -> Result<()>;
}

/// Diagram blocks must not be touched by syntax highlighters; the diagram
/// script reads their raw text.
#[derive(Debug, Clone, Copy, Default)]
pub struct MermaidNoHighlight;

impl BlockAdapter for MermaidNoHighlight {
    fn name(&self) -> &str {
        "mermaid-nohighlight"
    }

    fn selector(&self) -> &str {
        ".mermaid, .highlight-mermaid"
    }

    fn apply(&self, tree: &mut Tree, node: NodeId) -> Result<()> {
        tree.set_attr(node, "class", "nohighlight mermaid");
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AdapterReport {
    pub applied: usize,
    pub failed: usize,
}

/// Registered adapters with their compiled selectors, run in registration
/// order.
#[derive(Default)]
pub struct AdapterSet {
    adapters: Vec<(Box<dyn BlockAdapter>, Selector)>,
}

impl AdapterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// The adapters every document gets.
    pub fn builtin() -> Self {
        let mut set = Self::new();
        // constant selector, always parses
        if let Err(e) = set.register(MermaidNoHighlight) {
            warn!(error = %e, "built-in adapter rejected");
        }
        set
    }

    /// Add an adapter. Fails when its selector does not parse.
    pub fn register(&mut self, adapter: impl BlockAdapter + 'static) -> Result<()> {
        let selector = Selector::parse(adapter.selector()).map_err(|e| match e {
            Error::Selector(msg) => Error::Selector(format!("{}: {msg}", adapter.name())),
            other => other,
        })?;
        self.adapters.push((Box::new(adapter), selector));
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }

    pub fn run(&self, tree: &mut Tree) -> AdapterReport {
        let mut report = AdapterReport::default();
        for (adapter, selector) in &self.adapters {
            let blocks = selector.select(tree, tree.document());
            for node in blocks {
                match adapter.apply(tree, node) {
                    Ok(()) => report.applied += 1,
                    Err(e) => {
                        warn!(adapter = adapter.name(), error = %e, "block adapter failed, skipping block");
                        report.failed += 1;
                    }
                }
            }
        }
        debug!(?report, "ran block adapters");
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::parse_html;

    #[test]
    fn test_mermaid_blocks_marked() {
        let mut tree = parse_html(
            r#"<pre><code class="mermaid">graph TD; A-->B</code></pre>
            <div class="highlight-mermaid"><pre>x</pre></div>
            <pre><code class="rust">fn main() {}</code></pre>"#,
        );
        let report = AdapterSet::builtin().run(&mut tree);
        assert_eq!(report.applied, 2);

        let marked = tree.elements_by_class(tree.document(), "nohighlight");
        assert_eq!(marked.len(), 2);
        for node in marked {
            assert_eq!(tree.get_attr(node, "class"), Some("nohighlight mermaid"));
        }
        let rust = tree.first_by_class(tree.document(), "rust").unwrap();
        assert!(!tree.has_class(rust, "nohighlight"));
    }

    struct FailOnOdd;

    impl BlockAdapter for FailOnOdd {
        fn name(&self) -> &str {
            "fail-on-odd"
        }

        fn selector(&self) -> &str {
            "p.item"
        }

        fn apply(&self, tree: &mut Tree, node: NodeId) -> Result<()> {
            let n: usize = tree.text_of(node).trim().parse().unwrap_or(0);
            if n % 2 == 1 {
                return Err(Error::Adapter {
                    adapter: self.name().to_string(),
                    message: format!("odd block {n}"),
                });
            }
            tree.set_attr(node, "data-seen", "yes");
            Ok(())
        }
    }

    #[test]
    fn test_failure_contained_per_block() {
        let mut tree = parse_html(
            r#"<p class="item">1</p><p class="item">2</p><p class="item">3</p><p class="item">4</p>"#,
        );
        let mut set = AdapterSet::new();
        set.register(FailOnOdd).unwrap();
        let report = set.run(&mut tree);
        assert_eq!(report, AdapterReport { applied: 2, failed: 2 });

        let seen = tree
            .elements_by_tag(tree.document(), "p")
            .into_iter()
            .filter(|&p| tree.has_attr(p, "data-seen"))
            .count();
        assert_eq!(seen, 2);
    }

    struct BadSelector;

    impl BlockAdapter for BadSelector {
        fn name(&self) -> &str {
            "bad"
        }

        fn selector(&self) -> &str {
            "p[["
        }

        fn apply(&self, _tree: &mut Tree, _node: NodeId) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_invalid_selector_rejected_at_registration() {
        let mut set = AdapterSet::new();
        let err = set.register(BadSelector).unwrap_err();
        assert!(matches!(err, Error::Selector(ref msg) if msg.starts_with("bad:")));
        assert!(set.is_empty());
    }
}
