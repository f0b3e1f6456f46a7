//! Stage orchestration.
//!
//! ```text
//! rewrite_hrefs → build_appendix → relabel_markers     (once per document)
//!   → block adapters → local links
//!   → spawn bookmark lookups ─┐
//!   → popover wait + tagging  │
//!   → resources panel ←───────┘
//! ```

use std::sync::Arc;

use tracing::{debug, info};

use crate::blocks::{AdapterReport, AdapterSet};
use crate::config::Config;
use crate::document::{Activation, Document};
use crate::notes::{
    AppendixOptions, AppendixReport, HrefReport, PopoverSync, build_appendix, relabel_markers,
    rewrite_hrefs, tag_popovers_when_ready,
};
use crate::popover::{PopoverRenderer, StaticPopovers};
use crate::resources::{
    BookmarkFeed, BookmarkFetch, Metadata, PANEL_ID, PinboardFeed, append_bookmarks,
    build_panel, convert_local_links, extract_metadata, extract_tags, filter_tags, plan_lookups,
};

/// What one run did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub activation: Activation,
    /// The document was already processed; reference passes did not run.
    pub already_processed: bool,
    pub hrefs: HrefReport,
    pub appendix: AppendixReport,
    pub markers: usize,
    pub adapters: AdapterReport,
    pub local_links: usize,
    pub popovers: PopoverSync,
    pub tags: Vec<String>,
    pub metadata: Metadata,
    pub panel: bool,
    pub bookmarks: usize,
    pub failed_lookups: usize,
}

pub struct Pipeline {
    config: Config,
    renderer: Arc<dyn PopoverRenderer>,
    adapters: AdapterSet,
    feed: Option<Arc<dyn BookmarkFeed>>,
}

impl Pipeline {
    /// Built-in adapters, static popovers, and the configured feed when
    /// bookmark fetching is on.
    pub fn new(config: Config) -> Self {
        let feed: Option<Arc<dyn BookmarkFeed>> = if config.resources.fetch_bookmarks {
            Some(Arc::new(PinboardFeed::new(config.resources.feed.clone())))
        } else {
            None
        };
        Self {
            config,
            renderer: Arc::new(StaticPopovers),
            adapters: AdapterSet::builtin(),
            feed,
        }
    }

    pub fn with_renderer(mut self, renderer: Arc<dyn PopoverRenderer>) -> Self {
        self.renderer = renderer;
        self
    }

    pub fn with_adapters(mut self, adapters: AdapterSet) -> Self {
        self.adapters = adapters;
        self
    }

    pub fn with_feed(mut self, feed: Arc<dyn BookmarkFeed>) -> Self {
        self.feed = Some(feed);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run every stage on `doc`.
    ///
    /// Nothing in here fails; stages that find nothing to work on do nothing.
    pub async fn run(&self, doc: &mut Document, activation: Activation) -> Report {
        info!(?activation, "processing document");

        let already_processed = doc.is_processed();
        let (hrefs, appendix, markers) = if already_processed {
            info!("document already processed, skipping reference passes");
            Default::default()
        } else {
            let hrefs = rewrite_hrefs(&mut doc.tree);
            let options = AppendixOptions {
                sort_citations: self.config.notes.sort_citations,
            };
            let appendix = build_appendix(&mut doc.tree, &options);
            let markers = relabel_markers(&mut doc.tree);
            doc.mark_processed();
            (hrefs, appendix, markers)
        };

        let adapters = self.adapters.run(&mut doc.tree);
        let local_links = convert_local_links(&mut doc.tree, &self.config.resources.open_scheme);

        let resources_cfg = &self.config.resources;
        let wants_panel = resources_cfg.enabled && doc.tree.get_by_id(PANEL_ID).is_none();
        let (tags, metadata, lookup_tags) = if wants_panel {
            let tags = extract_tags(&doc.tree);
            let metadata = extract_metadata(&mut doc.tree);
            let lookup_tags = filter_tags(&tags, resources_cfg.stoplist.as_slice());
            (tags, metadata, lookup_tags)
        } else {
            (Vec::new(), Metadata::new(), Vec::new())
        };

        // Lookups start now so they overlap the popover wait.
        let fetch = match &self.feed {
            Some(feed) if wants_panel && resources_cfg.fetch_bookmarks && !lookup_tags.is_empty() => {
                let lookups = plan_lookups(
                    &lookup_tags,
                    resources_cfg.feed.combined_count,
                    resources_cfg.feed.per_tag_count,
                );
                debug!(lookups = lookups.len(), "spawning bookmark lookups");
                Some(BookmarkFetch::spawn(Arc::clone(feed), lookups))
            }
            _ => None,
        };

        let popovers = tag_popovers_when_ready(
            &mut doc.tree,
            self.renderer.as_ref(),
            self.config.notes.popover_fallback(),
        )
        .await;

        let mut report = Report {
            activation,
            already_processed,
            hrefs,
            appendix,
            markers,
            adapters,
            local_links,
            popovers,
            tags,
            metadata,
            panel: false,
            bookmarks: 0,
            failed_lookups: 0,
        };

        if !wants_panel {
            return report;
        }
        let Some(panel) = build_panel(&mut doc.tree, &report.tags, &lookup_tags, resources_cfg)
        else {
            return report;
        };
        report.panel = true;

        if let Some(fetch) = fetch {
            let outcome = fetch.collect().await;
            report.failed_lookups = outcome.failed;
            if let Some(container) = panel.bookmarks {
                report.bookmarks = append_bookmarks(
                    &mut doc.tree,
                    container,
                    &outcome,
                    &resources_cfg.feed.profile_base,
                );
            }
        }

        info!(
            notes = report.appendix.notes,
            references = report.appendix.references,
            bookmarks = report.bookmarks,
            "document processed"
        );
        report
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(Config::default())
    }
}
