//! # footcite
//!
//! Post-processing for rendered HTML notes: footnotes and citations that an
//! exporter wrote into one mixed list are split apart and relinked, and an
//! optional "Additional Resources" panel is built from the note's hashtags.
//!
//! ## Quick Start
//!
//! ```no_run
//! use footcite::{Activation, Config, Document, Pipeline};
//!
//! # async fn run() -> footcite::Result<()> {
//! let html = std::fs::read("note.html")?;
//! let mut doc = Document::from_bytes(&html);
//!
//! let pipeline = Pipeline::new(Config::load("footcite.toml")?);
//! let report = pipeline.run(&mut doc, Activation::HostEvent).await;
//! println!("{} notes, {} references", report.appendix.notes, report.appendix.references);
//!
//! std::fs::write("note.out.html", doc.to_html())?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Running single passes
//!
//! The reference passes work on the tree directly and are synchronous:
//!
//! ```
//! use footcite::Document;
//! use footcite::notes::{AppendixOptions, build_appendix, rewrite_hrefs};
//!
//! let mut doc = Document::parse(r##"
//!     <a class="citation" href="#fn:1">1</a>
//!     <div class="footnotes"><ol><li id="fn:1" class="citation">Source</li></ol></div>
//! "##);
//! rewrite_hrefs(&mut doc.tree);
//! let report = build_appendix(&mut doc.tree, &AppendixOptions::default());
//! assert_eq!(report.references, 1);
//! assert!(doc.tree.get_by_id("fn:1citation").is_some());
//! ```

pub mod blocks;
pub mod config;
pub mod document;
pub mod dom;
pub mod error;
pub mod notes;
pub mod pipeline;
pub mod popover;
pub mod resources;
pub(crate) mod util;

pub use blocks::{AdapterSet, BlockAdapter, MermaidNoHighlight};
pub use config::Config;
pub use document::{Activation, Document};
pub use error::{Error, Result};
pub use pipeline::{Pipeline, Report};
pub use popover::{NoPopovers, PopoverRenderer, StaticPopovers};
