//! Bookmark lookups against a tag-addressed JSON feed.
//!
//! The feed is queried once with every tag (best matches) and once per tag.
//! Lookups run as independent tasks; their results come back in completion
//! order and a failed lookup only loses its own results.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::config::FeedConfig;
use crate::dom::{NodeId, Tree};
use crate::error::{Error, Result};
use crate::util::encode_component;

/// One feed record.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Bookmark {
    #[serde(rename = "d")]
    pub title: String,
    #[serde(rename = "u")]
    pub url: String,
    #[serde(rename = "a")]
    pub author: String,
    #[serde(rename = "t")]
    pub tags: Vec<String>,
    #[serde(rename = "n")]
    pub note: Option<String>,
}

/// A source of bookmarks keyed by tag intersection.
#[async_trait]
pub trait BookmarkFeed: Send + Sync {
    /// Up to `count` bookmarks carrying every tag in `tags`.
    async fn lookup(&self, tags: &[String], count: u32) -> Result<Vec<Bookmark>>;
}

/// The public JSON feed of a bookmarking service.
pub struct PinboardFeed {
    agent: ureq::Agent,
    config: FeedConfig,
}

impl PinboardFeed {
    pub fn new(config: FeedConfig) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build();
        Self { agent, config }
    }

    /// `<base>/[secret:<s>/]u:<user>/t:<tag>/…/?count=<n>`
    pub fn feed_url(&self, tags: &[String], count: u32) -> String {
        let mut url = self.config.base_url.trim_end_matches('/').to_string();
        url.push('/');
        if let Some(secret) = &self.config.secret {
            url.push_str(&format!("secret:{secret}/"));
        }
        url.push_str(&format!("u:{}/", encode_component(&self.config.user)));
        for tag in tags {
            url.push_str(&format!("t:{}/", encode_component(tag)));
        }
        url.push_str(&format!("?count={count}"));
        url
    }
}

fn get_json(agent: &ureq::Agent, url: &str) -> Result<Vec<Bookmark>> {
    let response = match agent.get(url).call() {
        Ok(response) => response,
        Err(ureq::Error::Status(status, _)) => {
            return Err(Error::FeedStatus {
                status,
                url: url.to_string(),
            });
        }
        Err(e) => return Err(Box::new(e).into()),
    };
    let body = response.into_string()?;
    Ok(serde_json::from_str(&body)?)
}

#[async_trait]
impl BookmarkFeed for PinboardFeed {
    async fn lookup(&self, tags: &[String], count: u32) -> Result<Vec<Bookmark>> {
        let url = self.feed_url(tags, count);
        let agent = self.agent.clone();
        debug!(%url, "querying bookmark feed");
        tokio::task::spawn_blocking(move || get_json(&agent, &url)).await?
    }
}

/// One lookup the fan-out issues.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lookup {
    pub tags: Vec<String>,
    pub count: u32,
}

/// The combined lookup first, then one per tag.
pub fn plan_lookups(tags: &[String], combined_count: u32, per_tag_count: u32) -> Vec<Lookup> {
    if tags.is_empty() {
        return Vec::new();
    }
    let mut lookups = vec![Lookup {
        tags: tags.to_vec(),
        count: combined_count,
    }];
    lookups.extend(tags.iter().map(|tag| Lookup {
        tags: vec![tag.clone()],
        count: per_tag_count,
    }));
    lookups
}

/// Lookups in flight.
pub struct BookmarkFetch {
    tasks: JoinSet<(Lookup, Result<Vec<Bookmark>>)>,
}

/// What came back, in completion order.
#[derive(Debug, Default)]
pub struct FetchOutcome {
    pub batches: Vec<Vec<Bookmark>>,
    pub failed: usize,
}

impl BookmarkFetch {
    /// Start every lookup. Must be called inside a tokio runtime.
    pub fn spawn(feed: Arc<dyn BookmarkFeed>, lookups: Vec<Lookup>) -> Self {
        let mut tasks = JoinSet::new();
        for lookup in lookups {
            let feed = Arc::clone(&feed);
            tasks.spawn(async move {
                let result = feed.lookup(&lookup.tags, lookup.count).await;
                (lookup, result)
            });
        }
        Self { tasks }
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub async fn collect(mut self) -> FetchOutcome {
        let mut outcome = FetchOutcome::default();
        while let Some(joined) = self.tasks.join_next().await {
            match joined {
                Ok((_, Ok(bookmarks))) => outcome.batches.push(bookmarks),
                Ok((lookup, Err(e))) => {
                    warn!(tags = ?lookup.tags, error = %e, "bookmark lookup failed");
                    outcome.failed += 1;
                }
                Err(e) => {
                    warn!(error = %e, "bookmark lookup task aborted");
                    outcome.failed += 1;
                }
            }
        }
        outcome
    }
}

/// Fan out the lookups for `tags` and wait for all of them.
pub async fn fetch_bookmarks(
    feed: Arc<dyn BookmarkFeed>,
    tags: &[String],
    config: &FeedConfig,
) -> FetchOutcome {
    let lookups = plan_lookups(tags, config.combined_count, config.per_tag_count);
    BookmarkFetch::spawn(feed, lookups).collect().await
}

/// Rating tags are shown as-is, everything else as a hashtag.
fn tag_label(tag: &str) -> String {
    if tag.contains('★') {
        tag.to_string()
    } else {
        format!("#{tag}")
    }
}

/// `div.pin-item` for one bookmark, or `None` when it has no title.
pub fn render_bookmark(tree: &mut Tree, bookmark: &Bookmark, profile_base: &str) -> Option<NodeId> {
    if bookmark.title.is_empty() {
        return None;
    }

    let item = tree.create_html_element("div", &[("class", "pin-item")]);
    let paragraph = tree.create_html_element("p", &[]);
    let title = tree.create_html_element(
        "a",
        &[("class", "pin-title"), ("href", bookmark.url.as_str())],
    );
    tree.append_text(title, &bookmark.title);
    tree.append(paragraph, title);
    let br = tree.create_html_element("br", &[]);
    tree.append(paragraph, br);

    let profile_base = profile_base.trim_end_matches('/');
    for tag in &bookmark.tags {
        let href = format!(
            "{profile_base}/u:{}/t:{}",
            encode_component(&bookmark.author),
            encode_component(tag)
        );
        tree.append_text(paragraph, " ");
        let link = tree.create_html_element("a", &[("class", "pin-tag"), ("href", href.as_str())]);
        tree.append_text(link, &tag_label(tag));
        tree.append(paragraph, link);
    }

    tree.append(item, paragraph);
    Some(item)
}
