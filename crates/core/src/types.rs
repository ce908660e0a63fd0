use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use url::Url;

use crate::error::CrawlError;

/// A domain-scoped crawl root. Uniqueness on `url` (the canonical
/// `scheme://host` base, no path).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Site {
    pub id: i64,
    pub url: String,
    pub crawl_time: DateTime<Utc>,
}

/// Empty-hash sentinel meaning "not yet successfully processed".
pub const EMPTY_HASH: &str = "";

/// One URL within a site. Uniqueness on `(site_id, url)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page {
    pub id: i64,
    pub site_id: i64,
    pub url: String,
    pub hash: String,
    pub crawl_time: DateTime<Utc>,
    pub error: Option<String>,
}

impl Page {
    pub fn is_unprocessed(&self) -> bool {
        self.hash == EMPTY_HASH
    }
}

/// A scored outbound link from one page. Uniqueness on `(site_id, page_id, url)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Link {
    pub id: i64,
    pub site_id: i64,
    pub page_id: i64,
    pub url: String,
    pub text: String,
    pub score: f64,
    pub keywords: String,
    pub crawl_time: DateTime<Utc>,
}

/// A candidate link mined from a page's anchors or embedded JSON settings,
/// prior to the robots/domain/depth admission check.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ExtractedLink {
    pub url: String,
    pub text: String,
}

/// A link with the classifier's raw per-keyword scores attached.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkKeywords {
    pub url: String,
    pub text: String,
    pub keywords: HashMap<String, f64>,
}

/// One frontier entry: a URL paired with its BFS depth from the seed.
#[derive(Debug, Clone)]
pub struct CrawlTask {
    pub url: String,
    pub depth: u32,
}

/// Opaque interface over a headless browser that returns a page's final,
/// JavaScript-rendered HTML for a URL (see component design §4.2).
#[async_trait]
pub trait Renderer: Send + Sync {
    async fn render(&self, url: &Url) -> Result<String, CrawlError>;
}

/// Classifies a batch of links against the fixed keyword vocabulary
/// (see component design §4.4). One call classifies every link extracted
/// from a single page.
#[async_trait]
pub trait Classifier: Send + Sync {
    async fn classify(&self, links: &[ExtractedLink]) -> Result<Vec<LinkKeywords>, CrawlError>;
}
