use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use url::Url;

use sitecrawl_core::{Classifier, CrawlError, ExtractedLink, LinkKeywords, Renderer, Settings};
use sitecrawl_engine::CrawlEngine;
use sitecrawl_normalize::RobotsGate;
use sitecrawl_storage::Storage;

struct FakeRenderer {
    pages: HashMap<String, String>,
}

#[async_trait]
impl Renderer for FakeRenderer {
    async fn render(&self, url: &Url) -> Result<String, CrawlError> {
        self.pages
            .get(url.as_str())
            .cloned()
            .ok_or_else(|| CrawlError::Render(format!("no fixture for {url}")))
    }
}

struct AlwaysDeniedRenderer;

#[async_trait]
impl Renderer for AlwaysDeniedRenderer {
    async fn render(&self, _url: &Url) -> Result<String, CrawlError> {
        Err(CrawlError::Render("access denied by every profile".to_string()))
    }
}

struct FakeClassifier;

#[async_trait]
impl Classifier for FakeClassifier {
    async fn classify(&self, links: &[ExtractedLink]) -> Result<Vec<LinkKeywords>, CrawlError> {
        Ok(links
            .iter()
            .map(|l| LinkKeywords {
                url: l.url.clone(),
                text: l.text.clone(),
                keywords: HashMap::from([("finance".to_string(), 1.0), ("budget".to_string(), 1.0)]),
            })
            .collect())
    }
}

async fn storage() -> Storage {
    let storage = Storage::connect(":memory:").await.unwrap();
    storage.run_migrations().await.unwrap();
    storage
}

fn settings() -> Settings {
    Settings {
        workers: 2,
        ..Settings::default()
    }
}

#[tokio::test]
async fn empty_site_yields_one_page_row_and_no_links() {
    let site_base = Url::parse("https://example.gov").unwrap();
    let renderer = FakeRenderer {
        pages: HashMap::from([("https://example.gov/".to_string(), "<html></html>".to_string())]),
    };
    let storage = storage().await;

    let engine = CrawlEngine::new(
        Arc::new(renderer),
        Arc::new(FakeClassifier),
        storage.clone(),
        RobotsGate::allow_all(),
        site_base.clone(),
        settings(),
    );
    engine.run().await.unwrap();

    let mut tx = storage.begin().await.unwrap();
    let site = sitecrawl_storage::upsert_site(&mut tx, site_base.as_str(), Utc::now()).await.unwrap();
    let pages = sitecrawl_storage::list_pages_for_site(&mut tx, site.id).await.unwrap();
    sitecrawl_storage::commit(tx).await.unwrap();

    assert_eq!(pages.len(), 1);
    assert!(!pages[0].is_unprocessed());
}

#[tokio::test]
async fn unchanged_page_across_two_runs_keeps_single_page_row_and_links() {
    let site_base = Url::parse("https://example.gov").unwrap();
    let html = r#"<a href="/budget">Budget</a>"#.to_string();

    let storage = storage().await;

    let renderer = FakeRenderer {
        pages: HashMap::from([
            ("https://example.gov/".to_string(), html.clone()),
            ("https://example.gov/budget".to_string(), "<html></html>".to_string()),
        ]),
    };
    let engine = CrawlEngine::new(
        Arc::new(renderer),
        Arc::new(FakeClassifier),
        storage.clone(),
        RobotsGate::allow_all(),
        site_base.clone(),
        settings(),
    );
    engine.run().await.unwrap();

    let between_runs = Utc::now();

    let renderer = FakeRenderer {
        pages: HashMap::from([
            ("https://example.gov/".to_string(), html.clone()),
            ("https://example.gov/budget".to_string(), "<html></html>".to_string()),
        ]),
    };
    let engine = CrawlEngine::new(
        Arc::new(renderer),
        Arc::new(FakeClassifier),
        storage.clone(),
        RobotsGate::allow_all(),
        site_base.clone(),
        settings(),
    );
    engine.run().await.unwrap();

    let mut tx = storage.begin().await.unwrap();
    let site = sitecrawl_storage::upsert_site(&mut tx, site_base.as_str(), Utc::now()).await.unwrap();
    let pages = sitecrawl_storage::list_pages_for_site(&mut tx, site.id).await.unwrap();
    let links = sitecrawl_storage::list_links_for_site(&mut tx, site.id).await.unwrap();
    sitecrawl_storage::commit(tx).await.unwrap();

    assert_eq!(pages.len(), 2);
    assert!(pages.iter().all(|p| !p.is_unprocessed()));

    // The budget link survived both runs as a single row (no duplicate
    // insert on the second, unchanged-page pass) and its crawl_time was
    // refreshed in the second run even though the page itself was cached.
    assert_eq!(links.len(), 1);
    assert!(
        links[0].crawl_time >= between_runs,
        "link crawl_time was not refreshed on the unchanged-page pass"
    );

    // A stale reap with a cutoff between the two runs must not remove the
    // link: if crawl_time had stayed frozen at the first run's classify
    // time, this would incorrectly delete it (§8 "Unchanged page").
    let mut tx = storage.begin().await.unwrap();
    let removed = sitecrawl_storage::delete_stale_links(&mut tx, site.id, between_runs).await.unwrap();
    let links_after_reap = sitecrawl_storage::list_links_for_site(&mut tx, site.id).await.unwrap();
    sitecrawl_storage::commit(tx).await.unwrap();

    assert_eq!(removed, 0);
    assert_eq!(links_after_reap.len(), 1);
}

#[tokio::test]
async fn render_error_persists_error_row_with_backdated_crawl_time() {
    let site_base = Url::parse("https://example.gov").unwrap();
    let storage = storage().await;

    let engine = CrawlEngine::new(
        Arc::new(AlwaysDeniedRenderer),
        Arc::new(FakeClassifier),
        storage.clone(),
        RobotsGate::allow_all(),
        site_base.clone(),
        settings(),
    );
    engine.run().await.unwrap();

    let mut tx = storage.begin().await.unwrap();
    let site = sitecrawl_storage::upsert_site(&mut tx, site_base.as_str(), Utc::now()).await.unwrap();
    let pages = sitecrawl_storage::list_pages_for_site(&mut tx, site.id).await.unwrap();
    sitecrawl_storage::commit(tx).await.unwrap();

    assert_eq!(pages.len(), 1);
    assert!(pages[0].is_unprocessed());
    assert!(pages[0].error.is_some());
}

#[tokio::test]
async fn depth_cap_stops_enqueue_past_max_depth() {
    let site_base = Url::parse("https://example.gov").unwrap();
    let renderer = FakeRenderer {
        pages: HashMap::from([
            ("https://example.gov/".to_string(), r#"<a href="/d1">D1</a>"#.to_string()),
            ("https://example.gov/d1".to_string(), r#"<a href="/d2">D2</a>"#.to_string()),
            ("https://example.gov/d2".to_string(), r#"<a href="/d3">D3</a>"#.to_string()),
        ]),
    };
    let storage = storage().await;

    let mut s = settings();
    s.max_depth = 1;

    let engine = CrawlEngine::new(
        Arc::new(renderer),
        Arc::new(FakeClassifier),
        storage.clone(),
        RobotsGate::allow_all(),
        site_base.clone(),
        s,
    );
    engine.run().await.unwrap();

    let mut tx = storage.begin().await.unwrap();
    let site = sitecrawl_storage::upsert_site(&mut tx, site_base.as_str(), Utc::now()).await.unwrap();
    let pages = sitecrawl_storage::list_pages_for_site(&mut tx, site.id).await.unwrap();
    sitecrawl_storage::commit(tx).await.unwrap();

    let urls: Vec<&str> = pages.iter().map(|p| p.url.as_str()).collect();
    assert!(urls.contains(&"https://example.gov/"));
    assert!(urls.contains(&"https://example.gov/d1"));
    assert!(!urls.contains(&"https://example.gov/d2"));
}
