mod frontier;

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use sha3::{Digest, Sha3_256};
use tracing::{error, info, warn};
use url::Url;

use sitecrawl_classifier::rank_all;
use sitecrawl_core::{is_skip_document_path, Classifier, CrawlError, CrawlTask, Page, Renderer, Settings};
use sitecrawl_normalize::{admits, RobotsGate};
use sitecrawl_storage::Storage;

pub use frontier::Frontier;

/// Bundles everything a crawl run needs: the two injected adapters, the
/// store, the seed site's base URL/host, and the run-wide settings (§4.7).
pub struct CrawlEngine {
    renderer: Arc<dyn Renderer>,
    classifier: Arc<dyn Classifier>,
    storage: Storage,
    robots: Arc<RobotsGate>,
    site_base: Url,
    settings: Settings,
}

impl CrawlEngine {
    pub fn new(
        renderer: Arc<dyn Renderer>,
        classifier: Arc<dyn Classifier>,
        storage: Storage,
        robots: RobotsGate,
        site_base: Url,
        settings: Settings,
    ) -> Self {
        Self {
            renderer,
            classifier,
            storage,
            robots: Arc::new(robots),
            site_base,
            settings,
        }
    }

    /// Runs one full crawl of the seed site to completion: primes the page
    /// cache, seeds the frontier, runs `settings.workers` worker loops to
    /// quiescence, then reaps stale rows (§4.7).
    pub async fn run(&self) -> Result<(), CrawlError> {
        let run_start = Utc::now();
        let site_host = self
            .site_base
            .host_str()
            .ok_or_else(|| CrawlError::InvalidUrl(self.site_base.to_string()))?
            .to_string();

        let mut tx = self.storage.begin().await?;
        let site = sitecrawl_storage::upsert_site(&mut tx, self.site_base.as_str(), run_start).await?;
        let site_id = site.id;
        let prior_pages = sitecrawl_storage::list_pages_for_site(&mut tx, site_id).await?;
        sitecrawl_storage::commit(tx).await?;

        let page_cache: HashMap<String, Page> =
            prior_pages.into_iter().map(|p| (p.url.clone(), p)).collect();
        let page_cache = Arc::new(page_cache);

        let frontier = Arc::new(Frontier::new());
        frontier
            .enqueue(
                CrawlTask {
                    url: self.site_base.to_string(),
                    depth: 0,
                },
                self.settings.max_count,
            )
            .await;

        let mut handles = Vec::with_capacity(self.settings.workers);
        for worker_id in 0..self.settings.workers {
            let frontier = frontier.clone();
            let renderer = self.renderer.clone();
            let classifier = self.classifier.clone();
            let storage = self.storage.clone();
            let page_cache = page_cache.clone();
            let site_host = site_host.clone();
            let settings = self.settings.clone();
            let robots = self.robots.clone();

            handles.push(tokio::spawn(async move {
                worker_loop(
                    worker_id,
                    frontier,
                    renderer,
                    classifier,
                    storage,
                    site_id,
                    site_host,
                    page_cache,
                    settings,
                    robots,
                    run_start,
                )
                .await;
            }));
        }

        for handle in handles {
            if let Err(e) = handle.await {
                error!(error = %e, "worker task panicked");
            }
        }

        let cutoff = run_start - Duration::hours(self.settings.stale_hours);
        let mut tx = self.storage.begin().await?;
        let stale_links = sitecrawl_storage::delete_stale_links(&mut tx, site_id, cutoff).await?;
        let stale_pages = sitecrawl_storage::delete_stale_pages(&mut tx, site_id, cutoff).await?;
        sitecrawl_storage::commit(tx).await?;
        info!(stale_pages, stale_links, "reaped stale rows");

        Ok(())
    }
}

#[allow(clippy::too_many_arguments)]
async fn worker_loop(
    worker_id: usize,
    frontier: Arc<Frontier>,
    renderer: Arc<dyn Renderer>,
    classifier: Arc<dyn Classifier>,
    storage: Storage,
    site_id: i64,
    site_host: String,
    page_cache: Arc<HashMap<String, Page>>,
    settings: Settings,
    robots: Arc<RobotsGate>,
    run_start: DateTime<Utc>,
) {
    while let Some(task) = frontier.dequeue_or_wait().await {
        if let Err(e) = process_one(
            &task,
            &renderer,
            &classifier,
            &storage,
            site_id,
            &site_host,
            &page_cache,
            &settings,
            &robots,
            &frontier,
            run_start,
        )
        .await
        {
            warn!(worker_id, url = %task.url, error = %e, "failed processing url");
        }
        frontier.finish().await;
    }
    info!(worker_id, "worker exiting, frontier quiescent");
}

#[allow(clippy::too_many_arguments)]
async fn process_one(
    task: &CrawlTask,
    renderer: &Arc<dyn Renderer>,
    classifier: &Arc<dyn Classifier>,
    storage: &Storage,
    site_id: i64,
    site_host: &str,
    page_cache: &HashMap<String, Page>,
    settings: &Settings,
    robots: &RobotsGate,
    frontier: &Arc<Frontier>,
    run_start: DateTime<Utc>,
) -> Result<(), CrawlError> {
    let url = Url::parse(&task.url).map_err(|e| CrawlError::InvalidUrl(e.to_string()))?;

    if is_skip_document_path(url.path()) {
        info!(url = %task.url, "skipping document extension");
        return Ok(());
    }

    let html = match renderer.render(&url).await {
        Ok(html) => html,
        Err(e) => {
            let mut tx = storage.begin().await?;
            let page =
                sitecrawl_storage::upsert_page(&mut tx, site_id, &task.url, "", run_start).await?;
            sitecrawl_storage::update_page_error(&mut tx, page.id, &e.to_string()).await?;
            sitecrawl_storage::commit(tx).await?;
            return Err(e);
        }
    };

    let extracted = sitecrawl_parser::extract_links(&url, &html, settings.max_url_params);
    let hash = hex::encode(Sha3_256::digest(
        serde_json::to_vec(&extracted).map_err(|e| CrawlError::Parse(e.to_string()))?,
    ));

    let mut tx = storage.begin().await?;
    let page = sitecrawl_storage::upsert_page(&mut tx, site_id, &task.url, "", run_start).await?;
    sitecrawl_storage::commit(tx).await?;

    let unchanged = page_cache
        .get(&task.url)
        .map(|prior| !prior.is_unprocessed() && prior.hash == hash)
        .unwrap_or(false);

    if !unchanged {
        let link_result = process_links(&extracted, classifier, storage, site_id, page.id, run_start).await;

        let mut tx = storage.begin().await?;
        match link_result {
            Ok(()) => sitecrawl_storage::update_page_hash(&mut tx, page.id, &hash).await?,
            Err(ref e) => sitecrawl_storage::update_page_error(&mut tx, page.id, &e.to_string()).await?,
        }
        sitecrawl_storage::commit(tx).await?;
        link_result?;
    } else {
        let mut tx = storage.begin().await?;
        sitecrawl_storage::update_page_hash(&mut tx, page.id, &hash).await?;
        sitecrawl_storage::touch_links_for_page(&mut tx, site_id, page.id, run_start).await?;
        sitecrawl_storage::commit(tx).await?;
    }

    for link in &extracted {
        let candidate = match Url::parse(&link.url) {
            Ok(u) => u,
            Err(_) => continue,
        };
        if admits(
            &candidate,
            site_host,
            task.depth + 1,
            settings.max_components,
            settings.max_depth,
            robots,
        ) {
            frontier
                .enqueue(
                    CrawlTask {
                        url: link.url.clone(),
                        depth: task.depth + 1,
                    },
                    settings.max_count,
                )
                .await;
        }
    }

    Ok(())
}

async fn process_links(
    extracted: &[sitecrawl_core::ExtractedLink],
    classifier: &Arc<dyn Classifier>,
    storage: &Storage,
    site_id: i64,
    page_id: i64,
    run_start: DateTime<Utc>,
) -> Result<(), CrawlError> {
    if extracted.is_empty() {
        return Ok(());
    }

    let classified = classifier.classify(extracted).await?;
    let ranked = rank_all(&classified);

    let mut tx = storage.begin().await?;
    for link in &ranked {
        sitecrawl_storage::upsert_link(
            &mut tx,
            site_id,
            page_id,
            &link.url,
            &link.text,
            link.score,
            &link.keyword_string,
            run_start,
        )
        .await?;
    }
    sitecrawl_storage::commit(tx).await?;

    Ok(())
}
