use chrono::{DateTime, Utc};
use sitecrawl_core::{CrawlError, Site};

use crate::Tx;

/// Insert-or-update the site row keyed by URL, refreshing its crawl time
/// (§4.6). Upserting rather than checking-then-inserting means a second run
/// against the same site just updates the timestamp the stale reap compares
/// against.
pub async fn upsert_site(tx: &mut Tx, url: &str, crawl_time: DateTime<Utc>) -> Result<Site, CrawlError> {
    let row: (i64,) = sqlx::query_as(
        r#"INSERT INTO site (url, crawl_time) VALUES (?, ?)
           ON CONFLICT(url) DO UPDATE SET crawl_time = excluded.crawl_time
           RETURNING id"#,
    )
    .bind(url)
    .bind(crawl_time)
    .fetch_one(&mut **tx)
    .await
    .map_err(|e| CrawlError::Storage(e.to_string()))?;

    Ok(Site {
        id: row.0,
        url: url.to_string(),
        crawl_time,
    })
}
