use chrono::{DateTime, Duration, Utc};
use sitecrawl_core::{CrawlError, Page};

use crate::Tx;

/// Insert-or-update a page row (§4.6). Called first with an empty hash to
/// obtain an id so the page's outbound links can be inserted against it;
/// `update_page_hash` finalizes once the page has actually been processed.
pub async fn upsert_page(
    tx: &mut Tx,
    site_id: i64,
    url: &str,
    hash: &str,
    crawl_time: DateTime<Utc>,
) -> Result<Page, CrawlError> {
    let row: (i64,) = sqlx::query_as(
        r#"INSERT INTO page (site_id, url, hash, crawl_time, error) VALUES (?, ?, ?, ?, NULL)
           ON CONFLICT(site_id, url) DO UPDATE SET
               hash = excluded.hash,
               crawl_time = excluded.crawl_time,
               error = NULL
           RETURNING id"#,
    )
    .bind(site_id)
    .bind(url)
    .bind(hash)
    .bind(crawl_time)
    .fetch_one(&mut **tx)
    .await
    .map_err(|e| CrawlError::Storage(e.to_string()))?;

    Ok(Page {
        id: row.0,
        site_id,
        url: url.to_string(),
        hash: hash.to_string(),
        crawl_time,
        error: None,
    })
}

/// Finalizes a page's content hash once rendering and extraction succeeded.
pub async fn update_page_hash(tx: &mut Tx, page_id: i64, hash: &str) -> Result<(), CrawlError> {
    sqlx::query("UPDATE page SET hash = ? WHERE id = ?")
        .bind(hash)
        .bind(page_id)
        .execute(&mut **tx)
        .await
        .map_err(|e| CrawlError::Storage(e.to_string()))?;
    Ok(())
}

/// Records a processing error and backdates the page's `crawl_time` by one
/// second, so it falls below the stale threshold and is retried next run
/// (§4.6, §7).
pub async fn update_page_error(tx: &mut Tx, page_id: i64, error: &str) -> Result<(), CrawlError> {
    let row: (DateTime<Utc>,) = sqlx::query_as("SELECT crawl_time FROM page WHERE id = ?")
        .bind(page_id)
        .fetch_one(&mut **tx)
        .await
        .map_err(|e| CrawlError::Storage(e.to_string()))?;

    let backdated = row.0 - Duration::seconds(1);

    sqlx::query("UPDATE page SET error = ?, crawl_time = ? WHERE id = ?")
        .bind(error)
        .bind(backdated)
        .bind(page_id)
        .execute(&mut **tx)
        .await
        .map_err(|e| CrawlError::Storage(e.to_string()))?;
    Ok(())
}

/// Returns every page row for `site_id`, used to prime the page cache at
/// run start.
pub async fn list_pages_for_site(tx: &mut Tx, site_id: i64) -> Result<Vec<Page>, CrawlError> {
    sqlx::query_as::<_, (i64, i64, String, String, DateTime<Utc>, Option<String>)>(
        "SELECT id, site_id, url, hash, crawl_time, error FROM page WHERE site_id = ?",
    )
    .bind(site_id)
    .fetch_all(&mut **tx)
    .await
    .map_err(|e| CrawlError::Storage(e.to_string()))
    .map(|rows| {
        rows.into_iter()
            .map(|(id, site_id, url, hash, crawl_time, error)| Page {
                id,
                site_id,
                url,
                hash,
                crawl_time,
                error,
            })
            .collect()
    })
}

/// Deletes every page belonging to `site_id` whose `crawl_time` is strictly
/// before `before_time`, returning the number of rows removed.
pub async fn delete_stale_pages(tx: &mut Tx, site_id: i64, before_time: DateTime<Utc>) -> Result<u64, CrawlError> {
    let result = sqlx::query("DELETE FROM page WHERE site_id = ? AND crawl_time < ?")
        .bind(site_id)
        .bind(before_time)
        .execute(&mut **tx)
        .await
        .map_err(|e| CrawlError::Storage(e.to_string()))?;
    Ok(result.rows_affected())
}
