use chrono::{DateTime, Utc};
use sitecrawl_core::{CrawlError, Link};

use crate::Tx;

/// Insert-or-update a scored outbound link (§4.6). Conflict on
/// `(site_id, page_id, url)` refreshes the score, keyword string, and
/// crawl time.
#[allow(clippy::too_many_arguments)]
pub async fn upsert_link(
    tx: &mut Tx,
    site_id: i64,
    page_id: i64,
    url: &str,
    text: &str,
    score: f64,
    keywords: &str,
    crawl_time: DateTime<Utc>,
) -> Result<Link, CrawlError> {
    let row: (i64,) = sqlx::query_as(
        r#"INSERT INTO link (site_id, page_id, url, text, score, keywords, crawl_time)
           VALUES (?, ?, ?, ?, ?, ?, ?)
           ON CONFLICT(site_id, page_id, url) DO UPDATE SET
               score = excluded.score,
               keywords = excluded.keywords,
               crawl_time = excluded.crawl_time
           RETURNING id"#,
    )
    .bind(site_id)
    .bind(page_id)
    .bind(url)
    .bind(text)
    .bind(score)
    .bind(keywords)
    .bind(crawl_time)
    .fetch_one(&mut **tx)
    .await
    .map_err(|e| CrawlError::Storage(e.to_string()))?;

    Ok(Link {
        id: row.0,
        site_id,
        page_id,
        url: url.to_string(),
        text: text.to_string(),
        score,
        keywords: keywords.to_string(),
        crawl_time,
    })
}

/// Deletes every link belonging to `site_id` whose `crawl_time` is
/// strictly before `before_time`.
pub async fn delete_stale_links(tx: &mut Tx, site_id: i64, before_time: DateTime<Utc>) -> Result<u64, CrawlError> {
    let result = sqlx::query("DELETE FROM link WHERE site_id = ? AND crawl_time < ?")
        .bind(site_id)
        .bind(before_time)
        .execute(&mut **tx)
        .await
        .map_err(|e| CrawlError::Storage(e.to_string()))?;
    Ok(result.rows_affected())
}

/// Refreshes `crawl_time` on every existing link row belonging to `page_id`,
/// without touching `score`/`keywords`. Used when a page is found unchanged
/// so its links are not re-classified but still survive the stale reap
/// (§4.7, §8 "Unchanged page").
pub async fn touch_links_for_page(
    tx: &mut Tx,
    site_id: i64,
    page_id: i64,
    crawl_time: DateTime<Utc>,
) -> Result<(), CrawlError> {
    sqlx::query("UPDATE link SET crawl_time = ? WHERE site_id = ? AND page_id = ?")
        .bind(crawl_time)
        .bind(site_id)
        .bind(page_id)
        .execute(&mut **tx)
        .await
        .map_err(|e| CrawlError::Storage(e.to_string()))?;
    Ok(())
}

/// Returns every link row for `site_id`, used by tests and any future
/// reporting pass that needs to inspect persisted links directly.
pub async fn list_links_for_site(tx: &mut Tx, site_id: i64) -> Result<Vec<Link>, CrawlError> {
    sqlx::query_as::<_, (i64, i64, i64, String, String, f64, String, DateTime<Utc>)>(
        "SELECT id, site_id, page_id, url, text, score, keywords, crawl_time FROM link WHERE site_id = ?",
    )
    .bind(site_id)
    .fetch_all(&mut **tx)
    .await
    .map_err(|e| CrawlError::Storage(e.to_string()))
    .map(|rows| {
        rows.into_iter()
            .map(|(id, site_id, page_id, url, text, score, keywords, crawl_time)| Link {
                id,
                site_id,
                page_id,
                url,
                text,
                score,
                keywords,
                crawl_time,
            })
            .collect()
    })
}
