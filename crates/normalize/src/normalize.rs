use sitecrawl_core::CrawlError;
use url::Url;

/// Canonicalizes a candidate URL against a base (§4.1):
/// - resolves relative references against `base`
/// - rejects any scheme other than http/https
/// - strips the fragment unconditionally
/// - strips the query string, except that `max_params` (if set) leading
///   parameters are preserved; `None` means keep all, `Some(0)` strips entirely.
pub fn normalize(candidate: &str, base: &Url, max_params: Option<usize>) -> Result<Url, CrawlError> {
    let mut url = base
        .join(candidate)
        .map_err(|e| CrawlError::InvalidUrl(format!("{candidate}: {e}")))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(CrawlError::InvalidUrl(format!(
            "unsupported scheme: {}",
            url.scheme()
        )));
    }

    url.set_fragment(None);
    apply_query_policy(&mut url, max_params);

    Ok(url)
}

/// Re-applies the query-parameter retention policy to an already-parsed URL.
/// Idempotent: calling this twice on the same policy yields the same result
/// (§8 invariant 7, `normalize(normalize(u)) == normalize(u)`).
fn apply_query_policy(url: &mut Url, max_params: Option<usize>) {
    let Some(n) = max_params else { return };

    if n == 0 {
        url.set_query(None);
        return;
    }

    let kept: Vec<(String, String)> = url
        .query_pairs()
        .take(n)
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    if kept.is_empty() {
        url.set_query(None);
    } else {
        let mut pairs = url.query_pairs_mut();
        pairs.clear();
        for (k, v) in &kept {
            pairs.append_pair(k, v);
        }
        drop(pairs);
    }
}

/// The path's slash-delimited segment count, with leading/trailing slashes
/// stripped before splitting (§4.1(c)).
pub fn path_component_count(url: &Url) -> usize {
    let path = url.path().trim_matches('/');
    if path.is_empty() {
        0
    } else {
        path.split('/').count()
    }
}
