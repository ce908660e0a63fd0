mod html;
mod json_blob;

use scraper::Html;
use url::Url;

use sitecrawl_core::ExtractedLink;
use sitecrawl_normalize::normalize;

pub use html::{extract_anchors, extract_json_settings};

/// Parses a rendered page and extracts every candidate outbound link (§4.3):
/// anchor `href`s plus whatever the embedded JSON settings blob yields.
/// Relative references resolve against `site_base`, not the page's own URL,
/// per the component's stated inputs. `#`-prefixed hrefs and non-http(s)
/// schemes are dropped during normalization; duplicates are left in place —
/// deduplication is the caller's responsibility via the visited set and the
/// page hash.
pub fn extract_links(site_base: &Url, html: &str, max_params: Option<usize>) -> Vec<ExtractedLink> {
    let document = Html::parse_document(html);

    let mut candidates = extract_anchors(&document);
    candidates.extend(extract_json_settings(&document));

    candidates
        .into_iter()
        .filter(|(href, _)| !href.starts_with('#'))
        .filter_map(|(href, text)| {
            normalize(&href, site_base, max_params)
                .ok()
                .map(|url| ExtractedLink {
                    url: url.to_string(),
                    text,
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://example.gov").unwrap()
    }

    #[test]
    fn extracts_and_normalizes_anchor_links() {
        let html = r#"<a href="/budget">Budget</a> <a href="https://other.example/x">Other</a>"#;
        let links = extract_links(&base(), html, None);
        assert_eq!(links.len(), 2);
        assert!(links.iter().any(|l| l.url == "https://example.gov/budget"));
        assert!(links.iter().any(|l| l.url == "https://other.example/x"));
    }

    #[test]
    fn drops_fragment_only_hrefs() {
        let html = r#"<a href="#top">Top</a>"#;
        assert!(extract_links(&base(), html, None).is_empty());
    }

    #[test]
    fn drops_non_http_schemes() {
        let html = r#"<a href="mailto:clerk@example.gov">Email</a>"#;
        assert!(extract_links(&base(), html, None).is_empty());
    }

    #[test]
    fn resolves_json_settings_links_against_site_base_not_page() {
        let html = r#"<script type="application/json" data-drupal-selector="drupal-settings-json">
            {"nav": {"url": "/minutes", "title": "Minutes"}}
        </script>"#;
        let page_base = Url::parse("https://example.gov/deep/nested/page").unwrap();
        let links = extract_links(&page_base, html, None);
        assert!(links.iter().any(|l| l.url == "https://example.gov/minutes"));
    }

    #[test]
    fn preserves_duplicates() {
        let html = r#"<a href="/a">One</a> <a href="/a">One again</a>"#;
        let links = extract_links(&base(), html, None);
        assert_eq!(links.len(), 2);
    }

    #[test]
    fn applies_max_params_policy() {
        let html = r#"<a href="/search?q=1&p=2">Search</a>"#;
        let links = extract_links(&base(), html, Some(0));
        assert_eq!(links[0].url, "https://example.gov/search");
    }
}
