use scraper::{Html, Selector};
use serde_json::Value;

use super::json_blob;

const SETTINGS_SELECTOR: &str = r#"script[data-drupal-selector="drupal-settings-json"]"#;

/// Raw `(href, text)` pairs mined from anchor tags with a non-empty `href`.
/// Text is the anchor's visible inner text with internal whitespace collapsed.
pub fn extract_anchors(document: &Html) -> Vec<(String, String)> {
    let Ok(selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    document
        .select(&selector)
        .filter_map(|el| {
            let href = el.value().attr("href")?.trim();
            if href.is_empty() {
                return None;
            }
            let text = el
                .text()
                .collect::<Vec<_>>()
                .join(" ")
                .split_whitespace()
                .collect::<Vec<_>>()
                .join(" ");
            Some((href.to_string(), text))
        })
        .collect()
}

/// Raw `(url, label)` pairs mined from the embedded JSON settings blob, if
/// the page carries one (§4.3.2).
pub fn extract_json_settings(document: &Html) -> Vec<(String, String)> {
    let Ok(selector) = Selector::parse(SETTINGS_SELECTOR) else {
        return Vec::new();
    };

    let Some(script) = document.select(&selector).next() else {
        return Vec::new();
    };

    let text: String = script.text().collect();
    let Ok(value) = serde_json::from_str::<Value>(&text) else {
        return Vec::new();
    };

    let mut out = Vec::new();
    json_blob::walk(&value, &mut out);
    out
}
