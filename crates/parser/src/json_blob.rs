use serde_json::{Map, Value};

const LABEL_FIELDS: [&str; 4] = ["label", "title", "name", "text"];

/// True if `s` looks like a link: absolute http(s) URL or a root-relative path.
fn is_link_candidate(s: &str) -> bool {
    s.starts_with("http://") || s.starts_with("https://") || s.starts_with('/')
}

/// Label for a link-valued field found in `obj`: an exact match on one of
/// `label`/`title`/`name`/`text` first, else the first sibling string key
/// containing one of those words (excluding any key containing "alttext").
fn find_label(obj: &Map<String, Value>) -> String {
    for exact in LABEL_FIELDS {
        if let Some(Value::String(s)) = obj.get(exact) {
            return s.clone();
        }
    }
    for (key, value) in obj {
        let lower = key.to_lowercase();
        if lower.contains("alttext") {
            continue;
        }
        if LABEL_FIELDS.iter().any(|word| lower.contains(word)) {
            if let Value::String(s) = value {
                return s.clone();
            }
        }
    }
    String::new()
}

/// Recursively walks a parsed JSON settings blob, collecting `(url, label)`
/// pairs for every string value that looks like a link (§4.3).
pub fn walk(value: &Value, out: &mut Vec<(String, String)>) {
    match value {
        Value::Object(obj) => {
            for value in obj.values() {
                if let Value::String(s) = value {
                    if is_link_candidate(s) {
                        out.push((s.clone(), find_label(obj)));
                    }
                }
            }
            for value in obj.values() {
                walk(value, out);
            }
        }
        Value::Array(items) => {
            for item in items {
                walk(item, out);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn exact_label_field_wins() {
        let blob = json!({
            "link": { "url": "/contact", "label": "Contact Us" }
        });
        let mut out = Vec::new();
        walk(&blob, &mut out);
        assert!(out.contains(&("/contact".to_string(), "Contact Us".to_string())));
    }

    #[test]
    fn fallback_label_excludes_alttext() {
        let blob = json!({
            "item": { "href": "/budget", "imageAltText": "ignored", "linkTitleField": "Budget Report" }
        });
        let mut out = Vec::new();
        walk(&blob, &mut out);
        assert!(out.contains(&("/budget".to_string(), "Budget Report".to_string())));
    }

    #[test]
    fn missing_label_yields_empty_text() {
        let blob = json!({ "item": { "href": "/minutes" } });
        let mut out = Vec::new();
        walk(&blob, &mut out);
        assert!(out.contains(&("/minutes".to_string(), String::new())));
    }

    #[test]
    fn non_link_strings_are_ignored() {
        let blob = json!({ "item": { "color": "blue", "label": "Ignore" } });
        let mut out = Vec::new();
        walk(&blob, &mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn recurses_into_nested_arrays() {
        let blob = json!({ "items": [ { "url": "/a", "title": "A" }, { "url": "https://x.com/b", "name": "B" } ] });
        let mut out = Vec::new();
        walk(&blob, &mut out);
        assert_eq!(out.len(), 2);
    }
}
