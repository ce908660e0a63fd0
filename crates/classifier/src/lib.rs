mod prompt;
mod rank;

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use sitecrawl_core::{vocab, Classifier, CrawlError, ExtractedLink, LinkKeywords};

pub use rank::{rank_all, Ranked};

const RATE_LIMIT_TRIES: u32 = 5;
const RATE_LIMIT_BASE_DELAY: Duration = Duration::from_secs(2);

/// Adapter over an LLM "responses"-style endpoint (request/response shape
/// matches the provider continuation model in §4.4: each call can carry a
/// `previous_response_id` to keep remediation rounds in the same
/// conversation). Generic over provider: point it at any endpoint speaking
/// this request/response shape.
pub struct ResponsesClassifier {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
}

#[derive(Serialize)]
struct RequestBody<'a> {
    model: &'a str,
    instructions: &'a str,
    input: &'a str,
    previous_response_id: Option<&'a str>,
}

#[derive(Deserialize)]
struct ResponseBody {
    id: String,
    output_text: String,
}

#[derive(Deserialize)]
struct RawLinkKeywords {
    url: String,
    #[serde(default)]
    text: String,
    keywords: HashMap<String, f64>,
}

const SYSTEM_INSTRUCTIONS: &str =
    "You are helping identify content that pertains to businesses that want to win public sector contracts.";

impl ResponsesClassifier {
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            model: model.into(),
        }
    }

    async fn send(&self, input: &str, previous_response_id: Option<&str>) -> Result<ResponseBody, CrawlError> {
        let mut delay = RATE_LIMIT_BASE_DELAY;

        for attempt in 1..=RATE_LIMIT_TRIES {
            let body = RequestBody {
                model: &self.model,
                instructions: SYSTEM_INSTRUCTIONS,
                input,
                previous_response_id,
            };

            let response = self
                .client
                .post(&self.endpoint)
                .bearer_auth(&self.api_key)
                .json(&body)
                .send()
                .await
                .map_err(|e| CrawlError::ClassifierTransport(e.to_string()))?;

            if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
                if attempt == RATE_LIMIT_TRIES {
                    return Err(CrawlError::ClassifierRateLimited);
                }
                warn!(attempt, "classifier rate limited, backing off");
                tokio::time::sleep(delay).await;
                delay *= 2;
                continue;
            }

            if !response.status().is_success() {
                return Err(CrawlError::ClassifierTransport(format!(
                    "status {}",
                    response.status()
                )));
            }

            return response
                .json::<ResponseBody>()
                .await
                .map_err(|e| CrawlError::ClassifierTransport(e.to_string()));
        }

        Err(CrawlError::ClassifierRateLimited)
    }
}

/// Parses a response's `output_text` into link/keyword records (§4.4 steps
/// 1-2): parses as JSON, wraps a bare object in a singleton list, and
/// discards items that don't coerce to the required shape.
fn parse_response(text: &str) -> Result<Vec<RawLinkKeywords>, String> {
    let value: Value = serde_json::from_str(text).map_err(|e| e.to_string())?;

    let items: Vec<Value> = match value {
        Value::Array(items) => items,
        obj @ Value::Object(_) => vec![obj],
        _ => return Err("response was neither a list nor an object".to_string()),
    };

    Ok(items
        .into_iter()
        .filter_map(|item| serde_json::from_value::<RawLinkKeywords>(item).ok())
        .collect())
}

/// Keywords present in `items` that are outside the fixed vocabulary (§4.4
/// step 3).
fn out_of_vocabulary(items: &[RawLinkKeywords]) -> Vec<String> {
    let mut offending: Vec<String> = items
        .iter()
        .flat_map(|item| item.keywords.keys())
        .filter(|kw| !vocab::is_known(kw))
        .cloned()
        .collect();
    offending.sort();
    offending.dedup();
    offending
}

#[async_trait]
impl Classifier for ResponsesClassifier {
    async fn classify(&self, links: &[ExtractedLink]) -> Result<Vec<LinkKeywords>, CrawlError> {
        if links.is_empty() {
            return Ok(Vec::new());
        }

        let initial = prompt::initial(links);
        let first = self.send(&initial, None).await?;

        let mut items = match parse_response(&first.output_text) {
            Ok(items) => items,
            Err(parse_err) => {
                warn!(error = %parse_err, "classifier response malformed, retrying");
                let retry = self
                    .send(&prompt::retry_malformed(), Some(&first.id))
                    .await?;
                parse_response(&retry.output_text).map_err(|e| {
                    CrawlError::ClassifierResponse(format!("malformed after retry: {e}"))
                })?
            }
        };

        let offending = out_of_vocabulary(&items);
        if !offending.is_empty() {
            warn!(keywords = ?offending, "classifier used out-of-vocabulary keywords, retrying");
            let retry = self
                .send(&prompt::retry_out_of_vocabulary(&offending), Some(&first.id))
                .await?;
            match parse_response(&retry.output_text) {
                Ok(remediated) => items = remediated,
                Err(e) => {
                    warn!(error = %e, "out-of-vocabulary remediation response malformed, keeping prior items");
                }
            }
        }

        Ok(items
            .into_iter()
            .map(|item| LinkKeywords {
                url: item.url,
                text: item.text,
                keywords: item.keywords,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bare_object_as_singleton_list() {
        let text = r#"{"url": "https://a.com", "text": "A", "keywords": {"finance": 1.0}}"#;
        let items = parse_response(text).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].url, "https://a.com");
    }

    #[test]
    fn parses_list_and_discards_bad_items() {
        let text = r#"[
            {"url": "https://a.com", "text": "A", "keywords": {"finance": 1.0}},
            {"not_a_valid": "item"}
        ]"#;
        let items = parse_response(text).unwrap();
        assert_eq!(items.len(), 1);
    }

    #[test]
    fn detects_out_of_vocabulary_keywords() {
        let items = parse_response(
            r#"[{"url": "https://a.com", "text": "A", "keywords": {"finance": 1.0, "taxes": 0.5}}]"#,
        )
        .unwrap();
        assert_eq!(out_of_vocabulary(&items), vec!["taxes".to_string()]);
    }

    #[test]
    fn no_out_of_vocabulary_keywords_when_all_known() {
        let items = parse_response(
            r#"[{"url": "https://a.com", "text": "A", "keywords": {"finance": 1.0, "budget": 0.5}}]"#,
        )
        .unwrap();
        assert!(out_of_vocabulary(&items).is_empty());
    }

    #[test]
    fn malformed_json_is_reported_as_error() {
        assert!(parse_response("not json").is_err());
    }
}
