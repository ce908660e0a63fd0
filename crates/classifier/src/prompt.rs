use sitecrawl_core::{vocab, ExtractedLink};

/// Initial classification prompt batching every link extracted from one
/// page (§4.4). Describes the input/output shape and the scoring guidance
/// verbatim from the original vocabulary design.
pub fn initial(links: &[ExtractedLink]) -> String {
    let keyword_list = vocab::prompt_list();
    let payload = serde_json::to_string(links).unwrap_or_else(|_| "[]".to_string());

    format!(
        r#"Below is a JSON list of web links scraped from a single public sector
web page. Each link looks like: {{"url": "https://finance.com", "text": "Budget Link"}}

Classify each link against the keywords below. A link may have zero or more
keywords. Return a JSON list of objects, one per link that has at least one
keyword, each with:
- "url": the URL of the link
- "text": the text of the link
- "keywords": an object mapping keyword to a score in [0, 1]

Example output: [{{"url": "https://finance.com", "text": "Budget Link", "keywords": {{"finance": 1.0, "budget": 1.0}}}}]

The keywords to look for:
{keyword_list}

An exact match (ignoring case and plurality) scores 1.0. A synonym scores
around 0.8. The adjective form of a noun keyword scores around 0.9. A verb
form scores around 0.4. Unrelated words are omitted entirely. Only use the
keywords listed above — never invent your own. If a link has no keywords,
omit it from the output.

Links:
{payload}"#
    )
}

/// Round-1 remediation prompt: the previous reply didn't parse or didn't
/// validate against the required shape.
pub fn retry_malformed() -> String {
    "Your previous reply was not valid JSON matching the required shape. \
     Emit the same answer again, but strictly as a JSON list of objects with \
     the keys \"url\" (string), \"text\" (string), and \"keywords\" (an object \
     mapping keyword name to a floating point score). Omit any item that \
     cannot be made to fit this shape."
        .to_string()
}

/// Round-2 remediation prompt: the response parsed but used keywords
/// outside the fixed vocabulary.
pub fn retry_out_of_vocabulary(offending: &[String]) -> String {
    let keyword_list = vocab::prompt_list();
    let offending_list = offending.join(", ");

    format!(
        r#"The previous output used keywords that are not in the requested list.
The requested keywords are:
{keyword_list}

The unknown keywords used were: {offending_list}

Emit the same answer again, but only using keywords from the requested list.
If an unknown keyword was chosen because it resembled one of the requested
keywords, remap it to that keyword and adjust the score down to reflect the
similarity. Otherwise drop it."#
    )
}
