use std::collections::HashMap;

use once_cell::sync::Lazy;

/// Penalty weight applied to a classifier keyword that is not in the fixed
/// vocabulary but survived all classifier retries (see §4.4/§4.5).
pub const OUT_OF_VOCAB_WEIGHT: f64 = 0.25;

/// The fixed keyword → importance-weight vocabulary the classifier is
/// restricted to and the ranking function weights against (§6).
pub static KEYWORDS: Lazy<HashMap<&'static str, f64>> = Lazy::new(|| {
    HashMap::from([
        ("department", 0.7),
        ("contact", 1.0),
        ("ACFR", 1.0),
        ("budget", 1.0),
        ("planning", 1.0),
        ("officer", 0.9),
        ("director", 0.9),
        ("finance", 1.0),
        ("elected", 0.7),
        ("minutes", 1.0),
        ("bid", 0.8),
        ("purchasing", 1.0),
        ("proposal", 1.0),
        ("RFP", 1.0),
        ("contract", 1.0),
        ("funding", 1.0),
        ("report", 0.7),
        ("grant", 0.7),
        ("improvement", 0.8),
        ("project", 0.8),
        ("initiative", 0.8),
    ])
});

/// Weight for `keyword`: its vocabulary weight if present, else the
/// out-of-vocabulary penalty.
pub fn weight_for(keyword: &str) -> f64 {
    KEYWORDS.get(keyword).copied().unwrap_or(OUT_OF_VOCAB_WEIGHT)
}

/// True if `keyword` is one of the fixed vocabulary terms.
pub fn is_known(keyword: &str) -> bool {
    KEYWORDS.contains_key(keyword)
}

/// Render the keyword prompt list, one `- keyword` per line, in the order
/// the vocabulary is declared.
pub fn prompt_list() -> String {
    KEYWORDS.keys().map(|k| format!("- {k}")).collect::<Vec<_>>().join("\n")
}

/// All vocabulary keyword names, used when building remediation prompts.
pub fn allowed_keywords() -> Vec<&'static str> {
    KEYWORDS.keys().copied().collect()
}
