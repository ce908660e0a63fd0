use sitecrawl_core::{vocab, LinkKeywords};

/// A ranked link ready for persistence: the aggregated score and the
/// serialized keyword string, or `None` if the link's total was exactly
/// zero (§4.5, dropped before persistence).
pub struct Ranked {
    pub url: String,
    pub text: String,
    pub score: f64,
    pub keyword_string: String,
}

/// Applies the ranking function to every classified link, dropping any
/// whose aggregated total is exactly zero.
pub fn rank_all(links: &[LinkKeywords]) -> Vec<Ranked> {
    links.iter().filter_map(|l| rank_one(l)).collect()
}

fn rank_one(link: &LinkKeywords) -> Option<Ranked> {
    let mut weighted: Vec<(String, f64)> = link
        .keywords
        .iter()
        .map(|(kw, raw)| (kw.clone(), raw * vocab::weight_for(kw)))
        .collect();

    // Descending by weight; ties broken by keyword name for a stable,
    // deterministic serialization.
    weighted.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal).then(a.0.cmp(&b.0)));

    let total: f64 = weighted
        .iter()
        .enumerate()
        .map(|(i, (_, w))| w / 2f64.powi(i as i32))
        .sum();

    if total == 0.0 {
        return None;
    }

    let keyword_string = format!(
        ";{};",
        weighted.iter().map(|(k, _)| k.as_str()).collect::<Vec<_>>().join(";")
    );

    Some(Ranked {
        url: link.url.clone(),
        text: link.text.clone(),
        score: total,
        keyword_string,
    })
}
