use url::Url;

use crate::normalize::path_component_count;
use crate::robots::RobotsGate;

/// The structural part of the admission predicate (§4.1 a-d); the
/// total-enqueued-count cap (e) is evaluated by the frontier, which is the
/// only component that knows the running count.
///
/// (a) robots.txt allows the path for the wildcard user agent;
/// (b) host equals the seed's host exactly (no subdomain generalization);
/// (c) path component count <= max_components;
/// (d) depth <= max_depth.
pub fn admits(
    url: &Url,
    site_host: &str,
    depth: u32,
    max_components: usize,
    max_depth: u32,
    robots: &RobotsGate,
) -> bool {
    if url.host_str() != Some(site_host) {
        return false;
    }
    if path_component_count(url) > max_components {
        return false;
    }
    if depth > max_depth {
        return false;
    }
    robots.allowed(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn host_url(path: &str) -> Url {
        Url::parse(&format!("https://example.gov{path}")).unwrap()
    }

    #[test]
    fn rejects_foreign_host() {
        let gate = RobotsGate::allow_all();
        let u = Url::parse("https://other.example.com/").unwrap();
        assert!(!admits(&u, "example.gov", 0, 10, 5, &gate));
    }

    #[test]
    fn rejects_over_component_cap() {
        let gate = RobotsGate::allow_all();
        let u = host_url("/a/b/c/d/e/f/g/h/i/j/k");
        assert!(!admits(&u, "example.gov", 0, 10, 5, &gate));
    }

    #[test]
    fn rejects_over_depth_cap() {
        let gate = RobotsGate::allow_all();
        let u = host_url("/a");
        assert!(!admits(&u, "example.gov", 6, 10, 5, &gate));
    }

    #[test]
    fn admits_when_all_checks_pass() {
        let gate = RobotsGate::allow_all();
        let u = host_url("/a/b");
        assert!(admits(&u, "example.gov", 2, 10, 5, &gate));
    }
}
