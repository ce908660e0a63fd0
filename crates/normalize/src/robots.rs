use std::time::Duration;

use texting_robots::Robot;
use tracing::warn;
use url::Url;

const USER_AGENT: &str = "*";
const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Wildcard-user-agent robots.txt gate for a single site. A failed or
/// unparseable robots.txt degrades to allow-all, per §4.1/§6: "Robots
/// parsing failures (network error, unparseable file) degrade to allow all."
pub struct RobotsGate {
    robot: Option<Robot>,
}

impl RobotsGate {
    /// Fetches `base/robots.txt` and builds the gate. Never fails: any
    /// error along the way (network, non-200, unparseable body) results in
    /// an allow-all gate.
    pub async fn fetch(base: &Url) -> Self {
        let robots_url = match base.join("/robots.txt") {
            Ok(u) => u,
            Err(_) => return Self::allow_all(),
        };

        let client = match reqwest::Client::builder().timeout(FETCH_TIMEOUT).build() {
            Ok(c) => c,
            Err(_) => return Self::allow_all(),
        };

        let body = match client.get(robots_url.clone()).send().await {
            Ok(resp) if resp.status().is_success() => match resp.bytes().await {
                Ok(b) => b,
                Err(e) => {
                    warn!(url = %robots_url, error = %e, "failed reading robots.txt body, allowing all");
                    return Self::allow_all();
                }
            },
            Ok(resp) => {
                warn!(url = %robots_url, status = %resp.status(), "robots.txt not available, allowing all");
                return Self::allow_all();
            }
            Err(e) => {
                warn!(url = %robots_url, error = %e, "failed fetching robots.txt, allowing all");
                return Self::allow_all();
            }
        };

        match Robot::new(USER_AGENT, &body) {
            Ok(robot) => Self { robot: Some(robot) },
            Err(e) => {
                warn!(url = %robots_url, error = ?e, "failed parsing robots.txt, allowing all");
                Self::allow_all()
            }
        }
    }

    pub fn allow_all() -> Self {
        Self { robot: None }
    }

    /// Whether the wildcard user agent may fetch `url`.
    pub fn allowed(&self, url: &Url) -> bool {
        match &self.robot {
            Some(robot) => robot.allowed(url.as_str()),
            None => true,
        }
    }
}
