use chromiumoxide::browser::BrowserConfig;
use chromiumoxide::handler::viewport::Viewport;

/// A stealth launch configuration the renderer tries, in order, against the
/// site's seed URL until one of them is not turned away by the site's
/// anti-bot defenses (§4.2). Rust's dominant CDP driver only speaks to
/// Chromium, so "browser profile" here means distinct launch arguments
/// (viewport, user agent, feature flags) rather than distinct browser
/// engines — see DESIGN.md for why this departs from the three-engine
/// fallback in the original prototype.
pub struct RenderProfile {
    pub name: &'static str,
    pub user_agent: Option<&'static str>,
    pub viewport: Viewport,
    pub extra_args: &'static [&'static str],
}

pub fn default_profiles() -> Vec<RenderProfile> {
    vec![
        RenderProfile {
            name: "stealth-desktop",
            user_agent: None,
            viewport: Viewport {
                width: 1366,
                height: 768,
                device_scale_factor: Some(1.0),
                emulating_mobile: false,
                is_landscape: true,
                has_touch: false,
            },
            extra_args: &["--disable-blink-features=AutomationControlled"],
        },
        RenderProfile {
            name: "alternate-ua-desktop",
            user_agent: Some(
                "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 \
                 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
            ),
            viewport: Viewport {
                width: 1440,
                height: 900,
                device_scale_factor: Some(2.0),
                emulating_mobile: false,
                is_landscape: true,
                has_touch: false,
            },
            extra_args: &[],
        },
        RenderProfile {
            name: "mobile",
            user_agent: Some(
                "Mozilla/5.0 (iPhone; CPU iPhone OS 17_4 like Mac OS X) AppleWebKit/605.1.15 \
                 (KHTML, like Gecko) Version/17.4 Mobile/15E148 Safari/604.1",
            ),
            viewport: Viewport {
                width: 390,
                height: 844,
                device_scale_factor: Some(3.0),
                emulating_mobile: true,
                is_landscape: false,
                has_touch: true,
            },
            extra_args: &[],
        },
    ]
}

/// Script injected before any page script runs, to mask the common
/// automation fingerprints simple anti-bot checks key off of.
pub const STEALTH_INIT_SCRIPT: &str = r#"
Object.defineProperty(navigator, 'webdriver', { get: () => undefined });
Object.defineProperty(navigator, 'plugins', { get: () => [1, 2, 3, 4, 5] });
Object.defineProperty(navigator, 'languages', { get: () => ['en-US', 'en'] });
window.chrome = window.chrome || { runtime: {} };
"#;

pub fn build_config(
    exe: &str,
    profile: &RenderProfile,
) -> Result<BrowserConfig, String> {
    let mut builder = BrowserConfig::builder()
        .chrome_executable(exe)
        .viewport(profile.viewport.clone())
        .window_size(profile.viewport.width, profile.viewport.height)
        .arg("--disable-gpu")
        .arg("--no-sandbox")
        .arg("--disable-setuid-sandbox")
        .arg("--disable-dev-shm-usage")
        .arg("--no-first-run")
        .arg("--no-default-browser-check")
        .arg("--mute-audio");

    if let Some(ua) = profile.user_agent {
        builder = builder.arg(format!("--user-agent={ua}"));
    }
    for arg in profile.extra_args {
        builder = builder.arg(*arg);
    }

    builder.build().map_err(|e| e.to_string())
}
