use clap::Parser;

/// Site-scoped crawler: renders every in-scope page under a seed URL,
/// extracts outbound links, ranks them against a fixed keyword vocabulary,
/// and persists the result (§6).
#[derive(Parser)]
#[command(name = "sitecrawl", about = "Site-scoped crawler with AI-assisted link ranking")]
pub struct Cli {
    /// Seed URL; its scheme and host become the site base.
    pub url: String,

    /// Parallel worker count.
    #[arg(long, default_value = "8")]
    pub workers: usize,

    /// Reap threshold in hours.
    #[arg(long, default_value = "24")]
    pub stale_hours: i64,

    /// Cap on total enqueued URLs per run (unset = unlimited).
    #[arg(long)]
    pub max_count: Option<usize>,

    /// Leading query-parameter retention count (unset = keep all, 0 = strip all).
    #[arg(long)]
    pub max_url_params: Option<usize>,

    /// Path-segment cap.
    #[arg(long, default_value = "10")]
    pub max_components: usize,

    /// BFS depth cap from seed (seed has depth 0).
    #[arg(long, default_value = "5")]
    pub max_depth: u32,

    /// Path to the SQLite database file.
    #[arg(long, default_value = "./crawler.db")]
    pub database: String,

    /// Log level (overridden by RUST_LOG if set).
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// Classifier endpoint URL.
    #[arg(long, env = "SITECRAWL_CLASSIFIER_ENDPOINT")]
    pub classifier_endpoint: String,

    /// Classifier API key.
    #[arg(long, env = "SITECRAWL_CLASSIFIER_API_KEY")]
    pub classifier_api_key: String,

    /// Classifier model name.
    #[arg(long, env = "SITECRAWL_CLASSIFIER_MODEL", default_value = "gpt-4o-mini")]
    pub classifier_model: String,
}
