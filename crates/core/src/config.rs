/// Run-wide settings assembled directly from the CLI surface (§6). Unlike
/// the ambient config layer in some adjacent tools, there is no separate
/// config file: every field here is either a required CLI positional or has
/// the documented CLI default.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Parallel worker count (`--workers`, default 8).
    pub workers: usize,
    /// Reap threshold in hours (`--stale-hours`, default 24).
    pub stale_hours: i64,
    /// Cap on total enqueued URLs per run (`--max-count`, unset = unlimited).
    pub max_count: Option<usize>,
    /// Leading query-parameter retention count (`--max-url-params`, unset = keep all).
    pub max_url_params: Option<usize>,
    /// Path-segment cap (`--max-components`, default 10).
    pub max_components: usize,
    /// BFS depth cap from seed (`--max-depth`, default 5).
    pub max_depth: u32,
    /// Path to the SQLite database file (`--database`).
    pub database_path: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            workers: 8,
            stale_hours: 24,
            max_count: None,
            max_url_params: None,
            max_components: 10,
            max_depth: 5,
            database_path: "./crawler.db".to_string(),
        }
    }
}
