mod cli;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use url::Url;

use sitecrawl_classifier::ResponsesClassifier;
use sitecrawl_core::Settings;
use sitecrawl_engine::CrawlEngine;
use sitecrawl_normalize::RobotsGate;
use sitecrawl_renderer::ChromeRenderer;
use sitecrawl_storage::Storage;

use crate::cli::Cli;

fn main() -> Result<()> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(async_main())
}

async fn async_main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level)),
        )
        .init();

    let site_base = Url::parse(&cli.url).with_context(|| format!("invalid seed URL: {}", cli.url))?;

    let settings = Settings {
        workers: cli.workers,
        stale_hours: cli.stale_hours,
        max_count: cli.max_count,
        max_url_params: cli.max_url_params,
        max_components: cli.max_components,
        max_depth: cli.max_depth,
        database_path: cli.database.clone(),
    };

    let storage = Storage::connect(&settings.database_path)
        .await
        .context("failed to open database")?;
    storage.run_migrations().await.context("failed to run migrations")?;

    let robots = RobotsGate::fetch(&site_base).await;

    let renderer = ChromeRenderer::establish(&site_base)
        .await
        .context("failed to establish a headless browser")?;

    let classifier = ResponsesClassifier::new(
        cli.classifier_endpoint.clone(),
        cli.classifier_api_key.clone(),
        cli.classifier_model.clone(),
    );

    let engine = CrawlEngine::new(
        Arc::new(renderer),
        Arc::new(classifier),
        storage,
        robots,
        site_base,
        settings,
    );

    engine.run().await.context("crawl run failed")?;

    Ok(())
}
