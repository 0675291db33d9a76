mod catalog;

use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::Parser;
use masonry_feed::{Dp, FeedConfig, FetchError, FetchStatus, Instant, MasonryFeed, ViewportSize};
use masonry_feed_runtime::{FeedDriver, InMemoryProvider};
use tracing::{info, warn};

use crate::catalog::{Photo, photos};

/// Upper bound on simulated scroll steps per query.
const MAX_SCROLL_STEPS: usize = 1_000;

/// Searches an in-memory photo catalog, scrolls the feed to the end and
/// reports what ends up on screen.
#[derive(Parser, Debug)]
#[command(name = "masonry-feed-demo")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Query to search for
    #[arg(short, long, default_value = "mountains")]
    query: String,
    /// Second query, typed key by key once the first is exhausted
    #[arg(long)]
    then: Option<String>,
    /// Results available per query
    #[arg(long, default_value_t = 250)]
    total: u64,
    /// Items per page
    #[arg(long, default_value_t = 40)]
    page_size: u32,
    /// Viewport width
    #[arg(long, default_value_t = 1200.0)]
    width: f64,
    /// Viewport height
    #[arg(long, default_value_t = 800.0)]
    height: f64,
    /// Width to resize to after the first page
    #[arg(long)]
    resize_to: Option<f64>,
    /// Simulated provider latency in milliseconds
    #[arg(long, default_value_t = 25)]
    latency_ms: u64,
    /// Fail the first fetch and recover with a retry
    #[arg(long)]
    fail_first: bool,
    /// Print the final visible items as JSON
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let config = FeedConfig::default().page_size(cli.page_size);
    let feed = MasonryFeed::new(config, ViewportSize::new(cli.width, cli.height))
        .context("invalid feed configuration")?;

    let mut provider = InMemoryProvider::new()
        .with_latency(Duration::from_millis(cli.latency_ms))
        .with_query(cli.query.clone(), photos(&cli.query, cli.total));
    if let Some(next) = &cli.then {
        provider = provider.with_query(next.clone(), photos(next, cli.total));
    }
    if cli.fail_first {
        provider.fail_next(FetchError::network("connection reset by peer"));
    }

    let mut driver = FeedDriver::new(feed, provider)?;
    driver.set_query(cli.query.as_str());
    driver.settle().await;
    recover(&mut driver).await?;

    if let Some(width) = cli.resize_to {
        driver.report_viewport(width, cli.height);
        driver.settle().await;
        info!(width, columns = driver.output().column_count, "viewport resized");
    }

    scroll_to_end(&mut driver, cli.height).await?;

    if let Some(next) = &cli.then {
        type_query(&mut driver, next).await;
        driver.settle().await;
        recover(&mut driver).await?;
        scroll_to_end(&mut driver, cli.height).await?;
    }

    report(&driver, cli.json)
}

fn init_tracing() {
    let filter = match tracing_subscriber::EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => match tracing_subscriber::EnvFilter::try_new(
            "error,masonry_feed=info,masonry_feed_runtime=info,masonry_feed_demo=info",
        ) {
            Ok(filter) => filter,
            Err(_) => tracing_subscriber::EnvFilter::new("error"),
        },
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_span_events(tracing_subscriber::fmt::format::FmtSpan::CLOSE)
        .try_init();
}

async fn wait_for_timers(driver: &FeedDriver<Photo>) {
    if let Some(deadline) = driver.next_deadline() {
        tokio::time::sleep(deadline.saturating_duration_since(Instant::now())).await;
    }
}

async fn recover(driver: &mut FeedDriver<Photo>) -> Result<()> {
    let Some(message) = driver.output().error_message else {
        return Ok(());
    };
    warn!(%message, "first attempt failed, retrying");
    driver.retry();
    driver.settle().await;
    if let Some(message) = driver.output().error_message {
        bail!(message);
    }
    Ok(())
}

/// Keeps parking the viewport at the bottom of the content until the
/// provider runs out of pages.
async fn scroll_to_end(driver: &mut FeedDriver<Photo>, height: f64) -> Result<()> {
    for step in 0..MAX_SCROLL_STEPS {
        let output = driver.output();
        let status = driver.feed().with(|feed| feed.status());
        if status == FetchStatus::Exhausted {
            info!(steps = step, "reached the end of the results");
            return Ok(());
        }
        if let Some(message) = output.error_message {
            bail!(message);
        }
        if output.column_count == 0 {
            bail!("viewport is too narrow for a single column");
        }

        let bottom = (output.content_height - Dp(height)).max(Dp::ZERO);
        if driver.report_scroll(bottom).is_none() {
            wait_for_timers(driver).await;
            driver.tick();
        }
        driver.settle().await;
    }
    bail!("gave up after {MAX_SCROLL_STEPS} scroll steps")
}

async fn type_query(driver: &mut FeedDriver<Photo>, text: &str) {
    let mut typed = String::new();
    for ch in text.chars() {
        typed.push(ch);
        driver.type_query(typed.as_str());
        tokio::time::sleep(Duration::from_millis(40)).await;
    }
    wait_for_timers(driver).await;
    if driver.tick().is_some() {
        info!(query = text, "query applied");
    }
}

fn report(driver: &FeedDriver<Photo>, json: bool) -> Result<()> {
    let output = driver.output();
    let (query, loaded) = driver
        .feed()
        .with(|feed| (feed.query().to_owned(), feed.store().len()));

    if output.no_results {
        println!("no results for \"{query}\"");
        return Ok(());
    }

    println!(
        "\"{query}\": {loaded} items in {} columns, {} tall, {} on screen",
        output.column_count,
        output.content_height,
        output.visible_items.len()
    );

    if json {
        let mut visible: Vec<_> = output.visible_items.values().collect();
        visible.sort_by(|a, b| a.y.0.total_cmp(&b.y.0).then(a.x.0.total_cmp(&b.x.0)));
        let rendered =
            serde_json::to_string_pretty(&visible).context("failed to serialize visible items")?;
        println!("{rendered}");
    }
    Ok(())
}
