//! Simulated site crawl
//!
//! Every page links to a couple of other pages; fetching a page takes a few
//! milliseconds and some pages are missing. The reducer collects page sizes
//! and queues newly discovered links, the end hook reports each cycle.
//!
//! ```bash
//! cargo run --example graph_walk -- --pages 200 -vv
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use iterative_mapreduce::app::init_logging;
use iterative_mapreduce::config::ConfigLoader;
use iterative_mapreduce::error::ErrorExt;
use iterative_mapreduce::prelude::*;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};

/// Crawl a synthetic site with an iterative coordinator
#[derive(Parser)]
#[command(name = "graph_walk")]
struct Args {
    /// Configuration file (TOML)
    #[arg(short, long, default_value = "iterative.toml")]
    config: PathBuf,

    /// Number of pages on the synthetic site
    #[arg(long, default_value = "120")]
    pages: u32,

    /// Every page whose number is a multiple of this is missing
    #[arg(long, default_value = "13")]
    missing_every: u32,

    /// Enable verbose output (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Clone)]
struct Page {
    number: u32,
    size: usize,
    links: Vec<u32>,
}

fn links_for(number: u32, pages: u32) -> Vec<u32> {
    vec![(number * 2 + 1) % pages, (number * 3 + 2) % pages]
}

async fn fetch(number: u32, pages: u32, missing_every: u32) -> Result<Page, String> {
    tokio::time::sleep(Duration::from_millis(u64::from(number % 5) + 1)).await;
    if missing_every > 0 && number > 0 && number % missing_every == 0 {
        return Err(format!("page {} not found", number));
    }
    Ok(Page {
        number,
        size: 512 + (number as usize * 37) % 4096,
        links: links_for(number, pages),
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let loader = ConfigLoader::new();
    loader.load_file(&args.config).await?;
    loader.apply_env()?;
    let mut config = loader.get_config();
    config.logging.verbose = config.logging.verbose.max(args.verbose);
    init_logging(&config.app_config());

    let pages = args.pages.max(1);
    let missing_every = args.missing_every;

    let crawl: Coordinator<u32, Page, BTreeMap<u32, usize>, String> =
        Coordinator::with_config(config.coordinator.clone());
    crawl
        .reduce(|mut sizes, page, ctx| {
            for link in &page.links {
                ctx.remap(*link);
            }
            sizes.insert(page.number, page.size);
            sizes
        })
        .end(|sizes, ctx| {
            info!(
                fetched = sizes.len(),
                missing = ctx.rejected().len(),
                "Crawl cycle finished"
            );
            if sizes.is_empty() {
                ctx.reject("front page could not be fetched".to_string());
            }
        })
        .map(move |number: &u32| Work::future(fetch(*number, pages, missing_every)))
        .start_with([0]);

    let sizes = crawl
        .wait()
        .await
        .map_err(anyhow::Error::msg)
        .context("Crawl failed")?;

    let progress = crawl.progress();
    if !progress.rejected.is_empty() {
        warn!(pages = ?progress.rejected, "Some pages were missing");
    }

    let total: usize = sizes.values().sum();
    println!(
        "{}: fetched {} pages ({} bytes), {} missing, {} discovered",
        config.coordinator.name,
        sizes.len(),
        total,
        progress.rejected.len(),
        progress.mapped.len()
    );
    println!(
        "{}",
        progress
            .to_json()
            .to_iterative("Failed to render crawl progress")?
    );
    Ok(())
}
