//! List posts from the content API

use anyhow::{Context, Result};
use std::io::Write;

use crate::client::Client;
use crate::helpers::format_post_date;
use crate::view::{ListView, LoadMore, Pagination};
use crate::Site;

/// List posts; with `all`, keep loading pages until the cursor runs out
pub async fn run(site: &Site, all: bool) -> Result<()> {
    let client = site.client()?;
    let pagination = collect(site, &client, all).await?;

    let tz = site.config.tz()?;
    let mut out = std::io::stdout().lock();
    writeln!(out, "Posts ({}):", pagination.results.len())?;
    for post in &pagination.results {
        writeln!(
            out,
            "  {} - {} [{}]",
            format_post_date(
                post.first_publication_date.as_ref(),
                &site.config.language,
                &tz
            ),
            post.title,
            post.uid
        )?;
    }
    if pagination.has_more() {
        writeln!(out, "More posts available (use --all)")?;
    }

    Ok(())
}

/// First page, then every following page when `all` is set
pub async fn collect(site: &Site, client: &Client, all: bool) -> Result<Pagination> {
    let config = &site.config;
    let first = client
        .fetch_page(&config.content_type, config.per_page)
        .await
        .with_context(|| format!("Failed to fetch {}", config.content_type))?;

    let view = ListView::new(client.api(), Pagination::from_page(first));
    if all {
        loop {
            match view.load_more().await {
                LoadMore::Appended(count) => tracing::debug!("Loaded {} more posts", count),
                LoadMore::Exhausted => break,
                LoadMore::Failed(e) => {
                    return Err(anyhow::Error::new(e).context("Failed to load more posts"))
                }
            }
        }
    }

    Ok(view.snapshot().await)
}
