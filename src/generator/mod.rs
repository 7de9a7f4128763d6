//! Generator module - pre-renders the list page and every post page

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::client::Client;
use crate::content::{HtmlSerializer, RichTextConverter};
use crate::templates::TemplateRenderer;
use crate::view::{Pagination, PostView};
use crate::Site;

/// Static site generator over the content API
pub struct Generator {
    site: Site,
    client: Client,
    renderer: TemplateRenderer,
    converter: Arc<dyn RichTextConverter>,
}

impl Generator {
    /// Create a new generator
    pub fn new(site: &Site, client: Client) -> Result<Self> {
        let renderer = TemplateRenderer::new(&site.config)?;

        Ok(Self {
            site: site.clone(),
            client,
            renderer,
            converter: Arc::new(HtmlSerializer),
        })
    }

    pub fn renderer(&self) -> &TemplateRenderer {
        &self.renderer
    }

    /// Generate the list page and one page per listed post.
    ///
    /// Any failure aborts the run; pages already written stay on disk.
    pub async fn generate(&self) -> Result<GenerateSummary> {
        fs::create_dir_all(&self.site.public_dir)
            .with_context(|| format!("Failed to create {:?}", self.site.public_dir))?;

        self.generate_index().await?;

        let content_type = &self.site.config.content_type;
        let slugs = self
            .client
            .list_identifiers(content_type)
            .await
            .with_context(|| format!("Failed to list {} identifiers", content_type))?;
        tracing::info!("Found {} posts to pre-render", slugs.len());

        for slug in &slugs {
            self.generate_post(slug).await?;
        }

        Ok(GenerateSummary { posts: slugs.len() })
    }

    /// Render `index.html` from the first page of posts
    pub async fn generate_index(&self) -> Result<PathBuf> {
        let config = &self.site.config;
        let first = self
            .client
            .fetch_page(&config.content_type, config.per_page)
            .await
            .with_context(|| format!("Failed to fetch first page of {}", config.content_type))?;

        let pagination = Pagination::from_page(first);
        let html = self.renderer.render_index(&pagination)?;

        let output_path = self.site.public_dir.join("index.html");
        write_page(&output_path, &html)?;
        tracing::debug!(
            "Generated: {:?} ({} posts, more: {})",
            output_path,
            pagination.results.len(),
            pagination.has_more()
        );
        Ok(output_path)
    }

    /// Render `post/<slug>/index.html`
    pub async fn generate_post(&self, slug: &str) -> Result<PathBuf> {
        let view = self.load_post(slug).await?;
        self.write_post(&view)
    }

    /// Fetch the post behind `slug` and build its view
    pub async fn load_post(&self, slug: &str) -> Result<PostView> {
        let config = &self.site.config;
        let document = self
            .client
            .fetch_by_identifier(&config.content_type, slug)
            .await
            .with_context(|| format!("Failed to fetch post {:?}", slug))?;

        PostView::from_document(document, config.words_per_minute)
            .with_context(|| format!("Failed to build post {:?}", slug))
    }

    /// Render a post page in memory
    pub fn render_post(&self, view: &PostView) -> Result<String> {
        self.renderer.render_post(view, self.converter.as_ref())
    }

    /// Render a post page to its output path
    pub fn write_post(&self, view: &PostView) -> Result<PathBuf> {
        let html = self.render_post(view)?;
        let output_path = self.post_output_path(&view.post.uid);
        write_page(&output_path, &html)?;
        tracing::debug!("Generated post: {:?}", output_path);
        Ok(output_path)
    }

    /// Where the page for `slug` is written
    pub fn post_output_path(&self, slug: &str) -> PathBuf {
        post_output_path(&self.site.public_dir, slug)
    }
}

/// Counts reported after a full run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerateSummary {
    pub posts: usize,
}

/// Output path of a post page below `public_dir`
pub fn post_output_path(public_dir: &Path, slug: &str) -> PathBuf {
    public_dir.join("post").join(slug).join("index.html")
}

fn write_page(path: &Path, html: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| anyhow::anyhow!("Failed to create dir {:?}: {}", parent, e))?;
    }
    // Write then rename so the preview server never reads a partial page
    let tmp = path.with_extension("html.tmp");
    fs::write(&tmp, html).map_err(|e| anyhow::anyhow!("Failed to write {:?}: {}", tmp, e))?;
    fs::rename(&tmp, path).map_err(|e| anyhow::anyhow!("Failed to write {:?}: {}", path, e))
}
