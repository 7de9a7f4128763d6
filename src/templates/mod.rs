//! Built-in page templates using Tera template engine
//!
//! Templates are embedded in the binary. Autoescaping is off: every value
//! is escaped when its template data is built, and rich-text bodies arrive
//! already sanitized by the serializer.

use anyhow::Result;
use chrono_tz::Tz;
use serde::Serialize;
use tera::{Context, Tera};

use crate::config::SiteConfig;
use crate::content::{PostSummary, RichTextConverter};
use crate::helpers::{
    date_xml, format_post_date, full_url_for, html_escape, meta_generator, post_path, url_for,
};
use crate::view::{Pagination, PostView, LOAD_MORE_NOTICE};

/// Seconds before the fallback page reloads itself
const FALLBACK_REFRESH_SECS: u32 = 2;

/// Template renderer with the embedded page templates
pub struct TemplateRenderer {
    tera: Tera,
    site: SiteData,
    config: SiteConfig,
    tz: Tz,
}

impl TemplateRenderer {
    /// Create a new renderer with all templates loaded
    pub fn new(config: &SiteConfig) -> Result<Self> {
        let mut tera = Tera::default();
        tera.autoescape_on(vec![]);

        tera.add_raw_templates(vec![
            ("layout.html", include_str!("spacetraveling/layout.html")),
            ("index.html", include_str!("spacetraveling/index.html")),
            ("post.html", include_str!("spacetraveling/post.html")),
            ("fallback.html", include_str!("spacetraveling/fallback.html")),
            ("not_found.html", include_str!("spacetraveling/not_found.html")),
            // Partials
            (
                "partials/header.html",
                include_str!("spacetraveling/partials/header.html"),
            ),
        ])?;

        Ok(Self {
            tera,
            site: SiteData::new(config),
            config: config.clone(),
            tz: config.tz()?,
        })
    }

    /// Render a template with given context
    pub fn render(&self, template_name: &str, context: &Context) -> Result<String> {
        Ok(self.tera.render(template_name, context)?)
    }

    /// Context shared by every page
    fn base_context(&self, canonical: Option<String>) -> Context {
        let mut context = Context::new();
        context.insert("site", &self.site);
        context.insert("meta_generator", &meta_generator());
        context.insert("canonical", &canonical.map(|c| html_escape(&c)));
        context
    }

    /// The post list page
    pub fn render_index(&self, pagination: &Pagination) -> Result<String> {
        let posts: Vec<SummaryData> = pagination
            .results
            .iter()
            .map(|p| SummaryData::new(p, &self.config, &self.tz))
            .collect();

        let mut context = self.base_context(Some(full_url_for(&self.config, "/")));
        context.insert("posts", &posts);
        context.insert(
            "next_page",
            &pagination.next_page.as_deref().map(html_escape),
        );
        context.insert("notice", &html_escape(LOAD_MORE_NOTICE));
        self.render("index.html", &context)
    }

    /// A post detail page
    pub fn render_post(&self, view: &PostView, converter: &dyn RichTextConverter) -> Result<String> {
        let post = PostPageData::new(view, converter, &self.config, &self.tz);
        let canonical = full_url_for(&self.config, &format!("post/{}/", view.post.uid));

        let mut context = self.base_context(Some(canonical));
        context.insert("post", &post);
        self.render("post.html", &context)
    }

    /// Placeholder shown while a post page is generated on demand
    pub fn render_fallback(&self) -> Result<String> {
        let mut context = self.base_context(None);
        context.insert("refresh_secs", &FALLBACK_REFRESH_SECS);
        self.render("fallback.html", &context)
    }

    /// Page for a slug the repository does not know
    pub fn render_not_found(&self) -> Result<String> {
        self.render("not_found.html", &self.base_context(None))
    }
}

/// Data structures for template context

#[derive(Debug, Clone, Serialize)]
pub struct SiteData {
    pub title: String,
    pub language: String,
    pub root: String,
    pub logo: String,
}

impl SiteData {
    fn new(config: &SiteConfig) -> Self {
        Self {
            title: html_escape(&config.title),
            language: html_escape(&config.language),
            root: html_escape(&url_for(config, "/")),
            logo: html_escape(&url_for(config, &config.logo)),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SummaryData {
    pub path: String,
    pub title: String,
    pub subtitle: String,
    pub author: String,
    pub date: String,
    pub datetime: Option<String>,
}

impl SummaryData {
    fn new(post: &PostSummary, config: &SiteConfig, tz: &Tz) -> Self {
        let date = post.first_publication_date.as_ref();
        Self {
            path: html_escape(&post_path(config, &post.uid)),
            title: html_escape(&post.title),
            subtitle: html_escape(&post.subtitle),
            author: html_escape(&post.author),
            date: html_escape(&format_post_date(date, &config.language, tz)),
            datetime: date.map(date_xml),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PostPageData {
    pub title: String,
    pub author: String,
    pub banner_url: Option<String>,
    pub date: String,
    pub datetime: Option<String>,
    pub read_minutes: usize,
    pub blocks: Vec<BlockData>,
}

impl PostPageData {
    fn new(view: &PostView, converter: &dyn RichTextConverter, config: &SiteConfig, tz: &Tz) -> Self {
        let post = &view.post;
        let date = post.first_publication_date.as_ref();
        let blocks = view
            .rendered_blocks(converter)
            .into_iter()
            .map(|block| BlockData {
                heading: html_escape(&block.heading),
                html: block.html,
            })
            .collect();

        Self {
            title: html_escape(&post.title),
            author: html_escape(&post.author),
            banner_url: post.banner_url.as_deref().map(html_escape),
            date: html_escape(&format_post_date(date, &config.language, tz)),
            datetime: date.map(date_xml),
            read_minutes: view.estimated_read_minutes,
            blocks,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BlockData {
    pub heading: String,
    /// Sanitized by the rich-text serializer
    pub html: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::testing::{doc, page};
    use crate::content::{ContentSlice, HtmlSerializer, StructuredText};
    use crate::view::WORDS_PER_MINUTE;

    fn renderer() -> TemplateRenderer {
        TemplateRenderer::new(&SiteConfig::default()).unwrap()
    }

    #[test]
    fn test_render_index_with_cursor() {
        let pagination = Pagination::from_page(page(&["a", "b"], Some("https://x.io/s?page=2&q=1")));
        let html = renderer().render_index(&pagination).unwrap();

        assert!(html.contains("<title>Posts | SpaceTraveling</title>"));
        assert!(html.contains(r#"href="/post/a/""#));
        assert!(html.contains(r#"href="/post/b/""#));
        assert!(html.contains("Title a"));
        assert!(html.contains("15 mar 2021"));
        assert!(html.contains(r#"data-next-page="https://x.io/s?page=2&amp;q=1""#));
        assert!(html.contains("Carregar mais posts"));
    }

    #[test]
    fn test_render_index_without_cursor_has_no_button() {
        let pagination = Pagination::from_page(page(&["a"], None));
        let html = renderer().render_index(&pagination).unwrap();
        assert!(!html.contains("Carregar mais posts"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn test_render_post() {
        let mut document = doc("hooks");
        document.data.title = "Hooks <3".to_string();
        document.data.banner.url = Some("https://images.io/banner.png".to_string());
        document.data.content = vec![
            ContentSlice {
                heading: "Intro".to_string(),
                body: vec![StructuredText::paragraph("Hello"), StructuredText::paragraph("world")],
            },
            ContentSlice {
                heading: "Outro".to_string(),
                body: vec![StructuredText::paragraph("Bye")],
            },
        ];
        let view = PostView::from_document(document, WORDS_PER_MINUTE).unwrap();
        let html = renderer().render_post(&view, &HtmlSerializer).unwrap();

        assert!(html.contains("<h1>Hooks &lt;3</h1>"));
        assert!(html.contains(r#"<img src="https://images.io/banner.png" alt="">"#));
        assert!(html.contains("1 min"));
        assert!(html.contains("<p>Hello</p><p>world</p>"));
        assert!(html.find("<h2>Intro</h2>").unwrap() < html.find("<h2>Outro</h2>").unwrap());
        assert!(html.contains(r#"<link rel="canonical" href="http://localhost:3000/post/hooks/">"#));
    }

    #[test]
    fn test_render_fallback() {
        let html = renderer().render_fallback().unwrap();
        assert!(html.contains("Carregando..."));
        assert!(html.contains(r#"http-equiv="refresh""#));
    }

    #[test]
    fn test_render_not_found() {
        let html = renderer().render_not_found().unwrap();
        assert!(html.contains("Post não encontrado"));
    }
}
