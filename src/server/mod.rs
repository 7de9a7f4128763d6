//! Preview server with on-demand post generation
//!
//! Serves the public directory. A post page that was not generated at build
//! time is produced on its first request: the reader gets the fallback page
//! (which reloads itself) while the page is generated in the background, and
//! the generated page from then on.

use anyhow::Result;
use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::error::ContentError;
use crate::generator::{post_output_path, Generator};
use crate::helpers::is_url_safe_slug;
use crate::view::DetailPage;
use crate::Site;

/// A slug without a pre-rendered page on disk
#[derive(Debug)]
enum PageStatus {
    /// Generated on demand: `Fallback` while loading, then `Ready`
    Page(DetailPage),
    /// The repository had no post with this slug at this instant
    Missing(Instant),
}

/// How long a slug the repository did not know keeps answering 404 before
/// the repository is asked again
pub const MISSING_TTL: Duration = Duration::from_secs(30);

/// Server state
pub struct ServerState {
    public_dir: PathBuf,
    generator: Arc<Generator>,
    pages: Mutex<HashMap<String, PageStatus>>,
    missing_ttl: Duration,
}

impl ServerState {
    pub fn new(public_dir: PathBuf, generator: Generator) -> Self {
        Self {
            public_dir,
            generator: Arc::new(generator),
            pages: Mutex::new(HashMap::new()),
            missing_ttl: MISSING_TTL,
        }
    }

    /// Override how long an unknown slug is remembered
    pub fn with_missing_ttl(mut self, ttl: Duration) -> Self {
        self.missing_ttl = ttl;
        self
    }
}

/// Start the preview server
pub async fn start(site: &Site, ip: &str, port: u16, open: bool) -> Result<()> {
    let generator = Generator::new(site, site.client()?)?;
    let state = Arc::new(ServerState::new(site.public_dir.clone(), generator));
    let app = router(state);

    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    let url = format!("http://{}:{}", ip, port);
    println!("Server running at {}", url);
    println!("Press Ctrl+C to stop.");

    if open {
        if let Err(e) = open_browser(&url) {
            tracing::warn!("Failed to open browser: {}", e);
        }
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Routes: post pages with on-demand generation, everything else from disk
pub fn router(state: Arc<ServerState>) -> Router {
    let public = ServeDir::new(&state.public_dir).append_index_html_on_directories(true);

    Router::new()
        .route("/post/:slug", get(post_handler))
        .route("/post/:slug/", get(post_handler))
        .fallback_service(public)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

async fn post_handler(State(state): State<Arc<ServerState>>, Path(slug): Path<String>) -> Response {
    serve_post(&state, &slug).await
}

/// Serve the page for `slug`, starting its generation if needed
pub async fn serve_post(state: &Arc<ServerState>, slug: &str) -> Response {
    if !is_url_safe_slug(slug) {
        return not_found(state);
    }

    let path = post_output_path(&state.public_dir, slug);
    if let Ok(html) = tokio::fs::read_to_string(&path).await {
        return Html(html).into_response();
    }

    let ready = {
        let mut pages = state.pages.lock().unwrap_or_else(|e| e.into_inner());
        match pages.get(slug) {
            Some(PageStatus::Missing(since)) if since.elapsed() < state.missing_ttl => {
                return not_found(state)
            }
            Some(PageStatus::Page(DetailPage::Ready(view))) => Some(view.clone()),
            Some(PageStatus::Page(DetailPage::Fallback)) => None,
            // Never requested, or unknown long enough to ask again
            _ => {
                pages.insert(slug.to_string(), PageStatus::Page(DetailPage::Fallback));
                spawn_generation(Arc::clone(state), slug.to_string());
                None
            }
        }
    };

    match ready {
        Some(view) => match state.generator.render_post(&view) {
            Ok(html) => Html(html).into_response(),
            Err(e) => server_error(e),
        },
        None => match state.generator.renderer().render_fallback() {
            Ok(html) => ([(header::CACHE_CONTROL, "no-store")], Html(html)).into_response(),
            Err(e) => server_error(e),
        },
    }
}

fn spawn_generation(state: Arc<ServerState>, slug: String) {
    tokio::spawn(async move {
        tracing::info!("Generating post {:?} on demand", slug);
        let result = state.generator.load_post(&slug).await;

        if let Ok(view) = &result {
            match state.generator.write_post(view) {
                Ok(path) => tracing::info!("Generated post on demand: {:?}", path),
                Err(e) => tracing::warn!("Serving {:?} from memory: {:#}", slug, e),
            }
        }

        let mut pages = state.pages.lock().unwrap_or_else(|e| e.into_inner());
        match result {
            Ok(view) => {
                let page = match pages.remove(&slug) {
                    Some(PageStatus::Page(page)) => page,
                    _ => DetailPage::Fallback,
                };
                pages.insert(slug, PageStatus::Page(page.resolve(view)));
            }
            Err(e) if e.downcast_ref::<ContentError>().is_some_and(|c| c.is_not_found()) => {
                tracing::warn!("Post {:?} does not exist", slug);
                pages.insert(slug, PageStatus::Missing(Instant::now()));
            }
            Err(e) => {
                // Forget the attempt so the next request retries
                tracing::error!("Generation of {:?} failed: {:#}", slug, e);
                pages.remove(&slug);
            }
        }
    });
}

fn not_found(state: &ServerState) -> Response {
    match state.generator.renderer().render_not_found() {
        Ok(html) => (StatusCode::NOT_FOUND, Html(html)).into_response(),
        Err(e) => server_error(e),
    }
}

fn server_error(e: anyhow::Error) -> Response {
    tracing::error!("Render failed: {:#}", e);
    (StatusCode::INTERNAL_SERVER_ERROR, "Server error").into_response()
}

/// Open a URL in the default browser
fn open_browser(url: &str) -> Result<()> {
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open").arg(url).spawn()?;
    }

    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open").arg(url).spawn()?;
    }

    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/c", "start", url])
            .spawn()?;
    }

    Ok(())
}
