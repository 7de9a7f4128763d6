//! Generate static files

use anyhow::Result;

use crate::config::{ACCESS_TOKEN_VAR, ENDPOINT_VAR};
use crate::error::ContentError;
use crate::generator::Generator;
use crate::Site;

/// Pre-render the list page and every post page
pub async fn run(site: &Site) -> Result<()> {
    let start = std::time::Instant::now();

    let generator = Generator::new(site, site.client()?)?;
    let summary = match generator.generate().await {
        Ok(summary) => summary,
        Err(e) => {
            if e.downcast_ref::<ContentError>().is_some_and(ContentError::is_fatal) {
                tracing::error!("Check {} and {}", ENDPOINT_VAR, ACCESS_TOKEN_VAR);
            }
            return Err(e);
        }
    };

    let duration = start.elapsed();
    tracing::info!(
        "Generated index and {} posts in {:.2}s",
        summary.posts,
        duration.as_secs_f64()
    );

    Ok(())
}
