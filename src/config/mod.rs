//! Configuration module

mod env;
mod site;

pub use env::{ContentApiConfig, ACCESS_TOKEN_VAR, ENDPOINT_VAR};
pub use site::SiteConfig;
