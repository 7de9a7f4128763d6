//! Helper functions for templates
//!
//! URL building, date formatting and HTML escaping shared by the
//! generator and the rich-text serializer.

mod date;
mod html;
mod url;

pub use date::*;
pub use html::*;
pub use url::*;
