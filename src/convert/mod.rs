//! HTML to Markdown conversion
//!
//! [`MarkdownConverter`] walks a parsed page, renders tables through
//! [`crate::table::TableBuilder`] and hands every link and image reference to
//! a [`LinkPolicy`]. [`SiteLinks`] is the policy used for mirrored pages.

mod links;
mod markdown;

pub use links::{breadcrumb_trail, render_document, SiteLinks};
pub use markdown::{render_table_html, MarkdownConverter};

use crate::ConvertResult;

/// Decides what links and image sources become in the output
pub trait LinkPolicy {
    /// Rewrites an `href`
    ///
    /// # Returns
    ///
    /// * `Ok(Some(target))` - Render a link to `target`
    /// * `Ok(None)` - Render the link text only
    /// * `Err(ConvertError::UnresolvedLink)` - The target is not known yet
    fn rewrite_href(&self, href: &str) -> ConvertResult<Option<String>>;

    /// Rewrites an image `src`
    fn rewrite_src(&self, src: &str) -> String;
}

/// Leaves every reference untouched
#[derive(Debug, Clone, Copy, Default)]
pub struct KeepLinks;

impl LinkPolicy for KeepLinks {
    fn rewrite_href(&self, href: &str) -> ConvertResult<Option<String>> {
        Ok(Some(href.to_string()))
    }

    fn rewrite_src(&self, src: &str) -> String {
        src.to_string()
    }
}
