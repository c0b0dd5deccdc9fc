//! URL handling module for wsm-mirror
//!
//! This module resolves links found on fetched pages and maps fetch URLs to
//! site-relative paths, refusing anything outside the mirrored site.

mod normalize;

// Re-export main functions
pub use normalize::{ensure_relative, join_leaf, local_path, site_base};
