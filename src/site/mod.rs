//! Output site model
//!
//! This module owns everything that describes the mirrored tree rather than
//! the source site: locations and relative links, the article map, the
//! navigation tree, display names and the MkDocs manifest.

mod article_map;
mod manifest;
mod navigation;
mod paths;
mod titles;

pub use article_map::ArticleMap;
pub use manifest::render_manifest;
pub use navigation::{EntryKind, Landing, NavNode, NavigationTree};
pub use paths::{
    article_location, image_path, location_for, resolve_relative_path, slugify, IMAGE_DIR,
};
pub use titles::{display_name, ACRONYMS};
