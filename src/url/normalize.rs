use crate::{MirrorError, Result};
use std::path::{Component, Path};
use url::Url;

/// Default document for directory URLs
const DIRECTORY_INDEX: &str = "index.html";

/// Returns the directory URL that every fetched URL must live below
///
/// # Examples
///
/// ```
/// use url::Url;
/// use wsm_mirror::url::site_base;
///
/// let start = Url::parse("https://example.com/wsm/V1/index.html").unwrap();
/// assert_eq!(site_base(&start).unwrap().as_str(), "https://example.com/wsm/V1/");
/// ```
pub fn site_base(start: &Url) -> Result<Url> {
    let mut base = start.join("./")?;
    base.set_query(None);
    base.set_fragment(None);
    Ok(base)
}

/// Resolves `leaf` against the directory of `page`
///
/// Query strings and fragments are dropped; dot segments are resolved.
pub fn join_leaf(page: &Url, leaf: &str) -> Result<Url> {
    let mut url = page.join(leaf.trim())?;
    url.set_query(None);
    url.set_fragment(None);
    Ok(url)
}

/// Derives the site-relative path of `url` below `base`
///
/// # Arguments
///
/// * `base` - The site base directory (see [`site_base`])
/// * `url` - The URL to be fetched
///
/// # Returns
///
/// * `Ok(String)` - `/`-separated relative path, `index.html` for directories
/// * `Err(MirrorError::PermissionViolation)` - `url` is on another origin,
///   outside the base directory, or does not map to a plain relative path
pub fn local_path(base: &Url, url: &Url) -> Result<String> {
    let violation = || MirrorError::PermissionViolation {
        path: url.to_string(),
    };

    if url.origin() != base.origin() {
        return Err(violation());
    }

    let mut relative = url
        .path()
        .strip_prefix(base.path())
        .ok_or_else(violation)?
        .to_string();

    if relative.is_empty() || relative.ends_with('/') {
        relative.push_str(DIRECTORY_INDEX);
    }

    ensure_relative(Path::new(&relative)).map_err(|_| violation())?;
    Ok(relative)
}

/// Checks that `path` only descends from wherever it is joined to
pub fn ensure_relative(path: &Path) -> Result<()> {
    let plain = path
        .components()
        .all(|c| matches!(c, Component::Normal(_)));

    if plain && path.components().next().is_some() {
        Ok(())
    } else {
        Err(MirrorError::PermissionViolation {
            path: path.display().to_string(),
        })
    }
}
