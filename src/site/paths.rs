//! Output-tree locations and the relative links between them
//!
//! Locations are `/`-separated paths relative to the `docs/` directory, such
//! as `body/engine/overview.md`.

/// Name of the shared image directory under `docs/`
pub const IMAGE_DIR: &str = "images";

fn segments(path: &str) -> Vec<&str> {
    path.split('/')
        .filter(|s| !s.is_empty() && *s != ".")
        .collect()
}

/// Computes the shortest relative link from the document at `from` to the
/// file at `to`
///
/// Walks up from the directory containing `from`, adding one `../` per level,
/// until the ancestor is a directory of `to`, then descends to `to`.
///
/// # Examples
///
/// ```
/// use wsm_mirror::site::resolve_relative_path;
///
/// assert_eq!(
///     resolve_relative_path("engine/overview/a.md", "engine/removal/b.md"),
///     "../removal/b.md"
/// );
/// assert_eq!(resolve_relative_path("engine/a.md", "engine/b.md"), "b.md");
/// ```
pub fn resolve_relative_path(from: &str, to: &str) -> String {
    let mut from_dir = segments(from);
    from_dir.pop();
    let to_parts = segments(to);

    // The last segment of `to` is a file, never a shared directory
    let limit = to_parts.len().saturating_sub(1);
    let shared = from_dir
        .iter()
        .zip(&to_parts)
        .take(limit)
        .take_while(|(a, b)| a == b)
        .count();

    let mut link = "../".repeat(from_dir.len() - shared);
    link.push_str(&to_parts[shared..].join("/"));
    link
}

/// Link from the document at `from` to an image in the shared image directory
pub fn image_path(from: &str, name: &str) -> String {
    let depth = segments(from).len().saturating_sub(1);
    format!("{}{}/{}", "../".repeat(depth), IMAGE_DIR, name)
}

/// Turns a breadcrumb into a directory name
///
/// Lowercases, drops quotes, and replaces every other run of
/// non-alphanumeric characters by a single `-`.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());

    for c in text.chars().flat_map(char::to_lowercase) {
        if c.is_alphanumeric() {
            slug.push(c);
        } else if matches!(c, '\'' | '"' | '\u{2019}') {
            continue;
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }

    while slug.ends_with('-') {
        slug.pop();
    }

    slug
}

/// Directory for a breadcrumb trail, one slug per crumb
pub fn location_for(breadcrumbs: &[String]) -> String {
    breadcrumbs
        .iter()
        .map(|crumb| match slugify(crumb) {
            slug if slug.is_empty() => "untitled".to_string(),
            slug => slug,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Location of `filename` filed under `breadcrumbs`
pub fn article_location(breadcrumbs: &[String], filename: &str) -> String {
    let dir = location_for(breadcrumbs);
    if dir.is_empty() {
        filename.to_string()
    } else {
        format!("{}/{}", dir, filename)
    }
}
