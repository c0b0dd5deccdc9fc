use crate::convert::{LinkPolicy, MarkdownConverter};
use crate::site::{image_path, resolve_relative_path, ArticleMap, Landing, NavigationTree};
use crate::{ConvertError, ConvertResult};

/// Separator between the crumbs of a page's breadcrumb trail
pub const TRAIL_SEPARATOR: &str = " ➭ ";

/// Rewrites links of the document at `location` against the article map
pub struct SiteLinks<'a> {
    articles: &'a ArticleMap,
    location: &'a str,
    pdf_trigger: &'a str,
}

impl<'a> SiteLinks<'a> {
    pub fn new(articles: &'a ArticleMap, location: &'a str, pdf_trigger: &'a str) -> Self {
        Self {
            articles,
            location,
            pdf_trigger,
        }
    }

    fn resolve(&self, key: &str, fragment: &str) -> ConvertResult<Option<String>> {
        match self.articles.get(key) {
            Some(target) => Ok(Some(
                resolve_relative_path(self.location, target) + fragment,
            )),
            None => Err(ConvertError::UnresolvedLink(key.to_string())),
        }
    }
}

impl LinkPolicy for SiteLinks<'_> {
    fn rewrite_href(&self, href: &str) -> ConvertResult<Option<String>> {
        if href.starts_with('#') || is_external(href) {
            return Ok(Some(href.to_string()));
        }

        if href == self.pdf_trigger {
            return self.resolve(self.pdf_trigger, "");
        }

        if href.to_ascii_lowercase().starts_with("javascript:") {
            return Ok(None);
        }

        let (path, fragment) = match href.find('#') {
            Some(i) => href.split_at(i),
            None => (href, ""),
        };

        self.resolve(&document_key(path), fragment)
    }

    fn rewrite_src(&self, src: &str) -> String {
        image_path(self.location, basename(src))
    }
}

fn is_external(href: &str) -> bool {
    let lower = href.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://") || lower.starts_with("mailto:")
}

fn basename(path: &str) -> &str {
    let path = path.split(['?', '#']).next().unwrap_or(path);
    path.rsplit('/').next().unwrap_or(path)
}

/// Article map key for a link path: its basename, `.html` becoming `.md`
pub fn document_key(path: &str) -> String {
    let name = basename(path);
    match name.strip_suffix(".html") {
        Some(stem) => format!("{}.md", stem),
        None => name.to_string(),
    }
}

/// Renders the breadcrumb trail of the document at `location`
///
/// Every crumb but the last links to the landing page of its group; the last
/// links to the document itself. A group without a landing page yet is an
/// unresolved link, and one whose landing page is not written yet is a
/// pending link. A crumb whose landing page failed is plain text.
pub fn breadcrumb_trail(
    breadcrumbs: &[String],
    location: &str,
    nav: &NavigationTree,
) -> ConvertResult<String> {
    let mut crumbs = Vec::with_capacity(breadcrumbs.len());

    for (i, crumb) in breadcrumbs.iter().enumerate() {
        let target = if i + 1 == breadcrumbs.len() {
            location
        } else {
            match nav.landing_state(&breadcrumbs[..=i]) {
                Landing::Written(landing) => landing,
                Landing::Failed => {
                    crumbs.push(crumb.clone());
                    continue;
                }
                Landing::Pending(_) => {
                    return Err(ConvertError::PendingLink(format!(
                        "landing page of '{}'",
                        crumb
                    )));
                }
                Landing::Missing => {
                    return Err(ConvertError::UnresolvedLink(format!(
                        "landing page of '{}'",
                        crumb
                    )));
                }
            }
        };
        crumbs.push(format!(
            "[{}]({})",
            crumb,
            resolve_relative_path(location, target)
        ));
    }

    Ok(crumbs.join(TRAIL_SEPARATOR))
}

/// Converts a mirrored page: breadcrumb trail, blank line, Markdown body
pub fn render_document(
    html: &str,
    breadcrumbs: &[String],
    location: &str,
    articles: &ArticleMap,
    nav: &NavigationTree,
    pdf_trigger: &str,
) -> ConvertResult<String> {
    let trail = breadcrumb_trail(breadcrumbs, location, nav)?;
    let links = SiteLinks::new(articles, location, pdf_trigger);
    let body = MarkdownConverter::new(&links).convert(html)?;
    Ok(format!("{}\n\n{}\n", trail, body))
}
