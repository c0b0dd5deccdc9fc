//! HTML parser for the manual's frameset and pages
//!
//! This module handles parsing fetched HTML to extract:
//! - Frame sources of the start page
//! - The model name and the section list of the menus
//! - Images, links and the PDF script of content pages

use regex::Regex;
use scraper::{Html, Selector};
use std::sync::LazyLock;

static MENU_ENTRY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^LeftMenuList\[\d+\]\s*=\s*"(.*?)";?$"#)
        .expect("MENU_ENTRY: hardcoded regex is valid")
});

static PDF_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"var\s+pdfname\s*=\s*'(.*?)'").expect("PDF_NAME: hardcoded regex is valid")
});

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("WHITESPACE: hardcoded regex is valid"));

/// Section titles and section page paths of the service menu
///
/// The two lists are parallel; see [`ServiceMenu::sections`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceMenu {
    pub titles: Vec<String>,
    pub paths: Vec<String>,
}

impl ServiceMenu {
    /// Pairs titles with paths by position, stopping at the shorter list
    pub fn sections(&self) -> impl Iterator<Item = (&str, &str)> {
        self.titles
            .iter()
            .map(String::as_str)
            .zip(self.paths.iter().map(String::as_str))
    }
}

/// One `<a href>` of a content page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageAnchor {
    pub href: String,
    pub target: Option<String>,
    /// Visible text, whitespace collapsed
    pub text: String,
}

/// References found on a content page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageLinks {
    /// Image `src` values in document order
    pub images: Vec<String>,
    pub anchors: Vec<PageAnchor>,
    /// File name assigned to `pdfname` by the page's scripts
    pub pdf_name: Option<String>,
}

/// Returns the `src` of the `<frame>` named `name`
pub fn find_frame_src(html: &str, name: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("frame[src], iframe[src]").ok()?;

    document
        .select(&selector)
        .find(|frame| frame.value().attr("name") == Some(name))
        .and_then(|frame| frame.value().attr("src"))
        .map(|src| src.trim().to_string())
        .filter(|src| !src.is_empty())
}

/// Extracts the display model from the main menu's white `<font>` text
pub fn extract_model(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("font[color]").ok()?;

    document
        .select(&selector)
        .filter(|font| {
            font.value()
                .attr("color")
                .is_some_and(|c| c.trim().eq_ignore_ascii_case("#ffffff"))
        })
        .map(|font| collapse(&font.text().collect::<String>()))
        .find(|text| !text.is_empty())
}

/// Extracts section titles from `<option>` elements and section paths from
/// `LeftMenuList[i] = "..."` script assignments
pub fn extract_menu(html: &str) -> ServiceMenu {
    let document = Html::parse_document(html);
    let mut menu = ServiceMenu::default();

    if let Ok(selector) = Selector::parse("option") {
        menu.titles = document
            .select(&selector)
            .map(|option| collapse(&option.text().collect::<String>()))
            .collect();
    }

    menu.paths = script_lines(&document)
        .iter()
        .filter_map(|line| MENU_ENTRY.captures(line))
        .map(|caps| caps[1].to_string())
        .collect();

    menu
}

/// Extracts images, the first `limit` anchors and the PDF name of a page
pub fn extract_page_links(html: &str, limit: usize) -> PageLinks {
    let document = Html::parse_document(html);
    let mut links = PageLinks::default();

    if let Ok(selector) = Selector::parse("img[src]") {
        links.images = document
            .select(&selector)
            .filter_map(|img| img.value().attr("src"))
            .map(|src| src.trim().to_string())
            .filter(|src| !src.is_empty())
            .collect();
    }

    if let Ok(selector) = Selector::parse("a[href]") {
        links.anchors = document
            .select(&selector)
            .take(limit)
            .filter_map(|a| {
                let href = a.value().attr("href")?.trim().to_string();
                Some(PageAnchor {
                    href,
                    target: a.value().attr("target").map(|t| t.trim().to_string()),
                    text: collapse(&a.text().collect::<String>()),
                })
            })
            .collect();
    }

    links.pdf_name = script_lines(&document)
        .iter()
        .find_map(|line| PDF_NAME.captures(line))
        .map(|caps| caps[1].to_string());

    links
}

/// Trimmed lines of every inline script, in document order
fn script_lines(document: &Html) -> Vec<String> {
    let Ok(selector) = Selector::parse("script") else {
        return Vec::new();
    };

    document
        .select(&selector)
        .flat_map(|script| {
            script
                .text()
                .collect::<String>()
                .lines()
                .map(|line| line.trim().to_string())
                .collect::<Vec<_>>()
        })
        .collect()
}

fn collapse(text: &str) -> String {
    WHITESPACE.replace_all(text.trim(), " ").into_owned()
}
