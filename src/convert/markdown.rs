use crate::convert::{KeepLinks, LinkPolicy};
use crate::table::TableBuilder;
use crate::{ConvertError, ConvertResult};
use ego_tree::NodeId;
use regex::Regex;
use scraper::{ElementRef, Html, Node};
use std::collections::HashMap;
use std::sync::LazyLock;

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("WHITESPACE: hardcoded regex is valid"));

static EXTRA_NEWLINES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\n(?:[ \t]*\n)+").expect("EXTRA_NEWLINES: hardcoded regex is valid")
});

static CELL_BREAKS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ \t]*\n\s*").expect("CELL_BREAKS: hardcoded regex is valid"));

/// Converts one HTML page to Markdown
///
/// A converter holds per-page state (named anchors waiting for their target
/// element, list nesting, whether the walk is inside a table cell), so use a
/// fresh one for every page.
pub struct MarkdownConverter<'p, P: LinkPolicy + ?Sized> {
    policy: &'p P,
    cell_depth: usize,
    /// One entry per open list, `true` for ordered lists
    lists: Vec<bool>,
    pending_anchors: HashMap<NodeId, Vec<String>>,
}

impl<'p, P: LinkPolicy + ?Sized> MarkdownConverter<'p, P> {
    pub fn new(policy: &'p P) -> Self {
        Self {
            policy,
            cell_depth: 0,
            lists: Vec::new(),
            pending_anchors: HashMap::new(),
        }
    }

    /// Converts a complete HTML document
    ///
    /// # Returns
    ///
    /// * `Ok(String)` - The Markdown body
    /// * `Err(ConvertError::UnresolvedLink)` - A link target is not mapped yet
    /// * `Err(ConvertError::UnsupportedStructure)` - Nested data tables or
    ///   anchors without `href` and `name`
    pub fn convert(&mut self, html: &str) -> ConvertResult<String> {
        let document = Html::parse_document(html);
        let body = self.convert_children(document.root_element())?;
        Ok(tidy(&body))
    }

    fn convert_children(&mut self, element: ElementRef<'_>) -> ConvertResult<String> {
        let mut out = self.take_anchors(element.id());

        for child in element.children() {
            match child.value() {
                Node::Text(text) => {
                    let text = WHITESPACE.replace_all(text, " ");
                    // Inline runs never open a line with a space
                    if out.ends_with('\n') {
                        out.push_str(text.trim_start());
                    } else {
                        out.push_str(&text);
                    }
                }
                Node::Element(_) => {
                    if let Some(child) = ElementRef::wrap(child) {
                        out.push_str(&self.convert_element(child)?);
                    }
                }
                _ => {}
            }
        }

        Ok(out)
    }

    fn convert_element(&mut self, element: ElementRef<'_>) -> ConvertResult<String> {
        let name = element.value().name();

        let converted = match name {
            "script" | "style" | "noscript" | "title" | "meta" | "link" => String::new(),
            "p" | "div" => block(&self.convert_children(element)?),
            "br" => "  \n".to_string(),
            "hr" => "\n\n---\n\n".to_string(),
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                let level = usize::from(name.as_bytes()[1] - b'0');
                let content = self.convert_children(element)?;
                format!("\n\n{} {}\n\n", "#".repeat(level), content.trim())
            }
            "b" | "strong" => emphasis(&self.convert_children(element)?, "**"),
            "i" | "em" => emphasis(&self.convert_children(element)?, "*"),
            "ul" => self.convert_list(element, false)?,
            "ol" => self.convert_list(element, true)?,
            "li" => self.convert_list_item(element)?,
            "dd" => self.convert_children(element)?.trim().to_string(),
            "img" => self.convert_image(element),
            "a" => self.convert_anchor(element)?,
            "table" => self.convert_table(element)?,
            _ => self.convert_children(element)?,
        };

        // Elements that never walk their children still receive relocated anchors
        let anchors = self.take_anchors(element.id());
        if anchors.is_empty() {
            Ok(converted)
        } else {
            Ok(anchors + &converted)
        }
    }

    fn take_anchors(&mut self, id: NodeId) -> String {
        self.pending_anchors
            .remove(&id)
            .map(|names| names.iter().map(|n| anchor_tag(n)).collect())
            .unwrap_or_default()
    }

    fn convert_list(&mut self, list: ElementRef<'_>, ordered: bool) -> ConvertResult<String> {
        self.lists.push(ordered);

        let mut items = self.take_anchors(list.id());
        for child in list.children().filter_map(ElementRef::wrap) {
            items.push_str(&self.convert_element(child)?);
        }

        self.lists.pop();
        Ok(format!("\n\n{}\n\n", items.trim_matches('\n')))
    }

    fn convert_list_item(&mut self, item: ElementRef<'_>) -> ConvertResult<String> {
        let depth = self.lists.len().saturating_sub(1);
        let bullet = if self.lists.last() == Some(&true) {
            "1."
        } else {
            "-"
        };
        let content = self.convert_children(item)?;
        Ok(format!(
            "\n{}{} {}\n",
            "    ".repeat(depth),
            bullet,
            content.trim()
        ))
    }

    fn convert_image(&self, image: ElementRef<'_>) -> String {
        let alt = image.value().attr("alt").unwrap_or("").trim();
        match image.value().attr("src").map(str::trim) {
            Some(src) if !src.is_empty() => {
                format!("![{}]({})", alt, self.policy.rewrite_src(src))
            }
            _ => String::new(),
        }
    }

    fn convert_anchor(&mut self, anchor: ElementRef<'_>) -> ConvertResult<String> {
        let attrs = anchor.value();

        if let Some(href) = attrs.attr("href").map(str::trim).filter(|h| !h.is_empty()) {
            let text = self.convert_children(anchor)?;
            return Ok(match self.policy.rewrite_href(href)? {
                Some(target) => format!("[{}]({})", text.trim(), target),
                None => text,
            });
        }

        let Some(name) = attrs.attr("name").map(str::trim).filter(|n| !n.is_empty()) else {
            return Err(ConvertError::UnsupportedStructure(
                "anchor without href or name".to_string(),
            ));
        };

        if has_content(anchor) {
            let text = self.convert_children(anchor)?;
            return Ok(anchor_tag(name) + &text);
        }

        // Attach to the first following element that shows something
        for sibling in anchor.next_siblings().filter_map(ElementRef::wrap) {
            if has_content(sibling) {
                self.pending_anchors
                    .entry(sibling.id())
                    .or_default()
                    .push(name.to_string());
                return Ok(String::new());
            }
        }

        Ok(format!("[](){{: id=\"{}\"}}", escape_attr(name)))
    }

    fn convert_table(&mut self, table: ElementRef<'_>) -> ConvertResult<String> {
        if self.cell_depth > 0 {
            return self.flatten_nested_table(table);
        }

        let mut builder = TableBuilder::new();
        let mut anchors = String::new();

        for row in table_rows(table) {
            anchors.push_str(&self.take_anchors(row.id()));

            for cell in row.children().filter_map(ElementRef::wrap) {
                if !is_cell(cell) {
                    continue;
                }
                self.cell_depth += 1;
                let text = self.convert_children(cell);
                self.cell_depth -= 1;
                let text = text?;
                builder.convert_cell(&cell, &CELL_BREAKS.replace_all(&text, "\n"));
            }

            builder.end_row();
        }

        if builder.is_empty() {
            return Ok(anchors);
        }

        Ok(format!("{}\n\n{}\n\n", anchors, builder.render()))
    }

    /// A table inside a cell is only accepted as a single-cell wrapper
    fn flatten_nested_table(&mut self, table: ElementRef<'_>) -> ConvertResult<String> {
        let mut cells = table
            .descendants()
            .filter_map(ElementRef::wrap)
            .filter(|e| is_cell(*e));

        match (cells.next(), cells.next()) {
            (None, _) => Ok(String::new()),
            (Some(cell), None) => self.convert_children(cell),
            (Some(_), Some(_)) => Err(ConvertError::UnsupportedStructure(
                "nested table".to_string(),
            )),
        }
    }
}

/// Renders the first table of an HTML fragment, links left untouched
///
/// # Example
///
/// ```
/// use wsm_mirror::convert::render_table_html;
///
/// let text = render_table_html("<table><tr><td>A</td><td>B</td></tr></table>").unwrap();
/// assert_eq!(text, "+---+---+\n| A | B |\n+---+---+");
/// ```
pub fn render_table_html(html: &str) -> ConvertResult<String> {
    let fragment = Html::parse_fragment(html);
    let table = fragment
        .root_element()
        .descendants()
        .filter_map(ElementRef::wrap)
        .find(|e| e.value().name() == "table");

    match table {
        Some(table) => {
            let mut converter = MarkdownConverter::new(&KeepLinks);
            Ok(converter
                .convert_table(table)?
                .trim_matches('\n')
                .to_string())
        }
        None => Ok(String::new()),
    }
}

/// Rows of a table, looking through `thead`, `tbody` and `tfoot`
fn table_rows<'a>(table: ElementRef<'a>) -> Vec<ElementRef<'a>> {
    let mut rows = Vec::new();

    for child in table.children().filter_map(ElementRef::wrap) {
        match child.value().name() {
            "tr" => rows.push(child),
            "thead" | "tbody" | "tfoot" => rows.extend(
                child
                    .children()
                    .filter_map(ElementRef::wrap)
                    .filter(|e| e.value().name() == "tr"),
            ),
            _ => {}
        }
    }

    rows
}

fn is_cell(element: ElementRef<'_>) -> bool {
    matches!(element.value().name(), "td" | "th")
}

/// True if the element has visible text or is or contains an image
fn has_content(element: ElementRef<'_>) -> bool {
    element.text().any(|t| !t.trim().is_empty())
        || element
            .descendants()
            .any(|n| n.value().as_element().is_some_and(|e| e.name() == "img"))
}

fn anchor_tag(name: &str) -> String {
    format!("<a name=\"{}\"></a>", escape_attr(name))
}

/// Escapes a value for a double-quoted attribute
fn escape_attr(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '"' => escaped.push_str("&quot;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

fn block(content: &str) -> String {
    format!("\n\n{}\n\n", content.trim())
}

fn emphasis(content: &str, mark: &str) -> String {
    let inner = content.trim();
    if inner.is_empty() {
        return content.to_string();
    }

    let lead = if content.starts_with(char::is_whitespace) { " " } else { "" };
    let trail = if content.ends_with(char::is_whitespace) { " " } else { "" };
    format!("{}{}{}{}{}", lead, mark, inner, mark, trail)
}

fn tidy(text: &str) -> String {
    EXTRA_NEWLINES.replace_all(text, "\n\n").trim().to_string()
}
