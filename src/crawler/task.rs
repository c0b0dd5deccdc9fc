use std::path::Path;
use url::Url;

/// Work item of the shared queue
#[derive(Debug, Clone)]
pub enum Job {
    /// Crawl a section page and everything it links to in-frame
    Crawl { url: Url, breadcrumbs: Vec<String> },
    /// Convert and write one unit
    Convert(ConversionTask),
}

/// One fetched unit waiting to be written out
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionTask {
    pub breadcrumbs: Vec<String>,
    /// Output file name, also the unit's article map key
    pub target_filename: String,
    pub raw_content: Vec<u8>,
    pub retries_remaining: u32,
}

impl ConversionTask {
    pub fn new(
        breadcrumbs: Vec<String>,
        target_filename: impl Into<String>,
        raw_content: Vec<u8>,
        retries_remaining: u32,
    ) -> Self {
        Self {
            breadcrumbs,
            target_filename: target_filename.into(),
            raw_content,
            retries_remaining,
        }
    }

    /// The same task with one retry less, or `None` when the budget is spent
    pub fn deferred(self) -> Option<Self> {
        if self.retries_remaining == 0 {
            return None;
        }
        Some(Self {
            retries_remaining: self.retries_remaining - 1,
            ..self
        })
    }

    pub fn kind(&self) -> UnitKind {
        UnitKind::of(&self.target_filename)
    }
}

/// What a unit is written as, by file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitKind {
    Document,
    Image,
    Pdf,
    Unsupported,
}

impl UnitKind {
    pub fn of(filename: &str) -> Self {
        let ext = Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);

        match ext.as_deref() {
            Some("md") => Self::Document,
            Some("png" | "gif" | "jpg" | "jpeg" | "svg" | "bmp") => Self::Image,
            Some("pdf") => Self::Pdf,
            _ => Self::Unsupported,
        }
    }
}

/// How a fetched source file is named in the output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    /// A crawled page, written as Markdown
    Page,
    /// An image or PDF, copied as is
    Asset,
}

impl Source {
    /// Output file name for the source at site-relative path `local`
    pub fn output_name(self, local: &str) -> String {
        let name = local.rsplit('/').next().unwrap_or(local);
        match self {
            Self::Page => Path::new(name)
                .with_extension("md")
                .to_string_lossy()
                .into_owned(),
            Self::Asset => name.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deferred_counts_down() {
        let task = ConversionTask::new(vec!["S".to_string()], "a.md", b"<p>x</p>".to_vec(), 2);

        let once = task.deferred().unwrap();
        assert_eq!(once.retries_remaining, 1);
        let twice = once.deferred().unwrap();
        assert_eq!(twice.retries_remaining, 0);
        assert_eq!(twice.raw_content, b"<p>x</p>");
        assert!(twice.deferred().is_none());
    }

    #[test]
    fn test_unit_kind() {
        assert_eq!(UnitKind::of("docA.md"), UnitKind::Document);
        assert_eq!(UnitKind::of("pic.PNG"), UnitKind::Image);
        assert_eq!(UnitKind::of("fig.jpeg"), UnitKind::Image);
        assert_eq!(UnitKind::of("manual.pdf"), UnitKind::Pdf);
        assert_eq!(UnitKind::of("movie.swf"), UnitKind::Unsupported);
        assert_eq!(UnitKind::of("README"), UnitKind::Unsupported);
    }

    #[test]
    fn test_output_name() {
        assert_eq!(Source::Page.output_name("sec1/docA.html"), "docA.md");
        assert_eq!(Source::Page.output_name("index.htm"), "index.md");
        assert_eq!(Source::Asset.output_name("img/pic.png"), "pic.png");
        assert_eq!(Source::Asset.output_name("pdf/manual.pdf"), "manual.pdf");
    }
}
