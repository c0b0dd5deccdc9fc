use crate::site::IMAGE_DIR;
use std::path::{Path, PathBuf};

/// Directory layout of one mirrored site
///
/// ```text
/// <output root>/<site id>/
///     cache/      fetched sources by site-relative path
///     docs/       Markdown tree, images/ and pdf/
///     mkdocs.yml
/// ```
#[derive(Debug, Clone)]
pub struct Layout {
    root: PathBuf,
}

impl Layout {
    pub fn new(output_root: &Path, site_id: &str) -> Self {
        Self {
            root: output_root.join(site_id),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn cache(&self) -> PathBuf {
        self.root.join("cache")
    }

    pub fn docs(&self) -> PathBuf {
        self.root.join("docs")
    }

    pub fn images(&self) -> PathBuf {
        self.docs().join(IMAGE_DIR)
    }

    pub fn manifest(&self) -> PathBuf {
        self.root.join("mkdocs.yml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_paths() {
        let layout = Layout::new(Path::new("/tmp/out"), "SITE1");
        assert_eq!(layout.root(), Path::new("/tmp/out/SITE1"));
        assert_eq!(layout.cache(), Path::new("/tmp/out/SITE1/cache"));
        assert_eq!(layout.images(), Path::new("/tmp/out/SITE1/docs/images"));
        assert_eq!(layout.manifest(), Path::new("/tmp/out/SITE1/mkdocs.yml"));
    }
}
