//! MkDocs configuration for the mirrored site

use crate::site::navigation::{NavNode, NavigationTree};
use crate::site::titles::display_name;
use serde::Serialize;
use serde_yaml::{Mapping, Value};

const MARKDOWN_EXTENSIONS: &[&str] = &["sane_lists", "attr_list", "grids"];
const THEME: &str = "terminal";
const THEME_FEATURES: &[&str] = &["navigation.side.indexes"];

#[derive(Debug, Serialize)]
struct Manifest {
    markdown_extensions: Vec<&'static str>,
    site_name: String,
    nav: Vec<Value>,
    theme: Theme,
}

#[derive(Debug, Serialize)]
struct Theme {
    name: &'static str,
    features: Vec<&'static str>,
}

/// Renders `mkdocs.yml` for the run
///
/// Groups list their landing page first as a bare path, followed by their
/// children in insertion order. Failed locations are left out.
pub fn render_manifest(
    site_name: &str,
    model: &str,
    site_id: &str,
    nav: &NavigationTree,
) -> Result<String, serde_yaml::Error> {
    let manifest = Manifest {
        markdown_extensions: MARKDOWN_EXTENSIONS.to_vec(),
        site_name: format!("{} // {} ({})", site_name, model, site_id),
        nav: nav_entries(nav, nav.root()),
        theme: Theme {
            name: THEME,
            features: THEME_FEATURES.to_vec(),
        },
    };

    serde_yaml::to_string(&manifest)
}

fn nav_entries(nav: &NavigationTree, node: &NavNode) -> Vec<Value> {
    let mut entries = Vec::with_capacity(node.children.len());

    for (key, child) in &node.children {
        let location = child
            .location
            .as_ref()
            .filter(|location| !nav.is_failed(location));

        let value = if child.is_group() {
            let mut items = Vec::with_capacity(child.children.len() + 1);
            if let Some(landing) = location {
                items.push(Value::String(landing.clone()));
            }
            items.extend(nav_entries(nav, child));
            if items.is_empty() {
                continue;
            }
            Value::Sequence(items)
        } else {
            match location {
                Some(location) => Value::String(location.clone()),
                None => continue,
            }
        };

        let mut entry = Mapping::new();
        entry.insert(Value::String(display_name(key)), value);
        entries.push(Value::Mapping(entry));
    }

    entries
}
