//! Parsed component catalog and the index-document parser.
//!
//! The design system publishes its catalog as one markdown-like index
//! (`llms.txt`): level-2/level-3 headings name categories, dash bullets link
//! to component pages. Parsing is a single line-oriented pass with a
//! current-category register; anything that does not look like a heading or a
//! component link is skipped without complaint, so a malformed document can
//! never abort a request.

use regex::Regex;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::LazyLock;

use crate::resolver::normalize;

/// Category assigned to components listed before any heading.
pub const GENERAL_CATEGORY: &str = "General";

/// URL segment marking a row as a component page link.
const COMPONENT_MARKER: &str = "componente";

static LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\]]+)\]\(([^)]+)\)").unwrap());

/// Documented format availability, inferred from the shape of a component's
/// URL. These are heuristic signals only; nothing fetches the target page to
/// verify them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Capabilities {
    pub has_html_code: bool,
    pub has_nunjucks_code: bool,
    pub has_angular_code: bool,
    pub has_props: bool,
}

impl Capabilities {
    fn from_url(url: &str) -> Self {
        let url = url.to_lowercase();
        Self {
            // "codigo" pages hold plain markup unless they are the Angular
            // variant of the component.
            has_html_code: url.contains("codigo") && !url.contains("angular"),
            has_nunjucks_code: url.contains("nunjucks"),
            has_angular_code: url.contains("angular"),
            has_props: url.contains("propiedades") || url.contains("props"),
        }
    }
}

/// One catalog entry, as listed in the index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Component {
    /// Display name exactly as written in the index.
    pub name: String,
    /// Lower-cased display name; the lookup key. Not globally unique across
    /// a document, so the first occurrence wins in the key map.
    pub key: String,
    /// Absolute or base-relative URL of the component's detail page.
    pub url: String,
    /// Name of the owning category, or [`GENERAL_CATEGORY`].
    pub category: String,
    pub capabilities: Capabilities,
}

/// A category heading with the components listed under it, in document order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Category {
    pub name: String,
    /// Boilerplate derived from the name; the index itself carries none.
    pub description: String,
    pub components: Vec<Component>,
}

/// The parsed, queryable catalog: categories in document order plus a
/// first-seen component key map.
#[derive(Debug, Default)]
pub struct Catalog {
    categories: Vec<Category>,
    components: HashMap<String, Component>,
    key_order: Vec<String>,
}

impl Catalog {
    pub fn get(&self, key: &str) -> Option<&Component> {
        self.components.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.components.contains_key(key)
    }

    /// Component keys in first-seen document order.
    pub fn keys_in_order(&self) -> impl Iterator<Item = &str> + '_ {
        self.key_order.iter().map(String::as_str)
    }

    /// Components in first-seen document order.
    pub fn components_in_order(&self) -> impl Iterator<Item = &Component> + '_ {
        self.key_order.iter().filter_map(|key| self.components.get(key))
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// Category whose name matches the query (normalized, contains in either
    /// direction), in document order.
    pub fn find_category(&self, query: &str) -> Option<&Category> {
        let needle = normalize(query);
        if needle.is_empty() {
            return None;
        }
        self.categories.iter().find(|category| {
            let name = normalize(&category.name);
            name.contains(&needle) || needle.contains(&name)
        })
    }

    /// All rows belonging to one component: the bare key plus any
    /// `"<key> (qualifier)"` rows, e.g. `botón` and `botón (angular)`.
    pub fn rows_for(&self, key: &str) -> Vec<&Component> {
        let base = base_key(key);
        let qualified = format!("{base} (");
        self.components_in_order()
            .filter(|c| c.key == base || c.key.starts_with(&qualified))
            .collect()
    }

    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    pub fn category_count(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    fn category_mut(&mut self, name: &str) -> Option<&mut Category> {
        self.categories.iter_mut().find(|c| c.name == name)
    }
}

/// Strip a trailing `" (qualifier)"` from a catalog key.
pub fn base_key(key: &str) -> &str {
    match key.rfind(" (") {
        Some(idx) if key.ends_with(')') => &key[..idx],
        _ => key,
    }
}

/// Parse the raw index document into a catalog.
///
/// Never fails: malformed rows are skipped, an empty document yields an
/// empty catalog.
pub fn parse_index(text: &str) -> Catalog {
    let mut catalog = Catalog::default();
    let mut current_category: Option<String> = None;

    for raw_line in text.lines() {
        let line = raw_line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(name) = heading_text(line, "## ") {
            enter_category(&mut catalog, &mut current_category, name, section_description);
        } else if let Some(name) = heading_text(line, "### ") {
            // Some index revisions use the deeper heading level for the
            // same grouping purpose.
            enter_category(&mut catalog, &mut current_category, name, subsection_description);
        } else if line.starts_with("- ") {
            // Covers both top-level bullets and the indented continuation
            // form, since indentation was trimmed above.
            parse_component_row(&mut catalog, current_category.as_deref(), line);
        }
        // Anything else is noise: ignored.
    }

    catalog
}

fn heading_text<'a>(line: &'a str, marker: &str) -> Option<&'a str> {
    let rest = line.strip_prefix(marker)?.trim();
    (!rest.is_empty()).then_some(rest)
}

fn enter_category(
    catalog: &mut Catalog,
    current: &mut Option<String>,
    name: &str,
    describe: fn(&str) -> String,
) {
    *current = Some(name.to_string());
    // First heading wins: a repeated name only switches the register.
    if catalog.category_mut(name).is_none() {
        catalog.categories.push(Category {
            name: name.to_string(),
            description: describe(name),
            components: Vec::new(),
        });
    }
}

fn parse_component_row(catalog: &mut Catalog, current_category: Option<&str>, line: &str) {
    let Some(captures) = LINK_RE.captures(line) else {
        return; // not a link row, skip silently
    };
    let name = captures[1].trim().to_string();
    let url = captures[2].trim().to_string();
    if name.is_empty() || !url.to_lowercase().contains(COMPONENT_MARKER) {
        return;
    }

    let component = Component {
        key: name.to_lowercase(),
        category: current_category.unwrap_or(GENERAL_CATEGORY).to_string(),
        capabilities: Capabilities::from_url(&url),
        name,
        url,
    };

    // First occurrence wins in the key map; later rows with the same key
    // still land in their category's list.
    if !catalog.components.contains_key(&component.key) {
        catalog.key_order.push(component.key.clone());
        catalog
            .components
            .insert(component.key.clone(), component.clone());
    }
    if let Some(name) = current_category {
        if let Some(category) = catalog.category_mut(name) {
            category.components.push(component);
        }
    }
}

fn section_description(name: &str) -> String {
    format!("Componentes de {name} del sistema de diseño Agora.")
}

fn subsection_description(name: &str) -> String {
    format!("Sección {name} del catálogo de componentes.")
}
