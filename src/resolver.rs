//! Component name resolution.
//!
//! Catalog keys are Spanish display names; callers ask for components in
//! Spanish or English, with or without diacritics, singular or plural. The
//! resolver bridges the two through a static alias table and a small set of
//! lookup strategies applied in a fixed precedence order.

use serde::Serialize;
use unicode_normalization::{UnicodeNormalization, char::is_combining_mark};

use crate::catalog::Catalog;

/// Canonicalize free text for comparison: lower-case, strip diacritics, trim.
///
/// Idempotent, so already-normalized strings pass through unchanged. Empty
/// input yields an empty string.
pub fn normalize(text: &str) -> String {
    text.nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect::<String>()
        .trim()
        .to_string()
}

/// One alias group: the canonical catalog key plus its known spellings.
pub type AliasGroup = (&'static str, &'static [&'static str]);

/// Known name variants per canonical component key. The first variant of
/// each group is the key itself; groups mix Spanish and English so lookups
/// work in either direction. Never mutated at runtime.
pub const ALIAS_GROUPS: &[AliasGroup] = &[
    ("acordeón", &["acordeón", "acordeon", "acordeones", "accordion", "accordions"]),
    ("alerta", &["alerta", "alertas", "alert", "alerts", "aviso"]),
    ("área de texto", &["área de texto", "area de texto", "textarea", "text area"]),
    ("barra de progreso", &["barra de progreso", "progreso", "progress", "progress bar"]),
    ("botón", &["botón", "boton", "botones", "button", "buttons", "btn"]),
    ("botón de radio", &["botón de radio", "radio", "radio button", "radiobutton"]),
    ("buscador", &["buscador", "búsqueda", "busqueda", "search", "search bar"]),
    ("cabecera", &["cabecera", "encabezado", "header"]),
    ("calendario", &["calendario", "calendar", "datepicker", "date picker", "selector de fecha"]),
    ("campo de texto", &["campo de texto", "campo", "input", "text input", "text field"]),
    ("casilla de verificación", &["casilla de verificación", "casilla", "checkbox", "checkboxes"]),
    ("desplegable", &["desplegable", "desplegables", "select", "dropdown", "combo"]),
    ("enlace", &["enlace", "enlaces", "link", "links"]),
    ("etiqueta", &["etiqueta", "etiquetas", "tag", "chip", "badge"]),
    ("ficha", &["ficha", "fichas", "tarjeta", "card", "cards"]),
    ("formulario", &["formulario", "formularios", "form", "forms"]),
    ("imagen", &["imagen", "imágenes", "imagenes", "image", "img"]),
    ("interruptor", &["interruptor", "switch", "toggle"]),
    ("lista", &["lista", "listas", "listado", "list"]),
    ("mensaje", &["mensaje", "mensajes", "message", "notificación", "notification"]),
    ("menú", &["menú", "menu", "navegación", "nav", "navigation"]),
    ("migas de pan", &["migas de pan", "miga de pan", "migas", "breadcrumb", "breadcrumbs"]),
    ("modal", &["modal", "modales", "diálogo", "dialog", "ventana modal"]),
    ("paginación", &["paginación", "paginacion", "pagination", "paginador"]),
    ("pestañas", &["pestañas", "pestaña", "tab", "tabs"]),
    ("pie de página", &["pie de página", "pie de pagina", "footer"]),
    ("subida de archivos", &["subida de archivos", "adjuntar archivos", "file upload", "upload"]),
    ("tabla", &["tabla", "tablas", "table", "tables"]),
    ("tooltip", &["tooltip", "tooltips", "globo informativo"]),
    ("valoración", &["valoración", "valoracion", "rating", "estrellas"]),
];

/// How a query ended up matching a catalog key. Exposed in search results so
/// callers can tell confident matches from speculative ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    Exact,
    Alias,
    Substring,
}

/// A resolved catalog key together with the strategy that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub key: String,
    pub kind: MatchKind,
}

/// Resolve a free-text component name to a catalog key.
///
/// Strategies in precedence order, first match wins:
/// 1. the normalized query equals a catalog key verbatim;
/// 2. the normalized query is a group's canonical key and the catalog holds
///    that key (or a `"<key> (qualifier)"` row for it);
/// 3. the normalized query is some variant of a group whose canonical key or
///    variants exist as catalog keys, bare keys preferred over qualified
///    `"<key> (qualifier)"` rows;
/// 4. a catalog key whose normalized form contains the query, or vice versa.
///
/// Exact beats alias beats substring so an alias can never shadow a literal
/// catalog entry. Pure function over its inputs.
pub fn resolve(catalog: &Catalog, query: &str) -> Option<Resolution> {
    let needle = normalize(query);
    if needle.is_empty() {
        return None;
    }

    if catalog.contains_key(&needle) {
        return Some(Resolution {
            key: needle,
            kind: MatchKind::Exact,
        });
    }

    if let Some(&(canonical, _)) = group_by_canonical(&needle) {
        if let Some(key) = bare_or_qualified_key(catalog, canonical) {
            return Some(Resolution {
                key,
                kind: MatchKind::Alias,
            });
        }
    }

    if let Some(&(canonical, variants)) = group_by_variant(&needle) {
        let candidates = || std::iter::once(canonical).chain(variants.iter().copied());
        // Bare keys are probed across the whole group before any qualified
        // "<name> (…)" row, so every spelling of a group resolves to the
        // same row whenever a bare key exists.
        for candidate in candidates() {
            if catalog.contains_key(candidate) {
                return Some(Resolution {
                    key: candidate.to_string(),
                    kind: MatchKind::Alias,
                });
            }
        }
        for candidate in candidates() {
            if let Some(key) = qualified_key(catalog, candidate) {
                return Some(Resolution {
                    key,
                    kind: MatchKind::Alias,
                });
            }
        }
    }

    for key in catalog.keys_in_order() {
        let normalized_key = normalize(key);
        if normalized_key.contains(&needle) || needle.contains(&normalized_key) {
            return Some(Resolution {
                key: key.to_string(),
                kind: MatchKind::Substring,
            });
        }
    }

    None
}

/// "Did you mean" candidates for an unresolved query: catalog keys containing
/// the first three characters of the normalized query. Queries shorter than
/// three characters produce nothing, single letters collide with everything.
pub fn suggestions(catalog: &Catalog, query: &str, limit: usize) -> Vec<String> {
    let needle = normalize(query);
    if needle.chars().count() < 3 {
        return Vec::new();
    }
    let anchor: String = needle.chars().take(3).collect();
    catalog
        .keys_in_order()
        .filter(|key| normalize(key).contains(&anchor))
        .take(limit)
        .map(str::to_string)
        .collect()
}

fn group_by_canonical(normalized: &str) -> Option<&'static AliasGroup> {
    ALIAS_GROUPS
        .iter()
        .find(|(canonical, _)| normalize(canonical) == normalized)
}

fn group_by_variant(normalized: &str) -> Option<&'static AliasGroup> {
    ALIAS_GROUPS
        .iter()
        .find(|(_, variants)| variants.iter().any(|v| normalize(v) == normalized))
}

fn bare_or_qualified_key(catalog: &Catalog, base: &str) -> Option<String> {
    if catalog.contains_key(base) {
        return Some(base.to_string());
    }
    qualified_key(catalog, base)
}

/// First catalog key of the form `"<base> (<qualifier>)"`, in catalog order.
fn qualified_key(catalog: &Catalog, base: &str) -> Option<String> {
    let prefix = format!("{base} (");
    catalog
        .keys_in_order()
        .find(|key| key.starts_with(&prefix))
        .map(str::to_string)
}
