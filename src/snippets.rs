//! Extraction of per-variant code examples from component detail pages.
//!
//! Detail pages are markdown mirrors: each documented variant sits under a
//! `###` heading and carries fenced code blocks, `html` for plain markup and
//! `njk` for the Nunjucks macro form. Extraction is a flat line scan without
//! a markdown AST, matching how tolerant the pages themselves are about
//! structure.

use crate::resolver::normalize;

/// Message returned when rendering finds no usable example.
pub const NO_EXAMPLES_MESSAGE: &str =
    "No code examples were found on the component's documentation page.";

/// Which code buffer of an example block to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeFormat {
    Html,
    Nunjucks,
}

impl CodeFormat {
    fn fence_tag(self) -> &'static str {
        match self {
            CodeFormat::Html => "html",
            CodeFormat::Nunjucks => "njk",
        }
    }
}

/// One titled variant's worth of extracted snippets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExampleBlock {
    pub title: String,
    pub html_code: Option<String>,
    pub nunjucks_code: Option<String>,
}

impl ExampleBlock {
    pub fn code(&self, format: CodeFormat) -> Option<&str> {
        match format {
            CodeFormat::Html => self.html_code.as_deref(),
            CodeFormat::Nunjucks => self.nunjucks_code.as_deref(),
        }
    }

    fn has_code(&self) -> bool {
        self.html_code.is_some() || self.nunjucks_code.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FenceKind {
    Html,
    Nunjucks,
    /// Recognized fence of some other language; consumed but not captured.
    Other,
}

fn classify_fence(tag: &str) -> FenceKind {
    match tag {
        "html" | "htm" => FenceKind::Html,
        "njk" | "nunjucks" | "jinja" | "jinja2" => FenceKind::Nunjucks,
        _ => FenceKind::Other,
    }
}

/// Split a detail page into example blocks, in document order.
///
/// A `###` heading (a trailing `{#anchor}` is dropped) starts a block; the
/// previous block is emitted only if it captured code. Within a block the
/// last fence of each kind wins. Fence lines close whatever buffer is open,
/// re-opening when the line carries a new tag, which keeps pages with missing
/// closing fences from swallowing the rest of the document. An unterminated
/// fence at end of input is committed as-is. Never fails.
pub fn extract_examples(page: &str) -> Vec<ExampleBlock> {
    let mut blocks = Vec::new();
    let mut current: Option<ExampleBlock> = None;
    let mut open_fence: Option<(FenceKind, Vec<String>)> = None;

    for raw_line in page.lines() {
        let trimmed = raw_line.trim_start();

        if trimmed.starts_with("```") {
            let tag = trimmed.trim_matches('`').trim().to_lowercase();
            if let Some((kind, buffer)) = open_fence.take() {
                commit_fence(current.as_mut(), kind, &buffer);
            }
            if !tag.is_empty() {
                open_fence = Some((classify_fence(&tag), Vec::new()));
            }
            // a bare fence with nothing open is stray and ignored
            continue;
        }

        if let Some((_, buffer)) = open_fence.as_mut() {
            buffer.push(raw_line.to_string());
            continue;
        }

        if let Some(title) = example_title(trimmed) {
            flush(&mut blocks, current.take());
            current = Some(ExampleBlock {
                title,
                ..ExampleBlock::default()
            });
        }
        // other lines are prose: ignored
    }

    if let Some((kind, buffer)) = open_fence.take() {
        commit_fence(current.as_mut(), kind, &buffer);
    }
    flush(&mut blocks, current.take());
    blocks
}

/// Render blocks for one target format as display text.
///
/// A variant filter keeps blocks whose normalized title contains the filter
/// or vice versa; when that matches nothing the full set is used instead of
/// reporting emptiness. Blocks without code in the target format are
/// skipped. When nothing survives, [`NO_EXAMPLES_MESSAGE`] is returned.
pub fn render_examples(
    blocks: &[ExampleBlock],
    format: CodeFormat,
    variant: Option<&str>,
) -> String {
    let filtered = filter_by_variant(blocks, variant);

    let rendered: Vec<String> = filtered
        .iter()
        .filter_map(|block| {
            block.code(format).map(|code| {
                format!(
                    "### {}\n\n```{}\n{}\n```",
                    block.title,
                    format.fence_tag(),
                    code
                )
            })
        })
        .collect();

    if rendered.is_empty() {
        NO_EXAMPLES_MESSAGE.to_string()
    } else {
        rendered.join("\n\n")
    }
}

fn filter_by_variant<'a>(
    blocks: &'a [ExampleBlock],
    variant: Option<&str>,
) -> Vec<&'a ExampleBlock> {
    let all: Vec<&ExampleBlock> = blocks.iter().collect();
    let Some(needle) = variant.map(normalize).filter(|v| !v.is_empty()) else {
        return all;
    };
    let matching: Vec<&ExampleBlock> = blocks
        .iter()
        .filter(|block| {
            let title = normalize(&block.title);
            title.contains(&needle) || needle.contains(&title)
        })
        .collect();
    if matching.is_empty() { all } else { matching }
}

fn example_title(trimmed: &str) -> Option<String> {
    let rest = trimmed.strip_prefix("### ")?;
    let rest = match rest.find("{#") {
        Some(idx) => &rest[..idx],
        None => rest,
    };
    let title = rest.trim();
    (!title.is_empty()).then(|| title.to_string())
}

fn commit_fence(current: Option<&mut ExampleBlock>, kind: FenceKind, buffer: &[String]) {
    // Fences outside any block (before the first heading) are discarded.
    let Some(block) = current else { return };
    let code = buffer.join("\n").trim().to_string();
    if code.is_empty() {
        return;
    }
    match kind {
        FenceKind::Html => block.html_code = Some(code),
        FenceKind::Nunjucks => block.nunjucks_code = Some(code),
        FenceKind::Other => {}
    }
}

fn flush(blocks: &mut Vec<ExampleBlock>, block: Option<ExampleBlock>) {
    if let Some(block) = block {
        // a title without code is not an example
        if block.has_code() {
            blocks.push(block);
        }
    }
}
