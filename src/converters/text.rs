// src/converters/text.rs
use crate::utils::error::ConvertError;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{node::Node, ElementRef, Html};
use std::path::Path;

// --- Regex Patterns (Lazy Static) ---
static INLINE_WHITESPACE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("Failed to compile INLINE_WHITESPACE_RE"));
static BLANK_LINES_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n[ \t]*(?:\n[ \t]*)+").expect("Failed to compile BLANK_LINES_RE"));
static TRAILING_SPACE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)[ \t]+$").expect("Failed to compile TRAILING_SPACE_RE"));

// Elements whose content never belongs in the text output
const SKIPPED_ELEMENTS: &[&str] = &["script", "style", "noscript", "head", "title", "ix:header"];

/// Converts a PDF, HTML or plain-text document into markdown-flavoured text.
pub fn convert_to_text(input: &Path) -> Result<String, ConvertError> {
    let extension = input
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .unwrap_or_default();

    tracing::info!("Converting {} to text", input.display());

    let text = match extension.as_str() {
        "pdf" => pdf_extract::extract_text(input).map_err(|e| {
            ConvertError::Conversion(format!("cannot extract text from {}: {}", input.display(), e))
        })?,
        "htm" | "html" | "xhtml" => html_to_markdown(&read_to_string(input)?),
        "txt" | "md" | "markdown" => read_to_string(input)?,
        other => {
            return Err(ConvertError::Conversion(format!(
                "unsupported document type {:?} for {}",
                other,
                input.display()
            )))
        }
    };

    Ok(normalize(&text))
}

fn read_to_string(input: &Path) -> Result<String, ConvertError> {
    let bytes = std::fs::read(input).map_err(|e| {
        ConvertError::Conversion(format!("cannot read {}: {}", input.display(), e))
    })?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Renders the visible content of an HTML document as markdown.
pub fn html_to_markdown(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut out = String::new();
    render_children(document.root_element(), &mut out);
    normalize(&out)
}

fn render_children(element: ElementRef, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => push_inline(out, text),
            Node::Element(_) => {
                if let Some(child) = ElementRef::wrap(child) {
                    render_element(child, out);
                }
            }
            _ => {}
        }
    }
}

fn render_element(element: ElementRef, out: &mut String) {
    let el = element.value();
    let name = el.name();

    if SKIPPED_ELEMENTS.contains(&name) || is_hidden(el.attr("style")) {
        return;
    }

    match name {
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
            let level = name[1..].parse::<usize>().unwrap_or(1);
            out.push_str("\n\n");
            out.push_str(&"#".repeat(level));
            out.push(' ');
            render_children(element, out);
            out.push_str("\n\n");
        }
        "br" => out.push('\n'),
        "hr" => out.push_str("\n\n---\n\n"),
        "li" => {
            out.push_str("\n- ");
            render_children(element, out);
        }
        "tr" => {
            let cells: Vec<String> = element
                .children()
                .filter_map(ElementRef::wrap)
                .filter(|cell| matches!(cell.value().name(), "td" | "th"))
                .map(|cell| {
                    let mut text = String::new();
                    render_children(cell, &mut text);
                    collapse_inline(&text)
                })
                .filter(|cell| !cell.is_empty())
                .collect();
            if !cells.is_empty() {
                out.push_str("\n| ");
                out.push_str(&cells.join(" | "));
                out.push_str(" |");
            }
        }
        "table" => {
            out.push_str("\n\n");
            render_children(element, out);
            out.push_str("\n\n");
        }
        "b" | "strong" => wrap_inline(element, out, "**"),
        "i" | "em" => wrap_inline(element, out, "*"),
        "p" | "div" | "section" | "article" | "ul" | "ol" | "blockquote" | "pre" => {
            out.push_str("\n\n");
            render_children(element, out);
            out.push_str("\n\n");
        }
        _ => render_children(element, out),
    }
}

fn wrap_inline(element: ElementRef, out: &mut String, marker: &str) {
    let mut inner = String::new();
    render_children(element, &mut inner);
    let inner = collapse_inline(&inner);
    if inner.is_empty() {
        return;
    }
    if !out.is_empty() && !out.ends_with(char::is_whitespace) {
        out.push(' ');
    }
    out.push_str(marker);
    out.push_str(&inner);
    out.push_str(marker);
}

fn push_inline(out: &mut String, text: &str) {
    let collapsed = INLINE_WHITESPACE_RE.replace_all(text, " ");
    if collapsed.trim().is_empty() {
        if !out.is_empty() && !out.ends_with(char::is_whitespace) {
            out.push(' ');
        }
        return;
    }
    if out.ends_with(char::is_whitespace) || out.is_empty() {
        out.push_str(collapsed.trim_start());
    } else {
        out.push_str(&collapsed);
    }
}

fn collapse_inline(text: &str) -> String {
    INLINE_WHITESPACE_RE.replace_all(text, " ").trim().to_string()
}

// Inline XBRL keeps its hidden facts in `display:none` blocks
fn is_hidden(style: Option<&str>) -> bool {
    style
        .map(|s| s.to_ascii_lowercase().replace(' ', "").contains("display:none"))
        .unwrap_or(false)
}

fn normalize(text: &str) -> String {
    let text = text.replace("\r\n", "\n").replace('\u{a0}', " ");
    let text = TRAILING_SPACE_RE.replace_all(&text, "");
    let text = BLANK_LINES_RE.replace_all(&text, "\n\n");
    text.trim().to_string()
}
