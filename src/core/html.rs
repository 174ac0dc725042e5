// src/core/html.rs
// Small helpers over `scraper` for the DOM-access layer.
// All matching is done through compiled CSS selectors; nothing here mutates a document.

use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::error::{Error, Result};

/// Compile a CSS selector, mapping parse failures to `Error::Selector`.
pub fn compile(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| Error::Selector {
        selector: s!(selector),
        reason: e.to_string(),
    })
}

/// Strict ancestors of `el`, nearest first.
pub fn ancestors<'a>(el: ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> {
    el.ancestors().filter_map(ElementRef::wrap)
}

/// `Element.closest()`: the element itself or its nearest ancestor matching `sel`.
pub fn closest<'a>(el: ElementRef<'a>, sel: &Selector) -> Option<ElementRef<'a>> {
    std::iter::once(el).chain(ancestors(el)).find(|e| sel.matches(e))
}

/// `textContent`: every descendant text node, concatenated verbatim.
pub fn text_content(el: ElementRef<'_>) -> String {
    el.text().collect()
}

/// Whitespace-collapsed text of the first element matching `selector`.
pub fn first_text(doc: &Html, selector: &str) -> Option<String> {
    let sel = compile(selector).ok()?;
    let el = doc.select(&sel).next()?;
    let txt = super::sanitize::normalize_ws(&text_content(el));
    if txt.is_empty() { None } else { Some(txt) }
}

pub fn attr<'a>(el: ElementRef<'a>, name: &str) -> Option<&'a str> {
    el.value().attr(name)
}

/// Class attribute and tag name, lowercased, for substring heuristics.
pub fn class_string(el: ElementRef<'_>) -> String {
    el.value().attr("class").unwrap_or("").to_ascii_lowercase()
}

pub fn tag_name(el: ElementRef<'_>) -> String {
    el.value().name().to_ascii_lowercase()
}

pub fn escape_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            _ => out.push(ch),
        }
    }
    out
}

pub fn escape_attr(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Resolve `src` the way `img.src` would, against the page URL when known.
/// Without a usable base the source is returned as written.
pub fn resolve_url(base: Option<&str>, src: &str) -> String {
    match base.and_then(|b| Url::parse(b).ok()).and_then(|b| b.join(src).ok()) {
        Some(url) => url.into(),
        None => s!(src),
    }
}

/// `javascript:` URL, matched the way browsers read the scheme:
/// case-insensitive, ignoring whitespace and control characters.
pub fn is_script_url(value: &str) -> bool {
    const SCHEME: &str = "javascript:";
    let scheme: String = value
        .chars()
        .filter(|c| !c.is_ascii_whitespace() && !c.is_control())
        .take(SCHEME.len())
        .collect();
    scheme.eq_ignore_ascii_case(SCHEME)
}

/// HTML void elements (no closing tag when serialized).
pub fn is_void(tag: &str) -> bool {
    matches!(
        tag,
        "area" | "base" | "br" | "col" | "embed" | "hr" | "img" | "input"
            | "link" | "meta" | "source" | "track" | "wbr"
    )
}

/// Elements whose text never counts as visible content.
pub fn is_hidden_container(tag: &str) -> bool {
    matches!(tag, "script" | "style" | "noscript" | "template")
}

/// Block-level elements: `innerText` separates their contents from neighbours.
pub fn is_block(tag: &str) -> bool {
    matches!(
        tag,
        "address" | "article" | "aside" | "blockquote" | "dd" | "details" | "div"
            | "dl" | "dt" | "fieldset" | "figcaption" | "figure" | "footer" | "form"
            | "h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "header" | "hr" | "li"
            | "main" | "nav" | "ol" | "p" | "pre" | "section" | "summary" | "table"
            | "tbody" | "td" | "tfoot" | "th" | "thead" | "tr" | "ul"
    )
}
