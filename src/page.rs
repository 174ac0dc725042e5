// src/page.rs
//! DOM-access layer.
//!
//! A `PageSnapshot` is a serialized copy of the chat page taken at one scroll
//! position. It is the only thing the capture code reads; the snapshot is
//! never mutated. Geometry and computed style are not part of static HTML,
//! so they come through the `Layout` seam. `StaticLayout` reads what the
//! snapshot dumper recorded (`data-offset-top`, inline styles) and falls back
//! to document order.

use std::collections::HashMap;
use std::marker::PhantomData;

use ego_tree::NodeId;
use scraper::{ElementRef, Html};

use crate::config::consts::{ELEMENT_PITCH_PX, OFFSET_ATTR, SCROLL_TOP_ATTR};
use crate::core::html::{self, ancestors};
use crate::error::{Error, Result};

pub struct PageSnapshot {
    html: Html,
    url: Option<String>,
    scroll_top: f64,
}

impl PageSnapshot {
    pub fn parse(source: &str) -> Self {
        let html = Html::parse_document(source);
        let url = find_page_url(&html);
        let scroll_top = find_scroll_top(&html);
        Self { html, url, scroll_top }
    }

    /// Caller-supplied URL wins over the one found in the markup.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_scroll_top(mut self, scroll_top: f64) -> Self {
        self.scroll_top = scroll_top;
        self
    }

    pub fn document(&self) -> &Html {
        &self.html
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    pub fn scroll_top(&self) -> f64 {
        self.scroll_top
    }

    /// `document.title`, whitespace-collapsed.
    pub fn title(&self) -> Option<String> {
        html::first_text(&self.html, "title")
    }

    pub fn layout(&self) -> StaticLayout<'_> {
        StaticLayout::new(self)
    }
}

fn find_page_url(doc: &Html) -> Option<String> {
    for (selector, attr) in [
        (r#"link[rel="canonical"]"#, "href"),
        (r#"meta[property="og:url"]"#, "content"),
    ] {
        let Ok(sel) = html::compile(selector) else { continue };
        if let Some(v) = doc.select(&sel).next().and_then(|e| e.value().attr(attr)) {
            let v = v.trim();
            if !v.is_empty() {
                return Some(s!(v));
            }
        }
    }
    None
}

fn find_scroll_top(doc: &Html) -> f64 {
    let root = doc.root_element();
    let body = html::compile("body").ok().and_then(|sel| doc.select(&sel).next());
    std::iter::once(root)
        .chain(body)
        .filter_map(|e| e.value().attr(SCROLL_TOP_ATTR))
        .find_map(|v| v.trim().parse::<f64>().ok().filter(|n| n.is_finite()))
        .unwrap_or(0.0)
}

/* ---------------- layout ---------------- */

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Alignment {
    Start,
    /// Right-aligned text or a flex row justified to the end.
    End,
}

/// Geometry and computed-style source for elements of one snapshot.
pub trait Layout {
    /// Absolute vertical offset (page scroll + viewport top) in pixels.
    fn vertical_offset(&self, el: ElementRef<'_>) -> Result<f64>;
    fn alignment(&self, el: ElementRef<'_>) -> Alignment;
}

pub struct StaticLayout<'a> {
    /// Preorder position of every element, keyed by node id.
    order: HashMap<NodeId, usize>,
    scroll_top: f64,
    _doc: PhantomData<&'a Html>,
}

impl<'a> StaticLayout<'a> {
    pub fn new(snapshot: &'a PageSnapshot) -> Self {
        let order = snapshot
            .html
            .root_element()
            .descendants()
            .filter_map(ElementRef::wrap)
            .enumerate()
            .map(|(i, e)| (e.id(), i))
            .collect();
        Self { order, scroll_top: snapshot.scroll_top, _doc: PhantomData }
    }

    fn preorder_index(&self, el: ElementRef<'_>) -> Option<usize> {
        self.order.get(&el.id()).copied()
    }
}

impl Layout for StaticLayout<'_> {
    fn vertical_offset(&self, el: ElementRef<'_>) -> Result<f64> {
        if let Some(raw) = el.value().attr(OFFSET_ATTR) {
            return match raw.trim().parse::<f64>() {
                Ok(top) if top.is_finite() => Ok(self.scroll_top + top),
                _ => Err(Error::Element(format!("bad {OFFSET_ATTR} value `{raw}`"))),
            };
        }
        let idx = self
            .preorder_index(el)
            .ok_or_else(|| Error::Element(s!("element is not attached to this snapshot")))?;
        Ok(self.scroll_top + idx as f64 * ELEMENT_PITCH_PX)
    }

    fn alignment(&self, el: ElementRef<'_>) -> Alignment {
        let own = style_declarations(el);
        if own.iter().any(|(k, v)| k == "justify-content" && v == "flex-end") {
            return Alignment::End;
        }
        if el.value().attr("align").is_some_and(|a| a.eq_ignore_ascii_case("right")) {
            return Alignment::End;
        }
        // text-align is inherited: first declaration up the chain decides
        for node in std::iter::once(el).chain(ancestors(el)) {
            let decls = if node.id() == el.id() { own.clone() } else { style_declarations(node) };
            if let Some((_, v)) = decls.iter().find(|(k, _)| k == "text-align") {
                return if v == "right" || v == "end" { Alignment::End } else { Alignment::Start };
            }
        }
        Alignment::Start
    }
}

/// Inline `style` declarations as lowercase `(property, value)` pairs.
fn style_declarations(el: ElementRef<'_>) -> Vec<(String, String)> {
    let Some(style) = el.value().attr("style") else { return Vec::new() };
    style
        .split(';')
        .filter_map(|decl| {
            let (k, v) = decl.split_once(':')?;
            let v = v.trim().trim_end_matches("!important").trim();
            Some((k.trim().to_ascii_lowercase(), v.to_ascii_lowercase()))
        })
        .collect()
}
