// src/capture/normalize.rs
// Content normalizer: reduce a matched message element to
//  - sanitized inner HTML (interactive chrome removed), kept for Markdown conversion
//  - normalized plain text, used for fingerprinting and emptiness checks.
// The page is never touched; the sanitized copy is rebuilt from a read-only walk.

use ego_tree::NodeRef;
use scraper::{ElementRef, Node, Selector};

use crate::config::consts::JUNK_SELECTOR;
use crate::core::html::{self, escape_attr, escape_text, is_block, is_hidden_container, is_script_url, is_void};
use crate::core::sanitize::normalize_ws;
use crate::error::Result;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SanitizedContent {
    pub html: String,
    pub text: String,
}

impl SanitizedContent {
    pub fn is_blank(&self) -> bool {
        self.text.is_empty()
    }
}

/// Whitespace runs to one space, trimmed. The only text transform applied before hashing.
pub fn normalize_text(raw: &str) -> String {
    normalize_ws(raw)
}

pub struct Normalizer {
    content: Option<Selector>,
    junk: Selector,
}

impl Normalizer {
    /// An empty content selector disables narrowing.
    pub fn new(content_selector: &str) -> Result<Self> {
        let content = match content_selector.trim() {
            "" => None,
            sel => Some(html::compile(sel)?),
        };
        Ok(Self { content, junk: html::compile(JUNK_SELECTOR)? })
    }

    /// The real content node inside a message wrapper, or the element itself.
    pub fn content_root<'a>(&self, el: ElementRef<'a>) -> ElementRef<'a> {
        self.content
            .as_ref()
            .and_then(|sel| el.select(sel).next())
            .unwrap_or(el)
    }

    pub fn sanitize(&self, el: ElementRef<'_>) -> SanitizedContent {
        let root = self.content_root(el);
        let mut out = Walk::default();
        for child in root.children() {
            self.walk(child, &mut out);
        }
        SanitizedContent { html: out.html, text: normalize_text(&out.text) }
    }

    fn is_junk(&self, el: ElementRef<'_>) -> bool {
        is_hidden_container(el.value().name()) || self.junk.matches(&el)
    }

    fn walk(&self, node: NodeRef<'_, Node>, out: &mut Walk) {
        match node.value() {
            Node::Text(text) => {
                out.html.push_str(&escape_text(text));
                out.text.push_str(text);
            }
            Node::Element(_) => {
                let Some(el) = ElementRef::wrap(node) else { return };
                if self.is_junk(el) {
                    return;
                }
                let tag = el.value().name();
                let block = is_block(tag);

                out.html.push('<');
                out.html.push_str(tag);
                for (name, value) in el.value().attrs().filter(|&(n, v)| keep_attr(n, v)) {
                    out.html.push(' ');
                    out.html.push_str(name);
                    out.html.push_str("=\"");
                    out.html.push_str(&escape_attr(value));
                    out.html.push('"');
                }
                out.html.push('>');

                if tag == "br" {
                    out.text.push('\n');
                }
                if is_void(tag) {
                    return;
                }
                if block {
                    out.text.push('\n');
                }
                for child in el.children() {
                    self.walk(child, out);
                }
                if block {
                    out.text.push('\n');
                }
                out.html.push_str("</");
                out.html.push_str(tag);
                out.html.push('>');
            }
            _ => {}
        }
    }
}

/// Event handlers and script URLs never reach the sanitized copy.
fn keep_attr(name: &str, value: &str) -> bool {
    let name = name.to_ascii_lowercase();
    if name.starts_with("on") {
        return false;
    }
    !(URL_ATTRS.contains(&name.as_str()) && is_script_url(value))
}

const URL_ATTRS: &[&str] = &["href", "src", "action", "formaction", "xlink:href", "poster"];

#[derive(Default)]
struct Walk {
    html: String,
    text: String,
}
