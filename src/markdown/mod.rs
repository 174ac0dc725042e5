// src/markdown/mod.rs
//! HTML → Markdown.
//!
//! A small turndown-style engine: the fragment is walked depth-first, each
//! element's children are converted first, then the first matching rule turns
//! `(content, node)` into Markdown. Rules added later are checked first; the
//! base rules in `base` answer for everything no rule claims.
//!
//! Conversion never fails as a whole. A rule that errors is replaced by the
//! node's plain text and a warning in the debug log.
pub mod base;
pub mod rules;

use scraper::{ElementRef, Html, Node};

use crate::core::html::{is_hidden_container, text_content};
use crate::core::sanitize::{collapse_blank_lines, normalize_ws, trim_line_ends};
use crate::error::Result;
use crate::log::DebugLog;

pub trait Rule {
    fn name(&self) -> &'static str;
    fn matches(&self, node: ElementRef<'_>) -> bool;
    /// `content` is the already-converted children of `node`.
    fn replace(&self, content: &str, node: ElementRef<'_>) -> Result<String>;
}

#[derive(Clone, Copy, Default)]
struct Ctx {
    /// Inside `<pre>`: whitespace is kept verbatim.
    pre: bool,
    /// Inside `<code>` or `<pre>`: no Markdown escaping.
    code: bool,
}

pub struct Converter {
    rules: Vec<Box<dyn Rule>>,
}

impl Default for Converter {
    fn default() -> Self {
        Self::new()
    }
}

impl Converter {
    /// Base rules plus the chat rules (code blocks, inline code, tables, images, links).
    pub fn new() -> Self {
        Self::with_base_url(None)
    }

    /// Like `new`, resolving relative image sources against `base_url`.
    pub fn with_base_url(base_url: Option<&str>) -> Self {
        let mut c = Self::basic();
        c.add_rule(Box::new(rules::CodeBlock))
            .add_rule(Box::new(rules::InlineCode))
            .add_rule(Box::new(rules::Table))
            .add_rule(Box::new(rules::Image::new(base_url)))
            .add_rule(Box::new(rules::Link));
        c
    }

    /// Base rules only.
    pub fn basic() -> Self {
        Self { rules: Vec::new() }
    }

    /// Takes precedence over every rule added before it.
    pub fn add_rule(&mut self, rule: Box<dyn Rule>) -> &mut Self {
        self.rules.insert(0, rule);
        self
    }

    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    pub fn convert(&self, fragment: &str) -> String {
        self.run(fragment, None)
    }

    /// `convert`, reporting rule failures to `log`.
    pub fn convert_logged(&self, fragment: &str, log: &DebugLog) -> String {
        self.run(fragment, Some(log))
    }

    fn run(&self, fragment: &str, log: Option<&DebugLog>) -> String {
        let doc = Html::parse_fragment(fragment);
        let raw = self.children(doc.root_element(), Ctx::default(), log);
        s!(collapse_blank_lines(&trim_line_ends(&raw)).trim())
    }

    fn children(&self, el: ElementRef<'_>, ctx: Ctx, log: Option<&DebugLog>) -> String {
        let mut out = String::new();
        for child in el.children() {
            match child.value() {
                Node::Text(text) => push_text(&mut out, text, ctx),
                Node::Element(_) => {
                    if let Some(child) = ElementRef::wrap(child) {
                        let md = self.node(child, ctx, log);
                        out.push_str(&md);
                    }
                }
                _ => {}
            }
        }
        out
    }

    fn node(&self, el: ElementRef<'_>, ctx: Ctx, log: Option<&DebugLog>) -> String {
        let tag = el.value().name();
        if is_hidden_container(tag) {
            return s!();
        }
        let inner = Ctx {
            pre: ctx.pre || tag == "pre",
            code: ctx.code || tag == "pre" || tag == "code",
        };
        let content = self.children(el, inner, log);

        for rule in &self.rules {
            if !rule.matches(el) {
                continue;
            }
            return match rule.replace(&content, el) {
                Ok(md) => md,
                Err(e) => {
                    if let Some(log) = log {
                        logw!(log, "markdown rule `{}` fell back to text: {e}", rule.name());
                    }
                    escape(&normalize_ws(&text_content(el)), true)
                }
            };
        }
        base::replace(el, &content)
    }
}

fn push_text(out: &mut String, text: &str, ctx: Ctx) {
    if ctx.pre {
        out.push_str(text);
        return;
    }
    let mut collapsed = String::with_capacity(text.len());
    let mut prev_ws = false;
    for ch in text.chars() {
        if ch.is_whitespace() {
            if !prev_ws {
                collapsed.push(' ');
            }
            prev_ws = true;
        } else {
            collapsed.push(ch);
            prev_ws = false;
        }
    }
    let line_start = out.is_empty() || out.ends_with('\n');
    let collapsed = if line_start { collapsed.trim_start() } else { collapsed.as_str() };
    if ctx.code {
        out.push_str(collapsed);
    } else {
        out.push_str(&escape(collapsed, line_start));
    }
}

/// Backslash-escape Markdown syntax in plain text. Block markers only count at a line start.
pub fn escape(text: &str, line_start: bool) -> String {
    let mut out = String::with_capacity(text.len() + 8);
    if line_start {
        let marker_end = block_marker_len(text);
        if marker_end > 0 {
            let (head, _) = text.split_at(marker_end);
            let last = head.len() - head.chars().last().map(char::len_utf8).unwrap_or(0);
            out.push_str(&head[..last]);
            out.push('\\');
            out.push_str(&head[last..]);
            return out + &escape_inline(&text[marker_end..]);
        }
    }
    out.push_str(&escape_inline(text));
    out
}

fn escape_inline(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        if matches!(ch, '\\' | '*' | '_' | '`' | '[' | ']') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

/// Byte length of a leading block marker whose last char needs a backslash, else 0.
/// `# ` / `- ` / `+ ` / `> ` / `1. ` style prefixes.
fn block_marker_len(text: &str) -> usize {
    let bytes = text.as_bytes();
    match bytes.first() {
        Some(b'>') => 1,
        Some(b'-') | Some(b'+') if bytes.get(1) == Some(&b' ') => 1,
        Some(b'#') => {
            let hashes = bytes.iter().take_while(|b| **b == b'#').count();
            if hashes <= 6 && bytes.get(hashes) == Some(&b' ') { hashes } else { 0 }
        }
        Some(b) if b.is_ascii_digit() => {
            let digits = bytes.iter().take_while(|b| b.is_ascii_digit()).count();
            if bytes.get(digits) == Some(&b'.') && bytes.get(digits + 1) == Some(&b' ') {
                digits + 1
            } else {
                0
            }
        }
        _ => 0,
    }
}
