// src/markdown/rules.rs
// Chat-specific rules: fenced code blocks, inline code, tables, images, links.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Selector};

use super::Rule;
use crate::core::html::{self, text_content};
use crate::core::sanitize::normalize_ws;
use crate::error::{Error, Result};

fn compile(rule: &'static str, css: &str) -> Result<Selector> {
    html::compile(css).map_err(|e| Error::Convert { rule, reason: e.to_string() })
}

fn has_class(el: ElementRef<'_>, names: &[&str]) -> bool {
    el.value().classes().any(|c| names.contains(&c))
}

fn attr_non_empty<'a>(el: ElementRef<'a>, name: &str) -> Option<&'a str> {
    el.value().attr(name).map(str::trim).filter(|v| !v.is_empty())
}

/* ---------------- code blocks ---------------- */

static LANGUAGE_CLASS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"language-(\w+)").unwrap());
static SNIFF: LazyLock<[(Regex, &'static str); 4]> = LazyLock::new(|| {
    [
        (Regex::new(r"^(?:sudo|npm|cd|git|docker|apt)\b").unwrap(), "bash"),
        (Regex::new(r"^(?:import|def|class|if __name__)\b").unwrap(), "python"),
        (Regex::new(r"^(?:const|let|function|export)\b").unwrap(), "javascript"),
        (Regex::new(r"^(?:services|version|image):").unwrap(), "yaml"),
    ]
});

const CODE_CONTAINER_CLASSES: &[&str] = &["code-block", "code-block-wrapper", "code-container"];
const LANGUAGE_LABEL: &str = r#".language-label, [class*="language"]"#;

/// Guess a fence language from the first token of the code.
pub fn sniff_language(code: &str) -> Option<&'static str> {
    let head = code.trim_start();
    SNIFF.iter().find(|(re, _)| re.is_match(head)).map(|(_, lang)| *lang)
}

pub struct CodeBlock;

impl Rule for CodeBlock {
    fn name(&self) -> &'static str {
        "fencedCodeBlock"
    }

    fn matches(&self, node: ElementRef<'_>) -> bool {
        let tag = node.value().name();
        (tag == "pre" && node.descendants().filter_map(ElementRef::wrap).any(|e| e.value().name() == "code"))
            || has_class(node, CODE_CONTAINER_CLASSES)
            || tag == "code-block"
    }

    fn replace(&self, content: &str, node: ElementRef<'_>) -> Result<String> {
        let code_sel = compile(self.name(), "code")?;
        let inner = node.select(&code_sel).next();

        let mut code = inner.map(text_content).unwrap_or_default();
        let mut lang = inner
            .and_then(|c| c.value().attr("class"))
            .and_then(|cls| LANGUAGE_CLASS.captures(cls))
            .map(|caps| s!(&caps[1]))
            .unwrap_or_default();

        if code.is_empty() {
            code = text_content(node);
        }
        if code.is_empty() {
            code = s!(content);
        }

        if lang.is_empty() {
            lang = s!(attr_non_empty(node, "data-language")
                .or_else(|| attr_non_empty(node, "language"))
                .unwrap_or(""));
        }
        if lang.is_empty() {
            let label_sel = compile(self.name(), LANGUAGE_LABEL)?;
            if let Some(label) = node
                .select(&label_sel)
                .find(|e| !matches!(e.value().name(), "code" | "pre"))
            {
                lang = s!(text_content(label).trim());
            }
        }
        if lang.is_empty() {
            lang = s!(sniff_language(&code).unwrap_or(""));
        }

        Ok(format!("\n```{}\n{}\n```\n", lang.trim().to_lowercase(), code.trim()))
    }
}

/* ---------------- inline code ---------------- */

pub struct InlineCode;

impl Rule for InlineCode {
    fn name(&self) -> &'static str {
        "inlineCode"
    }

    fn matches(&self, node: ElementRef<'_>) -> bool {
        node.value().name() == "code"
            && !node
                .parent()
                .and_then(ElementRef::wrap)
                .is_some_and(|p| p.value().name() == "pre")
    }

    fn replace(&self, content: &str, _node: ElementRef<'_>) -> Result<String> {
        Ok(join!("`", content, "`"))
    }
}

/* ---------------- tables ---------------- */

pub struct Table;

impl Rule for Table {
    fn name(&self) -> &'static str {
        "tables"
    }

    fn matches(&self, node: ElementRef<'_>) -> bool {
        node.value().name() == "table"
    }

    fn replace(&self, _content: &str, node: ElementRef<'_>) -> Result<String> {
        let row_sel = compile(self.name(), "tr")?;
        let cell_sel = compile(self.name(), "th, td")?;

        let mut md = s!("\n");
        let mut header_done = false;
        for row in node.select(&row_sel) {
            let cells: Vec<String> = row
                .select(&cell_sel)
                .map(|c| normalize_ws(&text_content(c)).replace('|', "\\|"))
                .collect();
            if cells.is_empty() {
                continue;
            }
            md.push_str(&join!("| ", &cells.join(" | "), " |\n"));
            if !header_done {
                let sep = vec!["---"; cells.len()].join(" | ");
                md.push_str(&join!("| ", &sep, " |\n"));
                header_done = true;
            }
        }
        if !header_done {
            return Ok(s!());
        }
        md.push('\n');
        Ok(md)
    }
}

/* ---------------- images ---------------- */

pub const DEFAULT_ALT: &str = "imagem";

pub struct Image {
    base_url: Option<String>,
}

impl Image {
    pub fn new(base_url: Option<&str>) -> Self {
        Self { base_url: base_url.map(String::from) }
    }
}

impl Rule for Image {
    fn name(&self) -> &'static str {
        "images"
    }

    fn matches(&self, node: ElementRef<'_>) -> bool {
        node.value().name() == "img"
    }

    fn replace(&self, _content: &str, node: ElementRef<'_>) -> Result<String> {
        let alt = attr_non_empty(node, "alt").unwrap_or(DEFAULT_ALT);
        Ok(match attr_non_empty(node, "src") {
            Some(src) => format!("![{alt}]({})", html::resolve_url(self.base_url.as_deref(), src)),
            None => format!("[Imagem: {alt}]"),
        })
    }
}

/* ---------------- links ---------------- */

pub struct Link;

impl Rule for Link {
    fn name(&self) -> &'static str {
        "links"
    }

    fn matches(&self, node: ElementRef<'_>) -> bool {
        node.value().name() == "a" && attr_non_empty(node, "href").is_some()
    }

    fn replace(&self, content: &str, node: ElementRef<'_>) -> Result<String> {
        let href = attr_non_empty(node, "href").unwrap_or_default();
        Ok(match attr_non_empty(node, "title") {
            Some(title) => format!("[{content}]({href} \"{title}\")"),
            None => format!("[{content}]({href})"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markdown::Converter;

    fn md(html: &str) -> String {
        Converter::new().convert(html)
    }

    #[test]
    fn code_block_with_language_class() {
        let out = md(r#"<pre><code class="language-python">print("hi")</code></pre>"#);
        assert_eq!(out, "```python\nprint(\"hi\")\n```");
    }

    #[test]
    fn code_block_language_sources() {
        let attr = md(r#"<div class="code-block" data-language="Rust"><pre><code>fn main() {}</code></pre></div>"#);
        assert_eq!(attr, "```rust\nfn main() {}\n```");

        let label = md(
            r#"<div class="code-container"><span class="language-label"> TypeScript </span><pre><code>let x = 1;</code></pre></div>"#,
        );
        assert_eq!(label, "```typescript\nlet x = 1;\n```");

        let sniffed = md("<pre><code>\n  git status\n</code></pre>");
        assert_eq!(sniffed, "```bash\ngit status\n```");

        let unknown = md("<pre><code>SELECT 1;</code></pre>");
        assert_eq!(unknown, "```\nSELECT 1;\n```");
    }

    #[test]
    fn sniff_needs_a_whole_word() {
        assert_eq!(sniff_language("import os"), Some("python"));
        assert_eq!(sniff_language("services:\n  web:"), Some("yaml"));
        assert_eq!(sniff_language("letter = 1"), None);
        assert_eq!(sniff_language("cdrom"), None);
    }

    #[test]
    fn code_block_keeps_surrounding_text_apart() {
        let out = md(r#"<p>Run:</p><pre><code class="language-bash">ls -la</code></pre><p>Done.</p>"#);
        assert_eq!(out, "Run:\n\n```bash\nls -la\n```\n\nDone.");
    }

    #[test]
    fn inline_code_outside_pre() {
        assert_eq!(md("<p>use <code>cargo_test</code> here</p>"), "use `cargo_test` here");
    }

    #[test]
    fn table_escapes_pipes() {
        let out = md("<table><tr><th>Key</th><th>Value</th></tr><tr><td>a|b</td><td> c </td></tr></table>");
        assert_eq!(out, "| Key | Value |\n| --- | --- |\n| a\\|b | c |");
    }

    #[test]
    fn images_and_placeholders() {
        assert_eq!(md(r#"<img src="https://x/y.png" alt="chart">"#), "![chart](https://x/y.png)");
        assert_eq!(md(r#"<img src="https://x/y.png">"#), "![imagem](https://x/y.png)");
        assert_eq!(md(r#"<img alt="lost">"#), "[Imagem: lost]");
        let rel = Converter::with_base_url(Some("https://chatgpt.com/c/1")).convert(r#"<img src="/f/a.png" alt="a">"#);
        assert_eq!(rel, "![a](https://chatgpt.com/f/a.png)");
    }

    #[test]
    fn links_with_and_without_title() {
        assert_eq!(md(r#"<a href="https://r.io" title="Docs">read</a>"#), r#"[read](https://r.io "Docs")"#);
        assert_eq!(md(r#"<a href="https://r.io">read</a>"#), "[read](https://r.io)");
        assert_eq!(md("<a>bare</a>"), "bare");
    }
}
