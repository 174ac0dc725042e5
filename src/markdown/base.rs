// src/markdown/base.rs
// Base conversion for elements no rule claims: ATX headings, `-` bullets,
// `*` emphasis, block spacing for everything block-level.

use scraper::ElementRef;

use crate::core::html::{is_block, text_content};
use crate::core::sanitize::collapse_blank_lines;

fn block(content: &str) -> String {
    join!("\n\n", content.trim(), "\n\n")
}

fn wrap(delim: &str, content: &str) -> String {
    if content.trim().is_empty() {
        return s!();
    }
    join!(delim, content, delim)
}

fn parent_tag<'a>(el: ElementRef<'a>) -> Option<&'a str> {
    el.parent().and_then(ElementRef::wrap).map(|p| p.value().name())
}

fn next_element_sibling(el: ElementRef<'_>) -> bool {
    el.next_siblings().any(|n| n.value().is_element())
}

pub fn replace(el: ElementRef<'_>, content: &str) -> String {
    let tag = el.value().name();
    match tag {
        "p" => block(content),
        "br" => s!("  \n"),
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
            let level = usize::from(tag.as_bytes()[1] - b'0');
            let text = content.trim().replace('\n', " ");
            join!("\n\n", &"#".repeat(level), " ", &text, "\n\n")
        }
        "blockquote" => {
            let quoted = collapse_blank_lines(content.trim())
                .lines()
                .map(|l| join!("> ", l))
                .collect::<Vec<_>>()
                .join("\n");
            join!("\n\n", &quoted, "\n\n")
        }
        "ul" | "ol" => {
            let is_last_in_li = parent_tag(el) == Some("li") && !next_element_sibling(el);
            if is_last_in_li { join!("\n", content) } else { join!("\n\n", content, "\n\n") }
        }
        "li" => list_item(el, content),
        "hr" => s!("\n\n---\n\n"),
        "strong" | "b" => wrap("**", content),
        "em" | "i" => wrap("*", content),
        "del" | "s" | "strike" => wrap("~~", content),
        "pre" => {
            let code = text_content(el);
            join!("\n\n```\n", code.trim_matches('\n'), "\n```\n\n")
        }
        _ if is_block(tag) => block(content),
        _ => s!(content),
    }
}

fn list_item(el: ElementRef<'_>, content: &str) -> String {
    let prefix = match el.parent().and_then(ElementRef::wrap) {
        Some(list) if list.value().name() == "ol" => {
            let start = list.value().attr("start").and_then(|s| s.trim().parse::<usize>().ok()).unwrap_or(1);
            let index = el
                .prev_siblings()
                .filter_map(ElementRef::wrap)
                .filter(|e| e.value().name() == "li")
                .count();
            format!("{}. ", start + index)
        }
        _ => s!("- "),
    };
    let body = content.trim_matches('\n').trim_start().replace('\n', "\n    ");
    join!(&prefix, &body, "\n")
}

#[cfg(test)]
mod tests {
    use crate::markdown::Converter;

    fn md(html: &str) -> String {
        Converter::basic().convert(html)
    }

    #[test]
    fn headings_and_emphasis() {
        assert_eq!(md("<h2>Plan</h2><p>a <strong>bold</strong> and <em>soft</em> <del>old</del></p>"),
            "## Plan\n\na **bold** and *soft* ~~old~~");
        assert_eq!(md("<p><b> </b>x</p>"), "x");
    }

    #[test]
    fn nested_lists() {
        let out = md("<ul><li>one<ul><li>inner</li></ul></li><li>two</li></ul><ol start=\"3\"><li>c</li><li>d</li></ol>");
        assert_eq!(out, "- one\n    - inner\n- two\n\n3. c\n4. d");
    }

    #[test]
    fn quotes_breaks_and_rules() {
        assert_eq!(md("<blockquote><p>quoted</p><p>twice</p></blockquote>"), "> quoted\n>\n> twice");
        assert_eq!(md("<p>line<br>next</p><hr><p>after</p>"), "line  \nnext\n\n---\n\nafter");
    }

    #[test]
    fn bare_pre_is_fenced_verbatim() {
        assert_eq!(md("<pre>a  *b*\n  c</pre>"), "```\na  *b*\n  c\n```");
    }
}
