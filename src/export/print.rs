// src/export/print.rs
// Printable HTML view of the ordered conversation. A browser's "Print to PDF"
// turns it into the PDF export; the crate only writes the page.

use chrono::NaiveDateTime;

use crate::capture::{Author, CapturedMessage, ConversationMetadata};
use crate::config::consts::DATE_FORMAT;
use crate::core::html::{escape_attr, escape_text, is_script_url};
use crate::specs::Platform;

use super::document::GENERATOR;

const STYLE: &str = r#"
body { font-family: -apple-system, 'Segoe UI', sans-serif; line-height: 1.6; color: #1a1a1a; max-width: 900px; margin: 0 auto; padding: 40px 20px; }
.header { border-bottom: 2px solid #eee; margin-bottom: 30px; padding-bottom: 20px; }
.header h1 { margin: 0 0 10px 0; font-size: 24px; color: #2c3e50; }
.meta { font-size: 13px; color: #666; display: grid; grid-template-columns: repeat(2, 1fr); gap: 5px; }
.message-row { margin-bottom: 25px; padding: 15px; border-radius: 8px; border: 1px solid #eee; break-inside: avoid; }
.message-row.user { background: #f9fafb; border-left: 4px solid #3b82f6; }
.message-row.assistant { background: #fff; border-left: 4px solid #10b981; }
.message-header { display: flex; justify-content: space-between; margin-bottom: 10px; font-size: 14px; border-bottom: 1px solid #efefef; padding-bottom: 5px; }
.msg-index { color: #999; }
.message-content { font-size: 15px; overflow-wrap: break-word; }
pre { background: #f4f4f4; padding: 12px; border-radius: 5px; font-size: 13px; border: 1px solid #ddd; white-space: pre-wrap; }
code { font-family: 'SFMono-Regular', Consolas, Menlo, monospace; background: #f1f1f1; padding: 2px 4px; border-radius: 3px; }
.attachments { margin-top: 15px; display: flex; flex-wrap: wrap; gap: 10px; }
.print-img { max-width: 100%; max-height: 400px; border-radius: 5px; border: 1px solid #eee; }
table { border-collapse: collapse; width: 100%; margin: 15px 0; font-size: 14px; }
th, td { border: 1px solid #ddd; padding: 8px; text-align: left; }
th { background: #f2f2f2; }
.footer-note { text-align: center; font-size: 10px; color: #999; margin-top: 40px; border-top: 1px solid #eee; padding-top: 10px; }
@media print { body { padding: 0; } }
"#;

fn row_class(author: Author) -> &'static str {
    match author {
        Author::User => "user",
        _ => "assistant",
    }
}

pub fn render_print_view(
    ordered: &[CapturedMessage],
    metadata: &ConversationMetadata,
    platform: Platform,
    exported_at: NaiveDateTime,
) -> String {
    let title = escape_text(&metadata.title);
    let mut out = String::with_capacity(4096 + ordered.len() * 512);

    out.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"UTF-8\">\n");
    out.push_str(&format!("<title>{title}</title>\n<style>{STYLE}</style>\n</head>\n<body>\n"));
    out.push_str(&format!("<div class=\"header\">\n<h1>{title}</h1>\n<div class=\"meta\">\n"));
    out.push_str(&format!(
        "<div><strong>Platform:</strong> {}</div>\n",
        platform.name().to_uppercase()
    ));
    out.push_str(&format!("<div><strong>Date:</strong> {}</div>\n", exported_at.format(DATE_FORMAT)));
    out.push_str(&format!("<div><strong>User:</strong> {}</div>\n", escape_text(&metadata.user_name)));
    out.push_str(&format!(
        "<div><strong>Assistant:</strong> {}</div>\n</div>\n</div>\n",
        escape_text(&metadata.assistant_name)
    ));

    out.push_str("<div class=\"messages\">\n");
    for (i, msg) in ordered.iter().enumerate() {
        out.push_str(&format!(
            "<div class=\"message-row {}\">\n<div class=\"message-header\"><strong>{}</strong><span class=\"msg-index\">#{}</span></div>\n",
            row_class(msg.author),
            escape_text(metadata.speaker(msg.author)),
            i + 1
        ));
        // sanitized on capture
        out.push_str("<div class=\"message-content\">\n");
        out.push_str(&msg.sanitized_html);
        if !msg.attachments.is_empty() {
            out.push_str("\n<div class=\"attachments\">");
            for src in msg.attachments.iter().filter(|s| !is_script_url(s)) {
                out.push_str(&format!("<img src=\"{}\" class=\"print-img\">", escape_attr(src)));
            }
            out.push_str("</div>");
        }
        out.push_str("\n</div>\n</div>\n");
    }
    out.push_str("</div>\n");
    out.push_str(&format!("<div class=\"footer-note\">Exported by {GENERATOR}</div>\n</body>\n</html>\n"));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::normalize::Normalizer;
    use crate::core::Fingerprint;
    use scraper::Html;

    fn meta() -> ConversationMetadata {
        ConversationMetadata { title: s!("t"), user_name: s!("You"), assistant_name: s!("ChatGPT") }
    }

    #[test]
    fn hostile_markup_is_inert_in_the_print_view() {
        let doc = Html::parse_document(
            r#"<div id="m"><p onmouseover="steal()">hi <a href="javascript:steal()">there</a></p><img src="pic.png" onerror="steal()"></div>"#,
        );
        let el = doc.select(&crate::core::html::compile("#m").unwrap()).next().unwrap();
        let content = Normalizer::new("").unwrap().sanitize(el);
        let msg = CapturedMessage {
            fingerprint: Fingerprint::of(&content.text),
            sanitized_html: content.html,
            normalized_text: content.text,
            author: Author::Assistant,
            attachments: vec![s!("javascript:steal()"), s!("pic.png")],
            turn_index: None,
            dom_position: 0.0,
            captured_at_millis: 0,
        };
        let at = NaiveDateTime::parse_from_str("2026-01-02 03:04:05", "%Y-%m-%d %H:%M:%S").unwrap();
        let html = render_print_view(&[msg], &meta(), Platform::ChatGpt, at);
        assert!(!html.contains("steal"));
        assert!(html.contains("hi <a>there</a>"));
        assert!(html.contains("<img src=\"pic.png\" class=\"print-img\">"));
    }

    #[test]
    fn rows_carry_author_class_and_escaped_names() {
        let meta = ConversationMetadata {
            title: s!("A <b> test"),
            user_name: s!("You"),
            assistant_name: s!("Gemini"),
        };
        let msg = CapturedMessage {
            fingerprint: Fingerprint::of("x"),
            sanitized_html: s!("<p>x</p>"),
            normalized_text: s!("x"),
            author: Author::User,
            attachments: vec![s!("https://h/a.png?x=1&y=2")],
            turn_index: Some(0),
            dom_position: 0.0,
            captured_at_millis: 0,
        };
        let at = NaiveDateTime::parse_from_str("2026-01-02 03:04:05", "%Y-%m-%d %H:%M:%S").unwrap();
        let html = render_print_view(&[msg], &meta, Platform::Gemini, at);
        assert!(html.contains("<title>A &lt;b&gt; test</title>"));
        assert!(html.contains("<div class=\"message-row user\">"));
        assert!(html.contains("<span class=\"msg-index\">#1</span>"));
        assert!(html.contains("<p>x</p>"));
        assert!(html.contains("src=\"https://h/a.png?x=1&amp;y=2\""));
        assert!(html.contains("02/01/2026 03:04:05"));
    }
}
