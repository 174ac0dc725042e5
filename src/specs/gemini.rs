// src/specs/gemini.rs
//! Gemini (gemini.google.com and g.co/gemini share links).
//!
//! Messages are individual query/response blocks rather than turns. Author
//! markers are class fragments (`user-query`, `model-response`, ...). The
//! conversation title sits in the top bar's conversation-actions button.

use super::{SelectorConfig, common_markers};
use crate::capture::ConversationMetadata;
use crate::config::consts::DEFAULT_USER_NAME;
use crate::core::html;
use crate::page::PageSnapshot;

pub const DEFAULT_TITLE: &str = "Gemini Conversation";
pub const DEFAULT_ASSISTANT: &str = "Gemini";

const TITLE_SELECTOR: &str = "#app-root > main > top-bar-actions > div > div.center-section > div > conversation-actions > button > span";
const BOT_NAME_SELECTOR: &str = ".bot-name-text";

pub fn selectors() -> SelectorConfig {
    let (user_markers, assistant_markers) = common_markers();
    SelectorConfig {
        container_selector: s!("main, .content-container, infinite-scroller"),
        message_selector: s!(
            ".user-query-container, .response-container, .model-response-container, model-response, message-content"
        ),
        user_message_selector: s!(
            r#"[data-message-author-role="user"], .user-query-container, user-query, .user-query, .query-content, .user-query-bubble-with-background"#
        ),
        assistant_message_selector: s!(
            r#"[data-message-author-role="model"], .response-container, .model-response-container, model-response, .model-response, message-content"#
        ),
        content_selector: s!(".message-content, .query-text, .markdown, p.query-text-line"),
        attachment_selector: s!(
            r#"img[src*="googleusercontent"], img[src^="blob:"], .file-preview-container img, img[data-test-id="uploaded-img"], .uploaded-image img, [class*="image"] img"#
        ),
        user_markers,
        assistant_markers,
    }
}

pub fn extract_metadata(page: &PageSnapshot) -> ConversationMetadata {
    let doc = page.document();
    ConversationMetadata {
        title: html::first_text(doc, TITLE_SELECTOR).unwrap_or_else(|| s!(DEFAULT_TITLE)),
        user_name: s!(DEFAULT_USER_NAME),
        assistant_name: html::first_text(doc, BOT_NAME_SELECTOR)
            .unwrap_or_else(|| s!(DEFAULT_ASSISTANT)),
    }
}
