// src/specs/chatgpt.rs
//! ChatGPT (chatgpt.com, including `/share/` links).
//!
//! - Messages: one `conversation-turn-N` article per turn.
//! - Author: `data-message-author-role` on the turn's inner message div; shared
//!   links carry `data-turn` on the article instead.
//! - Title: `document.title` minus the ` - ChatGPT` suffix.
//! - Assistant name: the screen-reader heading inside assistant turns
//!   ("ChatGPT said:"), which reflects custom GPT names.

use super::{SelectorConfig, common_markers};
use crate::capture::ConversationMetadata;
use crate::config::consts::DEFAULT_USER_NAME;
use crate::core::html;
use crate::page::PageSnapshot;

pub const DEFAULT_TITLE: &str = "ChatGPT Conversation";
pub const DEFAULT_ASSISTANT: &str = "ChatGPT";

const TITLE_SUFFIX: &str = " - ChatGPT";
const ASSISTANT_HEADING: &str = r#"h6.sr-only, [data-turn="assistant"] h6"#;
const SAID_SUFFIXES: &[&str] = &[" said:", " disse:", " dijo:"];

pub fn selectors() -> SelectorConfig {
    let (user_markers, assistant_markers) = common_markers();
    SelectorConfig {
        container_selector: s!(r#"main, [data-scroll-root="true"]"#),
        message_selector: s!(
            r#"article[data-testid^="conversation-turn-"], [data-testid^="conversation-turn-"]"#
        ),
        user_message_selector: s!(r#"[data-message-author-role="user"]"#),
        assistant_message_selector: s!(r#"[data-message-author-role="assistant"]"#),
        content_selector: s!(".markdown, .whitespace-pre-wrap, .prose"),
        attachment_selector: s!(
            r#"img[alt="Imagem carregada"], img[alt="Uploaded image"], img[src*="oaiusercontent.com"], .grid-cols-2 img, [data-message-author-role="user"] img"#
        ),
        user_markers,
        assistant_markers,
    }
}

pub fn extract_metadata(page: &PageSnapshot) -> ConversationMetadata {
    let title = page
        .title()
        .map(|t| s!(t.trim_end_matches(TITLE_SUFFIX).trim()))
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| s!(DEFAULT_TITLE));

    let assistant_name = html::first_text(page.document(), ASSISTANT_HEADING)
        .map(|raw| strip_said_suffix(&raw))
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| s!(DEFAULT_ASSISTANT));

    ConversationMetadata { title, user_name: s!(DEFAULT_USER_NAME), assistant_name }
}

fn strip_said_suffix(raw: &str) -> String {
    let mut name = raw.trim();
    for suffix in SAID_SUFFIXES {
        if let Some(stripped) = name.strip_suffix(suffix) {
            name = stripped;
            break;
        }
    }
    s!(name.trim())
}
