// src/config/consts.rs

// Selector discovery
/// A fallback pattern is adopted only when it matches MORE than this many elements.
pub const FALLBACK_MIN_MATCHES: usize = 5;
pub const FALLBACK_SELECTORS: &[&str] = &[
    r#"[data-testid*="turn"]"#,
    "[data-message-author-role]",
    ".message-row",
    r#"article[role="article"]"#,
    ".chat-message",
    ".message-content",
];

// Capture
pub const JUNK_SELECTOR: &str =
    r#"button, svg, .button-group, .footer, .edit-button, [role="button"]"#;
pub const TURN_CONTAINER_SELECTOR: &str =
    r#".conversation-container, share-turn-viewer, [data-testid^="conversation-turn-"]"#;
pub const AUTHOR_ROLE_ATTR: &str = "data-message-author-role";
pub const TURN_ROLE_ATTR: &str = "data-turn";
/// Role attribute values mapped to the user; any other non-empty value is the assistant.
pub const USER_ROLE_VALUES: &[&str] = &["user", "human", "você", "you"];

// Layout
pub const OFFSET_ATTR: &str = "data-offset-top";
pub const SCROLL_TOP_ATTR: &str = "data-scroll-top";
/// Synthetic vertical distance between consecutive elements when no geometry was recorded.
pub const ELEMENT_PITCH_PX: f64 = 24.0;

// Ordering
pub const POSITION_NOISE_PX: f64 = 15.0;

// Scroll loop
pub const IDLE_FRAME_LIMIT: usize = 10;

// Export
pub const DEFAULT_OUT_DIR: &str = "out";
pub const STORE_DIR: &str = ".store";
pub const COUNTER_FILE: &str = "export_counter";
pub const ASSETS_DIR: &str = "assets";
pub const DEFAULT_USER_NAME: &str = "You";
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];
pub const DEFAULT_IMAGE_EXT: &str = "png";
pub const DATE_FORMAT: &str = "%d/%m/%Y %H:%M:%S";
