// src/capture/classify.rs
//! Author classification.
//!
//! The DOM is read once into `AuthorSignals`; the decision itself is an
//! ordered list of named strategies over those signals. First `Some` wins.
//! Every chain ends in `visual_alignment`, which always answers, so a
//! classified element is never `Author::Unknown`.

use scraper::ElementRef;

use crate::config::consts::{AUTHOR_ROLE_ATTR, TURN_ROLE_ATTR, USER_ROLE_VALUES};
use crate::core::html::{self, ancestors, class_string, tag_name};
use crate::page::{Alignment, Layout};
use crate::specs::SelectorConfig;

use super::Author;

/// Everything the strategies look at, extracted from one element.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AuthorSignals {
    /// Author-role attribute on the element or its first descendant carrying one.
    pub role: Option<String>,
    /// Turn-role attribute on the element or its nearest ancestor.
    pub turn_role: Option<String>,
    /// `"<tag> <class>"`, lowercased.
    pub own: String,
    pub matches_user_selector: bool,
    pub matches_assistant_selector: bool,
    /// `"<tag> <class>"` of each ancestor, nearest first.
    pub ancestors: Vec<String>,
    pub alignment: Option<Alignment>,
}

impl AuthorSignals {
    pub fn extract(el: ElementRef<'_>, config: &SelectorConfig, layout: &dyn Layout) -> Self {
        let role = own_or_descendant_attr(el, AUTHOR_ROLE_ATTR);
        let turn_role = std::iter::once(el)
            .chain(ancestors(el))
            .find_map(|e| non_empty(e.value().attr(TURN_ROLE_ATTR)));

        Self {
            role,
            turn_role,
            own: tag_and_class(el),
            matches_user_selector: matches_selector(el, &config.user_message_selector),
            matches_assistant_selector: matches_selector(el, &config.assistant_message_selector),
            ancestors: ancestors(el).map(tag_and_class).collect(),
            alignment: Some(layout.alignment(el)),
        }
    }
}

fn non_empty(v: Option<&str>) -> Option<String> {
    v.map(str::trim).filter(|v| !v.is_empty()).map(|v| v.to_lowercase())
}

fn own_or_descendant_attr(el: ElementRef<'_>, name: &str) -> Option<String> {
    el.descendants()
        .filter_map(ElementRef::wrap)
        .find_map(|e| non_empty(e.value().attr(name)))
}

fn tag_and_class(el: ElementRef<'_>) -> String {
    join!(tag_name(el), " ", class_string(el))
}

// Unparseable or empty selectors never match.
fn matches_selector(el: ElementRef<'_>, selector: &str) -> bool {
    if selector.trim().is_empty() {
        return false;
    }
    html::compile(selector).is_ok_and(|sel| sel.matches(&el))
}

/* ---------------- strategies ---------------- */

pub struct Markers<'a> {
    pub user: &'a [String],
    pub assistant: &'a [String],
}

impl<'a> From<&'a SelectorConfig> for Markers<'a> {
    fn from(cfg: &'a SelectorConfig) -> Self {
        Self { user: &cfg.user_markers, assistant: &cfg.assistant_markers }
    }
}

impl Markers<'_> {
    fn find(&self, haystack: &str) -> Option<Author> {
        let hit = |markers: &[String]| {
            markers.iter().any(|m| !m.is_empty() && haystack.contains(&m.to_lowercase()))
        };
        if hit(self.user) {
            Some(Author::User)
        } else if hit(self.assistant) {
            Some(Author::Assistant)
        } else {
            None
        }
    }
}

pub type Strategy = fn(&AuthorSignals, &Markers<'_>) -> Option<Author>;

/// Evaluation order of the classifier.
pub const STRATEGIES: &[(&str, Strategy)] = &[
    ("role_attribute", role_attribute),
    ("own_markers", own_markers),
    ("ancestor_markers", ancestor_markers),
    ("visual_alignment", visual_alignment),
];

fn role_value(v: &str) -> Author {
    if USER_ROLE_VALUES.contains(&v) { Author::User } else { Author::Assistant }
}

pub fn role_attribute(s: &AuthorSignals, _: &Markers<'_>) -> Option<Author> {
    s.role.as_deref().or(s.turn_role.as_deref()).map(role_value)
}

pub fn own_markers(s: &AuthorSignals, m: &Markers<'_>) -> Option<Author> {
    if let Some(author) = m.find(&s.own) {
        return Some(author);
    }
    match (s.matches_user_selector, s.matches_assistant_selector) {
        (true, false) => Some(Author::User),
        (false, true) => Some(Author::Assistant),
        _ => None,
    }
}

pub fn ancestor_markers(s: &AuthorSignals, m: &Markers<'_>) -> Option<Author> {
    s.ancestors.iter().find_map(|a| m.find(a))
}

pub fn visual_alignment(s: &AuthorSignals, _: &Markers<'_>) -> Option<Author> {
    Some(match s.alignment {
        Some(Alignment::End) => Author::User,
        _ => Author::Assistant,
    })
}

/// Run the strategies in order; returns the author and the name of the strategy that decided.
pub fn classify_signals(signals: &AuthorSignals, markers: &Markers<'_>) -> (Author, &'static str) {
    STRATEGIES
        .iter()
        .find_map(|(name, strategy)| strategy(signals, markers).map(|a| (a, *name)))
        .unwrap_or((Author::Unknown, "none"))
}

pub fn classify(el: ElementRef<'_>, config: &SelectorConfig, layout: &dyn Layout) -> Author {
    let signals = AuthorSignals::extract(el, config, layout);
    classify_signals(&signals, &Markers::from(config)).0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::PageSnapshot;
    use crate::specs::Platform;

    fn markers() -> (Vec<String>, Vec<String>) {
        (vec![s!("user-query")], vec![s!("model-response"), s!("response-container")])
    }

    fn classify_in(html: &str, sel: &str, platform: Platform) -> Author {
        let snap = PageSnapshot::parse(html);
        let el = snap.document().select(&html::compile(sel).unwrap()).next().unwrap();
        classify(el, &platform.default_selectors(), &snap.layout())
    }

    #[test]
    fn role_attribute_values() {
        let (u, a) = markers();
        let m = Markers { user: &u, assistant: &a };
        let sig = |role: &str| AuthorSignals { role: Some(s!(role)), ..Default::default() };
        assert_eq!(role_attribute(&sig("user"), &m), Some(Author::User));
        assert_eq!(role_attribute(&sig("você"), &m), Some(Author::User));
        assert_eq!(role_attribute(&sig("assistant"), &m), Some(Author::Assistant));
        assert_eq!(role_attribute(&sig("model"), &m), Some(Author::Assistant));
        assert_eq!(role_attribute(&AuthorSignals::default(), &m), None);
    }

    #[test]
    fn earlier_signal_beats_later_ones() {
        let (u, a) = markers();
        let m = Markers { user: &u, assistant: &a };
        let sig = AuthorSignals {
            role: Some(s!("assistant")),
            own: s!("div user-query"),
            alignment: Some(Alignment::End),
            ..Default::default()
        };
        assert_eq!(classify_signals(&sig, &m), (Author::Assistant, "role_attribute"));
    }

    #[test]
    fn markers_on_self_then_ancestors() {
        let (u, a) = markers();
        let m = Markers { user: &u, assistant: &a };
        let own = AuthorSignals { own: s!("user-query "), ..Default::default() };
        assert_eq!(classify_signals(&own, &m), (Author::User, "own_markers"));
        let anc = AuthorSignals {
            own: s!("div message-content"),
            ancestors: vec![s!("div inner"), s!("div model-response-container")],
            ..Default::default()
        };
        assert_eq!(classify_signals(&anc, &m), (Author::Assistant, "ancestor_markers"));
    }

    #[test]
    fn alignment_is_the_last_resort() {
        let (u, a) = markers();
        let m = Markers { user: &u, assistant: &a };
        let right = AuthorSignals { alignment: Some(Alignment::End), ..Default::default() };
        assert_eq!(classify_signals(&right, &m), (Author::User, "visual_alignment"));
        assert_eq!(classify_signals(&AuthorSignals::default(), &m).0, Author::Assistant);
    }

    #[test]
    fn reads_descendant_role_and_turn_attr_from_dom() {
        let html = r#"<body>
            <article id="t1" data-testid="conversation-turn-1"><div data-message-author-role="user">Hi</div></article>
            <article id="t2" data-turn="assistant"><div class="markdown">Hello</div></article>
        </body>"#;
        assert_eq!(classify_in(html, "#t1", Platform::ChatGpt), Author::User);
        assert_eq!(classify_in(html, "#t2", Platform::ChatGpt), Author::Assistant);
    }

    #[test]
    fn gemini_tags_and_visual_fallback() {
        let html = r#"<body>
            <user-query><div id="q" class="query-content">Q</div></user-query>
            <div class="chat-message" style="text-align: right"><p id="bubble">right side</p></div>
            <div class="chat-message"><p id="left">left side</p></div>
        </body>"#;
        assert_eq!(classify_in(html, "#q", Platform::Gemini), Author::User);
        assert_eq!(classify_in(html, "#bubble", Platform::Gemini), Author::User);
        assert_eq!(classify_in(html, "#left", Platform::Gemini), Author::Assistant);
    }
}
