// src/capture/resolve.rs
// Selector resolver: configured message selector first, then the generic fallback
// patterns. The adopted pattern is returned in a resolved config that the caller
// threads into the next call; nothing shared is mutated here.

use scraper::{ElementRef, Html};

use crate::config::consts::{FALLBACK_MIN_MATCHES, FALLBACK_SELECTORS};
use crate::core::html;
use crate::log::DebugLog;
use crate::specs::SelectorConfig;

pub struct Resolution<'a> {
    pub elements: Vec<ElementRef<'a>>,
    /// Config to use from now on (message selector replaced when discovery adopted one).
    pub config: SelectorConfig,
    /// The fallback pattern adopted by this call, if any.
    pub learned: Option<&'static str>,
}

impl Resolution<'_> {
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

fn select_all<'a>(doc: &'a Html, selector: &str, log: &DebugLog) -> Vec<ElementRef<'a>> {
    match html::compile(selector) {
        Ok(sel) => doc.select(&sel).collect(),
        Err(e) => {
            logw!(log, "{e}");
            Vec::new()
        }
    }
}

/// Find the message elements of `doc`.
///
/// An empty result is "nothing visible yet", not an error: discovery simply runs
/// again on the next call.
pub fn resolve<'a>(doc: &'a Html, config: &SelectorConfig, log: &DebugLog) -> Resolution<'a> {
    let elements = select_all(doc, &config.message_selector, log);
    if !elements.is_empty() {
        return Resolution { elements, config: config.clone(), learned: None };
    }

    logd!(log, "message selector `{}` matched nothing; trying fallbacks", config.message_selector);
    for pattern in FALLBACK_SELECTORS {
        let found = select_all(doc, pattern, log);
        if found.len() > FALLBACK_MIN_MATCHES {
            logf!(log, "learned message selector `{pattern}` ({} matches)", found.len());
            let mut learned = config.clone();
            learned.message_selector = s!(*pattern);
            return Resolution { elements: found, config: learned, learned: Some(*pattern) };
        }
    }

    Resolution { elements: Vec::new(), config: config.clone(), learned: None }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::specs::Platform;

    fn turns(n: usize) -> String {
        let mut body = s!("<body><main>");
        for i in 0..n {
            body.push_str(&format!(r#"<div data-testid="chat-turn-{i}"><p>msg {i}</p></div>"#));
        }
        body.push_str("</main></body>");
        body
    }

    #[test]
    fn adopts_first_plausible_fallback_once() {
        let doc = Html::parse_document(&turns(8));
        let log = DebugLog::new();
        let cfg = Platform::ChatGpt.default_selectors();

        let first = resolve(&doc, &cfg, &log);
        assert_eq!(first.elements.len(), 8);
        assert_eq!(first.learned, Some(r#"[data-testid*="turn"]"#));
        assert_eq!(first.config.message_selector, r#"[data-testid*="turn"]"#);
        assert_eq!(first.config.content_selector, cfg.content_selector);

        let again = resolve(&doc, &first.config, &log);
        assert_eq!(again.learned, None);
        assert_eq!(again.elements.len(), 8);
        let ids = |r: &Resolution<'_>| r.elements.iter().map(|e| e.id()).collect::<Vec<_>>();
        assert_eq!(ids(&first), ids(&again));
    }

    #[test]
    fn threshold_is_strictly_more_than_five() {
        let doc = Html::parse_document(&turns(5));
        let log = DebugLog::new();
        let r = resolve(&doc, &Platform::ChatGpt.default_selectors(), &log);
        assert!(r.is_empty());
        assert_eq!(r.learned, None);
    }

    #[test]
    fn invalid_selector_is_a_miss_not_a_panic() {
        let doc = Html::parse_document(&turns(6));
        let log = DebugLog::new();
        let mut cfg = Platform::Gemini.default_selectors();
        cfg.message_selector = s!("div[[");
        let r = resolve(&doc, &cfg, &log);
        assert_eq!(r.elements.len(), 6);
        assert!(log.render().contains("invalid selector"));
    }

    #[test]
    fn configured_selector_wins_when_it_matches() {
        let doc = Html::parse_document(
            r#"<body><article data-testid="conversation-turn-1">a</article></body>"#,
        );
        let log = DebugLog::new();
        let r = resolve(&doc, &Platform::ChatGpt.default_selectors(), &log);
        assert_eq!(r.elements.len(), 1);
        assert!(r.learned.is_none());
        assert!(log.is_empty());
    }
}
