// tests/capture_session.rs
use chat_export::capture::{Author, StepClock};
use chat_export::config::SessionOptions;
use chat_export::core::Fingerprint;
use chat_export::runner::{SnapshotFrames, StopReason, run_scroll_loop};
use chat_export::specs::{Platform, SelectorTable};
use chat_export::{PageSnapshot, Session};

const CHATGPT_URL: &str = "https://chatgpt.com/c/6f1e";

fn chatgpt_turn(i: usize, role: &str, text: &str) -> String {
    format!(
        r#"<article data-testid="conversation-turn-{i}"><div data-message-author-role="{role}"><div class="whitespace-pre-wrap">{text}</div></div></article>"#
    )
}

fn chatgpt_page(turns: &[String]) -> PageSnapshot {
    let html = format!(
        "<html><head><title>Greetings - ChatGPT</title></head><body><main>{}</main></body></html>",
        turns.concat()
    );
    PageSnapshot::parse(&html).with_url(CHATGPT_URL)
}

fn conversation(n: usize) -> Vec<String> {
    (0..n)
        .map(|i| {
            let role = if i % 2 == 0 { "user" } else { "assistant" };
            chatgpt_turn(i, role, &format!("line number {i}"))
        })
        .collect()
}

#[test]
fn user_message_is_fingerprinted_and_indexed_by_turn() {
    let page = chatgpt_page(&[chatgpt_turn(0, "assistant", "Welcome back"), chatgpt_turn(1, "user", "Hello")]);
    let mut session = Session::new(SelectorTable::builtin());
    assert_eq!(session.start(SessionOptions::default(), &page).unwrap(), 2);

    let hello = session
        .store()
        .messages()
        .iter()
        .find(|m| m.normalized_text == "Hello")
        .unwrap();
    assert_eq!(hello.author, Author::User);
    assert_eq!(hello.fingerprint, Fingerprint::of("Hello"));
    assert_eq!(hello.turn_index, Some(1));
}

#[test]
fn repeated_capture_on_unchanged_page_adds_nothing() {
    let page = chatgpt_page(&conversation(4));
    let mut session = Session::new(SelectorTable::builtin());
    session.start(SessionOptions::default(), &page).unwrap();
    let before: Vec<_> = session.store().messages().iter().map(|m| m.fingerprint.clone()).collect();

    for _ in 0..5 {
        assert_eq!(session.capture_once(&page), 4);
    }
    let after: Vec<_> = session.store().messages().iter().map(|m| m.fingerprint.clone()).collect();
    assert_eq!(before, after);
}

#[test]
fn reset_after_five_messages_starts_fresh() {
    let page = chatgpt_page(&conversation(5));
    let mut session = Session::new(SelectorTable::builtin());
    session.start(SessionOptions::default(), &page).unwrap();
    assert_eq!(session.message_count(), 5);

    session.reset();
    assert_eq!(session.message_count(), 0);
    assert!(session.metadata().title.is_empty());
    assert!(session.metadata().user_name.is_empty());
    assert!(session.metadata().assistant_name.is_empty());

    assert_eq!(session.start(SessionOptions::default(), &page).unwrap(), 5);
    assert_eq!(session.metadata().title, "Greetings");
}

#[test]
fn fallback_selector_is_adopted_and_kept() {
    let body: String = (0..8)
        .map(|i| format!(r#"<div data-testid="chat-turn-{i}"><p>reply {i}</p></div>"#))
        .collect();
    let page = PageSnapshot::parse(&format!("<html><body><main>{body}</main></body></html>"))
        .with_url(CHATGPT_URL);

    let mut session = Session::new(SelectorTable::builtin());
    assert_eq!(session.start(SessionOptions::default(), &page).unwrap(), 8);
    assert_eq!(session.config().unwrap().message_selector, r#"[data-testid*="turn"]"#);

    assert_eq!(session.capture_once(&page), 8);
    assert_eq!(session.config().unwrap().message_selector, r#"[data-testid*="turn"]"#);
    assert!(session.log().render().contains("message selector now"));
}

#[test]
fn loading_frames_accumulate_in_conversation_order() {
    let all = conversation(6);
    // earlier turns stay mounted while later ones load in
    let frames = [chatgpt_page(&all[0..4]), chatgpt_page(&all[0..6])];
    let mut session = Session::new(SelectorTable::builtin())
        .with_platform(Platform::ChatGpt)
        .with_clock(Box::new(StepClock::new(1_000, 10)));
    session.start(SessionOptions { auto_scroll: true, ..Default::default() }, &chatgpt_page(&all[0..3])).unwrap();

    let summary = run_scroll_loop(&mut session, &mut SnapshotFrames::new(frames)).unwrap();
    assert_eq!(summary.reason, StopReason::Exhausted);
    assert_eq!(summary.count, 6);

    let bundle = session.stop_and_export(None).unwrap();
    let texts: Vec<_> = bundle.messages.iter().map(|m| m.normalized_text.as_str()).collect();
    assert_eq!(
        texts,
        ["line number 0", "line number 1", "line number 2", "line number 3", "line number 4", "line number 5"]
    );
}
