// tests/export_files.rs
use std::fs;
use std::io::{Cursor, Read};

use chrono::NaiveDateTime;

use chat_export::config::{ExportOptions, SessionOptions};
use chat_export::export::LocalAssetFetcher;
use chat_export::file::write_bundle;
use chat_export::specs::SelectorTable;
use chat_export::store::load_counter;
use chat_export::{PageSnapshot, Session};

const GEMINI_PAGE: &str = r#"<html><head><title>Gemini</title></head><body>
<div class="conversation-container">
  <div class="user-query-container"><user-query>
    <div class="query-text"><p>Show me a table</p></div>
    <div class="uploaded-image"><img src="shot.png" alt="Uploaded image"></div>
  </user-query></div>
</div>
<div class="conversation-container">
  <model-response><div class="markdown">
    <p>Here it is:</p>
    <table><tr><th>Key</th><th>Value</th></tr><tr><td>a|b</td><td>c</td></tr></table>
    <pre><code class="language-python">print("hi")</code></pre>
  </div></model-response>
</div>
</body></html>"#;

fn at() -> NaiveDateTime {
    NaiveDateTime::parse_from_str("2026-05-06 07:08:09", "%Y-%m-%d %H:%M:%S").unwrap()
}

fn snapshot() -> PageSnapshot {
    PageSnapshot::parse(GEMINI_PAGE).with_url("https://gemini.google.com/app/42")
}

#[test]
fn markdown_zip_and_log_land_in_the_output_directory() {
    let out = tempfile::tempdir().unwrap();
    let mut session = Session::new(SelectorTable::builtin()).with_export_time(at());
    let options = SessionOptions { zip_export: true, pdf_export: true, ..Default::default() };
    assert_eq!(session.start(options, &snapshot()).unwrap(), 2);
    let bundle = session.stop_and_export(None).unwrap();

    let export = ExportOptions::default().with_out_dir(out.path());
    let written = write_bundle(&bundle, &export, &LocalAssetFetcher::new(None), session.log()).unwrap();

    assert_eq!(written.stem, "gemini-1");
    assert_eq!(written.markdown, out.path().join("gemini-1.md"));
    assert!(written.print_html.as_ref().unwrap().is_file());
    assert!(written.debug_log.as_ref().unwrap().ends_with("gemini-1-log.txt"));
    assert_eq!(load_counter(out.path()), 1);

    let md = fs::read_to_string(&written.markdown).unwrap();
    assert!(md.contains("**Platform:** GEMINI\n**Date:** 06/05/2026 07:08:09\n**Total messages:** 2\n"));
    assert!(md.contains("| Key | Value |\n| --- | --- |\n| a\\|b | c |"));
    assert!(md.contains("```python\nprint(\"hi\")\n```"));
    assert!(md.contains("![Attachment](https://gemini.google.com/app/shot.png)"));

    // the remote image can't be fetched offline: the archive records the failure instead
    let bytes = fs::read(written.zip.as_ref().unwrap()).unwrap();
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
    let mut zipped_md = String::new();
    archive.by_name("gemini-1.md").unwrap().read_to_string(&mut zipped_md).unwrap();
    assert!(zipped_md.contains("![Attachment](assets/img_1_1.png)"));
    assert!(archive.by_name("assets/img_1_1.png_error.txt").is_ok());
    assert_eq!(written.archive.unwrap().failed, 1);
}

#[test]
fn counter_advances_per_export_and_stem_override_wins() {
    let out = tempfile::tempdir().unwrap();
    let export = ExportOptions::default().with_out_dir(out.path());
    let fetcher = LocalAssetFetcher::new(None);

    for expected in ["gemini-1", "gemini-2"] {
        let mut session = Session::new(SelectorTable::builtin()).with_export_time(at());
        session.start(SessionOptions::default(), &snapshot()).unwrap();
        let bundle = session.stop_and_export(None).unwrap();
        let written = write_bundle(&bundle, &export, &fetcher, session.log()).unwrap();
        assert_eq!(written.stem, expected);
        assert!(written.zip.is_none());
    }

    let mut session = Session::new(SelectorTable::builtin()).with_export_time(at());
    session.start(SessionOptions::default(), &snapshot()).unwrap();
    let bundle = session.stop_and_export(None).unwrap();
    let named = ExportOptions { stem: Some("notes".into()), write_debug_log: false, ..export.clone() };
    let written = write_bundle(&bundle, &named, &fetcher, session.log()).unwrap();
    assert!(out.path().join("notes.md").is_file());
    assert!(written.debug_log.is_none());
    assert_eq!(load_counter(out.path()), 2);
}

#[test]
fn handoff_json_carries_records_in_export_order() {
    let mut session = Session::new(SelectorTable::builtin()).with_export_time(at());
    session.start(SessionOptions::default(), &snapshot()).unwrap();
    let bundle = session.stop_and_export(None).unwrap();

    let json: serde_json::Value = serde_json::from_str(&bundle.handoff_json().unwrap()).unwrap();
    assert_eq!(json["platform"], "gemini");
    let messages = json["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0]["author"], "user");
    assert_eq!(messages[0]["turnIndex"], 0);
}
