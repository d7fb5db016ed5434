//! Collect, hand-off and print preparation, end to end
//!
//! Mirrors the popup → page → background → print surface round trip using
//! the JSON messages each context exchanges.

#![allow(clippy::expect_used)] // expect() is appropriate in tests for clear panic messages

use chrono::{TimeZone, Utc};
use nlm_export::extractor::{ChainContext, DetachedHost};
use nlm_export::handoff::SessionStore;
use nlm_export::messaging::{handle_collect, handle_open_print, CollectResponse, Request};
use nlm_export::render;
use nlm_export::{Error, ExportMode, Options, Page, SessionContext};
use url::Url;

const NOTEBOOK: &str = r#"
<html><head><title>Thermodynamics</title></head><body>
  <section>
    <div role="toolbar">
      <button aria-label="Refresh chat messages">r</button>
      <button>Copy chat</button>
    </div>
    <div role="log">
      <mat-card><p onclick="track()">What is entropy<sup>2</sup> exactly?</p></mat-card>
      <mat-card><p>\text{$$ S = k \ln W $$3}</p></mat-card>
    </div>
  </section>
</body></html>"#;

fn extension_base() -> Url {
    Url::parse("chrome-extension://abcdef/").expect("base url")
}

#[tokio::test]
async fn test_collect_request_round_trip() {
    let page = Page::parse(NOTEBOOK).with_url("https://notebooklm.google.com/notebook/42");
    let session = SessionContext::new();
    let options = Options::default();
    let cx = ChainContext::new(&page, &session, &DetachedHost, &options);

    let request = Request::from_json(
        r#"{"type":"NLM_EXPORT_COLLECT","mathDelimiters":[{"left":"$$","right":"$$","display":true}]}"#,
    )
    .expect("request");
    let Request::ExportCollect {
        math_delimiters,
        mode,
    } = request
    else {
        panic!("expected a collect request");
    };

    let response = handle_collect(&cx, math_delimiters, mode).await;
    assert!(response.ok);
    assert_eq!(response.title.as_deref(), Some("Thermodynamics"));
    assert_eq!(
        response.url.as_deref(),
        Some("https://notebooklm.google.com/notebook/42")
    );
    let html = response.html.as_deref().expect("html");
    assert!(html.contains("onclick"), "collect returns raw markup");
    assert_eq!(response.math_delimiters.as_ref().map(Vec::len), Some(1));

    let json = serde_json::to_value(&response).expect("json");
    assert_eq!(json["ok"], true);
    assert!(json.get("error").is_none());
    assert_eq!(json["mathDelimiters"][0]["display"], true);
}

#[tokio::test]
async fn test_selection_mode_without_selection_fails() {
    let page = Page::parse(NOTEBOOK);
    let session = SessionContext::new();
    let options = Options::default();
    let cx = ChainContext::new(&page, &session, &DetachedHost, &options);

    let response = handle_collect(&cx, None, Some(ExportMode::Selection)).await;
    assert!(!response.ok);
    assert!(response.html.is_none());
    assert!(response.error.is_some());
    assert!(response.into_payload().is_none());
}

#[tokio::test]
async fn test_markup_without_text_not_handed_off() {
    let page = Page::parse(r#"<main><div><img src="x.png"></div></main>"#);
    let session = SessionContext::new();
    let options = Options::default();
    let cx = ChainContext::new(&page, &session, &DetachedHost, &options);

    let response = handle_collect(&cx, None, None).await;
    assert!(!response.ok);
    assert!(response.html.is_none());
    assert_eq!(
        response.error.as_deref(),
        Some(Error::InsufficientContent.to_string().as_str())
    );
}

#[tokio::test]
async fn test_selection_mode_returns_selection() {
    let mut page = Page::parse(NOTEBOOK);
    page.set_selection(["the second law"]);
    let session = SessionContext::new();
    let options = Options::default();
    let cx = ChainContext::new(&page, &session, &DetachedHost, &options);

    let response = handle_collect(&cx, None, Some(ExportMode::Selection)).await;
    assert!(response.ok);
    assert_eq!(response.html.as_deref(), Some("<div>the second law</div>"));
}

#[tokio::test]
async fn test_payload_reaches_print_surface_once() {
    let page = Page::parse(NOTEBOOK).with_url("https://notebooklm.google.com/notebook/42");
    let session = SessionContext::new();
    let options = Options::default();
    let cx = ChainContext::new(&page, &session, &DetachedHost, &options);

    let payload = handle_collect(&cx, None, None)
        .await
        .into_payload()
        .expect("payload");
    let mut store = SessionStore::new();
    let ticket = handle_open_print(&mut store, payload, &extension_base()).expect("ticket");

    assert!(ticket.ack.ok);
    assert_eq!(ticket.url.path(), "/print.html");
    let key = ticket
        .url
        .query_pairs()
        .find(|(name, _)| name == "key")
        .map(|(_, value)| value.into_owned())
        .expect("key in query");
    assert_eq!(key, ticket.key);

    let stored = store.take(&key).expect("stored payload");
    assert!(matches!(store.take(&key), Err(Error::PayloadNotFound(_))));

    let now = Utc.with_ymd_and_hms(2024, 11, 2, 8, 0, 0).single().expect("time");
    let doc = render::prepare(&stored, now);
    assert_eq!(doc.title, "Thermodynamics");
    assert_eq!(doc.file_name, "Thermodynamics_20241102080000.pdf");
    assert!(doc.meta.ends_with(" • https://notebooklm.google.com/notebook/42"));
    assert!(doc.body_html.contains("What is entropy exactly?"));
    assert!(doc.body_html.contains(r#"<div class="math-block">$$ S = k \ln W $$</div>"#));
    assert!(!doc.body_html.contains("onclick"));
    assert_eq!(doc.math.delimiters.len(), 4);
    assert!(!doc.math.throw_on_error);

    let page_html = doc.to_html();
    assert!(page_html.contains("<title>Thermodynamics</title>"));
}

#[test]
fn test_open_print_message_decodes_partial_payload() {
    let request =
        Request::from_json(r#"{"type":"NLM_OPEN_PRINT","payload":{"html":"<p>x</p>"}}"#)
            .expect("request");
    let Request::OpenPrint { payload } = request else {
        panic!("expected an open-print request");
    };
    assert_eq!(payload.html, "<p>x</p>");
    assert!(payload.title.is_empty());
    assert!(payload.math_delimiters.is_empty());
}

#[test]
fn test_unknown_message_rejected() {
    assert!(Request::from_json(r#"{"type":"NLM_SOMETHING_ELSE"}"#).is_err());
    let failed = CollectResponse::default();
    assert!(failed.into_payload().is_none());
}
