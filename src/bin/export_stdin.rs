//! Simple CLI that reads a page snapshot from stdin and outputs the print
//! document as JSON to stdout.
//!
//! Usage: `export_stdin [PAGE_URL] < page.html`
//!
//! Logs go to stderr; set `RUST_LOG=nlm_export=debug` for locator details.

use std::io::{self, Read};

use chrono::Utc;
use nlm_export::extractor::{ChainContext, DetachedHost};
use nlm_export::handoff::SessionStore;
use nlm_export::messaging::{handle_collect, handle_open_print, CollectResponse};
use nlm_export::render::{self, RenderDocument};
use nlm_export::{ExportMode, Options, Page, SessionContext};
use serde::Serialize;
use tracing_subscriber::EnvFilter;
use url::Url;

const EXTENSION_BASE: &str = "chrome-extension://nlm-export/";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Output {
    print_url: String,
    document: RenderDocument,
}

fn fail(response: &CollectResponse) -> ! {
    println!("{}", serde_json::to_string(response).unwrap_or_default());
    std::process::exit(1);
}

async fn run(html: String, page_url: Option<String>) -> Result<Output, CollectResponse> {
    let mut page = Page::parse(&html);
    if let Some(url) = page_url {
        page = page.with_url(url);
    }
    let session = SessionContext::new();
    let options = Options::default();
    let cx = ChainContext::new(&page, &session, &DetachedHost, &options);

    let response = handle_collect(&cx, None, Some(ExportMode::Auto)).await;
    let Some(payload) = response.clone().into_payload() else {
        return Err(response);
    };

    let as_error = |err: nlm_export::Error| CollectResponse {
        ok: false,
        error: Some(err.to_string()),
        ..CollectResponse::default()
    };
    let base = Url::parse(EXTENSION_BASE).map_err(|e| as_error(e.into()))?;
    let mut store = SessionStore::new();
    let ticket = handle_open_print(&mut store, payload, &base).map_err(as_error)?;
    let payload = store.take(&ticket.key).map_err(as_error)?;

    Ok(Output {
        print_url: ticket.url.to_string(),
        document: render::prepare(&payload, Utc::now()),
    })
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    // Read HTML from stdin
    let mut html = String::new();
    if io::stdin().read_to_string(&mut html).is_err() {
        eprintln!("Failed to read from stdin");
        std::process::exit(1);
    }
    let page_url = std::env::args().nth(1);

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
    {
        Ok(rt) => rt,
        Err(err) => {
            eprintln!("Failed to start runtime: {err}");
            std::process::exit(1);
        }
    };

    match runtime.block_on(run(html, page_url)) {
        Ok(output) => println!("{}", serde_json::to_string(&output).unwrap_or_default()),
        Err(response) => fail(&response),
    }
}
