//! Cross-context messages between the popup, the page and the background.
//!
//! Messages are JSON objects tagged by `type`. Field names are camelCase on
//! the wire.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use url::Url;

use crate::error::{Error, Result};
use crate::extractor::{Chain, ChainContext};
use crate::handoff::{print_url, SessionStore};
use crate::markup;
use crate::result::{ExportMode, ExportPayload, MathDelimiter};

/// A request received by the page or the background.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Request {
    /// Collect exportable markup from the page.
    #[serde(rename = "NLM_EXPORT_COLLECT", rename_all = "camelCase")]
    ExportCollect {
        /// Delimiters chosen in the popup, echoed back in the response.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        math_delimiters: Option<Vec<MathDelimiter>>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        mode: Option<ExportMode>,
    },
    /// Store a payload and open the print surface on it.
    #[serde(rename = "NLM_OPEN_PRINT")]
    OpenPrint { payload: ExportPayload },
}

impl Request {
    /// Decode a request from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidMessage`] for malformed JSON or unknown types.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Answer to [`Request::ExportCollect`]. Absent fields are omitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectResponse {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub math_delimiters: Option<Vec<MathDelimiter>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CollectResponse {
    /// The response as the payload for [`Request::OpenPrint`].
    ///
    /// `None` unless the collect succeeded.
    #[must_use]
    pub fn into_payload(self) -> Option<ExportPayload> {
        if !self.ok {
            return None;
        }
        Some(ExportPayload {
            html: self.html?,
            title: self.title.unwrap_or_default(),
            url: self.url.unwrap_or_default(),
            math_delimiters: self.math_delimiters.unwrap_or_default(),
        })
    }
}

/// Plain acknowledgement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ack {
    pub ok: bool,
}

/// A stored payload and where the print surface will find it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrintTicket {
    pub ack: Ack,
    pub key: String,
    pub url: Url,
}

/// Run the cross-context chain (no clipboard step) and answer a collect
/// request.
///
/// The markup is returned raw; the print surface sanitizes it. The popup's
/// delimiters are echoed back unchanged. Markup without any text counts as
/// nothing found.
pub async fn handle_collect(
    cx: &ChainContext<'_>,
    math_delimiters: Option<Vec<MathDelimiter>>,
    mode: Option<ExportMode>,
) -> CollectResponse {
    let chain = match mode.unwrap_or_default() {
        ExportMode::Auto => Chain::message(),
        ExportMode::Selection => Chain::selection_only(),
    };

    let found = chain
        .first_success(cx)
        .await
        .filter(|result| markup::has_text(&result.html));
    match found {
        Some(result) => {
            debug!(source = result.source.as_str(), "collect answered");
            CollectResponse {
                ok: true,
                html: Some(result.html),
                title: Some(cx.page.title()),
                url: Some(cx.page.url().to_string()),
                math_delimiters,
                error: None,
            }
        }
        None => {
            warn!("collect found nothing to export");
            CollectResponse {
                ok: false,
                error: Some(Error::InsufficientContent.to_string()),
                ..CollectResponse::default()
            }
        }
    }
}

/// Store `payload` for the print surface and acknowledge.
///
/// # Errors
///
/// Returns [`Error::InvalidUrl`] when the print URL cannot be built from
/// `base`; the payload is not kept in that case.
pub fn handle_open_print(
    store: &mut SessionStore,
    payload: ExportPayload,
    base: &Url,
) -> Result<PrintTicket> {
    let key = store.put(payload);
    match print_url(base, &key) {
        Ok(url) => {
            debug!(url = %url, "print surface ready");
            Ok(PrintTicket {
                ack: Ack { ok: true },
                key,
                url,
            })
        }
        Err(err) => {
            let _ = store.take(&key);
            Err(err)
        }
    }
}
