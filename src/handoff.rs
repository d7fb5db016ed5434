//! Hand-off of export payloads to the print surface.
//!
//! The exporting context stores the payload under a fresh key and opens the
//! print surface with that key in its query string. Entries live only as
//! long as the store (one browser session) and are consumed on first read.

use std::collections::HashMap;

use chrono::Utc;
use rand::Rng;
use tracing::debug;
use url::Url;

use crate::error::{Error, Result};
use crate::result::ExportPayload;

/// Prefix of every storage key.
pub const KEY_PREFIX: &str = "export-";

/// Length of the random key suffix.
pub const KEY_SUFFIX_LEN: usize = 10;

/// Page of the print surface, relative to the extension base.
pub const PRINT_PAGE: &str = "print.html";

const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// `export-<unix millis>-<10 base36 chars>`.
#[must_use]
pub fn generate_key() -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..KEY_SUFFIX_LEN)
        .map(|_| char::from(BASE36[rng.gen_range(0..BASE36.len())]))
        .collect();
    format!("{KEY_PREFIX}{}-{suffix}", Utc::now().timestamp_millis())
}

/// URL of the print surface for `key`, under the extension `base`.
///
/// # Errors
///
/// Returns [`Error::InvalidUrl`] when `base` cannot be joined with the page
/// name.
pub fn print_url(base: &Url, key: &str) -> Result<Url> {
    let mut url = base.join(PRINT_PAGE)?;
    url.query_pairs_mut().clear().append_pair("key", key);
    Ok(url)
}

/// In-memory, session-scoped payload store.
#[derive(Debug, Default)]
pub struct SessionStore {
    entries: HashMap<String, ExportPayload>,
}

impl SessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a payload under a fresh key and return the key.
    pub fn put(&mut self, payload: ExportPayload) -> String {
        let mut key = generate_key();
        while self.entries.contains_key(&key) {
            key = generate_key();
        }
        debug!(key = %key, len = payload.html.len(), "stored export payload");
        self.entries.insert(key.clone(), payload);
        key
    }

    /// Remove and return the payload stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PayloadNotFound`] for unknown or already consumed keys.
    pub fn take(&mut self, key: &str) -> Result<ExportPayload> {
        self.entries
            .remove(key)
            .ok_or_else(|| Error::PayloadNotFound(key.to_string()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_shape() {
        let key = generate_key();
        let rest = key.strip_prefix(KEY_PREFIX).expect("prefix");
        let (millis, suffix) = rest.split_once('-').expect("separator");
        assert!(millis.parse::<i64>().is_ok());
        assert_eq!(suffix.len(), KEY_SUFFIX_LEN);
        assert!(suffix.chars().all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
    }

    #[test]
    fn test_take_consumes_once() {
        let mut store = SessionStore::new();
        let key = store.put(ExportPayload {
            html: "<p>x</p>".to_string(),
            ..ExportPayload::default()
        });
        assert_eq!(store.len(), 1);

        assert_eq!(store.take(&key).expect("stored").html, "<p>x</p>");
        assert!(matches!(store.take(&key), Err(Error::PayloadNotFound(_))));
        assert!(store.is_empty());
    }

    #[test]
    fn test_print_url() {
        let base = Url::parse("chrome-extension://abcdef/").expect("base");
        let url = print_url(&base, "export-1-abc").expect("url");
        assert_eq!(
            url.as_str(),
            "chrome-extension://abcdef/print.html?key=export-1-abc"
        );
    }

    #[test]
    fn test_print_url_nested_base() {
        let base = Url::parse("https://host.example/ext/index.html?x=1").expect("base");
        let url = print_url(&base, "k y").expect("url");
        assert_eq!(url.as_str(), "https://host.example/ext/print.html?key=k+y");
    }
}
