//! Raw and verified webhook request types.

use std::collections::HashMap;

/// Signature header set by the platform on outbound webhooks.
pub const SIGNATURE_HEADER: &str = "X-Linktor-Signature";
/// Optional timestamp header (Unix seconds) for replay protection.
pub const TIMESTAMP_HEADER: &str = "X-Linktor-Timestamp";

/// Case-insensitive header map.
///
/// Keys are stored lower-cased; lookups lower-case the query key, so callers
/// can use whatever casing their HTTP framework hands them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderMap {
    inner: HashMap<String, String>,
}

impl HeaderMap {
    /// Creates an empty header map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a header, replacing any previous value for the same name.
    pub fn insert(&mut self, name: impl AsRef<str>, value: impl Into<String>) {
        self.inner
            .insert(name.as_ref().to_ascii_lowercase(), value.into());
    }

    /// Looks up a header by name, case-insensitively.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.inner
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Returns the number of headers.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Checks if the map is empty.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for HeaderMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut headers = Self::new();
        for (name, value) in iter {
            headers.insert(name, value);
        }
        headers
    }
}

/// An inbound webhook request as received: raw body bytes plus headers.
///
/// Created per call and discarded after dispatch; nothing here is trusted
/// until it passes verification.
#[derive(Debug, Clone)]
pub struct RawWebhookRequest {
    body: Vec<u8>,
    headers: HeaderMap,
}

impl RawWebhookRequest {
    /// Creates a request from raw body bytes and headers.
    pub fn new(body: impl Into<Vec<u8>>, headers: HeaderMap) -> Self {
        Self {
            body: body.into(),
            headers,
        }
    }

    /// The exact raw body bytes the signature covers.
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// The request headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }
}

/// A webhook request whose signature and freshness checks have passed.
///
/// Only [`crate::dispatcher::verify_request`] can construct this; holding one
/// is proof the raw bytes were authenticated before any parsing.
#[derive(Debug)]
pub struct VerifiedWebhookRequest<'a> {
    pub(crate) raw: &'a RawWebhookRequest,
}

impl VerifiedWebhookRequest<'_> {
    /// The authenticated body bytes.
    pub fn body(&self) -> &[u8] {
        self.raw.body()
    }

    /// The request headers.
    pub fn headers(&self) -> &HeaderMap {
        self.raw.headers()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_insensitive_lookup() {
        let mut headers = HeaderMap::new();
        headers.insert("X-Linktor-Signature", "abc");

        assert_eq!(headers.get("x-linktor-signature"), Some("abc"));
        assert_eq!(headers.get("X-LINKTOR-SIGNATURE"), Some("abc"));
        assert_eq!(headers.get(SIGNATURE_HEADER), Some("abc"));
        assert_eq!(headers.get("x-other"), None);
    }

    #[test]
    fn test_insert_replaces() {
        let mut headers = HeaderMap::new();
        headers.insert("X-Request-ID", "one");
        headers.insert("x-request-id", "two");
        assert_eq!(headers.len(), 1);
        assert_eq!(headers.get("X-Request-ID"), Some("two"));
    }

    #[test]
    fn test_from_iterator() {
        let headers: HeaderMap =
            [("Content-Type", "application/json"), ("X-A", "1")].into_iter().collect();
        assert_eq!(headers.get("content-type"), Some("application/json"));
        assert_eq!(headers.len(), 2);
    }
}
