//! HTTP headers abstraction for [`HttpRequest`](crate::http::request::HttpRequest) and
//! [`HttpResponse`](crate::http::response::HttpResponse)
//!
//! Header names are matched case-insensitively, per RFC 7230 §3.2, while the
//! casing of the first occurrence of each name is preserved for
//! serialization. Headers are stored in an ordered map so the wire order of
//! first appearance survives a read/rewrite round trip.
//!
//! A header that is set more than once (e.g. two `Cache-Control` lines) is
//! combined into a single comma-separated field value rather than letting
//! the later occurrence silently replace the earlier one - the behavior
//! RFC 7230 §3.2.2 specifies for header fields that are safe to combine.
//!
//! This abstraction does not enforce any HTTP semantics or constraints.
//! Higher-level types such as [`HttpRequest`](crate::http::request::HttpRequest)
//! and [`HttpResponse`](crate::http::response::HttpResponse) are responsible for
//! applying their own rules by wrapping or constraining access to this structure.
//!
//! When required, header values can be validated by the
//! [`validator`](crate::http::validator) module.

use indexmap::IndexMap;

pub struct HttpHeaders {
    // keyed by the lowercased header name; value keeps the name as first seen
    // on the wire, alongside the (possibly combined) field value.
    headers: IndexMap<String, (String, String)>,
}

impl HttpHeaders {
    pub fn new() -> Self {
        Self {
            headers: IndexMap::new(),
        }
    }

    /// Sets `name` to `value`, overwriting any prior value. Used when a
    /// header is known by construction to occur at most once (e.g. the
    /// `Date`/`Server` headers a response seeds itself with).
    pub fn set_raw(&mut self, name: &str, value: &str) {
        self.headers
            .insert(name.to_ascii_lowercase(), (name.to_string(), value.to_string()));
    }

    /// Appends `value` to `name`. If `name` was already present, the new
    /// value is comma-joined onto the existing one instead of replacing it.
    pub fn append(&mut self, name: &str, value: &str) {
        match self.headers.get_mut(&name.to_ascii_lowercase()) {
            Some((_, existing)) => {
                existing.push_str(", ");
                existing.push_str(value);
            }
            None => self.set_raw(name, value),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.headers.contains_key(&name.to_ascii_lowercase())
    }

    pub fn stringify(&self) -> String {
        let mut result = String::new();
        for (name, value) in self.headers.values() {
            result.push_str(&format!("{}: {}\r\n", name, value));
        }
        result
    }
}

impl Default for HttpHeaders {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_is_case_insensitive() {
        let mut h = HttpHeaders::new();
        h.set_raw("Content-Type", "text/plain");
        assert_eq!(h.get("content-type"), Some("text/plain"));
        assert_eq!(h.get("CONTENT-TYPE"), Some("text/plain"));
    }

    #[test]
    fn duplicate_headers_combine() {
        let mut h = HttpHeaders::new();
        h.append("Cache-Control", "no-cache");
        h.append("cache-control", "no-store");
        assert_eq!(h.get("Cache-Control"), Some("no-cache, no-store"));
    }

    #[test]
    fn first_seen_casing_is_preserved_on_serialization() {
        let mut h = HttpHeaders::new();
        h.append("X-Custom", "a");
        h.append("x-custom", "b");
        assert_eq!(h.stringify(), "X-Custom: a, b\r\n");
    }
}
