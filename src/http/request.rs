use crate::http::HttpMethod;
use crate::http::headers::HttpHeaders;
use crate::http::url::UrlObj;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestHeader {
    Host,
    ContentLength,
    ContentType,
}

/// The outcome of fully parsing one HTTP request: method, decomposed
/// target, headers (case-insensitive, duplicates combined), and body.
/// Plays the role the reactor binding's `http_parse_result` did, but as a
/// single owned value rather than a pointer handed to a completion callback.
pub struct HttpRequest {
    pub method: HttpMethod,
    pub uri: String,
    pub http_version: (u8, u8),
    pub url: UrlObj,

    /// `true` when the request asked to switch protocols (`Connection:
    /// Upgrade` alongside an `Upgrade` header). This server never performs
    /// an upgrade; the flag exists so a caller can reject such requests
    /// explicitly rather than silently treating them as ordinary HTTP/1.1.
    pub upgrade: bool,

    pub headers: HttpHeaders,
    pub body: Vec<u8>,
}

impl HttpRequest {
    pub fn new() -> Self {
        Self {
            method: HttpMethod::Unknown,
            uri: String::new(),
            http_version: (0, 0),
            url: UrlObj::new(),
            upgrade: false,
            headers: HttpHeaders::new(),
            body: Vec::new(),
        }
    }

    pub fn set_header(&mut self, h: RequestHeader, value: &str) {
        let name = match h {
            RequestHeader::ContentLength => "Content-Length",
            RequestHeader::ContentType => "Content-Type",
            RequestHeader::Host => "Host",
        };

        self.headers.set_raw(name, value);
    }

    /// Looks up a header by name, case-insensitively.
    pub fn get_header(&self, key: &str) -> Option<&str> {
        self.headers.get(key)
    }

    /// Writes the header's value into `out` and returns `true` if present,
    /// leaving `out` untouched otherwise - the owned-output counterpart to
    /// [`get_header`](Self::get_header) for callers that need a `String`
    /// rather than a borrow tied to `self`.
    pub fn get_header_into(&self, key: &str, out: &mut String) -> bool {
        match self.get_header(key) {
            Some(value) => {
                out.clear();
                out.push_str(value);
                true
            }
            None => false,
        }
    }

    pub fn get_body(&self) -> &[u8] {
        &self.body
    }

    pub fn url(&self) -> &UrlObj {
        &self.url
    }

    /// Finalizes the URL and upgrade flag once all headers are known. Called
    /// by the parser right after the headers-complete boundary.
    pub fn finish_headers(&mut self) {
        if let Some(host) = self.headers.get("Host") {
            self.url.apply_host_header(&host.to_string());
        }

        let wants_upgrade = self
            .headers
            .get("Connection")
            .map(|v| v.to_ascii_lowercase().contains("upgrade"))
            .unwrap_or(false);
        self.upgrade = wants_upgrade && self.headers.contains("Upgrade");
    }
}

impl Default for HttpRequest {
    fn default() -> Self {
        Self::new()
    }
}
