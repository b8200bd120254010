//! HTTP response serialization, grounded on `response::end` (`native/http.h`):
//! seed default headers, let the handler set a body and status, auto-fill
//! `Content-Length` if the caller didn't set one explicitly, then serialize
//! the whole thing as `status line + headers + blank line + body`.

use crate::config::config;
use crate::http::headers::HttpHeaders;
use crate::http::status::HttpStatus;
use httpdate;

/// Common HTTP response headers
/// This enum defines the set of headers that can be explicitly set on an
/// [`HttpResponse`] through its safe wrapper API.
#[allow(dead_code)]
pub enum ResponseHeader {
    ContentLength,
    ContentType,
    ContentEncoding,
    Connection,
    Date,
    Server,
}

pub struct HttpResponse {
    pub status: HttpStatus,
    pub headers: HttpHeaders,
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Creates a new `HttpResponse` with default headers set.
    /// These include the `Server` header with the server name from the configuration
    /// and the `Date` header with the current system time.
    pub fn new() -> Self {
        let mut res = Self {
            status: HttpStatus::Ok,
            headers: HttpHeaders::new(),
            body: Vec::new(),
        };

        res.set_header(ResponseHeader::Server, &config().server_name);
        res.set_header(
            ResponseHeader::Date,
            &httpdate::fmt_http_date(std::time::SystemTime::now()),
        );
        res.set_header(ResponseHeader::ContentType, "text/html");
        res
    }

    /// Builds an error response for `status`, with a default empty body.
    pub fn for_status(status: HttpStatus) -> Self {
        let mut res = Self::new();
        res.status = status;
        res
    }

    pub fn set_status(&mut self, status: HttpStatus) {
        self.status = status;
    }

    pub fn set_body(&mut self, body: Vec<u8>) {
        self.body = body;
    }

    /// Sets a request header constrained to the allowed [`ResponseHeader`] variants.
    ///
    /// This method acts as a safe wrapper around [`HttpHeaders::set_raw`],
    /// ensuring that only headers explicitly supported by [`ResponseHeader`]
    /// can be added through this API.
    ///
    /// No validation is performed on the header value itself.
    pub fn set_header(&mut self, h: ResponseHeader, value: &str) {
        let name = match h {
            ResponseHeader::ContentType => "Content-Type",
            ResponseHeader::ContentLength => "Content-Length",
            ResponseHeader::ContentEncoding => "Content-Encoding",
            ResponseHeader::Connection => "Connection",
            ResponseHeader::Date => "Date",
            ResponseHeader::Server => "Server",
        };

        self.headers.set_raw(name, value);
    }

    /// Serializes the response as raw bytes ready to be written to the
    /// stream: status line, headers (auto-filling `Content-Length` if the
    /// caller never set one), a blank line, and the body.
    pub fn build(&mut self) -> Vec<u8> {
        if !self.headers.contains("Content-Length") {
            self.set_header(ResponseHeader::ContentLength, &self.body.len().to_string());
        }

        let mut out = format!(
            "HTTP/1.1 {} {}\r\n{}\r\n",
            self.status.code(),
            self.status.reason(),
            self.headers.stringify(),
        )
        .into_bytes();
        out.extend_from_slice(&self.body);
        out
    }
}

impl Default for HttpResponse {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ServerConfig, set_config};
    use std::sync::Once;

    static INIT: Once = Once::new();

    fn setup() {
        INIT.call_once(|| set_config(ServerConfig::default()));
    }

    #[test]
    fn build_auto_sets_content_length() {
        setup();
        let mut res = HttpResponse::new();
        res.set_body(b"hello".to_vec());
        let bytes = res.build();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(text.contains("Content-Length: 5\r\n"));
        assert!(text.ends_with("hello"));
    }

    #[test]
    fn explicit_content_length_is_not_overwritten() {
        setup();
        let mut res = HttpResponse::new();
        res.set_body(b"hello".to_vec());
        res.set_header(ResponseHeader::ContentLength, "999");
        let bytes = res.build();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.contains("Content-Length: 999\r\n"));
    }

    #[test]
    fn error_response_uses_matching_reason_phrase() {
        setup();
        let mut res = HttpResponse::for_status(HttpStatus::NotFound);
        let bytes = res.build();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.starts_with("HTTP/1.1 404 Not Found\r\n"));
    }
}
