//! Incremental URL decomposition, grounded on `native::http::url_obj`
//! (`native/http.h` - the public-facing variant, not the stricter
//! `detail::url_obj` used only inside the parser callbacks).
//!
//! Getters return the same placeholder defaults the reactor binding did
//! when a component was absent from the request target: `schema` defaults
//! to `"HTTP"`, `host` to `"localhost"`, `path` to `"/"`, and `port` to
//! 80 or 443 depending on which schema is in effect.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlObj {
    schema: Option<String>,
    host: Option<String>,
    port: Option<u16>,
    path: Option<String>,
    query: Option<String>,
    fragment: Option<String>,
}

impl UrlObj {
    pub fn new() -> Self {
        Self {
            schema: None,
            host: None,
            port: None,
            path: None,
            query: None,
            fragment: None,
        }
    }

    /// Parses a request target of the form `path[?query][#fragment]`, the
    /// only form a server-side origin-form request line carries. Absolute-form
    /// targets (`http://host/path`, used for proxy requests) are out of scope,
    /// matching the reactor's own CONNECT-vs-origin-form split.
    pub fn parse(target: &str) -> Self {
        let mut url = Self::new();

        let (rest, fragment) = match target.split_once('#') {
            Some((r, f)) => (r, Some(f.to_string())),
            None => (target, None),
        };
        url.fragment = fragment;

        let (path, query) = match rest.split_once('?') {
            Some((p, q)) => (p, Some(q.to_string())),
            None => (rest, None),
        };
        url.query = query;

        if !path.is_empty() {
            url.path = Some(path.to_string());
        }

        url
    }

    /// Fills in `host`/`port` from a `Host:` header when the request target
    /// itself carried neither (the common case for origin-form requests).
    pub fn apply_host_header(&mut self, host_header: &str) {
        if self.host.is_some() {
            return;
        }

        match host_header.rsplit_once(':') {
            Some((h, p)) if p.chars().all(|c| c.is_ascii_digit()) && !p.is_empty() => {
                self.host = Some(h.to_string());
                self.port = p.parse().ok();
            }
            _ => self.host = Some(host_header.to_string()),
        }
    }

    pub fn schema(&self) -> &str {
        self.schema.as_deref().unwrap_or("HTTP")
    }

    pub fn host(&self) -> &str {
        self.host.as_deref().unwrap_or("localhost")
    }

    pub fn port(&self) -> u16 {
        self.port.unwrap_or_else(|| default_port_for_schema(self.schema()))
    }

    pub fn path(&self) -> &str {
        self.path.as_deref().unwrap_or("/")
    }

    pub fn query(&self) -> &str {
        self.query.as_deref().unwrap_or("")
    }

    pub fn fragment(&self) -> &str {
        self.fragment.as_deref().unwrap_or("")
    }
}

impl Default for UrlObj {
    fn default() -> Self {
        Self::new()
    }
}

fn default_port_for_schema(schema: &str) -> u16 {
    if schema.eq_ignore_ascii_case("https") {
        443
    } else {
        80
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_when_nothing_was_parsed() {
        let url = UrlObj::new();
        assert_eq!(url.schema(), "HTTP");
        assert_eq!(url.host(), "localhost");
        assert_eq!(url.port(), 80);
        assert_eq!(url.path(), "/");
    }

    #[test]
    fn splits_path_query_fragment() {
        let url = UrlObj::parse("/search?q=rust#top");
        assert_eq!(url.path(), "/search");
        assert_eq!(url.query(), "q=rust");
        assert_eq!(url.fragment(), "top");
    }

    #[test]
    fn host_header_supplies_host_and_port() {
        let mut url = UrlObj::parse("/");
        url.apply_host_header("example.com:8080");
        assert_eq!(url.host(), "example.com");
        assert_eq!(url.port(), 8080);
    }

    #[test]
    fn host_header_without_port_keeps_schema_default() {
        let mut url = UrlObj::parse("/");
        url.apply_host_header("example.com");
        assert_eq!(url.host(), "example.com");
        assert_eq!(url.port(), 80);
    }
}
