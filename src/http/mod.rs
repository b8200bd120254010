pub mod headers;
pub mod parser;
pub mod request;
pub mod response;
pub mod server;
pub mod status;
pub mod url;
pub mod validator;

const HTTP_METHOD_MAX_LEN: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Options,
    Get,
    Head,
    Post,
    Put,
    Delete,
    Trace,
    Connect,
    Patch,
    Unknown,
}

pub fn http_method_from_str(method: &str) -> HttpMethod {
    if method.len() > HTTP_METHOD_MAX_LEN {
        return HttpMethod::Unknown;
    }

    match method {
        "OPTIONS" => HttpMethod::Options,
        "GET" => HttpMethod::Get,
        "HEAD" => HttpMethod::Head,
        "POST" => HttpMethod::Post,
        "PUT" => HttpMethod::Put,
        "DELETE" => HttpMethod::Delete,
        "TRACE" => HttpMethod::Trace,
        "CONNECT" => HttpMethod::Connect,
        "PATCH" => HttpMethod::Patch,
        _ => HttpMethod::Unknown,
    }
}

/// The HTTP versions this server is willing to speak. Ordered so a
/// configured ceiling (`ServerConfig::http_version`) can be compared against
/// a parsed request version with `<=`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, serde::Deserialize)]
pub enum HttpVersion {
    #[serde(rename = "1.0")]
    V1_0,
    #[serde(rename = "1.1")]
    V1_1,
}

impl HttpVersion {
    /// Validates a parsed `(major, minor)` request-line version against the
    /// versions this server understands at all, independent of whether the
    /// configured ceiling accepts it.
    pub fn is_valid(v: (u8, u8)) -> Result<Self, ()> {
        match v {
            (1, 0) => Ok(HttpVersion::V1_0),
            (1, 1) => Ok(HttpVersion::V1_1),
            _ => Err(()),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            HttpVersion::V1_0 => "HTTP/1.0",
            HttpVersion::V1_1 => "HTTP/1.1",
        }
    }
}
