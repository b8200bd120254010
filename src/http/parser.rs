/*!
A finite-state machine parser for HTTP request serialization
([`HttpRequest`]).

The request is parsed incrementally in three stages: request line,
headers, and body. Parsing is performed as a pipeline, and each stage
may yield either a [`ParserOk`] status or a [`ParserError`].

This design allows the parser to operate directly on network packets.
An internal buffer is used to accumulate data until a complete request
field can be parsed, except for the request line, which must fit entirely
within the parsing buffer. By contrast, body data is appended directly
to the request body as it is received.


The [`ParserOk::Incomplete`] state is used to signal the server to
continue reading packets in order to complete the current field.

As in a compiler, the parser only checks for syntactic errors and
reports the corresponding error. Semantic validation is left to the
caller: the [`ParserOk::HeadersDone`] state allows the server to pause
parsing and validate the headers before body parsing begins.

Header lines are folded into [`HttpHeaders`](crate::http::headers::HttpHeaders),
which matches names case-insensitively and combines repeated header
fields into a single comma-joined value rather than letting the last
occurrence silently overwrite the ones before it.
*/

use crate::config::config;
use crate::http::request::*;
use crate::http::status::HttpStatus;
use crate::http::url::UrlObj;
use crate::http::*;

/// Capacity of the internal parser buffer.
/// Its value should be the same as the server read [`buffer capacity`](crate::config::ServerConfig::buffer_size)
const PARSER_BUF_CAP: usize = 4096;

/// The finite states of the parser.
/// They are given sequentially as a pipeline
/// Each state is associated with a parsing method which may return a `ParserError`.
#[derive(PartialEq, PartialOrd)]
enum ParserState {
    RequestLine,
    Headers,
    Body,
    Done,
}

pub struct Parser {
    buf: [u8; PARSER_BUF_CAP],
    buf_len: usize,
    state: ParserState,

    /// helper to track the global headers size and apply the [`server limit`](crate::config::ServerConfig::max_header_size)
    headers_bytes_parsed: usize,
}

#[derive(PartialEq, Debug)]
pub enum ParserOk {
    /// Parsing completed successfully for the current stage.
    Ok,

    /// More data is required to complete the current field.
    Incomplete,

    /// Headers have been fully parsed and can be validated.
    HeadersDone,

    /// The full request has been parsed.
    Done,
}

// Syntaxic parsing errors
#[derive(PartialEq, Debug)]
pub enum ParserError {
    Error,

    /// Limit can be found in the server [`config`](crate::config::ServerConfig::max_uri_size)
    TooLongUri,
}

impl ParserError {
    pub fn into_http_status(self) -> HttpStatus {
        match self {
            ParserError::Error => HttpStatus::BadRequest,
            ParserError::TooLongUri => HttpStatus::UriTooLong,
        }
    }
}

impl Parser {
    pub fn new() -> Self {
        Self {
            buf: [0; PARSER_BUF_CAP],
            buf_len: 0,
            state: ParserState::RequestLine,
            headers_bytes_parsed: 0,
        }
    }

    pub fn is_buffer_empty(&self) -> bool {
        self.buf_len == 0
    }

    fn find_delimiter(&self, pattern: &[u8]) -> Option<usize> {
        self.buf[..self.buf_len]
            .windows(pattern.len())
            .position(|window| window == pattern)
    }

    fn parse_request_line(&mut self, req: &mut HttpRequest) -> Result<ParserOk, ParserError> {
        let end = self.find_delimiter(b"\r\n");

        let request_line_end = match end {
            Some(idx) => idx,
            None => {
                if self.buf_len > config().max_request_line_size {
                    return Err(ParserError::Error);
                }

                return Ok(ParserOk::Incomplete);
            }
        };

        if request_line_end > config().max_request_line_size {
            return Err(ParserError::Error);
        }

        // Request line: METHOD uri HTTP/VERSION
        let request_line = &self.buf[..request_line_end];
        let parts: Vec<&[u8]> = request_line.split(|&b| b == b' ').collect();
        if parts.len() != 3 {
            return Err(ParserError::Error);
        }

        let method = std::str::from_utf8(parts[0]).map_err(|_| ParserError::Error)?;

        let method_enum = match http_method_from_str(method) {
            HttpMethod::Unknown => return Err(ParserError::Error),
            m => m,
        };

        let uri = std::str::from_utf8(parts[1]).map_err(|_| ParserError::Error)?;
        if uri.len() > config().max_uri_size {
            return Err(ParserError::TooLongUri);
        }

        let version = std::str::from_utf8(parts[2]).map_err(|_| ParserError::Error)?;
        let http_version = version
            .strip_prefix("HTTP/")
            .and_then(|v| v.split_once('.'))
            .ok_or(ParserError::Error)?;

        let (maj, min) = http_version;
        let maj: u8 = maj.parse().map_err(|_| ParserError::Error)?;
        let min: u8 = min.parse().map_err(|_| ParserError::Error)?;

        req.method = method_enum;
        req.uri = uri.to_string();
        req.http_version = (maj, min);
        req.url = UrlObj::parse(uri);

        let consume = request_line_end + 2;
        let remaining = self.buf_len - consume;

        // Successfully parsed request line
        // Update parser state and remove parsed line from bufs
        self.state = ParserState::Headers;
        self.buf.copy_within(consume..self.buf_len, 0);
        self.buf_len = remaining;

        Ok(ParserOk::Ok)
    }

    fn get_header_name(name: &[u8]) -> Result<&str, ParserError> {
        let s = std::str::from_utf8(name).map_err(|_| ParserError::Error)?;
        if s.is_empty() {
            return Err(ParserError::Error);
        }

        // Only allow tchar characters (ASCII letters, digits, and these symbols)
        if !s
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b"!#$%&'*+-.^_`|~".contains(&b))
        {
            return Err(ParserError::Error);
        }

        Ok(s)
    }

    fn get_header_value(value: &[u8]) -> Result<&str, ParserError> {
        let s = std::str::from_utf8(value).map_err(|_| ParserError::Error)?;

        // No control characters except HTAB (0x09)
        if s.bytes().any(|b| (b < 0x20 && b != 0x09) || b == 0x7F) {
            return Err(ParserError::Error);
        }

        Ok(s.trim())
    }

    fn parse_headers(&mut self, req: &mut HttpRequest) -> Result<ParserOk, ParserError> {
        let headers_end = self.find_delimiter(b"\r\n\r\n");
        let next_line_end = self.find_delimiter(b"\r\n");

        if next_line_end.is_none() {
            if self.buf_len == PARSER_BUF_CAP {
                return Err(ParserError::Error);
            }
            return Ok(ParserOk::Incomplete);
        }

        let bytes_to_consume = if let Some(end) = headers_end {
            end + 4
        } else {
            next_line_end.unwrap() + 2
        };

        self.headers_bytes_parsed += bytes_to_consume;
        if self.headers_bytes_parsed > config().max_header_size {
            return Err(ParserError::Error);
        }
        // Parse headers line by line, folding every field into the
        // case-insensitive header map (duplicates combine, see
        // `HttpHeaders::append`).
        let headers_chunk = &self.buf[..bytes_to_consume];
        let mut is_header_end = false;
        for raw_line in headers_chunk.split(|&b| b == b'\n') {
            if raw_line.is_empty() {
                continue;
            }

            let line = raw_line.strip_suffix(b"\r").unwrap_or(raw_line);
            if line.is_empty() {
                is_header_end = true;
                break;
            }

            let mut parts = line.splitn(2, |&b| b == b':');
            let name = parts.next().unwrap();
            let value = parts.next().ok_or(ParserError::Error)?;

            let name = Self::get_header_name(name)?;
            let value = Self::get_header_value(value)?;

            if name.eq_ignore_ascii_case("content-length") {
                value.parse::<usize>().map_err(|_| ParserError::Error)?;
            }

            req.headers.append(name, value);
        }

        let remaining = self.buf_len - bytes_to_consume;
        // Successfully parsed headers
        // Update parser state and remove parsed headers from bufs
        self.buf.copy_within(bytes_to_consume..self.buf_len, 0);
        self.buf_len = remaining;

        if headers_end.is_none() && !is_header_end {
            return Ok(ParserOk::Incomplete);
        }

        req.finish_headers();
        self.state = ParserState::Body;
        Ok(ParserOk::Ok)
    }

    fn parse_body(&mut self, req: &mut HttpRequest) -> Result<ParserOk, ParserError> {
        let content_length = match req.headers.get("Content-Length") {
            Some(v) => v.parse::<usize>().map_err(|_| ParserError::Error)?,
            None => {
                self.state = ParserState::Done;
                return Ok(ParserOk::Done);
            }
        };

        let remaining = content_length.saturating_sub(req.body.len());
        let to_copy = std::cmp::min(self.buf_len, remaining);
        if req.body.len() + to_copy > config().max_body_size {
            return Err(ParserError::Error);
        }

        // Body bytes are always appended, never overwritten: a chunk that
        // arrives split across several reads must accumulate into the full
        // body rather than each call replacing what came before it.
        req.body.extend_from_slice(&self.buf[..to_copy]);
        self.buf.copy_within(to_copy..self.buf_len, 0);
        self.buf_len -= to_copy;

        if req.body.len() == content_length {
            self.state = ParserState::Done;
            return Ok(ParserOk::Done);
        }

        Ok(ParserOk::Incomplete)
    }

    // Helper for the tests to work without server context.
    fn fill_buffer(&mut self, buf: &[u8]) -> Result<(), ParserError> {
        if self.buf_len + buf.len() > PARSER_BUF_CAP {
            return Err(ParserError::Error);
        }

        self.buf[self.buf_len..self.buf_len + buf.len()].copy_from_slice(buf);
        self.buf_len += buf.len();
        Ok(())
    }

    /// Incremental parsing of the HTTP request
    pub fn feed(&mut self, buf: &[u8], req: &mut HttpRequest) -> Result<ParserOk, ParserError> {
        self.fill_buffer(buf)?;

        loop {
            let outcome = match self.state {
                ParserState::RequestLine => self.parse_request_line(req)?,
                ParserState::Headers => match self.parse_headers(req)? {
                    ParserOk::Ok => ParserOk::HeadersDone, // send signal for headers validation
                    other_outcome => other_outcome,
                },
                ParserState::Body => self.parse_body(req)?,
                ParserState::Done => return Ok(ParserOk::Done),
            };

            if outcome == ParserOk::Incomplete || outcome == ParserOk::HeadersDone {
                return Ok(outcome);
            }
        }
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}
