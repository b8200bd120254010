//! HTTP request validator
//! Once all headers have been parsed from an incoming request,
//! this module provides functionality to validate its semantics
//! according to HTTP rules and server configuration.
//! The semantics errors are directly mapped to appropriate HTTP status codes
//!
//! This includes validating:
//! - HTTP version support (against the configured ceiling)
//! - Content-Length header correctness
//! - Maximum allowed body size
//!
//! Method/body-presence constraints (e.g. rejecting a GET with a body, or
//! requiring one on POST) are not enforced here: the server's documented
//! rejection reasons are limited to a syntactic parser failure, EOF before
//! completion, or a hard read error, plus the checks above.

use crate::config::config;
use crate::http::HttpVersion;
use crate::http::request::HttpRequest;
use crate::http::status::HttpStatus;

pub enum ValidatorError {
    HttpVersionNotSupported,
    PayloadTooLarge,
    MalformedHeaderField,
}

impl ValidatorError {

    /// Maps a `ValidatorError` to the corresponding `HttpStatus` code.
    pub fn into_http_status(self) -> HttpStatus {
        match self {
            ValidatorError::HttpVersionNotSupported => HttpStatus::HttpVersionNotSupported,
            ValidatorError::PayloadTooLarge => HttpStatus::PayloadTooLarge,
            ValidatorError::MalformedHeaderField => HttpStatus::BadRequest,
        }
    }
}

pub struct Validator;

impl Validator {

    /// Validates that the HTTP version is supported by the server configuration. (see [`http_version`](crate::config::ServerConfig::http_version))
    fn validate_http_version(v: (u8, u8)) -> Result<(), ValidatorError> {
        match HttpVersion::is_valid(v) {
            Ok(http_v) if http_v <= config().http_version => Ok(()),
            _ => Err(ValidatorError::HttpVersionNotSupported),
        }
    }

    /// public interface to enforce all validations on an `HttpRequest`
    pub fn validate_request(req: &HttpRequest) -> Result<(), ValidatorError> {
        Self::validate_http_version(req.http_version)?;

        let content_length = req
            .headers
            .get("Content-Length")
            .map(|v| v.parse::<usize>())
            .transpose()
            .map_err(|_| ValidatorError::MalformedHeaderField)?;

        if content_length.is_some() && content_length > Some(config().max_body_size) {
            return Err(ValidatorError::PayloadTooLarge);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ServerConfig, set_config};
    use crate::http::HttpMethod;
    use std::sync::Once;

    static INIT: Once = Once::new();

    fn setup() {
        INIT.call_once(|| set_config(ServerConfig::default()));
    }

    #[test]
    fn get_with_body_is_accepted() {
        setup();
        let mut req = HttpRequest::new();
        req.method = HttpMethod::Get;
        req.http_version = (1, 1);
        req.set_header(crate::http::request::RequestHeader::ContentLength, "3");
        assert!(Validator::validate_request(&req).is_ok());
    }

    #[test]
    fn post_without_content_length_is_accepted() {
        setup();
        let mut req = HttpRequest::new();
        req.method = HttpMethod::Post;
        req.http_version = (1, 1);
        assert!(Validator::validate_request(&req).is_ok());
    }

    #[test]
    fn unsupported_http_version_is_rejected() {
        setup();
        let mut req = HttpRequest::new();
        req.method = HttpMethod::Get;
        req.http_version = (2, 0);
        assert!(matches!(
            Validator::validate_request(&req),
            Err(ValidatorError::HttpVersionNotSupported)
        ));
    }

    #[test]
    fn oversized_body_is_rejected() {
        setup();
        let mut req = HttpRequest::new();
        req.method = HttpMethod::Post;
        req.http_version = (1, 1);
        req.set_header(
            crate::http::request::RequestHeader::ContentLength,
            &(config().max_body_size + 1).to_string(),
        );
        assert!(matches!(
            Validator::validate_request(&req),
            Err(ValidatorError::PayloadTooLarge)
        ));
    }
}
