//! Unified error type for the reactor, TCP, and HTTP-parsing layers.
//!
//! Mirrors the single tagged `resval` value the reactor binding used for
//! both libuv status codes and parser failures: one `Error` spans I/O
//! failures, URL/HTTP parsing failures, and protocol violations so a
//! caller never has to match on two unrelated error hierarchies.

use std::fmt;

#[derive(Debug)]
pub enum Error {
    /// The underlying reactor (socket, listener, ...) reported an I/O failure.
    Io(std::io::Error),

    /// A handle was used in a state it does not support (e.g. `write` on an
    /// unbound handle, `listen` on a connected stream).
    InvalidHandle,

    /// The peer closed the connection before a full request could be read.
    ConnectionClosed,

    /// The URL could not be decomposed into its components.
    UrlParse,

    /// Syntactic HTTP parsing error (malformed request line, header, etc).
    HttpParse,

    /// The request line, a header line, or the body exceeded a configured limit.
    TooLong,

    /// More data is required before the current stage can complete; not a
    /// real failure, used internally to distinguish "done" from "yield".
    Incomplete,
}

impl Error {
    pub fn invalid_handle() -> Self {
        Error::InvalidHandle
    }
}

impl Clone for Error {
    fn clone(&self) -> Self {
        match self {
            Error::Io(e) => Error::Io(std::io::Error::new(e.kind(), e.to_string())),
            Error::InvalidHandle => Error::InvalidHandle,
            Error::ConnectionClosed => Error::ConnectionClosed,
            Error::UrlParse => Error::UrlParse,
            Error::HttpParse => Error::HttpParse,
            Error::TooLong => Error::TooLong,
            Error::Incomplete => Error::Incomplete,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(e) => write!(f, "io error: {e}"),
            Error::InvalidHandle => write!(f, "handle used in an unsupported state"),
            Error::ConnectionClosed => write!(f, "connection closed by peer"),
            Error::UrlParse => write!(f, "malformed url"),
            Error::HttpParse => write!(f, "malformed http request"),
            Error::TooLong => write!(f, "request exceeded a configured size limit"),
            Error::Incomplete => write!(f, "incomplete data"),
        }
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}

/// A falsy-when-ok result value, kept around for call sites that want to test
/// success without unwrapping a `Result` (e.g. inside a callback invoked from
/// a completion handler where propagating `?` is awkward).
pub struct Resval(pub Option<Error>);

impl Resval {
    pub fn ok() -> Self {
        Resval(None)
    }

    pub fn from_err(e: Error) -> Self {
        Resval(Some(e))
    }

    pub fn is_ok(&self) -> bool {
        self.0.is_none()
    }

    pub fn into_result(self) -> Result<(), Error> {
        match self.0 {
            None => Ok(()),
            Some(e) => Err(e),
        }
    }
}

impl From<std::io::Result<()>> for Resval {
    fn from(r: std::io::Result<()>) -> Self {
        match r {
            Ok(()) => Resval::ok(),
            Err(e) => Resval::from_err(Error::Io(e)),
        }
    }
}

impl From<Result<(), Error>> for Resval {
    fn from(r: Result<(), Error>) -> Self {
        match r {
            Ok(()) => Resval::ok(),
            Err(e) => Resval::from_err(e),
        }
    }
}
