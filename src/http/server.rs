//! HTTP server: the owning path from an accepted TCP connection through a
//! parsed request to a written response, grounded on `native::http::http`
//! and `client_context` (`native/http.h`).
//!
//! Each accepted connection gets its own [`ClientContext`], which owns the
//! socket, the parser, and the in-progress request for exactly as long as
//! the connection lives - there is no second owning reference anywhere
//! else, unlike the original `client_context`'s shared-ptr-plus-raw-backpointer
//! scheme, and no leaked context on the listener side either.

use std::net::SocketAddr;
use std::sync::Arc;

use async_std::future;
use async_std::io::prelude::*;

use crate::config::config;
use crate::error::Error;
use crate::http::parser::{Parser, ParserError, ParserOk};
use crate::http::request::HttpRequest;
use crate::http::response::HttpResponse;
use crate::http::validator::{Validator, ValidatorError};
use crate::net::tcp::Tcp;
use crate::node;

/// A request handler: given a fully parsed, validated request, produce the
/// response to send back.
pub trait Handler: Send + Sync + 'static {
    fn call(&self, req: &HttpRequest) -> HttpResponse;
}

impl<F> Handler for F
where
    F: Fn(&HttpRequest) -> HttpResponse + Send + Sync + 'static,
{
    fn call(&self, req: &HttpRequest) -> HttpResponse {
        self(req)
    }
}

enum ReadError {
    Io(std::io::Error),
    ConnectionClosed,
    Parser(ParserError),
    Validator(ValidatorError),
}

/// Owns one accepted connection for its entire lifetime: reads and parses
/// the request, runs the handler, writes the response, then drops the
/// socket. Nothing outlives `handle()`.
struct ClientContext {
    tcp: Tcp,
}

impl ClientContext {
    fn new(tcp: Tcp) -> Self {
        Self { tcp }
    }

    async fn read_request(&mut self) -> Result<HttpRequest, ReadError> {
        let mut parser = Parser::new();
        let mut req = HttpRequest::new();
        let mut buffer = vec![0u8; config().buffer_size];
        let stream = self.tcp.stream_mut().map_err(|_| ReadError::ConnectionClosed)?;

        // Every iteration reads another chunk and feeds it to the parser: a
        // request split across any number of TCP reads progresses one read
        // at a time, regardless of how much (or how little) of a
        // request-line/header/body field is still sitting unconsumed in the
        // parser's own internal buffer.
        loop {
            let n = match future::timeout(config().read_timeout, stream.read(&mut buffer)).await {
                Ok(Ok(0)) => return Err(ReadError::ConnectionClosed),
                Ok(Ok(n)) => n,
                Ok(Err(e)) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Ok(Err(e)) => return Err(ReadError::Io(e)),
                Err(_elapsed) => {
                    return Err(ReadError::Io(std::io::Error::new(
                        std::io::ErrorKind::TimedOut,
                        "read timed out",
                    )));
                }
            };

            let outcome = parser
                .feed(&buffer[..n], &mut req)
                .map_err(ReadError::Parser)?;

            match outcome {
                ParserOk::Incomplete | ParserOk::Ok => continue,
                ParserOk::HeadersDone => {
                    Validator::validate_request(&req).map_err(ReadError::Validator)?;
                    continue;
                }
                ParserOk::Done => break,
            }
        }

        Ok(req)
    }

    async fn write_response(&mut self, response: &mut HttpResponse) -> Result<(), Error> {
        let bytes = response.build();
        match future::timeout(config().write_timeout, self.tcp.write(&bytes, |_| {})).await {
            Ok(result) => result,
            Err(_elapsed) => Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::TimedOut,
                "write timed out",
            ))),
        }
    }

    async fn handle(mut self, handler: Arc<dyn Handler>) {
        let result = self.read_request().await;

        let mut response = match result {
            Ok(req) => handler.call(&req),
            Err(ReadError::ConnectionClosed) => {
                self.tcp.close(|| {});
                return;
            }
            Err(ReadError::Io(e)) => {
                log::warn!("i/o error while reading request: {e}");
                self.tcp.close(|| {});
                return;
            }
            Err(ReadError::Parser(e)) => {
                log::debug!("malformed request rejected: {:?}", e.into_http_status());
                HttpResponse::for_status(e.into_http_status())
            }
            Err(ReadError::Validator(e)) => {
                HttpResponse::for_status(e.into_http_status())
            }
        };

        if let Err(e) = self.write_response(&mut response).await {
            log::warn!("failed writing response: {e}");
        }

        self.tcp.close(|| {});
    }
}

/// A listening HTTP server bound to a single handler. Created via
/// [`create_server`].
pub struct Server {
    handler: Arc<dyn Handler>,
}

impl Server {
    /// Binds `addr` and accepts connections forever, spawning one task per
    /// client - the Rust analogue of `http::listen`'s "new client_context
    /// per accepted connection" loop.
    pub async fn listen(&self, addr: SocketAddr) -> Result<(), Error> {
        let mut tcp = Tcp::new();
        tcp.bind(addr).await?;
        self.serve(tcp).await
    }

    /// Serves on an already-bound handle. Lets a caller bind to port 0,
    /// read back the assigned port via `get_sock_name`, and only then start
    /// accepting - useful for tests that need a free port.
    pub async fn serve(&self, mut tcp: Tcp) -> Result<(), Error> {
        log::info!(
            "http server listening on {}",
            tcp.get_sock_name()
                .map(|a| a.to_string())
                .unwrap_or_else(|_| "?".to_string())
        );

        let handler = self.handler.clone();
        tcp.listen(move |client| {
            let ctx = ClientContext::new(client);
            node::spawn(ctx.handle(handler.clone()));
        })
        .await
    }
}

/// Builds a server around `handler`, mirroring `http::create_server`.
pub fn create_server<H>(handler: H) -> Server
where
    H: Handler,
{
    Server {
        handler: Arc::new(handler),
    }
}

/// Binds and serves forever in one call, the common case where a caller
/// doesn't need to hold onto the `Server` value.
pub async fn listen<H>(addr: SocketAddr, handler: H) -> Result<(), Error>
where
    H: Handler,
{
    create_server(handler).listen(addr).await
}
