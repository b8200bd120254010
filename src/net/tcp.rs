//! Non-blocking TCP handle/stream, grounded on `native::detail::tcp`
//! (`native/net.h`): bind/listen/connect/read_start/write/shutdown/close,
//! plus the socket-option knobs (`nodelay`, `keepalive`,
//! `simultaneous_accepts`) the reactor exposed directly on the handle.
//!
//! `async-std`'s `TcpListener`/`TcpStream` stand in for the libuv `uv_tcp_t`
//! the original wrapped; `socket2` reaches through to the raw socket for the
//! options `async-std` doesn't expose itself, the same way the reactor
//! dropped to raw `uv_tcp_*` calls for them.

use async_std::io::prelude::*;
use async_std::net::{TcpListener, TcpStream};
use async_std::stream::StreamExt;
use socket2::SockRef;
use std::net::SocketAddr;
use std::time::Duration;

use crate::base::callbacks::{CallbackEntry, Cid};
use crate::base::handle::Handle;
use crate::error::{Error, Resval};

enum Inner {
    Unbound,
    Listener(TcpListener),
    Stream(TcpStream),
}

/// A TCP handle. Exactly one of "unbound" / "listening" / "connected" at a
/// time - mirrors the reactor binding's single `uv_tcp_t` whose role
/// (listener vs. connected stream) was determined by which calls had been
/// made on it, rather than by two distinct Rust types.
pub struct Tcp {
    handle: Handle,
    inner: Inner,
}

impl Tcp {
    pub fn new() -> Self {
        Self {
            handle: Handle::new(),
            inner: Inner::Unbound,
        }
    }

    pub fn from_stream(stream: TcpStream) -> Self {
        Self {
            handle: Handle::new(),
            inner: Inner::Stream(stream),
        }
    }

    pub fn is_active(&self) -> bool {
        self.handle.is_active()
    }

    /// Binds and starts listening in one step, since `async-std`'s
    /// `TcpListener::bind` already performs both.
    pub async fn bind(&mut self, addr: SocketAddr) -> Result<(), Error> {
        let listener = TcpListener::bind(addr).await?;
        self.inner = Inner::Listener(listener);
        Ok(())
    }

    /// Connects and routes the completion through the `Connect` slot of the
    /// callback table, invoking `on_connect` with the outcome once the
    /// connection attempt settles.
    pub async fn connect<F>(addr: SocketAddr, on_connect: F) -> Result<Self, Error>
    where
        F: FnOnce(Resval) + Send + 'static,
    {
        let mut tcp = Self::new();
        tcp.handle
            .callbacks()
            .store(Cid::Connect, CallbackEntry::Connect(Box::new(on_connect)));

        let result = TcpStream::connect(addr).await.map_err(Error::from);
        let outcome: Resval = result.as_ref().map(|_| ()).map_err(|e| e.clone()).into();
        if let Some(CallbackEntry::Connect(f)) = tcp.handle.callbacks().take(Cid::Connect) {
            f(outcome);
        }

        let stream = result?;
        tcp.inner = Inner::Stream(stream);
        Ok(tcp)
    }

    /// Drives the accept loop, invoking `on_connection` with a fresh `Tcp`
    /// for each accepted client. Returns once the listener is closed or
    /// errors; matches `stream::listen`'s "fire the callback per
    /// connection" contract rather than returning a single accepted socket.
    /// The callback is stored in the `Listen` slot and invoked from there on
    /// every acceptance, rather than called directly from the accept loop.
    pub async fn listen<F>(&mut self, on_connection: F) -> Result<(), Error>
    where
        F: FnMut(Tcp) + Send + 'static,
    {
        if !matches!(self.inner, Inner::Listener(_)) {
            return Err(Error::invalid_handle());
        }

        self.handle
            .callbacks()
            .store(Cid::Listen, CallbackEntry::Listen(Box::new(on_connection)));

        let listener = match &self.inner {
            Inner::Listener(l) => l,
            _ => unreachable!("checked above"),
        };
        let mut incoming = listener.incoming();
        while let Some(stream) = incoming.next().await {
            let stream = stream?;
            match self.handle.callbacks().get_mut(Cid::Listen) {
                Some(CallbackEntry::Listen(f)) => f(Tcp::from_stream(stream)),
                _ => unreachable!("listen callback missing from its own slot"),
            }
        }
        self.handle.callbacks().take(Cid::Listen);
        Ok(())
    }

    /// Reads repeatedly, invoking `on_read` with each non-empty chunk.
    /// `on_read` returns `false` to stop reading (the Rust analogue of
    /// `read_stop`), and is invoked once with an empty slice on EOF. The
    /// callback lives in the `ReadStart` slot for the duration of the loop
    /// and is looked up from there on every delivery.
    pub async fn read_start<F>(&mut self, buffer_size: usize, on_read: F) -> Result<(), Error>
    where
        F: FnMut(&[u8]) -> bool + Send + 'static,
    {
        if !matches!(self.inner, Inner::Stream(_)) {
            return Err(Error::invalid_handle());
        }

        self.handle
            .callbacks()
            .store(Cid::ReadStart, CallbackEntry::ReadStart(Box::new(on_read)));

        let stream = match &mut self.inner {
            Inner::Stream(s) => s,
            _ => unreachable!("checked above"),
        };

        let mut buf = vec![0u8; buffer_size];
        loop {
            let n = stream.read(&mut buf).await?;
            let keep_going = match self.handle.callbacks().get_mut(Cid::ReadStart) {
                Some(CallbackEntry::ReadStart(f)) => f(&buf[..n]),
                _ => unreachable!("read_start callback missing from its own slot"),
            };
            if n == 0 || !keep_going {
                self.handle.callbacks().take(Cid::ReadStart);
                return Ok(());
            }
        }
    }

    /// Escape hatch for callers (the HTTP server) that need direct
    /// `AsyncRead`/`AsyncWrite` access rather than the one-chunk-at-a-time
    /// `read_start` callback, e.g. to interleave reads with parser state
    /// that must be inspected between chunks.
    pub fn stream_mut(&mut self) -> Result<&mut TcpStream, Error> {
        match &mut self.inner {
            Inner::Stream(s) => Ok(s),
            _ => Err(Error::invalid_handle()),
        }
    }

    /// Writes `data` and routes the completion through the `Write` slot,
    /// invoking `on_complete` with the outcome once the write settles.
    pub async fn write<F>(&mut self, data: &[u8], on_complete: F) -> Result<(), Error>
    where
        F: FnOnce(Resval) + Send + 'static,
    {
        let stream = match &mut self.inner {
            Inner::Stream(s) => s,
            _ => return Err(Error::invalid_handle()),
        };

        self.handle
            .callbacks()
            .store(Cid::Write, CallbackEntry::Write(Box::new(on_complete)));

        let result = stream.write_all(data).await.map_err(Error::from);
        let outcome: Resval = result.clone().into();
        if let Some(CallbackEntry::Write(f)) = self.handle.callbacks().take(Cid::Write) {
            f(outcome);
        }
        result
    }

    /// Shuts the write half down and routes the completion through the
    /// `Shutdown` slot.
    pub fn shutdown<F>(&mut self, on_complete: F) -> Result<(), Error>
    where
        F: FnOnce(Resval) + Send + 'static,
    {
        let stream = match &self.inner {
            Inner::Stream(s) => s,
            _ => return Err(Error::invalid_handle()),
        };

        self.handle
            .callbacks()
            .store(Cid::Shutdown, CallbackEntry::Shutdown(Box::new(on_complete)));

        let result = stream.shutdown(std::net::Shutdown::Write).map_err(Error::from);
        let outcome: Resval = result.clone().into();
        if let Some(CallbackEntry::Shutdown(f)) = self.handle.callbacks().take(Cid::Shutdown) {
            f(outcome);
        }
        result
    }

    /// Closes the handle, routing `on_close` through `Handle::close`'s own
    /// `Close` slot.
    pub fn close<F>(&mut self, on_close: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.handle.close(on_close);
        self.inner = Inner::Unbound;
    }

    fn sock_ref(&self) -> Result<SockRef<'_>, Error> {
        match &self.inner {
            Inner::Stream(s) => Ok(SockRef::from(s)),
            Inner::Listener(l) => Ok(SockRef::from(l)),
            Inner::Unbound => Err(Error::invalid_handle()),
        }
    }

    pub fn nodelay(&self, enable: bool) -> Result<(), Error> {
        self.sock_ref()?.set_nodelay(enable)?;
        Ok(())
    }

    pub fn keepalive(&self, enable: bool, delay: Duration) -> Result<(), Error> {
        let sock = self.sock_ref()?;
        if enable {
            let ka = socket2::TcpKeepalive::new().with_time(delay);
            sock.set_tcp_keepalive(&ka)?;
        } else {
            sock.set_keepalive(false)?;
        }
        Ok(())
    }

    /// On platforms without IOCP (everything but Windows) there is nothing
    /// to toggle; accepted for interface parity with the reactor binding.
    pub fn simultaneous_accepts(&self, _enable: bool) -> Result<(), Error> {
        Ok(())
    }

    pub fn get_sock_name(&self) -> Result<SocketAddr, Error> {
        match &self.inner {
            Inner::Stream(s) => Ok(s.local_addr()?),
            Inner::Listener(l) => Ok(l.local_addr()?),
            Inner::Unbound => Err(Error::invalid_handle()),
        }
    }

    pub fn get_peer_name(&self) -> Result<SocketAddr, Error> {
        match &self.inner {
            Inner::Stream(s) => Ok(s.peer_addr()?),
            _ => Err(Error::invalid_handle()),
        }
    }
}

impl Default for Tcp {
    fn default() -> Self {
        Self::new()
    }
}
