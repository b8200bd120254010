//! A small evented I/O runtime: a non-blocking TCP reactor binding, an
//! event-loop driver with a next-tick queue, and an HTTP/1.x request
//! parser and response writer built on top of it.
//!
//! This is an experimental clone of the shape `node.native` gave a C++
//! program, reimplemented on `async-std` instead of libuv. See the module
//! docs on [`node`], [`net::tcp`], and [`http`] for the three layers.

pub mod base;
pub mod config;
pub mod error;
pub mod http;
pub mod logging;
pub mod net;
pub mod node;
pub mod process;

pub use error::{Error, Resval};
