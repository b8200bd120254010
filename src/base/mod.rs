//! Building blocks shared by every handle-like type (`net::tcp::Tcp`, and
//! anything built on top of it): a type-erased per-slot callback table and
//! the small amount of bookkeeping (active/closed) every handle needs.

pub mod callbacks;
pub mod handle;
