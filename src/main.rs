//! Minimal demo entry point, the Rust analogue of the reactor binding's
//! `sample.cpp`/`webserver.cpp`: load configuration, install logging, and
//! serve a single static response on every request.

use everloop::config::{self, ServerConfig};
use everloop::http::request::HttpRequest;
use everloop::http::response::HttpResponse;
use everloop::http::server;
use everloop::{logging, node};

fn main() -> std::io::Result<()> {
    logging::init();

    let cfg = std::env::args()
        .nth(1)
        .map(|path| ServerConfig::from_file(&path))
        .unwrap_or_default();
    let addr = std::net::SocketAddr::new(cfg.address, cfg.port);
    config::set_config(cfg);

    node::start(|| async move {
        server::listen(addr, |req: &HttpRequest| {
            let mut res = HttpResponse::new();
            res.set_body(format!("hello from {}\n", req.url().path()).into_bytes());
            res
        })
        .await
        .map_err(|e| std::io::Error::other(e.to_string()))
    })
}
