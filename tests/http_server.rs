//! End-to-end coverage of the HTTP server: bind a real loopback socket,
//! drive it with a real TCP client, and check the bytes that come back.

use std::sync::Once;

use async_std::io::prelude::*;
use async_std::net::TcpStream;
use async_std::task;
use everloop::config::{ServerConfig, set_config};
use everloop::http::request::HttpRequest;
use everloop::http::response::HttpResponse;
use everloop::http::server;
use everloop::net::tcp::Tcp;

static INIT: Once = Once::new();

fn setup() {
    INIT.call_once(|| {
        let _ = set_config(ServerConfig::default());
    });
}

/// Binds on an ephemeral port, starts serving in the background, and
/// returns the address clients should connect to.
async fn spawn_server<H>(handler: H) -> std::net::SocketAddr
where
    H: Fn(&HttpRequest) -> HttpResponse + Send + Sync + 'static,
{
    setup();
    let mut tcp = Tcp::new();
    tcp.bind("127.0.0.1:0".parse().unwrap()).await.unwrap();
    let addr = tcp.get_sock_name().unwrap();

    let srv = server::create_server(handler);
    task::spawn(async move {
        let _ = srv.serve(tcp).await;
    });

    addr
}

async fn read_all(stream: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    loop {
        match stream.read(&mut chunk).await {
            Ok(0) => break,
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
            Err(_) => break,
        }
    }
    String::from_utf8_lossy(&buf).to_string()
}

#[async_std::test]
async fn simple_get_round_trip() {
    let addr = spawn_server(|req: &HttpRequest| {
        let mut res = HttpResponse::new();
        res.set_body(format!("path={}", req.url().path()).into_bytes());
        res
    })
    .await;

    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream
        .write_all(b"GET /hello HTTP/1.1\r\nHost: example.com\r\n\r\n")
        .await
        .unwrap();
    stream.shutdown(std::net::Shutdown::Write).ok();

    let response = read_all(&mut stream).await;
    assert!(response.starts_with("HTTP/1.1 200 OK\r\n"), "{response}");
    assert!(response.ends_with("path=/hello"), "{response}");
}

#[async_std::test]
async fn post_body_delivered_across_fragmented_writes() {
    let addr = spawn_server(|req: &HttpRequest| {
        let mut res = HttpResponse::new();
        res.set_body(req.get_body().to_vec());
        res
    })
    .await;

    let mut stream = TcpStream::connect(addr).await.unwrap();
    let request = b"POST /echo HTTP/1.1\r\nHost: x\r\nContent-Length: 5\r\n\r\nHello";
    for chunk in request.chunks(3) {
        stream.write_all(chunk).await.unwrap();
        task::sleep(std::time::Duration::from_millis(1)).await;
    }
    stream.shutdown(std::net::Shutdown::Write).ok();

    let response = read_all(&mut stream).await;
    assert!(response.starts_with("HTTP/1.1 200 OK\r\n"), "{response}");
    assert!(response.ends_with("Hello"), "{response}");
}

#[async_std::test]
async fn malformed_request_line_yields_400() {
    let addr = spawn_server(|_req: &HttpRequest| HttpResponse::new()).await;

    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(b"NOTAMETHOD / HTTP/1.1\r\n\r\n").await.unwrap();
    stream.shutdown(std::net::Shutdown::Write).ok();

    let response = read_all(&mut stream).await;
    assert!(response.starts_with("HTTP/1.1 400 Bad Request\r\n"), "{response}");
}

#[async_std::test]
async fn get_with_body_reaches_the_handler() {
    let addr = spawn_server(|req: &HttpRequest| {
        let mut res = HttpResponse::new();
        res.set_body(req.get_body().to_vec());
        res
    })
    .await;

    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream
        .write_all(b"GET / HTTP/1.1\r\nHost: x\r\nContent-Length: 3\r\n\r\nabc")
        .await
        .unwrap();
    stream.shutdown(std::net::Shutdown::Write).ok();

    let response = read_all(&mut stream).await;
    assert!(response.starts_with("HTTP/1.1 200 OK\r\n"), "{response}");
    assert!(response.ends_with("abc"), "{response}");
}

#[async_std::test]
async fn duplicate_headers_reach_the_handler_combined() {
    let addr = spawn_server(|req: &HttpRequest| {
        let mut res = HttpResponse::new();
        let tag = req.get_header("X-Tag").unwrap_or("").to_string();
        res.set_body(tag.into_bytes());
        res
    })
    .await;

    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream
        .write_all(b"GET / HTTP/1.1\r\nHost: x\r\nX-Tag: a\r\nX-Tag: b\r\n\r\n")
        .await
        .unwrap();
    stream.shutdown(std::net::Shutdown::Write).ok();

    let response = read_all(&mut stream).await;
    assert!(response.ends_with("a, b"), "{response}");
}
