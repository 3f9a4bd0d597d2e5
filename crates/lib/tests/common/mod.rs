//! Helpers shared by the integration tests: serve a router on a free loopback port.

#![allow(dead_code)]

use axum::Router;
use std::net::SocketAddr;

/// Serve `app` on 127.0.0.1 with an OS-assigned port. The server task is left running when the test ends.
pub async fn spawn(app: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind free port");
    let addr = listener.local_addr().expect("local_addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    addr
}

/// A port nothing is listening on (bound once, then released).
pub fn free_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind free port");
    listener.local_addr().expect("local_addr").port()
}
