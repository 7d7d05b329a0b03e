#![forbid(unsafe_code)]

//! Shared test infrastructure: an axum-backed HTTP test server and a
//! scripted static origin with per-path hit counters.

mod http_server;
mod static_site;

pub use http_server::TestHttpServer;
pub use static_site::StaticSite;
