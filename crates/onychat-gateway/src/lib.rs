//! Onychat gateway library.
//! Exposes the router and ingress pieces for integration testing;
//! the binary entry point is in main.rs.

pub mod app;
pub mod auth;
pub mod cli;
pub mod http;
pub mod ws;
