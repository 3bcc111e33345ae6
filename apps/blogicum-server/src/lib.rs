//! # Blogicum Server
//!
//! Actix-web application: configuration, shared state, extractors and the
//! route table. The binary in `main.rs` wires these together.

pub mod config;
pub mod handlers;
pub mod middleware;
pub mod pages;
pub mod state;
pub mod telemetry;
