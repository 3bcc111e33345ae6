//! # Blogicum Shared
//!
//! Wire types of the Blogicum HTTP interface, shared by the server and any
//! Rust client.

pub mod dto;
pub mod response;

pub use response::{ErrorResponse, PageResponse};
