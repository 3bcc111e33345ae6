//! # Blogicum Core
//!
//! The domain layer of Blogicum.
//! This crate contains the entities, the visibility and authorization rules
//! applied to them, and the ports that infrastructure implements. It has no
//! infrastructure dependencies.

pub mod domain;
pub mod error;
pub mod pagination;
pub mod policy;
pub mod ports;
pub mod query;

pub use error::{DomainError, RepoError};
pub use pagination::{Page, PageNumber, PageRequest};
pub use policy::{Actor, Authored, can_mutate, can_view, is_visible_to_public, relevant_posts};
pub use query::{PostOrder, PostQuery, Visibility};
