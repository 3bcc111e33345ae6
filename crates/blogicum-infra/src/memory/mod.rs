//! In-memory persistence - used when no database is configured, and in tests.
//!
//! All repositories handed out by one [`InMemoryStore`] share the same tables,
//! so referential actions (cascades, `SET NULL`) behave like the SQL schema.
//! Data is lost on process restart.

mod repository;
mod store;

pub use repository::{
    InMemoryCategoryRepository, InMemoryCommentRepository, InMemoryLocationRepository,
    InMemoryPostRepository, InMemoryRepository, InMemoryUserRepository,
};
pub use store::{InMemoryStore, MemoryTables, Record};
