//! Who may see what, and who may change what.
//!
//! Both rule sets are pure functions of their inputs. The current user and
//! the current time are passed in explicitly by the caller.

mod authorization;
mod visibility;

pub use authorization::{Actor, Authored, can_mutate, can_view};
pub use visibility::{is_visible_to_public, relevant_posts, visible_location};
