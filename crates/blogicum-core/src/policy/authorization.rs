//! Mutation rights over posts and comments.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::visibility::is_visible_to_public;
use crate::domain::{Comment, CommentDetails, Post, PostDetails};

/// The party performing a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Actor {
    #[default]
    Anonymous,
    User(Uuid),
}

impl Actor {
    pub fn user_id(&self) -> Option<Uuid> {
        match self {
            Actor::Anonymous => None,
            Actor::User(id) => Some(*id),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Actor::User(_))
    }

    /// Whether this actor wrote `resource`.
    pub fn owns<R: Authored + ?Sized>(&self, resource: &R) -> bool {
        self.user_id() == Some(resource.author_id())
    }
}

/// A resource with a single owning author.
pub trait Authored {
    fn author_id(&self) -> Uuid;
}

impl Authored for Post {
    fn author_id(&self) -> Uuid {
        self.author_id
    }
}

impl Authored for PostDetails {
    fn author_id(&self) -> Uuid {
        self.post.author_id
    }
}

impl Authored for Comment {
    fn author_id(&self) -> Uuid {
        self.author_id
    }
}

impl Authored for CommentDetails {
    fn author_id(&self) -> Uuid {
        self.comment.author_id
    }
}

/// Whether `actor` may edit or delete `resource`.
///
/// Only the authenticated author qualifies; anonymous actors never do.
pub fn can_mutate<R: Authored + ?Sized>(actor: &Actor, resource: &R) -> bool {
    actor.is_authenticated() && actor.owns(resource)
}

/// Whether `actor` may read `post` at `now`: its author always may,
/// everybody else only once the post is public.
pub fn can_view(actor: &Actor, post: &PostDetails, now: DateTime<Utc>) -> bool {
    actor.owns(post) || is_visible_to_public(post, now)
}
