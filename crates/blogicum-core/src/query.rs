//! Composable post queries.
//!
//! A [`PostQuery`] collects filters and an ordering without touching storage.
//! Repositories execute it in one read: the in-memory store through
//! [`PostQuery::matches`] and [`PostQuery::compare`], the database by
//! translating each clause into SQL.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::PostDetails;
use crate::policy::is_visible_to_public;

/// Which posts a query may return regardless of other filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    #[default]
    All,
    /// Only posts visible to the public at `now`.
    Public { now: DateTime<Utc> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PostOrder {
    /// Latest publication time first.
    #[default]
    NewestPublished,
    /// Latest creation time first.
    NewestCreated,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostQuery {
    visibility: Visibility,
    author_id: Option<Uuid>,
    category_id: Option<Uuid>,
    order: PostOrder,
}

impl PostQuery {
    /// Every post, newest publication first.
    pub fn all() -> Self {
        Self::default()
    }

    /// Restrict to posts visible to the public at `now`.
    pub fn relevant(mut self, now: DateTime<Utc>) -> Self {
        self.visibility = Visibility::Public { now };
        self
    }

    pub fn by_author(mut self, author_id: Uuid) -> Self {
        self.author_id = Some(author_id);
        self
    }

    pub fn in_category(mut self, category_id: Uuid) -> Self {
        self.category_id = Some(category_id);
        self
    }

    pub fn ordered_by(mut self, order: PostOrder) -> Self {
        self.order = order;
        self
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    pub fn author_id(&self) -> Option<Uuid> {
        self.author_id
    }

    pub fn category_id(&self) -> Option<Uuid> {
        self.category_id
    }

    pub fn order(&self) -> PostOrder {
        self.order
    }

    /// Whether `post` satisfies every filter of this query.
    pub fn matches(&self, post: &PostDetails) -> bool {
        let visible = match self.visibility {
            Visibility::All => true,
            Visibility::Public { now } => is_visible_to_public(post, now),
        };

        visible
            && self.author_id.is_none_or(|id| post.post.author_id == id)
            && self.category_id.is_none_or(|id| post.post.category_id == Some(id))
    }

    /// Ordering of two matching posts; ties fall back to creation time, then id.
    pub fn compare(&self, a: &PostDetails, b: &PostDetails) -> Ordering {
        let primary = match self.order {
            PostOrder::NewestPublished => b.post.pub_date.cmp(&a.post.pub_date),
            PostOrder::NewestCreated => Ordering::Equal,
        };

        primary
            .then_with(|| b.post.created_at.cmp(&a.post.created_at))
            .then_with(|| a.post.id.cmp(&b.post.id))
    }
}
