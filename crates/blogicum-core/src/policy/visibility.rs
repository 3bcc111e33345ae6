//! Public visibility of posts.

use std::borrow::Borrow;

use chrono::{DateTime, Utc};

use crate::domain::{Location, PostDetails};

/// Whether an anonymous reader may see `post` at `now`.
///
/// A post is public once it is published, its publication time has been
/// reached (inclusive), and its category, if any, is published too.
pub fn is_visible_to_public(post: &PostDetails, now: DateTime<Utc>) -> bool {
    post.post.is_published
        && post.post.pub_date <= now
        && post.category.as_ref().is_none_or(|category| category.is_published)
}

/// Lazily keep the publicly visible posts of `candidates`, preserving order.
///
/// The owner bypass is not applied here; see [`crate::policy::can_view`].
pub fn relevant_posts<I>(candidates: I, now: DateTime<Utc>) -> impl Iterator<Item = I::Item>
where
    I: IntoIterator,
    I::Item: Borrow<PostDetails>,
{
    candidates
        .into_iter()
        .filter(move |post| is_visible_to_public(post.borrow(), now))
}

/// The location to display for `post`; unpublished locations are hidden.
pub fn visible_location(post: &PostDetails) -> Option<&Location> {
    post.location.as_ref().filter(|location| location.is_published)
}
