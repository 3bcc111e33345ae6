use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use uuid::Uuid;

use blogicum_core::RepoError;
use blogicum_core::domain::{Author, Category, Comment, Location, Post, PostDetails, User};

use super::repository::{
    InMemoryCategoryRepository, InMemoryCommentRepository, InMemoryLocationRepository,
    InMemoryPostRepository, InMemoryRepository, InMemoryUserRepository,
};

/// The rows of every table, keyed by primary key.
#[derive(Debug, Default)]
pub struct MemoryTables {
    pub(super) users: HashMap<Uuid, User>,
    pub(super) categories: HashMap<Uuid, Category>,
    pub(super) locations: HashMap<Uuid, Location>,
    pub(super) posts: HashMap<Uuid, Post>,
    pub(super) comments: HashMap<Uuid, Comment>,
}

impl MemoryTables {
    pub(super) fn author(&self, user_id: Uuid) -> Result<Author, RepoError> {
        self.users
            .get(&user_id)
            .map(Author::from)
            .ok_or_else(|| RepoError::Query(format!("dangling author reference {user_id}")))
    }

    pub(super) fn post_details(&self, post: &Post) -> Result<PostDetails, RepoError> {
        let comment_count = self
            .comments
            .values()
            .filter(|comment| comment.post_id == post.id)
            .count();

        Ok(PostDetails {
            author: self.author(post.author_id)?,
            category: post
                .category_id
                .and_then(|id| self.categories.get(&id).cloned()),
            location: post
                .location_id
                .and_then(|id| self.locations.get(&id).cloned()),
            comment_count: comment_count as u64,
            post: post.clone(),
        })
    }

    fn remove_post(&mut self, post_id: Uuid) {
        self.posts.remove(&post_id);
        self.comments.retain(|_, comment| comment.post_id != post_id);
    }
}

/// Shared handle to the in-memory tables. Clones share the same data.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<RwLock<MemoryTables>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn users(&self) -> InMemoryUserRepository {
        InMemoryRepository::new(self.tables.clone())
    }

    pub fn posts(&self) -> InMemoryPostRepository {
        InMemoryRepository::new(self.tables.clone())
    }

    pub fn comments(&self) -> InMemoryCommentRepository {
        InMemoryRepository::new(self.tables.clone())
    }

    pub fn categories(&self) -> InMemoryCategoryRepository {
        InMemoryRepository::new(self.tables.clone())
    }

    pub fn locations(&self) -> InMemoryLocationRepository {
        InMemoryRepository::new(self.tables.clone())
    }
}

/// A row type stored in [`MemoryTables`].
pub trait Record: Clone + Send + Sync + 'static {
    /// Entity name used in error messages.
    const ENTITY: &'static str;

    fn id(&self) -> Uuid;

    fn table(tables: &MemoryTables) -> &HashMap<Uuid, Self>;

    fn table_mut(tables: &mut MemoryTables) -> &mut HashMap<Uuid, Self>;

    /// Reject `self` if another row already holds one of its unique keys.
    fn check_unique(&self, _tables: &MemoryTables) -> Result<(), RepoError> {
        Ok(())
    }

    /// Referential actions, run after the row `id` has been removed.
    fn on_delete(_tables: &mut MemoryTables, _id: Uuid) {}
}

fn unique_violation(entity: &str, key: &str) -> RepoError {
    RepoError::Constraint(format!("{entity} with this {key} already exists"))
}

impl Record for User {
    const ENTITY: &'static str = "user";

    fn id(&self) -> Uuid {
        self.id
    }

    fn table(tables: &MemoryTables) -> &HashMap<Uuid, Self> {
        &tables.users
    }

    fn table_mut(tables: &mut MemoryTables) -> &mut HashMap<Uuid, Self> {
        &mut tables.users
    }

    fn check_unique(&self, tables: &MemoryTables) -> Result<(), RepoError> {
        for user in tables.users.values().filter(|user| user.id != self.id) {
            if user.username == self.username {
                return Err(unique_violation(Self::ENTITY, "username"));
            }
            if user.email == self.email {
                return Err(unique_violation(Self::ENTITY, "email"));
            }
        }
        Ok(())
    }

    fn on_delete(tables: &mut MemoryTables, id: Uuid) {
        let authored: Vec<Uuid> = tables
            .posts
            .values()
            .filter(|post| post.author_id == id)
            .map(|post| post.id)
            .collect();
        for post_id in authored {
            tables.remove_post(post_id);
        }
        tables.comments.retain(|_, comment| comment.author_id != id);
    }
}

impl Record for Category {
    const ENTITY: &'static str = "category";

    fn id(&self) -> Uuid {
        self.id
    }

    fn table(tables: &MemoryTables) -> &HashMap<Uuid, Self> {
        &tables.categories
    }

    fn table_mut(tables: &mut MemoryTables) -> &mut HashMap<Uuid, Self> {
        &mut tables.categories
    }

    fn check_unique(&self, tables: &MemoryTables) -> Result<(), RepoError> {
        let clash = tables
            .categories
            .values()
            .any(|category| category.id != self.id && category.slug == self.slug);

        if clash {
            return Err(unique_violation(Self::ENTITY, "slug"));
        }
        Ok(())
    }

    fn on_delete(tables: &mut MemoryTables, id: Uuid) {
        for post in tables.posts.values_mut() {
            if post.category_id == Some(id) {
                post.category_id = None;
            }
        }
    }
}

impl Record for Location {
    const ENTITY: &'static str = "location";

    fn id(&self) -> Uuid {
        self.id
    }

    fn table(tables: &MemoryTables) -> &HashMap<Uuid, Self> {
        &tables.locations
    }

    fn table_mut(tables: &mut MemoryTables) -> &mut HashMap<Uuid, Self> {
        &mut tables.locations
    }

    fn on_delete(tables: &mut MemoryTables, id: Uuid) {
        for post in tables.posts.values_mut() {
            if post.location_id == Some(id) {
                post.location_id = None;
            }
        }
    }
}

impl Record for Post {
    const ENTITY: &'static str = "post";

    fn id(&self) -> Uuid {
        self.id
    }

    fn table(tables: &MemoryTables) -> &HashMap<Uuid, Self> {
        &tables.posts
    }

    fn table_mut(tables: &mut MemoryTables) -> &mut HashMap<Uuid, Self> {
        &mut tables.posts
    }

    fn on_delete(tables: &mut MemoryTables, id: Uuid) {
        tables.remove_post(id);
    }
}

impl Record for Comment {
    const ENTITY: &'static str = "comment";

    fn id(&self) -> Uuid {
        self.id
    }

    fn table(tables: &MemoryTables) -> &HashMap<Uuid, Self> {
        &tables.comments
    }

    fn table_mut(tables: &mut MemoryTables) -> &mut HashMap<Uuid, Self> {
        &mut tables.comments
    }
}
