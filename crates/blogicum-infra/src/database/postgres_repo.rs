//! PostgreSQL repository implementations.

use std::collections::HashMap;

use async_trait::async_trait;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
    SelectTwo,
};
use uuid::Uuid;

use blogicum_core::domain::{
    Author, Category, CommentDetails, Location, PostDetails, User,
};
use blogicum_core::error::RepoError;
use blogicum_core::ports::{
    CategoryRepository, CommentRepository, LocationRepository, PostRepository, UserRepository,
};
use blogicum_core::{Page, PageRequest, PostOrder, PostQuery, Visibility};

use super::entity::category::{self, Entity as CategoryEntity};
use super::entity::comment::{self, Entity as CommentEntity};
use super::entity::location::{self, Entity as LocationEntity};
use super::entity::post::{self, Entity as PostEntity};
use super::entity::user::{self, Entity as UserEntity};
use super::postgres_base::{PostgresBaseRepository, map_db_err};

/// PostgreSQL user repository.
pub type PostgresUserRepository = PostgresBaseRepository<UserEntity>;

/// PostgreSQL post repository.
pub type PostgresPostRepository = PostgresBaseRepository<PostEntity>;

/// PostgreSQL comment repository.
pub type PostgresCommentRepository = PostgresBaseRepository<CommentEntity>;

/// PostgreSQL category repository.
pub type PostgresCategoryRepository = PostgresBaseRepository<CategoryEntity>;

/// PostgreSQL location repository.
pub type PostgresLocationRepository = PostgresBaseRepository<LocationEntity>;

/// Mask the local part of an email address for logging.
fn mask_email(email: &str) -> String {
    match email.split_once('@') {
        Some((local, domain)) => match local.chars().next() {
            Some(first) if local.chars().count() > 1 => format!("{first}***@{domain}"),
            _ => format!("***@{domain}"),
        },
        None => "***".to_string(),
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        tracing::debug!(user_email = %mask_email(email), "Finding user by email");

        let result = UserEntity::find()
            .filter(user::Column::Email.eq(email))
            .one(self.db.as_ref())
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        let result = UserEntity::find()
            .filter(user::Column::Username.eq(username))
            .one(self.db.as_ref())
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }
}

type PostRow = (post::Model, Option<category::Model>);

/// Translate `query` into a post select joined with categories.
pub(crate) fn select_posts(query: &PostQuery) -> SelectTwo<PostEntity, CategoryEntity> {
    let mut select = PostEntity::find().find_also_related(CategoryEntity);

    if let Visibility::Public { now } = query.visibility() {
        select = select
            .filter(post::Column::IsPublished.eq(true))
            .filter(post::Column::PubDate.lte(now))
            .filter(
                Condition::any()
                    .add(post::Column::CategoryId.is_null())
                    .add(category::Column::IsPublished.eq(true)),
            );
    }
    if let Some(author_id) = query.author_id() {
        select = select.filter(post::Column::AuthorId.eq(author_id));
    }
    if let Some(category_id) = query.category_id() {
        select = select.filter(post::Column::CategoryId.eq(category_id));
    }

    let select = match query.order() {
        PostOrder::NewestPublished => select.order_by_desc(post::Column::PubDate),
        PostOrder::NewestCreated => select,
    };
    select
        .order_by_desc(post::Column::CreatedAt)
        .order_by_asc(post::Column::Id)
}

impl PostgresPostRepository {
    /// Attach authors, locations and comment counts to a batch of rows.
    async fn with_relations(&self, rows: Vec<PostRow>) -> Result<Vec<PostDetails>, RepoError> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let post_ids: Vec<Uuid> = rows.iter().map(|(post, _)| post.id).collect();
        let author_ids: Vec<Uuid> = rows.iter().map(|(post, _)| post.author_id).collect();
        let location_ids: Vec<Uuid> = rows
            .iter()
            .filter_map(|(post, _)| post.location_id)
            .collect();

        let authors: HashMap<Uuid, Author> = UserEntity::find()
            .filter(user::Column::Id.is_in(author_ids))
            .all(self.db.as_ref())
            .await
            .map_err(map_db_err)?
            .into_iter()
            .map(|model| {
                let user = User::from(model);
                (user.id, Author::from(&user))
            })
            .collect();

        let locations: HashMap<Uuid, Location> = if location_ids.is_empty() {
            HashMap::new()
        } else {
            LocationEntity::find()
                .filter(location::Column::Id.is_in(location_ids))
                .all(self.db.as_ref())
                .await
                .map_err(map_db_err)?
                .into_iter()
                .map(|model| (model.id, Location::from(model)))
                .collect()
        };

        let comment_counts: HashMap<Uuid, i64> = CommentEntity::find()
            .select_only()
            .column(comment::Column::PostId)
            .column_as(Expr::col(comment::Column::Id).count(), "comment_count")
            .filter(comment::Column::PostId.is_in(post_ids))
            .group_by(comment::Column::PostId)
            .into_tuple::<(Uuid, i64)>()
            .all(self.db.as_ref())
            .await
            .map_err(map_db_err)?
            .into_iter()
            .collect();

        rows.into_iter()
            .map(|(post, category)| -> Result<PostDetails, RepoError> {
                let author = authors.get(&post.author_id).cloned().ok_or_else(|| {
                    RepoError::Query(format!("dangling author reference {}", post.author_id))
                })?;
                let location = post.location_id.and_then(|id| locations.get(&id).cloned());
                let comment_count = comment_counts.get(&post.id).copied().unwrap_or(0);

                Ok(PostDetails {
                    author,
                    category: category.map(Category::from),
                    location,
                    comment_count: u64::try_from(comment_count).unwrap_or(0),
                    post: post.into(),
                })
            })
            .collect()
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn find_details(&self, id: Uuid) -> Result<Option<PostDetails>, RepoError> {
        let row = PostEntity::find_by_id(id)
            .find_also_related(CategoryEntity)
            .one(self.db.as_ref())
            .await
            .map_err(map_db_err)?;

        match row {
            Some(row) => Ok(self.with_relations(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn find_page(
        &self,
        query: &PostQuery,
        page: PageRequest,
    ) -> Result<Page<PostDetails>, RepoError> {
        let paginator = select_posts(query).paginate(self.db.as_ref(), page.per_page);

        let total_items = paginator.num_items().await.map_err(map_db_err)?;
        let number = page.resolve(total_items);
        let rows = paginator
            .fetch_page(number - 1)
            .await
            .map_err(map_db_err)?;

        tracing::debug!(
            page = number,
            total_items,
            "Fetched post page"
        );

        let items = self.with_relations(rows).await?;
        Ok(Page::new(items, number, page.per_page, total_items))
    }
}

#[async_trait]
impl CommentRepository for PostgresCommentRepository {
    async fn find_by_post(&self, post_id: Uuid) -> Result<Vec<CommentDetails>, RepoError> {
        let rows = CommentEntity::find()
            .filter(comment::Column::PostId.eq(post_id))
            .find_also_related(UserEntity)
            .order_by_asc(comment::Column::CreatedAt)
            .order_by_asc(comment::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(map_db_err)?;

        rows.into_iter()
            .map(|(comment, author)| -> Result<CommentDetails, RepoError> {
                let author = author.map(User::from).ok_or_else(|| {
                    RepoError::Query(format!("dangling author reference {}", comment.author_id))
                })?;

                Ok(CommentDetails {
                    author: Author::from(&author),
                    comment: comment.into(),
                })
            })
            .collect()
    }
}

#[async_trait]
impl CategoryRepository for PostgresCategoryRepository {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Category>, RepoError> {
        let result = CategoryEntity::find()
            .filter(category::Column::Slug.eq(slug))
            .one(self.db.as_ref())
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }
}

impl LocationRepository for PostgresLocationRepository {}
