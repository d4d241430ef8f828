//! Database client layer.
//!
//! Resolvers never talk to PostgreSQL directly; they go through the
//! [`Datastore`] trait so the same schema can be served from the pooled
//! PostgreSQL client or from the in-memory store used in tests.

mod memory;
mod postgres;
mod seed;

pub use memory::MemoryStore;
pub use postgres::Database;
pub use seed::{demo_users, seed_users};

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::ApiResult;
use crate::models::{NewPost, NewUser, Post, PostFilter, PostUpdate, User};

#[async_trait]
pub trait Datastore: Send + Sync {
    /// Round-trip to the backing store
    async fn health_check(&self) -> ApiResult<()>;

    /// Posts matching `filter`, oldest first (`created_at`, then `id`)
    async fn posts(&self, filter: PostFilter) -> ApiResult<Vec<Post>>;

    async fn post(&self, id: Uuid) -> ApiResult<Option<Post>>;

    /// Insert an unpublished post connected to the user owning `author_email`.
    /// Fails with `NotFound` when no such user exists.
    async fn create_post(&self, input: NewPost) -> ApiResult<Post>;

    /// Returns `None` when the post does not exist
    async fn update_post(&self, id: Uuid, update: PostUpdate) -> ApiResult<Option<Post>>;

    /// Returns the deleted post, or `None` when it did not exist. The author is kept.
    async fn delete_post(&self, id: Uuid) -> ApiResult<Option<Post>>;

    async fn user(&self, id: Uuid) -> ApiResult<Option<User>>;

    async fn user_by_email(&self, email: &str) -> ApiResult<Option<User>>;

    /// Fails with `Conflict` when the email is already taken
    async fn create_user(&self, input: NewUser) -> ApiResult<User>;
}
