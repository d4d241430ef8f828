use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

use super::Datastore;
use crate::error::{ApiError, ApiResult};
use crate::models::{NewPost, NewUser, Post, PostFilter, PostUpdate, User};

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    posts: Vec<Post>,
}

/// In-process store with the same semantics as the PostgreSQL tables:
/// unique emails, posts bound to an existing author, no cascading deletes.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Datastore for MemoryStore {
    async fn health_check(&self) -> ApiResult<()> {
        Ok(())
    }

    async fn posts(&self, filter: PostFilter) -> ApiResult<Vec<Post>> {
        let tables = self.tables.read().await;

        let mut posts: Vec<Post> = tables
            .posts
            .iter()
            .filter(|p| filter.matches(p))
            .cloned()
            .collect();
        // Same ordering as the SQL `ORDER BY created_at, id`
        posts.sort_by(|a, b| (a.created_at, a.id).cmp(&(b.created_at, b.id)));

        Ok(posts)
    }

    async fn post(&self, id: Uuid) -> ApiResult<Option<Post>> {
        let tables = self.tables.read().await;
        Ok(tables.posts.iter().find(|p| p.id == id).cloned())
    }

    async fn create_post(&self, input: NewPost) -> ApiResult<Post> {
        let mut tables = self.tables.write().await;

        let author_id = tables
            .users
            .iter()
            .find(|u| u.email == input.author_email)
            .map(|u| u.id)
            .ok_or_else(|| {
                ApiError::NotFound(format!("User with email {}", input.author_email))
            })?;

        let post = Post::draft(author_id, input.title, input.content);
        tables.posts.push(post.clone());

        info!("Created post with id: {}", post.id);
        Ok(post)
    }

    async fn update_post(&self, id: Uuid, update: PostUpdate) -> ApiResult<Option<Post>> {
        let mut tables = self.tables.write().await;

        Ok(tables.posts.iter_mut().find(|p| p.id == id).map(|post| {
            if update.is_empty() {
                return post.clone();
            }
            post.apply(&update);
            info!("Updated post with id: {}", post.id);
            post.clone()
        }))
    }

    async fn delete_post(&self, id: Uuid) -> ApiResult<Option<Post>> {
        let mut tables = self.tables.write().await;

        let Some(index) = tables.posts.iter().position(|p| p.id == id) else {
            return Ok(None);
        };

        info!("Deleted post with id: {}", id);
        Ok(Some(tables.posts.remove(index)))
    }

    async fn user(&self, id: Uuid) -> ApiResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.id == id).cloned())
    }

    async fn user_by_email(&self, email: &str) -> ApiResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.email == email).cloned())
    }

    async fn create_user(&self, input: NewUser) -> ApiResult<User> {
        let mut tables = self.tables.write().await;

        if tables.users.iter().any(|u| u.email == input.email) {
            return Err(ApiError::conflict("Email address already exists"));
        }

        let user = input.into_user();
        tables.users.push(user.clone());

        info!("Created user with id: {}", user.id);
        Ok(user)
    }
}
