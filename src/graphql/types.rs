use async_graphql::{Context, ErrorExtensions, Object, ID};
use chrono::{DateTime, Utc};

use crate::error::ApiError;
use crate::models::{Post as ModelPost, PostFilter, User as ModelUser};

use super::schema::datastore;

/// A blog post
#[derive(Clone)]
pub struct Post(pub ModelPost);

/// An author of posts
#[derive(Clone)]
pub struct User(pub ModelUser);

impl From<ModelPost> for Post {
    fn from(post: ModelPost) -> Self {
        Post(post)
    }
}

impl From<ModelUser> for User {
    fn from(user: ModelUser) -> Self {
        User(user)
    }
}

#[Object]
impl Post {
    async fn id(&self) -> ID {
        ID(self.0.id.to_string())
    }

    async fn created_at(&self) -> DateTime<Utc> {
        self.0.created_at
    }

    async fn updated_at(&self) -> DateTime<Utc> {
        self.0.updated_at
    }

    /// False while the post is a draft
    async fn is_published(&self) -> bool {
        self.0.is_published
    }

    async fn title(&self) -> &str {
        &self.0.title
    }

    async fn content(&self) -> &str {
        &self.0.content
    }

    async fn author(&self, ctx: &Context<'_>) -> async_graphql::Result<User> {
        let store = datastore(ctx)?;

        store
            .user(self.0.author_id)
            .await
            .map_err(|e| e.extend())?
            .map(User::from)
            .ok_or_else(|| ApiError::not_found(format!("Author of post {}", self.0.id)).extend())
    }
}

#[Object]
impl User {
    async fn id(&self) -> ID {
        ID(self.0.id.to_string())
    }

    async fn email(&self) -> &str {
        &self.0.email
    }

    async fn name(&self) -> &str {
        &self.0.name
    }

    /// Every post written by this user, drafts included
    async fn posts(&self, ctx: &Context<'_>) -> async_graphql::Result<Vec<Post>> {
        let store = datastore(ctx)?;

        let posts = store
            .posts(PostFilter::by_author(self.0.id))
            .await
            .map_err(|e| e.extend())?;

        Ok(posts.into_iter().map(Post::from).collect())
    }
}
