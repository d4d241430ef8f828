use std::sync::Arc;

use async_graphql::{Context, EmptySubscription, ErrorExtensions, Object, Schema, ID};
use tracing::info;

use crate::db::Datastore;
use crate::models::{parse_uuid, NewPost, PostFilter, PostUpdate};

use super::types::Post;

pub type BlogSchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;

/// Build the schema around a shared store handle
pub fn build_schema(store: Arc<dyn Datastore>, depth_limit: usize) -> BlogSchema {
    Schema::build(QueryRoot, MutationRoot, EmptySubscription)
        .data(store)
        .limit_depth(depth_limit)
        .finish()
}

pub(crate) fn datastore<'ctx>(
    ctx: &Context<'ctx>,
) -> async_graphql::Result<&'ctx Arc<dyn Datastore>> {
    ctx.data::<Arc<dyn Datastore>>()
}

fn post_id(id: &ID) -> async_graphql::Result<uuid::Uuid> {
    parse_uuid(id, "post").map_err(|e| e.extend())
}

pub struct QueryRoot;

#[Object]
impl QueryRoot {
    /// Published posts, oldest first
    async fn feed(&self, ctx: &Context<'_>) -> async_graphql::Result<Vec<Post>> {
        let posts = datastore(ctx)?
            .posts(PostFilter::published())
            .await
            .map_err(|e| e.extend())?;

        Ok(posts.into_iter().map(Post::from).collect())
    }

    /// Unpublished posts, oldest first
    async fn drafts(&self, ctx: &Context<'_>) -> async_graphql::Result<Vec<Post>> {
        let posts = datastore(ctx)?
            .posts(PostFilter::drafts())
            .await
            .map_err(|e| e.extend())?;

        Ok(posts.into_iter().map(Post::from).collect())
    }

    async fn post(&self, ctx: &Context<'_>, id: ID) -> async_graphql::Result<Option<Post>> {
        let id = post_id(&id)?;
        let post = datastore(ctx)?.post(id).await.map_err(|e| e.extend())?;

        Ok(post.map(Post::from))
    }
}

pub struct MutationRoot;

#[Object]
impl MutationRoot {
    /// Create an unpublished post for the user with `author_email`
    async fn create_draft(
        &self,
        ctx: &Context<'_>,
        title: String,
        content: String,
        author_email: String,
    ) -> async_graphql::Result<Post> {
        info!("Creating draft '{}' for author: {}", title, author_email);

        let post = datastore(ctx)?
            .create_post(NewPost {
                title,
                content,
                author_email,
            })
            .await
            .map_err(|e| e.extend())?;

        Ok(post.into())
    }

    async fn delete_post(&self, ctx: &Context<'_>, id: ID) -> async_graphql::Result<Option<Post>> {
        let id = post_id(&id)?;
        info!("Deleting post with id: {}", id);

        let post = datastore(ctx)?.delete_post(id).await.map_err(|e| e.extend())?;

        Ok(post.map(Post::from))
    }

    /// Mark a post as published. Publishing an already published post is a no-op.
    async fn publish(&self, ctx: &Context<'_>, id: ID) -> async_graphql::Result<Option<Post>> {
        let id = post_id(&id)?;
        info!("Publishing post with id: {}", id);

        let post = datastore(ctx)?
            .update_post(id, PostUpdate::publish())
            .await
            .map_err(|e| e.extend())?;

        Ok(post.map(Post::from))
    }
}
