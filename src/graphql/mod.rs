//! GraphQL schema and resolvers.
//!
//! Every resolver is a single call on the [`Datastore`](crate::db::Datastore)
//! handle stored in the schema data; failures from the store are returned as
//! GraphQL errors carrying an `extensions.code`.
//!
//! - **Queries**: `feed`, `drafts`, `post(id)`
//! - **Mutations**: `createDraft(title, content, authorEmail)`, `deletePost(id)`, `publish(id)`

mod schema;
mod types;

pub use schema::{build_schema, BlogSchema, MutationRoot, QueryRoot};
pub use types::{Post, User};
