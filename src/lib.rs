// Library root for the blog GraphQL API

pub mod config;
pub mod db;
pub mod error;
pub mod graphql;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod state;

// Re-export commonly used types
pub use db::{Database, Datastore, MemoryStore};
pub use error::{ApiError, ApiResult};
pub use graphql::{build_schema, BlogSchema};
pub use models::{NewPost, NewUser, Post, PostFilter, PostUpdate, User};
pub use state::AppState;
