// Models module

pub mod post;
pub mod user;

use uuid::Uuid;

use crate::error::ApiError;

// Re-export commonly used types
pub use post::{NewPost, Post, PostFilter, PostUpdate};
pub use user::{NewUser, User};

/// Parse an incoming identifier, naming the resource in the error
pub fn parse_uuid(raw: &str, resource: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw.trim())
        .map_err(|_| ApiError::validation(format!("Invalid {} ID format", resource)))
}
