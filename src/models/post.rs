use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Post entity representing a piece of content written by exactly one user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub is_published: bool,
    pub title: String,
    pub content: String,
    pub author_id: Uuid,
}

/// Input for creating a draft; the author is connected by email
#[derive(Debug, Clone, Deserialize)]
pub struct NewPost {
    pub title: String,
    pub content: String,
    pub author_email: String,
}

/// Partial update of a post. `None` fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PostUpdate {
    pub title: Option<String>,
    pub content: Option<String>,
    pub is_published: Option<bool>,
}

/// Row filter for post listings
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PostFilter {
    pub is_published: Option<bool>,
    pub author_id: Option<Uuid>,
}

impl Post {
    /// Create a new unpublished Post with generated ID and timestamps
    pub fn draft(author_id: Uuid, title: String, content: String) -> Self {
        let now = Utc::now();

        Post {
            id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
            is_published: false,
            title,
            content,
            author_id,
        }
    }

    /// Apply an update and refresh updated_at
    pub fn apply(&mut self, update: &PostUpdate) {
        if let Some(ref title) = update.title {
            self.title = title.clone();
        }

        if let Some(ref content) = update.content {
            self.content = content.clone();
        }

        if let Some(is_published) = update.is_published {
            self.is_published = is_published;
        }

        self.updated_at = Utc::now();
    }
}

impl PostUpdate {
    /// Update that only flips the publication flag on
    pub fn publish() -> Self {
        PostUpdate {
            is_published: Some(true),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.content.is_none() && self.is_published.is_none()
    }
}

impl PostFilter {
    pub fn published() -> Self {
        PostFilter {
            is_published: Some(true),
            author_id: None,
        }
    }

    pub fn drafts() -> Self {
        PostFilter {
            is_published: Some(false),
            author_id: None,
        }
    }

    pub fn by_author(author_id: Uuid) -> Self {
        PostFilter {
            is_published: None,
            author_id: Some(author_id),
        }
    }

    pub fn matches(&self, post: &Post) -> bool {
        self.is_published.map_or(true, |p| post.is_published == p)
            && self.author_id.map_or(true, |a| post.author_id == a)
    }
}
