use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 登録済みユーザーを表すドメインモデル。
/// 投稿一覧は持たず、`Datastore::posts` に `author_id` で問い合わせて取得する。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// ユーザー作成時の入力。
/// `email` の一意性はストア側 (UNIQUE 制約) が保証する。
#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub name: String,
    pub email: String,
}

impl User {
    /// UUID とタイムスタンプを自前で埋めた `User` を生成する。
    pub fn new(name: String, email: String) -> Self {
        let now = Utc::now();

        User {
            id: Uuid::new_v4(),
            email,
            name,
            created_at: now,
            updated_at: now,
        }
    }
}

impl NewUser {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        NewUser {
            name: name.into(),
            email: email.into(),
        }
    }

    pub fn into_user(self) -> User {
        User::new(self.name, self.email)
    }
}
