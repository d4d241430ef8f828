use async_trait::async_trait;
use deadpool_postgres::{Config, Object, Pool, PoolConfig, Runtime};
use native_tls::TlsConnector;
use postgres_native_tls::MakeTlsConnector;
use postgres_types::ToSql;
use tokio_postgres::Row;
use tracing::{error, info, warn};
use uuid::Uuid;

use super::Datastore;
use crate::config::DatabaseConfig;
use crate::error::{ApiError, ApiResult};
use crate::models::{NewPost, NewUser, Post, PostFilter, PostUpdate, User};

const POST_COLUMNS: &str = "id, created_at, updated_at, is_published, title, content, author_id";
const USER_COLUMNS: &str = "id, email, name, created_at, updated_at";

/// PostgreSQL への接続プールを握るリポジトリ層。
/// Deadpool の `Pool` を内部に保持し、`Datastore` の各操作を 1 クエリずつ実装する。
#[derive(Clone)]
pub struct Database {
    pool: Pool,
}

impl Database {
    /// 接続プールを構築し、起動時に疎通確認まで実施する。
    pub async fn new(config: DatabaseConfig) -> Result<Self, ApiError> {
        info!("Creating PostgreSQL connection pool for host: {}:{}", config.host, config.port);

        let pool = Self::create_pool(config)?;

        let db = Database { pool };
        db.test_connection().await?;

        Ok(db)
    }

    /// Deadpool 用の `Config` を組み立ててプールを生成する内部関数。
    /// `match` で SSL モードを切り替え、`native_tls` で TLS コネクタを差し込んでいる。
    fn create_pool(config: DatabaseConfig) -> Result<Pool, ApiError> {
        let mut pg_config = Config::new();

        pg_config.host = Some(config.host);
        pg_config.port = Some(config.port);
        pg_config.dbname = Some(config.database);
        pg_config.user = Some(config.username);
        pg_config.password = Some(config.password);

        pg_config.ssl_mode = Some(match config.ssl_mode.as_str() {
            "disable" => deadpool_postgres::SslMode::Disable,
            "prefer" | "allow" => deadpool_postgres::SslMode::Prefer,
            "require" | "verify-ca" | "verify-full" => deadpool_postgres::SslMode::Require,
            other => {
                warn!("Unknown SSL mode '{}', defaulting to 'require'", other);
                deadpool_postgres::SslMode::Require
            }
        });

        pg_config.manager = Some(deadpool_postgres::ManagerConfig {
            recycling_method: deadpool_postgres::RecyclingMethod::Fast,
        });

        let mut pool_config = PoolConfig::new(config.max_connections as usize);
        pool_config.timeouts.wait = Some(config.connection_timeout);
        pool_config.timeouts.create = Some(config.connection_timeout);
        pg_config.pool = Some(pool_config);

        let tls_connector = TlsConnector::builder().build().map_err(|e| {
            error!("Failed to create TLS connector: {}", e);
            ApiError::Database(format!("TLS connector creation failed: {}", e))
        })?;
        let tls = MakeTlsConnector::new(tls_connector);

        pg_config.create_pool(Some(Runtime::Tokio1), tls).map_err(|e| {
            error!("Failed to create connection pool: {}", e);
            ApiError::Database(format!("Connection pool creation failed: {}", e))
        })
    }

    /// プールから接続を借りる小さなラッパー。
    async fn get_connection(&self) -> Result<Object, ApiError> {
        self.pool.get().await.map_err(ApiError::from)
    }

    /// アプリ起動時にテーブル群を CREATE する簡易マイグレーター。
    /// 何度実行しても結果が変わらないよう `IF NOT EXISTS` を付けている。
    pub async fn migrate(&self) -> Result<(), ApiError> {
        info!("Running database migrations");

        let client = self.get_connection().await?;

        let statements = [
            (
                "users table",
                r#"
                CREATE TABLE IF NOT EXISTS users (
                    id UUID PRIMARY KEY,
                    email VARCHAR(255) UNIQUE NOT NULL,
                    name VARCHAR(255) NOT NULL,
                    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
                )
                "#,
            ),
            (
                "posts table",
                r#"
                CREATE TABLE IF NOT EXISTS posts (
                    id UUID PRIMARY KEY,
                    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                    is_published BOOLEAN NOT NULL DEFAULT FALSE,
                    title TEXT NOT NULL,
                    content TEXT NOT NULL,
                    author_id UUID NOT NULL REFERENCES users(id)
                )
                "#,
            ),
            (
                "posts author_id index",
                "CREATE INDEX IF NOT EXISTS idx_posts_author_id ON posts(author_id)",
            ),
            (
                "posts is_published index",
                "CREATE INDEX IF NOT EXISTS idx_posts_is_published ON posts(is_published, created_at, id)",
            ),
        ];

        for (name, sql) in statements {
            client.execute(sql, &[]).await.map_err(|e| {
                error!("Failed to create {}: {}", name, e);
                ApiError::Database(format!("Migration of {} failed: {}", name, e))
            })?;
        }

        info!("Database migrations completed successfully");
        Ok(())
    }

    /// `Database::new` 直後にプール全体が機能するかの確認に使う。
    pub async fn test_connection(&self) -> Result<(), ApiError> {
        let client = self.get_connection().await?;

        client.execute("SELECT 1", &[]).await.map_err(|e| {
            error!("Database connection test failed: {}", e);
            ApiError::Database(format!("Connection test failed: {}", e))
        })?;

        info!("Database connection test successful");
        Ok(())
    }
}

fn post_from_row(row: &Row) -> Post {
    Post {
        id: row.get(0),
        created_at: row.get(1),
        updated_at: row.get(2),
        is_published: row.get(3),
        title: row.get(4),
        content: row.get(5),
        author_id: row.get(6),
    }
}

fn user_from_row(row: &Row) -> User {
    User {
        id: row.get(0),
        email: row.get(1),
        name: row.get(2),
        created_at: row.get(3),
        updated_at: row.get(4),
    }
}

#[async_trait]
impl Datastore for Database {
    /// `SELECT 1` を投げて DB が生きているか確認する。
    async fn health_check(&self) -> ApiResult<()> {
        let client = self.get_connection().await?;

        client.execute("SELECT 1", &[]).await.map_err(|e| {
            error!("Database health check failed: {}", e);
            ApiError::Database(format!("Health check failed: {}", e))
        })?;

        Ok(())
    }

    /// `PostFilter` の Option 値に応じて WHERE 句を動的に組み立てる。
    /// ベクタに `&(dyn ToSql + Sync)` を詰めるのは、プレースホルダに順番対応させるため。
    async fn posts(&self, filter: PostFilter) -> ApiResult<Vec<Post>> {
        let client = self.get_connection().await?;

        let mut conditions = Vec::new();
        let mut params: Vec<&(dyn ToSql + Sync)> = Vec::new();

        if let Some(ref is_published) = filter.is_published {
            params.push(is_published);
            conditions.push(format!("is_published = ${}", params.len()));
        }

        if let Some(ref author_id) = filter.author_id {
            params.push(author_id);
            conditions.push(format!("author_id = ${}", params.len()));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", conditions.join(" AND "))
        };

        let query = format!(
            "SELECT {} FROM posts{} ORDER BY created_at ASC, id ASC",
            POST_COLUMNS, where_clause
        );

        let rows = client.query(&query, &params).await.map_err(ApiError::from)?;

        Ok(rows.iter().map(post_from_row).collect())
    }

    async fn post(&self, id: Uuid) -> ApiResult<Option<Post>> {
        let client = self.get_connection().await?;
        let query = format!("SELECT {} FROM posts WHERE id = $1", POST_COLUMNS);

        let row = client.query_opt(&query, &[&id]).await.map_err(ApiError::from)?;

        Ok(row.as_ref().map(post_from_row))
    }

    /// 著者の解決と INSERT を 1 文で行う。
    /// メールアドレスに一致するユーザーがいなければ 0 行となり `NotFound` を返す。
    async fn create_post(&self, input: NewPost) -> ApiResult<Post> {
        let client = self.get_connection().await?;

        let id = Uuid::new_v4();
        let now = chrono::Utc::now();
        let query = format!(
            r#"
            INSERT INTO posts (id, created_at, updated_at, is_published, title, content, author_id)
            SELECT $1::uuid, $2::timestamptz, $2::timestamptz, FALSE, $3::text, $4::text, u.id
            FROM users u WHERE u.email = $5
            RETURNING {}
            "#,
            POST_COLUMNS
        );

        let row = client
            .query_opt(
                &query,
                &[&id, &now, &input.title, &input.content, &input.author_email],
            )
            .await
            .map_err(ApiError::from)?;

        match row {
            Some(row) => {
                let created = post_from_row(&row);
                info!("Created post with id: {}", created.id);
                Ok(created)
            }
            None => Err(ApiError::NotFound(format!(
                "User with email {}",
                input.author_email
            ))),
        }
    }

    /// 更新対象のフィールドが無い場合は `updated_at` も触らず現在の行を返す。
    async fn update_post(&self, id: Uuid, update: PostUpdate) -> ApiResult<Option<Post>> {
        if update.is_empty() {
            return self.post(id).await;
        }

        let client = self.get_connection().await?;

        let mut assignments = Vec::new();
        let mut params: Vec<&(dyn ToSql + Sync)> = Vec::new();

        if let Some(ref title) = update.title {
            params.push(title);
            assignments.push(format!("title = ${}", params.len()));
        }

        if let Some(ref content) = update.content {
            params.push(content);
            assignments.push(format!("content = ${}", params.len()));
        }

        if let Some(ref is_published) = update.is_published {
            params.push(is_published);
            assignments.push(format!("is_published = ${}", params.len()));
        }

        // Always refresh the updated_at timestamp
        let updated_at = chrono::Utc::now();
        params.push(&updated_at);
        assignments.push(format!("updated_at = ${}", params.len()));

        params.push(&id);
        let query = format!(
            "UPDATE posts SET {} WHERE id = ${} RETURNING {}",
            assignments.join(", "),
            params.len(),
            POST_COLUMNS
        );

        let row = client.query_opt(&query, &params).await.map_err(ApiError::from)?;

        if let Some(ref updated) = row {
            info!("Updated post with id: {}", updated.get::<_, Uuid>(0));
        }

        Ok(row.as_ref().map(post_from_row))
    }

    /// `RETURNING` で削除した行を返す。posts → users の外部キーは
    /// CASCADE しないので、著者は残る。
    async fn delete_post(&self, id: Uuid) -> ApiResult<Option<Post>> {
        let client = self.get_connection().await?;
        let query = format!("DELETE FROM posts WHERE id = $1 RETURNING {}", POST_COLUMNS);

        let row = client.query_opt(&query, &[&id]).await.map_err(ApiError::from)?;

        if row.is_some() {
            info!("Deleted post with id: {}", id);
        }

        Ok(row.as_ref().map(post_from_row))
    }

    async fn user(&self, id: Uuid) -> ApiResult<Option<User>> {
        let client = self.get_connection().await?;
        let query = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);

        let row = client.query_opt(&query, &[&id]).await.map_err(ApiError::from)?;

        Ok(row.as_ref().map(user_from_row))
    }

    async fn user_by_email(&self, email: &str) -> ApiResult<Option<User>> {
        let client = self.get_connection().await?;
        let query = format!("SELECT {} FROM users WHERE email = $1", USER_COLUMNS);

        let row = client.query_opt(&query, &[&email]).await.map_err(ApiError::from)?;

        Ok(row.as_ref().map(user_from_row))
    }

    /// UNIQUE 制約違反は `From<tokio_postgres::Error>` で `Conflict` に変換される。
    async fn create_user(&self, input: NewUser) -> ApiResult<User> {
        let user = input.into_user();
        let client = self.get_connection().await?;

        let query = format!(
            r#"
            INSERT INTO users (id, email, name, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            USER_COLUMNS
        );

        let row = client
            .query_one(
                &query,
                &[&user.id, &user.email, &user.name, &user.created_at, &user.updated_at],
            )
            .await
            .map_err(ApiError::from)?;

        let created = user_from_row(&row);
        info!("Created user with id: {}", created.id);
        Ok(created)
    }
}
