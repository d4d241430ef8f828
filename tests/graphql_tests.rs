use std::{sync::Arc, time::Duration};

use async_graphql::Request;
use async_trait::async_trait;
use serde_json::{json, Value};
use uuid::Uuid;

use blog_graphql_api::{
    build_schema,
    db::{demo_users, seed_users},
    ApiResult, BlogSchema, Datastore, MemoryStore, NewPost, NewUser, Post, PostFilter, PostUpdate,
    User,
};

const POST_FIELDS: &str = "id title content isPublished createdAt updatedAt author { email name }";

async fn setup() -> (BlogSchema, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    store
        .create_user(NewUser::new("Alice", "alice@example.com"))
        .await
        .expect("seed alice");
    store
        .create_user(NewUser::new("Bob", "bob@example.com"))
        .await
        .expect("seed bob");

    let schema = build_schema(store.clone(), 10);
    (schema, store)
}

/// Execute and return the full JSON response (`data` and `errors`)
async fn run(schema: &BlogSchema, query: &str) -> Value {
    let response = schema.execute(Request::new(query)).await;
    serde_json::to_value(&response).expect("response serializes")
}

/// Execute and return `data`, failing on any GraphQL error
async fn data(schema: &BlogSchema, query: &str) -> Value {
    let response = run(schema, query).await;
    assert!(
        response["errors"].as_array().map_or(true, |e| e.is_empty()),
        "unexpected errors: {}",
        response["errors"]
    );
    response["data"].clone()
}

async fn create_draft(schema: &BlogSchema, title: &str, author_email: &str) -> Value {
    let query = format!(
        r#"mutation {{ createDraft(title: "{}", content: "Body of {}", authorEmail: "{}") {{ {} }} }}"#,
        title, title, author_email, POST_FIELDS
    );
    data(schema, &query).await["createDraft"].clone()
}

async fn publish(schema: &BlogSchema, id: &str) -> Value {
    let query = format!(r#"mutation {{ publish(id: "{}") {{ id isPublished }} }}"#, id);
    data(schema, &query).await["publish"].clone()
}

fn ids(list: &Value) -> Vec<String> {
    list.as_array()
        .expect("list")
        .iter()
        .map(|p| p["id"].as_str().expect("id").to_string())
        .collect()
}

#[tokio::test]
async fn test_create_draft_is_unpublished() {
    let (schema, _) = setup().await;

    let post = create_draft(&schema, "Hello", "alice@example.com").await;

    assert_eq!(post["title"], "Hello");
    assert_eq!(post["content"], "Body of Hello");
    assert_eq!(post["isPublished"], false);
    assert_eq!(post["author"], json!({ "email": "alice@example.com", "name": "Alice" }));
    assert_eq!(post["createdAt"], post["updatedAt"]);
}

#[tokio::test]
async fn test_create_draft_with_unknown_author_fails() {
    let (schema, store) = setup().await;

    let response = run(
        &schema,
        r#"mutation { createDraft(title: "x", content: "y", authorEmail: "nobody@example.com") { id } }"#,
    )
    .await;

    let error = &response["errors"][0];
    assert_eq!(error["message"], "User with email nobody@example.com not found");
    assert_eq!(error["extensions"]["code"], "NOT_FOUND");
    assert!(store.posts(Default::default()).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_feed_only_returns_published_posts() {
    let (schema, _) = setup().await;

    let draft = create_draft(&schema, "Draft", "alice@example.com").await;
    let live = create_draft(&schema, "Live", "bob@example.com").await;
    publish(&schema, live["id"].as_str().unwrap()).await;

    let feed = data(&schema, "{ feed { id isPublished } }").await;
    assert_eq!(ids(&feed["feed"]), vec![live["id"].as_str().unwrap().to_string()]);
    assert!(feed["feed"]
        .as_array()
        .unwrap()
        .iter()
        .all(|p| p["isPublished"] == true));
    assert!(!ids(&feed["feed"]).contains(&draft["id"].as_str().unwrap().to_string()));
}

#[tokio::test]
async fn test_drafts_only_returns_unpublished_posts() {
    let (schema, _) = setup().await;

    let first = create_draft(&schema, "First", "alice@example.com").await;
    let second = create_draft(&schema, "Second", "alice@example.com").await;
    publish(&schema, first["id"].as_str().unwrap()).await;

    let drafts = data(&schema, "{ drafts { id isPublished } }").await;
    assert_eq!(ids(&drafts["drafts"]), vec![second["id"].as_str().unwrap().to_string()]);
    assert_eq!(drafts["drafts"][0]["isPublished"], false);
}

#[tokio::test]
async fn test_publish_is_idempotent() {
    let (schema, _) = setup().await;

    let post = create_draft(&schema, "Twice", "alice@example.com").await;
    let id = post["id"].as_str().unwrap();

    let once = publish(&schema, id).await;
    let twice = publish(&schema, id).await;

    assert_eq!(once["isPublished"], true);
    assert_eq!(twice["isPublished"], true);
    assert_eq!(twice["id"], post["id"]);

    let feed = data(&schema, "{ feed { id } }").await;
    assert_eq!(ids(&feed["feed"]), vec![id.to_string()]);
}

#[tokio::test]
async fn test_publish_missing_post_returns_null() {
    let (schema, _) = setup().await;

    let result = data(
        &schema,
        r#"mutation { publish(id: "00000000-0000-0000-0000-000000000000") { id } }"#,
    )
    .await;

    assert_eq!(result["publish"], Value::Null);
}

#[tokio::test]
async fn test_delete_post_then_lookup_returns_null() {
    let (schema, store) = setup().await;

    let post = create_draft(&schema, "Doomed", "alice@example.com").await;
    let id = post["id"].as_str().unwrap();

    let lookup = data(&schema, &format!(r#"{{ post(id: "{}") {{ id title }} }}"#, id)).await;
    assert_eq!(lookup["post"]["title"], "Doomed");

    let deleted = data(
        &schema,
        &format!(r#"mutation {{ deletePost(id: "{}") {{ id title }} }}"#, id),
    )
    .await;
    assert_eq!(deleted["deletePost"]["id"], id);

    let lookup = data(&schema, &format!(r#"{{ post(id: "{}") {{ id }} }}"#, id)).await;
    assert_eq!(lookup["post"], Value::Null);

    // Deleting again finds nothing
    let again = data(
        &schema,
        &format!(r#"mutation {{ deletePost(id: "{}") {{ id }} }}"#, id),
    )
    .await;
    assert_eq!(again["deletePost"], Value::Null);

    // The author survives the delete
    let author = store.user_by_email("alice@example.com").await.unwrap();
    assert!(author.is_some());
}

#[tokio::test]
async fn test_malformed_id_is_validation_error() {
    let (schema, _) = setup().await;

    let response = run(&schema, r#"{ post(id: "not-a-uuid") { id } }"#).await;

    assert_eq!(response["errors"][0]["message"], "Invalid post ID format");
    assert_eq!(response["errors"][0]["extensions"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_user_posts_include_drafts_and_published() {
    let (schema, _) = setup().await;

    let draft = create_draft(&schema, "Mine draft", "alice@example.com").await;
    let live = create_draft(&schema, "Mine live", "alice@example.com").await;
    create_draft(&schema, "Not mine", "bob@example.com").await;
    publish(&schema, live["id"].as_str().unwrap()).await;

    let query = format!(
        r#"{{ post(id: "{}") {{ author {{ name posts {{ id author {{ email }} }} }} }} }}"#,
        draft["id"].as_str().unwrap()
    );
    let result = data(&schema, &query).await;

    let author = &result["post"]["author"];
    assert_eq!(author["name"], "Alice");

    let mut posts = ids(&author["posts"]);
    posts.sort();
    let mut expected = vec![
        draft["id"].as_str().unwrap().to_string(),
        live["id"].as_str().unwrap().to_string(),
    ];
    expected.sort();
    assert_eq!(posts, expected);
    assert!(author["posts"]
        .as_array()
        .unwrap()
        .iter()
        .all(|p| p["author"]["email"] == "alice@example.com"));
}

#[tokio::test]
async fn test_depth_limit_rejects_deep_queries() {
    let store = Arc::new(MemoryStore::new());
    let schema = build_schema(store, 3);

    let response = run(&schema, "{ feed { author { posts { author { name } } } } }").await;

    assert!(response["errors"].as_array().is_some_and(|e| !e.is_empty()));
}

#[tokio::test]
async fn test_schema_exposes_operations() {
    let (schema, _) = setup().await;
    let sdl = schema.sdl();

    for field in [
        "feed: [Post!]!",
        "drafts: [Post!]!",
        "post(id: ID!): Post",
        "createDraft(title: String!, content: String!, authorEmail: String!): Post!",
        "deletePost(id: ID!): Post",
        "publish(id: ID!): Post",
        "isPublished: Boolean!",
        "author: User!",
        "posts: [Post!]!",
        "createdAt: DateTime!",
    ] {
        assert!(sdl.contains(field), "schema is missing `{}`", field);
    }
}

#[tokio::test]
async fn test_listings_are_ordered_oldest_first() {
    let (schema, _) = setup().await;

    let mut created = Vec::new();
    for title in ["One", "Two", "Three", "Four", "Five"] {
        let post = create_draft(&schema, title, "alice@example.com").await;
        created.push(post["id"].as_str().unwrap().to_string());
        tokio::time::sleep(Duration::from_millis(2)).await;
    }

    // Publish out of creation order; publishing must not reorder the feed
    publish(&schema, &created[3]).await;
    publish(&schema, &created[0]).await;
    publish(&schema, &created[2]).await;

    let feed = data(&schema, "{ feed { id } }").await;
    assert_eq!(
        ids(&feed["feed"]),
        vec![created[0].clone(), created[2].clone(), created[3].clone()]
    );

    let drafts = data(&schema, "{ drafts { id } }").await;
    assert_eq!(ids(&drafts["drafts"]), vec![created[1].clone(), created[4].clone()]);

    let query = format!(r#"{{ post(id: "{}") {{ author {{ posts {{ id }} }} }} }}"#, created[4]);
    let result = data(&schema, &query).await;
    assert_eq!(ids(&result["post"]["author"]["posts"]), created);
}

/// Serves posts whose author row has gone missing
struct OrphanedPosts(MemoryStore);

#[async_trait]
impl Datastore for OrphanedPosts {
    async fn health_check(&self) -> ApiResult<()> {
        self.0.health_check().await
    }

    async fn posts(&self, filter: PostFilter) -> ApiResult<Vec<Post>> {
        self.0.posts(filter).await
    }

    async fn post(&self, id: Uuid) -> ApiResult<Option<Post>> {
        self.0.post(id).await
    }

    async fn create_post(&self, input: NewPost) -> ApiResult<Post> {
        self.0.create_post(input).await
    }

    async fn update_post(&self, id: Uuid, update: PostUpdate) -> ApiResult<Option<Post>> {
        self.0.update_post(id, update).await
    }

    async fn delete_post(&self, id: Uuid) -> ApiResult<Option<Post>> {
        self.0.delete_post(id).await
    }

    async fn user(&self, _id: Uuid) -> ApiResult<Option<User>> {
        Ok(None)
    }

    async fn user_by_email(&self, email: &str) -> ApiResult<Option<User>> {
        self.0.user_by_email(email).await
    }

    async fn create_user(&self, input: NewUser) -> ApiResult<User> {
        self.0.create_user(input).await
    }
}

#[tokio::test]
async fn test_post_with_missing_author_is_not_found_error() {
    let store = OrphanedPosts(MemoryStore::new());
    store
        .create_user(NewUser::new("Alice", "alice@example.com"))
        .await
        .unwrap();
    let post = store
        .create_post(NewPost {
            title: "Lonely".to_string(),
            content: "No author".to_string(),
            author_email: "alice@example.com".to_string(),
        })
        .await
        .unwrap();
    let schema = build_schema(Arc::new(store), 10);

    let query = format!(r#"{{ post(id: "{}") {{ title author {{ name }} }} }}"#, post.id);
    let response = run(&schema, &query).await;

    let error = &response["errors"][0];
    assert_eq!(error["message"], format!("Author of post {} not found", post.id));
    assert_eq!(error["extensions"]["code"], "NOT_FOUND");
    assert_eq!(error["path"], json!(["post", "author"]));
}

#[tokio::test]
async fn test_seeded_users_can_create_drafts() {
    let store = Arc::new(MemoryStore::new());
    assert_eq!(seed_users(store.as_ref(), demo_users()).await.unwrap(), 2);
    let schema = build_schema(store, 10);

    let post = create_draft(&schema, "Seeded", "alice@example.com").await;

    assert_eq!(post["author"]["name"], "Alice");
    assert_eq!(post["isPublished"], false);
}
