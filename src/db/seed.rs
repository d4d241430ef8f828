use tracing::info;

use super::Datastore;
use crate::error::ApiResult;
use crate::models::NewUser;

/// Users available to `createDraft` on a fresh development database
pub fn demo_users() -> Vec<NewUser> {
    vec![
        NewUser::new("Alice", "alice@example.com"),
        NewUser::new("Bob", "bob@example.com"),
    ]
}

/// Insert the given users, skipping any whose email is already taken.
/// Returns how many were created, so running it on every start is safe.
pub async fn seed_users(store: &dyn Datastore, users: Vec<NewUser>) -> ApiResult<usize> {
    let mut created = 0;

    for user in users {
        if store.user_by_email(&user.email).await?.is_some() {
            info!("User {} already exists, skipping seed", user.email);
            continue;
        }

        let user = store.create_user(user).await?;
        info!("Seeded user: {}", user.email);
        created += 1;
    }

    Ok(created)
}
