use std::sync::Arc;

use crate::db::Datastore;
use crate::graphql::BlogSchema;

/// Shared state handed to every axum handler
#[derive(Clone)]
pub struct AppState {
    pub schema: BlogSchema,
    pub store: Arc<dyn Datastore>,
    /// Serve the GraphiQL IDE on `GET /graphql`
    pub graphiql: bool,
}
