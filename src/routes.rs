use axum::{
    routing::{get, post},
    Router,
};
use std::time::Duration;

use crate::{
    handlers::{
        graphql::{graphiql, graphql_handler},
        health_check,
    },
    middleware::apply_middleware,
    state::AppState,
};

/// Create the Axum router with all endpoints and middleware
pub fn create_router(state: AppState, request_timeout: Duration) -> Router {
    let graphql_route = if state.graphiql {
        get(graphiql).post(graphql_handler)
    } else {
        post(graphql_handler)
    };

    let router = Router::new()
        // Health check endpoint
        .route("/health", get(health_check))
        // GraphQL endpoint
        .route("/graphql", graphql_route)
        .with_state(state);

    apply_middleware(router, request_timeout)
}
