//! Router builder for JSON:API read routes

use crate::server::handlers::{
    AppState, fetch_many, fetch_one, fetch_related, fetch_relationship,
};
use axum::{Router, routing::get};

/// Build the routes of one server
///
/// These routes are generic and work for every registered resource type:
/// - GET /{resource_type} - Fetch a collection
/// - GET /{resource_type}/{id} - Fetch one resource
/// - GET /{resource_type}/{id}/{relationship} - Fetch related resources
/// - GET /{resource_type}/{id}/relationships/{relationship} - Fetch linkage
///
/// Routes are relative to the server prefix.
pub fn build_resource_routes(state: AppState) -> Router {
    Router::new()
        .route("/{resource_type}", get(fetch_many))
        .route("/{resource_type}/{id}", get(fetch_one))
        .route("/{resource_type}/{id}/{relationship}", get(fetch_related))
        .route(
            "/{resource_type}/{id}/relationships/{relationship}",
            get(fetch_relationship),
        )
        .with_state(state)
}
