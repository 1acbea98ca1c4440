//! HTTP handlers for JSON:API read endpoints
//!
//! Handlers are resource-agnostic: the resource type and relationship come
//! from the path and are resolved against the server's schema snapshot.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use std::sync::Arc;

use crate::core::{
    AuthRequest, Authorizer, JSON_API_MEDIA_TYPE, JsonApiError, JsonApiResult, ResourceData,
    ResourceIdentity, ResourceRepository, SchemaError, StorageError,
};
use crate::document::{Document, DocumentSerializer, LoadedRelations, parse_include};
use crate::schema::Server;

/// State shared by the handlers of one server
#[derive(Clone)]
pub struct AppState {
    pub server: Arc<Server>,
    pub repository: Arc<dyn ResourceRepository>,
    pub authorizer: Arc<dyn Authorizer>,
}

impl AppState {
    /// Fail with `Forbidden` unless `allowed`
    fn authorize(allowed: bool, operation: &str, resource_type: &str) -> JsonApiResult<()> {
        if allowed {
            return Ok(());
        }
        tracing::debug!(operation, resource_type, "operation refused by authorizer");
        Err(JsonApiError::Forbidden {
            operation: operation.to_string(),
            resource_type: resource_type.to_string(),
        })
    }

    async fn find_source(&self, resource_type: &str, id: &str) -> JsonApiResult<ResourceData> {
        self.repository
            .find(resource_type, id)
            .await
            .map_err(|e| StorageError::from_anyhow("find", e))?
            .ok_or_else(|| {
                SchemaError::ResourceNotFound {
                    resource_type: resource_type.to_string(),
                    id: id.to_string(),
                }
                .into()
            })
    }

    async fn load_related(
        &self,
        source: &ResourceIdentity,
        relationship: &str,
    ) -> JsonApiResult<Vec<ResourceData>> {
        let related = self
            .repository
            .related(source, relationship)
            .await
            .map_err(|e| StorageError::from_anyhow("related", e))?;
        Ok(related)
    }

    /// Load the members of every included relationship of `resources`
    async fn load_includes(
        &self,
        resources: &[ResourceData],
        includes: &[String],
    ) -> JsonApiResult<LoadedRelations> {
        let mut loaded = LoadedRelations::new();
        for resource in resources {
            for relationship in includes {
                let related = self.load_related(&resource.identity, relationship).await?;
                loaded.insert(resource.identity.clone(), relationship.clone(), related);
            }
        }
        Ok(loaded)
    }
}

/// Query parameters accepted by fetch endpoints
#[derive(Debug, Default, Deserialize)]
pub struct DocumentQuery {
    /// Comma-separated relationship paths
    pub include: Option<String>,
}

/// A JSON:API document served with the JSON:API media type
#[derive(Debug)]
pub struct JsonApiResponse(pub Document);

impl IntoResponse for JsonApiResponse {
    fn into_response(self) -> Response {
        (
            StatusCode::OK,
            [(header::CONTENT_TYPE, JSON_API_MEDIA_TYPE)],
            Json(self.0),
        )
            .into_response()
    }
}

/// GET /{type}
pub async fn fetch_many(
    State(state): State<AppState>,
    Path(resource_type): Path<String>,
    Query(query): Query<DocumentQuery>,
) -> Result<JsonApiResponse, JsonApiError> {
    let serializer = DocumentSerializer::for_server(&state.server);
    let schema = serializer.schemas().schema_for(&resource_type)?;

    AppState::authorize(
        state.authorizer.index(&AuthRequest::collection(&resource_type)),
        "index",
        &resource_type,
    )?;

    let includes = parse_include(&schema, query.include.as_deref())?;
    let resources = state
        .repository
        .list(&resource_type)
        .await
        .map_err(|e| StorageError::from_anyhow("list", e))?;
    let loaded = state.load_includes(&resources, &includes).await?;

    let document = serializer.collection_document(&resource_type, &resources, &loaded)?;
    Ok(JsonApiResponse(document))
}

/// GET /{type}/{id}
pub async fn fetch_one(
    State(state): State<AppState>,
    Path((resource_type, id)): Path<(String, String)>,
    Query(query): Query<DocumentQuery>,
) -> Result<JsonApiResponse, JsonApiError> {
    let serializer = DocumentSerializer::for_server(&state.server);
    let schema = serializer.schemas().schema_for(&resource_type)?;

    AppState::authorize(
        state.authorizer.show(&AuthRequest::resource(&resource_type, &id)),
        "show",
        &resource_type,
    )?;

    let includes = parse_include(&schema, query.include.as_deref())?;
    let resource = state.find_source(&resource_type, &id).await?;
    let loaded = state
        .load_includes(std::slice::from_ref(&resource), &includes)
        .await?;

    let document = serializer.resource_document(&resource, &loaded)?;
    Ok(JsonApiResponse(document))
}

/// GET /{type}/{id}/{relationship}
pub async fn fetch_related(
    State(state): State<AppState>,
    Path((resource_type, id, relationship)): Path<(String, String, String)>,
) -> Result<JsonApiResponse, JsonApiError> {
    let serializer = DocumentSerializer::for_server(&state.server);
    serializer
        .schemas()
        .schema_for(&resource_type)?
        .relationship(&relationship)?;

    AppState::authorize(
        state
            .authorizer
            .show_related(&AuthRequest::relationship(&resource_type, &id, &relationship)),
        "show_related",
        &resource_type,
    )?;

    let source = state.find_source(&resource_type, &id).await?;
    let related = state.load_related(&source.identity, &relationship).await?;

    let document = serializer.related_document(&source.identity, &relationship, &related)?;
    Ok(JsonApiResponse(document))
}

/// GET /{type}/{id}/relationships/{relationship}
pub async fn fetch_relationship(
    State(state): State<AppState>,
    Path((resource_type, id, relationship)): Path<(String, String, String)>,
) -> Result<JsonApiResponse, JsonApiError> {
    let serializer = DocumentSerializer::for_server(&state.server);
    serializer
        .schemas()
        .schema_for(&resource_type)?
        .relationship(&relationship)?;

    AppState::authorize(
        state
            .authorizer
            .show_relationship(&AuthRequest::relationship(&resource_type, &id, &relationship)),
        "show_relationship",
        &resource_type,
    )?;

    let source = state.find_source(&resource_type, &id).await?;
    let identities: Vec<ResourceIdentity> = state
        .load_related(&source.identity, &relationship)
        .await?
        .into_iter()
        .map(|resource| resource.identity)
        .collect();

    let document = serializer.relationship_document(&source.identity, &relationship, &identities)?;
    Ok(JsonApiResponse(document))
}
