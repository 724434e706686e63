//! `/api/tree` handlers. Request/response shapes mirror the wire API in
//! SPEC_FULL.md §6: ids travel as strings, the `org-id` header selects the
//! tenant and defaults to `"default"`.

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use tree_core::engine::mutate::BulkEntry;
use tree_core::{TreeError, TreeService};

use crate::error::ApiError;
use crate::state::AppState;

fn tenant_id(headers: &HeaderMap) -> Option<String> {
    headers
        .get("org-id")
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

fn parse_id(raw: &str) -> Result<i64, ApiError> {
    raw.parse::<i64>()
        .map_err(|_| ApiError(TreeError::InvalidRequest(format!("'{raw}' is not a valid node id"))))
}

fn parse_optional_id(raw: &Option<String>) -> Result<Option<i64>, ApiError> {
    raw.as_deref().map(parse_id).transpose()
}

#[derive(Deserialize)]
pub struct CreateNodeRequest {
    pub label: String,
    #[serde(rename = "parentId")]
    pub parent_id: Option<String>,
}

#[derive(Serialize)]
pub struct CreateNodeResponse {
    pub id: String,
    pub label: String,
    #[serde(rename = "parentId")]
    pub parent_id: Option<String>,
}

#[derive(Deserialize)]
pub struct MoveNodeRequest {
    #[serde(rename = "sourceId")]
    pub source_id: String,
    #[serde(rename = "targetId")]
    pub target_id: Option<String>,
}

#[derive(Serialize)]
pub struct MoveNodeResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Deserialize)]
pub struct CloneNodeRequest {
    #[serde(rename = "sourceId")]
    pub source_id: String,
    #[serde(rename = "targetId")]
    pub target_id: Option<String>,
}

#[derive(Serialize)]
pub struct CloneNodeResponse {
    pub success: bool,
    pub message: String,
    pub id: Option<String>,
}

#[derive(Deserialize)]
pub struct BulkNodeRequest {
    pub id: String,
    pub label: String,
    #[serde(rename = "parentId")]
    pub parent_id: Option<String>,
    #[serde(rename = "rootId")]
    pub root_id: Option<String>,
}

#[derive(Serialize)]
pub struct BulkLoadResponse {
    pub created: usize,
}

/// `GET /api/tree` — the forest as nested JSON. The materializer already
/// returns a JSON array string, so it's written through directly rather
/// than round-tripped through `serde_json::Value`.
pub async fn get_forest(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let service = TreeService::new(&state.conn, tenant_id(&headers).as_deref());
    match service.forest_json().await {
        Ok(body) => (
            StatusCode::OK,
            [("content-type", "application/json")],
            body,
        )
            .into_response(),
        Err(err) => ApiError(err).into_response(),
    }
}

pub async fn create_node(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<CreateNodeRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let service = TreeService::new(&state.conn, tenant_id(&headers).as_deref());
    let parent_id = parse_optional_id(&request.parent_id)?;
    let node = service.insert(&request.label, parent_id).await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateNodeResponse {
            id: node.id.to_string(),
            label: node.label,
            parent_id: node.parent_id.map(|id| id.to_string()),
        }),
    ))
}

pub async fn move_node(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<MoveNodeRequest>,
) -> Response {
    let service = TreeService::new(&state.conn, tenant_id(&headers).as_deref());

    let result = async {
        let source_id = parse_id(&request.source_id)?;
        let target_id = parse_optional_id(&request.target_id)?;
        service.move_subtree(source_id, target_id).await.map_err(ApiError)
    }
    .await;

    match result {
        Ok(()) => Json(MoveNodeResponse {
            success: true,
            message: format!(
                "moved node {} to parent {}",
                request.source_id,
                request.target_id.as_deref().unwrap_or("root")
            ),
        })
        .into_response(),
        Err(err) => ApiError::from(err).into_response(),
    }
}

pub async fn clone_node(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<CloneNodeRequest>,
) -> Response {
    let service = TreeService::new(&state.conn, tenant_id(&headers).as_deref());

    let result: Result<i64, ApiError> = async {
        let source_id = parse_id(&request.source_id)?;
        let target_id = parse_optional_id(&request.target_id)?;
        service.clone_subtree(source_id, target_id).await.map_err(ApiError::from)
    }
    .await;

    match result {
        Ok(new_id) => (
            StatusCode::CREATED,
            Json(CloneNodeResponse {
                success: true,
                message: format!(
                    "cloned node {} to parent {}",
                    request.source_id,
                    request.target_id.as_deref().unwrap_or("root")
                ),
                id: Some(new_id.to_string()),
            }),
        )
            .into_response(),
        Err(err) => ApiError::from(err).into_response(),
    }
}

pub async fn bulk_load(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(requests): Json<Vec<BulkNodeRequest>>,
) -> Result<impl IntoResponse, ApiError> {
    let service = TreeService::new(&state.conn, tenant_id(&headers).as_deref());

    let entries = requests
        .into_iter()
        .map(|entry| {
            Ok(BulkEntry {
                id: parse_id(&entry.id)?,
                label: entry.label,
                parent_id: parse_optional_id(&entry.parent_id)?,
                root_id: parse_optional_id(&entry.root_id)?,
            })
        })
        .collect::<Result<Vec<_>, ApiError>>()?;

    let created = service.bulk_load(&state.config, entries).await?;
    Ok((StatusCode::CREATED, Json(BulkLoadResponse { created })))
}

pub async fn delete_all(State(state): State<AppState>, headers: HeaderMap) -> Result<StatusCode, ApiError> {
    let service = TreeService::new(&state.conn, tenant_id(&headers).as_deref());
    service.delete_all(&state.config).await?;
    Ok(StatusCode::NO_CONTENT)
}
