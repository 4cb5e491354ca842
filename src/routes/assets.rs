use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;

use crate::assets::{AssetFilter, AssetStats, AssetUpdate, NewAsset, Page};
use crate::db::models::Asset;
use crate::error::AppResult;
use crate::extractors::CurrentUser;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/assets", get(list).post(create))
        .route("/api/assets/statistics", get(statistics))
        .route("/api/assets/memory-lane", get(memory_lane))
        .route("/api/assets/bulk-upload-check", post(bulk_upload_check))
        .route("/api/assets/exist", post(check_existing))
        .route("/api/assets/trash", post(trash))
        .route("/api/assets/restore", post(restore))
        .route(
            "/api/assets/{id}",
            get(get_one).put(update).delete(delete_one),
        )
}

async fn list(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(filter): Query<AssetFilter>,
    Query(page): Query<Page>,
) -> AppResult<Json<Vec<Asset>>> {
    let assets = state.assets.list(&user.id, &filter, &page).await?;
    Ok(Json(assets))
}

async fn get_one(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<Asset>> {
    let asset = state.assets.get(&id, &user.id).await?;
    Ok(Json(asset))
}

async fn create(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(new): Json<NewAsset>,
) -> AppResult<(StatusCode, Json<Asset>)> {
    let asset = state.assets.create(&user.id, &new).await?;
    Ok((StatusCode::CREATED, Json(asset)))
}

#[derive(Deserialize)]
struct BulkUploadRequest {
    assets: Vec<NewAsset>,
}

async fn bulk_upload_check(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(request): Json<BulkUploadRequest>,
) -> AppResult<Json<Vec<Asset>>> {
    let created = state.assets.bulk_upload_check(&user.id, &request.assets).await?;
    Ok(Json(created))
}

#[derive(Deserialize)]
struct CheckExistingRequest {
    device_asset_ids: Vec<String>,
    device_id: String,
}

async fn check_existing(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(request): Json<CheckExistingRequest>,
) -> AppResult<Json<serde_json::Value>> {
    let existing = state
        .assets
        .check_existing(&user.id, &request.device_asset_ids, &request.device_id)
        .await?;
    Ok(Json(json!({ "existing": existing })))
}

async fn update(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(patch): Json<AssetUpdate>,
) -> AppResult<Json<Asset>> {
    let asset = state.assets.update(&id, &user.id, &patch).await?;
    Ok(Json(asset))
}

#[derive(Deserialize)]
struct AssetIdsRequest {
    ids: Vec<String>,
}

async fn trash(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(request): Json<AssetIdsRequest>,
) -> AppResult<Json<serde_json::Value>> {
    let count = state.assets.trash(&user.id, &request.ids).await?;
    Ok(Json(json!({ "count": count })))
}

async fn restore(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(request): Json<AssetIdsRequest>,
) -> AppResult<Json<serde_json::Value>> {
    let count = state.assets.restore(&user.id, &request.ids).await?;
    Ok(Json(json!({ "count": count })))
}

async fn delete_one(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    state.assets.delete(&id, &user.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn statistics(
    State(state): State<AppState>,
    user: CurrentUser,
) -> AppResult<Json<AssetStats>> {
    let stats = state.assets.statistics(&user.id).await?;
    Ok(Json(stats))
}

#[derive(Deserialize)]
struct MemoryLaneQuery {
    day: u32,
    month: u32,
}

async fn memory_lane(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(query): Query<MemoryLaneQuery>,
) -> AppResult<Json<Vec<Asset>>> {
    let assets = state
        .assets
        .memory_lane(&user.id, query.day, query.month)
        .await?;
    Ok(Json(assets))
}
