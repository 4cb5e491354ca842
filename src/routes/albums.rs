use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{delete, get, put};
use axum::{Json, Router};
use serde::Deserialize;

use crate::albums::{AlbumResponse, AlbumUpdate, CreateAlbum};
use crate::error::AppResult;
use crate::extractors::CurrentUser;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/albums", get(list).post(create))
        .route(
            "/api/albums/{id}",
            get(get_one).patch(update).delete(delete_one),
        )
        .route(
            "/api/albums/{id}/assets",
            put(add_assets).delete(remove_assets),
        )
        .route("/api/albums/{id}/users", put(add_shared_users))
        .route(
            "/api/albums/{id}/users/{user_id}",
            delete(remove_shared_user),
        )
}

#[derive(Deserialize)]
struct ListAlbumsQuery {
    shared: Option<bool>,
}

async fn list(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(query): Query<ListAlbumsQuery>,
) -> AppResult<Json<Vec<AlbumResponse>>> {
    let albums = state.albums.list(&user.id, query.shared).await?;
    Ok(Json(albums))
}

async fn get_one(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<AlbumResponse>> {
    let album = state.albums.get(&id, &user.id).await?;
    Ok(Json(album))
}

async fn create(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(new): Json<CreateAlbum>,
) -> AppResult<(StatusCode, Json<AlbumResponse>)> {
    let album = state.albums.create(&user.id, &new).await?;
    Ok((StatusCode::CREATED, Json(album)))
}

async fn update(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(patch): Json<AlbumUpdate>,
) -> AppResult<Json<AlbumResponse>> {
    let album = state.albums.update(&id, &user.id, &patch).await?;
    Ok(Json(album))
}

async fn delete_one(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    state.albums.delete(&id, &user.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Deserialize)]
struct AssetIdsRequest {
    ids: Vec<String>,
}

async fn add_assets(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(request): Json<AssetIdsRequest>,
) -> AppResult<Json<AlbumResponse>> {
    let album = state.albums.add_assets(&id, &user.id, &request.ids).await?;
    Ok(Json(album))
}

async fn remove_assets(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(request): Json<AssetIdsRequest>,
) -> AppResult<Json<AlbumResponse>> {
    let album = state
        .albums
        .remove_assets(&id, &user.id, &request.ids)
        .await?;
    Ok(Json(album))
}

#[derive(Deserialize)]
struct UserIdsRequest {
    user_ids: Vec<String>,
}

async fn add_shared_users(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(request): Json<UserIdsRequest>,
) -> AppResult<Json<AlbumResponse>> {
    let album = state
        .albums
        .add_shared_users(&id, &user.id, &request.user_ids)
        .await?;
    Ok(Json(album))
}

async fn remove_shared_user(
    State(state): State<AppState>,
    user: CurrentUser,
    Path((id, user_id)): Path<(String, String)>,
) -> AppResult<Json<AlbumResponse>> {
    let album = state
        .albums
        .remove_shared_user(&id, &user.id, &user_id)
        .await?;
    Ok(Json(album))
}
