/// User record API routes
use crate::{
    error::{Result, ServerError},
    state::AppState,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use roster_core::{RosterError, UserId, UserRecord};
use serde::Serialize;

/// Single lookup, wrapped in a list for wire compatibility
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub user: Vec<UserRecord>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NonBannedUsersResponse {
    pub non_banned_users: Vec<UserRecord>,
}

/// GET /api/all_records
pub async fn all_records(State(app_state): State<AppState>) -> Result<Json<Vec<UserRecord>>> {
    let records = app_state.records.list_all().await?;
    Ok(Json(records))
}

/// GET /api/get_user/:id
pub async fn get_user(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response> {
    let not_found = || {
        (
            StatusCode::NOT_FOUND,
            Json(UserResponse { user: Vec::new() }),
        )
            .into_response()
    };

    let Ok(id) = id.parse::<UserId>() else {
        return Ok(not_found());
    };

    match app_state.records.get_one(id).await {
        Ok(record) => Ok(Json(UserResponse { user: vec![record] }).into_response()),
        Err(RosterError::NotFound { .. }) => Ok(not_found()),
        Err(e) => Err(e.into()),
    }
}

/// GET /api/list_users
/// Users that are not banned; an empty list is a 404
pub async fn list_users(State(app_state): State<AppState>) -> Result<Response> {
    let users = app_state.records.list_non_banned().await?;

    let status = if users.is_empty() {
        StatusCode::NOT_FOUND
    } else {
        StatusCode::OK
    };

    Ok((
        status,
        Json(NonBannedUsersResponse {
            non_banned_users: users,
        }),
    )
        .into_response())
}

/// PUT /api/ban_user/:target
/// `target` is `{id}` for a permanent ban or `{id},{until}`
pub async fn ban_user(
    State(app_state): State<AppState>,
    Path(target): Path<String>,
) -> Result<Json<&'static str>> {
    let (id, until) = match target.split_once(',') {
        Some((id, until)) => (id, Some(until)),
        None => (target.as_str(), None),
    };

    let id = id.trim().parse::<UserId>().map_err(|_| {
        ban_failed(RosterError::malformed_input(format!(
            "invalid user id {id:?}"
        )))
    })?;

    app_state
        .records
        .ban(id, until.map(str::trim))
        .await
        .map_err(ban_failed)?;

    Ok(Json("OK"))
}

fn ban_failed(e: RosterError) -> ServerError {
    tracing::warn!("Failed to ban user: {}", e);
    ServerError::BadRequest("Failed to ban user".to_string())
}

/// POST /api/create_user/:name
pub async fn create_user(
    State(app_state): State<AppState>,
    Path(name): Path<String>,
) -> Result<(StatusCode, Json<UserRecord>)> {
    match app_state.records.create(&name).await {
        Ok(record) => Ok((StatusCode::CREATED, Json(record))),
        Err(e) => {
            tracing::warn!("Failed to create user: {}", e);
            Err(ServerError::BadRequest("Failed to create user".to_string()))
        }
    }
}
