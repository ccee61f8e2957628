//! Categories API endpoints.

use api_types::{
    OkResponse,
    category::{CategoryListResponse, CategoryNew, CategoryView},
};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use engine::{CategoryInput, User};

use crate::{ServerError, server::ServerState, views};

fn input(payload: CategoryNew) -> CategoryInput {
    CategoryInput {
        name: payload.name,
        percentage: payload.percentage,
        color: payload.color,
        icon: payload.icon,
        display_order: payload.display_order,
        active: payload.active,
    }
}

/// Categories in display order with the allocation summary.
pub async fn list(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
) -> Result<Json<CategoryListResponse>, ServerError> {
    let overview = state.engine.category_overview(user.id).await?;
    Ok(Json(CategoryListResponse {
        categories: overview.categories.into_iter().map(views::category).collect(),
        total_percentage: overview.total_percentage,
        balanced: overview.balanced,
    }))
}

pub async fn get(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> Result<Json<CategoryView>, ServerError> {
    let category = state.engine.category(id, user.id).await?;
    Ok(Json(views::category(category)))
}

pub async fn create(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Json(payload): Json<CategoryNew>,
) -> Result<(StatusCode, Json<CategoryView>), ServerError> {
    let category = state.engine.new_category(user.id, &input(payload)).await?;
    Ok((StatusCode::CREATED, Json(views::category(category))))
}

pub async fn update(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<CategoryNew>,
) -> Result<Json<CategoryView>, ServerError> {
    let category = state
        .engine
        .update_category(id, user.id, &input(payload))
        .await?;
    Ok(Json(views::category(category)))
}

pub async fn delete(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> Result<Json<OkResponse>, ServerError> {
    state.engine.delete_category(id, user.id).await?;
    Ok(Json(OkResponse { ok: true }))
}
