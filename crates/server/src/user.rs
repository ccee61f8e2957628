//! The authenticated user's profile and password.

use api_types::{
    OkResponse,
    user::{PasswordChange, UserView},
};
use axum::{Extension, Json, extract::State};
use engine::User;

use crate::{ServerError, server::ServerState, views};

pub async fn get(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
) -> Result<Json<UserView>, ServerError> {
    let user = state.engine.user(user.id).await?;
    Ok(Json(views::user(user)))
}

/// Changes the password after checking the current one.
pub async fn change_password(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Json(payload): Json<PasswordChange>,
) -> Result<Json<OkResponse>, ServerError> {
    state
        .engine
        .change_password(user.id, &payload.current_password, &payload.new_password)
        .await?;
    Ok(Json(OkResponse { ok: true }))
}
