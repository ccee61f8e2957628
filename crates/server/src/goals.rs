//! Savings goals and contributions API endpoints.

use api_types::{
    OkResponse,
    goal::{ContributionNew, ContributionView, GoalDetail, GoalNew, GoalView},
};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use engine::{GoalInput, MoneyCents, NewContribution, User};

use crate::{ServerError, server::ServerState, views};

fn input(payload: GoalNew) -> GoalInput {
    GoalInput {
        name: payload.name,
        target: MoneyCents::new(payload.target_minor),
        description: payload.description,
        color: payload.color,
        icon: payload.icon,
        target_date: payload.target_date,
        active: payload.active,
    }
}

pub async fn list(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<GoalView>>, ServerError> {
    let goals = state.engine.savings_goals(user.id).await?;
    Ok(Json(views::goals(goals)?))
}

pub async fn get(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> Result<Json<GoalDetail>, ServerError> {
    let goal = state.engine.savings_goal(id, user.id).await?;
    Ok(Json(views::goal_detail(goal)?))
}

pub async fn create(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Json(payload): Json<GoalNew>,
) -> Result<(StatusCode, Json<GoalView>), ServerError> {
    let goal = state.engine.new_savings_goal(user.id, &input(payload)).await?;
    Ok((StatusCode::CREATED, Json(views::goal(goal)?)))
}

pub async fn update(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<GoalNew>,
) -> Result<Json<GoalView>, ServerError> {
    let goal = state
        .engine
        .update_savings_goal(id, user.id, &input(payload))
        .await?;
    Ok(Json(views::goal(goal)?))
}

/// Deletes the goal and its contributions.
pub async fn delete(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> Result<Json<OkResponse>, ServerError> {
    state.engine.delete_savings_goal(id, user.id).await?;
    Ok(Json(OkResponse { ok: true }))
}

pub async fn contribution_new(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(goal_id): Path<i64>,
    Json(payload): Json<ContributionNew>,
) -> Result<(StatusCode, Json<ContributionView>), ServerError> {
    let contribution = state
        .engine
        .add_contribution(
            goal_id,
            user.id,
            &NewContribution {
                amount: MoneyCents::new(payload.amount_minor),
                date: payload.date,
                notes: payload.notes,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(views::contribution(contribution))))
}

pub async fn contribution_delete(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path((goal_id, contribution_id)): Path<(i64, i64)>,
) -> Result<Json<OkResponse>, ServerError> {
    state
        .engine
        .delete_contribution(goal_id, contribution_id, user.id)
        .await?;
    Ok(Json(OkResponse { ok: true }))
}
