//! Monthly records API endpoints.

use api_types::{
    OkResponse,
    record::{RecordNew, RecordUpdate, RecordView},
};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use engine::{MoneyCents, MonthlyRecordUpdate, NewMonthlyRecord, User};

use crate::{ServerError, server::ServerState, views};

/// Records newest first, each with its snapshots.
pub async fn list(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<RecordView>>, ServerError> {
    let records = state.engine.monthly_records(user.id).await?;
    Ok(Json(views::records(records)?))
}

pub async fn get(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> Result<Json<RecordView>, ServerError> {
    let record = state.engine.monthly_record(id, user.id).await?;
    Ok(Json(views::record(record)?))
}

pub async fn create(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Json(payload): Json<RecordNew>,
) -> Result<(StatusCode, Json<RecordView>), ServerError> {
    let record = state
        .engine
        .new_monthly_record(
            user.id,
            &NewMonthlyRecord {
                year: payload.year,
                month: payload.month,
                income: MoneyCents::new(payload.income_minor),
                notes: payload.notes,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(views::record(record)?)))
}

/// Updates income and notes; the snapshots are rebuilt from the current
/// categories.
pub async fn update(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<RecordUpdate>,
) -> Result<Json<RecordView>, ServerError> {
    let record = state
        .engine
        .update_monthly_record(
            id,
            user.id,
            &MonthlyRecordUpdate {
                income: MoneyCents::new(payload.income_minor),
                notes: payload.notes,
            },
        )
        .await?;
    Ok(Json(views::record(record)?))
}

pub async fn regenerate(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> Result<Json<RecordView>, ServerError> {
    let record = state.engine.regenerate_snapshots(id, user.id).await?;
    Ok(Json(views::record(record)?))
}

pub async fn delete(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> Result<Json<OkResponse>, ServerError> {
    state.engine.delete_monthly_record(id, user.id).await?;
    Ok(Json(OkResponse { ok: true }))
}
