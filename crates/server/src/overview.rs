//! Read-only summaries: month dashboard and income history.

use api_types::overview::{DashboardResponse, HistoryResponse, MonthQuery};
use axum::{
    Extension, Json,
    extract::{Query, State},
};
use chrono::{Datelike, Utc};
use engine::User;

use crate::{ServerError, server::ServerState, views};

/// Dashboard of `?year=&month=`, the current month when omitted.
pub async fn dashboard(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Query(query): Query<MonthQuery>,
) -> Result<Json<DashboardResponse>, ServerError> {
    let today = Utc::now();
    let year = query.year.unwrap_or_else(|| today.year());
    let month = query.month.unwrap_or_else(|| today.month());
    if !(1..=12).contains(&month) {
        return Err(ServerError::Generic(
            "month must be between 1 and 12".to_string(),
        ));
    }

    let dashboard = state.engine.dashboard(user.id, year, month).await?;
    Ok(Json(DashboardResponse {
        year: dashboard.year,
        month: dashboard.month,
        record: dashboard.record.map(views::record).transpose()?,
        goals_in_progress: views::goals(dashboard.goals_in_progress)?,
    }))
}

pub async fn history(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
) -> Result<Json<HistoryResponse>, ServerError> {
    let history = state.engine.history(user.id).await?;
    Ok(Json(HistoryResponse {
        records: views::records(history.records)?,
        stats: views::income_stats(history.stats),
    }))
}
