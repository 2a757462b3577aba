use std::path::Path as FsPath;

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult, ErrorBody};
use crate::middleware::auth::AuthUser;
use crate::models::exercise::ExerciseTodo;
use crate::models::report::{render_report, report_file_name, ReportResponse};
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/generate_report/{user_id}", get(generate_report))
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct ReportQuery {
    /// Inclusive range start, `yyyy-MM-dd`
    pub start_date: NaiveDate,
    /// Inclusive range end, `yyyy-MM-dd`
    pub end_date: NaiveDate,
}

#[utoipa::path(
    get,
    path = "/generate_report/{user_id}",
    params(
        ("user_id" = Uuid, Path, description = "Patient id"),
        ReportQuery,
    ),
    responses(
        (status = 200, description = "Report written, path returned", body = ReportResponse),
        (status = 400, description = "End date before start date", body = ErrorBody),
        (status = 403, description = "Patient asking for another patient's report", body = ErrorBody),
        (status = 404, description = "No assignments in the range", body = ErrorBody),
    ),
    security(("bearer" = [])),
    tag = "Reports"
)]
pub(crate) async fn generate_report(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(user_id): Path<Uuid>,
    Query(query): Query<ReportQuery>,
) -> ApiResult<Json<ReportResponse>> {
    auth.require_self_or_therapist(user_id)?;

    if query.end_date < query.start_date {
        return Err(ApiError::InvalidInput(
            "end_date must not be before start_date".to_string(),
        ));
    }

    let todos = sqlx::query_as::<_, ExerciseTodo>(
        "SELECT id, patient_id, date, name, repetitions, sets, weight, rest_time,
                completion_state, description, video_url
         FROM exercise_todos
         WHERE patient_id = $1 AND date >= $2 AND date <= $3
         ORDER BY date, id",
    )
    .bind(user_id)
    .bind(query.start_date)
    .bind(query.end_date)
    .fetch_all(&state.db)
    .await?;

    if todos.is_empty() {
        return Err(ApiError::NotFound(
            "No exercises found for the given date range".to_string(),
        ));
    }

    let patient_name: Option<String> =
        sqlx::query_scalar("SELECT name FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&state.db)
            .await?;
    let patient_name = patient_name.unwrap_or_else(|| user_id.to_string());

    let exercises = todos
        .into_iter()
        .map(ExerciseTodo::into_response)
        .collect::<ApiResult<Vec<_>>>()?;

    let report = render_report(&patient_name, query.start_date, query.end_date, &exercises);

    let file_name = report_file_name(user_id, query.start_date, query.end_date);
    let report_path = FsPath::new(&state.report_dir).join(&file_name);

    tokio::fs::create_dir_all(&state.report_dir)
        .await
        .map_err(|e| ApiError::Internal(format!("Failed to create report directory: {e}")))?;
    tokio::fs::write(&report_path, report)
        .await
        .map_err(|e| ApiError::Internal(format!("Failed to write report: {e}")))?;

    tracing::info!(patient = %user_id, path = %report_path.display(), "Report generated");

    Ok(Json(ReportResponse {
        report_path: report_path.to_string_lossy().into_owned(),
    }))
}
