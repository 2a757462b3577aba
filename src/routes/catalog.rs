use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};

use crate::error::{ApiError, ApiResult, ErrorBody};
use crate::middleware::auth::AuthUser;
use crate::models::exercise::{
    AddGeneralExerciseRequest, GeneralExercise, GeneralExercisesResponse,
    UpdateGeneralExerciseRequest,
};
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/get_general_exercises", get(get_general_exercises))
        .route("/add_general_exercise", post(add_general_exercise))
        .route("/update_general_exercise", put(update_general_exercise))
}

// Listing is deliberately unauthenticated: the mobile client fetches the
// catalog before login to populate the assignment picker.
#[utoipa::path(
    get,
    path = "/get_general_exercises",
    responses(
        (status = 200, description = "Full exercise catalog", body = GeneralExercisesResponse),
    ),
    tag = "Catalog"
)]
pub(crate) async fn get_general_exercises(
    State(state): State<AppState>,
) -> ApiResult<Json<GeneralExercisesResponse>> {
    let exercises = sqlx::query_as::<_, GeneralExercise>(
        "SELECT id, name, description, video_url FROM general_exercises ORDER BY id",
    )
    .fetch_all(&state.db)
    .await?;

    Ok(Json(GeneralExercisesResponse { exercises }))
}

#[utoipa::path(
    post,
    path = "/add_general_exercise",
    request_body = AddGeneralExerciseRequest,
    responses(
        (status = 201, description = "Catalog entry created", body = GeneralExercise),
        (status = 400, description = "Missing name or description", body = ErrorBody),
        (status = 403, description = "Caller is not a therapist", body = ErrorBody),
    ),
    security(("bearer" = [])),
    tag = "Catalog"
)]
pub(crate) async fn add_general_exercise(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<AddGeneralExerciseRequest>,
) -> ApiResult<(StatusCode, Json<GeneralExercise>)> {
    auth.require_therapist()?;

    if req.name.trim().is_empty() || req.description.trim().is_empty() {
        return Err(ApiError::InvalidInput(
            "name and description are required".to_string(),
        ));
    }

    let exercise = sqlx::query_as::<_, GeneralExercise>(
        "INSERT INTO general_exercises (name, description, video_url) VALUES ($1, $2, $3)
         RETURNING id, name, description, video_url",
    )
    .bind(req.name.trim())
    .bind(req.description.trim())
    .bind(&req.video_url)
    .fetch_one(&state.db)
    .await?;

    Ok((StatusCode::CREATED, Json(exercise)))
}

#[utoipa::path(
    put,
    path = "/update_general_exercise",
    request_body = UpdateGeneralExerciseRequest,
    responses(
        (status = 200, description = "Video URL updated"),
        (status = 403, description = "Caller is not a therapist", body = ErrorBody),
        (status = 404, description = "Unknown catalog entry", body = ErrorBody),
    ),
    security(("bearer" = [])),
    tag = "Catalog"
)]
pub(crate) async fn update_general_exercise(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<UpdateGeneralExerciseRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    auth.require_therapist()?;

    let result = sqlx::query("UPDATE general_exercises SET video_url = $1 WHERE id = $2")
        .bind(&req.video_url)
        .bind(req.id)
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound("Exercise not found".to_string()));
    }

    Ok(Json(serde_json::json!({
        "message": "Video URL updated successfully"
    })))
}
