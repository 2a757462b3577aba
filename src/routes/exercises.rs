use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use uuid::Uuid;

use crate::error::{ApiError, ApiResult, ErrorBody};
use crate::middleware::auth::AuthUser;
use crate::models::exercise::{
    merge_catalog_details, resize_completion_state, AddExerciseTodoRequest, DateQuery,
    ExerciseTodo, ExerciseTodoResponse, ExercisesResponse, GeneralExercise,
    UpdateCompletionStateRequest, UpdateExerciseTodoRequest,
};
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/add_exercise_todo", post(add_exercise_todo))
        .route("/get_exercises/{user_id}", get(get_exercises))
        .route("/update_exercise_todo/{id}", put(update_exercise_todo))
        .route("/delete_exercise_todo/{id}", delete(delete_exercise_todo))
        .route(
            "/update_exercise_completion_state/{id}",
            put(update_exercise_completion_state),
        )
}

const TODO_COLUMNS: &str = "id, patient_id, date, name, repetitions, sets, weight, rest_time, \
                            completion_state, description, video_url";

async fn fetch_todo(state: &AppState, id: i64) -> ApiResult<ExerciseTodo> {
    sqlx::query_as::<_, ExerciseTodo>(&format!(
        "SELECT {TODO_COLUMNS} FROM exercise_todos WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| ApiError::NotFound("Exercise not found".to_string()))
}

#[utoipa::path(
    post,
    path = "/add_exercise_todo",
    request_body = AddExerciseTodoRequest,
    responses(
        (status = 201, description = "Assignment created", body = ExerciseTodoResponse),
        (status = 400, description = "Negative repetitions, sets, or rest time", body = ErrorBody),
        (status = 403, description = "Caller is not a therapist", body = ErrorBody),
    ),
    security(("bearer" = [])),
    tag = "Exercises"
)]
pub(crate) async fn add_exercise_todo(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<AddExerciseTodoRequest>,
) -> ApiResult<(StatusCode, Json<ExerciseTodoResponse>)> {
    auth.require_therapist()?;

    if req.name.trim().is_empty() {
        return Err(ApiError::InvalidInput("name is required".to_string()));
    }
    if req.repetitions < 0 || req.sets < 0 || req.rest_time < 0 {
        return Err(ApiError::InvalidInput(
            "repetitions, sets and rest_time must be non-negative".to_string(),
        ));
    }

    // One boolean per set, all unticked.
    let completion_state = serde_json::to_string(&vec![false; req.sets as usize])
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    let todo = sqlx::query_as::<_, ExerciseTodo>(&format!(
        "INSERT INTO exercise_todos
             (patient_id, date, name, repetitions, sets, weight, rest_time, completion_state)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
         RETURNING {TODO_COLUMNS}"
    ))
    .bind(req.user_id)
    .bind(req.date)
    .bind(req.name.trim())
    .bind(req.repetitions)
    .bind(req.sets)
    .bind(req.weight)
    .bind(req.rest_time)
    .bind(&completion_state)
    .fetch_one(&state.db)
    .await?;

    Ok((StatusCode::CREATED, Json(todo.into_response()?)))
}

#[utoipa::path(
    get,
    path = "/get_exercises/{user_id}",
    params(
        ("user_id" = Uuid, Path, description = "Patient id"),
        DateQuery,
    ),
    responses(
        (status = 200, description = "Assignments for the exact date, catalog details merged in", body = ExercisesResponse),
        (status = 403, description = "Patient asking for another patient's assignments", body = ErrorBody),
    ),
    security(("bearer" = [])),
    tag = "Exercises"
)]
pub(crate) async fn get_exercises(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(user_id): Path<Uuid>,
    Query(query): Query<DateQuery>,
) -> ApiResult<Json<ExercisesResponse>> {
    auth.require_self_or_therapist(user_id)?;

    let todos = sqlx::query_as::<_, ExerciseTodo>(&format!(
        "SELECT {TODO_COLUMNS} FROM exercise_todos
         WHERE patient_id = $1 AND date = $2 ORDER BY id"
    ))
    .bind(user_id)
    .bind(query.date)
    .fetch_all(&state.db)
    .await?;

    let mut exercises = todos
        .into_iter()
        .map(ExerciseTodo::into_response)
        .collect::<ApiResult<Vec<_>>>()?;

    // Display-time join against the catalog by exact name.
    let catalog = sqlx::query_as::<_, GeneralExercise>(
        "SELECT id, name, description, video_url FROM general_exercises",
    )
    .fetch_all(&state.db)
    .await?;
    merge_catalog_details(&mut exercises, &catalog);

    Ok(Json(ExercisesResponse { exercises }))
}

#[utoipa::path(
    put,
    path = "/update_exercise_todo/{id}",
    params(("id" = i64, Path, description = "Assignment id")),
    request_body = UpdateExerciseTodoRequest,
    responses(
        (status = 200, description = "Assignment updated", body = ExerciseTodoResponse),
        (status = 400, description = "Negative field value", body = ErrorBody),
        (status = 403, description = "Caller is not a therapist", body = ErrorBody),
        (status = 404, description = "Unknown assignment", body = ErrorBody),
    ),
    security(("bearer" = [])),
    tag = "Exercises"
)]
pub(crate) async fn update_exercise_todo(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i64>,
    Json(req): Json<UpdateExerciseTodoRequest>,
) -> ApiResult<Json<ExerciseTodoResponse>> {
    auth.require_therapist()?;

    let existing = fetch_todo(&state, id).await?;
    let stored_state = existing.completion_state()?;

    let name = req.name.unwrap_or(existing.name);
    let repetitions = req.repetitions.unwrap_or(existing.repetitions);
    let sets = req.sets.unwrap_or(existing.sets);
    let weight = req.weight.or(existing.weight);
    let rest_time = req.rest_time.unwrap_or(existing.rest_time);

    if repetitions < 0 || sets < 0 || rest_time < 0 {
        return Err(ApiError::InvalidInput(
            "repetitions, sets and rest_time must be non-negative".to_string(),
        ));
    }

    // Changing the set count resizes the completion state, preserving the
    // ticks that still fit.
    let completion_state = resize_completion_state(stored_state, sets as usize);
    let completion_state =
        serde_json::to_string(&completion_state).map_err(|e| ApiError::Internal(e.to_string()))?;

    let todo = sqlx::query_as::<_, ExerciseTodo>(&format!(
        "UPDATE exercise_todos
         SET name = $1, repetitions = $2, sets = $3, weight = $4, rest_time = $5,
             completion_state = $6
         WHERE id = $7
         RETURNING {TODO_COLUMNS}"
    ))
    .bind(&name)
    .bind(repetitions)
    .bind(sets)
    .bind(weight)
    .bind(rest_time)
    .bind(&completion_state)
    .bind(id)
    .fetch_one(&state.db)
    .await?;

    Ok(Json(todo.into_response()?))
}

#[utoipa::path(
    delete,
    path = "/delete_exercise_todo/{id}",
    params(("id" = i64, Path, description = "Assignment id")),
    responses(
        (status = 200, description = "Assignment deleted"),
        (status = 403, description = "Caller is not a therapist", body = ErrorBody),
        (status = 404, description = "Unknown assignment (including repeat deletes)", body = ErrorBody),
    ),
    security(("bearer" = [])),
    tag = "Exercises"
)]
pub(crate) async fn delete_exercise_todo(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i64>,
) -> ApiResult<Json<serde_json::Value>> {
    auth.require_therapist()?;

    let result = sqlx::query("DELETE FROM exercise_todos WHERE id = $1")
        .bind(id)
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound("Exercise not found".to_string()));
    }

    Ok(Json(serde_json::json!({
        "message": "Exercise deleted successfully"
    })))
}

#[utoipa::path(
    put,
    path = "/update_exercise_completion_state/{id}",
    params(("id" = i64, Path, description = "Assignment id")),
    request_body = UpdateCompletionStateRequest,
    responses(
        (status = 200, description = "Completion state replaced"),
        (status = 400, description = "Array length differs from the stored state", body = ErrorBody),
        (status = 403, description = "Patient toggling another patient's assignment", body = ErrorBody),
        (status = 404, description = "Unknown assignment", body = ErrorBody),
    ),
    security(("bearer" = [])),
    tag = "Exercises"
)]
pub(crate) async fn update_exercise_completion_state(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i64>,
    Json(req): Json<UpdateCompletionStateRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    let existing = fetch_todo(&state, id).await?;
    auth.require_self_or_therapist(existing.patient_id)?;

    // The client toggles a single set by replaying the whole array. Resizing
    // happens only through /update_exercise_todo, so a length mismatch means
    // the client is out of date.
    let stored = existing.completion_state()?;
    if req.completion_state.len() != stored.len() {
        return Err(ApiError::InvalidInput(format!(
            "completion_state must have {} entries, got {}",
            stored.len(),
            req.completion_state.len()
        )));
    }

    let encoded = serde_json::to_string(&req.completion_state)
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    sqlx::query("UPDATE exercise_todos SET completion_state = $1 WHERE id = $2")
        .bind(&encoded)
        .bind(id)
        .execute(&state.db)
        .await?;

    Ok(Json(serde_json::json!({
        "message": "Completion state updated successfully"
    })))
}
