use axum::{extract::State, routing::get, Json, Router};

use crate::error::{ApiResult, ErrorBody};
use crate::middleware::auth::AuthUser;
use crate::models::user::{UserSummary, UsersResponse};
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/get_users", get(get_users))
}

#[utoipa::path(
    get,
    path = "/get_users",
    responses(
        (status = 200, description = "Patient roster", body = UsersResponse),
        (status = 403, description = "Caller is not a therapist", body = ErrorBody),
    ),
    security(("bearer" = [])),
    tag = "Users"
)]
pub(crate) async fn get_users(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<UsersResponse>> {
    auth.require_therapist()?;

    let users = sqlx::query_as::<_, UserSummary>(
        "SELECT id, name, email FROM users WHERE role = 'patient' ORDER BY name",
    )
    .fetch_all(&state.db)
    .await?;

    Ok(Json(UsersResponse { users }))
}
