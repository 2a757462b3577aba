use axum::{
    extract::State,
    http::StatusCode,
    routing::post,
    Json, Router,
};
use uuid::Uuid;

use crate::error::{ApiError, ApiResult, ErrorBody};
use crate::middleware::auth::create_token;
use crate::models::user::{AuthResponse, LoginRequest, RegisterRequest, Role};
use crate::AppState;

use argon2::Argon2;
use password_hash::rand_core::OsRng;
use password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
}

#[utoipa::path(
    post,
    path = "/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created"),
        (status = 400, description = "Missing field or invalid role", body = ErrorBody),
        (status = 409, description = "Email already registered", body = ErrorBody),
    ),
    tag = "Auth"
)]
pub(crate) async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<serde_json::Value>)> {
    let email = req.email.trim().to_lowercase();
    if req.name.trim().is_empty() || email.is_empty() || req.password.is_empty() {
        return Err(ApiError::InvalidInput(
            "name, email and password are required".to_string(),
        ));
    }
    if !email.contains('@') {
        return Err(ApiError::InvalidInput("Invalid email".to_string()));
    }
    let role: Role = req
        .role
        .as_deref()
        .unwrap_or("patient")
        .parse()
        .map_err(|_| {
            ApiError::InvalidInput("Role must be 'patient' or 'therapist'".to_string())
        })?;

    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(req.password.as_bytes(), &salt)
        .map_err(|_| ApiError::Internal("Failed to hash password".to_string()))?
        .to_string();

    sqlx::query("INSERT INTO users (id, name, email, password_hash, role) VALUES ($1, $2, $3, $4, $5)")
        .bind(Uuid::new_v4())
        .bind(req.name.trim())
        .bind(&email)
        .bind(&hash)
        .bind(role)
        .execute(&state.db)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                ApiError::Conflict("Email already registered".to_string())
            }
            _ => ApiError::from(e),
        })?;

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({ "message": "User registered successfully" })),
    ))
}

#[utoipa::path(
    post,
    path = "/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 401, description = "Invalid credentials", body = ErrorBody),
    ),
    tag = "Auth"
)]
pub(crate) async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let email = req.email.trim().to_lowercase();

    let row = sqlx::query_as::<_, (Uuid, String, Role)>(
        "SELECT id, password_hash, role FROM users WHERE email = $1",
    )
    .bind(&email)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| ApiError::Unauthorized("Invalid email or password".to_string()))?;

    let (user_id, password_hash, role) = row;

    let parsed_hash = PasswordHash::new(&password_hash)
        .map_err(|_| ApiError::Internal("Invalid stored hash".to_string()))?;

    Argon2::default()
        .verify_password(req.password.as_bytes(), &parsed_hash)
        .map_err(|_| ApiError::Unauthorized("Invalid email or password".to_string()))?;

    let access_token = create_token(user_id, role, &state.jwt_secret)
        .map_err(|_| ApiError::Internal("Failed to create token".to_string()))?;

    Ok(Json(AuthResponse { access_token, role }))
}
