use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use crate::error::ApiError;
use crate::models::user::{Claims, Role};
use crate::AppState;

/// Token lifetime. The client never refreshes, so this is the hard session cap.
const TOKEN_LIFETIME_SECS: i64 = 7 * 24 * 3600;

/// Extractor for authenticated requests. Decodes the bearer JWT into the
/// calling user's id and role.
pub struct AuthUser {
    pub user_id: Uuid,
    pub role: Role,
}

impl AuthUser {
    /// Reject non-therapists. Assignment mutations and the roster are therapist-only.
    pub fn require_therapist(&self) -> Result<(), ApiError> {
        if self.role != Role::Therapist {
            return Err(ApiError::Forbidden(
                "Therapist role required".to_string(),
            ));
        }
        Ok(())
    }

    /// Patients may only touch their own records; therapists may touch any patient's.
    pub fn require_self_or_therapist(&self, patient_id: Uuid) -> Result<(), ApiError> {
        if self.role == Role::Therapist || self.user_id == patient_id {
            Ok(())
        } else {
            Err(ApiError::Forbidden(
                "Not allowed to access another patient's records".to_string(),
            ))
        }
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get("Authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ApiError::Unauthorized("Missing Authorization header".to_string()))?;

        let token = header
            .strip_prefix("Bearer ")
            .ok_or_else(|| ApiError::Unauthorized("Invalid Authorization format".to_string()))?;

        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(state.jwt_secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|_| ApiError::Unauthorized("Invalid or expired token".to_string()))?;

        Ok(AuthUser {
            user_id: token_data.claims.sub,
            role: token_data.claims.role,
        })
    }
}

pub fn create_token(
    user_id: Uuid,
    role: Role,
    secret: &str,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = chrono::Utc::now().timestamp();
    let claims = Claims {
        sub: user_id,
        role,
        exp: now + TOKEN_LIFETIME_SECS,
        iat: now,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}
