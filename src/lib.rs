pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;

use utoipa::OpenApi;

#[derive(Clone)]
pub struct AppState {
    pub db: sqlx::SqlitePool,
    pub jwt_secret: String,
    /// Directory where generated report files are written.
    pub report_dir: String,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        routes::auth::register,
        routes::auth::login,
        routes::users::get_users,
        routes::catalog::get_general_exercises,
        routes::catalog::add_general_exercise,
        routes::catalog::update_general_exercise,
        routes::exercises::add_exercise_todo,
        routes::exercises::get_exercises,
        routes::exercises::update_exercise_todo,
        routes::exercises::delete_exercise_todo,
        routes::exercises::update_exercise_completion_state,
        routes::reports::generate_report,
    ),
    components(schemas(
        error::ErrorBody,
        models::user::RegisterRequest,
        models::user::LoginRequest,
        models::user::AuthResponse,
        models::user::Role,
        models::user::UserSummary,
        models::user::UsersResponse,
        models::exercise::GeneralExercise,
        models::exercise::GeneralExercisesResponse,
        models::exercise::AddGeneralExerciseRequest,
        models::exercise::UpdateGeneralExerciseRequest,
        models::exercise::AddExerciseTodoRequest,
        models::exercise::UpdateExerciseTodoRequest,
        models::exercise::UpdateCompletionStateRequest,
        models::exercise::ExerciseTodoResponse,
        models::exercise::ExercisesResponse,
        models::report::ReportResponse,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "Auth", description = "Registration & login"),
        (name = "Users", description = "Patient roster for therapists"),
        (name = "Catalog", description = "General exercise catalog"),
        (name = "Exercises", description = "Per-patient exercise assignments"),
        (name = "Reports", description = "Completion reports over a date range")
    ),
    security(("bearer" = []))
)]
pub struct ApiDoc;

pub struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer",
            utoipa::openapi::security::SecurityScheme::Http(
                utoipa::openapi::security::Http::new(
                    utoipa::openapi::security::HttpAuthScheme::Bearer,
                ),
            ),
        );
    }
}
