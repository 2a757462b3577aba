use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};

// ── Database rows ────────────────────────────────────────────────────────────

/// Catalog entry. Read-only template that therapists assign from; values are
/// copied into assignments at creation time, never referenced live.
#[derive(Debug, Serialize, sqlx::FromRow, ToSchema)]
pub struct GeneralExercise {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub video_url: Option<String>,
}

/// One exercise instance scheduled for a patient on a specific date.
///
/// `completion_state` is stored as a JSON array of booleans, one per set;
/// its length always equals `sets`.
#[derive(Debug, sqlx::FromRow)]
pub struct ExerciseTodo {
    pub id: i64,
    pub patient_id: Uuid,
    pub date: NaiveDate,
    pub name: String,
    pub repetitions: i64,
    pub sets: i64,
    pub weight: Option<f64>,
    pub rest_time: i64,
    pub completion_state: String,
    pub description: Option<String>,
    pub video_url: Option<String>,
}

impl ExerciseTodo {
    /// Decode the stored completion state. A malformed column is a server bug,
    /// surfaced as a sanitized 500.
    pub fn completion_state(&self) -> ApiResult<Vec<bool>> {
        serde_json::from_str(&self.completion_state).map_err(|e| {
            ApiError::Internal(format!(
                "Corrupt completion_state for exercise {}: {e}",
                self.id
            ))
        })
    }

    pub fn into_response(self) -> ApiResult<ExerciseTodoResponse> {
        let completion_state = self.completion_state()?;
        Ok(ExerciseTodoResponse {
            id: self.id,
            patient_id: self.patient_id,
            date: self.date,
            name: self.name,
            repetitions: self.repetitions,
            sets: self.sets,
            weight: self.weight,
            rest_time: self.rest_time,
            completion_state,
            description: self.description,
            video_url: self.video_url,
        })
    }
}

// ── API types ────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, ToSchema)]
pub struct ExerciseTodoResponse {
    pub id: i64,
    pub patient_id: Uuid,
    /// Assignment date, `yyyy-MM-dd`
    pub date: NaiveDate,
    pub name: String,
    pub repetitions: i64,
    pub sets: i64,
    pub weight: Option<f64>,
    pub rest_time: i64,
    /// One entry per set
    pub completion_state: Vec<bool>,
    pub description: Option<String>,
    pub video_url: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ExercisesResponse {
    pub exercises: Vec<ExerciseTodoResponse>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct GeneralExercisesResponse {
    pub exercises: Vec<GeneralExercise>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddExerciseTodoRequest {
    /// Patient the exercise is assigned to
    pub user_id: Uuid,
    /// Assignment date, `yyyy-MM-dd`
    pub date: NaiveDate,
    pub name: String,
    pub repetitions: i64,
    pub sets: i64,
    #[serde(default)]
    pub weight: Option<f64>,
    /// Rest between sets, in seconds
    pub rest_time: i64,
}

/// Partial update; absent fields keep their stored value.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateExerciseTodoRequest {
    pub name: Option<String>,
    pub repetitions: Option<i64>,
    pub sets: Option<i64>,
    pub weight: Option<f64>,
    pub rest_time: Option<i64>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateCompletionStateRequest {
    /// Full replacement array; must match the stored length exactly
    pub completion_state: Vec<bool>,
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct DateQuery {
    /// Exact date to list, `yyyy-MM-dd`
    pub date: NaiveDate,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddGeneralExerciseRequest {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub video_url: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateGeneralExerciseRequest {
    pub id: i64,
    pub video_url: String,
}

// ── Domain rules ─────────────────────────────────────────────────────────────

/// Resize a completion state when the set count changes: growing appends
/// `false` entries, shrinking truncates from the end. Existing booleans keep
/// their value up to the new length.
pub fn resize_completion_state(mut state: Vec<bool>, sets: usize) -> Vec<bool> {
    state.resize(sets, false);
    state
}

/// Display-time join against the catalog: an assignment whose name exactly
/// matches a catalog entry has its `description` and `video_url` overlaid from
/// that entry. No match leaves the stored values untouched. Catalog renames
/// silently break the match; that is the contract's tradeoff.
pub fn merge_catalog_details(exercises: &mut [ExerciseTodoResponse], catalog: &[GeneralExercise]) {
    let by_name: HashMap<&str, &GeneralExercise> =
        catalog.iter().map(|g| (g.name.as_str(), g)).collect();

    for exercise in exercises {
        if let Some(entry) = by_name.get(exercise.name.as_str()) {
            exercise.description = Some(entry.description.clone());
            exercise.video_url = entry.video_url.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn todo_response(name: &str) -> ExerciseTodoResponse {
        ExerciseTodoResponse {
            id: 1,
            patient_id: Uuid::new_v4(),
            date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            name: name.to_string(),
            repetitions: 10,
            sets: 3,
            weight: None,
            rest_time: 60,
            completion_state: vec![false; 3],
            description: None,
            video_url: None,
        }
    }

    #[test]
    fn growing_sets_appends_false() {
        let resized = resize_completion_state(vec![true, false], 5);
        assert_eq!(resized, vec![true, false, false, false, false]);
    }

    #[test]
    fn shrinking_sets_truncates_from_the_end() {
        let resized = resize_completion_state(vec![true, false, true, true, false], 2);
        assert_eq!(resized, vec![true, false]);
    }

    #[test]
    fn unchanged_sets_is_a_no_op() {
        let state = vec![true, true, false];
        assert_eq!(resize_completion_state(state.clone(), 3), state);
    }

    #[test]
    fn resize_to_zero_yields_empty_state() {
        assert!(resize_completion_state(vec![true, true], 0).is_empty());
    }

    #[test]
    fn merge_overlays_matching_catalog_entry() {
        let catalog = vec![GeneralExercise {
            id: 1,
            name: "Squats".to_string(),
            description: "Bodyweight squat".to_string(),
            video_url: Some("https://example.com/squats".to_string()),
        }];
        let mut exercises = vec![todo_response("Squats")];

        merge_catalog_details(&mut exercises, &catalog);

        assert_eq!(exercises[0].description.as_deref(), Some("Bodyweight squat"));
        assert_eq!(
            exercises[0].video_url.as_deref(),
            Some("https://example.com/squats")
        );
    }

    #[test]
    fn merge_leaves_unmatched_names_alone() {
        let catalog = vec![GeneralExercise {
            id: 1,
            name: "Squats".to_string(),
            description: "Bodyweight squat".to_string(),
            video_url: None,
        }];
        // Misspelled name: exact equality only, no fuzzy matching.
        let mut exercises = vec![todo_response("Sqwats")];

        merge_catalog_details(&mut exercises, &catalog);

        assert_eq!(exercises[0].description, None);
        assert_eq!(exercises[0].video_url, None);
    }

    #[test]
    fn corrupt_completion_state_surfaces_as_internal_error() {
        let todo = ExerciseTodo {
            id: 7,
            patient_id: Uuid::new_v4(),
            date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            name: "Plank".to_string(),
            repetitions: 1,
            sets: 3,
            weight: None,
            rest_time: 30,
            completion_state: "not json".to_string(),
            description: None,
            video_url: None,
        };
        assert!(todo.completion_state().is_err());
    }
}
