use chrono::NaiveDate;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::exercise::ExerciseTodoResponse;

#[derive(Debug, Serialize, ToSchema)]
pub struct ReportResponse {
    /// Filesystem path of the generated report file.
    pub report_path: String,
}

/// File name for a report artifact. Recomputed on every request; a repeat
/// request for the same patient and range overwrites the previous file.
pub fn report_file_name(patient_id: Uuid, start: NaiveDate, end: NaiveDate) -> String {
    format!("report_{patient_id}_{start}_to_{end}.txt")
}

/// Render a completion report as plain text.
///
/// Assignments must be sorted by date. Per day: one line per exercise with its
/// completed/total set count, then the day's completion fraction. A summary
/// line with the overall fraction closes the report.
pub fn render_report(
    patient_name: &str,
    start: NaiveDate,
    end: NaiveDate,
    exercises: &[ExerciseTodoResponse],
) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Completion report for {patient_name} ({start} to {end})\n"
    ));

    let mut total_sets = 0usize;
    let mut total_done = 0usize;
    let mut current_day: Option<NaiveDate> = None;
    let mut day_sets = 0usize;
    let mut day_done = 0usize;

    for exercise in exercises {
        if current_day != Some(exercise.date) {
            if current_day.is_some() {
                push_day_summary(&mut out, day_done, day_sets);
            }
            current_day = Some(exercise.date);
            day_sets = 0;
            day_done = 0;
            out.push_str(&format!("\n{}\n", exercise.date));
        }

        let done = exercise.completion_state.iter().filter(|c| **c).count();
        let sets = exercise.completion_state.len();
        day_done += done;
        day_sets += sets;
        total_done += done;
        total_sets += sets;

        out.push_str(&format!(
            "  {}: {done}/{sets} sets, {} reps, rest {}s",
            exercise.name, exercise.repetitions, exercise.rest_time
        ));
        if let Some(weight) = exercise.weight {
            out.push_str(&format!(", {weight} kg"));
        }
        out.push('\n');
    }

    if current_day.is_some() {
        push_day_summary(&mut out, day_done, day_sets);
    }

    out.push_str(&format!(
        "\nOverall: {total_done}/{total_sets} sets completed ({}%)\n",
        percent(total_done, total_sets)
    ));
    out
}

fn push_day_summary(out: &mut String, done: usize, sets: usize) {
    out.push_str(&format!(
        "  Day total: {done}/{sets} sets ({}%)\n",
        percent(done, sets)
    ));
}

fn percent(done: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    (done * 100 / total) as u32
}
