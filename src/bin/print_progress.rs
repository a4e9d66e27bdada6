// Small dev utility: print a student's academic progress and full transcript as JSON.
//
// Usage:
//   cargo run --bin print_progress -- <student_id> [db_path]

use course_registry::app::{get_default_db_path, AppState};
use serde_json::json;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    course_registry::logging::init();

    let mut args = std::env::args().skip(1);
    let student_id = args
        .next()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or("Usage: print_progress <student_id> [db_path]")?;
    let db_path = args.next().unwrap_or_else(get_default_db_path);

    let state = AppState::new(db_path)?;
    let progress = state.progress_api.get_student_academic_progress(&student_id)?;
    let transcript = state.transcript_api.get_student_full_transcript(&student_id)?;

    println!(
        "{}",
        serde_json::to_string_pretty(&json!({
            "progress": progress,
            "transcript": transcript,
        }))?
    );
    Ok(())
}
