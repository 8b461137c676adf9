//! WASM module for the lesson screen.
//!
//! Exposes answer checking and the XP math so the browser can give instant
//! feedback without a server round trip. Every export returns a JSON string;
//! failures come back as `{"error": "..."}`.

use wasm_bindgen::prelude::*;
use serde::Serialize;

use andromeda::domain::Question;
use andromeda::progression::{self, LessonAward, LessonSummary, SpeedBonusPolicy};
use andromeda::validation::{self, ComplexLiteral};

#[cfg(feature = "console_error_panic_hook")]
pub use console_error_panic_hook::set_once as set_panic_hook;

fn to_json<T: Serialize>(value: &T) -> String {
    match serde_json::to_string(value) {
        Ok(json) => json,
        Err(e) => error_json(format!("Failed to serialize result: {}", e)),
    }
}

fn error_json(message: impl std::fmt::Display) -> String {
    serde_json::json!({ "error": message.to_string() }).to_string()
}

// ============================================================================
// WASM Exports
// ============================================================================

/// Initialize panic hook for better error messages in browser console
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    set_panic_hook();
}

/// Evaluate an answer against a question in lesson JSON form.
///
/// Returns JSON: {"correct": bool, "matched": string|null}
#[wasm_bindgen]
pub fn evaluate_answer(question_json: &str, user_input: &str) -> String {
    let question: Question = match serde_json::from_str(question_json) {
        Ok(question) => question,
        Err(e) => return error_json(format!("Failed to parse question: {}", e)),
    };

    to_json(&validation::evaluate(user_input, &question))
}

/// Parse a complex literal such as "3-4i".
///
/// Returns JSON: {"real": number, "imag": number, "display": string}
#[wasm_bindgen]
pub fn parse_complex(input: &str) -> String {
    match ComplexLiteral::parse(input) {
        Some(z) => serde_json::json!({
            "real": z.real,
            "imag": z.imag,
            "display": z.to_string(),
        })
        .to_string(),
        None => error_json(format!("Not a complex number: {}", input.trim())),
    }
}

/// Level for a cumulative XP total, with the thresholds around it.
///
/// Returns JSON: {"level", "xp_to_next", "progress"}
#[wasm_bindgen]
pub fn level_for_xp(xp: u64) -> String {
    serde_json::json!({
        "level": progression::level_for_xp(xp),
        "xp_to_next": progression::xp_to_next_level(xp),
        "progress": progression::level_progress(xp),
    })
    .to_string()
}

/// Cumulative XP required to reach `level`.
///
/// Returns JSON: {"level", "threshold"}
#[wasm_bindgen]
pub fn threshold_for_level(level: u32) -> String {
    match progression::threshold_for_level(level) {
        Ok(threshold) => serde_json::json!({ "level": level, "threshold": threshold }).to_string(),
        Err(e) => error_json(e),
    }
}

/// XP for a finished lesson.
///
/// policy: "quick_finish" (default when empty), "minute_tiers" or "none"
///
/// Returns JSON: {"base", "accuracy_bonus", "speed_bonus", "total"}
#[wasm_bindgen]
pub fn lesson_xp(correct: u32, total: u32, elapsed_seconds: f64, policy: &str) -> String {
    let speed = if policy.trim().is_empty() {
        SpeedBonusPolicy::default()
    } else {
        match SpeedBonusPolicy::from_name(policy.trim()) {
            Some(speed) => speed,
            None => return error_json(format!("Unknown speed bonus preset: {}", policy)),
        }
    };

    let summary = LessonSummary::new(correct, total, elapsed_seconds);
    match LessonAward::with_speed(speed).award(&summary) {
        Ok(xp) => serde_json::json!({
            "base": xp.base,
            "accuracy_bonus": xp.accuracy_bonus,
            "speed_bonus": xp.speed_bonus,
            "total": xp.total(),
        })
        .to_string(),
        Err(e) => error_json(e),
    }
}

// ============================================================================
// Tests
// ============================================================================
