//! XP, levels and gamification rules.
//!
//! Everything here is pure: functions take a state or a number and return new
//! numbers or events. Persistence and rendering belong to the host.

pub mod gamification;
pub mod lesson_xp;
pub mod levels;

pub use gamification::{Gamification, ProgressEvent, XpReason};
pub use lesson_xp::{
  AccuracyTier, LessonAward, LessonSummary, LessonXp, SpeedBonusPolicy, SpeedTier,
  xp_for_lesson_completion,
};
pub use levels::{LevelCurve, level_for_xp, level_progress, threshold_for_level, xp_to_next_level};

/// Caller contract violation in progression math
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressionError {
  /// Levels start at 1
  InvalidLevel(u32),
  /// A lesson must contain at least one question
  NoQuestions,
  CorrectExceedsTotal { correct: u32, total: u32 },
  /// Elapsed time must be finite and non-negative
  InvalidElapsed(f64),
  /// Threshold does not fit in u64
  Overflow,
}

impl std::fmt::Display for ProgressionError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      ProgressionError::InvalidLevel(level) => write!(f, "Invalid level: {}", level),
      ProgressionError::NoQuestions => write!(f, "Lesson has no questions"),
      ProgressionError::CorrectExceedsTotal { correct, total } => {
        write!(f, "{} correct answers out of {} questions", correct, total)
      }
      ProgressionError::InvalidElapsed(secs) => write!(f, "Invalid elapsed time: {}", secs),
      ProgressionError::Overflow => write!(f, "XP threshold overflow"),
    }
  }
}

impl std::error::Error for ProgressionError {}
