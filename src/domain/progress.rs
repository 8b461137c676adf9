use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::config;

/// Achievements that can be unlocked once per learner
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AchievementId {
  FirstLesson,
  #[serde(rename = "streak-3")]
  Streak3,
  Perfectionist,
  FastLearner,
  MathWizard,
  DailyGoal,
}

impl AchievementId {
  pub const ALL: [AchievementId; 6] = [
    Self::FirstLesson,
    Self::Streak3,
    Self::Perfectionist,
    Self::FastLearner,
    Self::MathWizard,
    Self::DailyGoal,
  ];

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::FirstLesson => "first-lesson",
      Self::Streak3 => "streak-3",
      Self::Perfectionist => "perfectionist",
      Self::FastLearner => "fast-learner",
      Self::MathWizard => "math-wizard",
      Self::DailyGoal => "daily-goal",
    }
  }

  pub fn from_str(s: &str) -> Option<Self> {
    Self::ALL.into_iter().find(|a| a.as_str() == s)
  }

  /// XP paid out when the achievement unlocks
  pub fn xp_reward(&self) -> u64 {
    match self {
      Self::FirstLesson => 10,
      Self::Streak3 => 25,
      Self::Perfectionist => 50,
      Self::FastLearner => 30,
      Self::MathWizard => 100,
      // Not part of the reward catalog, tracked only
      Self::DailyGoal => 0,
    }
  }
}

impl std::fmt::Display for AchievementId {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

/// Per-learner progression record. Owned and persisted by the host;
/// the core only transforms it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressionState {
  pub xp: u64,
  pub level: u32,
  pub daily_xp: u64,
  /// Remaining lives, `0..=MAX_LIVES`
  pub lives: u8,
  /// Consecutive active days
  pub streak: u32,
  pub achievements: BTreeSet<AchievementId>,
  pub completed_lessons: BTreeSet<u32>,
  /// Highest lesson the learner may open
  pub current_lesson: u32,
  pub last_active: Option<NaiveDate>,
  pub last_daily_reset: Option<NaiveDate>,
}

impl Default for ProgressionState {
  fn default() -> Self {
    Self {
      xp: 0,
      level: 1,
      daily_xp: 0,
      lives: config::STARTING_LIVES,
      streak: 0,
      achievements: BTreeSet::new(),
      completed_lessons: BTreeSet::new(),
      current_lesson: 1,
      last_active: None,
      last_daily_reset: None,
    }
  }
}

impl ProgressionState {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn has_achievement(&self, id: AchievementId) -> bool {
    self.achievements.contains(&id)
  }

  pub fn is_lesson_unlocked(&self, lesson_id: u32) -> bool {
    lesson_id <= self.current_lesson
  }
}
