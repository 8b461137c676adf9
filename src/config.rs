//! Application configuration constants.
//!
//! Gameplay numbers live here so the evaluator, the progression math and the
//! lesson runner agree on them. The tunable part is loaded into a
//! [`ProgressionPolicy`] from the `[progression]` table of `config.toml`.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::progression::{LessonAward, LevelCurve};

// ==================== Answer Evaluation ====================

/// Absolute per-component tolerance for complex answers
pub const COMPLEX_TOLERANCE: f64 = 1e-10;

/// Hints a learner may reveal per question
pub const MAX_HINTS_PER_QUESTION: usize = 3;

// ==================== Lives ====================

/// Lives a new learner starts with
pub const STARTING_LIVES: u8 = 3;

/// Upper bound for restored lives
pub const MAX_LIVES: u8 = 5;

// ==================== XP ====================

/// XP for each correctly answered question
pub const XP_PER_CORRECT_ANSWER: u64 = 5;

/// Daily XP goal shown in the progress bar
pub const DAILY_XP_GOAL: u64 = 50;

/// Level that unlocks the math-wizard achievement
pub const MATH_WIZARD_LEVEL: u32 = 5;

/// Consecutive days for the streak achievement
pub const STREAK_ACHIEVEMENT_DAYS: u32 = 3;

/// A lesson finished faster than this unlocks the fast-learner achievement
pub const FAST_LEARNER_SECONDS: f64 = 120.0;

// ==================== Policy ====================

/// Default config file location (relative to the working directory)
pub const CONFIG_FILE: &str = "config.toml";

/// Environment variable overriding [`CONFIG_FILE`]
pub const CONFIG_ENV_VAR: &str = "ANDROMEDA_CONFIG";

/// Tunable progression rules
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ProgressionPolicy {
    pub level_curve: LevelCurve,
    pub lesson_award: LessonAward,
    pub xp_per_correct_answer: u64,
    pub daily_xp_goal: u64,
    pub max_lives: u8,
}

impl Default for ProgressionPolicy {
    fn default() -> Self {
        Self {
            level_curve: LevelCurve::default(),
            lesson_award: LessonAward::default(),
            xp_per_correct_answer: XP_PER_CORRECT_ANSWER,
            daily_xp_goal: DAILY_XP_GOAL,
            max_lives: MAX_LIVES,
        }
    }
}

impl ProgressionPolicy {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.level_curve.base_cost == 0 {
            return Err(ConfigError::Invalid("level_curve.base_cost must be at least 1".into()));
        }
        if self.max_lives == 0 || self.max_lives > MAX_LIVES {
            return Err(ConfigError::Invalid(format!(
                "max_lives must be between 1 and {}",
                MAX_LIVES
            )));
        }
        if let Some(tier) = self
            .lesson_award
            .accuracy_tiers
            .iter()
            .find(|t| !(0.0..=1.0).contains(&t.min_accuracy))
        {
            return Err(ConfigError::Invalid(format!(
                "accuracy tier {} is outside 0..=1",
                tier.min_accuracy
            )));
        }
        Ok(())
    }
}

/// Configuration file structure for config.toml
#[derive(Debug, Deserialize)]
struct AppConfig {
    progression: Option<ProgressionPolicy>,
}

/// Error loading configuration.
#[derive(Debug)]
pub enum ConfigError {
    IoError(String),
    ParseError(String),
    Invalid(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError(e) => write!(f, "IO error: {}", e),
            ConfigError::ParseError(e) => write!(f, "Parse error: {}", e),
            ConfigError::Invalid(e) => write!(f, "Invalid config: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Read the `[progression]` table from a TOML file.
///
/// A missing file or a file without the table yields `Ok(None)`.
pub fn load_policy_from_path(path: &Path) -> Result<Option<ProgressionPolicy>, ConfigError> {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(ConfigError::IoError(format!("{}: {}", path.display(), e))),
    };

    let config: AppConfig = toml::from_str(&contents)
        .map_err(|e| ConfigError::ParseError(format!("{}: {}", path.display(), e)))?;

    if let Some(ref policy) = config.progression {
        policy.validate()?;
    }
    Ok(config.progression)
}

/// Load the progression policy with priority: $ANDROMEDA_CONFIG > config.toml > defaults.
///
/// Never fails; broken config files are logged and ignored.
pub fn load_policy() -> ProgressionPolicy {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let path = std::env::var(CONFIG_ENV_VAR)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(CONFIG_FILE));

    match load_policy_from_path(&path) {
        Ok(Some(policy)) => {
            tracing::info!("Using progression policy from {}", path.display());
            policy
        }
        Ok(None) => {
            tracing::info!("Using default progression policy");
            ProgressionPolicy::default()
        }
        Err(e) => {
            tracing::warn!("Ignoring config {}: {}", path.display(), e);
            ProgressionPolicy::default()
        }
    }
}
