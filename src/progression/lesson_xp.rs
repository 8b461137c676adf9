//! XP award for a finished lesson: base + accuracy bonus + speed bonus.

use serde::{Deserialize, Serialize};

use super::ProgressionError;

// ============================================================================
// Lesson result
// ============================================================================

/// What the lesson runner reports when the last question is done
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LessonSummary {
  pub correct: u32,
  pub total: u32,
  pub elapsed_seconds: f64,
}

impl LessonSummary {
  pub fn new(correct: u32, total: u32, elapsed_seconds: f64) -> Self {
    Self {
      correct,
      total,
      elapsed_seconds,
    }
  }

  pub fn validate(&self) -> Result<(), ProgressionError> {
    if self.total == 0 {
      return Err(ProgressionError::NoQuestions);
    }
    if self.correct > self.total {
      return Err(ProgressionError::CorrectExceedsTotal {
        correct: self.correct,
        total: self.total,
      });
    }
    if !self.elapsed_seconds.is_finite() || self.elapsed_seconds < 0.0 {
      return Err(ProgressionError::InvalidElapsed(self.elapsed_seconds));
    }
    Ok(())
  }

  /// Share of correct answers; 0.0 for an empty lesson
  pub fn accuracy(&self) -> f64 {
    if self.total > 0 {
      self.correct as f64 / self.total as f64
    } else {
      0.0
    }
  }

  pub fn is_perfect(&self) -> bool {
    self.total > 0 && self.correct == self.total
  }
}

// ============================================================================
// Bonus tiers
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AccuracyTier {
  pub min_accuracy: f64,
  pub bonus: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpeedTier {
  pub under_seconds: f64,
  pub bonus: u64,
}

/// Speed bonus tiers, fastest first. The first tier the lesson beats pays out.
///
/// Two presets exist because the lesson screen and the XP tracker historically
/// disagreed: [`SpeedBonusPolicy::quick_finish`] pays +10 under two minutes,
/// [`SpeedBonusPolicy::minute_tiers`] pays +10 under five and +5 under ten.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawSpeedPolicy", into = "Vec<SpeedTier>")]
pub struct SpeedBonusPolicy {
  tiers: Vec<SpeedTier>,
}

/// Config form: a preset name or an explicit tier list
#[derive(Deserialize)]
#[serde(untagged)]
enum RawSpeedPolicy {
  Preset(String),
  Tiers(Vec<SpeedTier>),
}

impl TryFrom<RawSpeedPolicy> for SpeedBonusPolicy {
  type Error = String;

  fn try_from(raw: RawSpeedPolicy) -> Result<Self, Self::Error> {
    match raw {
      RawSpeedPolicy::Preset(name) => {
        Self::from_name(&name).ok_or_else(|| format!("Unknown speed bonus preset: {}", name))
      }
      RawSpeedPolicy::Tiers(tiers) => {
        if let Some(bad) = tiers.iter().find(|t| !t.under_seconds.is_finite()) {
          return Err(format!("Speed tier limit must be finite: {}", bad.under_seconds));
        }
        Ok(Self::from_tiers(tiers))
      }
    }
  }
}

impl From<SpeedBonusPolicy> for Vec<SpeedTier> {
  fn from(policy: SpeedBonusPolicy) -> Self {
    policy.tiers
  }
}

impl SpeedBonusPolicy {
  pub fn from_tiers(mut tiers: Vec<SpeedTier>) -> Self {
    tiers.sort_by(|a, b| a.under_seconds.total_cmp(&b.under_seconds));
    Self { tiers }
  }

  /// +10 XP for finishing in under two minutes
  pub fn quick_finish() -> Self {
    Self::from_tiers(vec![SpeedTier {
      under_seconds: 120.0,
      bonus: 10,
    }])
  }

  /// +10 XP under five minutes, +5 XP under ten minutes
  pub fn minute_tiers() -> Self {
    Self::from_tiers(vec![
      SpeedTier {
        under_seconds: 300.0,
        bonus: 10,
      },
      SpeedTier {
        under_seconds: 600.0,
        bonus: 5,
      },
    ])
  }

  pub fn none() -> Self {
    Self { tiers: Vec::new() }
  }

  pub fn from_name(name: &str) -> Option<Self> {
    match name {
      "quick_finish" => Some(Self::quick_finish()),
      "minute_tiers" => Some(Self::minute_tiers()),
      "none" => Some(Self::none()),
      _ => None,
    }
  }

  pub fn tiers(&self) -> &[SpeedTier] {
    &self.tiers
  }

  pub fn bonus_for(&self, elapsed_seconds: f64) -> u64 {
    self
      .tiers
      .iter()
      .find(|t| elapsed_seconds < t.under_seconds)
      .map(|t| t.bonus)
      .unwrap_or(0)
  }
}

impl Default for SpeedBonusPolicy {
  fn default() -> Self {
    Self::quick_finish()
  }
}

// ============================================================================
// Award
// ============================================================================

/// XP breakdown for a finished lesson
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LessonXp {
  pub base: u64,
  pub accuracy_bonus: u64,
  pub speed_bonus: u64,
}

impl LessonXp {
  pub fn total(&self) -> u64 {
    self.base + self.accuracy_bonus + self.speed_bonus
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LessonAward {
  pub base: u64,
  /// Any order; the highest reached threshold applies
  pub accuracy_tiers: Vec<AccuracyTier>,
  pub speed: SpeedBonusPolicy,
}

impl Default for LessonAward {
  fn default() -> Self {
    Self {
      base: 20,
      accuracy_tiers: vec![
        AccuracyTier {
          min_accuracy: 0.9,
          bonus: 15,
        },
        AccuracyTier {
          min_accuracy: 0.8,
          bonus: 10,
        },
        AccuracyTier {
          min_accuracy: 0.7,
          bonus: 5,
        },
      ],
      speed: SpeedBonusPolicy::default(),
    }
  }
}

impl LessonAward {
  pub fn with_speed(speed: SpeedBonusPolicy) -> Self {
    Self {
      speed,
      ..Self::default()
    }
  }

  pub fn accuracy_bonus(&self, accuracy: f64) -> u64 {
    // Config may list tiers in any order; the best reached tier wins
    self
      .accuracy_tiers
      .iter()
      .filter(|t| accuracy >= t.min_accuracy)
      .max_by(|a, b| a.min_accuracy.total_cmp(&b.min_accuracy))
      .map(|t| t.bonus)
      .unwrap_or(0)
  }

  pub fn award(&self, summary: &LessonSummary) -> Result<LessonXp, ProgressionError> {
    summary.validate()?;
    Ok(LessonXp {
      base: self.base,
      accuracy_bonus: self.accuracy_bonus(summary.accuracy()),
      speed_bonus: self.speed.bonus_for(summary.elapsed_seconds),
    })
  }
}

/// XP for a lesson with the default award (two-minute speed bonus)
pub fn xp_for_lesson_completion(
  correct: u32,
  total: u32,
  elapsed_seconds: f64,
) -> Result<u64, ProgressionError> {
  LessonAward::default()
    .award(&LessonSummary::new(correct, total, elapsed_seconds))
    .map(|xp| xp.total())
}
