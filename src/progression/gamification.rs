//! Gamification rules applied to a learner's [`ProgressionState`].
//!
//! Every transition returns the events it caused so the UI layer can show
//! XP popups, level-up and achievement modals, or the out-of-lives screen.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{LessonSummary, ProgressionError};
use crate::config::{self, ProgressionPolicy};
use crate::domain::{AchievementId, ProgressionState};

/// Why XP was awarded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "id")]
pub enum XpReason {
  CorrectAnswer,
  LessonCompleted,
  Achievement(AchievementId),
}

/// Something the UI should react to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "event")]
pub enum ProgressEvent {
  XpAwarded { amount: u64, reason: XpReason },
  LevelUp { level: u32 },
  LifeLost { remaining: u8 },
  LifeRestored { lives: u8 },
  OutOfLives,
  AchievementUnlocked { id: AchievementId, xp: u64 },
  StreakUpdated { streak: u32 },
  LessonUnlocked { lesson_id: u32 },
  DailyReset,
}

/// Applies the progression policy to learner state
#[derive(Debug, Clone, Default)]
pub struct Gamification {
  policy: ProgressionPolicy,
}

impl Gamification {
  pub fn new(policy: ProgressionPolicy) -> Self {
    Self { policy }
  }

  pub fn policy(&self) -> &ProgressionPolicy {
    &self.policy
  }

  // ==================== XP ====================

  pub fn award_xp(
    &self,
    state: &mut ProgressionState,
    amount: u64,
    reason: XpReason,
  ) -> Vec<ProgressEvent> {
    let mut events = Vec::new();
    self.award_xp_into(state, amount, reason, &mut events);
    events
  }

  fn award_xp_into(
    &self,
    state: &mut ProgressionState,
    amount: u64,
    reason: XpReason,
    events: &mut Vec<ProgressEvent>,
  ) {
    if amount == 0 {
      return;
    }
    state.xp = state.xp.saturating_add(amount);
    state.daily_xp = state.daily_xp.saturating_add(amount);
    events.push(ProgressEvent::XpAwarded { amount, reason });

    let new_level = self.policy.level_curve.level_for_xp(state.xp);
    if new_level > state.level {
      state.level = new_level;
      tracing::info!("Level up: {} ({} XP)", new_level, state.xp);
      events.push(ProgressEvent::LevelUp { level: new_level });

      // Level-up reward
      self.restore_life_into(state, events);

      if new_level >= config::MATH_WIZARD_LEVEL {
        self.unlock_into(state, AchievementId::MathWizard, events);
      }
    }

    if self.policy.daily_xp_goal > 0 && state.daily_xp >= self.policy.daily_xp_goal {
      self.unlock_into(state, AchievementId::DailyGoal, events);
    }
  }

  /// Fraction of the daily goal reached, capped at 1.0
  pub fn daily_goal_progress(&self, state: &ProgressionState) -> f64 {
    if self.policy.daily_xp_goal == 0 {
      return 1.0;
    }
    (state.daily_xp as f64 / self.policy.daily_xp_goal as f64).min(1.0)
  }

  // ==================== Lives ====================

  /// Outcome of a single answered question
  pub fn record_answer(&self, state: &mut ProgressionState, correct: bool) -> Vec<ProgressEvent> {
    let mut events = Vec::new();
    if correct {
      self.award_xp_into(
        state,
        self.policy.xp_per_correct_answer,
        XpReason::CorrectAnswer,
        &mut events,
      );
    } else {
      self.lose_life_into(state, &mut events);
    }
    events
  }

  pub fn lose_life(&self, state: &mut ProgressionState) -> Vec<ProgressEvent> {
    let mut events = Vec::new();
    self.lose_life_into(state, &mut events);
    events
  }

  fn lose_life_into(&self, state: &mut ProgressionState, events: &mut Vec<ProgressEvent>) {
    if state.lives == 0 {
      return;
    }
    state.lives -= 1;
    events.push(ProgressEvent::LifeLost {
      remaining: state.lives,
    });
    if state.lives == 0 {
      events.push(ProgressEvent::OutOfLives);
    }
  }

  pub fn restore_life(&self, state: &mut ProgressionState) -> Vec<ProgressEvent> {
    let mut events = Vec::new();
    self.restore_life_into(state, &mut events);
    events
  }

  fn restore_life_into(&self, state: &mut ProgressionState, events: &mut Vec<ProgressEvent>) {
    if state.lives < self.policy.max_lives {
      state.lives += 1;
      events.push(ProgressEvent::LifeRestored { lives: state.lives });
    }
  }

  // ==================== Achievements ====================

  /// Unlock an achievement once, paying its XP reward
  pub fn unlock(&self, state: &mut ProgressionState, id: AchievementId) -> Vec<ProgressEvent> {
    let mut events = Vec::new();
    self.unlock_into(state, id, &mut events);
    events
  }

  fn unlock_into(
    &self,
    state: &mut ProgressionState,
    id: AchievementId,
    events: &mut Vec<ProgressEvent>,
  ) {
    if !state.achievements.insert(id) {
      return;
    }
    let xp = id.xp_reward();
    tracing::debug!("Achievement unlocked: {}", id);
    events.push(ProgressEvent::AchievementUnlocked { id, xp });
    self.award_xp_into(state, xp, XpReason::Achievement(id), events);
  }

  // ==================== Lessons ====================

  /// Apply a finished lesson: XP award, achievements, next-lesson unlock and streak
  pub fn complete_lesson(
    &self,
    state: &mut ProgressionState,
    lesson_id: u32,
    summary: &LessonSummary,
    today: NaiveDate,
  ) -> Result<Vec<ProgressEvent>, ProgressionError> {
    let award = self.policy.lesson_award.award(summary)?;
    let mut events = Vec::new();

    self.award_xp_into(state, award.total(), XpReason::LessonCompleted, &mut events);

    if summary.elapsed_seconds < config::FAST_LEARNER_SECONDS {
      self.unlock_into(state, AchievementId::FastLearner, &mut events);
    }
    self.unlock_into(state, AchievementId::FirstLesson, &mut events);
    if summary.is_perfect() {
      self.unlock_into(state, AchievementId::Perfectionist, &mut events);
    }

    state.completed_lessons.insert(lesson_id);
    let next = lesson_id.saturating_add(1);
    if next > state.current_lesson {
      state.current_lesson = next;
      events.push(ProgressEvent::LessonUnlocked { lesson_id: next });
    }

    self.update_streak_into(state, today, &mut events);
    Ok(events)
  }

  // ==================== Calendar ====================

  /// Count `today` as an active day
  pub fn update_streak(&self, state: &mut ProgressionState, today: NaiveDate) -> Vec<ProgressEvent> {
    let mut events = Vec::new();
    self.update_streak_into(state, today, &mut events);
    events
  }

  fn update_streak_into(
    &self,
    state: &mut ProgressionState,
    today: NaiveDate,
    events: &mut Vec<ProgressEvent>,
  ) {
    if state.last_active == Some(today) {
      return;
    }

    let continues = state.last_active.is_some() && state.last_active == today.pred_opt();
    state.streak = if continues { state.streak + 1 } else { 1 };
    state.last_active = Some(today);
    events.push(ProgressEvent::StreakUpdated {
      streak: state.streak,
    });

    if state.streak >= config::STREAK_ACHIEVEMENT_DAYS {
      self.unlock_into(state, AchievementId::Streak3, events);
    }
  }

  /// Reset daily XP once the calendar day changes
  pub fn roll_daily(&self, state: &mut ProgressionState, today: NaiveDate) -> Vec<ProgressEvent> {
    let mut events = Vec::new();
    match state.last_daily_reset {
      Some(last) if last >= today => {}
      Some(_) => {
        state.daily_xp = 0;
        state.last_daily_reset = Some(today);
        events.push(ProgressEvent::DailyReset);
      }
      None => state.last_daily_reset = Some(today),
    }
    events
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::progression::{LessonAward, SpeedBonusPolicy};

  fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, d).unwrap()
  }

  fn unlocked(events: &[ProgressEvent]) -> Vec<AchievementId> {
    events
      .iter()
      .filter_map(|e| match e {
        ProgressEvent::AchievementUnlocked { id, .. } => Some(*id),
        _ => None,
      })
      .collect()
  }

  #[test]
  fn test_correct_answer_awards_xp() {
    let g = Gamification::default();
    let mut state = ProgressionState::new();
    let events = g.record_answer(&mut state, true);
    assert_eq!(state.xp, 5);
    assert_eq!(state.daily_xp, 5);
    assert_eq!(
      events,
      vec![ProgressEvent::XpAwarded {
        amount: 5,
        reason: XpReason::CorrectAnswer
      }]
    );
  }

  #[test]
  fn test_wrong_answer_costs_life() {
    let g = Gamification::default();
    let mut state = ProgressionState::new();
    assert_eq!(state.lives, 3);

    g.record_answer(&mut state, false);
    g.record_answer(&mut state, false);
    let events = g.record_answer(&mut state, false);
    assert_eq!(state.lives, 0);
    assert_eq!(
      events,
      vec![ProgressEvent::LifeLost { remaining: 0 }, ProgressEvent::OutOfLives]
    );

    // Floor at zero, nothing else happens
    assert!(g.record_answer(&mut state, false).is_empty());
    assert_eq!(state.lives, 0);
  }

  #[test]
  fn test_restore_life_capped() {
    let g = Gamification::default();
    let mut state = ProgressionState::new();
    g.restore_life(&mut state);
    g.restore_life(&mut state);
    assert_eq!(state.lives, 5);
    assert!(g.restore_life(&mut state).is_empty());
    assert_eq!(state.lives, 5);
  }

  #[test]
  fn test_level_up_restores_life() {
    let g = Gamification::default();
    let mut state = ProgressionState::new();
    state.lives = 1;
    let events = g.award_xp(&mut state, 100, XpReason::LessonCompleted);
    assert_eq!(state.level, 2);
    assert_eq!(state.lives, 2);
    assert!(events.contains(&ProgressEvent::LevelUp { level: 2 }));
    assert!(events.contains(&ProgressEvent::LifeRestored { lives: 2 }));
  }

  #[test]
  fn test_math_wizard_at_level_five() {
    let g = Gamification::default();
    let mut state = ProgressionState::new();
    let events = g.award_xp(&mut state, 1300, XpReason::LessonCompleted);

    assert!(unlocked(&events).contains(&AchievementId::MathWizard));
    // 1300 + 100 reward
    assert_eq!(state.xp, 1400);
    assert_eq!(state.level, 5);
    // Unlocked only once
    let events = g.award_xp(&mut state, 1000, XpReason::LessonCompleted);
    assert!(!unlocked(&events).contains(&AchievementId::MathWizard));
  }

  #[test]
  fn test_daily_goal_unlocks_once() {
    let g = Gamification::default();
    let mut state = ProgressionState::new();
    let events = g.award_xp(&mut state, 49, XpReason::LessonCompleted);
    assert!(unlocked(&events).is_empty());

    let events = g.award_xp(&mut state, 1, XpReason::CorrectAnswer);
    assert_eq!(unlocked(&events), vec![AchievementId::DailyGoal]);
    // No reward XP attached
    assert_eq!(state.xp, 50);

    let events = g.award_xp(&mut state, 5, XpReason::CorrectAnswer);
    assert!(unlocked(&events).is_empty());
    assert!((g.daily_goal_progress(&state) - 1.0).abs() < 1e-12);
  }

  #[test]
  fn test_complete_first_lesson() {
    let g = Gamification::default();
    let mut state = ProgressionState::new();
    let summary = LessonSummary::new(10, 10, 90.0);
    let events = g.complete_lesson(&mut state, 1, &summary, day(10)).unwrap();

    let ids = unlocked(&events);
    assert!(ids.contains(&AchievementId::FastLearner));
    assert!(ids.contains(&AchievementId::FirstLesson));
    assert!(ids.contains(&AchievementId::Perfectionist));

    // 45 lesson + 30 fast + 10 first + 50 perfect
    assert_eq!(state.xp, 135);
    assert_eq!(state.level, 2);
    assert!(state.completed_lessons.contains(&1));
    assert_eq!(state.current_lesson, 2);
    assert!(events.contains(&ProgressEvent::LessonUnlocked { lesson_id: 2 }));
    assert_eq!(state.streak, 1);
  }

  #[test]
  fn test_complete_slow_imperfect_lesson() {
    let g = Gamification::default();
    let mut state = ProgressionState::new();
    let summary = LessonSummary::new(7, 10, 400.0);
    let events = g.complete_lesson(&mut state, 3, &summary, day(10)).unwrap();

    assert_eq!(unlocked(&events), vec![AchievementId::FirstLesson]);
    // 20 + 5 accuracy + 10 first-lesson
    assert_eq!(state.xp, 35);
    assert_eq!(state.current_lesson, 4);
  }

  #[test]
  fn test_repeating_old_lesson_keeps_unlock() {
    let g = Gamification::default();
    let mut state = ProgressionState::new();
    state.current_lesson = 5;
    let summary = LessonSummary::new(1, 2, 400.0);
    let events = g.complete_lesson(&mut state, 2, &summary, day(10)).unwrap();
    assert_eq!(state.current_lesson, 5);
    assert!(!events.iter().any(|e| matches!(e, ProgressEvent::LessonUnlocked { .. })));
  }

  #[test]
  fn test_complete_lesson_uses_policy_speed() {
    let policy = ProgressionPolicy {
      lesson_award: LessonAward::with_speed(SpeedBonusPolicy::minute_tiers()),
      ..ProgressionPolicy::default()
    };
    let g = Gamification::new(policy);
    let mut state = ProgressionState::new();
    let summary = LessonSummary::new(0, 3, 400.0);
    let events = g.complete_lesson(&mut state, 1, &summary, day(1)).unwrap();
    assert!(!unlocked(&events).contains(&AchievementId::FastLearner));
    // 20 + 5 (under ten minutes) + 10 first
    assert_eq!(state.xp, 35);
  }

  #[test]
  fn test_fast_learner_needs_two_minutes() {
    let policy = ProgressionPolicy {
      lesson_award: LessonAward::with_speed(SpeedBonusPolicy::minute_tiers()),
      ..ProgressionPolicy::default()
    };
    let g = Gamification::new(policy);

    let mut state = ProgressionState::new();
    g.complete_lesson(&mut state, 1, &LessonSummary::new(0, 3, 590.0), day(1))
      .unwrap();
    assert!(!state.has_achievement(AchievementId::FastLearner));

    let mut state = ProgressionState::new();
    g.complete_lesson(&mut state, 1, &LessonSummary::new(0, 3, 100.0), day(1))
      .unwrap();
    assert!(state.has_achievement(AchievementId::FastLearner));

    // No speed bonus configured, the achievement still goes by time
    let g = Gamification::new(ProgressionPolicy {
      lesson_award: LessonAward::with_speed(SpeedBonusPolicy::none()),
      ..ProgressionPolicy::default()
    });
    let mut state = ProgressionState::new();
    g.complete_lesson(&mut state, 1, &LessonSummary::new(0, 3, 30.0), day(1))
      .unwrap();
    assert!(state.has_achievement(AchievementId::FastLearner));
  }

  #[test]
  fn test_complete_lesson_rejects_bad_summary() {
    let g = Gamification::default();
    let mut state = ProgressionState::new();
    let result = g.complete_lesson(&mut state, 1, &LessonSummary::new(0, 0, 1.0), day(1));
    assert_eq!(result, Err(ProgressionError::NoQuestions));
    assert_eq!(state, ProgressionState::new());
  }

  #[test]
  fn test_streak_counting() {
    let g = Gamification::default();
    let mut state = ProgressionState::new();

    g.update_streak(&mut state, day(1));
    assert_eq!(state.streak, 1);
    // Same day again is ignored
    assert!(g.update_streak(&mut state, day(1)).is_empty());
    assert_eq!(state.streak, 1);

    g.update_streak(&mut state, day(2));
    let events = g.update_streak(&mut state, day(3));
    assert_eq!(state.streak, 3);
    assert!(unlocked(&events).contains(&AchievementId::Streak3));
    assert_eq!(state.xp, 25);

    // Gap breaks the streak
    g.update_streak(&mut state, day(5));
    assert_eq!(state.streak, 1);
  }

  #[test]
  fn test_roll_daily() {
    let g = Gamification::default();
    let mut state = ProgressionState::new();

    assert!(g.roll_daily(&mut state, day(1)).is_empty());
    g.award_xp(&mut state, 30, XpReason::LessonCompleted);

    assert!(g.roll_daily(&mut state, day(1)).is_empty());
    assert_eq!(state.daily_xp, 30);

    assert_eq!(g.roll_daily(&mut state, day(2)), vec![ProgressEvent::DailyReset]);
    assert_eq!(state.daily_xp, 0);
    assert_eq!(state.xp, 30);
  }

  #[test]
  fn test_event_json_shape() {
    let json = serde_json::to_string(&ProgressEvent::AchievementUnlocked {
      id: AchievementId::FastLearner,
      xp: 30,
    })
    .unwrap();
    assert_eq!(json, r#"{"event":"achievement_unlocked","id":"fast-learner","xp":30}"#);

    let json = serde_json::to_string(&ProgressEvent::XpAwarded {
      amount: 5,
      reason: XpReason::CorrectAnswer,
    })
    .unwrap();
    assert_eq!(json, r#"{"event":"xp_awarded","amount":5,"reason":{"kind":"correct_answer"}}"#);
  }
}
