use serde::{Deserialize, Serialize};

use super::ProgressionError;

/// Cost of advancing from level L to L+1 is `base_cost + cost_step * (L - 1)`.
///
/// Default: 100, 250, 400, ... per level, i.e. cumulative thresholds
/// 0, 100, 350, 750, 1300, ...
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelCurve {
  pub base_cost: u64,
  pub cost_step: u64,
}

impl Default for LevelCurve {
  fn default() -> Self {
    Self {
      base_cost: 100,
      cost_step: 150,
    }
  }
}

impl LevelCurve {
  /// Cumulative XP for `level` (>= 1), computed wide so no level can overflow.
  /// threshold(L) = (L-1)*base + step*(L-1)(L-2)/2
  fn threshold_wide(&self, level: u64) -> u128 {
    let n = level.saturating_sub(1) as u128;
    n * self.base_cost as u128 + self.cost_step as u128 * (n * n.saturating_sub(1) / 2)
  }

  /// XP needed to go from `level` to `level + 1`
  pub fn level_cost(&self, level: u32) -> Result<u64, ProgressionError> {
    if level == 0 {
      return Err(ProgressionError::InvalidLevel(level));
    }
    let cost = self.base_cost as u128 + self.cost_step as u128 * (level as u128 - 1);
    u64::try_from(cost).map_err(|_| ProgressionError::Overflow)
  }

  /// Cumulative XP required to reach `level`
  pub fn threshold_for_level(&self, level: u32) -> Result<u64, ProgressionError> {
    if level == 0 {
      return Err(ProgressionError::InvalidLevel(level));
    }
    u64::try_from(self.threshold_wide(level as u64)).map_err(|_| ProgressionError::Overflow)
  }

  /// Highest level whose threshold is <= `xp`
  pub fn level_for_xp(&self, xp: u64) -> u32 {
    let xp = xp as u128;
    let (mut lo, mut hi) = (1u64, u32::MAX as u64);
    while lo < hi {
      let mid = lo + (hi - lo).div_ceil(2);
      if self.threshold_wide(mid) <= xp {
        lo = mid;
      } else {
        hi = mid - 1;
      }
    }
    lo as u32
  }

  /// XP still missing until the next level
  pub fn xp_to_next_level(&self, xp: u64) -> u64 {
    let next = self.level_for_xp(xp) as u64 + 1;
    let remaining = self.threshold_wide(next).saturating_sub(xp as u128);
    u64::try_from(remaining).unwrap_or(u64::MAX)
  }

  /// Fraction of the current level span already earned, in `[0, 1)`.
  /// Reads 1.0 when the level cap is reached with XP to spare.
  pub fn level_progress(&self, xp: u64) -> f64 {
    let level = self.level_for_xp(xp) as u64;
    let floor = self.threshold_wide(level);
    let span = self.threshold_wide(level + 1).saturating_sub(floor);
    if span == 0 {
      return 0.0;
    }
    ((xp as u128).saturating_sub(floor) as f64 / span as f64).min(1.0)
  }
}

/// Level for a cumulative XP total on the default curve
pub fn level_for_xp(xp: u64) -> u32 {
  LevelCurve::default().level_for_xp(xp)
}

/// Cumulative XP required for `level` on the default curve
pub fn threshold_for_level(level: u32) -> Result<u64, ProgressionError> {
  LevelCurve::default().threshold_for_level(level)
}

pub fn xp_to_next_level(xp: u64) -> u64 {
  LevelCurve::default().xp_to_next_level(xp)
}

pub fn level_progress(xp: u64) -> f64 {
  LevelCurve::default().level_progress(xp)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_default_thresholds() {
    let expected = [0, 100, 350, 750, 1300, 2000];
    for (i, xp) in expected.iter().enumerate() {
      assert_eq!(threshold_for_level(i as u32 + 1).unwrap(), *xp);
    }
  }

  #[test]
  fn test_level_costs() {
    let curve = LevelCurve::default();
    assert_eq!(curve.level_cost(1).unwrap(), 100);
    assert_eq!(curve.level_cost(2).unwrap(), 250);
    assert_eq!(curve.level_cost(3).unwrap(), 400);
    assert_eq!(curve.level_cost(0), Err(ProgressionError::InvalidLevel(0)));
  }

  #[test]
  fn test_level_for_xp() {
    assert_eq!(level_for_xp(0), 1);
    assert_eq!(level_for_xp(99), 1);
    assert_eq!(level_for_xp(100), 2);
    assert_eq!(level_for_xp(349), 2);
    assert_eq!(level_for_xp(350), 3);
    assert_eq!(level_for_xp(1300), 5);
  }

  #[test]
  fn test_level_zero_rejected() {
    assert_eq!(threshold_for_level(0), Err(ProgressionError::InvalidLevel(0)));
  }

  #[test]
  fn test_threshold_consistency() {
    for level in 1..=200u32 {
      let threshold = threshold_for_level(level).unwrap();
      assert_eq!(level_for_xp(threshold), level);
      if level > 1 {
        assert!(level_for_xp(threshold - 1) < level);
        assert!(threshold > threshold_for_level(level - 1).unwrap());
      }
    }
  }

  #[test]
  fn test_monotonic_in_xp() {
    let mut previous = level_for_xp(0);
    for xp in (0..50_000u64).step_by(7) {
      let level = level_for_xp(xp);
      assert!(level >= previous, "level dropped at {} xp", xp);
      previous = level;
    }
  }

  #[test]
  fn test_huge_xp_does_not_overflow() {
    let level = level_for_xp(u64::MAX);
    assert!(level > 1);
    assert!(threshold_for_level(level).unwrap() <= u64::MAX);
    assert_eq!(threshold_for_level(u32::MAX), Err(ProgressionError::Overflow));
  }

  #[test]
  fn test_xp_to_next_level() {
    assert_eq!(xp_to_next_level(0), 100);
    assert_eq!(xp_to_next_level(120), 230);
    assert_eq!(xp_to_next_level(350), 400);
  }

  #[test]
  fn test_level_progress() {
    assert_eq!(level_progress(0), 0.0);
    assert!((level_progress(50) - 0.5).abs() < 1e-12);
    assert!((level_progress(100 + 125) - 0.5).abs() < 1e-12);
  }

  #[test]
  fn test_degenerate_curve_does_not_panic() {
    let curve = LevelCurve { base_cost: 0, cost_step: 0 };
    assert_eq!(curve.level_for_xp(5), u32::MAX);
    assert_eq!(curve.xp_to_next_level(5), 0);
    assert_eq!(curve.level_progress(5), 0.0);

    // Level cap reached with XP left over
    let curve = LevelCurve { base_cost: 1, cost_step: 0 };
    assert_eq!(curve.level_for_xp(u64::MAX), u32::MAX);
    assert_eq!(curve.xp_to_next_level(u64::MAX), 0);
    assert!(curve.level_progress(u64::MAX) <= 1.0);
  }

  #[test]
  fn test_flat_curve() {
    let curve = LevelCurve { base_cost: 10, cost_step: 0 };
    assert_eq!(curve.level_for_xp(95), 10);
    assert_eq!(curve.threshold_for_level(10).unwrap(), 90);
  }
}
