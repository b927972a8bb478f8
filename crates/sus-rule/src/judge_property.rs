use serde::{Deserialize, Serialize};

use crate::play_result::RunningResult;

/// Judgement category, tightest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum JudgeCategory {
    Perfect,
    Great,
    Good,
    Bad,
    Miss,
}

impl JudgeCategory {
    pub const ALL: [JudgeCategory; 5] = [
        JudgeCategory::Perfect,
        JudgeCategory::Great,
        JudgeCategory::Good,
        JudgeCategory::Bad,
        JudgeCategory::Miss,
    ];

    /// Perfect, Great and Good extend the combo.
    pub fn keeps_combo(self) -> bool {
        matches!(
            self,
            JudgeCategory::Perfect | JudgeCategory::Great | JudgeCategory::Good
        )
    }

    /// Whether the combo increment gets the emphasized presentation.
    pub fn is_big_combo(self) -> bool {
        matches!(self, JudgeCategory::Perfect | JudgeCategory::Great)
    }

    /// Bad and Miss are silent.
    pub fn plays_hit_sound(self) -> bool {
        self.keeps_combo()
    }
}

/// Distance thresholds for each category, in presentation position units.
///
/// Each bound is inclusive. Presses farther than `miss` do not pick a note at all;
/// a pending note more than `miss` past the judgement point is swept as Miss.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JudgeWindows {
    pub perfect: f64,
    pub great: f64,
    pub good: f64,
    pub bad: f64,
    pub miss: f64,
}

impl Default for JudgeWindows {
    fn default() -> Self {
        Self {
            perfect: 0.6,
            great: 1.2,
            good: 1.8,
            bad: 2.5,
            miss: 2.5,
        }
    }
}

impl JudgeWindows {
    /// Tightest category whose threshold is at least `distance`.
    pub fn judge(&self, distance: f64) -> JudgeCategory {
        let d = distance.abs();
        if d <= self.perfect {
            JudgeCategory::Perfect
        } else if d <= self.great {
            JudgeCategory::Great
        } else if d <= self.good {
            JudgeCategory::Good
        } else if d <= self.bad {
            JudgeCategory::Bad
        } else {
            // Also covers NaN
            JudgeCategory::Miss
        }
    }

    /// Widest window; the press-candidate and miss-sweep limit.
    pub fn widest(&self) -> f64 {
        self.miss
    }

    /// Replace invalid thresholds with defaults and force them non-decreasing.
    pub fn validate(&mut self) {
        let defaults = JudgeWindows::default();
        let fix = |v: f64, default: f64| if v.is_finite() && v >= 0.0 { v } else { default };
        self.perfect = fix(self.perfect, defaults.perfect);
        self.great = fix(self.great, defaults.great).max(self.perfect);
        self.good = fix(self.good, defaults.good).max(self.great);
        self.bad = fix(self.bad, defaults.bad).max(self.good);
        self.miss = fix(self.miss, defaults.miss).max(self.bad);
    }
}

/// Points per category and per hold tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(default)]
pub struct ScoreTable {
    pub perfect: i64,
    pub great: i64,
    pub good: i64,
    pub bad: i64,
    pub miss: i64,
    pub hold_tick: i64,
}

impl Default for ScoreTable {
    fn default() -> Self {
        Self {
            perfect: 100,
            great: 60,
            good: 30,
            bad: 0,
            miss: -20,
            hold_tick: 10,
        }
    }
}

impl ScoreTable {
    pub fn value(&self, category: JudgeCategory) -> i64 {
        match category {
            JudgeCategory::Perfect => self.perfect,
            JudgeCategory::Great => self.great,
            JudgeCategory::Good => self.good,
            JudgeCategory::Bad => self.bad,
            JudgeCategory::Miss => self.miss,
        }
    }

    /// Score ledger implied by the tally's counters.
    pub fn total(&self, result: &RunningResult) -> i64 {
        JudgeCategory::ALL
            .iter()
            .map(|&c| self.value(c) * i64::from(result.count(c)))
            .sum::<i64>()
            + self.hold_tick * i64::from(result.hold_ticks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_windows() {
        let w = JudgeWindows::default();
        assert_eq!(w.perfect, 0.6);
        assert_eq!(w.great, 1.2);
        assert_eq!(w.good, 1.8);
        assert_eq!(w.bad, 2.5);
        assert_eq!(w.widest(), 2.5);
    }

    #[test]
    fn test_judge_zero_distance_is_perfect() {
        let w = JudgeWindows::default();
        assert_eq!(w.judge(0.0), JudgeCategory::Perfect);
        assert_eq!(w.judge(-0.0), JudgeCategory::Perfect);
    }

    #[test]
    fn test_judge_boundaries_inclusive() {
        let w = JudgeWindows::default();
        assert_eq!(w.judge(0.6), JudgeCategory::Perfect);
        assert_eq!(w.judge(0.61), JudgeCategory::Great);
        assert_eq!(w.judge(1.2), JudgeCategory::Great);
        assert_eq!(w.judge(1.8), JudgeCategory::Good);
        assert_eq!(w.judge(2.5), JudgeCategory::Bad);
        assert_eq!(w.judge(-2.5), JudgeCategory::Bad);
        assert_eq!(w.judge(2.51), JudgeCategory::Miss);
        assert_eq!(w.judge(1000.0), JudgeCategory::Miss);
        assert_eq!(w.judge(f64::NAN), JudgeCategory::Miss);
    }

    #[test]
    fn test_validate_orders_windows() {
        let mut w = JudgeWindows {
            perfect: 1.0,
            great: 0.5,
            good: f64::NAN,
            bad: -3.0,
            miss: 0.0,
        };
        w.validate();
        assert_eq!(w.perfect, 1.0);
        assert_eq!(w.great, 1.0);
        assert_eq!(w.good, 1.8);
        assert_eq!(w.bad, 2.5);
        assert_eq!(w.miss, 2.5);
    }

    #[test]
    fn test_category_policies() {
        assert!(JudgeCategory::Good.keeps_combo());
        assert!(!JudgeCategory::Good.is_big_combo());
        assert!(JudgeCategory::Great.is_big_combo());
        assert!(!JudgeCategory::Bad.keeps_combo());
        assert!(!JudgeCategory::Bad.plays_hit_sound());
        assert!(!JudgeCategory::Miss.plays_hit_sound());
        assert!(JudgeCategory::Perfect.plays_hit_sound());
    }

    #[test]
    fn test_score_total() {
        let result = RunningResult {
            perfect: 3,
            great: 1,
            good: 1,
            bad: 2,
            miss: 4,
            hold_ticks: 5,
            ..Default::default()
        };
        let scores = ScoreTable::default();
        assert_eq!(scores.total(&result), 300 + 60 + 30 + 0 - 80 + 50);
    }

    #[test]
    fn test_windows_deserialize_partial() {
        let w: JudgeWindows = serde_json::from_str(r#"{"perfect": 0.3}"#).unwrap();
        assert_eq!(w.perfect, 0.3);
        assert_eq!(w.bad, 2.5);
    }
}
