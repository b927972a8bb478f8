use serde::{Deserialize, Serialize};
use sus_model::ChartData;

use crate::judge_property::JudgeCategory;

/// Live tally of a play session, mutated only by the judgement engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunningResult {
    /// Internal ledger; may go negative
    pub score: i64,
    pub combo: u32,
    pub max_combo: u32,
    pub perfect: u32,
    pub great: u32,
    pub good: u32,
    pub bad: u32,
    pub miss: u32,
    /// Per-beat hold ticks awarded
    pub hold_ticks: u32,
}

impl RunningResult {
    pub fn count(&self, category: JudgeCategory) -> u32 {
        match category {
            JudgeCategory::Perfect => self.perfect,
            JudgeCategory::Great => self.great,
            JudgeCategory::Good => self.good,
            JudgeCategory::Bad => self.bad,
            JudgeCategory::Miss => self.miss,
        }
    }

    pub(crate) fn record(&mut self, category: JudgeCategory) {
        let counter = match category {
            JudgeCategory::Perfect => &mut self.perfect,
            JudgeCategory::Great => &mut self.great,
            JudgeCategory::Good => &mut self.good,
            JudgeCategory::Bad => &mut self.bad,
            JudgeCategory::Miss => &mut self.miss,
        };
        *counter += 1;
    }

    /// Score as shown to the player, never below zero.
    pub fn display_score(&self) -> i64 {
        self.score.max(0)
    }

    /// Notes that received a category.
    pub fn judged_notes(&self) -> u32 {
        JudgeCategory::ALL.iter().map(|&c| self.count(c)).sum()
    }
}

/// Final, immutable result of one play session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayResult {
    pub title: String,
    /// SHA-256 of the chart source
    pub sha256: String,
    /// Display score (clamped at zero)
    pub score: i64,
    /// Ledger score before clamping
    pub raw_score: i64,
    pub max_combo: u32,
    pub perfect: u32,
    pub great: u32,
    pub good: u32,
    pub bad: u32,
    pub miss: u32,
    pub hold_ticks: u32,
    pub total_notes: usize,
    /// Song time of the last processed tick
    pub end_time: f64,
    /// Whether the session was cut short
    pub aborted: bool,
}

impl PlayResult {
    pub fn new(chart: &ChartData, result: &RunningResult, end_time: f64, aborted: bool) -> Self {
        Self {
            title: chart.title.clone(),
            sha256: chart.sha256.clone(),
            score: result.display_score(),
            raw_score: result.score,
            max_combo: result.max_combo,
            perfect: result.perfect,
            great: result.great,
            good: result.good,
            bad: result.bad,
            miss: result.miss,
            hold_ticks: result.hold_ticks,
            total_notes: chart.total_notes(),
            end_time,
            aborted,
        }
    }

    /// True when every note was hit without a Bad or Miss.
    pub fn is_full_combo(&self) -> bool {
        self.bad == 0 && self.miss == 0 && !self.aborted
    }
}
