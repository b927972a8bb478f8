use log::info;
use sus_model::ChartData;

use crate::input::TickInput;
use crate::judge_event::TickOutcome;
use crate::judge_manager::JudgeManager;
use crate::play_config::PlayConfig;
use crate::play_result::{PlayResult, RunningResult};

/// One play of one chart: created ready, ticked while playing, then finished
/// or aborted.
pub struct PlaySession {
    manager: JudgeManager,
    aborted: bool,
}

impl PlaySession {
    pub fn new(chart: ChartData, mut config: PlayConfig) -> Self {
        config.validate();
        info!(
            "Starting session: \"{}\" ({} notes, {:.2}s)",
            chart.title,
            chart.total_notes(),
            chart.end_time()
        );
        Self {
            manager: JudgeManager::new(chart, &config),
            aborted: false,
        }
    }

    pub fn chart(&self) -> &ChartData {
        self.manager.chart()
    }

    pub fn manager(&self) -> &JudgeManager {
        &self.manager
    }

    pub fn result(&self) -> &RunningResult {
        self.manager.result()
    }

    /// Run one scheduling tick. An aborted session no longer judges.
    pub fn tick(&mut self, song_time: f64, input: &TickInput) -> TickOutcome {
        if self.aborted {
            return TickOutcome {
                song_time,
                events: Vec::new(),
                result: *self.manager.result(),
            };
        }
        self.manager.tick(song_time, input)
    }

    pub fn register_active_note(&mut self, note_index: usize) {
        if !self.aborted {
            self.manager.register_active_note(note_index);
        }
    }

    pub fn unregister_note(&mut self, note_index: usize) {
        if !self.aborted {
            self.manager.unregister_note(note_index);
        }
    }

    pub fn is_aborted(&self) -> bool {
        self.aborted
    }

    /// Every note is resolved and the song has reached its duration.
    pub fn is_finished(&self) -> bool {
        self.aborted
            || (self.manager.all_resolved() && self.manager.song_time() >= self.chart().duration)
    }

    /// Stop judging. The partial result is returned and stays available.
    pub fn abort(&mut self) -> PlayResult {
        if !self.aborted {
            info!(
                "Session aborted at {:.3}s: \"{}\"",
                self.manager.song_time(),
                self.chart().title
            );
            self.aborted = true;
        }
        self.snapshot()
    }

    pub fn finish(self) -> PlayResult {
        let result = self.snapshot();
        info!(
            "Session finished: \"{}\" score {} max combo {} ({}/{}/{}/{}/{})",
            result.title,
            result.score,
            result.max_combo,
            result.perfect,
            result.great,
            result.good,
            result.bad,
            result.miss
        );
        result
    }

    fn snapshot(&self) -> PlayResult {
        PlayResult::new(
            self.chart(),
            self.manager.result(),
            self.manager.song_time(),
            self.aborted,
        )
    }
}
