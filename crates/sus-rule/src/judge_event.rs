use serde::{Deserialize, Serialize};
use sus_model::NoteKind;

use crate::judge_property::JudgeCategory;
use crate::play_result::RunningResult;

/// Why an active hold went away.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HoldEndReason {
    /// The end note was judged on release.
    Released,
    /// Let go too early; judged as Miss.
    Broken,
    /// Still unresolved past the end time plus grace; judged as Miss.
    TimedOut,
    /// The presentation layer unregistered the hold while it was engaged.
    Withdrawn,
}

/// Events generated by the judgement engine during one tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum JudgeEvent {
    /// A note received a category.
    Judged {
        note_index: usize,
        category: JudgeCategory,
        lane: usize,
        kind: NoteKind,
        /// Distance from the judgement point in position units
        distance: f64,
    },
    /// A held hold reached one of its per-beat instants.
    HoldTick { hold_id: u32, lane: usize, time: f64 },
    HoldEnded {
        hold_id: u32,
        reason: HoldEndReason,
    },
    ScoreChanged { score: i64, delta: i64 },
    /// `big` is false for Good hits, hold ticks and resets.
    ComboChanged { combo: u32, big: bool },
}

/// Callbacks for effects, audio and score display.
///
/// Every method defaults to doing nothing.
pub trait JudgeObserver {
    fn on_judgement(&mut self, _category: JudgeCategory, _lane: usize, _kind: NoteKind) {}

    fn on_hold_tick(&mut self, _hold_id: u32, _lane: usize) {}

    fn on_hold_ended(&mut self, _hold_id: u32, _reason: HoldEndReason) {}

    /// Receives the display score (never negative).
    fn on_score(&mut self, _score: i64) {}

    fn on_combo(&mut self, _combo: u32, _big: bool) {}
}

/// Everything one tick produced.
#[derive(Debug, Clone, PartialEq)]
pub struct TickOutcome {
    pub song_time: f64,
    pub events: Vec<JudgeEvent>,
    /// Tally after this tick
    pub result: RunningResult,
}

impl TickOutcome {
    /// Deliver the events to an observer in generation order.
    pub fn dispatch<O: JudgeObserver + ?Sized>(&self, observer: &mut O) {
        for event in &self.events {
            match *event {
                JudgeEvent::Judged {
                    category,
                    lane,
                    kind,
                    ..
                } => observer.on_judgement(category, lane, kind),
                JudgeEvent::HoldTick { hold_id, lane, .. } => observer.on_hold_tick(hold_id, lane),
                JudgeEvent::HoldEnded { hold_id, reason } => observer.on_hold_ended(hold_id, reason),
                JudgeEvent::ScoreChanged { score, .. } => observer.on_score(score.max(0)),
                JudgeEvent::ComboChanged { combo, big } => observer.on_combo(combo, big),
            }
        }
    }

    /// `(note_index, category)` of every judgement in this tick.
    pub fn judgements(&self) -> impl Iterator<Item = (usize, JudgeCategory)> + '_ {
        self.events.iter().filter_map(|e| match *e {
            JudgeEvent::Judged {
                note_index,
                category,
                ..
            } => Some((note_index, category)),
            _ => None,
        })
    }

    pub fn hold_ticks(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, JudgeEvent::HoldTick { .. }))
            .count()
    }
}
