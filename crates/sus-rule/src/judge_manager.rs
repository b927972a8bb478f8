//! Judgement engine for SUS play.
//!
//! Driven once per scheduling tick with the song time and the per-lane input.
//! Every tick runs the same step order: auto-registration, presses, held-lane
//! update, hold ticks, break and time-out sweep, release judging, miss sweep,
//! result snapshot. The engine never reads a clock, so a recorded
//! `(time, input)` trace always replays to the same result.

use std::collections::{BTreeMap, BTreeSet};

use log::{debug, warn};
use sus_model::ChartData;

use crate::input::{LaneInput, TickInput};
use crate::judge_event::{HoldEndReason, JudgeEvent, TickOutcome};
use crate::judge_property::{JudgeCategory, JudgeWindows, ScoreTable};
use crate::play_config::PlayConfig;
use crate::play_result::RunningResult;

/// Where a note is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NoteState {
    /// Not announced by the presentation layer yet
    Upcoming,
    /// Registered and waiting for input
    Pending,
    /// Start or end of a hold that is currently active
    Engaged,
    Judged,
    /// Unregistered before it was judged
    Withdrawn,
}

impl NoteState {
    pub fn is_resolved(self) -> bool {
        matches!(self, NoteState::Judged | NoteState::Withdrawn)
    }
}

/// A hold whose start has been judged and whose end has not.
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveHold {
    pub hold_id: u32,
    pub start_index: usize,
    pub end_index: usize,
    /// Leftmost lane of the start note; used for tick events
    pub lane: usize,
    pub width: usize,
    pub end_time: f64,
    pub next_tick_time: f64,
    /// Lanes of the hold's span currently down
    pub held_lanes: BTreeSet<usize>,
}

impl ActiveHold {
    pub fn is_held(&self) -> bool {
        !self.held_lanes.is_empty()
    }
}

/// Per-session judgement state machine.
///
/// Notes live in an arena indexed by their position in the chart's sorted
/// note list; holds are keyed by their shared id.
pub struct JudgeManager {
    chart: ChartData,
    windows: JudgeWindows,
    scores: ScoreTable,
    scroll_speed: f64,
    travel_time: f64,
    release_grace: f64,
    auto_register: bool,
    states: Vec<NoteState>,
    registered_at: Vec<Option<f64>>,
    /// Start <-> end index of each hold
    partners: Vec<Option<usize>>,
    /// Pending note indices, which is also time order
    pending: BTreeSet<usize>,
    holds: BTreeMap<u32, ActiveHold>,
    /// Next note for auto-registration
    spawn_cursor: usize,
    result: RunningResult,
    song_time: f64,
    /// Events raised between ticks, delivered with the next outcome
    deferred: Vec<JudgeEvent>,
}

impl JudgeManager {
    pub fn new(chart: ChartData, config: &PlayConfig) -> Self {
        let n = chart.notes.len();
        let mut partners = vec![None; n];
        for (start, end) in chart.hold_pairs() {
            partners[start] = Some(end);
            partners[end] = Some(start);
        }
        Self {
            chart,
            windows: config.windows,
            scores: config.scores,
            scroll_speed: config.scroll_speed,
            travel_time: config.note_travel_time,
            release_grace: config.hold_release_grace,
            auto_register: config.auto_register,
            states: vec![NoteState::Upcoming; n],
            registered_at: vec![None; n],
            partners,
            pending: BTreeSet::new(),
            holds: BTreeMap::new(),
            spawn_cursor: 0,
            result: RunningResult::default(),
            song_time: 0.0,
            deferred: Vec::new(),
        }
    }

    pub fn chart(&self) -> &ChartData {
        &self.chart
    }

    pub fn result(&self) -> &RunningResult {
        &self.result
    }

    /// Song time of the most recent tick.
    pub fn song_time(&self) -> f64 {
        self.song_time
    }

    pub fn note_state(&self, note_index: usize) -> Option<NoteState> {
        self.states.get(note_index).copied()
    }

    pub fn active_holds(&self) -> impl Iterator<Item = &ActiveHold> {
        self.holds.values()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// True once every note is judged or withdrawn.
    pub fn all_resolved(&self) -> bool {
        self.states.iter().all(|s| s.is_resolved())
    }

    /// Announce that a note is on screen and may be judged.
    ///
    /// Registering a note twice keeps the latest registration. Judged notes
    /// cannot be registered again.
    pub fn register_active_note(&mut self, note_index: usize) {
        let Some(&state) = self.states.get(note_index) else {
            warn!("Cannot register note {note_index}: index out of range");
            return;
        };
        match state {
            NoteState::Upcoming | NoteState::Withdrawn => self.activate(note_index),
            NoteState::Pending => {
                warn!("Note {note_index} registered twice; keeping the latest registration");
            }
            NoteState::Engaged if self.registered_at[note_index].is_none() => {}
            NoteState::Engaged => {
                warn!("Note {note_index} registered twice while its hold is engaged");
            }
            NoteState::Judged => {
                warn!("Note {note_index} registered after it was judged; ignoring");
                return;
            }
        }
        self.registered_at[note_index] = Some(self.song_time);
    }

    /// Retract a note from the active set.
    ///
    /// Retracting either end of an engaged hold forces a release: the end is
    /// judged at the current song time and the hold is dropped.
    pub fn unregister_note(&mut self, note_index: usize) {
        let Some(&state) = self.states.get(note_index) else {
            warn!("Cannot unregister note {note_index}: index out of range");
            return;
        };
        match state {
            NoteState::Upcoming | NoteState::Pending => {
                self.states[note_index] = NoteState::Withdrawn;
                self.pending.remove(&note_index);
            }
            NoteState::Engaged => {
                warn!("Note {note_index} unregistered while its hold is engaged; forcing release");
                let hold_id = self
                    .holds
                    .values()
                    .find(|h| h.start_index == note_index || h.end_index == note_index)
                    .map(|h| h.hold_id);
                if let Some(hold_id) = hold_id {
                    let mut events = std::mem::take(&mut self.deferred);
                    self.end_hold(hold_id, HoldEndReason::Withdrawn, self.song_time, &mut events);
                    self.deferred = events;
                }
            }
            NoteState::Judged | NoteState::Withdrawn => {}
        }
    }

    /// Advance the engine to `song_time` with this tick's input.
    pub fn tick(&mut self, song_time: f64, input: &TickInput) -> TickOutcome {
        let mut events = std::mem::take(&mut self.deferred);
        self.song_time = song_time;

        if self.auto_register {
            self.register_upcoming(song_time);
        }
        for lane in input.pressed_lanes() {
            self.handle_press(lane, song_time, &mut events);
        }
        self.update_held_lanes(input);
        self.score_hold_ticks(song_time, &mut events);
        self.sweep_holds(song_time, &mut events);
        self.judge_releases(song_time, &mut events);
        self.sweep_misses(song_time, &mut events);

        self.result.score = self.scores.total(&self.result);

        TickOutcome {
            song_time,
            events,
            result: self.result,
        }
    }

    fn activate(&mut self, note_index: usize) {
        self.states[note_index] = NoteState::Pending;
        self.pending.insert(note_index);
    }

    /// Register every note whose travel window has opened.
    fn register_upcoming(&mut self, song_time: f64) {
        while let Some(note) = self.chart.notes.get(self.spawn_cursor) {
            if note.time - self.travel_time > song_time {
                break;
            }
            let idx = self.spawn_cursor;
            self.spawn_cursor += 1;
            match self.states[idx] {
                NoteState::Upcoming => self.activate(idx),
                // The end of a hold engaged before it came on screen
                NoteState::Engaged if self.registered_at[idx].is_none() => {}
                _ => continue,
            }
            self.registered_at[idx] = Some(song_time);
        }
    }

    fn distance(&self, note_time: f64, song_time: f64) -> f64 {
        (note_time - song_time).abs() * self.scroll_speed
    }

    fn beat_duration(&self, song_time: f64) -> Option<f64> {
        let bpm = self.chart.bpm_at(song_time);
        (bpm.is_finite() && bpm > 0.0).then(|| 60.0 / bpm)
    }

    /// Step 1: pick the closest pending note under the lane and judge it.
    fn handle_press(&mut self, lane: usize, song_time: f64, events: &mut Vec<JudgeEvent>) {
        let widest = self.windows.widest();
        // (distance, time, index); index order breaks the remaining ties
        let mut best: Option<(f64, f64, usize)> = None;
        for &idx in &self.pending {
            let note = &self.chart.notes[idx];
            if note.kind.is_hold_end() || !note.covers(lane) {
                continue;
            }
            let distance = self.distance(note.time, song_time);
            if !(distance <= widest) {
                continue;
            }
            let closer = match best {
                None => true,
                Some((d, t, _)) => distance < d || (distance == d && note.time < t),
            };
            if closer {
                best = Some((distance, note.time, idx));
            }
        }

        let Some((distance, _, idx)) = best else {
            return;
        };
        let category = self.windows.judge(distance);
        if self.chart.notes[idx].kind.is_hold_start() && category != JudgeCategory::Miss {
            self.engage(idx, lane, category, distance, events);
        } else {
            self.commit(idx, category, distance, NoteState::Judged, events);
        }
    }

    fn engage(
        &mut self,
        start: usize,
        lane: usize,
        category: JudgeCategory,
        distance: f64,
        events: &mut Vec<JudgeEvent>,
    ) {
        let end = self.partners[start]
            .filter(|&e| matches!(self.states[e], NoteState::Upcoming | NoteState::Pending));
        let Some(end) = end else {
            // End already withdrawn: nothing left to hold
            self.commit(start, category, distance, NoteState::Judged, events);
            return;
        };

        self.commit(start, category, distance, NoteState::Engaged, events);
        self.states[end] = NoteState::Engaged;
        self.pending.remove(&end);

        let start_note = &self.chart.notes[start];
        let next_tick_time = match self.beat_duration(start_note.time) {
            Some(beat) => start_note.time + beat,
            None => f64::INFINITY,
        };
        let hold = ActiveHold {
            hold_id: start_note.id,
            start_index: start,
            end_index: end,
            lane: start_note.lane,
            width: start_note.width,
            end_time: self.chart.notes[end].time,
            next_tick_time,
            held_lanes: BTreeSet::from([lane]),
        };
        debug!(
            "{:.3}s: hold {} engaged on lane {lane}, ends at {:.3}s",
            self.song_time, hold.hold_id, hold.end_time
        );
        self.holds.insert(hold.hold_id, hold);
    }

    /// Step 2: track which lanes of each hold's span are down.
    fn update_held_lanes(&mut self, input: &TickInput) {
        for hold in self.holds.values_mut() {
            for lane in hold.lane..hold.lane + hold.width {
                match input.get(lane) {
                    LaneInput::Pressed | LaneInput::Held => {
                        hold.held_lanes.insert(lane);
                    }
                    LaneInput::Released => {
                        hold.held_lanes.remove(&lane);
                    }
                    LaneInput::Idle => {}
                }
            }
        }
    }

    /// Step 3: award every per-beat instant a held hold has reached.
    fn score_hold_ticks(&mut self, song_time: f64, events: &mut Vec<JudgeEvent>) {
        let Some(beat) = self.beat_duration(song_time) else {
            return;
        };
        let mut ticks = Vec::new();
        for hold in self.holds.values_mut() {
            if !hold.is_held() {
                continue;
            }
            while hold.next_tick_time <= hold.end_time && song_time >= hold.next_tick_time {
                ticks.push((hold.hold_id, hold.lane, hold.next_tick_time));
                let next = hold.next_tick_time + beat;
                if next <= hold.next_tick_time {
                    // Beat below float resolution at this song time
                    hold.next_tick_time = f64::INFINITY;
                    break;
                }
                hold.next_tick_time = next;
            }
        }
        for (hold_id, lane, time) in ticks {
            events.push(JudgeEvent::HoldTick {
                hold_id,
                lane,
                time,
            });
            self.result.hold_ticks += 1;
            self.bump_combo(false, events);
            self.refresh_score(events);
        }
    }

    /// Step 4: time out overdue holds and break holds let go too early.
    fn sweep_holds(&mut self, song_time: f64, events: &mut Vec<JudgeEvent>) {
        let mut ended = Vec::new();
        for hold in self.holds.values() {
            if song_time > hold.end_time + self.release_grace {
                ended.push((hold.hold_id, HoldEndReason::TimedOut));
            } else if !hold.is_held()
                && song_time < hold.end_time
                && self.distance(hold.end_time, song_time) > self.windows.bad
            {
                ended.push((hold.hold_id, HoldEndReason::Broken));
            }
        }
        for (hold_id, reason) in ended {
            self.end_hold(hold_id, reason, song_time, events);
        }
    }

    /// Step 5: judge the end of every hold whose last lane was released.
    fn judge_releases(&mut self, song_time: f64, events: &mut Vec<JudgeEvent>) {
        let released: Vec<u32> = self
            .holds
            .values()
            .filter(|h| !h.is_held())
            .map(|h| h.hold_id)
            .collect();
        for hold_id in released {
            self.end_hold(hold_id, HoldEndReason::Released, song_time, events);
        }
    }

    /// Step 6: anything still pending past the widest window is a Miss.
    fn sweep_misses(&mut self, song_time: f64, events: &mut Vec<JudgeEvent>) {
        let widest = self.windows.widest();
        let missed: Vec<usize> = self
            .pending
            .iter()
            .copied()
            .take_while(|&idx| (song_time - self.chart.notes[idx].time) * self.scroll_speed > widest)
            .collect();
        for idx in missed {
            let distance = self.distance(self.chart.notes[idx].time, song_time);
            self.commit(idx, JudgeCategory::Miss, distance, NoteState::Judged, events);
        }
    }

    fn end_hold(
        &mut self,
        hold_id: u32,
        reason: HoldEndReason,
        song_time: f64,
        events: &mut Vec<JudgeEvent>,
    ) {
        let Some(hold) = self.holds.remove(&hold_id) else {
            return;
        };
        let distance = self.distance(hold.end_time, song_time);
        let category = match reason {
            HoldEndReason::Released | HoldEndReason::Withdrawn => self.windows.judge(distance),
            HoldEndReason::Broken | HoldEndReason::TimedOut => JudgeCategory::Miss,
        };
        self.states[hold.start_index] = NoteState::Judged;
        self.commit(hold.end_index, category, distance, NoteState::Judged, events);
        events.push(JudgeEvent::HoldEnded { hold_id, reason });
    }

    fn commit(
        &mut self,
        index: usize,
        category: JudgeCategory,
        distance: f64,
        state: NoteState,
        events: &mut Vec<JudgeEvent>,
    ) {
        self.states[index] = state;
        self.pending.remove(&index);

        let note = &self.chart.notes[index];
        let (lane, kind) = (note.lane, note.kind);
        debug!(
            "{:.3}s: note {index} ({kind:?}, lane {lane}) judged {category:?} at distance {distance:.3}",
            self.song_time
        );
        events.push(JudgeEvent::Judged {
            note_index: index,
            category,
            lane,
            kind,
            distance,
        });

        self.result.record(category);
        if category.keeps_combo() {
            self.bump_combo(category.is_big_combo(), events);
        } else {
            self.reset_combo(events);
        }
        self.refresh_score(events);
    }

    fn bump_combo(&mut self, big: bool, events: &mut Vec<JudgeEvent>) {
        self.result.combo += 1;
        self.result.max_combo = self.result.max_combo.max(self.result.combo);
        events.push(JudgeEvent::ComboChanged {
            combo: self.result.combo,
            big,
        });
    }

    fn reset_combo(&mut self, events: &mut Vec<JudgeEvent>) {
        if self.result.combo != 0 {
            self.result.combo = 0;
            events.push(JudgeEvent::ComboChanged {
                combo: 0,
                big: false,
            });
        }
    }

    fn refresh_score(&mut self, events: &mut Vec<JudgeEvent>) {
        let score = self.scores.total(&self.result);
        let delta = score - self.result.score;
        if delta != 0 {
            self.result.score = score;
            events.push(JudgeEvent::ScoreChanged { score, delta });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sus_model::{Note, NoteKind, TempoPoint};

    fn chart(notes: Vec<Note>) -> ChartData {
        ChartData {
            tempo_points: vec![TempoPoint {
                time: 0.0,
                bpm: 120.0,
            }],
            duration: notes.iter().map(|n| n.time).fold(0.0, f64::max),
            notes,
            ..Default::default()
        }
    }

    /// One position unit per second, windows on exact binary fractions.
    fn config() -> PlayConfig {
        PlayConfig {
            windows: JudgeWindows {
                perfect: 0.0625,
                great: 0.125,
                good: 0.1875,
                bad: 0.25,
                miss: 0.25,
            },
            scroll_speed: 1.0,
            ..Default::default()
        }
    }

    fn press(lane: usize) -> TickInput {
        TickInput::idle().with(lane, LaneInput::Pressed)
    }

    #[test]
    fn test_auto_register_follows_travel_time() {
        let notes = vec![
            Note::new(NoteKind::Tap, 1.0, 0, 1, 0),
            Note::new(NoteKind::Tap, 5.0, 0, 1, 1),
        ];
        let mut jm = JudgeManager::new(chart(notes), &config());
        jm.tick(0.0, &TickInput::idle());
        assert_eq!(jm.note_state(0), Some(NoteState::Pending));
        assert_eq!(jm.note_state(1), Some(NoteState::Upcoming));
        jm.tick(3.0, &TickInput::idle());
        assert_eq!(jm.note_state(1), Some(NoteState::Pending));
    }

    #[test]
    fn test_press_judges_by_distance() {
        let notes = vec![
            Note::new(NoteKind::Tap, 1.0, 0, 1, 0),
            Note::new(NoteKind::Tap, 2.0, 1, 1, 1),
            Note::new(NoteKind::Tap, 3.0, 2, 1, 2),
        ];
        let mut jm = JudgeManager::new(chart(notes), &config());
        let out = jm.tick(1.0, &press(0));
        assert_eq!(out.judgements().collect::<Vec<_>>(), vec![(0, JudgeCategory::Perfect)]);
        let out = jm.tick(2.125, &press(1));
        assert_eq!(out.judgements().collect::<Vec<_>>(), vec![(1, JudgeCategory::Great)]);
        let out = jm.tick(2.75, &press(2));
        assert_eq!(out.judgements().collect::<Vec<_>>(), vec![(2, JudgeCategory::Bad)]);

        let r = jm.result();
        assert_eq!((r.perfect, r.great, r.bad), (1, 1, 1));
        assert_eq!(r.combo, 0);
        assert_eq!(r.max_combo, 2);
        assert_eq!(r.score, 160);
    }

    #[test]
    fn test_press_outside_widest_window_is_ignored() {
        let notes = vec![Note::new(NoteKind::Tap, 1.0, 0, 1, 0)];
        let mut jm = JudgeManager::new(chart(notes), &config());
        let out = jm.tick(0.5, &press(0));
        assert!(out.events.is_empty());
        assert_eq!(jm.note_state(0), Some(NoteState::Pending));
    }

    #[test]
    fn test_press_wrong_lane_is_ignored() {
        let notes = vec![Note::new(NoteKind::Tap, 1.0, 2, 2, 0)];
        let mut jm = JudgeManager::new(chart(notes), &config());
        assert!(jm.tick(1.0, &press(1)).events.is_empty());
        // Second lane of a wide note counts
        let out = jm.tick(1.0, &press(3));
        assert_eq!(out.judgements().count(), 1);
    }

    #[test]
    fn test_equal_distance_prefers_earlier_note() {
        let notes = vec![
            Note::new(NoteKind::Tap, 1.0, 0, 1, 0),
            Note::new(NoteKind::Tap, 1.5, 0, 1, 1),
        ];
        let cfg = PlayConfig {
            windows: JudgeWindows {
                miss: 0.5,
                bad: 0.5,
                ..config().windows
            },
            ..config()
        };
        let mut jm = JudgeManager::new(chart(notes), &cfg);
        let out = jm.tick(1.25, &press(0));
        assert_eq!(out.judgements().collect::<Vec<_>>(), vec![(0, JudgeCategory::Bad)]);
        assert_eq!(jm.note_state(1), Some(NoteState::Pending));
    }

    #[test]
    fn test_simultaneous_notes_prefer_lower_index() {
        let notes = vec![
            Note::new(NoteKind::Tap, 1.0, 0, 2, 0),
            Note::new(NoteKind::Tap, 1.0, 1, 1, 1),
        ];
        let mut jm = JudgeManager::new(chart(notes), &config());
        let out = jm.tick(1.0, &press(1));
        assert_eq!(out.judgements().collect::<Vec<_>>(), vec![(0, JudgeCategory::Perfect)]);
        let out = jm.tick(1.0, &press(1));
        assert_eq!(out.judgements().collect::<Vec<_>>(), vec![(1, JudgeCategory::Perfect)]);
    }

    #[test]
    fn test_miss_sweep_after_widest_window() {
        let notes = vec![Note::new(NoteKind::Tap, 1.0, 0, 1, 0)];
        let mut jm = JudgeManager::new(chart(notes), &config());
        assert!(jm.tick(1.25, &TickInput::idle()).events.is_empty());
        let out = jm.tick(1.375, &TickInput::idle());
        assert_eq!(out.judgements().collect::<Vec<_>>(), vec![(0, JudgeCategory::Miss)]);
        assert_eq!(out.result.score, -20);
        assert_eq!(out.result.display_score(), 0);
        assert!(jm.all_resolved());
    }

    #[test]
    fn test_unpressed_hold_misses_both_ends() {
        let notes = vec![
            Note::new(NoteKind::HoldStart, 1.0, 0, 1, 0),
            Note::new(NoteKind::HoldEnd, 2.0, 0, 1, 0),
        ];
        let mut jm = JudgeManager::new(chart(notes), &config());
        jm.tick(1.5, &TickInput::idle());
        assert_eq!(jm.note_state(0), Some(NoteState::Judged));
        // A press never picks a hold end
        assert!(jm.tick(2.0, &press(0)).judgements().next().is_none());
        jm.tick(2.5, &TickInput::idle());
        assert_eq!(jm.result().miss, 2);
        assert_eq!(jm.active_holds().count(), 0);
    }

    #[test]
    fn test_bad_hold_start_still_engages() {
        let notes = vec![
            Note::new(NoteKind::HoldStart, 1.0, 0, 1, 0),
            Note::new(NoteKind::HoldEnd, 3.0, 0, 1, 0),
        ];
        let mut jm = JudgeManager::new(chart(notes), &config());
        jm.tick(0.75, &press(0));
        assert_eq!(jm.result().bad, 1);
        assert_eq!(jm.note_state(0), Some(NoteState::Engaged));
        assert_eq!(jm.note_state(1), Some(NoteState::Engaged));
        assert_eq!(jm.active_holds().count(), 1);
    }

    #[test]
    fn test_duplicate_registration_keeps_note_pending() {
        let notes = vec![Note::new(NoteKind::Tap, 1.0, 0, 1, 0)];
        let cfg = PlayConfig {
            auto_register: false,
            ..config()
        };
        let mut jm = JudgeManager::new(chart(notes), &cfg);
        jm.tick(0.0, &TickInput::idle());
        assert_eq!(jm.note_state(0), Some(NoteState::Upcoming));
        jm.register_active_note(0);
        jm.register_active_note(0);
        jm.register_active_note(7);
        assert_eq!(jm.note_state(0), Some(NoteState::Pending));
        assert_eq!(jm.pending_count(), 1);

        jm.tick(1.0, &press(0));
        jm.register_active_note(0);
        assert_eq!(jm.note_state(0), Some(NoteState::Judged));
    }

    #[test]
    fn test_unregistered_note_is_not_judged() {
        let notes = vec![Note::new(NoteKind::Tap, 1.0, 0, 1, 0)];
        let mut jm = JudgeManager::new(chart(notes), &config());
        jm.tick(0.0, &TickInput::idle());
        jm.unregister_note(0);
        assert_eq!(jm.note_state(0), Some(NoteState::Withdrawn));
        assert!(jm.tick(1.0, &press(0)).events.is_empty());
        assert!(jm.tick(5.0, &TickInput::idle()).events.is_empty());
        assert!(jm.all_resolved());
        assert_eq!(jm.result().judged_notes(), 0);
    }

    #[test]
    fn test_unregister_engaged_hold_forces_release() {
        let notes = vec![
            Note::new(NoteKind::HoldStart, 1.0, 0, 1, 0),
            Note::new(NoteKind::HoldEnd, 3.0, 0, 1, 0),
        ];
        let mut jm = JudgeManager::new(chart(notes), &config());
        jm.tick(1.0, &press(0));
        jm.tick(2.875, &TickInput::idle().with(0, LaneInput::Held));
        jm.unregister_note(0);
        assert_eq!(jm.active_holds().count(), 0);

        let out = jm.tick(2.9, &TickInput::idle());
        assert_eq!(out.judgements().collect::<Vec<_>>(), vec![(1, JudgeCategory::Great)]);
        assert!(out.events.contains(&JudgeEvent::HoldEnded {
            hold_id: 0,
            reason: HoldEndReason::Withdrawn,
        }));
        assert!(jm.all_resolved());
    }

    #[test]
    fn test_hold_times_out_when_never_released() {
        let notes = vec![
            Note::new(NoteKind::HoldStart, 1.0, 0, 1, 0),
            Note::new(NoteKind::HoldEnd, 2.0, 0, 1, 0),
        ];
        let mut jm = JudgeManager::new(chart(notes), &config());
        jm.tick(1.0, &press(0));
        let held = TickInput::idle().with(0, LaneInput::Held);
        assert_eq!(jm.tick(2.0, &held).hold_ticks(), 2);
        assert!(jm.tick(2.25, &held).judgements().next().is_none());

        let out = jm.tick(2.5, &held);
        assert_eq!(out.judgements().collect::<Vec<_>>(), vec![(1, JudgeCategory::Miss)]);
        assert!(out.events.contains(&JudgeEvent::HoldEnded {
            hold_id: 0,
            reason: HoldEndReason::TimedOut,
        }));
        assert_eq!(jm.result().combo, 0);
        assert_eq!(jm.result().max_combo, 3);
    }

    #[test]
    fn test_hold_ticks_stop_when_beat_underflows() {
        let notes = vec![
            Note::new(NoteKind::HoldStart, 1.0, 0, 1, 0),
            Note::new(NoteKind::HoldEnd, 2.0, 0, 1, 0),
        ];
        let mut data = chart(notes);
        data.tempo_points[0].bpm = 1e18;
        let mut jm = JudgeManager::new(data, &config());
        // One beat past the start rounds back onto the start itself
        assert_eq!(jm.tick(1.0, &press(0)).hold_ticks(), 1);
        let held = TickInput::idle().with(0, LaneInput::Held);
        assert_eq!(jm.tick(1.0, &held).hold_ticks(), 0);
        assert_eq!(jm.tick(1.5, &held).hold_ticks(), 0);
        assert_eq!(jm.result().hold_ticks, 1);
    }

    #[test]
    fn test_hold_tick_follows_tempo_change() {
        let notes = vec![
            Note::new(NoteKind::HoldStart, 0.0, 0, 1, 0),
            Note::new(NoteKind::HoldEnd, 4.0, 0, 1, 0),
        ];
        let mut data = chart(notes);
        data.tempo_points.push(TempoPoint {
            time: 1.0,
            bpm: 60.0,
        });
        let mut jm = JudgeManager::new(data, &config());
        jm.tick(0.0, &press(0));
        let held = TickInput::idle().with(0, LaneInput::Held);
        // First instant is one 120 BPM beat after the start
        assert_eq!(jm.tick(0.5, &held).hold_ticks(), 1);
        assert_eq!(jm.tick(1.0, &held).hold_ticks(), 1);
        // Now at 60 BPM: next instants are 2.0 and 3.0
        assert_eq!(jm.tick(1.5, &held).hold_ticks(), 0);
        assert_eq!(jm.tick(3.0, &held).hold_ticks(), 2);
    }
}
