//! Recorded input traces.
//!
//! A trace is the `(song_time, per-lane input)` sequence a session was driven
//! with. Replaying it through a fresh session reproduces the result exactly.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::Result;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use sus_model::{ChartData, LANE_COUNT};

use crate::input::{LaneInput, TickInput};
use crate::play_config::PlayConfig;
use crate::play_result::PlayResult;
use crate::session::PlaySession;

/// Frame step used by autoplay when the requested one is unusable.
pub const DEFAULT_FRAME_STEP: f64 = 1.0 / 60.0;
const MIN_FRAME_STEP: f64 = 0.001;
/// Most regular frames autoplay puts between the chart start and its end.
const MAX_GRID_FRAMES: usize = 1 << 20;
/// Slack past the last forced end so the settle tick lands strictly after it.
const SETTLE_MARGIN: f64 = 1e-3;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InputFrame {
    pub time: f64,
    pub lanes: [LaneInput; LANE_COUNT],
}

impl InputFrame {
    pub fn input(&self) -> TickInput {
        TickInput { lanes: self.lanes }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InputTrace {
    pub frames: Vec<InputFrame>,
}

impl InputTrace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, time: f64, input: TickInput) {
        self.frames.push(InputFrame {
            time,
            lanes: input.lanes,
        });
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn last_time(&self) -> Option<f64> {
        self.frames.last().map(|f| f.time)
    }

    /// Drop frames with unusable times and put the rest in time order.
    ///
    /// Returns false if anything had to be fixed.
    pub fn validate(&mut self) -> bool {
        let before = self.frames.len();
        self.frames.retain(|f| f.time.is_finite() && f.time >= 0.0);
        let dropped = before - self.frames.len();
        if dropped > 0 {
            warn!("Dropped {dropped} trace frames with invalid times");
        }
        let sorted = self.frames.windows(2).all(|w| w[0].time <= w[1].time);
        if !sorted {
            warn!("Trace frames out of order; sorting");
            self.frames.sort_by(|a, b| a.time.total_cmp(&b.time));
        }
        dropped == 0 && sorted
    }

    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let mut trace: Self = serde_json::from_str(&content)?;
        trace.validate();
        Ok(trace)
    }

    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Perfect play: every note pressed exactly on time, holds kept down to
    /// their end, with a regular frame grid in between.
    pub fn autoplay(chart: &ChartData, frame_step: f64) -> Self {
        let step = if frame_step.is_finite() && frame_step >= MIN_FRAME_STEP {
            frame_step
        } else {
            DEFAULT_FRAME_STEP
        };

        // (time, lane, is_press)
        let ends: HashMap<usize, usize> = chart.hold_pairs().into_iter().collect();
        let mut edges: Vec<(f64, usize, bool)> = Vec::new();
        for (i, note) in chart.notes.iter().enumerate() {
            let release = if note.kind.is_tap() {
                note.time + step
            } else if note.kind.is_hold_start() {
                match ends.get(&i) {
                    Some(&end) if chart.notes[end].time > note.time => chart.notes[end].time,
                    _ => note.time + step,
                }
            } else {
                continue;
            };
            edges.push((note.time, note.lane, true));
            edges.push((release, note.lane, false));
        }
        // Releases first on equal times
        edges.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.2.cmp(&b.2)));

        let last = edges.last().map_or(0.0, |e| e.0).max(chart.end_time());
        let mut times: Vec<f64> = if last.is_finite() {
            let grid_step = step.max(last / MAX_GRID_FRAMES as f64);
            if grid_step > step {
                warn!("Chart spans {last:.1}s; widening the autoplay grid to {grid_step:.4}s");
            }
            let grid_len = ((last / grid_step).ceil() as usize).min(MAX_GRID_FRAMES) + 1;
            (0..=grid_len).map(|k| k as f64 * grid_step).collect()
        } else {
            vec![0.0]
        };
        times.extend(edges.iter().map(|e| e.0));
        times.sort_by(f64::total_cmp);
        times.dedup();

        let mut trace = InputTrace::new();
        let mut down = [0u32; LANE_COUNT];
        let mut cursor = 0;
        for &t in &times {
            let mut released = Vec::new();
            let mut pressed = Vec::new();
            while let Some(&(time, lane, is_press)) = edges.get(cursor) {
                if time != t {
                    break;
                }
                cursor += 1;
                if is_press {
                    pressed.push(lane);
                } else if down[lane] > 0 {
                    down[lane] -= 1;
                    if down[lane] == 0 {
                        released.push(lane);
                    }
                }
            }

            if !released.is_empty() {
                // Last instant still down, then the release itself
                let mut frame = held_frame(&down);
                for &lane in &released {
                    frame.set(lane, LaneInput::Held);
                }
                trace.push(t, frame);
                for &lane in &released {
                    frame.set(lane, LaneInput::Released);
                }
                trace.push(t, frame);
            }
            for &lane in &pressed {
                down[lane] += 1;
            }
            if !pressed.is_empty() || released.is_empty() {
                let mut frame = held_frame(&down);
                for &lane in &pressed {
                    frame.set(lane, LaneInput::Pressed);
                }
                trace.push(t, frame);
            }
        }
        debug!("Autoplay trace: {} frames, step {step:.4}s", trace.len());
        trace
    }
}

fn held_frame(down: &[u32; LANE_COUNT]) -> TickInput {
    let mut input = TickInput::idle();
    for (lane, &count) in down.iter().enumerate() {
        if count > 0 {
            input.set(lane, LaneInput::Held);
        }
    }
    input
}

/// Drive a fresh session with `trace`, settle it, and return the result.
///
/// Notes register on their own during replay; the trace carries no
/// registration calls.
pub fn replay(chart: ChartData, mut config: PlayConfig, trace: &InputTrace) -> PlayResult {
    config.validate();
    config.auto_register = true;
    let settle_time = chart.end_time()
        + config.hold_release_grace
        + config.window_seconds(config.windows.widest())
        + SETTLE_MARGIN;

    let mut session = PlaySession::new(chart, config);
    for frame in &trace.frames {
        session.tick(frame.time, &frame.input());
    }
    if trace.last_time().is_none_or(|t| t < settle_time) {
        session.tick(settle_time, &TickInput::idle());
    }
    session.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use sus_model::{Note, NoteKind, TempoPoint};
    use tempfile::tempdir;

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

    #[test]
    fn test_validate_sorts_and_drops() {
        let mut trace = InputTrace::new();
        trace.push(1.0, TickInput::idle());
        trace.push(f64::NAN, TickInput::idle());
        trace.push(0.5, TickInput::idle());
        trace.push(-1.0, TickInput::idle());
        assert!(!trace.validate());
        let times: Vec<f64> = trace.frames.iter().map(|f| f.time).collect();
        assert_eq!(times, vec![0.5, 1.0]);
        assert!(trace.validate());
    }

    #[test]
    fn test_file_io() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("trace.json");
        let mut trace = InputTrace::new();
        trace.push(0.25, TickInput::idle().with(2, LaneInput::Pressed));
        trace.push(1.0 / 3.0, TickInput::idle().with(2, LaneInput::Released));
        trace.save_to(&path).unwrap();
        assert_eq!(InputTrace::load_from(&path).unwrap(), trace);
    }

    #[test]
    fn test_autoplay_tap_edges() {
        let data = chart(vec![Note::new(NoteKind::Tap, 0.5, 3, 1, 0)]);
        let trace = InputTrace::autoplay(&data, 0.25);
        let presses: Vec<f64> = trace
            .frames
            .iter()
            .filter(|f| f.lanes[3] == LaneInput::Pressed)
            .map(|f| f.time)
            .collect();
        assert_eq!(presses, vec![0.5]);
        let releases: Vec<f64> = trace
            .frames
            .iter()
            .filter(|f| f.lanes[3] == LaneInput::Released)
            .map(|f| f.time)
            .collect();
        assert_eq!(releases, vec![0.75]);
    }

    #[test]
    fn test_autoplay_hold_releases_at_end() {
        let data = chart(vec![
            Note::new(NoteKind::HoldStart, 1.0, 0, 2, 0),
            Note::new(NoteKind::HoldEnd, 2.0, 0, 2, 0),
        ]);
        let trace = InputTrace::autoplay(&data, 0.25);
        let at_end: Vec<LaneInput> = trace
            .frames
            .iter()
            .filter(|f| f.time == 2.0)
            .map(|f| f.lanes[0])
            .collect();
        assert_eq!(at_end, vec![LaneInput::Held, LaneInput::Released]);

        let result = replay(data, PlayConfig::default(), &trace);
        assert_eq!(result.perfect, 2);
        assert_eq!(result.hold_ticks, 2);
        assert_eq!(result.max_combo, 4);
    }

    #[test]
    fn test_autoplay_grid_bounded_for_long_duration() {
        let mut data = chart(vec![Note::new(NoteKind::Tap, 0.5, 0, 1, 0)]);
        data.duration = 1e30;
        let trace = InputTrace::autoplay(&data, DEFAULT_FRAME_STEP);
        assert!(trace.len() <= MAX_GRID_FRAMES + 8);
        assert!(
            trace
                .frames
                .iter()
                .any(|f| f.time == 0.5 && f.lanes[0] == LaneInput::Pressed)
        );
    }

    #[test]
    fn test_replay_empty_trace_misses_everything() {
        let data = chart(vec![
            Note::new(NoteKind::Tap, 0.5, 0, 1, 0),
            Note::new(NoteKind::HoldStart, 1.0, 1, 1, 1),
            Note::new(NoteKind::HoldEnd, 2.0, 1, 1, 1),
        ]);
        let result = replay(data, PlayConfig::default(), &InputTrace::new());
        assert_eq!(result.miss, 3);
        assert_eq!(result.score, 0);
        assert_eq!(result.raw_score, -60);
        assert!(!result.aborted);
    }
}
