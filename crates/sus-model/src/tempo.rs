use serde::{Deserialize, Serialize};

/// Tick resolution used when the chart does not request one.
pub const DEFAULT_TICKS_PER_BEAT: i64 = 480;

/// Tempo assumed when the chart defines none.
pub const DEFAULT_BPM: f64 = 120.0;

/// A tempo change expressed in song seconds (wave offset excluded).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TempoPoint {
    pub time: f64,
    pub bpm: f64,
}

/// Tick to seconds conversion over a piecewise-constant tempo.
///
/// Entries are kept sorted by tick with unique ticks and positive tempos.
/// The first entry always sits at tick 0.
#[derive(Debug, Clone, PartialEq)]
pub struct TempoMap {
    ticks_per_beat: i64,
    changes: Vec<(i64, f64)>,
}

impl TempoMap {
    /// Build a tempo map from `(tick, bpm)` pairs.
    ///
    /// Pairs are ordered by tick; when several share a tick the one given last wins.
    /// Non-positive or non-finite tempos are dropped. If the earliest surviving
    /// change is after tick 0 its tempo is extended back to tick 0.
    pub fn new(ticks_per_beat: i64, changes: impl IntoIterator<Item = (i64, f64)>) -> Self {
        let mut sorted: Vec<(i64, f64)> = changes
            .into_iter()
            .filter(|&(_, bpm)| bpm.is_finite() && bpm > 0.0)
            .map(|(tick, bpm)| (tick.max(0), bpm))
            .collect();
        // Stable: equal ticks keep their input order
        sorted.sort_by_key(|&(tick, _)| tick);

        let mut deduped: Vec<(i64, f64)> = Vec::with_capacity(sorted.len() + 1);
        for (tick, bpm) in sorted {
            match deduped.last_mut() {
                Some(last) if last.0 == tick => last.1 = bpm,
                _ => deduped.push((tick, bpm)),
            }
        }
        if let Some(&(first_tick, first_bpm)) = deduped.first()
            && first_tick > 0
        {
            deduped.insert(0, (0, first_bpm));
        }

        Self {
            ticks_per_beat,
            changes: deduped,
        }
    }

    /// A map with a single tempo for the whole chart.
    pub fn constant(ticks_per_beat: i64, bpm: f64) -> Self {
        Self::new(ticks_per_beat, [(0, bpm)])
    }

    pub fn ticks_per_beat(&self) -> i64 {
        self.ticks_per_beat
    }

    /// Sorted `(tick, bpm)` entries.
    pub fn changes(&self) -> &[(i64, f64)] {
        &self.changes
    }

    fn is_degenerate(&self) -> bool {
        self.ticks_per_beat <= 0 || self.changes.is_empty()
    }

    /// Elapsed seconds from tick 0 to `target`.
    ///
    /// Non-decreasing in `target`. Negative targets and degenerate maps yield 0.
    pub fn ticks_to_seconds(&self, target: i64) -> f64 {
        if self.is_degenerate() {
            return 0.0;
        }
        let tpb = self.ticks_per_beat as f64;
        let mut seconds = 0.0;
        for (i, &(tick_a, bpm)) in self.changes.iter().enumerate() {
            if target <= tick_a {
                break;
            }
            let tick_b = self
                .changes
                .get(i + 1)
                .map_or(i64::MAX, |&(next_tick, _)| next_tick);
            let end = target.min(tick_b);
            seconds += (end - tick_a) as f64 / tpb * (60.0 / bpm);
            if target <= tick_b {
                break;
            }
        }
        seconds
    }

    /// Tempo in effect at `tick`, or 0 for a degenerate map.
    pub fn bpm_at_tick(&self, tick: i64) -> f64 {
        let idx = self.changes.partition_point(|&(t, _)| t <= tick);
        match idx {
            0 => self.changes.first().map_or(0.0, |&(_, bpm)| bpm),
            _ => self.changes[idx - 1].1,
        }
    }

    /// Tempo of the last segment.
    pub fn final_bpm(&self) -> f64 {
        self.changes.last().map_or(0.0, |&(_, bpm)| bpm)
    }

    /// Tempo changes converted to seconds, starting at time 0.
    pub fn tempo_points(&self) -> Vec<TempoPoint> {
        self.changes
            .iter()
            .map(|&(tick, bpm)| TempoPoint {
                time: self.ticks_to_seconds(tick),
                bpm,
            })
            .collect()
    }
}
