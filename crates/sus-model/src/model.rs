use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::note::{Note, NoteKind};
use crate::tempo::{DEFAULT_TICKS_PER_BEAT, TempoPoint};

/// Complete parsed chart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartData {
    // Metadata
    pub title: String,
    pub subtitle: String,
    pub artist: String,
    pub designer: String,
    pub playlevel: String,
    pub wave: String,
    pub jacket: String,

    // Timing
    /// Tempo changes in seconds from chart start, wave offset excluded
    pub tempo_points: Vec<TempoPoint>,
    /// Global offset in seconds already applied to every note time
    pub offset: f64,
    pub ticks_per_beat: i64,
    /// Song length in seconds
    pub duration: f64,

    /// Notes sorted ascending by time, stable on ties
    pub notes: Vec<Note>,

    /// SHA-256 of the raw source bytes (empty for in-memory sources)
    pub sha256: String,
}

impl Default for ChartData {
    fn default() -> Self {
        Self {
            title: String::new(),
            subtitle: String::new(),
            artist: String::new(),
            designer: String::new(),
            playlevel: String::new(),
            wave: String::new(),
            jacket: String::new(),
            tempo_points: Vec::new(),
            offset: 0.0,
            ticks_per_beat: DEFAULT_TICKS_PER_BEAT,
            duration: 0.0,
            notes: Vec::new(),
            sha256: String::new(),
        }
    }
}

impl ChartData {
    pub fn total_notes(&self) -> usize {
        self.notes.len()
    }

    pub fn count(&self, kind: NoteKind) -> usize {
        self.notes.iter().filter(|n| n.kind == kind).count()
    }

    pub fn total_holds(&self) -> usize {
        self.notes.iter().filter(|n| n.kind.is_hold_start()).count()
    }

    pub fn initial_bpm(&self) -> f64 {
        self.tempo_points.first().map_or(0.0, |p| p.bpm)
    }

    pub fn min_bpm(&self) -> f64 {
        self.tempo_points
            .iter()
            .map(|p| p.bpm)
            .fold(self.initial_bpm(), f64::min)
    }

    pub fn max_bpm(&self) -> f64 {
        self.tempo_points
            .iter()
            .map(|p| p.bpm)
            .fold(self.initial_bpm(), f64::max)
    }

    /// Tempo in effect at `song_time` (same axis as note times, offset included).
    ///
    /// Times before the first tempo point use the initial tempo. Returns 0 when
    /// the chart has no tempo points.
    pub fn bpm_at(&self, song_time: f64) -> f64 {
        let chart_time = song_time - self.offset;
        let idx = self.tempo_points.partition_point(|p| p.time <= chart_time);
        match idx {
            0 => self.initial_bpm(),
            _ => self.tempo_points[idx - 1].bpm,
        }
    }

    /// Time of the latest note, or 0 for an empty chart.
    pub fn last_note_time(&self) -> f64 {
        self.notes.iter().map(|n| n.time).fold(0.0, f64::max)
    }

    /// The later of the declared duration and the last note.
    pub fn end_time(&self) -> f64 {
        self.duration.max(self.last_note_time())
    }

    /// `(start_index, end_index)` for every hold, in start order.
    pub fn hold_pairs(&self) -> Vec<(usize, usize)> {
        let ends: HashMap<u32, usize> = self
            .notes
            .iter()
            .enumerate()
            .filter(|(_, n)| n.kind.is_hold_end())
            .map(|(i, n)| (n.id, i))
            .collect();
        self.notes
            .iter()
            .enumerate()
            .filter(|(_, n)| n.kind.is_hold_start())
            .filter_map(|(i, n)| ends.get(&n.id).map(|&end| (i, end)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chart_with(notes: Vec<Note>, tempo_points: Vec<TempoPoint>, offset: f64) -> ChartData {
        ChartData {
            notes,
            tempo_points,
            offset,
            ..Default::default()
        }
    }

    #[test]
    fn test_bpm_at_applies_offset() {
        let chart = chart_with(
            Vec::new(),
            vec![
                TempoPoint {
                    time: 0.0,
                    bpm: 120.0,
                },
                TempoPoint {
                    time: 2.0,
                    bpm: 200.0,
                },
            ],
            1.0,
        );
        assert_eq!(chart.bpm_at(0.0), 120.0);
        assert_eq!(chart.bpm_at(2.5), 120.0);
        assert_eq!(chart.bpm_at(3.0), 200.0);
        assert_eq!(chart.min_bpm(), 120.0);
        assert_eq!(chart.max_bpm(), 200.0);
    }

    #[test]
    fn test_bpm_at_without_tempo() {
        let chart = ChartData::default();
        assert_eq!(chart.bpm_at(1.0), 0.0);
    }

    #[test]
    fn test_hold_pairs_by_id() {
        let chart = chart_with(
            vec![
                Note::new(NoteKind::HoldStart, 1.0, 0, 1, 3),
                Note::new(NoteKind::Tap, 1.5, 2, 1, 4),
                Note::new(NoteKind::GoldenHoldStart, 1.5, 4, 2, 5),
                Note::new(NoteKind::HoldEnd, 2.0, 0, 1, 3),
                Note::new(NoteKind::GoldenHoldEnd, 3.0, 4, 2, 5),
            ],
            Vec::new(),
            0.0,
        );
        assert_eq!(chart.hold_pairs(), vec![(0, 3), (2, 4)]);
        assert_eq!(chart.total_holds(), 2);
        assert_eq!(chart.count(NoteKind::Tap), 1);
        assert_eq!(chart.last_note_time(), 3.0);
    }

    #[test]
    fn test_end_time_prefers_later() {
        let mut chart = chart_with(
            vec![Note::new(NoteKind::Tap, 5.0, 0, 1, 0)],
            Vec::new(),
            0.0,
        );
        chart.duration = 3.0;
        assert_eq!(chart.end_time(), 5.0);
        chart.duration = 8.0;
        assert_eq!(chart.end_time(), 8.0);
    }
}
