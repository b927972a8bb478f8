use std::ops::Range;

use serde::{Deserialize, Serialize};

/// Number of game lanes on the playfield.
pub const LANE_COUNT: usize = 6;

/// The kind of a note
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NoteKind {
    Tap,
    GoldenTap,
    HoldStart,
    HoldEnd,
    GoldenHoldStart,
    GoldenHoldEnd,
}

impl NoteKind {
    pub fn is_golden(self) -> bool {
        matches!(
            self,
            NoteKind::GoldenTap | NoteKind::GoldenHoldStart | NoteKind::GoldenHoldEnd
        )
    }

    pub fn is_tap(self) -> bool {
        matches!(self, NoteKind::Tap | NoteKind::GoldenTap)
    }

    pub fn is_hold_start(self) -> bool {
        matches!(self, NoteKind::HoldStart | NoteKind::GoldenHoldStart)
    }

    pub fn is_hold_end(self) -> bool {
        matches!(self, NoteKind::HoldEnd | NoteKind::GoldenHoldEnd)
    }

    pub fn is_hold(self) -> bool {
        self.is_hold_start() || self.is_hold_end()
    }

    /// The golden counterpart of this kind. Golden kinds map to themselves.
    pub fn to_golden(self) -> Self {
        match self {
            NoteKind::Tap => NoteKind::GoldenTap,
            NoteKind::HoldStart => NoteKind::GoldenHoldStart,
            NoteKind::HoldEnd => NoteKind::GoldenHoldEnd,
            other => other,
        }
    }

    /// The end kind matching a start kind's golden parity.
    pub fn end_for(start: NoteKind) -> Self {
        if start.is_golden() {
            NoteKind::GoldenHoldEnd
        } else {
            NoteKind::HoldEnd
        }
    }
}

/// A single note in the chart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub kind: NoteKind,
    /// Song time in seconds, wave offset included
    pub time: f64,
    /// Leftmost game lane (0-indexed)
    pub lane: usize,
    /// Number of lanes covered, at least 1
    pub width: usize,
    /// Unique per tap; shared by exactly one hold start and its end
    pub id: u32,
}

impl Note {
    pub fn new(kind: NoteKind, time: f64, lane: usize, width: usize, id: u32) -> Self {
        Self {
            kind,
            time,
            lane,
            width,
            id,
        }
    }

    /// Lanes spanned by this note.
    pub fn lanes(&self) -> Range<usize> {
        self.lane..self.lane + self.width
    }

    pub fn covers(&self, lane: usize) -> bool {
        self.lanes().contains(&lane)
    }
}
