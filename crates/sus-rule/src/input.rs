use serde::{Deserialize, Serialize};
use sus_model::LANE_COUNT;

/// What a lane's key did during one scheduling tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum LaneInput {
    #[default]
    Idle,
    /// Went down this tick
    Pressed,
    /// Stayed down
    Held,
    /// Went up this tick
    Released,
}

impl LaneInput {
    pub fn is_down(self) -> bool {
        matches!(self, LaneInput::Pressed | LaneInput::Held)
    }
}

/// Per-lane input for one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickInput {
    pub lanes: [LaneInput; LANE_COUNT],
}

impl TickInput {
    /// No lane changed.
    pub fn idle() -> Self {
        Self::default()
    }

    /// Builder-style setter. Out-of-range lanes are ignored.
    pub fn with(mut self, lane: usize, input: LaneInput) -> Self {
        self.set(lane, input);
        self
    }

    pub fn set(&mut self, lane: usize, input: LaneInput) {
        if let Some(slot) = self.lanes.get_mut(lane) {
            *slot = input;
        }
    }

    pub fn get(&self, lane: usize) -> LaneInput {
        self.lanes.get(lane).copied().unwrap_or_default()
    }

    pub fn pressed_lanes(&self) -> impl Iterator<Item = usize> + '_ {
        self.lanes
            .iter()
            .enumerate()
            .filter(|(_, l)| **l == LaneInput::Pressed)
            .map(|(i, _)| i)
    }

    pub fn is_idle(&self) -> bool {
        self.lanes.iter().all(|l| *l == LaneInput::Idle)
    }
}
