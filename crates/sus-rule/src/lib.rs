// Judge windows, scoring, the frame-driven judgement engine, play sessions and replay traces

mod input;
mod judge_event;
pub mod judge_manager;
mod judge_property;
mod play_config;
mod play_result;
mod replay;
mod session;

pub use input::{LaneInput, TickInput};
pub use judge_event::{HoldEndReason, JudgeEvent, JudgeObserver, TickOutcome};
pub use judge_manager::{ActiveHold, JudgeManager, NoteState};
pub use judge_property::{JudgeCategory, JudgeWindows, ScoreTable};
pub use play_config::PlayConfig;
pub use play_result::{PlayResult, RunningResult};
pub use replay::{DEFAULT_FRAME_STEP, InputFrame, InputTrace, replay};
pub use session::PlaySession;
