// SUS chart data model: tempo map, note types, two-pass chart parser

mod base36;
mod error;
mod model;
mod note;
mod parse;
mod tempo;

pub use base36::{decode_digit, decode_id};
pub use error::{LoadError, ParseWarning};
pub use model::ChartData;
pub use note::{LANE_COUNT, Note, NoteKind};
pub use parse::{DecodeOptions, Decoded, SusDecoder, UnclosedHoldPolicy};
pub use tempo::{DEFAULT_BPM, DEFAULT_TICKS_PER_BEAT, TempoMap, TempoPoint};
