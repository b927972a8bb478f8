use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use log::{debug, info, warn};
use sha2::{Digest, Sha256};

use crate::base36::{decode_digit, decode_id};
use crate::error::{LoadError, ParseWarning};
use crate::model::ChartData;
use crate::note::{LANE_COUNT, Note, NoteKind};
use crate::tempo::{DEFAULT_BPM, DEFAULT_TICKS_PER_BEAT, TempoMap};

/// Beats per measure until a `#mmm02` override says otherwise.
const DEFAULT_BEATS_PER_MEASURE: f64 = 4.0;

/// Upper bounds for directive values; anything larger is rejected as invalid.
const MAX_BEATS_PER_MEASURE: f64 = 1024.0;
const MAX_TICKS_PER_BEAT: i64 = 100_000;
const MIN_BPM: f64 = 0.001;
const MAX_BPM: f64 = 100_000.0;
const MAX_DURATION: f64 = 86_400.0;

/// Lane markers below this value are not playable lanes.
const LANE_MARKER_BIAS: u32 = 2;

/// Header tags that are valid but carry nothing the player needs.
const IGNORED_TAGS: &[&str] = &[
    "GENRE",
    "DIFFICULTY",
    "SONGID",
    "BACKGROUND",
    "MOVIE",
    "MOVIEOFFSET",
    "BASEBPM",
    "COPYRIGHT",
    "HISPEED",
    "NOSPEED",
    "ATTRIBUTE",
    "NOATTRIBUTE",
    "ATPRIORITY",
    "ATVALUE",
    "MEASUREHS",
    "MEASUREBS",
    "TIL",
];

/// SUS chart decoder
pub struct SusDecoder;

/// How the end of a hold that is never closed gets placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnclosedHoldPolicy {
    /// The later of one measure (final tempo) past the last note, or the chart's final tick.
    #[default]
    ExtendPastLastNote,
    /// The chart's final tick.
    ChartEnd,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DecodeOptions {
    pub unclosed_hold: UnclosedHoldPolicy,
}

/// A successfully loaded chart together with every recovered problem.
#[derive(Debug, Clone)]
pub struct Decoded {
    pub chart: ChartData,
    pub warnings: Vec<ParseWarning>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Channel {
    Tap,
    Hold,
}

/// A note data line collected in pass 1, expanded in pass 2
#[derive(Debug, Clone)]
struct NoteLine {
    line: usize,
    measure: u32,
    channel: Channel,
    lane_marker: char,
    data: String,
}

/// Everything pass 1 learns from the directives
struct Directives {
    chart: ChartData,
    ticks_per_beat: i64,
    initial_bpm: Option<f64>,
    tempo_defs: HashMap<u32, f64>,
    measure_lengths: BTreeMap<u32, f64>,
    /// measure -> (line, tempo id text); the last event per measure wins
    tempo_events: BTreeMap<u32, (usize, String)>,
    note_lines: Vec<NoteLine>,
    max_measure: Option<u32>,
    duration: Option<f64>,
}

/// Start tick and length of each measure, shared by both passes
struct MeasureGrid {
    /// (start tick, beats per measure) for measures 0..=max
    measures: Vec<(i64, f64)>,
    ticks_per_beat: i64,
}

impl MeasureGrid {
    fn build(max_measure: u32, ticks_per_beat: i64, lengths: &BTreeMap<u32, f64>) -> Self {
        let mut measures = Vec::with_capacity(max_measure as usize + 1);
        let mut beats = DEFAULT_BEATS_PER_MEASURE;
        let mut tick: i64 = 0;
        for m in 0..=max_measure {
            if let Some(&override_beats) = lengths.get(&m) {
                beats = override_beats;
            }
            measures.push((tick, beats));
            tick = tick.saturating_add(measure_ticks(beats, ticks_per_beat));
        }
        Self {
            measures,
            ticks_per_beat,
        }
    }

    fn start_tick(&self, measure: u32) -> i64 {
        self.measures.get(measure as usize).map_or(0, |m| m.0)
    }

    fn span(&self, measure: u32) -> i64 {
        self.measures
            .get(measure as usize)
            .map_or(0, |m| measure_ticks(m.1, self.ticks_per_beat))
    }

    /// Tick just past the last measure.
    fn final_tick(&self) -> i64 {
        self.measures
            .last()
            .map_or(0, |&(start, beats)| {
                start.saturating_add(measure_ticks(beats, self.ticks_per_beat))
            })
    }

    fn final_beats(&self) -> f64 {
        self.measures
            .last()
            .map_or(DEFAULT_BEATS_PER_MEASURE, |m| m.1)
    }
}

fn measure_ticks(beats: f64, ticks_per_beat: i64) -> i64 {
    (beats * ticks_per_beat as f64) as i64
}

/// One non-empty slice, positioned in absolute ticks
#[derive(Debug, Clone, Copy)]
struct SliceEvent {
    tick: i64,
    line: usize,
    kind: NoteKind,
    lane: usize,
    width: usize,
}

impl SliceEvent {
    /// Hold ends sort ahead of anything else on the same tick so a hold can
    /// end and a new one start at the same instant on one lane.
    fn order_rank(&self) -> u8 {
        if self.kind.is_hold_end() { 0 } else { 1 }
    }
}

/// Single-pass note builder with one open-hold slot per lane
struct NoteBuilder {
    notes: Vec<Note>,
    removed: Vec<bool>,
    /// Index into `notes` of the open hold start per lane
    open_holds: [Option<usize>; LANE_COUNT],
    next_id: u32,
}

impl NoteBuilder {
    fn new() -> Self {
        Self {
            notes: Vec::new(),
            removed: Vec::new(),
            open_holds: [None; LANE_COUNT],
            next_id: 0,
        }
    }

    fn push(&mut self, note: Note) -> usize {
        self.notes.push(note);
        self.removed.push(false);
        self.notes.len() - 1
    }

    fn take_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn add(&mut self, event: &SliceEvent, time: f64, warnings: &mut Vec<ParseWarning>) {
        match event.kind {
            NoteKind::HoldStart => {
                if let Some(abandoned) = self.open_holds[event.lane].take() {
                    warnings.push(ParseWarning::HoldOverwritten {
                        line: event.line,
                        lane: event.lane,
                    });
                    self.removed[abandoned] = true;
                }
                let id = self.take_id();
                let idx = self.push(Note::new(event.kind, time, event.lane, event.width, id));
                self.open_holds[event.lane] = Some(idx);
            }
            NoteKind::HoldEnd => match self.open_holds[event.lane].take() {
                Some(start) => {
                    let id = self.notes[start].id;
                    self.push(Note::new(event.kind, time, event.lane, event.width, id));
                }
                None => warnings.push(ParseWarning::OrphanHoldEnd {
                    line: event.line,
                    lane: event.lane,
                }),
            },
            kind => {
                let id = self.take_id();
                self.push(Note::new(kind, time, event.lane, event.width, id));
            }
        }
    }

    fn last_note_time(&self) -> Option<f64> {
        self.notes
            .iter()
            .zip(&self.removed)
            .filter(|(_, removed)| !**removed)
            .map(|(n, _)| n.time)
            .reduce(f64::max)
    }

    /// Close every still-open hold with a synthetic end at `end_time`.
    fn close_open_holds(&mut self, end_time: f64, warnings: &mut Vec<ParseWarning>) {
        for lane in 0..LANE_COUNT {
            let Some(start) = self.open_holds[lane].take() else {
                continue;
            };
            let start_note = self.notes[start].clone();
            let time = end_time.max(start_note.time);
            warnings.push(ParseWarning::UnclosedHold {
                id: start_note.id,
                lane,
                time,
            });
            self.push(Note::new(
                NoteKind::end_for(start_note.kind),
                time,
                start_note.lane,
                start_note.width,
                start_note.id,
            ));
        }
    }

    /// Fold golden taps stacked on a hold start into a golden hold.
    fn promote_golden_holds(&mut self) {
        let mut starts: HashMap<(u64, usize, usize), usize> = HashMap::new();
        let mut ends: HashMap<u32, usize> = HashMap::new();
        for (i, note) in self.notes.iter().enumerate() {
            if self.removed[i] {
                continue;
            }
            if note.kind.is_hold_start() {
                starts
                    .entry((note.time.to_bits(), note.lane, note.width))
                    .or_insert(i);
            } else if note.kind.is_hold_end() {
                ends.insert(note.id, i);
            }
        }

        for i in 0..self.notes.len() {
            if self.removed[i] || self.notes[i].kind != NoteKind::GoldenTap {
                continue;
            }
            let key = {
                let tap = &self.notes[i];
                (tap.time.to_bits(), tap.lane, tap.width)
            };
            let Some(&start) = starts.get(&key) else {
                continue;
            };
            let id = self.notes[start].id;
            self.notes[start].kind = self.notes[start].kind.to_golden();
            if let Some(&end) = ends.get(&id) {
                self.notes[end].kind = self.notes[end].kind.to_golden();
            }
            self.removed[i] = true;
        }
    }

    fn finish(self) -> Vec<Note> {
        let mut notes: Vec<Note> = self
            .notes
            .into_iter()
            .zip(self.removed)
            .filter(|(_, removed)| !removed)
            .map(|(note, _)| note)
            .collect();
        // Stable: ties keep construction order
        notes.sort_by(|a, b| a.time.total_cmp(&b.time));
        notes
    }
}

impl SusDecoder {
    pub fn decode(path: &Path) -> Result<Decoded, LoadError> {
        Self::decode_with_options(path, &DecodeOptions::default())
    }

    pub fn decode_with_options(path: &Path, options: &DecodeOptions) -> Result<Decoded, LoadError> {
        let raw_bytes = std::fs::read(path).map_err(|source| LoadError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let content = detect_encoding_and_decode(&raw_bytes);
        let mut decoded = Self::decode_str_with_options(&content, options)?;
        decoded.chart.sha256 = sha256_hex(&raw_bytes);
        Ok(decoded)
    }

    pub fn decode_str(content: &str) -> Result<Decoded, LoadError> {
        Self::decode_str_with_options(content, &DecodeOptions::default())
    }

    pub fn decode_str_with_options(
        content: &str,
        options: &DecodeOptions,
    ) -> Result<Decoded, LoadError> {
        if content.trim().is_empty() {
            return Err(LoadError::Empty);
        }

        let mut warnings = Vec::new();

        // Pass 1: directives
        let directives = scan_directives(content, &mut warnings);
        let Directives {
            mut chart,
            ticks_per_beat,
            initial_bpm,
            tempo_defs,
            measure_lengths,
            tempo_events,
            note_lines,
            max_measure,
            duration,
        } = directives;

        let Some(max_measure) = max_measure else {
            emit_warnings(&warnings);
            return Err(LoadError::NoNotes);
        };

        let grid = MeasureGrid::build(max_measure, ticks_per_beat, &measure_lengths);

        let mut tempo_changes = vec![(0, initial_bpm.unwrap_or(DEFAULT_BPM))];
        for (&measure, (line, id_text)) in &tempo_events {
            let Some(id) = decode_id(id_text) else {
                warnings.push(ParseWarning::InvalidBase36 {
                    line: *line,
                    text: id_text.clone(),
                });
                continue;
            };
            match tempo_defs.get(&id) {
                Some(&bpm) => tempo_changes.push((grid.start_tick(measure), bpm)),
                None => warnings.push(ParseWarning::UnknownTempoId {
                    line: *line,
                    id: id_text.clone(),
                }),
            }
        }
        let tempo = TempoMap::new(ticks_per_beat, tempo_changes);

        // Pass 2: note slices in time order
        let mut events = Vec::new();
        for note_line in &note_lines {
            collect_slices(note_line, &grid, &mut events, &mut warnings);
        }
        events.sort_by_key(|e| (e.tick, e.order_rank()));

        let offset = chart.offset;
        let mut builder = NoteBuilder::new();
        for event in &events {
            let time = tempo.ticks_to_seconds(event.tick) + offset;
            builder.add(event, time, &mut warnings);
        }

        if builder.open_holds.iter().any(Option::is_some) {
            let chart_end = tempo.ticks_to_seconds(grid.final_tick()) + offset;
            let end_time = match options.unclosed_hold {
                UnclosedHoldPolicy::ExtendPastLastNote => {
                    let bpm = tempo.final_bpm();
                    let measure_seconds = if bpm > 0.0 {
                        grid.final_beats() * 60.0 / bpm
                    } else {
                        0.0
                    };
                    let last = builder.last_note_time().unwrap_or(offset);
                    (last + measure_seconds).max(chart_end)
                }
                UnclosedHoldPolicy::ChartEnd => chart_end,
            };
            builder.close_open_holds(end_time, &mut warnings);
        }

        builder.promote_golden_holds();
        let notes = builder.finish();

        emit_warnings(&warnings);

        if notes.is_empty() {
            return Err(LoadError::NoNotes);
        }

        chart.tempo_points = tempo.tempo_points();
        chart.ticks_per_beat = ticks_per_beat;
        chart.notes = notes;
        chart.duration = match duration {
            Some(d) if d > 0.0 => d,
            _ => chart.last_note_time(),
        };

        info!(
            "Loaded chart \"{}\": {} notes ({} holds), {} warnings",
            chart.title,
            chart.total_notes(),
            chart.total_holds(),
            warnings.len()
        );

        Ok(Decoded { chart, warnings })
    }
}

fn emit_warnings(warnings: &[ParseWarning]) {
    for w in warnings {
        warn!("{w}");
    }
}

/// Pass 1: read every `#` line, keeping note data for pass 2.
fn scan_directives(content: &str, warnings: &mut Vec<ParseWarning>) -> Directives {
    let mut d = Directives {
        chart: ChartData::default(),
        ticks_per_beat: DEFAULT_TICKS_PER_BEAT,
        initial_bpm: None,
        tempo_defs: HashMap::new(),
        measure_lengths: BTreeMap::new(),
        tempo_events: BTreeMap::new(),
        note_lines: Vec::new(),
        max_measure: None,
        duration: None,
    };

    for (idx, raw_line) in content.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw_line.trim();
        // Anything not starting with '#' is a comment
        let Some(body) = line.strip_prefix('#') else {
            continue;
        };

        let Some((tag, value, colon)) = split_directive(body) else {
            warnings.push(ParseWarning::MalformedDirective {
                line: line_no,
                text: line.to_string(),
            });
            continue;
        };

        if is_measure_tag(tag) {
            if !colon {
                warnings.push(ParseWarning::MalformedDirective {
                    line: line_no,
                    text: line.to_string(),
                });
                continue;
            }
            scan_measure_line(&mut d, line_no, tag, value, warnings);
            continue;
        }

        let upper = tag.to_ascii_uppercase();
        let value = strip_quotes(value);
        match upper.as_str() {
            "TITLE" => d.chart.title = value.to_string(),
            "SUBTITLE" => d.chart.subtitle = value.to_string(),
            "ARTIST" => d.chart.artist = value.to_string(),
            "DESIGNER" => d.chart.designer = value.to_string(),
            "PLAYLEVEL" => d.chart.playlevel = value.to_string(),
            "WAVE" => d.chart.wave = value.to_string(),
            "JACKET" => d.chart.jacket = value.to_string(),
            "DURATION" => match parse_number(line_no, "DURATION", value, warnings) {
                Some(v) if v <= MAX_DURATION => d.duration = Some(v),
                Some(_) => warnings.push(ParseWarning::InvalidNumber {
                    line: line_no,
                    field: "DURATION".to_string(),
                    value: value.to_string(),
                }),
                None => {}
            },
            "WAVEOFFSET" => {
                if let Some(v) = parse_number(line_no, "WAVEOFFSET", value, warnings) {
                    d.chart.offset = v;
                }
            }
            "REQUEST" => scan_request(&mut d, line_no, value, warnings),
            _ if upper.starts_with("BPM") && upper.len() == 5 => {
                scan_tempo_definition(&mut d, line_no, &tag[3..], value, warnings);
            }
            _ if IGNORED_TAGS.contains(&upper.as_str()) => {
                debug!("line {line_no}: ignoring #{upper}");
            }
            _ => warnings.push(ParseWarning::UnrecognizedHeader {
                line: line_no,
                header: tag.to_string(),
            }),
        }
    }

    d
}

/// Split a directive body at its first colon or whitespace.
///
/// Returns `(tag, value, split_on_colon)`, or `None` when there is no tag.
fn split_directive(body: &str) -> Option<(&str, &str, bool)> {
    let split = body.find(|c: char| c == ':' || c.is_whitespace());
    let (tag, value, colon) = match split {
        Some(pos) => {
            let sep = body[pos..].chars().next()?;
            let rest = body[pos + sep.len_utf8()..].trim();
            match (sep, rest.strip_prefix(':')) {
                // `#00002 : 4` style
                (s, Some(after)) if s != ':' => (&body[..pos], after.trim(), true),
                _ => (&body[..pos], rest, sep == ':'),
            }
        }
        None => (body, "", false),
    };
    let tag = tag.trim();
    if tag.is_empty() {
        return None;
    }
    Some((tag, value, colon))
}

fn strip_quotes(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
}

fn is_measure_tag(tag: &str) -> bool {
    tag.len() >= 5 && tag.as_bytes()[..3].iter().all(u8::is_ascii_digit)
}

fn parse_number(
    line: usize,
    field: &str,
    value: &str,
    warnings: &mut Vec<ParseWarning>,
) -> Option<f64> {
    match value.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => Some(v),
        _ => {
            warnings.push(ParseWarning::InvalidNumber {
                line,
                field: field.to_string(),
                value: value.to_string(),
            });
            None
        }
    }
}

fn scan_request(d: &mut Directives, line: usize, value: &str, warnings: &mut Vec<ParseWarning>) {
    let mut parts = value.split_whitespace();
    let Some(key) = parts.next() else {
        warnings.push(ParseWarning::MalformedDirective {
            line,
            text: format!("#REQUEST {value}"),
        });
        return;
    };
    if !key.eq_ignore_ascii_case("ticks_per_beat") {
        debug!("line {line}: ignoring request `{value}`");
        return;
    }
    let arg = parts.next().unwrap_or("");
    match arg.parse::<i64>() {
        Ok(tpb) if tpb > 0 && tpb <= MAX_TICKS_PER_BEAT => d.ticks_per_beat = tpb,
        _ => warnings.push(ParseWarning::InvalidNumber {
            line,
            field: "ticks_per_beat".to_string(),
            value: arg.to_string(),
        }),
    }
}

fn scan_tempo_definition(
    d: &mut Directives,
    line: usize,
    id_text: &str,
    value: &str,
    warnings: &mut Vec<ParseWarning>,
) {
    let Some(id) = decode_id(id_text) else {
        warnings.push(ParseWarning::InvalidBase36 {
            line,
            text: id_text.to_string(),
        });
        return;
    };
    let Some(bpm) = parse_number(line, "BPM", value, warnings) else {
        return;
    };
    if !(MIN_BPM..=MAX_BPM).contains(&bpm) {
        warnings.push(ParseWarning::InvalidNumber {
            line,
            field: "BPM".to_string(),
            value: value.to_string(),
        });
        return;
    }
    // The first definition of an id stands; later ones are skipped
    if d.tempo_defs.contains_key(&id) {
        warnings.push(ParseWarning::DuplicateTempoId {
            line,
            id: id_text.to_string(),
        });
        return;
    }
    d.tempo_defs.insert(id, bpm);
    if d.initial_bpm.is_none() {
        d.initial_bpm = Some(bpm);
    }
}

fn scan_measure_line(
    d: &mut Directives,
    line: usize,
    tag: &str,
    value: &str,
    warnings: &mut Vec<ParseWarning>,
) {
    let measure: u32 = match tag[..3].parse() {
        Ok(m) => m,
        Err(_) => {
            warnings.push(ParseWarning::MalformedDirective {
                line,
                text: format!("#{tag}:{value}"),
            });
            return;
        }
    };
    d.max_measure = Some(d.max_measure.map_or(measure, |m| m.max(measure)));

    let code: Vec<char> = tag[3..].chars().collect();
    match code.as_slice() {
        ['0', '2'] => {
            let Some(beats) = parse_number(line, "measure length", value, warnings) else {
                return;
            };
            if beats <= 0.0 || beats > MAX_BEATS_PER_MEASURE {
                warnings.push(ParseWarning::InvalidNumber {
                    line,
                    field: "measure length".to_string(),
                    value: value.to_string(),
                });
                return;
            }
            d.measure_lengths.insert(measure, beats);
        }
        ['0', '8'] => {
            d.tempo_events.insert(measure, (line, value.to_string()));
        }
        ['1', marker] => d.note_lines.push(NoteLine {
            line,
            measure,
            channel: Channel::Tap,
            lane_marker: *marker,
            data: value.to_string(),
        }),
        // Every hold channel shares the lane's single open-hold slot
        ['3', marker, hold_channel] => {
            if decode_digit(*hold_channel).is_none() {
                warnings.push(ParseWarning::InvalidBase36 {
                    line,
                    text: tag.to_string(),
                });
                return;
            }
            d.note_lines.push(NoteLine {
                line,
                measure,
                channel: Channel::Hold,
                lane_marker: *marker,
                data: value.to_string(),
            });
        }
        _ => warnings.push(ParseWarning::UnrecognizedHeader {
            line,
            header: tag.to_string(),
        }),
    }
}

/// Pass 2: expand one note line into positioned slice events.
fn collect_slices(
    note_line: &NoteLine,
    grid: &MeasureGrid,
    events: &mut Vec<SliceEvent>,
    warnings: &mut Vec<ParseWarning>,
) {
    let line = note_line.line;
    let Some(marker) = decode_digit(note_line.lane_marker) else {
        warnings.push(ParseWarning::InvalidBase36 {
            line,
            text: note_line.lane_marker.to_string(),
        });
        return;
    };
    let lane = match marker.checked_sub(LANE_MARKER_BIAS) {
        Some(fine) if ((fine / 2) as usize) < LANE_COUNT => (fine / 2) as usize,
        _ => {
            warnings.push(ParseWarning::LaneOutOfRange {
                line,
                marker: note_line.lane_marker,
            });
            return;
        }
    };

    let data: Vec<char> = note_line
        .data
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    if data.len() % 2 != 0 {
        warnings.push(ParseWarning::MalformedDirective {
            line,
            text: note_line.data.clone(),
        });
    }
    let slice_count = data.len() / 2;
    if slice_count == 0 {
        return;
    }

    let start = grid.start_tick(note_line.measure);
    let ticks_per_slice = grid.span(note_line.measure) / slice_count as i64;

    for (i, pair) in data.chunks_exact(2).enumerate() {
        if pair == ['0', '0'] {
            continue;
        }
        let slice: String = pair.iter().collect();
        let (Some(code), Some(width_code)) = (decode_digit(pair[0]), decode_digit(pair[1])) else {
            warnings.push(ParseWarning::InvalidBase36 { line, text: slice });
            continue;
        };
        if width_code < 1 {
            warnings.push(ParseWarning::ZeroWidth { line, slice });
            continue;
        }
        let kind = match (note_line.channel, code) {
            (Channel::Tap, 1) => NoteKind::Tap,
            (Channel::Tap, 2) => NoteKind::GoldenTap,
            (Channel::Hold, 1) => NoteKind::HoldStart,
            (Channel::Hold, 2) => NoteKind::HoldEnd,
            _ => {
                warnings.push(ParseWarning::UnsupportedNoteType { line, code, slice });
                continue;
            }
        };
        let width = ((width_code / 2).max(1) as usize).min(LANE_COUNT - lane);
        events.push(SliceEvent {
            tick: start.saturating_add((i as i64).saturating_mul(ticks_per_slice)),
            line,
            kind,
            lane,
            width,
        });
    }
}

/// Detect encoding and decode bytes to string
fn detect_encoding_and_decode(raw: &[u8]) -> String {
    // Check for UTF-8 BOM
    if let Some(stripped) = raw.strip_prefix(&[0xEF, 0xBB, 0xBF]) {
        return String::from_utf8_lossy(stripped).into_owned();
    }

    if let Ok(s) = std::str::from_utf8(raw) {
        return s.to_string();
    }

    // Charts from older editors are commonly Shift_JIS
    let (decoded, _, _) = encoding_rs::SHIFT_JIS.decode(raw);
    decoded.into_owned()
}

fn sha256_hex(raw: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(raw);
    format!("{:x}", hasher.finalize())
}
