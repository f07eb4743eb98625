// Loops - Coprime-period pattern loops fired against the sample clock
// Each loop fires at an exact intra-buffer offset and re-arms one period ahead

use super::chords::ChordCycle;
use super::rng::RandomSource;

/// Strike velocity for generated notes (levels are set per bank, not per note)
const STRIKE_VELOCITY: u8 = 100;

/// Which voice bank a note event addresses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceRole {
    Drone,
    Melody,
}

/// One note produced by a loop firing
/// Offset and duration are in beats, relative to the firing instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoteEvent {
    pub role: VoiceRole,
    pub note: u8,
    pub velocity: u8,
    pub offset_beats: f64,
    pub duration_beats: f64,
}

/// A note event with its firing position resolved to an absolute sample
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FiredNote {
    pub at_sample: u64,
    pub event: NoteEvent,
}

/// Produces the notes for one firing of a loop
pub trait NoteSource: Send {
    /// Append this firing's notes to `out`
    fn fire(&mut self, rng: &mut dyn RandomSource, out: &mut Vec<NoteEvent>);

    /// Rewind per-pattern state when the clock re-arms
    fn reset(&mut self) {}
}

/// Drone source: one chord of the cycle per firing, sustained pad-length
pub struct ChordPadSource {
    cycle: ChordCycle,
    sustain_beats: f64,
}

impl ChordPadSource {
    pub fn new(cycle: ChordCycle, sustain_beats: f64) -> Self {
        Self {
            cycle,
            sustain_beats,
        }
    }
}

impl NoteSource for ChordPadSource {
    fn fire(&mut self, _rng: &mut dyn RandomSource, out: &mut Vec<NoteEvent>) {
        for &note in self.cycle.next_chord() {
            out.push(NoteEvent {
                role: VoiceRole::Drone,
                note,
                velocity: STRIKE_VELOCITY,
                offset_beats: 0.0,
                duration_beats: self.sustain_beats,
            });
        }
    }

    fn reset(&mut self) {
        self.cycle.reset();
    }
}

/// Ostinato source: a fixed note every firing, sometimes echoed by a second
/// note half a beat later
pub struct OstinatoSource {
    primary: u8,
    echo: u8,
    echo_chance: f32,
    note_beats: f64,
}

impl OstinatoSource {
    pub fn new(primary: u8, echo: u8, echo_chance: f32, note_beats: f64) -> Self {
        Self {
            primary,
            echo,
            echo_chance,
            note_beats,
        }
    }
}

impl NoteSource for OstinatoSource {
    fn fire(&mut self, rng: &mut dyn RandomSource, out: &mut Vec<NoteEvent>) {
        out.push(NoteEvent {
            role: VoiceRole::Melody,
            note: self.primary,
            velocity: STRIKE_VELOCITY,
            offset_beats: 0.0,
            duration_beats: self.note_beats,
        });

        if rng.chance(self.echo_chance) {
            out.push(NoteEvent {
                role: VoiceRole::Melody,
                note: self.echo,
                velocity: STRIKE_VELOCITY,
                offset_beats: self.note_beats,
                duration_beats: self.note_beats,
            });
        }
    }
}

/// Scatter source: one uniformly random note from a fixed scale per firing
pub struct ScatterSource {
    scale: Vec<u8>,
    note_beats: f64,
}

impl ScatterSource {
    pub fn new(scale: Vec<u8>, note_beats: f64) -> Self {
        Self { scale, note_beats }
    }
}

impl NoteSource for ScatterSource {
    fn fire(&mut self, rng: &mut dyn RandomSource, out: &mut Vec<NoteEvent>) {
        if self.scale.is_empty() {
            return;
        }
        let note = self.scale[rng.pick(self.scale.len())];
        out.push(NoteEvent {
            role: VoiceRole::Melody,
            note,
            velocity: STRIKE_VELOCITY,
            offset_beats: 0.0,
            duration_beats: self.note_beats,
        });
    }
}

/// Anchor source: the same low note every firing, held longer
pub struct AnchorSource {
    note: u8,
    note_beats: f64,
}

impl AnchorSource {
    pub fn new(note: u8, note_beats: f64) -> Self {
        Self { note, note_beats }
    }
}

impl NoteSource for AnchorSource {
    fn fire(&mut self, _rng: &mut dyn RandomSource, out: &mut Vec<NoteEvent>) {
        out.push(NoteEvent {
            role: VoiceRole::Melody,
            note: self.note,
            velocity: STRIKE_VELOCITY,
            offset_beats: 0.0,
            duration_beats: self.note_beats,
        });
    }
}

/// One armed loop: a period, the next due position and a note source
struct PatternLoop {
    period_samples: u64,
    next_due: u64,
    source: Box<dyn NoteSource>,
}

/// Fires every loop whose period boundary falls inside the current buffer
///
/// Loops only consume clock time while the caller's transport runs; arming
/// rewinds every loop to fire at clock-time zero, so each session starts the
/// combined pattern from the same alignment and then phases from there.
pub struct LoopScheduler {
    loops: Vec<PatternLoop>,
    scratch: Vec<NoteEvent>,
}

impl LoopScheduler {
    /// Scratch headroom: the widest firing is a four-note chord
    const SCRATCH_CAPACITY: usize = 16;

    /// Create an empty scheduler
    pub fn new() -> Self {
        Self {
            loops: Vec::new(),
            scratch: Vec::with_capacity(Self::SCRATCH_CAPACITY),
        }
    }

    /// Register a loop; `period_samples` must be non-zero
    pub fn add_loop(&mut self, period_samples: u64, source: Box<dyn NoteSource>) {
        assert!(period_samples > 0, "Loop period must be non-zero");
        self.loops.push(PatternLoop {
            period_samples,
            next_due: 0,
            source,
        });
    }

    /// Number of registered loops
    pub fn len(&self) -> usize {
        self.loops.len()
    }

    /// Check if no loops are registered
    pub fn is_empty(&self) -> bool {
        self.loops.is_empty()
    }

    /// Rewind every loop to fire at clock-time zero
    pub fn arm(&mut self) {
        for pattern in &mut self.loops {
            pattern.next_due = 0;
            pattern.source.reset();
        }
    }

    /// Collect all firings within [buffer_start, buffer_start + buffer_len)
    /// Events are appended to `out` with absolute firing positions; a loop can
    /// fire more than once per buffer if its period is shorter than the buffer.
    pub fn collect(
        &mut self,
        buffer_start: u64,
        buffer_len: usize,
        rng: &mut dyn RandomSource,
        out: &mut Vec<FiredNote>,
    ) {
        let buffer_end = buffer_start + buffer_len as u64;

        for pattern in &mut self.loops {
            while pattern.next_due < buffer_end {
                let at_sample = pattern.next_due;

                self.scratch.clear();
                pattern.source.fire(rng, &mut self.scratch);
                for event in &self.scratch {
                    out.push(FiredNote {
                        at_sample,
                        event: *event,
                    });
                }

                pattern.next_due += pattern.period_samples;
            }
        }
    }
}

impl Default for LoopScheduler {
    fn default() -> Self {
        Self::new()
    }
}
