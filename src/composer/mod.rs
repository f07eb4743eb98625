// Module composer - Generative soundtrack: phasing loops over two voice banks
// Lives inside the audio callback; the UI reaches it only through messages

pub mod chords;
pub mod clock;
pub mod loops;
pub mod rng;

use crate::audio::dsp::{OnePoleSmoother, db_to_amplitude, flush_denormals_to_zero, soft_clip};
use crate::audio::parameters::AtomicF32;
use crate::synth::delay::{Delay, DelayParams};
use crate::synth::filter::LowpassFilter;
use crate::synth::reverb::{Reverb, ReverbParams};
use crate::synth::voice::VoiceTimbre;
use crate::synth::voice_manager::VoiceManager;

use chords::{ChordCycle, melody_scale_notes};
use clock::Transport;
use loops::{
    AnchorSource, ChordPadSource, FiredNote, LoopScheduler, OstinatoSource, ScatterSource,
    VoiceRole,
};
use rng::{RandomSource, XorShiftRng};

/// Pad chords cycle every four measures
const DRONE_PERIOD_BEATS: f64 = 16.0;

/// Melody loop periods, pairwise coprime: the combined melody pattern only
/// repeats every 1001 beats (about eight minutes at 120 BPM)
const MELODY_A_PERIOD_BEATS: f64 = 7.0;
const MELODY_B_PERIOD_BEATS: f64 = 11.0;
const MELODY_C_PERIOD_BEATS: f64 = 13.0;

/// Chance that loop A echoes its strike half a beat later
const ECHO_CHANCE: f32 = 0.5;

/// Melody strikes last an eighth note; the anchor holds a half note
const EIGHTH_NOTE_BEATS: f64 = 0.5;
const HALF_NOTE_BEATS: f64 = 2.0;

/// The anchor loop's fixed pitch (C3)
const ANCHOR_NOTE: u8 = 48;

/// Lowpass ahead of the delay, drone bank only
const FILTER_CUTOFF_HZ: f32 = 800.0;
const FILTER_RESONANCE: f32 = 0.707;

/// Delay tuned to an eighth note at the session tempo
const DELAY_TIME_MS: f32 = 250.0;
const DELAY_FEEDBACK: f32 = 0.3;
const DELAY_MIX: f32 = 0.2;

/// Long-tail reverb at the end of the chain
const REVERB_ROOM_SIZE: f32 = 0.85;
const REVERB_DAMPING: f32 = 0.3;
const REVERB_MIX: f32 = 0.5;

/// Master volume ramp length, applied to dB changes from the UI
const VOLUME_RAMP_MS: f32 = 100.0;

/// Event list headroom: the densest firing is one four-note chord plus three
/// melody strikes in the same buffer
const EVENT_CAPACITY: usize = 32;

/// A fired note waiting for its strike position
#[derive(Debug, Clone, Copy)]
struct PendingNote {
    role: VoiceRole,
    note: u8,
    velocity: u8,
    on_at: u64,
    off_at: u64,
}

/// A sounding note waiting for its release position
#[derive(Debug, Clone, Copy)]
struct ActiveNote {
    role: VoiceRole,
    note: u8,
    off_at: u64,
}

/// Generative session soundtrack
///
/// One drone loop cycles four pad chords; three melody loops with coprime
/// periods scatter short notes over them. Everything renders into a mono
/// buffer: drone bank through the lowpass, melody bank joining at the delay
/// input, delay into reverb, then the smoothed master gain and a soft clip.
pub struct AmbientComposer {
    transport: Transport,
    scheduler: LoopScheduler,
    rng: Box<dyn RandomSource>,
    drone_bank: VoiceManager,
    melody_bank: VoiceManager,
    filter: LowpassFilter,
    delay: Delay,
    reverb: Reverb,
    volume_db: AtomicF32,
    volume_smoother: OnePoleSmoother,
    fired: Vec<FiredNote>,
    pending: Vec<PendingNote>,
    active: Vec<ActiveNote>,
}

impl AmbientComposer {
    /// Build the full signal chain for the given output sample rate
    /// `volume_db` is shared with the UI thread and read once per buffer.
    pub fn new(sample_rate: f32, volume_db: AtomicF32) -> Self {
        Self::with_rng(sample_rate, volume_db, Box::new(XorShiftRng::from_clock()))
    }

    /// Build with an explicit random source so tests can pin a seed
    pub fn with_rng(
        sample_rate: f32,
        volume_db: AtomicF32,
        rng: Box<dyn RandomSource>,
    ) -> Self {
        let transport = Transport::new(sample_rate as f64);

        let mut scheduler = LoopScheduler::new();
        scheduler.add_loop(
            transport.beats_to_samples(DRONE_PERIOD_BEATS),
            Box::new(ChordPadSource::new(ChordCycle::pads(), DRONE_PERIOD_BEATS)),
        );

        let scale = melody_scale_notes();
        scheduler.add_loop(
            transport.beats_to_samples(MELODY_A_PERIOD_BEATS),
            Box::new(OstinatoSource::new(
                scale[0],
                scale[2],
                ECHO_CHANCE,
                EIGHTH_NOTE_BEATS,
            )),
        );
        scheduler.add_loop(
            transport.beats_to_samples(MELODY_B_PERIOD_BEATS),
            Box::new(ScatterSource::new(scale, EIGHTH_NOTE_BEATS)),
        );
        scheduler.add_loop(
            transport.beats_to_samples(MELODY_C_PERIOD_BEATS),
            Box::new(AnchorSource::new(ANCHOR_NOTE, HALF_NOTE_BEATS)),
        );

        let initial_gain = db_to_amplitude(volume_db.get());

        Self {
            drone_bank: VoiceManager::new(VoiceTimbre::drone_pad(), sample_rate),
            melody_bank: VoiceManager::new(VoiceTimbre::melody_pluck(), sample_rate),
            filter: LowpassFilter::new(FILTER_CUTOFF_HZ, FILTER_RESONANCE, sample_rate),
            delay: Delay::new(
                DelayParams::new(DELAY_TIME_MS, DELAY_FEEDBACK, DELAY_MIX),
                sample_rate,
            ),
            reverb: Reverb::new(
                ReverbParams::new(REVERB_ROOM_SIZE, REVERB_DAMPING, REVERB_MIX),
                sample_rate,
            ),
            volume_smoother: OnePoleSmoother::new(initial_gain, VOLUME_RAMP_MS, sample_rate),
            volume_db,
            transport,
            scheduler,
            rng,
            fired: Vec::with_capacity(EVENT_CAPACITY),
            pending: Vec::with_capacity(EVENT_CAPACITY),
            active: Vec::with_capacity(EVENT_CAPACITY),
        }
    }

    /// Start the clock from zero and arm every loop. Idempotent while playing.
    pub fn start(&mut self) {
        if !self.transport.is_playing() {
            self.scheduler.arm();
            self.transport.play();
        }
    }

    /// Stop the clock, drop scheduled notes and release every sounding voice
    /// Release and effect tails keep decaying through later renders.
    /// Idempotent while stopped.
    pub fn stop(&mut self) {
        self.transport.stop();
        self.pending.clear();
        self.active.clear();
        self.drone_bank.release_all();
        self.melody_bank.release_all();
    }

    /// Check if the clock is running
    pub fn is_playing(&self) -> bool {
        self.transport.is_playing()
    }

    /// Current clock position in samples
    pub fn position_samples(&self) -> u64 {
        self.transport.position_samples()
    }

    /// Sounding voices per bank (drone, melody), release tails included
    pub fn voice_counts(&self) -> (usize, usize) {
        (
            self.drone_bank.active_voice_count(),
            self.melody_bank.active_voice_count(),
        )
    }

    /// Render one mono buffer and advance the clock while playing
    /// Stopped composers still step the banks and effects so tails ring out.
    pub fn render(&mut self, out: &mut [f32]) {
        let target_gain = db_to_amplitude(self.volume_db.get());
        let playing = self.transport.is_playing();
        let start = self.transport.position_samples();

        if playing {
            self.fired.clear();
            self.scheduler
                .collect(start, out.len(), self.rng.as_mut(), &mut self.fired);
            for i in 0..self.fired.len() {
                let FiredNote { at_sample, event } = self.fired[i];
                let on_at = at_sample + self.transport.beats_to_samples(event.offset_beats);
                let off_at = on_at + self.transport.beats_to_samples(event.duration_beats);
                self.pending.push(PendingNote {
                    role: event.role,
                    note: event.note,
                    velocity: event.velocity,
                    on_at,
                    off_at,
                });
            }
        }

        for (i, slot) in out.iter_mut().enumerate() {
            if playing {
                self.dispatch_due(start + i as u64);
            }
            *slot = self.next_output_sample(target_gain);
        }

        if playing {
            self.transport.advance(out.len() as u64);
        }
    }

    /// Dispatch every note whose position has been reached
    /// Releases run before strikes at the same position: consecutive pad
    /// chords share pitches at the period boundary, and the ending hold must
    /// not cut the new strike.
    fn dispatch_due(&mut self, position: u64) {
        let mut i = 0;
        while i < self.active.len() {
            if self.active[i].off_at <= position {
                let ended = self.active.swap_remove(i);
                self.bank_mut(ended.role).note_off(ended.note);
            } else {
                i += 1;
            }
        }

        let mut i = 0;
        while i < self.pending.len() {
            if self.pending[i].on_at <= position {
                let due = self.pending.swap_remove(i);
                self.bank_mut(due.role).note_on(due.note, due.velocity);
                self.active.push(ActiveNote {
                    role: due.role,
                    note: due.note,
                    off_at: due.off_at,
                });
            } else {
                i += 1;
            }
        }
    }

    fn bank_mut(&mut self, role: VoiceRole) -> &mut VoiceManager {
        match role {
            VoiceRole::Drone => &mut self.drone_bank,
            VoiceRole::Melody => &mut self.melody_bank,
        }
    }

    fn next_output_sample(&mut self, target_gain: f32) -> f32 {
        let drone = self.drone_bank.next_sample();
        let melody = self.melody_bank.next_sample();

        // Pads are darkened before the shared delay; plucks enter it bright
        let padded = self.filter.process(drone);
        let echoed = self.delay.process(padded + melody);
        let mixed = self.reverb.process(echoed);

        let gain = self.volume_smoother.process(target_gain);
        soft_clip(flush_denormals_to_zero(mixed) * gain)
    }
}
