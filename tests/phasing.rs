//! Phasing behavior of the pattern loops
//!
//! Three loops with pairwise-coprime periods drift against each other, and
//! the combined pattern only re-aligns after the product of the periods.
//! These tests pin that arithmetic down against the sample clock.

use dream_flows::composer::chords::melody_scale_notes;
use dream_flows::composer::loops::{
    AnchorSource, FiredNote, LoopScheduler, NoteEvent, NoteSource, OstinatoSource, ScatterSource,
    VoiceRole,
};
use dream_flows::composer::rng::{RandomSource, XorShiftRng};
use rand::Rng;
use std::collections::BTreeSet;

/// Samples per beat used throughout (120 BPM at a 1 kHz test rate)
const BEAT: u64 = 500;

/// Source that tags every firing with a fixed note number
struct Probe(u8);

impl NoteSource for Probe {
    fn fire(&mut self, _rng: &mut dyn RandomSource, out: &mut Vec<NoteEvent>) {
        out.push(NoteEvent {
            role: VoiceRole::Melody,
            note: self.0,
            velocity: 100,
            offset_beats: 0.0,
            duration_beats: 0.5,
        });
    }
}

/// Build a scheduler with tagged 7-, 11- and 13-beat loops, armed at zero
fn coprime_scheduler() -> LoopScheduler {
    let mut scheduler = LoopScheduler::new();
    scheduler.add_loop(7 * BEAT, Box::new(Probe(1)));
    scheduler.add_loop(11 * BEAT, Box::new(Probe(2)));
    scheduler.add_loop(13 * BEAT, Box::new(Probe(3)));
    scheduler.arm();
    scheduler
}

/// Collect every firing in [0, total_samples) using the given buffer size
fn collect_all(scheduler: &mut LoopScheduler, total_samples: u64, buffer: usize) -> Vec<FiredNote> {
    let mut rng = XorShiftRng::new(1);
    let mut fired = Vec::new();
    let mut position = 0u64;
    while position < total_samples {
        let len = buffer.min((total_samples - position) as usize);
        scheduler.collect(position, len, &mut rng, &mut fired);
        position += len as u64;
    }
    fired
}

#[test]
fn test_loops_fire_on_exact_period_multiples() {
    let mut scheduler = coprime_scheduler();
    let total = 3 * 13 * BEAT;
    let fired = collect_all(&mut scheduler, total, 333);

    for (tag, period_beats) in [(1u8, 7u64), (2, 11), (3, 13)] {
        let positions: Vec<u64> = fired
            .iter()
            .filter(|f| f.event.note == tag)
            .map(|f| f.at_sample)
            .collect();

        let period = period_beats * BEAT;
        let expected: Vec<u64> = (0..).map(|k| k * period).take_while(|&t| t < total).collect();
        assert_eq!(positions, expected, "loop with {}-beat period", period_beats);
    }
}

#[test]
fn test_combined_pattern_realigns_after_product_cycle() {
    // lcm(7, 11, 13) = 1001 beats: pairs meet earlier (77, 91 and 143
    // beats), but all three coincide only at multiples of the product.
    let mut scheduler = coprime_scheduler();
    let total = 2 * 1001 * BEAT;
    let fired = collect_all(&mut scheduler, total, 4096);

    let positions_of = |tag: u8| -> BTreeSet<u64> {
        fired
            .iter()
            .filter(|f| f.event.note == tag)
            .map(|f| f.at_sample)
            .collect()
    };

    let a = positions_of(1);
    let b = positions_of(2);
    let c = positions_of(3);

    let triple: Vec<u64> = a
        .iter()
        .filter(|t| b.contains(t) && c.contains(t))
        .copied()
        .collect();
    assert_eq!(triple, vec![0, 1001 * BEAT]);

    // Sanity-check a pairwise meeting that must NOT be a triple one
    let ab_meet = 77 * BEAT;
    assert!(a.contains(&ab_meet) && b.contains(&ab_meet));
    assert!(!c.contains(&ab_meet));
}

#[test]
fn test_buffer_size_never_shifts_firing_positions() {
    let total = 100 * 13 * BEAT;

    let mut reference = coprime_scheduler();
    let expected = collect_all(&mut reference, total, 4096);

    for buffer in [64usize, 333, 541, 7001] {
        let mut scheduler = coprime_scheduler();
        let fired = collect_all(&mut scheduler, total, buffer);
        assert_eq!(fired.len(), expected.len(), "buffer size {}", buffer);
        for (got, want) in fired.iter().zip(expected.iter()) {
            assert_eq!(got.at_sample, want.at_sample, "buffer size {}", buffer);
            assert_eq!(got.event.note, want.event.note, "buffer size {}", buffer);
        }
    }
}

#[test]
fn test_rearming_restarts_the_alignment() {
    let mut scheduler = coprime_scheduler();
    let _ = collect_all(&mut scheduler, 20 * BEAT, 1024);

    // A new session rewinds every loop to fire together at clock zero
    scheduler.arm();
    let fired = collect_all(&mut scheduler, 1, 1);
    let notes: BTreeSet<u8> = fired.iter().map(|f| f.event.note).collect();
    assert_eq!(notes, BTreeSet::from([1, 2, 3]));
    assert!(fired.iter().all(|f| f.at_sample == 0));
}

#[test]
fn test_scatter_notes_stay_in_scale() {
    let scale = melody_scale_notes();
    let mut source = ScatterSource::new(scale.clone(), 0.5);

    // Fuzz the seed: membership must hold for any random stream
    let seed = rand::thread_rng().r#gen::<u64>() | 1;
    let mut rng = XorShiftRng::new(seed);
    let mut out = Vec::new();
    for _ in 0..1000 {
        out.clear();
        source.fire(&mut rng, &mut out);
        assert_eq!(out.len(), 1);
        assert!(
            scale.contains(&out[0].note),
            "note {} outside scale (seed {})",
            out[0].note,
            seed
        );
    }
}

#[test]
fn test_scatter_eventually_covers_the_scale() {
    let scale = melody_scale_notes();
    let mut source = ScatterSource::new(scale.clone(), 0.5);
    let mut rng = XorShiftRng::new(0xDECAF);

    let mut seen = BTreeSet::new();
    let mut out = Vec::new();
    for _ in 0..500 {
        out.clear();
        source.fire(&mut rng, &mut out);
        seen.insert(out[0].note);
    }
    assert_eq!(seen.len(), scale.len(), "some scale degrees never picked");
}

#[test]
fn test_ostinato_echo_roughly_half_the_firings() {
    let mut source = OstinatoSource::new(60, 65, 0.5, 0.5);
    let mut rng = XorShiftRng::new(42);

    let mut echoes = 0usize;
    let mut out = Vec::new();
    for _ in 0..10_000 {
        out.clear();
        source.fire(&mut rng, &mut out);

        assert_eq!(out[0].note, 60);
        assert_eq!(out[0].offset_beats, 0.0);

        match out.len() {
            1 => {}
            2 => {
                echoes += 1;
                // The echo answers half a beat later, a fourth above
                assert_eq!(out[1].note, 65);
                assert_eq!(out[1].offset_beats, 0.5);
            }
            n => panic!("unexpected event count {}", n),
        }
    }

    assert!(
        (4500..=5500).contains(&echoes),
        "echo count {} far from the 50% chance",
        echoes
    );
}

#[test]
fn test_anchor_holds_the_same_low_note() {
    let mut source = AnchorSource::new(48, 2.0);
    let mut rng = XorShiftRng::new(7);

    let mut out = Vec::new();
    for _ in 0..50 {
        out.clear();
        source.fire(&mut rng, &mut out);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].note, 48);
        assert_eq!(out[0].duration_beats, 2.0);
    }
}
