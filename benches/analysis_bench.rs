//! Performance benchmarks for audio analysis

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use songform::features::SignalPrimitives;
use songform::theory::{analyze_harmony, analyze_rhythm};
use songform::{analyze_signal, AnalysisConfig, AudioSignal, Beat, ChordEvent, ReferencePrimitives};
use std::sync::Arc;

/// 120 BPM clicks over an A minor drone
fn synthetic_track(seconds: usize, sample_rate: u32) -> Vec<f32> {
    let sr = sample_rate as f32;
    let beat = (sr * 0.5) as usize;
    (0..seconds * sample_rate as usize)
        .map(|i| {
            let t = i as f32 / sr;
            let drone = [220.0f32, 261.63, 329.63]
                .iter()
                .map(|f| (2.0 * std::f32::consts::PI * f * t).sin())
                .sum::<f32>()
                * 0.1;
            let click = if i % beat < 200 { 0.6 } else { 0.0 };
            drone + click
        })
        .collect()
}

fn bench_analyze_signal(c: &mut Criterion) {
    let signal = AudioSignal::new(synthetic_track(30, 44100), 44100).unwrap();
    let config = AnalysisConfig::default();
    let primitives: Arc<dyn SignalPrimitives> = Arc::new(ReferencePrimitives::new(&config));

    c.bench_function("analyze_signal_30s", |b| {
        b.iter(|| {
            let _ = analyze_signal(
                black_box(&signal),
                Arc::clone(&primitives),
                &[],
                config.clone(),
            );
        });
    });
}

fn bench_reasoners(c: &mut Criterion) {
    let chords: Vec<ChordEvent> = (0..50)
        .map(|i| ChordEvent {
            chord: songform::theory::PitchClass::from_index([0, 7, 9, 5][i % 4]),
            start_time: i as f32 * 0.5,
            end_time: (i + 1) as f32 * 0.5,
            confidence: 0.7,
        })
        .collect();
    let beats: Vec<Beat> = (0..360)
        .map(|i| Beat {
            time: i as f32 * 0.5,
            position: i + 1,
            confidence: 0.8,
        })
        .collect();

    c.bench_function("analyze_harmony_50", |b| {
        b.iter(|| analyze_harmony(black_box(&chords), "C major", 120.0));
    });
    c.bench_function("analyze_rhythm_360", |b| {
        b.iter(|| analyze_rhythm(black_box(&beats), 120.0, 180.0));
    });
}

criterion_group!(benches, bench_analyze_signal, bench_reasoners);
criterion_main!(benches);
