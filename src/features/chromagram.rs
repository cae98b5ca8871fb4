//! STFT chromagram
//!
//! Hann-windowed STFT magnitudes folded onto 12 pitch classes using
//! 12-TET relative to the reference tuning:
//!
//! ```text
//! semitones_from_a = 12 * log2(freq / center_frequency)
//! pitch_class      = (round(semitones_from_a) + 9) mod 12   // C = 0
//! ```
//!
//! Only bins between [`MIN_FREQ`] and [`MAX_FREQ`] contribute; below that bass
//! rumble dominates, above it harmonics swamp the fundamentals.

use super::ChromaMatrix;
use crate::error::AnalysisError;
use rustfft::num_complex::Complex;
use rustfft::FftPlanner;
use std::f32::consts::PI;

/// Lowest frequency mapped to a pitch class (~C2)
pub const MIN_FREQ: f32 = 65.0;

/// Highest frequency mapped to a pitch class
pub const MAX_FREQ: f32 = 2000.0;

/// Compute per-frame chroma vectors
///
/// # Arguments
///
/// * `samples` - Mono samples
/// * `sample_rate` - Sample rate in Hz
/// * `frame_size` - FFT size
/// * `hop_size` - Hop between frames
/// * `center_frequency` - Reference A4 frequency in Hz
///
/// # Returns
///
/// Chroma matrix at `sample_rate / hop_size` frames per second. Each frame
/// holds summed magnitudes per pitch class (not normalized).
pub fn compute_chroma(
    samples: &[f32],
    sample_rate: u32,
    frame_size: usize,
    hop_size: usize,
    center_frequency: f32,
) -> Result<ChromaMatrix, AnalysisError> {
    if frame_size == 0 || hop_size == 0 {
        return Err(AnalysisError::InvalidInput(
            "Frame size and hop size must be > 0".to_string(),
        ));
    }
    if sample_rate == 0 || center_frequency <= 0.0 {
        return Err(AnalysisError::InvalidInput(format!(
            "Invalid sample rate ({}) or center frequency ({})",
            sample_rate, center_frequency
        )));
    }

    let bin_to_pitch_class: Vec<Option<usize>> = (0..frame_size / 2 + 1)
        .map(|bin| {
            let freq = bin as f32 * sample_rate as f32 / frame_size as f32;
            if !(MIN_FREQ..=MAX_FREQ).contains(&freq) {
                None
            } else {
                let semitones_from_a = 12.0 * (freq / center_frequency).log2();
                let pc = (semitones_from_a.round() as i32 + 9).rem_euclid(12);
                Some(pc as usize)
            }
        })
        .collect();

    let window: Vec<f32> = (0..frame_size)
        .map(|i| 0.5 * (1.0 - (2.0 * PI * i as f32 / (frame_size - 1).max(1) as f32).cos()))
        .collect();

    let num_frames = if samples.len() >= frame_size {
        (samples.len() - frame_size) / hop_size + 1
    } else {
        1
    };

    log::debug!(
        "Extracting chroma: {} samples at {} Hz, {} frames",
        samples.len(),
        sample_rate,
        num_frames
    );

    let mut planner = FftPlanner::new();
    let fft = planner.plan_fft_forward(frame_size);
    let mut buffer = vec![Complex::new(0.0f32, 0.0); frame_size];
    let mut frames = Vec::with_capacity(num_frames);

    for frame_idx in 0..num_frames {
        let start = frame_idx * hop_size;
        for (i, slot) in buffer.iter_mut().enumerate() {
            let s = samples.get(start + i).copied().unwrap_or(0.0);
            *slot = Complex::new(s * window[i], 0.0);
        }

        fft.process(&mut buffer);

        let mut chroma = [0.0f32; 12];
        for (bin, pc) in bin_to_pitch_class.iter().enumerate() {
            if let Some(pc) = pc {
                chroma[*pc] += buffer[bin].norm();
            }
        }
        frames.push(chroma);
    }

    Ok(ChromaMatrix::new(
        frames,
        sample_rate as f32 / hop_size as f32,
    ))
}
