//! Energy flux onset envelope
//!
//! Algorithm:
//! 1. Divide audio into overlapping frames (frame_size, hop_size)
//! 2. Compute RMS energy per frame
//! 3. Half-wave rectified energy derivative: E_flux[n] = max(0, E[n] - E[n-1])
//! 4. Normalize to a peak of 1.0
//!
//! # Reference
//!
//! Bello, J. P., Daudet, L., Abdallah, S., Duxbury, C., Davies, M., & Sandler, M. B. (2005).
//! A Tutorial on Onset Detection in Music Signals.
//! *IEEE Transactions on Speech and Audio Processing*, 13(5), 1035-1047.

use super::OnsetEnvelope;
use crate::error::AnalysisError;

/// Numerical stability epsilon
const EPSILON: f32 = 1e-10;

/// Compute the energy-flux onset envelope
///
/// # Arguments
///
/// * `samples` - Mono samples
/// * `sample_rate` - Sample rate in Hz
/// * `frame_size` - Frame size (typically 2048)
/// * `hop_size` - Hop size (typically 512)
///
/// # Returns
///
/// One value per frame; frame 0 is always 0.0. A signal shorter than one frame
/// is analysed as a single zero-padded frame.
pub fn onset_strength(
    samples: &[f32],
    sample_rate: u32,
    frame_size: usize,
    hop_size: usize,
) -> Result<OnsetEnvelope, AnalysisError> {
    if frame_size == 0 || hop_size == 0 {
        return Err(AnalysisError::InvalidInput(
            "Frame size and hop size must be > 0".to_string(),
        ));
    }

    if sample_rate == 0 {
        return Err(AnalysisError::InvalidInput(
            "Invalid sample rate: 0".to_string(),
        ));
    }

    let frame_rate = sample_rate as f32 / hop_size as f32;

    let num_frames = if samples.len() >= frame_size {
        (samples.len() - frame_size) / hop_size + 1
    } else {
        1
    };

    log::debug!(
        "Onset envelope: {} samples, frame={}, hop={}, {} frames",
        samples.len(),
        frame_size,
        hop_size,
        num_frames
    );

    let energies: Vec<f32> = (0..num_frames)
        .map(|i| {
            let start = (i * hop_size).min(samples.len());
            let end = (start + frame_size).min(samples.len());
            let sum_sq: f32 = samples[start..end].iter().map(|&x| x * x).sum();
            (sum_sq / frame_size as f32).sqrt()
        })
        .collect();

    let mut values = Vec::with_capacity(num_frames);
    values.push(0.0);
    values.extend(energies.windows(2).map(|w| (w[1] - w[0]).max(0.0)));

    let max_flux = values.iter().copied().fold(0.0f32, f32::max);
    if max_flux > EPSILON {
        for v in values.iter_mut() {
            *v /= max_flux;
        }
    }

    Ok(OnsetEnvelope { values, frame_rate })
}
