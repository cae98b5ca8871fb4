//! Autocorrelation-based tempo candidates
//!
//! Finds periodicity in the onset envelope using FFT-accelerated autocorrelation.
//!
//! # Algorithm
//!
//! 1. Remove the envelope mean
//! 2. Compute autocorrelation using FFT acceleration: `ACF = IFFT(|FFT(signal)|²)`
//! 3. Find local maxima inside the lag range implied by the BPM range
//! 4. Refine each peak with parabolic interpolation
//! 5. Convert lag values to BPM: `BPM = 60 * frame_rate / lag`
//!
//! # Reference
//!
//! Ellis, D. P. W., & Pikrakis, A. (2006). Real-time Beat Induction.
//! *Proceedings of the International Conference on Music Information Retrieval*.

use super::OnsetEnvelope;
use crate::error::AnalysisError;
use rustfft::num_complex::Complex;
use rustfft::FftPlanner;

const EPSILON: f32 = 1e-10;

/// Estimate tempo candidates from an onset envelope
///
/// # Arguments
///
/// * `envelope` - Onset envelope
/// * `min_bpm` / `max_bpm` - Search range
/// * `max_candidates` - Maximum number of candidates returned
///
/// # Returns
///
/// BPM candidates ordered by autocorrelation strength (strongest first)
///
/// # Errors
///
/// `NumericalError` when the envelope carries no periodic energy (silence,
/// constant input), `InvalidInput` for an unusable range or frame rate.
pub fn tempo_candidates(
    envelope: &OnsetEnvelope,
    min_bpm: f32,
    max_bpm: f32,
    max_candidates: usize,
) -> Result<Vec<f32>, AnalysisError> {
    if min_bpm <= 0.0 || max_bpm <= 0.0 || min_bpm >= max_bpm {
        return Err(AnalysisError::InvalidInput(format!(
            "Invalid BPM range: [{:.1}, {:.1}]",
            min_bpm, max_bpm
        )));
    }

    if envelope.frame_rate <= 0.0 {
        return Err(AnalysisError::InvalidInput(format!(
            "Invalid envelope frame rate: {}",
            envelope.frame_rate
        )));
    }

    let lag_min = ((60.0 * envelope.frame_rate) / max_bpm).ceil().max(1.0) as usize;
    let lag_max = ((60.0 * envelope.frame_rate) / min_bpm).floor() as usize;

    if envelope.len() <= lag_max + 1 {
        return Err(AnalysisError::ProcessingError(format!(
            "Envelope too short for tempo estimation: {} frames, need > {}",
            envelope.len(),
            lag_max + 1
        )));
    }

    let mean = envelope.values.iter().sum::<f32>() / envelope.len() as f32;
    let centered: Vec<f32> = envelope.values.iter().map(|&v| v - mean).collect();

    let acf = autocorrelation_fft(&centered);
    if acf[0] <= EPSILON {
        return Err(AnalysisError::NumericalError(
            "Onset envelope has no energy".to_string(),
        ));
    }

    let mut peaks: Vec<(f32, f32)> = Vec::new();
    for lag in lag_min.max(1)..=lag_max {
        let (prev, cur, next) = (acf[lag - 1], acf[lag], acf[lag + 1]);
        if cur > prev && cur >= next && cur > EPSILON {
            // Parabolic interpolation around the discrete peak
            let denom = prev - 2.0 * cur + next;
            let offset = if denom.abs() > EPSILON {
                (0.5 * (prev - next) / denom).clamp(-0.5, 0.5)
            } else {
                0.0
            };
            let refined_lag = lag as f32 + offset;
            peaks.push((60.0 * envelope.frame_rate / refined_lag, cur));
        }
    }

    if peaks.is_empty() {
        // Monotone ACF inside the range: fall back to the strongest lag
        let (best_lag, best_value) = (lag_min..=lag_max)
            .map(|lag| (lag, acf[lag]))
            .fold((lag_min, f32::MIN), |best, cur| {
                if cur.1 > best.1 {
                    cur
                } else {
                    best
                }
            });
        if best_value <= EPSILON {
            return Err(AnalysisError::NumericalError(
                "No periodicity found in onset envelope".to_string(),
            ));
        }
        peaks.push((60.0 * envelope.frame_rate / best_lag as f32, best_value));
    }

    peaks.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    peaks.truncate(max_candidates.max(1));

    log::debug!(
        "Autocorrelation found {} tempo candidates (best {:.2} BPM)",
        peaks.len(),
        peaks[0].0
    );

    Ok(peaks.into_iter().map(|(bpm, _)| bpm).collect())
}

/// Compute autocorrelation using FFT acceleration
///
/// Uses the identity: ACF = IFFT(|FFT(signal)|²), zero-padded to avoid
/// circular wrap-around.
fn autocorrelation_fft(signal: &[f32]) -> Vec<f32> {
    let n = signal.len();
    let fft_size = (2 * n).next_power_of_two();

    let mut buffer: Vec<Complex<f32>> = signal.iter().map(|&x| Complex::new(x, 0.0)).collect();
    buffer.resize(fft_size, Complex::new(0.0, 0.0));

    let mut planner = FftPlanner::new();
    let fft = planner.plan_fft_forward(fft_size);
    fft.process(&mut buffer);

    for x in &mut buffer {
        *x = *x * x.conj();
    }

    let ifft = planner.plan_fft_inverse(fft_size);
    ifft.process(&mut buffer);

    let scale = 1.0 / fft_size as f32;
    buffer[..n].iter().map(|x| x.re * scale).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Impulse train envelope at `bpm`
    fn impulse_envelope(bpm: f32, frame_rate: f32, seconds: f32) -> OnsetEnvelope {
        let n = (seconds * frame_rate) as usize;
        let period = 60.0 * frame_rate / bpm;
        let mut values = vec![0.0f32; n];
        let mut t = 0.0f32;
        while (t.round() as usize) < n {
            values[t.round() as usize] = 1.0;
            t += period;
        }
        OnsetEnvelope { values, frame_rate }
    }

    #[test]
    fn test_detects_120_bpm() {
        let env = impulse_envelope(120.0, 100.0, 20.0);
        let candidates = tempo_candidates(&env, 40.0, 240.0, 5).unwrap();
        assert!(!candidates.is_empty());
        // The strongest peak is the beat period or one of its octaves
        let best = candidates[0];
        let octave_ok = [60.0, 120.0, 240.0]
            .iter()
            .any(|&target| (best - target).abs() < 3.0);
        assert!(octave_ok, "unexpected best candidate {:.2}", best);
        assert!(candidates.iter().any(|&c| (c - 120.0).abs() < 3.0));
    }

    #[test]
    fn test_flat_envelope_is_error() {
        let env = OnsetEnvelope {
            values: vec![0.0; 2000],
            frame_rate: 100.0,
        };
        assert!(matches!(
            tempo_candidates(&env, 40.0, 240.0, 5),
            Err(AnalysisError::NumericalError(_))
        ));
    }

    #[test]
    fn test_short_envelope_is_error() {
        let env = OnsetEnvelope {
            values: vec![1.0, 0.0, 1.0],
            frame_rate: 100.0,
        };
        assert!(tempo_candidates(&env, 40.0, 240.0, 5).is_err());
    }

    #[test]
    fn test_invalid_range() {
        let env = impulse_envelope(120.0, 100.0, 10.0);
        assert!(tempo_candidates(&env, 180.0, 60.0, 5).is_err());
    }
}
