//! Key estimation by Krumhansl-Schmuckler profile correlation
//!
//! The time-averaged chroma (normalized to sum 1) is correlated (Pearson)
//! against the major and minor key profiles rotated to each of the 12 roots.
//! The best of the 24 hypotheses wins; ties keep the earliest hypothesis in
//! C major, C minor, C# major, ... order.
//!
//! # Reference
//!
//! Krumhansl, C. L., & Kessler, E. J. (1982). Tracing the Dynamic Changes in
//! Perceived Tonal Organization in a Spatial Representation of Musical Keys.
//! *Psychological Review*, 89(4), 334-368.

use super::bounded::Outcome;
use super::FeatureExtractor;
use crate::analysis::result::KeyEstimate;
use crate::io::AudioSignal;
use crate::theory::pitch::{Mode, PitchClass};

/// Krumhansl-Kessler major profile (C major)
pub const MAJOR_PROFILE: [f32; 12] = [
    6.35, 2.23, 3.48, 2.33, 4.38, 4.09, 2.52, 5.19, 2.39, 3.66, 2.29, 2.88,
];

/// Krumhansl-Kessler minor profile (C minor)
pub const MINOR_PROFILE: [f32; 12] = [
    6.33, 2.68, 3.52, 5.38, 2.60, 3.53, 2.54, 4.75, 3.98, 2.69, 3.34, 3.17,
];

/// Scale to sum 1 (an all-zero vector is returned unchanged)
fn normalize_sum(v: &[f32; 12]) -> [f32; 12] {
    let sum: f32 = v.iter().sum();
    if sum <= 0.0 || !sum.is_finite() {
        return *v;
    }
    v.map(|x| x / sum)
}

/// Profile transposed so its tonic sits on `root`
fn rotate(profile: &[f32; 12], root: usize) -> [f32; 12] {
    std::array::from_fn(|j| profile[(j + 12 - root) % 12])
}

/// Pearson correlation; NaN when either side has zero variance
pub fn pearson_correlation(x: &[f32], y: &[f32]) -> f32 {
    let n = x.len().min(y.len());
    if n == 0 {
        return f32::NAN;
    }
    let mean_x = x[..n].iter().sum::<f32>() / n as f32;
    let mean_y = y[..n].iter().sum::<f32>() / n as f32;

    let mut cov = 0.0f32;
    let mut var_x = 0.0f32;
    let mut var_y = 0.0f32;
    for (a, b) in x[..n].iter().zip(&y[..n]) {
        let dx = a - mean_x;
        let dy = b - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }
    cov / (var_x * var_y).sqrt()
}

/// Score all 24 keys against a chroma profile and return the best one
pub fn estimate_key(chroma_profile: &[f32; 12]) -> KeyEstimate {
    let observed = normalize_sum(chroma_profile);
    let major = normalize_sum(&MAJOR_PROFILE);
    let minor = normalize_sum(&MINOR_PROFILE);

    let mut best = KeyEstimate::default();
    let mut best_score = f32::NEG_INFINITY;

    for root in 0..12 {
        for (mode, profile) in [(Mode::Major, &major), (Mode::Minor, &minor)] {
            let mut score = pearson_correlation(&observed, &rotate(profile, root));
            if !score.is_finite() {
                score = 0.0;
            }
            if score > best_score {
                best_score = score;
                best = KeyEstimate::new(PitchClass::from_index(root), mode);
            }
        }
    }

    log::debug!("Key correlation best: {} (r = {:.3})", best.label(), best_score);
    best
}

impl FeatureExtractor {
    /// Estimate the key from time-averaged chroma
    ///
    /// Falls back to C major when chroma is unavailable.
    pub fn extract_key(&self, signal: &AudioSignal) -> KeyEstimate {
        let sig = signal.clone();
        match self.bounded("key_chroma", self.config().chroma_timeout(), move |p| {
            p.chroma(&sig)
        }) {
            Outcome::Succeeded(chroma) => {
                let key = estimate_key(&chroma.mean_profile());
                log::info!("Key: {} ({} Hz)", key.label(), key.tuning_hz);
                key
            }
            _ => {
                log::warn!("Chroma unavailable, key defaults to C major");
                KeyEstimate::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profiles_pick_their_own_key() {
        assert_eq!(estimate_key(&MAJOR_PROFILE).label(), "C major");
        assert_eq!(estimate_key(&MINOR_PROFILE).label(), "C minor");
        assert_eq!(estimate_key(&rotate(&MAJOR_PROFILE, 7)).label(), "G major");
        assert_eq!(estimate_key(&rotate(&MINOR_PROFILE, 9)).label(), "A minor");
    }

    #[test]
    fn test_triad_energy() {
        // D major triad: D, F#, A
        let mut chroma = [0.05f32; 12];
        chroma[2] = 1.0;
        chroma[6] = 0.8;
        chroma[9] = 0.9;
        let key = estimate_key(&chroma);
        assert_eq!(key.root, PitchClass::D);
        assert_eq!(key.mode, Mode::Major);
    }

    #[test]
    fn test_silence_is_c_major() {
        let key = estimate_key(&[0.0; 12]);
        assert_eq!(key, KeyEstimate::default());
        assert_eq!(key.tuning_hz, 440.0);
    }

    #[test]
    fn test_rotation() {
        let rotated = rotate(&MAJOR_PROFILE, 2);
        assert_eq!(rotated[2], MAJOR_PROFILE[0]);
        assert_eq!(rotated[1], MAJOR_PROFILE[11]);
    }

    #[test]
    fn test_pearson() {
        assert!((pearson_correlation(&[1.0, 2.0, 3.0], &[2.0, 4.0, 6.0]) - 1.0).abs() < 1e-6);
        assert!((pearson_correlation(&[1.0, 2.0, 3.0], &[3.0, 2.0, 1.0]) + 1.0).abs() < 1e-6);
        assert!(pearson_correlation(&[1.0, 1.0, 1.0], &[1.0, 2.0, 3.0]).is_nan());
    }
}
