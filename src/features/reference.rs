//! Built-in implementation of the primitive contract

use super::beat_grid::track_beats;
use super::chromagram::compute_chroma;
use super::envelope::onset_strength;
use super::periodicity::tempo_candidates;
use super::segmentation::segment_boundaries;
use super::{ChromaMatrix, FrameSequence, OnsetEnvelope, SignalPrimitives};
use crate::config::AnalysisConfig;
use crate::error::AnalysisError;
use crate::io::AudioSignal;

/// Deterministic, dependency-light signal primitives
///
/// Good enough to drive the full pipeline on real recordings; callers with a
/// stronger backend plug in their own [`SignalPrimitives`].
#[derive(Debug, Clone)]
pub struct ReferencePrimitives {
    /// Frame size in samples
    pub frame_size: usize,
    /// Hop size in samples
    pub hop_size: usize,
    /// Reference tuning in Hz
    pub center_frequency: f32,
    /// Lowest tempo hypothesis
    pub min_candidate_bpm: f32,
    /// Highest tempo hypothesis
    pub max_candidate_bpm: f32,
    /// Number of tempo hypotheses returned
    pub max_candidates: usize,
}

impl ReferencePrimitives {
    /// Primitives using the frame parameters from `config`
    pub fn new(config: &AnalysisConfig) -> Self {
        Self {
            frame_size: config.frame_size,
            hop_size: config.hop_size,
            center_frequency: config.center_frequency,
            ..Self::default()
        }
    }
}

impl Default for ReferencePrimitives {
    fn default() -> Self {
        Self {
            frame_size: 2048,
            hop_size: 512,
            center_frequency: 440.0,
            min_candidate_bpm: 40.0,
            max_candidate_bpm: 240.0,
            max_candidates: 5,
        }
    }
}

impl SignalPrimitives for ReferencePrimitives {
    fn onset_envelope(&self, signal: &AudioSignal) -> Result<OnsetEnvelope, AnalysisError> {
        onset_strength(
            signal.samples(),
            signal.sample_rate(),
            self.frame_size,
            self.hop_size,
        )
    }

    fn tempo_candidates(&self, envelope: &OnsetEnvelope) -> Result<Vec<f32>, AnalysisError> {
        tempo_candidates(
            envelope,
            self.min_candidate_bpm,
            self.max_candidate_bpm,
            self.max_candidates,
        )
    }

    fn chroma(&self, signal: &AudioSignal) -> Result<ChromaMatrix, AnalysisError> {
        compute_chroma(
            signal.samples(),
            signal.sample_rate(),
            self.frame_size,
            self.hop_size,
            self.center_frequency,
        )
    }

    fn beat_frames(
        &self,
        envelope: &OnsetEnvelope,
        bpm: f32,
    ) -> Result<FrameSequence, AnalysisError> {
        track_beats(envelope, bpm)
    }

    fn segment_boundaries(
        &self,
        signal: &AudioSignal,
        k: usize,
    ) -> Result<FrameSequence, AnalysisError> {
        let chroma = self.chroma(signal)?;
        segment_boundaries(&chroma, k)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uses_config_frames() {
        let config = AnalysisConfig {
            frame_size: 4096,
            hop_size: 1024,
            ..AnalysisConfig::default()
        };
        let prims = ReferencePrimitives::new(&config);
        assert_eq!(prims.frame_size, 4096);
        assert_eq!(prims.hop_size, 1024);
        assert_eq!(prims.max_candidates, 5);
    }

    #[test]
    fn test_click_track_end_to_end() {
        // 10s click track at 100 BPM
        let sr = 22050u32;
        let mut samples = vec![0.0f32; sr as usize * 10];
        let interval = (0.6 * sr as f32) as usize;
        for start in (0..samples.len()).step_by(interval) {
            for i in start..(start + 400).min(samples.len()) {
                samples[i] = 0.9 * (-((i - start) as f32) / 80.0).exp();
            }
        }
        let signal = AudioSignal::new(samples, sr).unwrap();
        let prims = ReferencePrimitives::default();

        let env = prims.onset_envelope(&signal).unwrap();
        let candidates = prims.tempo_candidates(&env).unwrap();
        assert!(
            candidates.iter().any(|&c| (c - 100.0).abs() < 4.0),
            "candidates {:?}",
            candidates
        );

        let beats = prims.beat_frames(&env, 100.0).unwrap();
        assert!(beats.frames.len() >= 14 && beats.frames.len() <= 18);

        let bounds = prims.segment_boundaries(&signal, 3).unwrap();
        assert_eq!(bounds.frames.len(), 3);
        assert_eq!(bounds.frames[0], 0);
    }
}
