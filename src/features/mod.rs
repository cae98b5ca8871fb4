//! Low-level signal primitives
//!
//! The extraction layer never computes numeric features itself. It calls a
//! [`SignalPrimitives`] implementation under a time budget and treats every
//! error or overrun as "unavailable". This module defines that contract, the
//! data it exchanges, and [`ReferencePrimitives`], a self-contained
//! implementation built on:
//! - Energy-flux onset envelope
//! - FFT autocorrelation tempo candidates
//! - STFT chromagram
//! - Onset-aligned beat tracking
//! - Chroma-novelty segmentation

pub mod beat_grid;
pub mod chromagram;
pub mod envelope;
pub mod periodicity;
pub mod reference;
pub mod segmentation;

pub use reference::ReferencePrimitives;

use crate::error::AnalysisError;
use crate::io::AudioSignal;

/// Operations the extraction layer needs from a signal-processing backend
///
/// Implementations may be slow, may fail, and may panic; all three are
/// handled by the caller. They must be shareable across worker threads.
pub trait SignalPrimitives: Send + Sync {
    /// Moment-to-moment onset strength
    fn onset_envelope(&self, signal: &AudioSignal) -> Result<OnsetEnvelope, AnalysisError>;

    /// Tempo hypotheses in BPM, most plausible first
    fn tempo_candidates(&self, envelope: &OnsetEnvelope) -> Result<Vec<f32>, AnalysisError>;

    /// Chroma energy over time
    fn chroma(&self, signal: &AudioSignal) -> Result<ChromaMatrix, AnalysisError>;

    /// Beat positions tracked against a fixed tempo, in envelope frames
    fn beat_frames(&self, envelope: &OnsetEnvelope, bpm: f32)
        -> Result<FrameSequence, AnalysisError>;

    /// `k` structural boundary positions (left edges, first one at 0)
    fn segment_boundaries(
        &self,
        signal: &AudioSignal,
        k: usize,
    ) -> Result<FrameSequence, AnalysisError>;
}

/// Onset strength sampled at a fixed frame rate
#[derive(Debug, Clone, PartialEq)]
pub struct OnsetEnvelope {
    /// Onset strength per frame (non-negative)
    pub values: Vec<f32>,

    /// Frames per second
    pub frame_rate: f32,
}

impl OnsetEnvelope {
    /// Number of frames
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the envelope has no frames
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// 12-bin chroma vectors over time (C = bin 0)
#[derive(Debug, Clone, PartialEq)]
pub struct ChromaMatrix {
    frames: Vec<[f32; 12]>,
    frame_rate: f32,
}

impl ChromaMatrix {
    /// Build from per-frame chroma vectors
    pub fn new(frames: Vec<[f32; 12]>, frame_rate: f32) -> Self {
        Self { frames, frame_rate }
    }

    /// Per-frame chroma vectors
    pub fn frames(&self) -> &[[f32; 12]] {
        &self.frames
    }

    /// Frames per second
    pub fn frame_rate(&self) -> f32 {
        self.frame_rate
    }

    /// Number of frames
    pub fn num_frames(&self) -> usize {
        self.frames.len()
    }

    /// Mean energy per pitch class over `frames[start..end]`
    pub fn mean_over(&self, start: usize, end: usize) -> [f32; 12] {
        let end = end.min(self.frames.len());
        let mut mean = [0.0f32; 12];
        if start >= end {
            return mean;
        }
        for frame in &self.frames[start..end] {
            for (acc, v) in mean.iter_mut().zip(frame.iter()) {
                *acc += v;
            }
        }
        let n = (end - start) as f32;
        for v in mean.iter_mut() {
            *v /= n;
        }
        mean
    }

    /// Mean chroma over the whole matrix
    pub fn mean_profile(&self) -> [f32; 12] {
        self.mean_over(0, self.frames.len())
    }
}

/// Frame indices with the rate needed to convert them to seconds
#[derive(Debug, Clone, PartialEq)]
pub struct FrameSequence {
    /// Frame indices
    pub frames: Vec<usize>,

    /// Frames per second
    pub frame_rate: f32,
}

impl FrameSequence {
    /// Frame positions in seconds
    pub fn times(&self) -> Vec<f32> {
        if self.frame_rate <= 0.0 {
            return Vec::new();
        }
        self.frames
            .iter()
            .map(|&f| f as f32 / self.frame_rate)
            .collect()
    }
}
