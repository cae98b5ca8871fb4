//! Section extraction

use super::bounded::Outcome;
use super::FeatureExtractor;
use crate::analysis::result::Section;
use crate::config::AnalysisConfig;
use crate::io::AudioSignal;

/// Cyclic label vocabulary; indices past the end are labelled "section"
pub const SECTION_LABELS: [&str; 8] = [
    "intro", "verse", "chorus", "verse", "chorus", "bridge", "chorus", "outro",
];

/// Confidence of sections derived from segmentation boundaries
pub const SEGMENTED_CONFIDENCE: f32 = 0.8;

/// Confidence of evenly spaced sections
pub const TIME_BASED_CONFIDENCE: f32 = 0.5;

/// Label for the section at `index`
pub fn section_label(index: usize) -> &'static str {
    SECTION_LABELS.get(index).copied().unwrap_or("section")
}

/// Number of sections for a track: `clamp(round(duration / section_secs), min, max)`
pub fn section_count(duration: f32, config: &AnalysisConfig) -> usize {
    let k = (duration / config.section_secs).round();
    let k = if k.is_finite() && k > 0.0 { k as usize } else { 0 };
    k.clamp(config.min_sections, config.max_sections)
}

/// `k` equal sections covering `[0, duration]`
pub fn time_based_sections(duration: f32, k: usize, confidence: f32) -> Vec<Section> {
    if k == 0 || !(duration.is_finite() && duration > 0.0) {
        return Vec::new();
    }
    let length = duration / k as f32;
    (0..k)
        .map(|i| Section {
            label: section_label(i).to_string(),
            start_time: i as f32 * length,
            end_time: if i + 1 == k {
                duration
            } else {
                (i + 1) as f32 * length
            },
            confidence,
        })
        .collect()
}

/// Contiguous sections between boundary times
///
/// Boundaries are clamped to `[0, duration]`; 0 and `duration` are always
/// included so the sections cover the whole track. Zero-length spans are
/// dropped.
pub fn sections_from_boundaries(
    boundaries: &[f32],
    duration: f32,
    confidence: f32,
) -> Vec<Section> {
    if !(duration.is_finite() && duration > 0.0) {
        return Vec::new();
    }
    let mut edges: Vec<f32> = boundaries
        .iter()
        .filter(|t| t.is_finite())
        .map(|t| t.clamp(0.0, duration))
        .collect();
    edges.push(0.0);
    edges.push(duration);
    edges.sort_by(f32::total_cmp);
    edges.dedup();

    edges
        .windows(2)
        .filter(|w| w[1] > w[0])
        .enumerate()
        .map(|(i, w)| Section {
            label: section_label(i).to_string(),
            start_time: w[0],
            end_time: w[1],
            confidence,
        })
        .collect()
}

impl FeatureExtractor {
    /// Segment the signal into labelled sections
    ///
    /// A segmentation timeout yields evenly spaced sections (confidence 0.5);
    /// a failure yields none.
    pub fn extract_sections(&self, signal: &AudioSignal) -> Vec<Section> {
        let duration = signal.duration();
        let k = section_count(duration, self.config());

        let sig = signal.clone();
        match self.bounded("segment_boundaries", self.config().section_timeout(), move |p| {
            p.segment_boundaries(&sig, k)
        }) {
            Outcome::Succeeded(boundaries) => {
                let sections =
                    sections_from_boundaries(&boundaries.times(), duration, SEGMENTED_CONFIDENCE);
                log::info!("Sections: {} from segmentation (k = {})", sections.len(), k);
                sections
            }
            Outcome::TimedOut => {
                log::warn!("Segmentation timed out, using {} evenly spaced sections", k);
                time_based_sections(duration, k, TIME_BASED_CONFIDENCE)
            }
            Outcome::Failed(_) => Vec::new(),
        }
    }
}
