//! Chroma-novelty structural segmentation
//!
//! Novelty at frame `i` is the cosine distance between the mean chroma of the
//! `w` frames before `i` and the `w` frames after it. The `k - 1` strongest
//! novelty peaks that are at least `n / (2k)` frames apart become boundaries,
//! together with frame 0.

use super::{ChromaMatrix, FrameSequence};
use crate::error::AnalysisError;

/// Context on each side of a candidate boundary, in seconds
pub const NOVELTY_CONTEXT_SECS: f32 = 4.0;

const EPSILON: f32 = 1e-10;

/// Find `k` left-edge boundaries (first boundary is frame 0)
///
/// When the matrix is too short to hold `k` distinct segments the boundaries
/// are spread evenly instead.
pub fn segment_boundaries(chroma: &ChromaMatrix, k: usize) -> Result<FrameSequence, AnalysisError> {
    if k == 0 {
        return Err(AnalysisError::InvalidInput(
            "Segment count must be > 0".to_string(),
        ));
    }

    let n = chroma.num_frames();
    let frame_rate = chroma.frame_rate();

    if n < 2 * k {
        log::debug!(
            "Chroma too short for novelty segmentation ({} frames, k={}), spacing evenly",
            n,
            k
        );
        let frames = (0..k).map(|i| i * n / k).collect();
        return Ok(FrameSequence { frames, frame_rate });
    }

    let context = ((NOVELTY_CONTEXT_SECS * frame_rate).round() as usize)
        .max(1)
        .min(n / 2);
    let novelty = novelty_curve(chroma, context);

    let min_distance = (n / (2 * k)).max(1);

    let mut candidates: Vec<(usize, f32)> = (1..n - 1)
        .filter(|&i| novelty[i] > novelty[i - 1] && novelty[i] >= novelty[i + 1])
        .map(|i| (i, novelty[i]))
        .collect();
    candidates.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

    let mut chosen: Vec<usize> = vec![0];
    for (frame, _) in candidates {
        if chosen.len() == k {
            break;
        }
        if chosen.iter().all(|&c| c.abs_diff(frame) >= min_distance)
            && n - frame >= min_distance
        {
            chosen.push(frame);
        }
    }

    // Not enough novelty peaks: fill the widest gaps at their midpoints
    while chosen.len() < k {
        chosen.sort_unstable();
        let mut edges = chosen.clone();
        edges.push(n);
        let (gap_start, gap_end) = edges
            .windows(2)
            .map(|w| (w[0], w[1]))
            .max_by_key(|(a, b)| b - a)
            .unwrap_or((0, n));
        let mid = (gap_start + gap_end) / 2;
        if mid == gap_start {
            break;
        }
        chosen.push(mid);
    }

    chosen.sort_unstable();
    chosen.dedup();

    log::debug!("Novelty segmentation chose boundaries {:?}", chosen);

    Ok(FrameSequence {
        frames: chosen,
        frame_rate,
    })
}

fn novelty_curve(chroma: &ChromaMatrix, context: usize) -> Vec<f32> {
    let n = chroma.num_frames();
    (0..n)
        .map(|i| {
            if i == 0 {
                return 0.0;
            }
            let before = chroma.mean_over(i.saturating_sub(context), i);
            let after = chroma.mean_over(i, (i + context).min(n));
            1.0 - cosine_similarity(&before, &after)
        })
        .collect()
}

fn cosine_similarity(a: &[f32; 12], b: &[f32; 12]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let na: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let nb: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if na < EPSILON || nb < EPSILON {
        // Silence on either side counts as fully similar
        1.0
    } else {
        dot / (na * nb)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block_chroma(blocks: &[(usize, usize)], frame_rate: f32) -> ChromaMatrix {
        let mut frames = Vec::new();
        for &(pc, len) in blocks {
            let mut v = [0.01f32; 12];
            v[pc] = 1.0;
            frames.extend(std::iter::repeat(v).take(len));
        }
        ChromaMatrix::new(frames, frame_rate)
    }

    #[test]
    fn test_finds_block_changes() {
        // Three 20-second blocks at 10 fps
        let chroma = block_chroma(&[(0, 200), (7, 200), (9, 200)], 10.0);
        let bounds = segment_boundaries(&chroma, 3).unwrap();

        assert_eq!(bounds.frames.len(), 3);
        assert_eq!(bounds.frames[0], 0);
        assert!(bounds.frames[1].abs_diff(200) <= 2, "{:?}", bounds.frames);
        assert!(bounds.frames[2].abs_diff(400) <= 2, "{:?}", bounds.frames);
    }

    #[test]
    fn test_uniform_input_still_returns_k() {
        let chroma = block_chroma(&[(4, 300)], 10.0);
        let bounds = segment_boundaries(&chroma, 4).unwrap();
        assert_eq!(bounds.frames.len(), 4);
        assert!(bounds.frames.windows(2).all(|w| w[1] > w[0]));
    }

    #[test]
    fn test_short_input_spaced_evenly() {
        let chroma = block_chroma(&[(0, 5)], 10.0);
        let bounds = segment_boundaries(&chroma, 3).unwrap();
        assert_eq!(bounds.frames, vec![0, 1, 3]);
    }

    #[test]
    fn test_zero_k_rejected() {
        let chroma = block_chroma(&[(0, 50)], 10.0);
        assert!(segment_boundaries(&chroma, 0).is_err());
    }
}
