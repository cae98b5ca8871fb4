//! Rule-based genre classification
//!
//! Every genre template is scored by the same table of weighted rules:
//!
//! | Rule            | Contribution                                    |
//! |-----------------|-------------------------------------------------|
//! | progression     | +0.3 per detected pattern the genre uses        |
//! | tempo           | +0.2 if BPM is inside the genre range           |
//! | instrumentation | +0.3 x share of the genre's instruments present |
//! | complexity      | +0.2 if within 0.2 of the genre's complexity    |
//!
//! Scores are capped at 1.0. Ties keep template order.

use crate::theory::harmony::HarmonicAnalysis;
use crate::theory::rhythm::RhythmicAnalysis;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Number of ranked predictions returned
pub const MAX_PREDICTIONS: usize = 5;

/// Conventions of one genre
#[derive(Debug, Clone, PartialEq)]
pub struct GenreTemplate {
    /// Genre name
    pub name: &'static str,
    /// Canonical progressions typical for the genre
    pub common_progressions: &'static [&'static str],
    /// Inclusive tempo range in BPM
    pub bpm_range: (f32, f32),
    /// Expected stems / instruments
    pub instrumentation: &'static [&'static str],
    /// Expected rhythmic complexity score
    pub rhythmic_complexity: f32,
    /// Typical form
    pub typical_structure: &'static str,
}

/// Built-in genre templates, in tie-break order
pub static GENRE_TEMPLATES: [GenreTemplate; 6] = [
    GenreTemplate {
        name: "pop",
        common_progressions: &["I-V-vi-IV", "vi-IV-I-V", "I-IV-V"],
        bpm_range: (100.0, 130.0),
        instrumentation: &["drums", "bass", "guitar", "vocals", "synth"],
        rhythmic_complexity: 0.3,
        typical_structure: "verse-chorus-verse-chorus-bridge-chorus",
    },
    GenreTemplate {
        name: "rock",
        common_progressions: &["I-IV-V", "I-V-vi-IV", "I-V-IV"],
        bpm_range: (110.0, 150.0),
        instrumentation: &["drums", "bass", "guitar", "vocals"],
        rhythmic_complexity: 0.4,
        typical_structure: "intro-verse-chorus-verse-chorus-bridge-chorus-outro",
    },
    GenreTemplate {
        name: "jazz",
        common_progressions: &["ii-V-I", "I-vi-ii-V"],
        bpm_range: (80.0, 180.0),
        instrumentation: &["drums", "bass", "piano", "saxophone"],
        rhythmic_complexity: 0.7,
        typical_structure: "head-solo-head",
    },
    GenreTemplate {
        name: "edm",
        common_progressions: &["I-V-vi-IV", "vi-IV-I-V"],
        bpm_range: (120.0, 140.0),
        instrumentation: &["drums", "bass", "synth"],
        rhythmic_complexity: 0.3,
        typical_structure: "intro-buildup-drop-verse-buildup-drop-outro",
    },
    GenreTemplate {
        name: "hip-hop",
        common_progressions: &["i-VI-III-VII", "i-iv-VI-V"],
        bpm_range: (60.0, 100.0),
        instrumentation: &["drums", "bass", "vocals"],
        rhythmic_complexity: 0.5,
        typical_structure: "intro-verse-hook-verse-hook-bridge-hook-outro",
    },
    GenreTemplate {
        name: "country",
        common_progressions: &["I-IV-V", "I-V-vi-IV"],
        bpm_range: (90.0, 130.0),
        instrumentation: &["drums", "bass", "guitar", "vocals"],
        rhythmic_complexity: 0.3,
        typical_structure: "verse-chorus-verse-chorus-bridge-chorus",
    },
];

/// Observations the rules are evaluated against
#[derive(Debug, Clone)]
pub struct GenreEvidence<'a> {
    /// Canonical patterns found in the harmony
    pub patterns: &'a [String],
    /// Tempo in BPM
    pub bpm: f32,
    /// Rhythmic complexity score
    pub complexity: f32,
    /// Detected instruments
    pub instruments: HashSet<&'a str>,
}

/// Score contribution of one rule with its explanations
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleScore {
    /// Added to the genre score
    pub score: f32,
    /// Human-readable reasons
    pub reasons: Vec<String>,
}

/// A weighted predicate over a template and the evidence
pub type GenreRule = fn(&GenreTemplate, &GenreEvidence<'_>) -> RuleScore;

/// Rules applied to every template, in reason order
pub const GENRE_RULES: [GenreRule; 4] = [
    progression_rule,
    tempo_rule,
    instrumentation_rule,
    complexity_rule,
];

/// +0.3 per detected pattern listed by the template
pub fn progression_rule(template: &GenreTemplate, evidence: &GenreEvidence<'_>) -> RuleScore {
    let matched: Vec<&String> = evidence
        .patterns
        .iter()
        .filter(|p| template.common_progressions.contains(&p.as_str()))
        .collect();
    RuleScore {
        score: 0.3 * matched.len() as f32,
        reasons: matched
            .iter()
            .map(|p| format!("Uses {} progression", p))
            .collect(),
    }
}

/// +0.2 inside the template tempo range (inclusive)
///
/// The reason always prints the tempo with a decimal point (`122.0`, `92.35`).
pub fn tempo_rule(template: &GenreTemplate, evidence: &GenreEvidence<'_>) -> RuleScore {
    let (lo, hi) = template.bpm_range;
    if (lo..=hi).contains(&evidence.bpm) {
        RuleScore {
            score: 0.2,
            reasons: vec![format!("BPM {:?} matches genre range", evidence.bpm)],
        }
    } else {
        RuleScore::default()
    }
}

/// +0.3 x the share of template instruments detected
///
/// Only overlaps above 50% are mentioned in the reasons.
pub fn instrumentation_rule(template: &GenreTemplate, evidence: &GenreEvidence<'_>) -> RuleScore {
    let expected: HashSet<&str> = template.instrumentation.iter().copied().collect();
    if expected.is_empty() {
        return RuleScore::default();
    }
    let present = expected.intersection(&evidence.instruments).count();
    let overlap = present as f32 / expected.len() as f32;
    let reasons = if overlap > 0.5 {
        vec![format!(
            "Instrumentation matches ({}%)",
            (overlap * 100.0) as u32
        )]
    } else {
        Vec::new()
    };
    RuleScore {
        score: 0.3 * overlap,
        reasons,
    }
}

/// +0.2 when complexity is within 0.2 of the template's
pub fn complexity_rule(template: &GenreTemplate, evidence: &GenreEvidence<'_>) -> RuleScore {
    if (evidence.complexity - template.rhythmic_complexity).abs() < 0.2 {
        RuleScore {
            score: 0.2,
            reasons: vec!["Rhythmic complexity matches".to_string()],
        }
    } else {
        RuleScore::default()
    }
}

/// One ranked genre
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenrePrediction {
    /// Genre name
    pub genre: String,
    /// Score in [0, 1]
    pub confidence: f32,
    /// Rules that contributed
    pub reasons: Vec<String>,
    /// Typical form of the genre
    pub typical_structure: String,
}

/// Ranked genre predictions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenreAnalysis {
    /// Up to five predictions, best first
    pub predicted_genres: Vec<GenrePrediction>,
    /// Best genre, or "unknown" when nothing scored
    pub primary_genre: String,
}

/// Score one template against the evidence
pub fn score_template(template: &GenreTemplate, evidence: &GenreEvidence<'_>) -> GenrePrediction {
    let total = GENRE_RULES
        .iter()
        .map(|rule| rule(template, evidence))
        .fold(RuleScore::default(), |mut acc, part| {
            acc.score += part.score;
            acc.reasons.extend(part.reasons);
            acc
        });

    GenrePrediction {
        genre: template.name.to_string(),
        confidence: total.score.min(1.0),
        reasons: total.reasons,
        typical_structure: template.typical_structure.to_string(),
    }
}

/// Rank the built-in genres for a track
///
/// # Arguments
///
/// * `harmonic` - Harmonic analysis (patterns)
/// * `rhythmic` - Rhythmic analysis (tempo, complexity)
/// * `instrumentation` - Detected instruments or stem names
pub fn classify_genre(
    harmonic: &HarmonicAnalysis,
    rhythmic: &RhythmicAnalysis,
    instrumentation: &[String],
) -> GenreAnalysis {
    let evidence = GenreEvidence {
        patterns: &harmonic.common_patterns,
        bpm: rhythmic.bpm,
        complexity: rhythmic.complexity_score,
        instruments: instrumentation.iter().map(String::as_str).collect(),
    };

    let mut predictions: Vec<GenrePrediction> = GENRE_TEMPLATES
        .iter()
        .map(|template| score_template(template, &evidence))
        .collect();
    predictions.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    predictions.truncate(MAX_PREDICTIONS);

    let primary_genre = predictions
        .first()
        .filter(|p| p.confidence > 0.0)
        .map(|p| p.genre.clone())
        .unwrap_or_else(|| "unknown".to_string());

    log::debug!(
        "Genre: primary {} ({} candidates)",
        primary_genre,
        predictions.len()
    );

    GenreAnalysis {
        predicted_genres: predictions,
        primary_genre,
    }
}
