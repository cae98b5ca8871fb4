//! Functional harmony analysis
//!
//! Turns a chord-root progression into Roman numerals relative to the key,
//! then derives functional labels, canonical pattern matches, harmonic
//! rhythm, cadences and a complexity score.
//!
//! Chords are roots only, so every numeral comes from a 7-entry diatonic
//! table; chromatic roots collapse to the tonic numeral.

use crate::analysis::result::ChordEvent;
use crate::theory::pitch::{parse_key, Mode, PitchClass};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Diatonic Roman numeral, named by triad quality and degree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RomanNumeral {
    /// I
    #[serde(rename = "I")]
    MajorI,
    /// ii
    #[serde(rename = "ii")]
    MinorII,
    /// iii
    #[serde(rename = "iii")]
    MinorIII,
    /// IV
    #[serde(rename = "IV")]
    MajorIV,
    /// V
    #[serde(rename = "V")]
    MajorV,
    /// vi
    #[serde(rename = "vi")]
    MinorVI,
    /// vii°
    #[serde(rename = "vii°")]
    DiminishedVII,
    /// i
    #[serde(rename = "i")]
    MinorI,
    /// ii°
    #[serde(rename = "ii°")]
    DiminishedII,
    /// III
    #[serde(rename = "III")]
    MajorIII,
    /// iv
    #[serde(rename = "iv")]
    MinorIV,
    /// v
    #[serde(rename = "v")]
    MinorV,
    /// VI
    #[serde(rename = "VI")]
    MajorVI,
    /// VII
    #[serde(rename = "VII")]
    MajorVII,
}

impl RomanNumeral {
    /// Numeral for `scale_degree` semitones above the tonic in `mode`
    ///
    /// Degrees outside the diatonic table map to the tonic numeral.
    pub fn from_degree(scale_degree: u8, mode: Mode) -> Self {
        use RomanNumeral::*;
        match mode {
            Mode::Major => match scale_degree {
                2 => MinorII,
                4 => MinorIII,
                5 => MajorIV,
                7 => MajorV,
                9 => MinorVI,
                11 => DiminishedVII,
                _ => MajorI,
            },
            Mode::Minor => match scale_degree {
                2 => DiminishedII,
                3 => MajorIII,
                5 => MinorIV,
                7 => MinorV,
                8 => MajorVI,
                10 => MajorVII,
                _ => MinorI,
            },
        }
    }

    /// Conventional symbol (e.g. "vii°")
    pub fn symbol(self) -> &'static str {
        use RomanNumeral::*;
        match self {
            MajorI => "I",
            MinorII => "ii",
            MinorIII => "iii",
            MajorIV => "IV",
            MajorV => "V",
            MinorVI => "vi",
            DiminishedVII => "vii°",
            MinorI => "i",
            DiminishedII => "ii°",
            MajorIII => "III",
            MinorIV => "iv",
            MinorV => "v",
            MajorVI => "VI",
            MajorVII => "VII",
        }
    }

    /// Harmonic function from the major-key table
    ///
    /// The major table is applied whatever mode produced the numeral, so
    /// minor-mode numerals (i, iv, VI, ...) are all reported as tonic.
    pub fn function(self) -> HarmonicFunction {
        use RomanNumeral::*;
        match self {
            MinorII | MajorIV => HarmonicFunction::Subdominant,
            MinorIII | MinorVI => HarmonicFunction::TonicSubstitute,
            MajorV => HarmonicFunction::Dominant,
            DiminishedVII => HarmonicFunction::DominantSubstitute,
            _ => HarmonicFunction::Tonic,
        }
    }
}

impl fmt::Display for RomanNumeral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Tension role of a chord
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HarmonicFunction {
    /// Home (I)
    Tonic,
    /// Moves away from home (ii, IV)
    Subdominant,
    /// Pulls toward home (V)
    Dominant,
    /// Shares tones with the tonic (iii, vi)
    TonicSubstitute,
    /// Leading-tone chord (vii°)
    DominantSubstitute,
}

/// Progressions reported when they occur contiguously
pub const CANONICAL_PATTERNS: [(&str, &[RomanNumeral]); 6] = {
    use RomanNumeral::*;
    [
        ("I-V-vi-IV", &[MajorI, MajorV, MinorVI, MajorIV]),
        ("I-IV-V", &[MajorI, MajorIV, MajorV]),
        ("ii-V-I", &[MinorII, MajorV, MajorI]),
        ("I-vi-IV-V", &[MajorI, MinorVI, MajorIV, MajorV]),
        ("vi-IV-I-V", &[MinorVI, MajorIV, MajorI, MajorV]),
        ("I-V-IV", &[MajorI, MajorV, MajorIV]),
    ]
};

/// Chord re-expressed relative to the key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RomanNumeralEvent {
    /// Source chord root
    pub chord: PitchClass,
    /// Numeral relative to the key
    pub roman_numeral: RomanNumeral,
    /// Semitones above the tonic (0-11)
    pub scale_degree: u8,
    /// Start in seconds
    pub start_time: f32,
    /// End in seconds
    pub end_time: f32,
    /// Source chord confidence
    pub confidence: f32,
}

/// Functional label for one chord
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionalLabel {
    /// Numeral being labelled
    pub roman_numeral: RomanNumeral,
    /// Its function
    pub function: HarmonicFunction,
    /// Start in seconds
    pub start_time: f32,
    /// End in seconds
    pub end_time: f32,
}

/// How often the harmony changes
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct HarmonicRhythm {
    /// Mean chord length in seconds
    pub avg_chord_duration: f32,
    /// Chord changes per 4/4 bar
    pub changes_per_bar: f32,
    /// Number of chords
    pub total_chord_changes: usize,
}

/// Kind of two-chord resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CadenceType {
    /// V -> I
    Authentic,
    /// IV -> I
    Plagal,
    /// V -> vi
    Deceptive,
    /// anything -> V
    Half,
}

impl CadenceType {
    /// Fixed strength per type
    pub fn strength(self) -> f32 {
        match self {
            CadenceType::Authentic => 1.0,
            CadenceType::Plagal => 0.8,
            CadenceType::Deceptive => 0.6,
            CadenceType::Half => 0.5,
        }
    }

    /// Classify an adjacent pair, checking authentic, plagal, deceptive, half in order
    pub fn classify(from: RomanNumeral, to: RomanNumeral) -> Option<Self> {
        use RomanNumeral::*;
        match (from, to) {
            (MajorV, MajorI) => Some(CadenceType::Authentic),
            (MajorIV, MajorI) => Some(CadenceType::Plagal),
            (MajorV, MinorVI) => Some(CadenceType::Deceptive),
            (_, MajorV) => Some(CadenceType::Half),
            _ => None,
        }
    }
}

/// Detected cadence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cadence {
    /// Cadence kind
    #[serde(rename = "type")]
    pub cadence_type: CadenceType,
    /// Pair as "X-Y"
    pub progression: String,
    /// Start of the resolving chord in seconds
    pub time: f32,
    /// Strength of the cadence type
    pub strength: f32,
}

/// Voice-leading rating
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoiceLeadingQuality {
    /// Average movement under 3 semitones
    Good,
    /// Under 5 semitones
    Moderate,
    /// 5 semitones or more
    Poor,
    /// Fewer than two chords
    Unknown,
}

/// Voice-leading summary
///
/// Chords carry no voicings, so each transition is assumed to move
/// [`ASSUMED_MOVEMENT_SEMITONES`]. This is a placeholder, not an analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoiceLeading {
    /// Rating derived from the average movement
    pub quality: VoiceLeadingQuality,
    /// Average voice movement per transition
    pub avg_movement_semitones: f32,
    /// Number of chord-to-chord transitions
    pub total_transitions: usize,
}

/// Per-transition movement assumed by [`VoiceLeading`]
pub const ASSUMED_MOVEMENT_SEMITONES: f32 = 2.0;

impl VoiceLeading {
    fn for_chord_count(count: usize) -> Self {
        if count < 2 {
            return Self {
                quality: VoiceLeadingQuality::Unknown,
                avg_movement_semitones: 0.0,
                total_transitions: 0,
            };
        }
        let avg = ASSUMED_MOVEMENT_SEMITONES;
        let quality = if avg < 3.0 {
            VoiceLeadingQuality::Good
        } else if avg < 5.0 {
            VoiceLeadingQuality::Moderate
        } else {
            VoiceLeadingQuality::Poor
        };
        Self {
            quality,
            avg_movement_semitones: avg,
            total_transitions: count - 1,
        }
    }
}

/// Key change (modulation detection is not performed; always empty)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Modulation {
    /// Time of the change in seconds
    pub time: f32,
    /// Key before
    pub from_key: String,
    /// Key after
    pub to_key: String,
}

/// Full harmonic analysis of a progression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HarmonicAnalysis {
    /// Key string as given
    pub key: String,
    /// Parsed tonic
    pub key_root: PitchClass,
    /// Parsed mode
    pub key_mode: Mode,
    /// One numeral per chord
    pub roman_numerals: Vec<RomanNumeralEvent>,
    /// One label per chord
    pub functional_harmony: Vec<FunctionalLabel>,
    /// Names of canonical patterns found
    pub common_patterns: Vec<String>,
    /// Chord change rate
    pub harmonic_rhythm: HarmonicRhythm,
    /// Cadences in time order
    pub cadences: Vec<Cadence>,
    /// Voice-leading placeholder
    pub voice_leading: VoiceLeading,
    /// Always empty
    pub modulations: Vec<Modulation>,
    /// `min(unique numerals / 7, 1)`
    pub progression_complexity: f32,
}

/// Numerals for each chord relative to the key
pub fn to_roman_numerals(
    chords: &[ChordEvent],
    root: PitchClass,
    mode: Mode,
) -> Vec<RomanNumeralEvent> {
    chords
        .iter()
        .map(|chord| {
            let scale_degree = chord.chord.interval_from(root);
            RomanNumeralEvent {
                chord: chord.chord,
                roman_numeral: RomanNumeral::from_degree(scale_degree, mode),
                scale_degree,
                start_time: chord.start_time,
                end_time: chord.end_time,
                confidence: chord.confidence,
            }
        })
        .collect()
}

/// Names of the canonical patterns that occur contiguously in `numerals`
pub fn detect_patterns(numerals: &[RomanNumeral]) -> Vec<String> {
    CANONICAL_PATTERNS
        .iter()
        .filter(|(_, pattern)| numerals.windows(pattern.len()).any(|w| w == *pattern))
        .map(|(name, _)| name.to_string())
        .collect()
}

/// Mean chord length and changes per bar at `bpm`
pub fn harmonic_rhythm(chords: &[ChordEvent], bpm: f32) -> HarmonicRhythm {
    if chords.len() < 2 {
        return HarmonicRhythm {
            total_chord_changes: chords.len(),
            ..HarmonicRhythm::default()
        };
    }
    let avg = chords.iter().map(ChordEvent::duration).sum::<f32>() / chords.len() as f32;
    let seconds_per_bar = 4.0 * 60.0 / bpm;
    let changes_per_bar = if avg > 0.0 && seconds_per_bar.is_finite() {
        seconds_per_bar / avg
    } else {
        0.0
    };
    HarmonicRhythm {
        avg_chord_duration: avg,
        changes_per_bar,
        total_chord_changes: chords.len(),
    }
}

/// Cadences between adjacent chords
pub fn detect_cadences(events: &[RomanNumeralEvent]) -> Vec<Cadence> {
    events
        .windows(2)
        .filter_map(|pair| {
            let (from, to) = (&pair[0], &pair[1]);
            CadenceType::classify(from.roman_numeral, to.roman_numeral).map(|cadence_type| {
                Cadence {
                    cadence_type,
                    progression: format!("{}-{}", from.roman_numeral, to.roman_numeral),
                    time: to.start_time,
                    strength: cadence_type.strength(),
                }
            })
        })
        .collect()
}

/// `min(unique / 7, 1)`; 0 for an empty progression
pub fn progression_complexity(numerals: &[RomanNumeral]) -> f32 {
    let unique: HashSet<_> = numerals.iter().collect();
    (unique.len() as f32 / 7.0).min(1.0)
}

/// Analyze a chord progression in `key` at `bpm`
///
/// # Arguments
///
/// * `chords` - Chord events in time order
/// * `key` - Key string such as `"A minor"`; malformed input reads as C major
/// * `bpm` - Tempo used for the per-bar change rate
pub fn analyze_harmony(chords: &[ChordEvent], key: &str, bpm: f32) -> HarmonicAnalysis {
    let (key_root, key_mode) = parse_key(key);
    let roman_numerals = to_roman_numerals(chords, key_root, key_mode);
    let numerals: Vec<RomanNumeral> = roman_numerals.iter().map(|e| e.roman_numeral).collect();

    let functional_harmony = roman_numerals
        .iter()
        .map(|e| FunctionalLabel {
            roman_numeral: e.roman_numeral,
            function: e.roman_numeral.function(),
            start_time: e.start_time,
            end_time: e.end_time,
        })
        .collect();

    let analysis = HarmonicAnalysis {
        key: key.to_string(),
        key_root,
        key_mode,
        common_patterns: detect_patterns(&numerals),
        harmonic_rhythm: harmonic_rhythm(chords, bpm),
        cadences: detect_cadences(&roman_numerals),
        voice_leading: VoiceLeading::for_chord_count(chords.len()),
        modulations: Vec::new(),
        progression_complexity: progression_complexity(&numerals),
        functional_harmony,
        roman_numerals,
    };

    log::debug!(
        "Harmony: {} numerals, patterns {:?}, {} cadences",
        analysis.roman_numerals.len(),
        analysis.common_patterns,
        analysis.cadences.len()
    );
    analysis
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chords(roots: &[PitchClass]) -> Vec<ChordEvent> {
        roots
            .iter()
            .enumerate()
            .map(|(i, &chord)| ChordEvent {
                chord,
                start_time: i as f32 * 0.5,
                end_time: (i + 1) as f32 * 0.5,
                confidence: 0.7,
            })
            .collect()
    }

    fn symbols(analysis: &HarmonicAnalysis) -> Vec<&'static str> {
        analysis
            .roman_numerals
            .iter()
            .map(|e| e.roman_numeral.symbol())
            .collect()
    }

    use PitchClass::*;

    #[test]
    fn test_pop_progression() {
        let progression = chords(&[C, G, A, F, C, G, A, F]);
        let analysis = analyze_harmony(&progression, "C major", 120.0);

        assert_eq!(symbols(&analysis), vec!["I", "V", "vi", "IV", "I", "V", "vi", "IV"]);
        assert!(analysis.common_patterns.contains(&"I-V-vi-IV".to_string()));
        assert!(analysis.common_patterns.contains(&"vi-IV-I-V".to_string()));
        assert!(!analysis.common_patterns.contains(&"I-IV-V".to_string()));
        assert_eq!(analysis.roman_numerals.len(), progression.len());
        assert_eq!(analysis.functional_harmony.len(), progression.len());
        assert!((analysis.progression_complexity - 4.0 / 7.0).abs() < 1e-6);
    }

    #[test]
    fn test_scale_degrees_wrap() {
        let analysis = analyze_harmony(&chords(&[C, E]), "A minor", 120.0);
        assert_eq!(analysis.roman_numerals[0].scale_degree, 3);
        assert_eq!(analysis.roman_numerals[1].scale_degree, 7);
        assert_eq!(symbols(&analysis), vec!["III", "v"]);
    }

    #[test]
    fn test_chromatic_root_collapses_to_tonic() {
        let analysis = analyze_harmony(&chords(&[CSharp, FSharp]), "C major", 120.0);
        assert_eq!(symbols(&analysis), vec!["I", "I"]);
        let minor = analyze_harmony(&chords(&[CSharp]), "C minor", 120.0);
        assert_eq!(symbols(&minor), vec!["i"]);
    }

    #[test]
    fn test_minor_numerals_use_major_function_table() {
        let analysis = analyze_harmony(&chords(&[A, D, E]), "A minor", 120.0);
        assert_eq!(symbols(&analysis), vec!["i", "iv", "v"]);
        assert!(analysis
            .functional_harmony
            .iter()
            .all(|l| l.function == HarmonicFunction::Tonic));
    }

    #[test]
    fn test_functions_major() {
        use RomanNumeral::*;
        assert_eq!(MajorI.function(), HarmonicFunction::Tonic);
        assert_eq!(MinorII.function(), HarmonicFunction::Subdominant);
        assert_eq!(MinorIII.function(), HarmonicFunction::TonicSubstitute);
        assert_eq!(MajorIV.function(), HarmonicFunction::Subdominant);
        assert_eq!(MajorV.function(), HarmonicFunction::Dominant);
        assert_eq!(MinorVI.function(), HarmonicFunction::TonicSubstitute);
        assert_eq!(DiminishedVII.function(), HarmonicFunction::DominantSubstitute);
    }

    #[test]
    fn test_cadences() {
        // I IV I V I V vi
        let analysis = analyze_harmony(&chords(&[C, F, C, G, C, G, A]), "C major", 120.0);
        let found: Vec<(CadenceType, &str, f32)> = analysis
            .cadences
            .iter()
            .map(|c| (c.cadence_type, c.progression.as_str(), c.strength))
            .collect();
        assert_eq!(
            found,
            vec![
                (CadenceType::Plagal, "IV-I", 0.8),
                (CadenceType::Half, "I-V", 0.5),
                (CadenceType::Authentic, "V-I", 1.0),
                (CadenceType::Half, "I-V", 0.5),
                (CadenceType::Deceptive, "V-vi", 0.6),
            ]
        );
        assert_eq!(analysis.cadences[0].time, 1.0);
    }

    #[test]
    fn test_harmonic_rhythm() {
        let rhythm = harmonic_rhythm(&chords(&[C, G, A, F]), 120.0);
        // 2 s per bar at 120 BPM, 0.5 s per chord
        assert!((rhythm.avg_chord_duration - 0.5).abs() < 1e-6);
        assert!((rhythm.changes_per_bar - 4.0).abs() < 1e-5);
        assert_eq!(rhythm.total_chord_changes, 4);

        let single = harmonic_rhythm(&chords(&[C]), 120.0);
        assert_eq!(single.changes_per_bar, 0.0);
        assert_eq!(single.avg_chord_duration, 0.0);
    }

    #[test]
    fn test_empty_progression() {
        let analysis = analyze_harmony(&[], "D minor", 100.0);
        assert_eq!(analysis.key_root, D);
        assert_eq!(analysis.key_mode, Mode::Minor);
        assert!(analysis.roman_numerals.is_empty());
        assert!(analysis.cadences.is_empty());
        assert_eq!(analysis.progression_complexity, 0.0);
        assert_eq!(analysis.voice_leading.quality, VoiceLeadingQuality::Unknown);
        assert!(analysis.modulations.is_empty());
    }

    #[test]
    fn test_voice_leading_placeholder() {
        let analysis = analyze_harmony(&chords(&[C, G, A]), "C major", 120.0);
        assert_eq!(analysis.voice_leading.quality, VoiceLeadingQuality::Good);
        assert_eq!(analysis.voice_leading.total_transitions, 2);
        assert_eq!(analysis.voice_leading.avg_movement_semitones, 2.0);
    }

    #[test]
    fn test_patterns_need_contiguity() {
        use RomanNumeral::*;
        assert_eq!(detect_patterns(&[MinorII, MajorV, MajorI]), vec!["ii-V-I"]);
        assert!(detect_patterns(&[MinorII, MajorIV, MajorV, MajorI]).is_empty());
    }

    #[test]
    fn test_pure() {
        let progression = chords(&[D, G, A, D]);
        assert_eq!(
            analyze_harmony(&progression, "D major", 96.0),
            analyze_harmony(&progression, "D major", 96.0)
        );
    }

    #[test]
    fn test_serialized_symbols() {
        assert_eq!(
            serde_json::to_string(&RomanNumeral::DiminishedVII).unwrap(),
            "\"vii°\""
        );
        let cadence = Cadence {
            cadence_type: CadenceType::Authentic,
            progression: "V-I".into(),
            time: 1.0,
            strength: 1.0,
        };
        let json = serde_json::to_value(&cadence).unwrap();
        assert_eq!(json["type"], "authentic");
    }
}
