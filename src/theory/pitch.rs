//! Pitch classes, modes and key strings

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Sharp-spelled note names, C = 0
pub const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// One of the 12 equal-tempered pitch classes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PitchClass {
    /// C
    #[serde(rename = "C")]
    C,
    /// C#
    #[serde(rename = "C#")]
    CSharp,
    /// D
    #[serde(rename = "D")]
    D,
    /// D#
    #[serde(rename = "D#")]
    DSharp,
    /// E
    #[serde(rename = "E")]
    E,
    /// F
    #[serde(rename = "F")]
    F,
    /// F#
    #[serde(rename = "F#")]
    FSharp,
    /// G
    #[serde(rename = "G")]
    G,
    /// G#
    #[serde(rename = "G#")]
    GSharp,
    /// A
    #[serde(rename = "A")]
    A,
    /// A#
    #[serde(rename = "A#")]
    ASharp,
    /// B
    #[serde(rename = "B")]
    B,
}

impl PitchClass {
    /// All pitch classes in chromatic order from C
    pub const ALL: [PitchClass; 12] = [
        PitchClass::C,
        PitchClass::CSharp,
        PitchClass::D,
        PitchClass::DSharp,
        PitchClass::E,
        PitchClass::F,
        PitchClass::FSharp,
        PitchClass::G,
        PitchClass::GSharp,
        PitchClass::A,
        PitchClass::ASharp,
        PitchClass::B,
    ];

    /// Pitch class for a chroma bin (wraps modulo 12)
    pub fn from_index(index: usize) -> Self {
        Self::ALL[index % 12]
    }

    /// Chroma bin index, C = 0
    pub fn index(self) -> usize {
        self as usize
    }

    /// Sharp-spelled name (e.g. "F#")
    pub fn name(self) -> &'static str {
        NOTE_NAMES[self.index()]
    }

    /// Semitones from `tonic` up to `self` (0-11)
    pub fn interval_from(self, tonic: PitchClass) -> u8 {
        ((self.index() + 12 - tonic.index()) % 12) as u8
    }
}

impl fmt::Display for PitchClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PitchClass {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NOTE_NAMES
            .iter()
            .position(|&name| name == s)
            .map(Self::from_index)
            .ok_or_else(|| format!("Unknown pitch class: {}", s))
    }
}

/// Key mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Major (Ionian)
    Major,
    /// Natural minor (Aeolian)
    Minor,
}

impl Mode {
    /// Lowercase name ("major" / "minor")
    pub fn name(self) -> &'static str {
        match self {
            Mode::Major => "major",
            Mode::Minor => "minor",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Parse a key string such as `"A minor"` into root and mode
///
/// Anything that does not look like `"<root> <mode>"` falls back to C major.
/// An unknown root is read as C and an unknown mode as major.
pub fn parse_key(key: &str) -> (PitchClass, Mode) {
    let mut parts = key.split_whitespace();
    let (Some(root), Some(mode)) = (parts.next(), parts.next()) else {
        return (PitchClass::C, Mode::Major);
    };

    let root = root.parse().unwrap_or(PitchClass::C);
    let mode = if mode.eq_ignore_ascii_case("minor") {
        Mode::Minor
    } else {
        Mode::Major
    };
    (root, mode)
}
