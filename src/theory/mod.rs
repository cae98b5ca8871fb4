//! Music-theory reasoning over extracted features
//!
//! Pure functions of their inputs, no audio involved:
//! - Pitch classes, modes and key parsing
//! - Roman-numeral harmony, cadences and patterns
//! - Syncopation and rhythmic complexity
//! - Template-based genre ranking

pub mod genre;
pub mod harmony;
pub mod pitch;
pub mod rhythm;

pub use genre::{classify_genre, GenreAnalysis};
pub use harmony::{analyze_harmony, HarmonicAnalysis};
pub use pitch::{Mode, PitchClass};
pub use rhythm::{analyze_rhythm, RhythmicAnalysis};
