//! Human-readable tempo and key descriptors

/// Plain-language tempo description
pub fn describe_tempo(bpm: f32) -> &'static str {
    if bpm < 60.0 {
        "very slow"
    } else if bpm < 80.0 {
        "slow"
    } else if bpm < 120.0 {
        "moderate"
    } else if bpm < 140.0 {
        "fast"
    } else if bpm < 180.0 {
        "very fast"
    } else {
        "extremely fast"
    }
}

/// Italian tempo marking
pub fn classify_tempo(bpm: f32) -> &'static str {
    if bpm < 60.0 {
        "largo"
    } else if bpm < 80.0 {
        "adagio"
    } else if bpm < 108.0 {
        "andante"
    } else if bpm < 120.0 {
        "moderato"
    } else if bpm < 168.0 {
        "allegro"
    } else {
        "presto"
    }
}

/// Mode word of a key string: "unknown", "minor" or "major"
pub fn key_mode_of(key: &str) -> &'static str {
    if key.is_empty() || key == "unknown" {
        "unknown"
    } else if key.to_lowercase().contains("minor") {
        "minor"
    } else {
        "major"
    }
}
