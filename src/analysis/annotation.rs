//! JAMS annotation export
//!
//! Writes an [`AnalysisResult`] as a JAMS document (JSON Annotated Music
//! Specification) with one annotation per namespace:
//!
//! | Namespace      | Observations                         |
//! |----------------|--------------------------------------|
//! | `tempo`        | one, spanning the track              |
//! | `key_mode`     | one, value like `"C#:major"`         |
//! | `beat`         | one per beat, value = beat position  |
//! | `segment_open` | one per section, value = label       |
//! | `chord`        | one per chord, value = root name     |

use super::result::AnalysisResult;
use crate::error::AnalysisError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;

/// JAMS schema version the documents follow
pub const JAMS_VERSION: &str = "0.3.4";

/// Confidence attached to the tempo observation
pub const TEMPO_CONFIDENCE: f32 = 1.0;

/// Confidence attached to the key observation
pub const KEY_CONFIDENCE: f32 = 0.8;

/// Top-level JAMS document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JamsDocument {
    /// Track-level metadata
    pub file_metadata: FileMetadata,
    /// One annotation per namespace
    pub annotations: Vec<Annotation>,
    /// Free-form extras
    pub sandbox: Map<String, Value>,
}

/// JAMS file metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileMetadata {
    /// Track title
    pub title: String,
    /// Artist (unknown here)
    pub artist: String,
    /// Release (unknown here)
    pub release: String,
    /// Track length in seconds
    pub duration: f32,
    /// External identifiers (`file_id`)
    pub identifiers: Map<String, Value>,
    /// Schema version
    pub jams_version: String,
}

/// Observations in a single namespace
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    /// JAMS namespace
    pub namespace: String,
    /// Observations in time order
    pub data: Vec<Observation>,
    /// Provenance
    pub annotation_metadata: AnnotationMetadata,
    /// Free-form extras
    pub sandbox: Map<String, Value>,
}

/// Who produced an annotation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotationMetadata {
    /// Tool name and version
    pub annotation_tools: String,
    /// Always "automatic"
    pub data_source: String,
}

/// One timed observation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Start in seconds
    pub time: f32,
    /// Length in seconds
    pub duration: f32,
    /// Namespace-specific value
    pub value: Value,
    /// Confidence (0-1)
    pub confidence: f32,
}

impl Observation {
    fn new(time: f32, duration: f32, value: impl Into<Value>, confidence: f32) -> Self {
        Self {
            time,
            duration,
            value: value.into(),
            confidence,
        }
    }
}

fn annotation(namespace: &str, data: Vec<Observation>) -> Annotation {
    Annotation {
        namespace: namespace.to_string(),
        data,
        annotation_metadata: AnnotationMetadata {
            annotation_tools: format!("songform {}", env!("CARGO_PKG_VERSION")),
            data_source: "automatic".to_string(),
        },
        sandbox: Map::new(),
    }
}

/// Build a JAMS document for an analysis result
///
/// # Arguments
///
/// * `result` - Completed analysis
/// * `file_id` - Identifier stored under `identifiers.file_id`
/// * `title` - Track title (typically the file stem)
pub fn to_jams(result: &AnalysisResult, file_id: &str, title: &str) -> JamsDocument {
    let duration = result.duration_seconds;

    let mut identifiers = Map::new();
    identifiers.insert("file_id".to_string(), Value::from(file_id));

    let key_value = format!("{}:{}", result.key.root, result.key.mode);

    let annotations = vec![
        annotation(
            "tempo",
            vec![Observation::new(0.0, duration, result.bpm, TEMPO_CONFIDENCE)],
        ),
        annotation(
            "key_mode",
            vec![Observation::new(0.0, duration, key_value, KEY_CONFIDENCE)],
        ),
        annotation(
            "beat",
            result
                .beats
                .iter()
                .map(|b| Observation::new(b.time, 0.0, b.position, b.confidence))
                .collect(),
        ),
        annotation(
            "segment_open",
            result
                .sections
                .iter()
                .map(|s| {
                    Observation::new(s.start_time, s.duration(), s.label.as_str(), s.confidence)
                })
                .collect(),
        ),
        annotation(
            "chord",
            result
                .chords
                .iter()
                .map(|c| {
                    Observation::new(c.start_time, c.duration(), c.chord.name(), c.confidence)
                })
                .collect(),
        ),
    ];

    log::info!(
        "JAMS annotation created with {} annotation types",
        annotations.len()
    );

    JamsDocument {
        file_metadata: FileMetadata {
            title: title.to_string(),
            artist: String::new(),
            release: String::new(),
            duration,
            identifiers,
            jams_version: JAMS_VERSION.to_string(),
        },
        annotations,
        sandbox: Map::new(),
    }
}

impl JamsDocument {
    /// Annotation for `namespace`, if present
    pub fn annotation(&self, namespace: &str) -> Option<&Annotation> {
        self.annotations.iter().find(|a| a.namespace == namespace)
    }
}

/// Write a JAMS document as pretty-printed JSON
pub fn save_jams(document: &JamsDocument, path: &Path) -> Result<(), AnalysisError> {
    let json = serde_json::to_string_pretty(document)
        .map_err(|e| AnalysisError::ExportError(format!("Failed to serialize JAMS: {}", e)))?;
    std::fs::write(path, json).map_err(|e| {
        AnalysisError::ExportError(format!("Failed to write {}: {}", path.display(), e))
    })?;
    log::info!("JAMS annotation saved to {}", path.display());
    Ok(())
}
