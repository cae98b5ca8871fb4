//! Example: Analyze a single audio file
//!
//! Usage:
//!
//! ```text
//! cargo run --example analyze_file -- <audio file> [instrument ...] [--json] [--jams <out.jams>]
//! ```

use songform::analysis::descriptors::{classify_tempo, describe_tempo};
use songform::{analyze_file, save_jams, to_jams, AnalysisConfig};
use std::path::{Path, PathBuf};

const USAGE: &str =
    "Usage: analyze_file <audio file> [instrument ...] [--json] [--jams <out.jams>]";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logger
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let path = match args.next() {
        Some(path) => PathBuf::from(path),
        None => {
            eprintln!("{}", USAGE);
            std::process::exit(1);
        }
    };

    let mut instruments = Vec::new();
    let mut json = false;
    let mut jams_path = None;
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--json" => json = true,
            "--jams" => jams_path = args.next().map(PathBuf::from),
            _ => instruments.push(arg),
        }
    }

    let result = analyze_file(&path, &instruments, AnalysisConfig::default())?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("Analysis Results:");
        println!(
            "  BPM: {:.2} ({}, {})",
            result.bpm,
            describe_tempo(result.bpm),
            classify_tempo(result.bpm)
        );
        println!("  Key: {}", result.key.label());
        println!("  Beats: {}", result.beats.len());
        for section in &result.sections {
            println!(
                "  {:>8}: {:6.1}s - {:6.1}s",
                section.label, section.start_time, section.end_time
            );
        }
        println!("  Patterns: {:?}", result.harmonic_analysis.common_patterns);
        println!(
            "  Syncopation: {:.2}, complexity: {:.2}",
            result.rhythmic_analysis.syncopation_index, result.rhythmic_analysis.complexity_score
        );
        println!("  Genre: {}", result.genre_analysis.primary_genre);
        println!("  Processing time: {:.2} ms", result.metadata.processing_time_ms);
    }

    if let Some(out) = jams_path {
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("track");
        let doc = to_jams(&result, stem, stem);
        save_jams(&doc, Path::new(&out))?;
    }

    Ok(())
}
