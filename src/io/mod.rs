//! Audio I/O modules
//!
//! The validated sample container handed to the pipeline, and file decoding
//! using Symphonia.

pub mod decoder;
pub mod signal;

pub use decoder::decode_file;
pub use signal::AudioSignal;
