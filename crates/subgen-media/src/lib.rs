#![deny(unreachable_patterns)]
//! Media probing, input admission, and segmentation (C3 and C4).
//!
//! This crate treats `ffmpeg`/`ffprobe` as the opaque external
//! media-segmenter tool: it shells out, parses textual/JSON output, and
//! never decodes or re-encodes frames itself beyond stream-copy extraction.

pub mod command;
pub mod error;
pub mod probe;
pub mod progress;
pub mod segment;
pub mod validate;

pub use command::{FfmpegCommand, FfmpegRunner};
pub use error::{MediaError, MediaResult};
pub use probe::probe_media;
pub use progress::{FfmpegProgress, ProgressCallback};
pub use segment::segment_media;
pub use validate::admit;
