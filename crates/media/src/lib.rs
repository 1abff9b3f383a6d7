//! Audio download and speech-to-text for social-video URLs.

pub mod cleanup;
pub mod error;
pub mod fetch;
pub mod job;
pub mod transcribe;

pub use error::MediaError;
pub use fetch::{MediaFetcher, YtDlpFetcher};
pub use job::{read_url_list, run_batch, BatchSummary, JobOptions, JobOutcome, TranscriptionJob};
pub use transcribe::{Transcriber, Transcription, WhisperModel};
