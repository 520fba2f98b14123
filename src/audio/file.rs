use anyhow::{Context, Result};
use hound::WavReader;
use std::path::Path;
use tracing::debug;

/// Header information of a WAV file
pub struct AudioFile {
    pub path: String,
    pub duration_seconds: f64,
    pub sample_rate: u32,
    pub channels: u16,
}

impl AudioFile {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let reader = WavReader::open(path)
            .with_context(|| format!("Failed to open WAV file: {}", path.display()))?;

        let spec = reader.spec();
        // duration() counts frames, i.e. samples per channel
        let duration_seconds = reader.duration() as f64 / spec.sample_rate as f64;

        debug!(
            "Audio file {}: {:.1}s, {}Hz, {} channels",
            path.display(),
            duration_seconds,
            spec.sample_rate,
            spec.channels
        );

        Ok(Self {
            path: path.display().to_string(),
            duration_seconds,
            sample_rate: spec.sample_rate,
            channels: spec.channels,
        })
    }
}

/// Duration of a WAV file in seconds, or 0.0 if it cannot be read
pub fn wav_duration(path: impl AsRef<Path>) -> f64 {
    AudioFile::open(path)
        .map(|audio| audio.duration_seconds)
        .unwrap_or(0.0)
}
