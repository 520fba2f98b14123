use anyhow::{Context, Result};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// What an audio artifact was generated for; doubles as its file name prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioRole {
    /// Synthesized reply to a content turn
    Reply,
    /// Synthesized farewell on exit
    Farewell,
}

impl AudioRole {
    pub fn prefix(self) -> &'static str {
        match self {
            AudioRole::Reply => "output",
            AudioRole::Farewell => "farewell",
        }
    }
}

/// Outcome of a retention pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanupReport {
    pub retained: Vec<PathBuf>,
    pub deleted: Vec<PathBuf>,
    /// Files that should have been deleted but could not be
    pub failed: Vec<PathBuf>,
}

/// Owns naming and retention of the WAV files in the audio directory
pub struct AudioLifecycleManager {
    audio_dir: PathBuf,
}

impl AudioLifecycleManager {
    pub fn new(audio_dir: impl Into<PathBuf>) -> Self {
        Self {
            audio_dir: audio_dir.into(),
        }
    }

    pub fn audio_dir(&self) -> &Path {
        &self.audio_dir
    }

    /// Fixed path the recorder writes each turn's microphone capture to
    pub fn recording_path(&self) -> PathBuf {
        self.audio_dir.join("conversation.wav")
    }

    /// `audio_dir/{prefix}_{uuid}.wav`
    pub fn generate_unique_path(&self, prefix: &str) -> PathBuf {
        let uid = Uuid::new_v4().simple();
        self.audio_dir.join(format!("{}_{}.wav", prefix, uid))
    }

    pub fn path_for(&self, role: AudioRole) -> PathBuf {
        self.generate_unique_path(role.prefix())
    }

    /// Keep the `keep_latest` most recently modified WAV files and delete the rest.
    ///
    /// Each deletion failure is logged and skipped; only failing to list the
    /// directory is an error.
    pub fn cleanup(&self, keep_latest: usize) -> Result<CleanupReport> {
        self.cleanup_with(keep_latest, |path| fs::remove_file(path))
    }

    /// Same as [`cleanup`](Self::cleanup), deleting through `remove`
    pub fn cleanup_with<F>(&self, keep_latest: usize, mut remove: F) -> Result<CleanupReport>
    where
        F: FnMut(&Path) -> io::Result<()>,
    {
        let mut files = self.list_audio_files()?;
        // Newest first
        files.sort_by(|a, b| b.1.cmp(&a.1));

        let mut report = CleanupReport::default();

        for (index, (path, _)) in files.into_iter().enumerate() {
            if index < keep_latest {
                report.retained.push(path);
                continue;
            }

            match remove(&path) {
                Ok(()) => {
                    info!("Deleted old audio: {}", display_name(&path));
                    report.deleted.push(path);
                }
                Err(e) => {
                    warn!("Could not delete {}: {}", display_name(&path), e);
                    report.failed.push(path);
                }
            }
        }

        debug!(
            "Audio cleanup (keep {}): {} retained, {} deleted, {} failed",
            keep_latest,
            report.retained.len(),
            report.deleted.len(),
            report.failed.len()
        );

        Ok(report)
    }

    fn list_audio_files(&self) -> Result<Vec<(PathBuf, SystemTime)>> {
        if !self.audio_dir.exists() {
            return Ok(Vec::new());
        }

        let entries = fs::read_dir(&self.audio_dir).with_context(|| {
            format!("Failed to read audio directory: {}", self.audio_dir.display())
        })?;

        let mut files = Vec::new();
        for entry in entries {
            let entry = entry.context("Failed to read audio directory entry")?;
            let path = entry.path();
            let is_wav = path
                .extension()
                .map(|ext| ext.eq_ignore_ascii_case("wav"))
                .unwrap_or(false);
            if !is_wav {
                continue;
            }

            // Entries that vanish or cannot be stat'ed are simply not candidates
            let Ok(metadata) = entry.metadata() else {
                continue;
            };
            if !metadata.is_file() {
                continue;
            }
            let modified = metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH);
            files.push((path, modified));
        }

        Ok(files)
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use tempfile::TempDir;

    #[test]
    fn unique_paths_do_not_collide() {
        let manager = AudioLifecycleManager::new("audio");
        let paths: HashSet<PathBuf> = (0..1000)
            .map(|_| manager.generate_unique_path("output"))
            .collect();
        assert_eq!(paths.len(), 1000);
    }

    #[test]
    fn unique_path_lives_in_audio_dir_with_prefix() {
        let manager = AudioLifecycleManager::new("audio");
        let path = manager.path_for(AudioRole::Farewell);

        assert_eq!(path.parent(), Some(Path::new("audio")));
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("farewell_"));
        assert!(name.ends_with(".wav"));
    }

    #[test]
    fn cleanup_of_missing_directory_is_a_no_op() {
        let dir = TempDir::new().unwrap();
        let manager = AudioLifecycleManager::new(dir.path().join("absent"));

        let report = manager.cleanup(0).unwrap();
        assert_eq!(report, CleanupReport::default());
    }

    #[test]
    fn cleanup_ignores_non_wav_files() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("notes.txt"), "keep me").unwrap();
        fs::write(dir.path().join("a.wav"), "x").unwrap();
        let manager = AudioLifecycleManager::new(dir.path());

        let report = manager.cleanup(0).unwrap();

        assert_eq!(report.deleted.len(), 1);
        assert!(dir.path().join("notes.txt").exists());
    }
}
