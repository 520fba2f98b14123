pub mod file;
pub mod lifecycle;

pub use file::{wav_duration, AudioFile};
pub use lifecycle::{AudioLifecycleManager, AudioRole, CleanupReport};
