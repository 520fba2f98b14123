use crate::config::Config;

/// Tunables of the session loop, taken from the application config once
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSettings {
    /// Session exchanges sent as context with each query
    pub context_turns: usize,

    /// Audio files kept by periodic cleanup
    pub keep_latest: usize,

    /// Completed content turns between periodic cleanups (0 disables them)
    pub cleanup_every: u64,

    /// Audio files kept by the cleanup on termination
    pub final_keep: usize,
}

impl SessionSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            context_turns: config.llm.context_turns,
            keep_latest: config.retention.keep_latest,
            cleanup_every: config.retention.cleanup_every,
            final_keep: config.retention.final_keep,
        }
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}
