use std::path::PathBuf;

use crate::constants::{hub, shard, splits};
use crate::data::SpeakerProfile;
use crate::splits::{SplitLabel, SplitSource};
use crate::types::RepoId;

/// Top-level publishing configuration.
#[derive(Clone, Debug)]
pub struct PublishConfig {
    /// Destination dataset repository (`owner/name`).
    pub repo_id: RepoId,
    /// Create the repository as private.
    pub private: bool,
    /// Records per TAR shard.
    pub shard_size: usize,
    /// Directory for in-flight shard files; `None` uses a scoped temp dir.
    pub work_dir: Option<PathBuf>,
    /// Hub API endpoint.
    pub endpoint: String,
    /// Auth token; `None` falls back to the token env var, then the shared
    /// hub token cache.
    pub token: Option<String>,
    /// Source archives per split, processed in declaration order.
    pub splits: Vec<SplitSource>,
    /// Speaker metadata stamped into every sidecar.
    pub speaker: SpeakerProfile,
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            repo_id: RepoId::new(),
            private: false,
            shard_size: shard::SHARD_SIZE,
            work_dir: None,
            endpoint: hub::DEFAULT_ENDPOINT.to_string(),
            token: None,
            splits: vec![
                SplitSource {
                    label: SplitLabel::Train,
                    locator: splits::TRAIN_ARCHIVE_URL.to_string(),
                },
                SplitSource {
                    label: SplitLabel::Test,
                    locator: splits::TEST_ARCHIVE_URL.to_string(),
                },
            ],
            speaker: SpeakerProfile::default(),
        }
    }
}

impl PublishConfig {
    /// Resolve the effective auth token: explicit config value, then the
    /// `HF_TOKEN` environment variable, then the shared hub token cache.
    pub fn resolve_token(&self) -> Option<String> {
        self.token
            .clone()
            .or_else(|| std::env::var(hub::TOKEN_ENV).ok())
            .or_else(|| hf_hub::Cache::default().token())
    }
}
