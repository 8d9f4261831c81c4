use std::fmt;

use serde::{Deserialize, Serialize};

pub use crate::constants::splits::ALL_SPLITS;

/// Logical dataset partitions published to the hub.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SplitLabel {
    /// Training split.
    Train,
    /// Test split.
    Test,
}

impl SplitLabel {
    /// Stable lowercase name used in shard file names and repo paths.
    pub fn as_str(&self) -> &'static str {
        match self {
            SplitLabel::Train => "train",
            SplitLabel::Test => "test",
        }
    }

    /// Parse a split name as written on the command line.
    pub fn from_name(raw: &str) -> Option<Self> {
        match raw {
            "train" => Some(SplitLabel::Train),
            "test" => Some(SplitLabel::Test),
            _ => None,
        }
    }
}

impl fmt::Display for SplitLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One corpus split plus the locator of its source archive.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SplitSource {
    /// Split this archive feeds.
    pub label: SplitLabel,
    /// HTTP(S) URL or local filesystem path of the gzip TAR archive.
    pub locator: String,
}
