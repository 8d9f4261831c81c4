#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

/// Runnable publish app shared by the CLI binary.
pub mod app;
/// Publishing configuration types.
pub mod config;
/// Centralized constants used across packing, sources, and uploads.
pub mod constants;
/// Record payloads and sidecar metadata types.
pub mod data;
/// Dataset hub seam and blocking HTTP upload client.
pub mod hub;
/// Fixed-size WebDataset shard packing.
pub mod pack;
/// Sequential fetch, pack, and upload pipeline.
pub mod pipeline;
/// Corpus record sources.
pub mod source;
/// Split labels and per-split archive locators.
pub mod splits;
/// Shared type aliases.
pub mod types;

mod errors;

pub use config::PublishConfig;
pub use data::{CorpusRecord, RecordMetadata, SpeakerProfile, Transcript, TranscriptTable};
pub use errors::PublishError;
pub use hub::{DatasetHub, HubClient};
pub use pack::{PackedEntry, PackedShard, ShardWriter};
pub use pipeline::{SplitStats, process_split, run};
pub use source::{ArchiveSource, InMemorySource, RecordSource};
pub use splits::{SplitLabel, SplitSource};
pub use types::{CategoryCode, DomainName, EntryPrefix, FileId, RepoId, RepoPath, SourceId};
