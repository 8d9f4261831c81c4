use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::config::PublishConfig;
use crate::constants::hub::DATA_PREFIX;
use crate::errors::PublishError;
use crate::hub::DatasetHub;
use crate::pack::{PackedShard, ShardWriter};
use crate::source::{ArchiveSource, RecordSource};
use crate::splits::SplitLabel;
use crate::types::RepoPath;

/// Per-split publishing telemetry.
#[derive(Clone, Debug)]
pub struct SplitStats {
    /// Split these stats describe.
    pub split: SplitLabel,
    /// Records packed and uploaded.
    pub records: usize,
    /// Shards finalized and uploaded.
    pub shards: usize,
    /// Total bytes of finalized shard archives.
    pub bytes: u64,
    /// Wall-clock start of the split.
    pub started_at: DateTime<Utc>,
    /// Wall-clock end of the split.
    pub finished_at: DateTime<Utc>,
}

/// Repo path of a shard within the dataset repository.
pub fn shard_repo_path(shard: &PackedShard) -> RepoPath {
    format!("{DATA_PREFIX}/{}/{}", shard.split, shard.file_name())
}

/// Commit message used when uploading a shard.
pub fn shard_commit_message(shard: &PackedShard) -> String {
    format!("Add {} shard {}", shard.split, shard.index)
}

/// Publish one split: pull records, pack shards, upload each as it finalizes.
///
/// The first fetch, pack, or upload error aborts the split; shards uploaded
/// before the failure stay on the remote.
pub fn process_split(
    source: &mut dyn RecordSource,
    split: SplitLabel,
    config: &PublishConfig,
    hub: &dyn DatasetHub,
    work_dir: &Path,
) -> Result<SplitStats, PublishError> {
    let started_at = Utc::now();
    eprintln!("[shards:pipeline] processing {split} split");

    let mut writer = ShardWriter::new(split, work_dir, config.shard_size)?;
    let mut records = 0usize;
    let mut shards = 0usize;
    let mut bytes = 0u64;

    source.for_each_record(&mut |record| {
        records += 1;
        if let Some(shard) = writer.append(&record)? {
            upload_shard(hub, config, &shard, records)?;
            shards += 1;
            bytes += shard.bytes;
        }
        Ok(())
    })?;
    if let Some(shard) = writer.finish()? {
        upload_shard(hub, config, &shard, records)?;
        shards += 1;
        bytes += shard.bytes;
    }

    let finished_at = Utc::now();
    let elapsed = (finished_at - started_at).num_milliseconds() as f64 / 1000.0;
    eprintln!(
        "[shards:pipeline] completed {split}: {records} files in {shards} shards ({elapsed:.1}s)"
    );
    Ok(SplitStats {
        split,
        records,
        shards,
        bytes,
        started_at,
        finished_at,
    })
}

fn upload_shard(
    hub: &dyn DatasetHub,
    config: &PublishConfig,
    shard: &PackedShard,
    total_records: usize,
) -> Result<(), PublishError> {
    let repo_path = shard_repo_path(shard);
    eprintln!(
        "[shards:pipeline] uploading shard {} ({:.1} MB, {total_records} files so far)",
        shard.index,
        shard.bytes as f64 / 1024.0 / 1024.0
    );
    hub.upload_file(
        &config.repo_id,
        &shard.path,
        &repo_path,
        &shard_commit_message(shard),
    )?;
    // Bound local disk usage to one in-flight shard.
    fs::remove_file(&shard.path)?;
    debug!(
        split = %shard.split,
        index = shard.index,
        records = shard.record_count(),
        repo_path,
        "shard uploaded and removed locally"
    );
    Ok(())
}

/// Publish every configured split in declaration order.
pub fn run(config: &PublishConfig, hub: &dyn DatasetHub) -> Result<Vec<SplitStats>, PublishError> {
    if config.repo_id.is_empty() {
        return Err(PublishError::Configuration(
            "destination repo_id must not be empty".to_string(),
        ));
    }
    hub.ensure_repo(&config.repo_id, config.private)?;

    let work_dir = match &config.work_dir {
        Some(dir) => {
            fs::create_dir_all(dir)?;
            WorkDir::Fixed(dir.clone())
        }
        None => WorkDir::Scoped(tempfile::tempdir()?),
    };

    let mut stats = Vec::new();
    for split_source in &config.splits {
        let mut source = ArchiveSource::new(
            split_source.label,
            split_source.locator.clone(),
            config.speaker.clone(),
        );
        stats.push(process_split(
            &mut source,
            split_source.label,
            config,
            hub,
            work_dir.path(),
        )?);
    }
    Ok(stats)
}

/// Working directory for in-flight shards; scoped variant is removed on drop.
enum WorkDir {
    Fixed(PathBuf),
    Scoped(tempfile::TempDir),
}

impl WorkDir {
    fn path(&self) -> &Path {
        match self {
            WorkDir::Fixed(path) => path,
            WorkDir::Scoped(dir) => dir.path(),
        }
    }
}
