use std::fs::{self, File};
use std::path::PathBuf;

use tar::{Builder, Header};
use tracing::debug;

use crate::constants::shard;
use crate::data::CorpusRecord;
use crate::errors::PublishError;
use crate::splits::SplitLabel;
use crate::types::{EntryPrefix, FileId};

/// Bookkeeping for one record packed into a shard.
#[derive(Clone, Debug)]
pub struct PackedEntry {
    /// Shared basename prefix of the `.wav`/`.json` pair.
    pub prefix: EntryPrefix,
    /// File id recorded in the metadata sidecar.
    pub file_id: FileId,
    /// Audio payload size in bytes.
    pub audio_bytes: u64,
}

/// One finalized shard archive ready for upload.
#[derive(Debug)]
pub struct PackedShard {
    /// Split this shard belongs to.
    pub split: SplitLabel,
    /// 1-based shard index within the split.
    pub index: usize,
    /// Local path of the finalized TAR file.
    pub path: PathBuf,
    /// Entries packed into this shard, in source order.
    pub entries: Vec<PackedEntry>,
    /// Size of the finalized TAR file in bytes.
    pub bytes: u64,
}

impl PackedShard {
    /// Number of records packed into this shard.
    pub fn record_count(&self) -> usize {
        self.entries.len()
    }

    /// Shard file name, `<split>_<index:05>.tar`.
    pub fn file_name(&self) -> String {
        shard_file_name(self.split, self.index)
    }
}

/// Build the canonical shard file name for a split and 1-based index.
pub fn shard_file_name(split: SplitLabel, index: usize) -> String {
    format!(
        "{split}_{index:0width$}.tar",
        width = shard::SHARD_INDEX_WIDTH
    )
}

/// Build the shared entry prefix for a shard index and 0-based entry index.
pub fn entry_prefix(shard_index: usize, entry_index: usize) -> EntryPrefix {
    format!(
        "{shard_index:0sw$}_{entry_index:0ew$}",
        sw = shard::SHARD_INDEX_WIDTH,
        ew = shard::ENTRY_INDEX_WIDTH
    )
}

/// Packs records into fixed-size WebDataset TAR shards.
///
/// Audio bytes stream through to the open TAR builder one record at a time;
/// the bounded entry manifest is flushed and cleared whenever it reaches
/// `capacity`, producing one finalized shard per flush. Shards are opened
/// lazily, so no empty archive is ever emitted.
pub struct ShardWriter {
    split: SplitLabel,
    work_dir: PathBuf,
    capacity: usize,
    next_index: usize,
    open: Option<OpenShard>,
}

struct OpenShard {
    index: usize,
    path: PathBuf,
    builder: Builder<File>,
    entries: Vec<PackedEntry>,
}

impl ShardWriter {
    /// Create a writer that materializes shards of `capacity` records under `work_dir`.
    pub fn new(
        split: SplitLabel,
        work_dir: impl Into<PathBuf>,
        capacity: usize,
    ) -> Result<Self, PublishError> {
        if capacity == 0 {
            return Err(PublishError::Configuration(
                "shard capacity must be greater than zero".to_string(),
            ));
        }
        Ok(Self {
            split,
            work_dir: work_dir.into(),
            capacity,
            next_index: 1,
            open: None,
        })
    }

    /// Append one record, returning the finalized shard when it fills up.
    pub fn append(&mut self, record: &CorpusRecord) -> Result<Option<PackedShard>, PublishError> {
        if self.open.is_none() {
            self.open = Some(self.open_shard()?);
        }
        let open = self
            .open
            .as_mut()
            .ok_or_else(|| PublishError::Pack("shard open state lost".to_string()))?;

        let prefix = entry_prefix(open.index, open.entries.len());
        let sidecar = serde_json::to_vec(&record.metadata)?;
        append_bytes(
            &mut open.builder,
            &format!("{prefix}.{}", shard::AUDIO_EXTENSION),
            &record.audio,
        )?;
        append_bytes(
            &mut open.builder,
            &format!("{prefix}.{}", shard::METADATA_EXTENSION),
            &sidecar,
        )?;
        open.entries.push(PackedEntry {
            prefix,
            file_id: record.metadata.file_id.clone(),
            audio_bytes: record.audio.len() as u64,
        });

        if open.entries.len() >= self.capacity {
            return self.finalize_open().map(Some);
        }
        Ok(None)
    }

    /// Finalize a trailing partial shard, if any records are pending.
    pub fn finish(&mut self) -> Result<Option<PackedShard>, PublishError> {
        if self.open.is_none() {
            return Ok(None);
        }
        self.finalize_open().map(Some)
    }

    fn open_shard(&mut self) -> Result<OpenShard, PublishError> {
        let index = self.next_index;
        let path = self.work_dir.join(shard_file_name(self.split, index));
        let file = File::create(&path)?;
        debug!(split = %self.split, index, path = %path.display(), "shard opened");
        Ok(OpenShard {
            index,
            path,
            builder: Builder::new(file),
            entries: Vec::with_capacity(self.capacity),
        })
    }

    fn finalize_open(&mut self) -> Result<PackedShard, PublishError> {
        let open = self
            .open
            .take()
            .ok_or_else(|| PublishError::Pack("no shard open to finalize".to_string()))?;
        let OpenShard {
            index,
            path,
            builder,
            entries,
        } = open;
        builder
            .into_inner()
            .map_err(|err| PublishError::Pack(format!("failed finishing {}: {err}", path.display())))?;
        let bytes = fs::metadata(&path)?.len();
        self.next_index = index + 1;
        debug!(split = %self.split, index, records = entries.len(), bytes, "shard finalized");
        Ok(PackedShard {
            split: self.split,
            index,
            path,
            entries,
            bytes,
        })
    }
}

fn append_bytes(builder: &mut Builder<File>, name: &str, bytes: &[u8]) -> Result<(), PublishError> {
    let mut header = Header::new_gnu();
    header
        .set_path(name)
        .map_err(|err| PublishError::Pack(format!("failed setting entry path {name}: {err}")))?;
    header.set_size(bytes.len() as u64);
    header.set_cksum();
    builder
        .append(&header, bytes)
        .map_err(|err| PublishError::Pack(format!("failed appending entry {name}: {err}")))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{RecordMetadata, SpeakerProfile};

    fn record(file_id: &str) -> CorpusRecord {
        CorpusRecord {
            metadata: RecordMetadata::from_parts(file_id, None, &SpeakerProfile::default()),
            audio: b"RIFF0000".to_vec(),
        }
    }

    #[test]
    fn names_and_prefixes_are_zero_padded() {
        assert_eq!(shard_file_name(SplitLabel::Train, 3), "train_00003.tar");
        assert_eq!(shard_file_name(SplitLabel::Test, 12), "test_00012.tar");
        assert_eq!(entry_prefix(1, 0), "00001_000000");
        assert_eq!(entry_prefix(17, 241), "00017_000241");
    }

    #[test]
    fn zero_capacity_is_rejected() {
        let temp = tempfile::tempdir().expect("tempdir");
        let result = ShardWriter::new(SplitLabel::Train, temp.path(), 0);
        assert!(matches!(result, Err(PublishError::Configuration(_))));
    }

    #[test]
    fn writer_flushes_at_capacity_and_on_finish() {
        let temp = tempfile::tempdir().expect("tempdir");
        let mut writer = ShardWriter::new(SplitLabel::Train, temp.path(), 2).expect("writer");

        assert!(writer.append(&record("a_X_1")).expect("append").is_none());
        let first = writer
            .append(&record("b_X_2"))
            .expect("append")
            .expect("full shard");
        assert_eq!(first.index, 1);
        assert_eq!(first.record_count(), 2);
        assert!(first.path.exists());
        assert!(first.bytes > 0);

        assert!(writer.append(&record("c_X_3")).expect("append").is_none());
        let trailing = writer.finish().expect("finish").expect("partial shard");
        assert_eq!(trailing.index, 2);
        assert_eq!(trailing.record_count(), 1);

        assert!(writer.finish().expect("finish").is_none());
    }
}
