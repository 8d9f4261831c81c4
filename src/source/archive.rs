use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::time::{Duration, Instant};

use flate2::read::GzDecoder;
use tracing::debug;

use crate::constants::{corpus, hub, shard};
use crate::data::{self, CorpusRecord, RecordMetadata, SpeakerProfile, TranscriptTable};
use crate::errors::PublishError;
use crate::source::{RecordSink, RecordSource};
use crate::splits::SplitLabel;
use crate::types::SourceId;

/// Streaming source that yields one record per audio member of a gzip TAR
/// corpus archive.
///
/// The archive is read member by member; only the current member's bytes are
/// held in memory. The transcript table member (`*_Transcripts.json`) is
/// loaded when encountered and applied to every subsequent audio member.
/// Audio members seen before the table loads still produce records with
/// empty text/domain, so archives are expected to place the table first.
pub struct ArchiveSource {
    source_id: SourceId,
    locator: String,
    speaker: SpeakerProfile,
}

impl ArchiveSource {
    /// Create a source for `split` reading from an HTTP(S) URL or local path.
    pub fn new(split: SplitLabel, locator: impl Into<String>, speaker: SpeakerProfile) -> Self {
        Self {
            source_id: format!("archive::{split}"),
            locator: locator.into(),
            speaker,
        }
    }

    fn unavailable(&self, reason: String) -> PublishError {
        PublishError::SourceUnavailable {
            source_id: self.source_id.clone(),
            reason,
        }
    }

    fn open_reader(&self) -> Result<Box<dyn Read>, PublishError> {
        if self.locator.starts_with("http://") || self.locator.starts_with("https://") {
            let agent = ureq::AgentBuilder::new()
                .timeout_connect(Duration::from_millis(hub::CONNECT_TIMEOUT_MS))
                .build();
            let response = agent
                .get(&self.locator)
                .call()
                .map_err(|err| self.unavailable(format!("failed fetching corpus archive: {err}")))?;
            return Ok(Box::new(response.into_reader()));
        }
        let path = Path::new(&self.locator);
        let file = File::open(path).map_err(|err| {
            self.unavailable(format!(
                "failed opening corpus archive {}: {err}",
                path.display()
            ))
        })?;
        Ok(Box::new(file))
    }
}

impl RecordSource for ArchiveSource {
    fn id(&self) -> &str {
        &self.source_id
    }

    fn for_each_record(&mut self, sink: &mut RecordSink<'_>) -> Result<(), PublishError> {
        eprintln!(
            "[shards:source] streaming corpus archive for '{}'",
            self.source_id
        );
        let reader = self.open_reader()?;
        let mut archive = tar::Archive::new(GzDecoder::new(reader));
        let mut transcripts = TranscriptTable::new();
        let audio_suffix = format!(".{}", shard::AUDIO_EXTENSION);
        let started = Instant::now();
        let report_every = Duration::from_millis(750);
        let mut last_report = started;
        let mut yielded = 0usize;

        let entries = archive
            .entries()
            .map_err(|err| self.unavailable(format!("failed reading corpus archive: {err}")))?;
        for entry in entries {
            let mut entry = entry
                .map_err(|err| self.unavailable(format!("failed reading archive member: {err}")))?;
            if !entry.header().entry_type().is_file() {
                continue;
            }
            let member_name = entry
                .path()
                .ok()
                .and_then(|path| {
                    path.file_name()
                        .and_then(|name| name.to_str())
                        .map(str::to_string)
                })
                .unwrap_or_default();

            if member_name.ends_with(corpus::TRANSCRIPTS_SUFFIX) {
                let mut raw = Vec::new();
                entry
                    .read_to_end(&mut raw)
                    .map_err(|err| self.unavailable(format!("failed reading transcripts: {err}")))?;
                transcripts = data::decode_transcript_table(&raw).map_err(|err| {
                    PublishError::SourceInconsistent {
                        source_id: self.source_id.clone(),
                        details: format!("failed decoding transcript table: {err}"),
                    }
                })?;
                eprintln!(
                    "[shards:source] loaded {} transcripts from {member_name}",
                    transcripts.len()
                );
                continue;
            }

            let Some(file_id) = member_name.strip_suffix(audio_suffix.as_str()) else {
                debug!(member = %member_name, "skipping non-audio archive member");
                continue;
            };

            let mut audio = Vec::new();
            entry.read_to_end(&mut audio).map_err(|err| {
                self.unavailable(format!("failed reading audio member {member_name}: {err}"))
            })?;
            let metadata =
                RecordMetadata::from_parts(file_id, transcripts.get(file_id), &self.speaker);
            sink(CorpusRecord { metadata, audio })?;
            yielded += 1;

            if last_report.elapsed() >= report_every {
                eprintln!(
                    "[shards:source] streamed {yielded} records from '{}' ({:.1}s)",
                    self.source_id,
                    started.elapsed().as_secs_f64()
                );
                last_report = Instant::now();
            }
        }

        eprintln!(
            "[shards:source] archive exhausted for '{}': {yielded} records in {:.2}s",
            self.source_id,
            started.elapsed().as_secs_f64()
        );
        Ok(())
    }
}
