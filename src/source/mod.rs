//! Corpus record sources.
//!
//! Ownership model:
//! - `RecordSource` is the pipeline-facing interface that drives records
//!   through a sink one at a time, in source order.
//! - `ArchiveSource` streams records out of a gzip TAR corpus archive.
//! - `InMemorySource` serves prebuilt records for tests and small corpora.

use crate::data::CorpusRecord;
use crate::errors::PublishError;
use crate::types::SourceId;

/// Streaming gzip TAR corpus source.
pub mod archive;
pub use archive::ArchiveSource;

/// Sink invoked once per record produced by a source.
pub type RecordSink<'a> = dyn FnMut(CorpusRecord) -> Result<(), PublishError> + 'a;

/// Pipeline-facing record source interface.
///
/// Sources produce records lazily and in a fixed order; the first error —
/// whether raised by the source or returned by the sink — aborts the run.
pub trait RecordSource {
    /// Stable source identifier used in errors and progress reporting.
    fn id(&self) -> &str;
    /// Drive every record through `sink`, stopping at the first error.
    fn for_each_record(&mut self, sink: &mut RecordSink<'_>) -> Result<(), PublishError>;
}

/// In-memory record source for tests and small corpora.
pub struct InMemorySource {
    id: SourceId,
    records: Vec<CorpusRecord>,
}

impl InMemorySource {
    /// Create an in-memory source from prebuilt records.
    pub fn new(id: impl Into<SourceId>, records: Vec<CorpusRecord>) -> Self {
        Self {
            id: id.into(),
            records,
        }
    }
}

impl RecordSource for InMemorySource {
    fn id(&self) -> &str {
        &self.id
    }

    fn for_each_record(&mut self, sink: &mut RecordSink<'_>) -> Result<(), PublishError> {
        for record in self.records.drain(..) {
            sink(record)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{RecordMetadata, SpeakerProfile};

    fn record(file_id: &str) -> CorpusRecord {
        CorpusRecord {
            metadata: RecordMetadata::from_parts(file_id, None, &SpeakerProfile::default()),
            audio: vec![0u8; 4],
        }
    }

    #[test]
    fn in_memory_source_preserves_order_and_drains() {
        let mut source = InMemorySource::new(
            "memory::test",
            vec![record("a_X_1"), record("b_X_2"), record("c_X_3")],
        );
        let mut seen = Vec::new();
        source
            .for_each_record(&mut |record| {
                seen.push(record.metadata.file_id.clone());
                Ok(())
            })
            .expect("drain succeeds");
        assert_eq!(seen, vec!["a_X_1", "b_X_2", "c_X_3"]);

        let mut second = Vec::new();
        source
            .for_each_record(&mut |record| {
                second.push(record.metadata.file_id);
                Ok(())
            })
            .expect("second pass succeeds");
        assert!(second.is_empty());
    }

    #[test]
    fn sink_errors_stop_iteration() {
        let mut source = InMemorySource::new("memory::test", vec![record("a_X_1"), record("b_X_2")]);
        let mut seen = 0usize;
        let result = source.for_each_record(&mut |_| {
            seen += 1;
            Err(PublishError::Pack("stop".to_string()))
        });
        assert!(result.is_err());
        assert_eq!(seen, 1);
    }
}
