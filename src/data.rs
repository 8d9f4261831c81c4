use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::constants::{corpus, speaker};
use crate::errors::PublishError;
use crate::types::{CategoryCode, DomainName, FileId};

/// Static speaker metadata stamped into every sidecar of a corpus.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeakerProfile {
    /// Stable speaker identifier.
    pub speaker_id: String,
    /// Speaker gender label.
    pub speaker_gender: String,
    /// Speaker age in years.
    pub speaker_age: u32,
    /// Language code of the recordings.
    pub language: String,
}

impl Default for SpeakerProfile {
    fn default() -> Self {
        Self {
            speaker_id: speaker::SPEAKER_ID.to_string(),
            speaker_gender: speaker::SPEAKER_GENDER.to_string(),
            speaker_age: speaker::SPEAKER_AGE,
            language: speaker::LANGUAGE.to_string(),
        }
    }
}

/// JSON sidecar payload written next to each audio entry.
///
/// Field names and order are the wire format consumed by WebDataset loaders;
/// keep them in sync with downstream readers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordMetadata {
    /// Transcription text; empty when the transcript table has no row.
    pub text: String,
    /// Unique audio-file identifier, equal to the paired entry prefix's record.
    pub file_id: FileId,
    /// Category code derived from the file id.
    pub category: CategoryCode,
    /// Human-readable domain name; empty when unknown.
    pub domain: DomainName,
    /// Speaker identifier.
    pub speaker_id: String,
    /// Speaker gender label.
    pub speaker_gender: String,
    /// Speaker age in years.
    pub speaker_age: u32,
    /// Language code of the recording.
    pub language: String,
}

impl RecordMetadata {
    /// Assemble sidecar metadata from a transcript row and the speaker profile.
    pub fn from_parts(
        file_id: impl Into<FileId>,
        transcript: Option<&Transcript>,
        profile: &SpeakerProfile,
    ) -> Self {
        let file_id = file_id.into();
        let (text, domain) = transcript
            .map(|row| (row.text.clone(), row.domain.clone()))
            .unwrap_or_default();
        Self {
            category: category_from_file_id(&file_id),
            text,
            file_id,
            domain,
            speaker_id: profile.speaker_id.clone(),
            speaker_gender: profile.speaker_gender.clone(),
            speaker_age: profile.speaker_age,
            language: profile.language.clone(),
        }
    }
}

/// One source audio file plus its sidecar metadata.
#[derive(Clone, Debug)]
pub struct CorpusRecord {
    /// Sidecar metadata serialized into the shard.
    pub metadata: RecordMetadata,
    /// Raw audio bytes written to the paired `.wav` entry.
    pub audio: Vec<u8>,
}

/// One row of the corpus transcript table.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Transcript {
    /// Transcription text.
    pub text: String,
    /// Human-readable domain name.
    pub domain: DomainName,
}

/// Insertion-ordered transcript table keyed by file id.
pub type TranscriptTable = IndexMap<FileId, Transcript>;

/// Decode the transcript table document (`{"Transcripts": {...}}`).
///
/// Rows that are not JSON objects, or that miss the text/domain keys, decode
/// to empty strings rather than failing the whole table.
pub fn decode_transcript_table(raw: &[u8]) -> Result<TranscriptTable, PublishError> {
    let document: Value = serde_json::from_slice(raw)?;
    let mut table = TranscriptTable::new();
    let Some(rows) = document
        .get(corpus::TRANSCRIPTS_KEY)
        .and_then(Value::as_object)
    else {
        return Ok(table);
    };
    for (file_id, row) in rows {
        let text = row
            .get(corpus::TRANSCRIPT_TEXT_KEY)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let domain = row
            .get(corpus::TRANSCRIPT_DOMAIN_KEY)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        table.insert(file_id.clone(), Transcript { text, domain });
    }
    Ok(table)
}

/// Derive the category code from a file id.
///
/// File ids encode the category as the second-to-last `_`-separated token
/// (`..._SPOR_00123` → `SPOR`); ids with fewer than two tokens fall back to
/// the unknown category.
pub fn category_from_file_id(file_id: &str) -> CategoryCode {
    let parts: Vec<&str> = file_id.split('_').collect();
    if parts.len() >= 2 {
        parts[parts.len() - 2].to_string()
    } else {
        corpus::FALLBACK_CATEGORY.to_string()
    }
}
