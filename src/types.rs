/// Unique audio-file identifier, also the transcript-table key and sidecar `file_id`.
/// Example: `IISc_SPICORProject_Gujarati_F_SPOR_00123`
pub type FileId = String;
/// Identifier for the source that produced a record.
/// Examples: `archive::train`, `memory::test`
pub type SourceId = String;
/// Destination dataset repository identifier.
/// Example: `iisc-spire/gujarati-tts-webdataset`
pub type RepoId = String;
/// Shared basename prefix of one audio/metadata entry pair inside a shard.
/// Example: `00003_000127`
pub type EntryPrefix = String;
/// Path of an uploaded file inside the dataset repository.
/// Example: `data/train/train_00003.tar`
pub type RepoPath = String;
/// Category code parsed from a file id.
/// Examples: `SPOR`, `AGRI`, `unknown`
pub type CategoryCode = String;
/// Human-readable domain name from the transcript table.
/// Examples: `Sports`, `Agriculture`
pub type DomainName = String;
