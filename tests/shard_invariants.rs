use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use corpus_shards::data::{CorpusRecord, RecordMetadata, SpeakerProfile, Transcript};
use corpus_shards::pack::{PackedShard, ShardWriter, entry_prefix};
use corpus_shards::splits::SplitLabel;

fn build_record(idx: usize) -> CorpusRecord {
    let file_id = format!("IISc_Corpus_F_SPOR_{idx:05}");
    let transcript = Transcript {
        text: format!("sentence {idx}"),
        domain: "Sports".to_string(),
    };
    CorpusRecord {
        metadata: RecordMetadata::from_parts(
            file_id,
            Some(&transcript),
            &SpeakerProfile::default(),
        ),
        audio: format!("RIFF{idx:08}").into_bytes(),
    }
}

fn pack_all(split: SplitLabel, count: usize, capacity: usize, dir: &Path) -> Vec<PackedShard> {
    let mut writer = ShardWriter::new(split, dir, capacity).expect("writer");
    let mut shards = Vec::new();
    for idx in 0..count {
        if let Some(shard) = writer.append(&build_record(idx)).expect("append") {
            shards.push(shard);
        }
    }
    if let Some(shard) = writer.finish().expect("finish") {
        shards.push(shard);
    }
    shards
}

#[test]
fn thousand_records_make_two_full_shards() {
    let temp = tempfile::tempdir().expect("tempdir");
    let shards = pack_all(SplitLabel::Train, 1_000, 500, temp.path());
    assert_eq!(shards.len(), 2);
    assert!(shards.iter().all(|shard| shard.record_count() == 500));
    assert_eq!(shards[0].file_name(), "train_00001.tar");
    assert_eq!(shards[1].file_name(), "train_00002.tar");
}

#[test]
fn train_scenario_fills_sixteen_shards_plus_remainder() {
    let temp = tempfile::tempdir().expect("tempdir");
    let shards = pack_all(SplitLabel::Train, 8_242, 500, temp.path());
    assert_eq!(shards.len(), 17);
    for shard in &shards[..16] {
        assert_eq!(shard.record_count(), 500);
    }
    assert_eq!(shards[16].record_count(), 242);
    assert_eq!(shards[16].file_name(), "train_00017.tar");
}

#[test]
fn test_scenario_splits_into_full_and_partial_shard() {
    let temp = tempfile::tempdir().expect("tempdir");
    let shards = pack_all(SplitLabel::Test, 858, 500, temp.path());
    assert_eq!(shards.len(), 2);
    assert_eq!(shards[0].record_count(), 500);
    assert_eq!(shards[1].record_count(), 358);
    assert_eq!(shards[1].file_name(), "test_00002.tar");
}

#[test]
fn shards_cover_the_input_exactly_once_in_order() {
    let temp = tempfile::tempdir().expect("tempdir");
    let count = 1_234usize;
    let shards = pack_all(SplitLabel::Train, count, 500, temp.path());

    let packed_ids: Vec<String> = shards
        .iter()
        .flat_map(|shard| shard.entries.iter().map(|entry| entry.file_id.clone()))
        .collect();
    let expected: Vec<String> = (0..count)
        .map(|idx| format!("IISc_Corpus_F_SPOR_{idx:05}"))
        .collect();
    assert_eq!(packed_ids, expected);

    for shard in &shards {
        let prefixes: HashSet<&str> = shard
            .entries
            .iter()
            .map(|entry| entry.prefix.as_str())
            .collect();
        assert_eq!(prefixes.len(), shard.record_count());
        for (position, entry) in shard.entries.iter().enumerate() {
            assert_eq!(entry.prefix, entry_prefix(shard.index, position));
        }
    }
}

#[test]
fn tar_entries_pair_audio_with_matching_sidecar() {
    let temp = tempfile::tempdir().expect("tempdir");
    let shards = pack_all(SplitLabel::Train, 7, 5, temp.path());
    assert_eq!(shards.len(), 2);

    for shard in &shards {
        let mut archive = tar::Archive::new(File::open(&shard.path).expect("open shard"));
        let mut names = Vec::new();
        let mut sidecars = Vec::new();
        for entry in archive.entries().expect("entries") {
            let mut entry = entry.expect("entry");
            let name = entry
                .path()
                .expect("entry path")
                .to_string_lossy()
                .to_string();
            if name.ends_with(".json") {
                let mut raw = Vec::new();
                entry.read_to_end(&mut raw).expect("read sidecar");
                let metadata: RecordMetadata =
                    serde_json::from_slice(&raw).expect("sidecar decodes");
                sidecars.push((name.clone(), metadata));
            }
            names.push(name);
        }

        assert_eq!(names.len(), shard.record_count() * 2);
        for (position, entry) in shard.entries.iter().enumerate() {
            assert_eq!(names[position * 2], format!("{}.wav", entry.prefix));
            assert_eq!(names[position * 2 + 1], format!("{}.json", entry.prefix));
        }
        for (name, metadata) in &sidecars {
            let prefix = name.trim_end_matches(".json");
            let paired = shard
                .entries
                .iter()
                .find(|entry| entry.prefix == prefix)
                .expect("sidecar has a paired entry");
            assert_eq!(metadata.file_id, paired.file_id);
            assert_eq!(metadata.domain, "Sports");
            assert_eq!(metadata.category, "SPOR");
            assert_eq!(metadata.speaker_id, "Spk0001");
        }
    }
}

#[test]
fn exactly_divisible_input_leaves_no_trailing_shard() {
    let temp = tempfile::tempdir().expect("tempdir");
    let shards = pack_all(SplitLabel::Train, 10, 5, temp.path());
    assert_eq!(shards.len(), 2);
    assert!(shards.iter().all(|shard| shard.record_count() == 5));
}
