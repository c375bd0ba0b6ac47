//! Character/pinyin indices and the two-pass index builder
//!
//! Accumulates parsed entries into a flat entry table plus one
//! character index per script, each mapping headword -> pinyin ->
//! bucket of table positions. Entries that declare themselves variants
//! are filed in a second pass under the headword they reference, so a
//! lookup of the original word also surfaces its variants.

use crate::entry::{Entry, EntryId};
use log::info;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Table positions registered under one headword + pinyin key.
///
/// `base` holds entries that are not variants of anything; `variants`
/// holds entries known to be variants sharing that key. The two lists
/// never share a position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bucket {
    pub base: Vec<EntryId>,
    pub variants: Vec<EntryId>,
}

/// Pinyin key (case preserved) -> bucket, for one headword.
pub type PinyinMap = FxHashMap<String, Bucket>;

/// Headword -> readings, for one script.
pub type CharMap = FxHashMap<String, PinyinMap>;

/// Fatal build faults.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BuildError {
    /// Two base entries share a headword pair and reading; the source
    /// snapshot is internally inconsistent.
    #[error("duplicate base entry {traditional} {simplified} [{pinyin}]")]
    DuplicateBase {
        traditional: String,
        simplified: String,
        pinyin: String,
    },
}

/// Uncompacted index as produced by the builder: the entry table with
/// inline ref triples plus both character indices. Compact it into a
/// [`crate::dict::Dictionary`] for querying and persistence.
#[derive(Debug, Clone, Default)]
pub struct DictIndex {
    pub entries: Vec<Entry>,
    pub traditional: CharMap,
    pub simplified: CharMap,
}

impl DictIndex {
    /// Build the index from an ordered entry stream.
    ///
    /// Runs synchronously in two passes. Pass 1 appends every entry to
    /// the table; entries without variant refs register as base bucket
    /// members under their own headword and reading in both scripts,
    /// and a duplicate base key aborts the build. Entries carrying
    /// variant refs never base-register; pass 2 files each of them into
    /// the variant bucket of every headword + reading they reference,
    /// creating buckets on demand. A ref without a reading files under
    /// the entry's own reading.
    pub fn build(entries: impl IntoIterator<Item = Entry>) -> Result<Self, BuildError> {
        let mut index = Self::default();
        let mut seen: FxHashSet<(String, String, String)> = FxHashSet::default();
        let mut queued: Vec<EntryId> = Vec::new();

        for entry in entries {
            let id = index.entries.len() as EntryId;
            if entry.variant_refs.is_empty() {
                let key = (
                    entry.traditional.clone(),
                    entry.simplified.clone(),
                    entry.pinyin.clone(),
                );
                if !seen.insert(key) {
                    return Err(BuildError::DuplicateBase {
                        traditional: entry.traditional.clone(),
                        simplified: entry.simplified.clone(),
                        pinyin: entry.pinyin.clone(),
                    });
                }
                register(&mut index.traditional, &entry.traditional, &entry.pinyin, id, false);
                register(&mut index.simplified, &entry.simplified, &entry.pinyin, id, false);
            } else {
                queued.push(id);
            }
            index.entries.push(entry);
        }

        for &id in &queued {
            let entry = &index.entries[id as usize];
            for r in &entry.variant_refs {
                let pinyin = r.pinyin.as_deref().unwrap_or(&entry.pinyin);
                register(&mut index.traditional, &r.traditional, pinyin, id, true);
                register(&mut index.simplified, &r.simplified, pinyin, id, true);
            }
        }

        info!(
            "index built: {} entries ({} variants), {} traditional / {} simplified headwords",
            index.entries.len(),
            queued.len(),
            index.traditional.len(),
            index.simplified.len()
        );
        Ok(index)
    }
}

/// File `id` under `word` + `pinyin`, creating the bucket on demand.
/// Re-registration of the same position is a no-op.
fn register(map: &mut CharMap, word: &str, pinyin: &str, id: EntryId, variant: bool) {
    let bucket = map
        .entry(word.to_string())
        .or_default()
        .entry(pinyin.to_string())
        .or_default();
    let list = if variant {
        &mut bucket.variants
    } else {
        &mut bucket.base
    };
    if !list.contains(&id) {
        list.push(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::RefTriple;

    fn base(traditional: &str, simplified: &str, pinyin: &str, meaning: &str) -> Entry {
        Entry {
            traditional: traditional.to_string(),
            simplified: simplified.to_string(),
            pinyin: pinyin.to_string(),
            meanings: vec![meaning.to_string()],
            ..Entry::default()
        }
    }

    fn variant(traditional: &str, simplified: &str, pinyin: &str, of: RefTriple) -> Entry {
        Entry {
            variant_refs: vec![of],
            ..base(traditional, simplified, pinyin, "")
        }
    }

    #[test]
    fn test_base_registered_in_both_scripts() {
        let index = DictIndex::build(vec![base("中國", "中国", "Zhong1 guo2", "China")]).unwrap();
        let bucket = &index.traditional["中國"]["Zhong1 guo2"];
        assert_eq!(bucket.base, vec![0]);
        assert!(bucket.variants.is_empty());
        assert_eq!(index.simplified["中国"]["Zhong1 guo2"].base, vec![0]);
    }

    #[test]
    fn test_variant_filed_under_referenced_headword() {
        let index = DictIndex::build(vec![
            base("前邊", "前边", "qian2 bian5", "front"),
            variant(
                "偂邊",
                "偂边",
                "qian2 bian5",
                RefTriple::new("前邊", "前边", Some("qian2 bian5")),
            ),
        ])
        .unwrap();

        let bucket = &index.traditional["前邊"]["qian2 bian5"];
        assert_eq!(bucket.base, vec![0]);
        assert_eq!(bucket.variants, vec![1]);
        assert_eq!(index.simplified["前边"]["qian2 bian5"].variants, vec![1]);
        // The variant never base-registers, not even under its own
        // headword.
        assert!(!index.traditional.contains_key("偂邊"));
    }

    #[test]
    fn test_variant_bucket_created_on_demand() {
        let index = DictIndex::build(vec![variant(
            "乹",
            "乹",
            "qian2",
            RefTriple::new("乾", "干", Some("gan1")),
        )])
        .unwrap();
        assert_eq!(index.traditional["乾"]["gan1"].variants, vec![0]);
        assert!(index.traditional["乾"]["gan1"].base.is_empty());
        assert_eq!(index.simplified["干"]["gan1"].variants, vec![0]);
    }

    #[test]
    fn test_ref_without_reading_uses_entry_reading() {
        let index = DictIndex::build(vec![variant(
            "著",
            "着",
            "zhe5",
            RefTriple::new("着", "着", None),
        )])
        .unwrap();
        assert_eq!(index.traditional["着"]["zhe5"].variants, vec![0]);
    }

    #[test]
    fn test_duplicate_base_key_is_fatal() {
        let err = DictIndex::build(vec![
            base("乾", "干", "gan1", "dry"),
            base("乾", "干", "gan1", "dried"),
        ])
        .unwrap_err();
        assert_eq!(
            err,
            BuildError::DuplicateBase {
                traditional: "乾".to_string(),
                simplified: "干".to_string(),
                pinyin: "gan1".to_string(),
            }
        );
    }

    #[test]
    fn test_same_headword_different_reading_is_not_a_duplicate() {
        let index = DictIndex::build(vec![
            base("乾", "干", "gan1", "dry"),
            base("乾", "乾", "qian2", "one of the Eight Trigrams"),
        ])
        .unwrap();
        assert_eq!(index.traditional["乾"].len(), 2);
    }

    #[test]
    fn test_repeated_ref_registers_once() {
        let mut entry = variant(
            "偂邊",
            "偂边",
            "qian2 bian5",
            RefTriple::new("前邊", "前边", Some("qian2 bian5")),
        );
        // A second ref resolving to the same bucket key.
        entry.variant_refs.push(RefTriple::new("前邊", "前边", None));
        let index = DictIndex::build(vec![entry]).unwrap();
        assert_eq!(index.traditional["前邊"]["qian2 bian5"].variants, vec![0]);
    }
}
