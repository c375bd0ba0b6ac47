//! Dictionary lookup pipeline
//!
//! Answers headword lookups against an immutable [`Dictionary`]:
//! 1. Pick the character index for the requested script
//! 2. Select candidate pinyin keys (exact, case-folded, or all)
//! 3. Gather base entries, plus variant entries when allowed
//! 4. Expand positions into records, merging records that share a
//!    headword and reading
//! 5. Sort each group and shape the result (grouped or flat)
//!
//! The pipeline is a pure read: no locks, no I/O, no mutation.

use crate::dict::{Dictionary, Script};
use crate::entry::{EntryId, RefTriple};
use rustc_hash::FxHashMap;

/// Lookup options; every field can be overridden independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LookupConfig {
    /// Match the pinyin filter exactly, including case.
    pub case_sensitive_search: bool,
    /// Fold case-distinct readings into one lowercased group.
    pub merge_cases: bool,
    /// Group records by pinyin key instead of returning a flat list.
    pub grouped: bool,
    /// Include entries that are variants of the looked-up word.
    pub allow_variants: bool,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            case_sensitive_search: true,
            merge_cases: false,
            grouped: true,
            allow_variants: true,
        }
    }
}

/// One fully expanded dictionary record.
#[derive(Debug, Clone, PartialEq)]
pub struct WordRecord {
    pub traditional: String,
    pub simplified: String,
    pub pinyin: String,
    pub meanings: Vec<String>,
    pub classifiers: Vec<RefTriple>,
    pub variant_of: Vec<RefTriple>,
    pub is_variant: bool,
}

/// A non-empty lookup result; a query that matches nothing returns
/// `None` instead of an empty container.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup {
    /// Pinyin group key -> records, groups in first-appearance order.
    Grouped(Vec<(String, Vec<WordRecord>)>),
    /// All records, groups concatenated in first-appearance order.
    Flat(Vec<WordRecord>),
}

impl Lookup {
    /// Records under one group key (grouped results only).
    pub fn group(&self, key: &str) -> Option<&[WordRecord]> {
        match self {
            Lookup::Grouped(groups) => groups
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, records)| records.as_slice()),
            Lookup::Flat(_) => None,
        }
    }

    /// Total number of records across all groups.
    pub fn len(&self) -> usize {
        match self {
            Lookup::Grouped(groups) => groups.iter().map(|(_, records)| records.len()).sum(),
            Lookup::Flat(records) => records.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Look up a headword, optionally filtered by pinyin.
///
/// Returns `None` when the headword is unknown or every candidate is
/// filtered out; a returned result always contains at least one
/// record.
pub fn lookup(
    dict: &Dictionary,
    script: Script,
    word: &str,
    pinyin: Option<&str>,
    config: &LookupConfig,
) -> Option<Lookup> {
    let readings = dict.readings(script, word)?;

    // Candidate pinyin keys, in deterministic ordinal order.
    let mut keys: Vec<&String> = match pinyin {
        None => readings.keys().collect(),
        Some(filter) if config.case_sensitive_search => {
            readings.keys().filter(|k| k.as_str() == filter).collect()
        }
        Some(filter) => {
            let folded = filter.to_lowercase();
            readings.keys().filter(|k| k.to_lowercase() == folded).collect()
        }
    };
    keys.sort_unstable();

    // Gather table positions per group key. A position marked as a
    // variant by one key stays a variant no matter which other keys
    // gather it.
    let mut is_variant: FxHashMap<EntryId, bool> = FxHashMap::default();
    let mut groups: Vec<(String, Vec<EntryId>)> = Vec::new();
    for key in keys {
        let bucket = &readings[key];
        let mut gathered: Vec<EntryId> = Vec::new();
        for &id in &bucket.base {
            is_variant.entry(id).or_insert(false);
            gathered.push(id);
        }
        if config.allow_variants {
            for &id in &bucket.variants {
                is_variant.insert(id, true);
                gathered.push(id);
            }
        }
        // A variant-only bucket gathers nothing when variants are
        // disallowed; it must not produce an empty group.
        if gathered.is_empty() {
            continue;
        }
        let group_key = if config.merge_cases {
            key.to_lowercase()
        } else {
            key.clone()
        };
        match groups.iter_mut().find(|(k, _)| *k == group_key) {
            Some((_, ids)) => ids.extend(gathered),
            None => groups.push((group_key, gathered)),
        }
    }

    // Expand positions into records. Within a group, the first record
    // for a (traditional, reading) pair wins; later ones only append
    // their meanings, in gather order.
    let mut shaped: Vec<(String, Vec<WordRecord>)> = Vec::new();
    for (group_key, ids) in groups {
        let mut records: Vec<WordRecord> = Vec::new();
        let mut slots: FxHashMap<(String, String), usize> = FxHashMap::default();
        for id in ids {
            let record = materialize(dict, id, is_variant[&id]);
            let reading = if config.merge_cases {
                record.pinyin.to_lowercase()
            } else {
                record.pinyin.clone()
            };
            let slot_key = (record.traditional.clone(), reading);
            match slots.get(&slot_key) {
                Some(&i) => records[i].meanings.extend(record.meanings),
                None => {
                    slots.insert(slot_key, records.len());
                    records.push(record);
                }
            }
        }
        records.sort_by(|a, b| a.pinyin.cmp(&b.pinyin));
        shaped.push((group_key, records));
    }

    if shaped.is_empty() {
        return None;
    }
    Some(if config.grouped {
        Lookup::Grouped(shaped)
    } else {
        Lookup::Flat(shaped.into_iter().flat_map(|(_, records)| records).collect())
    })
}

/// Expand one table position into a full record.
fn materialize(dict: &Dictionary, id: EntryId, is_variant: bool) -> WordRecord {
    let entry = &dict.entries[id as usize];
    WordRecord {
        traditional: entry.traditional.clone(),
        simplified: entry.simplified.clone(),
        pinyin: entry.pinyin.clone(),
        meanings: entry.meanings.to_vec(),
        classifiers: entry
            .classifier_refs
            .iter()
            .map(|&i| dict.classifier_table[i as usize].clone())
            .collect(),
        variant_of: entry
            .variant_refs
            .iter()
            .map(|&i| dict.variant_table[i as usize].clone())
            .collect(),
        is_variant,
    }
}

impl Dictionary {
    /// Convenience wrapper around [`lookup`].
    pub fn lookup(
        &self,
        script: Script,
        word: &str,
        pinyin: Option<&str>,
        config: &LookupConfig,
    ) -> Option<Lookup> {
        lookup(self, script, word, pinyin, config)
    }
}
