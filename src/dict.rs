//! Compacted dictionary and on-disk artifacts
//!
//! [`Dictionary`] is the published form of a built index: repeated
//! variant/classifier reference triples are deduplicated into shared
//! lookup tables and entries hold table positions instead of inline
//! triples. The whole structure serializes with bincode, so a build
//! can be loaded without re-parsing the source text.
//!
//! A `Dictionary` is immutable once constructed: there are no `&mut`
//! methods, and it is safe to share behind an `Arc` for unbounded
//! concurrent readers. Hot reloading means swapping the whole value,
//! never mutating in place.

use crate::entry::{Entry, RefTriple};
use crate::index::{BuildError, CharMap, DictIndex, PinyinMap};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use thiserror::Error;

/// Which character index a lookup consults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Script {
    Traditional,
    Simplified,
}

/// Save/load faults for dictionary artifacts.
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("artifact encoding error: {0}")]
    Encode(#[from] bincode::Error),
}

/// Meanings storage: a single definition collapses to a bare string
/// and is expanded back at query time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) enum Meanings {
    One(String),
    Many(Vec<String>),
}

impl Meanings {
    fn from_vec(mut meanings: Vec<String>) -> Self {
        if meanings.len() == 1 {
            Meanings::One(meanings.remove(0))
        } else {
            Meanings::Many(meanings)
        }
    }

    pub(crate) fn to_vec(&self) -> Vec<String> {
        match self {
            Meanings::One(meaning) => vec![meaning.clone()],
            Meanings::Many(meanings) => meanings.clone(),
        }
    }
}

/// One entry in the compacted table; refs are lookup-table positions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct CompactEntry {
    pub traditional: String,
    pub simplified: String,
    pub pinyin: String,
    pub meanings: Meanings,
    pub variant_refs: Vec<u32>,
    pub classifier_refs: Vec<u32>,
}

/// Immutable, query-ready dictionary.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Dictionary {
    pub(crate) entries: Vec<CompactEntry>,
    pub(crate) variant_table: Vec<RefTriple>,
    pub(crate) classifier_table: Vec<RefTriple>,
    pub(crate) traditional: CharMap,
    pub(crate) simplified: CharMap,
}

impl Dictionary {
    /// Build and compact in one step.
    pub fn from_entries(entries: impl IntoIterator<Item = Entry>) -> Result<Self, BuildError> {
        Ok(DictIndex::build(entries)?.compact())
    }

    /// Compact a built index: distinct ref triples get stable
    /// first-seen lookup-table positions, inline triples become table
    /// indices, and single-element meanings collapse.
    pub fn from_index(index: DictIndex) -> Self {
        let mut variant_table = LookupTable::default();
        let mut classifier_table = LookupTable::default();
        let entries = index
            .entries
            .into_iter()
            .map(|entry| CompactEntry {
                traditional: entry.traditional,
                simplified: entry.simplified,
                pinyin: entry.pinyin,
                meanings: Meanings::from_vec(entry.meanings),
                variant_refs: entry
                    .variant_refs
                    .into_iter()
                    .map(|r| variant_table.intern(r))
                    .collect(),
                classifier_refs: entry
                    .classifier_refs
                    .into_iter()
                    .map(|r| classifier_table.intern(r))
                    .collect(),
            })
            .collect();
        Self {
            entries,
            variant_table: variant_table.rows,
            classifier_table: classifier_table.rows,
            traditional: index.traditional,
            simplified: index.simplified,
        }
    }

    /// Number of entries in the table.
    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of distinct headwords in one script's index.
    pub fn headword_count(&self, script: Script) -> usize {
        self.char_map(script).len()
    }

    pub(crate) fn char_map(&self, script: Script) -> &CharMap {
        match script {
            Script::Traditional => &self.traditional,
            Script::Simplified => &self.simplified,
        }
    }

    pub(crate) fn readings(&self, script: Script, word: &str) -> Option<&PinyinMap> {
        self.char_map(script).get(word)
    }

    /// Serialize to a bincode artifact at `path`.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ArtifactError> {
        let file = File::create(path.as_ref())?;
        let writer = BufWriter::new(file);
        bincode::serialize_into(writer, self)?;
        Ok(())
    }

    /// Load a bincode artifact produced by [`Dictionary::save`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ArtifactError> {
        let file = File::open(path.as_ref())?;
        let reader = BufReader::new(file);
        Ok(bincode::deserialize_from(reader)?)
    }
}

impl DictIndex {
    /// Compact this index into the publishable layout.
    pub fn compact(self) -> Dictionary {
        Dictionary::from_index(self)
    }
}

/// Deduplicating triple table; first-seen order is the stored order.
#[derive(Default)]
struct LookupTable {
    rows: Vec<RefTriple>,
    positions: FxHashMap<RefTriple, u32>,
}

impl LookupTable {
    fn intern(&mut self, triple: RefTriple) -> u32 {
        if let Some(&i) = self.positions.get(&triple) {
            return i;
        }
        let i = self.rows.len() as u32;
        self.positions.insert(triple.clone(), i);
        self.rows.push(triple);
        i
    }
}
