//! Dictionary entry data model
//!
//! A parsed CC-CEDICT entry and the headword cross-references its
//! definition text can embed. These types are what the line parser
//! produces and what the index builder consumes.

use serde::{Deserialize, Serialize};

/// Position of an entry in the entry table. Stable for the lifetime of
/// one build; a rebuild replaces the table wholesale.
pub type EntryId = u32;

/// A headword cross-reference as written in CC-CEDICT definition text,
/// e.g. `前邊|前边[qian2 bian5]` or a bare `着`.
///
/// The first written form is the traditional one; the simplified form
/// defaults to it when the `|` alternative is absent. The pinyin is
/// `None` when the reference carries no bracket.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RefTriple {
    pub traditional: String,
    pub simplified: String,
    pub pinyin: Option<String>,
}

impl RefTriple {
    pub fn new(traditional: &str, simplified: &str, pinyin: Option<&str>) -> Self {
        Self {
            traditional: traditional.to_string(),
            simplified: simplified.to_string(),
            pinyin: pinyin.map(str::to_string),
        }
    }

    /// Composite identity for first-seen deduplication. Headword forms
    /// can never contain `|` (it delimits the two forms in the source),
    /// so the join is unambiguous.
    pub fn dedup_key(&self) -> String {
        format!(
            "{}|{}|{}",
            self.traditional,
            self.simplified,
            self.pinyin.as_deref().unwrap_or("")
        )
    }
}

/// One dictionary entry.
///
/// `meanings` is order-significant (the first meaning is the primary
/// one). The ref lists are deduplicated by composite triple equality in
/// first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub traditional: String,
    pub simplified: String,
    /// Raw bracket contents from the source line, case preserved.
    pub pinyin: String,
    pub meanings: Vec<String>,
    pub variant_refs: Vec<RefTriple>,
    pub classifier_refs: Vec<RefTriple>,
}

impl Entry {
    /// True for entries that declare themselves a variant of another
    /// headword.
    pub fn is_variant(&self) -> bool {
        !self.variant_refs.is_empty()
    }
}
