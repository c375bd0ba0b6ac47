//! zidian: indexed lookup for CC-CEDICT Chinese dictionaries
//!
//! Parses CC-CEDICT text into a compact, immutable index and answers
//! headword lookups with pinyin filtering, variant resolution, and
//! classifier enrichment.
//!
//! Pipeline: raw text -> [`cedict::CedictReader`] ->
//! [`index::DictIndex::build`] -> [`dict::Dictionary`] (compacted,
//! serializable) -> [`searcher::lookup`].

pub mod cedict; // CC-CEDICT line parsing
pub mod dict; // Compacted dictionary and artifacts
pub mod entry; // Entry data model
pub mod headword; // Embedded reference sub-grammars
pub mod index; // Character/pinyin index builder
pub mod searcher; // Lookup pipeline

// Re-exports for convenience
pub use cedict::{CedictReader, LineError, parse_line};
pub use dict::{ArtifactError, Dictionary, Script};
pub use entry::{Entry, EntryId, RefTriple};
pub use index::{BuildError, Bucket, DictIndex};
pub use searcher::{Lookup, LookupConfig, WordRecord, lookup};
