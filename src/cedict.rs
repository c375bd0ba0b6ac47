//! CC-CEDICT file parsing
//!
//! Parses CC-CEDICT format text into [`Entry`] values, one entry per
//! line:
//!
//! ```text
//! TRADITIONAL SIMPLIFIED [PINYIN] /definition 1/definition 2/
//! ```
//!
//! `#`-prefixed comment lines and blank lines are ignored. A malformed
//! line is recoverable: the reader logs it and moves on, so a single
//! bad line never aborts a build.

use crate::entry::Entry;
use crate::headword::resolve_segment;
use flate2::read::GzDecoder;
use log::{error, warn};
use rustc_hash::FxHashSet;
use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::Path;
use thiserror::Error;

/// Error for a single unusable dictionary line.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LineError {
    #[error("no definition body after the headword")]
    MissingBody,

    #[error("no pinyin bracket in the headword")]
    MissingPinyin,

    #[error("unclosed pinyin bracket")]
    UnclosedPinyin,

    #[error("headword is not a traditional/simplified pair")]
    MissingHeadword,
}

/// Parse one raw dictionary line.
///
/// Returns `Ok(None)` for blank lines and `#` comments, `Ok(Some(_))`
/// for a well-formed entry line, and an error for a malformed one.
pub fn parse_line(raw: &str) -> Result<Option<Entry>, LineError> {
    let line = raw.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let (head, body) = line.split_once('/').ok_or(LineError::MissingBody)?;

    let (words, reading) = head.split_once('[').ok_or(LineError::MissingPinyin)?;
    let close = reading.find(']').ok_or(LineError::UnclosedPinyin)?;
    // Stored verbatim: case and `:` syllables are significant.
    let pinyin = &reading[..close];
    let (traditional, simplified) = words
        .trim()
        .split_once(' ')
        .ok_or(LineError::MissingHeadword)?;
    if traditional.is_empty() || simplified.is_empty() {
        return Err(LineError::MissingHeadword);
    }

    let mut meanings = Vec::new();
    let mut variant_refs = Vec::new();
    let mut classifier_refs = Vec::new();
    let mut seen_variants = FxHashSet::default();
    let mut seen_classifiers = FxHashSet::default();

    for segment in body.split('/') {
        let segment = segment.trim();
        if segment.is_empty() {
            continue;
        }
        let refs = resolve_segment(segment);
        for r in refs.variants {
            if seen_variants.insert(r.dedup_key()) {
                variant_refs.push(r);
            }
        }
        for r in refs.classifiers {
            if seen_classifiers.insert(r.dedup_key()) {
                classifier_refs.push(r);
            }
        }
        // A segment wholly spanned by one recognized pattern is not a
        // meaning; an embedded pattern keeps the full segment text.
        if !refs.consumed {
            meanings.push(segment.to_string());
        }
    }

    Ok(Some(Entry {
        traditional: traditional.to_string(),
        simplified: simplified.to_string(),
        pinyin: pinyin.to_string(),
        meanings,
        variant_refs,
        classifier_refs,
    }))
}

/// Streaming reader yielding entries from CC-CEDICT text.
///
/// Malformed lines are logged at `warn` and skipped. A read error ends
/// the iteration after logging; the lines before it are still yielded.
pub struct CedictReader<R: BufRead> {
    lines: Lines<R>,
    line_num: usize,
    skipped: usize,
}

impl CedictReader<BufReader<File>> {
    /// Read a plain-text snapshot.
    pub fn from_file(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let file = File::open(path.as_ref())?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl CedictReader<BufReader<GzDecoder<File>>> {
    /// Read a gzip-compressed snapshot, as the dictionary is
    /// distributed.
    pub fn from_gzip(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let file = File::open(path.as_ref())?;
        Ok(Self::new(BufReader::new(GzDecoder::new(file))))
    }
}

impl CedictReader<BufReader<std::io::Cursor<String>>> {
    /// Read from an in-memory string.
    pub fn from_str(text: &str) -> Self {
        Self::new(BufReader::new(std::io::Cursor::new(text.to_string())))
    }
}

impl<R: BufRead> CedictReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line_num: 0,
            skipped: 0,
        }
    }

    /// Number of malformed lines skipped so far.
    pub fn skipped(&self) -> usize {
        self.skipped
    }
}

impl<R: BufRead> Iterator for CedictReader<R> {
    type Item = Entry;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            self.line_num += 1;
            match self.lines.next()? {
                Err(e) => {
                    error!("read error at line {}: {}", self.line_num, e);
                    return None;
                }
                Ok(line) => match parse_line(&line) {
                    Ok(Some(entry)) => return Some(entry),
                    Ok(None) => continue,
                    Err(e) => {
                        self.skipped += 1;
                        warn!("skipping line {}: {}", self.line_num, e);
                        continue;
                    }
                },
            }
        }
    }
}
