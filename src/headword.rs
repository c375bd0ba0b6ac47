//! Embedded sub-grammars in definition text
//!
//! CC-CEDICT definition segments can embed two recognizable patterns:
//! a cross-reference to the original form of a variant (`variant of
//! 齊|齐[qi2]`) and a classifier list (`CL:個|个[ge4],張|张[zhang1]`).
//! This module locates those patterns inside a segment and parses the
//! headword reference expressions they carry into [`RefTriple`]s.

use memchr::memmem;
use pest::Parser;
use pest::iterators::Pair;
use pest_derive::Parser;

use crate::entry::RefTriple;

#[derive(Parser)]
#[grammar = "headword.pest"]
struct RefParser;

/// Marker introducing a variant cross-reference.
const VARIANT_MARKER: &str = "variant of ";
/// Marker introducing a classifier list.
const CLASSIFIER_MARKER: &str = "CL:";

/// Sub-grammar matches extracted from one definition segment.
#[derive(Debug, Default, PartialEq)]
pub struct SegmentRefs {
    pub variants: Vec<RefTriple>,
    pub classifiers: Vec<RefTriple>,
    /// True when a single recognized pattern spans the whole segment.
    pub consumed: bool,
}

/// Extract every variant-reference and classifier-list match from a
/// trimmed definition segment. Malformed or empty expressions are
/// dropped without error; deduplication is the caller's concern.
pub fn resolve_segment(segment: &str) -> SegmentRefs {
    let mut refs = SegmentRefs::default();

    for start in memmem::find_iter(segment.as_bytes(), VARIANT_MARKER.as_bytes()) {
        let rest = &segment[start + VARIANT_MARKER.len()..];
        if let Some((triple, len)) = parse_reference(rest) {
            refs.variants.push(triple);
            if start == 0 && VARIANT_MARKER.len() + len == segment.len() {
                refs.consumed = true;
            }
        }
    }

    for start in memmem::find_iter(segment.as_bytes(), CLASSIFIER_MARKER.as_bytes()) {
        let rest = &segment[start + CLASSIFIER_MARKER.len()..];
        let (triples, len) = parse_classifier_list(rest);
        if !triples.is_empty() {
            if start == 0 && CLASSIFIER_MARKER.len() + len == segment.len() {
                refs.consumed = true;
            }
            refs.classifiers.extend(triples);
        }
    }

    refs
}

/// Parse one reference expression at the start of `input`. Returns the
/// triple and the number of bytes the expression spans, or `None` when
/// no expression is recognized there.
fn parse_reference(input: &str) -> Option<(RefTriple, usize)> {
    let pair = RefParser::parse(Rule::reference, input).ok()?.next()?;
    let len = pair.as_span().end();
    Some((expression_triple(pair), len))
}

/// Parse a comma-separated classifier list at the start of `input`.
/// The match ends at the first expression that is not a well-formed
/// classifier reference.
fn parse_classifier_list(input: &str) -> (Vec<RefTriple>, usize) {
    let Ok(mut pairs) = RefParser::parse(Rule::classifier_list, input) else {
        return (Vec::new(), 0);
    };
    let Some(list) = pairs.next() else {
        return (Vec::new(), 0);
    };
    let len = list.as_span().end();
    let triples = list
        .into_inner()
        .filter(|item| item.as_rule() == Rule::classifier)
        .map(expression_triple)
        // A classifier must carry a tone-numbered reading.
        .filter(|t| t.pinyin.is_some())
        .collect();
    (triples, len)
}

/// Turn a parsed `reference`/`classifier` pair into a triple. The
/// simplified form defaults to the traditional one when the `|`
/// alternative is absent.
fn expression_triple(pair: Pair<Rule>) -> RefTriple {
    let mut traditional = String::new();
    let mut simplified = None;
    let mut pinyin = None;
    for part in pair.into_inner() {
        match part.as_rule() {
            Rule::form if traditional.is_empty() => traditional = part.as_str().to_string(),
            Rule::form => simplified = Some(part.as_str().to_string()),
            Rule::pinyin => pinyin = syllables(part.as_str()),
            _ => {}
        }
    }
    let simplified = simplified.unwrap_or_else(|| traditional.clone());
    RefTriple {
        traditional,
        simplified,
        pinyin,
    }
}

/// Re-tokenize raw bracket text into space-joined tone-numbered
/// syllables: runs of ASCII letters or `:` closed by a single digit
/// (`lu:4`, `Zhong1`). Anything else, including a trailing partial
/// syllable, is dropped. Returns `None` when nothing matches.
pub fn syllables(raw: &str) -> Option<String> {
    let bytes = raw.as_bytes();
    let mut found: Vec<&str> = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i].is_ascii_alphabetic() || bytes[i] == b':' {
            let start = i;
            while i < bytes.len() && (bytes[i].is_ascii_alphabetic() || bytes[i] == b':') {
                i += 1;
            }
            if i < bytes.len() && bytes[i].is_ascii_digit() {
                found.push(&raw[start..i + 1]);
                i += 1;
            }
        } else {
            i += 1;
        }
    }
    if found.is_empty() {
        None
    } else {
        Some(found.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_syllables_tokenization() {
        assert_eq!(syllables("qian2 bian5"), Some("qian2 bian5".to_string()));
        assert_eq!(syllables("Zhong1 guo2"), Some("Zhong1 guo2".to_string()));
        assert_eq!(syllables("lu:4 shi1"), Some("lu:4 shi1".to_string()));
        // Trailing text without a tone digit is dropped.
        assert_eq!(syllables("ge4 xtra"), Some("ge4".to_string()));
        assert_eq!(syllables(""), None);
        assert_eq!(syllables("no tones here"), None);
    }

    #[test]
    fn test_variant_reference_both_forms() {
        let refs = resolve_segment("variant of 前邊|前边[qian2 bian5]");
        assert_eq!(
            refs.variants,
            vec![RefTriple::new("前邊", "前边", Some("qian2 bian5"))]
        );
        assert!(refs.consumed);
        assert!(refs.classifiers.is_empty());
    }

    #[test]
    fn test_variant_reference_single_form_no_pinyin() {
        let refs = resolve_segment("variant of 着");
        assert_eq!(refs.variants, vec![RefTriple::new("着", "着", None)]);
        assert!(refs.consumed);
    }

    #[test]
    fn test_embedded_variant_keeps_segment() {
        let refs = resolve_segment("old variant of 乾|干[gan1]");
        assert_eq!(refs.variants, vec![RefTriple::new("乾", "干", Some("gan1"))]);
        assert!(!refs.consumed);
    }

    #[test]
    fn test_variant_with_trailing_text() {
        let refs = resolve_segment("variant of 着[zhe5], used after verbs");
        assert_eq!(refs.variants, vec![RefTriple::new("着", "着", Some("zhe5"))]);
        assert!(!refs.consumed);
    }

    #[test]
    fn test_variant_marker_without_expression() {
        let refs = resolve_segment("see the variant of ");
        assert!(refs.variants.is_empty());
        assert!(!refs.consumed);
    }

    #[test]
    fn test_classifier_list() {
        let refs = resolve_segment("CL:件[jian4],套[tao4]");
        assert_eq!(
            refs.classifiers,
            vec![
                RefTriple::new("件", "件", Some("jian4")),
                RefTriple::new("套", "套", Some("tao4")),
            ]
        );
        assert!(refs.consumed);
    }

    #[test]
    fn test_classifier_both_forms() {
        let refs = resolve_segment("CL:個|个[ge4]");
        assert_eq!(refs.classifiers, vec![RefTriple::new("個", "个", Some("ge4"))]);
        assert!(refs.consumed);
    }

    #[test]
    fn test_classifier_without_bracket_dropped() {
        let refs = resolve_segment("CL:個");
        assert!(refs.classifiers.is_empty());
        assert!(!refs.consumed);
    }

    #[test]
    fn test_classifier_list_stops_at_malformed_tail() {
        let refs = resolve_segment("CL:件[jian4],個");
        assert_eq!(refs.classifiers, vec![RefTriple::new("件", "件", Some("jian4"))]);
        assert!(!refs.consumed);
    }

    #[test]
    fn test_plain_definition_matches_nothing() {
        let refs = resolve_segment("front");
        assert_eq!(refs, SegmentRefs::default());
    }
}
