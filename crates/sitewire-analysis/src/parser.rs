//! Deterministic extraction of structured fields from free-form analysis
//! text.
//!
//! `parse_analysis` is a pure function: no I/O, no randomness, no clock.
//! Fields that cannot be extracted fall back to fixed defaults, so parsing
//! never fails.  Extraction is plain byte scanning; positions are computed
//! on an ASCII-lowercased copy of the input, which keeps byte offsets valid
//! in the original text.

use serde::{Deserialize, Serialize};

use sitewire_shared::types::{ReportKind, Severity};

/// Confidence assumed when the text carries no recognizable confidence token.
pub const DEFAULT_CONFIDENCE: f64 = 0.8;

/// Single recommendation returned when no recommendations section is found.
pub const FALLBACK_RECOMMENDATION: &str = "Review the analysis and take appropriate action";

/// Structured result of one analysis pass.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalysisResult {
    /// The report kind the text was analyzed for.
    pub kind: ReportKind,
    /// Extracted severity.  Only computed for issue reports; defaults to
    /// `Medium` when absent or unrecognized.
    pub severity: Option<Severity>,
    /// The full input text, unmodified.
    pub description: String,
    /// Extracted recommendation lines, bullet markers stripped.
    pub recommendations: Vec<String>,
    /// Extracted confidence.  Out-of-range values pass through unclamped.
    pub confidence: f64,
}

/// Convert one block of unstructured analysis text into a structured result.
pub fn parse_analysis(text: &str, kind: ReportKind) -> AnalysisResult {
    let severity = match kind {
        ReportKind::Issue => Some(extract_severity(text).unwrap_or(Severity::Medium)),
        ReportKind::Progress => None,
    };

    AnalysisResult {
        kind,
        severity,
        description: text.to_string(),
        recommendations: extract_recommendations(text)
            .unwrap_or_else(|| vec![FALLBACK_RECOMMENDATION.to_string()]),
        confidence: extract_confidence(text).unwrap_or(DEFAULT_CONFIDENCE),
    }
}

/// ASCII-lowercased copy of `text`.  Byte-wise, so every offset into the
/// result is a valid offset into `text`.
fn ascii_lower(text: &str) -> Vec<u8> {
    text.bytes().map(|b| b.to_ascii_lowercase()).collect()
}

/// All start offsets of `needle` in `haystack`.
fn occurrences(haystack: &[u8], needle: &[u8]) -> Vec<usize> {
    if needle.is_empty() || haystack.len() < needle.len() {
        return Vec::new();
    }
    (0..=haystack.len() - needle.len())
        .filter(|&i| &haystack[i..i + needle.len()] == needle)
        .collect()
}

/// Advance past any run of `:` and ASCII whitespace.
fn skip_separators(bytes: &[u8], mut i: usize) -> usize {
    while i < bytes.len() && (bytes[i] == b':' || bytes[i].is_ascii_whitespace()) {
        i += 1;
    }
    i
}

/// Find a `confidence` token followed by a floating-point number.  Each
/// occurrence is tried in order; an occurrence not directly followed (after
/// separators) by a digit is skipped.
fn extract_confidence(text: &str) -> Option<f64> {
    let lower = ascii_lower(text);
    for pos in occurrences(&lower, b"confidence") {
        let start = skip_separators(&lower, pos + b"confidence".len());
        if start >= lower.len() || !lower[start].is_ascii_digit() {
            continue;
        }
        let mut end = start;
        while end < lower.len() && lower[end].is_ascii_digit() {
            end += 1;
        }
        if end < lower.len() && lower[end] == b'.' {
            end += 1;
            while end < lower.len() && lower[end].is_ascii_digit() {
                end += 1;
            }
        }
        if let Ok(value) = text[start..end].parse::<f64>() {
            return Some(value);
        }
    }
    None
}

/// Find a `severity` token followed by `low`, `medium` or `high`.
fn extract_severity(text: &str) -> Option<Severity> {
    let lower = ascii_lower(text);
    for pos in occurrences(&lower, b"severity") {
        let start = skip_separators(&lower, pos + b"severity".len());
        let rest = &lower[start..];
        if rest.starts_with(b"low") {
            return Some(Severity::Low);
        }
        if rest.starts_with(b"medium") {
            return Some(Severity::Medium);
        }
        if rest.starts_with(b"high") {
            return Some(Severity::High);
        }
    }
    None
}

/// Locate a recommendations/actions section and split its body into cleaned
/// lines.  Returns `None` when no header token exists at all; a header with
/// an empty body yields an empty list.
fn extract_recommendations(text: &str) -> Option<Vec<String>> {
    let lower = ascii_lower(text);

    // Earliest header wins, whichever token it is.
    let header = ["recommendation", "action"]
        .iter()
        .filter_map(|token| {
            occurrences(&lower, token.as_bytes())
                .first()
                .map(|&pos| (pos, token.len()))
        })
        .min_by_key(|&(pos, _)| pos)?;

    let (pos, token_len) = header;
    let mut start = pos + token_len;
    if start < lower.len() && lower[start] == b's' {
        start += 1;
    }
    start = skip_separators(&lower, start);

    // The body runs to the first blank line or line starting with an
    // uppercase letter, or to the end of the text.
    let bytes = text.as_bytes();
    let mut end = bytes.len();
    for i in start..bytes.len().saturating_sub(1) {
        if bytes[i] == b'\n' && (bytes[i + 1] == b'\n' || bytes[i + 1].is_ascii_uppercase()) {
            end = i;
            break;
        }
    }

    let lines = text[start..end]
        .lines()
        .map(strip_bullet)
        .filter(|line| !line.is_empty())
        .collect();
    Some(lines)
}

/// Strip leading bullet markers (dashes, bullet glyphs, `N.` prefixes) and
/// surrounding whitespace from one recommendation line.
fn strip_bullet(line: &str) -> String {
    line.trim_start_matches(|c: char| {
        matches!(c, '-' | '\u{2022}' | '*' | '.') || c.is_ascii_digit() || c.is_whitespace()
    })
    .trim()
    .to_string()
}
