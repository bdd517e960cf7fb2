//! Markdown-to-prose cleanup for layout.
//!
//! Pure string transform, no I/O. Idempotent: a second pass is a no-op.

use once_cell::sync::Lazy;
use regex::Regex;

static BULLET_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^\s*[-•]\s*").unwrap());
static HEADING_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^\s*#+\s*").unwrap());
static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static SENTENCE_GAP_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"([.!?])\s*([A-Z])").unwrap());
static SPACE_BEFORE_PUNCT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+([.,!?;:])").unwrap());

/// Strip emphasis, bullet, and heading markers, collapse whitespace, and fix
/// spacing around sentence punctuation. The result is a single prose line.
pub fn normalize(text: &str) -> String {
    let text = text.replace("**", "");
    let text = text.replace('*', "");
    let text = BULLET_RE.replace_all(&text, "");
    let text = HEADING_RE.replace_all(&text, "");
    let text = WHITESPACE_RE.replace_all(&text, " ");
    let text = SENTENCE_GAP_RE.replace_all(&text, "$1 $2");
    let text = SPACE_BEFORE_PUNCT_RE.replace_all(&text, "$1");
    text.trim().to_string()
}
