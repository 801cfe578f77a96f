//! Atomic text edits against one source snapshot
//!
//! A [`Transaction`] collects insertions, removals and replacements computed
//! from one parsed snapshot and applies them all at once. Nothing is applied if
//! the snapshot is stale or two edits conflict.

use super::ast::Span;
use super::syntax::whole_line_span;
use crate::error::{EventwireError, Result};

// FNV-1a constants for 64-bit hash
const FNV_OFFSET: u64 = 0xcbf29ce484222325;
const FNV_PRIME: u64 = 0x100000001b3;

/// Stable FNV-1a hash of the source text, used as its revision
pub fn revision_of(text: &str) -> u64 {
    let mut hash = FNV_OFFSET;
    for byte in text.bytes() {
        hash ^= byte as u64;
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEdit {
    pub span: Span,
    pub replacement: String,
    /// Insertion order, keeps several inserts at one offset in sequence
    seq: usize,
}

impl TextEdit {
    fn is_deletion(&self) -> bool {
        self.replacement.is_empty() && !self.span.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct Transaction {
    revision: u64,
    edits: Vec<TextEdit>,
}

impl Transaction {
    /// Start a transaction against the given snapshot text
    pub fn new(snapshot: &str) -> Self {
        Self {
            revision: revision_of(snapshot),
            edits: Vec::new(),
        }
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    pub fn len(&self) -> usize {
        self.edits.len()
    }

    pub fn insert(&mut self, offset: usize, text: impl Into<String>) {
        self.push(Span::new(offset, offset), text.into());
    }

    pub fn remove(&mut self, span: Span) {
        self.push(span, String::new());
    }

    /// Remove a span, taking its whole lines when nothing else shares them
    pub fn remove_lines(&mut self, source: &str, span: Span) {
        self.remove(whole_line_span(source, span));
    }

    pub fn replace(&mut self, span: Span, text: impl Into<String>) {
        self.push(span, text.into());
    }

    fn push(&mut self, span: Span, replacement: String) {
        let seq = self.edits.len();
        self.edits.push(TextEdit {
            span,
            replacement,
            seq,
        });
    }

    /// Whether a removal already covers the span
    pub fn removes(&self, span: Span) -> bool {
        self.edits
            .iter()
            .any(|e| e.is_deletion() && e.span.contains(span))
    }

    /// Apply every edit to `source`, or none of them
    pub fn commit(self, source: &str) -> Result<String> {
        let found = revision_of(source);
        if found != self.revision {
            return Err(EventwireError::StaleSnapshot {
                expected: self.revision,
                found,
            });
        }
        let edits = normalize(self.edits);

        for pair in edits.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            if a.span.end > b.span.start {
                return Err(EventwireError::edit(format!(
                    "conflicting edits at bytes {}..{} and {}..{}",
                    a.span.start, a.span.end, b.span.start, b.span.end
                )));
            }
        }
        if let Some(last) = edits.last() {
            if last.span.end > source.len() {
                return Err(EventwireError::edit(format!(
                    "edit past end of source at byte {}",
                    last.span.end
                )));
            }
        }

        let mut out = String::with_capacity(source.len());
        let mut cursor = 0;
        for edit in &edits {
            if !source.is_char_boundary(edit.span.start) || !source.is_char_boundary(edit.span.end)
            {
                return Err(EventwireError::edit(format!(
                    "edit splits a character at byte {}",
                    edit.span.start
                )));
            }
            out.push_str(&source[cursor..edit.span.start]);
            out.push_str(&edit.replacement);
            cursor = edit.span.end;
        }
        out.push_str(&source[cursor..]);
        Ok(out)
    }
}

/// Merge overlapping removals (nested and duplicate ones included), then order
/// everything by position. Inserts at one offset keep their insertion order.
fn normalize(edits: Vec<TextEdit>) -> Vec<TextEdit> {
    let (mut deletions, mut others): (Vec<TextEdit>, Vec<TextEdit>) =
        edits.into_iter().partition(TextEdit::is_deletion);
    deletions.sort_by_key(|e| (e.span.start, e.span.end));
    let mut merged: Vec<TextEdit> = Vec::new();
    for edit in deletions {
        match merged.last_mut() {
            Some(last) if last.span.end > edit.span.start => {
                last.span.end = last.span.end.max(edit.span.end);
            }
            _ => merged.push(edit),
        }
    }
    others.extend(merged);
    others.sort_by(|a, b| {
        a.span
            .start
            .cmp(&b.span.start)
            .then(a.span.end.cmp(&b.span.end))
            .then(a.seq.cmp(&b.seq))
    });
    others
}
