use std::collections::HashSet;
use std::fmt;

use crate::Occurrence;

/// Composite key for one occurrence of a term.
///
/// Encoded as `page:line:<term length>:term:sentence`. The term is
/// length-prefixed so a `:` inside a term can never make two different
/// occurrences collapse to the same key; the sentence is last and needs no
/// prefix.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MarkId(String);

impl MarkId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MarkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub fn identity_of(page: u32, line: u32, term: &str, sentence: &str) -> MarkId {
    MarkId(format!(
        "{page}:{line}:{}:{term}:{sentence}",
        term.chars().count()
    ))
}

/// A confirmed mark as listed by the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mark {
    pub identity: MarkId,
    pub page: u32,
    pub line: u32,
    pub term: String,
    pub sentence: String,
}

impl Mark {
    pub fn new(page: u32, line: u32, term: impl Into<String>, sentence: impl Into<String>) -> Self {
        let term = term.into();
        let sentence = sentence.into();
        Self {
            identity: identity_of(page, line, &term, &sentence),
            page,
            line,
            term,
            sentence,
        }
    }
}

/// Parameters of a toggle request: the occurrence being flipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkRequest {
    pub term: String,
    pub page: u32,
    pub line: u32,
    pub sentence: String,
}

impl MarkRequest {
    pub fn new(term: &str, occurrence: &Occurrence) -> Self {
        Self {
            term: term.to_string(),
            page: occurrence.page,
            line: occurrence.line,
            sentence: occurrence.sentence.clone(),
        }
    }

    pub fn identity(&self) -> MarkId {
        identity_of(self.page, self.line, &self.term, &self.sentence)
    }
}

/// Read-through cache of the server's marks for the active job.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MarkLedger {
    marks: Vec<Mark>,
    index: HashSet<MarkId>,
}

impl MarkLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the ledger wholesale. Identities are recomputed from the
    /// mark fields rather than trusted from the wire.
    pub fn replace(&mut self, marks: Vec<Mark>) {
        self.index = marks
            .iter()
            .map(|mark| identity_of(mark.page, mark.line, &mark.term, &mark.sentence))
            .collect();
        self.marks = marks;
    }

    pub fn clear(&mut self) {
        self.marks.clear();
        self.index.clear();
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn marks(&self) -> &[Mark] {
        &self.marks
    }

    pub fn contains(&self, identity: &MarkId) -> bool {
        self.index.contains(identity)
    }

    pub fn is_marked(&self, term: &str, occurrence: &Occurrence) -> bool {
        self.contains(&identity_of(
            occurrence.page,
            occurrence.line,
            term,
            &occurrence.sentence,
        ))
    }
}
