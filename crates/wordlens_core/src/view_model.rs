use crate::paging::PageButton;
use crate::{JobPhase, JobTicket, Notice, SortOrder, Term};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppViewModel {
    pub status_text: String,
    /// Always within `0..=100`.
    pub progress: u8,
    pub job: Option<JobView>,
    /// An upload is in flight; further uploads are ignored.
    pub uploading: bool,
    pub query: String,
    pub sort: SortOrder,
    pub min_length: usize,
    /// Terms in the cache before the minimum-length filter.
    pub total_terms: usize,
    /// Terms left after the minimum-length filter.
    pub shown_terms: usize,
    pub page: PageView,
    pub inspection: Option<InspectionView>,
    /// `None` until the dictionary word list was fetched.
    pub words: Option<Vec<String>>,
    /// Word waiting for the user to confirm its removal.
    pub pending_removal: Option<String>,
    pub alert: Option<String>,
    pub notice: Option<Notice>,
    pub dirty: bool,
}

impl AppViewModel {
    pub fn summary(&self) -> String {
        if self.total_terms == 0 {
            "no terms extracted".to_string()
        } else {
            format!(
                "found {} terms, showing {}",
                self.total_terms, self.shown_terms
            )
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobView {
    pub ticket: JobTicket,
    pub job_id: Option<String>,
    pub phase: JobPhase,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PageView {
    pub rows: Vec<TermRow>,
    pub page: usize,
    pub total_pages: usize,
    pub buttons: Vec<PageButton>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TermRow {
    pub text: String,
    pub count: u32,
    pub in_dictionary: bool,
    pub flagged_suspect: bool,
}

impl From<&Term> for TermRow {
    fn from(term: &Term) -> Self {
        Self {
            text: term.text.clone(),
            count: term.occurrence_count,
            in_dictionary: term.in_dictionary,
            flagged_suspect: term.flagged_suspect,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InspectionView {
    pub term: String,
    /// Aggregate count from the cached term, when it is still cached.
    pub count: Option<u32>,
    pub body: InspectionBody,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InspectionBody {
    Loading,
    Failed(String),
    Loaded(Vec<OccurrenceRow>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OccurrenceRow {
    pub page: u32,
    pub line: u32,
    pub segments: Vec<Segment>,
    pub marked: bool,
}

impl OccurrenceRow {
    pub fn sentence(&self) -> String {
        self.segments.iter().map(Segment::text).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Plain(String),
    /// An appearance of the inspected term.
    Hit(String),
}

impl Segment {
    pub fn text(&self) -> &str {
        match self {
            Self::Plain(text) | Self::Hit(text) => text,
        }
    }
}

/// Splits `sentence` around every non-overlapping appearance of `term`.
pub fn highlight(sentence: &str, term: &str) -> Vec<Segment> {
    if term.is_empty() {
        return vec![Segment::Plain(sentence.to_string())];
    }
    let mut segments = Vec::new();
    let mut rest = sentence;
    while let Some(idx) = rest.find(term) {
        if idx > 0 {
            segments.push(Segment::Plain(rest[..idx].to_string()));
        }
        segments.push(Segment::Hit(term.to_string()));
        rest = &rest[idx + term.len()..];
    }
    if !rest.is_empty() || segments.is_empty() {
        segments.push(Segment::Plain(rest.to_string()));
    }
    segments
}

#[cfg(test)]
mod tests {
    use super::{highlight, Segment};

    #[test]
    fn highlight_marks_each_appearance() {
        assert_eq!(
            highlight("大船出海，船很大。", "船"),
            vec![
                Segment::Plain("大".into()),
                Segment::Hit("船".into()),
                Segment::Plain("出海，".into()),
                Segment::Hit("船".into()),
                Segment::Plain("很大。".into()),
            ]
        );
    }

    #[test]
    fn highlight_without_match_is_plain() {
        assert_eq!(highlight("海", "船"), vec![Segment::Plain("海".into())]);
        assert_eq!(highlight("", "船"), vec![Segment::Plain(String::new())]);
    }
}
