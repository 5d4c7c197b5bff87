use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Client-side tag for one upload. Every job-scoped request carries the ticket
/// it was issued under so late responses for a superseded job can be dropped.
pub type JobTicket = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Queued,
    Running,
    Done,
    Error,
}

impl JobState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Error)
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::Running => "running",
            Self::Done => "done",
            Self::Error => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobStatus {
    pub state: JobState,
    pub progress: u8,
    pub message: String,
}

impl JobStatus {
    /// Builds a status, clamping the reported progress into `0..=100`.
    pub fn new(state: JobState, progress: i64, message: impl Into<String>) -> Self {
        Self {
            state,
            progress: progress.clamp(0, 100) as u8,
            message: message.into(),
        }
    }

    /// Text for the status line: the service message, or the state name when empty.
    pub fn display_text(&self) -> &str {
        let message = self.message.trim();
        if message.is_empty() {
            self.state.label()
        } else {
            message
        }
    }
}

/// An extracted vocabulary item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Term {
    pub text: String,
    pub occurrence_count: u32,
    pub in_dictionary: bool,
    pub flagged_suspect: bool,
}

impl Term {
    /// Length in characters, which is what the minimum-length filter compares.
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Occurrence {
    pub page: u32,
    pub line: u32,
    pub sentence: String,
}

/// Server-side ordering of the term list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    CountDesc,
    CountAsc,
    Alpha,
}

impl SortOrder {
    /// Value of the `sort` query parameter.
    pub fn as_query(self) -> &'static str {
        match self {
            Self::CountDesc => "count_desc",
            Self::CountAsc => "count_asc",
            Self::Alpha => "alpha",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_query())
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "count_desc" => Ok(Self::CountDesc),
            "count_asc" => Ok(Self::CountAsc),
            "alpha" => Ok(Self::Alpha),
            other => Err(format!(
                "unknown sort order '{other}' (expected count_desc, count_asc or alpha)"
            )),
        }
    }
}

/// A file the user picked for upload, already inspected by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileHandle {
    pub path: PathBuf,
    pub name: String,
    pub len: u64,
}
