use std::path::PathBuf;

use crate::{Failure, FileHandle, JobStatus, JobTicket, Mark, Occurrence, SortOrder, Term};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User asked to analyse a file. `None` when nothing usable was picked.
    UploadRequested(Option<FileHandle>),
    /// Service accepted the upload and created a job.
    UploadAccepted { ticket: JobTicket, job_id: String },
    UploadFailed { ticket: JobTicket, failure: Failure },
    /// One polling tick completed.
    StatusReceived { ticket: JobTicket, status: JobStatus },
    StatusFailed { ticket: JobTicket, failure: Failure },
    /// Result fetch completed. `revision` identifies the query it answers.
    TermsLoaded {
        ticket: JobTicket,
        revision: u64,
        terms: Vec<Term>,
    },
    TermsFailed {
        ticket: JobTicket,
        revision: u64,
        failure: Failure,
    },
    /// User edited the search box.
    QueryChanged(String),
    SortChanged(SortOrder),
    MinLengthChanged(usize),
    PageRequested(usize),
    NextPage,
    PrevPage,
    /// User opened the occurrence panel for a term.
    TermInspected(String),
    InspectionClosed,
    OccurrencesLoaded {
        ticket: JobTicket,
        term: String,
        occurrences: Vec<Occurrence>,
    },
    OccurrencesFailed {
        ticket: JobTicket,
        term: String,
        failure: Failure,
    },
    /// User flipped the mark on the n-th occurrence (0-based) of the open panel.
    MarkToggleRequested { index: usize },
    MarkToggled { ticket: JobTicket },
    MarkToggleFailed { ticket: JobTicket, failure: Failure },
    /// Ledger refresh completed. Only the latest `revision` is applied.
    MarksLoaded {
        ticket: JobTicket,
        revision: u64,
        marks: Vec<Mark>,
    },
    MarksFailed {
        ticket: JobTicket,
        revision: u64,
        failure: Failure,
    },
    AddWordRequested(String),
    WordAdded { word: String, added: bool },
    AddWordFailed { word: String, failure: Failure },
    WordsRequested,
    WordsLoaded {
        revision: u64,
        words: Vec<String>,
    },
    WordsFailed {
        revision: u64,
        failure: Failure,
    },
    /// First step of a removal; nothing is sent until confirmed.
    RemoveWordRequested(String),
    RemoveWordConfirmed,
    RemoveWordCancelled,
    WordRemoved(String),
    RemoveWordFailed { word: String, failure: Failure },
    DictionaryDownloadRequested(PathBuf),
    DictionarySaved(PathBuf),
    DictionaryReplaceRequested(Option<FileHandle>),
    DictionaryReplaced,
    DictionaryTransferFailed(Failure),
    /// The presentation layer has shown the current alert/notice.
    AlertDismissed,
}
