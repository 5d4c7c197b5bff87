use std::path::PathBuf;

use crate::{FileHandle, JobTicket, MarkRequest, SortOrder};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Cancel the polling schedule. Must run before any new poller starts.
    StopPolling,
    Upload {
        ticket: JobTicket,
        file: FileHandle,
    },
    StartPolling {
        ticket: JobTicket,
        job_id: String,
    },
    FetchTerms {
        ticket: JobTicket,
        job_id: String,
        revision: u64,
        query: Option<String>,
        sort: SortOrder,
    },
    FetchOccurrences {
        ticket: JobTicket,
        job_id: String,
        term: String,
    },
    ToggleMark {
        ticket: JobTicket,
        job_id: String,
        request: MarkRequest,
    },
    /// Ledger refresh. `revision` orders refreshes for the same job.
    FetchMarks {
        ticket: JobTicket,
        job_id: String,
        revision: u64,
    },
    AddWord {
        word: String,
    },
    ListWords {
        revision: u64,
    },
    RemoveWord {
        word: String,
    },
    DownloadDictionary {
        dest: PathBuf,
    },
    ReplaceDictionary {
        file: FileHandle,
    },
}
