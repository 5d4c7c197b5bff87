use std::fmt;
use std::path::PathBuf;

use serde::Deserialize;

/// Client-side tag for one upload and everything issued under it.
pub type JobTicket = u64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    Uploaded {
        ticket: JobTicket,
        result: Result<String, TransportError>,
    },
    Status {
        ticket: JobTicket,
        result: Result<StatusRecord, TransportError>,
    },
    Terms {
        ticket: JobTicket,
        revision: u64,
        result: Result<Vec<NounRecord>, TransportError>,
    },
    Occurrences {
        ticket: JobTicket,
        term: String,
        result: Result<Vec<OccurrenceRecord>, TransportError>,
    },
    MarkToggled {
        ticket: JobTicket,
        result: Result<ToggleReply, TransportError>,
    },
    Marks {
        ticket: JobTicket,
        revision: u64,
        result: Result<Vec<MarkRecord>, TransportError>,
    },
    WordAdded {
        word: String,
        result: Result<bool, TransportError>,
    },
    Words {
        revision: u64,
        result: Result<Vec<String>, TransportError>,
    },
    WordRemoved {
        word: String,
        result: Result<(), TransportError>,
    },
    DictionarySaved {
        result: Result<PathBuf, TransportError>,
    },
    DictionaryReplaced {
        result: Result<(), TransportError>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RemoteJobState {
    Queued,
    Running,
    Done,
    Error,
}

impl RemoteJobState {
    pub fn is_terminal(self) -> bool {
        matches!(self, RemoteJobState::Done | RemoteJobState::Error)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StatusRecord {
    pub state: RemoteJobState,
    #[serde(default)]
    pub progress: i64,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NounRecord {
    pub noun: String,
    #[serde(default)]
    pub count: u32,
    #[serde(default)]
    pub in_dict: bool,
    #[serde(default)]
    pub maybe_wrong: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OccurrenceRecord {
    pub page: u32,
    pub line: u32,
    #[serde(default)]
    pub sentence: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MarkRecord {
    #[serde(default)]
    pub id: String,
    pub page: u32,
    pub line: u32,
    pub noun: String,
    #[serde(default)]
    pub sentence: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ToggleReply {
    #[serde(default)]
    pub added: bool,
    #[serde(default)]
    pub removed: bool,
    #[serde(default)]
    pub id: String,
}

/// Occurrence a mark toggle applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkParams {
    pub noun: String,
    pub page: u32,
    pub line: u32,
    pub sentence: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UploadReply {
    pub job_id: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AddReply {
    #[serde(default)]
    pub added: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WordsReply {
    #[serde(default)]
    pub words: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct TransportError {
    pub kind: TransportFailure,
    pub message: String,
}

impl TransportError {
    pub fn new(kind: TransportFailure, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// HTTP status code when the service answered with a non-success response.
    pub fn status(&self) -> Option<u16> {
        match self.kind {
            TransportFailure::HttpStatus(code) => Some(code),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportFailure {
    InvalidUrl,
    Network,
    Timeout,
    HttpStatus(u16),
    TooLarge { max_bytes: u64 },
    Decode,
    Io,
}

impl fmt::Display for TransportFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportFailure::InvalidUrl => write!(f, "invalid url"),
            TransportFailure::Network => write!(f, "network error"),
            TransportFailure::Timeout => write!(f, "timeout"),
            TransportFailure::HttpStatus(code) => write!(f, "http status {code}"),
            TransportFailure::TooLarge { max_bytes } => {
                write!(f, "response too large (max {max_bytes})")
            }
            TransportFailure::Decode => write!(f, "undecodable response"),
            TransportFailure::Io => write!(f, "io error"),
        }
    }
}
