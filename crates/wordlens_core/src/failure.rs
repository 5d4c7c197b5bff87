use std::path::PathBuf;

/// A user-visible failure. None of these are retried.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Failure {
    /// Network or HTTP failure reported by the transport.
    #[error("{message}")]
    Transport {
        status: Option<u16>,
        message: String,
    },
    /// Bad input caught before any request was made.
    #[error("{0}")]
    Validation(String),
    /// The service reported `state = error` for the job.
    #[error("{0}")]
    TerminalJob(String),
}

impl Failure {
    pub fn transport(status: Option<u16>, message: impl Into<String>) -> Self {
        Self::Transport {
            status,
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}

/// Normal outcomes worth telling the user about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    WordAdded(String),
    /// `added: false` from the service. Not a failure.
    AlreadyInDictionary(String),
    WordRemoved(String),
    DictionarySaved(PathBuf),
    DictionaryReplaced,
}

impl Notice {
    pub fn text(&self) -> String {
        match self {
            Self::WordAdded(word) => format!("added '{word}' to the dictionary"),
            Self::AlreadyInDictionary(word) => format!("'{word}' is already in the dictionary"),
            Self::WordRemoved(word) => format!("removed '{word}' from the dictionary"),
            Self::DictionarySaved(path) => format!("dictionary saved to {}", path.display()),
            Self::DictionaryReplaced => "dictionary replaced".to_string(),
        }
    }
}
