use std::path::PathBuf;
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use wordlens_logging::{wl_debug, wl_warn};

use crate::api::{AnalysisApi, ApiSettings, ReqwestApi};
use crate::persist::AtomicFileWriter;
use crate::poll::run_poller;
use crate::{EngineEvent, JobTicket, MarkParams, TransportError, TransportFailure};

#[derive(Debug, Clone)]
pub struct EngineSettings {
    pub api: ApiSettings,
    pub poll_interval: Duration,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            api: ApiSettings::default(),
            poll_interval: Duration::from_secs(1),
        }
    }
}

enum EngineCommand {
    Upload {
        ticket: JobTicket,
        file: PathBuf,
    },
    StartPolling {
        ticket: JobTicket,
        job_id: String,
    },
    StopPolling,
    FetchTerms {
        ticket: JobTicket,
        revision: u64,
        job_id: String,
        query: Option<String>,
        sort: String,
    },
    FetchOccurrences {
        ticket: JobTicket,
        job_id: String,
        term: String,
    },
    ToggleMark {
        ticket: JobTicket,
        job_id: String,
        mark: MarkParams,
    },
    FetchMarks {
        ticket: JobTicket,
        revision: u64,
        job_id: String,
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
        file: PathBuf,
    },
}

pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
}

impl EngineHandle {
    pub fn new(settings: EngineSettings) -> Result<Self, TransportError> {
        let api = Arc::new(ReqwestApi::new(settings.api)?);
        Self::with_api(api, settings.poll_interval)
    }

    /// Engine over any [`AnalysisApi`]; the runtime lives on its own thread.
    pub fn with_api(
        api: Arc<dyn AnalysisApi>,
        poll_interval: Duration,
    ) -> Result<Self, TransportError> {
        let runtime = tokio::runtime::Runtime::new()
            .map_err(|err| TransportError::new(TransportFailure::Io, err.to_string()))?;
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();

        thread::spawn(move || {
            let mut poller: Option<CancellationToken> = None;
            while let Ok(command) = cmd_rx.recv() {
                match command {
                    EngineCommand::StartPolling { ticket, job_id } => {
                        // The previous schedule is dead before the new one exists.
                        if let Some(previous) = poller.take() {
                            previous.cancel();
                        }
                        let token = CancellationToken::new();
                        runtime.spawn(run_poller(
                            api.clone(),
                            ticket,
                            job_id,
                            poll_interval,
                            token.clone(),
                            event_tx.clone(),
                        ));
                        poller = Some(token);
                    }
                    EngineCommand::StopPolling => {
                        if let Some(token) = poller.take() {
                            wl_debug!("stopping poller");
                            token.cancel();
                        }
                    }
                    command => {
                        let api = api.clone();
                        let event_tx = event_tx.clone();
                        runtime.spawn(async move {
                            handle_command(api.as_ref(), command, event_tx).await;
                        });
                    }
                }
            }
            if let Some(token) = poller {
                token.cancel();
            }
        });

        Ok(Self { cmd_tx, event_rx })
    }

    pub fn upload(&self, ticket: JobTicket, file: PathBuf) {
        self.send(EngineCommand::Upload { ticket, file });
    }

    /// Cancels any running poller, then polls `job_id` under `ticket`.
    pub fn start_polling(&self, ticket: JobTicket, job_id: impl Into<String>) {
        self.send(EngineCommand::StartPolling {
            ticket,
            job_id: job_id.into(),
        });
    }

    pub fn stop_polling(&self) {
        self.send(EngineCommand::StopPolling);
    }

    pub fn fetch_terms(
        &self,
        ticket: JobTicket,
        revision: u64,
        job_id: impl Into<String>,
        query: Option<String>,
        sort: impl Into<String>,
    ) {
        self.send(EngineCommand::FetchTerms {
            ticket,
            revision,
            job_id: job_id.into(),
            query,
            sort: sort.into(),
        });
    }

    pub fn fetch_occurrences(
        &self,
        ticket: JobTicket,
        job_id: impl Into<String>,
        term: impl Into<String>,
    ) {
        self.send(EngineCommand::FetchOccurrences {
            ticket,
            job_id: job_id.into(),
            term: term.into(),
        });
    }

    pub fn toggle_mark(&self, ticket: JobTicket, job_id: impl Into<String>, mark: MarkParams) {
        self.send(EngineCommand::ToggleMark {
            ticket,
            job_id: job_id.into(),
            mark,
        });
    }

    pub fn fetch_marks(&self, ticket: JobTicket, revision: u64, job_id: impl Into<String>) {
        self.send(EngineCommand::FetchMarks {
            ticket,
            revision,
            job_id: job_id.into(),
        });
    }

    pub fn add_word(&self, word: impl Into<String>) {
        self.send(EngineCommand::AddWord { word: word.into() });
    }

    pub fn list_words(&self, revision: u64) {
        self.send(EngineCommand::ListWords { revision });
    }

    pub fn remove_word(&self, word: impl Into<String>) {
        self.send(EngineCommand::RemoveWord { word: word.into() });
    }

    pub fn download_dictionary(&self, dest: PathBuf) {
        self.send(EngineCommand::DownloadDictionary { dest });
    }

    pub fn replace_dictionary(&self, file: PathBuf) {
        self.send(EngineCommand::ReplaceDictionary { file });
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }

    fn send(&self, command: EngineCommand) {
        if self.cmd_tx.send(command).is_err() {
            wl_warn!("engine thread is gone; command dropped");
        }
    }
}

async fn handle_command(
    api: &dyn AnalysisApi,
    command: EngineCommand,
    event_tx: mpsc::Sender<EngineEvent>,
) {
    let event = match command {
        EngineCommand::Upload { ticket, file } => EngineEvent::Uploaded {
            ticket,
            result: api.upload(&file).await,
        },
        EngineCommand::FetchTerms {
            ticket,
            revision,
            job_id,
            query,
            sort,
        } => EngineEvent::Terms {
            ticket,
            revision,
            result: api.terms(&job_id, query.as_deref(), &sort).await,
        },
        EngineCommand::FetchOccurrences {
            ticket,
            job_id,
            term,
        } => {
            let result = api.occurrences(&job_id, &term).await;
            EngineEvent::Occurrences {
                ticket,
                term,
                result,
            }
        }
        EngineCommand::ToggleMark {
            ticket,
            job_id,
            mark,
        } => EngineEvent::MarkToggled {
            ticket,
            result: api.toggle_mark(&job_id, &mark).await,
        },
        EngineCommand::FetchMarks {
            ticket,
            revision,
            job_id,
        } => EngineEvent::Marks {
            ticket,
            revision,
            result: api.marks(&job_id).await,
        },
        EngineCommand::AddWord { word } => {
            let result = api.add_word(&word).await;
            EngineEvent::WordAdded { word, result }
        }
        EngineCommand::ListWords { revision } => EngineEvent::Words {
            revision,
            result: api.words().await,
        },
        EngineCommand::RemoveWord { word } => {
            let result = api.remove_word(&word).await;
            EngineEvent::WordRemoved { word, result }
        }
        EngineCommand::DownloadDictionary { dest } => EngineEvent::DictionarySaved {
            result: save_dictionary(api, &dest).await,
        },
        EngineCommand::ReplaceDictionary { file } => EngineEvent::DictionaryReplaced {
            result: api.replace_dictionary(&file).await,
        },
        EngineCommand::StartPolling { .. } | EngineCommand::StopPolling => return,
    };
    let _ = event_tx.send(event);
}

async fn save_dictionary(
    api: &dyn AnalysisApi,
    dest: &std::path::Path,
) -> Result<PathBuf, TransportError> {
    let bytes = api.download_dictionary().await?;
    let (writer, name) = AtomicFileWriter::for_destination(dest)?;
    Ok(writer.write(&name, &bytes)?)
}
