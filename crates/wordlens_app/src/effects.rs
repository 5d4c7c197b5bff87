use std::time::Duration;

use wordlens_core::{
    Effect, Failure, JobState, JobStatus, Mark, Msg, Occurrence, Term,
};
use wordlens_engine::{
    EngineEvent, EngineHandle, EngineSettings, MarkParams, MarkRecord, NounRecord,
    OccurrenceRecord, RemoteJobState, StatusRecord, TransportError,
};
use wordlens_logging::{wl_debug, wl_info, wl_warn};

/// Executes core effects on the engine and turns engine events back into messages.
pub struct EffectRunner {
    engine: EngineHandle,
}

impl EffectRunner {
    pub fn new(settings: EngineSettings) -> Result<Self, TransportError> {
        Ok(Self {
            engine: EngineHandle::new(settings)?,
        })
    }

    pub fn run(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::StopPolling => self.engine.stop_polling(),
                Effect::Upload { ticket, file } => {
                    wl_info!(
                        "Upload ticket={} name={} bytes={}",
                        ticket,
                        file.name,
                        file.len
                    );
                    self.engine.upload(ticket, file.path);
                }
                Effect::StartPolling { ticket, job_id } => {
                    self.engine.start_polling(ticket, job_id);
                }
                Effect::FetchTerms {
                    ticket,
                    job_id,
                    revision,
                    query,
                    sort,
                } => {
                    wl_debug!(
                        "FetchTerms ticket={} revision={} query={:?} sort={}",
                        ticket,
                        revision,
                        query,
                        sort
                    );
                    self.engine
                        .fetch_terms(ticket, revision, job_id, query, sort.as_query());
                }
                Effect::FetchOccurrences {
                    ticket,
                    job_id,
                    term,
                } => self.engine.fetch_occurrences(ticket, job_id, term),
                Effect::ToggleMark {
                    ticket,
                    job_id,
                    request,
                } => self.engine.toggle_mark(
                    ticket,
                    job_id,
                    MarkParams {
                        noun: request.term,
                        page: request.page,
                        line: request.line,
                        sentence: request.sentence,
                    },
                ),
                Effect::FetchMarks {
                    ticket,
                    job_id,
                    revision,
                } => self.engine.fetch_marks(ticket, revision, job_id),
                Effect::AddWord { word } => self.engine.add_word(word),
                Effect::ListWords { revision } => self.engine.list_words(revision),
                Effect::RemoveWord { word } => self.engine.remove_word(word),
                Effect::DownloadDictionary { dest } => self.engine.download_dictionary(dest),
                Effect::ReplaceDictionary { file } => self.engine.replace_dictionary(file.path),
            }
        }
    }

    pub fn try_next(&self) -> Option<Msg> {
        self.engine.try_recv().map(event_to_msg)
    }

    pub fn next_timeout(&self, timeout: Duration) -> Option<Msg> {
        self.engine.recv_timeout(timeout).map(event_to_msg)
    }
}

pub(crate) fn event_to_msg(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::Uploaded { ticket, result } => match result {
            Ok(job_id) => Msg::UploadAccepted { ticket, job_id },
            Err(err) => Msg::UploadFailed {
                ticket,
                failure: map_failure(err),
            },
        },
        EngineEvent::Status { ticket, result } => match result {
            Ok(record) => Msg::StatusReceived {
                ticket,
                status: map_status(record),
            },
            Err(err) => Msg::StatusFailed {
                ticket,
                failure: map_failure(err),
            },
        },
        EngineEvent::Terms {
            ticket,
            revision,
            result,
        } => match result {
            Ok(records) => Msg::TermsLoaded {
                ticket,
                revision,
                terms: records.into_iter().map(map_term).collect(),
            },
            Err(err) => Msg::TermsFailed {
                ticket,
                revision,
                failure: map_failure(err),
            },
        },
        EngineEvent::Occurrences {
            ticket,
            term,
            result,
        } => match result {
            Ok(records) => Msg::OccurrencesLoaded {
                ticket,
                term,
                occurrences: records.into_iter().map(map_occurrence).collect(),
            },
            Err(err) => Msg::OccurrencesFailed {
                ticket,
                term,
                failure: map_failure(err),
            },
        },
        EngineEvent::MarkToggled { ticket, result } => match result {
            Ok(reply) => {
                wl_debug!(
                    "Mark {} added={} removed={}",
                    reply.id,
                    reply.added,
                    reply.removed
                );
                Msg::MarkToggled { ticket }
            }
            Err(err) => Msg::MarkToggleFailed {
                ticket,
                failure: map_failure(err),
            },
        },
        EngineEvent::Marks {
            ticket,
            revision,
            result,
        } => match result {
            Ok(records) => Msg::MarksLoaded {
                ticket,
                revision,
                marks: records.into_iter().map(map_mark).collect(),
            },
            Err(err) => Msg::MarksFailed {
                ticket,
                revision,
                failure: map_failure(err),
            },
        },
        EngineEvent::WordAdded { word, result } => match result {
            Ok(added) => Msg::WordAdded { word, added },
            Err(err) => Msg::AddWordFailed {
                word,
                failure: map_failure(err),
            },
        },
        EngineEvent::Words { revision, result } => match result {
            Ok(words) => Msg::WordsLoaded { revision, words },
            Err(err) => Msg::WordsFailed {
                revision,
                failure: map_failure(err),
            },
        },
        EngineEvent::WordRemoved { word, result } => match result {
            Ok(()) => Msg::WordRemoved(word),
            Err(err) => Msg::RemoveWordFailed {
                word,
                failure: map_failure(err),
            },
        },
        EngineEvent::DictionarySaved { result } => match result {
            Ok(path) => Msg::DictionarySaved(path),
            Err(err) => Msg::DictionaryTransferFailed(map_failure(err)),
        },
        EngineEvent::DictionaryReplaced { result } => match result {
            Ok(()) => Msg::DictionaryReplaced,
            Err(err) => Msg::DictionaryTransferFailed(map_failure(err)),
        },
    }
}

fn map_failure(err: TransportError) -> Failure {
    wl_warn!("Request failed ({}): {}", err.kind, err.message);
    Failure::transport(err.status(), err.message)
}

fn map_status(record: StatusRecord) -> JobStatus {
    let state = match record.state {
        RemoteJobState::Queued => JobState::Queued,
        RemoteJobState::Running => JobState::Running,
        RemoteJobState::Done => JobState::Done,
        RemoteJobState::Error => JobState::Error,
    };
    JobStatus::new(state, record.progress, record.message)
}

fn map_term(record: NounRecord) -> Term {
    Term {
        text: record.noun,
        occurrence_count: record.count,
        in_dictionary: record.in_dict,
        flagged_suspect: record.maybe_wrong,
    }
}

fn map_occurrence(record: OccurrenceRecord) -> Occurrence {
    Occurrence {
        page: record.page,
        line: record.line,
        sentence: record.sentence,
    }
}

/// The service id is ignored; identity is recomputed from the fields.
fn map_mark(record: MarkRecord) -> Mark {
    Mark::new(record.page, record.line, record.noun, record.sentence)
}
