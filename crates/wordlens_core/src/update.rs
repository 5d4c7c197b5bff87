use wordlens_logging::{wl_debug, wl_info, wl_warn};

use crate::marks::MarkRequest;
use crate::state::{Inspection, OccurrencePanel};
use crate::{
    AppState, Effect, Failure, FileHandle, JobPhase, JobState, JobStatus, JobTicket, Msg, Notice,
};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::UploadRequested(file) => request_upload(&mut state, file),
        Msg::UploadAccepted { ticket, job_id } => accept_upload(&mut state, ticket, job_id),
        Msg::UploadFailed { ticket, failure } => {
            if let Some(job) = state.active.as_mut().filter(|job| job.ticket == ticket) {
                job.phase = JobPhase::UploadFailed;
                wl_warn!("Upload for ticket {} failed: {}", ticket, failure);
                state.set_status(format!("upload failed: {failure}"), 100);
            } else {
                discard_stale("upload failure", ticket);
            }
            Vec::new()
        }
        Msg::StatusReceived { ticket, status } => apply_status(&mut state, ticket, status),
        Msg::StatusFailed { ticket, failure } => {
            match state.active.as_mut() {
                Some(job) if job.ticket == ticket && !job.phase.is_terminal() => {
                    job.phase = JobPhase::PollFailed;
                    wl_warn!("Polling for ticket {} failed: {}", ticket, failure);
                    state.set_status(format!("error: {failure}"), 100);
                    vec![Effect::StopPolling]
                }
                _ => {
                    discard_stale("status failure", ticket);
                    Vec::new()
                }
            }
        }
        Msg::TermsLoaded {
            ticket,
            revision,
            terms,
        } => {
            if state.is_current(ticket) && revision == state.terms_revision {
                wl_info!(
                    "Result cache replaced: {} terms (ticket {}, revision {})",
                    terms.len(),
                    ticket,
                    revision
                );
                state.cache.set_results(terms);
                state.mark_dirty();
            } else {
                discard_stale("term list", ticket);
            }
            Vec::new()
        }
        Msg::TermsFailed {
            ticket,
            revision,
            failure,
        } => {
            if state.is_current(ticket) && revision == state.terms_revision {
                wl_warn!("Term refresh failed: {}", failure);
                let progress = state.progress;
                state.set_status(format!("failed to load terms: {failure}"), progress);
            } else {
                discard_stale("term list failure", ticket);
            }
            Vec::new()
        }
        Msg::QueryChanged(query) => {
            state.query = query;
            requery(&mut state)
        }
        Msg::SortChanged(sort) => {
            state.sort = sort;
            requery(&mut state)
        }
        Msg::MinLengthChanged(min_length) => {
            state.min_length = min_length;
            state.requested_page = 1;
            state.mark_dirty();
            Vec::new()
        }
        Msg::PageRequested(page) => {
            let (_, total) = state.current_page();
            go_to_page(&mut state, page.clamp(1, total))
        }
        Msg::NextPage => {
            let (current, total) = state.current_page();
            go_to_page(&mut state, (current + 1).min(total))
        }
        Msg::PrevPage => {
            let (current, _) = state.current_page();
            go_to_page(&mut state, current.saturating_sub(1).max(1))
        }
        Msg::TermInspected(term) => inspect_term(&mut state, term),
        Msg::InspectionClosed => {
            if state.inspection.take().is_some() {
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::OccurrencesLoaded {
            ticket,
            term,
            occurrences,
        } => {
            let applied = match inspection_for(&mut state, ticket, &term) {
                Some(inspection) => {
                    inspection.panel = OccurrencePanel::Loaded(occurrences);
                    true
                }
                None => false,
            };
            if applied {
                state.mark_dirty();
            } else {
                discard_stale("occurrences", ticket);
            }
            Vec::new()
        }
        Msg::OccurrencesFailed {
            ticket,
            term,
            failure,
        } => {
            let applied = match inspection_for(&mut state, ticket, &term) {
                Some(inspection) => {
                    inspection.panel = OccurrencePanel::Failed(failure.to_string());
                    true
                }
                None => false,
            };
            if applied {
                wl_warn!("Loading occurrences of '{}' failed: {}", term, failure);
                state.mark_dirty();
            } else {
                discard_stale("occurrence failure", ticket);
            }
            Vec::new()
        }
        Msg::MarkToggleRequested { index } => request_toggle(&mut state, index),
        Msg::MarkToggled { ticket } => {
            if !state.is_current(ticket) {
                discard_stale("mark toggle", ticket);
                return (state, Vec::new());
            }
            if let Some(inspection) = state.inspection.as_mut() {
                inspection.error = None;
            }
            // The ledger is never updated locally; the refresh is the source of truth.
            fetch_marks(&mut state).into_iter().collect()
        }
        Msg::MarkToggleFailed { ticket, failure } => {
            if state.is_current(ticket) {
                report_mark_failure(&mut state, format!("could not toggle mark: {failure}"));
            } else {
                discard_stale("mark toggle failure", ticket);
            }
            Vec::new()
        }
        Msg::MarksLoaded {
            ticket,
            revision,
            marks,
        } => {
            if state.is_current(ticket) && revision == state.marks_revision {
                wl_debug!(
                    "Mark ledger replaced: {} marks (revision {})",
                    marks.len(),
                    revision
                );
                state.ledger.replace(marks);
                state.mark_dirty();
            } else {
                discard_stale("mark list", ticket);
            }
            Vec::new()
        }
        Msg::MarksFailed {
            ticket,
            revision,
            failure,
        } => {
            if state.is_current(ticket) && revision == state.marks_revision {
                report_mark_failure(&mut state, format!("could not load marks: {failure}"));
            } else {
                discard_stale("mark list failure", ticket);
            }
            Vec::new()
        }
        Msg::AddWordRequested(word) => match non_empty_word(&mut state, &word) {
            Some(word) => vec![Effect::AddWord { word }],
            None => Vec::new(),
        },
        Msg::WordAdded { word, added } => word_added(&mut state, word, added),
        Msg::AddWordFailed { word, failure } => {
            state.raise_alert(format!("could not add '{word}': {failure}"));
            Vec::new()
        }
        Msg::WordsRequested => vec![list_words(&mut state)],
        Msg::WordsLoaded { revision, words } => {
            if revision == state.words_revision {
                state.words = Some(words);
                state.mark_dirty();
            } else {
                wl_debug!("Discarding word list revision {}", revision);
            }
            Vec::new()
        }
        Msg::WordsFailed { revision, failure } => {
            if revision == state.words_revision {
                state.raise_alert(format!("could not list dictionary words: {failure}"));
            } else {
                wl_debug!("Discarding word list failure revision {}", revision);
            }
            Vec::new()
        }
        Msg::RemoveWordRequested(word) => {
            if let Some(word) = non_empty_word(&mut state, &word) {
                state.pending_removal = Some(word);
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::RemoveWordConfirmed => match state.pending_removal.take() {
            Some(word) => {
                state.mark_dirty();
                vec![Effect::RemoveWord { word }]
            }
            None => Vec::new(),
        },
        Msg::RemoveWordCancelled => {
            if state.pending_removal.take().is_some() {
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::WordRemoved(word) => {
            wl_info!("Removed '{}' from the dictionary", word);
            state.post_notice(Notice::WordRemoved(word));
            refresh_words_if_shown(&mut state)
        }
        Msg::RemoveWordFailed { word, failure } => {
            state.raise_alert(format!("could not remove '{word}': {failure}"));
            Vec::new()
        }
        Msg::DictionaryDownloadRequested(dest) => vec![Effect::DownloadDictionary { dest }],
        Msg::DictionarySaved(path) => {
            state.post_notice(Notice::DictionarySaved(path));
            Vec::new()
        }
        Msg::DictionaryReplaceRequested(file) => match validate_file(&mut state, file) {
            Some(file) => vec![Effect::ReplaceDictionary { file }],
            None => Vec::new(),
        },
        Msg::DictionaryReplaced => {
            state.post_notice(Notice::DictionaryReplaced);
            refresh_words_if_shown(&mut state)
        }
        Msg::DictionaryTransferFailed(failure) => {
            state.raise_alert(format!("dictionary transfer failed: {failure}"));
            Vec::new()
        }
        Msg::AlertDismissed => {
            if state.alert.take().is_some() | state.notice.take().is_some() {
                state.mark_dirty();
            }
            Vec::new()
        }
    };

    (state, effects)
}

fn request_upload(state: &mut AppState, file: Option<FileHandle>) -> Vec<Effect> {
    if state.is_uploading() {
        wl_debug!("Upload already in flight; ignoring request");
        return Vec::new();
    }
    let Some(file) = validate_file(state, file) else {
        return Vec::new();
    };

    let ticket = state.begin_job();
    wl_info!(
        "Starting job ticket={} file={} bytes={}",
        ticket,
        file.name,
        file.len
    );
    // The previous poller must be cancelled before anything for the new job runs.
    vec![Effect::StopPolling, Effect::Upload { ticket, file }]
}

fn validate_file(state: &mut AppState, file: Option<FileHandle>) -> Option<FileHandle> {
    match file {
        None => {
            state.raise_alert(Failure::validation("choose a .pdf or .docx file first").to_string());
            None
        }
        Some(file) if file.len == 0 => {
            state.raise_alert(Failure::validation(format!("{} is empty", file.name)).to_string());
            None
        }
        Some(file) => Some(file),
    }
}

fn accept_upload(state: &mut AppState, ticket: JobTicket, job_id: String) -> Vec<Effect> {
    let Some(job) = state
        .active
        .as_mut()
        .filter(|job| job.ticket == ticket && job.phase == JobPhase::Uploading)
    else {
        discard_stale("upload reply", ticket);
        return Vec::new();
    };

    wl_info!("Ticket {} is job {}", ticket, job_id);
    job.job_id = Some(job_id.clone());
    job.phase = JobPhase::Tracking(JobState::Queued);
    state.set_status("uploaded, analysing", 5);
    vec![Effect::StartPolling { ticket, job_id }]
}

fn apply_status(state: &mut AppState, ticket: JobTicket, status: JobStatus) -> Vec<Effect> {
    let Some(job) = state.active.as_mut().filter(|job| job.ticket == ticket) else {
        discard_stale("status", ticket);
        return Vec::new();
    };
    if job.phase.is_terminal() || job.job_id.is_none() {
        wl_debug!("Ignoring status for ticket {} in phase {:?}", ticket, job.phase);
        return Vec::new();
    }

    job.phase = JobPhase::Tracking(status.state);
    match status.state {
        JobState::Queued | JobState::Running => {
            state.set_status(status.display_text(), status.progress);
            Vec::new()
        }
        JobState::Done => {
            wl_info!("Job for ticket {} finished", ticket);
            state.set_status(status.display_text(), status.progress);
            state.requested_page = 1;
            let mut effects = vec![Effect::StopPolling];
            effects.extend(fetch_terms(state));
            effects.extend(fetch_marks(state));
            effects
        }
        JobState::Error => {
            let failure = Failure::TerminalJob(status.display_text().to_string());
            wl_warn!("Job for ticket {} failed: {}", ticket, failure);
            state.set_status(format!("analysis failed: {failure}"), status.progress);
            vec![Effect::StopPolling]
        }
    }
}

/// A fetch of the term list for the finished job, tagged with a new revision.
fn fetch_terms(state: &mut AppState) -> Option<Effect> {
    let (ticket, job_id) = state.completed_job()?;
    state.terms_revision += 1;
    let query = state.query.trim();
    Some(Effect::FetchTerms {
        ticket,
        job_id,
        revision: state.terms_revision,
        query: (!query.is_empty()).then(|| query.to_string()),
        sort: state.sort,
    })
}

/// A ledger refresh for the finished job, tagged with a new revision.
fn fetch_marks(state: &mut AppState) -> Option<Effect> {
    let (ticket, job_id) = state.completed_job()?;
    state.marks_revision += 1;
    Some(Effect::FetchMarks {
        ticket,
        job_id,
        revision: state.marks_revision,
    })
}

fn requery(state: &mut AppState) -> Vec<Effect> {
    state.requested_page = 1;
    state.mark_dirty();
    fetch_terms(state).into_iter().collect()
}

fn go_to_page(state: &mut AppState, page: usize) -> Vec<Effect> {
    if state.requested_page != page {
        state.requested_page = page;
        state.mark_dirty();
    }
    Vec::new()
}

fn inspect_term(state: &mut AppState, term: String) -> Vec<Effect> {
    let term = term.trim().to_string();
    if term.is_empty() {
        state.raise_alert(Failure::validation("which term?").to_string());
        return Vec::new();
    }
    let Some((ticket, job_id)) = state.completed_job() else {
        state.raise_alert(Failure::validation("no finished analysis to inspect").to_string());
        return Vec::new();
    };

    state.inspection = Some(Inspection {
        term: term.clone(),
        panel: OccurrencePanel::Loading,
        error: None,
    });
    state.mark_dirty();
    vec![Effect::FetchOccurrences {
        ticket,
        job_id,
        term,
    }]
}

fn inspection_for<'a>(
    state: &'a mut AppState,
    ticket: JobTicket,
    term: &str,
) -> Option<&'a mut Inspection> {
    if !state.is_current(ticket) {
        return None;
    }
    state
        .inspection
        .as_mut()
        .filter(|inspection| inspection.term == term)
}

fn request_toggle(state: &mut AppState, index: usize) -> Vec<Effect> {
    let request = match state.inspection.as_ref() {
        Some(Inspection {
            term,
            panel: OccurrencePanel::Loaded(occurrences),
            ..
        }) => occurrences
            .get(index)
            .map(|occurrence| MarkRequest::new(term, occurrence)),
        _ => None,
    };
    let (Some(request), Some((ticket, job_id))) = (request, state.completed_job()) else {
        state.raise_alert(Failure::validation(format!("no occurrence #{}", index + 1)).to_string());
        return Vec::new();
    };

    wl_debug!("Toggling mark {}", request.identity());
    vec![Effect::ToggleMark {
        ticket,
        job_id,
        request,
    }]
}

fn report_mark_failure(state: &mut AppState, message: String) {
    wl_warn!("{}", message);
    match state.inspection.as_mut() {
        Some(inspection) => {
            inspection.error = Some(message);
            state.mark_dirty();
        }
        None => state.raise_alert(message),
    }
}

fn non_empty_word(state: &mut AppState, word: &str) -> Option<String> {
    let word = word.trim();
    if word.is_empty() {
        state.raise_alert(Failure::validation("empty word").to_string());
        None
    } else {
        Some(word.to_string())
    }
}

fn word_added(state: &mut AppState, word: String, added: bool) -> Vec<Effect> {
    if !added {
        state.post_notice(Notice::AlreadyInDictionary(word));
        return Vec::new();
    }
    let patched = state.cache.patch_dictionary_flag(&word, true);
    wl_info!("Added '{}' to the dictionary; patched {} cached terms", word, patched);
    state.post_notice(Notice::WordAdded(word));
    refresh_words_if_shown(state)
}

fn list_words(state: &mut AppState) -> Effect {
    state.words_revision += 1;
    Effect::ListWords {
        revision: state.words_revision,
    }
}

fn refresh_words_if_shown(state: &mut AppState) -> Vec<Effect> {
    if state.words.is_some() {
        vec![list_words(state)]
    } else {
        Vec::new()
    }
}

fn discard_stale(what: &str, ticket: JobTicket) {
    wl_debug!("Discarding stale {} for ticket {}", what, ticket);
}
