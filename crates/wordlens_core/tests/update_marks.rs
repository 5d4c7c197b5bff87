use std::path::PathBuf;
use std::sync::Once;

use pretty_assertions::assert_eq;
use wordlens_core::{
    identity_of, update, AppState, Effect, Failure, FileHandle, InspectionBody, JobState,
    JobStatus, Mark, MarkRequest, Msg, Occurrence, Term,
};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(wordlens_logging::initialize_for_tests);
}

/// Server-side mark storage: toggling flips membership by identity.
#[derive(Default)]
struct FakeMarkStore {
    marks: Vec<Mark>,
}

impl FakeMarkStore {
    fn toggle(&mut self, request: &MarkRequest) {
        let id = request.identity();
        let before = self.marks.len();
        self.marks.retain(|mark| mark.identity != id);
        if self.marks.len() == before {
            self.marks.push(Mark::new(
                request.page,
                request.line,
                request.term.clone(),
                request.sentence.clone(),
            ));
        }
    }
}

/// Runs job-scoped mark effects against the fake store until none remain.
fn drive(mut state: AppState, mut effects: Vec<Effect>, store: &mut FakeMarkStore) -> AppState {
    while let Some(effect) = effects.pop() {
        let msg = match effect {
            Effect::ToggleMark {
                ticket, request, ..
            } => {
                store.toggle(&request);
                Msg::MarkToggled { ticket }
            }
            Effect::FetchMarks {
                ticket, revision, ..
            } => Msg::MarksLoaded {
                ticket,
                revision,
                marks: store.marks.clone(),
            },
            _ => continue,
        };
        let (next, more) = update(state, msg);
        state = next;
        effects.extend(more);
    }
    state
}

fn boat_occurrences() -> Vec<Occurrence> {
    vec![
        Occurrence {
            page: 2,
            line: 5,
            sentence: "大船出海。".to_string(),
        },
        Occurrence {
            page: 2,
            line: 5,
            sentence: "船回港了。".to_string(),
        },
    ]
}

/// Finished job with the occurrence panel for 船 open and loaded.
fn inspecting_boat() -> AppState {
    let handle = FileHandle {
        path: PathBuf::from("doc.pdf"),
        name: "doc.pdf".to_string(),
        len: 10,
    };
    let (state, _) = update(AppState::new(), Msg::UploadRequested(Some(handle)));
    let (state, _) = update(
        state,
        Msg::UploadAccepted {
            ticket: 1,
            job_id: "X".to_string(),
        },
    );
    let (state, _) = update(
        state,
        Msg::StatusReceived {
            ticket: 1,
            status: JobStatus::new(JobState::Done, 100, ""),
        },
    );
    let (state, _) = update(
        state,
        Msg::TermsLoaded {
            ticket: 1,
            revision: 1,
            terms: vec![Term {
                text: "船".to_string(),
                occurrence_count: 2,
                in_dictionary: false,
                flagged_suspect: false,
            }],
        },
    );
    let (state, effects) = update(state, Msg::TermInspected("船".to_string()));
    assert_eq!(
        effects,
        vec![Effect::FetchOccurrences {
            ticket: 1,
            job_id: "X".to_string(),
            term: "船".to_string(),
        }]
    );
    let (state, _) = update(
        state,
        Msg::OccurrencesLoaded {
            ticket: 1,
            term: "船".to_string(),
            occurrences: boat_occurrences(),
        },
    );
    state
}

fn marked_flags(state: &AppState) -> Vec<bool> {
    match state.view().inspection.expect("inspection").body {
        InspectionBody::Loaded(rows) => rows.iter().map(|row| row.marked).collect(),
        other => panic!("unexpected body {other:?}"),
    }
}

#[test]
fn toggle_refreshes_ledger_instead_of_predicting() {
    init_logging();
    let state = inspecting_boat();
    let (state, effects) = update(state, Msg::MarkToggleRequested { index: 0 });
    assert_eq!(
        effects,
        vec![Effect::ToggleMark {
            ticket: 1,
            job_id: "X".to_string(),
            request: MarkRequest {
                term: "船".to_string(),
                page: 2,
                line: 5,
                sentence: "大船出海。".to_string(),
            },
        }]
    );
    // Nothing changes locally until the refreshed ledger arrives.
    assert_eq!(marked_flags(&state), vec![false, false]);

    let (state, effects) = update(state, Msg::MarkToggled { ticket: 1 });
    assert_eq!(
        effects,
        vec![Effect::FetchMarks {
            ticket: 1,
            job_id: "X".to_string(),
            revision: 2,
        }]
    );
    assert_eq!(marked_flags(&state), vec![false, false]);
}

#[test]
fn toggling_twice_restores_membership() {
    init_logging();
    let mut store = FakeMarkStore::default();
    let boat = identity_of(2, 5, "船", "大船出海。");

    let state = inspecting_boat();
    let (state, effects) = update(state, Msg::MarkToggleRequested { index: 0 });
    let state = drive(state, effects, &mut store);
    assert!(state.ledger().contains(&boat));
    assert_eq!(marked_flags(&state), vec![true, false]);

    let (state, effects) = update(state, Msg::MarkToggleRequested { index: 0 });
    let state = drive(state, effects, &mut store);
    assert!(!state.ledger().contains(&boat));
    assert_eq!(marked_flags(&state), vec![false, false]);
}

#[test]
fn same_line_different_sentence_is_a_different_mark() {
    init_logging();
    let mut store = FakeMarkStore::default();
    let state = inspecting_boat();
    let (state, effects) = update(state, Msg::MarkToggleRequested { index: 1 });
    let state = drive(state, effects, &mut store);

    assert_eq!(marked_flags(&state), vec![false, true]);
    assert_eq!(state.ledger().len(), 1);
}

#[test]
fn toggle_of_unknown_occurrence_is_rejected() {
    init_logging();
    let state = inspecting_boat();
    let (state, effects) = update(state, Msg::MarkToggleRequested { index: 7 });
    assert!(effects.is_empty());
    assert_eq!(state.view().alert.as_deref(), Some("no occurrence #8"));
}

#[test]
fn mark_failures_stay_in_the_panel() {
    init_logging();
    let state = inspecting_boat();
    let (state, effects) = update(
        state,
        Msg::MarkToggleFailed {
            ticket: 1,
            failure: Failure::transport(Some(400), "noun required"),
        },
    );
    assert!(effects.is_empty());
    let view = state.view();
    assert_eq!(
        view.inspection.unwrap().error.as_deref(),
        Some("could not toggle mark: noun required")
    );
    assert!(view.alert.is_none());
    assert_eq!(state.active_ticket(), Some(1));
    assert_eq!(state.cache().len(), 1);
}

#[test]
fn occurrence_failure_is_scoped_to_panel() {
    init_logging();
    let state = inspecting_boat();
    let (state, _) = update(state, Msg::TermInspected("船".to_string()));
    let (state, _) = update(
        state,
        Msg::OccurrencesFailed {
            ticket: 1,
            term: "船".to_string(),
            failure: Failure::transport(Some(500), "HTTP 500"),
        },
    );
    let view = state.view();
    assert_eq!(
        view.inspection.unwrap().body,
        InspectionBody::Failed("HTTP 500".to_string())
    );
    assert!(view.job.unwrap().phase.is_terminal());
    assert_eq!(view.total_terms, 1);
}

#[test]
fn occurrences_for_a_closed_panel_are_dropped() {
    init_logging();
    let state = inspecting_boat();
    let (state, _) = update(state, Msg::TermInspected("海".to_string()));
    let (state, _) = update(
        state,
        Msg::OccurrencesLoaded {
            ticket: 1,
            term: "船".to_string(),
            occurrences: boat_occurrences(),
        },
    );
    let inspection = state.view().inspection.unwrap();
    assert_eq!(inspection.term, "海");
    assert_eq!(inspection.body, InspectionBody::Loading);
    assert_eq!(inspection.count, None);
}

#[test]
fn stale_marks_are_discarded() {
    init_logging();
    let state = inspecting_boat();
    let (state, _) = update(
        state,
        Msg::MarksLoaded {
            ticket: 0,
            revision: 1,
            marks: vec![Mark::new(2, 5, "船", "大船出海。")],
        },
    );
    assert!(state.ledger().is_empty());
}

/// Toggles occurrence `index` and returns the refresh the reply triggers.
fn toggle_and_refresh(state: AppState, index: usize) -> (AppState, u64) {
    let (state, _) = update(state, Msg::MarkToggleRequested { index });
    let (state, effects) = update(state, Msg::MarkToggled { ticket: 1 });
    match effects.as_slice() {
        [Effect::FetchMarks { revision, .. }] => (state, *revision),
        other => panic!("unexpected effects {other:?}"),
    }
}

#[test]
fn older_ledger_refresh_landing_last_is_dropped() {
    init_logging();
    let boat = Mark::new(2, 5, "船", "大船出海。");
    let state = inspecting_boat();

    // Server after the first toggle holds the mark, after the second it is gone.
    let (state, first) = toggle_and_refresh(state, 0);
    let (state, second) = toggle_and_refresh(state, 0);
    assert!(second > first);

    let (state, _) = update(
        state,
        Msg::MarksLoaded {
            ticket: 1,
            revision: second,
            marks: Vec::new(),
        },
    );
    let (state, _) = update(
        state,
        Msg::MarksLoaded {
            ticket: 1,
            revision: first,
            marks: vec![boat.clone()],
        },
    );
    // The refresh issued when the job finished is older still.
    let (state, _) = update(
        state,
        Msg::MarksLoaded {
            ticket: 1,
            revision: 1,
            marks: vec![boat],
        },
    );

    assert!(state.ledger().is_empty());
    assert_eq!(marked_flags(&state), vec![false, false]);
}

#[test]
fn superseded_refresh_failure_is_ignored() {
    init_logging();
    let state = inspecting_boat();
    let (state, first) = toggle_and_refresh(state, 0);
    let (state, second) = toggle_and_refresh(state, 1);

    let (state, _) = update(
        state,
        Msg::MarksFailed {
            ticket: 1,
            revision: first,
            failure: Failure::transport(Some(500), "HTTP 500"),
        },
    );
    assert_eq!(state.view().inspection.unwrap().error, None);

    let (state, _) = update(
        state,
        Msg::MarksLoaded {
            ticket: 1,
            revision: second,
            marks: vec![Mark::new(2, 5, "船", "船回港了。")],
        },
    );
    assert_eq!(marked_flags(&state), vec![false, true]);
}
