//! Wordlens core: pure job-lifecycle state machine, result cache, mark ledger
//! and view-model helpers. No I/O happens here; requests leave as [`Effect`]s
//! and their outcomes come back as [`Msg`]s.
mod cache;
mod effect;
mod failure;
mod marks;
mod model;
mod msg;
mod paging;
mod state;
mod update;
mod view_model;

pub use cache::ResultCache;
pub use effect::Effect;
pub use failure::{Failure, Notice};
pub use marks::{identity_of, Mark, MarkId, MarkLedger, MarkRequest};
pub use model::{FileHandle, JobState, JobStatus, JobTicket, Occurrence, SortOrder, Term};
pub use msg::Msg;
pub use paging::{page_buttons, paginate, Page, PageButton};
pub use state::{AppState, JobPhase, DEFAULT_MIN_LENGTH, DEFAULT_PAGE_SIZE};
pub use update::update;
pub use view_model::{
    highlight, AppViewModel, InspectionBody, InspectionView, JobView, OccurrenceRow, PageView,
    Segment, TermRow,
};
