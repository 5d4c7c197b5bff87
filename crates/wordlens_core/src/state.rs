use crate::cache::ResultCache;
use crate::marks::MarkLedger;
use crate::paging::{page_buttons, paginate};
use crate::view_model::{
    highlight, AppViewModel, InspectionBody, InspectionView, JobView, OccurrenceRow, PageView,
    TermRow,
};
use crate::{JobState, JobTicket, Notice, Occurrence, SortOrder};

pub const DEFAULT_PAGE_SIZE: usize = 60;
pub const DEFAULT_MIN_LENGTH: usize = 1;

/// Where the active job is in its lifecycle, as seen by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobPhase {
    Uploading,
    UploadFailed,
    /// Last state reported by the status endpoint.
    Tracking(JobState),
    /// The transport failed while polling.
    PollFailed,
}

impl JobPhase {
    pub fn is_terminal(self) -> bool {
        match self {
            Self::Uploading => false,
            Self::UploadFailed | Self::PollFailed => true,
            Self::Tracking(state) => state.is_terminal(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ActiveJob {
    pub(crate) ticket: JobTicket,
    pub(crate) job_id: Option<String>,
    pub(crate) phase: JobPhase,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum OccurrencePanel {
    Loading,
    Loaded(Vec<Occurrence>),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Inspection {
    pub(crate) term: String,
    pub(crate) panel: OccurrencePanel,
    /// Toggle/refresh failure scoped to this panel.
    pub(crate) error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    pub(crate) last_ticket: JobTicket,
    pub(crate) active: Option<ActiveJob>,
    pub(crate) query: String,
    pub(crate) sort: SortOrder,
    pub(crate) min_length: usize,
    pub(crate) page_size: usize,
    pub(crate) requested_page: usize,
    pub(crate) terms_revision: u64,
    pub(crate) marks_revision: u64,
    pub(crate) words_revision: u64,
    pub(crate) cache: ResultCache,
    pub(crate) ledger: MarkLedger,
    pub(crate) inspection: Option<Inspection>,
    pub(crate) words: Option<Vec<String>>,
    pub(crate) pending_removal: Option<String>,
    pub(crate) status_text: String,
    pub(crate) progress: u8,
    pub(crate) alert: Option<String>,
    pub(crate) notice: Option<Notice>,
    dirty: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self::with_settings(DEFAULT_PAGE_SIZE, DEFAULT_MIN_LENGTH)
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(page_size: usize, min_length: usize) -> Self {
        Self {
            last_ticket: 0,
            active: None,
            query: String::new(),
            sort: SortOrder::default(),
            min_length,
            page_size: page_size.max(1),
            requested_page: 1,
            terms_revision: 0,
            marks_revision: 0,
            words_revision: 0,
            cache: ResultCache::new(),
            ledger: MarkLedger::new(),
            inspection: None,
            words: None,
            pending_removal: None,
            status_text: "idle".to_string(),
            progress: 0,
            alert: None,
            notice: None,
            dirty: false,
        }
    }

    /// Initial query and sort, applied before the first fetch.
    pub fn with_query(mut self, query: impl Into<String>, sort: SortOrder) -> Self {
        self.query = query.into();
        self.sort = sort;
        self
    }

    pub fn active_ticket(&self) -> Option<JobTicket> {
        self.active.as_ref().map(|job| job.ticket)
    }

    pub fn job_phase(&self) -> Option<JobPhase> {
        self.active.as_ref().map(|job| job.phase)
    }

    pub fn cache(&self) -> &ResultCache {
        &self.cache
    }

    pub fn ledger(&self) -> &MarkLedger {
        &self.ledger
    }

    pub fn view(&self) -> AppViewModel {
        let filtered = self.cache.derive_view(self.min_length);
        let page = paginate(&filtered, self.page_size, self.requested_page);

        AppViewModel {
            status_text: self.status_text.clone(),
            progress: self.progress,
            job: self.active.as_ref().map(|job| JobView {
                ticket: job.ticket,
                job_id: job.job_id.clone(),
                phase: job.phase,
            }),
            uploading: self.is_uploading(),
            query: self.query.clone(),
            sort: self.sort,
            min_length: self.min_length,
            total_terms: self.cache.len(),
            shown_terms: filtered.len(),
            page: PageView {
                rows: page.items.iter().map(|term| TermRow::from(*term)).collect(),
                buttons: page_buttons(page.page, page.total_pages),
                page: page.page,
                total_pages: page.total_pages,
            },
            inspection: self.inspection.as_ref().map(|inspection| self.inspection_view(inspection)),
            words: self.words.clone(),
            pending_removal: self.pending_removal.clone(),
            alert: self.alert.clone(),
            notice: self.notice.clone(),
            dirty: self.dirty,
        }
    }

    fn inspection_view(&self, inspection: &Inspection) -> InspectionView {
        let term = inspection.term.as_str();
        let body = match &inspection.panel {
            OccurrencePanel::Loading => InspectionBody::Loading,
            OccurrencePanel::Failed(message) => InspectionBody::Failed(message.clone()),
            OccurrencePanel::Loaded(occurrences) => InspectionBody::Loaded(
                occurrences
                    .iter()
                    .map(|occurrence| OccurrenceRow {
                        page: occurrence.page,
                        line: occurrence.line,
                        segments: highlight(&occurrence.sentence, term),
                        marked: self.ledger.is_marked(term, occurrence),
                    })
                    .collect(),
            ),
        };
        InspectionView {
            term: term.to_string(),
            count: self.cache.find(term).map(|t| t.occurrence_count),
            body,
            error: inspection.error.clone(),
        }
    }

    /// Clamped current page and page count of the derived view.
    pub(crate) fn current_page(&self) -> (usize, usize) {
        let shown = self.cache.derive_view(self.min_length).len();
        let total = shown.div_ceil(self.page_size).max(1);
        (self.requested_page.clamp(1, total), total)
    }

    pub(crate) fn is_uploading(&self) -> bool {
        matches!(self.job_phase(), Some(JobPhase::Uploading))
    }

    pub(crate) fn is_current(&self, ticket: JobTicket) -> bool {
        self.active_ticket() == Some(ticket)
    }

    /// Ticket and job id of the active job once it has finished successfully.
    pub(crate) fn completed_job(&self) -> Option<(JobTicket, String)> {
        let job = self.active.as_ref()?;
        match (job.phase, job.job_id.as_ref()) {
            (JobPhase::Tracking(JobState::Done), Some(id)) => Some((job.ticket, id.clone())),
            _ => None,
        }
    }

    /// Supersedes whatever job was active and starts a fresh one.
    pub(crate) fn begin_job(&mut self) -> JobTicket {
        self.last_ticket += 1;
        let ticket = self.last_ticket;
        self.active = Some(ActiveJob {
            ticket,
            job_id: None,
            phase: JobPhase::Uploading,
        });
        self.cache.clear();
        self.ledger.clear();
        self.inspection = None;
        self.requested_page = 1;
        self.set_status("uploading", 1);
        ticket
    }

    pub(crate) fn set_status(&mut self, text: impl Into<String>, progress: u8) {
        self.status_text = text.into();
        self.progress = progress.min(100);
        self.mark_dirty();
    }

    pub(crate) fn raise_alert(&mut self, message: impl Into<String>) {
        self.alert = Some(message.into());
        self.mark_dirty();
    }

    pub(crate) fn post_notice(&mut self, notice: Notice) {
        self.notice = Some(notice);
        self.mark_dirty();
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }
}
