//! Wordlens engine: HTTP transport, job polling and effect execution.
mod api;
mod engine;
mod persist;
mod poll;
mod types;

pub use api::{AnalysisApi, ApiSettings, ReqwestApi};
pub use engine::{EngineHandle, EngineSettings};
pub use persist::{ensure_dir, AtomicFileWriter, PersistError};
pub use types::{
    EngineEvent, JobTicket, MarkParams, MarkRecord, NounRecord, OccurrenceRecord,
    RemoteJobState, StatusRecord, ToggleReply, TransportError, TransportFailure,
};
