use std::sync::{mpsc, Arc};
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use wordlens_logging::{wl_debug, wl_info};

use crate::{AnalysisApi, EngineEvent, JobTicket};

/// Poll `job_id` every `interval` until it reaches a terminal state, a
/// request fails, or `token` is cancelled. Ticks never overlap: the next
/// sleep starts only after the previous status request resolved.
pub(crate) async fn run_poller(
    api: Arc<dyn AnalysisApi>,
    ticket: JobTicket,
    job_id: String,
    interval: Duration,
    token: CancellationToken,
    events: mpsc::Sender<EngineEvent>,
) {
    wl_info!("polling job {} (ticket {})", job_id, ticket);
    loop {
        tokio::select! {
            _ = token.cancelled() => break,
            _ = tokio::time::sleep(interval) => {}
        }

        let result = api.job_status(&job_id).await;
        if token.is_cancelled() {
            wl_debug!("dropping status of cancelled poller for ticket {}", ticket);
            break;
        }

        let finished = match &result {
            Ok(status) => status.state.is_terminal(),
            Err(_) => true,
        };
        if events.send(EngineEvent::Status { ticket, result }).is_err() || finished {
            break;
        }
    }
    wl_debug!("poller for ticket {} stopped", ticket);
}
