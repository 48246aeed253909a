use axum::{
    extract::{Json, Path, State},
    response::sse::{Event, KeepAlive, Sse},
};
use futures::{stream, Stream};
use tokio::sync::mpsc;
use tracing::{debug, info, instrument, warn};

use twin_care_domain::entities::{MonitoringSession, SessionAverages as DomainSessionAverages, SessionTick};
use twin_care_domain::services::{DisplaySink, LogDisplay, MonitoringService};

use crate::api::routes::SharedPatientService;
use crate::entities::common::ErrorResponse;
use crate::entities::vitals::{MonitoringSessionResponse, MonitoringTick, SessionAverages};

/// Something that happened during a streamed session
#[derive(Debug)]
pub enum SessionEvent {
    Tick(MonitoringTick),
    Summary(SessionAverages),
    Failed(String),
}

impl SessionEvent {
    fn into_sse(self) -> Result<Event, axum::Error> {
        match self {
            SessionEvent::Tick(tick) => Event::default().event("tick").json_data(tick),
            SessionEvent::Summary(averages) => Event::default().event("summary").json_data(averages),
            SessionEvent::Failed(message) => Ok(Event::default().event("error").data(message)),
        }
    }
}

/// Forwards ticks to a channel, and through the log as well
pub struct ChannelDisplay {
    sender: mpsc::UnboundedSender<SessionEvent>,
    log: LogDisplay,
}

impl ChannelDisplay {
    pub fn new(sender: mpsc::UnboundedSender<SessionEvent>) -> Self {
        Self { sender, log: LogDisplay }
    }

    fn send(&self, event: SessionEvent) {
        // a disconnected client only stops delivery
        if self.sender.send(event).is_err() {
            debug!("Stream receiver dropped, event discarded");
        }
    }
}

impl DisplaySink for ChannelDisplay {
    fn show_tick(&mut self, tick: &SessionTick) {
        self.log.show_tick(tick);
        self.send(SessionEvent::Tick(tick.into()));
    }

    fn show_summary(&mut self, session: &MonitoringSession, averages: &DomainSessionAverages) {
        self.log.show_summary(session, averages);
        self.send(SessionEvent::Summary(averages.into()));
    }
}

/// Run a monitoring session and return all of its ticks
#[utoipa::path(
    post,
    path = "/api/v1/patients/{id}/monitoring",
    params(
        ("id" = String, Path, description = "Patient ID")
    ),
    responses(
        (status = 200, description = "Session completed", body = MonitoringSessionResponse),
        (status = 404, description = "Patient not found", body = ErrorResponse),
        (status = 500, description = "Session aborted", body = ErrorResponse),
    ),
    tag = "monitoring"
)]
#[instrument(skip(patients, monitoring))]
pub async fn run_monitoring(
    State(patients): State<SharedPatientService>,
    State(monitoring): State<MonitoringService>,
    Path(id): Path<String>,
) -> Result<Json<MonitoringSessionResponse>, ErrorResponse> {
    patients.get_patient(&id).await?;

    let session = monitoring.run_session(&id, &mut LogDisplay).await?;
    info!("Session for {} returned {} ticks", id, session.ticks.len());

    Ok(Json(session.into()))
}

/// Run a monitoring session and stream its ticks as server-sent events.
///
/// Emits one `tick` event per second of the session and a final `summary`,
/// or an `error` event when the session aborts.
#[utoipa::path(
    get,
    path = "/api/v1/patients/{id}/monitoring/stream",
    params(
        ("id" = String, Path, description = "Patient ID")
    ),
    responses(
        (status = 200, description = "Event stream of ticks followed by a summary", body = String, content_type = "text/event-stream"),
        (status = 404, description = "Patient not found", body = ErrorResponse),
    ),
    tag = "monitoring"
)]
#[instrument(skip(patients, monitoring))]
pub async fn stream_monitoring(
    State(patients): State<SharedPatientService>,
    State(monitoring): State<MonitoringService>,
    Path(id): Path<String>,
) -> Result<Sse<impl Stream<Item = Result<Event, axum::Error>>>, ErrorResponse> {
    patients.get_patient(&id).await?;

    let (sender, receiver) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        let mut display = ChannelDisplay::new(sender.clone());
        if let Err(e) = monitoring.run_session(&id, &mut display).await {
            warn!("Streamed session for {} failed: {}", id, e);
            let _ = sender.send(SessionEvent::Failed(e.to_string()));
        }
    });

    let events = stream::unfold(receiver, |mut receiver| async move {
        let event = receiver.recv().await?;
        Some((event.into_sse(), receiver))
    });

    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}
