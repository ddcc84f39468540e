//! Upload session orchestration.
//!
//! One session covers a single file's journey: upload (parse + preview),
//! then summarize. Both phases run sequentially in one spawned task against
//! a parameter snapshot frozen when the session starts, and report back over
//! a channel. Every event carries the tag of the session it belongs to, so a
//! reply from a superseded session is dropped instead of clobbering newer
//! state.

use crate::backend::{BackendApi, PreviewRow, SourceFile, UploadResponse};
use crate::params::ParamSnapshot;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use uuid::Uuid;

/// Table data produced by a successful upload phase. Constructed as a unit:
/// either the whole preview is present or none of it.
#[derive(Debug, Clone, PartialEq)]
pub struct TablePreview {
    pub filename: String,
    pub row_count: u64,
    pub columns: Vec<String>,
    pub rows: Vec<PreviewRow>,
}

impl From<UploadResponse> for TablePreview {
    fn from(response: UploadResponse) -> Self {
        Self {
            filename: response.filename,
            row_count: response.row_count,
            columns: response.columns,
            rows: response.preview,
        }
    }
}

/// Session state machine.
///
/// The data each stage may show rides inside the variant, so the invalid
/// combinations — a summary while uploading, a preview before the upload
/// phase lands — cannot be constructed. A `Failed` session keeps its table
/// only when the upload phase had already succeeded.
#[derive(Debug, Clone, Default)]
pub enum SessionState {
    #[default]
    Idle,
    Uploading,
    Summarizing {
        table: TablePreview,
    },
    Ready {
        table: TablePreview,
        summary: String,
    },
    Failed {
        table: Option<TablePreview>,
        error: String,
    },
}

impl SessionState {
    /// Drives the busy indicator.
    pub fn loading(&self) -> bool {
        matches!(self, SessionState::Uploading | SessionState::Summarizing { .. })
    }

    pub fn table(&self) -> Option<&TablePreview> {
        match self {
            SessionState::Summarizing { table }
            | SessionState::Ready { table, .. }
            | SessionState::Failed {
                table: Some(table), ..
            } => Some(table),
            _ => None,
        }
    }

    pub fn summary(&self) -> Option<&str> {
        match self {
            SessionState::Ready { summary, .. } => Some(summary),
            _ => None,
        }
    }
}

/// Events emitted by a session task.
#[derive(Debug)]
pub enum SessionEvent {
    Uploaded { tag: Uuid, table: TablePreview },
    UploadFailed { tag: Uuid, error: String },
    Summarized { tag: Uuid, summary: String },
    SummarizeFailed { tag: Uuid, error: String },
}

impl SessionEvent {
    fn tag(&self) -> Uuid {
        match self {
            SessionEvent::Uploaded { tag, .. }
            | SessionEvent::UploadFailed { tag, .. }
            | SessionEvent::Summarized { tag, .. }
            | SessionEvent::SummarizeFailed { tag, .. } => *tag,
        }
    }
}

/// Drives the two-phase network interaction and owns the live session state.
/// Presentation code only reads the current [`SessionState`] snapshot.
pub struct Orchestrator {
    backend: Arc<dyn BackendApi>,
    state: SessionState,
    tag: Option<Uuid>,
    started_at: Option<DateTime<Utc>>,
    task: Option<JoinHandle<()>>,
    tx: mpsc::Sender<SessionEvent>,
    rx: mpsc::Receiver<SessionEvent>,
}

impl Orchestrator {
    pub fn new(backend: Arc<dyn BackendApi>) -> Self {
        let (tx, rx) = mpsc::channel(16);
        Self {
            backend,
            state: SessionState::Idle,
            tag: None,
            started_at: None,
            task: None,
            tx,
            rx,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// When the live session entered `Uploading`.
    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    /// Begins a new session for `file`, superseding any in-flight one.
    ///
    /// The presented preview and summary are cleared immediately (even when
    /// the previous session succeeded), the superseded task is aborted, and
    /// the upload request goes out with the snapshot given here — not with
    /// whatever the parameter store holds by the time it completes.
    pub fn start(&mut self, file: SourceFile, params: ParamSnapshot) {
        if let Some(task) = self.task.take() {
            task.abort();
        }

        let tag = Uuid::new_v4();
        self.tag = Some(tag);
        self.started_at = Some(Utc::now());
        self.state = SessionState::Uploading;

        let backend = Arc::clone(&self.backend);
        let tx = self.tx.clone();
        self.task = Some(tokio::spawn(async move {
            run_session(backend, tag, file, params, tx).await;
        }));
    }

    /// Drains pending session events. Called once per UI frame.
    pub fn poll(&mut self) {
        while let Ok(event) = self.rx.try_recv() {
            self.apply(event);
        }
    }

    fn apply(&mut self, event: SessionEvent) {
        if self.tag != Some(event.tag()) {
            debug!(tag = %event.tag(), "dropping event from superseded session");
            return;
        }

        let state = std::mem::take(&mut self.state);
        self.state = match (state, event) {
            (SessionState::Uploading, SessionEvent::Uploaded { table, .. }) => {
                SessionState::Summarizing { table }
            }
            (SessionState::Uploading, SessionEvent::UploadFailed { error, .. }) => {
                warn!(%error, "upload phase failed");
                SessionState::Failed { table: None, error }
            }
            (SessionState::Summarizing { table }, SessionEvent::Summarized { summary, .. }) => {
                SessionState::Ready { table, summary }
            }
            (
                SessionState::Summarizing { table },
                SessionEvent::SummarizeFailed { error, .. },
            ) => {
                // Partial success: the preview from the completed upload
                // phase stays visible even though summarization failed.
                warn!(%error, "summarize phase failed, preview retained");
                SessionState::Failed {
                    table: Some(table),
                    error,
                }
            }
            (state, event) => {
                debug!(?event, "event does not apply to the current state");
                state
            }
        };
    }
}

/// The two phases of one session, strictly sequential: summarize is only
/// issued after the upload succeeded, and reuses the same file bytes and the
/// same snapshot.
async fn run_session(
    backend: Arc<dyn BackendApi>,
    tag: Uuid,
    file: SourceFile,
    params: ParamSnapshot,
    tx: mpsc::Sender<SessionEvent>,
) {
    match backend.upload(&file, &params).await {
        Ok(response) => {
            let table = TablePreview::from(response);
            if tx
                .send(SessionEvent::Uploaded { tag, table })
                .await
                .is_err()
            {
                return;
            }

            match backend.summarize(&file, &params).await {
                Ok(response) => {
                    tx.send(SessionEvent::Summarized {
                        tag,
                        summary: response.summary,
                    })
                    .await
                    .ok();
                }
                Err(e) => {
                    tx.send(SessionEvent::SummarizeFailed {
                        tag,
                        error: e.to_string(),
                    })
                    .await
                    .ok();
                }
            }
        }
        Err(e) => {
            tx.send(SessionEvent::UploadFailed {
                tag,
                error: e.to_string(),
            })
            .await
            .ok();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{BackendApi, BackendError, SummarizeResponse};
    use crate::params::Parameters;
    use async_trait::async_trait;
    use bytes::Bytes;
    use std::sync::Mutex;

    /// Scripted backend: canned responses, records every snapshot it sees.
    struct FakeBackend {
        upload: Option<UploadResponse>,
        summarize: Option<String>,
        seen_params: Mutex<Vec<ParamSnapshot>>,
    }

    impl FakeBackend {
        fn new(upload: Option<UploadResponse>, summarize: Option<&str>) -> Self {
            Self {
                upload,
                summarize: summarize.map(str::to_string),
                seen_params: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl BackendApi for FakeBackend {
        async fn upload(
            &self,
            _file: &SourceFile,
            params: &ParamSnapshot,
        ) -> Result<UploadResponse, BackendError> {
            self.seen_params.lock().unwrap().push(params.clone());
            self.upload
                .clone()
                .ok_or(BackendError::Status(reqwest::StatusCode::INTERNAL_SERVER_ERROR))
        }

        async fn summarize(
            &self,
            _file: &SourceFile,
            params: &ParamSnapshot,
        ) -> Result<SummarizeResponse, BackendError> {
            self.seen_params.lock().unwrap().push(params.clone());
            self.summarize
                .clone()
                .map(|summary| SummarizeResponse { summary })
                .ok_or(BackendError::Status(reqwest::StatusCode::BAD_GATEWAY))
        }
    }

    fn people_response() -> UploadResponse {
        serde_json::from_str(
            r#"{
                "preview": [
                    {"name": "A", "age": 30},
                    {"name": "B", "age": 25},
                    {"name": "C", "age": 40}
                ],
                "columns": ["name", "age"],
                "filename": "data.csv",
                "row_count": 3
            }"#,
        )
        .unwrap()
    }

    fn csv_file(name: &str) -> SourceFile {
        SourceFile {
            name: name.to_string(),
            bytes: Bytes::from_static(b"name,age\nA,30\nB,25\nC,40\n"),
        }
    }

    async fn finish(orchestrator: &mut Orchestrator) {
        orchestrator.task.take().unwrap().await.unwrap();
        orchestrator.poll();
    }

    #[test]
    fn upload_success_moves_to_summarizing_with_exact_table() {
        let mut orchestrator = Orchestrator::new(Arc::new(FakeBackend::new(None, None)));
        let tag = Uuid::new_v4();
        orchestrator.tag = Some(tag);
        orchestrator.state = SessionState::Uploading;

        orchestrator.apply(SessionEvent::Uploaded {
            tag,
            table: TablePreview::from(people_response()),
        });

        let table = orchestrator.state().table().unwrap();
        assert!(matches!(orchestrator.state(), SessionState::Summarizing { .. }));
        assert_eq!(table.filename, "data.csv");
        assert_eq!(table.row_count, 3);
        assert_eq!(table.columns, vec!["name", "age"]);
        assert_eq!(table.rows.len(), 3);
        assert_eq!(orchestrator.state().summary(), None);
        assert!(orchestrator.state().loading());
    }

    #[test]
    fn stale_events_never_touch_the_live_session() {
        let mut orchestrator = Orchestrator::new(Arc::new(FakeBackend::new(None, None)));
        orchestrator.tag = Some(Uuid::new_v4());
        orchestrator.state = SessionState::Uploading;

        orchestrator.apply(SessionEvent::Uploaded {
            tag: Uuid::new_v4(),
            table: TablePreview::from(people_response()),
        });
        orchestrator.apply(SessionEvent::UploadFailed {
            tag: Uuid::new_v4(),
            error: "boom".to_string(),
        });

        assert!(matches!(orchestrator.state(), SessionState::Uploading));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn full_session_reaches_ready() {
        let backend = Arc::new(FakeBackend::new(
            Some(people_response()),
            Some("Dataset of 3 people..."),
        ));
        let mut orchestrator = Orchestrator::new(Arc::clone(&backend) as Arc<dyn BackendApi>);

        orchestrator.start(csv_file("data.csv"), Parameters::default().snapshot());
        assert!(matches!(orchestrator.state(), SessionState::Uploading));
        finish(&mut orchestrator).await;

        match orchestrator.state() {
            SessionState::Ready { table, summary } => {
                assert_eq!(summary, "Dataset of 3 people...");
                assert_eq!(table.row_count, 3);
            }
            other => panic!("expected Ready, got {other:?}"),
        }
        assert!(!orchestrator.state().loading());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn upload_failure_retains_nothing() {
        let mut orchestrator =
            Orchestrator::new(Arc::new(FakeBackend::new(None, Some("unreached"))));

        orchestrator.start(csv_file("data.csv"), Parameters::default().snapshot());
        finish(&mut orchestrator).await;

        match orchestrator.state() {
            SessionState::Failed { table, .. } => assert!(table.is_none()),
            other => panic!("expected Failed, got {other:?}"),
        }
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn summarize_failure_retains_the_upload_preview() {
        let mut orchestrator =
            Orchestrator::new(Arc::new(FakeBackend::new(Some(people_response()), None)));

        orchestrator.start(csv_file("data.csv"), Parameters::default().snapshot());
        finish(&mut orchestrator).await;

        match orchestrator.state() {
            SessionState::Failed { table: Some(table), .. } => {
                assert_eq!(*table, TablePreview::from(people_response()));
            }
            other => panic!("expected Failed with preview, got {other:?}"),
        }
        assert_eq!(orchestrator.state().summary(), None);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn both_phases_use_the_snapshot_taken_at_start() {
        let backend = Arc::new(FakeBackend::new(Some(people_response()), Some("ok")));
        let mut orchestrator = Orchestrator::new(Arc::clone(&backend) as Arc<dyn BackendApi>);

        let mut live = Parameters::default();
        live.set_temperature(0.2);
        orchestrator.start(csv_file("data.csv"), live.snapshot());

        // edits after the request went out must not affect it
        live.set_temperature(0.9);
        live.set_api_key("sk-0123456789012345678901");
        finish(&mut orchestrator).await;

        let seen = backend.seen_params.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].temperature, 0.2);
        assert_eq!(seen[0].api_key, "");
        // the summarize phase reuses the upload snapshot, not a re-read
        assert_eq!(seen[1], seen[0]);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn superseding_drops_the_first_session_results() {
        let first = Arc::new(FakeBackend::new(Some(people_response()), Some("first")));
        let mut orchestrator = Orchestrator::new(Arc::clone(&first) as Arc<dyn BackendApi>);

        orchestrator.start(csv_file("first.csv"), Parameters::default().snapshot());
        // let the first session's events land in the channel unseen
        orchestrator.task.take().unwrap().await.unwrap();

        let mut second_response = people_response();
        second_response.filename = "second.csv".to_string();
        orchestrator.backend = Arc::new(FakeBackend::new(Some(second_response), Some("second")));
        orchestrator.start(csv_file("second.csv"), Parameters::default().snapshot());
        finish(&mut orchestrator).await;

        match orchestrator.state() {
            SessionState::Ready { table, summary } => {
                assert_eq!(table.filename, "second.csv");
                assert_eq!(summary, "second");
            }
            other => panic!("expected the second session's Ready, got {other:?}"),
        }
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn a_new_selection_clears_the_previous_presentation_immediately() {
        let backend = Arc::new(FakeBackend::new(Some(people_response()), Some("done")));
        let mut orchestrator = Orchestrator::new(Arc::clone(&backend) as Arc<dyn BackendApi>);

        orchestrator.start(csv_file("data.csv"), Parameters::default().snapshot());
        finish(&mut orchestrator).await;
        assert!(orchestrator.state().summary().is_some());

        orchestrator.start(csv_file("data.csv"), Parameters::default().snapshot());
        assert!(matches!(orchestrator.state(), SessionState::Uploading));
        assert!(orchestrator.state().table().is_none());
        assert!(orchestrator.state().summary().is_none());
    }
}
