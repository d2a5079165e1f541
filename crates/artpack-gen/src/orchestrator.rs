//! Generation orchestrator
//!
//! Owns the catalog, the client and the session state. Single assets are
//! generated on demand; a batch walks the missing assets of a scope through a
//! small pool of worker slots, pausing between requests to stay under quota.
//! Failures never escape as errors: they land in state and are reported as
//! notices on the event channel.

use crate::client::ImageClient;
use crate::config::ArtpackConfig;
use crate::state::{AssetSnapshot, AssetState, SessionState, Stats};
use artpack_core::{Catalog, GenerationError, GenerationErrorKind, Scope};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::broadcast;

const EVENT_CAPACITY: usize = 256;

/// Batch pacing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrchestratorSettings {
    /// Pause after a batch request finishes before the slot takes the next one
    pub request_pause: Duration,
    /// Concurrent batch slots; 1 means strictly sequential
    pub workers: usize,
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self {
            request_pause: Duration::from_millis(1500),
            workers: 1,
        }
    }
}

impl OrchestratorSettings {
    pub fn from_config(config: &ArtpackConfig) -> Self {
        Self {
            request_pause: config.request_pause(),
            workers: config.generation.workers.max(1),
        }
    }
}

/// User-facing report of a failed generation
#[derive(Debug, Clone, PartialEq)]
pub struct FailureNotice {
    pub asset_id: String,
    pub asset_name: String,
    pub kind: GenerationErrorKind,
    pub detail: String,
}

impl FailureNotice {
    fn new(asset_id: &str, asset_name: &str, err: &GenerationError) -> Self {
        Self {
            asset_id: asset_id.to_string(),
            asset_name: asset_name.to_string(),
            kind: err.kind,
            detail: err.message.clone(),
        }
    }

    pub fn text(&self) -> String {
        let hint = if self.kind == GenerationErrorKind::RateLimited {
            "Quota exceeded. Try using your own API key."
        } else {
            "Server error. Please try again."
        };
        format!("Generation failed for \"{}\". {}", self.asset_name, hint)
    }
}

impl std::fmt::Display for FailureNotice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text())
    }
}

/// Result of [`Orchestrator::generate_one`]
#[derive(Debug, Clone, PartialEq)]
pub enum GenerateOutcome {
    /// No such id in the catalog; nothing happened
    UnknownAsset,
    /// The asset already has a request in flight; nothing was issued
    AlreadyInFlight,
    Generated,
    Failed(FailureNotice),
}

impl GenerateOutcome {
    fn issued_request(&self) -> bool {
        matches!(self, GenerateOutcome::Generated | GenerateOutcome::Failed(_))
    }
}

/// Summary of one batch run
#[derive(Debug, Clone, PartialEq)]
pub struct BatchReport {
    pub scope: Scope,
    /// Assets a request was issued for
    pub attempted: usize,
    pub generated: usize,
    pub failed: usize,
    /// Assets in scope that already had an image or were in flight
    pub skipped: usize,
}

impl BatchReport {
    fn new(scope: Scope) -> Self {
        Self {
            scope,
            attempted: 0,
            generated: 0,
            failed: 0,
            skipped: 0,
        }
    }

    fn record(&mut self, outcome: &GenerateOutcome) {
        match outcome {
            GenerateOutcome::Generated => {
                self.attempted += 1;
                self.generated += 1;
            }
            GenerateOutcome::Failed(_) => {
                self.attempted += 1;
                self.failed += 1;
            }
            GenerateOutcome::UnknownAsset | GenerateOutcome::AlreadyInFlight => self.skipped += 1,
        }
    }
}

/// Result of [`Orchestrator::generate_all`]
#[derive(Debug, Clone, PartialEq)]
pub enum BatchOutcome {
    /// Another batch is running; nothing was issued
    AlreadyRunning,
    Completed(BatchReport),
}

/// Notifications for front ends
#[derive(Debug, Clone, PartialEq)]
pub enum OrchestratorEvent {
    StateChanged { id: String, state: AssetState },
    GenerationFailed(FailureNotice),
    /// The key was rejected; the front end should prompt for a new one
    CredentialReset,
    BatchStarted { scope: Scope, queued: usize },
    BatchFinished(BatchReport),
}

/// Clears the batch flag however the batch future ends
struct BatchGuard<'a>(&'a AtomicBool);

impl Drop for BatchGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

pub struct Orchestrator {
    catalog: Catalog,
    client: ImageClient,
    settings: OrchestratorSettings,
    // Never held across an await
    state: Mutex<SessionState>,
    batch_running: AtomicBool,
    has_user_key: AtomicBool,
    events: broadcast::Sender<OrchestratorEvent>,
}

impl Orchestrator {
    pub fn new(catalog: Catalog, client: ImageClient, settings: OrchestratorSettings) -> Self {
        let state = SessionState::from_catalog(&catalog);
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            catalog,
            client,
            settings,
            state: Mutex::new(state),
            batch_running: AtomicBool::new(false),
            has_user_key: AtomicBool::new(false),
            events,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn client(&self) -> &ImageClient {
        &self.client
    }

    pub fn subscribe(&self) -> broadcast::Receiver<OrchestratorEvent> {
        self.events.subscribe()
    }

    pub fn state(&self, id: &str) -> Option<AssetState> {
        self.state.lock().get(id).cloned()
    }

    pub fn snapshot(&self) -> Vec<AssetSnapshot> {
        self.state.lock().snapshot(&self.catalog)
    }

    pub fn stats(&self) -> Stats {
        Stats::from_snapshot(&self.snapshot())
    }

    pub fn is_batch_running(&self) -> bool {
        self.batch_running.load(Ordering::SeqCst)
    }

    pub fn has_user_key(&self) -> bool {
        self.has_user_key.load(Ordering::SeqCst)
    }

    pub fn mark_key_selected(&self) {
        self.has_user_key.store(true, Ordering::SeqCst);
    }

    fn emit(&self, event: OrchestratorEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }

    fn emit_state(&self, id: &str) {
        if let Some(state) = self.state(id) {
            self.emit(OrchestratorEvent::StateChanged {
                id: id.to_string(),
                state,
            });
        }
    }

    /// Generate (or regenerate) a single asset
    pub async fn generate_one(&self, id: &str) -> GenerateOutcome {
        let Some(spec) = self.catalog.get(id) else {
            tracing::debug!(id, "ignoring generate request for unknown asset");
            return GenerateOutcome::UnknownAsset;
        };

        if !self.state.lock().begin_loading(id) {
            tracing::debug!(id, "asset already in flight");
            return GenerateOutcome::AlreadyInFlight;
        }
        self.emit_state(id);

        match self.client.generate(&spec.prompt, spec.aspect_ratio).await {
            Ok(image) => {
                self.state.lock().complete(id, image);
                self.emit_state(id);
                tracing::info!(id, name = %spec.name, "asset generated");
                GenerateOutcome::Generated
            }
            Err(err) => {
                self.state.lock().fail(id);
                self.emit_state(id);

                if err.kind == GenerationErrorKind::InvalidCredential {
                    self.has_user_key.store(false, Ordering::SeqCst);
                    self.emit(OrchestratorEvent::CredentialReset);
                }

                let notice = FailureNotice::new(id, &spec.name, &err);
                tracing::warn!(id, kind = %err.kind, "{}", notice);
                self.emit(OrchestratorEvent::GenerationFailed(notice.clone()));
                GenerateOutcome::Failed(notice)
            }
        }
    }

    /// Generate every asset in `scope` that has no image yet
    pub async fn generate_all(&self, scope: Scope) -> BatchOutcome {
        if self
            .batch_running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            tracing::info!(%scope, "batch already running, ignoring request");
            return BatchOutcome::AlreadyRunning;
        }
        let _guard = BatchGuard(&self.batch_running);

        let mut report = BatchReport::new(scope);
        let queue: VecDeque<String> = {
            let state = self.state.lock();
            self.catalog
                .in_scope(scope)
                .filter(|spec| {
                    let needed = state.needs_generation(&spec.id);
                    if !needed {
                        report.skipped += 1;
                    }
                    needed
                })
                .map(|spec| spec.id.clone())
                .collect()
        };

        tracing::info!(%scope, queued = queue.len(), skipped = report.skipped, "batch started");
        self.emit(OrchestratorEvent::BatchStarted {
            scope,
            queued: queue.len(),
        });

        let queue = Mutex::new(queue);
        let report = Mutex::new(report);
        let workers = (0..self.settings.workers.max(1)).map(|_| self.run_worker(&queue, &report));
        futures::future::join_all(workers).await;

        let report = report.into_inner();
        tracing::info!(
            %scope,
            generated = report.generated,
            failed = report.failed,
            skipped = report.skipped,
            "batch finished"
        );
        self.emit(OrchestratorEvent::BatchFinished(report.clone()));
        BatchOutcome::Completed(report)
    }

    async fn run_worker(&self, queue: &Mutex<VecDeque<String>>, report: &Mutex<BatchReport>) {
        let mut pause_due = false;
        loop {
            let Some(id) = queue.lock().pop_front() else {
                break;
            };

            // A manual request may have filled this asset since the batch began
            if !self.state.lock().needs_generation(&id) {
                report.lock().skipped += 1;
                continue;
            }

            if pause_due {
                tokio::time::sleep(self.settings.request_pause).await;
                pause_due = false;
                if !self.state.lock().needs_generation(&id) {
                    report.lock().skipped += 1;
                    continue;
                }
            }

            let outcome = self.generate_one(&id).await;
            report.lock().record(&outcome);
            pause_due = outcome.issued_request();
        }
    }
}
