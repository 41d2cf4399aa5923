//! Per-session bookkeeping: the latest analyzer view, and supersession of an
//! in-flight analysis when the same session submits again.

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;
use tracing::{debug, warn};

use crate::analysis::view::{AnalyzerView, ViewTransition};
use crate::analysis::AnalysisError;

struct SessionEntry {
    generation: u64,
    cancel: watch::Sender<bool>,
    view: AnalyzerView,
}

pub struct SessionRegistry {
    sessions: Mutex<HashMap<String, SessionEntry>>,
    generation: AtomicU64,
    /// Hard cap on tracked sessions. Idle sessions are evicted first.
    max_sessions: usize,
}

impl SessionRegistry {
    pub fn new(max_sessions: usize) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            generation: AtomicU64::new(0),
            max_sessions: max_sessions.max(1),
        }
    }

    // The lock is only held for map bookkeeping, never across an await.
    fn lock(&self) -> MutexGuard<'_, HashMap<String, SessionEntry>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Registers a new analysis for `session_id`, cancelling whatever that
    /// session had in flight.
    pub fn begin(
        self: &Arc<Self>,
        session_id: &str,
        files: usize,
        job_description_chars: usize,
    ) -> SessionTicket {
        let generation = self.generation.fetch_add(1, Ordering::Relaxed) + 1;
        let (cancel, cancelled) = watch::channel(false);
        let submitted = ViewTransition::Submitted {
            files,
            job_description_chars,
        };

        let mut sessions = self.lock();
        let view = match sessions.remove(session_id) {
            Some(previous) => {
                if previous.view.is_in_flight() {
                    debug!(
                        "Session {session_id}: superseding analysis #{} with #{generation}",
                        previous.generation
                    );
                }
                previous.cancel.send_replace(true);
                previous.view.apply(submitted)
            }
            None => AnalyzerView::default().apply(submitted),
        };

        if sessions.len() >= self.max_sessions {
            evict_oldest(&mut sessions);
        }
        sessions.insert(
            session_id.to_string(),
            SessionEntry {
                generation,
                cancel,
                view,
            },
        );

        SessionTicket {
            registry: Arc::clone(self),
            session_id: session_id.to_string(),
            generation,
            cancelled,
            settled: false,
        }
    }

    /// Applies an outcome if `generation` is still the session's current
    /// analysis. Returns false for stale outcomes.
    fn finish(&self, session_id: &str, generation: u64, transition: ViewTransition) -> bool {
        let mut sessions = self.lock();
        match sessions.get_mut(session_id) {
            Some(entry) if entry.generation == generation => {
                entry.view = entry.view.apply(transition);
                true
            }
            _ => false,
        }
    }

    pub fn view(&self, session_id: &str) -> Option<AnalyzerView> {
        self.lock().get(session_id).map(|entry| entry.view.clone())
    }

    #[cfg(test)]
    fn session_count(&self) -> usize {
        self.lock().len()
    }
}

/// Evicts the oldest idle session, or the oldest session outright when all
/// are in flight. An evicted in-flight analysis still runs to completion; only
/// its pollable view is lost.
fn evict_oldest(sessions: &mut HashMap<String, SessionEntry>) {
    let oldest_idle = sessions
        .iter()
        .filter(|(_, entry)| !entry.view.is_in_flight())
        .min_by_key(|(_, entry)| entry.generation);
    let victim = oldest_idle
        .or_else(|| sessions.iter().min_by_key(|(_, entry)| entry.generation))
        .map(|(id, entry)| (id.clone(), entry.view.is_in_flight()));

    if let Some((id, in_flight)) = victim {
        if in_flight {
            warn!("Session limit reached with every session in flight, evicting {id}");
        } else {
            debug!("Evicting idle session {id}");
        }
        sessions.remove(&id);
    }
}

/// Handle for one in-flight analysis. Dropping it unsettled (for example when
/// the client disconnects) marks the session's analysis as cancelled.
pub struct SessionTicket {
    registry: Arc<SessionRegistry>,
    session_id: String,
    generation: u64,
    cancelled: watch::Receiver<bool>,
    settled: bool,
}

impl SessionTicket {
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Drives `work` until it finishes or a newer submission for the same
    /// session supersedes it. On supersession `work` is dropped, which aborts
    /// any tasks it still owns.
    pub async fn run<T, F>(&mut self, work: F) -> Result<T, AnalysisError>
    where
        F: Future<Output = Result<T, AnalysisError>>,
    {
        tokio::select! {
            outcome = work => outcome,
            () = self.superseded() => Err(AnalysisError::Superseded),
        }
    }

    async fn superseded(&mut self) {
        let closed = self.cancelled.wait_for(|cancelled| *cancelled).await.is_err();
        if closed {
            // Sender gone without a cancel signal: never superseded.
            std::future::pending::<()>().await;
        }
    }

    /// Records the outcome in the session view. Returns false when a newer
    /// analysis already owns the session.
    pub fn settle(mut self, transition: ViewTransition) -> bool {
        self.settled = true;
        self.registry
            .finish(&self.session_id, self.generation, transition)
    }
}

impl Drop for SessionTicket {
    fn drop(&mut self) {
        if !self.settled {
            self.registry.finish(
                &self.session_id,
                self.generation,
                ViewTransition::Failed {
                    code: "CANCELLED".to_string(),
                    message: "analysis was cancelled before completing".to_string(),
                },
            );
        }
    }
}
