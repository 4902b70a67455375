//! Background dispatcher for outbound sync events.
//!
//! # Responsibility
//! - Hand check-in/out events to a worker thread so local state changes
//!   never wait on the network.
//! - Report each send's advisory outcome back to the owning coordinator.
//!
//! # Invariants
//! - Exactly one report is produced per accepted job while the worker lives.
//! - Jobs are sent in submission order.
//! - Dropping the dispatcher closes the queue and joins the worker.

use super::{CheckInPayload, RemoteSync, RemoteSyncError};
use crate::model::session_log::{EntryId, SyncOutcome};
use log::{error, warn};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

const WORKER_THREAD_NAME: &str = "attendance-sync";

/// One outbound event bound to its ledger entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncJob {
    pub entry_id: EntryId,
    pub payload: CheckInPayload,
}

/// Outcome of one job, reported back from the worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncReport {
    pub entry_id: EntryId,
    pub outcome: SyncOutcome,
}

/// Owns the sync worker thread and its two channels.
pub struct SyncDispatcher {
    adapter_id: String,
    jobs: Option<Sender<SyncJob>>,
    reports: Receiver<SyncReport>,
    in_flight: usize,
    worker: Option<JoinHandle<()>>,
}

impl SyncDispatcher {
    /// Starts the worker thread for `remote`.
    ///
    /// # Errors
    /// - Returns the OS error when the thread cannot be spawned.
    pub fn spawn(remote: Arc<dyn RemoteSync>) -> std::io::Result<Self> {
        let adapter_id = remote.adapter_id().to_string();
        let (job_tx, job_rx) = mpsc::channel::<SyncJob>();
        let (report_tx, report_rx) = mpsc::channel::<SyncReport>();

        let worker = thread::Builder::new()
            .name(WORKER_THREAD_NAME.to_string())
            .spawn(move || run_worker(remote, job_rx, report_tx))?;

        Ok(Self {
            adapter_id,
            jobs: Some(job_tx),
            reports: report_rx,
            in_flight: 0,
            worker: Some(worker),
        })
    }

    pub fn adapter_id(&self) -> &str {
        &self.adapter_id
    }

    /// Number of submitted jobs whose report has not been collected yet.
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Queues one job.
    ///
    /// # Errors
    /// - `WorkerUnavailable` when the worker has stopped; the job is dropped.
    pub fn submit(&mut self, job: SyncJob) -> Result<(), RemoteSyncError> {
        let Some(jobs) = self.jobs.as_ref() else {
            return Err(RemoteSyncError::WorkerUnavailable);
        };
        match jobs.send(job) {
            Ok(()) => {
                self.in_flight += 1;
                Ok(())
            }
            Err(_) => {
                error!(
                    "event=sync_dispatch module=sync status=error adapter={} error_code=worker_gone",
                    self.adapter_id
                );
                self.jobs = None;
                Err(RemoteSyncError::WorkerUnavailable)
            }
        }
    }

    /// Collects every report available right now without blocking.
    pub fn try_collect(&mut self) -> Vec<SyncReport> {
        let mut collected = Vec::new();
        loop {
            match self.reports.try_recv() {
                Ok(report) => {
                    self.in_flight = self.in_flight.saturating_sub(1);
                    collected.push(report);
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.abandon_in_flight();
                    break;
                }
            }
        }
        collected
    }

    /// Blocks until every in-flight job has reported.
    pub fn wait_all(&mut self) -> Vec<SyncReport> {
        let mut collected = Vec::new();
        while self.in_flight > 0 {
            match self.reports.recv() {
                Ok(report) => {
                    self.in_flight -= 1;
                    collected.push(report);
                }
                Err(_) => {
                    self.abandon_in_flight();
                    break;
                }
            }
        }
        collected
    }

    fn abandon_in_flight(&mut self) {
        if self.in_flight > 0 {
            warn!(
                "event=sync_dispatch module=sync status=error adapter={} error_code=reports_lost lost={}",
                self.adapter_id, self.in_flight
            );
        }
        self.in_flight = 0;
    }
}

impl Drop for SyncDispatcher {
    fn drop(&mut self) {
        self.jobs.take();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                error!(
                    "event=sync_dispatch module=sync status=error adapter={} error_code=worker_panicked",
                    self.adapter_id
                );
            }
        }
    }
}

fn run_worker(
    remote: Arc<dyn RemoteSync>,
    jobs: Receiver<SyncJob>,
    reports: Sender<SyncReport>,
) {
    for job in jobs {
        let outcome = match remote.send(&job.payload) {
            Ok(()) => SyncOutcome::Ok,
            Err(err) => {
                warn!(
                    "event=sync_send module=sync status=error adapter={} entry_id={} error={}",
                    remote.adapter_id(),
                    job.entry_id,
                    err
                );
                SyncOutcome::Failed
            }
        };
        let report = SyncReport {
            entry_id: job.entry_id,
            outcome,
        };
        if reports.send(report).is_err() {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{SyncDispatcher, SyncJob};
    use crate::model::session_log::SyncOutcome;
    use crate::sync::{CheckInPayload, RemoteAttendee, RemoteSync, RemoteSyncError};
    use std::sync::{Arc, Mutex};
    use uuid::Uuid;

    struct ScriptedRemote {
        fail_for: &'static str,
        sent: Mutex<Vec<String>>,
    }

    impl RemoteSync for ScriptedRemote {
        fn adapter_id(&self) -> &str {
            "scripted"
        }

        fn send(&self, payload: &CheckInPayload) -> Result<(), RemoteSyncError> {
            self.sent
                .lock()
                .expect("sent lock")
                .push(payload.display_name.clone());
            if payload.display_name == self.fail_for {
                return Err(RemoteSyncError::Transport {
                    kind: "connection",
                    detail: "refused".to_string(),
                });
            }
            Ok(())
        }

        fn fetch_today(&self) -> Vec<RemoteAttendee> {
            Vec::new()
        }
    }

    fn job(name: &str) -> SyncJob {
        SyncJob {
            entry_id: Uuid::new_v4(),
            payload: CheckInPayload {
                display_name: name.to_string(),
                at: "2026-03-02T08:00:00Z".to_string(),
                action: "Aanwezig".to_string(),
            },
        }
    }

    #[test]
    fn reports_one_outcome_per_job_in_order() {
        let remote = Arc::new(ScriptedRemote {
            fail_for: "Bram Jansen",
            sent: Mutex::new(Vec::new()),
        });
        let mut dispatcher = SyncDispatcher::spawn(remote.clone()).expect("spawn worker");

        let first = job("Eva Blom");
        let second = job("Bram Jansen");
        let (first_id, second_id) = (first.entry_id, second.entry_id);
        dispatcher.submit(first).expect("submit first");
        dispatcher.submit(second).expect("submit second");
        assert_eq!(dispatcher.in_flight(), 2);

        let reports = dispatcher.wait_all();
        assert_eq!(dispatcher.in_flight(), 0);
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].entry_id, first_id);
        assert_eq!(reports[0].outcome, SyncOutcome::Ok);
        assert_eq!(reports[1].entry_id, second_id);
        assert_eq!(reports[1].outcome, SyncOutcome::Failed);

        assert_eq!(
            *remote.sent.lock().expect("sent lock"),
            vec!["Eva Blom".to_string(), "Bram Jansen".to_string()]
        );
    }

    #[test]
    fn wait_all_without_jobs_returns_immediately() {
        let remote = Arc::new(ScriptedRemote {
            fail_for: "",
            sent: Mutex::new(Vec::new()),
        });
        let mut dispatcher = SyncDispatcher::spawn(remote).expect("spawn worker");
        assert!(dispatcher.wait_all().is_empty());
        assert!(dispatcher.try_collect().is_empty());
    }
}
