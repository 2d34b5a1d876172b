//! Job poller
//!
//! Polls a status source for one remote job until it reaches a terminal state.
//! Each job runs in its own task: one request at a time, then a fixed delay
//! before the next. There is no backoff and no retry; the first failure is
//! terminal.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use reelflow_client::{StatusSource, StatusReport};
use reelflow_core::domain::job::{JobHandle, JobKind, JobSnapshot};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time;
use tracing::{debug, info, warn};

use crate::config::FlowConfig;
use crate::error::FlowError;

/// Starts and owns status polls against a [`StatusSource`]
#[derive(Clone)]
pub struct JobPoller {
    source: Arc<dyn StatusSource>,
    poll_interval: Duration,
    request_timeout: Option<Duration>,
}

impl JobPoller {
    /// Creates a new job poller
    pub fn new(source: Arc<dyn StatusSource>, config: &FlowConfig) -> Self {
        Self {
            source,
            poll_interval: config.poll_interval,
            request_timeout: config.request_timeout,
        }
    }

    /// Delay between consecutive status requests
    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Starts polling a job
    ///
    /// `on_update` runs after every successful request, terminal ones included.
    /// `on_terminal` runs exactly once, when the job first reaches `Succeeded`
    /// or `Failed`. Transport errors and non-2xx responses skip `on_update` and
    /// go straight to `on_terminal` with a `Failed` snapshot.
    ///
    /// Callbacks run on the poll task. They may cancel or drop their own
    /// handle; cancelling from `on_update` suppresses `on_terminal`.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    /// Returns an error if `job_id` is empty.
    pub fn start<U, T>(
        &self,
        job_id: impl Into<String>,
        kind: JobKind,
        on_update: U,
        on_terminal: T,
    ) -> Result<PollHandle, FlowError>
    where
        U: FnMut(&JobSnapshot) + Send + 'static,
        T: FnOnce(JobSnapshot) + Send + 'static,
    {
        let job = JobHandle::new(job_id, kind)?;
        let job_id = job.job_id().to_string();

        let (terminal_tx, terminal_rx) = watch::channel(None);
        let shared = Arc::new(Shared {
            callbacks: Mutex::new(()),
            cancelled: AtomicBool::new(false),
            finished: AtomicBool::new(false),
            terminal: terminal_tx,
        });

        info!(
            "Polling {} job {} every {:?}",
            kind, job_id, self.poll_interval
        );

        let task = tokio::spawn(run_poll(
            Arc::clone(&self.source),
            job,
            self.poll_interval,
            self.request_timeout,
            Arc::clone(&shared),
            on_update,
            on_terminal,
        ));

        Ok(PollHandle {
            job_id,
            kind,
            shared,
            terminal: terminal_rx,
            task,
        })
    }

    /// Starts polling a job and streams its snapshots
    ///
    /// Every non-terminal snapshot is sent on the channel, followed by the
    /// terminal snapshot as the last item. The channel closes when the poll
    /// ends or is cancelled.
    pub fn watch(
        &self,
        job_id: impl Into<String>,
        kind: JobKind,
    ) -> Result<(PollHandle, mpsc::UnboundedReceiver<JobSnapshot>), FlowError> {
        let (tx, rx) = mpsc::unbounded_channel();
        let terminal_tx = tx.clone();

        let handle = self.start(
            job_id,
            kind,
            move |snapshot| {
                if !snapshot.is_terminal() {
                    let _ = tx.send(snapshot.clone());
                }
            },
            move |snapshot| {
                let _ = terminal_tx.send(snapshot);
            },
        )?;

        Ok((handle, rx))
    }
}

/// State shared by a poll task and its handle
///
/// `callbacks` is held while the task runs a callback, so a cancel from any
/// other task waits for that callback to return.
struct Shared {
    callbacks: Mutex<()>,
    cancelled: AtomicBool,
    finished: AtomicBool,
    terminal: watch::Sender<Option<JobSnapshot>>,
}

impl Shared {
    fn callbacks(&self) -> MutexGuard<'_, ()> {
        self.callbacks.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    fn is_finished(&self) -> bool {
        self.finished.load(Ordering::SeqCst)
    }

    /// Flags the poll as cancelled; true only for the first effective call
    fn mark_cancelled(&self) -> bool {
        if self.is_finished() {
            return false;
        }
        !self.cancelled.swap(true, Ordering::SeqCst)
    }
}

/// Handle to one running poll
///
/// Dropping the handle cancels the poll.
pub struct PollHandle {
    job_id: String,
    kind: JobKind,
    shared: Arc<Shared>,
    terminal: watch::Receiver<Option<JobSnapshot>>,
    task: JoinHandle<()>,
}

impl PollHandle {
    /// ID of the polled job
    pub fn job_id(&self) -> &str {
        &self.job_id
    }

    /// Kind of the polled job
    pub fn kind(&self) -> JobKind {
        self.kind
    }

    /// Stops the poll
    ///
    /// Idempotent, and a no-op once the job has finished. When this returns
    /// no callback will run for this handle again; a response still in
    /// flight is discarded. Safe to call from the handle's own callbacks.
    pub fn cancel(&self) {
        let first = if tokio::task::try_id() == Some(self.task.id()) {
            self.shared.mark_cancelled()
        } else {
            let _callbacks = self.shared.callbacks();
            self.shared.mark_cancelled()
        };

        self.task.abort();

        if first {
            self.shared.terminal.send_replace(None);
            info!("Cancelled polling for {} job {}", self.kind, self.job_id);
        }
    }

    /// Whether the poll was cancelled before the job finished
    pub fn is_cancelled(&self) -> bool {
        self.shared.is_cancelled()
    }

    /// Whether the job reached a terminal state
    pub fn is_finished(&self) -> bool {
        self.shared.is_finished()
    }

    /// Terminal snapshot, if the job already finished
    pub fn terminal_snapshot(&self) -> Option<JobSnapshot> {
        self.terminal.borrow().clone()
    }

    /// Detached waiter for the terminal snapshot
    pub fn waiter(&self) -> PollWaiter {
        PollWaiter {
            shared: Arc::clone(&self.shared),
            terminal: self.terminal.clone(),
        }
    }

    /// Waits for the terminal snapshot; `None` if the poll was cancelled first
    pub async fn wait(&self) -> Option<JobSnapshot> {
        self.waiter().wait().await
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl std::fmt::Debug for PollHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PollHandle")
            .field("job_id", &self.job_id)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

/// Waits for a poll's outcome without borrowing its [`PollHandle`]
#[derive(Clone)]
pub struct PollWaiter {
    shared: Arc<Shared>,
    terminal: watch::Receiver<Option<JobSnapshot>>,
}

impl PollWaiter {
    pub async fn wait(mut self) -> Option<JobSnapshot> {
        loop {
            if let Some(snapshot) = self.terminal.borrow_and_update().clone() {
                return Some(snapshot);
            }
            if self.shared.is_cancelled() {
                return None;
            }
            if self.terminal.changed().await.is_err() {
                return self.terminal.borrow().clone();
            }
        }
    }
}

async fn run_poll<U, T>(
    source: Arc<dyn StatusSource>,
    mut job: JobHandle,
    interval: Duration,
    request_timeout: Option<Duration>,
    shared: Arc<Shared>,
    mut on_update: U,
    on_terminal: T,
) where
    U: FnMut(&JobSnapshot) + Send + 'static,
    T: FnOnce(JobSnapshot) + Send + 'static,
{
    let mut on_terminal = Some(on_terminal);
    let mut attempt: u32 = 0;

    loop {
        attempt += 1;
        debug!(
            "Requesting status of {} job {} (attempt {})",
            job.kind(),
            job.job_id(),
            attempt
        );

        let (snapshot, responded) =
            match fetch_once(source.as_ref(), &job, request_timeout).await {
                Ok(report) => (job.apply(report), true),
                Err(message) => {
                    warn!(
                        "Status request for {} job {} failed: {}",
                        job.kind(),
                        job.job_id(),
                        message
                    );
                    (job.fail(message), false)
                }
            };

        {
            let _callbacks = shared.callbacks();
            if shared.is_cancelled() {
                debug!("Discarding response for cancelled job {}", job.job_id());
                return;
            }

            if responded {
                on_update(&snapshot);
                if shared.is_cancelled() {
                    return;
                }
            }

            if snapshot.is_terminal() {
                shared.finished.store(true, Ordering::SeqCst);
                shared.terminal.send_replace(Some(snapshot.clone()));
                info!(
                    "{} job {} finished as {} after {} request(s)",
                    job.kind(),
                    job.job_id(),
                    snapshot.status,
                    attempt
                );
                if let Some(on_terminal) = on_terminal.take() {
                    on_terminal(snapshot);
                }
                return;
            }
        }

        time::sleep(interval).await;
    }
}

async fn fetch_once(
    source: &dyn StatusSource,
    job: &JobHandle,
    request_timeout: Option<Duration>,
) -> Result<StatusReport, String> {
    let request = source.fetch_status(job.kind(), job.job_id());

    let result = match request_timeout {
        Some(limit) => match time::timeout(limit, request).await {
            Ok(result) => result,
            Err(_) => return Err(format!("status request timed out after {:?}", limit)),
        },
        None => request.await,
    };

    result.map_err(|e| e.to_string())
}
