//! Step wizard
//!
//! Holds the user's place in the guided flow, the polls each step started,
//! and the session the state is persisted to.
//!
//! Transitions are permissive on purpose. Any step can be reached from any
//! other, and a failed remote call on a non-blocking step still moves the user
//! forward. The only timer-driven transition is the short redirect after a
//! successful images or videos job.

use std::collections::HashMap;
use std::time::Duration;

use reelflow_core::domain::job::{JobKind, JobSnapshot};
use reelflow_core::domain::status::JobStatus;
use reelflow_core::domain::wizard::{WizardState, WizardStep};
use serde_json::{Value, json};
use tokio::time;
use tracing::{debug, info, warn};

use crate::config::FlowConfig;
use crate::error::FlowError;
use crate::scheduler::PollHandle;
use crate::session::SessionContext;

/// Chat message appended once a script has been generated
pub const SCRIPT_READY_MESSAGE: &str =
    "Your script is ready. Open the script editor to review and adjust it.";

/// What the caller should do after a step's job finished
#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome {
    /// Show the redirect overlay, then move to `to` after `after`
    Redirect { to: WizardStep, after: Duration },
    /// A chat message was appended to the chat step; stay put
    ChatMessage(String),
    /// Nothing to do; the result is on the step's payload
    Stay,
    /// The job failed; the user has to re-trigger it
    Failed(String),
    /// The poll was cancelled before it finished
    Cancelled,
}

/// The multi-step flow from brief to final video
pub struct StepWizard {
    state: WizardState,
    jobs: HashMap<WizardStep, PollHandle>,
    session: SessionContext,
    redirect_delay: Duration,
}

impl StepWizard {
    /// Creates a wizard at the first step
    pub fn new(session: SessionContext, config: &FlowConfig) -> Self {
        Self {
            state: WizardState::new(),
            jobs: HashMap::new(),
            session,
            redirect_delay: config.redirect_delay,
        }
    }

    /// Restores the wizard from the session's persisted snapshot
    ///
    /// Starts fresh when there is nothing to restore.
    pub fn resume(session: SessionContext, config: &FlowConfig) -> Self {
        let state = session.load_wizard().unwrap_or_default();
        info!("Resuming wizard at step {}", state.current_step());
        Self {
            state,
            jobs: HashMap::new(),
            session,
            redirect_delay: config.redirect_delay,
        }
    }

    pub fn state(&self) -> &WizardState {
        &self.state
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    pub fn current_step(&self) -> WizardStep {
        self.state.current_step()
    }

    pub fn payload(&self, step: WizardStep) -> Option<&Value> {
        self.state.payload(step)
    }

    // =============================================================================
    // Transitions
    // =============================================================================

    /// Moves to `step`; no ordering is enforced
    pub fn go_to(&mut self, step: WizardStep, payload: Option<Value>) {
        debug!("Wizard {} -> {}", self.state.current_step(), step);
        self.state.go_to(step, payload);
        self.persist();
    }

    /// Overwrites the payload owned by `step`
    pub fn set_payload(&mut self, step: WizardStep, payload: Value) {
        self.state.set_payload(step, payload);
        self.persist();
    }

    /// Moves to the next step in canonical order; stays on the last step
    pub fn advance(&mut self, payload: Option<Value>) -> WizardStep {
        if let Some(next) = self.current_step().next() {
            self.go_to(next, payload);
        }
        self.current_step()
    }

    /// Moves to the previous step in canonical order; stays on the first step
    pub fn back(&mut self) -> WizardStep {
        if let Some(previous) = self.current_step().previous() {
            self.go_to(previous, None);
        }
        self.current_step()
    }

    /// Moves to `to` whether or not the remote call behind it succeeded
    ///
    /// A failure is logged and the step is entered without a payload.
    pub fn proceed<E: std::fmt::Display>(&mut self, to: WizardStep, outcome: Result<Value, E>) {
        match outcome {
            Ok(payload) => self.go_to(to, Some(payload)),
            Err(e) => {
                warn!(
                    "Remote call before step {} failed, continuing anyway: {}",
                    to, e
                );
                self.go_to(to, None);
            }
        }
    }

    /// Clears all steps and starts a new session
    pub fn reset(&mut self) {
        self.teardown();
        self.state.reset();
        if let Err(e) = self.session.start_new_session() {
            warn!("Failed to start a new session: {}", e);
        }
        self.persist();
    }

    // =============================================================================
    // Jobs
    // =============================================================================

    /// Associates a running poll with the step that started it
    ///
    /// A job previously attached to the same step is cancelled.
    pub fn attach_job(&mut self, step: WizardStep, handle: PollHandle) {
        if let Err(e) = self.session.record_job(step, handle.job_id()) {
            warn!("Failed to record job {}: {}", handle.job_id(), e);
        }
        info!(
            "Attached {} job {} to step {}",
            handle.kind(),
            handle.job_id(),
            step
        );
        if let Some(previous) = self.jobs.insert(step, handle) {
            previous.cancel();
        }
    }

    /// The poll attached to `step`, if still running or unclaimed
    pub fn job(&self, step: WizardStep) -> Option<&PollHandle> {
        self.jobs.get(&step)
    }

    /// Waits for the job attached to `step` and applies its result
    ///
    /// # Errors
    /// Returns [`FlowError::NoJobAttached`] when `step` has no job.
    pub async fn await_job(&mut self, step: WizardStep) -> Result<StepOutcome, FlowError> {
        let waiter = self
            .jobs
            .get(&step)
            .ok_or(FlowError::NoJobAttached(step))?
            .waiter();

        let Some(snapshot) = waiter.wait().await else {
            self.jobs.remove(&step);
            return Ok(StepOutcome::Cancelled);
        };

        self.jobs.remove(&step);
        if let Err(e) = self
            .session
            .record_job_status(&snapshot.job_id, snapshot.status)
        {
            warn!("Failed to record status of job {}: {}", snapshot.job_id, e);
        }

        Ok(self.apply_terminal(step, &snapshot))
    }

    fn apply_terminal(&mut self, step: WizardStep, snapshot: &JobSnapshot) -> StepOutcome {
        if snapshot.status == JobStatus::Failed {
            let message = snapshot
                .error
                .clone()
                .unwrap_or_else(|| format!("{} job failed", snapshot.kind));
            warn!("Job {} on step {} failed: {}", snapshot.job_id, step, message);
            return StepOutcome::Failed(message);
        }

        let result = snapshot.result.as_ref().map(|r| r.to_json());

        match snapshot.kind {
            JobKind::Images | JobKind::Videos => {
                if let Some(result) = result {
                    self.set_payload(step, result);
                }
                let to = match snapshot.kind {
                    JobKind::Images => WizardStep::Videos,
                    _ => WizardStep::FinalVideo,
                };
                StepOutcome::Redirect {
                    to,
                    after: self.redirect_delay,
                }
            }
            JobKind::Merge => {
                if let Some(result) = result {
                    self.set_payload(step, result);
                }
                StepOutcome::Stay
            }
            JobKind::ScriptGeneration => {
                self.append_chat_message(SCRIPT_READY_MESSAGE, result);
                if let Err(e) = self.session.set_generated_script(true) {
                    warn!("Failed to flag generated script: {}", e);
                }
                StepOutcome::ChatMessage(SCRIPT_READY_MESSAGE.to_string())
            }
        }
    }

    fn append_chat_message(&mut self, content: &str, script: Option<Value>) {
        let mut message = json!({"role": "assistant", "content": content});
        if let Some(script) = script {
            message["script"] = script;
        }

        let mut chat = self
            .state
            .payload(WizardStep::Chat)
            .cloned()
            .filter(Value::is_object)
            .unwrap_or_else(|| json!({}));

        if !chat["messages"].is_array() {
            chat["messages"] = json!([]);
        }
        if let Some(messages) = chat["messages"].as_array_mut() {
            messages.push(message);
            if let Err(e) = self.session.save_chat_history(messages) {
                warn!("Failed to cache chat history: {}", e);
            }
        }

        self.set_payload(WizardStep::Chat, chat);
    }

    /// Carries out a redirect outcome; returns whether the wizard moved
    pub async fn follow(&mut self, outcome: &StepOutcome) -> bool {
        match outcome {
            StepOutcome::Redirect { to, after } => {
                info!("Redirecting to step {} in {:?}", to, after);
                time::sleep(*after).await;
                self.go_to(*to, None);
                true
            }
            _ => false,
        }
    }

    /// Cancels every outstanding poll, as when the owning view goes away
    pub fn teardown(&mut self) {
        for (step, handle) in self.jobs.drain() {
            debug!("Tearing down job {} on step {}", handle.job_id(), step);
            handle.cancel();
        }
    }

    fn persist(&self) {
        if let Err(e) = self.session.save_wizard(&self.state) {
            warn!("Failed to persist wizard state: {}", e);
        }
    }
}

impl Drop for StepWizard {
    fn drop(&mut self) {
        self.teardown();
    }
}
