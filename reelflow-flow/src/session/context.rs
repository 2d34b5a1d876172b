//! Session context
//!
//! Typed access to the values a session keeps across reloads: the session
//! id, the user token, per-session flags, job ids and the wizard snapshot.
//! The context is passed explicitly to whatever needs it.

use std::sync::Arc;

use reelflow_core::domain::status::JobStatus;
use reelflow_core::domain::wizard::{WizardState, WizardStep};
use serde_json::Value;
use tracing::{info, warn};
use uuid::Uuid;

use super::store::{SessionStore, StoreError};

const SESSION_ID: &str = "session_id";
const TOKEN: &str = "token";
const HAS_GENERATED_SCRIPT: &str = "has_generated_script";
const WIZARD_STATE: &str = "wizard_state";
const CHAT_HISTORY: &str = "chat_history";
const BRAND_ASSETS: &str = "brand_assets";
const VIDEO_TYPE_SET_PREFIX: &str = "video_type_set:";
const JOB_PREFIX: &str = "job:";
const JOB_STATUS_PREFIX: &str = "job_status:";

/// Keys that belong to one session and are dropped when a new one starts
const SESSION_SCOPED: &[&str] = &[HAS_GENERATED_SCRIPT, WIZARD_STATE, CHAT_HISTORY];
const SESSION_SCOPED_PREFIXES: &[&str] = &[JOB_PREFIX, JOB_STATUS_PREFIX];

/// Handle to the persisted session state
#[derive(Clone)]
pub struct SessionContext {
    store: Arc<dyn SessionStore>,
}

impl SessionContext {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }

    /// Context over a fresh in-memory store
    pub fn in_memory() -> Self {
        Self::new(Arc::new(super::store::MemoryStore::new()))
    }

    pub fn store(&self) -> &Arc<dyn SessionStore> {
        &self.store
    }

    // =============================================================================
    // Identity
    // =============================================================================

    pub fn session_id(&self) -> Option<String> {
        self.store.get(SESSION_ID)
    }

    /// Starts a brand-new session and returns its id
    ///
    /// Drops everything scoped to the previous session. The token and the
    /// brand-assets snapshot belong to the user and are kept.
    pub fn start_new_session(&self) -> Result<String, StoreError> {
        for key in self.store.keys() {
            let scoped = SESSION_SCOPED.contains(&key.as_str())
                || SESSION_SCOPED_PREFIXES.iter().any(|p| key.starts_with(p));
            if scoped {
                self.store.remove(&key)?;
            }
        }

        let session_id = Uuid::new_v4().to_string();
        self.store.set(SESSION_ID, &session_id)?;
        info!("Started session {}", session_id);
        Ok(session_id)
    }

    /// Returns the current session id, starting a session if there is none
    pub fn ensure_session(&self) -> Result<String, StoreError> {
        match self.session_id() {
            Some(id) => Ok(id),
            None => self.start_new_session(),
        }
    }

    pub fn token(&self) -> Option<String> {
        self.store.get(TOKEN)
    }

    pub fn set_token(&self, token: &str) -> Result<(), StoreError> {
        self.store.set(TOKEN, token)
    }

    // =============================================================================
    // Flags
    // =============================================================================

    pub fn has_generated_script(&self) -> bool {
        self.flag(HAS_GENERATED_SCRIPT)
    }

    pub fn set_generated_script(&self, value: bool) -> Result<(), StoreError> {
        self.store.set(HAS_GENERATED_SCRIPT, bool_str(value))
    }

    /// Whether the video type was chosen for the current session
    pub fn video_type_set(&self) -> bool {
        self.session_id()
            .is_some_and(|id| self.flag(&format!("{VIDEO_TYPE_SET_PREFIX}{id}")))
    }

    pub fn mark_video_type_set(&self) -> Result<(), StoreError> {
        let id = self.ensure_session()?;
        self.store
            .set(&format!("{VIDEO_TYPE_SET_PREFIX}{id}"), bool_str(true))
    }

    fn flag(&self, key: &str) -> bool {
        self.store.get(key).is_some_and(|v| v == "true")
    }

    // =============================================================================
    // Jobs
    // =============================================================================

    /// Remembers which job a step started
    pub fn record_job(&self, step: WizardStep, job_id: &str) -> Result<(), StoreError> {
        self.store.set(&format!("{JOB_PREFIX}{step}"), job_id)
    }

    pub fn job_for(&self, step: WizardStep) -> Option<String> {
        self.store.get(&format!("{JOB_PREFIX}{step}"))
    }

    pub fn record_job_status(&self, job_id: &str, status: JobStatus) -> Result<(), StoreError> {
        let encoded = serde_json::to_string(&status)?;
        self.store
            .set(&format!("{JOB_STATUS_PREFIX}{job_id}"), &encoded)
    }

    pub fn job_status(&self, job_id: &str) -> Option<JobStatus> {
        self.store
            .get(&format!("{JOB_STATUS_PREFIX}{job_id}"))
            .and_then(|raw| serde_json::from_str(&raw).ok())
    }

    // =============================================================================
    // Cached documents
    // =============================================================================

    pub fn save_wizard(&self, state: &WizardState) -> Result<(), StoreError> {
        self.store.set(WIZARD_STATE, &serde_json::to_string(state)?)
    }

    /// Persisted wizard snapshot; unreadable snapshots are ignored
    pub fn load_wizard(&self) -> Option<WizardState> {
        let raw = self.store.get(WIZARD_STATE)?;
        match serde_json::from_str(&raw) {
            Ok(state) => Some(state),
            Err(e) => {
                warn!("Ignoring unreadable wizard snapshot: {}", e);
                None
            }
        }
    }

    pub fn chat_history(&self) -> Vec<Value> {
        self.json(CHAT_HISTORY)
            .and_then(|v| match v {
                Value::Array(items) => Some(items),
                _ => None,
            })
            .unwrap_or_default()
    }

    pub fn save_chat_history(&self, messages: &[Value]) -> Result<(), StoreError> {
        self.store
            .set(CHAT_HISTORY, &serde_json::to_string(messages)?)
    }

    pub fn brand_assets(&self) -> Option<Value> {
        self.json(BRAND_ASSETS)
    }

    pub fn save_brand_assets(&self, snapshot: &Value) -> Result<(), StoreError> {
        self.store
            .set(BRAND_ASSETS, &serde_json::to_string(snapshot)?)
    }

    fn json(&self, key: &str) -> Option<Value> {
        self.store
            .get(key)
            .and_then(|raw| serde_json::from_str(&raw).ok())
    }

    /// Removes everything, token included
    pub fn clear(&self) -> Result<(), StoreError> {
        self.store.clear()
    }
}

impl std::fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionContext")
            .field("session_id", &self.session_id())
            .finish_non_exhaustive()
    }
}

fn bool_str(value: bool) -> &'static str {
    if value { "true" } else { "false" }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_session_drops_scoped_keys() {
        let session = SessionContext::in_memory();
        session.set_token("user-1").unwrap();
        let first = session.start_new_session().unwrap();
        session.set_generated_script(true).unwrap();
        session.record_job(WizardStep::Images, "img-1").unwrap();
        session
            .record_job_status("img-1", JobStatus::Succeeded)
            .unwrap();
        session.save_brand_assets(&json!({"logo": "l.png"})).unwrap();

        let second = session.start_new_session().unwrap();

        assert_ne!(first, second);
        assert_eq!(session.session_id(), Some(second));
        assert!(!session.has_generated_script());
        assert_eq!(session.job_for(WizardStep::Images), None);
        assert_eq!(session.job_status("img-1"), None);
        assert_eq!(session.token().as_deref(), Some("user-1"));
        assert_eq!(session.brand_assets(), Some(json!({"logo": "l.png"})));
    }

    #[test]
    fn test_video_type_flag_is_per_session() {
        let session = SessionContext::in_memory();
        assert!(!session.video_type_set());

        session.mark_video_type_set().unwrap();
        assert!(session.video_type_set());

        session.start_new_session().unwrap();
        assert!(!session.video_type_set());
    }

    #[test]
    fn test_job_status_roundtrip() {
        let session = SessionContext::in_memory();
        session
            .record_job_status("merge-1", JobStatus::Failed)
            .unwrap();
        assert_eq!(session.job_status("merge-1"), Some(JobStatus::Failed));
        assert_eq!(session.job_status("merge-2"), None);
    }

    #[test]
    fn test_wizard_snapshot() {
        let session = SessionContext::in_memory();
        assert!(session.load_wizard().is_none());

        let mut state = WizardState::new();
        state.go_to(WizardStep::Videos, Some(json!({"videos": ["a.mp4"]})));
        session.save_wizard(&state).unwrap();

        assert_eq!(session.load_wizard(), Some(state));
    }

    #[test]
    fn test_unreadable_wizard_snapshot_is_ignored() {
        let session = SessionContext::in_memory();
        session.store().set(WIZARD_STATE, "{not json").unwrap();
        assert!(session.load_wizard().is_none());
    }

    #[test]
    fn test_chat_history() {
        let session = SessionContext::in_memory();
        assert!(session.chat_history().is_empty());

        let messages = vec![json!({"role": "user", "content": "A reel for our bakery"})];
        session.save_chat_history(&messages).unwrap();
        assert_eq!(session.chat_history(), messages);
    }
}
