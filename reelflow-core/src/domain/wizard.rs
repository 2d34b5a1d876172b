//! Wizard domain model
//!
//! The wizard is a plain state holder: transitions are explicit calls and no
//! ordering is enforced, so a resumed session can jump straight to the step
//! its data belongs to.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use crate::error::CoreError;

/// One stage of the guided video flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    Chat,
    Guidelines,
    Questionnaire,
    ScriptEditor,
    Images,
    Videos,
    FinalVideo,
}

impl WizardStep {
    /// Steps in their canonical order
    pub const ALL: [WizardStep; 7] = [
        WizardStep::Chat,
        WizardStep::Guidelines,
        WizardStep::Questionnaire,
        WizardStep::ScriptEditor,
        WizardStep::Images,
        WizardStep::Videos,
        WizardStep::FinalVideo,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WizardStep::Chat => "chat",
            WizardStep::Guidelines => "guidelines",
            WizardStep::Questionnaire => "questionnaire",
            WizardStep::ScriptEditor => "script_editor",
            WizardStep::Images => "images",
            WizardStep::Videos => "videos",
            WizardStep::FinalVideo => "final_video",
        }
    }

    fn index(&self) -> usize {
        Self::ALL
            .iter()
            .position(|step| step == self)
            .unwrap_or_default()
    }

    /// Following step in canonical order, `None` after `FinalVideo`
    pub fn next(&self) -> Option<WizardStep> {
        Self::ALL.get(self.index() + 1).copied()
    }

    /// Preceding step in canonical order, `None` before `Chat`
    pub fn previous(&self) -> Option<WizardStep> {
        self.index().checked_sub(1).map(|i| Self::ALL[i])
    }
}

impl std::fmt::Display for WizardStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for WizardStep {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let compact: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, '_' | '-' | ' '))
            .map(|c| c.to_ascii_lowercase())
            .collect();

        Self::ALL
            .into_iter()
            .find(|step| step.as_str().replace('_', "") == compact)
            .ok_or_else(|| CoreError::UnknownStep(s.to_string()))
    }
}

/// Position in the wizard plus the data each step hands to the next
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WizardState {
    current_step: WizardStep,
    #[serde(default)]
    step_payloads: HashMap<WizardStep, Value>,
}

impl WizardState {
    pub fn new() -> Self {
        Self {
            current_step: WizardStep::Chat,
            step_payloads: HashMap::new(),
        }
    }

    pub fn current_step(&self) -> WizardStep {
        self.current_step
    }

    /// Moves to `step`, storing `payload` as that step's data when given
    ///
    /// Any step is reachable from any other.
    pub fn go_to(&mut self, step: WizardStep, payload: Option<Value>) {
        self.current_step = step;
        if let Some(payload) = payload {
            self.step_payloads.insert(step, payload);
        }
    }

    /// Overwrites the payload owned by `step`
    pub fn set_payload(&mut self, step: WizardStep, payload: Value) {
        self.step_payloads.insert(step, payload);
    }

    pub fn payload(&self, step: WizardStep) -> Option<&Value> {
        self.step_payloads.get(&step)
    }

    pub fn payloads(&self) -> &HashMap<WizardStep, Value> {
        &self.step_payloads
    }

    pub fn reset(&mut self) {
        self.current_step = WizardStep::Chat;
        self.step_payloads.clear();
    }
}

impl Default for WizardState {
    fn default() -> Self {
        Self::new()
    }
}
