//! Workflow input and research prompt construction

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::Result;

/// The single free-text prompt a workflow runs on.
///
/// Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowInput {
    input_as_text: String,
}

impl WorkflowInput {
    pub fn new(input_as_text: impl Into<String>) -> Self {
        Self {
            input_as_text: input_as_text.into(),
        }
    }

    pub fn as_text(&self) -> &str {
        &self.input_as_text
    }
}

/// What the planner submits: the case narrative and where the patient lives
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResearchRequest {
    pub patient_summary: String,
    #[serde(default)]
    pub location: Option<String>,
}

impl ResearchRequest {
    pub fn new(patient_summary: impl Into<String>) -> Self {
        Self {
            patient_summary: patient_summary.into(),
            location: None,
        }
    }

    /// Set the patient location
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Trimmed location, `None` when blank
    pub fn location(&self) -> Option<&str> {
        self.location
            .as_deref()
            .map(str::trim)
            .filter(|loc| !loc.is_empty())
    }

    /// Sentence appended to the prompt when a location is known
    pub fn location_clause(&self) -> Option<String> {
        self.location().map(|loc| {
            format!(
                " The patient's location is: {}. Prioritize pricing, availability, and codes relevant to this location when possible.",
                loc
            )
        })
    }

    /// Build the natural-language prompt sent to the first stage
    pub fn prompt(&self) -> String {
        let mut prompt = format!(
            "Review the following patient medical summary and determine the medically necessary items, services, and equipment. \
             Provide detailed research including costs, frequencies, CPT codes (if applicable), and concise comments for each recommendation. \
             Patient medical summary: {}.",
            self.patient_summary
        );
        if let Some(clause) = self.location_clause() {
            prompt.push_str(&clause);
        }
        prompt
    }

    /// Validate the request and turn it into a workflow input
    pub fn to_workflow_input(&self) -> Result<WorkflowInput> {
        if self.patient_summary.trim().is_empty() {
            return Err(Error::InvalidInput(
                "Please enter the patient's medical summary before starting research.".to_string(),
            ));
        }
        Ok(WorkflowInput::new(self.prompt()))
    }
}
