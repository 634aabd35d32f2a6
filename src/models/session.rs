use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestState {
    #[default]
    Idle,
    InFlight,
}

impl RequestState {
    pub fn is_in_flight(&self) -> bool {
        matches!(self, RequestState::InFlight)
    }
}

/// Everything a front-end needs to render the form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub prompt: String,
    pub request: RequestState,
    pub export: RequestState,
    pub result: Option<String>,
    pub error: Option<String>,
}

impl SessionSnapshot {
    /// Label for the submit trigger, which is disabled while generating.
    pub fn submit_label(&self) -> &'static str {
        if self.request.is_in_flight() {
            "Generating..."
        } else {
            "Generate Image"
        }
    }

    pub fn can_submit(&self) -> bool {
        !self.request.is_in_flight() && !self.prompt.trim().is_empty()
    }

    pub fn can_export(&self) -> bool {
        self.result.is_some() && !self.export.is_in_flight()
    }
}
