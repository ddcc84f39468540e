//! LLM parameter store.
//!
//! Holds the API key, model selection and sampling parameters edited in the
//! sidebar. Key validity is derived from the key's shape, never stored, so the
//! two can't drift apart. Requests never borrow this live state; they take a
//! [`ParamSnapshot`] frozen at session start.

use serde::Serialize;

pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_TOP_P: f32 = 0.7;

/// Returns whether a key has the expected provider shape. Malformed keys are
/// surfaced through this flag only; they never block input.
pub fn api_key_valid(key: &str) -> bool {
    key.starts_with("sk-") && key.len() > 20
}

/// Supported model identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum ModelId {
    #[default]
    #[serde(rename = "gpt-3.5-turbo")]
    Gpt35Turbo,
    #[serde(rename = "gpt-4")]
    Gpt4,
    #[serde(rename = "gpt-4-turbo")]
    Gpt4Turbo,
}

impl ModelId {
    pub const ALL: [ModelId; 3] = [ModelId::Gpt35Turbo, ModelId::Gpt4, ModelId::Gpt4Turbo];

    /// Wire identifier sent to the backend.
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelId::Gpt35Turbo => "gpt-3.5-turbo",
            ModelId::Gpt4 => "gpt-4",
            ModelId::Gpt4Turbo => "gpt-4-turbo",
        }
    }

    /// Human-readable name for display.
    pub fn label(&self) -> &'static str {
        match self {
            ModelId::Gpt35Turbo => "GPT-3.5 Turbo",
            ModelId::Gpt4 => "GPT-4",
            ModelId::Gpt4Turbo => "GPT-4 Turbo",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|m| m.as_str() == id)
    }

    pub fn next(self) -> Self {
        match self {
            ModelId::Gpt35Turbo => ModelId::Gpt4,
            ModelId::Gpt4 => ModelId::Gpt4Turbo,
            ModelId::Gpt4Turbo => ModelId::Gpt35Turbo,
        }
    }

    pub fn prev(self) -> Self {
        self.next().next()
    }
}

impl std::fmt::Display for ModelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Step a slider value by `steps` tenths, clamped to [0, 1]. Computed on the
/// tenths grid so repeated stepping never accumulates float drift.
pub fn step(value: f32, steps: i32) -> f32 {
    let tenths = ((value * 10.0).round() as i32 + steps).clamp(0, 10);
    tenths as f32 / 10.0
}

/// The live, user-edited parameter state.
#[derive(Debug, Clone)]
pub struct Parameters {
    api_key: String,
    model: ModelId,
    temperature: f32,
    top_p: f32,
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: ModelId::default(),
            temperature: DEFAULT_TEMPERATURE,
            top_p: DEFAULT_TOP_P,
        }
    }
}

impl Parameters {
    /// Stores the raw key verbatim; validity stays a derived property.
    pub fn set_api_key(&mut self, raw: impl Into<String>) {
        self.api_key = raw.into();
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn api_key_valid(&self) -> bool {
        api_key_valid(&self.api_key)
    }

    pub fn set_model(&mut self, model: ModelId) {
        self.model = model;
    }

    pub fn model(&self) -> ModelId {
        self.model
    }

    /// Range discipline ([0, 1], 0.1 steps) is the calling control's job; the
    /// store holds what it is given.
    pub fn set_temperature(&mut self, v: f32) {
        self.temperature = v;
    }

    pub fn temperature(&self) -> f32 {
        self.temperature
    }

    pub fn set_top_p(&mut self, v: f32) {
        self.top_p = v;
    }

    pub fn top_p(&self) -> f32 {
        self.top_p
    }

    /// Restores documented defaults. The model selection is deliberately left
    /// untouched.
    pub fn reset(&mut self) {
        self.api_key.clear();
        self.temperature = DEFAULT_TEMPERATURE;
        self.top_p = DEFAULT_TOP_P;
    }

    /// Freezes the current values for a request. Edits made after the
    /// snapshot is taken must not affect an in-flight session.
    pub fn snapshot(&self) -> ParamSnapshot {
        ParamSnapshot {
            api_key: self.api_key.clone(),
            model: self.model,
            temperature: self.temperature,
            top_p: self.top_p,
        }
    }
}

/// Frozen copy of the parameters captured when a session starts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParamSnapshot {
    pub api_key: String,
    pub model: ModelId,
    pub temperature: f32,
    pub top_p: f32,
}
