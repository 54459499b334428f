//! Request and response shapes of the note-generation service.
//!
//! The service itself is out of process; this module only builds requests
//! and turns its JSON answers into playable sequences.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{
    error::{Result, SynthError},
    notes::NoteRegistry,
    sequencing::Sequence,
};

/// Ragas the service knows how to condition on.
pub const RAGAS: [&str; 5] = ["Bhairavi", "Kalyani", "Shankarabharanam", "Todi", "Kambhoji"];

/// What the service answers while no model is loaded.
pub const FALLBACK_SCALE: [&str; 8] = ["C4", "D4", "E4", "F4", "G4", "A4", "B4", "C5"];

pub const MIN_TEMPERATURE: f32 = 0.1;
pub const MAX_TEMPERATURE: f32 = 2.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub raga: String,
    /// Desired number of notes.
    pub duration: u32,
    pub temperature: f32,
}

impl GenerationRequest {
    pub fn new(raga: impl Into<String>) -> Self {
        Self {
            raga: raga.into(),
            duration: 30,
            temperature: 1.0,
        }
    }

    pub fn with_duration(mut self, notes: u32) -> Self {
        self.duration = notes.max(1);
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = if temperature.is_finite() {
            temperature.clamp(MIN_TEMPERATURE, MAX_TEMPERATURE)
        } else {
            1.0
        };
        self
    }

    pub fn is_known_raga(&self) -> bool {
        RAGAS.iter().any(|r| r.eq_ignore_ascii_case(&self.raga))
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| SynthError::Generation(e.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GenerationResponse {
    #[serde(default)]
    pub notes: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raga: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub fn parse_response(json: &str) -> Result<GenerationResponse> {
    let response: GenerationResponse =
        serde_json::from_str(json).map_err(|e| SynthError::Generation(e.to_string()))?;
    if let Some(error) = &response.error {
        return Err(SynthError::Generation(error.clone()));
    }
    if let Some(message) = &response.message {
        info!(message = message.as_str(), "generation service");
    }
    Ok(response)
}

/// Parse a response straight into a sequence at the default interval.
pub fn parse_sequence(json: &str, registry: &NoteRegistry) -> Result<Sequence> {
    let response = parse_response(json)?;
    if response.notes.is_empty() {
        return Err(SynthError::Generation("response contains no notes".into()));
    }
    Sequence::from_tokens(&response.notes, registry).map_err(|err| {
        warn!(count = response.notes.len(), "no generated note is playable");
        match err {
            SynthError::EmptySequence => {
                SynthError::Generation("response contains no playable notes".into())
            }
            other => other,
        }
    })
}
