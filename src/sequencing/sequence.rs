use tracing::warn;

use crate::{
    error::{Result, SynthError},
    notes::{NoteId, NoteRegistry},
};

/// Default spacing between consecutive note triggers, in seconds.
///
/// Equal to the voice lifetime, so each note has fully stopped by the time
/// the next one starts.
pub const DEFAULT_INTERVAL: f64 = 1.5;

/// An ordered, non-empty list of notes played at a fixed interval.
#[derive(Debug, Clone, PartialEq)]
pub struct Sequence {
    notes: Vec<NoteId>,
    interval: f64,
}

impl Sequence {
    pub fn new(notes: Vec<NoteId>) -> Result<Self> {
        if notes.is_empty() {
            return Err(SynthError::EmptySequence);
        }
        Ok(Self {
            notes,
            interval: DEFAULT_INTERVAL,
        })
    }

    /// Non-positive or non-finite intervals keep the default.
    pub fn with_interval(mut self, seconds: f64) -> Self {
        if seconds.is_finite() && seconds > 0.0 {
            self.interval = seconds;
        }
        self
    }

    /// Build from textual note ids, skipping tokens the registry does not
    /// know.
    pub fn from_tokens<S: AsRef<str>>(tokens: &[S], registry: &NoteRegistry) -> Result<Self> {
        let notes = tokens
            .iter()
            .filter_map(|token| match registry.resolve(token.as_ref()) {
                Ok(note) => Some(note),
                Err(err) => {
                    warn!(token = token.as_ref(), %err, "skipping note token");
                    None
                }
            })
            .collect();
        Self::new(notes)
    }

    pub fn notes(&self) -> &[NoteId] {
        &self.notes
    }

    pub fn interval(&self) -> f64 {
        self.interval
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// Trigger offset of note `index` from the start of playback.
    pub fn offset_of(&self, index: usize) -> f64 {
        index as f64 * self.interval
    }

    /// Absolute trigger times for a run starting at `t0`.
    pub fn trigger_times(&self, t0: f64) -> impl Iterator<Item = f64> + '_ {
        (0..self.notes.len()).map(move |i| t0 + self.offset_of(i))
    }

    /// Time from the first trigger until playback completes.
    pub fn duration(&self) -> f64 {
        self.offset_of(self.notes.len())
    }
}
