use tracing::{debug, trace};

use crate::{
    engine::AudioContext,
    error::{Result, SynthError},
    events::{DisplayEvent, NoteSource},
    input::keymap::note_for_key,
    notes::{NoteId, NoteRegistry},
    synth::VoiceId,
};

/// Monophonic keyboard driver.
///
/// Only one note is ever "held". Pressing another key while one is held is
/// ignored, and so is key repeat, so holding a key down produces exactly one
/// voice. Any key-up ends the held note.
#[derive(Debug, Default)]
pub struct InputDispatcher {
    held: Option<NoteId>,
    voice: Option<VoiceId>,
    events: Vec<DisplayEvent>,
}

impl InputDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle a physical key press. Returns whether a note started.
    ///
    /// Unmapped keys are ignored.
    pub fn key_down(
        &mut self,
        ctx: &mut AudioContext,
        registry: &NoteRegistry,
        key: char,
    ) -> Result<bool> {
        if self.held.is_some() {
            return Ok(false);
        }
        match note_for_key(key) {
            Some(note) => self.press_note(ctx, registry, note),
            None => {
                trace!(?key, "unmapped key");
                Ok(false)
            }
        }
    }

    /// Start `note` as if its key had been pressed (on-screen keys).
    ///
    /// Notes missing from the registry are ignored.
    pub fn press_note(
        &mut self,
        ctx: &mut AudioContext,
        registry: &NoteRegistry,
        note: NoteId,
    ) -> Result<bool> {
        if self.held.is_some() {
            return Ok(false);
        }

        let entry = match registry.entry(note) {
            Ok(entry) => entry,
            Err(SynthError::UnknownNote(_)) => {
                trace!(%note, "note not in registry");
                return Ok(false);
            }
            Err(e) => return Err(e),
        };

        let at = ctx.current_time();
        let voice = ctx.trigger(entry.frequency_hz, at)?;

        self.held = Some(note);
        self.voice = Some(voice);
        self.events.push(DisplayEvent::NoteStarted {
            note,
            labels: entry.labels.clone(),
            source: NoteSource::Keyboard,
            at,
        });
        debug!(%note, %voice, "key note started");
        Ok(true)
    }

    /// Handle any key release. Safe to call when nothing is held.
    pub fn key_up(&mut self, ctx: &mut AudioContext) {
        if let Some(voice) = self.voice.take() {
            ctx.stop(voice);
        }
        if let Some(note) = self.held.take() {
            self.events.push(DisplayEvent::NoteEnded {
                source: NoteSource::Keyboard,
            });
            debug!(%note, "key note ended");
        }
    }

    pub fn held_note(&self) -> Option<NoteId> {
        self.held
    }

    pub fn voice(&self) -> Option<VoiceId> {
        self.voice
    }

    pub fn drain_events(&mut self) -> std::vec::Drain<'_, DisplayEvent> {
        self.events.drain(..)
    }
}
