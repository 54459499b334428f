//! The playable instrument: one audio context driven by a keyboard and a
//! sequence player that take turns.

use std::collections::VecDeque;

use tracing::debug;

use crate::{
    config::EngineConfig,
    engine::{AudioContext, RenderSource},
    error::Result,
    events::DisplayEvent,
    input::{keymap::note_for_key, InputDispatcher},
    monitor::LevelMonitor,
    notes::{NoteId, NoteRegistry},
    sequencing::{PlayerState, Sequence, SequencePlayer},
};

/// Owns the audio context and both drivers.
///
/// Only one driver owns the "current note" at a time: a key press cancels a
/// running sequence, and starting a sequence releases a held key. Voices
/// already triggered by either driver keep decaying.
pub struct Instrument {
    ctx: AudioContext,
    registry: &'static NoteRegistry,
    keyboard: InputDispatcher,
    player: SequencePlayer,
    events: VecDeque<DisplayEvent>,
}

impl Instrument {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            ctx: AudioContext::new(config),
            registry: NoteRegistry::standard(),
            keyboard: InputDispatcher::new(),
            player: SequencePlayer::new(),
            events: VecDeque::new(),
        }
    }

    pub fn context(&self) -> &AudioContext {
        &self.ctx
    }

    pub fn context_mut(&mut self) -> &mut AudioContext {
        &mut self.ctx
    }

    pub fn registry(&self) -> &'static NoteRegistry {
        self.registry
    }

    /// Unmapped keys change nothing, not even a running sequence.
    pub fn key_down(&mut self, key: char) -> Result<bool> {
        match note_for_key(key) {
            Some(note) => self.press_note(note),
            None => Ok(false),
        }
    }

    pub fn press_note(&mut self, note: NoteId) -> Result<bool> {
        if self.keyboard.held_note().is_some() || self.registry.entry(note).is_err() {
            return Ok(false);
        }
        self.take_over_from_player()?;
        let started = self.keyboard.press_note(&mut self.ctx, self.registry, note);
        self.collect();
        started
    }

    pub fn key_up(&mut self) {
        self.keyboard.key_up(&mut self.ctx);
        self.collect();
    }

    /// Play `sequence` from the top, interrupting whatever is playing.
    pub fn play(&mut self, sequence: Sequence) -> Result<()> {
        self.keyboard.key_up(&mut self.ctx);
        self.collect();
        self.take_over_from_player()?;
        let result = self.player.start(&mut self.ctx, self.registry, sequence);
        self.collect();
        result
    }

    /// Parse a generation service response and play it.
    ///
    /// Nothing changes if the response is unusable.
    #[cfg(feature = "serde")]
    pub fn play_generated(&mut self, json: &str) -> Result<()> {
        let sequence = crate::io::generation::parse_sequence(json, self.registry)?;
        self.play(sequence)
    }

    /// Replay the last sequence.
    pub fn replay(&mut self) -> Result<()> {
        self.keyboard.key_up(&mut self.ctx);
        self.collect();
        self.take_over_from_player()?;
        let result = self.player.replay(&mut self.ctx, self.registry);
        self.collect();
        result
    }

    pub fn cancel(&mut self) -> Result<()> {
        let result = self.player.cancel(&mut self.ctx);
        self.collect();
        result
    }

    fn take_over_from_player(&mut self) -> Result<()> {
        if self.player.state() == PlayerState::Playing {
            debug!("keyboard takes over from sequence");
            self.player.cancel(&mut self.ctx)?;
            self.collect();
        }
        Ok(())
    }

    /// The note the display should highlight.
    pub fn current_note(&self) -> Option<NoteId> {
        self.player
            .current_note()
            .or_else(|| self.keyboard.held_note())
    }

    pub fn player_state(&self) -> PlayerState {
        self.player.state()
    }

    pub fn last_sequence(&self) -> Option<&Sequence> {
        self.player.last_sequence()
    }

    /// Events since the last drain, oldest first.
    pub fn drain_events(&mut self) -> impl Iterator<Item = DisplayEvent> + '_ {
        self.collect();
        self.events.drain(..)
    }

    /// Queue whatever the drivers emitted since the last call. Callers
    /// collect after each driver step so the queue stays in time order.
    fn collect(&mut self) {
        self.events.extend(self.keyboard.drain_events());
        self.events.extend(self.player.drain_events());
    }

    pub fn render(&mut self, out: &mut [f32]) {
        self.ctx.render_with(out, &mut self.player);
    }

    pub fn attach_monitor(&mut self, monitor: &mut LevelMonitor) {
        monitor.attach(&mut self.ctx);
    }

    /// Release every voice and the audio context.
    pub fn shutdown(&mut self) {
        self.keyboard.key_up(&mut self.ctx);
        if self.player.state() == PlayerState::Playing {
            let _ = self.player.cancel(&mut self.ctx);
        }
        self.collect();
        self.ctx.close();
    }
}

impl Default for Instrument {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl RenderSource for Instrument {
    fn render(&mut self, out: &mut [f32]) {
        Instrument::render(self, out);
    }
}
