use tracing::{debug, info, warn};

#[cfg(feature = "serde")]
use serde::Serialize;

use crate::{
    engine::{AudioContext, TimerHandler, TimerId},
    error::{Result, SynthError},
    events::{DisplayEvent, NoteSource},
    notes::{NoteId, NoteLabels, NoteRegistry},
    sequencing::sequence::Sequence,
};

/*
Sequence Player
===============

Steps through a `Sequence`, one note per interval, on the audio timeline.

    Idle ──start──→ Playing ──last tick──→ Completed
                       │
                       └────cancel───────→ Cancelled

    Completed / Cancelled ──start or replay──→ Playing

Timing
------

Every trigger time is computed from the run's start, never from the
previous tick:

    trigger(i) = t0 + i × interval
    tick(i)    = t0 + (i + 1) × interval      (fires note i + 1)

Only one tick is pending at a time. It is an audio-context timer, so it is
handled inside the render loop on its exact frame and the next voice starts
on that same frame. Cancelling removes the pending tick; the voice already
sounding is left to finish its envelope.
*/

#[cfg_attr(feature = "serde", derive(Serialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlayerState {
    #[default]
    Idle,
    Playing,
    Completed,
    Cancelled,
}

#[derive(Debug, Clone)]
struct ResolvedNote {
    id: NoteId,
    frequency_hz: f32,
    labels: NoteLabels,
}

/// Progress through the current run.
#[derive(Debug)]
struct PlaybackCursor {
    notes: Vec<ResolvedNote>,
    index: usize,
    started_at: f64,
    interval: f64,
    pending: Option<TimerId>,
}

impl PlaybackCursor {
    fn trigger_time(&self, index: usize) -> f64 {
        self.started_at + index as f64 * self.interval
    }
}

#[derive(Debug, Default)]
pub struct SequencePlayer {
    state: PlayerState,
    cursor: Option<PlaybackCursor>,
    last_sequence: Option<Sequence>,
    events: Vec<DisplayEvent>,
}

impl SequencePlayer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> PlayerState {
        self.state
    }

    /// Note of the most recent trigger while playing.
    pub fn current_note(&self) -> Option<NoteId> {
        let cursor = self.cursor.as_ref()?;
        cursor.notes.get(cursor.index).map(|n| n.id)
    }

    /// Position of the current note in the running sequence.
    pub fn current_index(&self) -> Option<usize> {
        self.cursor.as_ref().map(|c| c.index)
    }

    pub fn last_sequence(&self) -> Option<&Sequence> {
        self.last_sequence.as_ref()
    }

    pub fn drain_events(&mut self) -> std::vec::Drain<'_, DisplayEvent> {
        self.events.drain(..)
    }

    /// Begin playing `sequence` now. The first note sounds immediately.
    pub fn start(
        &mut self,
        ctx: &mut AudioContext,
        registry: &NoteRegistry,
        sequence: Sequence,
    ) -> Result<()> {
        if self.state == PlayerState::Playing {
            return Err(SynthError::InvalidTransition {
                op: "start",
                state: self.state,
            });
        }

        let notes: Vec<ResolvedNote> = sequence
            .notes()
            .iter()
            .filter_map(|&id| match registry.entry(id) {
                Ok(entry) => Some(ResolvedNote {
                    id,
                    frequency_hz: entry.frequency_hz,
                    labels: entry.labels.clone(),
                }),
                Err(err) => {
                    warn!(%id, %err, "skipping note outside the registry");
                    None
                }
            })
            .collect();
        if notes.is_empty() {
            return Err(SynthError::EmptySequence);
        }

        let mut cursor = PlaybackCursor {
            notes,
            index: 0,
            started_at: ctx.current_time(),
            interval: sequence.interval(),
            pending: None,
        };
        self.sound(ctx, &mut cursor)?;

        info!(
            notes = cursor.notes.len(),
            interval = cursor.interval,
            "sequence started"
        );
        self.cursor = Some(cursor);
        self.last_sequence = Some(sequence);
        self.state = PlayerState::Playing;
        Ok(())
    }

    /// Stop stepping. The sounding note decays on its own.
    pub fn cancel(&mut self, ctx: &mut AudioContext) -> Result<()> {
        if self.state != PlayerState::Playing {
            return Err(SynthError::InvalidTransition {
                op: "cancel",
                state: self.state,
            });
        }
        if let Some(timer) = self.cursor.as_mut().and_then(|c| c.pending.take()) {
            ctx.clear_timer(timer);
        }
        self.finish(PlayerState::Cancelled);
        Ok(())
    }

    /// Play the most recent sequence again from the top.
    pub fn replay(&mut self, ctx: &mut AudioContext, registry: &NoteRegistry) -> Result<()> {
        let sequence = match (&self.last_sequence, self.state) {
            (Some(sequence), PlayerState::Completed | PlayerState::Cancelled) => sequence.clone(),
            (_, state) => {
                return Err(SynthError::InvalidTransition {
                    op: "replay",
                    state,
                })
            }
        };
        self.start(ctx, registry, sequence)
    }

    /// Trigger the cursor's current note and arm the tick for the next one.
    fn sound(&mut self, ctx: &mut AudioContext, cursor: &mut PlaybackCursor) -> Result<()> {
        let at = cursor.trigger_time(cursor.index);
        let Some(note) = cursor.notes.get(cursor.index) else {
            return Ok(());
        };

        let voice = ctx.trigger(note.frequency_hz, at)?;
        cursor.pending = Some(ctx.set_timer(cursor.trigger_time(cursor.index + 1))?);

        self.events.push(DisplayEvent::NoteStarted {
            note: note.id,
            labels: note.labels.clone(),
            source: NoteSource::Sequence,
            at,
        });
        debug!(index = cursor.index, note = %note.id, %voice, at, "sequence note");
        Ok(())
    }

    fn finish(&mut self, state: PlayerState) {
        self.cursor = None;
        self.state = state;
        self.events.push(DisplayEvent::NoteEnded {
            source: NoteSource::Sequence,
        });
        self.events.push(DisplayEvent::PlaybackFinished(state));
        info!(?state, "sequence finished");
    }
}

impl TimerHandler for SequencePlayer {
    fn on_timer(&mut self, ctx: &mut AudioContext, timer: TimerId) {
        let Some(mut cursor) = self.cursor.take() else {
            return;
        };
        if cursor.pending != Some(timer) {
            self.cursor = Some(cursor);
            return;
        }

        cursor.pending = None;
        cursor.index += 1;
        if cursor.index >= cursor.notes.len() {
            self.finish(PlayerState::Completed);
            return;
        }

        match self.sound(ctx, &mut cursor) {
            Ok(()) => self.cursor = Some(cursor),
            Err(err) => {
                warn!(%err, "sequence step failed, cancelling");
                self.finish(PlayerState::Cancelled);
            }
        }
    }
}
