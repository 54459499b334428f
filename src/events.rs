//! Notifications for the display layer.

#[cfg(feature = "serde")]
use serde::Serialize;

use crate::{
    notes::{NoteId, NoteLabels},
    sequencing::PlayerState,
};

/// Which driver produced an event.
#[cfg_attr(feature = "serde", derive(Serialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteSource {
    Keyboard,
    Sequence,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DisplayEvent {
    NoteStarted {
        note: NoteId,
        labels: NoteLabels,
        source: NoteSource,
        /// Timeline position of the trigger, in seconds.
        at: f64,
    },
    NoteEnded {
        source: NoteSource,
    },
    PlaybackFinished(PlayerState),
}

impl DisplayEvent {
    pub fn source(&self) -> Option<NoteSource> {
        match self {
            DisplayEvent::NoteStarted { source, .. } | DisplayEvent::NoteEnded { source } => {
                Some(*source)
            }
            DisplayEvent::PlaybackFinished(_) => Some(NoteSource::Sequence),
        }
    }
}
