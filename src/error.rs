//! Error taxonomy shared by every layer of the crate.

use thiserror::Error;

use crate::sequencing::PlayerState;

/// Errors surfaced by the note registry, the audio context and the players.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SynthError {
    /// The note id is malformed or outside the supported range.
    /// Callers on the input path treat this as a silent no-op.
    #[error("unknown note `{0}`")]
    UnknownNote(String),

    /// A voice was asked to sound at a non-positive or non-finite pitch.
    #[error("invalid frequency {0} Hz: must be positive and finite")]
    InvalidFrequency(f32),

    /// No usable audio output device. Reported once, when opening output.
    #[error("no audio output device available: {0}")]
    DeviceUnavailable(String),

    /// The audio context has been closed and owns no resources anymore.
    #[error("audio context is closed")]
    ContextClosed,

    /// A sequence needs at least one note.
    #[error("sequence contains no playable notes")]
    EmptySequence,

    /// The sequence player was asked to do something its state forbids.
    #[error("cannot {op} while the player is {state:?}")]
    InvalidTransition { op: &'static str, state: PlayerState },

    /// The external note-generation service failed or answered garbage.
    #[error("note generation failed: {0}")]
    Generation(String),
}

pub type Result<T> = std::result::Result<T, SynthError>;
