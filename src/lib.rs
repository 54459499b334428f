pub mod config;
pub mod dsp;
pub mod engine; // Audio context, timeline and device output
pub mod error;
pub mod events;
pub mod graph; // Composable audio graph nodes
pub mod input; // Computer-keyboard piano
pub mod instrument;
pub mod io;
pub mod monitor;
pub mod notes; // Note ids, frequencies and labels
pub mod sequencing; // Fixed-interval sequence playback
pub mod synth; // Vocal voices and the voice pool

pub use config::{EngineConfig, VoiceParams};
pub use engine::{AudioContext, OutputDevice, RenderSource};
pub use error::{Result, SynthError};
pub use events::{DisplayEvent, NoteSource};
pub use instrument::Instrument;
pub use monitor::{LevelMonitor, Levels};
pub use notes::{NoteId, NoteRegistry, PitchClass};
pub use sequencing::{PlayerState, Sequence, SequencePlayer};

pub const MAX_BLOCK_SIZE: usize = 2048;
