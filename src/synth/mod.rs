// Purpose: per-note voices and the bounded pool that mixes them
// This layer sits above graph nodes; the audio context drives it

pub mod pool;
pub mod voice;

pub use pool::VoicePool;
pub use voice::{vocal_chain, Voice, VoiceChain, VoiceId, VoiceState};
