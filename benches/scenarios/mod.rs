//! Scenario benchmarks: a whole voice, and the context as the audio
//! callback drives it.

mod context;
mod voice;

pub use context::bench_context;
pub use voice::bench_voice;
