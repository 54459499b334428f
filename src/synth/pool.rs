use tracing::debug;

use crate::{
    graph::node::RenderCtx,
    synth::voice::{Voice, VoiceId, VoiceState},
    MAX_BLOCK_SIZE,
};

/// Bounded set of live voices.
///
/// A new note may start while earlier notes are still in their release
/// tail. The pool lets those tails ring out, up to `max_voices` in total;
/// past that, the voice that started earliest is evicted.
pub struct VoicePool {
    voices: Vec<Voice>,
    max_voices: usize,
    next_id: u64,
    temp_buffer: Vec<f32>,
}

impl VoicePool {
    pub fn new(max_voices: usize) -> Self {
        let max_voices = max_voices.max(1);
        Self {
            voices: Vec::with_capacity(max_voices + 1),
            max_voices,
            next_id: 1,
            temp_buffer: vec![0.0; MAX_BLOCK_SIZE],
        }
    }

    /// Reserve an id for the next voice.
    pub fn next_id(&mut self) -> VoiceId {
        let id = VoiceId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Add a voice. When the pool is full the oldest voice is removed and
    /// handed back so the caller can tear it down and drop its cues.
    pub fn insert(&mut self, voice: Voice) -> Option<Voice> {
        let evicted = if self.voices.len() >= self.max_voices {
            self.oldest_index().map(|idx| self.voices.remove(idx))
        } else {
            None
        };

        if let Some(old) = &evicted {
            debug!(evicted = %old.id(), incoming = %voice.id(), "voice pool full, stealing oldest");
        }

        self.voices.push(voice);
        evicted
    }

    fn oldest_index(&self) -> Option<usize> {
        self.voices
            .iter()
            .enumerate()
            .min_by_key(|(_, v)| (v.start_frame(), v.id()))
            .map(|(idx, _)| idx)
    }

    pub fn get(&self, id: VoiceId) -> Option<&Voice> {
        self.voices.iter().find(|v| v.id() == id)
    }

    pub fn get_mut(&mut self, id: VoiceId) -> Option<&mut Voice> {
        self.voices.iter_mut().find(|v| v.id() == id)
    }

    pub fn remove(&mut self, id: VoiceId) -> Option<Voice> {
        let idx = self.voices.iter().position(|v| v.id() == id)?;
        Some(self.voices.remove(idx))
    }

    /// Mix every sounding voice into `out`, overwriting it.
    pub fn render(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        out.fill(0.0);

        let mut offset = 0;
        for chunk in out.chunks_mut(MAX_BLOCK_SIZE) {
            let chunk_ctx = ctx.advanced(offset);
            for voice in &mut self.voices {
                if voice.state() != VoiceState::Sounding {
                    continue;
                }
                let temp = &mut self.temp_buffer[..chunk.len()];
                voice.render(temp, &chunk_ctx);

                for (o, v) in chunk.iter_mut().zip(temp.iter()) {
                    *o += v;
                }
            }
            offset += chunk.len();
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Voice> {
        self.voices.iter()
    }

    pub fn len(&self) -> usize {
        self.voices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.voices.is_empty()
    }

    pub fn max_voices(&self) -> usize {
        self.max_voices
    }

    /// Tear down and remove every voice. Returns how many were live.
    pub fn clear(&mut self) -> usize {
        self.voices
            .drain(..)
            .map(|mut v| v.teardown())
            .filter(|&was_live| was_live)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::VoiceParams;

    fn add(pool: &mut VoicePool, start_frame: u64) -> (VoiceId, Option<Voice>) {
        let id = pool.next_id();
        let voice = Voice::new(id, 440.0, 0.0, start_frame, &VoiceParams::default()).unwrap();
        (id, pool.insert(voice))
    }

    #[test]
    fn never_exceeds_bound() {
        let mut pool = VoicePool::new(3);
        for frame in 0..10 {
            add(&mut pool, frame * 100);
            assert!(pool.len() <= 3);
        }
        assert_eq!(pool.len(), 3);
    }

    #[test]
    fn evicts_the_oldest() {
        let mut pool = VoicePool::new(2);
        let (first, _) = add(&mut pool, 0);
        let (second, _) = add(&mut pool, 10);
        let (third, evicted) = add(&mut pool, 20);

        assert_eq!(evicted.map(|v| v.id()), Some(first));
        assert!(pool.get(second).is_some());
        assert!(pool.get(third).is_some());
    }

    #[test]
    fn ids_are_unique() {
        let mut pool = VoicePool::new(1);
        let a = pool.next_id();
        let b = pool.next_id();
        assert_ne!(a, b);
    }

    #[test]
    fn only_sounding_voices_render() {
        let mut pool = VoicePool::new(3);
        let (pending, _) = add(&mut pool, 0);
        let ctx = RenderCtx::from_freq(48_000.0, 0.0).at_time(0.2);

        let mut out = vec![1.0f32; 256];
        pool.render(&mut out, &ctx);
        assert!(out.iter().all(|&s| s == 0.0));

        pool.get_mut(pending).unwrap().begin(&ctx);
        pool.render(&mut out, &ctx);
        assert!(out.iter().any(|&s| s != 0.0));
    }

    #[test]
    fn clear_tears_everything_down() {
        let mut pool = VoicePool::new(3);
        add(&mut pool, 0);
        add(&mut pool, 1);
        assert_eq!(pool.clear(), 2);
        assert!(pool.is_empty());
    }
}
