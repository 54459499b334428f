use rtrb::{Consumer, Producer, RingBuffer};
use tracing::{debug, info, trace, warn};

use crate::{
    config::EngineConfig,
    engine::scheduler::{CueId, Timeline},
    error::{Result, SynthError},
    graph::node::RenderCtx,
    synth::{Voice, VoiceId, VoicePool},
    MAX_BLOCK_SIZE,
};

/*
Audio Context
=============

The single clock every sound in the process is measured against. It owns:

  - a frame counter (the "now" of the timeline),
  - the timeline of pending cues,
  - the pool of live voices,
  - an optional tap that copies rendered output to a monitor.

Rendering walks the output buffer cue by cue:

    out:  |-----------------|---------|------------------------|
          now             cue A     cue B                    end
           render          fire A    render    fire B   render

Each stretch between cues is rendered with the voice set that is valid for
it, so a voice starts or stops on the exact frame it was scheduled for and
a timer callback runs exactly at its frame. Anything a timer schedules for
"now" takes effect for the very next sample.

After the last sample, cues due at the final frame are fired too, so after
`render` returns every cue up to and including the current frame has been
handled.

Time and Frames
---------------

    frame = round(seconds × sample_rate)
    seconds = frame / sample_rate

At 48 kHz the 1.5 s note length is exactly 72000 frames, so triggers on a
fixed interval never drift.
*/

/// Handle for a timer set with [`AudioContext::set_timer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(CueId);

impl TimerId {
    pub fn frame(&self) -> u64 {
        self.0.frame()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cue {
    Start(VoiceId),
    Stop(VoiceId),
    Timer,
}

impl Cue {
    fn voice(&self) -> Option<VoiceId> {
        match *self {
            Cue::Start(id) | Cue::Stop(id) => Some(id),
            Cue::Timer => None,
        }
    }
}

/// Receives timer cues while the context renders.
pub trait TimerHandler {
    fn on_timer(&mut self, ctx: &mut AudioContext, timer: TimerId);
}

/// Ignores every timer.
impl TimerHandler for () {
    fn on_timer(&mut self, _ctx: &mut AudioContext, _timer: TimerId) {}
}

/// Records fired timers in order.
impl TimerHandler for Vec<TimerId> {
    fn on_timer(&mut self, _ctx: &mut AudioContext, timer: TimerId) {
        self.push(timer);
    }
}

pub struct AudioContext {
    config: EngineConfig,
    frame: u64,
    timeline: Timeline<Cue>,
    pool: VoicePool,
    tap: Option<Producer<f32>>,
    dropped_samples: u64,
    closed: bool,
}

impl AudioContext {
    pub fn new(config: EngineConfig) -> Self {
        debug!(
            sample_rate = config.sample_rate,
            max_voices = config.max_voices,
            "audio context created"
        );
        Self {
            pool: VoicePool::new(config.max_voices),
            config,
            frame: 0,
            timeline: Timeline::new(),
            tap: None,
            dropped_samples: 0,
            closed: false,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn sample_rate(&self) -> f32 {
        self.config.sample_rate
    }

    pub fn current_frame(&self) -> u64 {
        self.frame
    }

    pub fn current_time(&self) -> f64 {
        self.time_at(self.frame)
    }

    pub fn frame_at(&self, seconds: f64) -> u64 {
        (seconds * self.config.sample_rate as f64).round().max(0.0) as u64
    }

    pub fn time_at(&self, frame: u64) -> f64 {
        frame as f64 / self.config.sample_rate as f64
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Start a voice at `at` seconds (now, if `at` has already passed).
    ///
    /// The whole gain envelope and the automatic stop are scheduled here.
    pub fn trigger(&mut self, frequency_hz: f32, at: f64) -> Result<VoiceId> {
        if self.closed {
            return Err(SynthError::ContextClosed);
        }

        let now = self.current_time();
        let (start_time, start_frame) = if at <= now {
            (now, self.frame)
        } else {
            (at, self.frame_at(at).max(self.frame))
        };

        let id = self.pool.next_id();
        let mut voice = Voice::new(
            id,
            frequency_hz,
            start_time,
            start_frame,
            &self.config.voice,
        )?;
        let stop_frame = self.frame_at(voice.stop_time());

        if start_frame <= self.frame {
            voice.begin(&self.render_ctx());
        } else {
            self.timeline.schedule(start_frame, Cue::Start(id));
        }
        self.timeline.schedule(stop_frame, Cue::Stop(id));

        if let Some(mut evicted) = self.pool.insert(voice) {
            let evicted_id = evicted.id();
            evicted.teardown();
            self.drop_cues_for(evicted_id);
        }

        debug!(voice = %id, frequency_hz, start_time, "voice triggered");
        Ok(id)
    }

    /// Stop a voice now. Returns `false` if it had already ended.
    pub fn stop(&mut self, id: VoiceId) -> bool {
        let now = self.current_time();
        self.stop_at(id, now)
    }

    /// Stop a voice at `at` seconds, or now if `at` has passed.
    ///
    /// Returns `false` if the voice had already ended.
    pub fn stop_at(&mut self, id: VoiceId, at: f64) -> bool {
        if self.pool.get(id).is_none() {
            trace!(voice = %id, "stop ignored, voice already ended");
            return false;
        }

        let frame = self.frame_at(at);
        if frame <= self.frame {
            self.end_voice(id, "forced");
        } else {
            self.timeline.schedule(frame, Cue::Stop(id));
            debug!(voice = %id, at, "early stop scheduled");
        }
        true
    }

    fn end_voice(&mut self, id: VoiceId, reason: &'static str) {
        if let Some(mut voice) = self.pool.remove(id) {
            voice.teardown();
            debug!(voice = %id, reason, "voice stopped");
        }
        self.drop_cues_for(id);
    }

    fn drop_cues_for(&mut self, id: VoiceId) {
        self.timeline.retain(|_, cue| cue.voice() != Some(id));
    }

    pub fn voice(&self, id: VoiceId) -> Option<&Voice> {
        self.pool.get(id)
    }

    pub fn voices(&self) -> impl Iterator<Item = &Voice> {
        self.pool.iter()
    }

    pub fn live_voices(&self) -> usize {
        self.pool.len()
    }

    /// Schedule a timer cue; it is delivered to the [`TimerHandler`] passed
    /// to [`render_with`](Self::render_with).
    pub fn set_timer(&mut self, at: f64) -> Result<TimerId> {
        if self.closed {
            return Err(SynthError::ContextClosed);
        }
        let frame = self.frame_at(at).max(self.frame);
        Ok(TimerId(self.timeline.schedule(frame, Cue::Timer)))
    }

    /// Remove a timer that has not fired. Returns whether it was pending.
    pub fn clear_timer(&mut self, timer: TimerId) -> bool {
        self.timeline.cancel(timer.0).is_some()
    }

    pub fn pending_cues(&self) -> usize {
        self.timeline.len()
    }

    /// Route a copy of all rendered output into a new ring buffer.
    ///
    /// Replaces any previous tap. Samples that do not fit are dropped.
    pub fn attach_tap(&mut self, capacity: usize) -> Consumer<f32> {
        let (producer, consumer) = RingBuffer::new(capacity.max(1));
        if self.tap.replace(producer).is_some() {
            debug!("monitor tap replaced");
        }
        consumer
    }

    pub fn detach_tap(&mut self) {
        if self.tap.take().is_some() {
            debug!("monitor tap detached");
        }
    }

    pub fn has_tap(&self) -> bool {
        self.tap.is_some()
    }

    /// Samples the tap could not take because the monitor fell behind.
    pub fn dropped_samples(&self) -> u64 {
        self.dropped_samples
    }

    /// Release every voice, cue and the tap. Later triggers fail.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        let released = self.pool.clear();
        self.timeline.clear();
        self.tap = None;
        self.closed = true;
        info!(released, "audio context closed");
    }

    fn render_ctx(&self) -> RenderCtx {
        RenderCtx::from_freq(self.config.sample_rate, 0.0).at_time(self.current_time())
    }

    /// Render without timers.
    pub fn render(&mut self, out: &mut [f32]) {
        self.render_with(out, &mut ());
    }

    /// Render `out`, firing cues on their exact frames.
    pub fn render_with<H: TimerHandler + ?Sized>(&mut self, out: &mut [f32], handler: &mut H) {
        if self.closed {
            out.fill(0.0);
            return;
        }

        let mut offset = 0;
        loop {
            self.fire_due(handler);
            if offset >= out.len() || self.closed {
                break;
            }

            let remaining = out.len() - offset;
            let until_cue = self
                .timeline
                .next_frame()
                .map(|frame| frame.saturating_sub(self.frame) as usize)
                .unwrap_or(remaining);
            let len = remaining.min(until_cue).min(MAX_BLOCK_SIZE).max(1);

            let block = &mut out[offset..offset + len];
            let ctx = self.render_ctx();
            self.pool.render(block, &ctx);
            self.feed_tap(offset, out, len);

            self.frame += len as u64;
            offset += len;
        }

        if offset < out.len() {
            out[offset..].fill(0.0);
        }
    }

    /// Render and discard output until the clock reaches `seconds`.
    pub fn advance_to<H: TimerHandler + ?Sized>(&mut self, seconds: f64, handler: &mut H) {
        let target = self.frame_at(seconds);
        let mut scratch = [0.0f32; MAX_BLOCK_SIZE];
        while self.frame < target && !self.closed {
            let len = ((target - self.frame) as usize).min(MAX_BLOCK_SIZE);
            self.render_with(&mut scratch[..len], handler);
        }
    }

    fn fire_due<H: TimerHandler + ?Sized>(&mut self, handler: &mut H) {
        while let Some((id, cue)) = self.timeline.pop_due(self.frame) {
            match cue {
                Cue::Start(voice) => {
                    let ctx = self.render_ctx();
                    if let Some(v) = self.pool.get_mut(voice) {
                        v.begin(&ctx);
                        trace!(voice = %voice, frame = self.frame, "voice started");
                    }
                }
                Cue::Stop(voice) => self.end_voice(voice, "scheduled"),
                Cue::Timer => handler.on_timer(self, TimerId(id)),
            }
        }
    }

    fn feed_tap(&mut self, offset: usize, out: &[f32], len: usize) {
        let Some(tap) = self.tap.as_mut() else {
            return;
        };
        if tap.is_abandoned() {
            self.tap = None;
            debug!("monitor tap abandoned, dropping it");
            return;
        }

        let block = &out[offset..offset + len];
        let free = tap.slots().min(block.len());
        if let Ok(chunk) = tap.write_chunk_uninit(free) {
            chunk.fill_from_iter(block.iter().copied());
        }
        let dropped = (block.len() - free) as u64;
        if dropped > 0 {
            if self.dropped_samples == 0 {
                warn!("monitor tap full, dropping samples");
            }
            self.dropped_samples += dropped;
        }
    }
}

impl Drop for AudioContext {
    fn drop(&mut self) {
        self.close();
    }
}
