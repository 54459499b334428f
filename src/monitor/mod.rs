//! Passive level monitor on the rendered output.

use rtrb::Consumer;
use tracing::debug;

use crate::engine::AudioContext;

/*
Level Monitor
=============

The monitor never touches the audio path. The context copies every rendered
block into a lock-free ring buffer (the tap); the monitor drains that ring
from the UI thread whenever it refreshes and keeps the most recent
`ANALYSIS_WINDOW` samples:

    audio thread                     UI thread
    ────────────                     ─────────
    render block ──push──→ [ ring ] ──drain──→ window (2048 samples)
                   (drops if full)               │
                                                 ├─→ waveform / spectrum
                                                 └─→ peak, RMS

If the UI falls behind, the ring fills and the context drops the overflow
instead of waiting. Dropping the monitor abandons the ring; the context
notices on its next block and lets go of its end.
*/

/// Number of samples analysed per refresh (also the FFT size).
pub const ANALYSIS_WINDOW: usize = 2048;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Levels {
    pub peak: f32,
    pub rms: f32,
}

pub struct LevelMonitor {
    tap: Option<Consumer<f32>>,
    window: Vec<f32>,
}

impl LevelMonitor {
    pub fn new() -> Self {
        Self {
            tap: None,
            window: vec![0.0; ANALYSIS_WINDOW],
        }
    }

    /// Tap `ctx`'s output, replacing any previous source.
    pub fn attach(&mut self, ctx: &mut AudioContext) {
        let capacity = ctx.config().tap_capacity.max(ANALYSIS_WINDOW);
        self.tap = Some(ctx.attach_tap(capacity));
        self.window.fill(0.0);
        debug!(capacity, "level monitor attached");
    }

    pub fn detach(&mut self, ctx: &mut AudioContext) {
        ctx.detach_tap();
        self.tap = None;
        self.window.fill(0.0);
    }

    pub fn is_attached(&self) -> bool {
        self.tap.is_some()
    }

    /// Pull everything the tap has buffered into the window.
    /// Returns how many new samples arrived.
    pub fn refresh(&mut self) -> usize {
        let Some(tap) = self.tap.as_mut() else {
            return 0;
        };

        let available = tap.slots();
        if available == 0 {
            return 0;
        }
        let Ok(chunk) = tap.read_chunk(available) else {
            return 0;
        };

        let (first, second) = chunk.as_slices();
        for part in [first, second] {
            push_window(&mut self.window, part);
        }
        chunk.commit_all();
        available
    }

    /// Refresh, then return the latest window. `None` without a source.
    pub fn sample(&mut self) -> Option<&[f32]> {
        self.tap.as_ref()?;
        self.refresh();
        Some(&self.window)
    }

    /// The window as of the last refresh.
    pub fn window(&self) -> Option<&[f32]> {
        self.tap.as_ref().map(|_| self.window.as_slice())
    }

    /// Peak and RMS of the current window. `None` without a source.
    pub fn levels(&self) -> Option<Levels> {
        self.tap.as_ref()?;
        Some(measure(&self.window))
    }
}

impl Default for LevelMonitor {
    fn default() -> Self {
        Self::new()
    }
}

fn push_window(window: &mut [f32], incoming: &[f32]) {
    let len = window.len();
    if incoming.len() >= len {
        window.copy_from_slice(&incoming[incoming.len() - len..]);
        return;
    }
    window.copy_within(incoming.len().., 0);
    window[len - incoming.len()..].copy_from_slice(incoming);
}

fn measure(samples: &[f32]) -> Levels {
    if samples.is_empty() {
        return Levels { peak: 0.0, rms: 0.0 };
    }
    let peak = samples.iter().fold(0.0f32, |acc, &s| acc.max(s.abs()));
    let mean_square = samples.iter().map(|s| s * s).sum::<f32>() / samples.len() as f32;
    Levels {
        peak,
        rms: mean_square.sqrt(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;

    #[test]
    fn without_source_yields_nothing() {
        let mut monitor = LevelMonitor::new();
        assert!(monitor.sample().is_none());
        assert!(monitor.levels().is_none());
        assert_eq!(monitor.refresh(), 0);
    }

    #[test]
    fn window_tracks_latest_output() {
        let mut ctx = AudioContext::new(EngineConfig::default());
        let mut monitor = LevelMonitor::new();
        monitor.attach(&mut ctx);

        ctx.trigger(440.0, 0.0).unwrap();
        let mut out = vec![0.0f32; 4096];
        ctx.render(&mut out);

        let window = monitor.sample().unwrap().to_vec();
        assert_eq!(window.len(), ANALYSIS_WINDOW);
        assert_eq!(window.as_slice(), &out[4096 - ANALYSIS_WINDOW..]);

        let levels = monitor.levels().unwrap();
        assert!(levels.peak > 0.0);
        assert!(levels.rms > 0.0 && levels.rms <= levels.peak);
    }

    #[test]
    fn short_refresh_slides_window() {
        let mut window = vec![0.0f32; 4];
        push_window(&mut window, &[1.0, 2.0]);
        assert_eq!(window, vec![0.0, 0.0, 1.0, 2.0]);
        push_window(&mut window, &[3.0]);
        assert_eq!(window, vec![0.0, 1.0, 2.0, 3.0]);
        push_window(&mut window, &[4.0, 5.0, 6.0, 7.0, 8.0]);
        assert_eq!(window, vec![5.0, 6.0, 7.0, 8.0]);
    }

    #[test]
    fn detach_releases_tap() {
        let mut ctx = AudioContext::new(EngineConfig::default());
        let mut monitor = LevelMonitor::new();
        monitor.attach(&mut ctx);
        assert!(ctx.has_tap());

        monitor.detach(&mut ctx);
        assert!(!ctx.has_tap());
        assert!(monitor.sample().is_none());
    }

    #[test]
    fn dropped_monitor_is_cleaned_up() {
        let mut ctx = AudioContext::new(EngineConfig::default());
        let mut monitor = LevelMonitor::new();
        monitor.attach(&mut ctx);
        drop(monitor);

        let mut out = vec![0.0f32; 64];
        ctx.render(&mut out);
        assert!(!ctx.has_tap());
    }

    #[test]
    fn reattach_replaces_source() {
        let mut ctx = AudioContext::new(EngineConfig::default());
        let mut first = LevelMonitor::new();
        let mut second = LevelMonitor::new();
        first.attach(&mut ctx);
        second.attach(&mut ctx);

        ctx.trigger(440.0, 0.0).unwrap();
        let mut out = vec![0.0f32; 512];
        ctx.render(&mut out);

        assert_eq!(second.refresh(), 512);
        assert_eq!(first.refresh(), 0);
    }
}
