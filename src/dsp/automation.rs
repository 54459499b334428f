/*
Parameter Automation
====================

A parameter (gain, cutoff, ...) does not have to be a constant. Automation
describes how its value moves over time as a list of breakpoints on the
audio timeline. The whole list is written up front - usually the moment a
note is triggered - and the audio thread only ever *reads* it.

Vocabulary
----------

  breakpoint   A (time, value) pair plus the kind of curve that leads INTO it.

  set          Jump to the value at the given time and hold it.

  linear ramp  Straight line from the previous breakpoint to this one.

  exp. ramp    Exponential curve from the previous breakpoint to this one.
               Sounds like a natural decay because loudness is perceived
               logarithmically. Both ends must be strictly positive, so a
               "ramp to silence" targets a small floor such as 0.001.

Evaluating value(t)
-------------------

    prev = last breakpoint with time <= t   (or the initial value at t = 0)
    next = first breakpoint with time > t

    next is linear:       prev.v + (next.v - prev.v) * frac
    next is exponential:  prev.v * (next.v / prev.v) ^ frac
    otherwise:            prev.v

    where frac = (t - prev.t) / (next.t - prev.t)

At a breakpoint's own time the breakpoint's value is returned exactly, which
is what tests assert against.

Example (a note triggered at t0 = 2.0):

    value
     0.5 ┤     ╱╲
     0.4 ┤    ╱  ╲________
         │   ╱            ╲
     0.0 ┼──╱──────────────╲__──→ t
         2.0 2.1  2.4   3.0  3.4

Ordering
--------

Breakpoints are kept sorted by time. Inserting two breakpoints at the same
time keeps them in insertion order, so the later one wins from then on.
*/

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Smallest target an exponential ramp may aim for.
pub const MIN_EXPONENTIAL_VALUE: f32 = 1.0e-6;

/// Curve leading into a breakpoint.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ramp {
    Set,
    Linear,
    Exponential,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Breakpoint {
    pub ramp: Ramp,
    /// Absolute timeline position in seconds.
    pub time: f64,
    pub value: f32,
}

/// Breakpoint list for one parameter.
#[derive(Debug, Clone)]
pub struct Automation {
    initial: f32,
    breakpoints: Vec<Breakpoint>,
}

impl Automation {
    pub fn new(initial: f32) -> Self {
        Self {
            initial,
            breakpoints: Vec::with_capacity(8),
        }
    }

    pub fn set_value_at(&mut self, value: f32, time: f64) -> &mut Self {
        self.insert(Breakpoint {
            ramp: Ramp::Set,
            time,
            value,
        })
    }

    pub fn linear_ramp_to(&mut self, value: f32, end_time: f64) -> &mut Self {
        self.insert(Breakpoint {
            ramp: Ramp::Linear,
            time: end_time,
            value,
        })
    }

    /// Non-positive targets are raised to [`MIN_EXPONENTIAL_VALUE`].
    pub fn exponential_ramp_to(&mut self, value: f32, end_time: f64) -> &mut Self {
        self.insert(Breakpoint {
            ramp: Ramp::Exponential,
            time: end_time,
            value: value.max(MIN_EXPONENTIAL_VALUE),
        })
    }

    fn insert(&mut self, breakpoint: Breakpoint) -> &mut Self {
        let at = self
            .breakpoints
            .partition_point(|existing| existing.time <= breakpoint.time);
        self.breakpoints.insert(at, breakpoint);
        self
    }

    /// Scheduled breakpoints in time order.
    pub fn breakpoints(&self) -> &[Breakpoint] {
        &self.breakpoints
    }

    pub fn initial(&self) -> f32 {
        self.initial
    }

    /// Time of the last breakpoint, after which the value stays constant.
    pub fn end_time(&self) -> Option<f64> {
        self.breakpoints.last().map(|b| b.time)
    }

    pub fn clear(&mut self) {
        self.breakpoints.clear();
    }

    pub fn value_at(&self, time: f64) -> f32 {
        let next_index = self.breakpoints.partition_point(|b| b.time <= time);

        let (start_time, start_value) = match next_index.checked_sub(1) {
            Some(prev) => (self.breakpoints[prev].time, self.breakpoints[prev].value),
            None => (0.0, self.initial),
        };

        let Some(next) = self.breakpoints.get(next_index) else {
            return start_value;
        };

        let span = next.time - start_time;
        if span <= 0.0 {
            return start_value;
        }
        let frac = ((time - start_time) / span).clamp(0.0, 1.0);

        match next.ramp {
            Ramp::Set => start_value,
            Ramp::Linear => start_value + (next.value - start_value) * frac as f32,
            Ramp::Exponential => {
                if start_value <= 0.0 || next.value <= 0.0 {
                    start_value
                } else {
                    let ratio = (next.value / start_value) as f64;
                    (start_value as f64 * ratio.powf(frac)) as f32
                }
            }
        }
    }

    /// Fill `out` with consecutive values starting at `start_time`.
    pub fn render(&self, out: &mut [f32], start_time: f64, sample_period: f64) {
        for (i, sample) in out.iter_mut().enumerate() {
            *sample = self.value_at(start_time + i as f64 * sample_period);
        }
    }
}
