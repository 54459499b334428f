//! Parameter modulation primitives.

/*
Parameter Modulation
====================

Modulation uses one signal (the modulator) to keep moving a parameter of
another node. Here it is how vibrato is made: a slow sine wobbles the
oscillator's frequency a few hertz either side of the note.

Vocabulary
----------

  modulator     The control signal, usually an LFO swinging in [-1.0, +1.0].

  target        The parameter being moved (oscillator frequency).

  base value    Where the parameter sits when the modulator reads 0.

  depth         How far the parameter travels at full modulator swing.

The Math
--------

    modulated_value = base_value + (modulator_output × depth)

Vibrato on A4 with ±5 Hz depth:

    LFO = -1.0  →  440 + (-1 × 5) = 435 Hz
    LFO =  0.0  →  440 + ( 0 × 5) = 440 Hz
    LFO = +1.0  →  440 + (+1 × 5) = 445 Hz

At 5.5 Hz the pitch completes that swing about five and a half times a
second, close to the natural wavering of a held sung note.


Control Rate
------------

The target is updated once per control block rather than every sample:
the modulator is rendered for the block, averaged, and the average becomes
the parameter value for that stretch of audio.

    control block   64 samples at 48 kHz = 1.33 ms
    LFO period      1 / 5.5 Hz           = 182 ms
    updates/cycle   ~136

That is far finer than the ear can resolve as steps, while the oscillator's
inner loop stays free of per-sample parameter math.

The target clamps whatever it is given. An oscillator keeps its frequency
inside [20, 20000] Hz no matter how deep the modulation is set.
*/

/// Number of samples rendered between two modulation updates.
pub const CONTROL_BLOCK: usize = 64;

/// Calculate the modulated parameter value.
#[inline]
pub fn apply_modulation(base_value: f32, modulator: f32, depth: f32) -> f32 {
    base_value + (modulator * depth)
}

/// Calculate the average of a modulator signal over a block.
#[inline]
pub fn block_average(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    samples.iter().sum::<f32>() / samples.len() as f32
}
