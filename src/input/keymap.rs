use crate::notes::{NoteId, PitchClass};

/*
Computer Keyboard Piano
=======================

Three rows of the keyboard, one octave each. Within a row the lower keys
are the naturals and the number / upper-row keys between them are the
sharps, laid out like piano keys:

  upper  (octave 5)    9   0       =
                     i   o   p   [   ]   \
                     C   D   E   F   G   A

  middle (octave 4)    2   3       5   6   7
                     q   w   e   r   t   y   u
                     C   D   E   F   G   A   B

  lower  (octave 3)    s   d       g   h   j
                     z   x   c   v   b   n   m
                     C   D   E   F   G   A   B

The upper row runs out of keys after A5; G#5, A#5 and B5 have no key.
*/

const fn n(pitch: PitchClass, octave: u8) -> NoteId {
    NoteId::new(pitch, octave)
}

use PitchClass::*;

/// Every mapped key with its note, lower band first.
pub const KEY_TABLE: [(char, NoteId); 33] = [
    // lower band
    ('z', n(C, 3)),
    ('s', n(Cs, 3)),
    ('x', n(D, 3)),
    ('d', n(Ds, 3)),
    ('c', n(E, 3)),
    ('v', n(F, 3)),
    ('g', n(Fs, 3)),
    ('b', n(G, 3)),
    ('h', n(Gs, 3)),
    ('n', n(A, 3)),
    ('j', n(As, 3)),
    ('m', n(B, 3)),
    // middle band
    ('q', n(C, 4)),
    ('2', n(Cs, 4)),
    ('w', n(D, 4)),
    ('3', n(Ds, 4)),
    ('e', n(E, 4)),
    ('r', n(F, 4)),
    ('5', n(Fs, 4)),
    ('t', n(G, 4)),
    ('6', n(Gs, 4)),
    ('y', n(A, 4)),
    ('7', n(As, 4)),
    ('u', n(B, 4)),
    // upper band
    ('i', n(C, 5)),
    ('9', n(Cs, 5)),
    ('o', n(D, 5)),
    ('0', n(Ds, 5)),
    ('p', n(E, 5)),
    ('[', n(F, 5)),
    ('=', n(Fs, 5)),
    (']', n(G, 5)),
    ('\\', n(A, 5)),
];

/// Note bound to a physical key, case-insensitive.
pub fn note_for_key(key: char) -> Option<NoteId> {
    let key = key.to_ascii_lowercase();
    KEY_TABLE
        .iter()
        .find(|(k, _)| *k == key)
        .map(|&(_, note)| note)
}

/// Key bound to a note, if it has one.
pub fn key_for_note(note: NoteId) -> Option<char> {
    KEY_TABLE
        .iter()
        .find(|(_, n)| *n == note)
        .map(|&(k, _)| k)
}
