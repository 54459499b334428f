//! Note identifiers and the registry that maps them to pitch and labels.
//!
//! The registry is a pure lookup table: every supported [`NoteId`] has exactly
//! one entry holding its fundamental frequency and the strings the display
//! layer renders (western name, Carnatic swara, sruthi reference).

mod registry;

pub use registry::{NoteEntry, NoteLabels, NoteRegistry, FIRST_OCTAVE, LAST_OCTAVE};

use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::SynthError;

/*
Pitch Classes and Octaves
=========================

A note is a pitch class plus an octave. The twelve pitch classes are the
chromatic positions inside one octave, C through B:

    index  western  swara   sruthi
      0    C        Sa      1 kattai
      1    C#       Ri1     1.5 kattai
      2    D        Ri2     2 kattai
      3    D#       Ga1     2.5 kattai
      4    E        Ga2     3 kattai
      5    F        Ma1     4 kattai
      6    F#       Ma2     4.5 kattai
      7    G        Pa      5 kattai
      8    G#       Dha1    5.5 kattai
      9    A        Dha2    6 kattai
     10    A#       Ni1     6.5 kattai
     11    B        Ni2     7 kattai

Ordering is (octave, pitch class), so B3 < C4. That ordering is also the
frequency ordering, which the registry relies on.

Only sharps are used in textual ids ("C#4"); flats are accepted when parsing
and normalised to the sharp spelling.
*/

/// One of the twelve chromatic positions inside an octave.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PitchClass {
    C,
    Cs,
    D,
    Ds,
    E,
    F,
    Fs,
    G,
    Gs,
    A,
    As,
    B,
}

impl PitchClass {
    pub const ALL: [PitchClass; 12] = [
        PitchClass::C,
        PitchClass::Cs,
        PitchClass::D,
        PitchClass::Ds,
        PitchClass::E,
        PitchClass::F,
        PitchClass::Fs,
        PitchClass::G,
        PitchClass::Gs,
        PitchClass::A,
        PitchClass::As,
        PitchClass::B,
    ];

    /// Semitone offset from C.
    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn western(self) -> &'static str {
        match self {
            PitchClass::C => "C",
            PitchClass::Cs => "C#",
            PitchClass::D => "D",
            PitchClass::Ds => "D#",
            PitchClass::E => "E",
            PitchClass::F => "F",
            PitchClass::Fs => "F#",
            PitchClass::G => "G",
            PitchClass::Gs => "G#",
            PitchClass::A => "A",
            PitchClass::As => "A#",
            PitchClass::B => "B",
        }
    }

    /// Carnatic swara name without octave marking.
    pub const fn swara(self) -> &'static str {
        match self {
            PitchClass::C => "Sa",
            PitchClass::Cs => "Ri₁",
            PitchClass::D => "Ri₂",
            PitchClass::Ds => "Ga₁",
            PitchClass::E => "Ga₂",
            PitchClass::F => "Ma₁",
            PitchClass::Fs => "Ma₂",
            PitchClass::G => "Pa",
            PitchClass::Gs => "Dha₁",
            PitchClass::A => "Dha₂",
            PitchClass::As => "Ni₁",
            PitchClass::B => "Ni₂",
        }
    }

    /// Sruthi (kattai) tuning reference when this pitch class is used as Sa.
    pub const fn sruthi(self) -> &'static str {
        match self {
            PitchClass::C => "1 kattai",
            PitchClass::Cs => "1.5 kattai",
            PitchClass::D => "2 kattai",
            PitchClass::Ds => "2.5 kattai",
            PitchClass::E => "3 kattai",
            PitchClass::F => "4 kattai",
            PitchClass::Fs => "4.5 kattai",
            PitchClass::G => "5 kattai",
            PitchClass::Gs => "5.5 kattai",
            PitchClass::A => "6 kattai",
            PitchClass::As => "6.5 kattai",
            PitchClass::B => "7 kattai",
        }
    }

    /// Whether the key sits on the raised (black) row of a piano.
    pub const fn is_accidental(self) -> bool {
        matches!(
            self,
            PitchClass::Cs | PitchClass::Ds | PitchClass::Fs | PitchClass::Gs | PitchClass::As
        )
    }

    fn parse(name: &str) -> Option<Self> {
        let pitch = match name {
            "C" => PitchClass::C,
            "C#" | "Db" => PitchClass::Cs,
            "D" => PitchClass::D,
            "D#" | "Eb" => PitchClass::Ds,
            "E" => PitchClass::E,
            "F" => PitchClass::F,
            "F#" | "Gb" => PitchClass::Fs,
            "G" => PitchClass::G,
            "G#" | "Ab" => PitchClass::Gs,
            "A" => PitchClass::A,
            "A#" | "Bb" => PitchClass::As,
            "B" => PitchClass::B,
            _ => return None,
        };
        Some(pitch)
    }
}

/// Opaque note token: pitch class plus octave.
///
/// Any octave can be named; whether the note is playable is decided by the
/// [`NoteRegistry`].
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NoteId {
    octave: u8,
    pitch: PitchClass,
}

impl NoteId {
    pub const fn new(pitch: PitchClass, octave: u8) -> Self {
        Self { octave, pitch }
    }

    pub const fn pitch(self) -> PitchClass {
        self.pitch
    }

    pub const fn octave(self) -> u8 {
        self.octave
    }
}

impl PartialOrd for NoteId {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for NoteId {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        (self.octave, self.pitch).cmp(&(other.octave, other.pitch))
    }
}

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.pitch.western(), self.octave)
    }
}

impl FromStr for NoteId {
    type Err = SynthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = s.trim();
        let split = token
            .find(|c: char| c.is_ascii_digit())
            .ok_or_else(|| SynthError::UnknownNote(s.to_string()))?;
        let (name, octave) = token.split_at(split);

        let pitch = PitchClass::parse(name).ok_or_else(|| SynthError::UnknownNote(s.to_string()))?;
        let octave = octave
            .parse::<u8>()
            .map_err(|_| SynthError::UnknownNote(s.to_string()))?;

        Ok(NoteId::new(pitch, octave))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_naturals_and_sharps() {
        assert_eq!("C4".parse::<NoteId>().unwrap(), NoteId::new(PitchClass::C, 4));
        assert_eq!("A#3".parse::<NoteId>().unwrap(), NoteId::new(PitchClass::As, 3));
        assert_eq!(" G5 ".parse::<NoteId>().unwrap(), NoteId::new(PitchClass::G, 5));
    }

    #[test]
    fn flats_normalise_to_sharps() {
        let note: NoteId = "Eb4".parse().unwrap();
        assert_eq!(note.to_string(), "D#4");
    }

    #[test]
    fn rejects_malformed_tokens() {
        for bad in ["", "H4", "C", "4", "C#x", "Sa4"] {
            assert!(
                matches!(bad.parse::<NoteId>(), Err(SynthError::UnknownNote(_))),
                "expected {bad:?} to be rejected"
            );
        }
    }

    #[test]
    fn ordering_is_octave_then_pitch() {
        let b3 = NoteId::new(PitchClass::B, 3);
        let c4 = NoteId::new(PitchClass::C, 4);
        let cs4 = NoteId::new(PitchClass::Cs, 4);
        assert!(b3 < c4);
        assert!(c4 < cs4);
    }

    #[test]
    fn display_round_trips() {
        for pitch in PitchClass::ALL {
            let note = NoteId::new(pitch, 4);
            assert_eq!(note.to_string().parse::<NoteId>().unwrap(), note);
        }
    }
}
