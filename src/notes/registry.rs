use std::sync::OnceLock;

use crate::error::{Result, SynthError};

use super::{NoteId, PitchClass};

pub const FIRST_OCTAVE: u8 = 3;
pub const LAST_OCTAVE: u8 = 5;

const OCTAVES: usize = (LAST_OCTAVE - FIRST_OCTAVE + 1) as usize;

/// Equal-tempered fundamentals (A4 = 440 Hz), rounded to 0.01 Hz, one row per
/// supported octave.
const FREQUENCY_TABLE: [[f32; 12]; OCTAVES] = [
    [
        130.81, 138.59, 146.83, 155.56, 164.81, 174.61, 185.00, 196.00, 207.65, 220.00, 233.08,
        246.94,
    ],
    [
        261.63, 277.18, 293.66, 311.13, 329.63, 349.23, 369.99, 392.00, 415.30, 440.00, 466.16,
        493.88,
    ],
    [
        523.25, 554.37, 587.33, 622.25, 659.25, 698.46, 739.99, 783.99, 830.61, 880.00, 932.33,
        987.77,
    ],
];

/// Human-readable notations for one note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteLabels {
    /// Scientific pitch name, e.g. `C#4`.
    pub western: String,
    /// Carnatic swara with subscript octave, e.g. `Ri₁₄`.
    pub swara: String,
    /// Sruthi (kattai) tuning reference, e.g. `1.5 kattai`.
    pub sruthi: &'static str,
}

#[derive(Debug, Clone)]
pub struct NoteEntry {
    pub id: NoteId,
    pub frequency_hz: f32,
    pub labels: NoteLabels,
}

/// Static note lookup table.
///
/// Immutable after construction, so a shared reference can be used from any
/// thread.
#[derive(Debug, Clone)]
pub struct NoteRegistry {
    entries: Vec<NoteEntry>,
}

impl NoteRegistry {
    /// Build the three-octave reference table (C3 through B5).
    pub fn new() -> Self {
        let mut entries = Vec::with_capacity(OCTAVES * 12);

        for (row, frequencies) in FREQUENCY_TABLE.iter().enumerate() {
            let octave = FIRST_OCTAVE + row as u8;
            for (pitch, &frequency_hz) in PitchClass::ALL.iter().zip(frequencies) {
                let id = NoteId::new(*pitch, octave);
                entries.push(NoteEntry {
                    id,
                    frequency_hz,
                    labels: NoteLabels {
                        western: id.to_string(),
                        swara: format!("{}{}", pitch.swara(), subscript(octave)),
                        sruthi: pitch.sruthi(),
                    },
                });
            }
        }

        Self { entries }
    }

    /// Process-wide shared registry.
    pub fn standard() -> &'static NoteRegistry {
        static REGISTRY: OnceLock<NoteRegistry> = OnceLock::new();
        REGISTRY.get_or_init(NoteRegistry::new)
    }

    pub fn entry(&self, id: NoteId) -> Result<&NoteEntry> {
        index_of(id)
            .and_then(|index| self.entries.get(index))
            .ok_or_else(|| SynthError::UnknownNote(id.to_string()))
    }

    pub fn frequency_of(&self, id: NoteId) -> Result<f32> {
        self.entry(id).map(|entry| entry.frequency_hz)
    }

    pub fn labels_of(&self, id: NoteId) -> Result<&NoteLabels> {
        self.entry(id).map(|entry| &entry.labels)
    }

    /// Parse a textual id and check it is supported.
    pub fn resolve(&self, token: &str) -> Result<NoteId> {
        let id: NoteId = token.parse()?;
        self.entry(id).map(|entry| entry.id)
    }

    pub fn contains(&self, id: NoteId) -> bool {
        self.entry(id).is_ok()
    }

    /// All entries in ascending pitch order.
    pub fn entries(&self) -> impl Iterator<Item = &NoteEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for NoteRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn index_of(id: NoteId) -> Option<usize> {
    if !(FIRST_OCTAVE..=LAST_OCTAVE).contains(&id.octave()) {
        return None;
    }
    Some((id.octave() - FIRST_OCTAVE) as usize * 12 + id.pitch().index())
}

fn subscript(number: u8) -> String {
    const DIGITS: [char; 10] = ['₀', '₁', '₂', '₃', '₄', '₅', '₆', '₇', '₈', '₉'];
    number
        .to_string()
        .chars()
        .filter_map(|c| c.to_digit(10).map(|d| DIGITS[d as usize]))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn covers_three_octaves() {
        let registry = NoteRegistry::new();
        assert_eq!(registry.len(), 36);
        assert!(registry.contains("C3".parse().unwrap()));
        assert!(registry.contains("B5".parse().unwrap()));
    }

    #[test]
    fn frequencies_strictly_increase() {
        let registry = NoteRegistry::new();
        let entries: Vec<_> = registry.entries().collect();
        for pair in entries.windows(2) {
            assert!(pair[0].id < pair[1].id);
            assert!(
                pair[1].frequency_hz > pair[0].frequency_hz,
                "{} ({}) should be above {} ({})",
                pair[1].id,
                pair[1].frequency_hz,
                pair[0].id,
                pair[0].frequency_hz
            );
        }
    }

    #[test]
    fn a4_is_the_tuning_reference() {
        let registry = NoteRegistry::standard();
        let a4 = registry.resolve("A4").unwrap();
        assert_eq!(registry.frequency_of(a4).unwrap(), 440.0);
    }

    #[test]
    fn octaves_double_in_frequency() {
        let registry = NoteRegistry::new();
        let a3 = registry.frequency_of("A3".parse().unwrap()).unwrap();
        let a5 = registry.frequency_of("A5".parse().unwrap()).unwrap();
        assert_eq!(a3 * 4.0, a5);
    }

    #[test]
    fn out_of_range_is_unknown() {
        let registry = NoteRegistry::new();
        let c6: NoteId = "C6".parse().unwrap();
        assert_eq!(
            registry.frequency_of(c6),
            Err(SynthError::UnknownNote("C6".into()))
        );
        assert!(registry.labels_of("B2".parse().unwrap()).is_err());
        assert!(registry.resolve("nonsense").is_err());
    }

    #[test]
    fn labels_carry_all_notations() {
        let registry = NoteRegistry::new();
        let labels = registry.labels_of("C#4".parse().unwrap()).unwrap();
        assert_eq!(labels.western, "C#4");
        assert_eq!(labels.swara, "Ri₁₄");
        assert_eq!(labels.sruthi, "1.5 kattai");

        let sa = registry.labels_of("C3".parse().unwrap()).unwrap();
        assert_eq!(sa.swara, "Sa₃");
    }

    #[test]
    fn standard_registry_is_shared() {
        assert!(std::ptr::eq(NoteRegistry::standard(), NoteRegistry::standard()));
    }
}
