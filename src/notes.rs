//! MIDI note numbers, reference frequencies and cents deviations.

use rand::Rng;

use crate::error::SessionError;

/// Pitch class names, indexed by MIDI note number modulo 12.
const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "Eb", "E", "F", "F#", "G", "Ab", "A", "Bb", "B",
];

/// Returns the reference frequency in Hz of a MIDI note number,
/// i.e `440 * 2^((note - 69) / 12)`.
pub fn note_frequency(midi_note: u8) -> f32 {
    440.0 * 2.0_f32.powf((midi_note as f32 - 69.0) / 12.0)
}

/// Returns the pitch class name of a MIDI note number, without the octave.
pub fn note_name(midi_note: u8) -> &'static str {
    NOTE_NAMES[(midi_note % 12) as usize]
}

/// Returns the signed deviation in cents of a measured frequency from a
/// target frequency: `1200 * log2(measured / target)`. Positive means
/// sharp, negative means flat. Both frequencies must be positive and
/// finite.
pub fn cents_off(measured_hz: f32, target_hz: f32) -> f32 {
    1200.0 * (measured_hz / target_hz).log2()
}

/// The pool of MIDI notes target notes are drawn from. Never empty.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NoteSet {
    notes: Vec<u8>,
}

impl NoteSet {
    pub fn new(notes: Vec<u8>) -> Result<NoteSet, SessionError> {
        if notes.is_empty() {
            return Err(SessionError::InvalidConfiguration(
                "note set must not be empty",
            ));
        }
        Ok(NoteSet { notes })
    }

    /// The chromatic scale from Bb3 to Bb4.
    pub fn chromatic() -> NoteSet {
        NoteSet {
            notes: (58..=70).collect(),
        }
    }

    /// The Bb major scale from Bb3 to Bb4.
    pub fn bb_major() -> NoteSet {
        NoteSet {
            notes: vec![58, 60, 62, 63, 65, 67, 69, 70],
        }
    }

    pub fn notes(&self) -> &[u8] {
        &self.notes
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    /// Draws a random note, excluding the previous target so consecutive
    /// draws differ. If no other note exists (a single note set, or one
    /// whose members are all the previous target) that note is returned.
    pub fn draw<R: Rng>(&self, rng: &mut R, previous: Option<u8>) -> u8 {
        let has_alternative = self.notes.iter().any(|&note| Some(note) != previous);
        loop {
            let note = self.notes[rng.gen_range(0..self.notes.len())];
            if !has_alternative || Some(note) != previous {
                return note;
            }
        }
    }
}
