//! Chromatic note names and equal-tempered pitch frequencies.

use std::fmt;

/// Reference pitch A4 (Hz)
pub const TUNING_A4_HZ: f64 = 440.0;

/// Octave of the reference pitch
pub const REFERENCE_OCTAVE: i32 = 4;

/// Musical note names (chromatic scale)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NoteName {
    C,
    CSharp,
    D,
    DSharp,
    E,
    F,
    FSharp,
    G,
    GSharp,
    A,
    ASharp,
    B,
}

impl NoteName {
    /// All twelve names in ascending semitone order
    pub const ALL: [NoteName; 12] = [
        NoteName::C,
        NoteName::CSharp,
        NoteName::D,
        NoteName::DSharp,
        NoteName::E,
        NoteName::F,
        NoteName::FSharp,
        NoteName::G,
        NoteName::GSharp,
        NoteName::A,
        NoteName::ASharp,
        NoteName::B,
    ];

    /// Semitone index within an octave (C=0, B=11)
    pub fn semitone(self) -> i32 {
        match self {
            NoteName::C => 0,
            NoteName::CSharp => 1,
            NoteName::D => 2,
            NoteName::DSharp => 3,
            NoteName::E => 4,
            NoteName::F => 5,
            NoteName::FSharp => 6,
            NoteName::G => 7,
            NoteName::GSharp => 8,
            NoteName::A => 9,
            NoteName::ASharp => 10,
            NoteName::B => 11,
        }
    }

    /// Name sitting `offset` semitones above C, wrapping at the octave
    pub fn from_semitone(offset: i32) -> NoteName {
        Self::ALL[offset.rem_euclid(12) as usize]
    }

    /// Parse a note symbol such as `C`, `c#`, `Db` or `A#`.
    /// Flats are folded onto their enharmonic sharp.
    pub fn from_symbol(symbol: &str) -> Option<NoteName> {
        let mut chars = symbol.trim().chars();
        let letter = chars.next()?.to_ascii_uppercase();
        let natural = match letter {
            'C' => 0,
            'D' => 2,
            'E' => 4,
            'F' => 5,
            'G' => 7,
            'A' => 9,
            'B' => 11,
            _ => return None,
        };
        let shift = match chars.as_str() {
            "" => 0,
            "#" | "s" | "S" => 1,
            "b" => -1,
            _ => return None,
        };
        Some(Self::from_semitone(natural + shift))
    }

    pub fn symbol(self) -> &'static str {
        match self {
            NoteName::C => "C",
            NoteName::CSharp => "C#",
            NoteName::D => "D",
            NoteName::DSharp => "D#",
            NoteName::E => "E",
            NoteName::F => "F",
            NoteName::FSharp => "F#",
            NoteName::G => "G",
            NoteName::GSharp => "G#",
            NoteName::A => "A",
            NoteName::ASharp => "A#",
            NoteName::B => "B",
        }
    }

    /// Frequency in Hz (A4 = 440 Hz)
    ///
    /// The whole-octave part is applied as an exact power of two so that
    /// raising the octave doubles the frequency bit-for-bit.
    pub fn to_freq(self, octave: i32) -> f64 {
        let octave_scale = 2.0_f64.powi(octave - REFERENCE_OCTAVE);
        let semitones = (self.semitone() - NoteName::A.semitone()) as f64;
        TUNING_A4_HZ * octave_scale * 2.0_f64.powf(semitones / 12.0)
    }
}

impl fmt::Display for NoteName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// A note at a specific octave, with its frequency derived once
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pitch {
    name: NoteName,
    octave: i32,
    frequency: f64,
}

impl Pitch {
    pub fn new(name: NoteName, octave: i32) -> Self {
        Self {
            name,
            octave,
            frequency: name.to_freq(octave),
        }
    }

    pub fn name(&self) -> NoteName {
        self.name
    }

    pub fn octave(&self) -> i32 {
        self.octave
    }

    /// Frequency in Hz
    pub fn frequency(&self) -> f64 {
        self.frequency
    }
}

impl fmt::Display for Pitch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.name, self.octave)
    }
}
