//! Scale patterns and the fixed-length pitch sequences laid out on the bars.

use std::fmt;

use crate::pitch::{NoteName, Pitch};

/// Interval pattern family of the instrument
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ScaleKind {
    /// Five notes per octave: C D E G A
    #[default]
    Pentatonic,
    /// Seven notes per octave (major scale)
    Heptatonic,
    /// All twelve semitones
    Chromatic,
}

impl ScaleKind {
    pub const ALL: [ScaleKind; 3] = [
        ScaleKind::Pentatonic,
        ScaleKind::Heptatonic,
        ScaleKind::Chromatic,
    ];

    /// Look up a scale by name, falling back to pentatonic for anything unknown
    pub fn from_name(name: &str) -> ScaleKind {
        match name.trim().to_lowercase().as_str() {
            "pentatonic" => ScaleKind::Pentatonic,
            "major" | "heptatonic" => ScaleKind::Heptatonic,
            "chromatic" => ScaleKind::Chromatic,
            other => {
                log::warn!("Unknown scale '{}', using {}", other, ScaleKind::default());
                ScaleKind::default()
            }
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ScaleKind::Pentatonic => "pentatonic",
            ScaleKind::Heptatonic => "major",
            ScaleKind::Chromatic => "chromatic",
        }
    }

    /// Semitone offsets above C within one octave
    pub fn pattern(self) -> &'static [i32] {
        match self {
            ScaleKind::Pentatonic => &[0, 2, 4, 7, 9],
            ScaleKind::Heptatonic => &[0, 2, 4, 5, 7, 9, 11],
            ScaleKind::Chromatic => &[0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11],
        }
    }
}

impl fmt::Display for ScaleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An ordered, fixed-length run of pitches generated from one pattern
#[derive(Debug, Clone, PartialEq)]
pub struct Scale {
    kind: ScaleKind,
    pitches: Vec<Pitch>,
}

impl Scale {
    /// Walk `kind`'s pattern upward from `base_octave` until `count` pitches exist
    pub fn build(kind: ScaleKind, count: usize, base_octave: i32) -> Self {
        let pitches = kind
            .pattern()
            .iter()
            .cycle()
            .enumerate()
            .map(|(i, &offset)| {
                let octave = base_octave + (i / kind.pattern().len()) as i32;
                Pitch::new(NoteName::from_semitone(offset), octave)
            })
            .take(count)
            .collect();

        Self { kind, pitches }
    }

    pub fn kind(&self) -> ScaleKind {
        self.kind
    }

    pub fn pitches(&self) -> &[Pitch] {
        &self.pitches
    }

    pub fn get(&self, index: usize) -> Option<&Pitch> {
        self.pitches.get(index)
    }

    pub fn len(&self) -> usize {
        self.pitches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pitches.is_empty()
    }
}

/// Build `count` pitches of the scale called `name` starting at `base_octave`
pub fn build_scale(name: &str, count: usize, base_octave: i32) -> Vec<Pitch> {
    Scale::build(ScaleKind::from_name(name), count, base_octave).pitches
}
